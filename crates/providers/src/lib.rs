//! Text-generation providers for Tabula.
//!
//! All providers implement the `tabula_core::Generator` trait.

pub mod ollama;

pub use ollama::OllamaProvider;
