//! Context assembly — renders retrieved rows into the prompt's CONTEXT block.
//!
//! One line per row, in the order supplied:
//!
//! ```text
//! Row 0: {"name":"Alice","dept":"HR"}
//! Row 3: {"name":"Dan","dept":"HR"}
//! ```
//!
//! Assembly is pure and deterministic. The output is bounded by a
//! character budget; the first row is always kept so a non-empty
//! retrieval never produces an empty context.

use tabula_config::RetrievalConfig;
use tabula_core::Row;

// ── Types ─────────────────────────────────────────────────────────────────

/// The rendered context block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    pub text: String,
    /// Rows rendered into `text`.
    pub included: usize,
    /// Trailing rows dropped to stay within budget.
    pub truncated: usize,
}

/// Renders rows within a character budget.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    max_chars: usize,
}

// ── Assembler ─────────────────────────────────────────────────────────────

impl ContextAssembler {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.max_context_chars)
    }

    /// Render `rows` in order, stopping before the first line that would
    /// overflow the budget.
    pub fn assemble<'a, I>(&self, rows: I) -> AssembledContext
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let mut text = String::new();
        let mut used = 0;
        let mut included = 0;
        let mut truncated = 0;

        for row in rows {
            if truncated > 0 {
                truncated += 1;
                continue;
            }

            let line = render_line(row);
            let separator = usize::from(included > 0);
            let projected = used + separator + line.chars().count();
            if included > 0 && projected > self.max_chars {
                truncated += 1;
                continue;
            }

            if included > 0 {
                text.push('\n');
            }
            text.push_str(&line);
            used = projected;
            included += 1;
        }

        AssembledContext {
            text,
            included,
            truncated,
        }
    }
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(12_000)
    }
}

fn render_line(row: &Row) -> String {
    format!("Row {}: {}", row.row_index, row.fields.to_json())
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::Fields;

    fn row(index: usize, pairs: &[(&str, &str)]) -> Row {
        let fields: Fields = pairs.iter().map(|(k, v)| (*k, *v)).collect();
        Row::new("ds", index, fields)
    }

    #[test]
    fn renders_lines_in_supplied_order() {
        let rows = vec![
            row(3, &[("name", "Dan"), ("dept", "HR")]),
            row(0, &[("name", "Alice"), ("dept", "HR")]),
        ];
        let ctx = ContextAssembler::default().assemble(&rows);
        assert_eq!(
            ctx.text,
            "Row 3: {\"name\":\"Dan\",\"dept\":\"HR\"}\nRow 0: {\"name\":\"Alice\",\"dept\":\"HR\"}"
        );
        assert_eq!(ctx.included, 2);
        assert_eq!(ctx.truncated, 0);
    }

    #[test]
    fn empty_input_is_empty_text() {
        let ctx = ContextAssembler::default().assemble(Vec::<&Row>::new());
        assert_eq!(ctx.text, "");
        assert_eq!(ctx.included, 0);
    }

    #[test]
    fn values_are_json_escaped() {
        let rows = vec![row(0, &[("note", "say \"hi\"\nbye")])];
        let ctx = ContextAssembler::default().assemble(&rows);
        assert_eq!(ctx.text, r#"Row 0: {"note":"say \"hi\"\nbye"}"#);
    }

    #[test]
    fn budget_drops_trailing_rows() {
        let rows: Vec<Row> = (0..5).map(|i| row(i, &[("k", "v")])).collect();
        // Each line is `Row i: {"k":"v"}`, 16 chars; two lines plus a newline = 33.
        let ctx = ContextAssembler::new(40).assemble(&rows);
        assert_eq!(ctx.included, 2);
        assert_eq!(ctx.truncated, 3);
        assert_eq!(ctx.text.lines().count(), 2);
    }

    #[test]
    fn first_row_survives_tiny_budget() {
        let rows = vec![row(0, &[("k", "a long value")]), row(1, &[("k", "v")])];
        let ctx = ContextAssembler::new(1).assemble(&rows);
        assert_eq!(ctx.included, 1);
        assert_eq!(ctx.truncated, 1);
        assert!(ctx.text.starts_with("Row 0: "));
    }

    #[test]
    fn deterministic() {
        let rows = vec![row(0, &[("a", "1")]), row(1, &[("b", "2")])];
        let assembler = ContextAssembler::default();
        assert_eq!(assembler.assemble(&rows), assembler.assemble(&rows));
    }
}
