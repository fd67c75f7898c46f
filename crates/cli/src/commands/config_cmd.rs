//! `tabula config` — Print the effective configuration.

use tabula_config::AppConfig;

use super::CommandResult;

pub async fn run(config: &AppConfig, config_path: &std::path::Path) -> CommandResult {
    println!("# Effective configuration");
    if config_path.exists() {
        println!("# loaded from {}", config_path.display());
    } else {
        println!("# {} not found, defaults shown", config_path.display());
    }
    println!("# environment overrides applied\n");
    print!("{}", config.to_toml());
    Ok(())
}
