use anyhow::Result;

use sitekit_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let path = AppConfig::config_path();
    let note = if path.exists() { "" } else { " (not found, using defaults)" };
    println!("Config: {}{}", path.display(), note);
    println!("Data:   {}\n", config.data_dir().display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
