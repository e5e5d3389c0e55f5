use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use portal_core::config::{config_path, load_config, save_config, ConfigKey};

pub fn show() -> Result<()> {
    let config = load_config()?;

    println!("{} {}", "Config file:".bold(), config_path().display());
    for key in ConfigKey::value_variants() {
        println!(
            "  {} = {}",
            format!("{:<18}", key.as_str()).cyan(),
            config.get(*key)
        );
    }
    Ok(())
}

pub fn set(key: ConfigKey, value: &str) -> Result<()> {
    let mut config = load_config()?;
    config.set(key, value)?;
    save_config(&config)?;

    println!("[portal] Set {} = {}", key.as_str(), config.get(key));
    Ok(())
}
