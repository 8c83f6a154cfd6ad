//! Interactive configuration editor (dialoguer).

use std::path::Path;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::types::config::{Config, StorageKind};
use crate::RiasecResult;

/// Runs the interactive editor and saves on request.
pub fn run_interactive_config(config_path: &Path) -> RiasecResult<()> {
    let theme = ColorfulTheme::default();

    println!("\n🔧 riasec configuration\n");

    let mut config = if config_path.exists() {
        Config::load(config_path)?
    } else {
        println!("Creating a new configuration...\n");
        Config::default_config()
    };

    loop {
        let options = [
            "General",
            "Provider",
            "Storage",
            "Analysis cache",
            "Save and exit",
            "Exit without saving",
        ];

        let selection = Select::with_theme(&theme)
            .with_prompt("What do you want to configure?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => configure_general(&theme, &mut config)?,
            1 => configure_provider(&theme, &mut config)?,
            2 => configure_storage(&theme, &mut config)?,
            3 => configure_cache(&theme, &mut config)?,
            4 => {
                config.save(config_path)?;
                println!("\n✓ Configuration saved to: {}\n", config_path.display());
                break;
            }
            5 => {
                if Confirm::with_theme(&theme)
                    .with_prompt("Exit without saving?")
                    .default(false)
                    .interact()?
                {
                    println!("\nExiting without saving.\n");
                    break;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn configure_general(theme: &ColorfulTheme, config: &mut Config) -> RiasecResult<()> {
    let log_levels = ["error", "warn", "info", "debug", "trace"];
    let current = log_levels
        .iter()
        .position(|&l| l == config.general.log_level)
        .unwrap_or(2);

    let idx = Select::with_theme(theme)
        .with_prompt("Log level")
        .items(&log_levels)
        .default(current)
        .interact()?;
    config.general.log_level = log_levels[idx].to_string();

    let log_formats = ["text", "json"];
    let current = log_formats
        .iter()
        .position(|&f| f == config.general.log_format)
        .unwrap_or(0);

    let idx = Select::with_theme(theme)
        .with_prompt("Log format")
        .items(&log_formats)
        .default(current)
        .interact()?;
    config.general.log_format = log_formats[idx].to_string();

    println!("\n✓ General settings updated.\n");
    Ok(())
}

fn configure_provider(theme: &ColorfulTheme, config: &mut Config) -> RiasecResult<()> {
    config.provider.base_url = Input::with_theme(theme)
        .with_prompt("Provider base URL")
        .default(config.provider.base_url.clone())
        .interact_text()?;

    config.provider.api_key = Input::with_theme(theme)
        .with_prompt("API key (empty to rely on the environment)")
        .default(config.provider.api_key.clone())
        .allow_empty(true)
        .interact_text()?;

    config.provider.test_number = Input::with_theme(theme)
        .with_prompt("Questionnaire number")
        .default(config.provider.test_number)
        .interact_text()?;

    config.provider.test_type = Input::with_theme(theme)
        .with_prompt("Questionnaire name")
        .default(config.provider.test_type.clone())
        .interact_text()?;

    let timeout: u64 = Input::with_theme(theme)
        .with_prompt("Timeout per request (seconds)")
        .default(config.provider.timeout_secs)
        .interact_text()?;
    config.provider.timeout_secs = timeout.max(1);

    println!("\n✓ Provider configured.\n");
    Ok(())
}

fn configure_storage(theme: &ColorfulTheme, config: &mut Config) -> RiasecResult<()> {
    let kinds = [StorageKind::Sqlite, StorageKind::File, StorageKind::Memory];
    let labels: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
    let current = kinds
        .iter()
        .position(|k| *k == config.storage.backend)
        .unwrap_or(0);

    let idx = Select::with_theme(theme)
        .with_prompt("Storage backend")
        .items(&labels)
        .default(current)
        .interact()?;

    let kind = kinds[idx];
    if kind != config.storage.backend {
        config.storage.backend = kind;
        config.storage.path = kind.default_path();
    }

    if kind != StorageKind::Memory {
        let path: String = Input::with_theme(theme)
            .with_prompt("Storage path")
            .default(config.storage.path.display().to_string())
            .interact_text()?;
        config.storage.path = path.into();
    }

    println!("\n✓ Storage configured.\n");
    Ok(())
}

fn configure_cache(theme: &ColorfulTheme, config: &mut Config) -> RiasecResult<()> {
    config.cache.enabled = Confirm::with_theme(theme)
        .with_prompt("Cache analyses?")
        .default(config.cache.enabled)
        .interact()?;

    if !config.cache.enabled {
        println!("Cache disabled.\n");
        return Ok(());
    }

    config.cache.capacity = Input::with_theme(theme)
        .with_prompt("Capacity (entries)")
        .default(config.cache.capacity)
        .interact_text()?;

    config.cache.ttl_secs = Input::with_theme(theme)
        .with_prompt("Time to live (seconds)")
        .default(config.cache.ttl_secs)
        .interact_text()?;

    println!("\n✓ Cache configured.\n");
    Ok(())
}

/// Prints a summary of the configuration.
pub fn show_config_summary(config: &Config) {
    let api_key = if config.provider.resolved_api_key().is_empty() {
        "not set"
    } else {
        "set"
    };

    println!("\n📊 Configuration\n");
    println!("┌─────────────────────────────────────────┐");
    println!("│ General                                 │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Log level: {:<28} │", config.general.log_level);
    println!("│ Log format: {:<27} │", config.general.log_format);
    println!("├─────────────────────────────────────────┤");
    println!("│ Provider                                │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Test number: {:<26} │", config.provider.test_number);
    println!("│ API key: {:<30} │", api_key);
    println!("│ Timeout: {:<29}s │", config.provider.timeout_secs);
    println!("├─────────────────────────────────────────┤");
    println!("│ Storage                                 │");
    println!("├─────────────────────────────────────────┤");
    println!("│ Backend: {:<30} │", config.storage.backend.to_string());
    println!("│ Path: {:<33} │", config.storage.path.display().to_string());
    println!("├─────────────────────────────────────────┤");
    println!("│ Cache                                   │");
    println!("├─────────────────────────────────────────┤");
    println!(
        "│ Enabled: {:<30} │",
        if config.cache.enabled { "yes" } else { "no" }
    );
    if config.cache.enabled {
        println!("│ Capacity: {:<29} │", config.cache.capacity);
        println!("│ TTL: {:<33}s │", config.cache.ttl_secs);
    }
    println!("└─────────────────────────────────────────┘");
    println!();
}
