//! # SOP Workflow Configuration Validator
//!
//! Command-line tool for validating SOP workflow configuration files across
//! environments before a service is started with them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sop_workflow::config::{ConfigManager, WorkflowConfig};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate SOP workflow configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (development, test, production, ...)
    #[arg(short, long, default_value = "development")]
    environment: String,

    /// Configuration directory path (default: config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the configuration
    Validate,

    /// Print the merged configuration as JSON, credentials masked
    Show,

    /// Compare the merged configuration of two environments
    Compare {
        /// Base environment for comparison
        #[arg(short, long, default_value = "development")]
        base: String,

        /// Target environment for comparison
        #[arg(short, long)]
        target: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let _subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .try_init();

    let result = match &cli.command {
        Some(Commands::Validate) | None => validate(&cli),
        Some(Commands::Show) => show(&cli),
        Some(Commands::Compare { base, target }) => compare(&cli, base, target),
    };

    match result {
        Ok(()) => {
            info!("Configuration validation completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("Configuration validation failed: {e:#}");
            eprintln!("❌ {e:#}");
            process::exit(1);
        }
    }
}

fn config_dir(cli: &Cli) -> PathBuf {
    cli.config_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(sop_workflow::constants::DEFAULT_CONFIG_DIR))
}

fn load(cli: &Cli, environment: &str) -> Result<WorkflowConfig> {
    let manager = ConfigManager::load_from_directory_with_env(config_dir(cli), environment)
        .with_context(|| format!("loading configuration for environment '{environment}'"))?;
    Ok(manager.config().clone())
}

fn validate(cli: &Cli) -> Result<()> {
    println!("🔧 Validating SOP workflow configuration");
    println!("Environment: {}", cli.environment);
    println!("Config Directory: {}", config_dir(cli).display());
    println!();

    let config = load(cli, &cli.environment)?;

    println!("✅ events: channel_capacity = {}", config.events.channel_capacity);
    println!(
        "✅ concurrency: lock_timeout_ms = {}",
        config.concurrency.lock_timeout_ms
    );
    match &config.database.url {
        Some(_) => println!(
            "✅ database: max_connections = {}, run_migrations = {}",
            config.database.max_connections, config.database.run_migrations
        ),
        None => println!("ℹ️  database: no url configured, in-memory stores only"),
    }
    println!("✅ logging: json = {}", config.logging.json);

    println!("\n🎉 All configuration validation checks passed!");
    Ok(())
}

fn show(cli: &Cli) -> Result<()> {
    let config = load(cli, &cli.environment)?;
    let json = serde_json::to_string_pretty(&config.sanitized())
        .context("serializing configuration")?;
    println!("{json}");
    Ok(())
}

fn compare(cli: &Cli, base: &str, target: &str) -> Result<()> {
    let base_config = serde_json::to_value(load(cli, base)?.sanitized())?;
    let target_config = serde_json::to_value(load(cli, target)?.sanitized())?;

    println!("🔍 Comparing '{base}' → '{target}'");

    let mut differences = 0;
    if let (Some(base_sections), Some(target_sections)) =
        (base_config.as_object(), target_config.as_object())
    {
        for (section, base_values) in base_sections {
            let Some(target_values) = target_sections.get(section) else {
                continue;
            };
            let (Some(base_values), Some(target_values)) =
                (base_values.as_object(), target_values.as_object())
            else {
                continue;
            };
            for (key, base_value) in base_values {
                let target_value = target_values.get(key).unwrap_or(&serde_json::Value::Null);
                if base_value != target_value {
                    differences += 1;
                    println!("  {section}.{key}: {base_value} → {target_value}");
                }
            }
        }
    }

    if differences == 0 {
        println!("✅ No differences");
    } else {
        println!("\n{differences} difference(s)");
    }
    Ok(())
}
