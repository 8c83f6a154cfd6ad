use clap::Parser;
use riasec::cli::{Cli, Commands};
use riasec::types::config::Config;
use riasec::RiasecResult;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> RiasecResult<()> {
    let cli = Cli::parse();

    // Configuration is loaded before logging exists.
    let config = if cli.config.exists() {
        Config::load(&cli.config).unwrap_or_else(|e| {
            eprintln!("Warning: ignoring {}: {}", cli.config.display(), e);
            Config::default_config()
        })
    } else {
        Config::default_config()
    };

    // CLI flags take precedence over config
    let log_level = if cli.quiet {
        "error".to_string()
    } else if cli.verbose {
        "debug".to_string()
    } else {
        config.general.log_level.clone()
    };

    let directive = format!("riasec={}", log_level)
        .parse::<Directive>()
        .or_else(|_| "riasec=info".parse::<Directive>())
        .map_err(|e| riasec::RiasecError::config(format!("invalid log directive: {}", e)))?;
    let filter = EnvFilter::from_default_env().add_directive(directive);

    if config.general.log_format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    tracing::debug!("Configuration loaded from: {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => {
            riasec::cli::commands::init(path).await?;
        }
        Commands::Analyze { text, json } => {
            riasec::cli::commands::analyze(&text, json, &config).await?;
        }
        Commands::Status { json } => {
            riasec::cli::commands::status(json, &config).await?;
        }
        Commands::Rebuild { from } => {
            riasec::cli::commands::rebuild(from, &config).await?;
        }
        Commands::Questions { category } => {
            riasec::cli::commands::questions(category, &config).await?;
        }
        Commands::Export { output } => {
            riasec::cli::commands::export(&output, &config).await?;
        }
        Commands::Import { input } => {
            riasec::cli::commands::import(&input, &config).await?;
        }
        Commands::Config => {
            riasec::cli::commands::config_cmd(&cli.config).await?;
        }
        Commands::Doctor => {
            riasec::cli::commands::doctor(&config).await?;
        }
        Commands::Version => {
            riasec::cli::commands::version();
        }
    }

    Ok(())
}
