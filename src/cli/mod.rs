//! Command-line interface.

pub mod commands;
pub mod interactive;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::typebook::Category;

/// riasec - Holland interest classification and feed scoring.
#[derive(Parser, Debug)]
#[command(name = "riasec")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "riasec.toml")]
    pub config: PathBuf,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates riasec.toml and the .riasec/ data directory.
    Init {
        /// Target directory (default: current directory).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Scores a feed (text, or @file to read it from a file).
    Analyze {
        text: String,

        /// Print the full analysis as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Shows the active snapshot and engine state.
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Rebuilds the snapshot from the provider.
    Rebuild {
        /// Build from a saved provider payload instead of the network.
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Lists the questions of one category.
    Questions {
        #[arg(value_parser = parse_category)]
        category: Category,
    },

    /// Exports the active snapshot to a JSON file.
    Export { output: PathBuf },

    /// Imports a snapshot JSON file and makes it active.
    Import { input: PathBuf },

    /// Edits the configuration interactively.
    Config,

    /// Diagnoses configuration, storage and provider problems.
    Doctor,

    /// Shows version.
    Version,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse::<Category>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["riasec", "analyze", "오늘 노트북을 고쳤다", "--json"]).unwrap();
        match cli.command {
            Commands::Analyze { text, json } => {
                assert_eq!(text, "오늘 노트북을 고쳤다");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_questions_category() {
        let cli = Cli::try_parse_from(["riasec", "questions", "s"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Questions {
                category: Category::S
            }
        ));

        assert!(Cli::try_parse_from(["riasec", "questions", "X"]).is_err());
    }
}
