//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::{Engine, EngineStatus, RebuildOutcome};
use crate::matching::FeedAnalysis;
use crate::provider::{CareerNetProvider, FileProvider, QuestionProvider};
use crate::snapshot::{bundled_snapshot, export_snapshot, open_backend, SnapshotStore};
use crate::typebook::{Category, TypeBook};
use crate::types::config::{Config, StorageKind, API_KEY_ENV};
use crate::{RiasecError, RiasecResult};

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> RiasecResult<()> {
    let explicit_dir = path.is_some();
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join("riasec.toml");

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use 'riasec config' to modify.");
        return Ok(());
    }

    let data_dir = target_dir.join(".riasec");
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!(".riasec/ directory created");
    }

    update_gitignore(&target_dir)?;

    let mut config = Config::default_config();
    if explicit_dir {
        // Storage must live next to the config, not wherever init ran from.
        config.storage.path = target_dir.join(config.storage.backend.default_path());
    }
    config.save(&config_path)?;

    println!("riasec initialized.");
    println!("Configuration created at: {}", config_path.display());
    println!("Data directory: {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Set {} (or provider.api_key in riasec.toml)", API_KEY_ENV);
    println!("  2. Build the question snapshot: riasec rebuild");
    println!("  3. Score a feed: riasec analyze \"오늘 고장난 노트북을 고쳤다\"");

    Ok(())
}

/// Adds `.riasec/` to the directory's .gitignore, creating it if needed.
fn update_gitignore(target_dir: &Path) -> RiasecResult<()> {
    let gitignore_path = target_dir.join(".gitignore");
    let entry = ".riasec/";
    let comment = "# riasec - local snapshot storage";

    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)?;

        if content
            .lines()
            .any(|line| line.trim() == entry || line.trim() == ".riasec")
        {
            tracing::debug!(".gitignore already contains .riasec/");
            return Ok(());
        }

        let mut new_content = content.trim_end().to_string();
        if !new_content.is_empty() {
            new_content.push_str("\n\n");
        }
        new_content.push_str(comment);
        new_content.push('\n');
        new_content.push_str(entry);
        new_content.push('\n');

        std::fs::write(&gitignore_path, new_content)?;
        println!(".gitignore updated with .riasec/");
    } else {
        std::fs::write(&gitignore_path, format!("{}\n{}\n", comment, entry))?;
        println!(".gitignore created with .riasec/");
    }

    Ok(())
}

/// Reads the feed text; `@path` reads it from a file.
fn read_feed(text: &str) -> RiasecResult<String> {
    match text.strip_prefix('@') {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => Ok(text.to_string()),
    }
}

/// Scores a feed and prints the result.
pub async fn analyze(text: &str, json: bool, config: &Config) -> RiasecResult<()> {
    let feed = read_feed(text)?;
    let engine = Engine::from_config(config)?;
    let analysis = engine.analyze_feed(&feed).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_analysis(&analysis);
    }

    Ok(())
}

fn print_analysis(analysis: &FeedAnalysis) {
    match analysis.top_category {
        Some(category) => println!("Top category: {} ({})", category, category.english_name()),
        None => println!("Top category: none (no matching evidence)"),
    }
    println!(
        "Total score: {:.4}    XP: {}",
        analysis.total_score,
        analysis.total_xp()
    );

    if !analysis.top_matches.is_empty() {
        println!("\nTop matches:");
        for (i, m) in analysis.top_matches.iter().enumerate() {
            println!(
                "  {}. [{}] {} (similarity {:.3}, score {:.4})",
                i + 1,
                m.question.category,
                m.question.original_text,
                m.similarity,
                m.weighted_score
            );
        }
    }

    println!("\nPer category:");
    for category in Category::ALL {
        println!(
            "  {}  score {:.4}  xp {}",
            category,
            analysis.per_category_score.get(&category).copied().unwrap_or(0.0),
            analysis.per_category_xp.get(&category).copied().unwrap_or(0)
        );
    }

    if !analysis.recommended_skills.is_empty() {
        println!("\nRecommended skills: {}", analysis.recommended_skills.join(", "));
    }
}

/// Shows the engine status.
pub async fn status(json: bool, config: &Config) -> RiasecResult<()> {
    let engine = Engine::from_config(config)?;
    engine.initialize().await?;
    let status = engine.status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print_status(&status);
    }

    Ok(())
}

fn print_status(status: &EngineStatus) {
    println!("State:      {}", status.state);
    if let Some(source) = status.source {
        println!("Source:     {}", source);
    }
    if let Some(version) = &status.version {
        println!("Version:    {}", version);
    }
    if let Some(updated) = status.last_updated {
        println!("Updated:    {}", updated.to_rfc3339());
    }
    println!("Storage:    {}", status.storage);
    println!("Questions:  {}", status.total_questions);
    for (category, count) in &status.per_category_counts {
        println!("  {}  {}", category, count);
    }
    if status.keywords_stale {
        println!("⚠ Snapshot was classified with a different keyword set; run 'riasec rebuild'.");
    }
    if let Some(error) = &status.last_error {
        println!("Last error: {}", error);
    }
}

/// Rebuilds the snapshot, from the network or from a saved payload.
pub async fn rebuild(from: Option<PathBuf>, config: &Config) -> RiasecResult<()> {
    let provider: Arc<dyn QuestionProvider> = match from {
        Some(path) => Arc::new(
            FileProvider::new(path)
                .with_test(config.provider.test_number, config.provider.test_type.clone()),
        ),
        None => Arc::new(CareerNetProvider::from_config(&config.provider)),
    };
    let engine = Engine::from_config_with_provider(config, provider)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message("Fetching and classifying questions...");

    let outcome = engine.rebuild().await;
    spinner.finish_and_clear();

    match outcome? {
        RebuildOutcome::Rebuilt {
            version,
            total_questions,
        } => {
            println!("✓ Snapshot rebuilt: {} ({} questions)", version, total_questions);
        }
        RebuildOutcome::Failed {
            serving_version,
            error,
        } => {
            println!("✗ Rebuild failed: {}", error);
            println!("  Still serving snapshot {}", serving_version);
        }
    }

    Ok(())
}

/// Lists the questions of one category.
pub async fn questions(category: Category, config: &Config) -> RiasecResult<()> {
    let engine = Engine::from_config(config)?;
    let items = engine.questions_by_category(category).await?;
    let typebook = TypeBook::standard();
    let profile = typebook.profile(category);

    println!(
        "{} - {} ({}): {} questions\n",
        category,
        profile.name,
        category.english_name(),
        items.len()
    );
    for item in items {
        println!(
            "  {}  {}  (confidence {:.3}; {})",
            item.id,
            item.original_text,
            item.confidence,
            item.matched_keywords.join(", ")
        );
    }

    Ok(())
}

/// Exports the active snapshot.
pub async fn export(output: &Path, config: &Config) -> RiasecResult<()> {
    let engine = Engine::from_config(config)?;
    engine.initialize().await?;
    let snapshot = engine
        .snapshot()
        .ok_or_else(|| RiasecError::other("no active snapshot to export"))?;

    export_snapshot(&snapshot, output)?;
    println!(
        "Snapshot {} exported to: {}",
        snapshot.version,
        output.display()
    );

    Ok(())
}

/// Imports a snapshot file and persists it.
pub async fn import(input: &Path, config: &Config) -> RiasecResult<()> {
    if !input.exists() {
        println!("File not found: {}", input.display());
        return Ok(());
    }

    let engine = Engine::from_config(config)?;
    let snapshot = engine.import(input).await?;

    println!(
        "Imported snapshot {} ({} questions)",
        snapshot.version, snapshot.total_questions
    );

    Ok(())
}

/// Edits configuration interactively.
pub async fn config_cmd(config_path: &Path) -> RiasecResult<()> {
    use super::interactive::{run_interactive_config, show_config_summary};

    if config_path.exists() {
        let config = Config::load(config_path)?;
        show_config_summary(&config);
    }

    run_interactive_config(config_path)
}

/// Diagnoses configuration, storage and provider problems.
pub async fn doctor(config: &Config) -> RiasecResult<()> {
    println!("Diagnosing riasec configuration...\n");

    let mut issues: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    println!("✓ Configuration loaded");

    match bundled_snapshot() {
        Ok(snapshot) => println!(
            "✓ Bundled snapshot is valid ({} questions)",
            snapshot.total_questions
        ),
        Err(e) => issues.push(format!("Bundled snapshot is invalid: {}", e)),
    }

    let fingerprint = TypeBook::standard().fingerprint();
    match open_backend(&config.storage) {
        Ok(backend) => {
            let store = SnapshotStore::new(backend, config.storage.key.clone());
            println!("✓ Storage opened: {}", store.describe());

            match store.load() {
                None => warnings.push(
                    "No stored snapshot; the next start will build one or use the bundled default"
                        .to_string(),
                ),
                Some(snapshot) => match SnapshotStore::check(&snapshot) {
                    Ok(()) => {
                        println!(
                            "✓ Stored snapshot {} ({} questions)",
                            snapshot.version, snapshot.total_questions
                        );
                        if snapshot.is_stale_for(&fingerprint) {
                            warnings.push(
                                "Stored snapshot was classified with a different keyword set"
                                    .to_string(),
                            );
                        }
                    }
                    Err(e) => issues.push(format!("Stored snapshot is invalid: {}", e)),
                },
            }
        }
        Err(e) => issues.push(format!("Cannot open {} storage: {}", config.storage.backend, e)),
    }

    if config.storage.backend == StorageKind::Memory {
        warnings.push("Memory storage keeps nothing between runs".to_string());
    }

    if config.provider.resolved_api_key().is_empty() {
        warnings.push(format!(
            "No provider API key (set {} or provider.api_key)",
            API_KEY_ENV
        ));
    } else {
        let provider = CareerNetProvider::from_config(&config.provider);
        if provider.is_available().await {
            println!("✓ Provider reachable: {}", config.provider.base_url);
        } else {
            warnings.push(format!(
                "Provider not reachable: {}",
                config.provider.base_url
            ));
        }
    }

    println!();
    if issues.is_empty() && warnings.is_empty() {
        println!("✓ All good.");
    } else {
        if !warnings.is_empty() {
            println!("Warnings:");
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
        if !issues.is_empty() {
            println!("Problems:");
            for issue in issues {
                println!("  ✗ {}", issue);
            }
        }
    }

    Ok(())
}

/// Shows version.
pub fn version() {
    println!("riasec {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Holland (RIASEC) interest classification and feed scoring");
}
