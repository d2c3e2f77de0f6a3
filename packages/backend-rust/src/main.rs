use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use gesture_algo::LandmarkSequence;
use gesture_backend::cli::{Cli, Commands};
use gesture_backend::config::Config;
use gesture_backend::logging::init_tracing;
use gesture_backend::services::{ComparisonService, NEUTRAL_ERROR_MESSAGE};
use gesture_backend::storage::{DatabaseManager, GestureReference};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse_args();

    let mut config = Config::from_env();
    if cli.verbose {
        config.log_level = "debug".to_string();
    }
    if let Some(path) = &cli.database {
        config.database_path = path.clone();
    }

    let log_guard = init_tracing(&config.log_level);
    config.log_rejected_settings();

    let db = DatabaseManager::new(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    tracing::debug!(path = db.db_path(), "database ready");

    match cli.command {
        Commands::ImportReference {
            id,
            name,
            meaning,
            description,
            difficulty,
            landmarks,
        } => {
            let sequence = read_sequence(&landmarks)?;
            if !sequence.has_any_hand() {
                tracing::warn!(%id, "reference has no detected hands");
            }
            let reference = GestureReference::new(id, name, meaning, sequence)
                .with_description(description)
                .with_difficulty(difficulty);
            db.references().save_reference(&reference)?;
            print_json(&json!({
                "id": reference.id,
                "frames": reference.landmarks.len(),
                "detected_frames": reference.landmarks.detected_frame_count(),
            }))?;
        }
        Commands::Compare {
            user,
            gesture,
            attempt,
        } => {
            let service = ComparisonService::new(
                config.comparison.clone(),
                db.references(),
                Arc::new(db.progress()),
            )?;

            let raw = match std::fs::read_to_string(&attempt) {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::error!(path = %attempt.display(), error = %err, "cannot read attempt file");
                    print_json(&json!({ "error": NEUTRAL_ERROR_MESSAGE }))?;
                    drop(log_guard);
                    std::process::exit(1);
                }
            };

            match service.evaluate_attempt_json(&user, &gesture, &raw) {
                Ok(report) => print_json(&json!({
                    "message": report.user_message(),
                    "report": report,
                }))?,
                Err(err) => {
                    tracing::error!(error = %err, "comparison failed");
                    print_json(&json!({ "error": err.user_message() }))?;
                    drop(log_guard);
                    std::process::exit(1);
                }
            }
        }
        Commands::Progress { user, gesture } => {
            let progress = db.progress();
            let records: Vec<_> = match gesture {
                Some(gesture) => progress.get_progress(&user, &gesture)?.into_iter().collect(),
                None => progress.list_progress_by_user(&user)?,
            };
            let rows: Vec<_> = records
                .iter()
                .map(|record| {
                    json!({
                        "record": record,
                        "accuracy": record.accuracy(),
                        "stage": record.stage(),
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        Commands::ListReferences => {
            let rows: Vec<_> = db
                .references()
                .list_references()?
                .into_iter()
                .map(|r| {
                    json!({
                        "id": r.id,
                        "name": r.name,
                        "meaning": r.meaning,
                        "difficulty": r.difficulty,
                        "frames": r.landmarks.len(),
                        "updated_at": r.updated_at,
                    })
                })
                .collect();
            print_json(&rows)?;
        }
        Commands::DeleteReference { id } => {
            let removed = db.references().delete_reference(&id)?;
            print_json(&json!({ "id": id, "removed": removed }))?;
        }
    }

    Ok(())
}

fn read_sequence(path: &Path) -> anyhow::Result<LandmarkSequence> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    LandmarkSequence::from_json(&raw)
        .with_context(|| format!("invalid landmark file {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
