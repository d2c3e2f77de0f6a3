//! Command-line interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::storage::Difficulty;

/// Gesture coach - compare recorded hand gestures against references
#[derive(Parser, Debug)]
#[command(name = "gesture-backend")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (overrides DATABASE_PATH)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a reference gesture from a landmark JSON file
    ImportReference {
        #[arg(long)]
        id: String,

        #[arg(long)]
        name: String,

        /// What the gesture means
        #[arg(long, default_value = "")]
        meaning: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "beginner")]
        difficulty: Difficulty,

        /// frames -> hands -> 21 [x, y, z] points
        landmarks: PathBuf,
    },

    /// Compare an attempt with a stored reference and record progress
    Compare {
        #[arg(long)]
        user: String,

        #[arg(long)]
        gesture: String,

        /// Attempt landmark JSON file
        attempt: PathBuf,
    },

    /// Show practice progress for a user
    Progress {
        #[arg(long)]
        user: String,

        /// Limit to one gesture
        #[arg(long)]
        gesture: Option<String>,
    },

    /// List stored reference gestures
    ListReferences,

    /// Remove a reference gesture
    DeleteReference {
        id: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_import_reference() {
        let cli = Cli::try_parse_from([
            "gesture-backend",
            "import-reference",
            "--id",
            "thanks",
            "--name",
            "Thank you",
            "--difficulty",
            "advanced",
            "thanks.json",
        ])
        .unwrap();

        match cli.command {
            Commands::ImportReference {
                id,
                difficulty,
                landmarks,
                meaning,
                ..
            } => {
                assert_eq!(id, "thanks");
                assert_eq!(difficulty, Difficulty::Advanced);
                assert_eq!(landmarks, PathBuf::from("thanks.json"));
                assert_eq!(meaning, "");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_compare_with_global_database() {
        let cli = Cli::try_parse_from([
            "gesture-backend",
            "compare",
            "--user",
            "u1",
            "--gesture",
            "wave",
            "attempt.json",
            "--database",
            "/tmp/coach.db",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("/tmp/coach.db")));
        assert!(matches!(cli.command, Commands::Compare { ref user, .. } if user == "u1"));
    }

    #[test]
    fn test_rejects_unknown_difficulty() {
        let result = Cli::try_parse_from([
            "gesture-backend",
            "import-reference",
            "--id",
            "x",
            "--name",
            "X",
            "--difficulty",
            "expert",
            "x.json",
        ]);
        assert!(result.is_err());
    }
}
