//! Reference gesture repository

use chrono::{DateTime, Utc};
use gesture_algo::LandmarkSequence;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::storage::{lock_connection, StorageError, StorageResult};

// ============================================================
// Difficulty
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// GestureReference
// ============================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureReference {
    pub id: String,
    pub name: String,
    pub meaning: String,
    pub description: String,
    pub difficulty: Difficulty,
    /// Empty when no recording has been attached yet
    pub landmarks: LandmarkSequence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GestureReference {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        meaning: impl Into<String>,
        landmarks: LandmarkSequence,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            meaning: meaning.into(),
            description: String::new(),
            difficulty: Difficulty::default(),
            landmarks,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// Raw row; landmark JSON is decoded after the connection lock is released.
struct ReferenceRow {
    id: String,
    name: String,
    meaning: String,
    description: String,
    difficulty: String,
    landmarks: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ReferenceRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            meaning: row.get("meaning")?,
            description: row.get("description")?,
            difficulty: row.get("difficulty")?,
            landmarks: row.get("landmarks")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_reference(self) -> StorageResult<GestureReference> {
        let landmarks = match self.landmarks.as_deref() {
            Some(json) if !json.trim().is_empty() => LandmarkSequence::from_json(json)?,
            _ => LandmarkSequence::default(),
        };

        let difficulty = self.difficulty.parse().unwrap_or_else(|err: String| {
            tracing::warn!(id = %self.id, error = %err, "falling back to beginner difficulty");
            Difficulty::Beginner
        });

        Ok(GestureReference {
            id: self.id,
            name: self.name,
            meaning: self.meaning,
            description: self.description,
            difficulty,
            landmarks,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

// ============================================================
// ReferenceRepository
// ============================================================

pub struct ReferenceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReferenceRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Insert or replace by id; `created_at` of an existing row is kept.
    pub fn save_reference(&self, reference: &GestureReference) -> StorageResult<()> {
        let landmarks = reference.landmarks.to_json()?;
        let conn = lock_connection(&self.conn)?;

        conn.execute(
            r#"
            INSERT INTO gesture_reference
                (id, name, meaning, description, difficulty, landmarks, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                meaning = excluded.meaning,
                description = excluded.description,
                difficulty = excluded.difficulty,
                landmarks = excluded.landmarks,
                updated_at = excluded.updated_at
            "#,
            params![
                reference.id,
                reference.name,
                reference.meaning,
                reference.description,
                reference.difficulty.as_str(),
                landmarks,
                format_datetime(reference.created_at),
                format_datetime(reference.updated_at),
            ],
        )?;

        tracing::debug!(
            id = %reference.id,
            frames = reference.landmarks.len(),
            "saved reference gesture"
        );
        Ok(())
    }

    pub fn get_reference(&self, id: &str) -> StorageResult<Option<GestureReference>> {
        let row = {
            let conn = lock_connection(&self.conn)?;
            conn.query_row(
                "SELECT * FROM gesture_reference WHERE id = ?1",
                params![id],
                ReferenceRow::from_row,
            )
            .optional()?
        };

        row.map(ReferenceRow::into_reference).transpose()
    }

    /// All references ordered by difficulty then name
    pub fn list_references(&self) -> StorageResult<Vec<GestureReference>> {
        let rows = {
            let conn = lock_connection(&self.conn)?;
            let mut stmt = conn.prepare(
                r#"
                SELECT * FROM gesture_reference
                ORDER BY CASE difficulty
                    WHEN 'beginner' THEN 0
                    WHEN 'intermediate' THEN 1
                    ELSE 2
                END, name
                "#,
            )?;
            let rows = stmt
                .query_map([], ReferenceRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        rows.into_iter().map(ReferenceRow::into_reference).collect()
    }

    /// Returns whether a row was removed
    pub fn delete_reference(&self, id: &str) -> StorageResult<bool> {
        let conn = lock_connection(&self.conn)?;
        let affected = conn.execute("DELETE FROM gesture_reference WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

// ============================================================
// Helpers
// ============================================================

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_datetime(s: &str) -> StorageResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        .map_err(|e| StorageError::Corrupt(format!("unreadable timestamp {s:?}: {e}")))
}

// ============================================================
// Tests
// ============================================================
