// src/types/record.rs
//! Stored generation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two generation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    CoverLetter,
    EnhancedCv,
}

impl GenerationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationKind::CoverLetter => "cover_letter",
            GenerationKind::EnhancedCv => "enhanced_cv",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cover_letter" => Some(GenerationKind::CoverLetter),
            "enhanced_cv" => Some(GenerationKind::EnhancedCv),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenerationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One successful generation, kept so results can be re-read and
/// re-exported after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GenerationRecord {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub company_name: String,
    pub position_title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn generation_kind(&self) -> Option<GenerationKind> {
        GenerationKind::parse(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(
            GenerationKind::parse("cover_letter"),
            Some(GenerationKind::CoverLetter)
        );
        assert_eq!(
            GenerationKind::parse(GenerationKind::EnhancedCv.as_str()),
            Some(GenerationKind::EnhancedCv)
        );
        assert_eq!(GenerationKind::parse("resume"), None);
    }
}
