// src/types/application.rs
//! The form-field record: a résumé plus the details of one target job

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::types::record::GenerationKind;

/// Flat record of the five user-supplied fields. Stored verbatim as JSON
/// under the draft storage key and interpolated unmodified into prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    #[serde(default)]
    pub cv_content: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub position_title: String,
    #[serde(default)]
    pub job_requirements: String,
    #[serde(default)]
    pub job_description: String,
}

impl JobApplication {
    /// Check the fields a generation variant needs, surfacing the first
    /// missing one as a single actionable message.
    pub fn validate(&self, kind: GenerationKind) -> Result<()> {
        if self.cv_content.trim().is_empty() {
            anyhow::bail!("Please enter your CV/resume content.");
        }

        if kind == GenerationKind::CoverLetter {
            if self.company_name.trim().is_empty() {
                anyhow::bail!("Please enter the company name.");
            }
            if self.position_title.trim().is_empty() {
                anyhow::bail!("Please enter the position title.");
            }
        }

        Ok(())
    }

    /// Display title for a generated document.
    pub fn title_for(&self, kind: GenerationKind) -> String {
        match kind {
            GenerationKind::CoverLetter => format!(
                "Cover letter for {}: {}",
                self.company_name, self.position_title
            ),
            GenerationKind::EnhancedCv => "Enhanced CV".to_string(),
        }
    }

    /// Download filename stem for a generated document, e.g.
    /// `cover-letter-acme-corporation`.
    pub fn export_stem(&self, kind: GenerationKind) -> String {
        let slug = crate::utils::company_slug(&self.company_name);
        match kind {
            GenerationKind::CoverLetter => format!("cover-letter-{}", slug),
            GenerationKind::EnhancedCv if slug.is_empty() => "enhanced-cv".to_string(),
            GenerationKind::EnhancedCv => format!("enhanced-cv-{}", slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> JobApplication {
        JobApplication {
            cv_content: "Ten years of plumbing".to_string(),
            company_name: "Acme Corporation".to_string(),
            position_title: "Senior Developer".to_string(),
            job_requirements: "Rust".to_string(),
            job_description: "Build things".to_string(),
        }
    }

    #[test]
    fn test_validate_requires_cv_content() {
        let mut app = filled();
        app.cv_content = "   ".to_string();

        let err = app.validate(GenerationKind::EnhancedCv).unwrap_err();
        assert!(err.to_string().contains("CV/resume content"));
    }

    #[test]
    fn test_validate_letter_requires_company_and_position() {
        let mut app = filled();
        app.company_name = String::new();
        let err = app.validate(GenerationKind::CoverLetter).unwrap_err();
        assert!(err.to_string().contains("company name"));

        let mut app = filled();
        app.position_title = String::new();
        let err = app.validate(GenerationKind::CoverLetter).unwrap_err();
        assert!(err.to_string().contains("position title"));

        // The enhancement variant does not need job details
        let mut app = filled();
        app.company_name = String::new();
        app.position_title = String::new();
        assert!(app.validate(GenerationKind::EnhancedCv).is_ok());
    }

    #[test]
    fn test_titles_and_stems() {
        let app = filled();
        assert_eq!(
            app.title_for(GenerationKind::CoverLetter),
            "Cover letter for Acme Corporation: Senior Developer"
        );
        assert_eq!(app.title_for(GenerationKind::EnhancedCv), "Enhanced CV");
        assert_eq!(
            app.export_stem(GenerationKind::CoverLetter),
            "cover-letter-acme-corporation"
        );

        let mut app = filled();
        app.company_name = String::new();
        assert_eq!(app.export_stem(GenerationKind::EnhancedCv), "enhanced-cv");
    }

    #[test]
    fn test_partial_draft_deserializes_with_defaults() {
        let app: JobApplication =
            serde_json::from_str(r#"{"cv_content":"just a cv"}"#).unwrap();
        assert_eq!(app.cv_content, "just a cv");
        assert_eq!(app.company_name, "");
    }
}
