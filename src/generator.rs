// src/generator.rs
//! Generation orchestration: validate the record, render the prompt, make
//! the single outbound call

use anyhow::{Context, Result};
use tracing::info;

use crate::core::{GeminiClient, PromptEngine};
use crate::types::{GenerationKind, JobApplication};

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub kind: GenerationKind,
    pub title: String,
    pub content: String,
}

pub struct LetterGenerator {
    prompts: PromptEngine,
    client: GeminiClient,
}

impl LetterGenerator {
    pub fn new(prompts: PromptEngine, client: GeminiClient) -> Self {
        Self { prompts, client }
    }

    /// Generate a tailored cover letter for the application.
    pub async fn generate_cover_letter(
        &self,
        application: &JobApplication,
        template: Option<&str>,
    ) -> Result<GenerationResult> {
        self.generate(GenerationKind::CoverLetter, application, template)
            .await
    }

    /// Rewrite the résumé against the job's requirements.
    pub async fn enhance_cv(
        &self,
        application: &JobApplication,
        template: Option<&str>,
    ) -> Result<GenerationResult> {
        self.generate(GenerationKind::EnhancedCv, application, template)
            .await
    }

    async fn generate(
        &self,
        kind: GenerationKind,
        application: &JobApplication,
        template: Option<&str>,
    ) -> Result<GenerationResult> {
        application.validate(kind)?;

        let prompt = self
            .prompts
            .render(kind, application, template)
            .context("Failed to build prompt")?;

        info!(kind = %kind, company = %application.company_name, "Starting generation");

        let content = self.client.generate(&prompt).await?;

        info!(kind = %kind, length = content.len(), "Generation completed");

        Ok(GenerationResult {
            kind,
            title: application.title_for(kind),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config_manager::GenerationSettings;
    use std::path::PathBuf;

    fn generator() -> LetterGenerator {
        let prompts = PromptEngine::new(PathBuf::from("/nonexistent/templates")).unwrap();
        let client =
            GeminiClient::new("test-key".to_string(), &GenerationSettings::default()).unwrap();
        LetterGenerator::new(prompts, client)
    }

    #[tokio::test]
    async fn test_validation_failures_never_reach_the_network() {
        let empty = JobApplication::default();

        let err = generator()
            .generate_cover_letter(&empty, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("CV/resume content"));

        let err = generator().enhance_cv(&empty, None).await.unwrap_err();
        assert!(err.to_string().contains("CV/resume content"));
    }

    #[tokio::test]
    async fn test_unknown_template_pack_fails_before_the_call() {
        let application = JobApplication {
            cv_content: "cv".to_string(),
            company_name: "Acme".to_string(),
            position_title: "Dev".to_string(),
            ..Default::default()
        };

        let err = generator()
            .generate_cover_letter(&application, Some("missing-pack"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to build prompt"));
    }
}
