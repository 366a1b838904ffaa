// src/core/prompt_engine.rs
//! Prompt construction: fixed templates, optional on-disk packs,
//! `{{var}}` substitution

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::{GenerationKind, JobApplication};

const COVER_LETTER_TEMPLATE: &str = r#"
Generate a cover letter using:
- My qualifications: {{cv_content}}
- For {{position_title}} at {{company_name}}
- Job requirements: {{job_requirements}}
- Job description: {{job_description}}

Output should be professional and tailored to this specific role.
Format it with a proper salutation, body paragraphs, and closing.
Include a title: "Cover letter for {{company_name}}: {{position_title}}"
"#;

const ENHANCE_CV_TEMPLATE: &str = r#"
Generate an updated CV using:
- My current CV: {{cv_content}}
- Job requirements: {{job_requirements}}
- Job description: {{job_description}}

Output should be professional and tailored to this specific role.
Reorder and highlight skills to match the job requirements.
Keep the same basic structure but emphasize relevant experience and skills.
DO NOT invent new experience or qualifications that aren't in the original CV.
"#;

const COVER_LETTER_FILE: &str = "cover_letter.txt";
const ENHANCE_CV_FILE: &str = "enhance_cv.txt";

// ===== Template pack models =====

#[derive(Debug, Clone)]
pub struct TemplatePack {
    pub id: String,
    pub path: PathBuf,
    pub manifest: PackManifest,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PackManifest {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
}

// ===== Engine =====

pub struct PromptEngine {
    templates_dir: PathBuf,
    packs: Vec<TemplatePack>,
}

impl PromptEngine {
    /// Create a new engine, discovering packs under the templates
    /// directory. A missing directory just means built-ins only.
    pub fn new(templates_dir: PathBuf) -> Result<Self> {
        let mut engine = Self {
            templates_dir,
            packs: Vec::new(),
        };
        engine.discover_packs()?;
        Ok(engine)
    }

    fn discover_packs(&mut self) -> Result<()> {
        self.packs.clear();

        if !self.templates_dir.exists() {
            warn!(
                "Templates directory does not exist: {}",
                self.templates_dir.display()
            );
            return Ok(());
        }

        let entries = std::fs::read_dir(&self.templates_dir).with_context(|| {
            format!(
                "Failed to read templates directory: {}",
                self.templates_dir.display()
            )
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();

            if path.is_dir() {
                if let Some(pack_id) = path.file_name().and_then(|n| n.to_str()) {
                    match Self::load_pack(pack_id, &path) {
                        Ok(pack) => self.packs.push(pack),
                        Err(e) => warn!("Failed to load template pack {}: {}", pack_id, e),
                    }
                }
            }
        }

        info!("Discovered {} template packs", self.packs.len());
        Ok(())
    }

    fn load_pack(pack_id: &str, pack_path: &Path) -> Result<TemplatePack> {
        let manifest_path = pack_path.join("manifest.toml");

        let manifest = if manifest_path.exists() {
            let content = std::fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read manifest: {}", manifest_path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse manifest: {}", manifest_path.display()))?
        } else {
            PackManifest {
                name: pack_id.to_string(),
                description: None,
                author: None,
                version: None,
            }
        };

        Ok(TemplatePack {
            id: pack_id.to_string(),
            path: pack_path.to_path_buf(),
            manifest,
        })
    }

    pub fn list_packs(&self) -> &[TemplatePack] {
        &self.packs
    }

    pub fn get_pack(&self, pack_id: &str) -> Option<&TemplatePack> {
        self.packs.iter().find(|p| p.id == pack_id)
    }

    /// Render the prompt for a generation variant. When a pack is named it
    /// must exist; a pack without the variant's body file falls back to
    /// the built-in template.
    pub fn render(
        &self,
        kind: GenerationKind,
        application: &JobApplication,
        pack_id: Option<&str>,
    ) -> Result<String> {
        let template = self.template_body(kind, pack_id)?;
        Ok(Self::process_variables(
            &template,
            &Self::variables(application),
        ))
    }

    fn template_body(&self, kind: GenerationKind, pack_id: Option<&str>) -> Result<String> {
        let (builtin, file_name) = match kind {
            GenerationKind::CoverLetter => (COVER_LETTER_TEMPLATE, COVER_LETTER_FILE),
            GenerationKind::EnhancedCv => (ENHANCE_CV_TEMPLATE, ENHANCE_CV_FILE),
        };

        let Some(pack_id) = pack_id else {
            return Ok(builtin.to_string());
        };

        let pack = self.get_pack(pack_id).ok_or_else(|| {
            anyhow::anyhow!(
                "Template pack '{}' not found. Available packs: {:?}",
                pack_id,
                self.packs.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
            )
        })?;

        let body_path = pack.path.join(file_name);
        if body_path.exists() {
            std::fs::read_to_string(&body_path)
                .with_context(|| format!("Failed to read template: {}", body_path.display()))
        } else {
            Ok(builtin.to_string())
        }
    }

    fn variables(application: &JobApplication) -> HashMap<String, String> {
        HashMap::from([
            ("cv_content".to_string(), application.cv_content.clone()),
            ("company_name".to_string(), application.company_name.clone()),
            (
                "position_title".to_string(),
                application.position_title.clone(),
            ),
            (
                "job_requirements".to_string(),
                application.job_requirements.clone(),
            ),
            (
                "job_description".to_string(),
                application.job_description.clone(),
            ),
        ])
    }

    /// Process template variables in content (supports both {{var}} and ${var} syntax)
    pub fn process_variables(content: &str, variables: &HashMap<String, String>) -> String {
        let mut result = content.to_string();
        for (key, value) in variables {
            let placeholder_mustache = format!("{{{{{}}}}}", key);
            let placeholder_shell = format!("${{{}}}", key);
            result = result.replace(&placeholder_mustache, value);
            result = result.replace(&placeholder_shell, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> JobApplication {
        JobApplication {
            cv_content: "Rust since 2015".to_string(),
            company_name: "Acme".to_string(),
            position_title: "Senior Developer".to_string(),
            job_requirements: "Systems experience".to_string(),
            job_description: "Build the platform".to_string(),
        }
    }

    fn engine() -> PromptEngine {
        PromptEngine::new(PathBuf::from("/nonexistent/templates")).unwrap()
    }

    #[test]
    fn test_process_variables_both_syntaxes() {
        let variables = HashMap::from([("company_name".to_string(), "Acme".to_string())]);
        assert_eq!(
            PromptEngine::process_variables("at {{company_name}} / ${company_name}", &variables),
            "at Acme / Acme"
        );
    }

    #[test]
    fn test_cover_letter_prompt_interpolates_all_fields() {
        let prompt = engine()
            .render(GenerationKind::CoverLetter, &application(), None)
            .unwrap();

        assert!(prompt.contains("My qualifications: Rust since 2015"));
        assert!(prompt.contains("For Senior Developer at Acme"));
        assert!(prompt.contains("Job requirements: Systems experience"));
        assert!(prompt.contains("Job description: Build the platform"));
        assert!(prompt.contains(r#""Cover letter for Acme: Senior Developer""#));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_enhance_prompt_keeps_guardrail_line() {
        let prompt = engine()
            .render(GenerationKind::EnhancedCv, &application(), None)
            .unwrap();

        assert!(prompt.contains("My current CV: Rust since 2015"));
        assert!(prompt.contains("DO NOT invent new experience"));
    }

    #[test]
    fn test_missing_templates_dir_lists_no_packs() {
        assert!(engine().list_packs().is_empty());
    }

    #[test]
    fn test_unknown_pack_is_an_error() {
        let err = engine()
            .render(GenerationKind::CoverLetter, &application(), Some("formal"))
            .unwrap_err();
        assert!(err.to_string().contains("'formal' not found"));
    }
}
