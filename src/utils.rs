// src/utils.rs
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Turn a company name into a filename slug: lowercased, whitespace runs
/// collapsed to single dashes.
pub fn company_slug(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Build a timestamped output file path so repeated exports never clobber
/// each other.
pub fn output_file_path(base: &Path, stem: &str, extension: &str) -> PathBuf {
    base.join(format!(
        "{}_{}.{}",
        stem,
        chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        extension
    ))
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Validate file extension against allowed types
pub fn validate_file_extension(filename: &str, allowed: &[&str]) -> Result<()> {
    let ext = get_file_extension(filename)
        .ok_or_else(|| anyhow::anyhow!("File has no extension: {}", filename))?;

    if !allowed.contains(&ext.as_str()) {
        anyhow::bail!(
            "Unsupported file extension: {}. Allowed: {:?}",
            ext,
            allowed
        );
    }

    Ok(())
}

/// Resolve a CLI text argument: a value starting with `@` is read from the
/// named file, anything else is taken verbatim.
pub async fn read_text_argument(value: &str) -> Result<String> {
    if let Some(path) = value.strip_prefix('@') {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path))
    } else {
        Ok(value.to_string())
    }
}

/// Ensure directory exists
pub async fn ensure_directory(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_slug() {
        assert_eq!(company_slug("Acme Corporation"), "acme-corporation");
        assert_eq!(company_slug("  Big   Tech  "), "big-tech");
        assert_eq!(company_slug(""), "");
    }

    #[test]
    fn test_output_file_path() {
        let path = output_file_path(Path::new("out"), "cover-letter-acme", "docx");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("cover-letter-acme_"));
        assert!(name.ends_with(".docx"));
    }

    #[test]
    fn test_get_file_extension() {
        assert_eq!(get_file_extension("resume.docx"), Some("docx".to_string()));
        assert_eq!(get_file_extension("resume.DOCX"), Some("docx".to_string()));
        assert_eq!(get_file_extension("noext"), None);
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("resume.docx", &["docx"]).is_ok());
        assert!(validate_file_extension("resume.pdf", &["docx"]).is_err());
        assert!(validate_file_extension("noext", &["docx"]).is_err());
    }

    #[tokio::test]
    async fn test_read_text_argument_inline() {
        assert_eq!(
            read_text_argument("plain text").await.unwrap(),
            "plain text"
        );
        assert!(read_text_argument("@/no/such/file.txt").await.is_err());
    }
}
