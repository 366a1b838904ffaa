// src/docx.rs
//! Plain-text to word-processor conversion and back.
//!
//! Line classification is heuristic: newline-split paragraphs, a fixed-size
//! contact block at the top of letters, uppercase-colon or `# ` headings,
//! `•`/`-` bullets.

use anyhow::{Context, Result};
use docx_rs::{
    read_docx, AbstractNumbering, AlignmentType, Docx, DocumentChild, IndentLevel, Level, LevelJc,
    LevelText, LineSpacing, NumberFormat, Numbering, NumberingId, Paragraph, ParagraphChild, Run,
    RunChild, Start, Style, StyleType,
};

use crate::types::GenerationKind;

/// Paragraphs at the top of a letter treated as the contact block.
const CONTACT_BLOCK_PARAGRAPHS: usize = 5;
/// Spacing after each paragraph, in twips.
const PARAGRAPH_SPACING: u32 = 200;
const BULLET_NUMBERING: usize = 1;

/// Build the `.docx` bytes for a generated document, using the layout
/// matching its kind.
pub fn document_for(kind: GenerationKind, content: &str) -> Result<Vec<u8>> {
    match kind {
        GenerationKind::CoverLetter => letter_document(content),
        GenerationKind::EnhancedCv => resume_document(content),
    }
}

/// Résumé layout: uppercase-colon and `# ` lines become bold headings.
pub fn resume_document(content: &str) -> Result<Vec<u8>> {
    let mut docx = base_document();

    for para in paragraphs(content) {
        let heading = is_heading(para);
        let run = if heading {
            Run::new().add_text(para).bold()
        } else {
            Run::new().add_text(para)
        };

        let mut paragraph = Paragraph::new()
            .add_run(run)
            .line_spacing(LineSpacing::new().after(PARAGRAPH_SPACING));
        if heading {
            paragraph = paragraph.style("Heading2");
        }

        docx = docx.add_paragraph(paragraph);
    }

    pack(docx)
}

/// Cover-letter layout: right-aligned contact block, bold opening line,
/// bullet items.
pub fn letter_document(content: &str) -> Result<Vec<u8>> {
    let mut docx = base_document();

    for (index, para) in paragraphs(content).into_iter().enumerate() {
        let contact_info = index < CONTACT_BLOCK_PARAGRAPHS;
        let bullet = is_bullet(para);

        let run = if index == 0 {
            Run::new().add_text(para).bold()
        } else {
            Run::new().add_text(para)
        };

        let mut paragraph = Paragraph::new()
            .add_run(run)
            .align(if contact_info {
                AlignmentType::Right
            } else {
                AlignmentType::Left
            })
            .line_spacing(LineSpacing::new().after(PARAGRAPH_SPACING));

        if bullet {
            paragraph = paragraph.numbering(
                NumberingId::new(BULLET_NUMBERING),
                IndentLevel::new(0),
            );
        }

        docx = docx.add_paragraph(paragraph);
    }

    pack(docx)
}

/// Extract the plain text of an uploaded `.docx`, one line per paragraph.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let docx =
        read_docx(bytes).map_err(|e| anyhow::anyhow!("Failed to extract text from the document: {}", e))?;

    let mut lines = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for para_child in paragraph.children {
                if let ParagraphChild::Run(run) = para_child {
                    for run_child in run.children {
                        match run_child {
                            RunChild::Text(text) => line.push_str(&text.text),
                            RunChild::Tab(_) => line.push('\t'),
                            _ => {}
                        }
                    }
                }
            }
            lines.push(line);
        }
    }

    Ok(lines.join("\n"))
}

fn base_document() -> Docx {
    Docx::new()
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(28)
                .bold(),
        )
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING).add_level(Level::new(
            0,
            Start::new(1),
            NumberFormat::new("bullet"),
            LevelText::new("•"),
            LevelJc::new("left"),
        )))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
}

fn pack(mut docx: Docx) -> Result<Vec<u8>> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .context("Failed to create document")?;
    Ok(cursor.into_inner())
}

fn paragraphs(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .filter(|para| !para.trim().is_empty())
        .collect()
}

/// A heading is `# `-prefixed or an uppercase line ending in a colon,
/// e.g. `WORK EXPERIENCE:`.
fn is_heading(para: &str) -> bool {
    if para.starts_with("# ") {
        return true;
    }
    match para.strip_suffix(':') {
        Some(prefix) => {
            !prefix.is_empty()
                && prefix
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_whitespace())
        }
        None => false,
    }
}

fn is_bullet(para: &str) -> bool {
    let trimmed = para.trim();
    trimmed.starts_with('•') || trimmed.starts_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_heading() {
        assert!(is_heading("WORK EXPERIENCE:"));
        assert!(is_heading("SKILLS:"));
        assert!(is_heading("# Education"));
        assert!(!is_heading("Work experience:"));
        assert!(!is_heading("WORK EXPERIENCE"));
        assert!(!is_heading(":"));
        assert!(!is_heading("Managed a team of 5"));
    }

    #[test]
    fn test_is_bullet() {
        assert!(is_bullet("• Shipped the thing"));
        assert!(is_bullet("  - Shipped the thing"));
        assert!(!is_bullet("Shipped the thing"));
    }

    #[test]
    fn test_paragraphs_drop_blank_lines() {
        assert_eq!(
            paragraphs("first\n\n   \nsecond\n"),
            vec!["first", "second"]
        );
    }

    #[test]
    fn test_resume_document_round_trips_text() {
        let content = "EXPERIENCE:\nBuilt a storage engine\nSKILLS:\nRust";
        let bytes = resume_document(content).unwrap();
        let text = extract_text(&bytes).unwrap();

        assert!(text.contains("EXPERIENCE:"));
        assert!(text.contains("Built a storage engine"));
        assert!(text.contains("Rust"));
    }

    #[test]
    fn test_letter_document_keeps_every_paragraph() {
        let content = "Jane Doe\njane@example.com\n555-0100\nCity\nDate\nDear hiring manager,\n• Ten years of Rust\nSincerely,\nJane";
        let bytes = letter_document(content).unwrap();
        let text = extract_text(&bytes).unwrap();

        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Dear hiring manager,"));
        assert!(text.contains("• Ten years of Rust"));
    }

    #[test]
    fn test_empty_content_builds_an_empty_document() {
        let bytes = document_for(GenerationKind::EnhancedCv, "").unwrap();
        assert_eq!(extract_text(&bytes).unwrap(), "");
    }
}
