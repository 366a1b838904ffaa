// src/web/handlers/export_handlers.rs
//! Document export and `.docx` text extraction

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::docx;
use crate::types::GenerationKind;
use crate::web::types::{
    AttachmentResponse, DataResponse, DocumentUploadForm, ExportRequest, ExtractData,
    ServerConfig, StandardErrorResponse, StandardRequest, WithConversationId,
};

fn parse_kind(
    value: &str,
    conversation_id: Option<String>,
) -> Result<GenerationKind, Json<StandardErrorResponse>> {
    GenerationKind::parse(value).ok_or_else(|| {
        Json(StandardErrorResponse::new(
            format!("Unknown document kind: {}", value),
            "INVALID_KIND".to_string(),
            vec!["Use 'cover_letter' or 'enhanced_cv'".to_string()],
            conversation_id,
        ))
    })
}

fn filename_stem(request: &ExportRequest, kind: GenerationKind) -> String {
    request
        .filename
        .as_deref()
        .map(|name| name.replace(['/', '\\'], "-"))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| {
            match kind {
                GenerationKind::CoverLetter => "cover-letter",
                GenerationKind::EnhancedCv => "enhanced-cv",
            }
            .to_string()
        })
}

pub async fn export_docx_handler(
    request: Json<StandardRequest<ExportRequest>>,
) -> Result<AttachmentResponse, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let kind = parse_kind(&request.data.kind, conversation_id.clone())?;
    let stem = filename_stem(&request.data, kind);

    match docx::document_for(kind, &request.data.content) {
        Ok(data) => {
            info!(kind = %kind, size = data.len(), "Document export completed");
            Ok(AttachmentResponse::docx(data, format!("{}.docx", stem)))
        }
        Err(e) => {
            error!("Document export failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                "Failed to create document.".to_string(),
                "EXPORT_FAILED".to_string(),
                vec!["Try the plain-text export instead".to_string()],
                conversation_id,
            )))
        }
    }
}

pub async fn export_text_handler(
    request: Json<StandardRequest<ExportRequest>>,
) -> Result<AttachmentResponse, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let kind = parse_kind(&request.data.kind, conversation_id)?;
    let stem = filename_stem(&request.data, kind);

    Ok(AttachmentResponse::text(
        request.data.content.clone().into_bytes(),
        format!("{}.txt", stem),
    ))
}

pub async fn extract_docx_handler(
    mut upload: Form<DocumentUploadForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ExtractData>>, Json<StandardErrorResponse>> {
    let original_filename = upload
        .file
        .raw_name()
        .and_then(|n| n.as_str())
        .unwrap_or("uploaded_cv.docx")
        .to_string();

    if crate::utils::validate_file_extension(&original_filename, &["docx"]).is_err() {
        return Err(Json(StandardErrorResponse::new(
            "Please upload a .docx file.".to_string(),
            "INVALID_FORMAT".to_string(),
            vec!["Only Word documents (.docx) are supported".to_string()],
            None,
        )));
    }

    // TempFile may live in memory; persist it before reading.
    let temp_path = config
        .output_dir
        .join(format!("upload_{}.docx", Uuid::new_v4()));

    if let Err(e) = upload.file.persist_to(&temp_path).await {
        error!("Failed to persist uploaded file: {}", e);
        return Err(Json(StandardErrorResponse::new(
            "Failed to process the file. Please try again.".to_string(),
            "EXTRACT_FAILED".to_string(),
            vec!["Retry the upload".to_string()],
            None,
        )));
    }

    let bytes = tokio::fs::read(&temp_path).await;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to clean up temp upload {}: {}", temp_path.display(), e);
    }

    let bytes = match bytes {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read uploaded file: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Failed to process the file. Please try again.".to_string(),
                "EXTRACT_FAILED".to_string(),
                vec!["Retry the upload".to_string()],
                None,
            )));
        }
    };

    match docx::extract_text(&bytes) {
        Ok(text) => {
            info!(
                file = %original_filename,
                characters = text.len(),
                "Extracted text from uploaded document"
            );
            Ok(Json(DataResponse::success(
                "Text extracted from document".to_string(),
                ExtractData { text },
                None,
            )))
        }
        Err(e) => {
            error!("Text extraction failed for {}: {}", original_filename, e);
            Err(Json(StandardErrorResponse::new(
                "Failed to extract text from the document.".to_string(),
                "EXTRACT_FAILED".to_string(),
                vec!["Check that the file is a valid .docx".to_string()],
                None,
            )))
        }
    }
}
