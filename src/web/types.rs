// src/web/types.rs

use rocket::form::FromForm;
use rocket::fs::TempFile;
use rocket::http::ContentType;
use rocket::response::{self, Responder};
use rocket::serde::{Deserialize, Serialize};
use rocket::{Request, Response};
use std::path::PathBuf;

use crate::types::{GenerationRecord, JobApplication};

/// Binary download (`.docx` or `.txt`) served as an attachment.
pub struct AttachmentResponse {
    pub data: Vec<u8>,
    pub content_type: ContentType,
    pub filename: String,
}

impl AttachmentResponse {
    pub fn docx(data: Vec<u8>, filename: String) -> Self {
        Self {
            data,
            content_type: ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
            filename,
        }
    }

    pub fn text(data: Vec<u8>, filename: String) -> Self {
        Self {
            data,
            content_type: ContentType::Plain,
            filename,
        }
    }
}

impl<'r> Responder<'r, 'static> for AttachmentResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", self.filename),
            )
            .sized_body(self.data.len(), std::io::Cursor::new(self.data))
            .ok()
    }
}

// ===== Standard envelopes =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

/// Request envelope: the payload fields flattened next to an optional
/// conversation id echoed back in every response.
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

// ===== Request bodies =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub application: JobApplication,
    pub template: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct ExportRequest {
    pub content: String,
    pub kind: String,
    pub filename: Option<String>,
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct SaveKeyRequest {
    pub api_key: String,
}

#[derive(FromForm)]
pub struct DocumentUploadForm<'f> {
    pub file: TempFile<'f>,
}

// ===== Response data =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct GenerationData {
    pub id: Option<String>,
    pub kind: String,
    pub title: String,
    pub content: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DraftData {
    pub draft: Option<JobApplication>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct KeyStatus {
    pub has_key: bool,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ExtractData {
    pub text: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HistoryData {
    pub generations: Vec<GenerationRecord>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TemplatePackInfo {
    pub name: String,
    pub description: String,
}

pub struct ServerConfig {
    pub templates_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_shape() {
        let error = StandardErrorResponse::new(
            "Please enter your Gemini API key first.".to_string(),
            "MISSING_API_KEY".to_string(),
            vec!["Save a key via /api/key/save".to_string()],
            Some("conv-1".to_string()),
        );

        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["success"], false);
        assert_eq!(value["error_code"], "MISSING_API_KEY");
        assert_eq!(value["conversation_id"], "conv-1");
    }

    #[test]
    fn test_request_envelope_flattens_payload() {
        let request: StandardRequest<GenerateRequest> = serde_json::from_str(
            r#"{"cv_content":"cv","company_name":"Acme","position_title":"Dev",
                "job_requirements":"","job_description":"","conversation_id":"c9"}"#,
        )
        .unwrap();

        assert_eq!(request.data.application.company_name, "Acme");
        assert_eq!(request.conversation_id(), Some("c9".to_string()));
        assert!(request.data.template.is_none());
    }
}
