// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::{Context, Result};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use tracing::info;

use crate::core::config_manager::GenerationSettings;
use crate::core::{ConfigManager, Database, GenerationGate};
use crate::types::{GenerationRecord, JobApplication};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Routes

#[post("/generate-letter", data = "<request>")]
pub async fn generate_letter(
    request: Json<StandardRequest<GenerateRequest>>,
    config: &State<ServerConfig>,
    database: &State<Database>,
    settings: &State<GenerationSettings>,
    gate: &State<GenerationGate>,
) -> Result<Json<DataResponse<GenerationData>>, Json<StandardErrorResponse>> {
    handlers::generate_letter_handler(request, config, database, settings, gate).await
}

#[post("/enhance-cv", data = "<request>")]
pub async fn enhance_cv(
    request: Json<StandardRequest<GenerateRequest>>,
    config: &State<ServerConfig>,
    database: &State<Database>,
    settings: &State<GenerationSettings>,
    gate: &State<GenerationGate>,
) -> Result<Json<DataResponse<GenerationData>>, Json<StandardErrorResponse>> {
    handlers::enhance_cv_handler(request, config, database, settings, gate).await
}

#[post("/export/docx", data = "<request>")]
pub async fn export_docx(
    request: Json<StandardRequest<ExportRequest>>,
) -> Result<AttachmentResponse, Json<StandardErrorResponse>> {
    handlers::export_docx_handler(request).await
}

#[post("/export/text", data = "<request>")]
pub async fn export_text(
    request: Json<StandardRequest<ExportRequest>>,
) -> Result<AttachmentResponse, Json<StandardErrorResponse>> {
    handlers::export_text_handler(request).await
}

#[post("/cv/extract", data = "<upload>")]
pub async fn extract_docx(
    upload: Form<DocumentUploadForm<'_>>,
    config: &State<ServerConfig>,
) -> Result<Json<DataResponse<ExtractData>>, Json<StandardErrorResponse>> {
    handlers::extract_docx_handler(upload, config).await
}

#[post("/draft/save", data = "<request>")]
pub async fn save_draft(
    request: Json<StandardRequest<JobApplication>>,
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::save_draft_handler(request, database).await
}

#[get("/draft")]
pub async fn get_draft(
    database: &State<Database>,
) -> Result<Json<DataResponse<DraftData>>, Json<StandardErrorResponse>> {
    handlers::get_draft_handler(database).await
}

#[post("/draft/clear")]
pub async fn clear_draft(
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::clear_draft_handler(database).await
}

#[post("/key/save", data = "<request>")]
pub async fn save_key(
    request: Json<StandardRequest<SaveKeyRequest>>,
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::save_key_handler(request, database).await
}

#[get("/key")]
pub async fn key_status(
    database: &State<Database>,
) -> Result<Json<DataResponse<KeyStatus>>, Json<StandardErrorResponse>> {
    handlers::key_status_handler(database).await
}

#[post("/key/clear")]
pub async fn clear_key(
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::clear_key_handler(database).await
}

#[get("/history?<limit>")]
pub async fn list_history(
    limit: Option<u32>,
    database: &State<Database>,
) -> Result<Json<DataResponse<HistoryData>>, Json<StandardErrorResponse>> {
    handlers::list_history_handler(limit, database).await
}

#[get("/history/<id>")]
pub async fn get_history_entry(
    id: &str,
    database: &State<Database>,
) -> Result<Json<DataResponse<GenerationRecord>>, Json<StandardErrorResponse>> {
    handlers::get_history_entry_handler(id, database).await
}

#[get("/templates")]
pub async fn get_templates(
    config: &State<ServerConfig>,
) -> Json<DataResponse<Vec<TemplatePackInfo>>> {
    handlers::get_templates_handler(config).await
}

#[get("/health")]
pub async fn health(
    database: &State<Database>,
) -> Result<Json<TextResponse>, Json<StandardErrorResponse>> {
    handlers::health_handler(database).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "BAD_REQUEST".to_string(),
        vec!["Verify field names and types".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager, database: Database, port: u16) -> Result<()> {
    let server_config = ServerConfig {
        templates_dir: config.environment.templates_path.clone(),
        output_dir: config.environment.output_path.clone(),
    };

    info!("Starting JobMatch API server on port {}", port);
    info!("Generation model: {}", config.generation.model);

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(server_config)
        .manage(database)
        .manage(config.generation.clone())
        .manage(GenerationGate::new())
        .register("/api", catchers![bad_request, unprocessable, internal_error])
        .mount(
            "/api",
            routes![
                generate_letter,
                enhance_cv,
                export_docx,
                export_text,
                extract_docx,
                save_draft,
                get_draft,
                clear_draft,
                save_key,
                key_status,
                clear_key,
                list_history,
                get_history_entry,
                get_templates,
                health,
                options,
            ],
        )
        .launch()
        .await
        .context("Server failed to launch")?;

    Ok(())
}
