// src/web/handlers/generate_handlers.rs
//! Cover-letter generation and résumé rewriting

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

use crate::core::config_manager::GenerationSettings;
use crate::core::database::API_KEY_STORAGE_KEY;
use crate::core::{Database, GeminiClient, GenerationGate, PromptEngine};
use crate::generator::LetterGenerator;
use crate::types::GenerationKind;
use crate::web::types::{
    DataResponse, GenerateRequest, GenerationData, ServerConfig, StandardErrorResponse,
    StandardRequest, WithConversationId,
};

pub async fn generate_letter_handler(
    request: Json<StandardRequest<GenerateRequest>>,
    config: &State<ServerConfig>,
    database: &State<Database>,
    settings: &State<GenerationSettings>,
    gate: &State<GenerationGate>,
) -> Result<Json<DataResponse<GenerationData>>, Json<StandardErrorResponse>> {
    run_generation(
        GenerationKind::CoverLetter,
        request,
        config,
        database,
        settings,
        gate,
    )
    .await
}

pub async fn enhance_cv_handler(
    request: Json<StandardRequest<GenerateRequest>>,
    config: &State<ServerConfig>,
    database: &State<Database>,
    settings: &State<GenerationSettings>,
    gate: &State<GenerationGate>,
) -> Result<Json<DataResponse<GenerationData>>, Json<StandardErrorResponse>> {
    run_generation(
        GenerationKind::EnhancedCv,
        request,
        config,
        database,
        settings,
        gate,
    )
    .await
}

async fn run_generation(
    kind: GenerationKind,
    request: Json<StandardRequest<GenerateRequest>>,
    config: &State<ServerConfig>,
    database: &State<Database>,
    settings: &State<GenerationSettings>,
    gate: &State<GenerationGate>,
) -> Result<Json<DataResponse<GenerationData>>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();
    let application = &request.data.application;

    let api_key = match database.storage().get(API_KEY_STORAGE_KEY).await {
        Ok(Some(key)) if !key.trim().is_empty() => key,
        Ok(_) => {
            return Err(Json(StandardErrorResponse::new(
                "Please enter your Gemini API key first.".to_string(),
                "MISSING_API_KEY".to_string(),
                vec!["Save a key via /api/key/save".to_string()],
                conversation_id,
            )))
        }
        Err(e) => {
            error!("Failed to read API key from storage: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Failed to read stored API key".to_string(),
                "STORAGE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                conversation_id,
            )));
        }
    };

    if let Err(e) = application.validate(kind) {
        return Err(Json(StandardErrorResponse::new(
            e.to_string(),
            "MISSING_FIELD".to_string(),
            vec!["Fill in the required fields and retry".to_string()],
            conversation_id,
        )));
    }

    // One outstanding request at a time; both variants share the gate.
    let Some(_permit) = gate.try_acquire() else {
        return Err(Json(StandardErrorResponse::new(
            "A generation is already in progress.".to_string(),
            "GENERATION_BUSY".to_string(),
            vec!["Wait for the current generation to finish".to_string()],
            conversation_id,
        )));
    };

    let prompts = match PromptEngine::new(config.templates_dir.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Failed to initialize prompt templates: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Prompt template initialization failed".to_string(),
                "TEMPLATE_INIT_ERROR".to_string(),
                vec!["Check the templates directory".to_string()],
                conversation_id,
            )));
        }
    };

    let client = match GeminiClient::new(api_key, settings) {
        Ok(client) => client,
        Err(e) => {
            return Err(Json(StandardErrorResponse::new(
                format!("Generation client initialization failed: {}", e),
                "SERVICE_INIT_FAILED".to_string(),
                vec!["Check the configured endpoint settings".to_string()],
                conversation_id,
            )))
        }
    };

    let generator = LetterGenerator::new(prompts, client);
    let template = request.data.template.as_deref();

    let result = match kind {
        GenerationKind::CoverLetter => generator.generate_cover_letter(application, template).await,
        GenerationKind::EnhancedCv => generator.enhance_cv(application, template).await,
    };

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            error!("Generation failed, kind: {}, error: {}", kind, e);
            return Err(Json(StandardErrorResponse::new(
                e.to_string(),
                "GENERATION_FAILED".to_string(),
                vec![
                    "Verify the API key is valid".to_string(),
                    "Try again in a few moments".to_string(),
                ],
                conversation_id,
            )));
        }
    };

    // The result is already paid for; a history failure only costs the id.
    let history_id = match database
        .generations()
        .record(kind, application, &result.content)
        .await
    {
        Ok(record) => Some(record.id),
        Err(e) => {
            warn!("Failed to record generation history: {}", e);
            None
        }
    };

    info!(kind = %kind, "Generation request completed");

    let message = match kind {
        GenerationKind::CoverLetter => "Your cover letter has been successfully created.",
        GenerationKind::EnhancedCv => "Your CV has been successfully updated.",
    };

    Ok(Json(DataResponse::success(
        message.to_string(),
        GenerationData {
            id: history_id,
            kind: kind.as_str().to_string(),
            title: result.title,
            content: result.content,
        },
        conversation_id,
    )))
}
