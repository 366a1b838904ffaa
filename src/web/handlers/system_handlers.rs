// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::core::{Database, PromptEngine};
use crate::web::types::{
    DataResponse, HistoryData, StandardErrorResponse, TemplatePackInfo, TextResponse, ServerConfig,
};

pub async fn health_handler(
    database: &State<Database>,
) -> Result<Json<TextResponse>, Json<StandardErrorResponse>> {
    if let Err(e) = database.health_check().await {
        error!("Health check failed: {}", e);
        return Err(Json(StandardErrorResponse::new(
            "Database unavailable".to_string(),
            "INTERNAL_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            None,
        )));
    }

    Ok(Json(TextResponse::success("OK".to_string(), None)))
}

pub async fn get_templates_handler(
    config: &State<ServerConfig>,
) -> Json<DataResponse<Vec<TemplatePackInfo>>> {
    // The built-in templates are always available
    let mut templates = vec![TemplatePackInfo {
        name: "default".to_string(),
        description: "Built-in cover letter and CV rewrite prompts".to_string(),
    }];

    match PromptEngine::new(config.templates_dir.clone()) {
        Ok(engine) => {
            templates.extend(engine.list_packs().iter().map(|pack| TemplatePackInfo {
                name: pack.id.clone(),
                description: pack
                    .manifest
                    .description
                    .clone()
                    .unwrap_or_else(|| pack.manifest.name.clone()),
            }));
        }
        Err(e) => {
            error!("Failed to initialize prompt templates: {}", e);
        }
    }

    Json(DataResponse::success(
        "Available prompt templates".to_string(),
        templates,
        None,
    ))
}

pub async fn list_history_handler(
    limit: Option<u32>,
    database: &State<Database>,
) -> Result<Json<DataResponse<HistoryData>>, Json<StandardErrorResponse>> {
    let generations = database
        .generations()
        .list(limit.unwrap_or(20))
        .await
        .map_err(|e| {
            error!("Failed to list generation history: {}", e);
            Json(StandardErrorResponse::new(
                "Failed to list generation history".to_string(),
                "STORAGE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                None,
            ))
        })?;

    Ok(Json(DataResponse::success(
        "Generation history".to_string(),
        HistoryData { generations },
        None,
    )))
}

pub async fn get_history_entry_handler(
    id: &str,
    database: &State<Database>,
) -> Result<Json<DataResponse<crate::types::GenerationRecord>>, Json<StandardErrorResponse>> {
    let record = database.generations().get(id).await.map_err(|e| {
        error!("Failed to read generation {}: {}", id, e);
        Json(StandardErrorResponse::new(
            "Failed to read generation history".to_string(),
            "STORAGE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            None,
        ))
    })?;

    match record {
        Some(record) => Ok(Json(DataResponse::success(
            "Generation found".to_string(),
            record,
            None,
        ))),
        None => Err(Json(StandardErrorResponse::new(
            format!("No generation with id: {}", id),
            "NOT_FOUND".to_string(),
            vec!["List /api/history for valid ids".to_string()],
            None,
        ))),
    }
}
