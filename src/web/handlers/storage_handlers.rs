// src/web/handlers/storage_handlers.rs
//! Draft and API-key storage. Values are written verbatim and only ever
//! change on direct user action.

use rocket::serde::json::Json;
use rocket::State;
use tracing::error;

use crate::core::database::{API_KEY_STORAGE_KEY, FORM_DATA_KEY};
use crate::core::Database;
use crate::types::JobApplication;
use crate::web::types::{
    ActionResponse, DataResponse, DraftData, KeyStatus, SaveKeyRequest, StandardErrorResponse,
    StandardRequest, WithConversationId,
};

fn storage_error(
    context: &str,
    e: anyhow::Error,
    conversation_id: Option<String>,
) -> Json<StandardErrorResponse> {
    error!("{}: {}", context, e);
    Json(StandardErrorResponse::new(
        context.to_string(),
        "STORAGE_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
        conversation_id,
    ))
}

pub async fn save_draft_handler(
    request: Json<StandardRequest<JobApplication>>,
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();

    let serialized = match serde_json::to_string(&request.data) {
        Ok(serialized) => serialized,
        Err(e) => {
            return Err(storage_error(
                "Failed to serialize draft",
                e.into(),
                conversation_id,
            ))
        }
    };

    database
        .storage()
        .set(FORM_DATA_KEY, &serialized)
        .await
        .map_err(|e| storage_error("Failed to save draft", e, conversation_id.clone()))?;

    Ok(Json(ActionResponse::success(
        "Draft saved".to_string(),
        "draft_saved".to_string(),
        conversation_id,
    )))
}

pub async fn get_draft_handler(
    database: &State<Database>,
) -> Result<Json<DataResponse<DraftData>>, Json<StandardErrorResponse>> {
    let stored = database
        .storage()
        .get(FORM_DATA_KEY)
        .await
        .map_err(|e| storage_error("Failed to read draft", e, None))?;

    let draft = match stored {
        Some(value) => match serde_json::from_str::<JobApplication>(&value) {
            Ok(draft) => Some(draft),
            Err(e) => {
                return Err(storage_error(
                    "Stored draft could not be parsed",
                    e.into(),
                    None,
                ))
            }
        },
        None => None,
    };

    Ok(Json(DataResponse::success(
        "Draft loaded".to_string(),
        DraftData { draft },
        None,
    )))
}

pub async fn clear_draft_handler(
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let removed = database
        .storage()
        .remove(FORM_DATA_KEY)
        .await
        .map_err(|e| storage_error("Failed to clear draft", e, None))?;

    let message = if removed {
        "Draft cleared"
    } else {
        "No draft was stored"
    };

    Ok(Json(ActionResponse::success(
        message.to_string(),
        "draft_cleared".to_string(),
        None,
    )))
}

pub async fn save_key_handler(
    request: Json<StandardRequest<SaveKeyRequest>>,
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let conversation_id = request.conversation_id();

    if request.data.api_key.trim().is_empty() {
        return Err(Json(StandardErrorResponse::new(
            "API key is required".to_string(),
            "MISSING_API_KEY".to_string(),
            vec!["Provide a non-empty api_key".to_string()],
            conversation_id,
        )));
    }

    database
        .storage()
        .set(API_KEY_STORAGE_KEY, &request.data.api_key)
        .await
        .map_err(|e| storage_error("Failed to save API key", e, conversation_id.clone()))?;

    Ok(Json(ActionResponse::success(
        "API key saved".to_string(),
        "key_saved".to_string(),
        conversation_id,
    )))
}

/// Reports presence only; the key itself is never echoed back.
pub async fn key_status_handler(
    database: &State<Database>,
) -> Result<Json<DataResponse<KeyStatus>>, Json<StandardErrorResponse>> {
    let has_key = database
        .storage()
        .contains(API_KEY_STORAGE_KEY)
        .await
        .map_err(|e| storage_error("Failed to read API key status", e, None))?;

    Ok(Json(DataResponse::success(
        "API key status".to_string(),
        KeyStatus { has_key },
        None,
    )))
}

pub async fn clear_key_handler(
    database: &State<Database>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let removed = database
        .storage()
        .remove(API_KEY_STORAGE_KEY)
        .await
        .map_err(|e| storage_error("Failed to clear API key", e, None))?;

    let message = if removed {
        "API key removed"
    } else {
        "No API key was stored"
    };

    Ok(Json(ActionResponse::success(
        message.to_string(),
        "key_cleared".to_string(),
        None,
    )))
}
