//! Template API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{
    MessageTemplate, TemplateCreate, TemplatePreview, TemplatePreviewRequest, TemplateUpdate,
    render_template,
};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db::repository::template;
use crate::utils::validation::{MAX_NAME_LEN, MAX_TEMPLATE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

async fn require(state: &ServerState, id: i64) -> AppResult<MessageTemplate> {
    template::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TemplateNotFound).with_detail("template_id", id))
}

/// GET /api/templates
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MessageTemplate>>> {
    Ok(Json(template::find_all(&state.pool).await?))
}

/// GET /api/templates/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageTemplate>> {
    Ok(Json(require(&state, id).await?))
}

/// POST /api/templates
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TemplateCreate>,
) -> AppResult<Json<MessageTemplate>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.body, "body", MAX_TEMPLATE_LEN)?;
    let created = template::create(&state.pool, payload)
        .await
        .map_err(repo_error(ErrorCode::TemplateNotFound, ErrorCode::TemplateNameExists))?;
    Ok(Json(created))
}

/// PUT /api/templates/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TemplateUpdate>,
) -> AppResult<Json<MessageTemplate>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(body) = &payload.body {
        validate_required_text(body, "body", MAX_TEMPLATE_LEN)?;
    }
    let updated = template::update(&state.pool, id, payload)
        .await
        .map_err(repo_error(ErrorCode::TemplateNotFound, ErrorCode::TemplateNameExists))?;
    Ok(Json(updated))
}

/// DELETE /api/templates/:id
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    require(&state, id).await?;
    Ok(Json(template::delete(&state.pool, id).await?))
}

/// POST /api/templates/:id/preview - render with the supplied variables
pub async fn preview(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<TemplatePreviewRequest>,
) -> AppResult<Json<TemplatePreview>> {
    let tpl = require(&state, id).await?;
    Ok(Json(TemplatePreview {
        rendered: render_template(&tpl.body, &payload.variables),
    }))
}

#[cfg(test)]
mod tests {
    use crate::services::http::testing::{send, test_router};
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn preview_keeps_unknown_placeholders() {
        let router = test_router().await;
        let (status, tpl) = send(
            &router,
            "POST",
            "/api/templates",
            Some(json!({
                "name": "Pickup ready",
                "event": "job_completed",
                "body": "Hi {{customer_name}}, {{vehicle}} is ready. Ref {{job_number}}."
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tpl["is_active"], true);
        let id = tpl["id"].as_i64().unwrap();

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/templates/{id}/preview"),
            Some(json!({ "variables": { "customer_name": "Kiran", "vehicle": "Honda City" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rendered"], "Hi Kiran, Honda City is ready. Ref {{job_number}}.");

        let (status, body) = send(
            &router,
            "POST",
            "/api/templates",
            Some(json!({ "name": "Pickup ready", "event": "custom", "body": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 7202);
    }
}
