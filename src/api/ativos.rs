//! Asset CRUD endpoints.
//!
//! Every query filters by the authenticated user's id; a row owned by someone
//! else is answered exactly like a missing row.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{Ativo, AtualizarAtivoRequest, CriarAtivoRequest};
use crate::AppState;

use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_descricao, validate_nome_ativo, validate_uuid, MAX_DESCRICAO_ATIVO,
};

/// Normalize an optional text field: trim, and treat empty as cleared.
fn normalize_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_create_request(req: &CriarAtivoRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_nome_ativo(&req.nome) {
        errors.add("nome", e);
    }
    if let Err(e) = validate_descricao(&req.descricao, MAX_DESCRICAO_ATIVO) {
        errors.add("descricao", e);
    }

    errors.finish()
}

fn validate_update_request(req: &AtualizarAtivoRequest) -> Result<(), ApiError> {
    if req.nome.is_none() && req.descricao.is_none() {
        return Err(ApiError::validation_field("body", "No fields to update"));
    }

    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref nome) = req.nome {
        if let Err(e) = validate_nome_ativo(nome) {
            errors.add("nome", e);
        }
    }
    if let Err(e) = validate_descricao(&req.descricao, MAX_DESCRICAO_ATIVO) {
        errors.add("descricao", e);
    }

    errors.finish()
}

/// List the user's assets, newest first
///
/// GET /api/ativos
pub async fn listar_ativos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Vec<Ativo>>, ApiError> {
    let ativos = sqlx::query_as::<_, Ativo>(
        "SELECT * FROM ativos WHERE usuario_id = ? ORDER BY created_at DESC",
    )
    .bind(&user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ativos))
}

/// Fetch one owned asset
///
/// GET /api/ativos/:id
pub async fn buscar_ativo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Ativo>, ApiError> {
    if let Err(e) = validate_uuid(&id, "ativo_id") {
        return Err(ApiError::validation_field("ativo_id", e));
    }

    let ativo = fetch_owned_ativo(&state, &id, &user.id).await?;

    Ok(Json(ativo))
}

/// Create an asset
///
/// POST /api/ativos
pub async fn criar_ativo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CriarAtivoRequest>,
) -> Result<(StatusCode, Json<Ativo>), ApiError> {
    validate_create_request(&req)?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO ativos (id, nome, descricao, usuario_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(req.nome.trim())
    .bind(normalize_opt(&req.descricao))
    .bind(&user.id)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let ativo = fetch_owned_ativo(&state, &id, &user.id).await?;

    tracing::info!(ativo_id = %ativo.id, "Ativo created");

    Ok((StatusCode::CREATED, Json(ativo)))
}

/// Partially update an owned asset
///
/// PUT /api/ativos/:id
pub async fn atualizar_ativo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AtualizarAtivoRequest>,
) -> Result<Json<Ativo>, ApiError> {
    if let Err(e) = validate_uuid(&id, "ativo_id") {
        return Err(ApiError::validation_field("ativo_id", e));
    }
    validate_update_request(&req)?;

    // Ownership check doubles as existence check.
    fetch_owned_ativo(&state, &id, &user.id).await?;

    let now = Utc::now().to_rfc3339();
    let mut qb = sqlx::QueryBuilder::new("UPDATE ativos SET ");
    {
        let mut fields = qb.separated(", ");
        if let Some(ref nome) = req.nome {
            fields.push("nome = ");
            fields.push_bind_unseparated(nome.trim().to_string());
        }
        if req.descricao.is_some() {
            fields.push("descricao = ");
            fields.push_bind_unseparated(normalize_opt(&req.descricao));
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(now);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(&id);
    qb.push(" AND usuario_id = ");
    qb.push_bind(&user.id);
    qb.build().execute(&state.db).await?;

    let ativo = fetch_owned_ativo(&state, &id, &user.id).await?;

    Ok(Json(ativo))
}

/// Delete an owned asset; its maintenance records cascade
///
/// DELETE /api/ativos/:id
pub async fn deletar_ativo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "ativo_id") {
        return Err(ApiError::validation_field("ativo_id", e));
    }

    let result = sqlx::query("DELETE FROM ativos WHERE id = ? AND usuario_id = ?")
        .bind(&id)
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Ativo not found"));
    }

    tracing::info!(ativo_id = %id, "Ativo deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn fetch_owned_ativo(
    state: &AppState,
    id: &str,
    usuario_id: &str,
) -> Result<Ativo, ApiError> {
    let ativo = sqlx::query_as::<_, Ativo>("SELECT * FROM ativos WHERE id = ? AND usuario_id = ?")
        .bind(id)
        .bind(usuario_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Ativo not found"))?;

    Ok(ativo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_opt() {
        assert_eq!(normalize_opt(&None), None);
        assert_eq!(normalize_opt(&Some("".to_string())), None);
        assert_eq!(normalize_opt(&Some("   ".to_string())), None);
        assert_eq!(
            normalize_opt(&Some("  texto  ".to_string())),
            Some("texto".to_string())
        );
    }
}
