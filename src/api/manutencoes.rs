//! Maintenance record CRUD endpoints.
//!
//! Ownership is enforced through the asset: a maintenance is visible only
//! when its asset belongs to the authenticated user.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{
    AtualizarManutencaoRequest, CriarManutencaoRequest, Manutencao, ManutencaoComAtivo,
    ManutencoesListResponse, PageParams, Pagination,
};
use crate::AppState;

use super::ativos::fetch_owned_ativo;
use super::auth::AuthUser;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{
    validate_date, validate_descricao, validate_tipo_servico, validate_uuid,
    MAX_DESCRICAO_MANUTENCAO,
};

const SELECT_COM_ATIVO: &str = "SELECT m.id, m.ativo_id, m.tipo_servico, m.data_realizada, \
     m.descricao, m.proxima_manutencao, m.created_at, m.updated_at, \
     a.nome AS ativo_nome, a.descricao AS ativo_descricao \
     FROM manutencoes m INNER JOIN ativos a ON m.ativo_id = a.id";

#[derive(Debug, Deserialize)]
pub struct ListarManutencoesParams {
    pub ativo_id: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn normalize_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn validate_create_request(req: &CriarManutencaoRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_uuid(&req.ativo_id, "ativo_id") {
        errors.add("ativo_id", e);
    }
    if let Err(e) = validate_tipo_servico(&req.tipo_servico) {
        errors.add("tipo_servico", e);
    }
    if let Err(e) = validate_date(&req.data_realizada, "data_realizada") {
        errors.add("data_realizada", e);
    }
    if let Some(proxima) = normalize_opt(&req.proxima_manutencao) {
        if let Err(e) = validate_date(&proxima, "proxima_manutencao") {
            errors.add("proxima_manutencao", e);
        }
    }
    if let Err(e) = validate_descricao(&req.descricao, MAX_DESCRICAO_MANUTENCAO) {
        errors.add("descricao", e);
    }

    errors.finish()
}

fn validate_update_request(req: &AtualizarManutencaoRequest) -> Result<(), ApiError> {
    if req.tipo_servico.is_none()
        && req.data_realizada.is_none()
        && req.descricao.is_none()
        && req.proxima_manutencao.is_none()
    {
        return Err(ApiError::validation_field("body", "No fields to update"));
    }

    let mut errors = ValidationErrorBuilder::new();

    if let Some(ref tipo) = req.tipo_servico {
        if let Err(e) = validate_tipo_servico(tipo) {
            errors.add("tipo_servico", e);
        }
    }
    if let Some(ref data) = req.data_realizada {
        if let Err(e) = validate_date(data, "data_realizada") {
            errors.add("data_realizada", e);
        }
    }
    if let Some(proxima) = normalize_opt(&req.proxima_manutencao) {
        if let Err(e) = validate_date(&proxima, "proxima_manutencao") {
            errors.add("proxima_manutencao", e);
        }
    }
    if let Err(e) = validate_descricao(&req.descricao, MAX_DESCRICAO_MANUTENCAO) {
        errors.add("descricao", e);
    }

    errors.finish()
}

/// List the user's maintenances, paginated, optionally scoped to one asset
///
/// GET /api/manutencoes
pub async fn listar_manutencoes(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<ListarManutencoesParams>,
) -> Result<Json<ManutencoesListResponse>, ApiError> {
    if let Some(ref ativo_id) = params.ativo_id {
        if let Err(e) = validate_uuid(ativo_id, "ativo_id") {
            return Err(ApiError::validation_field("ativo_id", e));
        }
    }

    let page_params = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let (page, limit, offset) = (page_params.page(), page_params.limit(), page_params.offset());

    let mut count_qb =
        sqlx::QueryBuilder::new("SELECT COUNT(*) FROM manutencoes m INNER JOIN ativos a ON m.ativo_id = a.id WHERE a.usuario_id = ");
    count_qb.push_bind(&user.id);
    if let Some(ref ativo_id) = params.ativo_id {
        count_qb.push(" AND m.ativo_id = ");
        count_qb.push_bind(ativo_id);
    }
    let total: (i64,) = count_qb
        .build_query_as()
        .fetch_one(&state.db)
        .await?;

    let mut qb = sqlx::QueryBuilder::new(SELECT_COM_ATIVO);
    qb.push(" WHERE a.usuario_id = ");
    qb.push_bind(&user.id);
    if let Some(ref ativo_id) = params.ativo_id {
        qb.push(" AND m.ativo_id = ");
        qb.push_bind(ativo_id);
    }
    qb.push(" ORDER BY m.data_realizada DESC, m.created_at DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let manutencoes: Vec<ManutencaoComAtivo> =
        qb.build_query_as().fetch_all(&state.db).await?;

    Ok(Json(ManutencoesListResponse {
        manutencoes,
        pagination: Pagination::new(page, limit, total.0),
    }))
}

/// Fetch one maintenance with its asset
///
/// GET /api/manutencoes/:id
pub async fn buscar_manutencao(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ManutencaoComAtivo>, ApiError> {
    if let Err(e) = validate_uuid(&id, "manutencao_id") {
        return Err(ApiError::validation_field("manutencao_id", e));
    }

    let sql = format!("{} WHERE m.id = ? AND a.usuario_id = ?", SELECT_COM_ATIVO);
    let manutencao = sqlx::query_as::<_, ManutencaoComAtivo>(&sql)
        .bind(&id)
        .bind(&user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Manutencao not found"))?;

    Ok(Json(manutencao))
}

/// Log a maintenance against an owned asset
///
/// POST /api/manutencoes
pub async fn criar_manutencao(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<CriarManutencaoRequest>,
) -> Result<(StatusCode, Json<Manutencao>), ApiError> {
    validate_create_request(&req)?;

    // The target asset must exist and belong to the caller.
    fetch_owned_ativo(&state, &req.ativo_id, &user.id).await?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO manutencoes (id, ativo_id, tipo_servico, data_realizada, descricao, proxima_manutencao, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&req.ativo_id)
    .bind(req.tipo_servico.trim())
    .bind(&req.data_realizada)
    .bind(normalize_opt(&req.descricao))
    .bind(normalize_opt(&req.proxima_manutencao))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let manutencao = sqlx::query_as::<_, Manutencao>("SELECT * FROM manutencoes WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    tracing::info!(manutencao_id = %id, ativo_id = %req.ativo_id, "Manutencao created");

    Ok((StatusCode::CREATED, Json(manutencao)))
}

/// Partially update an owned maintenance
///
/// PUT /api/manutencoes/:id
pub async fn atualizar_manutencao(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AtualizarManutencaoRequest>,
) -> Result<Json<Manutencao>, ApiError> {
    if let Err(e) = validate_uuid(&id, "manutencao_id") {
        return Err(ApiError::validation_field("manutencao_id", e));
    }
    validate_update_request(&req)?;

    fetch_owned_manutencao_id(&state, &id, &user.id).await?;

    let now = Utc::now().to_rfc3339();
    let mut qb = sqlx::QueryBuilder::new("UPDATE manutencoes SET ");
    {
        let mut fields = qb.separated(", ");
        if let Some(ref tipo) = req.tipo_servico {
            fields.push("tipo_servico = ");
            fields.push_bind_unseparated(tipo.trim().to_string());
        }
        if let Some(ref data) = req.data_realizada {
            fields.push("data_realizada = ");
            fields.push_bind_unseparated(data.clone());
        }
        if req.descricao.is_some() {
            fields.push("descricao = ");
            fields.push_bind_unseparated(normalize_opt(&req.descricao));
        }
        if req.proxima_manutencao.is_some() {
            fields.push("proxima_manutencao = ");
            fields.push_bind_unseparated(normalize_opt(&req.proxima_manutencao));
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(now);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(&id);
    qb.build().execute(&state.db).await?;

    let manutencao = sqlx::query_as::<_, Manutencao>("SELECT * FROM manutencoes WHERE id = ?")
        .bind(&id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(manutencao))
}

/// Delete an owned maintenance
///
/// DELETE /api/manutencoes/:id
pub async fn deletar_manutencao(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if let Err(e) = validate_uuid(&id, "manutencao_id") {
        return Err(ApiError::validation_field("manutencao_id", e));
    }

    let result = sqlx::query(
        "DELETE FROM manutencoes WHERE id = ? AND ativo_id IN (SELECT id FROM ativos WHERE usuario_id = ?)",
    )
    .bind(&id)
    .bind(&user.id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Manutencao not found"));
    }

    tracing::info!(manutencao_id = %id, "Manutencao deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// List every maintenance of one owned asset
///
/// GET /api/ativos/:id/manutencoes
pub async fn listar_manutencoes_por_ativo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(ativo_id): Path<String>,
) -> Result<Json<Vec<Manutencao>>, ApiError> {
    if let Err(e) = validate_uuid(&ativo_id, "ativo_id") {
        return Err(ApiError::validation_field("ativo_id", e));
    }

    fetch_owned_ativo(&state, &ativo_id, &user.id).await?;

    let manutencoes = sqlx::query_as::<_, Manutencao>(
        "SELECT * FROM manutencoes WHERE ativo_id = ? ORDER BY data_realizada DESC, created_at DESC",
    )
    .bind(&ativo_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(manutencoes))
}

async fn fetch_owned_manutencao_id(
    state: &AppState,
    id: &str,
    usuario_id: &str,
) -> Result<(), ApiError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT m.id FROM manutencoes m INNER JOIN ativos a ON m.ativo_id = a.id WHERE m.id = ? AND a.usuario_id = ?",
    )
    .bind(id)
    .bind(usuario_id)
    .fetch_optional(&state.db)
    .await?;

    row.map(|_| ())
        .ok_or_else(|| ApiError::not_found("Manutencao not found"))
}
