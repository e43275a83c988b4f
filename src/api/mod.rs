mod ativos;
pub mod auth;
mod dashboard;
pub mod error;
mod manutencoes;
mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::AppState;

use error::ApiError;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_public = Router::new()
        .route("/registrar", post(auth::registrar))
        .route("/login", post(auth::login));

    // Auth routes requiring a valid token
    let auth_protected = Router::new()
        .route("/perfil", get(auth::obter_perfil))
        .route("/perfil", put(auth::atualizar_perfil))
        .route("/alterar-senha", put(auth::alterar_senha))
        .route("/logout", post(auth::logout));

    // Resource routes; each handler authenticates via the AuthUser extractor
    let api_routes = Router::new()
        // Ativos
        .route("/ativos", get(ativos::listar_ativos))
        .route("/ativos", post(ativos::criar_ativo))
        .route("/ativos/:id", get(ativos::buscar_ativo))
        .route("/ativos/:id", put(ativos::atualizar_ativo))
        .route("/ativos/:id", delete(ativos::deletar_ativo))
        .route(
            "/ativos/:id/manutencoes",
            get(manutencoes::listar_manutencoes_por_ativo),
        )
        // Manutencoes
        .route("/manutencoes", get(manutencoes::listar_manutencoes))
        .route("/manutencoes", post(manutencoes::criar_manutencao))
        .route("/manutencoes/:id", get(manutencoes::buscar_manutencao))
        .route("/manutencoes/:id", put(manutencoes::atualizar_manutencao))
        .route("/manutencoes/:id", delete(manutencoes::deletar_manutencao))
        // Dashboard
        .route("/dashboard/resumo", get(dashboard::obter_resumo))
        .route(
            "/dashboard/ativos",
            get(dashboard::listar_ativos_com_manutencoes),
        )
        .route(
            "/dashboard/estatisticas",
            get(dashboard::obter_estatisticas),
        );

    let cors = cors_layer(&state.config);

    Router::new()
        .route("/api/health", get(health_check))
        .nest("/api/auth", auth_public.merge(auth_protected))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match config.cors.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(
                origin = %config.cors.allowed_origin,
                "Invalid CORS origin in config, cross-origin requests will be rejected"
            );
            layer
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
