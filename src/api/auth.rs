//! Authentication: registration, login, profile, and token lifecycle.
//!
//! Tokens are stateless HS256 JWTs carrying the user id; logout works by
//! adding the token to the injected `SessionStore`, which the `AuthUser`
//! extractor consults before signature verification.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::{
    AlterarSenhaRequest, AtualizarPerfilRequest, AuthResponse, LoginRequest, LogoutResponse,
    MessageResponse, PerfilResponse, RegistrarRequest, Usuario, UsuarioSemSenha,
};
use crate::AppState;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_nome_usuario, validate_senha};

/// bcrypt work factor for password hashing.
pub const BCRYPT_COST: u32 = 12;

/// Hash a password with bcrypt
pub fn hash_senha(senha: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(senha, BCRYPT_COST)
}

/// Verify a password against a stored hash
pub fn verificar_senha(senha: &str, hash: &str) -> bool {
    bcrypt::verify(senha, hash).unwrap_or(false)
}

/// JWT claims carried by every issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issue a signed token for a user
pub fn issue_token(
    usuario_id: &str,
    email: &str,
    auth: &AuthConfig,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: usuario_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(auth.token_ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Failed to sign token: {}", e);
        ApiError::internal("Failed to issue token")
    })
}

/// Decode and verify a token, mapping each failure mode to its own code
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::token_expired(),
        _ => ApiError::token_invalid(),
    })
}

/// Extract the bearer token from request headers
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

/// Authenticated user context extracted from a verified token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(ApiError::token_missing)?;

        // Revocation is checked before the signature so a logged-out token is
        // reported as revoked, not merely invalid or expired.
        if state.sessions.is_revoked(&token) {
            return Err(ApiError::token_revoked());
        }

        let claims = decode_claims(&token, &state.config.auth.jwt_secret)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

/// Register a new user
///
/// POST /api/auth/registrar
pub async fn registrar(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegistrarRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", e);
    }
    if let Err(e) = validate_senha(&req.senha) {
        errors.add("senha", e);
    }
    if let Err(e) = validate_nome_usuario(&req.nome) {
        errors.add("nome", e);
    }
    errors.finish()?;

    let email = req.email.trim().to_lowercase();

    let existente: Option<(String,)> = sqlx::query_as("SELECT id FROM usuarios WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    if existente.is_some() {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let senha_hash = hash_senha(&req.senha).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to hash password")
    })?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO usuarios (id, email, senha, nome, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&email)
    .bind(&senha_hash)
    .bind(req.nome.trim())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await?;

    let usuario = fetch_usuario(&state, &id).await?;
    let token = issue_token(&usuario.id, &usuario.email, &state.config.auth)?;

    tracing::info!(email = %usuario.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".to_string(),
            usuario,
            token,
        }),
    ))
}

/// Log in with email and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if req.email.is_empty() || req.senha.is_empty() {
        return Err(ApiError::validation_field(
            "credentials",
            "Email and senha are required",
        ));
    }

    let email = req.email.trim().to_lowercase();

    let usuario: Option<Usuario> = sqlx::query_as("SELECT * FROM usuarios WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Same message for unknown email and wrong password.
    let usuario = usuario.ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    if !verificar_senha(&req.senha, &usuario.senha) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(&usuario.id, &usuario.email, &state.config.auth)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        usuario: UsuarioSemSenha::from(usuario),
        token,
    }))
}

/// Fetch the authenticated user's profile
///
/// GET /api/auth/perfil
pub async fn obter_perfil(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UsuarioSemSenha>, ApiError> {
    let usuario = fetch_usuario(&state, &user.id).await?;
    Ok(Json(usuario))
}

/// Partially update the authenticated user's profile
///
/// PUT /api/auth/perfil
pub async fn atualizar_perfil(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<AtualizarPerfilRequest>,
) -> Result<Json<PerfilResponse>, ApiError> {
    if req.nome.is_none() && req.email.is_none() {
        return Err(ApiError::validation_field("body", "No fields to update"));
    }

    let mut errors = ValidationErrorBuilder::new();
    if let Some(ref email) = req.email {
        if let Err(e) = validate_email(email) {
            errors.add("email", e);
        }
    }
    if let Some(ref nome) = req.nome {
        if let Err(e) = validate_nome_usuario(nome) {
            errors.add("nome", e);
        }
    }
    errors.finish()?;

    if let Some(ref email) = req.email {
        let email = email.trim().to_lowercase();
        let em_uso: Option<(String,)> =
            sqlx::query_as("SELECT id FROM usuarios WHERE email = ? AND id != ?")
                .bind(&email)
                .bind(&user.id)
                .fetch_optional(&state.db)
                .await?;

        if em_uso.is_some() {
            return Err(ApiError::conflict("Email is already in use"));
        }
    }

    let now = Utc::now().to_rfc3339();
    let mut qb = sqlx::QueryBuilder::new("UPDATE usuarios SET ");
    {
        let mut fields = qb.separated(", ");
        if let Some(ref nome) = req.nome {
            fields.push("nome = ");
            fields.push_bind_unseparated(nome.trim().to_string());
        }
        if let Some(ref email) = req.email {
            fields.push("email = ");
            fields.push_bind_unseparated(email.trim().to_lowercase());
        }
        fields.push("updated_at = ");
        fields.push_bind_unseparated(now);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(&user.id);
    qb.build().execute(&state.db).await?;

    let usuario = fetch_usuario(&state, &user.id).await?;

    Ok(Json(PerfilResponse {
        message: "Profile updated successfully".to_string(),
        usuario,
    }))
}

/// Change the authenticated user's password
///
/// PUT /api/auth/alterar-senha
pub async fn alterar_senha(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<AlterarSenhaRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if req.senha_atual.is_empty() {
        return Err(ApiError::validation_field(
            "senha_atual",
            "Current senha is required",
        ));
    }
    if let Err(e) = validate_senha(&req.nova_senha) {
        return Err(ApiError::validation_field("nova_senha", e));
    }

    let row: (String,) = sqlx::query_as("SELECT senha FROM usuarios WHERE id = ?")
        .bind(&user.id)
        .fetch_one(&state.db)
        .await?;

    if !verificar_senha(&req.senha_atual, &row.0) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let nova_hash = hash_senha(&req.nova_senha).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to hash password")
    })?;

    sqlx::query("UPDATE usuarios SET senha = ?, updated_at = ? WHERE id = ?")
        .bind(&nova_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(&user.id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Revoke the presented token
///
/// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = extract_token(&headers).ok_or_else(ApiError::token_missing)?;

    state.sessions.revoke(&token);

    tracing::info!(usuario_id = %user.id, "User logged out");

    Ok(Json(LogoutResponse {
        message: "Logout successful".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}

async fn fetch_usuario(state: &AppState, id: &str) -> Result<UsuarioSemSenha, ApiError> {
    let usuario = sqlx::query_as::<_, UsuarioSemSenha>(
        "SELECT id, email, nome, created_at, updated_at FROM usuarios WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(usuario)
}
