//! User models and auth DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub id: String,
    pub email: String,
    /// bcrypt hash, never serialized to clients.
    #[serde(skip_serializing)]
    pub senha: String,
    pub nome: String,
    pub created_at: String,
    pub updated_at: String,
}

/// User as returned by the API: everything but the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsuarioSemSenha {
    pub id: String,
    pub email: String,
    pub nome: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Usuario> for UsuarioSemSenha {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id,
            email: usuario.email,
            nome: usuario.nome,
            created_at: usuario.created_at,
            updated_at: usuario.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegistrarRequest {
    pub email: String,
    pub senha: String,
    pub nome: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

/// Returned by both registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub usuario: UsuarioSemSenha,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct AtualizarPerfilRequest {
    pub nome: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PerfilResponse {
    pub message: String,
    pub usuario: UsuarioSemSenha,
}

#[derive(Debug, Deserialize)]
pub struct AlterarSenhaRequest {
    pub senha_atual: String,
    pub nova_senha: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
    pub timestamp: String,
}
