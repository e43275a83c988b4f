//! Asset models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ativo {
    pub id: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub usuario_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CriarAtivoRequest {
    pub nome: String,
    pub descricao: Option<String>,
}

/// Partial update: absent fields are left untouched; an empty `descricao`
/// clears the stored value.
#[derive(Debug, Deserialize)]
pub struct AtualizarAtivoRequest {
    pub nome: Option<String>,
    pub descricao: Option<String>,
}
