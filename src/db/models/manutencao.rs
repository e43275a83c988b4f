//! Maintenance models and DTOs.
//!
//! Calendar dates (`data_realizada`, `proxima_manutencao`) are stored and
//! exchanged as `YYYY-MM-DD` strings; zero-padded ISO dates compare correctly
//! both lexicographically in SQL and after parsing in Rust.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::common::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Manutencao {
    pub id: String,
    pub ativo_id: String,
    pub tipo_servico: String,
    pub data_realizada: String,
    pub descricao: Option<String>,
    pub proxima_manutencao: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Maintenance joined with its asset's name/description for list views.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ManutencaoComAtivo {
    pub id: String,
    pub ativo_id: String,
    pub tipo_servico: String,
    pub data_realizada: String,
    pub descricao: Option<String>,
    pub proxima_manutencao: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub ativo_nome: String,
    pub ativo_descricao: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CriarManutencaoRequest {
    pub ativo_id: String,
    pub tipo_servico: String,
    pub data_realizada: String,
    pub descricao: Option<String>,
    pub proxima_manutencao: Option<String>,
}

/// Partial update: absent fields are left untouched; empty `descricao` or
/// `proxima_manutencao` clear the stored value.
#[derive(Debug, Deserialize)]
pub struct AtualizarManutencaoRequest {
    pub tipo_servico: Option<String>,
    pub data_realizada: Option<String>,
    pub descricao: Option<String>,
    pub proxima_manutencao: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManutencoesListResponse {
    pub manutencoes: Vec<ManutencaoComAtivo>,
    pub pagination: Pagination,
}
