//! Dashboard read models.

use serde::{Deserialize, Serialize};

use crate::urgency::UrgencyStatus;

/// Headline counts for the dashboard summary card.
///
/// The urgency counts cover maintenances due within the next 30 days;
/// `manutencoes_realizadas_mes` counts by performed date within the current
/// calendar month, independent of due dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumoManutencoes {
    pub total_ativos: i64,
    pub manutencoes_atrasadas: i64,
    pub manutencoes_urgentes: i64,
    pub manutencoes_proximas: i64,
    pub manutencoes_realizadas_mes: i64,
}

/// One asset row in the dashboard listing, with its due-date rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtivoComManutencoes {
    pub id: String,
    pub nome: String,
    pub descricao: Option<String>,
    pub usuario_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub total_proximas_manutencoes: i64,
    pub proxima_manutencao_mais_urgente: Option<String>,
    pub status_urgencia: UrgencyStatus,
}

/// Lifetime totals for the statistics card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Estatisticas {
    pub total_ativos: i64,
    pub total_manutencoes: i64,
    pub manutencoes_ultimo_mes: i64,
    pub manutencoes_proximos_30_dias: i64,
}
