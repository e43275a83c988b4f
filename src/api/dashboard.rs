//! Dashboard read endpoints.
//!
//! SQL narrows rows with bound date parameters computed here; bucket
//! assignment and result ordering go through the pure `urgency` module so the
//! classification logic stays testable without a database.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{AtivoComManutencoes, DbPool, Estatisticas, ResumoManutencoes};
use crate::urgency::{self, UrgencyStatus, UPCOMING_WINDOW_DAYS};
use crate::AppState;

use super::auth::AuthUser;
use super::error::ApiError;

const DATE_FMT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct DashboardAtivosParams {
    pub status: Option<String>,
}

/// Summary counts for the dashboard
///
/// GET /api/dashboard/resumo
pub async fn obter_resumo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<ResumoManutencoes>, ApiError> {
    let today = Utc::now().date_naive();
    let resumo = resumo(&state.db, &user.id, today).await?;
    Ok(Json(resumo))
}

/// Per-asset urgency listing, optionally filtered to one bucket
///
/// GET /api/dashboard/ativos?status=
pub async fn listar_ativos_com_manutencoes(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<DashboardAtivosParams>,
) -> Result<Json<Vec<AtivoComManutencoes>>, ApiError> {
    let filtro = match params.status.as_deref() {
        Some(s) => Some(
            s.parse::<UrgencyStatus>()
                .map_err(|e| ApiError::validation_field("status", e.to_string()))?,
        ),
        None => None,
    };

    let today = Utc::now().date_naive();
    let ativos = ativos_com_manutencoes(&state.db, &user.id, today, filtro).await?;
    Ok(Json(ativos))
}

/// Lifetime totals
///
/// GET /api/dashboard/estatisticas
pub async fn obter_estatisticas(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Estatisticas>, ApiError> {
    let today = Utc::now().date_naive();
    let estatisticas = estatisticas(&state.db, &user.id, today).await?;
    Ok(Json(estatisticas))
}

async fn resumo(
    db: &DbPool,
    usuario_id: &str,
    today: NaiveDate,
) -> Result<ResumoManutencoes, ApiError> {
    let horizon = (today + Duration::days(UPCOMING_WINDOW_DAYS))
        .format(DATE_FMT)
        .to_string();

    let total_ativos: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ativos WHERE usuario_id = ?")
        .bind(usuario_id)
        .fetch_one(db)
        .await?;

    let dues: Vec<(String,)> = sqlx::query_as(
        "SELECT m.proxima_manutencao FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id \
         WHERE a.usuario_id = ? AND m.proxima_manutencao IS NOT NULL AND m.proxima_manutencao <= ?",
    )
    .bind(usuario_id)
    .bind(&horizon)
    .fetch_all(db)
    .await?;

    let mut atrasadas = 0;
    let mut urgentes = 0;
    let mut proximas = 0;
    for (due,) in &dues {
        match urgency::classify(Some(due.as_str()), today) {
            UrgencyStatus::Overdue => atrasadas += 1,
            UrgencyStatus::Urgent => urgentes += 1,
            UrgencyStatus::Upcoming => proximas += 1,
            UrgencyStatus::Ok => {}
        }
    }

    let (month_start, next_month_start) = month_bounds(today);
    let realizadas_mes: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id \
         WHERE a.usuario_id = ? AND m.data_realizada >= ? AND m.data_realizada < ?",
    )
    .bind(usuario_id)
    .bind(month_start.format(DATE_FMT).to_string())
    .bind(next_month_start.format(DATE_FMT).to_string())
    .fetch_one(db)
    .await?;

    Ok(ResumoManutencoes {
        total_ativos: total_ativos.0,
        manutencoes_atrasadas: atrasadas,
        manutencoes_urgentes: urgentes,
        manutencoes_proximas: proximas,
        manutencoes_realizadas_mes: realizadas_mes.0,
    })
}

async fn ativos_com_manutencoes(
    db: &DbPool,
    usuario_id: &str,
    today: NaiveDate,
    filtro: Option<UrgencyStatus>,
) -> Result<Vec<AtivoComManutencoes>, ApiError> {
    let ativos: Vec<crate::db::Ativo> = sqlx::query_as(
        "SELECT * FROM ativos WHERE usuario_id = ?",
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;

    let dues: Vec<(String, String)> = sqlx::query_as(
        "SELECT m.ativo_id, m.proxima_manutencao FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id \
         WHERE a.usuario_id = ? AND m.proxima_manutencao IS NOT NULL",
    )
    .bind(usuario_id)
    .fetch_all(db)
    .await?;

    let mut por_ativo: HashMap<String, Vec<String>> = HashMap::new();
    for (ativo_id, due) in dues {
        por_ativo.entry(ativo_id).or_default().push(due);
    }

    let mut rows = Vec::with_capacity(ativos.len());
    for ativo in ativos {
        let dues = por_ativo.remove(&ativo.id).unwrap_or_default();
        let agg = urgency::rollup(dues.iter().map(|d| Some(d.as_str())), today);
        let status = agg.status(today);

        if let Some(wanted) = filtro {
            if status != wanted {
                continue;
            }
        }

        rows.push(AtivoComManutencoes {
            id: ativo.id,
            nome: ativo.nome,
            descricao: ativo.descricao,
            usuario_id: ativo.usuario_id,
            created_at: ativo.created_at,
            updated_at: ativo.updated_at,
            total_proximas_manutencoes: agg.within_window,
            proxima_manutencao_mais_urgente: agg
                .soonest
                .map(|d| d.format(DATE_FMT).to_string()),
            status_urgencia: status,
        });
    }

    sort_dashboard_rows(&mut rows);

    Ok(rows)
}

async fn estatisticas(
    db: &DbPool,
    usuario_id: &str,
    today: NaiveDate,
) -> Result<Estatisticas, ApiError> {
    let horizon = (today + Duration::days(UPCOMING_WINDOW_DAYS))
        .format(DATE_FMT)
        .to_string();
    let month_ago = (today - Duration::days(30)).format(DATE_FMT).to_string();

    let total_ativos: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ativos WHERE usuario_id = ?")
        .bind(usuario_id)
        .fetch_one(db)
        .await?;

    let total_manutencoes: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id WHERE a.usuario_id = ?",
    )
    .bind(usuario_id)
    .fetch_one(db)
    .await?;

    let ultimo_mes: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id \
         WHERE a.usuario_id = ? AND m.data_realizada >= ?",
    )
    .bind(usuario_id)
    .bind(&month_ago)
    .fetch_one(db)
    .await?;

    let proximos_30: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM manutencoes m \
         INNER JOIN ativos a ON m.ativo_id = a.id \
         WHERE a.usuario_id = ? AND m.proxima_manutencao IS NOT NULL AND m.proxima_manutencao <= ?",
    )
    .bind(usuario_id)
    .bind(&horizon)
    .fetch_one(db)
    .await?;

    Ok(Estatisticas {
        total_ativos: total_ativos.0,
        total_manutencoes: total_manutencoes.0,
        manutencoes_ultimo_mes: ultimo_mes.0,
        manutencoes_proximos_30_dias: proximos_30.0,
    })
}

/// Most pressing bucket first, then soonest due date, ties by asset name.
fn sort_dashboard_rows(rows: &mut [AtivoComManutencoes]) {
    rows.sort_by(|a, b| {
        a.status_urgencia
            .rank()
            .cmp(&b.status_urgencia.rank())
            .then_with(|| {
                match (
                    &a.proxima_manutencao_mais_urgente,
                    &b.proxima_manutencao_mais_urgente,
                ) {
                    // ISO dates compare correctly as strings
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            })
            .then_with(|| a.nome.cmp(&b.nome))
    });
}

/// First day of `today`'s month and of the following month.
fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    use chrono::Datelike;

    let month_start = today - Duration::days(i64::from(today.day()) - 1);
    // Jumping 32 days from the month start always lands in the next month.
    let overshoot = month_start + Duration::days(32);
    let next_month_start = overshoot - Duration::days(i64::from(overshoot.day()) - 1);

    (month_start, next_month_start)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(nome: &str, status: UrgencyStatus, soonest: Option<&str>) -> AtivoComManutencoes {
        AtivoComManutencoes {
            id: format!("id-{}", nome),
            nome: nome.to_string(),
            descricao: None,
            usuario_id: "u1".to_string(),
            created_at: String::new(),
            updated_at: String::new(),
            total_proximas_manutencoes: 0,
            proxima_manutencao_mais_urgente: soonest.map(|s| s.to_string()),
            status_urgencia: status,
        }
    }

    #[test]
    fn test_sort_orders_buckets_then_date_then_name() {
        let mut rows = vec![
            row("Gerador", UrgencyStatus::Ok, None),
            row("Bomba", UrgencyStatus::Upcoming, Some("2025-04-01")),
            row("Carro", UrgencyStatus::Overdue, Some("2025-03-10")),
            row("Ar", UrgencyStatus::Urgent, Some("2025-03-18")),
            row("Elevador", UrgencyStatus::Overdue, Some("2025-03-01")),
        ];

        sort_dashboard_rows(&mut rows);

        let nomes: Vec<&str> = rows.iter().map(|r| r.nome.as_str()).collect();
        assert_eq!(nomes, vec!["Elevador", "Carro", "Ar", "Bomba", "Gerador"]);
    }

    #[test]
    fn test_sort_ties_break_by_name() {
        let mut rows = vec![
            row("Zebra", UrgencyStatus::Urgent, Some("2025-03-18")),
            row("Antena", UrgencyStatus::Urgent, Some("2025-03-18")),
        ];

        sort_dashboard_rows(&mut rows);

        assert_eq!(rows[0].nome, "Antena");
        assert_eq!(rows[1].nome, "Zebra");
    }

    #[test]
    fn test_sort_missing_dates_sort_last_within_bucket() {
        let mut rows = vec![
            row("Sem data", UrgencyStatus::Ok, None),
            row("Com data", UrgencyStatus::Ok, Some("2025-06-01")),
        ];

        sort_dashboard_rows(&mut rows);

        assert_eq!(rows[0].nome, "Com data");
        assert_eq!(rows[1].nome, "Sem data");
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(day("2025-03-15")),
            (day("2025-03-01"), day("2025-04-01"))
        );
        assert_eq!(
            month_bounds(day("2025-12-31")),
            (day("2025-12-01"), day("2026-01-01"))
        );
        assert_eq!(
            month_bounds(day("2024-02-29")),
            (day("2024-02-01"), day("2024-03-01"))
        );
        assert_eq!(
            month_bounds(day("2025-01-01")),
            (day("2025-01-01"), day("2025-02-01"))
        );
    }
}
