//! Database seeders for demo data
//!
//! Inserts a ready-to-use demo account with a couple of assets and maintenance
//! records so the dashboard has something to show on a fresh install. Only
//! runs when the user table is empty and `database.seed_demo` is enabled.

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

pub async fn seed_demo_data(pool: &SqlitePool) -> Result<()> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios")
        .fetch_one(pool)
        .await?;

    if count.0 > 0 {
        info!("Users already exist, skipping demo seed");
        return Ok(());
    }

    info!("Seeding demo data...");

    let now = Utc::now();
    let now_str = now.to_rfc3339();
    let today = now.date_naive();

    let usuario_id = Uuid::new_v4().to_string();
    let senha_hash = bcrypt::hash("123456", 12)?;

    sqlx::query(
        "INSERT INTO usuarios (id, email, senha, nome, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&usuario_id)
    .bind("usuario@exemplo.com")
    .bind(&senha_hash)
    .bind("Usuário de Exemplo")
    .bind(&now_str)
    .bind(&now_str)
    .execute(pool)
    .await?;

    // Two assets with maintenance history: one overdue, one urgent, one done.
    let ativos = [
        (
            Uuid::new_v4().to_string(),
            "Carro - Honda Civic",
            "Honda Civic 2020, placa ABC-1234",
        ),
        (
            Uuid::new_v4().to_string(),
            "Ar Condicionado Escritório",
            "Ar condicionado split 12.000 BTUs da sala principal",
        ),
    ];

    for (id, nome, descricao) in &ativos {
        sqlx::query(
            "INSERT INTO ativos (id, nome, descricao, usuario_id, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(nome)
        .bind(descricao)
        .bind(&usuario_id)
        .bind(&now_str)
        .bind(&now_str)
        .execute(pool)
        .await?;
    }

    let fmt = "%Y-%m-%d";
    let manutencoes = [
        (
            &ativos[0].0,
            "Troca de óleo e filtro",
            (today - Duration::days(170)).format(fmt).to_string(),
            Some("Realizada troca de óleo 5W30 e filtro de óleo"),
            Some((today - Duration::days(10)).format(fmt).to_string()),
        ),
        (
            &ativos[0].0,
            "Revisão geral",
            (today - Duration::days(90)).format(fmt).to_string(),
            Some("Revisão completa do veículo"),
            Some((today + Duration::days(5)).format(fmt).to_string()),
        ),
        (
            &ativos[1].0,
            "Limpeza filtros e gás",
            (today - Duration::days(30)).format(fmt).to_string(),
            Some("Limpeza dos filtros e verificação do gás refrigerante"),
            Some((today + Duration::days(150)).format(fmt).to_string()),
        ),
    ];

    for (ativo_id, tipo, realizada, descricao, proxima) in &manutencoes {
        sqlx::query(
            "INSERT INTO manutencoes (id, ativo_id, tipo_servico, data_realizada, descricao, proxima_manutencao, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(ativo_id)
        .bind(tipo)
        .bind(realizada)
        .bind(descricao.as_deref())
        .bind(proxima.as_deref())
        .bind(&now_str)
        .bind(&now_str)
        .execute(pool)
        .await?;
    }

    info!("Demo data seeded: usuario@exemplo.com / 123456");
    Ok(())
}
