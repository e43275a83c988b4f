//! Input validation for API requests.
//!
//! Validators return a plain error message; handlers collect them into an
//! `ApiError` through the `ValidationErrorBuilder` from the `error` module.

use chrono::NaiveDate;

pub const MAX_NOME_ATIVO: usize = 100;
pub const MAX_DESCRICAO_ATIVO: usize = 500;
pub const MAX_TIPO_SERVICO: usize = 255;
pub const MAX_DESCRICAO_MANUTENCAO: usize = 1000;
pub const MIN_SENHA: usize = 6;

/// Validate an asset name
pub fn validate_nome_ativo(nome: &str) -> Result<(), String> {
    let nome = nome.trim();
    if nome.is_empty() {
        return Err("Nome is required".to_string());
    }

    if nome.chars().count() > MAX_NOME_ATIVO {
        return Err(format!("Nome is too long (max {} characters)", MAX_NOME_ATIVO));
    }

    Ok(())
}

/// Validate an optional description against a length cap
pub fn validate_descricao(descricao: &Option<String>, max: usize) -> Result<(), String> {
    if let Some(d) = descricao {
        if d.chars().count() > max {
            return Err(format!("Descricao is too long (max {} characters)", max));
        }
    }

    Ok(())
}

/// Validate a maintenance service type
pub fn validate_tipo_servico(tipo: &str) -> Result<(), String> {
    let tipo = tipo.trim();
    if tipo.is_empty() {
        return Err("Tipo de servico is required".to_string());
    }

    if tipo.chars().count() > MAX_TIPO_SERVICO {
        return Err(format!(
            "Tipo de servico is too long (max {} characters)",
            MAX_TIPO_SERVICO
        ));
    }

    Ok(())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() || !email.contains('@') {
        return Err("A valid email is required".to_string());
    }

    Ok(())
}

/// Validate a password
pub fn validate_senha(senha: &str) -> Result<(), String> {
    if senha.chars().count() < MIN_SENHA {
        return Err(format!("Senha must have at least {} characters", MIN_SENHA));
    }

    Ok(())
}

/// Validate a user display name
pub fn validate_nome_usuario(nome: &str) -> Result<(), String> {
    if nome.trim().is_empty() {
        return Err("Nome is required".to_string());
    }

    Ok(())
}

/// Validate an ISO `YYYY-MM-DD` calendar date
pub fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        return Err(format!("Invalid {} (expected YYYY-MM-DD)", field_name));
    }

    Ok(())
}

/// Validate a UUID string
pub fn validate_uuid(id: &str, field_name: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err(format!("{} is required", field_name));
    }

    if uuid::Uuid::parse_str(id).is_err() {
        return Err(format!("Invalid {} format", field_name));
    }

    Ok(())
}
