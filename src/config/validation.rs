//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check addresses and URLs parse
//! - Validate value ranges (intervals > 0, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::net::SocketAddr;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.chain.chain_id == 0 {
        errors.push(ValidationError::new("chain.chain_id", "must be non-zero"));
    }
    if config.chain.chain_name.trim().is_empty() {
        errors.push(ValidationError::new("chain.chain_name", "must not be empty"));
    }
    if let Err(e) = config.chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new("chain.rpc_url", format!("invalid URL: {}", e)));
    }
    if let Err(e) = config.chain.explorer_url.parse::<url::Url>() {
        errors.push(ValidationError::new("chain.explorer_url", format!("invalid URL: {}", e)));
    }
    if config.chain.native_currency.symbol.trim().is_empty() {
        errors.push(ValidationError::new("chain.native_currency.symbol", "must not be empty"));
    }

    if let Err(e) = config.contract.address.parse::<Address>() {
        errors.push(ValidationError::new("contract.address", format!("invalid address: {}", e)));
    }
    if config.contract.gas_limit == 0 {
        errors.push(ValidationError::new("contract.gas_limit", "must be non-zero"));
    }
    if config.contract.recent_count == 0 {
        errors.push(ValidationError::new("contract.recent_count", "must be non-zero"));
    }
    if config.contract.receipt_poll_ms == 0 {
        errors.push(ValidationError::new("contract.receipt_poll_ms", "must be non-zero"));
    }

    if config.cooldown.duration_ms == 0 {
        errors.push(ValidationError::new("cooldown.duration_ms", "must be non-zero"));
    }
    if config.cooldown.recheck_interval_ms == 0 {
        errors.push(ValidationError::new("cooldown.recheck_interval_ms", "must be non-zero"));
    }
    if config.refresh.interval_ms == 0 {
        errors.push(ValidationError::new("refresh.interval_ms", "must be non-zero"));
    }

    let timeouts = [
        ("timeouts.prompt_secs", config.timeouts.prompt_secs),
        ("timeouts.chain_secs", config.timeouts.chain_secs),
        ("timeouts.submit_secs", config.timeouts.submit_secs),
        ("timeouts.confirmation_secs", config.timeouts.confirmation_secs),
        ("timeouts.query_secs", config.timeouts.query_secs),
    ];
    for (field, secs) in timeouts {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be non-zero"));
        }
    }

    if let Some(endpoint) = &config.wallet.endpoint {
        if let Err(e) = endpoint.parse::<url::Url>() {
            errors.push(ValidationError::new("wallet.endpoint", format!("invalid URL: {}", e)));
        }
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new("server.bind_address", "not a socket address"));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be non-zero"));
    } else {
        // Switch and add each get the chain timeout.
        let t = &config.timeouts;
        let send = t.submit_secs.saturating_add(t.confirmation_secs);
        let connect = t.prompt_secs.saturating_add(t.chain_secs.saturating_mul(2));
        let slowest = send.max(connect);
        if config.server.request_timeout_secs <= slowest {
            errors.push(ValidationError::new(
                "server.request_timeout_secs",
                format!("must exceed the slowest wallet operation ({}s)", slowest),
            ));
        }
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new("observability.metrics_address", "not a socket address"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
