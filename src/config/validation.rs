//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the selected network exists
//! - Validate URLs, contract addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::batch::eligibility::is_valid_address;
use crate::config::schema::AppConfig;

/// Largest batch the orchestrator accepts.
pub const MAX_ROWS_LIMIT: usize = 30;

/// Longest allowed pause between transactions.
pub const MAX_DELAY_MS: u64 = 60_000;

/// Fee tiers deployed on Uniswap V3 style routers.
pub const FEE_TIERS: [u32; 4] = [100, 500, 3_000, 10_000];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
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

    if !config.networks.contains_key(&config.network) {
        errors.push(ValidationError::new(
            "network",
            format!("unknown network '{}'", config.network),
        ));
    }

    for (name, network) in &config.networks {
        let prefix = format!("networks.{name}");

        if network.rpc_url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                format!("{prefix}.rpc_url"),
                format!("invalid URL '{}'", network.rpc_url),
            ));
        }
        if network.chain_id == 0 {
            errors.push(ValidationError::new(
                format!("{prefix}.chain_id"),
                "must be non-zero",
            ));
        }
        for (field, value) in [
            ("router_address", &network.router_address),
            ("wrapped_native_address", &network.wrapped_native_address),
        ] {
            if let Some(address) = value {
                if !is_valid_address(address) {
                    errors.push(ValidationError::new(
                        format!("{prefix}.{field}"),
                        format!("invalid address '{address}'"),
                    ));
                }
            }
        }
        if network.router_address.is_some() != network.wrapped_native_address.is_some() {
            errors.push(ValidationError::new(
                prefix.clone(),
                "router_address and wrapped_native_address must be set together",
            ));
        }
    }

    let batch = &config.batch;
    if batch.max_rows == 0 || batch.max_rows > MAX_ROWS_LIMIT {
        errors.push(ValidationError::new(
            "batch.max_rows",
            format!("must be between 1 and {MAX_ROWS_LIMIT}"),
        ));
    }
    for (field, value) in [
        ("batch.transfer_delay_ms", batch.transfer_delay_ms),
        ("batch.load_delay_ms", batch.load_delay_ms),
        ("batch.token_refresh_delay_ms", batch.token_refresh_delay_ms),
    ] {
        if value > MAX_DELAY_MS {
            errors.push(ValidationError::new(
                field,
                format!("must be at most {MAX_DELAY_MS}"),
            ));
        }
    }
    if batch.max_generated_wallets == 0 {
        errors.push(ValidationError::new(
            "batch.max_generated_wallets",
            "must be positive",
        ));
    }

    let gas = &config.gas;
    for (field, value) in [
        ("gas.transfer_gas_limit", gas.transfer_gas_limit),
        ("gas.swap_gas_limit", gas.swap_gas_limit),
        ("gas.unwrap_gas_limit", gas.unwrap_gas_limit),
        ("gas.approve_gas_limit", gas.approve_gas_limit),
    ] {
        if value < 21_000 {
            errors.push(ValidationError::new(field, "must be at least 21000"));
        }
    }

    if !FEE_TIERS.contains(&config.swap.fee_tier) {
        errors.push(ValidationError::new(
            "swap.fee_tier",
            format!("must be one of {FEE_TIERS:?}"),
        ));
    }
    if !(0.0..=50.0).contains(&config.swap.slippage_percent) {
        errors.push(ValidationError::new(
            "swap.slippage_percent",
            "must be between 0 and 50",
        ));
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be positive"));
    }
    if config.rpc.confirmation_poll_ms == 0 {
        errors.push(ValidationError::new(
            "rpc.confirmation_poll_ms",
            "must be positive",
        ));
    }

    let format = config.observability.log_format.as_str();
    if format != "pretty" && format != "json" {
        errors.push(ValidationError::new(
            "observability.log_format",
            "must be 'pretty' or 'json'",
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "invalid socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.batch.max_rows = 0;
        config.swap.fee_tier = 42;
        config.observability.log_format = "xml".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "batch.max_rows");
    }

    #[test]
    fn test_rejects_bad_router_address() {
        let mut config = AppConfig::default();
        config.networks.get_mut("base").unwrap().router_address = Some("0xZZZZ".to_string());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "networks.base.router_address");
        assert!(errors[0].to_string().contains("0xZZZZ"));
    }

    #[test]
    fn test_router_requires_wrapped_native() {
        let mut config = AppConfig::default();
        config.networks.get_mut("mainnet").unwrap().wrapped_native_address = None;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "networks.mainnet");
    }
}
