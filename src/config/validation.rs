//! Configuration validation beyond what `serde` structural parsing covers.
//!
//! Grounded in `kairos-rs::config::validation::ValidationResult` (errors
//! vs. warnings vs. recommendations, `is_valid` summary flag), trimmed to
//! the checks this config schema actually needs: `weight`/`replicas`
//! applicability and the "at least one endpoint" invariant already
//! enforced per-selector but worth surfacing earlier, at config-load
//! time, with a clearer message.

use super::settings::Settings;

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> ValidationResult {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn add_error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Runs every check against `settings`, returning a [`ValidationResult`]
/// that accumulates all findings rather than stopping at the first one.
pub fn validate(settings: &Settings) -> ValidationResult {
    let mut result = ValidationResult::new();
    let lb = &settings.load_balancing;

    if lb.endpoints.is_empty() {
        result.add_error("load_balancing.endpoints must list at least one endpoint");
    }

    let is_weighted = lb.algorithm == "weighted_round_robin";
    for (i, e) in lb.endpoints.iter().enumerate() {
        if is_weighted && e.weight.is_none() {
            result.add_error(format!("endpoints[{i}]: weight is required for weighted_round_robin"));
        }
        if !is_weighted && e.weight.is_some() {
            result.add_warning(format!(
                "endpoints[{i}]: weight is ignored by the {} algorithm",
                lb.algorithm
            ));
        }
        match (&e.ip, &e.port, &e.url) {
            (Some(_), Some(_), None) | (None, None, Some(_)) => {}
            _ => result.add_error(format!(
                "endpoints[{i}]: specify exactly one of {{ip, port}} or {{url}}"
            )),
        }
    }

    if lb.algorithm == "consistent_hash" && lb.replicas.is_none() {
        result.add_error("load_balancing.replicas is required for consistent_hash");
    }
    if lb.algorithm == "consistent_hash" && lb.replicas == Some(0) {
        result.add_error("load_balancing.replicas must be nonzero for consistent_hash");
    }
    if lb.algorithm != "consistent_hash" && lb.replicas.is_some() {
        result.add_warning("load_balancing.replicas is ignored outside consistent_hash");
    }

    if settings.acceptor.port == 0 {
        result.add_error("acceptor.port must be nonzero");
    }

    if !matches!(settings.acceptor.ip_version, 4 | 6) {
        result.add_error(format!(
            "acceptor.ip_version must be 4 or 6, got {}",
            settings.acceptor.ip_version
        ));
    }

    for level in [
        &settings.logging.console.level,
        &settings
            .logging
            .file
            .as_ref()
            .map(|f| f.level.clone())
            .unwrap_or_else(|| "info".to_string()),
    ] {
        if level.parse::<log::LevelFilter>().is_err() {
            result.add_error(format!("invalid log level: {level}"));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{AcceptorConfig, ConsoleLogConfig, LoggingConfig, Settings, ThreadPoolConfig, ThreadsNumber};
    use crate::selector::{EndpointConfig, LoadBalancingConfig};

    fn base_settings() -> Settings {
        Settings {
            acceptor: AcceptorConfig { port: 9000, ip_version: 4 },
            thread_pool: ThreadPoolConfig { threads_number: ThreadsNumber::Auto },
            logging: LoggingConfig {
                console: ConsoleLogConfig { level: "info".to_string(), pattern: None },
                file: None,
            },
            load_balancing: LoadBalancingConfig {
                algorithm: "round_robin".to_string(),
                replicas: None,
                endpoints: vec![EndpointConfig {
                    ip: Some("127.0.0.1".to_string()),
                    port: Some(9001),
                    url: None,
                    weight: None,
                }],
            },
        }
    }

    #[test]
    fn a_well_formed_config_is_valid() {
        assert!(validate(&base_settings()).is_valid);
    }

    #[test]
    fn weighted_round_robin_without_weight_is_an_error() {
        let mut s = base_settings();
        s.load_balancing.algorithm = "weighted_round_robin".to_string();
        let result = validate(&s);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("weight is required")));
    }

    #[test]
    fn weight_on_non_weighted_algorithm_is_a_warning_not_an_error() {
        let mut s = base_settings();
        s.load_balancing.endpoints[0].weight = Some(2);
        let result = validate(&s);
        assert!(result.is_valid);
        assert!(!result.warnings.is_empty());
    }

    #[test]
    fn consistent_hash_without_replicas_is_an_error() {
        let mut s = base_settings();
        s.load_balancing.algorithm = "consistent_hash".to_string();
        assert!(!validate(&s).is_valid);
    }

    #[test]
    fn consistent_hash_with_zero_replicas_is_an_error() {
        let mut s = base_settings();
        s.load_balancing.algorithm = "consistent_hash".to_string();
        s.load_balancing.replicas = Some(0);
        assert!(!validate(&s).is_valid);
    }

    #[test]
    fn invalid_ip_version_is_an_error() {
        let mut s = base_settings();
        s.acceptor.ip_version = 5;
        assert!(!validate(&s).is_valid);
    }

    #[test]
    fn zero_port_is_an_error() {
        let mut s = base_settings();
        s.acceptor.port = 0;
        assert!(!validate(&s).is_valid);
    }
}
