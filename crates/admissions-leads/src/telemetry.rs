use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const LEAD_TARGETS: [&str; 2] = ["admissions_leads", "admissions_leads_api"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid lead log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("lead telemetry already initialised: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter used when `RUST_LOG` is unset.
///
/// The lead crates log at the configured level. Everything else (hyper, the prometheus
/// layer) is held at `warn` so request noise does not bury classification decisions.
pub fn lead_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directives = vec!["warn".to_string()];
    directives.extend(LEAD_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Install the process-wide subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = lead_directives(&config.log_level);
            EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
                value: directives,
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_scopes_to_lead_crates() {
        assert_eq!(
            lead_directives(" debug "),
            "warn,admissions_leads=debug,admissions_leads_api=debug"
        );
        assert!(EnvFilter::try_new(lead_directives("info")).is_ok());
    }

    #[test]
    fn explicit_directives_pass_through() {
        assert_eq!(
            lead_directives("info,admissions_leads::workflows=trace"),
            "info,admissions_leads::workflows=trace"
        );
    }

    #[test]
    fn malformed_level_is_rejected() {
        let directives = lead_directives("loud");
        assert!(EnvFilter::try_new(&directives).is_err());
    }
}
