//! Preflight Check System
//!
//! Builds the responder from configuration and verifies each optional
//! collaborator before the server starts. A collaborator that fails its check
//! is disabled for the lifetime of the process; only invalid configuration
//! stops startup.

use crate::backends::{GeminiClient, LlamaClient};
use crate::brain::TopicClassifier;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::responder::Responder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    pub summary: String,
}

/// Builds the responder and runs all checks.
///
/// Returns `AppError::Config` only when a collaborator's settings cannot be
/// turned into a client at all.
pub async fn build_responder(config: &AppConfig) -> Result<(Responder, PreflightReport), AppError> {
    info!("Running preflight checks...");

    let mut checks = Vec::new();

    // 1. Classifier
    let classifier = TopicClassifier::new(config.classifier);
    checks.push(CheckResult::pass(
        "classifier",
        &format!("{:?} classifier ready", classifier.kind()),
    ));

    let mut responder = Responder::new(classifier, config.external_timeout());

    // 2. Hosted generator
    match &config.gemini {
        Some(gemini) => {
            let client = GeminiClient::new(&gemini.base_url, &gemini.model, gemini.api_key.clone())?;
            let message = format!("Enabled at {}", client.endpoint());
            responder = responder.with_generator(Arc::new(client));
            checks.push(CheckResult::pass("gemini", &message));
        }
        None => checks.push(CheckResult::fail(
            "gemini",
            "Disabled",
            Some("GOOGLE_API_KEY is not set".to_string()),
        )),
    }

    // 3. Local fallback model
    match &config.fallback {
        Some(fallback) => {
            let client = LlamaClient::new(&fallback.url, fallback.auth_token.clone(), fallback.max_tokens)?;
            match client.health_check().await {
                Ok(()) => {
                    responder = responder.with_fallback(Arc::new(client));
                    checks.push(CheckResult::pass(
                        "llama_server",
                        &format!("Reachable at {}", fallback.url),
                    ));
                }
                Err(e) => checks.push(CheckResult::fail(
                    "llama_server",
                    "Unreachable, fallback generation disabled",
                    Some(e.to_string()),
                )),
            }
        }
        None => checks.push(CheckResult::fail(
            "llama_server",
            "Disabled",
            Some("WELLNESS_FALLBACK_URL is not set".to_string()),
        )),
    }

    let all_passed = checks.iter().all(|c| c.passed);
    let summary = if all_passed {
        "All checks passed. System ready.".to_string()
    } else {
        "Some optional collaborators are disabled. Serving with reduced capabilities.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!("  ✅ {}: {}", check.name, check.message);
        } else {
            warn!("  ❌ {}: {}", check.name, check.message);
            if let Some(details) = &check.details {
                warn!("      Details: {}", details);
            }
        }
    }
    info!("Summary: {}", summary);

    Ok((
        responder,
        PreflightReport {
            all_passed,
            checks,
            summary,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FallbackConfig, GeminiConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn check<'a>(report: &'a PreflightReport, name: &str) -> &'a CheckResult {
        report.checks.iter().find(|c| c.name == name).unwrap()
    }

    #[tokio::test]
    async fn test_no_collaborators_configured() {
        let (responder, report) = build_responder(&AppConfig::default()).await.unwrap();

        assert!(!report.all_passed);
        assert!(check(&report, "classifier").passed);
        assert!(!check(&report, "gemini").passed);
        assert!(responder.capabilities().generator.is_none());
        assert!(responder.capabilities().fallback.is_none());
    }

    #[tokio::test]
    async fn test_healthy_fallback_is_enabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = AppConfig {
            gemini: Some(GeminiConfig {
                api_key: "k".to_string(),
                model: "gemini-1.5-flash".to_string(),
                base_url: server.uri(),
            }),
            fallback: Some(FallbackConfig {
                url: server.uri(),
                auth_token: None,
                max_tokens: 50,
            }),
            ..AppConfig::default()
        };

        let (responder, report) = build_responder(&config).await.unwrap();
        assert!(report.all_passed);
        assert_eq!(responder.capabilities().generator.as_deref(), Some("gemini"));
        assert_eq!(responder.capabilities().fallback.as_deref(), Some("llama"));
    }

    #[tokio::test]
    async fn test_unhealthy_fallback_is_disabled() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = AppConfig {
            fallback: Some(FallbackConfig {
                url: server.uri(),
                auth_token: None,
                max_tokens: 50,
            }),
            ..AppConfig::default()
        };

        let (responder, report) = build_responder(&config).await.unwrap();
        let llama = check(&report, "llama_server");
        assert!(!llama.passed);
        assert!(llama.details.is_some());
        assert!(responder.capabilities().fallback.is_none());
    }
}
