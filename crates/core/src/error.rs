//! # Errors
//!
//! Failure taxonomy for a battle run.
//!
//! - [`CrewError`] - anything raised while a crew executes. The coordinator
//!   classifies it: transient provider overload keeps partial output, every
//!   other variant discards it.
//! - [`SlotError`] - a defect in the coordinator itself. Never recovered.

use std::sync::OnceLock;

use radkit::errors::AgentError;
use regex::Regex;
use thiserror::Error;

/// Errors produced while a crew executes its tasks.
#[derive(Debug, Error)]
pub enum CrewError {
    /// The hosted model rejected the call with a 5xx / overloaded response
    #[error("model provider unavailable: {detail}")]
    ServiceOverloaded { detail: String },

    /// A task template references an input the crew was not given
    #[error("task {task} references unknown input {{{placeholder}}}")]
    Template { task: String, placeholder: String },

    /// Anything else raised by the agent runtime
    #[error(transparent)]
    Execution(#[from] anyhow::Error),
}

impl CrewError {
    /// Whether the failure is expected to clear up on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, CrewError::ServiceOverloaded { .. })
    }

    /// Full diagnostic text, including the cause chain for runtime errors.
    pub fn diagnostic(&self) -> String {
        match self {
            CrewError::Execution(err) => format!("{:?}", err),
            other => other.to_string(),
        }
    }
}

/// Out-of-range writes into the output slot buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("output slot {index} does not exist")]
    OutOfRange { index: usize },
}

/// Classify an error coming back from an LLM provider.
///
/// A radkit [`AgentError`] anywhere in the chain decides on its own: only
/// an `LlmProvider` error carrying an `HTTP 5xx` status is overload.
/// Errors from outside radkit fall back to [`looks_overloaded`] on the
/// top-level message.
pub fn classify_provider_error(err: anyhow::Error) -> CrewError {
    let overloaded = match err.chain().find_map(|cause| cause.downcast_ref::<AgentError>()) {
        Some(agent_error) => is_provider_overload(agent_error),
        None => looks_overloaded(&err.to_string()),
    };

    if overloaded {
        CrewError::ServiceOverloaded {
            detail: err.to_string(),
        }
    } else {
        CrewError::Execution(err)
    }
}

/// `LlmProvider { message: "HTTP 503 Service Unavailable: ..." }`
fn is_provider_overload(err: &AgentError) -> bool {
    match err {
        AgentError::LlmProvider { message, .. } => http_status(message)
            .map(|status| (500..600).contains(&status))
            .unwrap_or(false),
        _ => false,
    }
}

/// Status code from radkit's `HTTP {status}: {body}` message prefix
fn http_status(message: &str) -> Option<u16> {
    message
        .strip_prefix("HTTP ")?
        .get(..3)?
        .parse()
        .ok()
}

/// Heuristic match for provider-side unavailability in an error message.
pub fn looks_overloaded(message: &str) -> bool {
    const MARKERS: &[&str] = &[
        "overloaded_error",
        "server is overloaded",
        "service unavailable",
        "internal server error",
        "bad gateway",
        "gateway timeout",
    ];

    let lower = message.to_lowercase();
    if MARKERS.iter().any(|marker| lower.contains(marker)) {
        return true;
    }

    server_status_pattern()
        .map(|re| re.is_match(&lower))
        .unwrap_or(false)
}

/// `status 503`, `HTTP 502`, `status code: 529` ...
fn server_status_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b(status|http)( code)?[ :=]{0,3}5\d{2}\b").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(message: &str) -> anyhow::Error {
        AgentError::LlmProvider {
            provider: "Anthropic".to_string(),
            message: message.to_string(),
        }
        .into()
    }

    #[test]
    fn test_overload_markers() {
        assert!(looks_overloaded("503 Service Unavailable"));
        assert!(looks_overloaded("Anthropic API error: overloaded_error"));
        assert!(looks_overloaded("litellm.InternalServerError: Internal Server Error"));
        assert!(looks_overloaded("request failed with status 502"));
        assert!(looks_overloaded("HTTP 529"));
        assert!(looks_overloaded("status code: 503"));
    }

    #[test]
    fn test_non_overload_messages() {
        assert!(!looks_overloaded("invalid api key"));
        assert!(!looks_overloaded("max_tokens 512 exceeded"));
        assert!(!looks_overloaded("HTTP 401 Unauthorized"));
        assert!(!looks_overloaded(
            "invalid request: error: 500 tokens exceeds max_tokens 256"
        ));
        assert!(!looks_overloaded("Our overloaded baristas lose 20% of peak orders"));
    }

    #[test]
    fn test_radkit_server_error_is_transient() {
        let err = provider_error("HTTP 503 Service Unavailable: upstream connect error")
            .context("financial_task failed");
        assert!(classify_provider_error(err).is_transient());

        let err = provider_error("HTTP 529 <unknown status code>: {\"type\":\"overloaded_error\"}");
        assert!(classify_provider_error(err).is_transient());
    }

    #[test]
    fn test_radkit_client_error_is_not_transient() {
        let err = provider_error("HTTP 400 Bad Request: internal server error while validating");
        assert!(!classify_provider_error(err).is_transient());

        let err: anyhow::Error = AgentError::LlmRateLimit {
            provider: "OpenAI".to_string(),
        }
        .into();
        assert!(!classify_provider_error(err).is_transient());
    }

    #[test]
    fn test_output_prose_is_not_overload() {
        let err = anyhow::anyhow!(
            "missing field `content` in LLM output: \"Our overloaded baristas lose 20% of peak orders\""
        )
        .context("pitch_task failed");
        assert!(!classify_provider_error(err).is_transient());

        let err = anyhow::anyhow!("invalid request: error: 500 tokens exceeds max_tokens 256");
        assert!(!classify_provider_error(err).is_transient());
    }

    #[test]
    fn test_untyped_overload_uses_top_level_message() {
        let err = anyhow::anyhow!("request failed with status 503");
        assert!(classify_provider_error(err).is_transient());

        let err = anyhow::anyhow!("HTTP 503").context("financial_task failed");
        assert!(!classify_provider_error(err).is_transient());
    }

    #[test]
    fn test_classify_generic_error() {
        let err = anyhow::anyhow!("schema mismatch in response").context("pitch_task failed");
        let classified = classify_provider_error(err);
        assert!(!classified.is_transient());

        let diagnostic = classified.diagnostic();
        assert!(diagnostic.contains("pitch_task failed"));
        assert!(diagnostic.contains("schema mismatch in response"));
    }

    #[test]
    fn test_template_error_display() {
        let err = CrewError::Template {
            task: "pitch_task".to_string(),
            placeholder: "mission".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "task pitch_task references unknown input {mission}"
        );
    }
}
