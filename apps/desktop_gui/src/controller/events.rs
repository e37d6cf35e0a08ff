//! UI/backend events and error modeling for the studio desktop controller.

use std::path::PathBuf;

use client_core::StudioClientError;
use shared::domain::FollowUpStep;

pub enum UiEvent {
    Info(String),
    ScreenplayGenerated {
        content: String,
        genre: String,
    },
    FollowUpGenerated {
        step: FollowUpStep,
        content: String,
    },
    BibleExported(PathBuf),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    /// The server replied with an application-level error message.
    Generation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    GenerateScreenplay,
    GenerateFollowUp,
    Export,
    General,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Classify a free-form failure message. Used where no typed error is
    /// available (backend startup, channel plumbing).
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("must not be empty")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("unreachable")
            || message_lower.contains("startup")
            || message_lower.contains("runtime")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Map a typed client failure onto the banner model. Application errors
    /// keep the server's own message; everything else gets the generic text
    /// for its context, with the detail left to the log.
    pub fn from_client(context: UiErrorContext, error: &StudioClientError) -> Self {
        match error {
            StudioClientError::Generation(message) => Self {
                category: UiErrorCategory::Generation,
                context,
                message: message.clone(),
            },
            StudioClientError::Http(_) | StudioClientError::InvalidBaseUrl { .. } => Self {
                category: UiErrorCategory::Transport,
                context,
                message: generic_failure_text(context).to_string(),
            },
            StudioClientError::MalformedReply(_) => Self {
                category: UiErrorCategory::Unknown,
                context,
                message: generic_failure_text(context).to_string(),
            },
        }
    }

    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Validation,
            context,
            message: message.into(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

fn generic_failure_text(context: UiErrorContext) -> &'static str {
    match context {
        UiErrorContext::BackendStartup => {
            "Backend worker startup failure; verify local app environment and retry."
        }
        UiErrorContext::GenerateScreenplay => "An error occurred during generation.",
        UiErrorContext::GenerateFollowUp => "Error generating content.",
        UiErrorContext::Export => "Export failed.",
        UiErrorContext::General => "Something went wrong; please retry.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_connection_failures_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "connection refused while probing studio server",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
    }

    #[test]
    fn classifies_empty_input_messages_as_validation() {
        let err = UiError::from_message(
            UiErrorContext::General,
            "story concept must not be empty",
        );
        assert_eq!(err.category(), UiErrorCategory::Validation);
    }

    #[test]
    fn application_error_keeps_server_message() {
        let err = UiError::from_client(
            UiErrorContext::GenerateFollowUp,
            &StudioClientError::Generation("No story found in draft".to_string()),
        );
        assert_eq!(err.category(), UiErrorCategory::Generation);
        assert_eq!(err.message(), "No story found in draft");
    }

    #[test]
    fn malformed_reply_gets_generic_context_text() {
        let err = UiError::from_client(
            UiErrorContext::GenerateFollowUp,
            &StudioClientError::MalformedReply("neither content nor error field present"),
        );
        assert_eq!(err.category(), UiErrorCategory::Unknown);
        assert_eq!(err.message(), "Error generating content.");
    }
}
