//! Credential checks delegated to the host authentication stack.
//!
//! The running process is usually unprivileged, so under default host policy
//! only its own account can be verified. Deployments must add the service
//! account to whatever local group the policy requires for delegated checks
//! (often `shadow`).

#[cfg(feature = "pam")]
pub mod pam;

use std::fmt::Debug;

use crate::error::AuthError;

/// Message style of a conversation prompt, using Linux-PAM codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    EchoOff,
    EchoOn,
    ErrorMsg,
    TextInfo,
    Unknown(i32),
}

impl From<i32> for PromptStyle {
    fn from(code: i32) -> Self {
        match code {
            1 => PromptStyle::EchoOff,
            2 => PromptStyle::EchoOn,
            3 => PromptStyle::ErrorMsg,
            4 => PromptStyle::TextInfo,
            other => PromptStyle::Unknown(other),
        }
    }
}

/// Answers conversation prompts on behalf of a bind.
///
/// Hidden prompts get the password, visible and informational prompts get
/// an empty answer. Any other style aborts the conversation and the failure
/// is kept so it can be reported instead of the stack's generic error.
pub struct PasswordConversation {
    password: String,
    failure: Option<AuthError>,
}

impl PasswordConversation {
    /// Create a new [`PasswordConversation`].
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            failure: None,
        }
    }

    /// Answer a single prompt.
    pub fn respond(&mut self, style: PromptStyle, message: &str) -> Result<String, AuthError> {
        match style {
            PromptStyle::EchoOff => Ok(self.password.clone()),
            PromptStyle::EchoOn | PromptStyle::TextInfo => Ok(String::new()),
            PromptStyle::ErrorMsg => {
                tracing::debug!(%message, "authentication stack reported an error");
                Ok(String::new())
            },
            PromptStyle::Unknown(code) => {
                let err = AuthError::UnrecognizedPromptStyle(code);
                self.failure = Some(err.clone());
                Err(err)
            },
        }
    }

    /// Failure recorded during the conversation, if any.
    pub fn take_failure(&mut self) -> Option<AuthError> {
        self.failure.take()
    }
}

impl Debug for PasswordConversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordConversation")
            .field("password", &"********")
            .field("failure", &self.failure)
            .finish()
    }
}

/// Verifies a username and password pair.
pub trait Authenticator: Send + Sync + Debug {
    /// Succeeds only once the stack has run its authentication step.
    fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_style_codes() {
        assert_eq!(PromptStyle::from(1), PromptStyle::EchoOff);
        assert_eq!(PromptStyle::from(2), PromptStyle::EchoOn);
        assert_eq!(PromptStyle::from(3), PromptStyle::ErrorMsg);
        assert_eq!(PromptStyle::from(4), PromptStyle::TextInfo);
        assert_eq!(PromptStyle::from(7), PromptStyle::Unknown(7));
    }

    #[test]
    fn test_echo_off_gets_password() {
        let mut conv = PasswordConversation::new("s3cr3t");
        assert_eq!(conv.respond(PromptStyle::EchoOff, "Password: ").unwrap(), "s3cr3t");
        assert!(conv.take_failure().is_none());
    }

    #[test]
    fn test_other_styles_get_empty_answer() {
        let mut conv = PasswordConversation::new("s3cr3t");
        for style in [PromptStyle::EchoOn, PromptStyle::ErrorMsg, PromptStyle::TextInfo] {
            assert_eq!(conv.respond(style, "message").unwrap(), "");
        }
    }

    #[test]
    fn test_unrecognized_style_fails() {
        let mut conv = PasswordConversation::new("s3cr3t");
        let err = conv.respond(PromptStyle::Unknown(5), "radio").unwrap_err();
        assert_eq!(err, AuthError::UnrecognizedPromptStyle(5));
        assert_eq!(conv.take_failure(), Some(AuthError::UnrecognizedPromptStyle(5)));
        assert!(conv.take_failure().is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let conv = PasswordConversation::new("hunter2");
        assert!(!format!("{conv:?}").contains("hunter2"));
    }
}
