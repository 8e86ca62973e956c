//! [`Authenticator`] implementation that authenticates against [`PAM`].
//!
//! [`PAM`]: https://en.wikipedia.org/wiki/Pluggable_authentication_module

use std::ffi::{CStr, CString};

use pam_client::{Context, ConversationHandler, Flag, ReturnCode};

use crate::auth::{Authenticator, PasswordConversation, PromptStyle};
use crate::error::AuthError;

/// [`Authenticator`] backed by the host PAM stack.
#[derive(Debug, Clone, Default)]
pub struct PamAuthenticator {
    service: String,
}

impl PamAuthenticator {
    /// Initialize a new [`PamAuthenticator`] for the given PAM service.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

struct Conversation(PasswordConversation);

impl Conversation {
    fn answer(&mut self, style: PromptStyle, prompt: &CStr) -> Result<CString, ReturnCode> {
        let reply = self
            .0
            .respond(style, &prompt.to_string_lossy())
            .map_err(|_| ReturnCode::CONV_ERR)?;
        CString::new(reply).map_err(|_| ReturnCode::CONV_ERR)
    }
}

impl ConversationHandler for Conversation {
    fn prompt_echo_on(&mut self, prompt: &CStr) -> Result<CString, ReturnCode> {
        self.answer(PromptStyle::EchoOn, prompt)
    }

    fn prompt_echo_off(&mut self, prompt: &CStr) -> Result<CString, ReturnCode> {
        self.answer(PromptStyle::EchoOff, prompt)
    }

    // Messages carry no reply and these styles always answer `Ok`.
    fn text_info(&mut self, msg: &CStr) {
        let _ = self.0.respond(PromptStyle::TextInfo, &msg.to_string_lossy());
    }

    fn error_msg(&mut self, msg: &CStr) {
        let _ = self.0.respond(PromptStyle::ErrorMsg, &msg.to_string_lossy());
    }
}

impl Authenticator for PamAuthenticator {
    #[tracing::instrument(skip(self, password))]
    fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let conversation = Conversation(PasswordConversation::new(password));
        let mut context = Context::new(&self.service, Some(username), conversation)
            .map_err(|err| AuthError::Pam(err.to_string()))?;

        let result = context.authenticate(Flag::NONE);
        if let Some(failure) = context.conversation_mut().0.take_failure() {
            return Err(failure);
        }

        result.map_err(|err| {
            tracing::debug!(error = %err, "pam rejected credentials");
            AuthError::Failed
        })
    }
}
