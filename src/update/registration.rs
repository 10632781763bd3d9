//! Update worker registration.
//!
//! The worker script must be served from the same origin as the
//! application, otherwise it could never control the application's pages
//! and registration is refused.

use url::Url;

use crate::config::UpdateConfig;

/// Error type for worker registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("update detection is disabled")]
    Disabled,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("worker script {script} is not on the application origin {public}")]
    CrossOrigin { script: Url, public: Url },
}

/// A validated worker registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    script_url: Url,
    scope: Url,
}

impl Registration {
    /// Resolve the worker script against the public URL.
    pub fn resolve(config: &UpdateConfig) -> Result<Self, RegistrationError> {
        if !config.enabled {
            return Err(RegistrationError::Disabled);
        }

        let public = Url::parse(&config.public_url)?;
        let script = public.join(&config.script_url)?;

        if script.origin() != public.origin() {
            return Err(RegistrationError::CrossOrigin { script, public });
        }

        Ok(Self {
            script_url: script,
            scope: public,
        })
    }

    pub fn script_url(&self) -> &Url {
        &self.script_url
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Served from a loopback host (development setups).
    pub fn is_localhost(&self) -> bool {
        match self.scope.host_str() {
            Some("localhost") | Some("[::1]") => true,
            Some(host) => host.starts_with("127."),
            None => false,
        }
    }
}
