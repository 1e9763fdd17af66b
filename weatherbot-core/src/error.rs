//! Error types for lookups and configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Why a weather lookup failed.
///
/// `Display` is the diagnostic form and goes to the logs only; use
/// [`FetchError::user_message`] for anything shown to a chat user.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("location not recognized by the provider")]
    NotFound,

    #[error("provider responded with status {status}: {detail}")]
    Provider { status: u16, detail: String },

    #[error("could not reach the weather provider: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),
}

impl FetchError {
    /// Reply text for the chat user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => {
                "⚠️ Не вдалося знайти населений пункт. Перевірте правильність написання."
            }
            Self::Provider { .. } | Self::MalformedPayload(_) => {
                "❌ Погодний сервіс повернув помилку. Спробуйте пізніше."
            }
            Self::Connection(_) => "❌ Помилка з'єднання з погодним сервісом.",
        }
    }

    /// Short label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Provider { .. } => "provider",
            Self::Connection(_) => "connection",
            Self::MalformedPayload(_) => "malformed_payload",
        }
    }
}

/// Startup configuration errors. All of them are fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required credential {0}; set it in the environment, .env or config file")]
    MissingCredential(&'static str),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("could not determine platform config directory")]
    ConfigDir,

    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to build HTTP client")]
    HttpClient(#[from] reqwest::Error),
}
