use std::fmt;

use crate::{error::FetchError, report::WeatherReport};

/// Result of a single weather lookup.
pub type FetchOutcome = Result<WeatherReport, FetchError>;

/// A location name as typed by the user, trimmed of surrounding whitespace.
///
/// Sent to the provider verbatim; case and diacritics are kept for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Returns `None` when nothing is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inbound chat event, as handed over by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `/start` (or `/help`).
    Start,
    /// Any non-command text.
    Text(String),
}

impl InboundEvent {
    /// Classify a raw chat message.
    ///
    /// A command is `/` followed by `[A-Za-z0-9_]`, as Telegram marks them;
    /// anything else starting with `/` is plain text. Commands may carry a
    /// `@botname` suffix. Commands other than `/start` and `/help` are not
    /// events and yield `None`.
    pub fn from_text(text: &str) -> Option<Self> {
        let trimmed = text.trim_start();
        let Some(command) = trimmed
            .strip_prefix('/')
            .filter(|rest| rest.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
        else {
            return Some(Self::Text(text.to_owned()));
        };

        let name = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .split('@')
            .next()
            .unwrap_or_default();

        match name.to_lowercase().as_str() {
            "start" | "help" => Some(Self::Start),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed_but_otherwise_untouched() {
        let q = LocationQuery::parse("  Київ \n").expect("non-empty");
        assert_eq!(q.as_str(), "Київ");

        let q = LocationQuery::parse("san JOSÉ").expect("non-empty");
        assert_eq!(q.to_string(), "san JOSÉ");
    }

    #[test]
    fn blank_query_is_rejected() {
        assert_eq!(LocationQuery::parse(""), None);
        assert_eq!(LocationQuery::parse(" \t\n"), None);
    }

    #[test]
    fn start_and_help_commands() {
        assert_eq!(InboundEvent::from_text("/start"), Some(InboundEvent::Start));
        assert_eq!(InboundEvent::from_text("/START"), Some(InboundEvent::Start));
        assert_eq!(InboundEvent::from_text("/start@weather_bot"), Some(InboundEvent::Start));
        assert_eq!(InboundEvent::from_text("/help please"), Some(InboundEvent::Start));
    }

    #[test]
    fn unknown_commands_are_not_events() {
        assert_eq!(InboundEvent::from_text("/settings"), None);
        assert_eq!(InboundEvent::from_text("/123"), None);
        assert_eq!(InboundEvent::from_text("/_debug"), None);
    }

    #[test]
    fn slash_without_command_name_is_text() {
        for raw in ["/ Kyiv", "/-x", "/", "//Lviv"] {
            assert_eq!(
                InboundEvent::from_text(raw),
                Some(InboundEvent::Text(raw.to_string())),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn plain_text_is_kept_as_is() {
        assert_eq!(
            InboundEvent::from_text(" Kyiv "),
            Some(InboundEvent::Text(" Kyiv ".to_string()))
        );
    }
}
