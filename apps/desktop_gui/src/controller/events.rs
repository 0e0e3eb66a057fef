//! Backend-to-UI events and error modeling for the desktop GUI controller.

use shared::{
    domain::{Country, CountryKey},
    error::{FetchError, FetchErrorKind},
};

use crate::ui::app::FlagImage;

pub enum UiEvent {
    Info(String),
    CountriesLoaded(Vec<Country>),
    Error(UiError),
    FlagLoaded { key: CountryKey, image: FlagImage },
    FlagFailed { key: CountryKey, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Server,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FetchCountries,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Server => "Server",
        UiErrorCategory::Validation => "Data",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("http 5") || message_lower.contains("http 4") {
            UiErrorCategory::Server
        } else if message_lower.contains("invalid")
            || message_lower.contains("malformed")
            || message_lower.contains("expected")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("dns")
            || message_lower.contains("failed to reach")
            || message_lower.contains("disconnect")
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

    pub fn from_fetch_error(err: &FetchError) -> Self {
        let category = match err.kind() {
            FetchErrorKind::Transport => UiErrorCategory::Transport,
            FetchErrorKind::Status => UiErrorCategory::Server,
            FetchErrorKind::Decode => UiErrorCategory::Validation,
        };
        Self {
            category,
            context: UiErrorContext::FetchCountries,
            message: err.to_string(),
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
