//! Applies backend events to the view state the UI renders.

use std::collections::HashMap;

use country_core::ViewState;
use shared::domain::CountryKey;

use crate::controller::events::{err_label, UiErrorContext, UiEvent};
use crate::ui::app::{FlagPreviewState, StatusBanner};

pub fn apply_ui_event(
    view: &mut ViewState,
    flags: &mut HashMap<CountryKey, FlagPreviewState>,
    status: &mut String,
    status_banner: &mut Option<StatusBanner>,
    event: UiEvent,
) {
    match event {
        UiEvent::Info(message) => {
            *status = message;
        }
        UiEvent::CountriesLoaded(countries) => {
            let count = countries.len();
            view.fetch_succeeded(countries);
            flags.clear();
            *status = format!("Loaded {count} countries");
            tracing::info!(count, "country list applied to view");
        }
        UiEvent::Error(err) => {
            tracing::warn!(context = ?err.context(), "ui error: {}", err.message());
            match err.context() {
                UiErrorContext::FetchCountries | UiErrorContext::BackendStartup => {
                    // The single fetch either failed or can no longer happen.
                    view.fetch_failed(err.message());
                }
            }
            *status = format!("{} error", err_label(err.category()));
            *status_banner = Some(StatusBanner::error(format!(
                "{} error: {}",
                err_label(err.category()),
                err.message()
            )));
        }
        UiEvent::FlagLoaded { key, image } => {
            flags.insert(
                key,
                FlagPreviewState::Ready {
                    image,
                    texture: None,
                },
            );
        }
        UiEvent::FlagFailed { key, reason } => {
            tracing::debug!(%key, "flag unavailable: {reason}");
            flags.insert(key, FlagPreviewState::Error(reason));
        }
    }
}
