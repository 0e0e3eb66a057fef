//! Country list core: fetching from the countries API, the sort/filter/page
//! pipeline, and the view state the desktop front ends render.

use shared::error::FetchError;

pub mod collation;
pub mod config;
pub mod pipeline;
pub mod source;
pub mod view;

pub use config::{load_settings, normalize_api_base_url, Settings};
pub use pipeline::{filter, paginate, sort, SortAttribute, SortOrder, PAGE_SIZE};
pub use source::{decode_countries, CountrySource, DecodedCountries, RestCountriesClient};
pub use view::{FetchStatus, PageView, ViewState};

/// Runs the one fetch a view gets and records the outcome on `state`.
/// A view that already started its fetch is left untouched.
pub async fn load_into(
    state: &mut ViewState,
    source: &dyn CountrySource,
) -> Result<(), FetchError> {
    if !state.begin_fetch() {
        return Ok(());
    }

    match source.fetch_all().await {
        Ok(countries) => {
            state.fetch_succeeded(countries);
            Ok(())
        }
        Err(err) => {
            tracing::error!("country list fetch failed: {err}");
            state.fetch_failed(err.to_string());
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
