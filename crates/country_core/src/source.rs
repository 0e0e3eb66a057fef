use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{domain::Country, error::FetchError};
use tracing::{debug, info, warn};

use crate::config::Settings;

#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError>;
}

/// Records that decoded, plus how many array elements had to be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCountries {
    pub countries: Vec<Country>,
    pub skipped: usize,
}

/// Decodes the `/all` payload element by element. Elements that do not carry
/// `name.official` are skipped instead of failing the whole list.
pub fn decode_countries(payload: Value) -> Result<DecodedCountries, FetchError> {
    let Value::Array(items) = payload else {
        return Err(FetchError::Decode(
            "expected a JSON array of countries".to_string(),
        ));
    };

    let mut countries = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Country>(item) {
            Ok(country) => countries.push(country),
            Err(err) => {
                skipped += 1;
                warn!(index, "skipping malformed country record: {err}");
            }
        }
    }

    Ok(DecodedCountries { countries, skipped })
}

pub struct RestCountriesClient {
    http: Client,
    api_base_url: String,
    api_fields: Option<String>,
}

impl RestCountriesClient {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|err| FetchError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self::with_http_client(http, settings))
    }

    pub fn with_http_client(http: Client, settings: &Settings) -> Self {
        Self {
            http,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            api_fields: settings.api_fields.clone(),
        }
    }

    pub fn all_url(&self) -> String {
        format!("{}/all", self.api_base_url)
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError> {
        let url = self.all_url();
        debug!(%url, "fetching country list");

        let mut request = self.http.get(&url);
        if let Some(fields) = &self.api_fields {
            request = request.query(&[("fields", fields)]);
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "country list request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))?;
        let decoded = decode_countries(payload)?;
        info!(
            countries = decoded.countries.len(),
            skipped = decoded.skipped,
            "country list loaded"
        );
        Ok(decoded.countries)
    }
}
