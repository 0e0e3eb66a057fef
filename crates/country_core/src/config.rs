use std::{collections::HashMap, fs, time::Duration};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://restcountries.com/v3.1";
pub const SETTINGS_FILE: &str = "countries.toml";
/// Fields the country list needs; the public API rejects `/all` without a
/// `fields` filter.
pub const DEFAULT_API_FIELDS: &str = "name,cca2,cca3,ccn3,altSpellings,idd,flags";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// `fields` query passed through to the API. `None` sends no filter.
    pub api_fields: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 15,
            api_fields: Some(DEFAULT_API_FIELDS.into()),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then `countries.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> Settings {
    let raw_file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(raw_file.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    raw_file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = raw_file {
        match toml::from_str::<HashMap<String, toml::Value>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
                    settings.api_base_url = v.to_string();
                }
                if let Some(v) = file_cfg
                    .get("request_timeout_secs")
                    .and_then(toml::Value::as_integer)
                    .and_then(|v| u64::try_from(v).ok())
                {
                    settings.request_timeout_secs = v;
                }
                if let Some(v) = file_cfg.get("api_fields").and_then(toml::Value::as_str) {
                    settings.api_fields = fields_setting(v);
                }
            }
            Err(err) => tracing::warn!("ignoring unreadable {SETTINGS_FILE}: {err}"),
        }
    }

    if let Some(v) = env("COUNTRIES_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__API_FIELDS") {
        settings.api_fields = fields_setting(&v);
    }

    settings
}

/// A blank value turns the `fields` filter off.
fn fields_setting(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn normalize_api_base_url(raw_api_base_url: &str) -> anyhow::Result<String> {
    let trimmed = raw_api_base_url.trim().trim_end_matches('/');

    if trimmed.is_empty() {
        return Ok(Settings::default().api_base_url);
    }

    let parsed = Url::parse(trimmed)
        .with_context(|| format!("invalid api base url '{raw_api_base_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!(
            "api base url '{raw_api_base_url}' must use http or https, not '{}'",
            parsed.scheme()
        );
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_point_at_public_api() {
        let settings = load_settings_from(None, no_env);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_base_url, "https://restcountries.com/v3.1");
        assert_eq!(settings.request_timeout(), Duration::from_secs(15));
        assert_eq!(
            settings.api_fields.as_deref(),
            Some("name,cca2,cca3,ccn3,altSpellings,idd,flags")
        );
    }

    #[test]
    fn fields_filter_can_be_replaced_or_turned_off() {
        let settings = load_settings_from(None, |name| {
            (name == "APP__API_FIELDS").then(|| "name,flags".to_string())
        });
        assert_eq!(settings.api_fields.as_deref(), Some("name,flags"));

        let settings = load_settings_from(Some(r#"api_fields = "name""#), |name| {
            (name == "APP__API_FIELDS").then(|| " ".to_string())
        });
        assert_eq!(settings.api_fields, None);

        let settings = load_settings_from(Some(r#"api_fields = """#), no_env);
        assert_eq!(settings.api_fields, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let raw = r#"
            api_base_url = "http://127.0.0.1:9000/v3.1"
            request_timeout_secs = 3
            api_fields = "name,cca2"
        "#;
        let settings = load_settings_from(Some(raw), no_env);
        assert_eq!(settings.api_base_url, "http://127.0.0.1:9000/v3.1");
        assert_eq!(settings.request_timeout_secs, 3);
        assert_eq!(settings.api_fields.as_deref(), Some("name,cca2"));
    }

    #[test]
    fn app_prefixed_env_wins_over_file_and_plain_env() {
        let raw = r#"api_base_url = "http://file.example""#;
        let settings = load_settings_from(Some(raw), |name| match name {
            "COUNTRIES_API_BASE_URL" => Some("http://plain.example".to_string()),
            "APP__API_BASE_URL" => Some("http://app.example".to_string()),
            "APP__REQUEST_TIMEOUT_SECS" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(settings.api_base_url, "http://app.example");
        assert_eq!(settings.request_timeout_secs, 15);
    }

    #[test]
    fn malformed_file_is_ignored() {
        let settings = load_settings_from(Some("api_base_url = ["), no_env);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn normalizes_trailing_slashes_and_blank_values() {
        assert_eq!(
            normalize_api_base_url(" https://restcountries.com/v3.1/ ").expect("valid"),
            "https://restcountries.com/v3.1"
        );
        assert_eq!(
            normalize_api_base_url("   ").expect("blank"),
            DEFAULT_API_BASE_URL
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(normalize_api_base_url("ftp://example.com").is_err());
        assert!(normalize_api_base_url("not a url").is_err());
    }
}
