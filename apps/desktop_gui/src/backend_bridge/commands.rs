//! Backend commands queued from UI to backend worker.

use shared::domain::CountryKey;

pub enum BackendCommand {
    FetchCountries,
    FetchFlag { key: CountryKey, url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::FetchCountries => "fetch_countries",
            BackendCommand::FetchFlag { .. } => "fetch_flag",
        }
    }
}
