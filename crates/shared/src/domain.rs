use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(CountryKey);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryName {
    pub official: String,
    #[serde(default)]
    pub common: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idd {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub suffixes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One record of the countries API. Only `name.official` is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: CountryName,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub cca3: String,
    #[serde(default)]
    pub ccn3: Option<String>,
    #[serde(default)]
    pub alt_spellings: Vec<String>,
    #[serde(default)]
    pub idd: Idd,
    #[serde(default)]
    pub flags: Flags,
}

impl Country {
    /// `ccn3` when the record has one, `cca3` otherwise.
    pub fn key(&self) -> CountryKey {
        match self.ccn3.as_deref() {
            Some(ccn3) if !ccn3.is_empty() => CountryKey(ccn3.to_string()),
            _ => CountryKey(self.cca3.clone()),
        }
    }

    pub fn official_name(&self) -> &str {
        &self.name.official
    }

    pub fn alt_spellings_label(&self) -> String {
        format!("{}.", self.alt_spellings.join(", "))
    }

    /// Root followed by the comma-joined suffixes, e.g. `+1201,202`.
    pub fn dialing_code(&self) -> String {
        format!(
            "{}{}",
            self.idd.root.as_deref().unwrap_or_default(),
            self.idd.suffixes.join(",")
        )
    }

    pub fn flag_png(&self) -> Option<&str> {
        self.flags.png.as_deref().filter(|url| !url.is_empty())
    }
}

/// What the details overlay shows for one country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryDetails {
    pub key: CountryKey,
    pub official_name: String,
    pub cca2: String,
    pub cca3: String,
    pub alternative_spellings: String,
    pub idd: String,
}

impl From<&Country> for CountryDetails {
    fn from(country: &Country) -> Self {
        Self {
            key: country.key(),
            official_name: country.name.official.clone(),
            cca2: country.cca2.clone(),
            cca3: country.cca3.clone(),
            alternative_spellings: country.alt_spellings_label(),
            idd: country.dialing_code(),
        }
    }
}
