//! Sort, filter and paginate stages applied to the fetched country list.
//!
//! Every stage returns a new sequence of borrowed records; the fetched list
//! itself is never reordered in place.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use shared::domain::Country;

use crate::collation::collation_key;

pub const PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAttribute {
    #[default]
    Name,
}

impl SortAttribute {
    /// The official spelling of the attribute the list is ordered by.
    pub fn official<'a>(self, country: &'a Country) -> &'a str {
        match self {
            Self::Name => &country.name.official,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

pub fn sort(countries: &[Country], attribute: SortAttribute, order: SortOrder) -> Vec<&Country> {
    let mut keyed: Vec<_> = countries
        .iter()
        .map(|country| (collation_key(attribute.official(country)), country))
        .collect();
    keyed.sort_by(|a, b| order.apply(a.0.cmp(&b.0)));
    keyed.into_iter().map(|(_, country)| country).collect()
}

/// Case-insensitive substring match on the official name. An empty query
/// keeps everything.
pub fn filter<'a>(sorted: &[&'a Country], query: &str) -> Vec<&'a Country> {
    if query.is_empty() {
        return sorted.to_vec();
    }

    let needle = query.to_lowercase();
    sorted
        .iter()
        .copied()
        .filter(|country| country.name.official.to_lowercase().contains(&needle))
        .collect()
}

/// Slice `[(page - 1) * page_size, page * page_size)` clamped to the input.
/// Page numbers are 1-based; page 0 and pages past the end are empty.
pub fn paginate<T>(filtered: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(first_page_index) = page.checked_sub(1) else {
        return &[];
    };
    let start = first_page_index
        .saturating_mul(page_size)
        .min(filtered.len());
    let end = page.saturating_mul(page_size).min(filtered.len());
    &filtered[start..end]
}

/// Whether a page holds a full `page_size` items, which is what keeps the
/// "Next" control enabled.
pub fn page_is_full<T>(page_items: &[T], page_size: usize) -> bool {
    page_items.len() >= page_size
}
