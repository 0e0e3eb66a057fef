//! View controller state shared by the desktop front ends.
//!
//! `ViewState` holds everything the result grid depends on. Front ends call
//! the action methods in response to user input and read the derived page
//! back on every frame.

use shared::domain::{Country, CountryDetails, CountryKey};
use tracing::{debug, warn};

use crate::pipeline::{self, SortAttribute, SortOrder, PAGE_SIZE};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// One frame's worth of derived data, computed from a single pass over the
/// sort and filter stages.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub countries: Vec<&'a Country>,
    pub matching: usize,
    pub can_go_prev: bool,
    pub can_go_next: bool,
}

#[derive(Debug, Clone)]
pub struct ViewState {
    countries: Vec<Country>,
    search_value: String,
    sort_attribute: SortAttribute,
    sort_order: SortOrder,
    current_page: usize,
    page_size: usize,
    fetch_status: FetchStatus,
    open_details: Option<CountryKey>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            countries: Vec::new(),
            search_value: String::new(),
            sort_attribute: SortAttribute::Name,
            sort_order: SortOrder::Ascending,
            current_page: 1,
            page_size: PAGE_SIZE,
            fetch_status: FetchStatus::Idle,
            open_details: None,
        }
    }

    /// Moves `idle -> loading`. Returns whether the caller should issue the
    /// fetch; there is exactly one fetch per view.
    pub fn begin_fetch(&mut self) -> bool {
        if self.fetch_status != FetchStatus::Idle {
            debug!(status = ?self.fetch_status, "fetch already started; ignoring");
            return false;
        }
        self.fetch_status = FetchStatus::Loading;
        true
    }

    pub fn fetch_succeeded(&mut self, countries: Vec<Country>) {
        if self.fetch_status != FetchStatus::Loading {
            warn!(status = ?self.fetch_status, "fetch result arrived outside loading state; dropped");
            return;
        }
        self.countries = countries;
        self.fetch_status = FetchStatus::Success;
    }

    pub fn fetch_failed(&mut self, message: impl Into<String>) {
        if self.fetch_status != FetchStatus::Loading {
            warn!(status = ?self.fetch_status, "fetch failure arrived outside loading state; dropped");
            return;
        }
        self.fetch_status = FetchStatus::Error(message.into());
    }

    pub fn fetch_status(&self) -> &FetchStatus {
        &self.fetch_status
    }

    pub fn is_loading(&self) -> bool {
        self.fetch_status == FetchStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.fetch_status {
            FetchStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn search_value(&self) -> &str {
        &self.search_value
    }

    pub fn set_search_value(&mut self, text: impl Into<String>) {
        self.search_value = text.into();
    }

    pub fn sort_attribute(&self) -> SortAttribute {
        self.sort_attribute
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn set_sort_ascending(&mut self) {
        self.sort_attribute = SortAttribute::Name;
        self.sort_order = SortOrder::Ascending;
    }

    pub fn set_sort_descending(&mut self) {
        self.sort_attribute = SortAttribute::Name;
        self.sort_order = SortOrder::Descending;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Jumps straight to a page. Page numbers below 1 are raised to 1.
    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page_view().can_go_next
    }

    pub fn next_page(&mut self) {
        if !self.can_go_next() {
            debug!(page = self.current_page, "next page unavailable");
            return;
        }
        self.current_page += 1;
    }

    pub fn prev_page(&mut self) {
        if !self.can_go_prev() {
            debug!(page = self.current_page, "previous page unavailable");
            return;
        }
        self.current_page -= 1;
    }

    /// All records passing the current search, in the current order.
    pub fn filtered_countries(&self) -> Vec<&Country> {
        let sorted = pipeline::sort(&self.countries, self.sort_attribute, self.sort_order);
        pipeline::filter(&sorted, &self.search_value)
    }

    /// The slice the grid renders.
    pub fn visible_countries(&self) -> Vec<&Country> {
        self.page_view().countries
    }

    pub fn page_view(&self) -> PageView<'_> {
        let filtered = self.filtered_countries();
        let countries = pipeline::paginate(&filtered, self.current_page, self.page_size).to_vec();
        PageView {
            can_go_next: pipeline::page_is_full(&countries, self.page_size),
            can_go_prev: self.can_go_prev(),
            matching: filtered.len(),
            countries,
        }
    }

    pub fn find(&self, key: &CountryKey) -> Option<&Country> {
        self.countries.iter().find(|country| &country.key() == key)
    }

    pub fn open_details(&mut self, key: CountryKey) {
        self.open_details = Some(key);
    }

    pub fn close_details(&mut self) {
        self.open_details = None;
    }

    pub fn open_details_key(&self) -> Option<&CountryKey> {
        self.open_details.as_ref()
    }

    pub fn open_details_view(&self) -> Option<CountryDetails> {
        self.open_details
            .as_ref()
            .and_then(|key| self.find(key))
            .map(CountryDetails::from)
    }
}
