//! UI layer for desktop GUI: app shell, country grid and details window.

pub mod app;

pub use app::CountryExplorerApp;
