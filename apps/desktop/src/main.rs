use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use country_core::{
    config::{load_settings, normalize_api_base_url},
    load_into, RestCountriesClient, ViewState,
};
use shared::domain::{CountryDetails, CountryKey};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Parser, Debug)]
#[command(about = "List countries from the countries API")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base_url: Option<String>,
    /// Case-insensitive substring of the official name.
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t = OrderArg::Asc)]
    order: OrderArg,
    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Show the details of one country (ccn3, or cca3 when it has none).
    #[arg(long)]
    details: Option<String>,
    #[arg(long)]
    json: bool,
}

fn render_page(state: &ViewState) -> String {
    let page = state.page_view();
    let mut out = String::new();
    for country in &page.countries {
        let _ = writeln!(out, "{:>4}  {}", country.key(), country.official_name());
    }
    let _ = writeln!(
        out,
        "-- page {} ({} sort){}{}",
        state.current_page(),
        state.sort_order().label().to_ascii_lowercase(),
        if page.can_go_prev { ", previous available" } else { "" },
        if page.can_go_next { ", next available" } else { "" },
    );
    out
}

fn render_details(details: &CountryDetails) -> String {
    format!(
        "{}\nCCA2: {}\nCCA3: {}\nAlternative Spellings: {}\nIDD: {}\n",
        details.official_name,
        details.cca2,
        details.cca3,
        details.alternative_spellings,
        details.idd
    )
}

fn apply_args(state: &mut ViewState, args: &Args) {
    state.set_search_value(args.search.clone());
    match args.order {
        OrderArg::Asc => state.set_sort_ascending(),
        OrderArg::Desc => state.set_sort_descending(),
    }
    state.go_to_page(args.page);
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = &args.api_base_url {
        settings.api_base_url = url.clone();
    }
    settings.api_base_url = normalize_api_base_url(&settings.api_base_url)?;

    let client = RestCountriesClient::new(&settings)?;
    let mut state = ViewState::new();
    load_into(&mut state, &client)
        .await
        .with_context(|| format!("could not load countries from {}", client.all_url()))?;

    if let Some(key) = &args.details {
        state.open_details(CountryKey::from(key.as_str()));
        let Some(details) = state.open_details_view() else {
            bail!("no country with key '{key}'");
        };
        if args.json {
            println!("{}", serde_json::to_string_pretty(&details)?);
        } else {
            print!("{}", render_details(&details));
        }
        return Ok(());
    }

    apply_args(&mut state, &args);
    if args.json {
        let page = state.page_view();
        tracing::debug!(page = state.current_page(), matching = page.matching, "rendering country page");
        println!("{}", serde_json::to_string_pretty(&page.countries)?);
    } else {
        tracing::debug!(page = state.current_page(), "rendering country page");
        print!("{}", render_page(&state));
    }

    Ok(())
}
