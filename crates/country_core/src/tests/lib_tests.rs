use super::*;
use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{Country, CountryKey};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct ServerState {
    status: StatusCode,
    body: Value,
    query_tx: Arc<Mutex<Option<oneshot::Sender<HashMap<String, String>>>>>,
}

async fn handle_all(
    State(state): State<ServerState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if let Some(tx) = state.query_tx.lock().await.take() {
        let _ = tx.send(query);
    }
    (state.status, Json(state.body.clone()))
}

async fn spawn_countries_server(
    status: StatusCode,
    body: Value,
) -> anyhow::Result<(String, oneshot::Receiver<HashMap<String, String>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let (tx, rx) = oneshot::channel();
    let state = ServerState {
        status,
        body,
        query_tx: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/v3.1/all", get(handle_all))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/v3.1"), rx))
}

fn settings_for(api_base_url: String) -> Settings {
    Settings {
        api_base_url,
        request_timeout_secs: 5,
        api_fields: None,
    }
}

fn sample_payload() -> Value {
    json!([
        {
            "name": { "common": "Zambia", "official": "Republic of Zambia" },
            "cca2": "ZM",
            "ccn3": "894",
            "cca3": "ZMB",
            "altSpellings": ["ZM", "Republic of Zambia"],
            "idd": { "root": "+2", "suffixes": ["60"] },
            "flags": { "png": "https://flagcdn.com/w320/zm.png" }
        },
        {
            "name": { "common": "Aruba", "official": "Aruba" },
            "cca2": "AW",
            "ccn3": "533",
            "cca3": "ABW",
            "altSpellings": ["AW"],
            "idd": { "root": "+2", "suffixes": ["97"] },
            "flags": { "png": "https://flagcdn.com/w320/aw.png" }
        }
    ])
}

struct StaticSource(Result<Vec<Country>, FetchError>);

#[async_trait]
impl CountrySource for StaticSource {
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError> {
        self.0.clone()
    }
}

#[tokio::test]
async fn fetches_and_decodes_all_countries() {
    let (base_url, query_rx) = spawn_countries_server(StatusCode::OK, sample_payload())
        .await
        .expect("spawn server");
    let client = RestCountriesClient::new(&settings_for(base_url)).expect("client");

    let countries = client.fetch_all().await.expect("fetch");
    assert_eq!(countries.len(), 2);
    assert_eq!(countries[0].name.official, "Republic of Zambia");
    assert_eq!(countries[1].key(), CountryKey::from("533"));

    let query = query_rx.await.expect("request observed");
    assert!(query.is_empty(), "no fields query when the filter is off");
}

#[tokio::test]
async fn default_settings_request_the_card_and_details_fields() {
    let (base_url, query_rx) = spawn_countries_server(StatusCode::OK, sample_payload())
        .await
        .expect("spawn server");
    let settings = Settings {
        api_base_url: base_url,
        ..Settings::default()
    };
    let client = RestCountriesClient::new(&settings).expect("client");

    client.fetch_all().await.expect("fetch");
    let query = query_rx.await.expect("request observed");
    assert_eq!(
        query.get("fields").map(String::as_str),
        Some("name,cca2,cca3,ccn3,altSpellings,idd,flags")
    );
}

#[tokio::test]
async fn passes_configured_fields_query() {
    let (base_url, query_rx) = spawn_countries_server(StatusCode::OK, sample_payload())
        .await
        .expect("spawn server");
    let mut settings = settings_for(base_url);
    settings.api_fields = Some("name,cca2,cca3,ccn3".to_string());
    let client = RestCountriesClient::new(&settings).expect("client");

    client.fetch_all().await.expect("fetch");
    let query = query_rx.await.expect("request observed");
    assert_eq!(
        query.get("fields").map(String::as_str),
        Some("name,cca2,cca3,ccn3")
    );
}

#[tokio::test]
async fn http_500_surfaces_as_status_error() {
    let (base_url, _query_rx) =
        spawn_countries_server(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "boom" }))
            .await
            .expect("spawn server");
    let client = RestCountriesClient::new(&settings_for(base_url)).expect("client");

    let err = client.fetch_all().await.expect_err("must fail");
    assert_eq!(err, FetchError::Status { status: 500 });
}

#[tokio::test]
async fn http_500_leaves_view_in_error_with_no_cards() {
    let (base_url, _query_rx) =
        spawn_countries_server(StatusCode::INTERNAL_SERVER_ERROR, json!([]))
            .await
            .expect("spawn server");
    let client = RestCountriesClient::new(&settings_for(base_url)).expect("client");
    let mut state = ViewState::new();

    let result = load_into(&mut state, &client).await;

    assert!(result.is_err());
    assert!(!state.is_loading());
    assert_eq!(state.error(), Some("Something went wrong! (HTTP 500)"));
    assert!(state.visible_countries().is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client =
        RestCountriesClient::new(&settings_for(format!("http://{addr}"))).expect("client");
    let err = client.fetch_all().await.expect_err("must fail");
    assert!(matches!(err, FetchError::Transport(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn non_array_payload_is_a_decode_error() {
    let (base_url, _query_rx) =
        spawn_countries_server(StatusCode::OK, json!({ "status": 400 }))
            .await
            .expect("spawn server");
    let client = RestCountriesClient::new(&settings_for(base_url)).expect("client");

    let err = client.fetch_all().await.expect_err("must fail");
    assert!(matches!(err, FetchError::Decode(_)), "unexpected: {err:?}");
}

#[test]
fn records_without_official_name_are_skipped() {
    let decoded = decode_countries(json!([
        { "name": { "official": "Aruba" }, "ccn3": "533" },
        { "name": { "common": "Nameless" }, "ccn3": "999" },
        "not even an object",
        { "name": { "official": "Republic of Zambia" }, "ccn3": "894" }
    ]))
    .expect("array decodes");

    assert_eq!(decoded.skipped, 2);
    let names: Vec<&str> = decoded
        .countries
        .iter()
        .map(|country| country.official_name())
        .collect();
    assert_eq!(names, vec!["Aruba", "Republic of Zambia"]);
}

#[test]
fn trailing_slash_in_base_url_is_not_doubled() {
    let client = RestCountriesClient::with_http_client(
        reqwest::Client::new(),
        &settings_for("https://restcountries.com/v3.1/".to_string()),
    );
    assert_eq!(client.all_url(), "https://restcountries.com/v3.1/all");
}

#[tokio::test]
async fn load_into_runs_only_one_fetch() {
    let decoded = decode_countries(sample_payload()).expect("decode");
    let source = StaticSource(Ok(decoded.countries));
    let mut state = ViewState::new();

    load_into(&mut state, &source).await.expect("first load");
    assert_eq!(state.fetch_status(), &FetchStatus::Success);
    assert_eq!(state.countries().len(), 2);

    let failing = StaticSource(Err(FetchError::Transport("offline".to_string())));
    load_into(&mut state, &failing)
        .await
        .expect("second load is a no-op");
    assert_eq!(state.fetch_status(), &FetchStatus::Success);
}

#[tokio::test]
async fn loaded_view_supports_search_sort_and_details() {
    let decoded = decode_countries(sample_payload()).expect("decode");
    let mut state = ViewState::new();
    load_into(&mut state, &StaticSource(Ok(decoded.countries)))
        .await
        .expect("load");

    let visible: Vec<&str> = state
        .visible_countries()
        .iter()
        .map(|country| country.official_name())
        .collect();
    assert_eq!(visible, vec!["Aruba", "Republic of Zambia"]);

    state.set_search_value("ZAM");
    state.set_sort_descending();
    let visible: Vec<&str> = state
        .visible_countries()
        .iter()
        .map(|country| country.official_name())
        .collect();
    assert_eq!(visible, vec!["Republic of Zambia"]);

    state.open_details(CountryKey::from("894"));
    let details = state.open_details_view().expect("details");
    assert_eq!(details.alternative_spellings, "ZM, Republic of Zambia.");
    assert_eq!(details.idd, "+260");
}
