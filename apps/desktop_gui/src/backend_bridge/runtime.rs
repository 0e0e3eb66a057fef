//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread, time::Duration};

use country_core::{CountrySource, RestCountriesClient, Settings};
use crossbeam_channel::{Receiver, Sender};
use reqwest::Client as HttpClient;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::app::FlagImage;

const FLAG_THUMBNAIL_WIDTH: u32 = 320;
const FLAG_THUMBNAIL_HEIGHT: u32 = 200;
const FLAG_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: Settings) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let source = match RestCountriesClient::new(&settings) {
                Ok(client) => Arc::new(client),
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to build countries client: {err}");
                    return;
                }
            };
            let flag_http = match build_flag_client(&settings) {
                Ok(http) => http,
                Err(err) => {
                    let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                        UiErrorContext::BackendStartup,
                        format!("backend worker startup failure: {err}"),
                    )));
                    tracing::error!("failed to build flag client: {err}");
                    return;
                }
            };
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::FetchCountries => {
                        let source = Arc::clone(&source);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match source.fetch_all().await {
                                Ok(countries) => UiEvent::CountriesLoaded(countries),
                                Err(err) => UiEvent::Error(UiError::from_fetch_error(&err)),
                            };
                            if ui_tx.send(event).is_err() {
                                tracing::debug!("ui closed before country list arrived");
                            }
                        });
                    }
                    BackendCommand::FetchFlag { key, url } => {
                        let http = flag_http.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match fetch_flag_image(&http, &url).await {
                                Ok(image) => UiEvent::FlagLoaded { key, image },
                                Err(reason) => UiEvent::FlagFailed { key, reason },
                            };
                            let _ = ui_tx.send(event);
                        });
                    }
                }
            }
            tracing::debug!("ui command queue closed; backend worker exiting");
        });
    });
}

/// Flag downloads give up after the configured request timeout.
fn build_flag_client(settings: &Settings) -> reqwest::Result<HttpClient> {
    HttpClient::builder()
        .timeout(settings.request_timeout())
        .connect_timeout(FLAG_CONNECT_TIMEOUT)
        .build()
}

async fn fetch_flag_image(http: &HttpClient, url: &str) -> Result<FlagImage, String> {
    let bytes = http
        .get(url)
        .send()
        .await
        .map_err(|err| format!("failed to download flag: {err}"))?
        .error_for_status()
        .map_err(|err| format!("flag host returned error: {err}"))?
        .bytes()
        .await
        .map_err(|err| format!("failed to read flag body: {err}"))?;
    decode_flag_image(&bytes)
}

pub fn decode_flag_image(bytes: &[u8]) -> Result<FlagImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = if dynamic.width() > FLAG_THUMBNAIL_WIDTH
        || dynamic.height() > FLAG_THUMBNAIL_HEIGHT
    {
        dynamic.thumbnail(FLAG_THUMBNAIL_WIDTH, FLAG_THUMBNAIL_HEIGHT)
    } else {
        dynamic
    }
    .to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(FlagImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}
