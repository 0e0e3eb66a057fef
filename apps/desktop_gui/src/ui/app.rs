use std::collections::HashMap;

use country_core::{PageView, ViewState};
use crossbeam_channel::{Receiver, Sender};
use egui::TextureHandle;
use shared::domain::{CountryDetails, CountryKey};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::apply_ui_event;

const CARD_WIDTH: f32 = 230.0;
const FLAG_HEIGHT: f32 = 130.0;

#[derive(Clone)]
pub struct FlagImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

pub enum FlagPreviewState {
    Loading,
    Ready {
        image: FlagImage,
        texture: Option<TextureHandle>,
    },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusBanner {
    pub severity: StatusBannerSeverity,
    pub message: String,
}

impl StatusBanner {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: StatusBannerSeverity::Error,
            message: message.into(),
        }
    }
}

/// Per-frame copy of what one card needs, so rendering does not hold a
/// borrow of the view state.
struct CardModel {
    key: CountryKey,
    official_name: String,
    flag_url: Option<String>,
}

/// Everything the panels read from the sort/filter/paginate pipeline, taken
/// once at the start of a frame.
struct FrameModel {
    cards: Vec<CardModel>,
    matching: usize,
    can_go_prev: bool,
    can_go_next: bool,
}

impl From<PageView<'_>> for FrameModel {
    fn from(page: PageView<'_>) -> Self {
        Self {
            cards: page
                .countries
                .into_iter()
                .map(|country| CardModel {
                    key: country.key(),
                    official_name: country.official_name().to_string(),
                    flag_url: country.flag_png().map(str::to_string),
                })
                .collect(),
            matching: page.matching,
            can_go_prev: page.can_go_prev,
            can_go_next: page.can_go_next,
        }
    }
}

pub struct CountryExplorerApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ViewState,
    flags: HashMap<CountryKey, FlagPreviewState>,
    status: String,
    status_banner: Option<StatusBanner>,
    api_base_url: String,
}

impl CountryExplorerApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: String,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            view: ViewState::new(),
            flags: HashMap::new(),
            status: "Starting".to_string(),
            status_banner: None,
            api_base_url,
        };

        if app.view.begin_fetch()
            && !dispatch_backend_command(
                &app.cmd_tx,
                BackendCommand::FetchCountries,
                &mut app.status,
            )
        {
            let message = app.status.clone();
            app.view.fetch_failed(message);
        }
        app
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(
                &mut self.view,
                &mut self.flags,
                &mut self.status,
                &mut self.status_banner,
                event,
            );
        }
    }

    /// Returns whether the search, sort or page changed.
    fn show_controls(&mut self, ctx: &egui::Context, frame: &FrameModel) -> bool {
        let mut changed = false;
        egui::TopBottomPanel::top("controls")
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(12, 10)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Countries");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.weak(&self.api_base_url);
                    });
                });
                ui.add_space(6.0);

                let mut search = self.view.search_value().to_string();
                let response = ui.add_sized(
                    [ui.available_width(), 30.0],
                    egui::TextEdit::singleline(&mut search)
                        .id_salt("country_search")
                        .hint_text("Search By Country Name"),
                );
                if response.changed() {
                    self.view.set_search_value(search);
                    changed = true;
                }
                ui.add_space(6.0);

                ui.horizontal(|ui| {
                    if ui.button("Ascending").clicked() {
                        self.view.set_sort_ascending();
                        changed = true;
                    }
                    if ui.button("Descending").clicked() {
                        self.view.set_sort_descending();
                        changed = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let next = ui.add_enabled(frame.can_go_next, egui::Button::new("Next"));
                        ui.label(format!("Page {}", self.view.current_page()));
                        let prev = ui.add_enabled(frame.can_go_prev, egui::Button::new("Previous"));
                        if next.clicked() {
                            self.view.next_page();
                            changed = true;
                        }
                        if prev.clicked() {
                            self.view.prev_page();
                            changed = true;
                        }
                    });
                });
            });
        changed
    }

    fn show_status_bar(&mut self, ctx: &egui::Context, frame: &FrameModel) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.small(&self.status);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.small(format!(
                        "{} matching · {} sort",
                        frame.matching,
                        self.view.sort_order().label().to_ascii_lowercase()
                    ));
                });
            });
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&banner.message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_results(&mut self, ctx: &egui::Context, frame: &FrameModel) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);

            if self.view.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
                return;
            }
            if let Some(error) = self.view.error() {
                ui.colored_label(ui.visuals().error_fg_color, error);
                return;
            }

            if frame.cards.is_empty() {
                ui.weak("No countries match your search.");
                return;
            }

            let mut details_requested = None;
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.spacing_mut().item_spacing = egui::vec2(12.0, 12.0);
                        for card in &frame.cards {
                            if self.show_country_card(ui, card) {
                                details_requested = Some(card.key.clone());
                            }
                        }
                    });
                });

            if let Some(key) = details_requested {
                self.view.open_details(key);
            }
        });
    }

    /// Renders one card; returns whether its details button was clicked.
    fn show_country_card(&mut self, ui: &mut egui::Ui, card: &CardModel) -> bool {
        let mut clicked = false;
        egui::Frame::group(ui.style())
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(8))
            .show(ui, |ui| {
                ui.set_width(CARD_WIDTH);
                ui.vertical(|ui| {
                    self.show_flag(ui, card);
                    ui.add_sized(
                        [CARD_WIDTH, 40.0],
                        egui::Label::new(egui::RichText::new(&card.official_name).strong())
                            .wrap(),
                    );
                    if ui
                        .add_sized([CARD_WIDTH, 28.0], egui::Button::new("See Country Details"))
                        .clicked()
                    {
                        clicked = true;
                    }
                });
            });
        clicked
    }

    fn show_flag(&mut self, ui: &mut egui::Ui, card: &CardModel) {
        let Some(url) = &card.flag_url else {
            ui.add_sized([CARD_WIDTH, FLAG_HEIGHT], egui::Label::new("No flag"));
            return;
        };

        if !self.flags.contains_key(&card.key) {
            let queued = dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchFlag {
                    key: card.key.clone(),
                    url: url.clone(),
                },
                &mut self.status,
            );
            if queued {
                self.flags.insert(card.key.clone(), FlagPreviewState::Loading);
            }
        }

        match self.flags.get_mut(&card.key) {
            Some(FlagPreviewState::Ready { image, texture }) => {
                let texture = texture.get_or_insert_with(|| {
                    let color_image =
                        egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
                    ui.ctx().load_texture(
                        format!("flag_{}", card.key),
                        color_image,
                        egui::TextureOptions::LINEAR,
                    )
                });
                let size = texture.size_vec2();
                let scale = (CARD_WIDTH / size.x).min(FLAG_HEIGHT / size.y);
                ui.allocate_ui(egui::vec2(CARD_WIDTH, FLAG_HEIGHT), |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::from_texture(egui::load::SizedTexture::new(
                            texture.id(),
                            size * scale,
                        )))
                        .on_hover_text(format!("{} flag", card.official_name));
                    });
                });
            }
            Some(FlagPreviewState::Error(reason)) => {
                let reason = reason.clone();
                ui.add_sized([CARD_WIDTH, FLAG_HEIGHT], egui::Label::new("Flag unavailable"))
                    .on_hover_text(reason);
            }
            Some(FlagPreviewState::Loading) | None => {
                ui.allocate_ui(egui::vec2(CARD_WIDTH, FLAG_HEIGHT), |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                });
            }
        }
    }

    fn show_details_window(&mut self, ctx: &egui::Context) {
        let Some(details) = self.view.open_details_view() else {
            return;
        };

        let mut open = true;
        let mut close_requested = false;
        egui::Window::new(&details.official_name)
            .id(egui::Id::new(("country_details", details.key.0.as_str())))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .open(&mut open)
            .show(ctx, |ui| {
                show_details_rows(ui, &details);
                ui.add_space(8.0);
                if ui
                    .add_sized([ui.available_width(), 28.0], egui::Button::new("Close"))
                    .clicked()
                {
                    close_requested = true;
                }
            });

        if !open || close_requested {
            self.view.close_details();
        }
    }
}

fn show_details_rows(ui: &mut egui::Ui, details: &CountryDetails) {
    egui::Grid::new(("details_grid", details.key.0.as_str()))
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.strong("CCA2:");
            ui.label(&details.cca2);
            ui.end_row();
            ui.strong("CCA3:");
            ui.label(&details.cca3);
            ui.end_row();
            ui.strong("Alternative Spellings:");
            ui.label(&details.alternative_spellings);
            ui.end_row();
            ui.strong("IDD:");
            ui.label(&details.idd);
            ui.end_row();
        });
}

impl eframe::App for CountryExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let frame = FrameModel::from(self.view.page_view());
        if self.show_controls(ctx, &frame) {
            ctx.request_repaint();
        }
        self.show_status_bar(ctx, &frame);
        self.show_results(ctx, &frame);
        self.show_details_window(ctx);

        let pending_flags = self
            .flags
            .values()
            .any(|state| matches!(state, FlagPreviewState::Loading));
        if self.view.is_loading() || pending_flags {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn new_app_queues_the_single_fetch() {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded::<UiEvent>(8);
        let app = CountryExplorerApp::new(cmd_tx, ui_rx, "http://127.0.0.1:9".to_string());

        assert!(app.view.is_loading());
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::FetchCountries)));
        assert!(cmd_rx.try_recv().is_err(), "exactly one fetch");
    }

    #[test]
    fn new_app_fails_fast_when_backend_is_gone() {
        let (cmd_tx, cmd_rx) = bounded(8);
        drop(cmd_rx);
        let (_ui_tx, ui_rx) = bounded::<UiEvent>(8);
        let app = CountryExplorerApp::new(cmd_tx, ui_rx, "http://127.0.0.1:9".to_string());

        assert!(!app.view.is_loading());
        assert!(app.view.error().is_some_and(|e| e.contains("disconnected")));
    }

    #[test]
    fn pending_events_are_drained_into_view() {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(8);
        let mut app = CountryExplorerApp::new(cmd_tx, ui_rx, "http://127.0.0.1:9".to_string());

        ui_tx
            .send(UiEvent::CountriesLoaded(Vec::new()))
            .expect("send");
        app.process_ui_events();

        assert!(!app.view.is_loading());
        assert_eq!(app.status, "Loaded 0 countries");
    }

    #[test]
    fn frame_model_carries_one_page_of_cards() {
        use shared::domain::{Country, CountryName, Flags};

        let (cmd_tx, _cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded::<UiEvent>(8);
        let mut app = CountryExplorerApp::new(cmd_tx, ui_rx, "http://127.0.0.1:9".to_string());
        let countries = (0..30)
            .map(|i| Country {
                name: CountryName {
                    official: format!("Country {i:02}"),
                    common: String::new(),
                },
                cca2: String::new(),
                cca3: format!("C{i:02}"),
                ccn3: None,
                alt_spellings: Vec::new(),
                idd: Default::default(),
                flags: Flags {
                    png: Some(format!("https://flags.test/{i}.png")),
                    ..Default::default()
                },
            })
            .collect();
        ui_tx.send(UiEvent::CountriesLoaded(countries)).expect("send");
        app.process_ui_events();

        let frame = FrameModel::from(app.view.page_view());
        assert_eq!(frame.matching, 30);
        assert_eq!(frame.cards.len(), 25);
        assert!(frame.can_go_next);
        assert!(!frame.can_go_prev);
        assert_eq!(frame.cards[0].key, CountryKey::from("C00"));
        assert_eq!(frame.cards[0].flag_url.as_deref(), Some("https://flags.test/0.png"));

        app.view.next_page();
        let frame = FrameModel::from(app.view.page_view());
        assert_eq!(frame.cards.len(), 5);
        assert!(!frame.can_go_next);
        assert!(frame.can_go_prev);

        let texture: Option<TextureHandle> = None;
        app.flags.insert(
            frame.cards[0].key.clone(),
            FlagPreviewState::Ready {
                image: FlagImage {
                    width: 1,
                    height: 1,
                    rgba: vec![0, 0, 0, 255],
                },
                texture,
            },
        );
        assert!(matches!(
            app.flags.get(&CountryKey::from("C25")),
            Some(FlagPreviewState::Ready { texture: None, .. })
        ));
    }
}
