use eframe::egui;
use pathway_explorer::config::{AppConfig, Page};

use crate::state::AppState;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PathwayExplorerApp {
    pub state: AppState,
}

impl PathwayExplorerApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for PathwayExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: navigation ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        let state = &mut self.state;
        let page = state.page;
        match page {
            Page::Home => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    pages::home(ui, state);
                });
            }
            Page::Reference => {
                egui::CentralPanel::default().show(ctx, |ui| match state.reference.as_mut() {
                    Some(reference) => pages::reference(ui, reference),
                    None => {
                        ui.spinner();
                    }
                });
            }
            Page::Sector(sector) => match state.sectors.get_mut(&sector) {
                Some(view) => {
                    // ---- Left side panel: filters ----
                    egui::SidePanel::left("filter_panel")
                        .default_width(260.0)
                        .resizable(true)
                        .show(ctx, |ui| {
                            panels::filter_panel(ui, view);
                        });

                    // ---- Central panel: data and chart ----
                    egui::CentralPanel::default().show(ctx, |ui| {
                        pages::sector(ui, view);
                    });
                }
                None => {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        pages::under_construction(ui, sector);
                    });
                }
            },
        }
    }
}
