use egui::{Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::checkpoint::ModalViewState;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;
const MAX_BODY_HEIGHT: f32 = 480.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalEvent {
    Close,
}

/// Results window for one checkpoint. Holds no state of its own: whether it
/// is open is owned by the caller, which is told through [`ModalEvent::Close`]
/// when the user dismisses it.
pub struct ResultsModal<'a> {
    view: &'a ModalViewState,
}

impl<'a> ResultsModal<'a> {
    pub fn new(view: &'a ModalViewState) -> Self {
        Self { view }
    }

    pub fn show(self, ctx: &egui::Context, is_open: bool) -> Option<ModalEvent> {
        if !is_open {
            return None;
        }

        let mut open = true;
        let mut close_clicked = false;
        egui::Window::new(RichText::new(&self.view.title).strong())
            .id(egui::Id::new("results_modal"))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(520.0)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .max_height(MAX_BODY_HEIGHT)
                    .show(ui, |ui| {
                        self.results_table(ui, "Hommes", &self.view.men_rows);
                        ui.add_space(8.0);
                        self.results_table(ui, "Femmes", &self.view.women_rows);
                    });
                ui.separator();
                if ui.button("Close").clicked() {
                    close_clicked = true;
                }
            });

        (!open || close_clicked).then_some(ModalEvent::Close)
    }

    fn results_table(&self, ui: &mut Ui, label: &str, rows: &[Vec<String>]) {
        let color = heading_color(ui.visuals());
        ui.label(
            RichText::new(format!("{} ({})", label, rows.len()))
                .color(color)
                .strong(),
        );

        let mut table = TableBuilder::new(ui)
            .id_salt(label)
            .striped(true)
            // the window body scrolls both tables together
            .vscroll(false)
            .column(Column::auto().resizable(true).at_least(120.0));
        for _ in 1..self.view.headers.len() {
            table = table.column(Column::auto().at_least(60.0));
        }

        table
            .header(HEADER_HEIGHT, |mut header| {
                for h in &self.view.headers {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    if let Some(cells) = rows.get(row.index()) {
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    }
                });
            });
    }
}

/// Table heading color, taken from the active theme so it stays readable on
/// both light and dark panels
fn heading_color(visuals: &egui::Visuals) -> Color32 {
    visuals.strong_text_color()
}
