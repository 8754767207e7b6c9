use eframe::egui::{self, Color32, Frame, Id, Order, RichText, Ui, vec2};

use tether_graph::graph::Column;

use super::ViewModel;
use super::render_utils::screen_radius;

const SHOWN_EXAMPLES: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct DetailRow {
    pub(super) package: String,
    pub(super) column: String,
    pub(super) examples: String,
}

pub(super) fn detail_rows(columns: &[Column]) -> Vec<DetailRow> {
    columns
        .iter()
        .map(|column| DetailRow {
            package: column.package.clone(),
            column: column.name.clone(),
            examples: column
                .examples
                .iter()
                .take(SHOWN_EXAMPLES)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect()
}

impl ViewModel {
    pub(super) fn is_detail_open(&self, id: &str) -> bool {
        self.open_details.get(id).copied().unwrap_or(false)
    }

    pub(super) fn toggle_details(&mut self, id: &str) {
        let open = self.open_details.entry(id.to_owned()).or_insert(false);
        *open = !*open;
    }

    /// Floating column tables for every node whose detail state is open.
    pub(super) fn draw_detail_panels(&self, ui: &Ui, canvas: egui::Rect) {
        let offset = vec2(screen_radius(self.zoom) + 8.0, -8.0);

        for (index, node) in self.nodes.iter().enumerate() {
            if node.columns.is_empty() || !self.is_detail_open(&node.id) {
                continue;
            }
            let Some(anchor) = self.screen_positions.get(index).copied() else {
                continue;
            };
            if !canvas.contains(anchor) {
                continue;
            }

            egui::Area::new(Id::new(("node-details", node.id.as_str())))
                .order(Order::Foreground)
                .fixed_pos(anchor + offset)
                .constrain_to(canvas)
                .interactable(false)
                .show(ui.ctx(), |ui| {
                    Frame::popup(ui.style())
                        .fill(Color32::from_rgb(240, 240, 240))
                        .show(ui, |ui| {
                            ui.label(RichText::new(&node.label).strong().color(Color32::BLACK));
                            egui::Grid::new(("node-details-grid", node.id.as_str()))
                                .striped(true)
                                .spacing(vec2(10.0, 4.0))
                                .show(ui, |ui| {
                                    for heading in ["Package", "Column", "Example"] {
                                        ui.label(RichText::new(heading).small().strong());
                                    }
                                    ui.end_row();

                                    for row in detail_rows(&node.columns) {
                                        ui.label(RichText::new(row.package).small());
                                        ui.label(RichText::new(row.column).small());
                                        ui.label(RichText::new(row.examples).small());
                                        ui.end_row();
                                    }
                                });
                        });
                });
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn column(name: &str, examples: &[&str]) -> Column {
        Column {
            name: name.to_owned(),
            package: "crm".to_owned(),
            dataset: None,
            examples: examples.iter().map(|value| (*value).to_owned()).collect(),
        }
    }

    #[test]
    fn rows_show_at_most_three_examples() {
        let rows = detail_rows(&[
            column("email", &["a@x", "b@x", "c@x", "d@x"]),
            column("age", &["41"]),
            column("empty", &[]),
        ]);

        assert_eq!(
            rows,
            vec![
                DetailRow {
                    package: "crm".to_owned(),
                    column: "email".to_owned(),
                    examples: "a@x, b@x, c@x".to_owned(),
                },
                DetailRow {
                    package: "crm".to_owned(),
                    column: "age".to_owned(),
                    examples: "41".to_owned(),
                },
                DetailRow {
                    package: "crm".to_owned(),
                    column: "empty".to_owned(),
                    examples: String::new(),
                },
            ]
        );
    }
}
