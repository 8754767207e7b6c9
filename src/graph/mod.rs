mod normalize;

use eframe::egui::Vec2;

pub use normalize::{edge_id, normalize};

/// A domain entity as drawn on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub columns: Vec<Column>,
    /// Zero until a layout has been applied.
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    /// `"{source}-{target}"`; parallel edges share an id.
    pub id: String,
    pub source: String,
    pub target: String,
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub package: String,
    pub dataset: Option<String>,
    pub examples: Vec<String>,
}
