//! Fetching, normalizing and laying out the tether domain-relations graph.
//! The egui viewer lives in the binary.

pub mod api;
pub mod config;
pub mod graph;
pub mod layout;
