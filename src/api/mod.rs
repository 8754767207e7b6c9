mod client;
mod error;
mod payload;

pub use client::fetch_graph;
pub use error::FetchError;
pub use payload::{GraphPayload, RawColumn, RawEdge, RawId, RawNode};
