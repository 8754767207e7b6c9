use reqwest::blocking::Client;
use tracing::{debug, info};

use super::error::FetchError;
use super::payload::GraphPayload;
use crate::config::ApiConfig;

/// Fetches the domain relation graph with a single blocking GET.
pub fn fetch_graph(config: &ApiConfig) -> Result<GraphPayload, FetchError> {
    let url = config.relations_url();
    let query = config.query_pairs();
    debug!(%url, ?query, "fetching domain relations");

    let transport = |source| FetchError::Transport {
        url: url.clone(),
        source,
    };

    let response = Client::new()
        .get(&url)
        .query(&query)
        .send()
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().map_err(transport)?;
    let payload = serde_json::from_slice::<GraphPayload>(&body).map_err(|source| {
        FetchError::MalformedPayload {
            url: url.clone(),
            source,
        }
    })?;

    info!(
        nodes = payload.nodes.len(),
        edges = payload.edges.len(),
        "domain relations fetched"
    );
    Ok(payload)
}
