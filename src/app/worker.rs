use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};
use tracing::{error, info};

use tether_graph::api::fetch_graph;
use tether_graph::config::ApiConfig;
use tether_graph::graph::{Edge, Node};
use tether_graph::layout::{CancelToken, Layout, LayoutConfig, layout_until};

pub(super) enum JobKind {
    FetchAndLayout(ApiConfig),
    Relayout { nodes: Vec<Node>, edges: Vec<Edge> },
}

impl JobKind {
    fn label(&self) -> &'static str {
        match self {
            Self::FetchAndLayout(_) => "fetch-and-layout",
            Self::Relayout { .. } => "relayout",
        }
    }
}

pub(super) struct LoadedGraph {
    pub(super) nodes: Vec<Node>,
    pub(super) layout: Layout,
    pub(super) config: LayoutConfig,
}

pub(super) enum JobPoll {
    Pending,
    Done(Result<LoadedGraph, String>),
    Lost,
}

/// A background fetch and/or layout run. Cancelled jobs never report back.
pub(super) struct Job {
    rx: Receiver<Result<LoadedGraph, String>>,
    cancel: CancelToken,
    config: LayoutConfig,
    label: &'static str,
}

impl Job {
    pub(super) fn spawn(kind: JobKind, config: LayoutConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let label = kind.label();

        let worker_cancel = cancel.clone();
        thread::spawn(move || {
            let result = match run_job(kind, config, &worker_cancel) {
                Ok(Some(loaded)) => Ok(loaded),
                Ok(None) => return,
                Err(error) => {
                    error!(job = label, "{error:#}");
                    Err(format!("{error:#}"))
                }
            };
            if !worker_cancel.is_cancelled() {
                let _ = tx.send(result);
            }
        });

        Self {
            rx,
            cancel,
            config,
            label,
        }
    }

    pub(super) fn poll(&self) -> JobPoll {
        match self.rx.try_recv() {
            Ok(result) => JobPoll::Done(result),
            Err(TryRecvError::Empty) => JobPoll::Pending,
            Err(TryRecvError::Disconnected) => JobPoll::Lost,
        }
    }

    pub(super) fn cancel(&self) {
        self.cancel.cancel();
    }

    pub(super) fn config(&self) -> LayoutConfig {
        self.config
    }

    pub(super) fn label(&self) -> &'static str {
        self.label
    }
}

/// Returns `Ok(None)` when the job was cancelled before it finished.
fn run_job(kind: JobKind, config: LayoutConfig, cancel: &CancelToken) -> Result<Option<LoadedGraph>> {
    let (mut nodes, edges) = match kind {
        JobKind::FetchAndLayout(api) => fetch_graph(&api)
            .context("failed to fetch domain relations")?
            .into_graph(),
        JobKind::Relayout { nodes, edges } => (nodes, edges),
    };

    if cancel.is_cancelled() {
        return Ok(None);
    }

    let Some(layout) = layout_until(&nodes, &edges, &config, cancel) else {
        return Ok(None);
    };
    layout.apply(&mut nodes);

    info!(
        nodes = nodes.len(),
        edges = layout.edges.len(),
        dropped = layout.dropped_edges.len(),
        "graph laid out"
    );
    Ok(Some(LoadedGraph {
        nodes,
        layout,
        config,
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use eframe::egui::Vec2;

    use super::*;
    use tether_graph::graph::edge_id;

    fn graph() -> (Vec<Node>, Vec<Edge>) {
        let nodes = ["a", "b"]
            .map(|id| Node {
                id: id.to_owned(),
                label: id.to_owned(),
                columns: Vec::new(),
                position: Vec2::ZERO,
            })
            .to_vec();
        let edges = vec![Edge {
            id: edge_id("a", "b"),
            source: "a".to_owned(),
            target: "b".to_owned(),
            weight: None,
        }];
        (nodes, edges)
    }

    #[test]
    fn relayout_job_reports_positions() {
        let (nodes, edges) = graph();
        let job = Job::spawn(JobKind::Relayout { nodes, edges }, LayoutConfig::default());

        let loaded = job
            .rx
            .recv_timeout(Duration::from_secs(10))
            .unwrap()
            .unwrap();

        assert_eq!(loaded.nodes.len(), 2);
        assert_ne!(loaded.nodes[0].position, Vec2::ZERO);
        assert_eq!(loaded.layout.edges.len(), 1);
    }

    #[test]
    fn cancelled_job_produces_nothing() {
        let (nodes, edges) = graph();
        let cancel = CancelToken::new();
        cancel.cancel();

        let outcome = run_job(
            JobKind::Relayout { nodes, edges },
            LayoutConfig::default(),
            &cancel,
        )
        .unwrap();

        assert!(outcome.is_none());
    }

    #[test]
    fn cancelled_job_never_sends() {
        let (nodes, edges) = graph();
        let config = LayoutConfig {
            iterations: 200_000,
            ..LayoutConfig::default()
        };
        let job = Job::spawn(JobKind::Relayout { nodes, edges }, config);
        job.cancel();

        assert!(job.rx.recv_timeout(Duration::from_secs(10)).is_err());
    }

    #[test]
    fn unreachable_api_is_an_error_result() {
        let api = ApiConfig::new("http://127.0.0.1:9");

        let error = run_job(
            JobKind::FetchAndLayout(api),
            LayoutConfig::default(),
            &CancelToken::new(),
        )
        .err()
        .unwrap();

        assert!(format!("{error:#}").contains("failed to fetch domain relations"));
    }
}
