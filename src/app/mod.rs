use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{info, warn};

use tether_graph::config::ApiConfig;
use tether_graph::graph::Node;
use tether_graph::layout::{LayoutConfig, ResolvedEdge};

mod canvas;
mod details;
mod interaction;
mod minimap;
mod panels;
mod render_utils;
mod worker;

use worker::{Job, JobKind, JobPoll, LoadedGraph};

pub struct TetherApp {
    api: ApiConfig,
    state: AppState,
    /// The single in-flight job; replacing it cancels the previous one.
    job: Option<Job>,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

/// What the view asks the application to do after a frame.
enum ViewRequest {
    Reload,
    Relayout(LayoutConfig),
}

struct ViewModel {
    nodes: Vec<Node>,
    edges: Vec<ResolvedEdge>,
    dropped_edge_count: usize,
    /// Failure of the latest job while a graph stays on screen.
    last_error: Option<String>,
    layout_config: LayoutConfig,
    show_edges: bool,
    pan: Vec2,
    zoom: f32,
    fit_pending: bool,
    selected: HashSet<String>,
    /// Detail table state per node id; absent means closed.
    open_details: HashMap<String, bool>,
    search: String,
    search_cache: Option<SearchCache>,
    box_select_origin: Option<Pos2>,
    screen_positions: Vec<Pos2>,
}

struct SearchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

impl TetherApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, api: ApiConfig, layout: LayoutConfig) -> Self {
        let job = Job::spawn(JobKind::FetchAndLayout(api.clone()), layout);
        Self {
            api,
            state: AppState::Loading,
            job: Some(job),
        }
    }

    fn start(&mut self, kind: JobKind, layout: LayoutConfig) {
        if let Some(previous) = self.job.take() {
            info!(previous = previous.label(), "superseding running job");
            previous.cancel();
        }
        self.job = Some(Job::spawn(kind, layout));
    }

    fn layout_config(&self) -> LayoutConfig {
        match &self.state {
            AppState::Ready(model) => model.layout_config,
            _ => self.job.as_ref().map(Job::config).unwrap_or_default(),
        }
    }

    fn handle_request(&mut self, request: ViewRequest) {
        match request {
            ViewRequest::Reload => {
                let layout = self.layout_config();
                if !matches!(self.state, AppState::Ready(_)) {
                    self.state = AppState::Loading;
                }
                self.start(JobKind::FetchAndLayout(self.api.clone()), layout);
            }
            ViewRequest::Relayout(config) => {
                let AppState::Ready(model) = &self.state else {
                    return;
                };
                let kind = JobKind::Relayout {
                    nodes: model.nodes.clone(),
                    edges: model.source_edges(),
                };
                self.start(kind, config);
            }
        }
    }

    fn finish_job(&mut self, result: Result<LoadedGraph, String>) {
        self.state = match (std::mem::replace(&mut self.state, AppState::Loading), result) {
            (AppState::Ready(mut model), Ok(loaded)) => {
                model.replace_graph(loaded);
                AppState::Ready(model)
            }
            (_, Ok(loaded)) => AppState::Ready(Box::new(ViewModel::new(loaded))),
            (AppState::Ready(mut model), Err(error)) => {
                warn!(%error, "keeping the current graph after a failed job");
                model.last_error = Some(error);
                AppState::Ready(model)
            }
            (_, Err(error)) => AppState::Error(error),
        };
    }
}

impl eframe::App for TetherApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        if let Some(job) = self.job.take() {
            match job.poll() {
                JobPoll::Pending => {
                    self.job = Some(job);
                    ctx.request_repaint();
                }
                JobPoll::Done(result) => self.finish_job(result),
                JobPoll::Lost => {
                    warn!(job = job.label(), "layout worker exited without a result");
                    self.finish_job(Err("Background worker disconnected".to_owned()));
                }
            }
        }

        let busy = self.job.is_some();
        let mut request = None;

        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading domain relations...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load domain relations");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.add_enabled(!busy, egui::Button::new("Retry")).clicked() {
                        request = Some(ViewRequest::Reload);
                    }
                });
            }
            AppState::Ready(model) => {
                request = model.show(ctx, &self.api.base_url, busy);
            }
        }

        if let Some(request) = request {
            self.handle_request(request);
        }
    }
}
