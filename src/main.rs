mod app;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui::vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tether_graph::config::{ApiConfig, DEFAULT_API_URL};
use tether_graph::layout::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the tether API.
    #[arg(long, env = "TETHER_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Keep only the N strongest relations.
    #[arg(long)]
    nlargest: Option<usize>,

    /// Drop relations weaker than this.
    #[arg(long)]
    min_weight: Option<f64>,

    /// Example values fetched per column.
    #[arg(long)]
    num_examples: Option<usize>,

    #[arg(long, default_value_t = -350.0, allow_hyphen_values = true)]
    charge: f32,

    #[arg(long, default_value_t = 400.0, allow_hyphen_values = true)]
    center_x: f32,

    #[arg(long, default_value_t = 300.0, allow_hyphen_values = true)]
    center_y: f32,

    #[arg(long, default_value_t = 70.0)]
    collide_radius: f32,

    #[arg(long, default_value_t = 100.0)]
    link_distance: f32,

    #[arg(long, default_value_t = 300)]
    iterations: usize,
}

impl Args {
    fn api_config(&self) -> ApiConfig {
        ApiConfig {
            nlargest: self.nlargest,
            min_weight: self.min_weight,
            num_examples: self.num_examples,
            ..ApiConfig::new(&self.api_url)
        }
    }

    fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            charge_strength: self.charge,
            center: vec2(self.center_x, self.center_y),
            collide_radius: self.collide_radius,
            link_distance: self.link_distance,
            iterations: self.iterations,
            ..LayoutConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let api = args.api_config();
    let layout = args.layout_config();
    info!(api = %api.base_url, "starting tether graph viewer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "tether",
        options,
        Box::new(move |cc| Ok(Box::new(app::TetherApp::new(cc, api, layout)))),
    )
    .map_err(|error| anyhow!("failed to run viewer: {error}"))
}
