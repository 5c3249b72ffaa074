use std::path::PathBuf;
use std::sync::Arc;

use catalog::IconCatalog;
use clap::{Parser, Subcommand};
use gpu::ViewState;
use layers::config::IconLayerConfig;
use layers::data::Dataset;
use tools::{ToolError, load_catalog, load_json, render_summary, to_pretty_json};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build icon layer render descriptors from JSON inputs")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the icon layer pipeline and print a JSON summary of the descriptor
    Render {
        /// Dataset JSON: {id, fields, rows}
        #[arg(long)]
        data: PathBuf,

        /// Icon layer config JSON
        #[arg(long)]
        config: PathBuf,

        /// Icon geometry JSON: [{id, mesh: {positions, cells}}]
        #[arg(long)]
        icons: PathBuf,

        /// JSON array of row indices passing the filters (default: all rows)
        #[arg(long)]
        filter: Option<PathBuf>,

        /// Map zoom level
        #[arg(long, default_value_t = 14.0)]
        zoom: f64,

        /// Camera is being drag-rotated
        #[arg(long)]
        drag_rotate: bool,
    },

    /// List icon ids and vertex counts in a geometry file
    Icons {
        #[arg(long)]
        icons: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(Args::parse()) {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), ToolError> {
    match args.command {
        Command::Render {
            data,
            config,
            icons,
            filter,
            zoom,
            drag_rotate,
        } => {
            let dataset: Dataset = load_json(&data)?;
            let config: IconLayerConfig = load_json(&config)?;
            let catalog = IconCatalog::install(load_catalog(&icons)?)?;
            let filter: Option<Vec<usize>> = match filter {
                Some(path) => Some(load_json(&path)?),
                None => None,
            };
            info!(dataset = %dataset.id, rows = dataset.len(), "loaded dataset");

            let summary = render_summary(
                &dataset,
                config,
                Arc::clone(&catalog),
                filter,
                ViewState::from_zoom(zoom, drag_rotate),
            );
            println!("{}", to_pretty_json(&summary)?);
        }
        Command::Icons { icons } => {
            let catalog = load_catalog(&icons)?;
            for id in catalog.ids() {
                let floats = catalog.geometry(id).map_or(0, <[f32]>::len);
                println!("{id}\t{}", floats / 3);
            }
            eprintln!("{} icons (content_hash={})", catalog.len(), catalog.content_hash());
        }
    }
    Ok(())
}
