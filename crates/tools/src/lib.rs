use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::{CatalogError, IconCatalog};
use compute::update_layer_domains;
use gpu::{Interaction, RenderParams, UpdateTriggers, ViewState};
use layers::config::IconLayerConfig;
use layers::data::Dataset;
use layers::icon::IconLayer;
use layers::{LayerInput, LayerKind, RenderContext};
use serde::Serialize;
use tracing::info;

#[derive(Debug)]
pub enum ToolError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
    Encode(serde_json::Error),
    Catalog(CatalogError),
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            ToolError::Json { path, source } => {
                write!(f, "invalid json in {}: {source}", path.display())
            }
            ToolError::Encode(e) => write!(f, "failed to encode output: {e}"),
            ToolError::Catalog(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ToolError {}

impl From<CatalogError> for ToolError {
    fn from(e: CatalogError) -> Self {
        ToolError::Catalog(e)
    }
}

fn read(path: &Path) -> Result<String, ToolError> {
    fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ToolError> {
    let payload = read(path)?;
    serde_json::from_str(&payload).map_err(|source| ToolError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_catalog(path: &Path) -> Result<IconCatalog, ToolError> {
    Ok(IconCatalog::from_json_str(&read(path)?)?)
}

pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(ToolError::Encode)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub layer_id: String,
    pub point_count: usize,
    pub filtered_count: usize,
    /// `[min_lng, min_lat, max_lng, max_lat]` over all rows.
    pub bounds: Option<[f64; 4]>,
    pub icons: Vec<String>,
    pub params: RenderParams,
    pub update_triggers: UpdateTriggers,
}

/// Run one icon layer rebuild and describe the descriptor it produced.
///
/// Channel domains are recomputed from the dataset before building, and all
/// rows pass when `filter` is `None`.
pub fn render_summary(
    dataset: &Dataset,
    mut config: IconLayerConfig,
    catalog: Arc<IconCatalog>,
    filter: Option<Vec<usize>>,
    view: ViewState,
) -> RenderSummary {
    update_layer_domains(&mut config, dataset);
    let filtered = filter.unwrap_or_else(|| dataset.all_indices());

    let layer_id = if config.label.is_empty() {
        "icon".to_string()
    } else {
        config.label.to_lowercase()
    };
    let mut layer = IconLayer::new(layer_id, config, catalog);
    let input = LayerInput::new(dataset, &filtered);
    let data = layer.format_layer_data(&input, None);
    let ctx = RenderContext {
        view,
        interaction: Interaction::default(),
        layer_index: 0,
    };
    let desc = layer.render_layer(&data, &ctx);

    let mut icons: Vec<String> = desc.data.iter().map(|p| p.icon.clone()).collect();
    icons.sort();
    icons.dedup();

    info!(
        layer = %desc.id,
        points = desc.data.len(),
        filtered = filtered.len(),
        "built icon layer"
    );

    RenderSummary {
        layer_id: desc.id.to_string(),
        point_count: desc.data.len(),
        filtered_count: filtered.len(),
        bounds: layer.meta().bounds.map(|b| b.to_array()),
        icons,
        params: desc.params,
        update_triggers: desc.update_triggers,
    }
}
