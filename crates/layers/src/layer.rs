use foundation::bounds::Aabb2;
use gpu::{Interaction, ViewState};

use crate::data::Dataset;
use crate::scale::ScaleType;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(pub String);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerType {
    Icon,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Lat,
    Lng,
    Icon,
}

/// Static description of one visual channel and the config keys feeding it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VisualChannelSpec {
    pub name: &'static str,
    /// Renderer attribute the channel drives.
    pub property: &'static str,
    pub field_key: &'static str,
    pub scale_key: &'static str,
    pub range_key: &'static str,
    pub default_scale: ScaleType,
}

/// Rows plus the subset of row indices that passed the external filters.
#[derive(Debug, Copy, Clone)]
pub struct LayerInput<'a> {
    pub dataset: &'a Dataset,
    pub filtered_index: &'a [usize],
}

impl<'a> LayerInput<'a> {
    pub fn new(dataset: &'a Dataset, filtered_index: &'a [usize]) -> Self {
        Self {
            dataset,
            filtered_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerMeta {
    /// Bounds of every row with a finite position; `None` if there are none.
    pub bounds: Option<Aabb2>,
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RenderContext {
    pub view: ViewState,
    pub interaction: Interaction,
    /// Draw order among the map's layers.
    pub layer_index: usize,
}

/// Capabilities every concrete layer variant provides to the map.
pub trait LayerKind {
    /// Validated rows plus per-row channel accessors.
    type Attributes;
    /// Attributes together with whatever the layer keeps between rebuilds.
    type Data;
    type Descriptor;

    fn id(&self) -> &LayerId;
    fn layer_type(&self) -> LayerType;
    fn required_columns(&self) -> &'static [ColumnRole];
    fn visual_channels(&self) -> &'static [VisualChannelSpec];

    /// Build attributes; when `reuse` is given its points are taken verbatim.
    fn calculate_data_attribute(
        &mut self,
        input: &LayerInput<'_>,
        reuse: Option<&Self::Data>,
    ) -> Self::Attributes;

    /// Rebuild the layer's data, reusing `previous` where it is still valid.
    fn format_layer_data(
        &mut self,
        input: &LayerInput<'_>,
        previous: Option<&Self::Data>,
    ) -> Self::Data;

    fn update_layer_meta(&mut self, dataset: &Dataset) -> &LayerMeta;

    fn render_layer(&self, data: &Self::Data, ctx: &RenderContext) -> Self::Descriptor;
}
