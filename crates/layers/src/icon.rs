use std::sync::Arc;

use catalog::IconCatalog;
use foundation::bounds::Aabb2;
use foundation::color::{Rgba, opaque};
use gpu::{
    DEFAULT_RADIUS_MAX_PIXELS, DEFAULT_RADIUS_MIN_PIXELS, IconGeometryLookup, RenderParams,
    TRIGGER_COLOR, TRIGGER_FILTER, TRIGGER_RADIUS, UpdateTriggers,
};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::accessor::{Accessor, ChannelAccessor, MemoizedAccessor};
use crate::channel::Channel;
use crate::config::{ChannelConfig, IconLayerConfig};
use crate::data::{Dataset, Row};
use crate::layer::{
    ColumnRole, LayerId, LayerInput, LayerKind, LayerMeta, LayerType, RenderContext,
    VisualChannelSpec,
};
use crate::scale::ScaleType;

pub const ICON_REQUIRED_COLUMNS: &[ColumnRole] =
    &[ColumnRole::Lat, ColumnRole::Lng, ColumnRole::Icon];

pub const ICON_VISUAL_CHANNELS: &[VisualChannelSpec] = &[
    VisualChannelSpec {
        name: "color",
        property: "color",
        field_key: "colorField",
        scale_key: "colorScale",
        range_key: "colorRange",
        default_scale: ScaleType::Quantile,
    },
    VisualChannelSpec {
        name: "size",
        property: "radius",
        field_key: "sizeField",
        scale_key: "sizeScale",
        range_key: "radiusRange",
        default_scale: ScaleType::Linear,
    },
];

/// Radius of every icon when no size field is bound.
pub const CONSTANT_RADIUS: f64 = 1.0;

/// A row that passed position/icon validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPoint {
    /// Index into the dataset's rows.
    pub index: usize,
    pub icon: String,
    /// `[lng, lat]`, both finite.
    pub position: [f64; 2],
    pub data: Row,
}

/// What decides whether a previous point list is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSignature {
    pub dataset_id: String,
    pub dataset_version: u64,
    pub row_count: usize,
    pub columns_key: String,
    pub filtered_count: usize,
    /// blake3 hex of the filtered indices.
    pub filtered_hash: String,
}

impl DataSignature {
    fn filter_trigger(&self) -> Value {
        json!({
            "datasetId": self.dataset_id,
            "datasetVersion": self.dataset_version,
            "filteredIndex": self.filtered_hash,
            "count": self.filtered_count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct IconDataAttribute {
    pub points: Arc<[ValidatedPoint]>,
    pub get_color: ChannelAccessor<Rgba>,
    pub get_radius: ChannelAccessor<f64>,
}

#[derive(Debug, Clone)]
pub struct IconLayerData {
    pub attributes: IconDataAttribute,
    pub signature: DataSignature,
}

impl IconLayerData {
    pub fn points(&self) -> &[ValidatedPoint] {
        &self.attributes.points
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.points.is_empty()
    }
}

/// Everything the external icon renderer needs for one draw.
#[derive(Debug, Clone)]
pub struct IconRenderDescriptor {
    pub id: LayerId,
    pub layer_index: usize,
    pub data: Arc<[ValidatedPoint]>,
    pub get_color: ChannelAccessor<Rgba>,
    pub get_radius: ChannelAccessor<f64>,
    pub get_icon_geometry: IconGeometryLookup,
    pub params: RenderParams,
    pub update_triggers: UpdateTriggers,
}

impl IconRenderDescriptor {
    pub fn color_of(&self, point: &ValidatedPoint) -> Rgba {
        self.get_color.eval(&point.data)
    }

    pub fn radius_of(&self, point: &ValidatedPoint) -> f64 {
        self.get_radius.eval(&point.data)
    }
}

pub struct IconLayer {
    id: LayerId,
    pub config: IconLayerConfig,
    catalog: Arc<IconCatalog>,
    position: MemoizedAccessor<IconLayerConfig, [f64; 2]>,
    icon: MemoizedAccessor<IconLayerConfig, Option<String>>,
    meta: LayerMeta,
    meta_key: Option<String>,
}

impl std::fmt::Debug for IconLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconLayer")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("position", &self.position)
            .field("icon", &self.icon)
            .field("meta", &self.meta)
            .finish()
    }
}

fn position_accessor(config: &IconLayerConfig) -> Accessor<[f64; 2]> {
    match (config.columns.lng, config.columns.lat) {
        (Some(lng), Some(lat)) => {
            Arc::new(move |row: &Row| [row.get(lng).as_f64(), row.get(lat).as_f64()])
        }
        _ => Arc::new(|_: &Row| [f64::NAN, f64::NAN]),
    }
}

fn position_key(config: &IconLayerConfig) -> String {
    format!("{:?}-{:?}", config.columns.lat, config.columns.lng)
}

fn icon_accessor(config: &IconLayerConfig) -> Accessor<Option<String>> {
    match config.columns.icon {
        Some(icon) => Arc::new(move |row: &Row| row.get(icon).as_key()),
        None => Arc::new(|_: &Row| None),
    }
}

fn icon_key(config: &IconLayerConfig) -> String {
    format!("{:?}", config.columns.icon)
}

/// Keep the filtered rows that have a finite position and a known icon.
///
/// Output order follows `filtered_index`; indices past the end of `rows`
/// are skipped.
pub fn filter_valid_points(
    rows: &[Row],
    filtered_index: &[usize],
    position: &Accessor<[f64; 2]>,
    icon: &Accessor<Option<String>>,
    catalog: &IconCatalog,
) -> Vec<ValidatedPoint> {
    let mut out = Vec::with_capacity(filtered_index.len());
    for &index in filtered_index {
        let Some(row) = rows.get(index) else {
            continue;
        };
        let pos = position(row);
        if !pos[0].is_finite() || !pos[1].is_finite() {
            continue;
        }
        let Some(id) = icon(row) else {
            continue;
        };
        if !catalog.contains(&id) {
            continue;
        }
        out.push(ValidatedPoint {
            index,
            icon: id,
            position: pos,
            data: row.clone(),
        });
    }
    out
}

fn filtered_hash(filtered_index: &[usize]) -> String {
    let mut hasher = blake3::Hasher::new();
    for &i in filtered_index {
        hasher.update(&(i as u64).to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

fn field_name(channel: &ChannelConfig) -> Value {
    match &channel.field {
        Some(f) => Value::String(f.name.clone()),
        None => Value::Null,
    }
}

impl IconLayer {
    pub fn new(id: impl Into<String>, config: IconLayerConfig, catalog: Arc<IconCatalog>) -> Self {
        Self {
            id: LayerId(id.into()),
            config,
            catalog,
            position: MemoizedAccessor::new(position_accessor, position_key),
            icon: MemoizedAccessor::new(icon_accessor, icon_key),
            meta: LayerMeta::default(),
            meta_key: None,
        }
    }

    pub fn meta(&self) -> &LayerMeta {
        &self.meta
    }

    pub fn position_accessor(&mut self) -> Accessor<[f64; 2]> {
        self.position.get(&self.config)
    }

    pub fn icon_accessor(&mut self) -> Accessor<Option<String>> {
        self.icon.get(&self.config)
    }

    pub fn has_required_columns(&self) -> bool {
        self.config.columns.has_all(self.required_columns())
    }

    pub fn data_signature(&self, input: &LayerInput<'_>) -> DataSignature {
        DataSignature {
            dataset_id: input.dataset.id.clone(),
            dataset_version: input.dataset.version,
            row_count: input.dataset.len(),
            columns_key: format!(
                "{}|{}",
                self.position.resolve_key(&self.config),
                self.icon.resolve_key(&self.config)
            ),
            filtered_count: input.filtered_index.len(),
            filtered_hash: filtered_hash(input.filtered_index),
        }
    }

    fn meta_key_for(&self, dataset: &Dataset) -> String {
        format!(
            "{}@{}#{}:{}",
            self.position.resolve_key(&self.config),
            dataset.id,
            dataset.version,
            dataset.len()
        )
    }

    fn color_channel(&self) -> ChannelAccessor<Rgba> {
        Channel::resolve(
            &self.config.color_channel,
            self.config.vis_config.color_range.clone(),
            opaque(self.config.color),
        )
        .into_accessor()
    }

    fn radius_channel(&self) -> ChannelAccessor<f64> {
        Channel::resolve(
            &self.config.size_channel,
            self.config.vis_config.radius_range,
            CONSTANT_RADIUS,
        )
        .into_accessor()
    }

    fn channel_trigger(
        &self,
        spec: &VisualChannelSpec,
        channel: &ChannelConfig,
    ) -> Map<String, Value> {
        let mut m = Map::new();
        m.insert(spec.field_key.to_string(), field_name(channel));
        m.insert(spec.scale_key.to_string(), json!(channel.scale.as_str()));
        let range = match spec.property {
            "radius" => json!(self.config.vis_config.radius_range),
            _ => json!(self.config.vis_config.color_range.colors),
        };
        m.insert(spec.range_key.to_string(), range);
        m
    }

    /// Per-attribute invalidation keys for the renderer.
    pub fn update_triggers(&self, signature: &DataSignature) -> UpdateTriggers {
        let mut triggers = UpdateTriggers::new();
        for spec in self.visual_channels() {
            match spec.property {
                "radius" => {
                    let m = self.channel_trigger(spec, &self.config.size_channel);
                    triggers.insert(TRIGGER_RADIUS, Value::Object(m));
                }
                "color" => {
                    let mut m = self.channel_trigger(spec, &self.config.color_channel);
                    m.insert("color".to_string(), json!(self.config.color));
                    triggers.insert(TRIGGER_COLOR, Value::Object(m));
                }
                _ => {}
            }
        }
        triggers.insert(TRIGGER_FILTER, signature.filter_trigger());
        triggers
    }

    /// Radius multiplier for the current zoom.
    pub fn radius_scale(&self, ctx: &RenderContext) -> f64 {
        let vis = &self.config.vis_config;
        if vis.fixed_radius {
            return 1.0;
        }
        let base = if self.config.size_channel.field.is_some() {
            1.0
        } else {
            vis.radius
        };
        base * ctx.view.radius_zoom_factor
    }
}

impl LayerKind for IconLayer {
    type Attributes = IconDataAttribute;
    type Data = IconLayerData;
    type Descriptor = IconRenderDescriptor;

    fn id(&self) -> &LayerId {
        &self.id
    }

    fn layer_type(&self) -> LayerType {
        LayerType::Icon
    }

    fn required_columns(&self) -> &'static [ColumnRole] {
        ICON_REQUIRED_COLUMNS
    }

    fn visual_channels(&self) -> &'static [VisualChannelSpec] {
        ICON_VISUAL_CHANNELS
    }

    fn calculate_data_attribute(
        &mut self,
        input: &LayerInput<'_>,
        reuse: Option<&IconLayerData>,
    ) -> IconDataAttribute {
        let points: Arc<[ValidatedPoint]> = match reuse {
            Some(previous) => {
                trace!(layer = %self.id, points = previous.points().len(), "reusing points");
                previous.attributes.points.clone()
            }
            None if !self.has_required_columns() => Arc::from(Vec::new()),
            None => {
                let position = self.position.get(&self.config);
                let icon = self.icon.get(&self.config);
                let points = filter_valid_points(
                    &input.dataset.rows,
                    input.filtered_index,
                    &position,
                    &icon,
                    &self.catalog,
                );
                debug!(
                    layer = %self.id,
                    kept = points.len(),
                    dropped = input.filtered_index.len() - points.len(),
                    "validated icon points"
                );
                points.into()
            }
        };

        IconDataAttribute {
            points,
            get_color: self.color_channel(),
            get_radius: self.radius_channel(),
        }
    }

    fn format_layer_data(
        &mut self,
        input: &LayerInput<'_>,
        previous: Option<&IconLayerData>,
    ) -> IconLayerData {
        if self.meta_key.as_deref() != Some(self.meta_key_for(input.dataset).as_str()) {
            self.update_layer_meta(input.dataset);
        }
        let signature = self.data_signature(input);
        let reuse = previous.filter(|p| p.signature == signature);
        let attributes = self.calculate_data_attribute(input, reuse);
        IconLayerData {
            attributes,
            signature,
        }
    }

    fn update_layer_meta(&mut self, dataset: &Dataset) -> &LayerMeta {
        let position = self.position.get(&self.config);
        self.meta.bounds = Aabb2::from_points(dataset.rows.iter().map(|row| position(row)));
        self.meta_key = Some(self.meta_key_for(dataset));
        &self.meta
    }

    fn render_layer(&self, data: &IconLayerData, ctx: &RenderContext) -> IconRenderDescriptor {
        let vis = &self.config.vis_config;
        let params = RenderParams {
            opacity: vis.opacity,
            radius_scale: self.radius_scale(ctx),
            radius_min_pixels: DEFAULT_RADIUS_MIN_PIXELS,
            radius_max_pixels: (!vis.fixed_radius).then_some(DEFAULT_RADIUS_MAX_PIXELS),
            fp64: vis.hi_precision,
            pickable: true,
            auto_highlight: ctx.interaction.auto_highlight,
            highlight_color: self.config.highlight_color,
            depth_test: ctx.view.drag_rotate,
        };

        IconRenderDescriptor {
            id: self.id.clone(),
            layer_index: ctx.layer_index,
            data: data.attributes.points.clone(),
            get_color: data.attributes.get_color.clone(),
            get_radius: data.attributes.get_radius.clone(),
            get_icon_geometry: IconGeometryLookup::new(self.catalog.clone()),
            params,
            update_triggers: self.update_triggers(&data.signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorRange, FieldRef, IconColumns};
    use crate::data::{Field, FieldType, FieldValue};
    use crate::scale::Domain;
    use catalog::{IconAsset, IconMesh};
    use gpu::{Interaction, ViewState};
    use pretty_assertions::assert_eq;

    fn catalog() -> Arc<IconCatalog> {
        let tri = IconMesh {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            cells: vec![vec![0, 1, 2]],
        };
        let assets = ["pin", "cafe"].map(|id| IconAsset {
            id: id.to_string(),
            mesh: tri.clone(),
        });
        Arc::new(IconCatalog::from_assets(&assets).unwrap())
    }

    fn row(lng: f64, lat: f64, icon: &str, value: f64) -> Row {
        Row::new(vec![lng.into(), lat.into(), icon.into(), value.into()])
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::new(
            "places",
            vec![
                Field::new("lng", FieldType::Real),
                Field::new("lat", FieldType::Real),
                Field::new("icon", FieldType::String),
                Field::new("value", FieldType::Real),
            ],
            rows,
        )
    }

    fn config() -> IconLayerConfig {
        IconLayerConfig {
            data_id: "places".into(),
            columns: IconColumns {
                lat: Some(1),
                lng: Some(0),
                icon: Some(2),
            },
            ..IconLayerConfig::default()
        }
    }

    fn layer() -> IconLayer {
        IconLayer::new("icons-1", config(), catalog())
    }

    fn indices(points: &[ValidatedPoint]) -> Vec<usize> {
        points.iter().map(|p| p.index).collect()
    }

    #[test]
    fn keeps_only_finite_rows_with_known_icons() {
        let ds = dataset(vec![
            row(1.0, 2.0, "pin", 0.0),
            row(f64::NAN, 5.0, "pin", 0.0),
            row(3.0, 4.0, "unknown-icon", 0.0),
        ]);
        let filtered = [0, 1, 2];
        let mut layer = layer();
        let attrs = layer.calculate_data_attribute(&LayerInput::new(&ds, &filtered), None);
        assert_eq!(attrs.points.len(), 1);
        assert_eq!(
            attrs.points[0],
            ValidatedPoint {
                index: 0,
                icon: "pin".into(),
                position: [1.0, 2.0],
                data: ds.rows[0].clone(),
            }
        );
    }

    #[test]
    fn preserves_filtered_order_and_skips_null_icons() {
        let ds = dataset(vec![
            row(0.0, 0.0, "pin", 0.0),
            Row::new(vec![1.0.into(), 1.0.into(), FieldValue::Null]),
            row(2.0, 2.0, "cafe", 0.0),
            row(3.0, f64::INFINITY, "cafe", 0.0),
            row(4.0, 4.0, "pin", 0.0),
        ]);
        let filtered = [4, 1, 0, 3, 2, 99];
        let mut layer = layer();
        let attrs = layer.calculate_data_attribute(&LayerInput::new(&ds, &filtered), None);
        assert_eq!(indices(&attrs.points), vec![4, 0, 2]);
    }

    #[test]
    fn missing_required_column_yields_empty_output() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0)]);
        let mut cfg = config();
        cfg.columns.icon = None;
        let mut layer = IconLayer::new("icons-1", cfg, catalog());
        let data = layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        assert!(data.is_empty());
        let desc = layer.render_layer(&data, &RenderContext::default());
        assert_eq!(desc.data.len(), 0);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let ds = dataset(vec![
            row(1.0, 2.0, "pin", 0.0),
            row(3.0, 4.0, "cafe", 0.0),
            row(5.0, 6.0, "nope", 0.0),
        ]);
        let filtered = ds.all_indices();
        let input = LayerInput::new(&ds, &filtered);
        let mut layer = layer();
        let a = layer.calculate_data_attribute(&input, None);
        let b = layer.calculate_data_attribute(&input, None);
        assert!(!Arc::ptr_eq(&a.points, &b.points));
        assert_eq!(a.points.to_vec(), b.points.to_vec());
    }

    #[test]
    fn color_edits_keep_position_and_icon_extractors() {
        let mut layer = layer();
        let pos = layer.position_accessor();
        let icon = layer.icon_accessor();

        layer.config.vis_config.color_range = ColorRange {
            name: "mono".into(),
            colors: vec![[0, 0, 0], [255, 255, 255]],
        };
        layer.config.color_channel =
            ChannelConfig::bound(FieldRef::new("value", 3), ScaleType::Quantize)
                .with_domain(Domain::Extent([0.0, 1.0]));
        layer.config.color = [1, 2, 3];

        assert!(Arc::ptr_eq(&pos, &layer.position_accessor()));
        assert!(Arc::ptr_eq(&icon, &layer.icon_accessor()));

        layer.config.columns.lat = Some(3);
        assert!(!Arc::ptr_eq(&pos, &layer.position_accessor()));
        assert!(Arc::ptr_eq(&icon, &layer.icon_accessor()));
    }

    #[test]
    fn reuses_previous_points_when_signature_matches() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 0.0)]);
        let filtered = [0, 1];
        let mut layer = layer();
        let first = layer.format_layer_data(&LayerInput::new(&ds, &filtered), None);

        layer.config.vis_config.radius_range = [5.0, 9.0];
        let second = layer.format_layer_data(&LayerInput::new(&ds, &filtered), Some(&first));
        assert!(Arc::ptr_eq(&first.attributes.points, &second.attributes.points));

        let narrowed = [1];
        let third = layer.format_layer_data(&LayerInput::new(&ds, &narrowed), Some(&second));
        assert!(!Arc::ptr_eq(&second.attributes.points, &third.attributes.points));
        assert_eq!(indices(third.points()), vec![1]);

        layer.config.columns.icon = Some(3);
        let fourth = layer.format_layer_data(&LayerInput::new(&ds, &narrowed), Some(&third));
        assert!(fourth.is_empty());
    }

    #[test]
    fn bounds_cover_all_rows_regardless_of_filter() {
        let ds = dataset(vec![
            row(-10.0, 5.0, "pin", 0.0),
            row(f64::NAN, 80.0, "pin", 0.0),
            row(20.0, -5.0, "unknown-icon", 0.0),
            row(1.0, f64::NEG_INFINITY, "pin", 0.0),
        ]);
        let expected = Some(Aabb2::new([-10.0, -5.0], [20.0, 5.0]));

        let mut layer = layer();
        layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        assert_eq!(layer.meta().bounds, expected);

        let mut other = self::layer();
        other.format_layer_data(&LayerInput::new(&ds, &[]), None);
        assert_eq!(other.meta().bounds, expected);
    }

    #[test]
    fn bounds_follow_position_columns() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 7.0)]);
        let mut layer = layer();
        layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        assert_eq!(layer.meta().bounds, Some(Aabb2::new([1.0, 2.0], [1.0, 2.0])));

        layer.config.columns.lat = Some(3);
        layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        assert_eq!(layer.meta().bounds, Some(Aabb2::new([1.0, 7.0], [1.0, 7.0])));
    }

    #[test]
    fn constant_channels_ignore_point_data() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 99.0)]);
        let filtered = [0, 1];
        let mut layer = layer();
        let data = layer.format_layer_data(&LayerInput::new(&ds, &filtered), None);
        let desc = layer.render_layer(&data, &RenderContext::default());
        for p in desc.data.iter() {
            assert_eq!(desc.radius_of(p), CONSTANT_RADIUS);
            assert_eq!(desc.color_of(p), [18, 147, 154, 255]);
        }
        assert_eq!(desc.get_radius.constant(), Some(&CONSTANT_RADIUS));
    }

    #[test]
    fn bound_size_channel_scales_radius() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 10.0)]);
        let filtered = [0, 1];
        let mut layer = layer();
        layer.config.size_channel =
            ChannelConfig::bound(FieldRef::new("value", 3), ScaleType::Linear)
                .with_domain(Domain::Extent([0.0, 10.0]));
        layer.config.vis_config.radius_range = [2.0, 22.0];
        let data = layer.format_layer_data(&LayerInput::new(&ds, &filtered), None);
        let desc = layer.render_layer(&data, &RenderContext::default());
        let radii: Vec<f64> = desc.data.iter().map(|p| desc.radius_of(p)).collect();
        assert_eq!(radii, vec![2.0, 22.0]);
    }

    #[test]
    fn radius_trigger_tracks_radius_range_only() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0)]);
        let mut layer = layer();
        let data = layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        let before = layer.update_triggers(&data.signature);

        layer.config.vis_config.color_range = ColorRange {
            name: "other".into(),
            colors: vec![[1, 1, 1]],
        };
        let after_color = layer.update_triggers(&data.signature);
        assert_eq!(after_color.get(TRIGGER_RADIUS), before.get(TRIGGER_RADIUS));
        assert_ne!(after_color.get(TRIGGER_COLOR), before.get(TRIGGER_COLOR));

        layer.config.vis_config.radius_range = [0.0, 99.0];
        let after_radius = layer.update_triggers(&data.signature);
        assert_ne!(after_radius.get(TRIGGER_RADIUS), after_color.get(TRIGGER_RADIUS));
        assert_eq!(after_radius.changed_since(&after_color), vec!["radius"]);
        assert_eq!(
            after_radius.get(TRIGGER_RADIUS),
            Some(&json!({"sizeField": null, "sizeScale": "linear", "radiusRange": [0.0, 99.0]}))
        );
    }

    #[test]
    fn filter_trigger_follows_filtered_indices() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 0.0)]);
        let mut layer = layer();
        let all = layer.format_layer_data(&LayerInput::new(&ds, &[0, 1]), None);
        let one = layer.format_layer_data(&LayerInput::new(&ds, &[1]), None);
        let t_all = layer.update_triggers(&all.signature);
        let t_one = layer.update_triggers(&one.signature);
        assert_eq!(t_one.changed_since(&t_all), vec!["filter"]);
    }

    #[test]
    fn filter_trigger_follows_dataset_version() {
        let mut v0 = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 10.0)]);
        let mut v1 = dataset(vec![row(1.0, 2.0, "pin", 0.0), row(3.0, 4.0, "cafe", 20.0)]);
        v0.version = 0;
        v1.version = 1;

        let mut layer = layer();
        layer.config.size_channel =
            ChannelConfig::bound(FieldRef::new("value", 3), ScaleType::Linear)
                .with_domain(Domain::Extent([0.0, 10.0]));
        let a = layer.format_layer_data(&LayerInput::new(&v0, &[0, 1]), None);
        let ta = layer.update_triggers(&a.signature);

        layer.config.size_channel = layer
            .config
            .size_channel
            .clone()
            .with_domain(Domain::Extent([0.0, 20.0]));
        let b = layer.format_layer_data(&LayerInput::new(&v1, &[0, 1]), Some(&a));
        let tb = layer.update_triggers(&b.signature);

        assert!(!Arc::ptr_eq(&a.attributes.points, &b.attributes.points));
        assert_eq!(tb.changed_since(&ta), vec!["filter"]);
        assert_eq!(tb.get(TRIGGER_FILTER).unwrap()["datasetVersion"], json!(1));
    }

    #[test]
    fn render_params_follow_config_and_view() {
        let ds = dataset(vec![row(1.0, 2.0, "pin", 0.0)]);
        let mut layer = layer();
        layer.config.vis_config.hi_precision = true;
        let data = layer.format_layer_data(&LayerInput::new(&ds, &[0]), None);
        let ctx = RenderContext {
            view: ViewState::from_zoom(12.0, true),
            interaction: Interaction {
                auto_highlight: true,
            },
            layer_index: 3,
        };

        let desc = layer.render_layer(&data, &ctx);
        assert_eq!(desc.id, LayerId("icons-1".into()));
        assert_eq!(desc.layer_index, 3);
        assert_eq!(
            desc.params,
            RenderParams {
                opacity: 0.8,
                radius_scale: 40.0,
                radius_min_pixels: 1.0,
                radius_max_pixels: Some(500.0),
                fp64: true,
                pickable: true,
                auto_highlight: true,
                highlight_color: [252, 242, 26, 255],
                depth_test: true,
            }
        );
        assert_eq!(desc.get_icon_geometry.get("pin").map(<[f32]>::len), Some(9));
        assert!(desc.get_icon_geometry.get(&desc.data[0].icon).is_some());

        layer.config.vis_config.fixed_radius = true;
        let fixed = layer.render_layer(&data, &ctx);
        assert_eq!(fixed.params.radius_max_pixels, None);
        assert_eq!(fixed.params.radius_scale, 1.0);
    }

    #[test]
    fn exposes_layer_kind_metadata() {
        let layer = layer();
        assert_eq!(layer.layer_type(), LayerType::Icon);
        assert_eq!(layer.required_columns().len(), 3);
        let props: Vec<&str> = layer.visual_channels().iter().map(|c| c.property).collect();
        assert_eq!(props, vec!["color", "radius"]);
    }
}
