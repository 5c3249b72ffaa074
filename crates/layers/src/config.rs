use foundation::color::{Rgb, Rgba};
use serde::{Deserialize, Serialize};

use crate::layer::ColumnRole;
use crate::scale::{Domain, ScaleType};

/// Field indices bound to the icon layer's column roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IconColumns {
    pub lat: Option<usize>,
    pub lng: Option<usize>,
    pub icon: Option<usize>,
}

impl IconColumns {
    pub fn new(lat: usize, lng: usize, icon: usize) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            icon: Some(icon),
        }
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Lat => self.lat,
            ColumnRole::Lng => self.lng,
            ColumnRole::Icon => self.icon,
        }
    }

    pub fn has_all(&self, roles: &[ColumnRole]) -> bool {
        roles.iter().all(|r| self.get(*r).is_some())
    }
}

/// A data field referenced by a visual channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub name: String,
    pub index: usize,
}

impl FieldRef {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }
}

/// Field binding for one visual channel. Unbound channels render a constant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub field: Option<FieldRef>,
    pub scale: ScaleType,
    /// Filled in from field statistics by the owner of the dataset.
    pub domain: Option<Domain>,
}

impl ChannelConfig {
    pub fn bound(field: FieldRef, scale: ScaleType) -> Self {
        Self {
            field: Some(field),
            scale,
            domain: None,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRange {
    pub name: String,
    pub colors: Vec<Rgb>,
}

impl Default for ColorRange {
    fn default() -> Self {
        Self {
            name: "Global Warming".to_string(),
            colors: vec![
                [90, 24, 70],
                [144, 12, 63],
                [199, 0, 57],
                [227, 97, 28],
                [241, 146, 14],
                [255, 195, 0],
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconVisConfig {
    pub opacity: f32,
    /// Base radius used when no size field is bound.
    pub radius: f64,
    pub radius_range: [f64; 2],
    pub color_range: ColorRange,
    /// Radius in meters, without the renderer's max-pixel clamp.
    pub fixed_radius: bool,
    pub hi_precision: bool,
}

impl Default for IconVisConfig {
    fn default() -> Self {
        Self {
            opacity: 0.8,
            radius: 10.0,
            radius_range: [0.0, 50.0],
            color_range: ColorRange::default(),
            fixed_radius: false,
            hi_precision: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IconLayerConfig {
    pub data_id: String,
    pub label: String,
    pub columns: IconColumns,
    /// Fill color when the color channel is unbound.
    pub color: Rgb,
    pub highlight_color: Rgba,
    pub color_channel: ChannelConfig,
    pub size_channel: ChannelConfig,
    pub vis_config: IconVisConfig,
}

impl Default for IconLayerConfig {
    fn default() -> Self {
        Self {
            data_id: String::new(),
            label: "Icon".to_string(),
            columns: IconColumns::default(),
            color: [18, 147, 154],
            highlight_color: [252, 242, 26, 255],
            color_channel: ChannelConfig::default(),
            size_channel: ChannelConfig::default(),
            vis_config: IconVisConfig::default(),
        }
    }
}
