use std::sync::Arc;

use foundation::color::{NULL_COLOR, Rgb, Rgba, interpolate_palette, opaque};
use tracing::debug;

use crate::accessor::ChannelAccessor;
use crate::config::{ChannelConfig, ColorRange};
use crate::data::Row;
use crate::scale::{Scale, ScalePosition};

/// Output space of a visual channel.
pub trait ChannelRange: Send + Sync + 'static {
    type Output: Clone + std::fmt::Debug + Send + Sync + 'static;

    /// Discrete slots the range offers, if it has a natural count.
    fn bucket_count(&self) -> Option<usize>;
    fn encode(&self, position: ScalePosition) -> Self::Output;
    /// Value for rows whose field can't be encoded.
    fn null_value(&self) -> Self::Output;
}

/// Numeric `[min, max]` range for radius.
impl ChannelRange for [f64; 2] {
    type Output = f64;

    fn bucket_count(&self) -> Option<usize> {
        None
    }

    fn encode(&self, position: ScalePosition) -> f64 {
        let t = match position {
            ScalePosition::Continuous(t) => t,
            ScalePosition::Bucket { count: 0 | 1, .. } => 0.0,
            ScalePosition::Bucket { index, count } => index as f64 / (count - 1) as f64,
        };
        self[0] + (self[1] - self[0]) * t
    }

    fn null_value(&self) -> f64 {
        0.0
    }
}

impl ChannelRange for ColorRange {
    type Output = Rgba;

    fn bucket_count(&self) -> Option<usize> {
        Some(self.colors.len())
    }

    fn encode(&self, position: ScalePosition) -> Rgba {
        let color: Option<Rgb> = match position {
            ScalePosition::Continuous(t) => interpolate_palette(&self.colors, t),
            ScalePosition::Bucket { index, .. } => self.colors.get(index).copied(),
        };
        color.map(opaque).unwrap_or(NULL_COLOR)
    }

    fn null_value(&self) -> Rgba {
        NULL_COLOR
    }
}

/// A visual channel resolved against its config: either scaled from one
/// field or a constant.
#[derive(Debug, Clone)]
pub enum Channel<R: ChannelRange> {
    Bound {
        field: usize,
        scale: Scale,
        range: R,
    },
    Constant(R::Output),
}

impl<R: ChannelRange> Channel<R> {
    /// Resolve a channel config. A bound field without a usable domain (none
    /// computed yet, or one the scale type can't take) falls back to the
    /// constant.
    pub fn resolve(config: &ChannelConfig, range: R, constant: R::Output) -> Self {
        let Some(field) = &config.field else {
            return Channel::Constant(constant);
        };
        let scale = config
            .domain
            .as_ref()
            .and_then(|d| Scale::new(config.scale, d, range.bucket_count()));
        match scale {
            Some(scale) => Channel::Bound {
                field: field.index,
                scale,
                range,
            },
            None => {
                debug!(
                    field = %field.name,
                    scale = config.scale.as_str(),
                    "channel domain unusable, rendering constant"
                );
                Channel::Constant(constant)
            }
        }
    }

    pub fn into_accessor(self) -> ChannelAccessor<R::Output> {
        match self {
            Channel::Constant(v) => ChannelAccessor::Constant(v),
            Channel::Bound {
                field,
                scale,
                range,
            } => ChannelAccessor::Scaled(Arc::new(move |row: &Row| {
                match scale.position(row.get(field)) {
                    Some(p) => range.encode(p),
                    None => range.null_value(),
                }
            })),
        }
    }
}
