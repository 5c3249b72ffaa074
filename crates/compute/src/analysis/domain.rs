use layers::config::{ChannelConfig, IconLayerConfig};
use layers::data::Dataset;
use layers::scale::{Domain, ScaleType};
use tracing::debug;

use crate::analysis::statistics::Statistics;

/// Domain a scale of `scale` type needs for `field`, or `None` when the field
/// has no usable values.
pub fn channel_domain(dataset: &Dataset, field: usize, scale: ScaleType) -> Option<Domain> {
    match scale {
        ScaleType::Ordinal => {
            let values = Statistics::ordinal_values(dataset, field);
            (!values.is_empty()).then_some(Domain::Ordinal(values))
        }
        ScaleType::Quantile => {
            let sample = Statistics::quantile_sample(&Statistics::numeric_values(dataset, field));
            (!sample.is_empty()).then_some(Domain::Quantile(sample))
        }
        ScaleType::Linear | ScaleType::Sqrt | ScaleType::Log | ScaleType::Quantize => {
            let (min, max) = Statistics::min_max(&Statistics::numeric_values(dataset, field))?;
            Some(Domain::Extent([min, max]))
        }
    }
}

fn update_channel(dataset: &Dataset, channel: &mut ChannelConfig) {
    channel.domain = channel
        .field
        .as_ref()
        .and_then(|f| channel_domain(dataset, f.index, channel.scale));
}

/// Recompute both channel domains of an icon layer from its dataset.
pub fn update_layer_domains(config: &mut IconLayerConfig, dataset: &Dataset) {
    update_channel(dataset, &mut config.color_channel);
    update_channel(dataset, &mut config.size_channel);
    debug!(
        dataset = %dataset.id,
        color = config.color_channel.domain.is_some(),
        size = config.size_channel.domain.is_some(),
        "updated channel domains"
    );
}
