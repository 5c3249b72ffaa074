use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleType {
    #[default]
    Linear,
    Sqrt,
    Log,
    Quantize,
    Quantile,
    Ordinal,
}

impl ScaleType {
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Linear => "linear",
            ScaleType::Sqrt => "sqrt",
            ScaleType::Log => "log",
            ScaleType::Quantize => "quantize",
            ScaleType::Quantile => "quantile",
            ScaleType::Ordinal => "ordinal",
        }
    }
}

/// Pre-computed field statistics a scale is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum Domain {
    /// `[min, max]`
    Extent([f64; 2]),
    /// Finite samples sorted ascending.
    Quantile(Vec<f64>),
    /// Distinct values in display form.
    Ordinal(Vec<String>),
}

impl Domain {
    fn extent(&self) -> Option<[f64; 2]> {
        match self {
            Domain::Extent(e) => Some(*e),
            Domain::Quantile(s) => Some([*s.first()?, *s.last()?]),
            Domain::Ordinal(_) => None,
        }
    }
}

/// Where a value falls in a scale's output space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalePosition {
    /// Fraction along a continuous range, in `[0, 1]`.
    Continuous(f64),
    /// One of `count` discrete range slots.
    Bucket { index: usize, count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Transform {
    Identity,
    Sqrt,
    Ln,
}

impl Transform {
    fn apply(self, v: f64) -> f64 {
        match self {
            Transform::Identity => v,
            Transform::Sqrt => v.signum() * v.abs().sqrt(),
            Transform::Ln => {
                if v > 0.0 {
                    v.ln()
                } else {
                    f64::NAN
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ScaleKind {
    Continuous {
        transform: Transform,
        lo: f64,
        hi: f64,
    },
    Quantize {
        min: f64,
        max: f64,
        count: usize,
    },
    Quantile {
        thresholds: Vec<f64>,
        count: usize,
    },
    Ordinal {
        slots: HashMap<String, usize>,
        count: usize,
    },
}

/// Maps a field value onto a position in a channel's range.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    kind: ScaleKind,
}

impl Scale {
    /// Build a scale, or `None` when the domain can't serve this scale type
    /// (ordinal values for a numeric scale, non-positive log extent, ...).
    ///
    /// `buckets` is the number of discrete range slots; `None` lets ordinal
    /// scales use one slot per domain value and the other discrete scales
    /// fall back to `DEFAULT_BUCKETS`.
    pub fn new(scale_type: ScaleType, domain: &Domain, buckets: Option<usize>) -> Option<Self> {
        let kind = match scale_type {
            ScaleType::Linear | ScaleType::Sqrt | ScaleType::Log => {
                let [min, max] = domain.extent()?;
                let transform = match scale_type {
                    ScaleType::Sqrt => Transform::Sqrt,
                    ScaleType::Log => Transform::Ln,
                    _ => Transform::Identity,
                };
                let (lo, hi) = (transform.apply(min), transform.apply(max));
                if !lo.is_finite() || !hi.is_finite() {
                    return None;
                }
                ScaleKind::Continuous { transform, lo, hi }
            }
            ScaleType::Quantize => {
                let [min, max] = domain.extent()?;
                if !min.is_finite() || !max.is_finite() {
                    return None;
                }
                ScaleKind::Quantize {
                    min,
                    max,
                    count: nonzero(buckets.unwrap_or(DEFAULT_BUCKETS))?,
                }
            }
            ScaleType::Quantile => {
                let Domain::Quantile(sorted) = domain else {
                    return None;
                };
                if sorted.is_empty() {
                    return None;
                }
                let count = nonzero(buckets.unwrap_or(DEFAULT_BUCKETS))?;
                let thresholds = (1..count)
                    .map(|i| quantile_sorted(sorted, i as f64 / count as f64))
                    .collect();
                ScaleKind::Quantile { thresholds, count }
            }
            ScaleType::Ordinal => {
                let Domain::Ordinal(values) = domain else {
                    return None;
                };
                let count = nonzero(buckets.unwrap_or(values.len()))?;
                let mut slots = HashMap::with_capacity(values.len());
                for (i, v) in values.iter().enumerate() {
                    slots.entry(v.clone()).or_insert(i % count);
                }
                ScaleKind::Ordinal { slots, count }
            }
        };
        Some(Self { kind })
    }

    /// Position of `value`, or `None` when it can't be encoded.
    pub fn position(&self, value: &FieldValue) -> Option<ScalePosition> {
        match &self.kind {
            ScaleKind::Continuous { transform, lo, hi } => {
                let v = transform.apply(value.as_f64());
                if !v.is_finite() {
                    return None;
                }
                let span = hi - lo;
                let t = if span == 0.0 { 0.0 } else { (v - lo) / span };
                Some(ScalePosition::Continuous(t.clamp(0.0, 1.0)))
            }
            ScaleKind::Quantize { min, max, count } => {
                let v = value.as_f64();
                if !v.is_finite() {
                    return None;
                }
                let span = max - min;
                let index = if span <= 0.0 {
                    0
                } else {
                    let raw = ((v - min) / span * *count as f64).floor();
                    raw.clamp(0.0, (*count - 1) as f64) as usize
                };
                Some(ScalePosition::Bucket {
                    index,
                    count: *count,
                })
            }
            ScaleKind::Quantile { thresholds, count } => {
                let v = value.as_f64();
                if !v.is_finite() {
                    return None;
                }
                let index = thresholds.partition_point(|t| *t <= v);
                Some(ScalePosition::Bucket {
                    index,
                    count: *count,
                })
            }
            ScaleKind::Ordinal { slots, count } => {
                let key = value.as_key()?;
                let index = *slots.get(&key)?;
                Some(ScalePosition::Bucket {
                    index,
                    count: *count,
                })
            }
        }
    }
}

/// Discrete slot count for ranges that don't define one (numeric radius).
pub const DEFAULT_BUCKETS: usize = 5;

fn nonzero(n: usize) -> Option<usize> {
    (n > 0).then_some(n)
}

/// Linear-interpolated quantile (R-7) of an ascending sample.
fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}
