use std::collections::BTreeSet;

use foundation::math::stable_total_cmp_f64;
use layers::data::Dataset;

pub struct Statistics;

impl Statistics {
    /// Extent of the finite values.
    pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
        let mut finite = values.iter().copied().filter(|v| v.is_finite());
        let first = finite.next()?;
        let mut min = first;
        let mut max = first;
        for v in finite {
            min = min.min(v);
            max = max.max(v);
        }
        Some((min, max))
    }

    /// Finite values sorted ascending.
    pub fn quantile_sample(values: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        out.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        out
    }

    /// Numeric readings of one field across every row.
    pub fn numeric_values(dataset: &Dataset, field: usize) -> Vec<f64> {
        dataset.rows.iter().map(|r| r.get(field).as_f64()).collect()
    }

    /// Distinct non-null values of one field in display form, sorted.
    pub fn ordinal_values(dataset: &Dataset, field: usize) -> Vec<String> {
        let set: BTreeSet<String> = dataset
            .rows
            .iter()
            .filter_map(|r| r.get(field).as_key())
            .collect();
        set.into_iter().collect()
    }
}
