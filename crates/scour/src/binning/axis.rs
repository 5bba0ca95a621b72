//! Per-axis bin layout: equal-width numeric bins plus sorted categories.

use std::collections::BTreeSet;

use crate::table::{NAN_LABEL, Value};

use super::bins::BinKey;

/// Position of a value on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Slot {
    Numeric(usize),
    Categorical(usize),
}

impl Slot {
    pub(crate) fn is_numeric(&self) -> bool {
        matches!(self, Slot::Numeric(_))
    }
}

/// Equal-width bins over `[min, max + 1)`.
///
/// `edges` holds `count + 1` non-decreasing boundaries; the last one is
/// exactly `upper`. Membership and reported bounds both read from it, so a
/// value always lies inside the bin it is filed under.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumericEdges {
    lower: f64,
    upper: f64,
    edges: Vec<f64>,
}

impl NumericEdges {
    fn new(min: f64, max: f64, count: usize) -> Self {
        let count = count.max(1);
        let lower = min;
        let upper = max + 1.0;
        let width = (upper - lower) / count as f64;

        let mut edges = Vec::with_capacity(count + 1);
        edges.push(lower);
        for i in 1..count {
            let edge = if width.is_finite() {
                lower + i as f64 * width
            } else {
                // The span overflows; interpolate between the ends instead.
                let t = i as f64 / count as f64;
                lower * (1.0 - t) + upper * t
            };
            let previous = edges[edges.len() - 1];
            edges.push(edge.clamp(previous, upper));
        }
        edges.push(upper);

        Self {
            lower,
            upper,
            edges,
        }
    }

    fn count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Largest `i` with `edges[i] <= value`, clamped to the bin range.
    fn index(&self, value: f64) -> usize {
        let count = self.count();
        let at_or_below = self.edges[..count].partition_point(|edge| *edge <= value);
        at_or_below.saturating_sub(1).min(count - 1)
    }

    fn key(&self, index: usize) -> BinKey {
        BinKey::Numeric {
            lower_bound: self.edges[index],
            upper_bound: self.edges[index + 1],
        }
    }

    pub(crate) fn domain(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }
}

/// Bin layout for one column.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct AxisBins {
    numeric: Option<NumericEdges>,
    categories: Vec<String>,
}

impl AxisBins {
    /// Lay out bins for a set of values.
    ///
    /// Numeric values (non-NaN numbers) get `bin_count` equal-width bins;
    /// everything else gets one bin per distinct label, sorted, with the NaN
    /// placeholder last.
    pub(crate) fn build<'a>(values: impl IntoIterator<Item = &'a Value>, bin_count: usize) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut labels = BTreeSet::new();
        let mut has_nan = false;

        for value in values {
            match value.as_number() {
                Some(n) => {
                    min = min.min(n);
                    max = max.max(n);
                }
                None if value.is_null_like() => has_nan = true,
                None => {
                    labels.insert(value.category_label());
                }
            }
        }

        let numeric = (min <= max).then(|| NumericEdges::new(min, max, bin_count));
        let mut categories: Vec<String> = labels.into_iter().collect();
        if has_nan {
            // A literal "NaN" text would collide with the placeholder; keep one bin.
            categories.retain(|c| c != NAN_LABEL);
            categories.push(NAN_LABEL.to_string());
        }

        Self {
            numeric,
            categories,
        }
    }

    /// Slot for a value. Values that were not part of `build` and fall
    /// outside the layout return `None`.
    pub(crate) fn slot(&self, value: &Value) -> Option<Slot> {
        match value.as_number() {
            Some(n) => self.numeric.as_ref().map(|edges| Slot::Numeric(edges.index(n))),
            None => {
                let label = value.category_label();
                self.categories
                    .iter()
                    .position(|c| *c == label)
                    .map(Slot::Categorical)
            }
        }
    }

    /// Key for a slot; `None` if the slot is not part of this layout.
    pub(crate) fn key(&self, slot: Slot) -> Option<BinKey> {
        match slot {
            Slot::Numeric(idx) => self
                .numeric
                .as_ref()
                .filter(|edges| idx < edges.count())
                .map(|edges| edges.key(idx)),
            Slot::Categorical(idx) => self.categories.get(idx).map(|category| BinKey::Categorical {
                category: category.clone(),
            }),
        }
    }

    pub(crate) fn numeric_count(&self) -> usize {
        self.numeric.as_ref().map(NumericEdges::count).unwrap_or(0)
    }

    pub(crate) fn categorical_count(&self) -> usize {
        self.categories.len()
    }

    pub(crate) fn numeric_domain(&self) -> Option<(f64, f64)> {
        self.numeric.as_ref().map(NumericEdges::domain)
    }

    pub(crate) fn numeric_keys(&self) -> Vec<BinKey> {
        (0..self.numeric_count())
            .filter_map(|idx| self.key(Slot::Numeric(idx)))
            .collect()
    }

    pub(crate) fn categorical_keys(&self) -> Vec<BinKey> {
        (0..self.categorical_count())
            .filter_map(|idx| self.key(Slot::Categorical(idx)))
            .collect()
    }
}
