//! Hybrid axis scale: a linear numeric segment, a gap, then categorical bands.

use serde::Serialize;

/// Maps one axis of a histogram onto a pixel range.
///
/// The numeric share of the range is proportional to
/// `numeric_bins / (numeric_bins + categorical_bins)`. The gap is only
/// inserted when both segments are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HybridScale {
    start: f64,
    end: f64,
    gap: f64,
    numeric_bins: usize,
    categorical_bins: usize,
    numeric_domain: Option<(f64, f64)>,
}

impl HybridScale {
    pub(crate) fn new(
        range: (f64, f64),
        gap: f64,
        numeric_bins: usize,
        categorical_bins: usize,
        numeric_domain: Option<(f64, f64)>,
    ) -> Self {
        Self {
            start: range.0,
            end: range.1,
            gap,
            numeric_bins,
            categorical_bins,
            numeric_domain,
        }
    }

    fn has_both(&self) -> bool {
        self.numeric_bins > 0 && self.categorical_bins > 0
    }

    fn numeric_end(&self) -> f64 {
        let total = self.numeric_bins + self.categorical_bins;
        if total == 0 {
            return self.start;
        }
        let gap = if self.has_both() { self.gap } else { 0.0 };
        let usable = (self.end - self.start - gap).max(0.0);
        self.start + usable * self.numeric_bins as f64 / total as f64
    }

    /// Sub-range for the numeric segment.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        (self.numeric_bins > 0).then(|| (self.start, self.numeric_end()))
    }

    /// Sub-range for the categorical segment.
    pub fn categorical_range(&self) -> Option<(f64, f64)> {
        if self.categorical_bins == 0 {
            return None;
        }
        let begin = if self.has_both() {
            self.numeric_end() + self.gap
        } else {
            self.start
        };
        Some((begin.min(self.end), self.end))
    }

    /// Position of a numeric value, linear over the numeric domain.
    pub fn position(&self, value: f64) -> Option<f64> {
        let (lo, hi) = self.numeric_range()?;
        let (d0, d1) = self.numeric_domain?;
        if d1 == d0 {
            return Some(lo);
        }
        Some(lo + (value - d0) / (d1 - d0) * (hi - lo))
    }

    /// Band `[begin, end)` of the categorical bin at `index`.
    pub fn band(&self, index: usize) -> Option<(f64, f64)> {
        if index >= self.categorical_bins {
            return None;
        }
        let (lo, hi) = self.categorical_range()?;
        let width = (hi - lo) / self.categorical_bins as f64;
        let begin = lo + index as f64 * width;
        Some((begin, begin + width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_proportional_to_bin_counts() {
        // 10 numeric + 2 categorical over 0..130 with a 10px gap
        let scale = HybridScale::new((0.0, 130.0), 10.0, 10, 2, Some((0.0, 10.0)));
        assert_eq!(scale.numeric_range(), Some((0.0, 100.0)));
        assert_eq!(scale.categorical_range(), Some((110.0, 130.0)));
        assert_eq!(scale.band(1), Some((120.0, 130.0)));
        assert_eq!(scale.band(2), None);
        assert_eq!(scale.position(5.0), Some(50.0));
    }

    #[test]
    fn test_numeric_only_uses_full_range() {
        let scale = HybridScale::new((0.0, 100.0), 10.0, 5, 0, Some((1.0, 3.0)));
        assert_eq!(scale.numeric_range(), Some((0.0, 100.0)));
        assert_eq!(scale.categorical_range(), None);
        assert_eq!(scale.position(3.0), Some(100.0));
    }

    #[test]
    fn test_categorical_only_uses_full_range() {
        let scale = HybridScale::new((0.0, 90.0), 10.0, 0, 3, None);
        assert_eq!(scale.numeric_range(), None);
        assert_eq!(scale.position(1.0), None);
        assert_eq!(scale.band(0), Some((0.0, 30.0)));
    }
}
