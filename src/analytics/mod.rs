//! Cellar analytics and chart data preparation.
//!
//! Everything here is recomputed from the full cellar list on each query.
//! The lists are small and local, so there is no incremental maintenance
//! and no caching.
//!
//! Error policy: malformed price strings, malformed peak-year strings, and
//! missing optional fields contribute 0 or are excluded from the relevant
//! aggregate. Nothing in this module returns an error.

use serde::Serialize;

use crate::models::ranges::{YearRange, estimate_price};
use crate::models::{CellarItem, GrapeShare, VintageScore};

/// A label with its quantity-weighted bottle count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub bottles: u32,
}

/// Summary statistics over the cellar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellarStats {
    /// Total bottles across all items.
    pub total_bottles: u32,

    /// Sum of quantity x unit value. Unit value is the purchase price when
    /// recorded, otherwise the estimated market price - a lossy heuristic
    /// over the model's free-text range, not a pricing model.
    pub total_value: f64,

    /// Bottles whose peak drinking window contains the current year.
    pub ready_to_drink: u32,

    /// Most-held regions, descending; ties keep first-seen order.
    pub top_regions: Vec<LabelCount>,

    /// Most-held wine types, descending; ties keep first-seen order.
    pub diversity: Vec<LabelCount>,
}

impl CellarStats {
    /// Compute statistics over the given items for the given calendar year.
    /// `top_n` bounds the region/type leaderboards.
    pub fn compute(items: &[CellarItem], current_year: i32, top_n: usize) -> Self {
        let mut total_bottles = 0u32;
        let mut total_value = 0.0f64;
        let mut ready_to_drink = 0u32;
        let mut regions: Vec<LabelCount> = Vec::new();
        let mut types: Vec<LabelCount> = Vec::new();

        for item in items {
            total_bottles += item.quantity;

            let unit_value = item
                .purchase_price
                .unwrap_or_else(|| estimate_price(&item.wine.market_price));
            total_value += unit_value * f64::from(item.quantity);

            if let Some(aging) = &item.wine.aging {
                if let Some(window) = YearRange::parse(&aging.peak_years) {
                    if window.contains(current_year) {
                        ready_to_drink += item.quantity;
                    }
                }
            }

            tally(&mut regions, &item.wine.region, item.quantity);
            tally(&mut types, &item.wine.wine_type, item.quantity);
        }

        CellarStats {
            total_bottles,
            total_value,
            ready_to_drink,
            top_regions: top(regions, top_n),
            diversity: top(types, top_n),
        }
    }
}

/// Add `bottles` to the count for `label`, keeping first-seen order.
/// Blank labels (missing data) are excluded rather than counted as "".
fn tally(counts: &mut Vec<LabelCount>, label: &str, bottles: u32) {
    if label.is_empty() {
        return;
    }
    match counts.iter_mut().find(|c| c.label == label) {
        Some(entry) => entry.bottles += bottles,
        None => counts.push(LabelCount {
            label: label.to_string(),
            bottles,
        }),
    }
}

/// Top `n` by descending count. The sort is stable, so ties resolve to
/// first-seen (insertion) order deterministically.
fn top(mut counts: Vec<LabelCount>, n: usize) -> Vec<LabelCount> {
    counts.sort_by(|a, b| b.bottles.cmp(&a.bottles));
    counts.truncate(n);
    counts
}

/// One slice of the grape-composition donut, as cumulative fractions of the
/// whole circle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutSlice {
    pub label: String,

    /// Share of the circle in [0, 1].
    pub fraction: f64,

    /// Cumulative start angle as a fraction of the circle.
    pub start: f64,

    /// Cumulative end angle as a fraction of the circle.
    pub end: f64,
}

/// Convert grape shares to donut slices.
///
/// Percentages are normalized by their own sum - the model is asked for
/// values totaling 100 but is not trusted to deliver that - then converted
/// to cumulative [start, end) fractions. A non-positive sum yields no
/// slices.
pub fn donut_slices(shares: &[GrapeShare]) -> Vec<DonutSlice> {
    let total: f64 = shares.iter().map(|s| s.percentage).sum();
    if total <= 0.0 {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    shares
        .iter()
        .map(|share| {
            let fraction = share.percentage / total;
            let start = cumulative;
            cumulative += fraction;
            DonutSlice {
                label: share.grape.clone(),
                fraction,
                start,
                end: cumulative,
            }
        })
        .collect()
}

/// Y-axis domain for the vintage score trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreAxis {
    pub min: f64,
    pub max: f64,
}

/// Default padding around the observed score range.
pub const SCORE_AXIS_PAD: f64 = 2.0;

/// Compute the axis domain `[max(0, min - pad), min(100, max + pad)]`.
///
/// Clamping to the observed range rather than a fixed 0-100 scale keeps
/// small quality differences between vintages visually legible. Returns
/// `None` for an empty series.
pub fn score_axis(scores: &[VintageScore], pad: f64) -> Option<ScoreAxis> {
    if scores.is_empty() {
        return None;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for s in scores {
        min = min.min(s.score);
        max = max.max(s.score);
    }

    Some(ScoreAxis {
        min: (min - pad).max(0.0),
        max: (max + pad).min(100.0),
    })
}

/// Relative bar height in [0, 1] for a score on the given axis.
pub fn bar_height(score: f64, axis: ScoreAxis) -> f64 {
    let span = axis.max - axis.min;
    if span <= 0.0 {
        return 1.0;
    }
    ((score - axis.min) / span).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Aging, WineReport};
    use crate::state::add_to_cellar;

    fn wine(name: &str, vintage: &str, region: &str, wine_type: &str) -> WineReport {
        let mut report: WineReport = serde_json::from_str(&format!(
            r#"{{"name":"{}","vintage":"{}","region":"{}","type":"{}"}}"#,
            name, vintage, region, wine_type
        ))
        .unwrap();
        report.id = crate::models::generate_id("som", &format!("{}|{}", name, vintage));
        report
    }

    fn with_market(mut report: WineReport, price: &str, peak: &str) -> WineReport {
        report.market_price = price.to_string();
        report.aging = Some(Aging {
            peak_years: peak.to_string(),
            ..Aging::default()
        });
        report
    }

    fn item(wine: WineReport, quantity: u32, price: Option<f64>) -> CellarItem {
        let (cellar, _) = add_to_cellar(Vec::new(), wine, quantity, price);
        cellar.into_iter().next().unwrap()
    }

    #[test]
    fn test_end_to_end_scenario() {
        // cellar = [{Barolo 2015, $60-$90, peak 2022-2030, qty 2, paid 75}]
        let barolo = with_market(
            wine("Barolo", "2015", "Piedmont", "Nebbiolo"),
            "$60 - $90",
            "2022-2030",
        );
        let items = vec![item(barolo, 2, Some(75.0))];

        let stats = CellarStats::compute(&items, 2024, 5);
        assert_eq!(stats.total_bottles, 2);
        assert_eq!(stats.total_value, 150.0);
        assert_eq!(stats.ready_to_drink, 2);
    }

    #[test]
    fn test_total_value_falls_back_to_estimate() {
        let barolo = with_market(
            wine("Barolo", "2015", "Piedmont", "Nebbiolo"),
            "$60 - $90",
            "2022-2030",
        );
        let items = vec![item(barolo, 2, None)];

        let stats = CellarStats::compute(&items, 2024, 5);
        // (60 + 90) / 2 = 75 per bottle
        assert_eq!(stats.total_value, 150.0);
    }

    #[test]
    fn test_readiness_window_bounds() {
        let ready = with_market(wine("A", "2015", "R", "T"), "$10", "2020-2026");
        let not_yet = with_market(wine("B", "2016", "R", "T"), "$10", "2030-2035");
        let items = vec![item(ready, 1, None), item(not_yet, 4, None)];

        let stats = CellarStats::compute(&items, 2024, 5);
        assert_eq!(stats.ready_to_drink, 1);
    }

    #[test]
    fn test_malformed_inputs_contribute_zero() {
        let mut junk = wine("Mystery", "NV", "", "");
        junk.market_price = "call for pricing".to_string();
        junk.aging = Some(Aging {
            peak_years: "whenever".to_string(),
            ..Aging::default()
        });
        let items = vec![item(junk, 3, None)];

        let stats = CellarStats::compute(&items, 2024, 5);
        assert_eq!(stats.total_bottles, 3);
        assert_eq!(stats.total_value, 0.0);
        assert_eq!(stats.ready_to_drink, 0);
        assert!(stats.top_regions.is_empty());
        assert!(stats.diversity.is_empty());
    }

    #[test]
    fn test_missing_aging_is_excluded() {
        let items = vec![item(wine("A", "2015", "R", "T"), 2, Some(10.0))];
        let stats = CellarStats::compute(&items, 2024, 5);
        assert_eq!(stats.ready_to_drink, 0);
    }

    #[test]
    fn test_top_regions_weighted_and_stable() {
        let items = vec![
            item(wine("A", "1", "Piedmont", "Red"), 2, None),
            item(wine("B", "2", "Burgundy", "White"), 5, None),
            // Rioja ties Piedmont at 2 bottles but was seen later.
            item(wine("C", "3", "Rioja", "Red"), 2, None),
        ];

        let stats = CellarStats::compute(&items, 2024, 2);
        assert_eq!(stats.top_regions.len(), 2);
        assert_eq!(stats.top_regions[0].label, "Burgundy");
        assert_eq!(stats.top_regions[0].bottles, 5);
        assert_eq!(stats.top_regions[1].label, "Piedmont");

        // Types: Red = 4 bottles across two items, White = 5.
        assert_eq!(stats.diversity[0].label, "White");
        assert_eq!(stats.diversity[1].label, "Red");
        assert_eq!(stats.diversity[1].bottles, 4);
    }

    #[test]
    fn test_donut_normalizes_by_own_sum() {
        let shares = vec![
            GrapeShare {
                grape: "Grenache".to_string(),
                percentage: 60.0,
            },
            GrapeShare {
                grape: "Syrah".to_string(),
                percentage: 20.0,
            },
        ];

        // The shares total 80, not 100; fractions are of the actual sum.
        let slices = donut_slices(&shares);
        assert_eq!(slices.len(), 2);
        assert!((slices[0].fraction - 0.75).abs() < 1e-9);
        assert!((slices[1].fraction - 0.25).abs() < 1e-9);
        assert_eq!(slices[0].start, 0.0);
        assert!((slices[0].end - slices[1].start).abs() < 1e-9);
        assert!((slices[1].end - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_donut_with_zero_sum_is_empty() {
        let shares = vec![GrapeShare {
            grape: "Unknown".to_string(),
            percentage: 0.0,
        }];
        assert!(donut_slices(&shares).is_empty());
        assert!(donut_slices(&[]).is_empty());
    }

    fn score(year: &str, value: f64) -> VintageScore {
        VintageScore {
            year: year.to_string(),
            score: value,
            notes: String::new(),
        }
    }

    #[test]
    fn test_score_axis_pads_and_clamps() {
        let scores = vec![score("2018", 92.0), score("2019", 95.0), score("2020", 99.5)];
        let axis = score_axis(&scores, SCORE_AXIS_PAD).unwrap();
        assert_eq!(axis.min, 90.0);
        assert_eq!(axis.max, 100.0); // 99.5 + 2 clamps to 100

        assert!(score_axis(&[], SCORE_AXIS_PAD).is_none());
    }

    #[test]
    fn test_bar_height_spans_axis() {
        let axis = ScoreAxis {
            min: 90.0,
            max: 100.0,
        };
        assert_eq!(bar_height(90.0, axis), 0.0);
        assert_eq!(bar_height(100.0, axis), 1.0);
        assert!((bar_height(95.0, axis) - 0.5).abs() < 1e-9);

        // Degenerate single-score axis still renders a full bar.
        let flat = ScoreAxis {
            min: 95.0,
            max: 95.0,
        };
        assert_eq!(bar_height(95.0, flat), 1.0);
    }
}
