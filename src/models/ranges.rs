//! Boundary parsing for string-encoded numeric ranges.
//!
//! The sommelier model reports market prices ("$50 - $80") and peak drinking
//! windows ("2022-2030") as free text. These types parse that text exactly
//! once, at the boundary; downstream code works with the structured pair and
//! never re-reads the raw strings.
//!
//! Both parses are deliberately lossy heuristics over generative output, not
//! precise formats: anything that does not yield numbers is reported as
//! `None` and the caller substitutes a neutral value.

/// A low/high price pair parsed from market-price free text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    /// Parse a price string such as "$50 - $80", "$42", or "€1,200-1,500".
    ///
    /// Strips every character except digits, `.` and `-`. A remaining dash
    /// splits the text into a low/high pair; otherwise the single number is
    /// both bounds. Returns `None` when nothing numeric survives.
    pub fn parse(text: &str) -> Option<PriceRange> {
        let clean: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();

        if let Some((lo, hi)) = clean.split_once('-') {
            let low: f64 = lo.parse().ok()?;
            let high: f64 = hi.parse().ok()?;
            Some(PriceRange { low, high })
        } else {
            let value: f64 = clean.parse().ok()?;
            Some(PriceRange {
                low: value,
                high: value,
            })
        }
    }

    /// Midpoint of the range; equals the value itself for single prices.
    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Estimated per-bottle value from market-price free text, 0 when unparseable.
pub fn estimate_price(text: &str) -> f64 {
    PriceRange::parse(text).map(|r| r.midpoint()).unwrap_or(0.0)
}

/// An inclusive year range parsed from peak-window free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Parse a window such as "2022-2030" or a single year "2025"
    /// (treated as start == end). Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<YearRange> {
        match text.split_once('-') {
            Some((start, end)) => {
                let start: i32 = start.trim().parse().ok()?;
                let end: i32 = end.trim().parse().ok()?;
                Some(YearRange { start, end })
            }
            None => {
                let year: i32 = text.trim().parse().ok()?;
                Some(YearRange {
                    start: year,
                    end: year,
                })
            }
        }
    }

    /// Whether the given year falls inside the window, inclusive on both ends.
    pub fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_price_range() {
        assert_eq!(estimate_price("$50 - $80"), 65.0);
    }

    #[test]
    fn test_estimate_price_single() {
        assert_eq!(estimate_price("$42"), 42.0);
    }

    #[test]
    fn test_estimate_price_empty() {
        assert_eq!(estimate_price(""), 0.0);
    }

    #[test]
    fn test_estimate_price_garbage() {
        assert_eq!(estimate_price("N/A"), 0.0);
        assert_eq!(estimate_price("market dependent"), 0.0);
    }

    #[test]
    fn test_estimate_price_currency_noise() {
        // Commas and currency symbols are stripped, not treated as separators.
        assert_eq!(estimate_price("$1,200 - $1,500"), 1350.0);
        assert_eq!(estimate_price("€35"), 35.0);
    }

    #[test]
    fn test_estimate_price_half_parseable_range() {
        // One unparseable side poisons the pair; neutral value instead.
        assert_eq!(estimate_price("$50 - TBD"), 0.0);
    }

    #[test]
    fn test_price_range_parse() {
        let range = PriceRange::parse("$50 - $80").unwrap();
        assert_eq!(range.low, 50.0);
        assert_eq!(range.high, 80.0);

        let single = PriceRange::parse("$42").unwrap();
        assert_eq!(single.low, single.high);
    }

    #[test]
    fn test_year_range_window() {
        let range = YearRange::parse("2020-2026").unwrap();
        assert!(range.contains(2024));
        assert!(range.contains(2020));
        assert!(range.contains(2026));
        assert!(!range.contains(2019));
        assert!(!range.contains(2027));
    }

    #[test]
    fn test_year_range_single_year() {
        let range = YearRange::parse("2025").unwrap();
        assert_eq!(range.start, 2025);
        assert_eq!(range.end, 2025);
        assert!(range.contains(2025));
        assert!(!range.contains(2024));
    }

    #[test]
    fn test_year_range_whitespace() {
        let range = YearRange::parse("2022 - 2030").unwrap();
        assert_eq!(range.start, 2022);
        assert_eq!(range.end, 2030);
    }

    #[test]
    fn test_year_range_malformed() {
        assert!(YearRange::parse("").is_none());
        assert!(YearRange::parse("now-ish").is_none());
        assert!(YearRange::parse("2022-soon").is_none());
    }
}
