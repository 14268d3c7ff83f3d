//! Coverage timeline for renderers.
//!
//! Turns an [`AvailabilityReport`] into one row per product, tagged with the
//! instrument that produced it. Rows serialize with serde so an external
//! renderer can draw them; nothing here draws.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::DayRange;

use super::availability::AvailabilityReport;

// =========================================================
// Instruments
// =========================================================

/// Solar Orbiter instrument, derived from the descriptor prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Eui,
    Phi,
    Mag,
    Swa,
    Rpw,
    Epd,
    Spice,
    Solohi,
    Other,
}

impl Instrument {
    /// Instrument owning `descriptor`, matched case-insensitively on the
    /// first three characters.
    pub fn from_descriptor(descriptor: &str) -> Self {
        let prefix: String = descriptor
            .chars()
            .take(3)
            .flat_map(char::to_lowercase)
            .collect();
        match prefix.as_str() {
            "eui" => Instrument::Eui,
            "phi" => Instrument::Phi,
            "mag" => Instrument::Mag,
            "swa" => Instrument::Swa,
            "rpw" => Instrument::Rpw,
            "epd" => Instrument::Epd,
            "spi" => Instrument::Spice,
            "sol" => Instrument::Solohi,
            _ => Instrument::Other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Eui => "EUI",
            Instrument::Phi => "PHI",
            Instrument::Mag => "MAG",
            Instrument::Swa => "SWA",
            Instrument::Rpw => "RPW",
            Instrument::Epd => "EPD",
            Instrument::Spice => "SPICE",
            Instrument::Solohi => "SoloHI",
            Instrument::Other => "other",
        }
    }

    /// Suggested bar colour (hex RGB).
    pub fn color(&self) -> &'static str {
        match self {
            Instrument::Eui => "#e41a1c",
            Instrument::Phi => "#808080",
            Instrument::Mag => "#377eb8",
            Instrument::Swa => "#4daf4a",
            Instrument::Rpw => "#984ea3",
            Instrument::Epd => "#ff7f00",
            Instrument::Spice => "#a65628",
            Instrument::Solohi => "#dd1c77",
            Instrument::Other => "#000000",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =========================================================
// Timeline rows
// =========================================================

/// Coverage bars for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRow {
    pub descriptor: String,
    pub instrument: Instrument,
    pub color: String,
    pub coverage: Vec<DayRange>,
    pub covered_days: i64,
}

/// Timeline dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timeline {
    pub rows: Vec<TimelineRow>,
    /// Descriptors left out because their lookup failed
    pub missing: Vec<String>,
}

impl Timeline {
    /// Rows in report order; failed products are listed in `missing`.
    pub fn from_report(report: &AvailabilityReport) -> Self {
        let rows = report
            .successes()
            .map(|(product, coverage)| {
                let instrument = Instrument::from_descriptor(product.descriptor());
                TimelineRow {
                    descriptor: product.descriptor().to_string(),
                    instrument,
                    color: instrument.color().to_string(),
                    coverage: coverage.coverage.clone(),
                    covered_days: coverage.covered_days(),
                }
            })
            .collect();
        let missing = report
            .failures()
            .map(|(product, _)| product.descriptor().to_string())
            .collect();
        Self { rows, missing }
    }

    /// Rows grouped by instrument, instruments in declaration order.
    pub fn by_instrument(&self) -> Vec<(Instrument, Vec<&TimelineRow>)> {
        let mut groups: Vec<(Instrument, Vec<&TimelineRow>)> = Vec::new();
        for row in &self.rows {
            match groups.iter_mut().find(|(i, _)| *i == row.instrument) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((row.instrument, vec![row])),
            }
        }
        groups.sort_by_key(|(i, _)| *i);
        groups
    }

    /// Earliest and latest covered day over all rows.
    pub fn span(&self) -> Option<DayRange> {
        let ranges = self.rows.iter().flat_map(|r| r.coverage.iter());
        let start = ranges.clone().map(|r| r.start).min()?;
        let end = ranges.map(|r| r.end).max()?;
        Some(DayRange::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::models::DataProduct;
    use crate::services::availability::{ProductAvailability, ProductCoverage};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn ok(descriptor: &str, coverage: Vec<DayRange>) -> ProductAvailability {
        ProductAvailability {
            product: DataProduct::new(descriptor),
            outcome: Ok(ProductCoverage {
                interval_count: coverage.len(),
                coverage,
            }),
        }
    }

    #[test]
    fn test_instrument_from_prefix() {
        assert_eq!(Instrument::from_descriptor("swa-pas-mom"), Instrument::Swa);
        assert_eq!(Instrument::from_descriptor("SPICE-N-RAS"), Instrument::Spice);
        assert_eq!(Instrument::from_descriptor("solohi-1ft"), Instrument::Solohi);
        assert_eq!(Instrument::from_descriptor("stix-lc"), Instrument::Other);
        assert_eq!(Instrument::from_descriptor("ab"), Instrument::Other);
    }

    #[test]
    fn test_rows_follow_report_and_skip_failures() {
        let report = AvailabilityReport {
            products: vec![
                ok("mag-rtn-normal", vec![DayRange::new(d("2021-01-01"), d("2021-01-03"))]),
                ProductAvailability {
                    product: DataProduct::new("eui-fsi174-image"),
                    outcome: Err(FetchError::network("timed out")),
                },
                ok("epd-step-rates", vec![]),
            ],
        };
        let timeline = Timeline::from_report(&report);

        let names: Vec<_> = timeline.rows.iter().map(|r| r.descriptor.as_str()).collect();
        assert_eq!(names, vec!["mag-rtn-normal", "epd-step-rates"]);
        assert_eq!(timeline.missing, vec!["eui-fsi174-image".to_string()]);
        assert_eq!(timeline.rows[0].covered_days, 3);
        assert_eq!(timeline.rows[0].color, "#377eb8");
    }

    #[test]
    fn test_grouping_and_span() {
        let report = AvailabilityReport {
            products: vec![
                ok("swa-pas-mom", vec![DayRange::new(d("2021-02-01"), d("2021-02-10"))]),
                ok("mag-rtn-normal", vec![DayRange::new(d("2020-03-01"), d("2020-03-02"))]),
                ok("swa-eas-pad-psd", vec![]),
            ],
        };
        let timeline = Timeline::from_report(&report);

        let groups = timeline.by_instrument();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Instrument::Mag);
        assert_eq!(groups[1].0, Instrument::Swa);
        assert_eq!(groups[1].1.len(), 2);

        assert_eq!(
            timeline.span(),
            Some(DayRange::new(d("2020-03-01"), d("2021-02-10")))
        );
    }

    #[test]
    fn test_row_serializes_for_renderer() {
        let row = TimelineRow {
            descriptor: "phi-hrt-blos".into(),
            instrument: Instrument::Phi,
            color: Instrument::Phi.color().into(),
            coverage: vec![DayRange::new(d("2021-01-01"), d("2021-01-01"))],
            covered_days: 1,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["instrument"], "phi");
        assert_eq!(json["coverage"][0]["start"], "2021-01-01");
    }

    #[test]
    fn test_empty_timeline_has_no_span() {
        assert_eq!(Timeline::default().span(), None);
    }
}
