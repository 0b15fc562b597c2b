//! Calendar-quarter buckets and the regressor names derived from them.

use super::PanelError;
use chrono::{Datelike, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Prefix of the per-quarter dummy regressors.
pub const DUMMY_PREFIX: &str = "quarter_";

/// Prefix of the per-quarter treatment interaction regressors.
pub const INTERACTION_PREFIX: &str = "inter_";

/// A calendar quarter, displayed as `<4-digit year><quarter>` (e.g. `20223`).
///
/// Ordering is chronological, which matches lexicographic order of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterLabel {
    year: i32,
    quarter: u8,
}

impl QuarterLabel {
    /// Create a label; `quarter` must be in `1..=4`.
    pub fn new(year: i32, quarter: u8) -> Result<Self, PanelError> {
        if (1..=4).contains(&quarter) && (0..=9999).contains(&year) {
            Ok(Self { year, quarter })
        } else {
            Err(PanelError::InvalidQuarterLabel(format!("{year:04}{quarter}")))
        }
    }

    /// Bucket a timestamp by month, with quarter boundaries at months 04, 07 and 10.
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        let month = timestamp.month();
        let quarter = if month < 4 {
            1
        } else if month < 7 {
            2
        } else if month < 10 {
            3
        } else {
            4
        };
        Self {
            year: timestamp.year(),
            quarter,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }
}

impl fmt::Display for QuarterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{}", self.year, self.quarter)
    }
}

impl FromStr for QuarterLabel {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PanelError::InvalidQuarterLabel(s.to_string());
        let trimmed = s.trim();
        if trimmed.len() != 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = trimmed[..4].parse().map_err(|_| invalid())?;
        let quarter: u8 = trimmed[4..].parse().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone)]
struct QuarterEntry {
    label: QuarterLabel,
    dummy: String,
    interaction: String,
}

/// Mapping from each observed quarter to its dummy and interaction regressor
/// names, in first-occurrence order.
#[derive(Debug, Clone, Default)]
pub struct QuarterColumns {
    entries: Vec<QuarterEntry>,
}

impl QuarterColumns {
    /// Distinct labels of `labels`, kept in the order they first appear.
    pub fn from_observed(labels: &[QuarterLabel]) -> Self {
        let mut entries: Vec<QuarterEntry> = Vec::new();
        for &label in labels {
            if entries.iter().any(|e| e.label == label) {
                continue;
            }
            entries.push(QuarterEntry {
                label,
                dummy: format!("{DUMMY_PREFIX}{label}"),
                interaction: format!("{INTERACTION_PREFIX}{label}"),
            });
        }
        Self { entries }
    }

    /// Labels in first-occurrence order.
    pub fn labels(&self) -> Vec<QuarterLabel> {
        self.entries.iter().map(|e| e.label).collect()
    }

    /// Labels in chronological order.
    pub fn sorted_labels(&self) -> Vec<QuarterLabel> {
        let mut labels = self.labels();
        labels.sort();
        labels
    }

    pub fn contains(&self, label: QuarterLabel) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the dummy regressor for `label`.
    pub fn dummy(&self, label: QuarterLabel) -> Option<&str> {
        self.find(label).map(|e| e.dummy.as_str())
    }

    /// Name of the treatment interaction regressor for `label`.
    pub fn interaction(&self, label: QuarterLabel) -> Option<&str> {
        self.find(label).map(|e| e.interaction.as_str())
    }

    fn find(&self, label: QuarterLabel) -> Option<&QuarterEntry> {
        self.entries.iter().find(|e| e.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::parse_timestamp;
    use proptest::prelude::*;

    fn label_of(raw: &str) -> String {
        QuarterLabel::from_timestamp(&parse_timestamp(raw).unwrap()).to_string()
    }

    #[test]
    fn test_boundary_months() {
        assert_eq!(label_of("2022-03-31 23:59:59"), "20221");
        assert_eq!(label_of("2022-04-01"), "20222");
        assert_eq!(label_of("2022-06-30 23:59"), "20222");
        assert_eq!(label_of("2022-07-01"), "20223");
        assert_eq!(label_of("2022-09-30"), "20223");
        assert_eq!(label_of("2022-10-01"), "20224");
        assert_eq!(label_of("2022-12-31 23:59:59"), "20224");
        assert_eq!(label_of("2023-01-01"), "20231");
    }

    #[test]
    fn test_parse_label() {
        let label: QuarterLabel = "20223".parse().unwrap();
        assert_eq!(label.year(), 2022);
        assert_eq!(label.quarter(), 3);
        assert_eq!(label.to_string(), "20223");

        for bad in ["2022", "202205", "20225", "20220", "2022Q", "abcde"] {
            assert!(bad.parse::<QuarterLabel>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_columns_keep_first_occurrence_order() {
        let labels: Vec<QuarterLabel> = ["20223", "20221", "20223", "20222", "20221"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let columns = QuarterColumns::from_observed(&labels);

        let observed: Vec<String> = columns.labels().iter().map(|l| l.to_string()).collect();
        assert_eq!(observed, vec!["20223", "20221", "20222"]);

        let sorted: Vec<String> = columns.sorted_labels().iter().map(|l| l.to_string()).collect();
        assert_eq!(sorted, vec!["20221", "20222", "20223"]);

        assert_eq!(columns.dummy(labels[0]), Some("quarter_20223"));
        assert_eq!(columns.interaction(labels[1]), Some("inter_20221"));
    }

    proptest! {
        #[test]
        fn prop_quarter_matches_month(year in 1900i32..2100, month in 1u32..=12, day in 1u32..=28) {
            let raw = format!("{year:04}-{month:02}-{day:02}");
            let label = QuarterLabel::from_timestamp(&parse_timestamp(&raw).unwrap());

            prop_assert_eq!(label.year(), year);
            prop_assert_eq!(u32::from(label.quarter()), (month - 1) / 3 + 1);
            prop_assert_eq!(label.to_string().parse::<QuarterLabel>().unwrap(), label);
        }

        #[test]
        fn prop_label_order_is_chronological(a in (1900i32..2100, 1u8..=4), b in (1900i32..2100, 1u8..=4)) {
            let la = QuarterLabel::new(a.0, a.1).unwrap();
            let lb = QuarterLabel::new(b.0, b.1).unwrap();
            prop_assert_eq!(la.cmp(&lb), la.to_string().cmp(&lb.to_string()));
        }
    }
}
