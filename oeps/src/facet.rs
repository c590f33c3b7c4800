//! Filter facets for the download selector.
//!
//! Two facets are offered: geographic [`Scale`] and data [`Year`]. A
//! [`FilterState`] holds the selected values of each facet; an empty
//! selection means "no filter" and matches everything.
//!
//! # Example
//!
//! ```
//! use oeps::facet::{FilterCategory, FilterState, Scale, Year};
//!
//! let mut filters = FilterState::new();
//! filters.toggle_label("State", FilterCategory::Scale).unwrap();
//! filters.toggle_year(Year::Latest);
//!
//! assert!(filters.scales().contains(&Scale::State));
//! assert!(filters.years().contains(&Year::Latest));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Errors raised when parsing facet labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FacetError {
    /// The label is not a known value for the category.
    #[error("unknown {category} value '{label}' (expected one of: {expected})")]
    UnknownLabel {
        category: FilterCategory,
        label: String,
        expected: String,
    },

    /// The one-letter dataset scale code is not recognised.
    #[error("unknown scale code '{0}'")]
    UnknownScaleCode(String),
}

/// Geographic aggregation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scale {
    State,
    County,
    Tract,
    /// ZIP Code Tabulation Area.
    Zip,
}

impl Scale {
    /// All scales in display order.
    pub const ALL: [Scale; 4] = [Scale::State, Scale::County, Scale::Tract, Scale::Zip];

    /// Display label, as used by the geometry manifest and the CLI.
    pub fn label(self) -> &'static str {
        match self {
            Scale::State => "State",
            Scale::County => "County",
            Scale::Tract => "Tract",
            Scale::Zip => "Zip",
        }
    }

    /// One-letter code used by the dataset manifest.
    pub fn code(self) -> &'static str {
        match self {
            Scale::State => "S",
            Scale::County => "C",
            Scale::Tract => "T",
            Scale::Zip => "Z",
        }
    }

    /// Parse a one-letter dataset code (`S`, `C`, `T`, `Z`).
    pub fn from_code(code: &str) -> Result<Self, FacetError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Scale::State),
            "C" => Ok(Scale::County),
            "T" => Ok(Scale::Tract),
            "Z" => Ok(Scale::Zip),
            _ => Err(FacetError::UnknownScaleCode(code.to_string())),
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scale {
    type Err = FacetError;

    /// Accepts labels case-insensitively, plus `zcta` as an alias for `Zip`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(Scale::State),
            "county" => Ok(Scale::County),
            "tract" => Ok(Scale::Tract),
            "zip" | "zcta" => Ok(Scale::Zip),
            _ => Err(FacetError::UnknownLabel {
                category: FilterCategory::Scale,
                label: s.to_string(),
                expected: expected_labels(Scale::ALL.iter().map(|s| s.label())),
            }),
        }
    }
}

/// Data vintage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Year {
    Y1980,
    Y1990,
    Y2000,
    Y2010,
    Latest,
}

impl Year {
    /// All years in display order.
    pub const ALL: [Year; 5] = [
        Year::Y1980,
        Year::Y1990,
        Year::Y2000,
        Year::Y2010,
        Year::Latest,
    ];

    /// Only one historic boundary set is published per scale; every historic
    /// year maps onto it.
    pub const HISTORIC_FALLBACK: Year = Year::Y2010;

    pub fn label(self) -> &'static str {
        match self {
            Year::Y1980 => "1980",
            Year::Y1990 => "1990",
            Year::Y2000 => "2000",
            Year::Y2010 => "2010",
            Year::Latest => "Latest",
        }
    }

    /// True for every numeric census year.
    pub fn is_historic(self) -> bool {
        !matches!(self, Year::Latest)
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Year {
    type Err = FacetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1980" => Ok(Year::Y1980),
            "1990" => Ok(Year::Y1990),
            "2000" => Ok(Year::Y2000),
            "2010" => Ok(Year::Y2010),
            "latest" => Ok(Year::Latest),
            _ => Err(FacetError::UnknownLabel {
                category: FilterCategory::Year,
                label: s.to_string(),
                expected: expected_labels(Year::ALL.iter().map(|y| y.label())),
            }),
        }
    }
}

/// A filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCategory {
    Scale,
    Year,
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterCategory::Scale => f.write_str("scale"),
            FilterCategory::Year => f.write_str("year"),
        }
    }
}

/// A single selectable facet value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetValue {
    Scale(Scale),
    Year(Year),
}

impl FacetValue {
    /// Parse a label within the given category.
    pub fn parse(label: &str, category: FilterCategory) -> Result<Self, FacetError> {
        match category {
            FilterCategory::Scale => label.parse().map(FacetValue::Scale),
            FilterCategory::Year => label.parse().map(FacetValue::Year),
        }
    }
}

/// The user's current facet selections.
///
/// Mutated only through the toggle methods. Empty sets match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    scales: BTreeSet<Scale>,
    years: BTreeSet<Year>,
}

impl FilterState {
    /// Create an empty (match-all) filter state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `value` in its category.
    ///
    /// Returns `true` if the value is selected after the call.
    pub fn toggle(&mut self, value: FacetValue) -> bool {
        match value {
            FacetValue::Scale(scale) => flip(&mut self.scales, scale),
            FacetValue::Year(year) => flip(&mut self.years, year),
        }
    }

    pub fn toggle_scale(&mut self, scale: Scale) -> bool {
        self.toggle(FacetValue::Scale(scale))
    }

    pub fn toggle_year(&mut self, year: Year) -> bool {
        self.toggle(FacetValue::Year(year))
    }

    /// Parse `label` within `category` and toggle it.
    pub fn toggle_label(&mut self, label: &str, category: FilterCategory) -> Result<bool, FacetError> {
        let value = FacetValue::parse(label, category)?;
        Ok(self.toggle(value))
    }

    pub fn scales(&self) -> &BTreeSet<Scale> {
        &self.scales
    }

    pub fn years(&self) -> &BTreeSet<Year> {
        &self.years
    }

    /// True when `scale` passes the scale facet.
    pub fn matches_scale(&self, scale: Scale) -> bool {
        self.scales.is_empty() || self.scales.contains(&scale)
    }

    /// True when `year` is explicitly selected or the year facet is empty.
    pub fn matches_year(&self, year: Year) -> bool {
        self.years.is_empty() || self.years.contains(&year)
    }

    /// True when any selected year is a historic census year.
    pub fn requests_historic(&self) -> bool {
        self.years.iter().any(|y| y.is_historic())
    }

    /// True when neither facet has a selection.
    pub fn is_unfiltered(&self) -> bool {
        self.scales.is_empty() && self.years.is_empty()
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scales = if self.scales.is_empty() {
            "all".to_string()
        } else {
            expected_labels(self.scales.iter().map(|s| s.label()))
        };
        let years = if self.years.is_empty() {
            "all".to_string()
        } else {
            expected_labels(self.years.iter().map(|y| y.label()))
        };
        write!(f, "scales: {}; years: {}", scales, years)
    }
}

fn flip<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

fn expected_labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}
