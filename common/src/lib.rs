//! Shared salary survey types used by the API, the seeder and the dashboard client.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One survey answer as served by `GET /salaries`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SalaryRecord {
    pub id: i64,
    pub date: Option<NaiveDateTime>,
    pub title: Option<String>,
    /// Head count, averaged when the answer was a range.
    pub company_size: Option<f64>,
    pub accoms: Option<String>,
    /// Years of experience, averaged when the answer was a range.
    pub experience: Option<f64>,
    pub currency: Option<String>,
    pub pay_range: Option<String>,
    pub area: Option<String>,
    pub company_origin: Option<String>,
    pub work_style: Option<String>,
    pub work_area: Option<String>,
}

/// One bucket of `GET /salaries/pay_range_summary`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct PayRangeCount {
    pub pay_range: Option<String>,
    pub count: u64,
}

/// The fixed vocabulary of filter names accepted by both endpoints.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FilterKey {
    Title,
    MinCompanySize,
    MaxCompanySize,
    MinExperience,
    MaxExperience,
    Area,
    Currency,
    WorkArea,
}

impl FilterKey {
    pub const ALL: [FilterKey; 8] = [
        FilterKey::Title,
        FilterKey::MinCompanySize,
        FilterKey::MaxCompanySize,
        FilterKey::MinExperience,
        FilterKey::MaxExperience,
        FilterKey::Area,
        FilterKey::Currency,
        FilterKey::WorkArea,
    ];

    /// Query parameter name on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKey::Title => "title",
            FilterKey::MinCompanySize => "min_company_size",
            FilterKey::MaxCompanySize => "max_company_size",
            FilterKey::MinExperience => "min_experience",
            FilterKey::MaxExperience => "max_experience",
            FilterKey::Area => "area",
            FilterKey::Currency => "currency",
            FilterKey::WorkArea => "work_area",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter name to value. An empty string means the filter is unset.
///
/// Serializes as a flat map, so it can be handed straight to a query-string
/// encoder.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Filters(BTreeMap<FilterKey, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.0.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Returns a copy without the entries whose value is the empty string.
    ///
    /// Whitespace is a value: `" "` is kept.
    pub fn sanitized(&self) -> Filters {
        self.0
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (*key, value.clone()))
            .collect()
    }

    /// `(name, value)` pairs in key order, ready for a query string.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.iter().map(|(key, value)| (key.as_str(), value)).collect()
    }
}

impl FromIterator<(FilterKey, String)> for Filters {
    fn from_iter<I: IntoIterator<Item = (FilterKey, String)>>(iter: I) -> Self {
        Filters(iter.into_iter().collect())
    }
}
