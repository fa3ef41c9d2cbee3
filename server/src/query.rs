//! Record filtering and pay-range aggregation.

use std::collections::BTreeMap;

use common::{PayRangeCount, SalaryRecord};
use serde::Deserialize;

/// Number of buckets returned by the pay-range summary.
pub const SUMMARY_LIMIT: usize = 3;

/// Query parameters shared by `/salaries` and `/salaries/pay_range_summary`.
///
/// Absent parameters are not applied. Empty text parameters are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct SalaryQuery {
    pub title: Option<String>,
    pub min_company_size: Option<f64>,
    pub max_company_size: Option<f64>,
    pub min_experience: Option<f64>,
    pub max_experience: Option<f64>,
    pub area: Option<String>,
    pub work_area: Option<String>,
    pub currency: Option<String>,
}

impl SalaryQuery {
    /// A record with a missing field never matches a filter on that field.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        contains(&self.title, &record.title)
            && at_least(self.min_company_size, record.company_size)
            && at_most(self.max_company_size, record.company_size)
            && at_least(self.min_experience, record.experience)
            && at_most(self.max_experience, record.experience)
            && contains(&self.area, &record.area)
            && contains(&self.work_area, &record.work_area)
            && ends_with(&self.currency, &record.currency)
    }

    pub fn filter<'a>(
        &'a self,
        records: &'a [SalaryRecord],
    ) -> impl Iterator<Item = &'a SalaryRecord> + 'a {
        records.iter().filter(move |record| self.matches(record))
    }
}

fn text_filter(needle: &Option<String>) -> Option<String> {
    needle
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(str::to_lowercase)
}

fn contains(needle: &Option<String>, field: &Option<String>) -> bool {
    match text_filter(needle) {
        None => true,
        Some(needle) => field
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(&needle)),
    }
}

// Currency codes are matched from the end, so "try" finds "TRY" and "₺ TRY".
fn ends_with(needle: &Option<String>, field: &Option<String>) -> bool {
    match text_filter(needle) {
        None => true,
        Some(needle) => field
            .as_deref()
            .is_some_and(|value| value.to_lowercase().ends_with(&needle)),
    }
}

fn at_least(bound: Option<f64>, value: Option<f64>) -> bool {
    bound.is_none_or(|bound| value.is_some_and(|v| v >= bound))
}

fn at_most(bound: Option<f64>, value: Option<f64>) -> bool {
    bound.is_none_or(|bound| value.is_some_and(|v| v <= bound))
}

/// Groups records by pay range and returns the `limit` largest groups.
///
/// Equal counts are ordered by pay range, with the missing range first.
pub fn pay_range_summary<'a>(
    records: impl IntoIterator<Item = &'a SalaryRecord>,
    limit: usize,
) -> Vec<PayRangeCount> {
    let mut counts: BTreeMap<Option<&str>, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.pay_range.as_deref()).or_default() += 1;
    }

    let mut summary: Vec<PayRangeCount> = counts
        .into_iter()
        .map(|(pay_range, count)| PayRangeCount {
            pay_range: pay_range.map(str::to_string),
            count,
        })
        .collect();

    // Stable sort keeps the BTreeMap order for ties.
    summary.sort_by(|a, b| b.count.cmp(&a.count));
    summary.truncate(limit);
    summary
}
