//! Date-range filtering and per-category aggregation for statistics views.
//!
//! Records carry the encoded category string exactly as the category field
//! produced it; grouping decodes it against the taxonomy so that free-text
//! values land in the `"Other"` bucket.

use std::{cmp::Ordering, collections::BTreeMap, fmt, path::Path};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::category::codec::{self, ParsedValue};
use crate::errors::{Result, TrackerError};
use crate::taxonomy::{Taxonomy, TransactionKind, OTHER_CATEGORY};
use crate::utils::persistence;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = TrackerError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(TrackerError::InvalidInput(format!(
                "date range end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// The calendar month containing the first day of `year`/`month`.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| TrackerError::InvalidInput(format!("invalid month {year}-{month}")))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next
            .and_then(|date| date.pred_opt())
            .ok_or_else(|| TrackerError::InvalidInput(format!("invalid month {year}-{month}")))?;
        Ok(Self { start, end })
    }

    pub fn containing_month(date: NaiveDate) -> Result<Self> {
        Self::month(date.year(), date.month())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// A logged transaction as stored by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TransactionRecord {
    pub fn new(
        kind: TransactionKind,
        amount: f64,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            category: category.into(),
            date,
            note: None,
        }
    }
}

/// Reads a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<TransactionRecord>> {
    let records: Vec<TransactionRecord> = persistence::read_json(path)?;
    debug!(path = %path.display(), count = records.len(), "records loaded");
    Ok(records)
}

/// Criteria shared by list and chart views. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub range: Option<DateRange>,
}

impl CategoryFilter {
    pub fn matches(&self, taxonomy: &Taxonomy, record: &TransactionRecord) -> bool {
        if self.kind.is_some_and(|kind| kind != record.kind) {
            return false;
        }
        if self.range.is_some_and(|range| !range.contains(record.date)) {
            return false;
        }
        if self.category.is_none() && self.subcategory.is_none() {
            return true;
        }

        let bucket = Bucket::of(taxonomy, record);
        if let Some(category) = &self.category {
            if &bucket.category != category {
                return false;
            }
        }
        match &self.subcategory {
            Some(subcategory) => bucket.subcategory.as_deref() == Some(subcategory.as_str()),
            None => true,
        }
    }

    pub fn apply<'a>(
        &self,
        taxonomy: &Taxonomy,
        records: &'a [TransactionRecord],
    ) -> Vec<&'a TransactionRecord> {
        records
            .iter()
            .filter(|record| self.matches(taxonomy, record))
            .collect()
    }
}

/// Aggregated amount for one subcategory (or free-text label).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
}

/// Aggregated amount for one top-level category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub icon: String,
    pub total: f64,
    pub count: usize,
    /// Fraction of the summed total across all returned categories.
    pub share: f64,
    /// Amount booked on the category itself, without a subcategory.
    pub unassigned: f64,
    pub subcategories: Vec<SubcategoryTotal>,
}

/// Income, expense and their difference over a range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub income: f64,
    pub expense: f64,
    pub net: f64,
}

/// Sums `records` of `kind` within `range` per category, largest first.
pub fn summarize_by_category(
    taxonomy: &Taxonomy,
    records: &[TransactionRecord],
    kind: TransactionKind,
    range: Option<DateRange>,
) -> Vec<CategoryTotal> {
    let filter = CategoryFilter {
        kind: Some(kind),
        range,
        ..CategoryFilter::default()
    };

    let mut grouped: BTreeMap<String, (f64, usize, f64, BTreeMap<String, (f64, usize)>)> =
        BTreeMap::new();
    for record in filter.apply(taxonomy, records) {
        let bucket = Bucket::of(taxonomy, record);
        let entry = grouped.entry(bucket.category).or_default();
        entry.0 += record.amount;
        entry.1 += 1;
        match bucket.subcategory {
            Some(name) => {
                let sub = entry.3.entry(name).or_default();
                sub.0 += record.amount;
                sub.1 += 1;
            }
            None => entry.2 += record.amount,
        }
    }

    let grand_total: f64 = grouped.values().map(|(total, ..)| *total).sum();
    let mut totals: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(category, (total, count, unassigned, subs))| {
            let mut subcategories: Vec<SubcategoryTotal> = subs
                .into_iter()
                .map(|(name, (total, count))| SubcategoryTotal { name, total, count })
                .collect();
            subcategories.sort_by(|a, b| by_total_then_name(a.total, &a.name, b.total, &b.name));
            CategoryTotal {
                icon: taxonomy.icon(kind, &category).to_string(),
                share: if grand_total == 0.0 {
                    0.0
                } else {
                    total / grand_total
                },
                category,
                total,
                count,
                unassigned,
                subcategories,
            }
        })
        .collect();
    totals.sort_by(|a, b| by_total_then_name(a.total, &a.category, b.total, &b.category));
    totals
}

/// Income and expense sums for records inside `range` (all records when `None`).
pub fn period_totals(records: &[TransactionRecord], range: Option<DateRange>) -> PeriodTotals {
    let mut totals = PeriodTotals::default();
    for record in records {
        if range.is_some_and(|range| !range.contains(record.date)) {
            continue;
        }
        match record.kind {
            TransactionKind::Income => totals.income += record.amount,
            TransactionKind::Expense => totals.expense += record.amount,
        }
    }
    totals.net = totals.income - totals.expense;
    totals
}

fn by_total_then_name(a_total: f64, a_name: &str, b_total: f64, b_name: &str) -> Ordering {
    b_total.total_cmp(&a_total).then_with(|| a_name.cmp(b_name))
}

/// Statistics bucket of a record: its taxonomy category, or `"Other"` with
/// the free text as subcategory.
struct Bucket {
    category: String,
    subcategory: Option<String>,
}

impl Bucket {
    fn of(taxonomy: &Taxonomy, record: &TransactionRecord) -> Self {
        let parsed = codec::decode(taxonomy, record.kind, &record.category);
        let ParsedValue {
            category,
            subcategory,
            custom_text,
        } = parsed;

        if category.is_empty() {
            let text = custom_text.trim();
            return Self {
                category: OTHER_CATEGORY.to_string(),
                subcategory: (!text.is_empty()).then(|| text.to_string()),
            };
        }
        let subcategory = if subcategory.is_empty() {
            None
        } else if subcategory == codec::OTHER_SUBCATEGORY {
            Some(custom_text.trim().to_string()).filter(|text| !text.is_empty())
        } else {
            Some(subcategory)
        };
        Self {
            category,
            subcategory,
        }
    }
}
