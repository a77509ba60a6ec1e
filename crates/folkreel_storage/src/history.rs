//! History queries over the generation index.

use chrono::{DateTime, Days, NaiveDate, Utc};
use folkreel_core::GenerationRecord;
use serde::{Deserialize, Serialize};

/// Page size when the caller gives none.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest page size served.
pub const MAX_PER_PAGE: u32 = 50;

/// Filters and paging for an account's generation history.
///
/// All fields are optional so the query deserializes straight from a URL query
/// string. Dates are `YYYY-MM-DD` and inclusive; dates that do not parse are
/// ignored rather than rejected.
///
/// ```
/// use folkreel_storage::HistoryQuery;
///
/// let query = HistoryQuery::default().with_per_page(500).with_page(0);
/// assert_eq!(query.page(), 1);
/// assert_eq!(query.per_page(), 50);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryQuery {
    /// One-based page number
    #[serde(default)]
    pub page: Option<u32>,
    /// Records per page
    #[serde(default)]
    pub per_page: Option<u32>,
    /// Case-insensitive country substring
    #[serde(default)]
    pub country: Option<String>,
    /// Earliest creation day, inclusive
    #[serde(default)]
    pub date_from: Option<String>,
    /// Latest creation day, inclusive
    #[serde(default)]
    pub date_to: Option<String>,
}

impl HistoryQuery {
    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Filter by country substring.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Filter by creation day range.
    pub fn with_dates(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.date_from = from.map(str::to_string);
        self.date_to = to.map(str::to_string);
        self
    }

    /// Effective page number (at least 1).
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size (1 to [`MAX_PER_PAGE`]).
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Whether a record passes the country and date filters.
    pub fn matches(&self, record: &GenerationRecord) -> bool {
        if let Some(needle) = self.country.as_deref().map(str::trim)
            && !needle.is_empty()
            && !record
                .country
                .to_lowercase()
                .contains(&needle.to_lowercase())
        {
            return false;
        }

        if let Some(from) = parse_day(self.date_from.as_deref())
            && record.created_at < from
        {
            return false;
        }

        // Everything before the following midnight counts as the `to` day.
        if let Some(to) = parse_day(self.date_to.as_deref())
            .and_then(|day| day.checked_add_days(Days::new(1)))
            && record.created_at >= to
        {
            return false;
        }

        true
    }
}

fn parse_day(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// One page of history, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Page served
    pub page: u32,
    /// Page size used
    pub per_page: u32,
    /// Number of pages at this size
    pub total_pages: u32,
    /// Records matching the filters
    pub total_items: u64,
    /// Records on this page
    pub records: Vec<GenerationRecord>,
}

impl HistoryPage {
    /// Cut one page out of records already filtered and sorted.
    pub fn paginate(matching: Vec<GenerationRecord>, query: &HistoryQuery) -> Self {
        let page = query.page();
        let per_page = query.per_page();
        let total_items = matching.len() as u64;
        let total_pages = total_items.div_ceil(u64::from(per_page)) as u32;

        let skip = (page as usize - 1).saturating_mul(per_page as usize);
        let records = matching
            .into_iter()
            .skip(skip)
            .take(per_page as usize)
            .collect();

        Self {
            page,
            per_page,
            total_pages,
            total_items,
            records,
        }
    }
}
