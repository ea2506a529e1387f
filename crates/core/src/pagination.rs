//! Query parameters and the result envelope shared by every paginated feed.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::parse_instant;

/// Upper bound on `page_size`; larger requests are rejected before any fetch.
pub const MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Days a time-range window moves on next/previous page.
pub const WINDOW_STRIDE_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    #[error("page_size must be at least 1")]
    EmptyPage,

    #[error("page_size {requested} exceeds the maximum of {max}")]
    PageTooLarge { requested: u32, max: u32 },

    #[error("shifting the window by {weeks} weeks leaves the representable date range")]
    WindowOverflow { weeks: i64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub order_by: String,
    #[serde(default)]
    pub filter: String,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            order_by: String::new(),
            filter: String::new(),
        }
    }
}

impl PaginationParams {
    pub fn clamp_page_size(page_size: u32) -> u32 {
        page_size.clamp(1, MAX_PAGE_SIZE)
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        match self.page_size {
            0 => Err(ParamsError::EmptyPage),
            n if n > MAX_PAGE_SIZE => Err(ParamsError::PageTooLarge {
                requested: n,
                max: MAX_PAGE_SIZE,
            }),
            _ => Ok(()),
        }
    }

    fn push_pairs(&self, pairs: &mut Vec<(&'static str, String)>) {
        pairs.push(("page", self.page.to_string()));
        pairs.push(("page_size", self.page_size.to_string()));
        pairs.push(("order_by", self.order_by.clone()));
        pairs.push(("filter", self.filter.clone()));
    }
}

/// Pagination parameters restricted to a `[range_start, range_end]` window.
///
/// An inverted window is not an error here; the server answers it with an
/// empty page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRangePaginationParams {
    #[serde(flatten)]
    pub base: PaginationParams,
    pub range_start: String,
    pub range_end: String,
}

impl TimeRangePaginationParams {
    pub fn window(base: PaginationParams, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            base,
            range_start: iso_instant(start),
            range_end: iso_instant(end),
        }
    }

    /// First page of the week starting at `now`.
    pub fn default_window(now: DateTime<Utc>) -> Self {
        Self::window(
            PaginationParams::default(),
            now,
            now + Duration::days(WINDOW_STRIDE_DAYS),
        )
    }

    /// The window as instants, if both bounds parse.
    pub fn range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse_instant("range_start", &self.range_start).ok()?;
        let end = parse_instant("range_end", &self.range_end).ok()?;
        Some((start, end))
    }

    pub fn is_inverted(&self) -> bool {
        matches!(self.range(), Some((start, end)) if start > end)
    }
}

/// Moves both bounds by `weeks` strides, or `None` if either leaves chrono's range.
pub fn shift_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    weeks: i64,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let days = WINDOW_STRIDE_DAYS.checked_mul(weeks)?;
    let stride = Duration::try_days(days)?;
    Some((start.checked_add_signed(stride)?, end.checked_add_signed(stride)?))
}

/// Formats an instant the way browsers serialize dates: UTC, millisecond precision.
pub fn iso_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Common view over parameter types a paginator can send.
pub trait PageQuery: Clone + DeserializeOwned + Send + Sync + 'static {
    fn base(&self) -> &PaginationParams;

    /// Query string pairs, in wire order.
    fn query_pairs(&self) -> Vec<(&'static str, String)>;

    fn validate(&self) -> Result<(), ParamsError> {
        self.base().validate()
    }
}

impl PageQuery for PaginationParams {
    fn base(&self) -> &PaginationParams {
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        self.push_pairs(&mut pairs);
        pairs
    }
}

impl PageQuery for TimeRangePaginationParams {
    fn base(&self) -> &PaginationParams {
        &self.base
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        self.base.push_pairs(&mut pairs);
        pairs.push(("range_start", self.range_start.clone()));
        pairs.push(("range_end", self.range_end.clone()));
        pairs
    }
}

/// One page of results plus the parameters the server actually served.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T, P> {
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub length: u64,
    pub params: P,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T, P> Paginated<T, P> {
    /// Empty stand-in page carrying an informational message instead of data.
    pub fn unavailable(params: P, message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            length: 0,
            params,
            message: Some(message.into()),
        }
    }

    pub fn is_informational(&self) -> bool {
        self.items.is_empty() && self.message.is_some()
    }

    /// Converts every item; the first failure rejects the whole page.
    pub fn try_map_items<U, E, F>(self, mut f: F) -> Result<Paginated<U, P>, E>
    where
        F: FnMut(usize, T) -> Result<U, E>,
    {
        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(index, item)| f(index, item))
            .collect::<Result<Vec<_>, E>>()?;
        Ok(Paginated {
            items,
            length: self.length,
            params: self.params,
            message: self.message,
        })
    }
}

impl<T, P: PageQuery> Paginated<T, P> {
    pub fn page_count(&self) -> u64 {
        let size = u64::from(self.params.base().page_size.max(1));
        self.length.div_ceil(size)
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.params.base().page) + 1 < self.page_count()
    }

    pub fn has_previous_page(&self) -> bool {
        self.params.base().page > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_default_params() {
        let p = PaginationParams::default();
        assert_eq!(p.page, 0);
        assert_eq!(p.page_size, 10);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_page_size_bounds() {
        let mut p = PaginationParams::default();
        p.page_size = 0;
        assert_eq!(p.validate(), Err(ParamsError::EmptyPage));
        p.page_size = 101;
        assert_eq!(
            p.validate(),
            Err(ParamsError::PageTooLarge { requested: 101, max: 100 })
        );
        p.page_size = 100;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(PaginationParams::clamp_page_size(0), 1);
        assert_eq!(PaginationParams::clamp_page_size(500), 100);
        assert_eq!(PaginationParams::clamp_page_size(25), 25);
    }

    #[test]
    fn test_default_window_spans_one_week() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let p = TimeRangePaginationParams::default_window(now);
        assert_eq!(p.range_start, "2024-01-01T00:00:00.000Z");
        assert_eq!(p.range_end, "2024-01-08T00:00:00.000Z");
        assert_eq!(p.range(), Some((now, now + Duration::days(7))));
        assert!(!p.is_inverted());
    }

    #[test]
    fn test_shift_window_by_weeks() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(7);
        assert_eq!(
            shift_window(start, end, 2),
            Some((start + Duration::days(14), end + Duration::days(14)))
        );
        assert_eq!(shift_window(start, end, 0), Some((start, end)));
    }

    #[test]
    fn test_shift_window_overflow_is_none() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::days(7);
        assert_eq!(shift_window(start, end, 100_000_000), None);
        assert_eq!(shift_window(start, end, i64::MAX), None);
        assert_eq!(shift_window(start, end, i64::MIN), None);
    }

    #[test]
    fn test_inverted_window_detected() {
        let start = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let p = TimeRangePaginationParams::window(PaginationParams::default(), start, end);
        assert!(p.is_inverted());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_time_range_query_pairs_order() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let p = TimeRangePaginationParams::default_window(now);
        let keys: Vec<_> = p.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            ["page", "page_size", "order_by", "filter", "range_start", "range_end"]
        );
    }

    #[test]
    fn test_time_range_params_flattened_json() {
        let parsed: TimeRangePaginationParams = serde_json::from_value(json!({
            "page": 2,
            "page_size": 25,
            "order_by": "start",
            "filter": "",
            "range_start": "2024-01-01T00:00:00Z",
            "range_end": "2024-01-08T00:00:00Z",
            "ascending": "true"
        }))
        .unwrap();
        assert_eq!(parsed.base.page, 2);
        assert_eq!(parsed.base.page_size, 25);
        assert_eq!(parsed.range_end, "2024-01-08T00:00:00Z");
    }

    #[test]
    fn test_unavailable_page_is_informational() {
        let page: Paginated<u32, PaginationParams> =
            Paginated::unavailable(PaginationParams::default(), "log in first");
        assert!(page.is_informational());
        assert_eq!(page.length, 0);
    }

    #[test]
    fn test_page_count_and_navigation() {
        let mut params = PaginationParams::default();
        params.page_size = 10;
        let page = Paginated {
            items: vec![1, 2, 3],
            length: 23,
            params: params.clone(),
            message: None,
        };
        assert_eq!(page.page_count(), 3);
        assert!(page.has_next_page());
        assert!(!page.has_previous_page());

        params.page = 2;
        let last = Paginated { params, ..page };
        assert!(!last.has_next_page());
        assert!(last.has_previous_page());
    }

    #[test]
    fn test_try_map_items_rejects_whole_page() {
        let page = Paginated {
            items: vec!["1", "x", "3"],
            length: 3,
            params: PaginationParams::default(),
            message: None,
        };
        let result = page.try_map_items(|index, raw| {
            raw.parse::<u32>().map_err(|_| index)
        });
        assert_eq!(result.unwrap_err(), 1);
    }
}
