pub mod config;
pub mod error;
pub mod grouping;
pub mod pagination;
pub mod types;

#[cfg(test)]
mod grouping_tests;

pub use error::ParseError;
pub use grouping::{group_by_day, group_by_day_in, DayBucket, Scheduled};
pub use pagination::{Paginated, PageQuery, PaginationParams, TimeRangePaginationParams};
pub use types::{parse_drop_in, parse_drop_in_status, DropIn, DropInStatusOverview};
