pub mod collaborators;
pub mod controller;
pub mod error;
pub mod paginator;
pub mod search;
pub mod service;

#[cfg(test)]
mod test_support;

pub use controller::{CycleOutcome, FeedAction, FeedController, FeedSnapshot, FeedState};
pub use error::FetchError;
pub use paginator::{Paginator, TimeRangePaginator};
pub use service::AdvisingService;
