//! Reactive drop-in feed: UI state changes in, committed pages out.
//!
//! Every dispatched [`FeedAction`] runs one derive → fetch → commit cycle.
//! Cycles are numbered; a response is committed only if its cycle is still
//! the latest one issued, so a slow response can never overwrite a newer page.

use std::collections::BTreeMap;
use std::sync::Arc;

use advising_core::grouping::{group_by_day, DayBucket};
use advising_core::pagination::{
    shift_window, PaginationParams, ParamsError, TimeRangePaginationParams, WINDOW_STRIDE_DAYS,
};
use advising_core::types::{parse_instant, DropInStatusOverview};
use advising_core::DropIn;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use crate::collaborators::{Navigator, Notifier, PermissionCheck, ProfileSource};
use crate::error::FetchError;
use crate::service::{AdvisingService, FeedPage};

pub const START_DATE_KEY: &str = "start_date";
pub const END_DATE_KEY: &str = "end_date";

pub const DISMISS_LABEL: &str = "Close";
pub const NOTIFICATION_MS: u64 = 2000;

pub const MANAGE_ACTION: &str = "academic_advising.*";
pub const MANAGE_RESOURCE: &str = "drop_in/*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedAction {
    SetStart(DateTime<Utc>),
    SetEnd(DateTime<Utc>),
    SetFilter(String),
    /// Moves both window bounds by this many weeks.
    ShiftWindow(i64),
    GotoPage(u32),
    SetPageSize(u32),
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Committed { seq: u64, informational: bool },
    /// A newer cycle was issued while this one was in flight.
    Discarded { seq: u64, latest: u64 },
}

#[derive(Debug, Clone)]
pub struct FeedState {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub filter: String,
    /// Parameters the server last echoed back.
    pub previous_params: TimeRangePaginationParams,
    pub page: Option<Arc<FeedPage>>,
    /// Featured and registered drop-ins, supplied by the host. Never fetched here.
    pub event_status: Option<DropInStatusOverview>,
    pending_page: Option<u32>,
    pending_page_size: Option<u32>,
    issued: u64,
}

impl FeedState {
    /// One week starting at `now`, first page.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            start: now,
            end: now + Duration::days(WINDOW_STRIDE_DAYS),
            filter: String::new(),
            previous_params: TimeRangePaginationParams::default_window(now),
            page: None,
            event_status: None,
            pending_page: None,
            pending_page_size: None,
            issued: 0,
        }
    }

    /// Seeds the window from `start_date`/`end_date` location keys when they parse.
    pub fn from_query(now: DateTime<Utc>, query: &BTreeMap<String, String>) -> Self {
        let mut state = Self::new(now);
        let start = query
            .get(START_DATE_KEY)
            .and_then(|v| parse_instant(START_DATE_KEY, v).ok());
        let end = query
            .get(END_DATE_KEY)
            .and_then(|v| parse_instant(END_DATE_KEY, v).ok());

        if let Some(start) = start {
            state.start = start;
            state.end = start + Duration::days(WINDOW_STRIDE_DAYS);
        }
        if let Some(end) = end {
            state.end = end;
        }
        state.previous_params = TimeRangePaginationParams::window(
            state.previous_params.base.clone(),
            state.start,
            state.end,
        );
        state
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.previous_params.base.page_size = PaginationParams::clamp_page_size(page_size);
        self
    }

    /// Applies `action`. A rejected action leaves the state untouched.
    pub fn reduce(&mut self, action: FeedAction) -> Result<(), ParamsError> {
        match action {
            FeedAction::SetStart(start) => self.start = start,
            FeedAction::SetEnd(end) => self.end = end,
            FeedAction::SetFilter(filter) => self.filter = filter,
            FeedAction::ShiftWindow(weeks) => {
                let (start, end) = shift_window(self.start, self.end, weeks)
                    .ok_or(ParamsError::WindowOverflow { weeks })?;
                self.start = start;
                self.end = end;
            }
            FeedAction::GotoPage(page) => self.pending_page = Some(page),
            FeedAction::SetPageSize(page_size) => {
                self.pending_page_size = Some(PaginationParams::clamp_page_size(page_size));
                self.pending_page = Some(0);
            }
            FeedAction::Reload => {}
        }
        Ok(())
    }

    /// Fresh parameters for the next fetch: window and filter from local
    /// state, paging from the last echo unless a paging action overrode it.
    pub fn derive_params(&self) -> TimeRangePaginationParams {
        let previous = &self.previous_params.base;
        let base = PaginationParams {
            page: self.pending_page.unwrap_or(previous.page),
            page_size: self.pending_page_size.unwrap_or(previous.page_size),
            order_by: previous.order_by.clone(),
            filter: self.filter.clone(),
        };
        TimeRangePaginationParams::window(base, self.start, self.end)
    }

    pub fn latest_seq(&self) -> u64 {
        self.issued
    }

    fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    fn commit(&mut self, page: FeedPage) -> Arc<FeedPage> {
        self.previous_params = page.params.clone();
        self.pending_page = None;
        self.pending_page_size = None;
        let page = Arc::new(page);
        self.page = Some(Arc::clone(&page));
        page
    }
}

/// What observers see after each commit.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub seq: u64,
    pub page: Option<Arc<FeedPage>>,
}

impl FeedSnapshot {
    /// Day buckets for the current page, recomputed on every call.
    pub fn grouped(&self) -> Vec<DayBucket<'_, DropIn>> {
        self.page
            .as_deref()
            .map(|page| group_by_day(&page.items))
            .unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.page.as_deref().and_then(|page| page.message.as_deref())
    }
}

pub struct FeedController {
    service: Arc<AdvisingService>,
    profile: Arc<dyn ProfileSource>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<FeedState>,
    snapshots: watch::Sender<FeedSnapshot>,
}

impl FeedController {
    pub fn new(
        service: Arc<AdvisingService>,
        profile: Arc<dyn ProfileSource>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        state: FeedState,
    ) -> Self {
        let (snapshots, _) = watch::channel(FeedSnapshot {
            seq: 0,
            page: state.page.clone(),
        });
        Self {
            service,
            profile,
            navigator,
            notifier,
            state: RwLock::new(state),
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn state(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Replaces the held status overview without starting a fetch cycle.
    pub async fn set_event_status(&self, status: Option<DropInStatusOverview>) {
        self.state.write().await.event_status = status;
    }

    pub async fn event_status(&self) -> Option<DropInStatusOverview> {
        self.state.read().await.event_status.clone()
    }

    pub async fn dispatch(&self, action: FeedAction) -> Result<CycleOutcome, FetchError> {
        let authenticated = self.profile.is_authenticated();
        let (seq, params) = {
            let mut state = self.state.write().await;
            state.reduce(action)?;
            let seq = state.issue();
            (seq, state.derive_params())
        };
        if params.is_inverted() {
            debug!(seq, "window ends before it starts, expecting an empty page");
        }
        debug!(
            seq,
            range_start = %params.range_start,
            range_end = %params.range_end,
            authenticated,
            "fetching feed window"
        );

        let result = self.service.get_events(&params, authenticated).await;

        let mut state = self.state.write().await;
        let latest = state.latest_seq();
        if seq != latest {
            debug!(seq, latest, "discarding superseded feed response");
            return Ok(CycleOutcome::Discarded { seq, latest });
        }

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!(seq, error = %err, "feed fetch failed");
                return Err(err);
            }
        };

        let informational = page.is_informational();
        let page = state.commit(page);
        self.navigator.merge_query(&[
            (START_DATE_KEY, page.params.range_start.clone()),
            (END_DATE_KEY, page.params.range_end.clone()),
        ]);
        self.snapshots.send_replace(FeedSnapshot {
            seq,
            page: Some(page),
        });

        Ok(CycleOutcome::Committed { seq, informational })
    }

    pub async fn set_start_date(&self, start: DateTime<Utc>) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::SetStart(start)).await
    }

    pub async fn set_end_date(&self, end: DateTime<Utc>) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::SetEnd(end)).await
    }

    pub async fn set_filter(&self, filter: impl Into<String>) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::SetFilter(filter.into())).await
    }

    /// Next week.
    pub async fn next_page(&self) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::ShiftWindow(1)).await
    }

    /// Previous week.
    pub async fn previous_page(&self) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::ShiftWindow(-1)).await
    }

    pub async fn goto_page(&self, page: u32) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::GotoPage(page)).await
    }

    pub async fn set_page_size(&self, page_size: u32) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::SetPageSize(page_size)).await
    }

    pub async fn reload_page(&self) -> Result<CycleOutcome, FetchError> {
        self.dispatch(FeedAction::Reload).await
    }

    pub async fn register(&self, event_id: i64) -> Result<(), FetchError> {
        match self.service.register(event_id).await {
            Ok(()) => {
                self.notifier
                    .notify("Successfully registered for drop-in!", DISMISS_LABEL, NOTIFICATION_MS);
                self.refresh_after_registration().await;
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(
                    "Error: Issue registering for drop-in. Please try again.",
                    DISMISS_LABEL,
                    NOTIFICATION_MS,
                );
                Err(err)
            }
        }
    }

    pub async fn unregister(&self, event_id: i64) -> Result<(), FetchError> {
        match self.service.unregister(event_id).await {
            Ok(()) => {
                self.notifier
                    .notify("Successfully unregistered from drop-in!", DISMISS_LABEL, NOTIFICATION_MS);
                self.refresh_after_registration().await;
                Ok(())
            }
            Err(err) => {
                self.notifier.notify(
                    "Error: Issue unregistering from drop-in. Please try again.",
                    DISMISS_LABEL,
                    NOTIFICATION_MS,
                );
                Err(err)
            }
        }
    }

    async fn refresh_after_registration(&self) {
        if let Err(err) = self.reload_page().await {
            warn!(error = %err, "feed refresh after registration change failed");
        }
    }
}

pub async fn can_manage_drop_ins<P: PermissionCheck>(permission: &P) -> bool {
    permission.check(MANAGE_ACTION, MANAGE_RESOURCE).await
}
