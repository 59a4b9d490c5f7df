//! Dashboard screen state: fetch on activation, periodic refresh, optimistic
//! drink recording and fallback substitution.
//!
//! Every fetch takes a [`Ticket`] carrying the generation it was issued at.
//! Optimistic mutations also advance the generation, so a response is only
//! applied while nothing newer has touched the screen since it was issued.

use crate::client::{ApiError, WaterApi};
use crate::clock::Clock;
use crate::fallback::FallbackData;
use crate::format::format_amount;
use crate::models::{DailySummary, DashboardData};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

pub const DEFAULT_TAG: &str = "DEFAULT_TAG";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_DRINK_ML: f64 = 250.0;

/// What happens to an optimistic drink when the backend write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteFailurePolicy {
    /// Keep the local update and report success; the device is trusted to
    /// sync eventually.
    #[default]
    KeepOptimistic,
    /// Restore the pre-drink summary and report the failure.
    Rollback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", content = "data", rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Ready(DashboardData),
}

impl LoadState {
    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            LoadState::Loading => None,
            LoadState::Ready(data) => Some(data),
        }
    }
}

/// Snapshot handed to renderers and the JSON mirror.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub tag: String,
    pub active: bool,
    pub state: LoadState,
    pub refreshing: bool,
    pub source: Option<DataSource>,
    pub last_sync: Option<DateTime<Utc>>,
    pub drink_amount_ml: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkOutcome {
    pub amount_ml: f64,
    pub acknowledged: bool,
    pub rolled_back: bool,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub tag: String,
    pub refresh_every: Duration,
    pub drink_amount_ml: f64,
    pub policy: WriteFailurePolicy,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            tag: DEFAULT_TAG.to_string(),
            refresh_every: DEFAULT_REFRESH_INTERVAL,
            drink_amount_ml: DEFAULT_DRINK_ML,
            policy: WriteFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    tag: String,
}

#[derive(Debug)]
struct Screen {
    tag: String,
    active: bool,
    generation: u64,
    latest_fetch: u64,
    state: LoadState,
    refreshing: bool,
    source: Option<DataSource>,
    last_sync: Option<DateTime<Utc>>,
    notice: Option<Notice>,
    drink_amount_ml: f64,
}

impl Screen {
    fn issue_fetch(&mut self) -> Ticket {
        self.generation += 1;
        self.latest_fetch = self.generation;
        Ticket {
            generation: self.generation,
            tag: self.tag.clone(),
        }
    }

    fn is_current(&self, ticket: &Ticket) -> bool {
        self.active && self.tag == ticket.tag && self.generation == ticket.generation
    }

    fn settle(&mut self, ticket: &Ticket) {
        if self.latest_fetch == ticket.generation {
            self.refreshing = false;
        }
    }
}

pub struct DashboardController<A> {
    api: Arc<A>,
    fallback: Arc<dyn FallbackData>,
    clock: Arc<dyn Clock>,
    policy: WriteFailurePolicy,
    refresh_every: Duration,
    screen: Mutex<Screen>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl<A: WaterApi> DashboardController<A> {
    pub fn new(
        api: Arc<A>,
        fallback: Arc<dyn FallbackData>,
        clock: Arc<dyn Clock>,
        options: ControllerOptions,
    ) -> Self {
        Self {
            api,
            fallback,
            clock,
            policy: options.policy,
            refresh_every: options.refresh_every,
            screen: Mutex::new(Screen {
                tag: options.tag,
                active: false,
                generation: 0,
                latest_fetch: 0,
                state: LoadState::Loading,
                refreshing: false,
                source: None,
                last_sync: None,
                notice: None,
                drink_amount_ml: options.drink_amount_ml,
            }),
            poller: Mutex::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn policy(&self) -> WriteFailurePolicy {
        self.policy
    }

    /// Shows the screen for `tag`: resets to loading, then loads and keeps
    /// refreshing in the background until deactivated or re-activated.
    pub async fn activate(self: &Arc<Self>, tag: impl Into<String>) {
        let tag = tag.into();
        // Held until the new handle is stored: one poller per controller.
        let mut poller = self.poller.lock().await;
        stop_poller(&mut poller);
        self.enter(&tag).await;
        info!(%tag, every = ?self.refresh_every, "dashboard activated");

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(this.refresh_every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            this.load().await;
            loop {
                ticker.tick().await;
                this.refresh().await;
            }
        });
        *poller = Some(handle);
    }

    pub async fn deactivate(&self) {
        let mut poller = self.poller.lock().await;
        stop_poller(&mut poller);
        let mut screen = self.screen.lock().await;
        screen.active = false;
        screen.refreshing = false;
        screen.generation += 1;
        info!(tag = %screen.tag, "dashboard deactivated");
    }

    /// Refetches without blanking the current view. Failures keep what is
    /// shown; only a screen with nothing to show gets the fallback.
    pub async fn refresh(&self) {
        let Some(ticket) = self.begin_fetch(true).await else {
            return;
        };

        let result = self.api.dashboard(&ticket.tag).await;
        let now = self.clock.now();
        let mut screen = self.screen.lock().await;
        screen.settle(&ticket);
        if !screen.is_current(&ticket) {
            debug!(tag = %ticket.tag, generation = ticket.generation, "discarding stale refresh");
            return;
        }

        match result {
            Ok(data) => {
                screen.state = LoadState::Ready(data);
                screen.source = Some(DataSource::Live);
                screen.last_sync = Some(now);
            }
            Err(err) => {
                debug!(tag = %ticket.tag, "refresh failed: {err}");
                if matches!(screen.state, LoadState::Loading) {
                    screen.state = LoadState::Ready(self.fallback.dashboard(now));
                    screen.source = Some(DataSource::Fallback);
                }
            }
        }
    }

    pub async fn record_drink(self: &Arc<Self>, amount_ml: Option<f64>) -> DrinkOutcome {
        let (tag, amount_ml, before, mutation) = {
            let mut screen = self.screen.lock().await;
            let amount_ml = amount_ml
                .filter(|ml| ml.is_finite() && *ml > 0.0)
                .unwrap_or(screen.drink_amount_ml);
            let mut before = None;
            if let LoadState::Ready(data) = &mut screen.state {
                before = Some(data.daily_summary.clone());
                data.daily_summary.add_drink(amount_ml);
            }
            if before.is_some() {
                screen.generation += 1;
            }
            (screen.tag.clone(), amount_ml, before, screen.generation)
        };

        let result = self.api.record_drink(&tag, amount_ml).await;
        match result {
            Ok(ack) => {
                debug!(%tag, amount_ml, %ack, "drink acknowledged");
                self.push_notice(drink_recorded(amount_ml)).await;
                let this = Arc::clone(self);
                tokio::spawn(async move { this.refresh().await });
                DrinkOutcome {
                    amount_ml,
                    acknowledged: true,
                    rolled_back: false,
                }
            }
            Err(err) => self.write_failed(&tag, amount_ml, before, mutation, err).await,
        }
    }

    async fn write_failed(
        &self,
        tag: &str,
        amount_ml: f64,
        before: Option<DailySummary>,
        mutation: u64,
        err: ApiError,
    ) -> DrinkOutcome {
        warn!(%tag, amount_ml, policy = ?self.policy, "drink write failed: {err}");

        let mut screen = self.screen.lock().await;
        match self.policy {
            WriteFailurePolicy::KeepOptimistic => {
                screen.notice = Some(drink_recorded(amount_ml));
                DrinkOutcome {
                    amount_ml,
                    acknowledged: false,
                    rolled_back: false,
                }
            }
            WriteFailurePolicy::Rollback => {
                let mut rolled_back = false;
                if screen.tag == tag && screen.generation == mutation {
                    if let (Some(summary), LoadState::Ready(data)) = (before, &mut screen.state) {
                        data.daily_summary = summary;
                        rolled_back = true;
                    }
                }
                screen.notice = Some(Notice::new(
                    NoticeKind::Error,
                    "Drink not recorded",
                    "The tracker could not be reached. Please try again.",
                ));
                DrinkOutcome {
                    amount_ml,
                    acknowledged: false,
                    rolled_back,
                }
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let screen = self.screen.lock().await;
        DashboardView {
            tag: screen.tag.clone(),
            active: screen.active,
            state: screen.state.clone(),
            refreshing: screen.refreshing,
            source: screen.source,
            last_sync: screen.last_sync,
            drink_amount_ml: screen.drink_amount_ml,
        }
    }

    pub async fn active_tag(&self) -> String {
        self.screen.lock().await.tag.clone()
    }

    pub async fn take_notice(&self) -> Option<Notice> {
        self.screen.lock().await.notice.take()
    }

    pub async fn push_notice(&self, notice: Notice) {
        self.screen.lock().await.notice = Some(notice);
    }

    pub async fn set_drink_amount(&self, amount_ml: f64) {
        if amount_ml.is_finite() && amount_ml > 0.0 {
            self.screen.lock().await.drink_amount_ml = amount_ml;
        }
    }

    async fn enter(&self, tag: &str) {
        let mut screen = self.screen.lock().await;
        screen.tag = tag.to_string();
        screen.active = true;
        screen.generation += 1;
        screen.state = LoadState::Loading;
        screen.refreshing = false;
        screen.source = None;
    }

    /// First fetch after activation. Always leaves the screen ready, with the
    /// fallback snapshot if the backend is unreachable.
    async fn load(&self) {
        let Some(ticket) = self.begin_fetch(false).await else {
            return;
        };

        let result = self.api.dashboard(&ticket.tag).await;
        let now = self.clock.now();
        let mut screen = self.screen.lock().await;
        screen.settle(&ticket);
        if !screen.is_current(&ticket) {
            debug!(tag = %ticket.tag, generation = ticket.generation, "discarding stale load");
            return;
        }

        match result {
            Ok(data) => {
                info!(tag = %ticket.tag, "dashboard loaded");
                screen.state = LoadState::Ready(data);
                screen.source = Some(DataSource::Live);
                screen.last_sync = Some(now);
            }
            Err(err) => {
                warn!(tag = %ticket.tag, "backend unavailable, using sample data: {err}");
                screen.state = LoadState::Ready(self.fallback.dashboard(now));
                screen.source = Some(DataSource::Fallback);
                screen.notice = Some(Notice::new(
                    NoticeKind::Info,
                    "Offline mode",
                    "The hydration service is unreachable; showing sample data.",
                ));
            }
        }
    }

    async fn begin_fetch(&self, background: bool) -> Option<Ticket> {
        let mut screen = self.screen.lock().await;
        if !screen.active {
            return None;
        }
        if background && matches!(screen.state, LoadState::Ready(_)) {
            screen.refreshing = true;
        }
        Some(screen.issue_fetch())
    }
}

fn stop_poller(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}

fn drink_recorded(amount_ml: f64) -> Notice {
    Notice::new(
        NoticeKind::Success,
        "Drink recorded!",
        format!("Added {} to your daily intake", format_amount(amount_ml)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::fallback::SampleData;
    use crate::models::TagInfo;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct FakeApi {
        responses: std::sync::Mutex<VecDeque<(Duration, Option<DashboardData>)>>,
        dashboard_calls: AtomicUsize,
        drink_calls: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                responses: std::sync::Mutex::new(VecDeque::new()),
                dashboard_calls: AtomicUsize::new(0),
                drink_calls: AtomicUsize::new(0),
                fail_writes: AtomicBool::new(false),
            }
        }

        /// `None` makes the call fail.
        fn push(&self, delay: Duration, data: Option<DashboardData>) {
            self.responses.lock().unwrap().push_back((delay, data));
        }
    }

    impl WaterApi for FakeApi {
        async fn dashboard(&self, _tag: &str) -> Result<DashboardData, ApiError> {
            self.dashboard_calls.fetch_add(1, Ordering::SeqCst);
            let next = self.responses.lock().unwrap().pop_front();
            let (delay, data) = next.unwrap_or((Duration::ZERO, None));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            data.ok_or(ApiError::Status(StatusCode::SERVICE_UNAVAILABLE))
        }

        async fn tags(&self) -> Result<Vec<TagInfo>, ApiError> {
            Err(ApiError::Timeout)
        }

        async fn record_drink(&self, _tag: &str, _amount_ml: f64) -> Result<serde_json::Value, ApiError> {
            self.drink_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ApiError::Timeout);
            }
            Ok(serde_json::json!({ "status": "ok" }))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap()
    }

    fn live_data(total: f64) -> DashboardData {
        let mut data = SampleData.dashboard(now());
        data.daily_summary.total_consumed_ml = total;
        data.daily_summary.hydration_status = "Need More Water".to_string();
        data
    }

    fn controller(api: Arc<FakeApi>, policy: WriteFailurePolicy) -> Arc<DashboardController<FakeApi>> {
        Arc::new(DashboardController::new(
            api,
            Arc::new(SampleData),
            Arc::new(FixedClock(now())),
            ControllerOptions {
                policy,
                ..ControllerOptions::default()
            },
        ))
    }

    fn summary_of(view: &DashboardView) -> DailySummary {
        view.state.data().expect("dashboard ready").daily_summary.clone()
    }

    #[tokio::test]
    async fn failed_load_substitutes_fallback() {
        let api = Arc::new(FakeApi::new());
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        let view = ctrl.view().await;
        assert_eq!(view.state, LoadState::Ready(SampleData.dashboard(now())));
        assert_eq!(view.source, Some(DataSource::Fallback));
        assert!(!view.refreshing);

        let notice = ctrl.take_notice().await.expect("offline notice");
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(ctrl.take_notice().await.is_none());
    }

    #[tokio::test]
    async fn successful_load_stores_live_data() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::ZERO, Some(live_data(1200.0)));
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        let view = ctrl.view().await;
        assert_eq!(view.source, Some(DataSource::Live));
        assert_eq!(view.last_sync, Some(now()));
        assert_eq!(summary_of(&view).total_consumed_ml, 1200.0);
    }

    #[tokio::test]
    async fn optimistic_drink_survives_failed_write() {
        let api = Arc::new(FakeApi::new());
        api.fail_writes.store(true, Ordering::SeqCst);
        let ctrl = controller(Arc::clone(&api), WriteFailurePolicy::KeepOptimistic);
        ctrl.enter("TAG001").await;
        ctrl.load().await;
        ctrl.take_notice().await;

        let outcome = ctrl.record_drink(None).await;
        assert_eq!(outcome.amount_ml, 250.0);
        assert!(!outcome.acknowledged);
        assert!(!outcome.rolled_back);

        let summary = summary_of(&ctrl.view().await);
        assert_eq!(summary.total_consumed_ml, 1900.0);
        assert_eq!(summary.remaining_ml, 50.0);
        assert_eq!(summary.drink_count, 8);
        assert!((summary.progress_percentage - 95.0).abs() < 1e-9);

        let notice = ctrl.take_notice().await.expect("notice");
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.title, "Drink recorded!");
        assert_eq!(notice.description, "Added 250ml to your daily intake");
        assert_eq!(api.drink_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn optimistic_drink_applies_when_write_succeeds() {
        let api = Arc::new(FakeApi::new());
        let ctrl = controller(api, WriteFailurePolicy::KeepOptimistic);
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        let outcome = ctrl.record_drink(None).await;
        assert!(outcome.acknowledged);

        // The follow-up refresh fails here, so the optimistic state stays.
        tokio::task::yield_now().await;
        let summary = summary_of(&ctrl.view().await);
        assert_eq!(summary.total_consumed_ml, 1900.0);
        assert_eq!(summary.drink_count, 8);
    }

    #[tokio::test]
    async fn rollback_policy_restores_summary() {
        let api = Arc::new(FakeApi::new());
        api.fail_writes.store(true, Ordering::SeqCst);
        let ctrl = controller(api, WriteFailurePolicy::Rollback);
        ctrl.enter("TAG001").await;
        ctrl.load().await;
        ctrl.take_notice().await;

        let outcome = ctrl.record_drink(Some(300.0)).await;
        assert!(outcome.rolled_back);

        let summary = summary_of(&ctrl.view().await);
        assert_eq!(summary.total_consumed_ml, 1650.0);
        assert_eq!(summary.drink_count, 7);
        assert_eq!(ctrl.take_notice().await.unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn drink_while_loading_only_issues_write() {
        let api = Arc::new(FakeApi::new());
        let ctrl = controller(Arc::clone(&api), WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;

        ctrl.record_drink(None).await;
        assert_eq!(ctrl.view().await.state, LoadState::Loading);
        assert_eq!(api.drink_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_displayed_data() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::ZERO, Some(live_data(1200.0)));
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        ctrl.refresh().await;
        let view = ctrl.view().await;
        assert_eq!(summary_of(&view).total_consumed_ml, 1200.0);
        assert_eq!(view.source, Some(DataSource::Live));
        assert!(!view.refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn older_refresh_cannot_overwrite_newer_one() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::ZERO, Some(live_data(1000.0)));
        api.push(Duration::from_millis(200), Some(live_data(1100.0)));
        api.push(Duration::from_millis(50), Some(live_data(1300.0)));
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        tokio::join!(ctrl.refresh(), ctrl.refresh());

        let view = ctrl.view().await;
        assert_eq!(summary_of(&view).total_consumed_ml, 1300.0);
        assert!(!view.refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_started_before_drink_is_discarded() {
        let api = Arc::new(FakeApi::new());
        api.fail_writes.store(true, Ordering::SeqCst);
        api.push(Duration::ZERO, Some(live_data(1000.0)));
        api.push(Duration::from_millis(100), Some(live_data(1000.0)));
        let ctrl = controller(api, WriteFailurePolicy::KeepOptimistic);
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        let drink = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.record_drink(None).await
        };
        tokio::join!(ctrl.refresh(), drink);

        let view = ctrl.view().await;
        assert_eq!(summary_of(&view).total_consumed_ml, 1250.0);
        assert!(!view.refreshing);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_after_deactivate_is_dropped() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::from_millis(100), Some(live_data(1000.0)));
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;

        let loading = ctrl.load();
        let teardown = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            ctrl.deactivate().await;
        };
        tokio::join!(loading, teardown);

        let view = ctrl.view().await;
        assert!(!view.active);
        assert_eq!(view.state, LoadState::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn activation_loads_then_polls_until_deactivated() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::ZERO, Some(live_data(1000.0)));
        let ctrl = controller(Arc::clone(&api), WriteFailurePolicy::default());

        ctrl.activate("TAG001").await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(api.dashboard_calls.load(Ordering::SeqCst), 1);
        assert_eq!(ctrl.view().await.source, Some(DataSource::Live));

        tokio::time::sleep(DEFAULT_REFRESH_INTERVAL * 2).await;
        assert_eq!(api.dashboard_calls.load(Ordering::SeqCst), 3);

        ctrl.deactivate().await;
        tokio::time::sleep(DEFAULT_REFRESH_INTERVAL * 3).await;
        assert_eq!(api.dashboard_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn overlapping_activations_leave_a_single_poller() {
        let api = Arc::new(FakeApi::new());
        let ctrl = Arc::new(DashboardController::new(
            Arc::clone(&api),
            Arc::new(SampleData),
            Arc::new(FixedClock(now())),
            ControllerOptions {
                refresh_every: Duration::from_millis(100),
                ..ControllerOptions::default()
            },
        ));

        for round in 0..50 {
            let barrier = Arc::new(tokio::sync::Barrier::new(8));
            let activations: Vec<_> = (0..8)
                .map(|i| {
                    let ctrl = Arc::clone(&ctrl);
                    let barrier = Arc::clone(&barrier);
                    tokio::spawn(async move {
                        barrier.wait().await;
                        ctrl.activate(format!("TAG{round}-{i}")).await;
                    })
                })
                .collect();
            for activation in activations {
                activation.await.unwrap();
            }
        }

        ctrl.deactivate().await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        let before = api.dashboard_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(api.dashboard_calls.load(Ordering::SeqCst), before);

        ctrl.activate("ONE").await;
        tokio::time::sleep(Duration::from_millis(1050)).await;
        ctrl.deactivate().await;
        let fetches = api.dashboard_calls.load(Ordering::SeqCst) - before;
        assert!(
            (8..=14).contains(&fetches),
            "one poller should fetch about 11 times in a second, got {fetches}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn changing_tag_restarts_from_loading() {
        let api = Arc::new(FakeApi::new());
        api.push(Duration::ZERO, Some(live_data(1000.0)));
        api.push(Duration::from_millis(500), Some(live_data(400.0)));
        let ctrl = controller(Arc::clone(&api), WriteFailurePolicy::default());

        ctrl.activate("TAG001").await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(summary_of(&ctrl.view().await).total_consumed_ml, 1000.0);

        ctrl.activate("TAG002").await;
        let view = ctrl.view().await;
        assert_eq!(view.tag, "TAG002");
        assert_eq!(view.state, LoadState::Loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(summary_of(&ctrl.view().await).total_consumed_ml, 400.0);
        ctrl.deactivate().await;
    }

    #[tokio::test]
    async fn drink_amount_can_be_changed() {
        let api = Arc::new(FakeApi::new());
        api.fail_writes.store(true, Ordering::SeqCst);
        let ctrl = controller(api, WriteFailurePolicy::default());
        ctrl.enter("TAG001").await;
        ctrl.load().await;

        ctrl.set_drink_amount(500.0).await;
        ctrl.set_drink_amount(-3.0).await;
        let outcome = ctrl.record_drink(None).await;
        assert_eq!(outcome.amount_ml, 500.0);
        assert_eq!(summary_of(&ctrl.view().await).total_consumed_ml, 2150.0);
    }
}
