//! Test fetchers with call counting, scripted responses and gating

use async_trait::async_trait;
use chrono::NaiveDate;
use dashboard_core::orchestration::{FilterState, WidgetData};
use dashboard_core::registry::WidgetFetcher;
use dashboard_core::FetchError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Fetcher returning queued responses, then a fallback, counting every call
pub struct ScriptedFetcher {
    calls: AtomicUsize,
    responses: Mutex<VecDeque<Result<WidgetData, FetchError>>>,
    fallback: Result<WidgetData, FetchError>,
    delay: Option<Duration>,
    seen: Mutex<Vec<FilterState>>,
}

impl ScriptedFetcher {
    pub fn ok(data: WidgetData) -> Arc<Self> {
        Arc::new(Self::new(Ok(data), None))
    }

    pub fn failing(error: FetchError) -> Arc<Self> {
        Arc::new(Self::new(Err(error), None))
    }

    pub fn delayed(result: Result<WidgetData, FetchError>, delay: Duration) -> Arc<Self> {
        Arc::new(Self::new(result, Some(delay)))
    }

    /// Fetcher answering with `responses` in order, then repeating the last one
    pub fn sequence(responses: Vec<Result<WidgetData, FetchError>>) -> Arc<Self> {
        let fallback = responses
            .last()
            .cloned()
            .unwrap_or_else(|| Err(FetchError::message("script exhausted")));
        let fetcher = Self::new(fallback, None);
        *fetcher.responses.lock() = responses.into();
        Arc::new(fetcher)
    }

    fn new(fallback: Result<WidgetData, FetchError>, delay: Option<Duration>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            responses: Mutex::new(VecDeque::new()),
            fallback,
            delay,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Filter states this fetcher was called with, in call order
    pub fn seen_filters(&self) -> Vec<FilterState> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl WidgetFetcher for ScriptedFetcher {
    async fn fetch(&self, filters: &FilterState) -> Result<WidgetData, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(filters.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Fetcher that blocks every call until the test releases it
pub struct GatedFetcher {
    gate: Semaphore,
    started: AtomicUsize,
    result: Result<WidgetData, FetchError>,
}

impl GatedFetcher {
    pub fn new(result: Result<WidgetData, FetchError>) -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            result,
        })
    }

    /// Let `n` blocked or future calls complete
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` calls are in flight
    pub async fn wait_started(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.started() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("fetch never started");
    }
}

#[async_trait]
impl WidgetFetcher for GatedFetcher {
    async fn fetch(&self, _filters: &FilterState) -> Result<WidgetData, FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| FetchError::message(e.to_string()))?;
        permit.forget();
        self.result.clone()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// 2024-01-01 .. 2024-01-31
pub fn january() -> FilterState {
    FilterState::new(date(2024, 1, 1), date(2024, 1, 31))
}

/// 2024-02-01 .. 2024-02-29
pub fn february() -> FilterState {
    FilterState::new(date(2024, 2, 1), date(2024, 2, 29))
}
