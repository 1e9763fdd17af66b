//! Routing of inbound chat events to replies.
//!
//! Every event produces exactly one reply string. Lookups run on spawned
//! tokio tasks, at most `max_in_flight` at a time, so a slow provider never
//! holds up other conversations.

use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{AcquireError, Semaphore},
    task::JoinError,
};
use tracing::{info, warn};

use crate::{
    error::FetchError,
    model::{FetchOutcome, InboundEvent, LocationQuery},
    provider::WeatherProvider,
    report::Clock,
};

pub const WELCOME_MESSAGE: &str =
    "👋 Вітаю! Введіть назву населеного пункту, і я скажу, яка там погода ☀️";

pub const EMPTY_QUERY_MESSAGE: &str = "✍️ Введіть назву населеного пункту.";

pub const INTERNAL_ERROR_MESSAGE: &str = "❌ Не вдалося отримати прогноз. Спробуйте ще раз.";

#[derive(Debug, Error)]
enum WorkerError {
    #[error("worker pool closed")]
    Closed(#[from] AcquireError),

    #[error("lookup task failed")]
    Join(#[from] JoinError),
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    provider: Arc<dyn WeatherProvider>,
    workers: Arc<Semaphore>,
    clock: Clock,
}

impl Dispatcher {
    /// `max_in_flight` is clamped to at least one worker.
    pub fn new(provider: Arc<dyn WeatherProvider>, max_in_flight: usize, clock: Clock) -> Self {
        Self {
            provider,
            workers: Arc::new(Semaphore::new(max_in_flight.max(1))),
            clock,
        }
    }

    /// Turn one inbound event into its reply.
    pub async fn handle(&self, event: InboundEvent) -> String {
        match event {
            InboundEvent::Start => WELCOME_MESSAGE.to_string(),
            InboundEvent::Text(content) => match LocationQuery::parse(&content) {
                Some(query) => self.lookup(query).await,
                None => EMPTY_QUERY_MESSAGE.to_string(),
            },
        }
    }

    async fn lookup(&self, query: LocationQuery) -> String {
        match self.fetch_on_worker(query.clone()).await {
            Ok(Ok(report)) => {
                info!(location = %query, city = %report.city_name, "weather report sent");
                report.render(self.clock)
            }
            Ok(Err(err)) => {
                log_fetch_error(&query, &err);
                err.user_message().to_string()
            }
            Err(err) => {
                warn!(location = %query, error = %err, "weather lookup did not complete");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    async fn fetch_on_worker(&self, query: LocationQuery) -> Result<FetchOutcome, WorkerError> {
        let provider = Arc::clone(&self.provider);
        let workers = Arc::clone(&self.workers);

        let task = tokio::spawn(async move {
            let _permit = workers.acquire_owned().await?;
            Ok::<_, WorkerError>(provider.fetch(&query).await)
        });

        task.await?
    }
}

fn log_fetch_error(query: &LocationQuery, err: &FetchError) {
    match err {
        FetchError::NotFound => info!(location = %query, "location not recognized"),
        _ => warn!(location = %query, kind = err.kind(), error = %err, "weather lookup failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::WeatherReport;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    fn sample_report(query: &LocationQuery) -> WeatherReport {
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        WeatherReport {
            requested_name: query.to_string(),
            city_name: "Kyiv".into(),
            observed_at: at,
            temperature_c: 5.2,
            feels_like_c: 2.0,
            temp_min_c: 4.0,
            temp_max_c: 6.0,
            description: "Ясно".into(),
            humidity_pct: 70,
            wind_speed_mps: 2.0,
            wind_gust_mps: 0.0,
            visibility_m: 10_000.0,
            cloud_cover_pct: 0,
            sunrise: at,
            sunset: at,
            icon: "☀️",
            utc_offset_secs: None,
        }
    }

    #[derive(Debug)]
    enum Behaviour {
        Report,
        NotFound,
        Provider,
        Malformed,
        Panic,
    }

    #[derive(Debug)]
    struct StubProvider {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self { behaviour, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Report => Ok(sample_report(query)),
                Behaviour::NotFound => Err(FetchError::NotFound),
                Behaviour::Provider => Err(FetchError::Provider {
                    status: 500,
                    detail: "internal".into(),
                }),
                Behaviour::Malformed => Err(FetchError::MalformedPayload("missing `main`".into())),
                Behaviour::Panic => panic!("provider exploded"),
            }
        }
    }

    fn dispatcher(provider: Arc<StubProvider>) -> Dispatcher {
        Dispatcher::new(provider, 4, Clock::Utc)
    }

    #[tokio::test]
    async fn start_always_gets_welcome_and_no_lookup() {
        let provider = StubProvider::new(Behaviour::Report);
        let d = dispatcher(provider.clone());

        d.handle(InboundEvent::Text("Kyiv".into())).await;
        assert_eq!(d.handle(InboundEvent::Start).await, WELCOME_MESSAGE);
        assert_eq!(d.handle(InboundEvent::Start).await, WELCOME_MESSAGE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn text_is_trimmed_and_rendered() {
        let d = dispatcher(StubProvider::new(Behaviour::Report));
        let reply = d.handle(InboundEvent::Text("  Kyiv  ".into())).await;

        assert!(reply.starts_with("🏠 Населений пункт: Kyiv / Kyiv\n"));
    }

    #[tokio::test]
    async fn blank_text_prompts_without_lookup() {
        let provider = StubProvider::new(Behaviour::Report);
        let d = dispatcher(provider.clone());

        assert_eq!(d.handle(InboundEvent::Text("   ".into())).await, EMPTY_QUERY_MESSAGE);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn errors_become_user_messages() {
        let cases = [
            (Behaviour::NotFound, FetchError::NotFound.user_message()),
            (
                Behaviour::Provider,
                FetchError::Provider { status: 500, detail: String::new() }.user_message(),
            ),
            (Behaviour::Malformed, FetchError::MalformedPayload(String::new()).user_message()),
        ];

        for (behaviour, expected) in cases {
            let d = dispatcher(StubProvider::new(behaviour));
            assert_eq!(d.handle(InboundEvent::Text("Kyiv".into())).await, expected);
        }
    }

    #[tokio::test]
    async fn panicking_worker_still_yields_one_reply() {
        let d = dispatcher(StubProvider::new(Behaviour::Panic));
        let reply = d.handle(InboundEvent::Text("Kyiv".into())).await;

        assert_eq!(reply, INTERNAL_ERROR_MESSAGE);
    }

    #[derive(Debug, Default)]
    struct SlowProvider {
        running: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl WeatherProvider for SlowProvider {
        async fn fetch(&self, query: &LocationQuery) -> Result<WeatherReport, FetchError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok(sample_report(query))
        }
    }

    #[tokio::test]
    async fn concurrent_lookups_are_bounded_by_worker_limit() {
        let provider = Arc::new(SlowProvider::default());
        let d = Dispatcher::new(provider.clone(), 2, Clock::Utc);

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let d = d.clone();
                tokio::spawn(async move { d.handle(InboundEvent::Text(format!("city {i}"))).await })
            })
            .collect();

        for handle in handles {
            let reply = handle.await.unwrap();
            assert!(reply.contains("Kyiv"));
        }

        let peak = provider.peak.load(Ordering::SeqCst);
        assert!((1..=2).contains(&peak), "peak concurrency was {peak}");
    }
}
