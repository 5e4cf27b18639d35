use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use jbrief::{
    cache::{FixedClock, InMemoryCacheStore, Memoizer},
    games::{GameQueryService, InMemoryGameRepository},
    DashboardService,
};

use super::mocks::CountingRepository;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub dashboard: Arc<DashboardService>,
    pub repository: Arc<CountingRepository>,
    pub store: Arc<InMemoryGameRepository>,
    pub cache: Arc<InMemoryCacheStore>,
    pub clock: Arc<FixedClock>,
}

pub struct TestSetupBuilder {
    store: Arc<InMemoryGameRepository>,
    today: NaiveDate,
    delay: Duration,
    ttl: Option<Duration>,
}

impl TestSetupBuilder {
    pub fn new(store: Arc<InMemoryGameRepository>) -> Self {
        Self {
            store,
            today: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            delay: Duration::ZERO,
            ttl: None,
        }
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn slow_store(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn build(self) -> TestSetup {
        let repository =
            Arc::new(CountingRepository::new(self.store.clone()).with_delay(self.delay));
        let cache = Arc::new(InMemoryCacheStore::new());
        let clock = Arc::new(FixedClock::new(self.today));
        let memoizer = Memoizer::new(cache.clone(), clock.clone(), self.ttl);
        let dashboard = Arc::new(DashboardService::new(
            GameQueryService::new(repository.clone(), 10),
            memoizer,
            clock.clone(),
        ));

        TestSetup {
            dashboard,
            repository,
            store: self.store,
            cache,
            clock,
        }
    }
}
