//! Scheduler behavior: job cadence, overlap prevention, failure isolation.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crm_core_api::{
    ApiError, ApiResult, ProjectStatsService, RecalculationSummary, StatsDomain,
};
use crm_core_engine::config::{JobConfig, SchedulerConfig};
use crm_core_engine::StatsScheduler;

/// Stats service stub that records call overlap and can be made to fail.
#[derive(Default)]
struct ProbeStats {
    recalc_calls: AtomicU32,
    fix_calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    run_millis: u64,
    failing: AtomicBool,
}

impl ProbeStats {
    fn slow(run_millis: u64) -> Self {
        Self {
            run_millis,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ProjectStatsService for ProbeStats {
    async fn recalculate_project_stats(&self, _project_unique_id: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn update_after_domain_change(
        &self,
        _project_unique_id: &str,
        _domain: StatsDomain,
    ) -> ApiResult<()> {
        Ok(())
    }

    async fn recalculate_all_active_projects(&self) -> ApiResult<RecalculationSummary> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.run_millis)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.recalc_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::InternalError("probe failure".to_string()));
        }
        Ok(RecalculationSummary::default())
    }

    async fn find_projects_needing_recalculation(
        &self,
        _staleness: chrono::Duration,
    ) -> ApiResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn verify_project_stats(&self, _project_unique_id: &str) -> ApiResult<bool> {
        Ok(true)
    }

    async fn fix_inconsistent_stats(&self) -> ApiResult<u32> {
        self.fix_calls.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}

fn config(full: Option<u64>, drift: Option<u64>, heartbeat: Option<u64>) -> SchedulerConfig {
    SchedulerConfig {
        full_recalc: JobConfig {
            enabled: full.is_some(),
            interval_secs: full.unwrap_or(1),
        },
        drift_repair: JobConfig {
            enabled: drift.is_some(),
            interval_secs: drift.unwrap_or(1),
        },
        heartbeat: JobConfig {
            enabled: heartbeat.is_some(),
            interval_secs: heartbeat.unwrap_or(1),
        },
    }
}

#[tokio::test]
async fn disabled_jobs_spawn_no_tasks() {
    let stats = Arc::new(ProbeStats::default());
    let scheduler = Arc::new(StatsScheduler::new(stats, config(None, None, None)));
    let handles = scheduler.start();
    assert!(handles.is_empty());
}

#[tokio::test(start_paused = true)]
async fn full_recalculation_runs_on_schedule() {
    let stats = Arc::new(ProbeStats::default());
    let scheduler = Arc::new(StatsScheduler::new(stats.clone(), config(Some(60), None, None)));
    let handles = scheduler.start();

    tokio::time::sleep(Duration::from_secs(190)).await;

    assert!(stats.recalc_calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(stats.fix_calls.load(Ordering::SeqCst), 0);
    for handle in handles {
        handle.abort();
    }
}

#[tokio::test(start_paused = true)]
async fn runs_of_the_same_job_never_overlap() {
    // Each run takes 2.5x the tick period.
    let stats = Arc::new(ProbeStats::slow(2_500));
    let scheduler = Arc::new(StatsScheduler::new(stats.clone(), config(Some(1), None, None)));
    let handles = scheduler.start();

    tokio::time::sleep(Duration::from_secs(20)).await;

    assert!(stats.recalc_calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(stats.max_in_flight.load(Ordering::SeqCst), 1);
    for handle in handles {
        handle.abort();
    }
}

#[tokio::test(start_paused = true)]
async fn failing_runs_do_not_stop_the_schedule() {
    let stats = Arc::new(ProbeStats::default());
    stats.failing.store(true, Ordering::SeqCst);
    let scheduler = Arc::new(StatsScheduler::new(stats.clone(), config(Some(30), None, None)));
    let handles = scheduler.start();

    tokio::time::sleep(Duration::from_secs(100)).await;

    assert!(stats.recalc_calls.load(Ordering::SeqCst) >= 3);
    for handle in handles {
        handle.abort();
    }
}

#[tokio::test(start_paused = true)]
async fn drift_repair_job_invokes_fix() {
    let stats = Arc::new(ProbeStats::default());
    let scheduler = Arc::new(StatsScheduler::new(stats.clone(), config(None, Some(60), None)));
    let handles = scheduler.start();

    tokio::time::sleep(Duration::from_secs(130)).await;

    assert!(stats.fix_calls.load(Ordering::SeqCst) >= 2);
    assert_eq!(stats.recalc_calls.load(Ordering::SeqCst), 0);
    for handle in handles {
        handle.abort();
    }
}
