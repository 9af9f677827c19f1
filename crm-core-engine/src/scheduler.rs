//! Time-driven triggers for the statistics engine.
//!
//! Each job runs in its own task as a sequential loop: a tick starts the job
//! body inline, so a new run can never start while the previous run of the
//! same job is in flight. Delayed missed-tick behavior keeps a long run from
//! causing a burst of catch-up ticks. Job failures are logged and never
//! propagate past the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use crm_core_api::ProjectStatsService;

use crate::config::SchedulerConfig;

pub struct StatsScheduler {
    stats: Arc<dyn ProjectStatsService>,
    config: SchedulerConfig,
}

impl StatsScheduler {
    pub fn new(stats: Arc<dyn ProjectStatsService>, config: SchedulerConfig) -> Self {
        Self { stats, config }
    }

    /// Spawn one task per enabled job. Abort the handles to stop.
    pub fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        if self.config.full_recalc.enabled {
            handles.push(self.clone().spawn_full_recalc());
        }
        if self.config.drift_repair.enabled {
            handles.push(self.clone().spawn_drift_repair());
        }
        if self.config.heartbeat.enabled {
            handles.push(self.clone().spawn_heartbeat());
        }
        info!(jobs = handles.len(), "statistics scheduler started");
        handles
    }

    fn spawn_full_recalc(self: Arc<Self>) -> JoinHandle<()> {
        let period = interval_of(self.config.full_recalc.interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await; // immediate first tick

            loop {
                ticker.tick().await;
                info!("starting scheduled full project statistics recalculation");
                let started = Instant::now();
                match self.stats.recalculate_all_active_projects().await {
                    Ok(summary) => info!(
                        success = summary.success_count,
                        failed = summary.fail_count,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "scheduled full recalculation completed"
                    ),
                    Err(err) => {
                        error!(error = %err, "error during scheduled full recalculation");
                    }
                }
            }
        })
    }

    fn spawn_drift_repair(self: Arc<Self>) -> JoinHandle<()> {
        let period = interval_of(self.config.drift_repair.interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                info!("starting scheduled inconsistent stats fix");
                match self.stats.fix_inconsistent_stats().await {
                    Ok(fixed) => info!(fixed, "scheduled inconsistent stats fix completed"),
                    Err(err) => {
                        error!(error = %err, "error during scheduled inconsistent stats fix");
                    }
                }
            }
        })
    }

    fn spawn_heartbeat(self: Arc<Self>) -> JoinHandle<()> {
        let period = interval_of(self.config.heartbeat.interval_secs);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                info!("statistics scheduler is active and healthy");
            }
        })
    }
}

/// `tokio::time::interval` panics on a zero period.
fn interval_of(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}
