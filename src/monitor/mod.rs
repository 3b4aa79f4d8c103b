pub mod config;
pub mod menu;
pub mod render;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;

use crate::error::MonitorError;
use crate::roster::{Class, ClassSnapshot, StatusChange};
use crate::submission::{ScanStats, SubmissionScanner};

pub use config::MonitorConfig;
pub use menu::{format_menu, prompt_for_class, select_class};
pub use render::{HtmlRenderer, console_summary};

/// Why the monitoring loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Every student submitted
    Converged { cycles: u64 },

    /// The shutdown signal fired
    Cancelled { cycles: u64 },

    /// The configured cycle limit was reached
    CycleLimit { cycles: u64 },
}

/// What one scan cycle observed
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Scan counters, `None` when the submission folder was unavailable
    pub stats: Option<ScanStats>,

    /// Students whose status changed since the last successful scan
    pub changes: Vec<StatusChange>,

    /// Snapshot taken at the end of the cycle
    pub snapshot: ClassSnapshot,
}

/// Drives repeated scans of one class and keeps the status page current
#[derive(Debug)]
pub struct Monitor {
    class: Class,
    scanner: SubmissionScanner,
    renderer: HtmlRenderer,
    config: MonitorConfig,
    interval: Duration,

    /// Snapshot from the last scan that reached the folder
    previous: Option<ClassSnapshot>,
}

impl Monitor {
    /// Create a monitor for `class`, building the matcher from the config
    pub fn new(class: Class, config: MonitorConfig) -> Result<Self, MonitorError> {
        let scanner = SubmissionScanner::new(config.matching.build()?);
        Ok(Self {
            class,
            scanner,
            renderer: HtmlRenderer::new(config.page_refresh_secs),
            interval: config.poll_interval(),
            config,
            previous: None,
        })
    }

    /// Override the polling interval from the config
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn into_class(self) -> Class {
        self.class
    }

    /// Scan once, write the status page and report what changed.
    ///
    /// An unavailable submission folder is logged and reported in the page;
    /// the next cycle tries again. A page that cannot be written is logged and
    /// does not stop monitoring.
    pub fn run_cycle(&mut self) -> Result<CycleReport> {
        let (stats, notice) = match self.scanner.scan(&mut self.class) {
            Ok(stats) => (Some(stats), None),
            Err(err) if err.is_transient() => {
                warn!("{}", err);
                (None, Some(err.to_string()))
            }
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = self
            .renderer
            .write(&self.class, notice.as_deref(), &self.config.output_path)
        {
            warn!("Could not write status page: {:#}", err);
        }

        let snapshot = self.class.snapshot();
        let mut changes = Vec::new();
        if stats.is_some() {
            if let Some(previous) = &self.previous {
                changes = snapshot.diff(previous);
                for file in snapshot.new_unrecognised_files(previous) {
                    info!("Unrecognised file: {}", file);
                }
            } else {
                for file in &snapshot.unrecognised_files {
                    info!("Unrecognised file: {}", file);
                }
            }
            for change in &changes {
                info!("{}", change);
            }
            self.previous = Some(snapshot.clone());
        }

        info!("{}", console_summary(&self.class));
        Ok(CycleReport {
            stats,
            changes,
            snapshot,
        })
    }

    /// Run scan cycles on a fixed interval until everyone has submitted (when
    /// `stop_when_complete` is set), the cycle limit is hit, or `shutdown`
    /// completes. Cancellation only happens between cycles.
    pub async fn run_until(&mut self, shutdown: impl Future<Output = ()>) -> Result<MonitorOutcome> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            "Monitoring {} in {} every {:?}",
            self.class.name,
            self.class.submission_path.display(),
            self.interval
        );

        let mut cycles = 0;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Stopping after {} cycles", cycles);
                    return Ok(MonitorOutcome::Cancelled { cycles });
                }
                _ = ticker.tick() => {}
            }

            self.run_cycle()?;
            cycles += 1;
            debug!("Cycle {} complete", cycles);

            if self.config.stop_when_complete && self.class.all_submitted() {
                info!("All {} students in {} have submitted", self.class.student_count(), self.class.name);
                return Ok(MonitorOutcome::Converged { cycles });
            }

            if let Some(max_cycles) = self.config.max_cycles {
                if cycles >= max_cycles {
                    return Ok(MonitorOutcome::CycleLimit { cycles });
                }
            }
        }
    }

    /// Run until convergence or Ctrl-C
    pub async fn run(&mut self) -> Result<MonitorOutcome> {
        self.run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("Could not listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
