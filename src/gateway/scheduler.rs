//! Background scheduler: morning announcements of recurring tasks and
//! delivery of due reminders.
//!
//! Announcements fire on any poll that lands inside the first
//! `window_minutes` of `daily_check_hour` (local time). Every such poll
//! re-sends each recurring task unless `once_per_day` is set, and a poll
//! interval longer than the window can miss a day entirely.

use super::deliver_text;
use crate::i18n;
use chrono::{DateTime, TimeZone, Timelike, Utc};
use pomni_core::{config::SchedulerConfig, error::PomniError, traits::Channel};
use pomni_memory::{Store, Task};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// State the scheduler loop owns, detached from the gateway.
pub(super) struct Scheduler {
    pub(super) store: Store,
    pub(super) channels: HashMap<String, Arc<dyn Channel>>,
    pub(super) config: SchedulerConfig,
    pub(super) language: String,
    pub(super) send_timeout: Duration,
}

/// What a single scheduler wake accomplished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Recurring-task announcements sent.
    pub announced: usize,
    /// One-shot reminders delivered and marked done.
    pub reminders_delivered: usize,
    /// Sends that failed (logged, not retried until the next wake).
    pub failures: usize,
}

impl Scheduler {
    /// Run forever: check, then sleep for the poll interval.
    pub(super) async fn run(self) {
        let poll = Duration::from_secs(self.config.poll_interval_secs.max(1));
        info!(
            "scheduler: polling every {}s, daily check at {:02}:00 (+{} min)",
            poll.as_secs(),
            self.config.daily_check_hour,
            self.config.window_minutes
        );
        loop {
            let report = self.tick(chrono::Local::now()).await;
            if report != TickReport::default() {
                info!(
                    "scheduler: announced {}, reminders {}, failures {}",
                    report.announced, report.reminders_delivered, report.failures
                );
            }
            tokio::time::sleep(poll).await;
        }
    }

    /// Whether `now` falls inside the daily announcement window.
    pub(super) fn in_daily_window<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.hour() == self.config.daily_check_hour && now.minute() < self.config.window_minutes
    }

    /// One scheduler wake at wall-clock time `now`.
    pub(super) async fn tick<Tz: TimeZone>(&self, now: DateTime<Tz>) -> TickReport {
        let mut report = TickReport::default();
        if self.in_daily_window(&now) {
            self.announce_recurring(&now, &mut report).await;
        } else {
            debug!("scheduler: outside daily window");
        }
        if self.config.deliver_reminders {
            self.deliver_due_reminders(now.with_timezone(&Utc), &mut report)
                .await;
        }
        report
    }

    async fn announce_recurring<Tz: TimeZone>(&self, now: &DateTime<Tz>, report: &mut TickReport) {
        let tasks = match self.store.list_recurring_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("scheduler: failed to list recurring tasks: {e}");
                return;
            }
        };

        let today = now.date_naive();
        for task in tasks.iter().filter(|t| !t.is_done) {
            if self.config.once_per_day {
                match self.store.claim_daily_notification(&task.id, today).await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        error!("scheduler: failed to claim task {}: {e}", task.id);
                        continue;
                    }
                }
            }

            let text = i18n::daily_announcement(&self.language, &task.content);
            match self.send(task, &text).await {
                Ok(()) => report.announced += 1,
                Err(e) => {
                    error!(
                        "scheduler: failed to announce task {} to {}: {e}",
                        task.id, task.owner_id
                    );
                    report.failures += 1;
                }
            }
        }
    }

    async fn deliver_due_reminders(&self, now: DateTime<Utc>, report: &mut TickReport) {
        let due = match self.store.get_due_reminders(now).await {
            Ok(due) => due,
            Err(e) => {
                error!("scheduler: failed to get due reminders: {e}");
                return;
            }
        };

        for task in &due {
            let text = i18n::reminder_due(&self.language, &task.content);
            if let Err(e) = self.send(task, &text).await {
                error!(
                    "scheduler: failed to deliver reminder {} to {}: {e}",
                    task.id, task.owner_id
                );
                report.failures += 1;
                continue;
            }
            match self.store.mark_done(&task.id).await {
                Ok(true) => report.reminders_delivered += 1,
                Ok(false) => warn!("scheduler: reminder {} was already done", task.id),
                Err(e) => error!("scheduler: failed to mark reminder {} done: {e}", task.id),
            }
        }
    }

    async fn send(&self, task: &Task, text: &str) -> Result<(), PomniError> {
        deliver_text(
            &self.channels,
            &task.channel,
            &task.reply_target,
            text,
            self.send_timeout,
        )
        .await
    }
}
