use std::sync::Arc;

use api_types::goal::{GoalView, GoalsResponse};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use tokio::sync::watch;

use crate::{
    client::Client,
    slot::{StateSlot, Stamped},
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Completed,
    Overdue,
    OnTrack,
}

impl GoalStatus {
    /// Completion wins over lateness: a reached goal is never overdue.
    pub fn classify(progress_percent: f64, days_left: Option<i64>) -> Self {
        if progress_percent >= 100.0 {
            Self::Completed
        } else if days_left.is_some_and(|days| days < 0) {
            Self::Overdue
        } else {
            Self::OnTrack
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "Completed",
            Self::Overdue => "Overdue",
            Self::OnTrack => "On Track",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub current_amount: f64,
    pub target_amount: f64,
    /// Date as sent by the server; parsed lazily by [`Goal::days_left`].
    pub target_date: String,
}

impl From<GoalView> for Goal {
    fn from(view: GoalView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            current_amount: view.current_amount,
            target_amount: view.target_amount,
            target_date: view.target_date,
        }
    }
}

impl Goal {
    /// Progress towards the target, always within `0.0..=100.0`.
    pub fn progress_percent(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return if self.current_amount > 0.0 { 100.0 } else { 0.0 };
        }
        let progress = self.current_amount / self.target_amount * 100.0;
        if progress.is_nan() {
            return 0.0;
        }
        progress.clamp(0.0, 100.0)
    }

    pub fn remaining(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    /// Whole days until the target date, rounded up. `None` when the date
    /// cannot be read.
    pub fn days_left(&self, now: DateTime<Utc>) -> Option<i64> {
        let target = parse_date(&self.target_date)?;
        Some(ceil_days(target - now))
    }

    pub fn status(&self, now: DateTime<Utc>) -> GoalStatus {
        GoalStatus::classify(self.progress_percent(), self.days_left(now))
    }
}

/// Reads a server date or timestamp. Bare dates are taken as midnight UTC.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%a, %d %b %Y %H:%M:%S GMT"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.and_utc())
}

fn ceil_days(delta: TimeDelta) -> i64 {
    let ms = delta.num_milliseconds();
    let days = ms.div_euclid(DAY_MS);
    if ms.rem_euclid(DAY_MS) > 0 { days + 1 } else { days }
}

/// Keeps the goal list in sync with `GET /api/goals`.
#[derive(Debug)]
pub struct GoalBoard {
    client: Client,
    slot: StateSlot<Vec<Goal>>,
}

impl GoalBoard {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Self {
            client,
            slot: StateSlot::default(),
        })
    }

    pub async fn refresh(&self) -> bool {
        let ticket = self.slot.ticket();
        match self.client.get::<GoalsResponse>("/api/goals").await {
            Ok(res) => {
                let goals = res.goals.into_iter().map(Goal::from).collect();
                self.slot.apply(ticket, goals)
            }
            Err(err) => {
                if !err.is_fatal() {
                    tracing::warn!("failed to load goals: {err}");
                    self.slot.apply(ticket, Vec::new());
                }
                false
            }
        }
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Stamped<Vec<Goal>>> {
        self.slot.subscribe()
    }
}
