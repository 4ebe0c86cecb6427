//! View models derived from server-confirmed state.
//!
//! Everything here is recomputed on every render; nothing is stored.

use api_types::{alert::AlertType, dashboard::RecentTransaction};
use chrono::{DateTime, Utc};

use crate::{
    alerts::Alert,
    dashboard::DashboardSnapshot,
    goals::{Goal, GoalStatus},
};

const GAUGE_RADIUS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGauge {
    pub score: u8,
    pub label: &'static str,
    /// Stroke offset of the score ring; 0 is a full ring.
    pub dash_offset: f64,
}

#[must_use]
pub fn score_gauge(snapshot: &DashboardSnapshot) -> ScoreGauge {
    let score = snapshot.score.min(100);
    let circumference = 2.0 * std::f64::consts::PI * GAUGE_RADIUS;
    ScoreGauge {
        score,
        label: score_label(score),
        dash_offset: circumference - f64::from(score) / 100.0 * circumference,
    }
}

#[must_use]
pub fn score_label(score: u8) -> &'static str {
    match score {
        85.. => "Excellent",
        70..=84 => "Healthy",
        55..=69 => "Needs Improvement",
        _ => "At Risk",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionLine {
    pub description: String,
    pub category: String,
    /// Signed, formatted amount (`+$1,200` / `-$35.5`).
    pub amount: String,
    pub date: String,
    pub income: bool,
}

#[must_use]
pub fn transaction_line(tx: &RecentTransaction) -> TransactionLine {
    let income = tx.kind == "income";
    let sign = if income { '+' } else { '-' };
    TransactionLine {
        description: tx.description.clone(),
        category: tx.category.clone(),
        amount: format!("{sign}{}", format_amount(tx.amount.abs())),
        date: tx.date.clone(),
        income,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalCard {
    pub id: String,
    pub name: String,
    /// Whole percent, rounded down, `0..=100`.
    pub progress: u8,
    pub current: String,
    pub target: String,
    pub remaining: String,
    pub status: GoalStatus,
    pub days_left: Option<i64>,
    pub target_date: String,
}

#[must_use]
pub fn goal_card(goal: &Goal, now: DateTime<Utc>) -> GoalCard {
    let progress = goal.progress_percent();
    let days_left = goal.days_left(now);
    GoalCard {
        id: goal.id.clone(),
        name: goal.name.clone(),
        progress: progress.floor() as u8,
        current: format_amount(goal.current_amount),
        target: format_amount(goal.target_amount),
        remaining: format_amount(goal.remaining()),
        status: GoalStatus::classify(progress, days_left),
        days_left,
        target_date: goal.target_date.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Caution,
    Critical,
    Positive,
}

#[must_use]
pub fn alert_tone(alert: &Alert) -> Tone {
    match alert.kind {
        AlertType::Warning => Tone::Caution,
        AlertType::Danger => Tone::Critical,
        AlertType::Success => Tone::Positive,
        AlertType::Info | AlertType::Unknown => Tone::Neutral,
    }
}

/// Formats a dollar amount with thousands separators and at most two
/// decimals, trailing zeros dropped: `1234.5` → `$1,234.5`.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac {
        0 => format!("{sign}${grouped}"),
        f if f % 10 == 0 => format!("{sign}${grouped}.{}", f / 10),
        f => format!("{sign}${grouped}.{f:02}"),
    }
}

/// Text progress bar, `width` cells wide.
#[must_use]
pub fn progress_bar(percent: u8, width: usize) -> String {
    let ratio = (f64::from(percent) / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64) as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
