//! Plain-text rendering of the dashboard views.

use std::io::{self, Write};

use chrono::{DateTime, Local, Utc};
use fti_sync::{
    alerts::Alert,
    dashboard::DashboardSnapshot,
    goals::Goal,
    presenter::{self, Tone},
    settings::{AlertPreferences, AlertToggle},
};

const BAR_WIDTH: usize = 20;

pub fn render_dashboard(out: &mut impl Write, snapshot: &DashboardSnapshot) -> io::Result<()> {
    let gauge = presenter::score_gauge(snapshot);
    writeln!(out, "== Financial Trust Index ==")?;
    writeln!(
        out,
        "Score {:>3} {} {}",
        gauge.score,
        presenter::progress_bar(gauge.score, BAR_WIDTH),
        gauge.label
    )?;
    writeln!(
        out,
        "Income {}  Expenses {}  Net {}  Budget used {}%",
        presenter::format_amount(snapshot.income),
        presenter::format_amount(snapshot.expenses),
        presenter::format_amount(snapshot.net_flow),
        snapshot.budget_used_percent
    )?;

    let summary = &snapshot.summary;
    writeln!(
        out,
        "This month: {} transactions, {} per day, top category {}, {} recurring",
        summary.total_transactions,
        presenter::format_amount(summary.avg_daily_spend),
        summary.top_category.as_deref().unwrap_or("-"),
        summary.recurring_count
    )?;

    writeln!(out, "-- Recent transactions --")?;
    if snapshot.recent_transactions.is_empty() {
        writeln!(out, "No transactions yet")?;
    }
    for tx in &snapshot.recent_transactions {
        let line = presenter::transaction_line(tx);
        writeln!(
            out,
            "{:>6}  {:<28} {:<16} {:>12}",
            line.date, line.description, line.category, line.amount
        )?;
    }
    Ok(())
}

pub fn render_goals(out: &mut impl Write, goals: &[Goal], now: DateTime<Utc>) -> io::Result<()> {
    writeln!(out, "-- Goals --")?;
    if goals.is_empty() {
        writeln!(out, "No goals yet. Start by adding your first financial goal!")?;
    }
    for goal in goals {
        let card = presenter::goal_card(goal, now);
        writeln!(
            out,
            "[{}] {} {} {:>3}% {} of {} ({} left) {} due {}",
            card.id,
            card.name,
            presenter::progress_bar(card.progress, BAR_WIDTH),
            card.progress,
            card.current,
            card.target,
            card.remaining,
            card.status.label(),
            card.target_date
        )?;
    }
    Ok(())
}

pub fn render_alerts(out: &mut impl Write, alerts: &[Alert]) -> io::Result<()> {
    writeln!(out, "-- Alerts --")?;
    if alerts.is_empty() {
        writeln!(out, "No alerts yet")?;
    }
    for alert in alerts {
        let marker = match presenter::alert_tone(alert) {
            Tone::Neutral => "i",
            Tone::Caution => "!",
            Tone::Critical => "!!",
            Tone::Positive => "+",
        };
        let when = alert
            .created_at
            .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        writeln!(out, "{marker:>2} {} - {} {when}", alert.title, alert.message)?;
    }
    Ok(())
}

pub fn render_preferences(out: &mut impl Write, prefs: &AlertPreferences) -> io::Result<()> {
    let flags: Vec<String> = AlertToggle::ALL
        .iter()
        .map(|toggle| {
            let mark = if toggle.get(prefs) { "x" } else { " " };
            format!("[{mark}] {}", toggle.key())
        })
        .collect();
    writeln!(out, "Alert settings: {}", flags.join("  "))
}
