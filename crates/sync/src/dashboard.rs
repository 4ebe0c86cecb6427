use std::sync::Arc;

use api_types::dashboard::{DashboardResponse, RecentTransaction};
use tokio::sync::watch;

use crate::{
    client::Client,
    slot::{StateSlot, Stamped},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySummary {
    pub total_transactions: u64,
    pub avg_daily_spend: f64,
    pub top_category: Option<String>,
    pub recurring_count: u64,
}

/// Server-confirmed dashboard state. Replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    /// Always within `0..=100`.
    pub score: u8,
    pub income: f64,
    pub expenses: f64,
    pub net_flow: f64,
    pub budget_used_percent: f64,
    pub recent_transactions: Vec<RecentTransaction>,
    pub summary: MonthlySummary,
}

impl From<DashboardResponse> for DashboardSnapshot {
    fn from(res: DashboardResponse) -> Self {
        Self {
            score: clamp_score(res.fti_score.unwrap_or_default()),
            income: res.monthly_income.unwrap_or_default(),
            expenses: res.monthly_expenses.unwrap_or_default(),
            net_flow: res.net_flow.unwrap_or_default(),
            budget_used_percent: res.budget_used.unwrap_or_default(),
            recent_transactions: res.recent_transactions.unwrap_or_default(),
            summary: MonthlySummary {
                total_transactions: res.total_transactions.unwrap_or_default(),
                avg_daily_spend: res.avg_daily_spend.unwrap_or_default(),
                top_category: res.top_category.filter(|c| !c.is_empty()),
                recurring_count: res.recurring_count.unwrap_or_default(),
            },
        }
    }
}

/// Clamps a raw score into the displayable `0..=100` range.
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Keeps the dashboard snapshot in sync with `GET /api/dashboard`.
#[derive(Debug)]
pub struct DashboardFeed {
    client: Client,
    slot: StateSlot<DashboardSnapshot>,
}

impl DashboardFeed {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Self {
            client,
            slot: StateSlot::default(),
        })
    }

    /// Fetches a fresh snapshot and publishes it.
    ///
    /// A failed read publishes the zero snapshot under the same ticket, so a
    /// later successful refresh still replaces it. Session expiry publishes
    /// nothing. Returns whether server data was applied.
    pub async fn refresh(&self) -> bool {
        let ticket = self.slot.ticket();
        match self.client.get::<DashboardResponse>("/api/dashboard").await {
            Ok(res) => self.slot.apply(ticket, res.into()),
            Err(err) => {
                if !err.is_fatal() {
                    tracing::warn!("failed to load dashboard data: {err}");
                    self.slot.apply(ticket, DashboardSnapshot::default());
                }
                false
            }
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Stamped<DashboardSnapshot>> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_clamped() {
        assert_eq!(clamp_score(-5.0), 0);
        assert_eq!(clamp_score(42.4), 42);
        assert_eq!(clamp_score(140.0), 100);
        assert_eq!(clamp_score(f64::NAN), 0);
        assert_eq!(clamp_score(f64::INFINITY), 0);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let res: DashboardResponse =
            serde_json::from_str(r#"{"fti_score": 250, "monthly_income": null}"#).unwrap();
        let snapshot = DashboardSnapshot::from(res);
        assert_eq!(snapshot.score, 100);
        assert_eq!(snapshot.income, 0.0);
        assert!(snapshot.recent_transactions.is_empty());
        assert_eq!(snapshot.summary.top_category, None);
    }

    #[test]
    fn full_response_is_mapped() {
        let res: DashboardResponse = serde_json::from_str(
            r#"{
                "fti_score": 72,
                "monthly_income": 4000,
                "monthly_expenses": 2500.5,
                "net_flow": 1499.5,
                "budget_used": 61,
                "total_transactions": 12,
                "avg_daily_spend": 83.35,
                "top_category": "Food",
                "recurring_count": 2,
                "recent_transactions": [
                    {"description": "Salary", "amount": 4000, "type": "income", "category": "Income", "date": "10/01"}
                ]
            }"#,
        )
        .unwrap();
        let snapshot = DashboardSnapshot::from(res);
        assert_eq!(snapshot.score, 72);
        assert_eq!(snapshot.net_flow, 1499.5);
        assert_eq!(snapshot.summary.top_category.as_deref(), Some("Food"));
        assert_eq!(snapshot.recent_transactions[0].kind, "income");
    }
}
