use serde::{Deserialize, Serialize};

/// Error body returned by the API on non-2xx responses.
///
/// Most handlers answer with `{"error": ..}`; the token guard answers with
/// `{"message": ..}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "message")]
    pub error: String,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TokenResponse {
        pub token: String,
    }
}

pub mod dashboard {
    use super::*;

    /// Body of `GET /api/dashboard`.
    ///
    /// Every field is optional on the wire: the client treats absent and
    /// `null` values as zero (or empty).
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct DashboardResponse {
        pub fti_score: Option<f64>,
        pub monthly_income: Option<f64>,
        pub monthly_expenses: Option<f64>,
        pub net_flow: Option<f64>,
        pub budget_used: Option<f64>,
        pub total_transactions: Option<u64>,
        pub avg_daily_spend: Option<f64>,
        pub top_category: Option<String>,
        pub recurring_count: Option<u64>,
        pub recent_transactions: Option<Vec<RecentTransaction>>,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    pub struct RecentTransaction {
        pub description: String,
        pub amount: f64,
        #[serde(rename = "type")]
        pub kind: String,
        pub category: String,
        /// Short display date (`MM/DD`), already formatted by the server.
        pub date: String,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionType {
        Income,
        Expense,
    }

    /// Body of `POST /api/transactions`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct TransactionNew {
        #[serde(rename = "type")]
        pub kind: TransactionType,
        pub amount: f64,
        pub description: String,
        pub category: String,
    }
}

pub mod budget {
    use super::*;

    /// Body of `POST /api/budget`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BudgetSet {
        pub total_amount: f64,
        /// Budget month, `YYYY-MM`.
        pub month: String,
    }
}

pub mod goal {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GoalsResponse {
        pub goals: Vec<GoalView>,
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct GoalView {
        #[serde(rename = "_id")]
        pub id: String,
        pub name: String,
        pub current_amount: f64,
        pub target_amount: f64,
        /// Date as entered in the goal form, usually `YYYY-MM-DD`.
        pub target_date: String,
    }

    /// Body of `POST /api/goals`.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_amount: f64,
        pub current_amount: f64,
        pub target_date: String,
    }
}

pub mod alert {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AlertType {
        #[default]
        Info,
        Warning,
        Danger,
        Success,
        /// Any type this client does not know about is displayed as `info`.
        #[serde(other)]
        Unknown,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AlertsResponse {
        pub alerts: Vec<AlertView>,
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    #[serde(default)]
    pub struct AlertView {
        #[serde(rename = "type")]
        pub kind: AlertType,
        pub title: String,
        pub message: String,
        /// ISO-8601 timestamp.
        pub created_at: String,
    }

    /// Body of `POST /api/alerts/settings`.
    ///
    /// `GET /api/alerts/settings` returns the same keys, any of which may be
    /// missing; the client reads it as a raw JSON object.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AlertSettings {
        pub budget_alert: bool,
        pub large_transaction_alert: bool,
        pub goal_alert: bool,
        pub recurring_alert: bool,
    }
}
