use std::sync::Arc;

use api_types::alert::{AlertType, AlertView, AlertsResponse};
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    client::Client,
    goals::parse_date,
    slot::{StateSlot, Stamped},
};

/// Read-only alert, as shown in the alert list.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub kind: AlertType,
    pub title: String,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<AlertView> for Alert {
    fn from(view: AlertView) -> Self {
        let kind = match view.kind {
            AlertType::Unknown => AlertType::Info,
            kind => kind,
        };
        Self {
            kind,
            title: view.title,
            message: view.message,
            created_at: parse_date(&view.created_at),
        }
    }
}

/// Keeps the alert list in sync with `GET /api/alerts`.
#[derive(Debug)]
pub struct AlertFeed {
    client: Client,
    slot: StateSlot<Vec<Alert>>,
}

impl AlertFeed {
    pub fn new(client: Client) -> Arc<Self> {
        Arc::new(Self {
            client,
            slot: StateSlot::default(),
        })
    }

    pub async fn refresh(&self) -> bool {
        let ticket = self.slot.ticket();
        match self.client.get::<AlertsResponse>("/api/alerts").await {
            Ok(res) => {
                let alerts = res.alerts.into_iter().map(Alert::from).collect();
                self.slot.apply(ticket, alerts)
            }
            Err(err) => {
                if !err.is_fatal() {
                    tracing::warn!("failed to load alerts: {err}");
                    self.slot.apply(ticket, Vec::new());
                }
                false
            }
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.slot.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Stamped<Vec<Alert>>> {
        self.slot.subscribe()
    }
}
