//! Alert preference toggles mirrored to `/api/alerts/settings`.

use api_types::alert::AlertSettings;
use serde_json::{Map, Value};
use tokio::{sync::watch, task::JoinHandle};

use crate::client::Client;

pub type AlertPreferences = AlertSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertToggle {
    Budget,
    LargeTransaction,
    Goal,
    Recurring,
}

impl AlertToggle {
    pub const ALL: [Self; 4] = [
        Self::Budget,
        Self::LargeTransaction,
        Self::Goal,
        Self::Recurring,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Budget => "budget_alert",
            Self::LargeTransaction => "large_transaction_alert",
            Self::Goal => "goal_alert",
            Self::Recurring => "recurring_alert",
        }
    }

    fn slot(self, prefs: &mut AlertPreferences) -> &mut bool {
        match self {
            Self::Budget => &mut prefs.budget_alert,
            Self::LargeTransaction => &mut prefs.large_transaction_alert,
            Self::Goal => &mut prefs.goal_alert,
            Self::Recurring => &mut prefs.recurring_alert,
        }
    }

    pub fn get(self, prefs: &AlertPreferences) -> bool {
        match self {
            Self::Budget => prefs.budget_alert,
            Self::LargeTransaction => prefs.large_transaction_alert,
            Self::Goal => prefs.goal_alert,
            Self::Recurring => prefs.recurring_alert,
        }
    }
}

/// Value used for every toggle the server does not report.
pub const DEFAULT_PREFERENCES: AlertPreferences = AlertPreferences {
    budget_alert: true,
    large_transaction_alert: true,
    goal_alert: true,
    recurring_alert: true,
};

/// Overlays the booleans present in `raw` on [`DEFAULT_PREFERENCES`].
///
/// Keys that are missing or not booleans keep their default.
pub fn merge_with_defaults(raw: &Map<String, Value>) -> AlertPreferences {
    let mut prefs = DEFAULT_PREFERENCES;
    for toggle in AlertToggle::ALL {
        if let Some(Value::Bool(value)) = raw.get(toggle.key()) {
            *toggle.slot(&mut prefs) = *value;
        }
    }
    prefs
}

pub struct SettingsSync {
    client: Client,
    prefs: watch::Sender<AlertPreferences>,
}

impl SettingsSync {
    pub fn new(client: Client) -> Self {
        let (prefs, _) = watch::channel(DEFAULT_PREFERENCES);
        Self { client, prefs }
    }

    /// Fetches the stored preferences. On failure the defaults are kept.
    pub async fn load(&self) -> AlertPreferences {
        let prefs = match self
            .client
            .get::<Map<String, Value>>("/api/alerts/settings")
            .await
        {
            Ok(raw) => merge_with_defaults(&raw),
            Err(err) => {
                if !err.is_fatal() {
                    tracing::warn!("failed to load alert settings: {err}");
                }
                return self.current();
            }
        };
        self.prefs.send_replace(prefs);
        prefs
    }

    pub fn current(&self) -> AlertPreferences {
        *self.prefs.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertPreferences> {
        self.prefs.subscribe()
    }

    /// Sets one toggle and writes the whole record.
    pub fn set(&self, toggle: AlertToggle, value: bool) -> JoinHandle<()> {
        self.prefs.send_modify(|prefs| *toggle.slot(prefs) = value);
        self.save(self.current())
    }

    pub fn flip(&self, toggle: AlertToggle) -> JoinHandle<()> {
        let value = !toggle.get(&self.current());
        self.set(toggle, value)
    }

    /// Fire-and-forget write of `prefs`. Failures are only logged.
    ///
    /// The handle may be dropped; awaiting it only waits for the write.
    pub fn save(&self, prefs: AlertPreferences) -> JoinHandle<()> {
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post("/api/alerts/settings", &prefs).await {
                Ok(_) => tracing::debug!("alert settings saved"),
                Err(err) => tracing::warn!("failed to save alert settings: {err}"),
            }
        })
    }
}
