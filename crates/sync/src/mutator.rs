//! Create/delete flow for transactions, budgets and goals.
//!
//! Nothing is merged locally: a successful mutation is followed by a full
//! refresh of the state it affects, so displayed state is always a
//! server-confirmed snapshot. A failed mutation changes nothing.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use api_types::{
    budget::BudgetSet,
    goal::GoalNew,
    transaction::{TransactionNew, TransactionType},
};
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    client::{Client, ClientError},
    dashboard::DashboardFeed,
    goals::GoalBoard,
};

const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Transaction,
    Budget,
    Goal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateTransaction(TransactionNew),
    SetBudget(BudgetSet),
    SaveGoal(GoalNew),
    DeleteGoal { id: String },
}

impl Mutation {
    /// Builds a transaction; a blank category becomes `Other`.
    pub fn transaction(
        kind: TransactionType,
        amount: f64,
        description: &str,
        category: Option<&str>,
    ) -> Self {
        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        Self::CreateTransaction(TransactionNew {
            kind,
            amount,
            description: description.trim().to_string(),
            category: category.to_string(),
        })
    }

    /// Builds the budget of the month containing `now`.
    pub fn budget(total_amount: f64, now: DateTime<Utc>) -> Self {
        Self::SetBudget(BudgetSet {
            total_amount,
            month: now.format("%Y-%m").to_string(),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::CreateTransaction(_) => ResourceKind::Transaction,
            Self::SetBudget(_) => ResourceKind::Budget,
            Self::SaveGoal(_) | Self::DeleteGoal { .. } => ResourceKind::Goal,
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            Self::DeleteGoal { .. } => Operation::Delete,
            _ => Operation::Create,
        }
    }

    /// Blocking notice shown when the call fails.
    pub fn failure_notice(&self) -> &'static str {
        match self {
            Self::CreateTransaction(_) => "Failed to add transaction",
            Self::SetBudget(_) => "Failed to save budget",
            Self::SaveGoal(_) => "Failed to save goal",
            Self::DeleteGoal { .. } => "Failed to delete goal",
        }
    }

    /// Question to confirm before sending, for destructive operations.
    pub fn confirmation_prompt(&self) -> Option<&'static str> {
        match self {
            Self::DeleteGoal { .. } => Some("Are you sure you want to delete this goal?"),
            _ => None,
        }
    }

    async fn send(&self, client: &Client) -> Result<(), ClientError> {
        match self {
            Self::CreateTransaction(body) => client.post("/api/transactions", body).await?,
            Self::SetBudget(body) => client.post("/api/budget", body).await?,
            Self::SaveGoal(body) => client.post("/api/goals", body).await?,
            Self::DeleteGoal { id } => client.delete(&format!("/api/goals/{id}")).await?,
        };
        Ok(())
    }
}

/// Hooks into the surface the mutation was submitted from.
pub trait Interaction {
    /// Asks the user to confirm a destructive operation.
    fn confirm(&mut self, prompt: &str) -> bool;
    /// Closes the input form of `kind` after a successful submit.
    fn close_form(&mut self, kind: ResourceKind);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Applied,
    /// The user declined the confirmation; no call was made.
    Declined,
    /// Another mutation of the same resource kind is still pending.
    InFlight,
}

#[derive(Debug, Error)]
#[error("{notice}")]
pub struct MutationError {
    pub notice: &'static str,
    #[source]
    pub source: ClientError,
}

impl MutationError {
    pub fn is_fatal(&self) -> bool {
        self.source.is_fatal()
    }
}

pub struct Mutator {
    client: Client,
    dashboard: Arc<DashboardFeed>,
    goals: Arc<GoalBoard>,
    in_flight: Mutex<HashSet<ResourceKind>>,
}

impl Mutator {
    pub fn new(client: Client, dashboard: Arc<DashboardFeed>, goals: Arc<GoalBoard>) -> Self {
        Self {
            client,
            dashboard,
            goals,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn submit(
        &self,
        mutation: Mutation,
        ui: &mut impl Interaction,
    ) -> Result<SubmitOutcome, MutationError> {
        if let Some(prompt) = mutation.confirmation_prompt() {
            if !ui.confirm(prompt) {
                return Ok(SubmitOutcome::Declined);
            }
        }

        let kind = mutation.kind();
        let Some(_guard) = InFlight::acquire(&self.in_flight, kind) else {
            tracing::debug!("{kind:?} mutation already in flight");
            return Ok(SubmitOutcome::InFlight);
        };

        if let Err(source) = mutation.send(&self.client).await {
            return Err(MutationError {
                notice: mutation.failure_notice(),
                source,
            });
        }

        ui.close_form(kind);
        match kind {
            ResourceKind::Transaction | ResourceKind::Budget => {
                self.dashboard.refresh().await;
            }
            ResourceKind::Goal => {
                self.goals.refresh().await;
            }
        }
        Ok(SubmitOutcome::Applied)
    }
}

struct InFlight<'a> {
    set: &'a Mutex<HashSet<ResourceKind>>,
    kind: ResourceKind,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<ResourceKind>>, kind: ResourceKind) -> Option<Self> {
        let inserted = set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind);
        inserted.then(|| Self { set, kind })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.kind);
    }
}
