use std::{io::Write, sync::Arc, time::Duration};

use chrono::Utc;
use fti_sync::{
    alerts::AlertFeed,
    auth,
    categories::CategoryCache,
    client::Client,
    dashboard::DashboardFeed,
    goals::GoalBoard,
    mutator::{Interaction, Mutation, Mutator, Operation, ResourceKind, SubmitOutcome},
    scheduler::{PollingScheduler, Refresh},
    session::Session,
    settings::SettingsSync,
    store::{DurableStore, JsonFileStore},
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    commands::{self, Command, HELP},
    config::AppConfig,
    error::{AppError, Result},
    ui,
};

/// Answers the confirmation prompt with a reply the user already typed, and
/// reports closed forms.
struct TerminalUi {
    reply: bool,
    closed: Option<ResourceKind>,
}

impl TerminalUi {
    fn new(reply: bool) -> Self {
        Self {
            reply,
            closed: None,
        }
    }
}

impl Interaction for TerminalUi {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.reply
    }

    fn close_form(&mut self, kind: ResourceKind) {
        self.closed = Some(kind);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Engine {
    dashboard: Arc<DashboardFeed>,
    goals: Arc<GoalBoard>,
    alerts: Arc<AlertFeed>,
    categories: CategoryCache,
    settings: SettingsSync,
    mutator: Mutator,
}

pub struct App {
    config: AppConfig,
    store: Arc<dyn DurableStore>,
    /// Delete waiting for a `y/N` reply.
    pending: Option<Mutation>,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn DurableStore> = Arc::new(JsonFileStore::open(&config.state_path)?);
        Ok(Self {
            config,
            store,
            pending: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let Some(session) = self.open_session().await? else {
            println!("Login required: pass --email and set FTI_DASHBOARD_PASSWORD.");
            return Ok(());
        };

        let client = Client::new(&self.config.base_url, Arc::clone(&session))?;
        let dashboard = DashboardFeed::new(client.clone());
        let goals = GoalBoard::new(client.clone());
        let engine = Engine {
            alerts: AlertFeed::new(client.clone()),
            categories: CategoryCache::new(client.clone(), Arc::clone(&self.store)),
            settings: SettingsSync::new(client.clone()),
            mutator: Mutator::new(client, Arc::clone(&dashboard), Arc::clone(&goals)),
            dashboard,
            goals,
        };

        tokio::join!(
            engine.dashboard.refresh(),
            engine.goals.refresh(),
            engine.alerts.refresh(),
            engine.settings.load(),
        );
        if let Err(err) = engine.categories.get().await {
            tracing::warn!("failed to load categories: {err}");
        }

        let period = Duration::from_secs(self.config.refresh_interval_secs);
        let mut scheduler = PollingScheduler::start(period, dashboard_refresh(&engine.dashboard));

        let result = self.event_loop(&engine, &session, &mut scheduler).await;
        scheduler.stop();
        result
    }

    async fn open_session(&self) -> Result<Option<Arc<Session>>> {
        match Session::restore(Arc::clone(&self.store)) {
            Ok(session) => return Ok(Some(session)),
            Err(fti_sync::Error::MissingCredential) => {}
            Err(err) => return Err(err.into()),
        }

        let (Some(email), Some(password)) = (&self.config.email, &self.config.password) else {
            return Ok(None);
        };

        let http = reqwest::Client::new();
        let credential = auth::login(&http, &self.config.base_url, email, password).await?;
        tracing::info!("logged in as {email}");
        Ok(Some(Session::establish(Arc::clone(&self.store), credential)?))
    }

    async fn event_loop<R: Refresh>(
        &mut self,
        engine: &Engine,
        session: &Session,
        scheduler: &mut PollingScheduler<R>,
    ) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let expired = session.expired();
        tokio::pin!(expired);
        let mut dashboard_rx = engine.dashboard.subscribe();
        let mut goals_rx = engine.goals.subscribe();
        let mut alerts_rx = engine.alerts.subscribe();
        let mut prefs_rx = engine.settings.subscribe();

        render_all(engine)?;
        println!("Type `help` for commands.");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if self.handle_line(&line, engine, scheduler).await? == Flow::Quit {
                        break;
                    }
                }
                () = &mut expired => {
                    println!("Session expired. Please log in again.");
                    break;
                }
                Ok(()) = dashboard_rx.changed() => {
                    let snapshot = dashboard_rx.borrow_and_update().value.clone();
                    let mut out = std::io::stdout().lock();
                    ui::render_dashboard(&mut out, &snapshot)?;
                }
                Ok(()) = goals_rx.changed() => {
                    let goals = goals_rx.borrow_and_update().value.clone();
                    let mut out = std::io::stdout().lock();
                    ui::render_goals(&mut out, &goals, Utc::now())?;
                }
                Ok(()) = alerts_rx.changed() => {
                    let alerts = alerts_rx.borrow_and_update().value.clone();
                    let mut out = std::io::stdout().lock();
                    ui::render_alerts(&mut out, &alerts)?;
                }
                Ok(()) = prefs_rx.changed() => {
                    let prefs = *prefs_rx.borrow_and_update();
                    let mut out = std::io::stdout().lock();
                    ui::render_preferences(&mut out, &prefs)?;
                }
            }
        }

        Ok(())
    }

    async fn handle_line<R: Refresh>(
        &mut self,
        line: &str,
        engine: &Engine,
        scheduler: &mut PollingScheduler<R>,
    ) -> Result<Flow> {
        if let Some(mutation) = self.pending.take() {
            let reply = matches!(line.trim().to_lowercase().as_str(), "y" | "yes");
            self.submit(engine, mutation, reply).await?;
            return Ok(Flow::Continue);
        }

        let command = match commands::parse(line, Utc::now()) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => println!("{HELP}"),
            Command::Refresh => {
                tokio::join!(
                    engine.dashboard.refresh(),
                    engine.goals.refresh(),
                    engine.alerts.refresh(),
                );
            }
            Command::Categories => match engine.categories.get().await {
                Ok(categories) => println!("Categories: {}", categories.join(", ")),
                Err(err) => println!("Categories unavailable: {err}"),
            },
            Command::Visibility(visibility) => scheduler.set_visibility(visibility),
            Command::Toggle(toggle) => {
                // Fire and forget: the save logs its own failure.
                drop(engine.settings.flip(toggle));
            }
            Command::Mutate(mutation) => {
                if mutation.operation() == Operation::Delete {
                    if let Some(prompt) = mutation.confirmation_prompt() {
                        println!("{prompt} [y/N]");
                    }
                    self.pending = Some(mutation);
                } else {
                    self.submit(engine, mutation, true).await?;
                }
            }
        }
        Ok(Flow::Continue)
    }

    async fn submit(&self, engine: &Engine, mutation: Mutation, reply: bool) -> Result<()> {
        let mut terminal = TerminalUi::new(reply);
        match engine.mutator.submit(mutation, &mut terminal).await {
            Ok(SubmitOutcome::Applied) => {
                if let Some(kind) = terminal.closed {
                    println!("{kind:?} saved.");
                }
            }
            Ok(SubmitOutcome::Declined) => println!("Cancelled."),
            Ok(SubmitOutcome::InFlight) => println!("Still saving the previous change, try again."),
            // The session watcher reports expiry and ends the loop.
            Err(err) if err.is_fatal() => {}
            Err(err) => {
                tracing::debug!("mutation failed: {:?}", err.source);
                println!("{}", err.notice);
            }
        }
        Ok(())
    }
}

fn dashboard_refresh(dashboard: &Arc<DashboardFeed>) -> impl Refresh {
    let dashboard = Arc::clone(dashboard);
    move || {
        let dashboard = Arc::clone(&dashboard);
        async move {
            dashboard.refresh().await;
        }
    }
}

fn render_all(engine: &Engine) -> Result<()> {
    let mut out = std::io::stdout().lock();
    ui::render_dashboard(&mut out, &engine.dashboard.snapshot())?;
    ui::render_goals(&mut out, &engine.goals.goals(), Utc::now())?;
    ui::render_alerts(&mut out, &engine.alerts.alerts())?;
    ui::render_preferences(&mut out, &engine.settings.current())?;
    out.flush().map_err(AppError::from)
}
