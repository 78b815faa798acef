//! Telegram bot.
//!
//! Conversations are explicit state machines ([`conversation`]) executed by a
//! [`Controller`] against a [`LedgerStore`]. The teloxide dispatcher only
//! converts updates into [`Inbound`] events.

use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use engine::LedgerStore;
use teloxide::{prelude::*, utils::command::BotCommands};

pub use commands::{Command, parse_command};
pub use controller::Controller;
pub use error::{ConversationError, TransportError};
pub use event::{ButtonAction, Event, Inbound, InboundKind};
pub use reminder::{next_reminder, send_reminders};
pub use session::{
    BudgetState, ChatLocks, FlowState, InMemorySessionStore, SearchCursor, SearchState,
    SessionStore, SummaryState, TransactionState,
};
pub use transport::{Messenger, TelegramMessenger};
pub use ui::{InlineButton, Keyboard, Reply};

mod commands;
mod controller;
pub mod conversation;
mod error;
mod event;
mod handlers;
pub mod pagination;
mod reminder;
mod session;
mod transport;
mod ui;

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
pub struct ConfigParameters {
    allowed_users: Option<Vec<UserId>>,
    controller: Arc<Controller>,
}

pub struct Bot {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    store: Arc<dyn LedgerStore>,
    timezone: Tz,
    page_size: usize,
    session_ttl: Option<Duration>,
    monthly_reminder: bool,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);
        if let Err(err) = bot.set_my_commands(Command::bot_commands()).await {
            tracing::warn!("failed to publish the command list: {err}");
        }

        let sessions = InMemorySessionStore::new(self.session_ttl);
        let controller = Controller::new(
            self.store.clone(),
            Arc::new(sessions),
            self.timezone,
            self.page_size,
        );
        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            controller: Arc::new(controller),
        };

        let reminder = self.monthly_reminder.then(|| {
            let messenger = Arc::new(TelegramMessenger::new(bot.clone()));
            tokio::spawn(reminder::run(self.store.clone(), messenger, self.timezone))
        });

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handlers::handle_message))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        if let Some(reminder) = reminder {
            reminder.abort();
        }
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    store: Option<Arc<dyn LedgerStore>>,
    timezone: Option<Tz>,
    page_size: Option<usize>,
    session_ttl: Option<Option<Duration>>,
    monthly_reminder: Option<bool>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids allowed to talk to the bot. Empty allows everyone.
    pub fn allowed_users(mut self, allowed_users: Vec<u64>) -> BotBuilder {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.into_iter().map(UserId).collect());
        }
        self
    }

    pub fn store(mut self, store: Arc<dyn LedgerStore>) -> BotBuilder {
        self.store = Some(store);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> BotBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn page_size(mut self, page_size: usize) -> BotBuilder {
        self.page_size = Some(page_size);
        self
    }

    /// `None` keeps sessions until they complete or are cancelled.
    pub fn session_ttl(mut self, ttl: Option<Duration>) -> BotBuilder {
        self.session_ttl = Some(ttl);
        self
    }

    pub fn monthly_reminder(mut self, enabled: bool) -> BotBuilder {
        self.monthly_reminder = Some(enabled);
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.is_empty() {
            return Err("missing telegram token".to_string());
        }
        let store = self.store.ok_or("missing ledger store")?;
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err("page size must be at least 1".to_string());
        }

        Ok(Bot {
            token: self.token,
            allowed_users: self.allowed_users,
            store,
            timezone: self.timezone.unwrap_or(chrono_tz::UTC),
            page_size,
            session_ttl: self.session_ttl.unwrap_or(Some(DEFAULT_SESSION_TTL)),
            monthly_reminder: self.monthly_reminder.unwrap_or(true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_token_and_store() {
        assert!(Bot::builder().build().is_err());
        assert!(Bot::builder().token("t").build().is_err());
    }
}
