//! Outbound side of the chat transport.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{
        CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
        KeyboardMarkup, KeyboardRemove, ParseMode,
    },
};

use crate::{
    error::TransportError,
    ui::{Keyboard, Reply},
};

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError>;

    /// Acknowledges a button press, optionally showing a short notice.
    async fn answer_button(
        &self,
        callback_id: &str,
        notice: Option<&str>,
    ) -> Result<(), TransportError>;
}

/// [`Messenger`] backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(rows: &[Vec<crate::ui::InlineButton>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.data.clone()))
            .collect::<Vec<_>>()
    }))
}

fn choice_markup(rows: &[Vec<String>]) -> KeyboardMarkup {
    KeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|label| KeyboardButton::new(label.clone()))
            .collect::<Vec<_>>()
    }))
    .one_time_keyboard()
    .resize_keyboard()
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        let mut request = self.bot.send_message(ChatId(chat_id), reply.text.clone());
        if reply.html {
            request = request.parse_mode(ParseMode::Html);
        }
        request = match &reply.keyboard {
            Keyboard::Unchanged => request,
            Keyboard::Remove => request.reply_markup(KeyboardRemove::new()),
            Keyboard::Choices(rows) => request.reply_markup(choice_markup(rows)),
            Keyboard::Inline(rows) => request.reply_markup(inline_markup(rows)),
        };
        request.await?;
        Ok(())
    }

    async fn answer_button(
        &self,
        callback_id: &str,
        notice: Option<&str>,
    ) -> Result<(), TransportError> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()));
        if let Some(notice) = notice {
            request = request.text(notice);
        }
        request.await?;
        Ok(())
    }
}
