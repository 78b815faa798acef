//! teloxide endpoints: turn updates into [`Inbound`] events for the
//! [`Controller`](crate::Controller).

use teloxide::{
    prelude::*,
    types::{CallbackQuery, User},
};

use crate::{
    ConfigParameters,
    error::{ConversationError, TransportError},
    event::Inbound,
    transport::TelegramMessenger,
};

pub(crate) async fn handle_message(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, msg.from.as_ref()) {
        return Ok(());
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };

    forward(bot, &cfg, Inbound::text(msg.chat.id.0, text)).await
}

pub(crate) async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters,
) -> ResponseResult<()> {
    if !is_allowed(&cfg, Some(&q.from)) {
        return Ok(());
    }
    let Some(message) = q.message.as_ref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };
    let chat_id = message.chat().id;
    let data = q.data.clone().unwrap_or_default();

    forward(bot, &cfg, Inbound::button(chat_id.0, q.id.0.clone(), data)).await
}

async fn forward(bot: Bot, cfg: &ConfigParameters, inbound: Inbound) -> ResponseResult<()> {
    let messenger = TelegramMessenger::new(bot);
    match cfg.controller.handle(&messenger, inbound).await {
        Ok(()) => Ok(()),
        Err(ConversationError::Transport(TransportError(err))) => Err(err),
        // The user has already been told; the store error is logged by the controller.
        Err(ConversationError::Store(_)) => Ok(()),
    }
}

fn is_allowed(cfg: &ConfigParameters, from: Option<&User>) -> bool {
    let Some(from) = from else {
        return false;
    };
    match &cfg.allowed_users {
        None => true,
        Some(ids) => ids.contains(&from.id),
    }
}
