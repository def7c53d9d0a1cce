use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand, ChatId};
use tracing::{info, warn};

use crate::command::COMMANDS;
use crate::platform::{IncomingMessage, MessageSender, Sender};
use crate::router::{Router, RouterContext};

/// Thin wrapper around teloxide::Bot implementing [`MessageSender`].
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .context("Telegram sendMessage failed")?;
        Ok(())
    }
}

/// Convert a Telegram message into the platform-agnostic event.
fn to_incoming(msg: &Message) -> IncomingMessage {
    IncomingMessage {
        chat_id: msg.chat.id.0,
        sender: msg.from.as_ref().map(|user| Sender {
            first_name: user.first_name.clone(),
            username: user.username.clone(),
        }),
        text: msg.text().map(str::to_string),
    }
}

/// Look up our own username and publish the command menu. Both are best-effort.
async fn prepare(bot: &Bot) -> RouterContext {
    let bot_username = match bot.get_me().await {
        Ok(me) => {
            info!("Running as @{}", me.username());
            Some(me.username().to_string())
        }
        Err(e) => {
            warn!("Failed to fetch bot identity, @mentions will not match: {}", e);
            None
        }
    };

    let commands: Vec<BotCommand> = COMMANDS
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect();
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!("Failed to publish command list: {}", e);
    }

    RouterContext { bot_username }
}

/// Run the Telegram bot until the dispatcher stops
pub async fn run(token: &str) -> Result<()> {
    let bot = Bot::new(token);

    let router = Arc::new(Router::new(prepare(&bot).await));
    let sender = Arc::new(TelegramSender::new(bot.clone()));

    let handler = Update::filter_message().endpoint(handle_message);

    info!("Bot started. Polling for updates...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![router, sender])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(
    msg: Message,
    router: Arc<Router>,
    sender: Arc<TelegramSender>,
) -> ResponseResult<()> {
    let incoming = to_incoming(&msg);
    router.dispatch(sender.as_ref(), &incoming).await;
    Ok(())
}
