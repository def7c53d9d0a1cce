use anyhow::Context;
use tracing::{debug, info, warn};

use crate::command::{self, joined_args, Command, ParsedEvent, COMMANDS};
use crate::error_handler;
use crate::platform::{IncomingMessage, MessageSender, OutgoingReply};

pub const ABOUT_TEXT: &str = "This is a simple Telegram bot created as an example.";
pub const CAPS_PROMPT: &str = "Please provide some text after /caps.";
pub const ECHO_PROMPT: &str = "Please provide some text after /echo.";

/// Fixed values the router needs, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct RouterContext {
    /// The bot's own username, for `/cmd@username` matching
    pub bot_username: Option<String>,
}

/// Maps each incoming event to exactly one handler.
pub struct Router {
    ctx: RouterContext,
    help_text: String,
}

impl Router {
    pub fn new(ctx: RouterContext) -> Self {
        Self {
            ctx,
            help_text: build_help_text(),
        }
    }

    /// Produce the reply for an event, or `None` when nothing should be sent.
    pub fn route(&self, msg: &IncomingMessage) -> Option<OutgoingReply> {
        let parsed = command::parse(msg.text.as_deref(), self.ctx.bot_username.as_deref());

        let text = match parsed {
            ParsedEvent::Command(cmd) => self.handle_command(msg, cmd),
            ParsedEvent::Text(text) => {
                info!("User {} sent a message: {}", msg.username(), text);
                format!(
                    "You said: {}. I'm just a simple bot, so that's all I can do right now.",
                    text
                )
            }
            ParsedEvent::UnknownCommand(token) => {
                debug!("Ignoring unregistered command {} from {}", token, msg.username());
                return None;
            }
            ParsedEvent::Empty => {
                warn!("Received a message with no text in chat {}", msg.chat_id);
                return None;
            }
        };

        Some(OutgoingReply {
            chat_id: msg.chat_id,
            text,
        })
    }

    fn handle_command(&self, msg: &IncomingMessage, cmd: Command) -> String {
        let user = msg.username();
        let name = cmd.name();
        match cmd {
            Command::Start => match &msg.sender {
                Some(sender) => {
                    info!("User {} started the bot.", user);
                    format!(
                        "Hello {}! I'm your bot.  Use /help to see available commands.",
                        sender.first_name
                    )
                }
                None => {
                    warn!("/start in chat {} without sender info", msg.chat_id);
                    "Hello! I'm your bot.  Use /help to see available commands.".to_string()
                }
            },
            Command::Help => {
                info!("User {} used /{}", user, name);
                self.help_text.clone()
            }
            Command::Caps(args) => match joined_args(&args) {
                Some(text) => {
                    let upper = text.to_uppercase();
                    info!("User {} used /caps: {}", user, upper);
                    upper
                }
                None => {
                    info!("User {} used /caps without text", user);
                    CAPS_PROMPT.to_string()
                }
            },
            Command::Echo(args) => match joined_args(&args) {
                Some(text) => {
                    info!("User {} used /echo: {}", user, text);
                    text
                }
                None => {
                    info!("User {} used /echo without text", user);
                    ECHO_PROMPT.to_string()
                }
            },
            Command::About => {
                info!("User {} used /{}", user, name);
                ABOUT_TEXT.to_string()
            }
        }
    }

    /// Route an event and send the reply. Send failures go to the error handler
    /// and never escape.
    pub async fn dispatch(&self, sender: &dyn MessageSender, msg: &IncomingMessage) {
        let Some(reply) = self.route(msg) else {
            return;
        };

        let result = sender
            .send_message(reply.chat_id, &reply.text)
            .await
            .with_context(|| format!("Failed to send reply to chat {}", reply.chat_id));

        if let Err(e) = result {
            error_handler::report(sender, msg, &e).await;
        }
    }
}

fn build_help_text() -> String {
    let mut help = String::from(
        "I am a versatile Telegram bot! Here are the commands I understand:\n\n",
    );
    for (name, description) in COMMANDS {
        let usage = match *name {
            "caps" | "echo" => format!("/{} <text>", name),
            _ => format!("/{}", name),
        };
        help.push_str(&format!("{} - {}\n", usage, description));
    }
    help.push_str("<any text> - Responds with a general reply.\n");
    help
}
