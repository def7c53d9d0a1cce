//! Turns raw message text into a typed [`Command`] or plain text.

/// A recognized bot command with its parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Caps(Vec<String>),
    Echo(Vec<String>),
    About,
}

/// Name and menu description of every registered command, in help order.
pub const COMMANDS: &[(&str, &str)] = &[
    ("start", "Starts the bot and greets you."),
    ("help", "Displays this help message."),
    ("caps", "Converts the given text to uppercase."),
    ("echo", "Repeats the given text back to you."),
    ("about", "Provides information about the bot."),
];

/// Result of parsing one inbound text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedEvent {
    Command(Command),
    /// A slash token that is not ours: unregistered, or addressed to another bot.
    UnknownCommand(String),
    Text(String),
    Empty,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Caps(_) => "caps",
            Command::Echo(_) => "echo",
            Command::About => "about",
        }
    }

    fn from_name(name: &str, args: Vec<String>) -> Option<Self> {
        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "caps" => Command::Caps(args),
            "echo" => Command::Echo(args),
            "about" => Command::About,
            _ => return None,
        };
        Some(command)
    }
}

/// Space-joined argument text, or `None` when no arguments were given.
pub fn joined_args(args: &[String]) -> Option<String> {
    if args.is_empty() {
        None
    } else {
        Some(args.join(" "))
    }
}

const MAX_COMMAND_LEN: usize = 32;
const MAX_USERNAME_LEN: usize = 32;

fn is_command_word(word: &str, max_len: usize) -> bool {
    !word.is_empty()
        && word.len() <= max_len
        && word.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn is_username(word: &str) -> bool {
    is_command_word(word, MAX_USERNAME_LEN)
}

/// Parse message text. `bot_username` is used to accept `/cmd@username`.
pub fn parse(text: Option<&str>, bot_username: Option<&str>) -> ParsedEvent {
    let text = match text {
        Some(t) if !t.is_empty() => t,
        _ => return ParsedEvent::Empty,
    };

    let mut words = text.split_whitespace();
    let first = match words.next() {
        Some(w) => w,
        None => return ParsedEvent::Text(text.to_string()),
    };

    let token = match first.strip_prefix('/') {
        Some(rest) => rest,
        None => return ParsedEvent::Text(text.to_string()),
    };

    let (name, mention) = match token.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (token, None),
    };

    // Telegram only marks `/name` or `/name@bot` as a command; `/home/user` is text
    if !is_command_word(name, MAX_COMMAND_LEN) || !mention.map_or(true, is_username) {
        return ParsedEvent::Text(text.to_string());
    }

    if let Some(mention) = mention {
        if !bot_username.is_some_and(|u| u.eq_ignore_ascii_case(mention)) {
            return ParsedEvent::UnknownCommand(first.to_string());
        }
    }

    let args: Vec<String> = words.map(str::to_string).collect();
    match Command::from_name(name, args) {
        Some(command) => ParsedEvent::Command(command),
        None => ParsedEvent::UnknownCommand(first.to_string()),
    }
}
