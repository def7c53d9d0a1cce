use tracing::{error, warn};

use crate::platform::{IncomingMessage, MessageSender};

pub const APOLOGY_TEXT: &str = "Oops! Something went wrong.  Check the server logs for details.";

/// Central sink for failures raised while handling one event.
///
/// Logs the event with the error and makes one best-effort attempt to tell the
/// user. A failing apology is logged and dropped.
pub async fn report(sender: &dyn MessageSender, msg: &IncomingMessage, err: &anyhow::Error) {
    error!("Update {:?} caused error {:#}", msg, err);

    if let Err(e) = sender.send_message(msg.chat_id, APOLOGY_TEXT).await {
        warn!(
            "Failed to send error notice to chat {}: {:#}",
            msg.chat_id, e
        );
    }
}
