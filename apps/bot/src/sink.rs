//! Chat status sink: edits one message in place as a transfer advances.

use droplink_transfer::{SinkError, SinkFuture, StatusSink};
use teloxide::Bot;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, ParseMode};
use url::Url;

/// Status display backed by a single Telegram message.
///
/// Telegram rate-limits edits aggressively, so every failure here is
/// expected traffic; the [`StatusSink`] contract turns them into logged
/// no-ops upstream.
pub struct MessageSink {
    bot: Bot,
    chat: ChatId,
    message: MessageId,
}

impl MessageSink {
    /// Wraps an already-posted status message.
    pub fn new(bot: Bot, chat: ChatId, message: MessageId) -> Self {
        Self { bot, chat, message }
    }
}

impl StatusSink for MessageSink {
    fn update(&self, text: String) -> SinkFuture<'_> {
        Box::pin(async move {
            self.bot
                .edit_message_text(self.chat, self.message, text)
                .parse_mode(ParseMode::Markdown)
                .await
                .map(|_| ())
                .map_err(|e| SinkError(e.to_string()))
        })
    }

    fn present_link(&self, text: String, link: String) -> SinkFuture<'_> {
        Box::pin(async move {
            let edit = self
                .bot
                .edit_message_text(self.chat, self.message, text)
                .parse_mode(ParseMode::Markdown);

            let result = match Url::parse(&link) {
                Ok(url) => {
                    let keyboard = InlineKeyboardMarkup::new([[InlineKeyboardButton::url(
                        "📥 Download",
                        url,
                    )]]);
                    edit.reply_markup(keyboard).await
                }
                Err(e) => {
                    // The hosting service answered with something that is
                    // not a URL; show it anyway, just without the button.
                    tracing::warn!(link = %link, error = %e, "link is not a valid URL");
                    edit.await
                }
            };

            result.map(|_| ()).map_err(|e| SinkError(e.to_string()))
        })
    }
}
