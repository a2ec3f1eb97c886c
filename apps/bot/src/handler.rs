//! Inbound file handling: download from chat, relay to hosting.

use std::path::Path;
use std::sync::Arc;

use droplink_relay::TransferRequest;
use droplink_transfer::{ProgressReporter, StatusSink, human_size};
use futures_util::StreamExt;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::App;
use crate::sink::MessageSink;

/// A relayable attachment pulled out of an inbound message.
pub struct IncomingFile {
    pub file_id: String,
    pub name: String,
    pub size: u64,
}

/// Extracts the attachment from a document, video, or audio message.
pub fn extract_media(msg: &Message) -> Option<IncomingFile> {
    if let Some(doc) = msg.document() {
        return Some(IncomingFile {
            file_id: doc.file.id.clone(),
            name: doc
                .file_name
                .clone()
                .unwrap_or_else(|| "document".into()),
            size: doc.file.size as u64,
        });
    }
    if let Some(video) = msg.video() {
        return Some(IncomingFile {
            file_id: video.file.id.clone(),
            name: video
                .file_name
                .clone()
                .unwrap_or_else(|| "video.mp4".into()),
            size: video.file.size as u64,
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(IncomingFile {
            file_id: audio.file.id.clone(),
            name: audio
                .file_name
                .clone()
                .unwrap_or_else(|| "audio.mp3".into()),
            size: audio.file.size as u64,
        });
    }
    None
}

/// Drives one inbound file from chat message to hosted link.
pub async fn handle_media(app: Arc<App>, bot: Bot, msg: Message) {
    let Some(incoming) = extract_media(&msg) else {
        return;
    };
    info!(file = %incoming.name, size = incoming.size, "file received");

    // Reject before spending any bandwidth on the download.
    if app.relay.admit(incoming.size).is_err() {
        if let Err(e) = bot
            .send_message(msg.chat.id, app.relay.rejection_message())
            .await
        {
            warn!(error = %e, "failed to send rejection");
        }
        return;
    }

    let status = match bot
        .send_message(msg.chat.id, initial_status(&incoming))
        .parse_mode(ParseMode::Markdown)
        .await
    {
        Ok(m) => m,
        Err(e) => {
            warn!(file = %incoming.name, error = %e, "failed to post status message");
            return;
        }
    };
    let sink = MessageSink::new(bot.clone(), msg.chat.id, status.id);

    let local_path = app.download_dir.join(unique_name(&incoming.name));
    if let Err(e) = download(&bot, &app, &incoming, &local_path, &sink).await {
        warn!(file = %incoming.name, error = %e, "inbound download failed");
        if let Err(e) = sink.update(format!("❌ Download failed:\n`{e}`")).await {
            debug!(error = %e, "failure status update dropped");
        }
        remove_partial(&local_path);
        return;
    }

    let request = TransferRequest {
        local_path,
        display_name: incoming.name.clone(),
        total_bytes: incoming.size,
    };
    app.relay.process(request, &sink).await;
}

/// Streams the file from Telegram to `dest`, reporting progress.
async fn download(
    bot: &Bot,
    app: &App,
    incoming: &IncomingFile,
    dest: &Path,
    sink: &dyn StatusSink,
) -> anyhow::Result<()> {
    let remote = bot.get_file(incoming.file_id.clone()).await?;
    let mut out = tokio::fs::File::create(dest).await?;

    let reporter = ProgressReporter::new(
        sink,
        incoming.name.clone(),
        "⬇️ Downloading...",
        incoming.size,
        app.config.edit_interval(),
    );

    let stream = bot.download_file_stream(&remote.path);
    tokio::pin!(stream);
    let mut done: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        out.write_all(&chunk).await?;
        done += chunk.len() as u64;
        reporter.report(done).await;
    }
    out.flush().await?;

    info!(file = %incoming.name, bytes = done, "inbound download complete");
    Ok(())
}

fn initial_status(incoming: &IncomingFile) -> String {
    format!(
        "📂 `{}`\n📦 `{}`\n\n⬇️ Downloading...",
        incoming.name,
        human_size(incoming.size)
    )
}

/// Unique on-disk name so concurrent transfers never collide.
fn unique_name(name: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), sanitize(name))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect()
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %e, "failed to remove partial download");
    }
}
