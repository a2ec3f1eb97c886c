//! Application wiring: relay stack, health endpoint, Telegram dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use droplink_hosting::Uploader;
use droplink_relay::Relay;
use droplink_transfer::human_size;
use teloxide::dptree;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::handler;
use crate::health;

/// Commands understood by the bot.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show the welcome message")]
    Help,
}

/// Shared per-process state handed to every handler.
pub struct App {
    pub config: Config,
    pub relay: Relay,
    pub download_dir: PathBuf,
}

/// Runs the bot until the process is stopped.
pub async fn run(config: Config, token: String) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let uploader = Uploader::new(http, config.hosting());
    let relay = Relay::new(Arc::new(uploader), config.max_file_bytes);

    let download_dir = config.download_dir();
    std::fs::create_dir_all(&download_dir)
        .with_context(|| format!("failed to create {}", download_dir.display()))?;

    // -- Health endpoint --
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::run(health_port).await {
            error!(error = %e, "health endpoint failed");
        }
    });

    let app = Arc::new(App {
        config,
        relay,
        download_dir,
    });
    let bot = Bot::new(token);

    // -- Dispatcher --
    let tree = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint({
                    let app = Arc::clone(&app);
                    move |bot: Bot, msg: Message, cmd: Command| {
                        let app = Arc::clone(&app);
                        async move {
                            handle_command(app, bot, msg, cmd).await;
                            respond(())
                        }
                    }
                }),
        )
        .branch(
            Update::filter_message()
                .filter(|msg: Message| handler::extract_media(&msg).is_some())
                .endpoint({
                    let app = Arc::clone(&app);
                    move |bot: Bot, msg: Message| {
                        let app = Arc::clone(&app);
                        async move {
                            handler::handle_media(app, bot, msg).await;
                            respond(())
                        }
                    }
                }),
        );

    info!("droplink bot started");
    Dispatcher::builder(bot, tree)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_command(app: Arc<App>, bot: Bot, msg: Message, cmd: Command) {
    match cmd {
        Command::Start | Command::Help => {
            let text = welcome(app.config.max_file_bytes);
            if let Err(e) = bot
                .send_message(msg.chat.id, text)
                .parse_mode(ParseMode::Markdown)
                .await
            {
                warn!(error = %e, "failed to send welcome");
            }
        }
    }
}

fn welcome(max_bytes: u64) -> String {
    format!(
        "👋 *Welcome to droplink*\n\n\
         📤 Send any file up to *{}* and get a GoFile link instantly.",
        human_size(max_bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_names_the_limit() {
        let text = welcome(4 * 1024 * 1024 * 1024);
        assert!(text.contains("4.00 GB"));
        assert!(text.contains("GoFile"));
    }
}
