//! Prints the chats the bot has recently seen, to find the value for `TG_CHAT_ID`.

use anyhow::{anyhow, Result};
use teloxide::prelude::*;
use teloxide::types::{Chat, UpdateKind};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let token = std::env::var("TG_BOT_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| anyhow!("TG_BOT_API_TOKEN not found in environment variables"))?;

    let bot = Bot::new(token);
    let updates = bot
        .get_updates()
        .await
        .map_err(|e| anyhow!("Error fetching updates: {}", e))?;

    if updates.is_empty() {
        println!("No recent updates found.");
        println!("Send a message to your bot first, then run this tool again.");
        return Ok(());
    }

    for update in updates {
        match update.kind {
            UpdateKind::Message(message) => {
                let sender = message.from();
                print_chat(&message.chat);
                println!(
                    "From User: {}",
                    sender.map(|u| u.full_name()).unwrap_or_default()
                );
                println!(
                    "Username: @{}",
                    sender.and_then(|u| u.username.as_deref()).unwrap_or("N/A")
                );
            }
            UpdateKind::ChannelPost(post) => {
                print_chat(&post.chat);
                println!("From User: Channel Post");
                println!("Username: @{}", post.chat.username().unwrap_or("N/A"));
            }
            _ => continue,
        }
        println!();
    }

    Ok(())
}

fn print_chat(chat: &Chat) {
    println!("Chat ID: {}", chat.id);
    println!("Chat Type: {}", chat_type(chat));
    println!("Chat Title: {}", chat.title().unwrap_or("N/A"));
}

fn chat_type(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    }
}
