//! Telegram transport: long polling in, `sendMessage` out.

use teloxide::prelude::*;
use tracing::{debug, info};
use weatherbot_core::{Dispatcher as WeatherDispatcher, InboundEvent};

/// Run the receive loop until Ctrl-C.
///
/// Teloxide hands updates from different chats to the handler concurrently,
/// so one slow lookup does not hold up other conversations.
pub async fn run(token: &str, dispatcher: WeatherDispatcher) {
    let bot = Bot::new(token);
    let handler = Update::filter_message().endpoint(on_message);

    info!("bot started, polling for updates");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("bot stopped");
}

async fn on_message(bot: Bot, msg: Message, dispatcher: WeatherDispatcher) -> ResponseResult<()> {
    let Some(event) = msg.text().and_then(InboundEvent::from_text) else {
        debug!(chat = msg.chat.id.0, "ignoring non-text message or unknown command");
        return Ok(());
    };

    let reply = dispatcher.handle(event).await;
    bot.send_message(msg.chat.id, reply).await?;

    Ok(())
}
