//! # Help Command
//!
//! Replies with the usage of every advertised command.

use async_trait::async_trait;

use crate::application::action::{Action, Outcome};
use crate::application::context::BotContext;
use crate::domain::types::{Advertisement, InboundMessage};
use crate::strings::messages;

pub struct Help {
    text: String,
}

impl Help {
    pub fn new(prefix: &str, advertisements: &[Advertisement]) -> Self {
        let mut lines = vec![messages::HELP_HEADER.to_string()];
        lines.extend(advertisements.iter().map(|ad| {
            messages::help_line(prefix, &ad.name, ad.usage.as_deref(), &ad.description)
        }));
        Self {
            text: lines.join("\n"),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[async_trait]
impl Action for Help {
    async fn run(&self, message: &InboundMessage, ctx: &BotContext) -> Outcome {
        match ctx.reply(message, &self.text).await {
            Ok(()) => Outcome::handled(),
            Err(e) => Outcome::fail(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_usage() {
        let help = Help::new(
            "!",
            &[
                Advertisement::new("set", "Store a message").usage("<message>"),
                Advertisement::new("get", "Show the message"),
            ],
        );
        assert_eq!(
            help.text(),
            "**🤖 Commands**\n* `!set <message>`: Store a message\n* `!get`: Show the message"
        );
    }
}
