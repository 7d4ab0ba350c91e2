//! # Command Handlers
//!
//! Built-in commands and the registry the binary runs with.

pub mod help;
pub mod message;

use crate::application::adapters::{CommandPrefix, MessageType, MinRole, adapt};
use crate::application::registry::{Command, Registry};
use crate::domain::types::{Advertisement, Role};

use help::Help;
use message::{ForgetMessage, GetMessage, SetMessage};

pub const DEFAULT_PREFIX: &str = "!";

/// Registry for the built-in commands, all triggered by `prefix` + name.
pub fn registry(prefix: &str) -> Registry {
    let help_ad = Advertisement::new("help", "List the available commands");
    let set_ad = Advertisement::new("set", "Set a message that can be displayed with `get`")
        .usage("<message>");
    let get_ad = Advertisement::new("get", "Get the message that was set with `set`");
    let forget_ad = Advertisement::new("forget", "Clear the stored message (admins only)");

    let help = Help::new(
        prefix,
        &[
            help_ad.clone(),
            set_ad.clone(),
            get_ad.clone(),
            forget_ad.clone(),
        ],
    );
    let trigger = |name: &str| CommandPrefix::new(format!("{prefix}{name}"));

    Registry::new()
        .with(
            Command::new("Help", adapt(help, &[&MessageType::text(), &trigger("help")]))
                .advertise(help_ad),
        )
        .with(
            Command::new(
                "SetMessage",
                adapt(SetMessage::new(format!("{prefix}set")), &[
                    &MessageType::text(),
                    &trigger("set"),
                ]),
            )
            .advertise(set_ad),
        )
        .with(
            Command::new(
                "GetMessage",
                adapt(GetMessage::new(prefix), &[
                    &MessageType::text(),
                    &trigger("get"),
                ]),
            )
            .advertise(get_ad),
        )
        .with(
            Command::new(
                "ForgetMessage",
                adapt(ForgetMessage, &[
                    &MessageType::text(),
                    &trigger("forget"),
                    &MinRole::new(Role::Admin),
                ]),
            )
            .advertise(forget_ad),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::{Dispatch, DispatchSettings, Dispatcher};
    use crate::application::testing::{FakeRoles, Harness};
    use crate::domain::types::InboundMessage;
    use crate::strings::messages;
    use std::sync::Arc;

    fn send(from: &str, id: &str, body: &str) -> InboundMessage {
        InboundMessage::text(id, "conv1", from, body)
    }

    #[tokio::test]
    async fn test_builtin_flow() {
        let h = Harness::with_roles(FakeRoles::with(&[
            ("alice", Role::Admin),
            ("bob", Role::Writer),
        ]));
        let dispatcher = Dispatcher::new(
            Arc::new(registry(DEFAULT_PREFIX)),
            h.ctx.clone(),
            DispatchSettings {
                command_prefix: Some(DEFAULT_PREFIX.to_string()),
                allow_self_messages: false,
            },
        );

        let handled = |name: &str| Dispatch::Handled {
            command: name.to_string(),
            replied: false,
        };

        assert_eq!(
            dispatcher.dispatch(&send("bob", "0", "!help")).await,
            handled("Help")
        );
        assert_eq!(
            dispatcher.dispatch(&send("bob", "1", "!set hello")).await,
            handled("SetMessage")
        );
        // `get` replies but lets the message continue down the registry.
        assert_eq!(
            dispatcher.dispatch(&send("bob", "2", "!get")).await,
            Dispatch::Unmatched
        );
        assert_eq!(
            dispatcher.dispatch(&send("bob", "3", "!forget")).await,
            Dispatch::Handled {
                command: "ForgetMessage".to_string(),
                replied: true
            }
        );
        assert_eq!(
            dispatcher.dispatch(&send("alice", "4", "!forget")).await,
            handled("ForgetMessage")
        );
        assert_eq!(
            dispatcher.dispatch(&send("alice", "5", "!unknown")).await,
            Dispatch::Unmatched
        );

        let texts: Vec<String> = h.transport.replies().into_iter().map(|r| r.text).collect();
        assert!(texts[0].starts_with(messages::HELP_HEADER));
        for name in ["help", "set <message>", "get", "forget"] {
            assert!(texts[0].contains(&format!("`!{name}`")), "help is missing {name}");
        }
        assert_eq!(
            texts[1..],
            [
                "📌 hello".to_string(),
                "Your role must be at least admin to do that.".to_string(),
                "🧹 Stored message cleared.".to_string(),
            ]
        );
    }

    #[test]
    fn test_every_builtin_is_advertised() {
        let registry = registry("?");
        assert_eq!(registry.len(), 4);
        assert!(registry.iter().all(|c| c.advertisement.is_some()));
        assert!(registry.get("ForgetMessage").is_some());
    }
}
