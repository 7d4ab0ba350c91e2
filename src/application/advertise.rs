//! # Advertisement Planner
//!
//! Groups the registry's advertisements by visibility scope and target, and publishes
//! the resulting plan to the announcement service in one call. Publishing and clearing
//! are best-effort: failures are logged and the bot keeps running.

use crate::application::context::BotContext;
use crate::application::registry::Registry;
use crate::domain::types::{AdScope, Advertisement, AdvertisementPlan, PlanGroup, ScopeKind};

/// Result of a publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// Nothing to advertise, the service was not called.
    Skipped,
    Published { groups: usize, commands: usize },
    Failed,
}

/// Builds the publish plan. Groups are ordered public, team conversations, team
/// members, single conversations; within a kind by first appearance. Team names are
/// case-folded.
pub fn plan(registry: &Registry, alias: &str) -> AdvertisementPlan {
    let mut public: Vec<Advertisement> = Vec::new();
    let mut team_conversations: Vec<PlanGroup> = Vec::new();
    let mut team_members: Vec<PlanGroup> = Vec::new();
    let mut conversations: Vec<PlanGroup> = Vec::new();

    for command in registry {
        let Some(ad) = &command.advertisement else {
            continue;
        };
        match &command.scope {
            AdScope::Public => public.push(ad.clone()),
            AdScope::TeamConversations(team) => push_keyed(
                &mut team_conversations,
                ScopeKind::TeamConversations,
                team.to_lowercase(),
                ad,
            ),
            AdScope::TeamMembers(team) => push_keyed(
                &mut team_members,
                ScopeKind::TeamMembers,
                team.to_lowercase(),
                ad,
            ),
            AdScope::Conversation(id) => {
                push_keyed(&mut conversations, ScopeKind::Conversation, id.clone(), ad)
            }
        }
    }

    let mut groups = Vec::new();
    if !public.is_empty() {
        groups.push(PlanGroup {
            kind: ScopeKind::Public,
            target: None,
            commands: public,
        });
    }
    groups.extend(team_conversations);
    groups.extend(team_members);
    groups.extend(conversations);

    AdvertisementPlan {
        alias: (!alias.is_empty()).then(|| alias.to_string()),
        groups,
    }
}

fn push_keyed(groups: &mut Vec<PlanGroup>, kind: ScopeKind, target: String, ad: &Advertisement) {
    match groups
        .iter_mut()
        .find(|g| g.target.as_deref() == Some(target.as_str()))
    {
        Some(group) => group.commands.push(ad.clone()),
        None => groups.push(PlanGroup {
            kind,
            target: Some(target),
            commands: vec![ad.clone()],
        }),
    }
}

/// Plans and publishes the registry's advertisements under the bot's display name.
pub async fn publish(ctx: &BotContext, registry: &Registry) -> Publish {
    let plan = plan(registry, ctx.name());
    if plan.is_empty() {
        tracing::debug!("No advertised commands, skipping announcement");
        return Publish::Skipped;
    }

    let groups = plan.groups.len();
    let commands = plan.command_count();
    match ctx.bounded(ctx.announcer().publish(&plan)).await {
        Ok(()) => {
            tracing::info!("Advertised {} commands in {} groups", commands, groups);
            Publish::Published { groups, commands }
        }
        Err(e) => {
            tracing::error!("Error setting adverts: {}", e);
            Publish::Failed
        }
    }
}

/// Removes every advertisement. Not retried.
pub async fn clear(ctx: &BotContext) -> bool {
    match ctx.bounded(ctx.announcer().clear()).await {
        Ok(()) => {
            tracing::debug!("Cleared advertised commands");
            true
        }
        Err(e) => {
            tracing::error!("Error clearing adverts: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::registry::Command;
    use crate::application::testing::{Harness, Unreachable};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn command(name: &str) -> Command {
        Command::new(name, Arc::new(Unreachable))
    }

    fn ad(name: &str) -> Advertisement {
        Advertisement::new(name, format!("{name} things"))
    }

    #[test]
    fn test_groups_by_scope_and_target() {
        let registry = Registry::new()
            .with(command("public").advertise(ad("help")))
            .with(command("team-a").advertise_in(
                ad("deploy"),
                AdScope::team_conversations("A").unwrap(),
            ))
            .with(command("team-a-again").advertise_in(
                ad("rollback"),
                AdScope::team_conversations("a").unwrap(),
            ))
            .with(command("conv").advertise_in(ad("poll"), AdScope::conversation("c1").unwrap()))
            .with(command("hidden"));

        let plan = plan(&registry, "");
        assert_eq!(plan.alias, None);
        assert_eq!(plan.groups.len(), 3);

        assert_eq!(plan.groups[0].kind, ScopeKind::Public);
        assert_eq!(plan.groups[0].target, None);
        assert_eq!(plan.groups[0].commands, vec![ad("help")]);

        assert_eq!(plan.groups[1].kind, ScopeKind::TeamConversations);
        assert_eq!(plan.groups[1].target.as_deref(), Some("a"));
        assert_eq!(plan.groups[1].commands, vec![ad("deploy"), ad("rollback")]);

        assert_eq!(plan.groups[2].kind, ScopeKind::Conversation);
        assert_eq!(plan.groups[2].target.as_deref(), Some("c1"));
        assert_eq!(plan.groups[2].commands.len(), 1);
    }

    #[test]
    fn test_group_order_and_team_member_keys() {
        let registry = Registry::new()
            .with(command("m").advertise_in(ad("m"), AdScope::team_members("Ops").unwrap()))
            .with(command("c").advertise_in(ad("c"), AdScope::conversation("Conv9").unwrap()))
            .with(command("t").advertise_in(ad("t"), AdScope::team_conversations("ops").unwrap()))
            .with(command("m2").advertise_in(ad("m2"), AdScope::team_members("dev").unwrap()))
            .with(command("p").advertise(ad("p")));

        let plan = plan(&registry, "Helper");
        let shape: Vec<(ScopeKind, Option<&str>, usize)> = plan
            .groups
            .iter()
            .map(|g| (g.kind, g.target.as_deref(), g.commands.len()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (ScopeKind::Public, None, 1),
                (ScopeKind::TeamConversations, Some("ops"), 1),
                (ScopeKind::TeamMembers, Some("ops"), 1),
                (ScopeKind::TeamMembers, Some("dev"), 1),
                (ScopeKind::Conversation, Some("Conv9"), 1),
            ]
        );
        assert_eq!(plan.alias.as_deref(), Some("Helper"));
    }

    #[test]
    fn test_plan_serializes_with_scope_names() {
        let registry = Registry::new().with(command("t").advertise_in(
            ad("deploy").usage("<env>"),
            AdScope::team_members("Acme").unwrap(),
        ));
        let json = serde_json::to_value(plan(&registry, "")).unwrap();
        assert_eq!(json["groups"][0]["type"], "teammembers");
        assert_eq!(json["groups"][0]["target"], "acme");
        assert_eq!(json["groups"][0]["commands"][0]["usage"], "<env>");
        assert!(json.get("alias").is_none());
    }

    #[tokio::test]
    async fn test_empty_plan_makes_no_call() {
        let h = Harness::new();
        let registry = Registry::new().with(command("quiet")).with(command("silent"));

        assert_eq!(publish(&h.ctx, &registry).await, Publish::Skipped);
        assert!(h.announcer.published().is_empty());
    }

    #[tokio::test]
    async fn test_publish_sends_whole_plan_once() {
        let h = Harness::new();
        let registry = Registry::new()
            .with(command("a").advertise(ad("a")))
            .with(command("b").advertise_in(ad("b"), AdScope::team_members("x").unwrap()));

        assert_eq!(
            publish(&h.ctx, &registry).await,
            Publish::Published {
                groups: 2,
                commands: 2
            }
        );
        let published = h.announcer.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].command_count(), 2);
    }

    #[tokio::test]
    async fn test_publish_failure_is_not_fatal() {
        let h = Harness::new();
        h.announcer.failing.store(true, Ordering::SeqCst);
        let registry = Registry::new().with(command("a").advertise(ad("a")));

        assert_eq!(publish(&h.ctx, &registry).await, Publish::Failed);
        assert!(!clear(&h.ctx).await);
        assert_eq!(h.announcer.clear_count(), 1);
    }
}
