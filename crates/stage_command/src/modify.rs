//! Actor modification command
//!
//! Runs one [`ModificationRequest`] against its target actor:
//!
//! 1. **Resolving** - lease the target, snapshot its state, resolve duration,
//!    easing, look, tint, appearance and position, then settle the avatar.
//! 2. **Applying** - build the set of transitions the request asks for (plus
//!    auto-arrange when a character is shown without a position), run them
//!    concurrently on the command's token and wait for all of them.
//!
//! Bad values and missing resources only skip their own transition. Nothing
//! is rolled back when the token fires; the actor keeps whatever state the
//! transitions had reached.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use stage_actor::{ActorError, ActorLease, ActorResult};
use stage_core::{
    ActorKind, CancellationToken, Color, EasingType, LookDirection, TransitionOutcome, Vec3,
};

use crate::avatar_policy::{apply_avatar_decision, resolve_avatar, AvatarDecision};
use crate::command::{Command, CommandContext, CommandPhase, CommandReport};
use crate::request::ModificationRequest;

/// Values captured while resolving, shared by every transition
struct ResolvedModification {
    was_visible: bool,
    duration: Duration,
    easing: EasingType,
    appearance: Option<String>,
    look: Option<LookDirection>,
    tint: Option<Color>,
    position: Option<Vec3>,
}

type Transition<'a> = BoxFuture<'a, (&'static str, ActorResult<TransitionOutcome>)>;

/// The actor modification command
#[derive(Debug, Clone)]
pub struct ModifyActor {
    request: ModificationRequest,
}

impl ModifyActor {
    pub const NAME: &'static str = "modify";

    pub fn new(request: ModificationRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &ModificationRequest {
        &self.request
    }

    fn resolve(
        &self,
        ctx: &CommandContext,
        lease: &ActorLease,
        report: &mut CommandReport,
    ) -> ResolvedModification {
        let request = &self.request;
        let config = ctx.actors.config();

        let duration = match request.duration() {
            Ok(duration) => duration.unwrap_or_else(|| config.default_duration()),
            Err(e) => {
                log::warn!("{}: {}; using default duration", request.id, e);
                report.push_issue(e.into());
                config.default_duration()
            }
        };
        let easing = match request.easing.as_deref().map(str::parse::<EasingType>) {
            None => config.default_easing(),
            Some(Ok(easing)) => easing,
            Some(Err(e)) => {
                log::warn!("{}: {}; using default easing", request.id, e);
                report.push_issue(e.into());
                config.default_easing()
            }
        };
        let look = LookDirection::parse_optional(request.look.as_deref()).unwrap_or_else(|e| {
            log::warn!("{}: {}", request.id, e);
            report.push_issue(e.into());
            None
        });
        let tint = match request.tint.as_deref().map(str::parse::<Color>) {
            None => None,
            Some(Ok(tint)) => Some(tint),
            Some(Err(e)) => {
                log::warn!("{}: {}", request.id, e);
                report.push_issue(e.into());
                None
            }
        };

        let appearance = request.appearance.clone().or_else(|| {
            if lease.appearance().is_none() {
                config.metadata_for(&request.id).default_appearance
            } else {
                None
            }
        });

        let position = if request.has_position() {
            let scene = request
                .scene_position
                .map(|axis, value| config.scene_to_world(axis, value));
            Some(scene.merge(&request.position).resolve(lease.position()))
        } else {
            None
        };

        ResolvedModification {
            was_visible: lease.is_visible(),
            duration,
            easing,
            appearance,
            look,
            tint,
            position,
        }
    }

    fn settle_avatar(&self, ctx: &CommandContext, lease: &ActorLease, resolved: &ResolvedModification) {
        let id = self.request.id.as_str();
        if lease.kind() != ActorKind::Character {
            if self.request.avatar.is_some() {
                log::debug!("{}: avatars only apply to characters", id);
            }
            return;
        }

        let appearance = resolved.appearance.clone().or_else(|| lease.appearance());
        let avatars = ctx.actors.avatars();
        let current = avatars.get(id);
        let decision = resolve_avatar(
            id,
            appearance.as_deref(),
            self.request.avatar.as_deref(),
            current.as_deref(),
            |path| ctx.actors.avatar_exists(path),
        );
        if decision == AvatarDecision::Keep {
            log::debug!("{}: avatar unchanged", id);
        }
        apply_avatar_decision(avatars, id, &decision);
    }

    /// Shown without a position: a character joining the scene
    fn should_auto_arrange(
        &self,
        ctx: &CommandContext,
        lease: &ActorLease,
        resolved: &ResolvedModification,
    ) -> bool {
        resolved.position.is_none()
            && !resolved.was_visible
            && self.request.visible == Some(true)
            && ctx.actors.auto_arrange_on_add()
            && lease.kind() == ActorKind::Character
    }

    async fn apply(
        &self,
        ctx: &CommandContext,
        lease: &ActorLease,
        resolved: ResolvedModification,
        token: &CancellationToken,
        report: &mut CommandReport,
    ) -> bool {
        let auto_arrange = self.should_auto_arrange(ctx, lease, &resolved);
        let ResolvedModification {
            was_visible,
            duration,
            easing,
            appearance,
            look,
            tint,
            position,
        } = resolved;
        let mut results = Vec::new();

        // A freshly shown actor must not fade in with its old appearance
        let mut appearance = appearance;
        if self.request.visible == Some(true) && !was_visible {
            if let Some(name) = appearance.take() {
                let result = lease
                    .change_appearance(&name, Duration::ZERO, easing, token)
                    .await;
                results.push(("appearance", result));
            }
        }

        let mut transitions: Vec<Transition<'_>> = Vec::new();
        if let Some(name) = appearance {
            transitions.push(
                async move {
                    let result = lease.change_appearance(&name, duration, easing, token).await;
                    ("appearance", result)
                }
                .boxed(),
            );
        }
        if let Some(visible) = self.request.visible {
            transitions.push(
                async move {
                    ("visibility", lease.change_visibility(visible, duration, easing, token).await)
                }
                .boxed(),
            );
        }
        if let Some(position) = position {
            transitions.push(
                async move {
                    ("position", lease.change_position(position, duration, easing, token).await)
                }
                .boxed(),
            );
        }
        if let Some(tint) = tint {
            transitions.push(
                async move { ("tint", lease.change_tint(tint, duration, easing, token).await) }.boxed(),
            );
        }
        if let Some(look) = look {
            transitions.push(
                async move { ("look", lease.change_look_direction(look, token).await) }.boxed(),
            );
        }
        if auto_arrange {
            let actors = &ctx.actors;
            transitions.push(
                async move {
                    let result = actors
                        .arrange_characters(lease.actor(), duration, easing, token)
                        .await;
                    ("arrange", result)
                }
                .boxed(),
            );
        }

        log::debug!(
            "{}: applying {} transitions{}",
            self.request.id,
            transitions.len(),
            if auto_arrange { " with auto-arrange" } else { "" }
        );
        results.extend(join_all(transitions).await);

        let mut cancelled = false;
        for (transition, result) in results {
            match result {
                Ok(outcome) => cancelled |= outcome.is_cancelled(),
                Err(e @ ActorError::ResourceMissing { .. }) => {
                    log::debug!("{}: skipped {} transition: {}", self.request.id, transition, e);
                    report.push_issue(e.into());
                }
                Err(e) => {
                    log::warn!("{}: {} transition failed: {}", self.request.id, transition, e);
                    report.push_issue(e.into());
                }
            }
        }
        cancelled
    }
}

#[async_trait]
impl Command for ModifyActor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn target(&self) -> Option<&str> {
        Some(&self.request.id)
    }

    fn wait(&self) -> bool {
        self.request.wait
    }

    async fn execute(&self, ctx: &CommandContext, token: &CancellationToken) -> CommandReport {
        let id = self.request.id.clone();
        let mut report = CommandReport::new(Self::NAME, Some(id.clone()));
        report.enter(CommandPhase::Resolving);

        let lease = match ctx.actors.resolve(&id).await {
            Ok(lease) => lease,
            Err(e) => {
                log::error!("Cannot modify {}: {}", id, e);
                report.fail(e.into());
                return report;
            }
        };

        let resolved = self.resolve(ctx, &lease, &mut report);
        self.settle_avatar(ctx, &lease, &resolved);

        if token.is_cancelled() {
            report.enter(CommandPhase::Cancelled);
            return report;
        }

        report.enter(CommandPhase::Applying);
        let cancelled = self.apply(ctx, &lease, resolved, token, &mut report).await;
        report.enter(if cancelled {
            CommandPhase::Cancelled
        } else {
            CommandPhase::Completed
        });
        report
    }
}
