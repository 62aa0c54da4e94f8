//! Avatar resolution
//!
//! Decides what a character's avatar should be after a modification. The
//! decision is a pure function of its inputs; applying it is a single write
//! to the avatar registry.
//!
//! Priority:
//! 1. an override of `none` (any case) removes the avatar
//! 2. any other non-blank override is assigned verbatim
//! 3. `{id}/{appearance}` if it exists and isn't already assigned
//! 4. `{id}/Default` if it exists and isn't already assigned
//! 5. otherwise the assignment is left alone

use stage_actor::AvatarRegistry;

/// Override value that removes the avatar
pub const AVATAR_NONE: &str = "none";

/// Appearance used for the fallback avatar
pub const DEFAULT_AVATAR_APPEARANCE: &str = "Default";

/// Outcome of avatar resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvatarDecision {
    /// Drop the actor's avatar
    Remove,
    /// Assign this path
    Assign(String),
    /// Leave the assignment untouched
    Keep,
}

/// Avatar path for an actor appearance
pub fn avatar_path(actor_id: &str, appearance: &str) -> String {
    format!("{}/{}", actor_id, appearance)
}

/// Decide the avatar for `actor_id`
///
/// `appearance` is the appearance the command resolved (if any), `current`
/// the avatar assigned right now and `exists` the catalog lookup.
pub fn resolve_avatar(
    actor_id: &str,
    appearance: Option<&str>,
    override_path: Option<&str>,
    current: Option<&str>,
    exists: impl Fn(&str) -> bool,
) -> AvatarDecision {
    if let Some(path) = override_path.filter(|p| !p.trim().is_empty()) {
        if path.trim().eq_ignore_ascii_case(AVATAR_NONE) {
            return AvatarDecision::Remove;
        }
        return AvatarDecision::Assign(path.to_string());
    }

    let candidates = appearance
        .filter(|a| !a.trim().is_empty())
        .map(|a| avatar_path(actor_id, a))
        .into_iter()
        .chain(std::iter::once(avatar_path(actor_id, DEFAULT_AVATAR_APPEARANCE)));

    for candidate in candidates {
        if exists(&candidate) && current != Some(candidate.as_str()) {
            return AvatarDecision::Assign(candidate);
        }
    }
    AvatarDecision::Keep
}

/// Write a decision to the avatar registry
///
/// Returns whether the registry changed.
pub fn apply_avatar_decision(avatars: &AvatarRegistry, actor_id: &str, decision: &AvatarDecision) -> bool {
    match decision {
        AvatarDecision::Remove => avatars.remove(actor_id).is_some(),
        AvatarDecision::Assign(path) => avatars.set(actor_id, path.as_str()).as_deref() != Some(path.as_str()),
        AvatarDecision::Keep => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exists_in(paths: &'static [&'static str]) -> impl Fn(&str) -> bool {
        move |p: &str| paths.iter().any(|known| *known == p)
    }

    #[test]
    fn test_none_removes() {
        for value in ["none", "NONE", "None"] {
            let decision = resolve_avatar("Sora", Some("Happy"), Some(value), Some("Sora/Happy"), |_| true);
            assert_eq!(decision, AvatarDecision::Remove);
        }
    }

    #[test]
    fn test_override_assigned_verbatim() {
        let decision = resolve_avatar("Sora", Some("Happy"), Some("Other/Portrait"), None, |_| false);
        assert_eq!(decision, AvatarDecision::Assign("Other/Portrait".to_string()));
    }

    #[test]
    fn test_override_keeps_surrounding_whitespace() {
        let decision = resolve_avatar("Sora", None, Some(" Portraits/A "), None, |_| false);
        assert_eq!(decision, AvatarDecision::Assign(" Portraits/A ".to_string()));

        let decision = resolve_avatar("Sora", None, Some(" none "), Some("Sora/Happy"), |_| true);
        assert_eq!(decision, AvatarDecision::Remove);
    }

    #[test]
    fn test_appearance_then_default() {
        let both = exists_in(&["Sora/Happy", "Sora/Default"]);
        assert_eq!(
            resolve_avatar("Sora", Some("Happy"), None, None, &both),
            AvatarDecision::Assign("Sora/Happy".to_string())
        );

        let default_only = exists_in(&["Sora/Default"]);
        assert_eq!(
            resolve_avatar("Sora", Some("Happy"), None, None, &default_only),
            AvatarDecision::Assign("Sora/Default".to_string())
        );

        assert_eq!(
            resolve_avatar("Sora", Some("Happy"), None, None, exists_in(&[])),
            AvatarDecision::Keep
        );
    }

    #[test]
    fn test_no_redundant_write() {
        let both = exists_in(&["Sora/Happy", "Sora/Default"]);
        // Already showing the appearance avatar: falls through to Default
        assert_eq!(
            resolve_avatar("Sora", Some("Happy"), None, Some("Sora/Happy"), &both),
            AvatarDecision::Assign("Sora/Default".to_string())
        );
        assert_eq!(
            resolve_avatar("Sora", None, None, Some("Sora/Default"), &both),
            AvatarDecision::Keep
        );
    }

    #[test]
    fn test_blank_override_is_no_override() {
        let decision = resolve_avatar("Sora", None, Some("  "), None, exists_in(&["Sora/Default"]));
        assert_eq!(decision, AvatarDecision::Assign("Sora/Default".to_string()));
    }

    #[test]
    fn test_apply_decision() {
        let avatars = AvatarRegistry::new();
        assert!(apply_avatar_decision(&avatars, "Sora", &AvatarDecision::Assign("Sora/Happy".into())));
        assert!(!apply_avatar_decision(&avatars, "Sora", &AvatarDecision::Assign("Sora/Happy".into())));
        assert!(!apply_avatar_decision(&avatars, "Sora", &AvatarDecision::Keep));
        assert_eq!(avatars.get("Sora").as_deref(), Some("Sora/Happy"));
        assert!(apply_avatar_decision(&avatars, "Sora", &AvatarDecision::Remove));
        assert!(avatars.get("Sora").is_none());
    }
}
