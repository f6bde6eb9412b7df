//! Ownership-based authorization verdicts.
//!
//! The trunk branch is the absolute truth for prior ownership: a change is
//! authorized iff the owner declared by the trunk revision of the record is
//! the pull-request author. A declared new owner is surfaced for
//! transparency but never grants authorization on its own, so a contributor
//! cannot silently reassign a record they do not own.

use crate::model::AuthorizationVerdict;

/// Compare the prior and current declared owners against the pull-request
/// author.
///
/// Identity comparison is ASCII-case-insensitive; an absent identity is a
/// non-match rather than a fault.
#[must_use]
pub fn resolve(
    prior_owner: Option<&str>,
    new_owner: Option<&str>,
    author: &str,
) -> AuthorizationVerdict {
    let authorized = prior_owner.is_some_and(|owner| owner.eq_ignore_ascii_case(author));
    AuthorizationVerdict {
        authorized,
        prior_owner: prior_owner.map(str::to_string),
        new_owner: new_owner.map(str::to_string),
        author: author.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_owner_is_authorized() {
        let verdict = resolve(Some("alice"), Some("alice"), "alice");
        assert!(verdict.authorized);
    }

    #[test]
    fn comparison_ignores_ascii_case() {
        assert!(resolve(Some("Alice"), None, "aLiCe").authorized);
        assert!(!resolve(Some("alice"), None, "bob").authorized);
    }

    #[test]
    fn absent_prior_owner_is_never_authorized() {
        let verdict = resolve(None, Some("bob"), "bob");
        assert!(!verdict.authorized);
        assert_eq!(verdict.prior_owner, None);
    }

    #[test]
    fn new_owner_does_not_grant_authorization() {
        // The author declares themselves as the new owner of a record they
        // do not own; the verdict still follows the trunk owner.
        let verdict = resolve(Some("alice"), Some("mallory"), "mallory");
        assert!(!verdict.authorized);
        assert_eq!(verdict.new_owner.as_deref(), Some("mallory"));
        assert_eq!(verdict.author, "mallory");
    }
}
