//! Unique identifiers so integration tests sharing a process never touch
//! each other's accounts or conversations.

use ulid::Ulid;

/// `{prefix}-{ulid}`.
pub fn unique_str(prefix: &str) -> String {
    format!("{prefix}-{}", Ulid::new())
}

/// Account id string for a fresh test participant.
pub fn unique_account(label: &str) -> String {
    unique_str(&format!("acct-{label}"))
}

/// Conversation id string for a fresh game slot.
pub fn unique_conversation() -> String {
    unique_str("conv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_differ_and_keep_their_prefix() {
        let a = unique_account("alice");
        let b = unique_account("alice");
        assert_ne!(a, b);
        assert!(a.starts_with("acct-alice-"));
        assert!(unique_conversation().starts_with("conv-"));
    }
}
