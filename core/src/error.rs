//! Error taxonomy shared by descriptor construction and the reconciler.

use thiserror::Error;

use crate::key::Key;

/// Errors produced while building, mounting or patching descriptors.
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor violates the kind/name/children invariants.
    ///
    /// This is a programmer error and is reported where the descriptor is constructed.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),
    /// The descriptor cannot be realized in the display tree.
    #[error("cannot mount descriptor: {0}")]
    UnmountableDescriptor(String),
    /// An entry of a keyed child list has no key.
    #[error("keyed children require a key on every entry, entry {index} has none")]
    MissingKey {
        /// Position of the offending entry in its sibling list.
        index: usize,
    },
    /// Two entries of a keyed child list share a key.
    #[error("duplicate key `{key}` among keyed children")]
    DuplicateKey {
        /// The repeated key.
        key: Key,
    },
    /// State updates kept scheduling more updates.
    #[error("state updates did not settle after {0} batches")]
    UpdateLoop(usize),
    /// Error returned by application render or lifecycle code.
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl Error {
    /// Returns `true` for keyed-diff precondition violations.
    #[must_use]
    pub const fn is_key_error(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::DuplicateKey { .. })
    }
}

/// Result alias used across the Ripple crates.
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let error = Error::MissingKey { index: 2 };
        assert_eq!(
            error.to_string(),
            "keyed children require a key on every entry, entry 2 has none"
        );
        let error = Error::DuplicateKey {
            key: Key::from("a"),
        };
        assert_eq!(error.to_string(), "duplicate key `a` among keyed children");
        assert!(error.is_key_error());
    }

    #[test]
    fn hook_errors_are_transparent() {
        let error = Error::from(anyhow::anyhow!("render exploded"));
        assert_eq!(error.to_string(), "render exploded");
        assert!(!error.is_key_error());
    }
}
