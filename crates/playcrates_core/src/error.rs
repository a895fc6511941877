//! # Crate Error Types
//!
//! All errors that can surface from the crate system. None of them are
//! fatal; the calling layer reports them to whoever initiated the action.

use thiserror::Error;

/// Errors that can occur while managing or opening crates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrateError {
    /// A crate with this identifier is already registered.
    #[error("a crate with identifier '{0}' already exists")]
    DuplicateIdentifier(String),

    /// Crate identifiers must be non-empty.
    #[error("crate identifier must not be empty")]
    InvalidIdentifier,

    /// Lookup by identifier or position found nothing.
    #[error("no crate found for {0}")]
    InvalidCrateReference(String),

    /// The presented credential does not open this crate.
    #[error("credential does not match the key for crate '{0}'")]
    InvalidCredential(String),

    /// Open was attempted on a crate without rewards.
    #[error("crate '{0}' has no rewards")]
    EmptyRewardPool(String),

    /// The position cannot host a crate instance.
    #[error("invalid crate position: {0}")]
    InvalidTargetPosition(String),

    /// Reward weights must be finite and non-negative.
    #[error("invalid reward weight {0}")]
    InvalidWeight(f64),

    /// The crate has no key definition to hand out.
    #[error("crate '{0}' has no key")]
    MissingKey(String),

    /// A reward index outside the pool was addressed.
    #[error("reward index {index} out of range for pool of {len}")]
    RewardOutOfRange {
        /// Requested index.
        index: usize,
        /// Current pool size.
        len: usize,
    },

    /// Settings or persisted data could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The durability checkpoint failed.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// Result type for crate operations.
pub type CrateResult<T> = Result<T, CrateError>;

/// Failure of one best-effort step of the open transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The payload could not be handed to the requester.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// A side command was rejected by the host console.
    #[error("command '{command}' failed: {reason}")]
    Command {
        /// The command string as declared on the reward.
        command: String,
        /// Host-provided reason.
        reason: String,
    },

    /// A sound cue could not be played.
    #[error("sound '{sound}' failed: {reason}")]
    Sound {
        /// The sound identifier.
        sound: String,
        /// Host-provided reason.
        reason: String,
    },
}

/// Result type for open-transaction sub-steps.
pub type EffectResult = Result<(), EffectError>;
