//! # Crates and the Open Transaction
//!
//! A [`Crate`] bundles one key policy, the positions it is placed at, an
//! ordered reward pool and the sounds played on reward.
//!
//! ## Open Pipeline
//!
//! ```text
//! open(requester)
//!   1. reward pool empty?      -> EmptyRewardPool, nothing else happens
//!   2. choose_weighted(pool)
//!   3. deliver payload          (best effort)
//!   4. run side commands        (best effort, elevated, declared order)
//!   5. play reward sounds       (best effort, declared order, None skipped)
//!   6. return OpenOutcome
//! ```
//!
//! Steps 3-5 are independent. A failure is logged and recorded on the
//! outcome; nothing is rolled back and later steps still run.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CrateError, CrateResult, EffectError, EffectResult};
use crate::item::{ItemPayload, KeyMatchPolicy};
use crate::key::KeyDefinition;
use crate::position::BlockPosition;
use crate::reward::RewardDefinition;
use crate::selector::choose_weighted;
use crate::sound::{optional_cues, SoundCue};

/// Who is opening a crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requester {
    /// Host identifier (player name or UUID).
    pub id: String,
    /// Where the requester stands; sounds play here.
    pub location: BlockPosition,
}

impl Requester {
    /// Creates a requester.
    #[must_use]
    pub fn new(id: impl Into<String>, location: BlockPosition) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

/// Host-side effects applied while opening a crate.
///
/// Each call is one independent step; returning an error does not stop the
/// remaining steps.
pub trait OpenEffects<P> {
    /// Hands the reward item to the requester. Capacity fallbacks (drop in
    /// world, mail, ...) are the host's business.
    fn deliver(&mut self, requester: &Requester, payload: &P) -> EffectResult;

    /// Runs a console command in the host's trusted context.
    fn execute_command(&mut self, command: &str) -> EffectResult;

    /// Plays a sound at `location`.
    fn play_sound(&mut self, cue: &SoundCue, location: &BlockPosition) -> EffectResult;
}

/// Which step of the open pipeline failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenStep {
    /// Payload delivery.
    Deliver,
    /// Side command at this position in the reward's command list.
    Command(usize),
    /// Sound at this position in the crate's sound list.
    Sound(usize),
}

/// A recorded best-effort failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectFailure {
    /// Step that failed.
    pub step: OpenStep,
    /// What the host reported.
    pub error: EffectError,
}

/// Result of a completed open.
#[derive(Clone, Debug, PartialEq)]
pub struct OpenOutcome<P> {
    /// Index of the chosen reward in the pool at open time.
    pub index: usize,
    /// The chosen reward.
    pub reward: RewardDefinition<P>,
    /// Steps that failed without aborting the open.
    pub failures: Vec<EffectFailure>,
}

impl<P> OpenOutcome<P> {
    /// True if every side effect went through.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A named loot container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: serde::de::DeserializeOwned"))]
pub struct Crate<P> {
    identifier: String,
    /// Title shown in menus and holograms.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<KeyDefinition<P>>,
    #[serde(default)]
    positions: BTreeSet<BlockPosition>,
    #[serde(default = "default_reward_sounds", with = "optional_cues")]
    reward_sounds: Vec<Option<SoundCue>>,
    #[serde(default)]
    rewards: Vec<RewardDefinition<P>>,
}

fn default_reward_sounds() -> Vec<Option<SoundCue>> {
    vec![Some(SoundCue::default())]
}

impl<P: ItemPayload> Crate<P> {
    /// Creates an empty crate with one reward sound.
    ///
    /// Identifier validation and uniqueness are the registry's job.
    #[must_use]
    pub fn new(identifier: impl Into<String>, title: impl Into<String>, sound: SoundCue) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            key: None,
            positions: BTreeSet::new(),
            reward_sounds: vec![Some(sound)],
            rewards: Vec::new(),
        }
    }

    /// The unique identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The current key, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&KeyDefinition<P>> {
        self.key.as_ref()
    }

    /// Positions this crate is placed at.
    #[must_use]
    pub const fn positions(&self) -> &BTreeSet<BlockPosition> {
        &self.positions
    }

    /// The reward pool in insertion order.
    #[must_use]
    pub fn rewards(&self) -> &[RewardDefinition<P>] {
        &self.rewards
    }

    /// Sounds played on reward; `None` slots are skipped.
    #[must_use]
    pub fn reward_sounds(&self) -> &[Option<SoundCue>] {
        &self.reward_sounds
    }

    /// Replaces the reward sounds.
    pub fn set_reward_sounds(&mut self, sounds: Vec<Option<SoundCue>>) {
        self.reward_sounds = sounds;
    }

    /// Renames the crate.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Returns true if an instance of this crate sits at `position`.
    #[must_use]
    pub fn has_location(&self, position: &BlockPosition) -> bool {
        self.positions.contains(position)
    }

    /// Inserts a position. Returns false if it was already present.
    ///
    /// Goes through the registry so the position index stays in sync.
    pub(crate) fn add_location(&mut self, position: BlockPosition) -> bool {
        self.positions.insert(position)
    }

    /// Registers `payload` as a reward with default weight and no commands.
    ///
    /// # Errors
    ///
    /// See [`Crate::add_reward_definition`].
    pub fn add_reward(&mut self, payload: P) -> CrateResult<&RewardDefinition<P>> {
        self.add_reward_definition(RewardDefinition::new(payload))
    }

    /// Appends a fully specified reward.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidWeight` if the reward's weight is invalid
    /// or would push the pool's total weight past `f64::MAX`.
    pub fn add_reward_definition(
        &mut self,
        reward: RewardDefinition<P>,
    ) -> CrateResult<&RewardDefinition<P>> {
        reward.validate()?;
        if !(total_weight(&self.rewards) + reward.weight()).is_finite() {
            return Err(CrateError::InvalidWeight(reward.weight()));
        }

        let idx = self.rewards.len();
        self.rewards.push(reward);
        Ok(&self.rewards[idx])
    }

    /// Removes the reward at `index`, keeping the order of the rest.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::RewardOutOfRange` if `index` is past the end.
    pub fn remove_reward(&mut self, index: usize) -> CrateResult<RewardDefinition<P>> {
        if index >= self.rewards.len() {
            return Err(CrateError::RewardOutOfRange {
                index,
                len: self.rewards.len(),
            });
        }
        Ok(self.rewards.remove(index))
    }

    /// Makes `payload` this crate's key, discarding any previous key.
    pub fn create_key(&mut self, payload: P) -> &KeyDefinition<P> {
        if self.key.is_some() {
            tracing::info!("Replacing key for crate '{}'", self.identifier);
        }
        self.key.insert(KeyDefinition::new(self.identifier.clone(), payload))
    }

    /// Checks a presented credential.
    ///
    /// A crate without a key accepts anything, including no credential.
    #[must_use]
    pub fn key_matches(&self, candidate: Option<&P>, policy: KeyMatchPolicy) -> bool {
        match (&self.key, candidate) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(key), Some(candidate)) => key.accepts(candidate, policy),
        }
    }

    /// Opens the crate for `requester`.
    ///
    /// The key is not checked here; callers gate on [`Crate::key_matches`].
    ///
    /// # Errors
    ///
    /// Returns `CrateError::EmptyRewardPool` before any side effect if the
    /// pool is empty.
    pub fn open<E, R>(
        &self,
        requester: &Requester,
        effects: &mut E,
        rng: &mut R,
    ) -> CrateResult<OpenOutcome<P>>
    where
        E: OpenEffects<P> + ?Sized,
        R: Rng + ?Sized,
    {
        if self.rewards.is_empty() {
            return Err(CrateError::EmptyRewardPool(self.identifier.clone()));
        }
        let Some((index, reward)) = choose_weighted(&self.rewards, rng) else {
            return Err(CrateError::EmptyRewardPool(self.identifier.clone()));
        };

        tracing::info!(
            "Crate '{}' opened by {}: reward #{} selected",
            self.identifier,
            requester.id,
            index
        );

        let mut failures = Vec::new();

        if let Err(error) = effects.deliver(requester, &reward.payload) {
            tracing::warn!("Crate '{}': {}", self.identifier, error);
            failures.push(EffectFailure {
                step: OpenStep::Deliver,
                error,
            });
        }

        for (i, command) in reward.commands.iter().enumerate() {
            if let Err(error) = effects.execute_command(command) {
                tracing::warn!("Crate '{}': {}", self.identifier, error);
                failures.push(EffectFailure {
                    step: OpenStep::Command(i),
                    error,
                });
            }
        }

        for (i, cue) in self.reward_sounds.iter().enumerate() {
            let Some(cue) = cue else { continue };
            if let Err(error) = effects.play_sound(cue, &requester.location) {
                tracing::warn!("Crate '{}': {}", self.identifier, error);
                failures.push(EffectFailure {
                    step: OpenStep::Sound(i),
                    error,
                });
            }
        }

        Ok(OpenOutcome {
            index,
            reward: reward.clone(),
            failures,
        })
    }

    /// Checks invariants on a crate that bypassed the constructors.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidIdentifier` for an empty identifier or
    /// `CrateError::InvalidWeight` for a bad reward weight or a pool whose
    /// total weight is not finite.
    pub fn validate(&self) -> CrateResult<()> {
        if self.identifier.is_empty() {
            return Err(CrateError::InvalidIdentifier);
        }
        self.rewards.iter().try_for_each(RewardDefinition::validate)?;

        let total = total_weight(&self.rewards);
        if !total.is_finite() {
            return Err(CrateError::InvalidWeight(total));
        }
        Ok(())
    }
}

fn total_weight<P>(rewards: &[RewardDefinition<P>]) -> f64 {
    rewards.iter().map(RewardDefinition::weight).sum()
}
