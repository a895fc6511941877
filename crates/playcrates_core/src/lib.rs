//! # PlayCrates Core
//!
//! Data model and reward transaction for key-locked loot crates.
//!
//! ## Design Principles
//!
//! 1. **Host agnostic** - items, effects and positions reach the core through
//!    narrow traits, never concrete platform types
//! 2. **Explicit ownership** - one [`CrateRegistry`] per process, constructed
//!    and passed around, no globals
//! 3. **Best-effort effects** - opening a crate delivers, runs commands and
//!    plays sounds as independent steps without rollback
//!
//! ## Example
//!
//! ```rust,ignore
//! use playcrates_core::{CrateRegistry, ItemStack, KeyMatchPolicy, Requester};
//!
//! let mut registry = CrateRegistry::<ItemStack>::new();
//! let vote = registry.create("vote", "Vote Crate")?;
//! vote.add_reward(ItemStack::new("minecraft:diamond", 3))?;
//! vote.create_key(ItemStack::new("minecraft:tripwire_hook", 1));
//!
//! let vote = registry.find("vote").unwrap();
//! if vote.key_matches(Some(&held), KeyMatchPolicy::default()) {
//!     let outcome = vote.open(&requester, &mut host_effects, &mut rng)?;
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod item;
pub mod key;
pub mod loot_crate;
pub mod position;
pub mod registry;
pub mod reward;
pub mod selector;
pub mod sound;

pub use error::{CrateError, CrateResult, EffectError, EffectResult};
pub use item::{ItemPayload, ItemStack, KeyMatchPolicy};
pub use key::KeyDefinition;
pub use loot_crate::{Crate, EffectFailure, OpenEffects, OpenOutcome, OpenStep, Requester};
pub use position::BlockPosition;
pub use registry::CrateRegistry;
pub use reward::{RewardDefinition, DEFAULT_WEIGHT};
pub use selector::{choose_weighted, run_statistics, selection_chances, SelectionStatistics, Weighted};
pub use sound::{SoundCue, DEFAULT_REWARD_SOUND};
