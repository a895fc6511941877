//! # PlayCrates
//!
//! Key-locked loot crates for block-game servers.
//!
//! This crate wires [`playcrates_core`] to the outside world: settings from
//! TOML, a persistence store for crate definitions, and a thread-safe
//! service that the host's command handlers call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use playcrates::{CrateService, CrateTarget, Settings, TomlCrateStore};
//!
//! let settings = Settings::load("plugins/PlayCrates/config.toml")?;
//! let store = TomlCrateStore::new(&settings.data_file);
//! let service = CrateService::load(store, settings)?;
//!
//! // /crates addcrate vote Vote Crate
//! service.create_crate("vote", "Vote Crate")?;
//! // /crates addreward vote   (item in hand)
//! service.add_reward(CrateTarget::Id("vote"), held_item)?;
//! // right-click on a crate block
//! let outcome = service.open(CrateTarget::Position(&block), &player, Some(&held), &mut host)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod service;
pub mod settings;
pub mod store;

pub use playcrates_core::{
    BlockPosition, Crate, CrateError, CrateRegistry, CrateResult, EffectError, EffectResult,
    ItemPayload, ItemStack, KeyDefinition, KeyMatchPolicy, OpenEffects, OpenOutcome, Requester,
    RewardDefinition, SoundCue,
};
pub use service::{CratePreview, CrateService, CrateTarget, PositionProbe, RewardPreview};
pub use settings::Settings;
pub use store::{CrateStore, MemoryCrateStore, TomlCrateStore};
