//! # Crate Service
//!
//! The API a host's command and interaction handlers call. It owns the
//! registry behind a lock, resolves crates by identifier or by targeted
//! position, and runs the durability checkpoint after every mutation.
//!
//! ## Admin Flow
//!
//! ```text
//! create_crate / add_reward / add_location / set_key / set_title
//!   -> write lock, mutate registry, release
//!   -> checkpoint: snapshot under read lock, store.save_all(snapshot)
//! ```
//!
//! ## Player Flow
//!
//! ```text
//! open(target, requester, held item)
//!   -> read lock, resolve crate, key check, clone crate, release
//!   -> Crate::open on the clone (host effects run without any lock held)
//! ```

use parking_lot::{Mutex, RwLock};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::fmt;

use playcrates_core::{
    selection_chances, BlockPosition, Crate, CrateError, CrateRegistry, CrateResult, ItemPayload,
    KeyDefinition, OpenEffects, OpenOutcome, Requester, RewardDefinition,
};

use crate::settings::Settings;
use crate::store::CrateStore;

/// How a command addressed a crate: by name, or by the block looked at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrateTarget<'a> {
    /// Explicit identifier.
    Id(&'a str),
    /// Position of the targeted block.
    Position(&'a BlockPosition),
}

impl fmt::Display for CrateTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "identifier '{id}'"),
            Self::Position(position) => write!(f, "position {position}"),
        }
    }
}

/// Decides whether a world position may host a crate instance.
pub trait PositionProbe {
    /// False for air, fluids, or anything else the host rejects.
    fn is_eligible(&self, position: &BlockPosition) -> bool;
}

impl<F: Fn(&BlockPosition) -> bool> PositionProbe for F {
    fn is_eligible(&self, position: &BlockPosition) -> bool {
        self(position)
    }
}

/// One reward as shown in a preview menu.
#[derive(Clone, Debug, PartialEq)]
pub struct RewardPreview<P> {
    /// The reward.
    pub reward: RewardDefinition<P>,
    /// Chance of being selected, in `[0, 1]`.
    pub chance: f64,
}

/// Read-only view of a crate for preview menus.
#[derive(Clone, Debug, PartialEq)]
pub struct CratePreview<P> {
    /// Crate identifier.
    pub identifier: String,
    /// Display title.
    pub title: String,
    /// Rewards in pool order.
    pub rewards: Vec<RewardPreview<P>>,
}

/// Thread-safe facade over the registry and its store.
pub struct CrateService<P, S> {
    registry: RwLock<CrateRegistry<P>>,
    store: S,
    settings: Settings,
    rng: Mutex<ChaCha20Rng>,
    /// Serializes checkpoints so snapshots reach the store in order.
    checkpoint_lock: Mutex<()>,
}

impl<P: ItemPayload, S: CrateStore<P>> CrateService<P, S> {
    /// Loads all crates from `store` and seeds the RNG from the OS.
    ///
    /// # Errors
    ///
    /// Propagates store errors and rejects invalid persisted crates.
    pub fn load(store: S, settings: Settings) -> CrateResult<Self> {
        Self::with_rng(store, settings, ChaCha20Rng::from_entropy())
    }

    /// Like [`CrateService::load`] with a fixed seed, for reproducible runs.
    ///
    /// # Errors
    ///
    /// Propagates store errors and rejects invalid persisted crates.
    pub fn with_seed(store: S, settings: Settings, seed: u64) -> CrateResult<Self> {
        Self::with_rng(store, settings, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(store: S, settings: Settings, rng: ChaCha20Rng) -> CrateResult<Self> {
        let loaded = store.load_all()?;
        let registry = CrateRegistry::from_crates(loaded, settings.default_sound.clone())?;

        tracing::info!("Crate service ready with {} crates", registry.len());

        Ok(Self {
            registry: RwLock::new(registry),
            store,
            settings,
            rng: Mutex::new(rng),
            checkpoint_lock: Mutex::new(()),
        })
    }

    /// Active settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Identifiers of all crates, sorted. Used for command suggestions.
    pub fn crate_ids(&self) -> Vec<String> {
        self.registry.read().identifiers().map(str::to_string).collect()
    }

    /// Returns a copy of the crate `target` resolves to.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` if nothing matches.
    pub fn get(&self, target: CrateTarget<'_>) -> CrateResult<Crate<P>> {
        let registry = self.registry.read();
        resolve(&registry, target).cloned()
    }

    /// Creates a crate and persists.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::DuplicateIdentifier` if the identifier is
    /// taken, or `CrateError::Persistence` if the checkpoint fails.
    pub fn create_crate(&self, identifier: &str, title: &str) -> CrateResult<()> {
        self.registry.write().create(identifier, title)?;
        self.checkpoint()
    }

    /// Renames a crate and persists.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target or
    /// `CrateError::Persistence` if the checkpoint fails.
    pub fn set_title(&self, target: CrateTarget<'_>, title: &str) -> CrateResult<()> {
        self.mutate(target, |c| c.set_title(title))?;
        self.checkpoint()
    }

    /// Adds `payload` as a reward with the configured default weight and
    /// persists.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target,
    /// `CrateError::InvalidWeight` if the pool's total weight would overflow,
    /// or `CrateError::Persistence` if the checkpoint fails.
    pub fn add_reward(
        &self,
        target: CrateTarget<'_>,
        payload: P,
    ) -> CrateResult<RewardDefinition<P>> {
        let reward =
            RewardDefinition::new(payload).with_weight(self.settings.default_reward_weight)?;
        let added = self.mutate(target, |c| c.add_reward_definition(reward).cloned())??;
        self.checkpoint()?;
        Ok(added)
    }

    /// Removes the reward at `index` and persists.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target,
    /// `CrateError::RewardOutOfRange` for a bad index, or
    /// `CrateError::Persistence` if the checkpoint fails.
    pub fn remove_reward(
        &self,
        target: CrateTarget<'_>,
        index: usize,
    ) -> CrateResult<RewardDefinition<P>> {
        let removed = self.mutate(target, |c| c.remove_reward(index))??;
        self.checkpoint()?;
        Ok(removed)
    }

    /// Places crate `identifier` at `position` and persists.
    ///
    /// Returns false if the crate was already at `position`.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidTargetPosition` if `probe` rejects the
    /// position or another crate holds it, `CrateError::InvalidCrateReference`
    /// for an unknown identifier, or `CrateError::Persistence` if the
    /// checkpoint fails.
    pub fn add_location<Q>(
        &self,
        identifier: &str,
        position: BlockPosition,
        probe: &Q,
    ) -> CrateResult<bool>
    where
        Q: PositionProbe + ?Sized,
    {
        if !probe.is_eligible(&position) {
            return Err(CrateError::InvalidTargetPosition(format!(
                "{position} cannot hold a crate"
            )));
        }

        let added = self.registry.write().add_location(identifier, position)?;
        self.checkpoint()?;
        Ok(added)
    }

    /// Makes `payload` the crate's key and persists.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target or
    /// `CrateError::Persistence` if the checkpoint fails.
    pub fn set_key(&self, target: CrateTarget<'_>, payload: P) -> CrateResult<KeyDefinition<P>> {
        let key = self.mutate(target, |c| c.create_key(payload).clone())?;
        self.checkpoint()?;
        Ok(key)
    }

    /// Returns a copy of the crate's key item for the host to hand out.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target or
    /// `CrateError::MissingKey` if the crate has no key.
    pub fn give_key(&self, target: CrateTarget<'_>) -> CrateResult<P> {
        let registry = self.registry.read();
        let found = resolve(&registry, target)?;
        found
            .key()
            .map(|key| key.payload.clone())
            .ok_or_else(|| CrateError::MissingKey(found.identifier().to_string()))
    }

    /// Opens a crate for `requester`, who presents `held` as credential.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target,
    /// `CrateError::InvalidCredential` if `held` does not match the key, or
    /// `CrateError::EmptyRewardPool` if there is nothing to give.
    pub fn open<E>(
        &self,
        target: CrateTarget<'_>,
        requester: &Requester,
        held: Option<&P>,
        effects: &mut E,
    ) -> CrateResult<OpenOutcome<P>>
    where
        E: OpenEffects<P> + ?Sized,
    {
        let snapshot = {
            let registry = self.registry.read();
            let found = resolve(&registry, target)?;
            if !found.key_matches(held, self.settings.key_match_policy) {
                tracing::debug!(
                    "{} presented a non-matching key for '{}'",
                    requester.id,
                    found.identifier()
                );
                return Err(CrateError::InvalidCredential(found.identifier().to_string()));
            }
            found.clone()
        };

        // Child generator so no lock is held while host effects run
        let mut rng = ChaCha20Rng::seed_from_u64(self.rng.lock().gen());
        snapshot.open(requester, effects, &mut rng)
    }

    /// Title and rewards of a crate with each reward's selection chance.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown target.
    pub fn preview(&self, target: CrateTarget<'_>) -> CrateResult<CratePreview<P>> {
        let registry = self.registry.read();
        let found = resolve(&registry, target)?;

        let chances = selection_chances(found.rewards());
        let rewards = found
            .rewards()
            .iter()
            .zip(chances)
            .map(|(reward, chance)| RewardPreview {
                reward: reward.clone(),
                chance,
            })
            .collect();

        Ok(CratePreview {
            identifier: found.identifier().to_string(),
            title: found.title.clone(),
            rewards,
        })
    }

    /// Writes the current state of every crate to the store.
    ///
    /// # Errors
    ///
    /// Returns the store's error. In-memory state is kept either way.
    pub fn checkpoint(&self) -> CrateResult<()> {
        let _ordered = self.checkpoint_lock.lock();
        let snapshot: Vec<Crate<P>> = self.registry.read().iter().cloned().collect();

        self.store.save_all(&snapshot).map_err(|e| {
            tracing::warn!("Checkpoint of {} crates failed: {}", snapshot.len(), e);
            e
        })
    }

    /// Applies `f` to the crate `target` resolves to, under the write lock.
    fn mutate<T>(
        &self,
        target: CrateTarget<'_>,
        f: impl FnOnce(&mut Crate<P>) -> T,
    ) -> CrateResult<T> {
        let mut registry = self.registry.write();
        let identifier = resolve(&registry, target)?.identifier().to_string();
        registry
            .find_mut(&identifier)
            .map(f)
            .ok_or_else(|| CrateError::InvalidCrateReference(target.to_string()))
    }
}

fn resolve<'r, P: ItemPayload>(
    registry: &'r CrateRegistry<P>,
    target: CrateTarget<'_>,
) -> CrateResult<&'r Crate<P>> {
    let found = match target {
        CrateTarget::Id(identifier) => registry.find(identifier),
        CrateTarget::Position(position) => registry.find_by_position(position),
    };

    found.ok_or_else(|| {
        tracing::debug!("No crate for {}", target);
        CrateError::InvalidCrateReference(target.to_string())
    })
}
