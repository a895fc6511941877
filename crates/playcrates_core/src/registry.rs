//! # Crate Registry
//!
//! Owns every [`Crate`] in the process, keyed by identifier, plus a derived
//! index from placed positions back to their crate.
//!
//! The registry is plain data: it is constructed explicitly and handed to
//! whoever needs it. Callers that share it across threads wrap it in a lock.

use std::collections::{BTreeMap, HashMap};

use crate::error::{CrateError, CrateResult};
use crate::item::ItemPayload;
use crate::loot_crate::Crate;
use crate::position::BlockPosition;
use crate::sound::SoundCue;

/// All crates known to the process.
#[derive(Clone, Debug)]
pub struct CrateRegistry<P> {
    /// Crates by identifier. Ordered so listings and saves are stable.
    crates: BTreeMap<String, Crate<P>>,
    /// Placed position to owning crate identifier.
    positions: HashMap<BlockPosition, String>,
    /// Sound given to newly created crates.
    default_sound: SoundCue,
}

impl<P: ItemPayload> CrateRegistry<P> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_sound(SoundCue::default())
    }

    /// Creates an empty registry whose new crates get `sound` on reward.
    #[must_use]
    pub fn with_default_sound(sound: SoundCue) -> Self {
        Self {
            crates: BTreeMap::new(),
            positions: HashMap::new(),
            default_sound: sound,
        }
    }

    /// Builds a registry from previously persisted crates.
    ///
    /// # Errors
    ///
    /// Fails on the first crate that [`CrateRegistry::insert`] rejects.
    pub fn from_crates(
        crates: impl IntoIterator<Item = Crate<P>>,
        sound: SoundCue,
    ) -> CrateResult<Self> {
        let mut registry = Self::with_default_sound(sound);
        for loaded in crates {
            registry.insert(loaded)?;
        }
        Ok(registry)
    }

    /// Number of crates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.crates.len()
    }

    /// True if no crates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.crates.is_empty()
    }

    /// Creates and registers a new crate.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidIdentifier` for an empty identifier and
    /// `CrateError::DuplicateIdentifier` if it is already taken.
    pub fn create(&mut self, identifier: &str, title: &str) -> CrateResult<&mut Crate<P>> {
        if identifier.is_empty() {
            return Err(CrateError::InvalidIdentifier);
        }
        if self.crates.contains_key(identifier) {
            return Err(CrateError::DuplicateIdentifier(identifier.to_string()));
        }

        tracing::info!("Created crate '{}' ({})", identifier, title);

        let created = Crate::new(identifier, title, self.default_sound.clone());
        Ok(self.crates.entry(identifier.to_string()).or_insert(created))
    }

    /// Registers an already built crate, e.g. one loaded from disk.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::DuplicateIdentifier` if the identifier is taken,
    /// `CrateError::InvalidTargetPosition` if one of its positions already
    /// belongs to another crate, or the crate's own validation error.
    pub fn insert(&mut self, loaded: Crate<P>) -> CrateResult<()> {
        loaded.validate()?;

        let identifier = loaded.identifier().to_string();
        if self.crates.contains_key(&identifier) {
            return Err(CrateError::DuplicateIdentifier(identifier));
        }

        if let Some(taken) = loaded
            .positions()
            .iter()
            .find(|p| self.positions.contains_key(*p))
        {
            return Err(CrateError::InvalidTargetPosition(format!(
                "{taken} already holds another crate"
            )));
        }

        for position in loaded.positions() {
            self.positions.insert(position.clone(), identifier.clone());
        }
        self.crates.insert(identifier, loaded);

        Ok(())
    }

    /// Looks up a crate by exact, case-sensitive identifier.
    #[must_use]
    pub fn find(&self, identifier: &str) -> Option<&Crate<P>> {
        self.crates.get(identifier)
    }

    /// Mutable lookup by identifier.
    ///
    /// Positions are not editable through this handle; use
    /// [`CrateRegistry::add_location`].
    pub fn find_mut(&mut self, identifier: &str) -> Option<&mut Crate<P>> {
        self.crates.get_mut(identifier)
    }

    /// Looks up the crate placed at `position`.
    #[must_use]
    pub fn find_by_position(&self, position: &BlockPosition) -> Option<&Crate<P>> {
        let identifier = self.positions.get(position)?;
        self.crates.get(identifier)
    }

    /// Places crate `identifier` at `position`.
    ///
    /// Returns true if the position was newly added, false if the crate was
    /// already there.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidCrateReference` for an unknown identifier
    /// and `CrateError::InvalidTargetPosition` if another crate already
    /// occupies `position`.
    pub fn add_location(&mut self, identifier: &str, position: BlockPosition) -> CrateResult<bool> {
        if let Some(owner) = self.positions.get(&position) {
            if owner != identifier {
                return Err(CrateError::InvalidTargetPosition(format!(
                    "{position} already holds crate '{owner}'"
                )));
            }
        }

        let target = self
            .crates
            .get_mut(identifier)
            .ok_or_else(|| CrateError::InvalidCrateReference(format!("identifier '{identifier}'")))?;

        let added = target.add_location(position.clone());
        if added {
            tracing::info!("Crate '{}' placed at {}", identifier, position);
            self.positions.insert(position, identifier.to_string());
        }

        Ok(added)
    }

    /// Iterates crates in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Crate<P>> {
        self.crates.values()
    }

    /// Registered identifiers in order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.crates.keys().map(String::as_str)
    }
}

impl<P: ItemPayload> Default for CrateRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStack;

    fn registry() -> CrateRegistry<ItemStack> {
        CrateRegistry::new()
    }

    #[test]
    fn test_create_and_find() {
        let mut reg = registry();
        reg.create("vote", "Vote Crate").unwrap();

        let found = reg.find("vote").unwrap();
        assert_eq!(found.title, "Vote Crate");
        assert_eq!(found.reward_sounds().len(), 1);
        assert!(reg.find("Vote").is_none());
    }

    #[test]
    fn test_duplicate_identifier_keeps_first() {
        let mut reg = registry();
        reg.create("c1", "Title").unwrap();

        let err = reg.create("c1", "Other").unwrap_err();
        assert_eq!(err, CrateError::DuplicateIdentifier("c1".to_string()));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("c1").unwrap().title, "Title");
    }

    #[test]
    fn test_empty_identifier_rejected() {
        assert_eq!(
            registry().create("", "Nothing").unwrap_err(),
            CrateError::InvalidIdentifier
        );
    }

    #[test]
    fn test_find_by_position() {
        let mut reg = registry();
        reg.create("vote", "Vote").unwrap();
        let p = BlockPosition::new("world", 5, 70, 5);

        assert!(reg.add_location("vote", p.clone()).unwrap());
        assert!(!reg.add_location("vote", p.clone()).unwrap());

        assert_eq!(reg.find("vote").unwrap().positions().len(), 1);
        assert_eq!(
            reg.find_by_position(&BlockPosition::new("world", 5, 70, 5))
                .map(Crate::identifier),
            Some("vote")
        );
        assert!(reg
            .find_by_position(&BlockPosition::new("world_nether", 5, 70, 5))
            .is_none());
    }

    #[test]
    fn test_position_owned_by_one_crate() {
        let mut reg = registry();
        reg.create("a", "A").unwrap();
        reg.create("b", "B").unwrap();
        let p = BlockPosition::new("world", 0, 0, 0);

        reg.add_location("a", p.clone()).unwrap();
        assert!(matches!(
            reg.add_location("b", p.clone()),
            Err(CrateError::InvalidTargetPosition(_))
        ));
        assert_eq!(reg.find_by_position(&p).map(Crate::identifier), Some("a"));
    }

    #[test]
    fn test_add_location_unknown_crate() {
        let mut reg = registry();
        assert!(matches!(
            reg.add_location("ghost", BlockPosition::new("world", 0, 0, 0)),
            Err(CrateError::InvalidCrateReference(_))
        ));
    }

    #[test]
    fn test_from_crates_rebuilds_position_index() {
        let mut source = registry();
        source.create("vote", "Vote").unwrap();
        source
            .add_location("vote", BlockPosition::new("world", 1, 1, 1))
            .unwrap();

        let rebuilt =
            CrateRegistry::from_crates(source.iter().cloned(), SoundCue::default()).unwrap();

        assert_eq!(rebuilt.len(), 1);
        assert!(rebuilt
            .find_by_position(&BlockPosition::new("world", 1, 1, 1))
            .is_some());
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut reg = registry();
        reg.create("vote", "Vote").unwrap();
        let copy = reg.find("vote").unwrap().clone();

        assert!(matches!(
            reg.insert(copy),
            Err(CrateError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn test_identifiers_sorted() {
        let mut reg = registry();
        for id in ["zeta", "alpha", "mid"] {
            reg.create(id, id).unwrap();
        }
        let ids: Vec<_> = reg.identifiers().collect();
        assert_eq!(ids, ["alpha", "mid", "zeta"]);
    }
}
