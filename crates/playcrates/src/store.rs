//! # Crate Persistence
//!
//! The checkpoint every mutation ends with. The service hands the store a
//! full snapshot and the store writes all of it; there is no incremental
//! format and no recovery of half-written state beyond atomic replace.
//!
//! ## File Format
//!
//! ```toml
//! [[crates]]
//! identifier = "vote"
//! title = "Vote Crate"
//!
//! [[crates.positions]]
//! world = "world"
//! x = 10
//! y = 64
//! z = -3
//!
//! [[crates.reward_sounds]]
//! sound = "block.amethyst_block.chime"
//! volume = 1.0
//! pitch = 1.0
//!
//! [[crates.rewards]]
//! weight = 1.0
//! commands = ["eco give %player% 100"]
//!
//! [crates.rewards.payload]
//! material = "minecraft:diamond"
//! amount = 3
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use playcrates_core::{Crate, CrateError, CrateResult, ItemPayload};

/// Durable storage for all crate definitions.
pub trait CrateStore<P> {
    /// Loads every persisted crate. A store with nothing saved yet returns
    /// an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::Persistence` on I/O failure and
    /// `CrateError::InvalidConfig` on unreadable data.
    fn load_all(&self) -> CrateResult<Vec<Crate<P>>>;

    /// Replaces the persisted state with `crates`.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::Persistence` if the write fails.
    fn save_all(&self, crates: &[Crate<P>]) -> CrateResult<()>;
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "P: serde::de::DeserializeOwned"))]
struct CrateFile<P> {
    #[serde(default = "Vec::new")]
    crates: Vec<Crate<P>>,
}

#[derive(Serialize)]
struct CrateFileRef<'a, P> {
    crates: &'a [Crate<P>],
}

/// Stores all crates in one TOML document.
#[derive(Clone, Debug)]
pub struct TomlCrateStore {
    path: PathBuf,
}

impl TomlCrateStore {
    /// Creates a store backed by `path`. Nothing is read until
    /// [`CrateStore::load_all`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> CrateError {
    CrateError::Persistence(format!("{}: {e}", path.display()))
}

impl<P: ItemPayload> CrateStore<P> for TomlCrateStore {
    fn load_all(&self) -> CrateResult<Vec<Crate<P>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path).map_err(|e| io_error(&self.path, &e))?;
        let file: CrateFile<P> = toml::from_str(&text)
            .map_err(|e| CrateError::InvalidConfig(format!("{}: {e}", self.path.display())))?;

        tracing::info!("Loaded {} crates from {}", file.crates.len(), self.path.display());
        Ok(file.crates)
    }

    fn save_all(&self, crates: &[Crate<P>]) -> CrateResult<()> {
        let text = toml::to_string(&CrateFileRef { crates })
            .map_err(|e| CrateError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
        }

        // Write-then-rename so a crash never leaves a truncated file behind
        let temp = self.temp_path();
        fs::write(&temp, text).map_err(|e| io_error(&temp, &e))?;
        fs::rename(&temp, &self.path).map_err(|e| io_error(&self.path, &e))?;

        tracing::debug!("Saved {} crates to {}", crates.len(), self.path.display());
        Ok(())
    }
}

/// In-memory store for hosts that persist elsewhere, and for tests.
#[derive(Debug)]
pub struct MemoryCrateStore<P> {
    saved: Mutex<Vec<Crate<P>>>,
    saves: Mutex<u64>,
}

impl<P: ItemPayload> MemoryCrateStore<P> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_crates(Vec::new())
    }

    /// Creates a store that loads `crates`.
    #[must_use]
    pub fn with_crates(crates: Vec<Crate<P>>) -> Self {
        Self {
            saved: Mutex::new(crates),
            saves: Mutex::new(0),
        }
    }

    /// Number of completed `save_all` calls.
    #[must_use]
    pub fn save_count(&self) -> u64 {
        *self.saves.lock()
    }

    /// The last saved snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Crate<P>> {
        self.saved.lock().clone()
    }
}

impl<P: ItemPayload> Default for MemoryCrateStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ItemPayload> CrateStore<P> for MemoryCrateStore<P> {
    fn load_all(&self) -> CrateResult<Vec<Crate<P>>> {
        Ok(self.saved.lock().clone())
    }

    fn save_all(&self, crates: &[Crate<P>]) -> CrateResult<()> {
        *self.saved.lock() = crates.to_vec();
        *self.saves.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playcrates_core::{CrateRegistry, ItemStack, RewardDefinition};

    fn temp_store_path() -> PathBuf {
        let id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("test_playcrates_{id}.toml"))
    }

    fn sample_crates() -> Vec<Crate<ItemStack>> {
        let mut registry = CrateRegistry::new();
        let vote = registry.create("vote", "Vote Crate").unwrap();
        vote.add_reward_definition(
            RewardDefinition::new(ItemStack::new("minecraft:diamond", 3))
                .with_weight(2.5)
                .unwrap()
                .with_command("eco give %player% 100"),
        )
        .unwrap();
        vote.add_reward(ItemStack::new("minecraft:emerald", 1).with_display_name("Lucky"))
            .unwrap();
        vote.create_key(
            ItemStack::new("minecraft:tripwire_hook", 1).with_enchantment("minecraft:luck", 1),
        );
        registry.create("daily", "Daily Crate").unwrap();
        registry.iter().cloned().collect()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let store = TomlCrateStore::new(temp_store_path());
        let loaded: Vec<Crate<ItemStack>> = store.load_all().unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = temp_store_path();
        let store = TomlCrateStore::new(&path);
        let crates = sample_crates();

        store.save_all(&crates).unwrap();
        let loaded: Vec<Crate<ItemStack>> = store.load_all().unwrap();

        assert_eq!(loaded, crates);
        assert!(!store.temp_path().exists());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupt_file_is_config_error() {
        let path = temp_store_path();
        fs::write(&path, "[[crates]]\ntitle = 12").unwrap();

        let result: CrateResult<Vec<Crate<ItemStack>>> = TomlCrateStore::new(&path).load_all();
        assert!(matches!(result, Err(CrateError::InvalidConfig(_))));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_memory_store_counts_saves() {
        let store = MemoryCrateStore::new();
        store.save_all(&sample_crates()).unwrap();
        store.save_all(&sample_crates()).unwrap();

        assert_eq!(store.save_count(), 2);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn test_load_hand_written_file() {
        let path = temp_store_path();
        fs::write(
            &path,
            r#"
            [[crates]]
            identifier = "vote"
            title = "Vote Crate"

            [crates.key]
            crate_id = "vote"

            [crates.key.payload]
            material = "minecraft:tripwire_hook"
            amount = 1

            [[crates.rewards]]
            commands = ["eco give %player% 100"]

            [crates.rewards.payload]
            material = "minecraft:diamond"
            amount = 3
            "#,
        )
        .unwrap();

        let loaded: Vec<Crate<ItemStack>> = TomlCrateStore::new(&path).load_all().unwrap();

        assert_eq!(loaded.len(), 1);
        let vote = &loaded[0];
        assert_eq!(vote.reward_sounds(), &[Some(playcrates_core::SoundCue::default())]);
        assert_eq!(vote.rewards()[0].payload.amount, 3);
        assert!((vote.rewards()[0].weight() - 1.0).abs() < f64::EPSILON);
        assert_eq!(
            vote.key().map(|k| k.payload.material.as_str()),
            Some("minecraft:tripwire_hook")
        );

        fs::remove_file(&path).ok();
    }
}
