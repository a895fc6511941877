//! # Item Payloads
//!
//! The host platform owns the real item representation. The crate system
//! only needs to store it, serialize it and compare two of them while
//! ignoring quantity, so that is all [`ItemPayload`] asks for.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How strictly a presented credential is compared to a crate key.
///
/// Quantity is never part of the comparison: a single unit of the key item
/// is enough.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMatchPolicy {
    /// Item type only.
    Material,
    /// Item type and enchantment-like modifiers. Decorative text is ignored.
    #[default]
    Enchantments,
    /// Everything except quantity, including display name and lore.
    Similar,
}

/// Capability interface for item descriptions stored in crates.
pub trait ItemPayload: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync {
    /// Number of units this description represents.
    fn quantity(&self) -> u32;

    /// Compares two descriptions under `policy`, ignoring quantity.
    fn matches(&self, other: &Self, policy: KeyMatchPolicy) -> bool;
}

/// Bundled item description modelled on block-game item stacks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Namespaced item type, e.g. `minecraft:tripwire_hook`.
    pub material: String,
    /// Stack size.
    pub amount: u32,
    /// Custom display name, if renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Lore lines shown under the name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<String>,
    /// Enchantment id to level.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantments: BTreeMap<String, u16>,
}

impl ItemStack {
    /// Creates a plain stack with no metadata.
    #[must_use]
    pub fn new(material: impl Into<String>, amount: u32) -> Self {
        Self {
            material: material.into(),
            amount,
            display_name: None,
            lore: Vec::new(),
            enchantments: BTreeMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Appends a lore line.
    #[must_use]
    pub fn with_lore(mut self, line: impl Into<String>) -> Self {
        self.lore.push(line.into());
        self
    }

    /// Adds or replaces an enchantment.
    #[must_use]
    pub fn with_enchantment(mut self, id: impl Into<String>, level: u16) -> Self {
        self.enchantments.insert(id.into(), level);
        self
    }

    /// Returns true if this stack holds nothing.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.material.is_empty()
    }
}

impl ItemPayload for ItemStack {
    fn quantity(&self) -> u32 {
        self.amount
    }

    fn matches(&self, other: &Self, policy: KeyMatchPolicy) -> bool {
        if self.material != other.material {
            return false;
        }

        match policy {
            KeyMatchPolicy::Material => true,
            KeyMatchPolicy::Enchantments => self.enchantments == other.enchantments,
            KeyMatchPolicy::Similar => {
                self.enchantments == other.enchantments
                    && self.display_name == other.display_name
                    && self.lore == other.lore
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_item() -> ItemStack {
        ItemStack::new("minecraft:tripwire_hook", 3)
            .with_display_name("Vote Key")
            .with_enchantment("minecraft:unbreaking", 1)
    }

    #[test]
    fn test_quantity_never_compared() {
        let mut single = key_item();
        single.amount = 1;

        for policy in [
            KeyMatchPolicy::Material,
            KeyMatchPolicy::Enchantments,
            KeyMatchPolicy::Similar,
        ] {
            assert!(key_item().matches(&single, policy), "{policy:?}");
        }
    }

    #[test]
    fn test_material_mismatch_never_matches() {
        let other = ItemStack::new("minecraft:stick", 3);
        assert!(!key_item().matches(&other, KeyMatchPolicy::Material));
    }

    #[test]
    fn test_enchantments_policy_ignores_decorative_text() {
        let renamed = key_item().with_display_name("Shiny").with_lore("Found in a cave");
        assert!(key_item().matches(&renamed, KeyMatchPolicy::Enchantments));
        assert!(!key_item().matches(&renamed, KeyMatchPolicy::Similar));
    }

    #[test]
    fn test_enchantments_policy_checks_modifiers() {
        let plain = ItemStack::new("minecraft:tripwire_hook", 1);
        assert!(!key_item().matches(&plain, KeyMatchPolicy::Enchantments));
        assert!(key_item().matches(&plain, KeyMatchPolicy::Material));
    }

    #[test]
    fn test_policy_parses_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: KeyMatchPolicy,
        }

        let parsed: Wrapper = toml::from_str("policy = \"similar\"").unwrap();
        assert_eq!(parsed.policy, KeyMatchPolicy::Similar);
    }

    #[test]
    fn test_empty_stack() {
        assert!(ItemStack::new("minecraft:air", 0).is_empty());
        assert!(!ItemStack::new("minecraft:diamond", 1).is_empty());
    }
}
