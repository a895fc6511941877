//! Crate key definitions.

use serde::{Deserialize, Serialize};

use crate::item::{ItemPayload, KeyMatchPolicy};

/// The credential required to open a crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyDefinition<P> {
    /// Identifier of the crate this key opens.
    pub crate_id: String,
    /// Item the credential is compared against.
    pub payload: P,
}

impl<P: ItemPayload> KeyDefinition<P> {
    /// Binds `payload` as the key for `crate_id`.
    #[must_use]
    pub fn new(crate_id: impl Into<String>, payload: P) -> Self {
        Self {
            crate_id: crate_id.into(),
            payload,
        }
    }

    /// Returns true if `candidate` is similar enough to the key item.
    ///
    /// One unit suffices; stack size is never compared.
    #[must_use]
    pub fn accepts(&self, candidate: &P, policy: KeyMatchPolicy) -> bool {
        self.payload.matches(candidate, policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemStack;

    #[test]
    fn test_accepts_single_unit_of_larger_stack() {
        let key = KeyDefinition::new("vote", ItemStack::new("minecraft:tripwire_hook", 3));
        let one = ItemStack::new("minecraft:tripwire_hook", 1);
        let wrong = ItemStack::new("minecraft:lever", 1);

        assert!(key.accepts(&one, KeyMatchPolicy::default()));
        assert!(!key.accepts(&wrong, KeyMatchPolicy::default()));
    }
}
