//! Team access gate.
//!
//! A PIN keeps casual visitors out of the team commands. It is not a
//! security boundary: the PIN lives in the same device-local store as the
//! data it guards, and wrong attempts are neither counted nor delayed.

use tracing::{info, warn};

use crate::config::DEFAULT_TEAM_PIN;
use crate::error::{Error, Result};
use crate::store::{keys, KeyValueStore};

const UNLOCKED: &str = "true";

/// Access to the stored PIN and unlocked flag.
#[derive(Debug)]
pub struct AccessGate<'a, S: ?Sized> {
    store: &'a S,
    default_pin: &'a str,
}

impl<'a, S: KeyValueStore + ?Sized> AccessGate<'a, S> {
    /// Create a gate over `store` with the built-in default PIN.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            default_pin: DEFAULT_TEAM_PIN,
        }
    }

    /// Use `pin` when no PIN has been stored on this device.
    #[must_use]
    pub fn with_default_pin(mut self, pin: &'a str) -> Self {
        self.default_pin = pin;
        self
    }

    /// Whether the team area is unlocked.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn is_unlocked(&self) -> Result<bool> {
        Ok(self.store.get(keys::TEAM_UNLOCKED)?.as_deref() == Some(UNLOCKED))
    }

    /// Fail with [`Error::Locked`] unless the team area is unlocked.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Locked`] when locked, or an error if the store
    /// cannot be read.
    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.is_unlocked()? {
            Ok(())
        } else {
            Err(Error::Locked)
        }
    }

    /// The PIN currently accepted: the stored one, or the default when none
    /// (or a blank one) is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn pin(&self) -> Result<String> {
        let stored = self.store.get(keys::TEAM_PIN)?;
        Ok(stored
            .filter(|pin| !pin.trim().is_empty())
            .unwrap_or_else(|| self.default_pin.to_string()))
    }

    /// Try to unlock with `attempt`. Returns whether it matched.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn unlock(&self, attempt: &str) -> Result<bool> {
        if attempt.trim() != self.pin()? {
            warn!("Rejected team PIN attempt");
            return Ok(false);
        }

        self.store.set(keys::TEAM_UNLOCKED, UNLOCKED)?;
        info!("Team area unlocked");
        Ok(true)
    }

    /// Lock the team area. The PIN is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn lock(&self) -> Result<()> {
        self.store.remove(keys::TEAM_UNLOCKED)?;
        info!("Team area locked");
        Ok(())
    }

    /// Replace the PIN.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank PIN, or an error if the store
    /// cannot be written.
    pub fn set_pin(&self, pin: &str) -> Result<()> {
        let pin = pin.trim();
        if pin.is_empty() {
            return Err(Error::invalid("pin", "must not be blank"));
        }

        self.store.set(keys::TEAM_PIN, pin)?;
        info!("Team PIN changed");
        Ok(())
    }

    /// Forget the stored PIN and lock the team area.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn reset(&self) -> Result<()> {
        self.store.remove(keys::TEAM_UNLOCKED)?;
        self.store.remove(keys::TEAM_PIN)?;
        info!("Team access reset to the default PIN");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_locked_by_default() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);
        assert!(!gate.is_unlocked().unwrap());
        assert!(matches!(gate.ensure_unlocked(), Err(Error::Locked)));
    }

    #[test]
    fn test_unlock_with_default_pin() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);

        assert!(gate.unlock("1234").unwrap());
        assert!(gate.is_unlocked().unwrap());
        assert!(gate.ensure_unlocked().is_ok());
    }

    #[test]
    fn test_unlock_trims_attempt() {
        let store = MemoryStore::new();
        assert!(AccessGate::new(&store).unlock(" 1234 ").unwrap());
    }

    #[test]
    fn test_wrong_pin_stays_locked() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);

        assert!(!gate.unlock("0000").unwrap());
        assert!(!gate.is_unlocked().unwrap());
        // No lockout after failures.
        assert!(!gate.unlock("1111").unwrap());
        assert!(gate.unlock("1234").unwrap());
    }

    #[test]
    fn test_custom_pin_replaces_default() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);

        gate.set_pin("4321").unwrap();
        assert!(!gate.unlock("1234").unwrap());
        assert!(gate.unlock("4321").unwrap());
    }

    #[test]
    fn test_configured_default_pin() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store).with_default_pin("9999");

        assert!(!gate.unlock("1234").unwrap());
        assert!(gate.unlock("9999").unwrap());
    }

    #[test]
    fn test_blank_stored_pin_falls_back_to_default() {
        let store = MemoryStore::new();
        store.set(keys::TEAM_PIN, "  ").unwrap();
        let gate = AccessGate::new(&store);

        assert_eq!(gate.pin().unwrap(), "1234");
        assert!(gate.unlock("1234").unwrap());
    }

    #[test]
    fn test_set_blank_pin_rejected() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);

        assert!(gate.set_pin("   ").unwrap_err().is_validation());
        assert_eq!(gate.pin().unwrap(), "1234");
    }

    #[test]
    fn test_lock_keeps_pin() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);
        gate.set_pin("4321").unwrap();
        gate.unlock("4321").unwrap();

        gate.lock().unwrap();
        assert!(!gate.is_unlocked().unwrap());
        assert_eq!(gate.pin().unwrap(), "4321");
    }

    #[test]
    fn test_reset() {
        let store = MemoryStore::new();
        let gate = AccessGate::new(&store);
        gate.set_pin("4321").unwrap();
        gate.unlock("4321").unwrap();

        gate.reset().unwrap();
        assert!(!gate.is_unlocked().unwrap());
        assert!(gate.unlock("1234").unwrap());
    }

    #[test]
    fn test_flag_must_be_exactly_true() {
        let store = MemoryStore::new();
        store.set(keys::TEAM_UNLOCKED, "yes").unwrap();
        assert!(!AccessGate::new(&store).is_unlocked().unwrap());
    }
}
