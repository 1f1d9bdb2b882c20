//! Registry of users currently inside a game or robbery.
//!
//! Entering hands out a [`SessionGuard`]; the user stays registered until the
//! guard is dropped. Dropping happens on every exit path (normal return, `?`,
//! panic unwinding, or a timed-out future being cancelled), so a user is
//! removed exactly once.

use crate::errors::{Error, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Identifier of a Discord user.
pub type UserId = u64;

/// Shared set of busy users. Cloning shares the same set.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<HashSet<UserId>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<UserId>> {
        // The set stays consistent even if a holder panicked.
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `user`, failing with [`Error::SessionBusy`] if already present.
    pub fn try_enter(&self, user: UserId) -> Result<SessionGuard> {
        if !self.lock().insert(user) {
            debug!(user, "session busy");
            return Err(Error::SessionBusy { user });
        }
        trace!(user, "session entered");
        Ok(SessionGuard {
            registry: self.clone(),
            user,
        })
    }

    /// Whether `user` is currently busy.
    #[must_use]
    pub fn is_active(&self, user: UserId) -> bool {
        self.lock().contains(&user)
    }

    /// Number of busy users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nobody is busy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn leave(&self, user: UserId) {
        self.lock().remove(&user);
        trace!(user, "session left");
    }
}

/// Keeps a user registered as busy until dropped.
#[derive(Debug)]
#[must_use = "the session ends as soon as the guard is dropped"]
pub struct SessionGuard {
    registry: SessionRegistry,
    user: UserId,
}

impl SessionGuard {
    /// The registered user.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.leave(self.user);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_second_entry_is_rejected() -> Result<()> {
        let registry = SessionRegistry::new();
        let guard = registry.try_enter(7)?;
        assert!(registry.is_active(7));
        assert!(matches!(
            registry.try_enter(7),
            Err(Error::SessionBusy { user: 7 })
        ));

        // Other users are unaffected
        let other = registry.try_enter(8)?;
        assert_eq!(registry.len(), 2);

        drop(guard);
        drop(other);
        assert!(registry.is_empty());
        Ok(())
    }

    #[test]
    fn test_guard_released_on_error_path() {
        fn failing_game(registry: &SessionRegistry) -> Result<()> {
            let _guard = registry.try_enter(1)?;
            Err(Error::DeckExhausted)
        }

        let registry = SessionRegistry::new();
        assert!(failing_game(&registry).is_err());
        assert!(!registry.is_active(1));
        assert!(registry.try_enter(1).is_ok());
    }

    #[test]
    fn test_guard_released_on_panic() {
        let registry = SessionRegistry::new();
        let shared = registry.clone();
        let result = std::thread::spawn(move || {
            let _guard = shared.try_enter(3).unwrap();
            panic!("game crashed");
        })
        .join();
        assert!(result.is_err());
        assert!(!registry.is_active(3));
    }

    #[test]
    fn test_concurrent_entry_admits_one() {
        let registry = SessionRegistry::new();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.try_enter(42).ok().map(std::mem::forget))
            })
            .collect();
        let admitted = handles
            .into_iter()
            .filter_map(|h| h.join().ok().flatten())
            .count();
        assert_eq!(admitted, 1);
        assert!(registry.is_active(42));
    }
}
