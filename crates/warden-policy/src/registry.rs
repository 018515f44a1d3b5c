// registry.rs — In-memory policy registry with repository fallback.
//
// The registry is the one stateful piece of the crate: a name → Policy
// cache, optionally backed by an external repository collaborator. A miss
// in the cache falls through to the repository; a hit there is written
// back into the cache. `all()` returns only what is cached — it never
// triggers a bulk load.
//
// One registry-wide mutex serializes the load-and-insert read-modify-write.
// The repository call happens under the lock: contention is expected to be
// low, and holding the lock closes the double-load race outright.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::PolicyError;
use crate::policy::Policy;

/// The persistence collaborator the registry falls back to on a cache miss.
///
/// Supplied from outside the core; its storage mechanism is not our
/// concern. Calls may block on I/O; failures are propagated untouched.
pub trait PolicyRepository: Send + Sync {
    /// Whether a policy with this name exists in storage.
    fn has(&self, name: &str) -> bool;

    /// Load the policy, failing with [`PolicyError::PolicyNotFound`] if
    /// absent.
    fn get(&self, name: &str) -> Result<Policy, PolicyError>;
}

/// Name-keyed in-memory cache of policies, read-through to a repository.
pub struct PolicyRegistry {
    cache: Mutex<HashMap<String, Policy>>,
    repository: Option<Arc<dyn PolicyRepository>>,
}

impl PolicyRegistry {
    /// A registry with no repository — `get` on an unknown name fails.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            repository: None,
        }
    }

    /// A registry that falls back to `repository` on cache misses.
    pub fn with_repository(repository: Arc<dyn PolicyRepository>) -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            repository: Some(repository),
        }
    }

    /// Upsert a policy under its name. Re-adding a name overwrites.
    pub fn add(&self, policy: Policy) {
        let mut cache = self.lock_cache();
        cache.insert(policy.name().to_string(), policy);
    }

    /// Fetch a policy by name: cache first, then the repository (writing
    /// the loaded value back into the cache).
    pub fn get(&self, name: &str) -> Result<Policy, PolicyError> {
        let mut cache = self.lock_cache();
        if let Some(policy) = cache.get(name) {
            return Ok(policy.clone());
        }
        if let Some(repository) = &self.repository {
            if repository.has(name) {
                let policy = repository.get(name)?;
                tracing::debug!("policy '{}' loaded from repository", name);
                cache.insert(name.to_string(), policy.clone());
                return Ok(policy);
            }
        }
        Err(PolicyError::PolicyNotFound {
            name: name.to_string(),
        })
    }

    /// Whether a policy with this name is known to either tier.
    pub fn has(&self, name: &str) -> bool {
        if self.lock_cache().contains_key(name) {
            return true;
        }
        self.repository
            .as_ref()
            .is_some_and(|repository| repository.has(name))
    }

    /// The currently cached policies, sorted by name. Never consults the
    /// repository.
    pub fn all(&self) -> Vec<Policy> {
        let cache = self.lock_cache();
        let mut policies: Vec<Policy> = cache.values().cloned().collect();
        policies.sort_by(|a, b| a.name().cmp(b.name()));
        policies
    }

    // A poisoned lock only means another thread panicked mid-call; every
    // write is a single insert, so the map is still structurally valid.
    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, Policy>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
