use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::Rng;
use tracing::{debug, warn};

use blink_types::{AccessCode, ObjectId};

use crate::error::{RegistryError, RegistryResult};

/// Maximum number of random draws per allocation before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 32;

/// Default cap on simultaneously live codes: 90% of the code space.
pub const DEFAULT_CAPACITY: usize = AccessCode::SPACE / 10 * 9;

/// Live mapping from access codes to object ids.
#[derive(Debug)]
pub struct CodeRegistry {
    entries: DashMap<AccessCode, ObjectId>,
    capacity: usize,
}

impl CodeRegistry {
    /// Create a registry that refuses allocations once `capacity` codes are
    /// live. The capacity is clamped to the size of the code space.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.min(AccessCode::SPACE),
        }
    }

    /// Maximum number of simultaneously live codes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no code is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Allocate a fresh code for `object_id`.
    pub fn allocate(&self, object_id: &ObjectId) -> RegistryResult<AccessCode> {
        self.allocate_with(object_id, &mut rand::thread_rng())
    }

    /// Allocate a fresh code for `object_id`, drawing from `rng`.
    ///
    /// Fails with [`RegistryError::CodeSpaceExhausted`] without drawing if
    /// the registry is at capacity, or after [`MAX_ALLOCATION_ATTEMPTS`]
    /// draws that all hit live codes.
    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        object_id: &ObjectId,
        rng: &mut R,
    ) -> RegistryResult<AccessCode> {
        let live = self.entries.len();
        if live >= self.capacity {
            warn!(live, capacity = self.capacity, "code registry at capacity");
            return Err(self.exhausted());
        }

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let code = AccessCode::random(rng);
            match self.entries.entry(code) {
                Entry::Vacant(vacant) => {
                    vacant.insert(object_id.clone());
                    debug!(%code, object_id = %object_id, attempt, "access code allocated");
                    return Ok(code);
                }
                Entry::Occupied(_) => continue,
            }
        }

        warn!(
            attempts = MAX_ALLOCATION_ATTEMPTS,
            live = self.entries.len(),
            "no free access code found"
        );
        Err(self.exhausted())
    }

    /// Resolve a code to the object it currently maps to.
    pub fn resolve(&self, code: &AccessCode) -> Option<ObjectId> {
        self.entries.get(code).map(|entry| entry.value().clone())
    }

    /// Remove the mapping for `code`. Returns `true` if one existed.
    pub fn release(&self, code: &AccessCode) -> bool {
        let removed = self.entries.remove(code).is_some();
        if removed {
            debug!(%code, "access code released");
        }
        removed
    }

    /// Remove the mapping for `code` only if it still points at `object_id`.
    pub fn release_if(&self, code: &AccessCode, object_id: &ObjectId) -> bool {
        self.entries
            .remove_if(code, |_, mapped| mapped == object_id)
            .is_some()
    }

    fn exhausted(&self) -> RegistryError {
        RegistryError::CodeSpaceExhausted {
            live: self.entries.len(),
            capacity: self.capacity,
        }
    }
}

impl Default for CodeRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
