//! The persisted snapshot and its adapter

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::persistence::store::KeyValueStore;
use crate::persistence::{PersistenceError, SNAPSHOT_KEY};
use crate::progression::profile::UserProfile;
use crate::progression::stats::StatBlock;
use crate::quest::Quest;

/// Complete application state, stored as one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub quests: Vec<Quest>,
    pub stats: StatBlock,
    pub user: UserProfile,
}

impl Snapshot {
    /// Empty quest log, zeroed stats. Only the name and age of `user` are
    /// kept; total XP, level and rank start over.
    pub fn fresh(mut user: UserProfile) -> Self {
        let stats = StatBlock::new();
        user.total_xp = 0;
        user.refresh(&stats);
        Self {
            quests: Vec::new(),
            stats,
            user,
        }
    }

    /// Decode and validate a stored blob.
    ///
    /// Field-level checks (all five stats present and non-negative,
    /// difficulty in range, known rank, ISO dates) happen during decoding;
    /// cross-field checks happen in [`Snapshot::validate`]. Any failure
    /// rejects the whole blob.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PersistenceError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)
            .map_err(|e| PersistenceError::Deserialization(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        serde_json::to_vec(self).map_err(PersistenceError::Serialization)
    }

    pub fn validate(&self) -> Result<(), PersistenceError> {
        let mut seen = HashSet::with_capacity(self.quests.len());
        for quest in &self.quests {
            if !seen.insert(&quest.id) {
                return Err(PersistenceError::Deserialization(format!(
                    "duplicate quest id {}",
                    quest.id
                )));
            }
        }
        if self.user.age == 0 {
            return Err(PersistenceError::Deserialization(
                "user age must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Recompute the profile's cached level and rank from stats and total
    /// XP. Returns true if the stored pair was stale.
    pub fn refresh_derived(&mut self) -> bool {
        self.user.refresh(&self.stats)
    }
}

/// Reads and writes the snapshot under a single namespaced key
#[derive(Debug, Clone)]
pub struct SnapshotAdapter<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> SnapshotAdapter<S> {
    /// Adapter using the default key
    pub fn new(store: S) -> Self {
        Self::with_key(store, SNAPSHOT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// `Ok(None)` if nothing is stored yet
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match self.store.load(&self.key)? {
            Some(bytes) => Snapshot::from_json(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Overwrite the stored snapshot
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let blob = snapshot.to_json()?;
        self.store.save(&self.key, &blob)
    }
}
