//! The progression engine
//!
//! Owns the quest log, stat XP and profile. Every mutation finishes in
//! memory first and then writes the whole snapshot through the adapter. A
//! failed write is logged and never undoes the mutation.
//!
//! There is no "not yet loaded" engine: [`ProgressionEngine::load`] is the
//! only constructor and hands back an engine that is ready for use.

use tracing::{debug, error, info, warn};

use crate::core::config::ProfileConfig;
use crate::core::error::ValidationError;
use crate::core::types::{QuestId, Rank, StatType, Xp};
use crate::persistence::{KeyValueStore, Snapshot, SnapshotAdapter};
use crate::progression::level::level_and_rank;
use crate::progression::profile::{ProfileUpdate, UserProfile};
use crate::progression::stats::StatBlock;
use crate::quest::{Quest, QuestDraft};

/// What a completed quest paid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub quest: Quest,
    pub stat: StatType,
    pub xp_gained: Xp,
    pub previous_level: u32,
    pub level: u32,
    pub previous_rank: Rank,
    pub rank: Rank,
}

impl Completion {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }

    pub fn ranked_up(&self) -> bool {
        self.rank > self.previous_rank
    }
}

pub struct ProgressionEngine<S: KeyValueStore> {
    adapter: SnapshotAdapter<S>,
    state: Snapshot,
}

impl<S: KeyValueStore> ProgressionEngine<S> {
    /// Load state through `adapter`, starting from the default profile when
    /// nothing usable is stored
    pub fn load(adapter: SnapshotAdapter<S>) -> Self {
        Self::load_with_profile(adapter, &ProfileConfig::default())
    }

    /// Like [`load`](Self::load), with name and age for a fresh state taken
    /// from `fallback`.
    ///
    /// An absent snapshot and an unreadable one both yield a fresh state;
    /// the unreadable blob is left in place until the next save.
    pub fn load_with_profile(adapter: SnapshotAdapter<S>, fallback: &ProfileConfig) -> Self {
        debug!(key = adapter.key(), "loading snapshot");
        let state = match adapter.load() {
            Ok(Some(mut snapshot)) => {
                if snapshot.refresh_derived() {
                    warn!(
                        level = snapshot.user.level,
                        rank = %snapshot.user.rank,
                        "stored level/rank were stale, recomputed"
                    );
                }
                info!(
                    quests = snapshot.quests.len(),
                    total_xp = snapshot.user.total_xp,
                    "snapshot loaded"
                );
                snapshot
            }
            Ok(None) => {
                info!("no saved snapshot, starting fresh");
                Snapshot::fresh(UserProfile::from(fallback))
            }
            Err(err) => {
                error!(error = %err, "saved snapshot unusable, falling back to defaults");
                Snapshot::fresh(UserProfile::from(fallback))
            }
        };
        Self { adapter, state }
    }

    pub fn quests(&self) -> &[Quest] {
        &self.state.quests
    }

    pub fn quest(&self, id: &QuestId) -> Option<&Quest> {
        self.state.quests.iter().find(|q| &q.id == id)
    }

    pub fn stats(&self) -> &StatBlock {
        &self.state.stats
    }

    pub fn profile(&self) -> &UserProfile {
        &self.state.user
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    pub fn adapter(&self) -> &SnapshotAdapter<S> {
        &self.adapter
    }

    /// Validate `draft` and append it to the quest log
    pub fn add_quest(&mut self, draft: QuestDraft) -> Result<QuestId, ValidationError> {
        let quest = draft.validate()?;
        if self.quest(&quest.id).is_some() {
            return Err(ValidationError::DuplicateQuestId(quest.id.to_string()));
        }

        let id = quest.id.clone();
        debug!(id = %id, name = %quest.name, stat = %quest.stat, "quest added");
        self.state.quests.push(quest);
        self.persist();
        Ok(id)
    }

    /// Remove a quest without rewards. Unknown ids are ignored.
    pub fn delete_quest(&mut self, id: &QuestId) -> Option<Quest> {
        let index = self.state.quests.iter().position(|q| &q.id == id)?;
        let quest = self.state.quests.remove(index);
        debug!(id = %id, "quest deleted");
        self.persist();
        Some(quest)
    }

    /// Pay out a quest's XP and remove it.
    ///
    /// Unknown ids are treated as already completed: nothing changes and
    /// `None` comes back.
    pub fn complete_quest(&mut self, id: &QuestId) -> Option<Completion> {
        let index = self.state.quests.iter().position(|q| &q.id == id)?;

        let quest = &self.state.quests[index];
        let xp_gained = quest.xp_reward();
        let stat = quest.stat;

        let stats = self.state.stats.with_gain(stat, xp_gained);
        let total_xp = self.state.user.total_xp.saturating_add(xp_gained);
        let (level, rank) = level_and_rank(&stats, total_xp);
        let previous_level = self.state.user.level;
        let previous_rank = self.state.user.rank;

        // commit
        let quest = self.state.quests.remove(index);
        self.state.stats = stats;
        self.state.user.total_xp = total_xp;
        self.state.user.level = level;
        self.state.user.rank = rank;

        let completion = Completion {
            quest,
            stat,
            xp_gained,
            previous_level,
            level,
            previous_rank,
            rank,
        };
        info!(
            id = %id,
            stat = %stat,
            xp = xp_gained,
            total_xp,
            level,
            rank = %rank,
            "quest completed"
        );
        if completion.leveled_up() {
            info!(level, "level up");
        }
        if completion.ranked_up() {
            info!(rank = %rank, "rank up");
        }

        self.persist();
        Some(completion)
    }

    /// Change name and/or age. Derived fields are not editable.
    pub fn update_user_profile(&mut self, update: ProfileUpdate) -> Result<(), ValidationError> {
        if update.is_empty() {
            return Ok(());
        }
        update.apply(&mut self.state.user)?;
        debug!(name = %self.state.user.name, age = self.state.user.age, "profile updated");
        self.persist();
        Ok(())
    }

    /// Replace the whole state with a fresh one named after `profile`
    pub fn reset(&mut self, profile: &ProfileConfig) {
        warn!("resetting all progress");
        self.state = Snapshot::fresh(UserProfile::from(profile));
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.adapter.save(&self.state) {
            warn!(error = %err, key = self.adapter.key(), "failed to persist snapshot");
        }
    }
}
