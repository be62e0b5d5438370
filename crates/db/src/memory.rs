//! In-memory [`PlayerStore`] for tests and local development.
//!
//! Mirrors the Postgres semantics (cooldown-gated snapshots, merge on rename)
//! without any durability.

use std::sync::Mutex;

use async_trait::async_trait;
use runetrack_core::snapshot::{SnapshotPolicy, StatSnapshot};
use runetrack_core::stats::{normalize_username, PlayerStats};
use runetrack_core::types::{DbId, Timestamp};

use crate::models::name_change::NameChange;
use crate::models::player::{Player, TrackedPlayer};
use crate::store::{PlayerStore, SaveOutcome, StoreError};

#[derive(Default)]
struct State {
    next_id: DbId,
    players: Vec<TrackedPlayer>,
    snapshots: Vec<StatSnapshot>,
    name_changes: Vec<NameChange>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn upsert(&mut self, stats: &PlayerStats, now: Timestamp) -> DbId {
        let key = normalize_username(&stats.username);
        if let Some(tracked) = self.players.iter_mut().find(|p| p.player.username_key == key) {
            let player = &mut tracked.player;
            player.username = stats.username.clone();
            player.account_type = stats.account_type.as_str().to_string();
            player.total_level = stats.total_level;
            player.total_xp = stats.total_xp;
            player.combat_level = stats.combat_level;
            player.updated_at = now;
            tracked.stats = stats.clone();
            return player.id;
        }

        let id = self.next_id();
        self.players.push(TrackedPlayer {
            player: Player {
                id,
                username: stats.username.clone(),
                username_key: key,
                account_type: stats.account_type.as_str().to_string(),
                total_level: stats.total_level,
                total_xp: stats.total_xp,
                combat_level: stats.combat_level,
                created_at: now,
                updated_at: now,
            },
            stats: stats.clone(),
        });
        id
    }

    fn latest_snapshot(&self, player_id: DbId) -> Option<&StatSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.player_id == player_id)
            .max_by_key(|s| (s.created_at, s.id))
    }
}

/// A [`PlayerStore`] held entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots stored across all players.
    pub fn snapshot_count(&self) -> usize {
        self.lock().map_or(0, |state| state.snapshots.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Corrupt("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl PlayerStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }

    async fn save_player(
        &self,
        stats: &PlayerStats,
        policy: SnapshotPolicy,
        now: Timestamp,
    ) -> Result<SaveOutcome, StoreError> {
        let mut state = self.lock()?;
        let player_id = state.upsert(stats, now);

        let last = state.latest_snapshot(player_id).map(|s| s.created_at);
        if let Some(last_snapshot_at) = last {
            if !policy.is_due(last, now) {
                return Ok(SaveOutcome::Cooldown {
                    player_id,
                    last_snapshot_at,
                });
            }
        }

        let snapshot_id = state.next_id();
        state
            .snapshots
            .push(StatSnapshot::capture(snapshot_id, player_id, stats, now));
        Ok(SaveOutcome::Created {
            player_id,
            snapshot_id,
            created_at: now,
        })
    }

    async fn find_player(&self, username: &str) -> Result<Option<TrackedPlayer>, StoreError> {
        let key = normalize_username(username);
        let state = self.lock()?;
        Ok(state
            .players
            .iter()
            .find(|p| p.player.username_key == key)
            .cloned())
    }

    async fn snapshot_history(&self, player_id: DbId) -> Result<Vec<StatSnapshot>, StoreError> {
        let state = self.lock()?;
        let mut history: Vec<StatSnapshot> = state
            .snapshots
            .iter()
            .filter(|s| s.player_id == player_id)
            .cloned()
            .collect();
        history.sort_by_key(|s| (s.created_at, s.id));
        Ok(history)
    }

    async fn latest_snapshot(&self, player_id: DbId) -> Result<Option<StatSnapshot>, StoreError> {
        Ok(self.lock()?.latest_snapshot(player_id).cloned())
    }

    async fn apply_name_change(
        &self,
        old_player_id: DbId,
        new_stats: &PlayerStats,
        now: Timestamp,
    ) -> Result<NameChange, StoreError> {
        let mut state = self.lock()?;
        let old_username = state
            .players
            .iter()
            .find(|p| p.player.id == old_player_id)
            .map(|p| p.player.username.clone())
            .ok_or_else(|| StoreError::NotFound(old_player_id.to_string()))?;

        let new_id = state.upsert(new_stats, now);
        for snapshot in state.snapshots.iter_mut().filter(|s| s.player_id == old_player_id) {
            snapshot.player_id = new_id;
        }
        for change in state.name_changes.iter_mut().filter(|c| c.player_id == old_player_id) {
            change.player_id = new_id;
        }
        state.players.retain(|p| p.player.id != old_player_id);

        let change = NameChange {
            id: state.next_id(),
            player_id: new_id,
            old_username,
            new_username: new_stats.username.clone(),
            validated: true,
            created_at: now,
        };
        state.name_changes.push(change.clone());
        Ok(change)
    }

    async fn name_changes(&self, player_id: DbId) -> Result<Vec<NameChange>, StoreError> {
        let state = self.lock()?;
        let mut changes: Vec<NameChange> = state
            .name_changes
            .iter()
            .filter(|c| c.player_id == player_id)
            .cloned()
            .collect();
        changes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(changes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};
    use runetrack_core::skills::Skill;
    use runetrack_core::stats::{AccountType, BossStats, SkillStats};

    use super::*;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn stats(username: &str, attack_xp: i64) -> PlayerStats {
        let mut skills = BTreeMap::new();
        skills.insert(
            Skill::Attack,
            SkillStats {
                level: 50,
                xp: attack_xp,
                rank: None,
            },
        );
        let mut bosses = BTreeMap::new();
        bosses.insert(
            "Zulrah".to_string(),
            BossStats {
                kill_count: 12,
                rank: None,
            },
        );
        PlayerStats::new(username, AccountType::Normal, None, skills, bosses)
    }

    #[tokio::test]
    async fn second_save_within_cooldown_is_skipped() {
        let store = MemoryStore::new();
        let policy = SnapshotPolicy::default();

        let first = store.save_player(&stats("Zezima", 100_000), policy, t0()).await.unwrap();
        assert!(first.snapshot_created());

        let second = store
            .save_player(&stats("Zezima", 120_000), policy, t0() + Duration::minutes(30))
            .await
            .unwrap();
        assert_matches!(second, SaveOutcome::Cooldown { last_snapshot_at, .. } if last_snapshot_at == t0());
        assert_eq!(store.snapshot_count(), 1);

        // The current row is still refreshed.
        let tracked = store.find_player("zezima").await.unwrap().unwrap();
        assert_eq!(tracked.stats.skill_xp(Skill::Attack), 120_000);
        assert_eq!(tracked.player.updated_at, t0() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn forced_save_always_inserts() {
        let store = MemoryStore::new();
        let forced = SnapshotPolicy::new(true, 60);
        for minutes in [0, 1, 2] {
            store
                .save_player(&stats("Zezima", 100_000), forced, t0() + Duration::minutes(minutes))
                .await
                .unwrap();
        }
        assert_eq!(store.snapshot_count(), 3);
    }

    #[tokio::test]
    async fn save_after_cooldown_inserts() {
        let store = MemoryStore::new();
        let policy = SnapshotPolicy::default();
        store.save_player(&stats("Zezima", 1), policy, t0()).await.unwrap();
        let outcome = store
            .save_player(&stats("Zezima", 2), policy, t0() + Duration::hours(1))
            .await
            .unwrap();
        assert!(outcome.snapshot_created());

        let player_id = outcome.player_id().unwrap();
        let history = store.snapshot_history(player_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].created_at < history[1].created_at);
        assert_eq!(
            store.latest_snapshot(player_id).await.unwrap().unwrap().created_at,
            t0() + Duration::hours(1)
        );
    }

    #[tokio::test]
    async fn lookup_normalises_username() {
        let store = MemoryStore::new();
        store
            .save_player(&stats("Lynx Titan", 1), SnapshotPolicy::default(), t0())
            .await
            .unwrap();
        assert!(store.find_player("lynx_titan").await.unwrap().is_some());
        assert!(store.find_player("LYNX-TITAN").await.unwrap().is_some());
        assert!(store.find_player("lynx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn name_change_moves_history_and_deletes_old_row() {
        let store = MemoryStore::new();
        let forced = SnapshotPolicy::new(true, 60);
        let old = store.save_player(&stats("Old Name", 1), forced, t0()).await.unwrap();
        store
            .save_player(&stats("Old Name", 2), forced, t0() + Duration::hours(2))
            .await
            .unwrap();
        let old_id = old.player_id().unwrap();

        let change = store
            .apply_name_change(old_id, &stats("New Name", 3), t0() + Duration::days(1))
            .await
            .unwrap();

        assert_eq!(change.old_username, "Old Name");
        assert_eq!(change.new_username, "New Name");
        assert!(change.validated);
        assert!(store.find_player("Old Name").await.unwrap().is_none());

        let renamed = store.find_player("new name").await.unwrap().unwrap();
        assert_eq!(renamed.player.id, change.player_id);
        assert_eq!(store.snapshot_history(renamed.player.id).await.unwrap().len(), 2);
        assert_eq!(store.name_changes(renamed.player.id).await.unwrap(), vec![change]);
    }

    #[tokio::test]
    async fn name_change_carries_earlier_renames() {
        let store = MemoryStore::new();
        let policy = SnapshotPolicy::default();
        let a = store.save_player(&stats("A", 1), policy, t0()).await.unwrap();
        let first = store
            .apply_name_change(a.player_id().unwrap(), &stats("B", 2), t0() + Duration::days(1))
            .await
            .unwrap();
        let second = store
            .apply_name_change(first.player_id, &stats("C", 3), t0() + Duration::days(2))
            .await
            .unwrap();

        let changes = store.name_changes(second.player_id).await.unwrap();
        let names: Vec<_> = changes.iter().map(|c| c.old_username.as_str()).collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[tokio::test]
    async fn name_change_of_unknown_player_fails() {
        let store = MemoryStore::new();
        assert_matches!(
            store.apply_name_change(99, &stats("X", 1), t0()).await,
            Err(StoreError::NotFound(_))
        );
    }
}
