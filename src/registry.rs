//! Authoritative in-memory map of saves.
//!
//! Every mutation reports what it changed so the session can decide which
//! dependent state (selection affordances, rendering) needs recomputing.

use std::collections::BTreeMap;

use crate::model::{SaveRecord, SaveStatus, StatusMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub name: String,
    pub from: SaveStatus,
    pub to: SaveStatus,
}

#[derive(Debug, Default)]
pub struct SaveRegistry {
    saves: BTreeMap<String, SaveRecord>,
}

impl SaveRegistry {
    pub fn get(&self, name: &str) -> Option<&SaveRecord> {
        self.saves.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.saves.contains_key(name)
    }

    pub fn status(&self, name: &str) -> Option<SaveStatus> {
        self.saves.get(name).map(|r| r.status)
    }

    pub fn len(&self) -> usize {
        self.saves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.saves.is_empty()
    }

    /// Records in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SaveRecord> {
        self.saves.values()
    }

    /// True while any save is mid start/stop.
    pub fn has_transition(&self) -> bool {
        self.saves.values().any(|r| r.status.is_transitional())
    }

    /// Replaces the whole registry with a freshly listed fleet.
    pub fn replace_all(&mut self, records: Vec<SaveRecord>) {
        self.saves = records.into_iter().map(|r| (r.name.clone(), r)).collect();
    }

    /// Inserts or overwrites one record; returns the previous status when
    /// the record already existed.
    pub fn upsert(&mut self, record: SaveRecord) -> Option<SaveStatus> {
        self.saves
            .insert(record.name.clone(), record)
            .map(|prev| prev.status)
    }

    pub fn remove(&mut self, name: &str) -> Option<SaveRecord> {
        self.saves.remove(name)
    }

    /// Sets one status; `None` when the save is unknown or already in that state.
    pub fn set_status(&mut self, name: &str, status: SaveStatus) -> Option<StatusChange> {
        let rec = self.saves.get_mut(name)?;
        if rec.status == status {
            return None;
        }
        let from = rec.status;
        rec.status = status;
        Some(StatusChange {
            name: name.to_string(),
            from,
            to: status,
        })
    }

    /// Overlays metadata values (optimistic modify); returns false for unknown saves.
    pub fn merge_metadata(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = (String, serde_json::Value)>,
    ) -> bool {
        let Some(rec) = self.saves.get_mut(name) else {
            return false;
        };
        rec.metadata.extend(values);
        true
    }

    /// Applies a fleet status map. Saves missing from the map are offline;
    /// names in the map that are not registered are ignored. Only actual
    /// differences are reported, so applying the same map twice yields
    /// nothing the second time.
    pub fn reconcile(&mut self, statuses: &StatusMap) -> Vec<StatusChange> {
        let mut changes = Vec::new();
        for rec in self.saves.values_mut() {
            let fetched = statuses.get(&rec.name).copied().unwrap_or_default();
            if fetched != rec.status {
                changes.push(StatusChange {
                    name: rec.name.clone(),
                    from: rec.status,
                    to: fetched,
                });
                rec.status = fetched;
            }
        }
        changes
    }
}
