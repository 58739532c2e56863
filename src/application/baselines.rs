use std::collections::HashMap;

use strum::{AsRefStr, Display};

use crate::domain::{benchmark::ResultSet, reference::ReferenceName};

/// What a baseline selector points at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BaselineSource {
    #[default]
    None,
    /// The live result set of this session.
    Current,
    Reference(ReferenceName),
}

impl BaselineSource {
    pub fn reference_name(&self) -> Option<&ReferenceName> {
        match self {
            BaselineSource::Reference(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BaselineSlot {
    Base,
    Compare,
}

/// The two independent selectors. Defaults to comparing the live results
/// against nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaselineSelection {
    pub base: BaselineSource,
    pub compare: BaselineSource,
}

impl Default for BaselineSelection {
    fn default() -> Self {
        Self { base: BaselineSource::None, compare: BaselineSource::Current }
    }
}

impl BaselineSelection {
    pub fn get(&self, slot: BaselineSlot) -> &BaselineSource {
        match slot {
            BaselineSlot::Base => &self.base,
            BaselineSlot::Compare => &self.compare,
        }
    }

    pub fn set(&mut self, slot: BaselineSlot, source: BaselineSource) {
        match slot {
            BaselineSlot::Base => self.base = source,
            BaselineSlot::Compare => self.compare = source,
        }
    }

    /// Points every selector that used `name` back at nothing.
    pub fn forget_reference(&mut self, name: &ReferenceName) {
        for slot in [BaselineSlot::Base, BaselineSlot::Compare] {
            if self.get(slot).reference_name() == Some(name) {
                self.set(slot, BaselineSource::None);
            }
        }
    }
}

/// Loaded reference bodies, keyed by name
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    snapshots: HashMap<ReferenceName, ResultSet>,
}

impl SnapshotCache {
    pub fn contains(&self, name: &ReferenceName) -> bool {
        self.snapshots.contains_key(name)
    }

    pub fn insert(&mut self, name: ReferenceName, results: ResultSet) {
        self.snapshots.insert(name, results);
    }

    pub fn remove(&mut self, name: &ReferenceName) {
        self.snapshots.remove(name);
    }

    pub fn get(&self, name: &ReferenceName) -> Option<&ResultSet> {
        self.snapshots.get(name)
    }
}

pub fn resolve<'a>(
    source: &BaselineSource,
    current: &'a ResultSet,
    cache: &'a SnapshotCache,
) -> Option<&'a ResultSet> {
    match source {
        BaselineSource::None => None,
        BaselineSource::Current => Some(current),
        BaselineSource::Reference(name) => cache.get(name),
    }
}
