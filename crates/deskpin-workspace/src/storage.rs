//! The membership record persisted in the host's per-window session storage.

use std::collections::BTreeSet;

use deskpin_common::{ActivityId, DesktopId};
use serde::{Deserialize, Serialize};

/// Where a window lives. Empty sets mean "all".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    #[serde(alias = "A")]
    pub activities: Vec<ActivityId>,
    #[serde(alias = "D")]
    pub desktops: Vec<DesktopId>,
}

impl StorageRecord {
    pub fn new(activities: &BTreeSet<ActivityId>, desktops: &BTreeSet<DesktopId>) -> Self {
        Self {
            activities: activities.iter().cloned().collect(),
            desktops: desktops.iter().cloned().collect(),
        }
    }

    pub fn activity_set(&self) -> BTreeSet<ActivityId> {
        self.activities.iter().cloned().collect()
    }

    pub fn desktop_set(&self) -> BTreeSet<DesktopId> {
        self.desktops.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writes_long_keys() {
        let record = StorageRecord::new(
            &BTreeSet::from([ActivityId::from("a1")]),
            &BTreeSet::from([DesktopId::from("d2"), DesktopId::from("d1")]),
        );
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"activities": ["a1"], "desktops": ["d1", "d2"]})
        );
    }

    #[test]
    fn reads_legacy_short_keys() {
        let record: StorageRecord =
            serde_json::from_value(json!({"A": ["a1"], "D": []})).unwrap();
        assert_eq!(record.activities, vec![ActivityId::from("a1")]);
        assert!(record.desktops.is_empty());
    }

    #[test]
    fn partial_record_is_rejected() {
        assert!(serde_json::from_value::<StorageRecord>(json!({"A": ["a1"]})).is_err());
        assert!(serde_json::from_value::<StorageRecord>(json!("pos")).is_err());
    }
}
