use std::collections::HashMap;

use recap_domain::Meeting;

/// Outcome of comparing two meeting snapshots.
///
/// `changed` carries the incoming version of each meeting; `removed` carries
/// only the ids that vanished.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeetingDiff {
    pub new: Vec<Meeting>,
    pub changed: Vec<Meeting>,
    pub removed: Vec<String>,
}

impl MeetingDiff {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

/// Pure set comparison keyed on meeting id.
///
/// A meeting counts as changed only when a tracked field (start, end, url)
/// differs between versions; cosmetic title edits are ignored.
pub fn diff_meetings(old: &[Meeting], new: &[Meeting]) -> MeetingDiff {
    let old_by_id: HashMap<&str, &Meeting> = old.iter().map(|m| (m.id.as_str(), m)).collect();
    let new_ids: HashMap<&str, ()> = new.iter().map(|m| (m.id.as_str(), ())).collect();

    let mut diff = MeetingDiff::default();

    for meeting in new {
        match old_by_id.get(meeting.id.as_str()) {
            None => diff.new.push(meeting.clone()),
            Some(prev) if prev.tracked_fields_differ(meeting) => {
                diff.changed.push(meeting.clone());
            }
            Some(_) => {}
        }
    }

    for meeting in old {
        if !new_ids.contains_key(meeting.id.as_str()) {
            diff.removed.push(meeting.id.clone());
        }
    }

    diff
}
