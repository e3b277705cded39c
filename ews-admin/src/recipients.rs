//! Recipient resolution
//!
//! Turns a selection of groups and dialects into the phone numbers of the
//! active members it covers. Every send path and the bulk-send preview go
//! through [`resolve_recipients`], so the selection rules live here only:
//!
//! - groups only: members in any selected group
//! - dialects only: members in any selected dialect
//! - both: members in (any selected group) AND (any selected dialect)
//! - neither: nobody
//!
//! Inactive members are always excluded.

use ews_common::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::db;

/// Groups and dialects chosen on the bulk-send screen
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipientSelection {
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
    #[serde(default)]
    pub dialect_ids: Vec<Uuid>,
}

impl RecipientSelection {
    pub fn is_empty(&self) -> bool {
        self.group_ids.is_empty() && self.dialect_ids.is_empty()
    }
}

/// Active members covered by a selection
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecipientSet {
    pub member_ids: Vec<Uuid>,
    /// Raw phone numbers, one per member, in `member_ids` order
    pub phones: Vec<String>,
    pub count: usize,
}

/// Combine the member ids found through each selected dimension
///
/// `None` means the dimension was not selected at all, which is different
/// from `Some(vec![])` (selected, but nobody is linked). The result keeps
/// first-seen order and contains each id once.
pub fn combine_member_ids(
    from_groups: Option<Vec<Uuid>>,
    from_dialects: Option<Vec<Uuid>>,
) -> Vec<Uuid> {
    let candidates = match (from_groups, from_dialects) {
        (Some(groups), Some(dialects)) => {
            let in_dialects: HashSet<Uuid> = dialects.into_iter().collect();
            groups
                .into_iter()
                .filter(|id| in_dialects.contains(id))
                .collect()
        }
        (Some(ids), None) | (None, Some(ids)) => ids,
        (None, None) => Vec::new(),
    };

    let mut seen = HashSet::new();
    candidates.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Resolve a selection to the active members it covers
pub async fn resolve_recipients(
    db: &SqlitePool,
    selection: &RecipientSelection,
) -> Result<RecipientSet> {
    if selection.is_empty() {
        return Ok(RecipientSet::default());
    }

    let from_groups = if selection.group_ids.is_empty() {
        None
    } else {
        Some(db::groups::member_ids(db, &selection.group_ids).await?)
    };

    let from_dialects = if selection.dialect_ids.is_empty() {
        None
    } else {
        Some(db::dialects::member_ids(db, &selection.dialect_ids).await?)
    };

    let candidates = combine_member_ids(from_groups, from_dialects);
    let mut phones_by_id = db::members::active_phones(db, &candidates).await?;

    let mut set = RecipientSet::default();
    for id in candidates {
        if let Some(phone) = phones_by_id.remove(&id) {
            set.member_ids.push(id);
            set.phones.push(phone);
        }
    }
    set.count = set.member_ids.len();

    tracing::debug!(
        groups = selection.group_ids.len(),
        dialects = selection.dialect_ids.len(),
        recipients = set.count,
        "Resolved recipients"
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_groups_only_uses_group_members() {
        let members = ids(3);
        let result = combine_member_ids(Some(members.clone()), None);
        assert_eq!(result, members);
    }

    #[test]
    fn test_dialects_only_uses_dialect_members() {
        let members = ids(2);
        let result = combine_member_ids(None, Some(members.clone()));
        assert_eq!(result, members);
    }

    #[test]
    fn test_both_selected_intersects() {
        let m = ids(4);
        let groups = vec![m[0], m[1], m[2]];
        let dialects = vec![m[2], m[1], m[3]];

        let result = combine_member_ids(Some(groups), Some(dialects));
        assert_eq!(result, vec![m[1], m[2]]);
    }

    #[test]
    fn test_selected_dimension_with_no_links_empties_intersection() {
        let members = ids(3);
        assert!(combine_member_ids(Some(members), Some(Vec::new())).is_empty());
    }

    #[test]
    fn test_neither_selected_is_empty() {
        assert!(combine_member_ids(None, None).is_empty());
    }

    #[test]
    fn test_duplicates_collapsed() {
        let m = ids(2);
        let result = combine_member_ids(Some(vec![m[0], m[1], m[0]]), None);
        assert_eq!(result, vec![m[0], m[1]]);
    }

    #[test]
    fn test_selection_is_empty() {
        assert!(RecipientSelection::default().is_empty());
        let selection = RecipientSelection {
            group_ids: ids(1),
            dialect_ids: Vec::new(),
        };
        assert!(!selection.is_empty());
    }
}
