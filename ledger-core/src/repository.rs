//! Expense repository boundary
//!
//! The ledger never touches storage directly. Callers hand it an
//! [`ExpenseRepository`]; [`InMemoryRepository`] is the bundled
//! implementation used by tests and the command-line tool.

use crate::{
    types::{ExpenseId, ExpenseRecord, Group, GroupId},
    Error, Result,
};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Storage for groups and their expense history
pub trait ExpenseRepository: Send + Sync {
    /// Store a new group
    fn create_group(&self, group: Group) -> Result<()>;

    /// Fetch a group by ID
    fn load_group(&self, group_id: &GroupId) -> Result<Group>;

    /// All expenses of a group, in insertion order
    fn load_expenses(&self, group_id: &GroupId) -> Result<Vec<ExpenseRecord>>;

    /// Append an expense to a group's history
    fn append_expense(&self, group_id: &GroupId, record: ExpenseRecord) -> Result<ExpenseId>;
}

#[derive(Debug)]
struct GroupEntry {
    group: Group,
    expenses: Vec<(ExpenseId, ExpenseRecord)>,
}

/// Process-local repository
///
/// Writes to a group are serialized by a single lock; reads share it.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    groups: RwLock<HashMap<GroupId, GroupEntry>>,
}

impl InMemoryRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored groups
    pub fn group_count(&self) -> usize {
        self.groups.read().len()
    }
}

impl ExpenseRepository for InMemoryRepository {
    fn create_group(&self, group: Group) -> Result<()> {
        let mut groups = self.groups.write();
        if groups.contains_key(&group.id) {
            return Err(Error::Storage(format!("group {} already exists", group.id)));
        }

        groups.insert(
            group.id,
            GroupEntry {
                group,
                expenses: Vec::new(),
            },
        );
        Ok(())
    }

    fn load_group(&self, group_id: &GroupId) -> Result<Group> {
        self.groups
            .read()
            .get(group_id)
            .map(|entry| entry.group.clone())
            .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))
    }

    fn load_expenses(&self, group_id: &GroupId) -> Result<Vec<ExpenseRecord>> {
        self.groups
            .read()
            .get(group_id)
            .map(|entry| entry.expenses.iter().map(|(_, r)| r.clone()).collect())
            .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))
    }

    fn append_expense(&self, group_id: &GroupId, record: ExpenseRecord) -> Result<ExpenseId> {
        let mut groups = self.groups.write();
        let entry = groups
            .get_mut(group_id)
            .ok_or_else(|| Error::GroupNotFound(group_id.to_string()))?;

        let expense_id = ExpenseId::generate();
        entry.expenses.push((expense_id, record));
        Ok(expense_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParticipantId, SplitMode};

    fn sample_group() -> Group {
        Group::new(
            "Trip",
            vec![ParticipantId::new("owen"), ParticipantId::new("david")],
            "hash".to_string(),
        )
    }

    fn sample_expense(amount: i64) -> ExpenseRecord {
        ExpenseRecord {
            payer: ParticipantId::new("owen"),
            amount_minor_units: amount,
            participants: vec![ParticipantId::new("david")],
            note: "taxi".to_string(),
            timestamp: 1_700_000_000,
            split_mode: SplitMode::Direct,
        }
    }

    #[test]
    fn test_create_and_load_group() {
        let repo = InMemoryRepository::new();
        let group = sample_group();
        repo.create_group(group.clone()).unwrap();

        assert_eq!(repo.load_group(&group.id).unwrap(), group);
        assert_eq!(repo.group_count(), 1);
        assert!(matches!(
            repo.create_group(group),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_append_preserves_order() {
        let repo = InMemoryRepository::new();
        let group = sample_group();
        repo.create_group(group.clone()).unwrap();

        let first = repo.append_expense(&group.id, sample_expense(100)).unwrap();
        let second = repo.append_expense(&group.id, sample_expense(200)).unwrap();
        assert_ne!(first, second);

        let amounts: Vec<i64> = repo
            .load_expenses(&group.id)
            .unwrap()
            .iter()
            .map(|r| r.amount_minor_units)
            .collect();
        assert_eq!(amounts, vec![100, 200]);
    }

    #[test]
    fn test_unknown_group() {
        let repo = InMemoryRepository::new();
        let missing = GroupId::generate();

        assert!(matches!(repo.load_group(&missing), Err(Error::GroupNotFound(_))));
        assert!(matches!(repo.load_expenses(&missing), Err(Error::GroupNotFound(_))));
        assert!(matches!(
            repo.append_expense(&missing, sample_expense(1)),
            Err(Error::GroupNotFound(_))
        ));
    }
}
