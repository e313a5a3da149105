//! Ledger netting
//!
//! Collapses debt edges into one signed balance per participant.
//!
//! # Example
//!
//! ```text
//! Edges:
//!   Owen owes Mrugank: 20
//!   Mrugank owes David: 15
//!   Barath owes David: 7
//!   Owen owes Barath: 14
//!
//! Net balances:
//!   Owen:    -34 (owes)
//!   Mrugank:  +5 (is owed)
//!   David:   +22 (is owed)
//!   Barath:   +7 (is owed)
//! ```
//!
//! Accumulation is commutative, so any permutation of the same edges yields
//! the same mapping, and the balances always sum to exactly zero.

use crate::{
    expense::expand_all,
    types::{DebtEdge, ExpenseRecord, Money, ParticipantId},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::{self, BTreeMap};

/// Signed balance per participant (positive = is owed, negative = owes)
///
/// Participants never mentioned have no entry; [`NetBalances::get`] reads
/// them as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetBalances(BTreeMap<ParticipantId, Money>);

impl NetBalances {
    /// Empty mapping
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Balance of a participant (zero when absent)
    pub fn get(&self, participant: &ParticipantId) -> Money {
        self.0.get(participant).copied().unwrap_or(Money::ZERO)
    }

    /// Whether the participant has an entry
    pub fn contains(&self, participant: &ParticipantId) -> bool {
        self.0.contains_key(participant)
    }

    /// Add `delta` to a participant's balance
    pub fn adjust(&mut self, participant: ParticipantId, delta: Money) {
        *self.0.entry(participant).or_insert(Money::ZERO) += delta;
    }

    /// Add `delta` to a participant's balance, failing if it leaves the
    /// representable range
    pub fn try_adjust(&mut self, participant: ParticipantId, delta: Money) -> Result<()> {
        let balance = self.0.entry(participant).or_insert(Money::ZERO);
        *balance = balance.checked_add(delta).ok_or_else(|| {
            Error::validation(format!("balance overflow adding {} to {}", delta, balance))
        })?;
        Ok(())
    }

    /// Apply one edge: debit the debtor, credit the creditor
    pub fn apply_edge(&mut self, edge: &DebtEdge) {
        self.adjust(edge.debtor.clone(), -edge.amount);
        self.adjust(edge.creditor.clone(), edge.amount);
    }

    /// Apply one edge with overflow checking
    pub fn try_apply_edge(&mut self, edge: &DebtEdge) -> Result<()> {
        self.try_adjust(edge.debtor.clone(), -edge.amount)?;
        self.try_adjust(edge.creditor.clone(), edge.amount)
    }

    /// Apply a payment of `amount` from `from` to `to`
    ///
    /// The payer's balance rises (they owe less), the receiver's falls.
    pub fn apply_transfer(&mut self, from: &ParticipantId, to: &ParticipantId, amount: Money) {
        self.adjust(from.clone(), amount);
        self.adjust(to.clone(), -amount);
    }

    /// Sum of all balances (zero for a closed ledger), `None` on overflow
    pub fn total(&self) -> Option<Money> {
        Money::checked_sum(self.0.values().copied())
    }

    /// Conservation check
    pub fn is_balanced(&self) -> bool {
        self.total() == Some(Money::ZERO)
    }

    /// True if every balance is zero (absent entries count as zero)
    pub fn is_settled(&self) -> bool {
        self.0.values().all(|m| m.is_zero())
    }

    /// Iterate entries in participant order
    pub fn iter(&self) -> btree_map::Iter<'_, ParticipantId, Money> {
        self.0.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ParticipantId, Money)> for NetBalances {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Money)>>(iter: I) -> Self {
        let mut balances = NetBalances::new();
        for (participant, amount) in iter {
            balances.adjust(participant, amount);
        }
        balances
    }
}

impl<'a> IntoIterator for &'a NetBalances {
    type Item = (&'a ParticipantId, &'a Money);
    type IntoIter = btree_map::Iter<'a, ParticipantId, Money>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Compute net balances from debt edges
///
/// Edges built through [`DebtEdge::new`], the parser or the expense adapter
/// carry at most [`Money::MAX_AMOUNT`], so no balance can overflow before
/// roughly nine thousand maximal edges land on one participant.
///
/// # Panics
///
/// Panics if a balance leaves the `i64` range. Use [`try_net_balances`] for
/// edges of unbounded size or count.
pub fn net_balances(edges: &[DebtEdge]) -> NetBalances {
    let mut balances = NetBalances::new();
    for edge in edges {
        balances.apply_edge(edge);
    }

    tracing::debug!(
        edges = edges.len(),
        participants = balances.len(),
        "Computed net balances"
    );
    debug_assert!(balances.is_balanced());

    balances
}

/// Compute net balances from debt edges, reporting overflow as a
/// validation error
pub fn try_net_balances(edges: &[DebtEdge]) -> Result<NetBalances> {
    let mut balances = NetBalances::new();
    for edge in edges {
        balances.try_apply_edge(edge)?;
    }

    tracing::debug!(
        edges = edges.len(),
        participants = balances.len(),
        "Computed net balances"
    );

    Ok(balances)
}

/// Compute net balances from stored expenses
pub fn net_expenses(records: &[ExpenseRecord]) -> Result<NetBalances> {
    let edges = expand_all(records)?;
    try_net_balances(&edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SplitMode;

    fn edge(debtor: &str, creditor: &str, cents: i64) -> DebtEdge {
        DebtEdge::new(debtor, creditor, Money::from_minor(cents)).unwrap()
    }

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    #[test]
    fn test_scenario_balances() {
        let edges = vec![
            edge("Owen", "Mrugank", 2000),
            edge("Mrugank", "David", 1500),
            edge("Barath", "David", 700),
            edge("Owen", "Barath", 1400),
        ];

        let balances = net_balances(&edges);

        assert_eq!(balances.get(&id("Owen")), Money::from_minor(-3400));
        assert_eq!(balances.get(&id("Mrugank")), Money::from_minor(500));
        assert_eq!(balances.get(&id("David")), Money::from_minor(2200));
        assert_eq!(balances.get(&id("Barath")), Money::from_minor(700));
        assert_eq!(balances.len(), 4);
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_absent_reads_as_zero() {
        let balances = net_balances(&[edge("a", "b", 100)]);

        assert!(!balances.contains(&id("c")));
        assert_eq!(balances.get(&id("c")), Money::ZERO);
    }

    #[test]
    fn test_empty_edges() {
        let balances = net_balances(&[]);
        assert!(balances.is_empty());
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_opposite_edges_cancel() {
        let balances = net_balances(&[edge("a", "b", 100), edge("b", "a", 100)]);

        assert!(balances.is_settled());
        assert_eq!(balances.len(), 2);
    }

    #[test]
    fn test_apply_transfer_zeroes() {
        let mut balances = net_balances(&[edge("a", "b", 250)]);
        balances.apply_transfer(&id("a"), &id("b"), Money::from_minor(250));
        assert!(balances.is_settled());
    }

    #[test]
    fn test_net_expenses() {
        let records = vec![
            ExpenseRecord {
                payer: id("owen"),
                amount_minor_units: 3000,
                participants: vec![id("owen"), id("david"), id("barath")],
                note: "dinner".to_string(),
                timestamp: 0,
                split_mode: SplitMode::EqualIncludingPayer,
            },
            ExpenseRecord {
                payer: id("david"),
                amount_minor_units: 1000,
                participants: vec![id("owen")],
                note: String::new(),
                timestamp: 0,
                split_mode: SplitMode::Direct,
            },
        ];

        let balances = net_expenses(&records).unwrap();

        assert_eq!(balances.get(&id("owen")), Money::from_minor(1000));
        assert_eq!(balances.get(&id("david")), Money::ZERO);
        assert_eq!(balances.get(&id("barath")), Money::from_minor(-1000));
        assert!(balances.is_balanced());
    }

    #[test]
    fn test_large_amounts_net_without_overflow() {
        let edges = vec![
            DebtEdge::new("a", "b", Money::MAX_AMOUNT).unwrap(),
            DebtEdge::new("c", "b", Money::MAX_AMOUNT).unwrap(),
        ];

        let balances = net_balances(&edges);
        assert_eq!(
            balances.get(&id("b")),
            Money::from_minor(2 * Money::MAX_AMOUNT.minor_units())
        );
        assert!(balances.is_balanced());
        assert_eq!(try_net_balances(&edges).unwrap(), balances);
    }

    #[test]
    fn test_try_net_balances_reports_overflow() {
        let huge = |debtor: &str| DebtEdge {
            debtor: id(debtor),
            creditor: id("b"),
            amount: Money::from_minor(i64::MAX / 2 + 1),
        };

        let err = try_net_balances(&[huge("a"), huge("c")]).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_total_overflow_is_none() {
        let balances: NetBalances = vec![
            (id("a"), Money::from_minor(i64::MAX)),
            (id("b"), Money::from_minor(1)),
        ]
        .into_iter()
        .collect();

        assert_eq!(balances.total(), None);
        assert!(!balances.is_balanced());
    }

    #[test]
    fn test_from_iterator_accumulates() {
        let balances: NetBalances = vec![
            (id("a"), Money::from_minor(5)),
            (id("a"), Money::from_minor(-2)),
            (id("b"), Money::from_minor(-3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(balances.get(&id("a")), Money::from_minor(3));
        assert!(balances.is_balanced());
    }
}
