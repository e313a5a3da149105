//! Minimum-transfer settlement
//!
//! Turns net balances into a short list of payments that zeroes them.
//!
//! # Algorithm
//!
//! 1. Split participants into creditors (balance > 0) and debtors (< 0)
//! 2. Sort both by magnitude, largest first, ties by participant name
//! 3. Walk both lists with two cursors, moving min(debt, credit) each step
//!
//! # Example
//!
//! ```text
//! Net balances:
//!   Owen:    -34
//!   David:   +22
//!   Barath:   +7
//!   Mrugank:  +5
//!
//! Transfers:
//!   Owen pays David:   22
//!   Owen pays Barath:   7
//!   Owen pays Mrugank:  5
//! ```
//!
//! This is a greedy heuristic: it never produces more than n - 1 transfers
//! but is not guaranteed to find the smallest possible transfer count.

use crate::{
    types::{SettlementPlan, SettlementSummary, SettlementTransfer},
    Error, Result,
};
use ledger_core::{try_net_balances, DebtEdge, Money, NetBalances, ParticipantId};

/// Netting engine
#[derive(Debug, Clone, Default)]
pub struct NettingEngine {
    /// Largest tolerated |Σ balances|, in minor units
    tolerance: Money,
}

impl NettingEngine {
    /// Create new netting engine
    pub fn new(tolerance_minor_units: i64) -> Self {
        Self {
            tolerance: Money::from_minor(tolerance_minor_units.max(0)),
        }
    }

    /// Compute the transfers that zero every balance
    pub fn settle(&self, balances: &NetBalances) -> Result<Vec<SettlementTransfer>> {
        let total = balances
            .total()
            .ok_or_else(|| Error::Validation("balances overflow when summed".to_string()))?;
        if total.abs() > self.tolerance {
            return Err(Error::Validation(format!(
                "balances sum to {} instead of zero (tolerance {})",
                total, self.tolerance
            )));
        }

        let mut creditors = ranked_positions(balances, Money::is_positive)?;
        let mut debtors = ranked_positions(balances, Money::is_negative)?;

        let mut transfers = Vec::with_capacity(creditors.len().max(debtors.len()));
        let (mut i, mut j) = (0, 0);

        while i < debtors.len() && j < creditors.len() {
            let amount = debtors[i].1.min(creditors[j].1);

            if amount.is_positive() {
                transfers.push(SettlementTransfer {
                    from: debtors[i].0.clone(),
                    to: creditors[j].0.clone(),
                    amount,
                });
            }

            debtors[i].1 -= amount;
            creditors[j].1 -= amount;

            if debtors[i].1.is_zero() {
                i += 1;
            }
            if creditors[j].1.is_zero() {
                j += 1;
            }
        }

        let residual: Money = debtors[i..]
            .iter()
            .chain(&creditors[j..])
            .map(|(_, remaining)| *remaining)
            .sum();
        if !residual.is_zero() {
            tracing::warn!(
                residual = %residual,
                "Settlement left a residual within tolerance unsettled"
            );
        }

        tracing::debug!(
            debtors = debtors.len(),
            creditors = creditors.len(),
            transfers = transfers.len(),
            "Settlement computed"
        );

        Ok(transfers)
    }

    /// Net the edges, settle, and summarize
    pub fn plan(&self, edges: &[DebtEdge]) -> Result<SettlementPlan> {
        let balances = try_net_balances(edges)?;
        let transfers = self.settle(&balances)?;
        let summary = summarize(edges, &balances, &transfers)?;

        Ok(SettlementPlan { transfers, summary })
    }
}

/// Settle with zero tolerance
pub fn settle(balances: &NetBalances) -> Result<Vec<SettlementTransfer>> {
    NettingEngine::default().settle(balances)
}

/// Build statistics for a computed settlement
pub fn summarize(
    edges: &[DebtEdge],
    balances: &NetBalances,
    transfers: &[SettlementTransfer],
) -> Result<SettlementSummary> {
    let overflow = |what: &str| Error::Validation(format!("{} amount overflows", what));

    let gross_amount =
        Money::checked_sum(edges.iter().map(|e| e.amount)).ok_or_else(|| overflow("gross"))?;
    let net_amount =
        Money::checked_sum(transfers.iter().map(|t| t.amount)).ok_or_else(|| overflow("net"))?;

    Ok(SettlementSummary {
        participant_count: balances.iter().filter(|(_, m)| !m.is_zero()).count(),
        edge_count: edges.len(),
        gross_amount,
        transfer_count: transfers.len(),
        net_amount,
        transfers_eliminated: edges.len().saturating_sub(transfers.len()),
    })
}

/// Participants whose balance matches `side`, as (participant, magnitude),
/// sorted by magnitude descending then participant ascending
fn ranked_positions(
    balances: &NetBalances,
    side: fn(Money) -> bool,
) -> Result<Vec<(ParticipantId, Money)>> {
    let mut positions = balances
        .iter()
        .filter(|(_, amount)| side(**amount))
        .map(|(participant, amount)| {
            amount
                .checked_abs()
                .map(|magnitude| (participant.clone(), magnitude))
                .ok_or_else(|| {
                    Error::Validation(format!("balance of {} is out of range", participant))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    positions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(positions)
}
