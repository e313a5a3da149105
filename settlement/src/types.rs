//! Core types for settlement engine

use ledger_core::{Money, ParticipantId};
use serde::{Deserialize, Serialize};

/// Recommended payment from one participant to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementTransfer {
    /// Payer (net debtor)
    pub from: ParticipantId,

    /// Receiver (net creditor)
    pub to: ParticipantId,

    /// Amount to transfer (> 0)
    pub amount: Money,
}

/// Settlement statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Participants with a non-zero balance
    pub participant_count: usize,

    /// Number of gross debt edges
    pub edge_count: usize,

    /// Total gross edge amount
    pub gross_amount: Money,

    /// Number of settlement transfers
    pub transfer_count: usize,

    /// Total transferred amount
    pub net_amount: Money,

    /// Number of payments eliminated by netting
    pub transfers_eliminated: usize,
}

impl SettlementSummary {
    /// Netting efficiency (0.0 - 1.0), higher = more netting
    pub fn efficiency(&self) -> f64 {
        if self.gross_amount.is_zero() {
            return 0.0;
        }

        let gross = self.gross_amount.minor_units() as f64;
        let net = self.net_amount.minor_units() as f64;
        (gross - net) / gross
    }

    /// Amount saved by netting
    pub fn savings(&self) -> Money {
        self.gross_amount - self.net_amount
    }
}

/// Settlement result for a set of debts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementPlan {
    /// Transfers, in matching order
    pub transfers: Vec<SettlementTransfer>,

    /// Statistics
    pub summary: SettlementSummary,
}

impl SettlementPlan {
    /// Total transferred amount
    pub fn total(&self) -> Money {
        self.summary.net_amount
    }
}
