//! SplitFast Ledger Core
//!
//! Shared-expense ledger: turns free text and stored expenses into debt
//! edges and nets them into per-participant balances.
//!
//! # Architecture
//!
//! - **Parser**: best-effort extraction of `"<name> owes <name> <amount>"`
//! - **Expense adapter**: stored expense → debt edges, exact integer shares
//! - **Netting**: debt edges → signed balance per participant
//! - **Repository**: storage boundary, injected by the caller
//!
//! # Invariants
//!
//! - Money conservation: Σ(balances) == 0, exactly, in minor units
//! - Order independence: any permutation of edges nets to the same balances
//! - Purity: parsing, expansion and netting never touch shared state

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod parser;
pub mod expense;
pub mod netting;
pub mod repository;
pub mod crypto;
pub mod error;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    DebtEdge, ExpenseId, ExpenseRecord, Group, GroupCredentials, GroupId, Money, ParticipantId,
    SplitMode,
};
pub use parser::{parse_debt_text, DebtTextParser};
pub use expense::{expand_all, expand_expense, split_evenly};
pub use netting::{net_balances, net_expenses, try_net_balances, NetBalances};
pub use repository::{ExpenseRepository, InMemoryRepository};
