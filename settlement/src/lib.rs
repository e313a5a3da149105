//! Settlement Engine
//!
//! Reduces a group's pairwise debts to a short list of settlement transfers.
//!
//! # Architecture
//!
//! 1. **Collection**: Load the group's expenses from the repository
//! 2. **Expansion**: Turn each expense into debt edges (exact integer shares)
//! 3. **Netting**: Collapse edges into one signed balance per participant
//! 4. **Settlement**: Match debtors with creditors, largest first
//!
//! # Settlement Algorithm
//!
//! Greedy two-pointer matching over creditors and debtors sorted by
//! magnitude, with ties broken by participant name:
//! - Every balance ends at exactly zero
//! - Identical input always yields identical output
//! - At most n - 1 transfers for n participants
//!
//! # Example
//!
//! ```
//! use ledger_core::{net_balances, parse_debt_text};
//!
//! let edges = parse_debt_text("owen owes mrugank 20, mrugank owes david 15");
//! let transfers = settlement::settle(&net_balances(&edges)).unwrap();
//!
//! assert_eq!(transfers.len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod netting;
pub mod error;
pub mod config;
pub mod engine;

// Re-exports
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use netting::{settle, NettingEngine};
pub use engine::{NewExpense, SettlementEngine};
