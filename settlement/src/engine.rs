//! Group settlement service
//!
//! Orchestrates group access, expense recording, netting, and settlement
//! over an injected [`ExpenseRepository`].
//!
//! # Example
//!
//! ```no_run
//! use ledger_core::InMemoryRepository;
//! use settlement::{Config, NewExpense, SettlementEngine};
//! use std::sync::Arc;
//!
//! fn main() -> settlement::Result<()> {
//!     let engine = SettlementEngine::new(Config::default(), Arc::new(InMemoryRepository::new()))?;
//!     let creds = engine.create_group("Trip", &["owen", "david"])?;
//!
//!     engine.add_expense(
//!         &creds.group_id,
//!         &creds.secret,
//!         NewExpense::new("owen", "30.00".parse().unwrap(), &["owen", "david"]),
//!     )?;
//!
//!     let plan = engine.balances(&creds.group_id, &creds.secret)?;
//!     println!("{} transfers", plan.transfers.len());
//!     Ok(())
//! }
//! ```

use crate::{
    config::Config,
    netting::{summarize, NettingEngine},
    types::SettlementPlan,
    Error, Result,
};
use chrono::Utc;
use ledger_core::{
    crypto::{generate_secret, hash_secret, verify_secret},
    expand_all, expand_expense, parse_debt_text, try_net_balances, ExpenseId, ExpenseRecord,
    ExpenseRepository, Group, GroupCredentials, GroupId, Money, NetBalances, ParticipantId,
    SplitMode,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Expense as entered by a caller, before boundary conversion
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// Who paid
    pub payer: String,

    /// Amount in major currency units
    pub amount: Decimal,

    /// Participants sharing the expense
    pub participants: Vec<String>,

    /// Free-form note
    pub note: String,

    /// Split mode (configured default when `None`)
    pub split_mode: Option<SplitMode>,
}

impl NewExpense {
    /// Expense with no note and the default split mode
    pub fn new(payer: impl Into<String>, amount: Decimal, participants: &[&str]) -> Self {
        Self {
            payer: payer.into(),
            amount,
            participants: participants.iter().map(|p| p.to_string()).collect(),
            note: String::new(),
            split_mode: None,
        }
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Use an explicit split mode
    pub fn with_split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = Some(split_mode);
        self
    }
}

/// Settlement engine
pub struct SettlementEngine<R: ExpenseRepository> {
    /// Group and expense storage
    repository: Arc<R>,

    /// Netting engine
    netting: NettingEngine,

    /// Configuration
    config: Config,
}

impl<R: ExpenseRepository> std::fmt::Debug for SettlementEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettlementEngine")
            .field("netting", &self.netting)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: ExpenseRepository> SettlementEngine<R> {
    /// Create new settlement engine
    pub fn new(config: Config, repository: Arc<R>) -> Result<Self> {
        config.validate()?;

        let netting = NettingEngine::new(config.settlement.conservation_tolerance_minor_units);

        Ok(Self {
            repository,
            netting,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Create a group and return its one-time credentials
    pub fn create_group(&self, name: &str, members: &[&str]) -> Result<GroupCredentials> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("group name must not be empty".to_string()));
        }

        let members: Vec<ParticipantId> = members.iter().map(ParticipantId::new).collect();
        let secret = generate_secret();
        let group = Group::new(name, members, hash_secret(&secret));
        let group_id = group.id;

        self.repository.create_group(group)?;
        tracing::info!(group_id = %group_id, name, "Created group");

        Ok(GroupCredentials { group_id, secret })
    }

    /// Verify a group secret
    ///
    /// Unknown groups and wrong secrets fail identically.
    pub fn authenticate(&self, group_id: &GroupId, secret: &str) -> Result<Group> {
        let denied = || ledger_core::Error::Unauthorized("invalid group or secret".to_string());

        let group = match self.repository.load_group(group_id) {
            Ok(group) => group,
            Err(ledger_core::Error::GroupNotFound(_)) => return Err(denied().into()),
            Err(e) => return Err(e.into()),
        };

        if !verify_secret(secret, &group.secret_hash) {
            tracing::warn!(group_id = %group_id, "Rejected group secret");
            return Err(denied().into());
        }

        Ok(group)
    }

    /// Record an expense
    pub fn add_expense(
        &self,
        group_id: &GroupId,
        secret: &str,
        expense: NewExpense,
    ) -> Result<ExpenseId> {
        self.authenticate(group_id, secret)?;

        let amount = Money::from_decimal(expense.amount)?;
        let record = ExpenseRecord {
            payer: ParticipantId::new(&expense.payer),
            amount_minor_units: amount.minor_units(),
            participants: expense.participants.iter().map(ParticipantId::new).collect(),
            note: expense.note,
            timestamp: Utc::now().timestamp(),
            split_mode: expense
                .split_mode
                .unwrap_or(self.config.expenses.default_split_mode),
        };

        // Reject what netting would reject before it is stored
        expand_expense(&record)?;

        let expense_id = self.repository.append_expense(group_id, record)?;
        tracing::info!(
            group_id = %group_id,
            expense_id = %expense_id,
            amount = %amount,
            "Recorded expense"
        );

        Ok(expense_id)
    }

    /// Record every debt found in free text as a direct debt
    pub fn record_debt_text(
        &self,
        group_id: &GroupId,
        secret: &str,
        text: &str,
    ) -> Result<Vec<ExpenseId>> {
        self.authenticate(group_id, secret)?;

        let timestamp = Utc::now().timestamp();
        let mut expense_ids = Vec::new();

        for edge in parse_debt_text(text) {
            let record = ExpenseRecord {
                payer: edge.creditor,
                amount_minor_units: edge.amount.minor_units(),
                participants: vec![edge.debtor],
                note: String::new(),
                timestamp,
                split_mode: SplitMode::Direct,
            };
            expense_ids.push(self.repository.append_expense(group_id, record)?);
        }

        tracing::info!(
            group_id = %group_id,
            debts = expense_ids.len(),
            "Recorded debts from text"
        );

        Ok(expense_ids)
    }

    /// Net balances of a group
    pub fn net_balances(&self, group_id: &GroupId, secret: &str) -> Result<NetBalances> {
        self.authenticate(group_id, secret)?;

        let records = self.repository.load_expenses(group_id)?;
        let edges = expand_all(&records)?;
        Ok(try_net_balances(&edges)?)
    }

    /// Settlement transfers for a group
    pub fn balances(&self, group_id: &GroupId, secret: &str) -> Result<SettlementPlan> {
        self.authenticate(group_id, secret)?;

        let records = self.repository.load_expenses(group_id)?;
        let edges = expand_all(&records)?;
        let balances = try_net_balances(&edges)?;
        let transfers = self.netting.settle(&balances)?;
        let summary = summarize(&edges, &balances, &transfers)?;

        tracing::info!(
            group_id = %group_id,
            expenses = records.len(),
            transfers = transfers.len(),
            "Settlement computed: {} gross → {} net ({:.1}% efficiency)",
            summary.gross_amount,
            summary.net_amount,
            summary.efficiency() * 100.0
        );

        Ok(SettlementPlan { transfers, summary })
    }
}
