//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (integer minor units for money)
//! - Canonical participant names (case-folded once, at construction)
//! - Deterministic ordering (participants order lexicographically)

use crate::{Error, Result};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use uuid::Uuid;

/// Participant identifier: a normalized display name
///
/// Every whitespace-delimited token is capitalized (`"owen"` → `"Owen"`,
/// `"  mary   ANN "` → `"Mary Ann"`). Normalization is idempotent.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create new participant ID from a raw name
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(normalize_name(name.as_ref()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the normalized name is empty
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|token| {
            let mut chars = token.chars();
            let Some(first) = chars.next() else {
                return String::new();
            };
            // Multi-char uppercase forms (e.g. 'ß' -> "SS") would not survive
            // a second pass, so those keep their first char unchanged.
            let mut upper = first.to_uppercase();
            let head = match (upper.next(), upper.next()) {
                (Some(c), None) => c,
                _ => first,
            };
            std::iter::once(head)
                .chain(chars.flat_map(char::to_lowercase))
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl From<String> for ParticipantId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for ParticipantId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monetary amount in minor currency units (cents)
///
/// Decimal values are converted once at the boundary with round-half-to-even
/// on the hundredths digit and rendered back with exactly two fractional
/// digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    /// Largest amount accepted for a single debt or expense
    /// (10^13 major units), leaving headroom for summing many of them
    pub const MAX_AMOUNT: Money = Money(1_000_000_000_000_000);

    /// Create from a count of minor units
    pub const fn from_minor(minor_units: i64) -> Self {
        Self(minor_units)
    }

    /// Convert a decimal currency value, rounding half-to-even to cents
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .filter(|amount| amount.within_limit())
            .ok_or_else(|| Error::validation(format!("amount {} out of range", value)))
    }

    /// Parse a decimal literal such as `"12.5"` or `"$7.25"`
    pub fn parse(literal: &str) -> Result<Self> {
        let trimmed = literal.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed);
        let value = Decimal::from_str(digits)
            .map_err(|e| Error::validation(format!("invalid amount {:?}: {}", literal, e)))?;
        Self::from_decimal(value)
    }

    /// Minor units
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Decimal value in major units (scale 2)
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Check if zero
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if strictly positive
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Check if strictly negative
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// True if |self| does not exceed [`Money::MAX_AMOUNT`]
    pub fn within_limit(self) -> bool {
        self.0.unsigned_abs() <= Self::MAX_AMOUNT.0.unsigned_abs()
    }

    /// Checked addition, `None` on overflow
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction, `None` on overflow
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked absolute value, `None` for `i64::MIN` minor units
    pub fn checked_abs(self) -> Option<Self> {
        self.0.checked_abs().map(Self)
    }

    /// Sum of `amounts`, `None` if any partial sum overflows
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(amount))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Directed obligation: `debtor` owes `creditor` a strictly positive amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtEdge {
    /// Participant who owes
    pub debtor: ParticipantId,

    /// Participant who is owed
    pub creditor: ParticipantId,

    /// Amount owed (> 0)
    pub amount: Money,
}

impl DebtEdge {
    /// Create a new edge, rejecting non-positive and over-limit amounts
    pub fn new(
        debtor: impl Into<ParticipantId>,
        creditor: impl Into<ParticipantId>,
        amount: Money,
    ) -> Result<Self> {
        if !amount.is_positive() {
            return Err(Error::validation(format!(
                "debt amount must be positive, got {}",
                amount
            )));
        }
        if !amount.within_limit() {
            return Err(Error::validation(format!(
                "debt amount {} exceeds the limit of {}",
                amount,
                Money::MAX_AMOUNT
            )));
        }

        Ok(Self {
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        })
    }
}

/// How an expense is divided among its participants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Every listed participant except the payer owes an equal share
    EqualExcludingPayer,
    /// Every listed participant and the payer carry an equal share
    #[default]
    EqualIncludingPayer,
    /// The single listed participant owes the payer the full amount
    Direct,
}

impl FromStr for SplitMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "equal_excluding_payer" | "excluding" => Ok(SplitMode::EqualExcludingPayer),
            "equal_including_payer" | "including" | "equal" => Ok(SplitMode::EqualIncludingPayer),
            "direct" => Ok(SplitMode::Direct),
            other => Err(Error::validation(format!("unknown split mode {:?}", other))),
        }
    }
}

/// Stored expense, consumed read-only by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// Who paid
    pub payer: ParticipantId,

    /// Amount paid, in minor units
    pub amount_minor_units: i64,

    /// Participants sharing the expense, in entry order
    pub participants: Vec<ParticipantId>,

    /// Free-form note
    #[serde(default)]
    pub note: String,

    /// Unix timestamp (seconds)
    pub timestamp: i64,

    /// Split mode
    #[serde(default)]
    pub split_mode: SplitMode,
}

/// Group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Generate a fresh random group ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for GroupId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::GroupNotFound(s.to_string()))
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expense identifier (UUIDv7 for time-ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    /// Generate a fresh time-ordered expense ID
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expense-sharing group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Group ID
    pub id: GroupId,

    /// Display name
    pub name: String,

    /// Declared members
    pub members: Vec<ParticipantId>,

    /// SHA-256 hex digest of the group secret
    pub secret_hash: String,

    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl Group {
    /// Create a new group stamped with the current time
    pub fn new(name: impl Into<String>, members: Vec<ParticipantId>, secret_hash: String) -> Self {
        Self {
            id: GroupId::generate(),
            name: name.into(),
            members,
            secret_hash,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Credentials handed back once, on group creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupCredentials {
    /// Group ID
    pub group_id: GroupId,

    /// Plain-text secret; only its hash is stored
    pub secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_normalization() {
        assert_eq!(ParticipantId::new("owen").as_str(), "Owen");
        assert_eq!(ParticipantId::new("  mary   ANN ").as_str(), "Mary Ann");
        assert_eq!(ParticipantId::new("élodie").as_str(), "Élodie");
        assert!(ParticipantId::new("   ").is_blank());

        // Idempotent
        let once = ParticipantId::new("dAVID o'brien");
        assert_eq!(ParticipantId::new(once.as_str()), once);
    }

    #[test]
    fn test_participant_deserialize_normalizes() {
        let id: ParticipantId = serde_json::from_str("\"bARATH\"").unwrap();
        assert_eq!(id.as_str(), "Barath");
    }

    #[test]
    fn test_money_rounding_half_even() {
        assert_eq!(Money::parse("12.345").unwrap(), Money::from_minor(1234));
        assert_eq!(Money::parse("12.355").unwrap(), Money::from_minor(1236));
        assert_eq!(Money::parse("$7.25").unwrap(), Money::from_minor(725));
        assert_eq!(Money::parse("20").unwrap(), Money::from_minor(2000));
        assert!(Money::parse("abc").is_err());
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_minor(3400).to_string(), "34.00");
        assert_eq!(Money::from_minor(-3400).to_string(), "-34.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_money_amount_limit() {
        let limit = Money::parse("10000000000000").unwrap();
        assert_eq!(limit, Money::MAX_AMOUNT);
        assert!(Money::parse("10000000000000.01").is_err());
        assert!(Money::parse("90000000000000000").is_err());
        assert!(Money::parse("-90000000000000000").is_err());
    }

    #[test]
    fn test_money_checked_arithmetic() {
        let max = Money::from_minor(i64::MAX);
        assert_eq!(max.checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_sub(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_abs(), None);
        assert_eq!(Money::checked_sum([max, max]), None);
        assert_eq!(
            Money::checked_sum([Money::from_minor(5), Money::from_minor(-2)]),
            Some(Money::from_minor(3))
        );
        assert_eq!(Money::checked_sum([]), Some(Money::ZERO));
    }

    #[test]
    fn test_debt_edge_requires_positive_amount() {
        assert!(DebtEdge::new("a", "b", Money::from_minor(1)).is_ok());
        assert!(matches!(
            DebtEdge::new("a", "b", Money::ZERO),
            Err(Error::Validation(_))
        ));
        assert!(DebtEdge::new("a", "b", Money::from_minor(-5)).is_err());
        assert!(DebtEdge::new("a", "b", Money::MAX_AMOUNT).is_ok());
        assert!(matches!(
            DebtEdge::new("a", "b", Money::MAX_AMOUNT + Money::from_minor(1)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_expense_record_default_split_mode() {
        let json = r#"{
            "payer": "owen",
            "amount_minor_units": 1000,
            "participants": ["owen", "david"],
            "timestamp": 0
        }"#;
        let record: ExpenseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.split_mode, SplitMode::EqualIncludingPayer);
        assert_eq!(record.payer.as_str(), "Owen");
        assert!(record.note.is_empty());
    }

    #[test]
    fn test_split_mode_from_str() {
        assert_eq!("direct".parse::<SplitMode>().unwrap(), SplitMode::Direct);
        assert_eq!(
            "Equal_Excluding_Payer".parse::<SplitMode>().unwrap(),
            SplitMode::EqualExcludingPayer
        );
        assert!("percent".parse::<SplitMode>().is_err());
    }
}
