//! Expense record adapter
//!
//! Expands a stored [`ExpenseRecord`] into the debt edges it implies.
//!
//! Shares are computed in integer minor units. The division remainder is
//! handed out one unit at a time to the first participants of the share
//! list, so the shares always sum to the expense amount:
//!
//! ```text
//! 1000 over 3 participants → 334, 333, 333
//! ```

use crate::{
    types::{DebtEdge, ExpenseRecord, Money, ParticipantId, SplitMode},
    Error, Result,
};

/// Split `amount` into `count` shares that sum exactly to `amount`
///
/// The first `amount % count` shares carry one extra minor unit.
pub fn split_evenly(amount: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }

    let total = amount.minor_units();
    let divisor = count as i64;
    let base = total / divisor;
    let remainder = (total % divisor) as usize;

    (0..count)
        .map(|idx| Money::from_minor(if idx < remainder { base + 1 } else { base }))
        .collect()
}

/// Expand one expense record into debt edges
pub fn expand_expense(record: &ExpenseRecord) -> Result<Vec<DebtEdge>> {
    validate(record)?;

    let amount = Money::from_minor(record.amount_minor_units);
    let participants = dedup_participants(&record.participants);

    let share_list: Vec<ParticipantId> = match record.split_mode {
        SplitMode::Direct => {
            if participants.len() != 1 {
                return Err(Error::validation(format!(
                    "direct debt needs exactly one participant, got {}",
                    participants.len()
                )));
            }
            if participants[0] == record.payer {
                return Err(Error::validation(format!(
                    "{} cannot owe themselves",
                    record.payer
                )));
            }
            return DebtEdge::new(participants[0].clone(), record.payer.clone(), amount)
                .map(|edge| vec![edge]);
        }
        SplitMode::EqualExcludingPayer => participants
            .into_iter()
            .filter(|p| *p != record.payer)
            .collect(),
        SplitMode::EqualIncludingPayer => {
            let mut list = participants;
            if !list.contains(&record.payer) {
                list.push(record.payer.clone());
            }
            list
        }
    };

    let shares = split_evenly(amount, share_list.len());
    let edges = share_list
        .into_iter()
        .zip(shares)
        .filter(|(participant, share)| *participant != record.payer && share.is_positive())
        .map(|(participant, share)| DebtEdge {
            debtor: participant,
            creditor: record.payer.clone(),
            amount: share,
        })
        .collect();

    Ok(edges)
}

/// Expand a sequence of records, failing on the first invalid one
pub fn expand_all<'a, I>(records: I) -> Result<Vec<DebtEdge>>
where
    I: IntoIterator<Item = &'a ExpenseRecord>,
{
    let mut edges = Vec::new();
    for record in records {
        edges.extend(expand_expense(record)?);
    }
    Ok(edges)
}

fn validate(record: &ExpenseRecord) -> Result<()> {
    if record.amount_minor_units <= 0 {
        return Err(Error::validation(format!(
            "expense amount must be positive, got {}",
            Money::from_minor(record.amount_minor_units)
        )));
    }

    if !Money::from_minor(record.amount_minor_units).within_limit() {
        return Err(Error::validation(format!(
            "expense amount {} exceeds the limit of {}",
            Money::from_minor(record.amount_minor_units),
            Money::MAX_AMOUNT
        )));
    }

    if record.participants.is_empty() {
        return Err(Error::validation("expense has no participants"));
    }

    if record.payer.is_blank() || record.participants.iter().any(ParticipantId::is_blank) {
        return Err(Error::validation("participant names must not be blank"));
    }

    Ok(())
}

fn dedup_participants(participants: &[ParticipantId]) -> Vec<ParticipantId> {
    let mut seen = Vec::with_capacity(participants.len());
    for participant in participants {
        if !seen.contains(participant) {
            seen.push(participant.clone());
        }
    }
    seen
}
