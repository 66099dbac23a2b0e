//! Spendable outputs, payment targets and input selection.

use crate::error::{Error, Result};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Satoshis per whole coin.
pub const SATS_PER_COIN: f64 = 100_000_000.0;

/// An unspent output locked to the multisig address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction id in display (big-endian) hex.
    pub hash: String,
    pub vout: u32,
    /// Amount in whole coins.
    pub amount: f64,
}

/// A payment target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub address: String,
    /// Amount in whole coins.
    pub amount: f64,
}

/// Converts a decimal coin amount to satoshis, truncating any fraction.
/// Amounts above the 21M coin supply are rejected.
pub fn to_sats(amount: f64) -> Result<u64> {
    let sats = amount * SATS_PER_COIN;
    if !sats.is_finite() || sats < 0.0 || sats > Amount::MAX_MONEY.to_sat() as f64 {
        return Err(Error::ParseError(format!("invalid amount {}", amount)));
    }
    Ok(sats as u64)
}

/// Adds satoshi amounts, failing instead of wrapping.
pub fn checked_total<I>(amounts: I) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
{
    amounts.into_iter().try_fold(0u64, |acc, sats| {
        acc.checked_add(sats)
            .ok_or_else(|| Error::ParseError("amount total overflows".to_string()))
    })
}

pub fn utxo_total_sats(utxos: &[Utxo]) -> Result<u64> {
    checked_total(utxos.iter().map(|u| to_sats(u.amount)).collect::<Result<Vec<_>>>()?)
}

pub fn output_total_sats(outputs: &[Output]) -> Result<u64> {
    checked_total(outputs.iter().map(|o| to_sats(o.amount)).collect::<Result<Vec<_>>>()?)
}

/// Where the greedy scan stops relative to the UTXO that pushes the running
/// total over the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Stop before the UTXO whose amount makes the total strictly exceed the
    /// target. The result can fall short of the target.
    ExcludeCrossing,
    /// Stop after the UTXO whose amount makes the total cover the target.
    #[default]
    IncludeCrossing,
}

/// Greedy largest-first selection. Returns an empty set when the candidates
/// never reach the target.
pub fn select_utxos(utxos: &[Utxo], outputs: &[Output], policy: SelectionPolicy) -> Result<Vec<Utxo>> {
    let target = output_total_sats(outputs)?;
    if target == 0 {
        return Ok(Vec::new());
    }

    let mut candidates = utxos
        .iter()
        .map(|u| Ok((to_sats(u.amount)?, u)))
        .collect::<Result<Vec<_>>>()?;
    candidates.sort_by_key(|(sats, _)| Reverse(*sats));

    let mut sum = 0u64;
    for (i, (sats, _)) in candidates.iter().enumerate() {
        sum = sum.saturating_add(*sats);
        let end = match policy {
            SelectionPolicy::ExcludeCrossing if sum > target => i,
            SelectionPolicy::IncludeCrossing if sum >= target => i + 1,
            _ => continue,
        };
        log::debug!("selected {} of {} utxos for {} sat", end, candidates.len(), target);
        return Ok(candidates[..end].iter().map(|(_, u)| (*u).clone()).collect());
    }

    log::debug!("utxo set totals {} sat, short of {} sat", sum, target);
    Ok(Vec::new())
}
