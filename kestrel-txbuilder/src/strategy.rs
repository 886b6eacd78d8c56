use std::collections::HashSet;

use itertools::Itertools;
use kestrel_primitives::{Value, ValueDelta, LOVELACE};
use tracing::debug;

use crate::{
    model::{SelectionStrategy, Utxo},
    TxBuilderError,
};

/// Picks inputs from `pool` covering the signed requirement, using one of
/// the four deterministic strategies. Ties in any ordering resolve by
/// original pool order; the returned UTxOs are in selection order.
///
/// On failure nothing is returned at all, so the caller never appends a
/// partial selection.
pub fn select_utxos(
    pool: &[Utxo],
    required: &ValueDelta,
    strategy: SelectionStrategy,
) -> Result<Vec<Utxo>, TxBuilderError> {
    debug!(?strategy, pool = pool.len(), "selecting utxos");

    match strategy {
        SelectionStrategy::LargestFirst => largest_first(pool, required),
        SelectionStrategy::LargestFirstMultiAsset => largest_first_multi_asset(pool, required),
        SelectionStrategy::KeepRelevant => keep_relevant(pool, required),
        SelectionStrategy::Experimental => experimental(pool, required),
    }
}

fn utxo_key(utxo: &Utxo) -> (String, u32) {
    (utxo.input.tx_hash.clone(), utxo.input.output_index)
}

fn utxo_value(utxo: &Utxo) -> Value {
    Value::from_assets(&utxo.output.amount)
}

fn quantity_of(utxo: &Utxo, unit: &str) -> u64 {
    utxo.output
        .amount
        .iter()
        .filter(|asset| asset.unit == unit)
        .map(|asset| asset.quantity)
        .sum()
}

fn insufficient(unit: &str, shortfall: i128) -> TxBuilderError {
    TxBuilderError::InsufficientInputs {
        unit: unit.to_string(),
        shortfall: shortfall.unsigned_abs(),
    }
}

/// Only considers lovelace: consume candidates richest-first until the
/// requirement is met.
fn largest_first(pool: &[Utxo], required: &ValueDelta) -> Result<Vec<Utxo>, TxBuilderError> {
    let mut remaining = required.get(LOVELACE);
    let mut selected = vec![];

    if remaining <= 0 {
        return Ok(selected);
    }

    let candidates = pool
        .iter()
        .sorted_by(|a, b| quantity_of(b, LOVELACE).cmp(&quantity_of(a, LOVELACE)));

    for utxo in candidates {
        if remaining <= 0 {
            break;
        }

        remaining -= quantity_of(utxo, LOVELACE) as i128;
        selected.push(utxo.clone());
    }

    if remaining > 0 {
        return Err(insufficient(LOVELACE, remaining));
    }

    Ok(selected)
}

/// Covers every positively-required unit richest-first, lovelace last.
/// Each pick reduces the requirement across all units the UTxO contains.
fn largest_first_multi_asset(
    pool: &[Utxo],
    required: &ValueDelta,
) -> Result<Vec<Utxo>, TxBuilderError> {
    let mut delta = required.clone();
    let mut selected = vec![];
    let mut used = HashSet::new();

    let mut units = delta.required_units();
    units.retain(|unit| unit != LOVELACE);
    units.push(LOVELACE.to_string());

    for unit in &units {
        if delta.get(unit) <= 0 {
            continue;
        }

        let candidates = pool
            .iter()
            .filter(|utxo| !used.contains(&utxo_key(utxo)))
            .sorted_by(|a, b| quantity_of(b, unit).cmp(&quantity_of(a, unit)));

        for utxo in candidates {
            if delta.get(unit) <= 0 {
                break;
            }

            // candidates are sorted descending, nothing below holds this unit
            if quantity_of(utxo, unit) == 0 {
                break;
            }

            used.insert(utxo_key(utxo));
            delta.provide(&utxo_value(utxo));
            selected.push(utxo.clone());
        }

        if delta.get(unit) > 0 {
            return Err(insufficient(unit, delta.get(unit)));
        }
    }

    Ok(selected)
}

/// Keeps every candidate carrying a required non-ADA unit, then covers
/// the remaining lovelace largest-first from the rest of the pool.
fn keep_relevant(pool: &[Utxo], required: &ValueDelta) -> Result<Vec<Utxo>, TxBuilderError> {
    let mut delta = required.clone();

    let required_units: Vec<String> = delta
        .required_units()
        .into_iter()
        .filter(|unit| unit != LOVELACE)
        .collect();

    let (relevant, rest): (Vec<&Utxo>, Vec<&Utxo>) = pool.iter().partition(|utxo| {
        required_units
            .iter()
            .any(|unit| quantity_of(utxo, unit) > 0)
    });

    let mut selected = vec![];

    for utxo in relevant {
        delta.provide(&utxo_value(utxo));
        selected.push(utxo.clone());
    }

    if let Some(unit) = delta
        .required_units()
        .into_iter()
        .find(|unit| unit != LOVELACE)
    {
        return Err(insufficient(&unit, delta.get(&unit)));
    }

    let mut remaining = delta.get(LOVELACE);

    if remaining > 0 {
        let candidates = rest
            .into_iter()
            .sorted_by(|a, b| quantity_of(b, LOVELACE).cmp(&quantity_of(a, LOVELACE)));

        for utxo in candidates {
            if remaining <= 0 {
                break;
            }

            remaining -= quantity_of(utxo, LOVELACE) as i128;
            selected.push(utxo.clone());
        }

        if remaining > 0 {
            return Err(insufficient(LOVELACE, remaining));
        }
    }

    Ok(selected)
}

/// Multi-pass: walk required units scarcest-first and spend the smallest
/// single UTxO that fully covers each, falling back to largest-first
/// accumulation when no single UTxO can. Tuned to keep the input count
/// down.
fn experimental(pool: &[Utxo], required: &ValueDelta) -> Result<Vec<Utxo>, TxBuilderError> {
    let mut delta = required.clone();
    let mut selected = vec![];
    let mut used = HashSet::new();

    let mut units = delta.required_units();
    units.sort_by_key(|unit| {
        pool.iter()
            .map(|utxo| quantity_of(utxo, unit) as u128)
            .sum::<u128>()
    });

    for unit in &units {
        // an earlier pick may already have covered this unit
        if delta.get(unit) <= 0 {
            continue;
        }

        let need = delta.get(unit);

        let cover = pool
            .iter()
            .filter(|utxo| !used.contains(&utxo_key(utxo)))
            .filter(|utxo| quantity_of(utxo, unit) as i128 >= need)
            .min_by_key(|utxo| quantity_of(utxo, unit));

        match cover {
            Some(utxo) => {
                used.insert(utxo_key(utxo));
                delta.provide(&utxo_value(utxo));
                selected.push(utxo.clone());
            }
            None => {
                let candidates = pool
                    .iter()
                    .filter(|utxo| !used.contains(&utxo_key(utxo)))
                    .filter(|utxo| quantity_of(utxo, unit) > 0)
                    .sorted_by(|a, b| quantity_of(b, unit).cmp(&quantity_of(a, unit)))
                    .collect_vec();

                for utxo in candidates {
                    if delta.get(unit) <= 0 {
                        break;
                    }

                    used.insert(utxo_key(utxo));
                    delta.provide(&utxo_value(utxo));
                    selected.push(utxo.clone());
                }

                if delta.get(unit) > 0 {
                    return Err(insufficient(unit, delta.get(unit)));
                }
            }
        }
    }

    Ok(selected)
}
