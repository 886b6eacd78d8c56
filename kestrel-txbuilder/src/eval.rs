use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Certificate, ExUnits, MintItem, Redeemer, TxBuilderBody, TxIn, Withdrawal};

/// Safety margin applied to measured budgets: off-chain cost estimation
/// runs against a draft transaction, and the final one (with updated
/// fees) can differ slightly in size.
pub const DEFAULT_EX_UNITS_MULTIPLIER: f64 = 1.1;

/// Which redeemer family an evaluation result points into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Cert,
    Reward,
}

/// One script-evaluation result: the redeemer slot it targets and the
/// measured execution budget.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub tag: RedeemerTag,
    pub index: u32,
    pub budget: ExUnits,
}

/// Merges evaluation results into the matching redeemer slots with the
/// default safety multiplier.
pub fn update_redeemer(body: &mut TxBuilderBody, actions: &[Action]) {
    update_redeemer_with(body, actions, DEFAULT_EX_UNITS_MULTIPLIER)
}

/// Merges evaluation results into the matching redeemer slots, scaling
/// each budget by `multiplier` (floored).
///
/// Evaluator output is advisory: an action pointing at a slot that is
/// not script-witnessed means "no on-chain script here" and is skipped,
/// never an error.
pub fn update_redeemer_with(body: &mut TxBuilderBody, actions: &[Action], multiplier: f64) {
    for action in actions {
        let index = action.index as usize;

        let slot: Option<&mut Redeemer> = match action.tag {
            RedeemerTag::Spend => body.inputs.get_mut(index).and_then(|input| match input {
                TxIn::Script(s) => s.redeemer.as_mut(),
                _ => None,
            }),
            RedeemerTag::Mint => body.mints.get_mut(index).and_then(|mint| match mint {
                MintItem::Plutus(m) => m.redeemer.as_mut(),
                _ => None,
            }),
            RedeemerTag::Cert => body.certificates.get_mut(index).and_then(|cert| match cert {
                Certificate::Script { redeemer, .. } => redeemer.as_mut(),
                _ => None,
            }),
            RedeemerTag::Reward => {
                body.withdrawals
                    .get_mut(index)
                    .and_then(|withdrawal| match withdrawal {
                        Withdrawal::Script { redeemer, .. } => redeemer.as_mut(),
                        _ => None,
                    })
            }
        };

        match slot {
            Some(redeemer) => redeemer.ex_units = scale(action.budget, multiplier),
            None => debug!(?action.tag, action.index, "no redeemer at evaluated slot, skipping"),
        }
    }
}

fn scale(budget: ExUnits, multiplier: f64) -> ExUnits {
    ExUnits {
        mem: (budget.mem as f64 * multiplier).floor() as u64,
        steps: (budget.steps as f64 * multiplier).floor() as u64,
    }
}
