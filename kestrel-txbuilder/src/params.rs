use serde::{Deserialize, Serialize};

use crate::model::ExUnits;

/// Budget a redeemer carries until the evaluation reconciler replaces it
/// with a measured one.
pub const DEFAULT_REDEEMER_BUDGET: ExUnits = ExUnits {
    mem: 7_000_000,
    steps: 3_000_000_000,
};

/// The protocol parameters the builder consults. Defaults are the
/// mainnet constant set; callers override fields with struct-update
/// syntax and never rely on the builder fetching anything from chain.
///
/// ```
/// use kestrel_txbuilder::Protocol;
///
/// let params = Protocol {
///     min_fee_a: 50,
///     ..Default::default()
/// };
/// # assert_eq!(params.min_fee_b, 155_381);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Protocol {
    pub epoch: u32,
    pub min_fee_a: u64,
    pub min_fee_b: u64,
    pub max_tx_size: u64,
    pub max_val_size: u64,
    pub coins_per_utxo_size: u64,
    pub key_deposit: u64,
    pub pool_deposit: u64,
    pub price_mem: f64,
    pub price_step: f64,
    pub collateral_percent: u64,
    pub max_collateral_inputs: u64,
    pub max_tx_ex_mem: u64,
    pub max_tx_ex_steps: u64,
    pub min_fee_ref_script_cost_per_byte: u64,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            epoch: 0,
            min_fee_a: 44,
            min_fee_b: 155_381,
            max_tx_size: 16_384,
            max_val_size: 5_000,
            coins_per_utxo_size: 4_310,
            key_deposit: 2_000_000,
            pool_deposit: 500_000_000,
            price_mem: 0.0577,
            price_step: 0.0000721,
            collateral_percent: 150,
            max_collateral_inputs: 3,
            max_tx_ex_mem: 14_000_000,
            max_tx_ex_steps: 10_000_000_000,
            min_fee_ref_script_cost_per_byte: 15,
        }
    }
}

/// Worst-case linear fee for a transaction filling the whole size limit.
/// Selection uses this as padding; it never replaces real fee
/// calculation.
pub fn max_tx_fee(params: &Protocol) -> u64 {
    params.min_fee_a * params.max_tx_size + params.min_fee_b
}
