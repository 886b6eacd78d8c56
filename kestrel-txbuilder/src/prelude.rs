pub use crate::builder::TxBuilder;
pub use crate::eval::{update_redeemer, update_redeemer_with, Action, RedeemerTag};
pub use crate::model::*;
pub use crate::params::{max_tx_fee, Protocol, DEFAULT_REDEEMER_BUDGET};
pub use crate::strategy::select_utxos;
pub use crate::TxBuilderError;

pub use kestrel_primitives::{
    any_constr, array, asset_unit, bytes, constr, int, map, Asset, BuilderData, PlutusData, Value,
    ValueDelta, LOVELACE,
};
