//! Fluent transaction-construction engine for the Cardano blockchain.
//!
//! The crate assembles a [`TxBuilderBody`], the staged pre-codec
//! description of a transaction, from a chained sequence of builder
//! operations, balances it with multi-asset UTxO selection, and folds
//! script-evaluation budgets back onto the matching redeemer slots.
//!
//! The builder ends where serialization begins: signing keys, chain
//! access, CBOR and script execution belong to external collaborators
//! that consume the finished body.
//!
//! ```
//! use kestrel_txbuilder::prelude::*;
//!
//! # fn run() -> Result<(), TxBuilderError> {
//! let mut builder = TxBuilder::new();
//! builder
//!     .tx_in("aa".repeat(32).as_str(), 0, Some(vec![Asset::lovelace(10_000_000)]), Some("addr1sender"))?
//!     .tx_out("addr1receiver", vec![Asset::lovelace(4_000_000)])
//!     .change_address("addr1sender")
//!     .complete()?;
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

mod builder;
mod eval;
mod model;
mod params;
mod strategy;

pub mod prelude;

pub use builder::TxBuilder;
pub use eval::*;
pub use model::*;
pub use params::*;
pub use strategy::select_utxos;

use kestrel_primitives::DataError;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TxBuilderError {
    /// An operation was called with no pending item on its channel.
    #[error("{op} needs a pending {channel} to work on")]
    NoPendingItem {
        op: &'static str,
        channel: &'static str,
    },

    /// An operation was called on a pending item of the wrong kind,
    /// e.g. attaching a datum to a pub-key input.
    #[error("{op} cannot be applied to a {found} {channel}")]
    WrongItemKind {
        op: &'static str,
        channel: &'static str,
        found: &'static str,
    },

    #[error("script input {tx_hash}#{tx_index} is missing its {field}")]
    IncompleteScriptInput {
        tx_hash: String,
        tx_index: u32,
        field: &'static str,
    },

    #[error("plutus mint {policy_id}{asset_name} is missing its {field}")]
    IncompleteMint {
        policy_id: String,
        asset_name: String,
        field: &'static str,
    },

    #[error("script withdrawal for {address} is missing its {field}")]
    IncompleteWithdrawal {
        address: String,
        field: &'static str,
    },

    #[error("script certificate at position {index} is missing its redeemer")]
    IncompleteCertificate { index: usize },

    /// UTxO selection could not cover a required unit from the
    /// available pool.
    #[error("utxo selection cannot cover {unit}, short by {shortfall}")]
    InsufficientInputs { unit: String, shortfall: u128 },

    #[error("invalid reward address: {0}")]
    InvalidRewardAddress(String),

    #[error("asset name must be hex-encoded: {0}")]
    InvalidAssetName(String),

    #[error(transparent)]
    Data(#[from] DataError),
}
