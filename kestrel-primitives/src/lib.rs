//! Data-model leaves shared by the Kestrel transaction-building stack.
//!
//! This crate holds the pieces that exist below the builder itself: the
//! multi-asset value algebra used to balance transactions, and the Plutus
//! data model used for datums, redeemers and on-chain metadata. Nothing in
//! here talks to a network or serializes to CBOR; canonical byte forms are
//! the codec layer's concern.

mod data;
mod value;

pub use data::*;
pub use value::*;
