use kestrel_primitives::{asset_unit, Asset, BuilderData};
use serde::{Deserialize, Serialize};

/// A reference to a transaction output, by producing-transaction hash and
/// output position.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefTxIn {
    pub tx_hash: String,
    pub tx_index: u32,
}

impl RefTxIn {
    pub fn new(tx_hash: impl Into<String>, tx_index: u32) -> Self {
        Self {
            tx_hash: tx_hash.into(),
            tx_index,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UtxoInput {
    pub tx_hash: String,
    pub output_index: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UtxoOutput {
    pub address: String,
    pub amount: Vec<Asset>,
    pub datum: Option<String>,
    pub reference_script: Option<String>,
}

/// An unspent output as reported by the wallet or chain indexer. Identity
/// is the `(tx_hash, output_index)` pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Utxo {
    pub input: UtxoInput,
    pub output: UtxoOutput,
}

impl Utxo {
    pub fn new(
        tx_hash: impl Into<String>,
        output_index: u32,
        address: impl Into<String>,
        amount: Vec<Asset>,
    ) -> Self {
        Self {
            input: UtxoInput {
                tx_hash: tx_hash.into(),
                output_index,
            },
            output: UtxoOutput {
                address: address.into(),
                amount,
                datum: None,
                reference_script: None,
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LanguageVersion {
    V1,
    /// The fallback when an operation needs a Plutus version and none was
    /// latched beforehand.
    #[default]
    V2,
    V3,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProvidedScriptSource {
    pub script_cbor: String,
    pub language_version: LanguageVersion,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InlineScriptSource {
    pub ref_tx_in: RefTxIn,
    pub script_hash: Option<String>,
    pub language_version: LanguageVersion,
    pub script_size: Option<u64>,
}

/// Where a Plutus script witness comes from: provided inline with the
/// transaction, or already on-chain behind a reference input.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    Provided(ProvidedScriptSource),
    Inline(InlineScriptSource),
}

/// Same split for native scripts, which carry no Plutus version.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum SimpleScriptSource {
    Provided {
        script_cbor: String,
    },
    Inline {
        ref_tx_in: RefTxIn,
        script_hash: Option<String>,
    },
}

/// Where the datum witnessing a script spend comes from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum DatumSource {
    Provided(BuilderData),
    /// The datum sits inline on the spent output itself.
    Inline(RefTxIn),
}

/// On-chain metered cost of a script execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExUnits {
    pub mem: u64,
    pub steps: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Redeemer {
    pub data: BuilderData,
    pub ex_units: ExUnits,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TxInParameter {
    pub tx_hash: String,
    pub tx_index: u32,
    pub amount: Option<Vec<Asset>>,
    pub address: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScriptTxIn {
    pub tx_in: TxInParameter,
    pub script_source: Option<ScriptSource>,
    pub datum_source: Option<DatumSource>,
    pub redeemer: Option<Redeemer>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SimpleScriptTxIn {
    pub tx_in: TxInParameter,
    pub script_source: SimpleScriptSource,
}

/// A transaction input in one of its three witnessing modes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum TxIn {
    PubKey(TxInParameter),
    SimpleScript(SimpleScriptTxIn),
    Script(ScriptTxIn),
}

impl TxIn {
    pub fn tx_in(&self) -> &TxInParameter {
        match self {
            Self::PubKey(p) => p,
            Self::SimpleScript(s) => &s.tx_in,
            Self::Script(s) => &s.tx_in,
        }
    }

    /// The `(tx_hash, tx_index)` identity of the consumed output.
    pub fn reference(&self) -> (&str, u32) {
        let p = self.tx_in();
        (&p.tx_hash, p.tx_index)
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::PubKey(_) => "pub-key",
            Self::SimpleScript(_) => "simple-script",
            Self::Script(_) => "script",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NativeMint {
    pub policy_id: String,
    pub asset_name: String,
    pub amount: i64,
    pub script_source: Option<SimpleScriptSource>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlutusMint {
    pub policy_id: String,
    pub asset_name: String,
    pub amount: i64,
    pub script_source: Option<ScriptSource>,
    pub redeemer: Option<Redeemer>,
}

/// A mint (positive amount) or burn (negative amount) under one policy.
/// The `(policy_id, asset_name)` pair forms the resulting asset's unit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum MintItem {
    Native(NativeMint),
    Plutus(PlutusMint),
}

impl MintItem {
    pub fn policy_id(&self) -> &str {
        match self {
            Self::Native(m) => &m.policy_id,
            Self::Plutus(m) => &m.policy_id,
        }
    }

    pub fn asset_name(&self) -> &str {
        match self {
            Self::Native(m) => &m.asset_name,
            Self::Plutus(m) => &m.asset_name,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            Self::Native(m) => m.amount,
            Self::Plutus(m) => m.amount,
        }
    }

    pub fn unit(&self) -> String {
        asset_unit(self.policy_id(), self.asset_name())
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Native(_) => "native",
            Self::Plutus(_) => "plutus",
        }
    }
}

/// A stake-account balance drawn down to zero by this transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalParameter {
    pub address: String,
    pub coin: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Withdrawal {
    PubKey(WithdrawalParameter),
    SimpleScript {
        withdrawal: WithdrawalParameter,
        script_source: SimpleScriptSource,
    },
    Script {
        withdrawal: WithdrawalParameter,
        script_source: Option<ScriptSource>,
        redeemer: Option<Redeemer>,
    },
}

impl Withdrawal {
    pub fn parameter(&self) -> &WithdrawalParameter {
        match self {
            Self::PubKey(w) => w,
            Self::SimpleScript { withdrawal, .. } => withdrawal,
            Self::Script { withdrawal, .. } => withdrawal,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::PubKey(_) => "pub-key",
            Self::SimpleScript { .. } => "simple-script",
            Self::Script { .. } => "script",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolMetadata {
    pub url: String,
    pub hash: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Relay {
    SingleHostAddr {
        ipv4: Option<String>,
        ipv6: Option<String>,
        port: Option<u16>,
    },
    SingleHostName {
        domain_name: String,
        port: Option<u16>,
    },
    MultiHostName {
        domain_name: String,
    },
}

/// Full pool-registration payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PoolParams {
    pub operator: String,
    pub vrf_key_hash: String,
    pub pledge: u64,
    pub cost: u64,
    /// Margin as a (numerator, denominator) rational.
    pub margin: (u64, u64),
    pub reward_address: String,
    pub owners: Vec<String>,
    pub relays: Vec<Relay>,
    pub metadata: Option<PoolMetadata>,
}

/// Stake and pool lifecycle operations carried by a transaction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum CertificateKind {
    RegisterPool(Box<PoolParams>),
    RetirePool { pool_id: String, epoch: u32 },
    RegisterStake { stake_key_address: String },
    DeregisterStake { stake_key_address: String },
    DelegateStake { stake_key_address: String, pool_id: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Certificate {
    Basic(CertificateKind),
    SimpleScript {
        kind: CertificateKind,
        script_source: SimpleScriptSource,
    },
    Script {
        kind: CertificateKind,
        script_source: ScriptSource,
        redeemer: Option<Redeemer>,
    },
}

impl Certificate {
    pub fn kind(&self) -> &CertificateKind {
        match self {
            Self::Basic(kind) => kind,
            Self::SimpleScript { kind, .. } => kind,
            Self::Script { kind, .. } => kind,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::SimpleScript { .. } => "simple-script",
            Self::Script { .. } => "script",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum OutputDatum {
    Hash(BuilderData),
    Inline(BuilderData),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub address: String,
    pub amount: Vec<Asset>,
    pub datum: Option<OutputDatum>,
    pub reference_script: Option<ProvidedScriptSource>,
}

impl Output {
    pub fn new(address: impl Into<String>, amount: Vec<Asset>) -> Self {
        Self {
            address: address.into(),
            amount,
            datum: None,
            reference_script: None,
        }
    }
}

/// One on-chain metadata entry: numeric tag plus the eagerly stringified
/// JSON payload.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadatum {
    pub tag: u64,
    pub metadata: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityRange {
    pub invalid_before: Option<u64>,
    pub invalid_hereafter: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    LargestFirst,
    LargestFirstMultiAsset,
    KeepRelevant,
    #[default]
    Experimental,
}

/// How `complete` turns the candidate pool into balancing inputs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionConfig {
    /// Extra lovelace to select beyond the outputs; covers fees and
    /// min-utxo for the change the outer balancer will add.
    pub threshold: u64,
    pub strategy: SelectionStrategy,
    /// When set, the worst-case transaction fee is added to the
    /// threshold before selecting.
    pub include_tx_fees: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            threshold: 5_000_000,
            strategy: SelectionStrategy::default(),
            include_tx_fees: true,
        }
    }
}

/// The staged transaction: everything the codec needs to produce a
/// CBOR body, in the order the builder collected it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TxBuilderBody {
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<Output>,
    pub collaterals: Vec<TxInParameter>,
    pub reference_inputs: Vec<RefTxIn>,
    pub mints: Vec<MintItem>,
    pub withdrawals: Vec<Withdrawal>,
    pub certificates: Vec<Certificate>,
    pub required_signatures: Vec<String>,
    pub signing_keys: Vec<String>,
    pub metadata: Vec<Metadatum>,
    pub change_address: Option<String>,
    pub validity_range: ValidityRange,
    pub extra_inputs: Vec<Utxo>,
    pub selection_config: SelectionConfig,
}

impl TxBuilderBody {
    /// An empty body, as a freshly constructed builder starts with.
    pub fn new() -> Self {
        Default::default()
    }
}
