use std::collections::HashSet;

use kestrel_primitives::{to_json_string, Asset, BuilderData, Value, ValueDelta, LOVELACE};
use tracing::debug;

use crate::{
    eval,
    model::*,
    params::{max_tx_fee, Protocol, DEFAULT_REDEEMER_BUDGET},
    strategy::select_utxos,
    TxBuilderError,
};

/// The fluent transaction builder.
///
/// Every channel (input, output, mint, withdrawal, collateral) owns a
/// single pending slot: opening a new item on a channel validates and
/// flushes the previous one into the body, so an item is committed
/// exactly when its successor begins or [`TxBuilder::complete`] runs.
/// Certificates are the exception and push directly onto the body, with
/// the decorating operations rewriting the most recent entry.
///
/// Operations that cannot be misused return `&mut Self`; the rest return
/// `Result<&mut Self, TxBuilderError>` so chains compose with `?` and a
/// misuse surfaces at the offending call, never later.
#[derive(Debug, Clone, Default)]
pub struct TxBuilder {
    pub body: TxBuilderBody,
    params: Protocol,

    tx_in_item: Option<TxIn>,
    tx_output: Option<Output>,
    collateral_item: Option<TxInParameter>,
    mint_item: Option<MintItem>,
    withdrawal_item: Option<Withdrawal>,

    adding_plutus_input: bool,
    adding_plutus_mint: bool,
    adding_plutus_withdrawal: bool,
    spending_version: LanguageVersion,
    mint_version: LanguageVersion,
    withdrawal_version: LanguageVersion,
}

fn no_pending(op: &'static str, channel: &'static str) -> TxBuilderError {
    TxBuilderError::NoPendingItem { op, channel }
}

fn wrong_kind(op: &'static str, channel: &'static str, found: &'static str) -> TxBuilderError {
    TxBuilderError::WrongItemKind { op, channel, found }
}

impl TxBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Replaces the protocol parameters the builder works against.
    /// Partial overrides are struct-update syntax over
    /// [`Protocol::default`].
    pub fn protocol_params(&mut self, params: Protocol) -> &mut Self {
        self.params = params;
        self
    }

    // --- input channel ------------------------------------------------

    /// Opens a new input, flushing any pending one. The input is opened
    /// in script mode when a `spending_plutus_script_v*` call precedes
    /// it, pub-key mode otherwise.
    ///
    /// `amount` and `address` are the resolved output being spent; the
    /// amount is what UTxO selection counts as already provided.
    pub fn tx_in(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        amount: Option<Vec<Asset>>,
        address: Option<&str>,
    ) -> Result<&mut Self, TxBuilderError> {
        self.flush_input()?;

        let tx_in = TxInParameter {
            tx_hash: tx_hash.to_string(),
            tx_index,
            amount,
            address: address.map(Into::into),
        };

        self.tx_in_item = Some(if self.adding_plutus_input {
            TxIn::Script(ScriptTxIn {
                tx_in,
                script_source: None,
                datum_source: None,
                redeemer: None,
            })
        } else {
            TxIn::PubKey(tx_in)
        });
        self.adding_plutus_input = false;

        Ok(self)
    }

    pub fn spending_plutus_script_v1(&mut self) -> &mut Self {
        self.adding_plutus_input = true;
        self.spending_version = LanguageVersion::V1;
        self
    }

    pub fn spending_plutus_script_v2(&mut self) -> &mut Self {
        self.adding_plutus_input = true;
        self.spending_version = LanguageVersion::V2;
        self
    }

    pub fn spending_plutus_script_v3(&mut self) -> &mut Self {
        self.adding_plutus_input = true;
        self.spending_version = LanguageVersion::V3;
        self
    }

    /// Attaches a provided script to the pending input: promotes a
    /// pub-key input to a simple-script one, or sets the script source
    /// of a Plutus input using the latched version.
    pub fn tx_in_script(&mut self, script_cbor: &str) -> Result<&mut Self, TxBuilderError> {
        let item = self
            .tx_in_item
            .take()
            .ok_or(no_pending("tx_in_script", "input"))?;

        match item {
            TxIn::PubKey(tx_in) => {
                self.tx_in_item = Some(TxIn::SimpleScript(SimpleScriptTxIn {
                    tx_in,
                    script_source: SimpleScriptSource::Provided {
                        script_cbor: script_cbor.to_string(),
                    },
                }));
            }
            TxIn::Script(mut script_tx_in) => {
                script_tx_in.script_source =
                    Some(ScriptSource::Provided(ProvidedScriptSource {
                        script_cbor: script_cbor.to_string(),
                        language_version: self.spending_version,
                    }));
                self.tx_in_item = Some(TxIn::Script(script_tx_in));
            }
            TxIn::SimpleScript(_) => {
                self.tx_in_item = Some(item);
                return Err(wrong_kind("tx_in_script", "input", "simple-script"));
            }
        }

        Ok(self)
    }

    pub fn tx_in_datum_value(
        &mut self,
        data: impl Into<BuilderData>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.tx_in_item.as_mut() {
            Some(TxIn::Script(s)) => s.datum_source = Some(DatumSource::Provided(data.into())),
            Some(other) => {
                return Err(wrong_kind("tx_in_datum_value", "input", other.kind_name()))
            }
            None => return Err(no_pending("tx_in_datum_value", "input")),
        }

        Ok(self)
    }

    /// Marks the pending script input's datum as inlined on the spent
    /// output itself.
    pub fn tx_in_inline_datum_present(&mut self) -> Result<&mut Self, TxBuilderError> {
        match self.tx_in_item.as_mut() {
            Some(TxIn::Script(s)) => {
                let ref_tx_in = RefTxIn::new(s.tx_in.tx_hash.clone(), s.tx_in.tx_index);
                s.datum_source = Some(DatumSource::Inline(ref_tx_in));
            }
            Some(other) => {
                return Err(wrong_kind(
                    "tx_in_inline_datum_present",
                    "input",
                    other.kind_name(),
                ))
            }
            None => return Err(no_pending("tx_in_inline_datum_present", "input")),
        }

        Ok(self)
    }

    /// Sets the pending script input's redeemer. Without explicit
    /// `ex_units` the default budget applies until the evaluation
    /// reconciler overwrites it.
    pub fn tx_in_redeemer_value(
        &mut self,
        data: impl Into<BuilderData>,
        ex_units: Option<ExUnits>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.tx_in_item.as_mut() {
            Some(TxIn::Script(s)) => {
                s.redeemer = Some(Redeemer {
                    data: data.into(),
                    ex_units: ex_units.unwrap_or(DEFAULT_REDEEMER_BUDGET),
                });
            }
            Some(other) => {
                return Err(wrong_kind("tx_in_redeemer_value", "input", other.kind_name()))
            }
            None => return Err(no_pending("tx_in_redeemer_value", "input")),
        }

        Ok(self)
    }

    /// Points the pending script input at an on-chain script carried by
    /// a reference input. Uses the latched Plutus version, V2 when none
    /// was latched.
    pub fn spending_tx_in_reference(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        script_hash: Option<&str>,
        script_size: Option<u64>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.tx_in_item.as_mut() {
            Some(TxIn::Script(s)) => {
                s.script_source = Some(ScriptSource::Inline(InlineScriptSource {
                    ref_tx_in: RefTxIn::new(tx_hash, tx_index),
                    script_hash: script_hash.map(Into::into),
                    language_version: self.spending_version,
                    script_size,
                }));
            }
            Some(other) => {
                return Err(wrong_kind(
                    "spending_tx_in_reference",
                    "input",
                    other.kind_name(),
                ))
            }
            None => return Err(no_pending("spending_tx_in_reference", "input")),
        }

        Ok(self)
    }

    /// Appends a read-only reference input. Bypasses the pending slot.
    pub fn read_only_tx_in_reference(&mut self, tx_hash: &str, tx_index: u32) -> &mut Self {
        self.body
            .reference_inputs
            .push(RefTxIn::new(tx_hash, tx_index));
        self
    }

    fn flush_input(&mut self) -> Result<(), TxBuilderError> {
        if let Some(item) = &self.tx_in_item {
            check_input_complete(item)?;
        }

        if let Some(item) = self.tx_in_item.take() {
            self.body.inputs.push(item);
        }

        Ok(())
    }

    // --- output channel -----------------------------------------------

    /// Opens a new output, flushing any pending one.
    pub fn tx_out(&mut self, address: &str, amount: Vec<Asset>) -> &mut Self {
        if let Some(output) = self.tx_output.take() {
            self.body.outputs.push(output);
        }

        self.tx_output = Some(Output::new(address, amount));
        self
    }

    /// Attaches a by-hash datum to the pending output. No-op when no
    /// output is pending.
    pub fn tx_out_datum_hash_value(&mut self, data: impl Into<BuilderData>) -> &mut Self {
        if let Some(output) = self.tx_output.as_mut() {
            output.datum = Some(OutputDatum::Hash(data.into()));
        }
        self
    }

    /// Attaches an inline datum to the pending output. No-op when no
    /// output is pending.
    pub fn tx_out_inline_datum_value(&mut self, data: impl Into<BuilderData>) -> &mut Self {
        if let Some(output) = self.tx_output.as_mut() {
            output.datum = Some(OutputDatum::Inline(data.into()));
        }
        self
    }

    /// Embeds a reference script in the pending output. No-op when no
    /// output is pending.
    pub fn tx_out_reference_script(
        &mut self,
        script_cbor: &str,
        version: LanguageVersion,
    ) -> &mut Self {
        if let Some(output) = self.tx_output.as_mut() {
            output.reference_script = Some(ProvidedScriptSource {
                script_cbor: script_cbor.to_string(),
                language_version: version,
            });
        }
        self
    }

    // --- mint channel -------------------------------------------------

    pub fn mint_plutus_script_v1(&mut self) -> &mut Self {
        self.adding_plutus_mint = true;
        self.mint_version = LanguageVersion::V1;
        self
    }

    pub fn mint_plutus_script_v2(&mut self) -> &mut Self {
        self.adding_plutus_mint = true;
        self.mint_version = LanguageVersion::V2;
        self
    }

    pub fn mint_plutus_script_v3(&mut self) -> &mut Self {
        self.adding_plutus_mint = true;
        self.mint_version = LanguageVersion::V3;
        self
    }

    /// Opens a new mint (or burn, with a negative amount), flushing any
    /// pending one. `asset_name` is hex-encoded.
    pub fn mint(
        &mut self,
        amount: i64,
        policy_id: &str,
        asset_name: &str,
    ) -> Result<&mut Self, TxBuilderError> {
        if !asset_name.is_empty() && hex::decode(asset_name).is_err() {
            return Err(TxBuilderError::InvalidAssetName(asset_name.to_string()));
        }

        self.flush_mint()?;

        self.mint_item = Some(if self.adding_plutus_mint {
            MintItem::Plutus(PlutusMint {
                policy_id: policy_id.to_string(),
                asset_name: asset_name.to_string(),
                amount,
                script_source: None,
                redeemer: None,
            })
        } else {
            MintItem::Native(NativeMint {
                policy_id: policy_id.to_string(),
                asset_name: asset_name.to_string(),
                amount,
                script_source: None,
            })
        });
        self.adding_plutus_mint = false;

        Ok(self)
    }

    /// Attaches the minting policy script to the pending mint, in the
    /// shape matching the mint's kind.
    pub fn minting_script(&mut self, script_cbor: &str) -> Result<&mut Self, TxBuilderError> {
        match self.mint_item.as_mut() {
            Some(MintItem::Native(m)) => {
                m.script_source = Some(SimpleScriptSource::Provided {
                    script_cbor: script_cbor.to_string(),
                });
            }
            Some(MintItem::Plutus(m)) => {
                m.script_source = Some(ScriptSource::Provided(ProvidedScriptSource {
                    script_cbor: script_cbor.to_string(),
                    language_version: self.mint_version,
                }));
            }
            None => return Err(no_pending("minting_script", "mint")),
        }

        Ok(self)
    }

    /// Points the pending Plutus mint at an on-chain policy script.
    /// Uses the latched version, V2 when none was latched.
    pub fn mint_tx_in_reference(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        script_hash: Option<&str>,
        script_size: Option<u64>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.mint_item.as_mut() {
            Some(MintItem::Plutus(m)) => {
                m.script_source = Some(ScriptSource::Inline(InlineScriptSource {
                    ref_tx_in: RefTxIn::new(tx_hash, tx_index),
                    script_hash: script_hash.map(Into::into),
                    language_version: self.mint_version,
                    script_size,
                }));
            }
            Some(other) => {
                return Err(wrong_kind("mint_tx_in_reference", "mint", other.kind_name()))
            }
            None => return Err(no_pending("mint_tx_in_reference", "mint")),
        }

        Ok(self)
    }

    pub fn mint_redeemer_value(
        &mut self,
        data: impl Into<BuilderData>,
        ex_units: Option<ExUnits>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.mint_item.as_mut() {
            Some(MintItem::Plutus(m)) => {
                m.redeemer = Some(Redeemer {
                    data: data.into(),
                    ex_units: ex_units.unwrap_or(DEFAULT_REDEEMER_BUDGET),
                });
            }
            Some(other) => {
                return Err(wrong_kind("mint_redeemer_value", "mint", other.kind_name()))
            }
            None => return Err(no_pending("mint_redeemer_value", "mint")),
        }

        Ok(self)
    }

    pub fn mint_reference_tx_in_redeemer_value(
        &mut self,
        data: impl Into<BuilderData>,
        ex_units: Option<ExUnits>,
    ) -> Result<&mut Self, TxBuilderError> {
        self.mint_redeemer_value(data, ex_units)
    }

    fn flush_mint(&mut self) -> Result<(), TxBuilderError> {
        if let Some(item) = &self.mint_item {
            check_mint_complete(item)?;
        }

        if let Some(item) = self.mint_item.take() {
            self.body.mints.push(item);
        }

        Ok(())
    }

    // --- withdrawal channel -------------------------------------------

    pub fn withdrawal_plutus_script_v1(&mut self) -> &mut Self {
        self.adding_plutus_withdrawal = true;
        self.withdrawal_version = LanguageVersion::V1;
        self
    }

    pub fn withdrawal_plutus_script_v2(&mut self) -> &mut Self {
        self.adding_plutus_withdrawal = true;
        self.withdrawal_version = LanguageVersion::V2;
        self
    }

    pub fn withdrawal_plutus_script_v3(&mut self) -> &mut Self {
        self.adding_plutus_withdrawal = true;
        self.withdrawal_version = LanguageVersion::V3;
        self
    }

    /// Opens a new withdrawal, flushing any pending one. `address` must
    /// be a bech32 reward address (`stake...` / `stake_test...`); the
    /// builder checks the prefix only, full decoding is the codec's job.
    pub fn withdrawal(&mut self, address: &str, coin: u64) -> Result<&mut Self, TxBuilderError> {
        self.flush_withdrawal()?;

        if !address.starts_with("stake") {
            return Err(TxBuilderError::InvalidRewardAddress(address.to_string()));
        }

        let withdrawal = WithdrawalParameter {
            address: address.to_string(),
            coin,
        };

        self.withdrawal_item = Some(if self.adding_plutus_withdrawal {
            Withdrawal::Script {
                withdrawal,
                script_source: None,
                redeemer: None,
            }
        } else {
            Withdrawal::PubKey(withdrawal)
        });
        self.adding_plutus_withdrawal = false;

        Ok(self)
    }

    /// Attaches a provided script to the pending withdrawal: promotes a
    /// pub-key withdrawal to a simple-script one, or sets the Plutus
    /// script source using the latched version.
    pub fn withdrawal_script(&mut self, script_cbor: &str) -> Result<&mut Self, TxBuilderError> {
        let item = self
            .withdrawal_item
            .take()
            .ok_or(no_pending("withdrawal_script", "withdrawal"))?;

        match item {
            Withdrawal::PubKey(withdrawal) => {
                self.withdrawal_item = Some(Withdrawal::SimpleScript {
                    withdrawal,
                    script_source: SimpleScriptSource::Provided {
                        script_cbor: script_cbor.to_string(),
                    },
                });
            }
            Withdrawal::Script {
                withdrawal,
                redeemer,
                ..
            } => {
                self.withdrawal_item = Some(Withdrawal::Script {
                    withdrawal,
                    script_source: Some(ScriptSource::Provided(ProvidedScriptSource {
                        script_cbor: script_cbor.to_string(),
                        language_version: self.withdrawal_version,
                    })),
                    redeemer,
                });
            }
            Withdrawal::SimpleScript { .. } => {
                self.withdrawal_item = Some(item);
                return Err(wrong_kind("withdrawal_script", "withdrawal", "simple-script"));
            }
        }

        Ok(self)
    }

    pub fn withdrawal_tx_in_reference(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        script_hash: Option<&str>,
        script_size: Option<u64>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.withdrawal_item.as_mut() {
            Some(Withdrawal::Script { script_source, .. }) => {
                *script_source = Some(ScriptSource::Inline(InlineScriptSource {
                    ref_tx_in: RefTxIn::new(tx_hash, tx_index),
                    script_hash: script_hash.map(Into::into),
                    language_version: self.withdrawal_version,
                    script_size,
                }));
            }
            Some(other) => {
                return Err(wrong_kind(
                    "withdrawal_tx_in_reference",
                    "withdrawal",
                    other.kind_name(),
                ))
            }
            None => return Err(no_pending("withdrawal_tx_in_reference", "withdrawal")),
        }

        Ok(self)
    }

    pub fn withdrawal_redeemer_value(
        &mut self,
        data: impl Into<BuilderData>,
        ex_units: Option<ExUnits>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.withdrawal_item.as_mut() {
            Some(Withdrawal::Script { redeemer, .. }) => {
                *redeemer = Some(Redeemer {
                    data: data.into(),
                    ex_units: ex_units.unwrap_or(DEFAULT_REDEEMER_BUDGET),
                });
            }
            Some(other) => {
                return Err(wrong_kind(
                    "withdrawal_redeemer_value",
                    "withdrawal",
                    other.kind_name(),
                ))
            }
            None => return Err(no_pending("withdrawal_redeemer_value", "withdrawal")),
        }

        Ok(self)
    }

    fn flush_withdrawal(&mut self) -> Result<(), TxBuilderError> {
        if let Some(item) = &self.withdrawal_item {
            check_withdrawal_complete(item)?;
        }

        if let Some(item) = self.withdrawal_item.take() {
            self.body.withdrawals.push(item);
        }

        Ok(())
    }

    // --- certificate channel ------------------------------------------

    pub fn register_stake_certificate(&mut self, stake_key_address: &str) -> &mut Self {
        self.push_certificate(CertificateKind::RegisterStake {
            stake_key_address: stake_key_address.to_string(),
        })
    }

    pub fn deregister_stake_certificate(&mut self, stake_key_address: &str) -> &mut Self {
        self.push_certificate(CertificateKind::DeregisterStake {
            stake_key_address: stake_key_address.to_string(),
        })
    }

    pub fn delegate_stake_certificate(
        &mut self,
        stake_key_address: &str,
        pool_id: &str,
    ) -> &mut Self {
        self.push_certificate(CertificateKind::DelegateStake {
            stake_key_address: stake_key_address.to_string(),
            pool_id: pool_id.to_string(),
        })
    }

    pub fn register_pool_certificate(&mut self, pool_params: PoolParams) -> &mut Self {
        self.push_certificate(CertificateKind::RegisterPool(Box::new(pool_params)))
    }

    pub fn retire_pool_certificate(&mut self, pool_id: &str, epoch: u32) -> &mut Self {
        self.push_certificate(CertificateKind::RetirePool {
            pool_id: pool_id.to_string(),
            epoch,
        })
    }

    fn push_certificate(&mut self, kind: CertificateKind) -> &mut Self {
        self.body.certificates.push(Certificate::Basic(kind));
        self
    }

    /// Rewrites the last certificate as script-witnessed: simple-script
    /// without a version, Plutus with one. A redeemer already set on the
    /// certificate is preserved.
    pub fn certificate_script(
        &mut self,
        script_cbor: &str,
        version: Option<LanguageVersion>,
    ) -> Result<&mut Self, TxBuilderError> {
        let cert = self
            .body
            .certificates
            .pop()
            .ok_or(no_pending("certificate_script", "certificate"))?;

        let (kind, redeemer) = dismantle_certificate(cert);

        let rebuilt = match version {
            None => Certificate::SimpleScript {
                kind,
                script_source: SimpleScriptSource::Provided {
                    script_cbor: script_cbor.to_string(),
                },
            },
            Some(language_version) => Certificate::Script {
                kind,
                script_source: ScriptSource::Provided(ProvidedScriptSource {
                    script_cbor: script_cbor.to_string(),
                    language_version,
                }),
                redeemer,
            },
        };

        self.body.certificates.push(rebuilt);
        Ok(self)
    }

    /// Reference-input counterpart of [`TxBuilder::certificate_script`].
    pub fn certificate_tx_in_reference(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        script_hash: Option<&str>,
        script_size: Option<u64>,
        version: Option<LanguageVersion>,
    ) -> Result<&mut Self, TxBuilderError> {
        let cert = self
            .body
            .certificates
            .pop()
            .ok_or(no_pending("certificate_tx_in_reference", "certificate"))?;

        let (kind, redeemer) = dismantle_certificate(cert);
        let ref_tx_in = RefTxIn::new(tx_hash, tx_index);

        let rebuilt = match version {
            None => Certificate::SimpleScript {
                kind,
                script_source: SimpleScriptSource::Inline {
                    ref_tx_in,
                    script_hash: script_hash.map(Into::into),
                },
            },
            Some(language_version) => Certificate::Script {
                kind,
                script_source: ScriptSource::Inline(InlineScriptSource {
                    ref_tx_in,
                    script_hash: script_hash.map(Into::into),
                    language_version,
                    script_size,
                }),
                redeemer,
            },
        };

        self.body.certificates.push(rebuilt);
        Ok(self)
    }

    pub fn certificate_redeemer_value(
        &mut self,
        data: impl Into<BuilderData>,
        ex_units: Option<ExUnits>,
    ) -> Result<&mut Self, TxBuilderError> {
        match self.body.certificates.last_mut() {
            Some(Certificate::Script { redeemer, .. }) => {
                *redeemer = Some(Redeemer {
                    data: data.into(),
                    ex_units: ex_units.unwrap_or(DEFAULT_REDEEMER_BUDGET),
                });
            }
            Some(other) => {
                return Err(wrong_kind(
                    "certificate_redeemer_value",
                    "certificate",
                    other.kind_name(),
                ))
            }
            None => return Err(no_pending("certificate_redeemer_value", "certificate")),
        }

        Ok(self)
    }

    // --- collateral channel -------------------------------------------

    /// Opens a new collateral input, flushing any pending one.
    /// Collaterals are always pub-key guarded.
    pub fn tx_in_collateral(
        &mut self,
        tx_hash: &str,
        tx_index: u32,
        amount: Option<Vec<Asset>>,
        address: Option<&str>,
    ) -> &mut Self {
        if let Some(collateral) = self.collateral_item.take() {
            self.body.collaterals.push(collateral);
        }

        self.collateral_item = Some(TxInParameter {
            tx_hash: tx_hash.to_string(),
            tx_index,
            amount,
            address: address.map(Into::into),
        });
        self
    }

    // --- global operations --------------------------------------------

    pub fn change_address(&mut self, address: &str) -> &mut Self {
        self.body.change_address = Some(address.to_string());
        self
    }

    pub fn invalid_before(&mut self, slot: u64) -> &mut Self {
        self.body.validity_range.invalid_before = Some(slot);
        self
    }

    pub fn invalid_hereafter(&mut self, slot: u64) -> &mut Self {
        self.body.validity_range.invalid_hereafter = Some(slot);
        self
    }

    /// Attaches a metadata entry under `tag`. The JSON payload is
    /// stringified immediately, preserving arbitrary-precision integers.
    pub fn metadata_value(
        &mut self,
        tag: u64,
        metadata: &serde_json::Value,
    ) -> Result<&mut Self, TxBuilderError> {
        self.body.metadata.push(Metadatum {
            tag,
            metadata: to_json_string(metadata)?,
        });
        Ok(self)
    }

    pub fn signing_key(&mut self, skey_hex: &str) -> &mut Self {
        self.body.signing_keys.push(skey_hex.to_string());
        self
    }

    pub fn required_signer_hash(&mut self, pub_key_hash_hex: &str) -> &mut Self {
        self.body
            .required_signatures
            .push(pub_key_hash_hex.to_string());
        self
    }

    /// Hands the builder a candidate pool and the selection settings
    /// `complete` will balance with.
    pub fn select_utxos_from(
        &mut self,
        extra_inputs: Vec<Utxo>,
        strategy: SelectionStrategy,
        threshold: u64,
        include_tx_fees: bool,
    ) -> &mut Self {
        self.body.extra_inputs = extra_inputs;
        self.body.selection_config = SelectionConfig {
            threshold,
            strategy,
            include_tx_fees,
        };
        self
    }

    /// Returns the builder to the state of a freshly constructed one.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::new();
        self
    }

    // --- finalize -----------------------------------------------------

    /// Flushes every channel's pending item, validating completeness:
    /// output, input, collateral, mint, withdrawal, in that order.
    pub fn queue_all_last_item(&mut self) -> Result<&mut Self, TxBuilderError> {
        if let Some(output) = self.tx_output.take() {
            self.body.outputs.push(output);
        }

        self.flush_input()?;

        if let Some(collateral) = self.collateral_item.take() {
            self.body.collaterals.push(collateral);
        }

        self.flush_mint()?;
        self.flush_withdrawal()?;

        Ok(self)
    }

    /// Drains all pending slots, balances the transaction from the
    /// candidate pool when one was supplied, and removes duplicate
    /// inputs. On success the body is ready for the codec.
    ///
    /// A selection failure leaves the body without any partially
    /// selected inputs.
    pub fn complete(&mut self) -> Result<&mut Self, TxBuilderError> {
        self.queue_all_last_item()?;
        self.check_certificates()?;

        if !self.body.extra_inputs.is_empty() {
            let required = self.required_balance();
            let selected = select_utxos(
                &self.body.extra_inputs,
                &required,
                self.body.selection_config.strategy,
            )?;

            debug!(selected = selected.len(), "utxo selection finished");

            for utxo in selected {
                self.body.inputs.push(TxIn::PubKey(TxInParameter {
                    tx_hash: utxo.input.tx_hash,
                    tx_index: utxo.input.output_index,
                    amount: Some(utxo.output.amount),
                    address: Some(utxo.output.address),
                }));
            }
        }

        self.remove_duplicate_inputs();
        Ok(self)
    }

    /// Folds a batch of script-evaluation results back onto the matching
    /// redeemer slots, applying the default safety multiplier.
    pub fn update_redeemer(&mut self, actions: &[eval::Action]) -> &mut Self {
        eval::update_redeemer(&mut self.body, actions);
        self
    }

    /// First occurrence of each `(tx_hash, tx_index)` wins; survivor
    /// order is preserved.
    pub fn remove_duplicate_inputs(&mut self) -> &mut Self {
        let mut seen = HashSet::new();

        self.body.inputs.retain(|input| {
            let (tx_hash, tx_index) = input.reference();
            seen.insert((tx_hash.to_string(), tx_index))
        });
        self
    }

    /// What the transaction still owes per unit: outputs minus known
    /// input amounts minus mints plus burns, padded with the selection
    /// threshold and, when configured, the worst-case fee.
    fn required_balance(&self) -> ValueDelta {
        let mut delta = ValueDelta::new();

        for output in &self.body.outputs {
            delta.require(&Value::from_assets(&output.amount));
        }

        for input in &self.body.inputs {
            if let Some(amount) = &input.tx_in().amount {
                delta.provide(&Value::from_assets(amount));
            }
        }

        for mint in &self.body.mints {
            delta.add(&mint.unit(), -(mint.amount() as i128));
        }

        let config = &self.body.selection_config;
        let mut pad = config.threshold as i128;
        if config.include_tx_fees {
            pad += max_tx_fee(&self.params) as i128;
        }
        delta.add(LOVELACE, pad);

        delta
    }

    fn check_certificates(&self) -> Result<(), TxBuilderError> {
        for (index, cert) in self.body.certificates.iter().enumerate() {
            if let Certificate::Script { redeemer: None, .. } = cert {
                return Err(TxBuilderError::IncompleteCertificate { index });
            }
        }
        Ok(())
    }
}

fn dismantle_certificate(cert: Certificate) -> (CertificateKind, Option<Redeemer>) {
    match cert {
        Certificate::Basic(kind) => (kind, None),
        Certificate::SimpleScript { kind, .. } => (kind, None),
        Certificate::Script { kind, redeemer, .. } => (kind, redeemer),
    }
}

fn check_input_complete(input: &TxIn) -> Result<(), TxBuilderError> {
    if let TxIn::Script(s) = input {
        let missing = if s.script_source.is_none() {
            Some("script source")
        } else if s.datum_source.is_none() {
            Some("datum source")
        } else if s.redeemer.is_none() {
            Some("redeemer")
        } else {
            None
        };

        if let Some(field) = missing {
            return Err(TxBuilderError::IncompleteScriptInput {
                tx_hash: s.tx_in.tx_hash.clone(),
                tx_index: s.tx_in.tx_index,
                field,
            });
        }
    }

    Ok(())
}

fn check_mint_complete(mint: &MintItem) -> Result<(), TxBuilderError> {
    let missing = match mint {
        MintItem::Native(m) => m.script_source.is_none().then_some("script source"),
        MintItem::Plutus(m) => {
            if m.policy_id.is_empty() {
                Some("policy id")
            } else if m.script_source.is_none() {
                Some("script source")
            } else if m.redeemer.is_none() {
                Some("redeemer")
            } else {
                None
            }
        }
    };

    if let Some(field) = missing {
        return Err(TxBuilderError::IncompleteMint {
            policy_id: mint.policy_id().to_string(),
            asset_name: mint.asset_name().to_string(),
            field,
        });
    }

    Ok(())
}

fn check_withdrawal_complete(withdrawal: &Withdrawal) -> Result<(), TxBuilderError> {
    if let Withdrawal::Script {
        withdrawal: parameter,
        script_source,
        redeemer,
    } = withdrawal
    {
        let missing = if script_source.is_none() {
            Some("script source")
        } else if redeemer.is_none() {
            Some("redeemer")
        } else {
            None
        };

        if let Some(field) = missing {
            return Err(TxBuilderError::IncompleteWithdrawal {
                address: parameter.address.clone(),
                field,
            });
        }
    }

    Ok(())
}
