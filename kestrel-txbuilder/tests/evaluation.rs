use kestrel_txbuilder::prelude::*;

fn hash(tag: &str) -> String {
    tag.repeat(32)
}

fn plutus_spend_builder() -> TxBuilder {
    let mut builder = TxBuilder::new();

    builder
        .spending_plutus_script_v2()
        .tx_in(
            &hash("bb"),
            1,
            Some(vec![Asset::lovelace(5_000_000)]),
            Some("addr1script"),
        )
        .unwrap()
        .tx_in_script("4e4d01000033222220051200120011")
        .unwrap()
        .tx_in_inline_datum_present()
        .unwrap()
        .tx_in_redeemer_value(int(42), None)
        .unwrap()
        .tx_in(
            &hash("cc"),
            0,
            Some(vec![Asset::lovelace(3_000_000)]),
            Some("addr1sender"),
        )
        .unwrap()
        .complete()
        .unwrap();

    builder
}

fn spend_ex_units(body: &TxBuilderBody, index: usize) -> ExUnits {
    let TxIn::Script(s) = &body.inputs[index] else {
        panic!("input {index} should be script-witnessed");
    };
    s.redeemer.as_ref().expect("redeemer should be set").ex_units
}

#[test]
fn test_spend_budget_lands_with_safety_margin() {
    let mut builder = plutus_spend_builder();

    builder.update_redeemer(&[Action {
        tag: RedeemerTag::Spend,
        index: 0,
        budget: ExUnits {
            mem: 1000,
            steps: 2000,
        },
    }]);

    assert_eq!(
        spend_ex_units(&builder.body, 0),
        ExUnits {
            mem: 1100,
            steps: 2200,
        }
    );

    // the pub-key input has no redeemer and stays untouched
    assert!(matches!(builder.body.inputs[1], TxIn::PubKey(_)));
}

#[test]
fn test_non_matching_slots_are_skipped_silently() {
    let mut builder = plutus_spend_builder();
    let before = builder.body.clone();

    builder.update_redeemer(&[
        // pub-key input: no redeemer to update
        Action {
            tag: RedeemerTag::Spend,
            index: 1,
            budget: ExUnits { mem: 1, steps: 1 },
        },
        // out of range entirely
        Action {
            tag: RedeemerTag::Mint,
            index: 7,
            budget: ExUnits { mem: 1, steps: 1 },
        },
        Action {
            tag: RedeemerTag::Reward,
            index: 0,
            budget: ExUnits { mem: 1, steps: 1 },
        },
    ]);

    assert_eq!(builder.body, before);
}

#[test]
fn test_mint_cert_and_reward_slots_are_addressed_by_tag() {
    let mut builder = TxBuilder::new();

    builder
        .mint_plutus_script_v2()
        .mint(1, "policy1", "aa")
        .unwrap()
        .minting_script("4e4d0100")
        .unwrap()
        .mint_redeemer_value(int(0), None)
        .unwrap()
        .withdrawal_plutus_script_v2()
        .withdrawal("stake1scripted", 0)
        .unwrap()
        .withdrawal_script("4e4d0100")
        .unwrap()
        .withdrawal_redeemer_value(int(0), None)
        .unwrap()
        .register_stake_certificate("stake1owner")
        .certificate_script("4e4d0100", Some(LanguageVersion::V2))
        .unwrap()
        .certificate_redeemer_value(int(0), None)
        .unwrap()
        .complete()
        .unwrap();

    update_redeemer_with(
        &mut builder.body,
        &[
            Action {
                tag: RedeemerTag::Mint,
                index: 0,
                budget: ExUnits {
                    mem: 100,
                    steps: 200,
                },
            },
            Action {
                tag: RedeemerTag::Cert,
                index: 0,
                budget: ExUnits {
                    mem: 300,
                    steps: 400,
                },
            },
            Action {
                tag: RedeemerTag::Reward,
                index: 0,
                budget: ExUnits {
                    mem: 500,
                    steps: 600,
                },
            },
        ],
        2.0,
    );

    let MintItem::Plutus(mint) = &builder.body.mints[0] else {
        panic!("mint should be plutus");
    };
    assert_eq!(
        mint.redeemer.as_ref().unwrap().ex_units,
        ExUnits {
            mem: 200,
            steps: 400,
        }
    );

    let Certificate::Script { redeemer, .. } = &builder.body.certificates[0] else {
        panic!("certificate should be script-witnessed");
    };
    assert_eq!(
        redeemer.as_ref().unwrap().ex_units,
        ExUnits {
            mem: 600,
            steps: 800,
        }
    );

    let Withdrawal::Script { redeemer, .. } = &builder.body.withdrawals[0] else {
        panic!("withdrawal should be script-witnessed");
    };
    assert_eq!(
        redeemer.as_ref().unwrap().ex_units,
        ExUnits {
            mem: 1000,
            steps: 1200,
        }
    );
}
