use kestrel_txbuilder::prelude::*;
use proptest::prelude::*;

fn hash(tag: u8) -> String {
    format!("{tag:02x}").repeat(32)
}

proptest! {
    #[test]
    fn dedup_is_idempotent_and_keeps_first_occurrence(
        refs in prop::collection::vec((0u8..4, 0u32..3), 0..24),
    ) {
        let mut builder = TxBuilder::new();
        builder.body.inputs = refs
            .iter()
            .map(|(tag, index)| {
                TxIn::PubKey(TxInParameter {
                    tx_hash: hash(*tag),
                    tx_index: *index,
                    amount: None,
                    address: None,
                })
            })
            .collect();

        builder.remove_duplicate_inputs();
        let once = builder.body.inputs.clone();

        builder.remove_duplicate_inputs();
        prop_assert_eq!(&builder.body.inputs, &once);

        let mut expected = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (tag, index) in &refs {
            if seen.insert((*tag, *index)) {
                expected.push((hash(*tag), *index));
            }
        }

        let survivors: Vec<(String, u32)> = once
            .iter()
            .map(|input| {
                let (h, i) = input.reference();
                (h.to_string(), i)
            })
            .collect();
        prop_assert_eq!(survivors, expected);
    }

    #[test]
    fn channel_opens_match_flushed_lengths(
        inputs in 0u32..8,
        outputs in 0u32..8,
        mints in 0u32..6,
        withdrawals in 0u32..6,
    ) {
        let mut builder = TxBuilder::new();

        for i in 0..inputs {
            builder.tx_in(&hash(1), i, None, None).unwrap();
        }
        for i in 0..outputs {
            builder.tx_out("addr1receiver", vec![Asset::lovelace(u64::from(i) + 1)]);
        }
        for i in 0..mints {
            builder
                .mint(1, &hash(2), &format!("{i:02x}"))
                .unwrap()
                .minting_script("4e4d0100")
                .unwrap();
        }
        for i in 0..withdrawals {
            builder.withdrawal(&format!("stake1acc{i}"), 0).unwrap();
        }

        builder.queue_all_last_item().unwrap();

        prop_assert_eq!(builder.body.inputs.len(), inputs as usize);
        prop_assert_eq!(builder.body.outputs.len(), outputs as usize);
        prop_assert_eq!(builder.body.mints.len(), mints as usize);
        prop_assert_eq!(builder.body.withdrawals.len(), withdrawals as usize);
    }

    #[test]
    fn selection_success_covers_the_requirement(
        pool_coins in prop::collection::vec(1u64..10_000_000, 1..10),
        required in 0i128..20_000_000,
    ) {
        let pool: Vec<Utxo> = pool_coins
            .iter()
            .enumerate()
            .map(|(i, coin)| {
                Utxo::new(hash(3), i as u32, "addr1pool", vec![Asset::lovelace(*coin)])
            })
            .collect();

        let mut delta = ValueDelta::new();
        delta.add(LOVELACE, required);

        for strategy in [
            SelectionStrategy::LargestFirst,
            SelectionStrategy::LargestFirstMultiAsset,
            SelectionStrategy::KeepRelevant,
            SelectionStrategy::Experimental,
        ] {
            if let Ok(selected) = select_utxos(&pool, &delta, strategy) {
                let total: u64 = selected
                    .iter()
                    .flat_map(|u| u.output.amount.iter())
                    .map(|asset| asset.quantity)
                    .sum();

                prop_assert!(i128::from(total) >= required);
            }
        }
    }

    #[test]
    fn reconciled_budgets_never_shrink(
        mem in 0u64..1 << 50,
        steps in 0u64..1 << 50,
        multiplier in 1.0f64..2.0,
    ) {
        let mut builder = TxBuilder::new();
        builder
            .spending_plutus_script_v2()
            .tx_in(&hash(4), 0, None, None)
            .unwrap()
            .tx_in_script("4e4d0100")
            .unwrap()
            .tx_in_inline_datum_present()
            .unwrap()
            .tx_in_redeemer_value(int(0), None)
            .unwrap()
            .complete()
            .unwrap();

        let budget = ExUnits { mem, steps };
        update_redeemer_with(
            &mut builder.body,
            &[Action { tag: RedeemerTag::Spend, index: 0, budget }],
            multiplier,
        );

        let TxIn::Script(s) = &builder.body.inputs[0] else {
            panic!("input should be script-witnessed");
        };
        let ex_units = s.redeemer.as_ref().unwrap().ex_units;

        prop_assert!(ex_units.mem >= mem);
        prop_assert!(ex_units.steps >= steps);
    }

    #[test]
    fn double_reset_equals_single_reset(tag in 0u8..8, index in 0u32..4) {
        let mut once = TxBuilder::new();
        once.tx_in(&hash(tag), index, None, None).unwrap().reset();

        let mut twice = TxBuilder::new();
        twice.tx_in(&hash(tag), index, None, None).unwrap().reset().reset();

        prop_assert_eq!(format!("{once:?}"), format!("{twice:?}"));
    }
}
