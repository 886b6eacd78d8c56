use kestrel_txbuilder::prelude::*;

fn hash(tag: &str) -> String {
    tag.repeat(32)
}

fn lovelace_utxo(tag: &str, coin: u64) -> Utxo {
    Utxo::new(hash(tag), 0, "addr1pool", vec![Asset::lovelace(coin)])
}

fn require_lovelace(amount: i128) -> ValueDelta {
    let mut delta = ValueDelta::new();
    delta.add(LOVELACE, amount);
    delta
}

#[test]
fn test_largest_first_takes_single_covering_utxo() {
    let pool = vec![
        lovelace_utxo("01", 3_000_000),
        lovelace_utxo("02", 5_000_000),
        lovelace_utxo("03", 10_000_000),
    ];

    let selected = select_utxos(
        &pool,
        &require_lovelace(6_000_000),
        SelectionStrategy::LargestFirst,
    )
    .unwrap();

    assert_eq!(selected, vec![pool[2].clone()]);
}

#[test]
fn test_largest_first_accumulates_descending() {
    let pool = vec![
        lovelace_utxo("01", 3_000_000),
        lovelace_utxo("02", 5_000_000),
    ];

    let selected = select_utxos(
        &pool,
        &require_lovelace(6_000_000),
        SelectionStrategy::LargestFirst,
    )
    .unwrap();

    assert_eq!(selected, vec![pool[1].clone(), pool[0].clone()]);
}

#[test]
fn test_multi_asset_strategy_covers_each_required_unit() {
    let carrier = Utxo::new(
        hash("04"),
        0,
        "addr1pool",
        vec![Asset::lovelace(1_500_000), Asset::new("p1aa", 8)],
    );
    let pool = vec![
        lovelace_utxo("01", 4_000_000),
        carrier.clone(),
        lovelace_utxo("02", 2_000_000),
    ];

    let mut required = require_lovelace(5_000_000);
    required.add("p1aa", 8);

    let selected = select_utxos(
        &pool,
        &required,
        SelectionStrategy::LargestFirstMultiAsset,
    )
    .unwrap();

    let total = Value::from_assets(selected.iter().flat_map(|u| u.output.amount.iter()));
    assert!(total.get("p1aa") >= 8);
    assert!(total.coin() >= 5_000_000);
    assert_eq!(selected[0], carrier);
}

#[test]
fn test_selection_failure_reports_unit_and_shortfall() {
    let pool = vec![lovelace_utxo("01", 1_000_000)];

    let err = select_utxos(
        &pool,
        &require_lovelace(10_000_000),
        SelectionStrategy::Experimental,
    )
    .unwrap_err();

    assert_eq!(
        err,
        TxBuilderError::InsufficientInputs {
            unit: LOVELACE.to_string(),
            shortfall: 9_000_000,
        }
    );
}

#[test]
fn test_complete_appends_selected_utxos_as_pub_key_inputs() -> Result<(), TxBuilderError> {
    let pool = vec![
        lovelace_utxo("01", 2_000_000),
        lovelace_utxo("02", 8_000_000),
    ];

    let mut builder = TxBuilder::new();
    builder
        .tx_out("addr1receiver", vec![Asset::lovelace(4_000_000)])
        .change_address("addr1sender")
        .select_utxos_from(pool, SelectionStrategy::LargestFirst, 1_000_000, false)
        .complete()?;

    let body = &builder.body;
    assert_eq!(body.inputs.len(), 1);

    let TxIn::PubKey(input) = &body.inputs[0] else {
        panic!("selected inputs are always pub-key");
    };

    assert_eq!(input.tx_hash, hash("02"));
    assert_eq!(input.amount, Some(vec![Asset::lovelace(8_000_000)]));
    assert_eq!(input.address.as_deref(), Some("addr1pool"));

    Ok(())
}

#[test]
fn test_complete_counts_known_input_amounts_and_mints() -> Result<(), TxBuilderError> {
    let pool = vec![lovelace_utxo("03", 3_000_000)];

    let mut builder = TxBuilder::new();
    builder
        .tx_in(
            &hash("aa"),
            0,
            Some(vec![Asset::lovelace(3_000_000)]),
            Some("addr1sender"),
        )?
        .mint(4, "policy1", "deadbeef")?
        .minting_script("4e4d0100")?
        .tx_out(
            "addr1receiver",
            vec![
                Asset::lovelace(5_000_000),
                Asset::new(asset_unit("policy1", "deadbeef"), 4),
            ],
        )
        .select_utxos_from(pool, SelectionStrategy::Experimental, 0, false)
        .complete()?;

    // the mint covers the asset, the explicit input covers 3M, and the
    // pool supplies the remaining 2M
    assert_eq!(builder.body.inputs.len(), 2);

    Ok(())
}

#[test]
fn test_failed_selection_leaves_no_partial_inputs() {
    let pool = vec![lovelace_utxo("01", 1_000_000)];

    let mut builder = TxBuilder::new();
    let err = builder
        .tx_out("addr1receiver", vec![Asset::lovelace(50_000_000)])
        .select_utxos_from(pool, SelectionStrategy::LargestFirst, 0, false)
        .complete()
        .unwrap_err();

    assert!(matches!(err, TxBuilderError::InsufficientInputs { .. }));
    assert!(builder.body.inputs.is_empty());
}

#[test]
fn test_include_tx_fees_pads_the_requirement() {
    // output takes the whole candidate; the worst-case fee pad must tip
    // the selection into failure
    let pool = vec![lovelace_utxo("01", 4_000_000)];

    let mut builder = TxBuilder::new();
    let err = builder
        .tx_out("addr1receiver", vec![Asset::lovelace(4_000_000)])
        .select_utxos_from(pool, SelectionStrategy::LargestFirst, 0, true)
        .complete()
        .unwrap_err();

    let expected_shortfall = u128::from(max_tx_fee(&Protocol::default()));

    assert_eq!(
        err,
        TxBuilderError::InsufficientInputs {
            unit: LOVELACE.to_string(),
            shortfall: expected_shortfall,
        }
    );
}

#[test]
fn test_keep_relevant_skips_pure_ada_when_assets_required() {
    let carrier = Utxo::new(
        hash("05"),
        0,
        "addr1pool",
        vec![Asset::lovelace(2_000_000), Asset::new("p1bb", 3)],
    );
    let pool = vec![lovelace_utxo("01", 9_000_000), carrier.clone()];

    let mut required = require_lovelace(4_000_000);
    required.add("p1bb", 3);

    let selected = select_utxos(&pool, &required, SelectionStrategy::KeepRelevant).unwrap();

    assert_eq!(selected[0], carrier);
    assert_eq!(selected[1], pool[0]);
}
