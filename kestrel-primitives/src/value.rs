use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unit of the native ADA asset, expressed in lovelace.
pub const LOVELACE: &str = "lovelace";

/// A single asset entry: unit paired with the owned quantity.
///
/// The unit is the policy id concatenated with the hex-encoded asset name,
/// or the distinguished `"lovelace"` for ADA.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub unit: String,
    pub quantity: u64,
}

impl Asset {
    pub fn new(unit: impl Into<String>, quantity: u64) -> Self {
        Self {
            unit: unit.into(),
            quantity,
        }
    }

    pub fn lovelace(quantity: u64) -> Self {
        Self::new(LOVELACE, quantity)
    }

    pub fn is_lovelace(&self) -> bool {
        self.unit == LOVELACE
    }
}

/// Concatenates a policy id and hex asset name into the unit form used
/// across the builder.
pub fn asset_unit(policy_id: &str, asset_name: &str) -> String {
    format!("{policy_id}{asset_name}")
}

/// An aggregated multi-asset bundle, keyed by unit.
///
/// Entries keep their insertion order so that folding a list of assets and
/// unfolding it again is deterministic. Quantities are unsigned; for the
/// signed arithmetic behind input selection see [`ValueDelta`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Value(IndexMap<String, u64>);

impl Value {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a Asset>) -> Self {
        let mut value = Self::new();
        for asset in assets {
            value.add(&asset.unit, asset.quantity);
        }
        value
    }

    pub fn add(&mut self, unit: &str, quantity: u64) {
        if quantity == 0 {
            return;
        }

        self.0
            .entry(unit.to_string())
            .and_modify(|q| *q += quantity)
            .or_insert(quantity);
    }

    pub fn merge(&mut self, other: &Value) {
        for (unit, quantity) in other.iter() {
            self.add(unit, *quantity);
        }
    }

    /// Subtracts a bundle entry-wise, saturating at zero and dropping
    /// exhausted units.
    pub fn subtract(&mut self, other: &Value) {
        for (unit, quantity) in other.iter() {
            if let Some(q) = self.0.get_mut(unit) {
                *q = q.saturating_sub(*quantity);
            }
        }

        self.0.retain(|_, q| *q > 0);
    }

    pub fn get(&self, unit: &str) -> u64 {
        self.0.get(unit).copied().unwrap_or_default()
    }

    /// The amount of the ADA asset, expressed in lovelace.
    pub fn coin(&self) -> u64 {
        self.get(LOVELACE)
    }

    /// Coverage comparison: true when every unit in `other` is present
    /// here with at least the same quantity.
    pub fn geq(&self, other: &Value) -> bool {
        other.iter().all(|(unit, q)| self.get(unit) >= *q)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.0.iter()
    }

    pub fn units(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn to_assets(&self) -> Vec<Asset> {
        self.0
            .iter()
            .map(|(unit, quantity)| Asset::new(unit, *quantity))
            .collect()
    }
}

impl FromIterator<Asset> for Value {
    fn from_iter<T: IntoIterator<Item = Asset>>(iter: T) -> Self {
        let mut value = Self::new();
        for asset in iter {
            value.add(&asset.unit, asset.quantity);
        }
        value
    }
}

/// Signed per-unit balance used while working out what a transaction still
/// owes. Positive entries are uncovered requirements, negative entries are
/// surplus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueDelta(IndexMap<String, i128>);

impl ValueDelta {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add(&mut self, unit: &str, amount: i128) {
        *self.0.entry(unit.to_string()).or_default() += amount;
    }

    /// Folds a bundle in as a requirement (positive direction).
    pub fn require(&mut self, value: &Value) {
        for (unit, quantity) in value.iter() {
            self.add(unit, *quantity as i128);
        }
    }

    /// Folds a bundle in as already-provided (negative direction).
    pub fn provide(&mut self, value: &Value) {
        for (unit, quantity) in value.iter() {
            self.add(unit, -(*quantity as i128));
        }
    }

    pub fn get(&self, unit: &str) -> i128 {
        self.0.get(unit).copied().unwrap_or_default()
    }

    /// Units still owed, in insertion order.
    pub fn required_units(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(unit, _)| unit.clone())
            .collect()
    }

    pub fn is_covered(&self) -> bool {
        self.0.values().all(|amount| *amount <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_assets_merges_duplicate_units() {
        let value = Value::from_assets(&[
            Asset::lovelace(1_000_000),
            Asset::new("policy1deadbeef", 3),
            Asset::lovelace(500_000),
        ]);

        assert_eq!(value.coin(), 1_500_000);
        assert_eq!(value.get("policy1deadbeef"), 3);
    }

    #[test]
    fn subtract_saturates_and_drops_empty_units() {
        let mut a = Value::from_assets(&[Asset::lovelace(5), Asset::new("p1aa", 2)]);
        let b = Value::from_assets(&[Asset::lovelace(10), Asset::new("p1aa", 2)]);

        a.subtract(&b);

        assert!(a.is_empty());
    }

    #[test]
    fn sum_minus_itself_is_empty() {
        let assets = [Asset::lovelace(7), Asset::new("p2bb", 9)];
        let mut sum = Value::from_assets(&assets);
        sum.subtract(&Value::from_assets(&assets));

        assert!(sum.is_empty());
    }

    #[test]
    fn geq_compares_per_unit_coverage() {
        let have = Value::from_assets(&[Asset::lovelace(10), Asset::new("p1aa", 5)]);
        let want = Value::from_assets(&[Asset::lovelace(10), Asset::new("p1aa", 4)]);
        let too_much = Value::from_assets(&[Asset::new("p3cc", 1)]);

        assert!(have.geq(&want));
        assert!(!have.geq(&too_much));
    }

    #[test]
    fn delta_tracks_requirements_both_ways() {
        let mut delta = ValueDelta::new();
        delta.require(&Value::from_assets(&[Asset::lovelace(10)]));
        delta.provide(&Value::from_assets(&[Asset::lovelace(4)]));

        assert_eq!(delta.get(LOVELACE), 6);
        assert_eq!(delta.required_units(), vec![LOVELACE.to_string()]);

        delta.provide(&Value::from_assets(&[Asset::lovelace(6)]));
        assert!(delta.is_covered());
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn unit_name(index: u8) -> String {
            match index {
                0 => LOVELACE.to_string(),
                n => format!("policy{n}aa"),
            }
        }

        prop_compose! {
            fn any_assets()(
                entries in prop::collection::vec((0u8..4, 1u64..1 << 40), 0..16),
            ) -> Vec<Asset> {
                entries
                    .into_iter()
                    .map(|(unit, quantity)| Asset::new(unit_name(unit), quantity))
                    .collect()
            }
        }

        proptest! {
            #[test]
            fn sum_minus_itself_is_empty(assets in any_assets()) {
                let mut sum = Value::from_assets(&assets);
                sum.subtract(&Value::from_assets(&assets));

                prop_assert!(sum.is_empty());
            }

            #[test]
            fn coverage_of_itself_always_holds(assets in any_assets()) {
                let value = Value::from_assets(&assets);

                prop_assert!(value.geq(&value));
            }

            #[test]
            fn merge_then_subtract_restores_the_original(
                a in any_assets(),
                b in any_assets(),
            ) {
                let original = Value::from_assets(&a);
                let extra = Value::from_assets(&b);

                let mut value = original.clone();
                value.merge(&extra);
                value.subtract(&extra);

                prop_assert_eq!(value, original);
            }
        }
    }
}
