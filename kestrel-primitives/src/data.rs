use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DataError {
    #[error("malformed cbor hex: {0}")]
    MalformedCborHex(String),
    #[error("malformed json: {0}")]
    MalformedJson(String),
}

/// In-memory Plutus data, canonically serializable by the codec layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PlutusData {
    Constr(Constr),
    Map(Vec<(PlutusData, PlutusData)>),
    Array(Vec<PlutusData>),
    BigInt(i128),
    BoundedBytes(Vec<u8>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Constr {
    pub tag: u64,
    pub any_constructor: Option<u64>,
    pub fields: Vec<PlutusData>,
}

pub fn int(v: impl Into<i128>) -> PlutusData {
    PlutusData::BigInt(v.into())
}

pub fn bytes(v: impl Into<Vec<u8>>) -> PlutusData {
    PlutusData::BoundedBytes(v.into())
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PlutusDataConstr {
    tag: u64,
    any_constructor: Option<u64>,
    fields: Vec<PlutusData>,
}

impl From<PlutusDataConstr> for PlutusData {
    fn from(value: PlutusDataConstr) -> Self {
        Self::Constr(Constr {
            tag: value.tag,
            any_constructor: value.any_constructor,
            fields: value.fields,
        })
    }
}

impl PlutusDataConstr {
    pub fn field(mut self, item: impl Into<PlutusData>) -> Self {
        self.fields.push(item.into());
        self
    }
}

pub fn constr(tag: u64, any_constructor: u64) -> PlutusDataConstr {
    PlutusDataConstr {
        tag,
        any_constructor: Some(any_constructor),
        fields: vec![],
    }
}

pub fn any_constr(tag: u64) -> PlutusDataConstr {
    PlutusDataConstr {
        tag,
        any_constructor: None,
        fields: vec![],
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PlutusDataMap {
    items: Vec<(PlutusData, PlutusData)>,
}

impl From<PlutusDataMap> for PlutusData {
    fn from(value: PlutusDataMap) -> Self {
        Self::Map(value.items)
    }
}

impl PlutusDataMap {
    pub fn item(mut self, key: impl Into<PlutusData>, value: impl Into<PlutusData>) -> Self {
        self.items.push((key.into(), value.into()));
        self
    }
}

pub fn map() -> PlutusDataMap {
    Default::default()
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PlutusDataArray {
    items: Vec<PlutusData>,
}

impl From<PlutusDataArray> for PlutusData {
    fn from(value: PlutusDataArray) -> Self {
        Self::Array(value.items)
    }
}

impl PlutusDataArray {
    pub fn item(mut self, item: impl Into<PlutusData>) -> Self {
        self.items.push(item.into());
        self
    }
}

pub fn array() -> PlutusDataArray {
    Default::default()
}

/// Payload attached to a datum or redeemer slot, in one of the three
/// encodings the builder accepts.
///
/// JSON content is stringified eagerly with big-integer-preserving
/// serialization, so unbounded on-chain integers survive the round trip.
/// CBOR content is an opaque hex string handed to the codec verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum BuilderData {
    Plutus(PlutusData),
    Json(String),
    Cbor(String),
}

impl BuilderData {
    pub fn json(value: &serde_json::Value) -> Result<Self, DataError> {
        Ok(Self::Json(to_json_string(value)?))
    }

    pub fn cbor(hex_str: impl Into<String>) -> Result<Self, DataError> {
        let hex_str = hex_str.into();
        hex::decode(&hex_str).map_err(|_| DataError::MalformedCborHex(hex_str.clone()))?;

        Ok(Self::Cbor(hex_str))
    }
}

impl From<PlutusData> for BuilderData {
    fn from(value: PlutusData) -> Self {
        Self::Plutus(value)
    }
}

impl From<PlutusDataConstr> for BuilderData {
    fn from(value: PlutusDataConstr) -> Self {
        Self::Plutus(value.into())
    }
}

impl From<PlutusDataMap> for BuilderData {
    fn from(value: PlutusDataMap) -> Self {
        Self::Plutus(value.into())
    }
}

impl From<PlutusDataArray> for BuilderData {
    fn from(value: PlutusDataArray) -> Self {
        Self::Plutus(value.into())
    }
}

/// Stringifies JSON preserving arbitrary-precision integers.
pub fn to_json_string(value: &serde_json::Value) -> Result<String, DataError> {
    serde_json::to_string(value).map_err(|e| DataError::MalformedJson(e.to_string()))
}
