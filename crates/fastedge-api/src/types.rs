//! FastEdge resource types.
//!
//! Response types are lenient: fields the list endpoints leave out fall back
//! to their defaults so one type serves both single and list responses.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Connection settings shared by every request of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    pub api_url: String,
    /// Key sent as `Authorization: APIKey <key>`.
    pub api_key: String,
}

impl ApiConfig {
    /// Create a config, trimming any trailing `/` from the URL.
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Application runtime flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiType {
    WasiHttp,
    ProxyWasm,
    /// A flavour this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// An uploaded WASM binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binary {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
    /// Hex MD5 of the uploaded bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default)]
    pub status: i64,
    /// Set once no application references the binary any more.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unref_since: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<i64>,
}

/// The `binary` field of an application: a bare id as returned by the API,
/// or the full binary once hydrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinaryRef {
    Id(u64),
    Resolved(Box<Binary>),
}

impl BinaryRef {
    /// Id of the referenced binary in either representation.
    pub fn id(&self) -> u64 {
        match self {
            BinaryRef::Id(id) => *id,
            BinaryRef::Resolved(binary) => binary.id,
        }
    }

    /// The hydrated binary, if this reference has been resolved.
    pub fn resolved(&self) -> Option<&Binary> {
        match self {
            BinaryRef::Id(_) => None,
            BinaryRef::Resolved(binary) => Some(binary),
        }
    }
}

/// Reference from an application to a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSecret {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl AppSecret {
    /// A reference carrying only the secret id.
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            name: None,
            comment: None,
        }
    }
}

/// An application as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryRef>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub env: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rsp_headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secrets: BTreeMap<String, AppSecret>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub networks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
}

impl Application {
    /// Id of the application's binary, if it has one.
    pub fn binary_id(&self) -> Option<u64> {
        self.binary.as_ref().map(BinaryRef::id)
    }
}

/// Body for creating or updating an application from a binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppResource {
    pub name: String,
    pub status: i64,
    pub binary: u64,
    pub env: BTreeMap<String, String>,
    pub rsp_headers: BTreeMap<String, String>,
    pub secrets: BTreeMap<String, AppSecret>,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
}

/// Filters for listing applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Field name to order by, prefixed with `-` for descending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_type: Option<ApiType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<u64>,
}

/// One slot of a secret.
///
/// A slot with a value is an upsert. A slot without one asks the server to
/// delete that slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretSlot {
    pub slot: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SecretSlot {
    pub fn upsert(slot: u32, value: impl Into<String>) -> Self {
        Self {
            slot,
            value: Some(value.into()),
        }
    }

    pub fn delete(slot: u32) -> Self {
        Self { slot, value: None }
    }

    pub fn is_deletion(&self) -> bool {
        self.value.is_none()
    }
}

/// A secret as returned by the API. List responses carry no slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub app_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secret_slots: Vec<SecretSlot>,
}

/// Body for creating or updating a secret.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecretResource {
    pub name: String,
    pub comment: String,
    pub secret_slots: Vec<SecretSlot>,
}

/// Filters for listing secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecretsQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,
}

/// Ids arrive as numbers, numeric strings, or not at all.
fn lenient_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<RawId>::deserialize(deserializer)? {
        Some(RawId::Number(id)) => id,
        Some(RawId::Text(text)) => text.trim().parse().unwrap_or_default(),
        None => 0,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
