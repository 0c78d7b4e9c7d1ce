//! Payload references: assets and archives.
//!
//! An [`Asset`] is a single blob of content the engine uploads on the
//! program's behalf, given inline, as a local path or as a remote uri. An
//! [`Archive`] bundles content, either as a named mapping of nested assets
//! and archives or as a path/uri to an existing archive file.
//!
//! Both are immutable and carry no deferred facts; their wire form is a map
//! tagged with [`ASSET_SIG`](crate::sig::ASSET_SIG) or
//! [`ARCHIVE_SIG`](crate::sig::ARCHIVE_SIG).

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::AssetError;
use crate::sig::Signature;

/// A single piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Asset {
    /// Inline text.
    Text(String),
    /// A path on the local filesystem.
    File(String),
    /// A remote uri.
    Remote(String),
}

impl Asset {
    /// Inline text content.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Content read from a local path.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    /// Content fetched from a remote uri.
    #[must_use]
    pub fn remote(uri: impl Into<String>) -> Self {
        Self::Remote(uri.into())
    }

    /// Returns the wire form of this asset.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Signature::Asset.tagged_map();
        let (field, content) = match self {
            Self::Text(text) => ("text", text),
            Self::File(path) => ("path", path),
            Self::Remote(uri) => ("uri", uri),
        };
        map.insert(field.to_owned(), Value::String(content.clone()));
        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, AssetError> {
        if let Some(text) = string_field(map, "asset", "text")? {
            return Ok(Self::Text(text));
        }
        if let Some(path) = string_field(map, "asset", "path")? {
            return Ok(Self::File(path));
        }
        if let Some(uri) = string_field(map, "asset", "uri")? {
            return Ok(Self::Remote(uri));
        }
        Err(AssetError::MissingContent {
            kind: "asset",
            expected: "text, path, uri",
        })
    }
}

/// A bundle of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Archive {
    /// Named members, each an asset or a nested archive.
    Assets(IndexMap<String, AssetOrArchive>),
    /// An archive file on the local filesystem.
    File(String),
    /// An archive file at a remote uri.
    Remote(String),
}

impl Archive {
    /// An archive assembled from named members.
    #[must_use]
    pub fn assets<K, V>(members: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<AssetOrArchive>,
    {
        Self::Assets(
            members
                .into_iter()
                .map(|(name, member)| (name.into(), member.into()))
                .collect(),
        )
    }

    /// An archive file on the local filesystem.
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    /// An archive file at a remote uri.
    #[must_use]
    pub fn remote(uri: impl Into<String>) -> Self {
        Self::Remote(uri.into())
    }

    /// Returns the wire form of this archive.
    ///
    /// Members of an [`Archive::Assets`] bundle are encoded recursively under
    /// the `assets` field; member names are kept as given.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Signature::Archive.tagged_map();
        match self {
            Self::Assets(members) => {
                let members = members
                    .iter()
                    .map(|(name, member)| (name.clone(), member.to_value()))
                    .collect();
                map.insert("assets".to_owned(), Value::Object(members));
            }
            Self::File(path) => {
                map.insert("path".to_owned(), Value::String(path.clone()));
            }
            Self::Remote(uri) => {
                map.insert("uri".to_owned(), Value::String(uri.clone()));
            }
        }
        Value::Object(map)
    }

    fn from_map(map: &Map<String, Value>) -> Result<Self, AssetError> {
        if let Some(members) = map.get("assets") {
            let Value::Object(members) = members else {
                return Err(AssetError::InvalidField {
                    kind: "archive",
                    field: "assets".to_owned(),
                    expected: "map",
                });
            };
            let members = members
                .iter()
                .map(|(name, member)| Ok((name.clone(), AssetOrArchive::from_value(member)?)))
                .collect::<Result<IndexMap<_, _>, AssetError>>()?;
            return Ok(Self::Assets(members));
        }
        if let Some(path) = string_field(map, "archive", "path")? {
            return Ok(Self::File(path));
        }
        if let Some(uri) = string_field(map, "archive", "uri")? {
            return Ok(Self::Remote(uri));
        }
        Err(AssetError::MissingContent {
            kind: "archive",
            expected: "assets, path, uri",
        })
    }
}

/// Either an asset or an archive; the member type of archive bundles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOrArchive {
    /// A single asset.
    Asset(Asset),
    /// A nested archive.
    Archive(Archive),
}

impl AssetOrArchive {
    /// Returns the wire form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Asset(asset) => asset.to_value(),
            Self::Archive(archive) => archive.to_value(),
        }
    }

    /// Rehydrates an asset or archive from its wire form.
    ///
    /// # Errors
    ///
    /// Returns [`AssetError`] if `value` is not a tagged asset/archive map or
    /// its content fields are missing or mistyped.
    pub fn from_value(value: &Value) -> Result<Self, AssetError> {
        let Value::Object(map) = value else {
            return Err(AssetError::NotAnAsset);
        };
        match Signature::of_map(map) {
            Some(Ok(Signature::Asset)) => Asset::from_map(map).map(Self::Asset),
            Some(Ok(Signature::Archive)) => Archive::from_map(map).map(Self::Archive),
            _ => Err(AssetError::NotAnAsset),
        }
    }
}

impl From<Asset> for AssetOrArchive {
    fn from(asset: Asset) -> Self {
        Self::Asset(asset)
    }
}

impl From<Archive> for AssetOrArchive {
    fn from(archive: Archive) -> Self {
        Self::Archive(archive)
    }
}

fn string_field(
    map: &Map<String, Value>,
    kind: &'static str,
    field: &str,
) -> Result<Option<String>, AssetError> {
    match map.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(AssetError::InvalidField {
            kind,
            field: field.to_owned(),
            expected: "string",
        }),
    }
}
