//! Core domain types for markset.
//!
//! This crate contains pure domain types with no IO and no async: markers,
//! named marker sets, the auto-select mode carried by change events, and the
//! path-aliasing collaborator trait used at the wire boundary.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Severity/category of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerKind {
    Error = 0,
    Warning = 1,
    Info = 2,
    Usage = 3,
    Other = 4,
}

impl MarkerKind {
    /// Convert from the wire integer (0=Error, 1=Warning, 2=Info, 3=Usage,
    /// 4=Other).
    ///
    /// Returns `None` for values outside the defined range. Callers
    /// (boundary code) decide the fallback policy.
    #[must_use]
    pub fn from_wire(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Error),
            1 => Some(Self::Warning),
            2 => Some(Self::Info),
            3 => Some(Self::Usage),
            4 => Some(Self::Other),
            _ => None,
        }
    }

    /// The integer written to persisted and client-facing JSON.
    #[must_use]
    pub fn wire_value(self) -> i64 {
        self as i64
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        self == Self::Error
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Usage => "usage",
            Self::Other => "other",
        }
    }
}

/// A single diagnostic-like annotation produced by an external tool.
///
/// Fields are private; markers are immutable once constructed and read via
/// accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    kind: MarkerKind,
    /// Absolute file path, already resolved from any client-side alias.
    path: PathBuf,
    /// 1-based line number.
    line: u32,
    /// 1-based column number.
    column: u32,
    message: String,
    /// Whether this marker is promoted to the separate error-list view.
    show_in_error_list: bool,
}

impl Marker {
    /// Construct a marker with all required fields.
    ///
    /// This is the single construction path; the private fields prevent
    /// mutation after construction.
    #[must_use]
    pub fn new(
        kind: MarkerKind,
        path: PathBuf,
        line: u32,
        column: u32,
        message: String,
        show_in_error_list: bool,
    ) -> Self {
        Self {
            kind,
            path,
            line,
            column,
            message,
            show_in_error_list,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MarkerKind {
        self.kind
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based line number.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 1-based column number.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.column
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn show_in_error_list(&self) -> bool {
        self.show_in_error_list
    }
}

impl fmt::Display for Marker {
    /// Format as `path:line:column: kind: message`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.kind.label(),
            self.message,
        )
    }
}

/// A marker-set name, guaranteed to be non-empty (after trimming).
///
/// The name acts as the set's identity key within a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetName(String);

#[derive(Debug, Error)]
#[error("marker set name must not be empty")]
pub struct EmptySetNameError;

impl SetName {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptySetNameError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptySetNameError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SetName {
    type Error = EmptySetNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SetName> for String {
    fn from(value: SetName) -> Self {
        value.0
    }
}

impl fmt::Display for SetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for SetName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named, ordered collection of markers.
///
/// Sets are created and replaced wholesale; there is no in-place marker
/// editing. A producer always supplies a complete new set for a given name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    name: SetName,
    /// Optional directory used to shorten displayed marker paths.
    base_path: Option<PathBuf>,
    markers: Vec<Marker>,
}

impl MarkerSet {
    #[must_use]
    pub fn new(name: SetName, base_path: Option<PathBuf>, markers: Vec<Marker>) -> Self {
        Self {
            name,
            base_path,
            markers,
        }
    }

    #[must_use]
    pub fn name(&self) -> &SetName {
        &self.name
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Markers in insertion order; insertion order is display order.
    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Whether the client should auto-focus the newly active set after a change
/// event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoSelect {
    None = 0,
    First = 1,
}

impl AutoSelect {
    /// The integer written to the client event payload.
    #[must_use]
    pub fn wire_value(self) -> i64 {
        self as i64
    }
}

/// Converts absolute paths to client-facing aliased strings and back.
///
/// Aliasing itself is an external concern; this crate only defines the seam.
/// Both wire shapes (durable snapshot and client state view) pass every path
/// through this trait on the way out, and resolve on the way in.
pub trait PathAliaser {
    /// Aliased, client-facing form of an absolute path.
    fn alias(&self, path: &Path) -> String;

    /// Absolute path for an aliased string.
    fn resolve(&self, aliased: &str) -> PathBuf;
}

/// Passthrough aliaser for tests and alias-free deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAlias;

impl PathAliaser for NoAlias {
    fn alias(&self, path: &Path) -> String {
        path.display().to_string()
    }

    fn resolve(&self, aliased: &str) -> PathBuf {
        PathBuf::from(aliased)
    }
}
