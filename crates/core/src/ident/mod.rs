//! Stable 128-bit identifiers for partitions (vendor and class UUIDs).
//!
//! A [`BootUuid`] is either parsed from a literal hex form or derived
//! deterministically from a namespace and a name string using UUIDv5.
//! Derived identifiers keep enough provenance (the input string and a
//! human-readable namespace description) to render the value the way it was
//! authored and to let further identifiers chain off it.
//!
//! Chaining composes over the human-readable origin, not over derived bytes:
//! deriving under a `BootUuid` namespace uses that identifier's recorded
//! input string, so the chain reproduces exactly as if the child had been
//! derived directly under the parent's input string.

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

/// Error type for identifier parsing and derivation.
#[derive(Debug, Error)]
pub enum UuidError {
    /// The value is neither a recognized literal form nor a printable string.
    #[error("Unrecognized UUID format: {0}")]
    InvalidFormat(String),

    /// A string-form value was supplied without a namespace to derive under.
    #[error("No namespace to derive a UUID for string value: {0}")]
    MissingNamespace(String),
}

/// Namespace under which a string value is derived.
#[derive(Debug, Clone, Copy)]
pub enum Namespace<'a> {
    /// The RFC 4122 DNS namespace, rendered as `NAMESPACE_DNS`.
    Dns,
    /// An arbitrary string namespace.
    Name(&'a str),
    /// Another identifier; chains through its recorded input string when
    /// available, else through its hyphenated form.
    Uuid(&'a BootUuid),
}

impl Namespace<'_> {
    /// The namespace UUID used for hashing, plus its human-readable form.
    ///
    /// String namespaces are themselves v5-derived under the DNS namespace,
    /// which keeps `Uuid(parent)` and `Name(parent.input())` byte-identical.
    fn effective(&self) -> (Uuid, String) {
        match self {
            Namespace::Dns => (Uuid::NAMESPACE_DNS, "NAMESPACE_DNS".to_string()),
            Namespace::Name(s) => (Uuid::new_v5(&Uuid::NAMESPACE_DNS, s.as_bytes()), s.to_string()),
            Namespace::Uuid(parent) => match parent.input() {
                Some(s) => (Uuid::new_v5(&Uuid::NAMESPACE_DNS, s.as_bytes()), s.to_string()),
                None => {
                    let hyphenated = parent.hyphenated();
                    (Uuid::new_v5(&Uuid::NAMESPACE_DNS, hyphenated.as_bytes()), hyphenated)
                }
            },
        }
    }
}

/// A stable identifier in one of the supported input forms:
/// - literal hyphenated (`12345678-1234-5678-1234-567812345678`),
/// - literal bare hex (`12345678123456781234567812345678`),
/// - any printable string, derived via UUIDv5 under a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootUuid {
    uuid: Uuid,
    input: Option<String>,
    namespace: Option<String>,
}

impl BootUuid {
    /// Parse or derive an identifier from `value`.
    ///
    /// Literal forms ignore the namespace entirely and record no provenance.
    /// A printable string requires a namespace; the derivation is a pure
    /// function of (effective namespace, value).
    pub fn derive(namespace: Option<Namespace<'_>>, value: &str) -> Result<Self, UuidError> {
        if let Some(uuid) = parse_literal(value) {
            return Ok(Self { uuid, input: None, namespace: None });
        }

        if !is_printable(value) {
            return Err(UuidError::InvalidFormat(value.to_string()));
        }

        let namespace = namespace.ok_or_else(|| UuidError::MissingNamespace(value.to_string()))?;
        let (ns_uuid, ns_display) = namespace.effective();
        Ok(Self {
            uuid: Uuid::new_v5(&ns_uuid, value.as_bytes()),
            input: Some(value.to_string()),
            namespace: Some(ns_display),
        })
    }

    /// The input string the identifier was derived from, if it was derived
    /// rather than parsed literally.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Human-readable description of the namespace used for derivation.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The raw 16 identifier bytes.
    pub fn bytes(&self) -> [u8; 16] {
        *self.uuid.as_bytes()
    }

    /// Comma-separated hex-byte literal for embedding in generated C source,
    /// e.g. `0x12, 0x34, ...`.
    pub fn c_array(&self) -> String {
        self.uuid
            .as_bytes()
            .iter()
            .map(|b| format!("0x{b:02x}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Canonical hyphenated lowercase form.
    pub fn hyphenated(&self) -> String {
        self.uuid.hyphenated().to_string()
    }
}

impl fmt::Display for BootUuid {
    /// Renders derived identifiers by their origin, literal ones by value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.namespace, &self.input) {
            (Some(namespace), Some(input)) => {
                write!(f, "(namespace: {namespace}, value: {input})")
            }
            _ => write!(f, "{}", self.uuid),
        }
    }
}

impl Serialize for BootUuid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hyphenated())
    }
}

/// Parse the two literal forms; anything else is not a literal.
fn parse_literal(value: &str) -> Option<Uuid> {
    let bytes = value.as_bytes();
    let hyphenated = bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        });
    let bare = bytes.len() == 32 && bytes.iter().all(|b| b.is_ascii_hexdigit());

    if hyphenated || bare {
        Uuid::parse_str(value).ok()
    } else {
        None
    }
}

/// Usable printable string: no control characters, and no whitespace other
/// than the plain ASCII space (line/paragraph separators and exotic spaces
/// are not printable either).
fn is_printable(value: &str) -> bool {
    value.chars().all(|c| c == ' ' || (!c.is_control() && !c.is_whitespace()))
}
