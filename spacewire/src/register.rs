//! Protocol metadata handed to Wireshark once, when the plugin is loaded.
//!
//! Wireshark assigns its own ids to the protocol, the header fields and the subtree while
//! registering. Everything it needs to do that is described here as plain data, so it can be
//! built and checked without a running Wireshark.

use std::collections::HashSet;
use std::ffi::CString;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::FieldKind;

/// Ethertype under which SpaceWire frames are tunnelled. Not assigned by IEEE.
pub const ETHERTYPE_SPACEWIRE: u32 = 0x88B5;

/// Name of Wireshark's Ethertype dissector table.
pub const ETHERTYPE_TABLE: &str = "ethertype";

/// How the dissector gets attached to other dissectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeFrom {
    /// Offered in the "Decode As" menu of the named table.
    DecodeAs(String),
    /// Registered under each integer key of the named table.
    Uint(String, Vec<u32>),
}

impl DecodeFrom {
    pub fn table(&self) -> &str {
        match self {
            DecodeFrom::DecodeAs(table) | DecodeFrom::Uint(table, _) => table,
        }
    }
}

/// A header field as Wireshark's field registry sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub kind: FieldKind,
    /// Name shown in the UI.
    pub name: String,
    /// Filter string.
    pub abbrev: String,
    /// Description, if any.
    pub blurb: Option<String>,
}

impl HeaderField {
    pub fn new(kind: FieldKind) -> Self {
        HeaderField {
            kind,
            name: kind.name().to_string(),
            abbrev: kind.abbrev().to_string(),
            blurb: None,
        }
    }
}

/// Everything needed to register the protocol with Wireshark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Long protocol name, also used for the Protocol column.
    pub proto_desc: String,
    /// Short protocol name.
    pub proto_name: String,
    /// Filter name of the protocol. Every field's abbrev lives under it.
    pub proto_filter: String,
    pub fields: Vec<HeaderField>,
    pub decode_from: Vec<DecodeFrom>,
}

impl Default for Registration {
    fn default() -> Self {
        Registration {
            proto_desc: "SpaceWire".to_string(),
            proto_name: "SpaceWire".to_string(),
            proto_filter: "spacewire".to_string(),
            fields: FieldKind::ALL.into_iter().map(HeaderField::new).collect(),
            decode_from: vec![DecodeFrom::Uint(
                ETHERTYPE_TABLE.to_string(),
                vec![ETHERTYPE_SPACEWIRE],
            )],
        }
    }
}

/// Returns the SpaceWire protocol registration.
pub fn register() -> Registration {
    Registration::default()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{what} must not be empty")]
    EmptyName { what: &'static str },

    #[error("invalid filter string {filter:?}")]
    InvalidFilter { filter: String },

    #[error("field filter {abbrev:?} is not under protocol filter {proto_filter:?}")]
    ForeignAbbrev { abbrev: String, proto_filter: String },

    #[error("more than one header field describes {kind}")]
    DuplicateField { kind: FieldKind },

    #[error("no header field describes {kind}")]
    MissingField { kind: FieldKind },

    #[error("the dissector is not bound to any dissector table")]
    NoBinding,

    #[error("{value:?} contains a NUL byte")]
    InteriorNul { value: String },

    #[error("the protocol has not been registered yet")]
    NotRegistered,
}

// Wireshark's rules: protocol filters are lower case, field filters may use any case.
static PROTO_FILTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_.\-]*$").expect("regexp for protocol filters should be valid")
});
static FIELD_ABBREV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("regexp for field filters should be valid")
});

impl Registration {
    /// Adds another way for the dissector to be reached.
    pub fn with_decode_from(mut self, decode_from: DecodeFrom) -> Self {
        self.decode_from.push(decode_from);
        self
    }

    /// Replaces the description of `field.kind`.
    pub fn with_field(mut self, field: HeaderField) -> Self {
        self.fields.retain(|f| f.kind != field.kind);
        self.fields.push(field);
        self
    }

    pub fn header_field(&self, kind: FieldKind) -> Option<&HeaderField> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    /// Checks the registration against the rules Wireshark enforces at startup. Wireshark aborts
    /// on most of these, so they are caught here instead.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        for (what, value) in [
            ("protocol description", &self.proto_desc),
            ("protocol name", &self.proto_name),
            ("protocol filter", &self.proto_filter),
        ] {
            if value.is_empty() {
                return Err(RegistrationError::EmptyName { what });
            }
            check_nul(value)?;
        }
        if !PROTO_FILTER_RE.is_match(&self.proto_filter) {
            return Err(RegistrationError::InvalidFilter {
                filter: self.proto_filter.clone(),
            });
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.kind) {
                return Err(RegistrationError::DuplicateField { kind: field.kind });
            }
            if field.name.is_empty() {
                return Err(RegistrationError::EmptyName { what: "field name" });
            }
            check_nul(&field.name)?;
            if let Some(blurb) = &field.blurb {
                check_nul(blurb)?;
            }
            if !FIELD_ABBREV_RE.is_match(&field.abbrev) {
                return Err(RegistrationError::InvalidFilter {
                    filter: field.abbrev.clone(),
                });
            }
            let under_proto = field
                .abbrev
                .strip_prefix(self.proto_filter.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|rest| !rest.is_empty());
            if !under_proto {
                return Err(RegistrationError::ForeignAbbrev {
                    abbrev: field.abbrev.clone(),
                    proto_filter: self.proto_filter.clone(),
                });
            }
        }
        if let Some(&kind) = FieldKind::ALL.iter().find(|&&k| !seen.contains(&k)) {
            return Err(RegistrationError::MissingField { kind });
        }

        if self.decode_from.is_empty() {
            return Err(RegistrationError::NoBinding);
        }
        for decode_from in &self.decode_from {
            if decode_from.table().is_empty() {
                return Err(RegistrationError::EmptyName {
                    what: "dissector table",
                });
            }
            check_nul(decode_from.table())?;
        }
        Ok(())
    }
}

/// Converts a string for the C side.
pub(crate) fn to_cstring(value: &str) -> Result<CString, RegistrationError> {
    CString::new(value).map_err(|_| RegistrationError::InteriorNul {
        value: value.to_string(),
    })
}

fn check_nul(value: &str) -> Result<(), RegistrationError> {
    to_cstring(value).map(drop)
}
