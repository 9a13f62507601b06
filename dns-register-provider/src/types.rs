use std::net::IpAddr;

use serde::{Deserialize, Serialize};

// ============ Record Type ============

/// DNS record type identifier.
///
/// Serialized as an uppercase string (`"A"`, `"AAAA"`, `"CNAME"`, ...). Types without a
/// dedicated variant are kept verbatim (uppercased) in [`RecordType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Text record.
    Txt,
    /// Mail exchange record.
    Mx,
    /// Name server record.
    Ns,
    /// Any other record type, uppercased (e.g. `"SRV"`, `"CAA"`).
    Other(String),
}

impl RecordType {
    /// Returns the canonical uppercase mnemonic.
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Txt => "TXT",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Other(other) => other,
        }
    }
}

impl From<&str> for RecordType {
    fn from(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "TXT" => Self::Txt,
            "MX" => Self::Mx,
            "NS" => Self::Ns,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RecordType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Provider Records ============

/// Untyped view of a record: name, type, TTL and the presentation-format data.
///
/// Used as the generic fallback variant of [`ProviderRecord`] and as a uniform
/// view over every variant (see [`ProviderRecord::to_raw`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    /// Zone-relative record name (e.g. `"www"` or `"@"` for apex).
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Record data in presentation format.
    pub data: String,
}

/// A DNS record as exchanged with a provider.
///
/// Closed set of typed variants plus a [`Raw`](Self::Raw) fallback for anything
/// that could not (or need not) be typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderRecord {
    /// A or AAAA record; the type follows the address family.
    Address {
        /// Zone-relative record name.
        name: String,
        /// IPv4 or IPv6 address.
        ip: IpAddr,
        /// Time to live in seconds.
        ttl: u32,
    },

    /// TXT record.
    Txt {
        /// Zone-relative record name.
        name: String,
        /// Text payload.
        text: String,
        /// Time to live in seconds.
        ttl: u32,
    },

    /// CNAME record.
    Cname {
        /// Zone-relative record name.
        name: String,
        /// Alias target.
        target: String,
        /// Time to live in seconds.
        ttl: u32,
    },

    /// MX record.
    Mx {
        /// Zone-relative record name.
        name: String,
        /// Preference (lower = preferred).
        preference: u16,
        /// Mail exchange hostname.
        target: String,
        /// Time to live in seconds.
        ttl: u32,
    },

    /// NS record.
    Ns {
        /// Zone-relative record name.
        name: String,
        /// Name server hostname.
        target: String,
        /// Time to live in seconds.
        ttl: u32,
    },

    /// Generic record carrying untyped data.
    Raw(RawRecord),
}

impl ProviderRecord {
    /// Zone-relative record name.
    pub fn name(&self) -> &str {
        match self {
            Self::Address { name, .. }
            | Self::Txt { name, .. }
            | Self::Cname { name, .. }
            | Self::Mx { name, .. }
            | Self::Ns { name, .. } => name,
            Self::Raw(raw) => &raw.name,
        }
    }

    /// Time to live in seconds.
    pub fn ttl(&self) -> u32 {
        match self {
            Self::Address { ttl, .. }
            | Self::Txt { ttl, .. }
            | Self::Cname { ttl, .. }
            | Self::Mx { ttl, .. }
            | Self::Ns { ttl, .. } => *ttl,
            Self::Raw(raw) => raw.ttl,
        }
    }

    /// Record type. For [`Address`](Self::Address) this follows the IP family.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::Address { ip, .. } => match ip {
                IpAddr::V4(_) => RecordType::A,
                IpAddr::V6(_) => RecordType::Aaaa,
            },
            Self::Txt { .. } => RecordType::Txt,
            Self::Cname { .. } => RecordType::Cname,
            Self::Mx { .. } => RecordType::Mx,
            Self::Ns { .. } => RecordType::Ns,
            Self::Raw(raw) => raw.record_type.clone(),
        }
    }

    /// Returns the untyped view of this record.
    pub fn to_raw(&self) -> RawRecord {
        let data = match self {
            Self::Address { ip, .. } => ip.to_string(),
            Self::Txt { text, .. } => text.clone(),
            Self::Cname { target, .. } | Self::Ns { target, .. } => target.clone(),
            Self::Mx {
                preference, target, ..
            } => format!("{preference} {target}"),
            Self::Raw(raw) => return raw.clone(),
        };

        RawRecord {
            name: self.name().to_string(),
            record_type: self.record_type(),
            ttl: self.ttl(),
            data,
        }
    }
}

impl std::fmt::Display for ProviderRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = self.to_raw();
        write!(f, "{} {} {} {}", raw.name, raw.ttl, raw.record_type, raw.data)
    }
}
