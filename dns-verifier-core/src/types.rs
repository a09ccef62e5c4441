//! Record model: expected records, record groups, query targets and answers.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CheckError, ConfigError};

/// Default DNS port used when an endpoint omits one.
pub const DEFAULT_DNS_PORT: u16 = 53;

/// DNS record type of an expected record or an answer.
///
/// Serialized as an uppercase string (`"A"`, `"AAAA"`, ...). Types without a
/// comparison rule are kept verbatim in [`Unsupported`](Self::Unsupported) so
/// they surface as check failures instead of load errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Certificate Authority Authorization record.
    Caa,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Any other type, stored uppercased.
    Unsupported(String),
}

impl RecordType {
    /// Whether a comparison rule exists for this type.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::Aaaa => write!(f, "AAAA"),
            Self::Cname => write!(f, "CNAME"),
            Self::Caa => write!(f, "CAA"),
            Self::Mx => write!(f, "MX"),
            Self::Txt => write!(f, "TXT"),
            Self::Unsupported(other) => f.write_str(other),
        }
    }
}

impl From<&str> for RecordType {
    fn from(s: &str) -> Self {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "A" => Self::A,
            "AAAA" => Self::Aaaa,
            "CNAME" => Self::Cname,
            "CAA" => Self::Caa,
            "MX" => Self::Mx,
            "TXT" => Self::Txt,
            _ => Self::Unsupported(upper),
        }
    }
}

impl From<String> for RecordType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RecordType> for String {
    fn from(t: RecordType) -> Self {
        t.to_string()
    }
}

/// One declared DNS record.
///
/// Fields that do not apply to `record_type` are ignored by the validators.
/// Field names follow the zone-management tool's JSON output; the PascalCase
/// spellings are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedRecord {
    /// Record type.
    #[serde(rename = "type", alias = "Type")]
    pub record_type: RecordType,
    /// Relative name (`"@"` for the zone apex) or absolute label.
    #[serde(alias = "Name")]
    pub name: String,
    /// Maximum acceptable TTL in seconds.
    #[serde(rename = "ttl", alias = "TTL", alias = "Ttl", default)]
    pub ttl_ceiling: u32,
    /// IP literal, hostname, or CAA value.
    #[serde(alias = "Target", default, deserialize_with = "null_as_default")]
    pub target: String,
    /// CAA property tag.
    #[serde(rename = "caatag", alias = "CAATag", alias = "caaTag", default)]
    pub caa_tag: Option<String>,
    /// MX preference.
    #[serde(
        rename = "mxpreference",
        alias = "MXPreference",
        alias = "mxPreference",
        default
    )]
    pub mx_preference: Option<u16>,
    /// TXT character-strings, in order.
    #[serde(
        rename = "txtstrings",
        alias = "TXTStrings",
        alias = "txtStrings",
        default,
        deserialize_with = "null_as_default"
    )]
    pub txt_segments: Vec<String>,
}

impl ExpectedRecord {
    /// Create a record with only the common fields set.
    pub fn new(
        record_type: RecordType,
        name: impl Into<String>,
        ttl_ceiling: u32,
        target: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            name: name.into(),
            ttl_ceiling,
            target: target.into(),
            caa_tag: None,
            mx_preference: None,
            txt_segments: Vec::new(),
        }
    }
}

/// The records published under one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone apex (e.g. `"example.com"`).
    #[serde(alias = "Name")]
    pub name: String,
    /// Flat record list.
    #[serde(alias = "Records", default, deserialize_with = "null_as_default")]
    pub records: Vec<ExpectedRecord>,
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// All expected records sharing one (absolute name, type) pair within a zone.
///
/// Never empty. The TTL ceiling is taken from the first member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordGroup {
    domain: String,
    name: String,
    record_type: RecordType,
    records: Vec<ExpectedRecord>,
}

impl RecordGroup {
    pub(crate) fn new(domain: &str, name: String, first: ExpectedRecord) -> Self {
        Self {
            domain: domain.to_string(),
            name,
            record_type: first.record_type.clone(),
            records: vec![first],
        }
    }

    pub(crate) fn push(&mut self, record: ExpectedRecord) {
        debug_assert_eq!(record.record_type, self.record_type);
        self.records.push(record);
    }

    /// Zone the group belongs to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Absolute owner name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record type shared by all members.
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Members in declaration order.
    pub fn records(&self) -> &[ExpectedRecord] {
        &self.records
    }

    /// Number of members (duplicates included).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Never true for groups produced by the grouper.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// TTL ceiling of the first member.
    pub fn ttl_ceiling(&self) -> u32 {
        self.records.first().map_or(0, |r| r.ttl_ceiling)
    }

    /// Whether members declare different TTL ceilings.
    pub fn has_divergent_ttl(&self) -> bool {
        let ceiling = self.ttl_ceiling();
        self.records.iter().any(|r| r.ttl_ceiling != ceiling)
    }
}

/// A nameserver endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nameserver {
    host: String,
    port: u16,
}

impl Nameserver {
    /// Create an endpoint from a host (IP literal or hostname) and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host part.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port part.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The host as an IP address, if it is a literal.
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for Nameserver {
    type Err = ConfigError;

    /// Accepts `host`, `host:port`, `v6addr` and `[v6addr]:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = |reason: &str| ConfigError::InvalidNameserver {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let parse_port = |port: &str| {
            port.parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| invalid("port must be a number between 1 and 65535"))
        };

        if input.is_empty() {
            return Err(invalid("endpoint is empty"));
        }

        if let Some(rest) = input.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("missing closing bracket"))?;
            host.parse::<Ipv6Addr>()
                .map_err(|_| invalid("bracketed host must be an IPv6 address"))?;
            let port = match tail {
                "" => DEFAULT_DNS_PORT,
                _ => parse_port(
                    tail.strip_prefix(':')
                        .ok_or_else(|| invalid("expected ':' after closing bracket"))?,
                )?,
            };
            return Ok(Self::new(host, port));
        }

        if input.parse::<Ipv6Addr>().is_ok() {
            return Ok(Self::new(input, DEFAULT_DNS_PORT));
        }

        let (host, port) = match input.rsplit_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (input, DEFAULT_DNS_PORT),
        };
        if host.is_empty() || host.contains(':') {
            return Err(invalid("host is malformed"));
        }
        Ok(Self::new(host, port))
    }
}

impl Serialize for Nameserver {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The unit of one network query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryTarget {
    /// Nameserver to ask.
    pub nameserver: Nameserver,
    /// Absolute query name.
    pub name: String,
    /// Requested type.
    pub record_type: RecordType,
}

impl QueryTarget {
    /// Target for `group` at `nameserver`.
    pub fn for_group(nameserver: &Nameserver, group: &RecordGroup) -> Self {
        Self {
            nameserver: nameserver.clone(),
            name: group.name().to_string(),
            record_type: group.record_type().clone(),
        }
    }
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.record_type, self.name, self.nameserver)
    }
}

/// Type-specific payload of an answer record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerData {
    /// IPv4 address.
    A(Ipv4Addr),
    /// IPv6 address.
    Aaaa(Ipv6Addr),
    /// Alias target.
    Cname(String),
    /// CAA property.
    Caa {
        /// Property tag.
        tag: String,
        /// Property value.
        value: String,
    },
    /// Mail exchange.
    Mx {
        /// Preference.
        preference: u16,
        /// Exchange hostname.
        exchange: String,
    },
    /// TXT character-strings, in wire order.
    Txt(Vec<String>),
    /// Any other payload, identified by its type mnemonic.
    Other(String),
}

impl AnswerData {
    /// Record type of this payload.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::A(_) => RecordType::A,
            Self::Aaaa(_) => RecordType::Aaaa,
            Self::Cname(_) => RecordType::Cname,
            Self::Caa { .. } => RecordType::Caa,
            Self::Mx { .. } => RecordType::Mx,
            Self::Txt(_) => RecordType::Txt,
            Self::Other(mnemonic) => RecordType::from(mnemonic.as_str()),
        }
    }
}

/// One record returned by a nameserver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// TTL as served.
    pub ttl: u32,
    /// Payload.
    pub data: AnswerData,
}

impl AnswerRecord {
    /// Create an answer.
    pub fn new(ttl: u32, data: AnswerData) -> Self {
        Self { ttl, data }
    }
}

/// Result of validating one record group against one nameserver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum CheckOutcome {
    /// Served data matches.
    Success {
        /// Group type.
        record_type: RecordType,
        /// Absolute name.
        name: String,
        /// Nameserver checked.
        nameserver: Nameserver,
    },
    /// Served data does not match, or the query failed.
    Failure {
        /// Why.
        reason: CheckError,
        /// Group type.
        record_type: RecordType,
        /// Absolute name.
        name: String,
        /// Nameserver checked.
        nameserver: Nameserver,
    },
}

impl CheckOutcome {
    /// Successful outcome for `target`.
    pub fn success(target: QueryTarget) -> Self {
        Self::Success {
            record_type: target.record_type,
            name: target.name,
            nameserver: target.nameserver,
        }
    }

    /// Failed outcome for `target`.
    pub fn failure(target: QueryTarget, reason: CheckError) -> Self {
        Self::Failure {
            reason,
            record_type: target.record_type,
            name: target.name,
            nameserver: target.nameserver,
        }
    }

    /// Whether this check failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Checked record type.
    pub fn record_type(&self) -> &RecordType {
        match self {
            Self::Success { record_type, .. } | Self::Failure { record_type, .. } => record_type,
        }
    }

    /// Checked absolute name.
    pub fn name(&self) -> &str {
        match self {
            Self::Success { name, .. } | Self::Failure { name, .. } => name,
        }
    }

    /// Checked nameserver.
    pub fn nameserver(&self) -> &Nameserver {
        match self {
            Self::Success { nameserver, .. } | Self::Failure { nameserver, .. } => nameserver,
        }
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&CheckError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(reason),
        }
    }
}
