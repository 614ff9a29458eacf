use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WatchError;

/// Number of space-separated fields in SOA record text
pub const SOA_FIELDS: usize = 7;

/// Parsed Start-of-Authority record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoaRecord {
    /// Primary nameserver (MNAME)
    pub primary_ns: String,

    /// Responsible mailbox (RNAME)
    pub admin: String,

    /// Zone serial
    pub serial: u32,

    /// Refresh interval in seconds
    pub refresh: u32,

    /// Retry interval in seconds
    pub retry: u32,

    /// Expire limit in seconds
    pub expire: u32,

    /// Negative-caching TTL in seconds
    pub minimum: u32,
}

impl FromStr for SoaRecord {
    type Err = WatchError;

    /// Parse the presentation form `mname rname serial refresh retry expire minimum`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() < SOA_FIELDS {
            return Err(WatchError::MalformedSoa(format!(
                "expected {SOA_FIELDS} fields, got {}: {s:?}",
                fields.len()
            )));
        }

        let number = |idx: usize, name: &str| -> Result<u32, WatchError> {
            fields[idx]
                .parse()
                .map_err(|_| WatchError::MalformedSoa(format!("{name} is not a number: {:?}", fields[idx])))
        };

        Ok(Self {
            primary_ns: fields[0].to_string(),
            admin: fields[1].to_string(),
            serial: number(2, "serial")?,
            refresh: number(3, "refresh")?,
            retry: number(4, "retry")?,
            expire: number(5, "expire")?,
            minimum: number(6, "minimum")?,
        })
    }
}

impl fmt::Display for SoaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.primary_ns,
            self.admin,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}
