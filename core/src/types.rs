use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

pub type DynError = Box<dyn Error + 'static>;
pub type HarnessResult<T> = Result<T, DynError>;

/// # Commitment
///
/// The ledger confirmation level requested for queries and preflight checks.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }

    /// Transaction lookups reject `processed`, so it is raised to `confirmed`.
    pub fn for_transaction_lookup(self) -> Self {
        match self {
            Commitment::Processed => Commitment::Confirmed,
            other => other,
        }
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level: {other}")),
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Url
///
/// HTTP endpoint of a JSON-RPC node. Always carries a host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Url(pub hyper::Uri);

impl Url {
    /// `host:port` pair to open a TCP connection to, the port defaulting by scheme.
    pub fn address(&self) -> String {
        let default = match self.0.scheme_str() {
            Some("https") => 443,
            _ => 80,
        };
        let port = self.0.port_u16().unwrap_or(default);
        format!("{}:{}", self.host(), port)
    }

    pub fn host(&self) -> &str {
        self.0.host().unwrap_or_default()
    }
}

impl FromStr for Url {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uri = s.parse::<hyper::Uri>().map_err(|e| e.to_string())?;
        if uri.host().is_none() {
            return Err(format!("url {s} has no host"));
        }
        Ok(Url(uri))
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for Url {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UrlVisitor;

        impl Visitor<'_> for UrlVisitor {
            type Value = Url;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid URI string with a host")
            }

            fn visit_str<E>(self, value: &str) -> Result<Url, E>
            where
                E: de::Error,
            {
                value.parse::<Url>().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(UrlVisitor)
    }
}
