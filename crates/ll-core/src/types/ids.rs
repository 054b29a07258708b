use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct RequestId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct UserId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct AssignmentId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct CommunicationId(String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
#[schema(as = String)]
pub struct SessionToken(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    InvalidPrefix { expected: &'static str, got: String },
    InvalidUlid { value: String },
    InvalidFormat { value: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPrefix { expected, got } => {
                write!(f, "invalid prefix: expected {expected}, got {got}")
            }
            Self::InvalidUlid { value } => write!(f, "invalid ulid: {value}"),
            Self::InvalidFormat { value } => write!(f, "invalid id format: {value}"),
        }
    }
}

impl std::error::Error for IdError {}

fn validate_prefixed(value: &str, prefix: &'static str) -> Result<(), IdError> {
    let Some(rest) = value.strip_prefix(prefix) else {
        let got = value.split('_').next().unwrap_or("").to_string();
        return Err(IdError::InvalidPrefix {
            expected: prefix,
            got,
        });
    };
    if rest.len() != 26 {
        return Err(IdError::InvalidFormat {
            value: value.to_string(),
        });
    }
    Ulid::from_str(rest).map_err(|_| IdError::InvalidUlid {
        value: value.to_string(),
    })?;
    Ok(())
}

macro_rules! id_type {
    ($name:ident, $prefix:expr) => {
        impl $name {
            pub const PREFIX: &'static str = $prefix;

            pub fn new(value: String) -> Result<Self, IdError> {
                validate_prefixed(&value, Self::PREFIX)?;
                Ok(Self(value))
            }

            pub fn generate() -> Self {
                Self(format!("{}{}", Self::PREFIX, Ulid::new()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                Self::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

id_type!(RequestId, "req_");
id_type!(UserId, "usr_");
id_type!(AssignmentId, "asg_");
id_type!(CommunicationId, "msg_");
id_type!(SessionToken, "sess_");
