//! Resource client boundary.
//!
//! Operation handlers hand a [`PreparedRequest`] to a [`ResourceClient`] and
//! pass its response back unchanged; the only capability they need from the
//! response is conversion into a canonical mapping ([`IntoMapping`]).

mod http;
mod signer;

pub use http::{ApiResponse, ResponseMetadata, ServiceError, VolcengineClient};
pub use signer::{Signer, SigningRequest};

use crate::normalize::Payload;
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Remote service an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    RdsMysql,
    Vpc,
}

/// How the payload travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// JSON body.
    Post,
    /// Flat query string.
    Get,
}

impl Service {
    /// Service name used in the signing scope.
    pub fn name(self) -> &'static str {
        match self {
            Service::RdsMysql => "rds_mysql",
            Service::Vpc => "vpc",
        }
    }

    /// API version sent with every action.
    pub fn version(self) -> &'static str {
        match self {
            Service::RdsMysql => "2022-01-01",
            Service::Vpc => "2020-04-01",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Service::RdsMysql => Method::Post,
            Service::Vpc => Method::Get,
        }
    }
}

/// Wire endpoint of one operation: service plus action name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub service: Service,
    pub action: &'static str,
}

impl Endpoint {
    pub const fn rds(action: &'static str) -> Self {
        Self {
            service: Service::RdsMysql,
            action,
        }
    }

    pub const fn vpc(action: &'static str) -> Self {
        Self {
            service: Service::Vpc,
            action,
        }
    }
}

/// A validated, normalized request ready for the resource client.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub endpoint: Endpoint,
    pub payload: Payload,
}

/// Conversion of a client response into the canonical result mapping.
pub trait IntoMapping {
    fn into_mapping(self) -> Result<Map<String, Value>>;
}

impl IntoMapping for Map<String, Value> {
    fn into_mapping(self) -> Result<Map<String, Value>> {
        Ok(self)
    }
}

impl IntoMapping for Value {
    fn into_mapping(self) -> Result<Map<String, Value>> {
        match self {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            other => {
                let mut map = Map::new();
                map.insert("Result".to_string(), other);
                Ok(map)
            }
        }
    }
}

/// Performs the authenticated remote call for a prepared request.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    type Response: IntoMapping + Send;

    async fn call(&self, request: PreparedRequest) -> Result<Self::Response>;
}

/// Convert a response into its mapping, tagging decode failures as remote.
pub fn to_mapping<R: IntoMapping>(response: R) -> Result<Map<String, Value>> {
    response.into_mapping().map_err(|e| match e {
        Error::Serialization(err) => {
            Error::Remote(crate::types::RemoteError::Decode(err.to_string()))
        }
        other => other,
    })
}
