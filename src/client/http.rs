//! HTTP resource client for the Volcengine OpenAPI gateway.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::signer::{canonical_query, Signer, SigningRequest};
use super::{IntoMapping, Method, PreparedRequest, ResourceClient};
use crate::normalize::Payload;
use crate::types::{Config, RemoteError, Result};

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Envelope returned by every OpenAPI action.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "ResponseMetadata", default)]
    pub metadata: ResponseMetadata,
    #[serde(rename = "Result", default)]
    pub result: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResponseMetadata {
    pub request_id: String,
    pub action: String,
    pub version: String,
    pub service: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceError {
    pub code: String,
    pub message: String,
}

impl IntoMapping for ApiResponse {
    fn into_mapping(self) -> Result<Map<String, Value>> {
        self.result.into_mapping()
    }
}

/// Signs and sends prepared requests.
#[derive(Debug, Clone)]
pub struct VolcengineClient {
    http: reqwest::Client,
    signer: Signer,
    scheme: String,
    host: String,
}

impl VolcengineClient {
    /// Build a client from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.client.request_timeout)
            .build()
            .map_err(RemoteError::Transport)?;
        Ok(Self {
            http,
            signer: Signer::new(&config.credentials, config.region.clone()),
            scheme: config.client.scheme.clone(),
            host: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ResourceClient for VolcengineClient {
    type Response = ApiResponse;

    async fn call(&self, request: PreparedRequest) -> Result<ApiResponse> {
        let endpoint = request.endpoint;
        let service = endpoint.service;
        let method = service.method();

        let mut params = vec![
            ("Action".to_string(), endpoint.action.to_string()),
            ("Version".to_string(), service.version().to_string()),
        ];
        let (body, content_type, http_method) = match method {
            Method::Post => (
                request.payload.to_bytes()?,
                JSON_CONTENT_TYPE,
                reqwest::Method::POST,
            ),
            Method::Get => {
                params.extend(query_params(&request.payload));
                (Vec::new(), FORM_CONTENT_TYPE, reqwest::Method::GET)
            }
        };
        let query = canonical_query(&params);

        let signed = self.signer.sign(
            service.name(),
            &SigningRequest {
                method: http_method.as_str(),
                host: &self.host,
                path: "/",
                query: &query,
                content_type,
                body: &body,
            },
            Utc::now(),
        )?;

        debug!(action = endpoint.action, service = service.name(), "Sending request");

        let url = format!("{}://{}/?{}", self.scheme, self.host, query);
        let mut builder = self
            .http
            .request(http_method, url)
            .header(CONTENT_TYPE, content_type)
            .header("X-Date", signed.x_date)
            .header("X-Content-Sha256", signed.x_content_sha256)
            .header(AUTHORIZATION, signed.authorization);
        if method == Method::Post {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(RemoteError::Transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(RemoteError::Transport)?;
        let decoded = decode_response(status, &text)?;

        debug!(
            action = endpoint.action,
            request_id = %decoded.metadata.request_id,
            "Request completed"
        );
        Ok(decoded)
    }
}

/// Flatten payload values into query parameters.
fn query_params(payload: &Payload) -> Vec<(String, String)> {
    payload
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.to_string(), text)
        })
        .collect()
}

/// Interpret a raw response: a service error wins, then the HTTP status.
fn decode_response(status: u16, body: &str) -> Result<ApiResponse> {
    let parsed = serde_json::from_str::<ApiResponse>(body);

    if let Ok(response) = &parsed {
        if let Some(err) = &response.metadata.error {
            return Err(RemoteError::Service {
                code: err.code.clone(),
                message: err.message.clone(),
                request_id: response.metadata.request_id.clone(),
            }
            .into());
        }
    }
    if !(200..300).contains(&status) {
        return Err(RemoteError::Status {
            status,
            body: body.to_string(),
        }
        .into());
    }
    parsed.map_err(|e| RemoteError::Decode(e.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Error;
    use serde_json::json;

    #[test]
    fn test_query_params_stringify_scalars() {
        let mut payload = Payload::new();
        payload.insert("VpcIds.1", "vpc-a");
        payload.insert("IsDefault", true);
        payload.insert("PageSize", 20);
        assert_eq!(
            query_params(&payload),
            vec![
                ("VpcIds.1".to_string(), "vpc-a".to_string()),
                ("IsDefault".to_string(), "true".to_string()),
                ("PageSize".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_decode_success() {
        let body = json!({
            "ResponseMetadata": {"RequestId": "req-1", "Action": "DescribeDBInstanceDetail"},
            "Result": {"BasicInfo": {"InstanceId": "mysql-1"}}
        })
        .to_string();
        let response = decode_response(200, &body).unwrap();
        assert_eq!(response.metadata.request_id, "req-1");
        let mapping = response.into_mapping().unwrap();
        assert_eq!(mapping["BasicInfo"]["InstanceId"], "mysql-1");
    }

    #[test]
    fn test_decode_service_error() {
        let body = json!({
            "ResponseMetadata": {
                "RequestId": "req-2",
                "Error": {"Code": "InvalidParameter", "Message": "bad zone"}
            }
        })
        .to_string();
        match decode_response(400, &body).unwrap_err() {
            Error::Remote(RemoteError::Service {
                code, request_id, ..
            }) => {
                assert_eq!(code, "InvalidParameter");
                assert_eq!(request_id, "req-2");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_bad_status_without_envelope() {
        let err = decode_response(502, "bad gateway").unwrap_err();
        assert!(matches!(
            err,
            Error::Remote(RemoteError::Status { status: 502, .. })
        ));
    }

    #[test]
    fn test_decode_garbage_with_ok_status() {
        let err = decode_response(200, "not json").unwrap_err();
        assert!(matches!(err, Error::Remote(RemoteError::Decode(_))));
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        assert!(VolcengineClient::new(&Config::default()).is_err());
    }
}
