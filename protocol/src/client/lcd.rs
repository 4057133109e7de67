//! [`ChainClient`] over the SDK's LCD REST gateway.
//!
//! ```text
//! account_info ──► GET /cosmos/auth/v1beta1/accounts/{address}
//!                      x-cosmos-block-height: <height>   (when pinned)
//! status       ──► GET /cosmos/base/tendermint/v1beta1/node_info
//! ```
//!
//! Paths are built segment by segment, so an address can never climb out
//! of the accounts route.
//!
//! The gateway renders 64-bit integers as JSON strings, and vesting
//! accounts nest the base account one or two levels down; both are handled
//! when decoding.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{AccountInfo, ChainClient, ClientError, NodeStatus};
use crate::config::{DEFAULT_CLIENT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT};
use crate::tx::{StdTxConfig, TxConfig};

/// Header pinning an LCD query to a block height.
pub const BLOCK_HEIGHT_HEADER: &str = "x-cosmos-block-height";

/// LCD-backed chain client.
pub struct LcdClient {
    http: Client,
    base_url: String,
    base: Url,
    tx_config: Arc<dyn TxConfig>,
}

impl LcdClient {
    /// Create a client for the LCD at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_CLIENT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|_| ClientError::InvalidUrl(base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url));
        }

        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            http,
            base_url,
            base,
            tx_config: Arc::new(StdTxConfig::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, segments: &[&str], height: Option<u64>) -> Result<Value, ClientError> {
        let url = self.endpoint(segments)?;
        let mut request = self.http.get(url.clone());
        if let Some(height) = height {
            request = request.header(BLOCK_HEIGHT_HEADER, height.to_string());
        }

        debug!(%url, ?height, "LCD request");
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChainClient for LcdClient {
    async fn account_info(
        &self,
        address: &str,
        height: Option<u64>,
    ) -> Result<AccountInfo, ClientError> {
        let path = ["cosmos", "auth", "v1beta1", "accounts", address];
        match self.get_json(&path, height).await {
            Ok(body) => parse_account(address, &body),
            Err(ClientError::Status { status: 404, .. }) => {
                Err(ClientError::AccountNotFound(address.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn status(&self) -> Result<NodeStatus, ClientError> {
        let body = self
            .get_json(
                &["cosmos", "base", "tendermint", "v1beta1", "node_info"],
                None,
            )
            .await?;
        parse_node_info(&body)
    }

    fn tx_config(&self) -> Arc<dyn TxConfig> {
        Arc::clone(&self.tx_config)
    }
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

/// Locate the base account inside an `accounts/{address}` response.
fn base_account(body: &Value) -> Option<&Value> {
    let account = body.get("account")?;
    [
        "/base_vesting_account/base_account",
        "/base_account",
        "",
    ]
    .iter()
    .filter_map(|ptr| account.pointer(ptr))
    .find(|candidate| candidate.get("account_number").is_some())
}

fn u64_field(object: &Value, field: &str) -> Result<u64, ClientError> {
    match object.get(field) {
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| ClientError::Decode(format!("{} is not an integer: {:?}", field, s))),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| ClientError::Decode(format!("{} out of range: {}", field, n))),
        // The gateway omits zero-valued fields.
        None | Some(Value::Null) => Ok(0),
        Some(other) => Err(ClientError::Decode(format!(
            "{} has unexpected type: {}",
            field, other
        ))),
    }
}

pub(crate) fn parse_account(address: &str, body: &Value) -> Result<AccountInfo, ClientError> {
    let account =
        base_account(body).ok_or_else(|| ClientError::Decode("response has no account".into()))?;

    Ok(AccountInfo {
        address: account
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or(address)
            .to_string(),
        account_number: u64_field(account, "account_number")?,
        sequence: u64_field(account, "sequence")?,
    })
}

pub(crate) fn parse_node_info(body: &Value) -> Result<NodeStatus, ClientError> {
    let info = body
        .get("default_node_info")
        .ok_or_else(|| ClientError::Decode("response has no default_node_info".into()))?;

    let network = info
        .get("network")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ClientError::Decode("node_info has no network".into()))?;

    Ok(NodeStatus {
        network: network.to_string(),
        moniker: info.get("moniker").and_then(Value::as_str).map(str::to_string),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const ADDR: &str = "cosmos1qyqszqgpqyqszqgpqyqszqgpqyqszqgpjnp7du";

    // -- Decoding -----------------------------------------------------------

    #[test]
    fn parses_base_account() {
        let body = json!({"account": {
            "@type": "/cosmos.auth.v1beta1.BaseAccount",
            "address": ADDR,
            "account_number": "42",
            "sequence": "7"
        }});
        let info = parse_account(ADDR, &body).unwrap();
        assert_eq!(info.account_number, 42);
        assert_eq!(info.sequence, 7);
        assert_eq!(info.address, ADDR);
    }

    #[test]
    fn parses_vesting_account() {
        let body = json!({"account": {
            "@type": "/cosmos.vesting.v1beta1.ContinuousVestingAccount",
            "base_vesting_account": {
                "base_account": {"address": ADDR, "account_number": "3", "sequence": "1"}
            }
        }});
        let info = parse_account(ADDR, &body).unwrap();
        assert_eq!((info.account_number, info.sequence), (3, 1));
    }

    #[test]
    fn missing_sequence_is_zero() {
        let body = json!({"account": {"address": ADDR, "account_number": "5"}});
        assert_eq!(parse_account(ADDR, &body).unwrap().sequence, 0);
    }

    #[test]
    fn rejects_non_numeric_fields() {
        let body = json!({"account": {"account_number": "x", "sequence": "1"}});
        assert!(matches!(
            parse_account(ADDR, &body),
            Err(ClientError::Decode(_))
        ));
    }

    #[test]
    fn parses_node_info() {
        let body = json!({"default_node_info": {"network": "cosmoshub-4", "moniker": "n0"}});
        let status = parse_node_info(&body).unwrap();
        assert_eq!(status.network, "cosmoshub-4");
        assert_eq!(status.moniker.as_deref(), Some("n0"));
        assert!(parse_node_info(&json!({})).is_err());
    }

    // -- HTTP ---------------------------------------------------------------

    async fn account(Path(address): Path<String>, headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        if address != ADDR {
            return (
                AxumStatus::NOT_FOUND,
                Json(json!({"code": 5, "message": "account not found"})),
            );
        }
        let sequence = headers
            .get(BLOCK_HEIGHT_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("9")
            .to_string();
        (
            AxumStatus::OK,
            Json(json!({"account": {"address": ADDR, "account_number": "11", "sequence": sequence}})),
        )
    }

    // Also carries an account-shaped body so a request that strays here
    // would decode as an account.
    async fn node_info() -> Json<Value> {
        Json(json!({
            "default_node_info": {"network": "test-chain"},
            "account": {"account_number": "999", "sequence": "999"}
        }))
    }

    async fn spawn_lcd() -> String {
        let app = Router::new()
            .route("/cosmos/auth/v1beta1/accounts/:address", get(account))
            .route("/cosmos/base/tendermint/v1beta1/node_info", get(node_info));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn fetches_account_and_status() {
        let client = LcdClient::new(spawn_lcd().await).unwrap();

        let info = client.account_info(ADDR, None).await.unwrap();
        assert_eq!(info.account_number, 11);
        assert_eq!(info.sequence, 9);

        let status = client.status().await.unwrap();
        assert_eq!(status.network, "test-chain");
    }

    #[tokio::test]
    async fn pins_height_via_header() {
        let client = LcdClient::new(spawn_lcd().await).unwrap();
        let info = client.account_info(ADDR, Some(77)).await.unwrap();
        // The fake LCD echoes the height header into the sequence.
        assert_eq!(info.sequence, 77);
    }

    #[tokio::test]
    async fn unknown_account_maps_to_not_found() {
        let client = LcdClient::new(spawn_lcd().await).unwrap();
        let err = client.account_info("cosmos1unknown", None).await.unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(a) if a == "cosmos1unknown"));
    }

    #[tokio::test]
    async fn address_stays_inside_accounts_route() {
        let client = LcdClient::new(spawn_lcd().await).unwrap();
        let traversal = "x/../../../../base/tendermint/v1beta1/node_info";
        let err = client.account_info(traversal, None).await.unwrap_err();
        assert!(matches!(err, ClientError::AccountNotFound(a) if a == traversal));
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let client = LcdClient::new("http://localhost:1317/api/").unwrap();
        let url = client.endpoint(&["accounts", "a/../b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:1317/api/accounts/a%2F..%2Fb");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            LcdClient::new("localhost:1317"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            LcdClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_node_is_http_error() {
        let client =
            LcdClient::with_timeout("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        assert!(matches!(
            client.status().await,
            Err(ClientError::Http(_))
        ));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let client = LcdClient::new("http://localhost:1317/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1317");
    }
}
