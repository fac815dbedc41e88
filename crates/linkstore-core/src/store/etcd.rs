//! etcd v3 backend over the JSON gateway (`/v3/kv/*`). Keys and values travel base64-encoded;
//! int64 fields come back as JSON strings.

use super::KvBackend;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

pub struct EtcdBackend {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Default, Deserialize)]
struct KeyValue {
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<KeyValue>,
}

#[derive(Debug, Default, Deserialize)]
struct DeleteRangeResponse {
    #[serde(default)]
    deleted: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TxnResponse {
    #[serde(default)]
    succeeded: bool,
    #[serde(default)]
    responses: Vec<Value>,
}

impl EtcdBackend {
    /// `endpoint` is the base URL, e.g. `http://localhost:2379`.
    pub fn new(endpoint: impl Into<String>) -> StoreResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: for<'de> Deserialize<'de>>(&self, path: &str, body: Value) -> StoreResult<T> {
        let url = format!("{}{}", self.endpoint, path);
        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            tracing::warn!(
                target: "linkstore::store",
                url = %url,
                status = status.as_u16(),
                "etcd request rejected"
            );
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }
}

fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn unb64(s: &str) -> StoreResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|e| StoreError::Encoding(format!("base64: {}", e)))
}

/// Smallest key greater than every key starting with `prefix` (etcd's `GetPrefixRangeEnd`).
/// An all-`0xff` prefix yields `[0]`, which etcd reads as "to the end of the key space".
pub(crate) fn prefix_range_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    for i in (0..end.len()).rev() {
        if end[i] < 0xff {
            end[i] += 1;
            end.truncate(i + 1);
            return end;
        }
    }
    vec![0]
}

/// int64 fields are strings in gateway JSON, but accept numbers too.
fn as_u64(v: &Value) -> u64 {
    match v {
        Value::String(s) => s.parse().unwrap_or(0),
        Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

fn decode_pair(kv: KeyValue) -> StoreResult<(String, Vec<u8>)> {
    let key = String::from_utf8(unb64(&kv.key)?).map_err(|e| StoreError::Encoding(e.to_string()))?;
    Ok((key, unb64(&kv.value)?))
}

#[async_trait]
impl KvBackend for EtcdBackend {
    fn name(&self) -> &'static str {
        "etcd"
    }

    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let res: RangeResponse = self
            .call("/v3/kv/range", json!({ "key": b64(key.as_bytes()) }))
            .await?;
        match res.kvs.into_iter().next() {
            Some(kv) => Ok(Some(unb64(&kv.value)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let _: Value = self
            .call(
                "/v3/kv/put",
                json!({ "key": b64(key.as_bytes()), "value": b64(value) }),
            )
            .await?;
        Ok(())
    }

    async fn put_if_absent(&self, key: &str, value: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        let k = b64(key.as_bytes());
        let body = json!({
            "compare": [{ "key": k, "target": "CREATE", "result": "EQUAL", "create_revision": "0" }],
            "success": [{ "request_put": { "key": k, "value": b64(value) } }],
            "failure": [{ "request_range": { "key": k } }],
        });
        let res: TxnResponse = self.call("/v3/kv/txn", body).await?;
        if res.succeeded {
            return Ok(None);
        }
        let existing = res
            .responses
            .into_iter()
            .filter_map(|r| r.get("response_range").cloned())
            .filter_map(|r| serde_json::from_value::<RangeResponse>(r).ok())
            .flat_map(|r| r.kvs)
            .next();
        match existing {
            Some(kv) => Ok(Some(unb64(&kv.value)?)),
            // Lost the race and the key vanished before the range read; report it as held.
            None => Ok(Some(Vec::new())),
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> StoreResult<Vec<(String, Vec<u8>)>> {
        let body = json!({
            "key": b64(prefix.as_bytes()),
            "range_end": b64(&prefix_range_end(prefix.as_bytes())),
            "sort_order": "ASCEND",
            "sort_target": "KEY",
        });
        let res: RangeResponse = self.call("/v3/kv/range", body).await?;
        res.kvs.into_iter().map(decode_pair).collect()
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let res: DeleteRangeResponse = self
            .call("/v3/kv/deleterange", json!({ "key": b64(key.as_bytes()) }))
            .await?;
        Ok(res.deleted.as_ref().map(as_u64).unwrap_or(0) > 0)
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<u64> {
        let body = json!({
            "key": b64(prefix.as_bytes()),
            "range_end": b64(&prefix_range_end(prefix.as_bytes())),
        });
        let res: DeleteRangeResponse = self.call("/v3/kv/deleterange", body).await?;
        Ok(res.deleted.as_ref().map(as_u64).unwrap_or(0))
    }
}
