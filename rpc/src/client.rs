//! dcrd JSON-RPC client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use pulse_ledger::{BlockInfo, LedgerError, LedgerSource, TxRecord};
use pulse_types::{Amount, BlockHash, Timestamp, TxHash};

use crate::envelope::{
    decode_response, BlockHeaderResult, RpcRequest, TreasuryBalanceResult, VerboseMempool,
};
use crate::RpcError;

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`DcrdClient`].
#[derive(Clone, Debug)]
pub struct DcrdClientConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    /// PEM certificate to trust in addition to the system roots.
    pub cert: Option<PathBuf>,
    pub timeout: Duration,
}

/// Client for a dcrd node's JSON-RPC endpoint.
pub struct DcrdClient {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    url: String,
    user: String,
    password: String,
    next_id: AtomicU64,
}

impl DcrdClient {
    pub fn new(config: DcrdClientConfig) -> Result<Self, RpcError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT);

        if let Some(path) = &config.cert {
            let pem = std::fs::read(path)
                .map_err(|e| RpcError::Certificate(format!("{}: {e}", path.display())))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| RpcError::Certificate(format!("{}: {e}", path.display())))?;
            builder = builder.add_root_certificate(cert);
        }

        let http_client = builder
            .build()
            .map_err(|e| RpcError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            url: config.url,
            user: config.user,
            password: config.password,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Issue one JSON-RPC call and decode its result.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        trace!(id, method, "rpc request");

        let response = self
            .http_client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RpcError::Unauthorized);
        }
        let body = response.bytes().await?;

        // dcrd reports method errors with a non-2xx status and a JSON body.
        match decode_response(&body) {
            Err(RpcError::InvalidResponse(_)) if !status.is_success() => {
                Err(RpcError::Http(status.as_u16()))
            }
            result => {
                if let Err(e) = &result {
                    debug!(id, method, error = %e, "rpc call failed");
                }
                result
            }
        }
    }

    async fn get_block_count(&self) -> Result<i64, RpcError> {
        self.call("getblockcount", vec![]).await
    }

    async fn get_block_hash(&self, height: i64) -> Result<BlockHash, RpcError> {
        let hash: String = self.call("getblockhash", vec![Value::from(height)]).await?;
        hash.parse()
            .map_err(|e| RpcError::InvalidResponse(format!("block hash {hash}: {e}")))
    }

    async fn get_block(&self, hash: &BlockHash) -> Result<BlockInfo, RpcError> {
        // verbose, without expanded transactions
        self.call(
            "getblock",
            vec![
                Value::from(hash.to_string()),
                Value::from(true),
                Value::from(false),
            ],
        )
        .await
    }

    async fn get_raw_transaction(&self, txid: &TxHash) -> Result<TxRecord, RpcError> {
        self.call(
            "getrawtransaction",
            vec![Value::from(txid.to_string()), Value::from(1)],
        )
        .await
    }

    async fn get_raw_mempool(&self) -> Result<Vec<TxHash>, RpcError> {
        let entries: VerboseMempool = self.call("getrawmempool", vec![Value::from(true)]).await?;
        entries
            .keys()
            .map(|id| {
                id.parse()
                    .map_err(|e| RpcError::InvalidResponse(format!("mempool id {id}: {e}")))
            })
            .collect()
    }

    async fn get_block_header(&self, hash: &BlockHash) -> Result<BlockHeaderResult, RpcError> {
        self.call("getblockheader", vec![Value::from(hash.to_string())])
            .await
    }

    async fn get_treasury_balance(&self) -> Result<TreasuryBalanceResult, RpcError> {
        self.call("gettreasurybalance", vec![]).await
    }
}

#[async_trait]
impl LedgerSource for DcrdClient {
    async fn current_height(&self) -> Result<i64, LedgerError> {
        Ok(self.get_block_count().await?)
    }

    async fn block_hash_at(&self, height: i64) -> Result<BlockHash, LedgerError> {
        Ok(self.get_block_hash(height).await?)
    }

    async fn block_by_hash(&self, hash: &BlockHash) -> Result<BlockInfo, LedgerError> {
        Ok(self.get_block(hash).await?)
    }

    async fn transaction_by_hash(&self, txid: &TxHash) -> Result<TxRecord, LedgerError> {
        Ok(self.get_raw_transaction(txid).await?)
    }

    async fn mempool_tx_ids(&self) -> Result<Vec<TxHash>, LedgerError> {
        Ok(self.get_raw_mempool().await?)
    }

    async fn block_header_time(&self, hash: &BlockHash) -> Result<Timestamp, LedgerError> {
        let header = self.get_block_header(hash).await?;
        Ok(Timestamp::from_unix(header.time))
    }

    async fn treasury_balance(&self) -> Result<Amount, LedgerError> {
        let result = self.get_treasury_balance().await?;
        debug!(height = result.height, atoms = result.balance, "treasury balance");
        Ok(Amount::from_atoms(result.balance))
    }
}
