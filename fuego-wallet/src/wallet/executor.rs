// fuego-wallet/src/wallet/executor.rs
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use fuego_core::currency::{Amount, Token};
use fuego_core::network::{Network, RpcBalance, RpcRequest, RpcResponse, RpcSignatureInfo};
use fuego_core::signatures::Signature;
use fuego_core::{WalletError, WalletResult};
use log::{debug, info};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::wallet::process::{find_labeled, parse_signature, run_captured};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutorMode {
    Rpc,
    #[default]
    Server,
    Script,
}

impl fmt::Display for ExecutorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutorMode::Rpc => "rpc",
            ExecutorMode::Server => "server",
            ExecutorMode::Script => "script",
        })
    }
}

impl FromStr for ExecutorMode {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rpc" => Ok(ExecutorMode::Rpc),
            "server" => Ok(ExecutorMode::Server),
            "script" => Ok(ExecutorMode::Script),
            other => Err(WalletError::validation(format!(
                "Unknown executor '{}'. Expected rpc, server or script.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub token: Token,
    pub network: Network,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenBalance {
    pub mint: String,
    pub symbol: String,
    pub amount: String,
    pub decimals: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalanceReport {
    pub lamports: u64,
    pub sol: String,
    pub tokens: Vec<TokenBalance>,
}

impl BalanceReport {
    pub fn new(lamports: u64, tokens: Vec<TokenBalance>) -> Self {
        BalanceReport {
            lamports,
            sol: Amount::from_lamports(lamports).to_string(),
            tokens,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub signature: String,
    pub slot: u64,
    pub failed: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<RpcSignatureInfo> for HistoryEntry {
    fn from(info: RpcSignatureInfo) -> Self {
        HistoryEntry {
            signature: info.signature,
            slot: info.slot,
            failed: info.err.is_some_and(|e| !e.is_null()),
            timestamp: info
                .block_time
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        }
    }
}

/// Hands balance queries and transfers to an external collaborator. The CLI
/// never builds or signs transactions itself.
#[allow(async_fn_in_trait)]
pub trait TransactionExecutor {
    fn mode(&self) -> ExecutorMode;

    async fn balance(&self, owner: &str) -> WalletResult<BalanceReport>;

    async fn send(&self, request: &TransferRequest) -> WalletResult<Signature>;

    async fn history(&self, owner: &str, limit: usize) -> WalletResult<Vec<HistoryEntry>>;
}

/// Read-only queries against a Solana JSON-RPC endpoint.
pub struct RpcExecutor {
    client: reqwest::Client,
    url: String,
}

impl RpcExecutor {
    pub fn new(url: impl Into<String>) -> Self {
        RpcExecutor {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> WalletResult<T> {
        debug!("RPC {} -> {}", method, self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&RpcRequest::new(method, params))
            .send()
            .await
            .map_err(|e| WalletError::external(format!("RPC {} failed", method), e.to_string()))?;
        let body = read_body(response, &format!("RPC {} failed", method)).await?;
        let parsed: RpcResponse<T> = serde_json::from_str(&body).map_err(|e| {
            WalletError::external(format!("RPC {} returned malformed JSON", method), e.to_string())
        })?;
        parsed.into_result(method)
    }
}

impl TransactionExecutor for RpcExecutor {
    fn mode(&self) -> ExecutorMode {
        ExecutorMode::Rpc
    }

    async fn balance(&self, owner: &str) -> WalletResult<BalanceReport> {
        let balance: RpcBalance = self
            .call("getBalance", json!([owner, { "commitment": "confirmed" }]))
            .await?;
        Ok(BalanceReport::new(balance.value, Vec::new()))
    }

    async fn send(&self, _request: &TransferRequest) -> WalletResult<Signature> {
        Err(WalletError::Unsupported(
            "The rpc executor only performs read queries. Run \"fuego config set executor=server\" to send through the Fuego server.".to_string(),
        ))
    }

    async fn history(&self, owner: &str, limit: usize) -> WalletResult<Vec<HistoryEntry>> {
        let signatures: Vec<RpcSignatureInfo> = self
            .call("getSignaturesForAddress", json!([owner, { "limit": limit }]))
            .await?;
        Ok(signatures.into_iter().map(HistoryEntry::from).collect())
    }
}

#[derive(Debug, Deserialize)]
struct ServerBalance {
    lamports: u64,
    #[serde(default)]
    tokens: Vec<TokenBalance>,
}

#[derive(Debug, Deserialize)]
struct ServerSend {
    signature: String,
}

#[derive(Debug, Deserialize)]
struct ServerHistory {
    transactions: Vec<RpcSignatureInfo>,
}

/// The locally running Fuego server, which holds signing logic.
pub struct ServerExecutor {
    client: reqwest::Client,
    base_url: String,
    network: Network,
}

impl ServerExecutor {
    pub fn new(base_url: impl Into<String>, network: Network) -> Self {
        ServerExecutor {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            network,
        }
    }

    pub fn endpoint(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        route: &str,
        body: serde_json::Value,
    ) -> WalletResult<T> {
        let url = self.endpoint(route);
        let context = format!("Fuego server request to {} failed", url);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                WalletError::external(&context, format!("{} (is \"fuego serve\" running?)", e))
            })?;
        let body = read_body(response, &context).await?;
        serde_json::from_str(&body).map_err(|e| {
            WalletError::external(
                format!("Fuego server returned malformed JSON from {}", url),
                e.to_string(),
            )
        })
    }
}

impl TransactionExecutor for ServerExecutor {
    fn mode(&self) -> ExecutorMode {
        ExecutorMode::Server
    }

    async fn balance(&self, owner: &str) -> WalletResult<BalanceReport> {
        let balance: ServerBalance = self
            .post("balance", json!({ "address": owner, "network": self.network }))
            .await?;
        Ok(BalanceReport::new(balance.lamports, balance.tokens))
    }

    async fn send(&self, request: &TransferRequest) -> WalletResult<Signature> {
        info!(
            "Submitting {} {} transfer to {} via server",
            request.amount, request.token, request.to
        );
        let sent: ServerSend = self.post("send", transfer_body(request)).await?;
        Ok(Signature(sent.signature))
    }

    async fn history(&self, owner: &str, limit: usize) -> WalletResult<Vec<HistoryEntry>> {
        let history: ServerHistory = self
            .post(
                "history",
                json!({ "address": owner, "limit": limit, "network": self.network }),
            )
            .await?;
        Ok(history.transactions.into_iter().map(HistoryEntry::from).collect())
    }
}

/// Scripts shipped in the Fuego project, run with an interpreter such as
/// `node` or `python3`.
pub struct ScriptExecutor {
    runtime: String,
    scripts_dir: PathBuf,
    network: Network,
}

pub const TRANSFER_SCRIPT: &str = "transfer.mjs";
pub const BALANCE_SCRIPT: &str = "balance.mjs";

impl ScriptExecutor {
    pub fn new(runtime: impl Into<String>, scripts_dir: PathBuf, network: Network) -> Self {
        ScriptExecutor {
            runtime: runtime.into(),
            scripts_dir,
            network,
        }
    }

    async fn run_script(&self, script: &str, args: Vec<String>) -> WalletResult<String> {
        let script_path = self.scripts_dir.join(script);
        if !script_path.exists() {
            return Err(WalletError::not_found(format!(
                "Script not found at {}. Run \"fuego install\" or \"fuego update\".",
                script_path.display()
            )));
        }
        let mut argv = vec![script_path.to_string_lossy().into_owned()];
        argv.extend(args);
        let output = run_captured(&self.runtime, &argv, None)
            .await?
            .check(&format!("{} failed", script))?;
        Ok(output.stdout)
    }
}

impl TransactionExecutor for ScriptExecutor {
    fn mode(&self) -> ExecutorMode {
        ExecutorMode::Script
    }

    async fn balance(&self, owner: &str) -> WalletResult<BalanceReport> {
        let stdout = self
            .run_script(
                BALANCE_SCRIPT,
                vec![
                    "--address".into(),
                    owner.to_string(),
                    "--network".into(),
                    self.network.to_string(),
                ],
            )
            .await?;
        let lamports = find_labeled(&stdout, "Lamports")
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                WalletError::external(
                    format!("{} returned no balance", BALANCE_SCRIPT),
                    stdout.trim().to_string(),
                )
            })?;
        Ok(BalanceReport::new(lamports, Vec::new()))
    }

    async fn send(&self, request: &TransferRequest) -> WalletResult<Signature> {
        let stdout = self
            .run_script(
                TRANSFER_SCRIPT,
                vec![
                    "--from".into(),
                    request.from.clone(),
                    "--to".into(),
                    request.to.clone(),
                    "--amount".into(),
                    request.amount.to_string(),
                    "--token".into(),
                    request.token.to_string(),
                    "--network".into(),
                    request.network.to_string(),
                ],
            )
            .await?;
        parse_signature(&stdout).ok_or_else(|| {
            WalletError::external(
                format!("{} returned no signature", TRANSFER_SCRIPT),
                stdout.trim().to_string(),
            )
        })
    }

    async fn history(&self, _owner: &str, _limit: usize) -> WalletResult<Vec<HistoryEntry>> {
        Err(WalletError::Unsupported(
            "Transaction history is not available from the script executor. Use the rpc or server executor.".to_string(),
        ))
    }
}

/// The executor selected for this invocation.
pub enum Executor {
    Rpc(RpcExecutor),
    Server(ServerExecutor),
    Script(ScriptExecutor),
}

impl TransactionExecutor for Executor {
    fn mode(&self) -> ExecutorMode {
        match self {
            Executor::Rpc(e) => e.mode(),
            Executor::Server(e) => e.mode(),
            Executor::Script(e) => e.mode(),
        }
    }

    async fn balance(&self, owner: &str) -> WalletResult<BalanceReport> {
        match self {
            Executor::Rpc(e) => e.balance(owner).await,
            Executor::Server(e) => e.balance(owner).await,
            Executor::Script(e) => e.balance(owner).await,
        }
    }

    async fn send(&self, request: &TransferRequest) -> WalletResult<Signature> {
        match self {
            Executor::Rpc(e) => e.send(request).await,
            Executor::Server(e) => e.send(request).await,
            Executor::Script(e) => e.send(request).await,
        }
    }

    async fn history(&self, owner: &str, limit: usize) -> WalletResult<Vec<HistoryEntry>> {
        match self {
            Executor::Rpc(e) => e.history(owner, limit).await,
            Executor::Server(e) => e.history(owner, limit).await,
            Executor::Script(e) => e.history(owner, limit).await,
        }
    }
}

fn transfer_body(request: &TransferRequest) -> serde_json::Value {
    json!({
        "from": request.from,
        "to": request.to,
        "amount": request.amount.to_string(),
        "amountUnits": request.amount.as_smallest_unit(),
        "token": request.token,
        "mint": request.token.mint(),
        "network": request.network,
    })
}

/// Returns the body of a 2xx response; otherwise the body is passed through
/// verbatim as the error detail.
async fn read_body(response: reqwest::Response, context: &str) -> WalletResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| WalletError::external(context, e.to_string()))?;
    if !status.is_success() {
        let detail = if body.trim().is_empty() {
            format!("HTTP {}", status)
        } else {
            format!("HTTP {}: {}", status, body.trim())
        };
        return Err(WalletError::external(context, detail));
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request() -> TransferRequest {
        TransferRequest {
            from: "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_string(),
            to: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
            amount: Amount::parse("1.5", 6).unwrap(),
            token: Token::Usdc,
            network: Network::Mainnet,
        }
    }

    #[test]
    fn test_executor_mode_parsing() {
        assert_eq!("RPC".parse::<ExecutorMode>().unwrap(), ExecutorMode::Rpc);
        assert_eq!("script".parse::<ExecutorMode>().unwrap(), ExecutorMode::Script);
        assert!("carrier-pigeon".parse::<ExecutorMode>().is_err());
        assert_eq!(ExecutorMode::default(), ExecutorMode::Server);
    }

    #[test]
    fn test_transfer_body() {
        let body = transfer_body(&request());
        assert_eq!(body["amount"], json!("1.5"));
        assert_eq!(body["amountUnits"], json!(1_500_000));
        assert_eq!(body["token"], json!("USDC"));
        assert_eq!(body["mint"], json!(Token::Usdc.mint()));
        assert_eq!(body["network"], json!("mainnet"));
    }

    #[test]
    fn test_server_endpoint_trims_trailing_slash() {
        let server = ServerExecutor::new("http://127.0.0.1:8080/", Network::Devnet);
        assert_eq!(server.endpoint("send"), "http://127.0.0.1:8080/send");
    }

    #[test]
    fn test_history_entry_from_rpc() {
        let info: RpcSignatureInfo = serde_json::from_value(json!({
            "signature": "5sig",
            "slot": 42,
            "err": null,
            "blockTime": 1_700_000_000
        }))
        .unwrap();
        let entry = HistoryEntry::from(info);
        assert!(!entry.failed);
        assert_eq!(entry.slot, 42);
        assert_eq!(entry.timestamp.unwrap().timestamp(), 1_700_000_000);

        let failed: RpcSignatureInfo = serde_json::from_value(json!({
            "signature": "5bad",
            "slot": 43,
            "err": { "InstructionError": [0, "Custom"] }
        }))
        .unwrap();
        assert!(HistoryEntry::from(failed).failed);
    }

    #[test]
    fn test_balance_report_renders_sol() {
        let report = BalanceReport::new(2_500_000_000, Vec::new());
        assert_eq!(report.sol, "2.5");
    }

    #[tokio::test]
    async fn test_rpc_executor_refuses_to_send() {
        let rpc = RpcExecutor::new("http://127.0.0.1:1");
        assert!(matches!(
            rpc.send(&request()).await,
            Err(WalletError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn test_script_executor_missing_script_is_not_found() {
        let dir = TempDir::new().unwrap();
        let script = ScriptExecutor::new("node", dir.path().to_path_buf(), Network::Mainnet);
        assert!(matches!(
            script.send(&request()).await,
            Err(WalletError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_executor_parses_signature_and_balance() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(TRANSFER_SCRIPT),
            "echo \"Sending $6 $8 to $4\"\necho \"Signature: 4Zk9sigABC\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(BALANCE_SCRIPT), "echo \"Lamports: 1250000000\"\n").unwrap();

        let script = ScriptExecutor::new("sh", dir.path().to_path_buf(), Network::Mainnet);
        let signature = script.send(&request()).await.unwrap();
        assert_eq!(signature.0, "4Zk9sigABC");

        let balance = script.balance(&request().from).await.unwrap();
        assert_eq!(balance.lamports, 1_250_000_000);
        assert_eq!(balance.sol, "1.25");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_executor_failure_passes_stderr_through() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(TRANSFER_SCRIPT),
            "echo 'insufficient funds for fee' 1>&2\nexit 1\n",
        )
        .unwrap();

        let script = ScriptExecutor::new("sh", dir.path().to_path_buf(), Network::Mainnet);
        let err = script.send(&request()).await.unwrap_err();
        assert!(matches!(err, WalletError::ExternalProcess { .. }));
        assert!(err.to_string().contains("insufficient funds for fee"));
    }
}
