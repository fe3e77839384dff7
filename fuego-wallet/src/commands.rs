// fuego-wallet/src/commands.rs
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Subcommand};
use fuego_core::address::shorten;
use fuego_core::currency::{Amount, SwapAsset, Token};
use fuego_core::network::Network;
use fuego_core::signatures::Signature;
use fuego_core::{WalletError, CLI_VERSION, FUEGO_REPO_URL};
use log::{debug, info, warn};
use reqwest::Url;
use serde::Serialize;

use crate::wallet::config::{
    display_value, parse_assignment, validate_rpc_url, KEY_EXECUTOR, KEY_NETWORK, KEY_RPC_URL,
    TOOL_CLI, TOOL_PROJECT,
};
use crate::wallet::constants::{
    DASHBOARD_DIR_NAME, DASHBOARD_FILE_NAME, JUPITER_QUOTE_SCRIPT, JUPITER_SWAP_SCRIPT,
    PURCHASE_SCRIPT, SERVER_DIR_NAME,
};
use crate::wallet::contacts::RemoveOutcome;
use crate::wallet::core::Core;
use crate::wallet::executor::{ExecutorMode, TransactionExecutor, TransferRequest};
use crate::wallet::process::{parse_signature, run_captured, run_inherited, run_streaming};

const MOONPAY_URL: &str = "https://buy.moonpay.com/?currencyCode=SOL";
/// Solana caps `getSignaturesForAddress` at this many entries.
const MAX_HISTORY_LIMIT: usize = 1000;
/// Precision assumed for a raw mint amount, whose decimals are unknown here.
const RAW_MINT_DECIMALS: u32 = 9;

// --- Output helpers ---

pub fn print_error(message: &str) {
    eprintln!("\x1b[31mError:\x1b[0m {}", message);
}

pub fn print_success(message: &str) {
    println!("\x1b[32m{}\x1b[0m", message);
}

pub fn print_warning(message: &str) {
    println!("\x1b[33mWarning:\x1b[0m {}", message);
}

fn print_heading(title: &str) {
    println!("\n\x1b[1;36m{}\x1b[0m\n", title);
}

fn print_hint(message: &str) {
    println!("\x1b[90m{}\x1b[0m", message);
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to render JSON output")?
    );
    Ok(())
}

// --- Command definitions ---

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new wallet
    Create {
        /// Overwrite an existing wallet
        #[arg(short, long)]
        force: bool,
        /// Wallet name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show the wallet address
    Address {
        /// Check that the stored public key matches the secret key
        #[arg(long)]
        verify: bool,
    },
    /// Show the address to receive funds at
    Receive,
    /// Show how to fund the wallet
    Fund,
    /// Show SOL and token balances
    Balance {
        #[arg(long)]
        json: bool,
    },
    /// Send SOL, USDC or USDT to an address or contact
    Send {
        /// Base58 address or contact name
        recipient: String,
        amount: String,
        #[arg(short, long, default_value = "SOL")]
        token: Token,
        /// Submit the transfer instead of previewing it
        #[arg(short, long)]
        yes: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show recent transactions
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Manage the address book
    Contacts {
        #[command(subcommand)]
        action: ContactsCommand,
    },
    /// Read and write settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Show or set the RPC endpoint
    Rpc {
        #[arg(short, long)]
        url: Option<String>,
        #[arg(short, long)]
        network: Option<Network>,
    },
    /// Clone the Fuego project
    Install {
        /// Installation path (default: ~/.openclaw/workspace/fuego)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Update fuego-cli and the Fuego project
    Update {
        #[arg(long)]
        cli: bool,
        #[arg(long)]
        fuego: bool,
    },
    /// Run the Fuego server from the installed project
    Serve,
    /// Open the Fuego dashboard in a browser
    Dashboard,
    /// Token swaps through Jupiter
    Jupiter {
        #[command(subcommand)]
        action: JupiterCommand,
    },
    /// Buy a product with an x402 payment through Purch.xyz
    Purch(PurchArgs),
}

#[derive(Subcommand, Debug)]
pub enum ContactsCommand {
    /// Save a contact
    Add {
        name: String,
        address: String,
        #[arg(short, long)]
        label: Option<String>,
    },
    /// List saved contacts
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one contact
    Show { name: String },
    /// Remove a contact
    Remove {
        name: String,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Get { key: String },
    /// Set a value with key=value
    Set { assignment: String },
    List,
}

#[derive(Args, Debug, Clone)]
pub struct SwapArgs {
    pub amount: String,
    #[arg(long)]
    pub input: SwapAsset,
    #[arg(long)]
    pub output: SwapAsset,
}

#[derive(Subcommand, Debug)]
pub enum JupiterCommand {
    /// Fetch a swap quote
    Quote(SwapArgs),
    /// Execute a swap
    Swap {
        #[command(flatten)]
        swap: SwapArgs,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PurchArgs {
    pub product_url: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub name: String,
    #[arg(long = "address-line1")]
    pub address_line1: String,
    #[arg(long = "address-line2")]
    pub address_line2: Option<String>,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub postal_code: String,
    #[arg(long, default_value = "US")]
    pub country: String,
}

pub async fn run_command(core: &Core, command: Commands) -> Result<()> {
    match command {
        Commands::Create { force, name } => create_command(core, name.as_deref(), force),
        Commands::Address { verify } => address_command(core, verify),
        Commands::Receive => receive_command(core),
        Commands::Fund => fund_command(core),
        Commands::Balance { json } => balance_command(core, json).await,
        Commands::Send {
            recipient,
            amount,
            token,
            yes,
            json,
        } => send_command(core, &recipient, &amount, token, yes, json).await,
        Commands::History { limit, json } => history_command(core, limit, json).await,
        Commands::Contacts { action } => contacts_command(core, action),
        Commands::Config { action } => config_command(core, action),
        Commands::Rpc { url, network } => rpc_command(core, url, network),
        Commands::Install { path } => install_command(core, path).await,
        Commands::Update { cli, fuego } => update_command(core, cli, fuego).await,
        Commands::Serve => serve_command(core).await,
        Commands::Dashboard => dashboard_command(core).await,
        Commands::Jupiter { action } => match action {
            JupiterCommand::Quote(swap) => jupiter_quote_command(core, swap).await,
            JupiterCommand::Swap { swap, yes } => jupiter_swap_command(core, swap, yes).await,
        },
        Commands::Purch(args) => purch_command(core, args).await,
    }
}

// --- Wallet ---

fn create_command(core: &Core, name: Option<&str>, force: bool) -> Result<()> {
    print_heading("Fuego Wallet Creation");
    let created = core.create_wallet(name, force)?;

    print_success("Wallet created successfully!");
    if created.replaced {
        print_warning("The previous wallet was overwritten.");
    }
    println!("\nName:       {}", created.name);
    println!("Public Key: {}", created.public_key);
    if let Some(mnemonic) = &created.mnemonic {
        println!("\nRecovery phrase: {}", mnemonic);
    } else {
        print_hint("\nNo recovery phrase: back up the keypair file below instead.");
    }
    print_hint(&format!("Keypair: {}", core.secrets.path().display()));
    print_hint(&format!("Config:  {}", core.metadata.path().display()));
    Ok(())
}

fn address_command(core: &Core, verify: bool) -> Result<()> {
    let metadata = if verify {
        core.verify_wallet()?
    } else {
        core.load_metadata()?
    };

    print_heading("Your Fuego Address");
    println!("Name:       {}", metadata.name);
    println!("Public Key: {}", shorten(&metadata.public_key.to_base58(), 8));
    if verify {
        print_success("Public key matches the stored secret key.");
    }
    print_hint("\nPlain text (for copying):");
    println!("{}", metadata.public_key);
    Ok(())
}

fn receive_command(core: &Core) -> Result<()> {
    let metadata = core.load_metadata()?;
    let network = core.config.network()?;

    print_heading("Receive Funds");
    println!("{}", metadata.public_key);
    print_hint(&format!(
        "\nSend SOL or SPL tokens ({}) to this address on {}.",
        Token::TRANSFERABLE
            .iter()
            .filter(|t| **t != Token::Sol)
            .map(Token::symbol)
            .collect::<Vec<_>>()
            .join(", "),
        network
    ));
    Ok(())
}

pub fn moonpay_url(address: &str) -> String {
    format!("{}&walletAddress={}", MOONPAY_URL, address)
}

fn fund_command(core: &Core) -> Result<()> {
    let metadata = core.load_metadata()?;
    let address = metadata.public_key.to_base58();

    print_heading("Fund Your Wallet");
    println!("Address: {}", address);
    println!("\nBuy SOL with card or bank transfer and send it directly to your wallet:");
    println!("{}", moonpay_url(&address));
    Ok(())
}

async fn balance_command(core: &Core, json: bool) -> Result<()> {
    let metadata = core.load_metadata()?;
    let executor = core.executor()?;
    let owner = metadata.public_key.to_base58();

    let report = executor
        .balance(&owner)
        .await
        .context("Failed to fetch balance")?;

    if json {
        return print_json(&report);
    }

    print_heading("Wallet Balance");
    println!("SOL: {}", report.sol);
    if !report.tokens.is_empty() {
        println!("\nTokens:");
        for token in &report.tokens {
            println!("  {}: {}", token.symbol, token.amount);
        }
    }
    print_hint(&format!("\nAddress: {}", owner));
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendReport<'a> {
    signature: &'a Signature,
    explorer_url: String,
    #[serde(flatten)]
    request: &'a TransferRequest,
}

#[derive(Serialize)]
struct SendPreview<'a> {
    preview: bool,
    #[serde(flatten)]
    request: &'a TransferRequest,
}

async fn send_command(
    core: &Core,
    recipient: &str,
    amount: &str,
    token: Token,
    yes: bool,
    json: bool,
) -> Result<()> {
    if !Token::TRANSFERABLE.contains(&token) {
        return Err(WalletError::validation(format!(
            "{} cannot be sent with this command. Supported: SOL, USDC, USDT",
            token
        ))
        .into());
    }
    let amount = Amount::parse_positive(amount, token.decimals())?;
    let metadata = core.load_metadata()?;
    let to = core.resolve_recipient(recipient)?;
    let from = metadata.public_key.to_base58();
    if to == from {
        print_warning("Recipient is this wallet's own address.");
    }

    let request = TransferRequest {
        from,
        to,
        amount,
        token,
        network: core.config.network()?,
    };

    if !yes && json {
        return print_json(&SendPreview {
            preview: true,
            request: &request,
        });
    }
    if !yes {
        print_heading("Transfer Preview");
        println!("Amount:  {} {}", request.amount, request.token);
        if request.to != recipient {
            println!("To:      {} ({})", request.to, recipient);
        } else {
            println!("To:      {}", request.to);
        }
        println!("From:    {}", request.from);
        println!("Network: {}", request.network);
        print_warning("Add --yes to sign and submit this transfer.");
        return Ok(());
    }

    let executor = core.executor()?;
    info!(
        "Sending {} {} to {} with the {} executor",
        request.amount,
        request.token,
        request.to,
        executor.mode()
    );
    let signature = executor
        .send(&request)
        .await
        .context("Transaction failed")?;

    if json {
        return print_json(&SendReport {
            signature: &signature,
            explorer_url: signature.explorer_url(),
            request: &request,
        });
    }

    print_success("Transaction successful");
    println!("\nAmount:    {} {}", request.amount, request.token);
    println!("To:        {}", request.to);
    println!("Signature: {}", signature);
    print_hint(&format!("\nView on Solscan: {}", signature.explorer_url()));
    Ok(())
}

async fn history_command(core: &Core, limit: usize, json: bool) -> Result<()> {
    if limit == 0 || limit > MAX_HISTORY_LIMIT {
        return Err(WalletError::validation(format!(
            "Limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        ))
        .into());
    }
    let metadata = core.load_metadata()?;
    let executor = core.executor()?;
    let entries = executor
        .history(&metadata.public_key.to_base58(), limit)
        .await
        .context("Failed to fetch history")?;

    if json {
        return print_json(&entries);
    }

    print_heading(&format!("Recent Transactions ({})", entries.len()));
    if entries.is_empty() {
        print_hint("No transactions found.");
    }
    for entry in &entries {
        let when = entry
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "pending".to_string());
        let status = if entry.failed { "failed" } else { "ok" };
        println!("{}  {:<6} {}", when, status, shorten(&entry.signature, 16));
    }
    Ok(())
}

// --- Address book ---

fn contacts_command(core: &Core, action: ContactsCommand) -> Result<()> {
    match action {
        ContactsCommand::Add {
            name,
            address,
            label,
        } => {
            let entry = core.contacts.add(&name, &address, label.as_deref())?;
            print_success(&format!("Added contact \"{}\"", name));
            println!("Address: {}", entry.address);
            if let Some(label) = entry.label {
                println!("Label:   {}", label);
            }
        }
        ContactsCommand::List { json } => {
            let book = core.contacts.list()?;
            if json {
                return print_json(&book);
            }
            print_heading(&format!("Address Book ({})", book.len()));
            if book.is_empty() {
                print_hint("No contacts saved. Add one with: fuego contacts add <name> <address>");
            }
            for (name, entry) in &book {
                match &entry.label {
                    Some(label) => println!("{:<16} {}  ({})", name, entry.address, label),
                    None => println!("{:<16} {}", name, entry.address),
                }
            }
        }
        ContactsCommand::Show { name } => {
            let entry = core.contacts.show(&name)?;
            print_heading(&format!("Contact: {}", name));
            println!("Address: {}", entry.address);
            if let Some(label) = &entry.label {
                println!("Label:   {}", label);
            }
            println!("Added:   {}", entry.added_at.format("%Y-%m-%d"));
        }
        ContactsCommand::Remove { name, yes } => match core.contacts.remove(&name, yes)? {
            RemoveOutcome::Preview(entry) => {
                println!("Would remove \"{}\" ({})", name, entry.address);
                print_warning("Add --yes to confirm removal.");
            }
            RemoveOutcome::Removed(entry) => {
                print_success(&format!("Removed contact \"{}\" ({})", name, entry.address));
            }
        },
    }
    Ok(())
}

// --- Settings ---

/// Rejects values for well-known keys that later commands could not use.
fn check_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        KEY_RPC_URL => {
            validate_rpc_url(value)?;
        }
        KEY_NETWORK => {
            value.parse::<Network>()?;
        }
        KEY_EXECUTOR => {
            value.parse::<ExecutorMode>()?;
        }
        _ => {}
    }
    Ok(())
}

fn config_command(core: &Core, action: ConfigCommand) -> Result<()> {
    match action {
        ConfigCommand::Get { key } => match core.config.get(&key)? {
            Some(value) => println!("{}", display_value(&value)),
            None => print_hint("(not set)"),
        },
        ConfigCommand::Set { assignment } => {
            let (key, value) = parse_assignment(&assignment)?;
            check_config_value(&key, &value)?;
            core.config.set(&key, value.as_str())?;
            print_success(&format!("Set {} = {}", key, value));
        }
        ConfigCommand::List => {
            let config = core.config.list()?;
            print_heading("Fuego Configuration");
            if config.is_empty() {
                print_hint("No settings saved yet.");
            }
            for (key, value) in &config {
                println!("{}: {}", key, display_value(value));
            }
        }
    }
    Ok(())
}

fn rpc_command(core: &Core, url: Option<String>, network: Option<Network>) -> Result<()> {
    let Some(url) = url else {
        print_heading("Current RPC Configuration");
        match core.config.get_string(KEY_RPC_URL)? {
            Some(url) => println!("RPC URL: {}", url),
            None => println!("RPC URL: not set ({})", core.config.rpc_url()?),
        }
        println!("Network: {}", core.config.network()?);
        print_hint("\nUsage: fuego rpc --url https://api.mainnet-beta.solana.com");
        print_hint("   or: fuego rpc --url https://mainnet.helius-rpc.com/?api-key=... --network mainnet");
        return Ok(());
    };

    validate_rpc_url(&url)?;
    let network = network.unwrap_or_default();
    core.config
        .set_many([(KEY_RPC_URL, url.as_str()), (KEY_NETWORK, network.as_str())])?;

    print_success("RPC configuration updated");
    println!("URL:     {}", url);
    println!("Network: {}", network);
    Ok(())
}

// --- Fuego project ---

async fn git_short_hash(repo: &Path) -> Result<String> {
    let output = run_captured("git", ["rev-parse", "--short", "HEAD"], Some(repo))
        .await?
        .check("git rev-parse failed")?;
    Ok(output.stdout.trim().to_string())
}

async fn install_command(core: &Core, path: Option<PathBuf>) -> Result<()> {
    let install_path = path.unwrap_or_else(|| core.paths.default_install_dir());
    print_heading("Fuego Project Installation");

    if install_path.exists() {
        return Err(WalletError::already_exists(format!(
            "Fuego is already installed at {}. Use --path to install elsewhere, or delete the existing installation.",
            install_path.display()
        ))
        .into());
    }
    if let Some(parent) = install_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    println!("Cloning {} ...", FUEGO_REPO_URL);
    let target = install_path.to_string_lossy().into_owned();
    let cloned = run_captured("git", ["clone", FUEGO_REPO_URL, target.as_str()], None)
        .await
        .and_then(|output| output.check("git clone failed"));
    if let Err(e) = cloned {
        info!("Install failed, removing {:?}", install_path);
        if install_path.exists() {
            if let Err(cleanup) = std::fs::remove_dir_all(&install_path) {
                warn!("Could not remove partial install {:?}: {}", install_path, cleanup);
            }
        }
        return Err(anyhow!(e).context("Installation failed"));
    }

    let version = git_short_hash(&install_path).await?;
    core.config
        .set_tool_version(TOOL_PROJECT, &version, Some(install_path.clone()))?;

    print_success("Fuego installed successfully!");
    println!("\nInstallation: {}", install_path.display());
    println!("Version:      {}", version);
    print_hint("\nNext steps:");
    print_hint(&format!("  cd {}", install_path.display()));
    print_hint("  npm install");
    print_hint("  fuego serve");
    Ok(())
}

fn record_cli_version(core: &Core) -> Result<()> {
    let record = core.config.set_tool_version(TOOL_CLI, CLI_VERSION, None)?;
    print_success(&format!("fuego-cli {} recorded", record.version));
    print_hint("To upgrade the binary itself, reinstall it: cargo install --git https://github.com/willmcdeezy/fuego-cli --force");
    Ok(())
}

async fn update_project(core: &Core) -> Result<()> {
    let Some(path) = core.find_install_path()? else {
        return Err(WalletError::not_found(
            "Fuego project not found. Run \"fuego install\" first.",
        )
        .into());
    };
    if !path.join(".git").exists() {
        return Err(WalletError::validation(format!(
            "{} is not a git repository and cannot be auto-updated. Run \"fuego install\" to get a fresh copy.",
            path.display()
        ))
        .into());
    }

    println!("Pulling latest changes in {} ...", path.display());
    run_captured("git", ["pull", "origin", "main"], Some(path.as_path()))
        .await?
        .check("git pull failed")?;
    let version = git_short_hash(&path).await?;
    core.config
        .set_tool_version(TOOL_PROJECT, &version, Some(path.clone()))?;

    print_success(&format!("fuego updated to {}", version));
    print_hint(&format!(
        "You may need to rebuild the server: cd {} && cargo build",
        path.join(SERVER_DIR_NAME).display()
    ));
    Ok(())
}

async fn update_command(core: &Core, cli: bool, fuego: bool) -> Result<()> {
    let (update_cli, update_fuego) = if !cli && !fuego {
        (true, true)
    } else {
        (cli, fuego)
    };

    print_heading("Current Versions");
    for tool in [TOOL_CLI, TOOL_PROJECT] {
        match core.config.tool_version(tool)? {
            Some(v) => println!(
                "{}: {} (updated {})",
                tool,
                v.version,
                v.last_updated.format("%Y-%m-%d")
            ),
            None if tool == TOOL_CLI => println!("{}: {}", tool, CLI_VERSION),
            None => println!("{}: not installed", tool),
        }
    }
    println!();

    let mut failures = 0;
    if update_cli {
        if let Err(e) = record_cli_version(core) {
            print_error(&format!("Failed to update fuego-cli: {:#}", e));
            failures += 1;
        }
    }
    if update_fuego {
        if let Err(e) = update_project(core).await {
            print_error(&format!("Failed to update fuego: {:#}", e));
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} update(s) failed", failures);
    }
    print_success("\nUpdate complete!");
    Ok(())
}

async fn serve_command(core: &Core) -> Result<()> {
    let server_dir = core
        .find_install_path()?
        .map(|p| p.join(SERVER_DIR_NAME))
        .filter(|p| p.is_dir())
        .ok_or_else(|| {
            WalletError::not_found("Fuego server not found. Run \"fuego install\" first.")
        })?;

    print_heading("Starting Fuego Server");
    println!("Location: {}", server_dir.display());
    println!("Command:  cargo run");
    print_hint(&format!(
        "Server will be available at {}",
        fuego_core::DEFAULT_SERVER_URL
    ));
    println!();

    let code = run_inherited("cargo", ["run"], Some(server_dir.as_path()))
        .await
        .context("Make sure Rust and Cargo are installed: https://rustup.rs")?;
    if code != 0 {
        bail!("Fuego server exited with status {}", code);
    }
    Ok(())
}

fn dashboard_path(core: &Core) -> Result<PathBuf> {
    let path = core
        .find_install_path()?
        .map(|p| p.join(DASHBOARD_DIR_NAME).join(DASHBOARD_FILE_NAME))
        .filter(|p| p.is_file())
        .ok_or_else(|| {
            WalletError::not_found("Fuego dashboard not found. Run \"fuego install\" first.")
        })?;
    Ok(path)
}

/// Program and arguments that hand a file to the desktop's browser.
fn browser_command(file: &Path) -> (&'static str, Vec<String>) {
    let file = file.to_string_lossy().into_owned();
    if cfg!(target_os = "macos") {
        ("open", vec![file])
    } else if cfg!(windows) {
        ("cmd", vec!["/C".into(), "start".into(), String::new(), file])
    } else {
        ("xdg-open", vec![file])
    }
}

async fn dashboard_command(core: &Core) -> Result<()> {
    let path = dashboard_path(core)?;
    print_heading("Opening Fuego Dashboard");
    println!("Location: {}", path.display());

    let (program, args) = browser_command(&path);
    let opened = run_captured(program, args, None)
        .await
        .and_then(|output| output.check("Browser launcher failed"));

    match opened {
        Ok(_) => {
            print_success("Dashboard opened!");
            print_hint("Make sure the Fuego server is running (fuego serve)");
        }
        Err(e) => {
            debug!("Could not launch {}: {}", program, e);
            print_warning(&format!(
                "Could not open dashboard automatically. Please open manually: {}",
                path.display()
            ));
        }
    }
    Ok(())
}

// --- Jupiter ---

fn swap_amount(swap: &SwapArgs) -> Result<Amount> {
    let decimals = match &swap.input {
        SwapAsset::Known(token) => token.decimals(),
        SwapAsset::Mint(_) => RAW_MINT_DECIMALS,
    };
    Ok(Amount::parse_positive(&swap.amount, decimals)?)
}

fn swap_script_args(script: &Path, swap: &SwapArgs, amount: &Amount) -> Vec<String> {
    vec![
        script.to_string_lossy().into_owned(),
        "--input".into(),
        swap.input.label(),
        "--output".into(),
        swap.output.label(),
        "--amount".into(),
        amount.to_string(),
    ]
}

async fn jupiter_quote_command(core: &Core, swap: SwapArgs) -> Result<()> {
    let amount = swap_amount(&swap)?;
    core.load_metadata()?;
    let script = core.script_path(&JUPITER_QUOTE_SCRIPT)?;

    print_heading("Jupiter Quote");
    println!("From:   {} {}", amount, swap.input.label());
    println!("To:     {}", swap.output.label());
    println!();

    run_streaming(
        &core.script_runtime()?,
        swap_script_args(&script, &swap, &amount),
        None,
    )
    .await?
    .check("Failed to fetch quote")?;
    Ok(())
}

async fn jupiter_swap_command(core: &Core, swap: SwapArgs, yes: bool) -> Result<()> {
    let amount = swap_amount(&swap)?;
    let metadata = core.load_metadata()?;

    print_heading("Jupiter Swap Preview");
    println!("From:    {} {}", amount, swap.input.label());
    println!("To:      {}", swap.output.label());
    println!("Wallet:  {}", shorten(&metadata.public_key.to_base58(), 8));
    if !yes {
        print_warning("Add --yes to confirm and execute the swap.");
        print_hint(&format!(
            "Or fetch a quote first: fuego jupiter quote {} --input {} --output {}",
            swap.amount,
            swap.input.label(),
            swap.output.label()
        ));
        return Ok(());
    }

    let script = core.script_path(&JUPITER_SWAP_SCRIPT)?;
    println!("\nExecuting Jupiter swap...");
    let output = run_streaming(
        &core.script_runtime()?,
        swap_script_args(&script, &swap, &amount),
        None,
    )
    .await?
    .check("Swap failed")?;

    match parse_signature(&output.stdout) {
        Some(signature) => {
            print_success(&format!(
                "Swap complete: {} {} -> {}",
                amount,
                swap.input.label(),
                swap.output.label()
            ));
            print_hint(&format!("View on Solscan: {}", signature.explorer_url()));
        }
        None => print_success("Swap executed"),
    }
    Ok(())
}

// --- Purch ---

#[derive(Debug, PartialEq, Eq)]
enum PurchaseOutcome {
    Accepted,
    Rejected,
    Completed,
}

fn classify_purchase(stdout: &str) -> PurchaseOutcome {
    if stdout.contains("PAYMENT ACCEPTED") || stdout.contains("SUCCESS") {
        PurchaseOutcome::Accepted
    } else if stdout.contains("failed") || stdout.contains('❌') {
        PurchaseOutcome::Rejected
    } else {
        PurchaseOutcome::Completed
    }
}

fn validate_purchase(args: &PurchArgs) -> Result<()> {
    let url = Url::parse(&args.product_url)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| {
            WalletError::validation(format!("Invalid product URL '{}'", args.product_url))
        })?;
    debug!("Purchasing from {}", url.host_str().unwrap_or_default());

    if !args.email.contains('@') {
        return Err(WalletError::validation(format!("Invalid email '{}'", args.email)).into());
    }
    let required = [
        ("--name", &args.name),
        ("--address-line1", &args.address_line1),
        ("--city", &args.city),
        ("--state", &args.state),
        ("--postal-code", &args.postal_code),
        ("--country", &args.country),
    ];
    if let Some((flag, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return Err(WalletError::validation(format!("{} must not be empty", flag)).into());
    }
    Ok(())
}

fn purchase_script_args(script: &Path, args: &PurchArgs) -> Vec<String> {
    let mut argv = vec![
        script.to_string_lossy().into_owned(),
        "--product-url".into(),
        args.product_url.clone(),
        "--email".into(),
        args.email.clone(),
        "--name".into(),
        args.name.clone(),
        "--address-line1".into(),
        args.address_line1.clone(),
        "--city".into(),
        args.city.clone(),
        "--state".into(),
        args.state.clone(),
        "--postal-code".into(),
        args.postal_code.clone(),
        "--country".into(),
        args.country.clone(),
    ];
    if let Some(line2) = args.address_line2.as_ref().filter(|l| !l.is_empty()) {
        argv.push("--address-line2".into());
        argv.push(line2.clone());
    }
    argv
}

async fn purch_command(core: &Core, args: PurchArgs) -> Result<()> {
    validate_purchase(&args)?;
    let metadata = core.load_metadata()?;
    let script = core.script_path(&[PURCHASE_SCRIPT])?;

    print_heading("x402 Purchase Preview");
    println!("Product: {}", args.product_url);
    println!("Email:   {}", args.email);
    println!("Name:    {}", args.name);
    match &args.address_line2 {
        Some(line2) => println!("Address: {}, {}", args.address_line1, line2),
        None => println!("Address: {}", args.address_line1),
    }
    println!("City:    {}, {} {}", args.city, args.state, args.postal_code);
    println!("Country: {}", args.country);
    println!("Wallet:  {}", metadata.public_key);
    println!("\nProcessing x402 payment via Purch.xyz...");

    let output = run_streaming(
        &core.script_runtime()?,
        purchase_script_args(&script, &args),
        None,
    )
    .await?
    .check("x402 purchase failed")?;

    match classify_purchase(&output.stdout) {
        PurchaseOutcome::Accepted => {
            print_success("x402 payment complete! Order transaction received from Purch.xyz")
        }
        PurchaseOutcome::Rejected => {
            bail!("Payment was not accepted. Check the output above for details.")
        }
        PurchaseOutcome::Completed => print_success("x402 purchase flow complete"),
    }
    Ok(())
}
