// fuego-wallet/src/wallet/constants.rs
pub const DATA_DIR_NAME: &str = ".fuego";
pub const SECRET_FILE_NAME: &str = "wallet.json";
pub const METADATA_FILE_NAME: &str = "wallet-config.json";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONTACTS_DIR_NAME: &str = "contacts";
pub const ADDRESS_BOOK_FILE_NAME: &str = "address-book.json";

pub const DEFAULT_WALLET_NAME: &str = "default";

/// Relative to the home directory.
pub const AGENT_WORKSPACE_INSTALL_DIR: [&str; 3] = [".openclaw", "workspace", "fuego"];
/// Relative to the working directory.
pub const LOCAL_INSTALL_DIR: &str = "fuego";

pub const SCRIPTS_DIR_NAME: &str = "scripts";
pub const SERVER_DIR_NAME: &str = "server";
pub const DASHBOARD_DIR_NAME: &str = "dashboard";
pub const DASHBOARD_FILE_NAME: &str = "dashboard.html";

pub const DEFAULT_SCRIPT_RUNTIME: &str = "node";

/// Relative to the scripts directory.
pub const JUPITER_QUOTE_SCRIPT: [&str; 2] = ["jupiter", "jupiter_price.mjs"];
pub const JUPITER_SWAP_SCRIPT: [&str; 2] = ["jupiter", "jupiter_swap_regular.mjs"];
pub const PURCHASE_SCRIPT: &str = "x402_purch.mjs";
