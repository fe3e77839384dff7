pub mod address;
pub mod currency;
pub mod error;
pub mod network;
pub mod signatures;
pub mod utils;

pub use error::{WalletError, WalletResult};

/// Schema version written into wallet metadata files.
pub const WALLET_SCHEMA_VERSION: &str = "0.1.0";

/// Version marker recorded for this CLI in the config file.
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const FUEGO_REPO_URL: &str = "https://github.com/willmcdeezy/fuego.git";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";
