// fuego-wallet/src/wallet/storage.rs
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fuego_core::signatures::{Keypair, PublicKey};
use fuego_core::utils::{read_json, write_json_owner_only, FileSnapshot, Saveable};
use fuego_core::{WalletError, WalletResult};
use log::info;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::wallet::paths::FuegoPaths;

/// `wallet.json`: the raw 64 keypair bytes, as `solana-keygen` writes them
/// but wrapped in an object.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecretFile {
    secret_key: Vec<u8>,
}

impl Drop for SecretFile {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

pub struct WalletSecretStore {
    path: PathBuf,
}

impl WalletSecretStore {
    pub fn new(paths: &FuegoPaths) -> Self {
        WalletSecretStore {
            path: paths.secret_file(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> WalletResult<Keypair> {
        let file: SecretFile = read_json(&self.path)?.ok_or_else(no_wallet)?;
        Keypair::from_bytes(&file.secret_key)
    }

    /// Writes the keypair with owner-only permissions.
    pub fn save(&self, keypair: &Keypair) -> WalletResult<()> {
        let file = SecretFile {
            secret_key: keypair.to_bytes().to_vec(),
        };
        write_json_owner_only(&self.path, &file)?;
        info!("Wallet secret saved to {:?}", self.path);
        Ok(())
    }

    pub fn snapshot(&self) -> WalletResult<FileSnapshot> {
        FileSnapshot::capture_owner_only(&self.path)
    }
}

/// `wallet-config.json`: everything about the wallet that is safe to show.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletMetadata {
    pub public_key: PublicKey,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub version: String,
}

impl Saveable for WalletMetadata {}

pub struct WalletMetadataStore {
    path: PathBuf,
}

impl WalletMetadataStore {
    pub fn new(paths: &FuegoPaths) -> Self {
        WalletMetadataStore {
            path: paths.metadata_file(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> WalletResult<Option<WalletMetadata>> {
        WalletMetadata::load_from_file(&self.path)
    }

    /// Like [`Self::load`], but a missing file is a `NotFound` error.
    pub fn require(&self) -> WalletResult<WalletMetadata> {
        self.load()?.ok_or_else(no_wallet)
    }

    pub fn save(&self, metadata: &WalletMetadata) -> WalletResult<()> {
        metadata.save_to_file(&self.path)?;
        info!(
            "Wallet metadata for '{}' saved to {:?}",
            metadata.name, self.path
        );
        Ok(())
    }

    pub fn snapshot(&self) -> WalletResult<FileSnapshot> {
        FileSnapshot::capture(&self.path)
    }
}

fn no_wallet() -> WalletError {
    WalletError::not_found("No wallet found. Run \"fuego create\" first.")
}
