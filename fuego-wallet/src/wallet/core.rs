// fuego-wallet/src/wallet/core.rs
use std::path::PathBuf;

use chrono::Utc;
use fuego_core::address::is_valid_address;
use fuego_core::signatures::{Keypair, PublicKey};
use fuego_core::utils::FileSnapshot;
use fuego_core::{WalletError, WalletResult, DEFAULT_SERVER_URL, WALLET_SCHEMA_VERSION};
use log::{debug, error, info};

use crate::wallet::config::{
    validate_rpc_url, ConfigStore, KEY_EXECUTOR, KEY_NETWORK, KEY_RPC_URL, KEY_SCRIPT_RUNTIME,
    KEY_SERVER_URL, TOOL_PROJECT,
};
use crate::wallet::constants::{DEFAULT_SCRIPT_RUNTIME, DEFAULT_WALLET_NAME, SCRIPTS_DIR_NAME};
use crate::wallet::contacts::ContactStore;
use crate::wallet::executor::{Executor, ExecutorMode, RpcExecutor, ScriptExecutor, ServerExecutor};
use crate::wallet::paths::FuegoPaths;
use crate::wallet::storage::{WalletMetadata, WalletMetadataStore, WalletSecretStore};

#[derive(Debug, Clone)]
pub struct CreatedWallet {
    pub public_key: PublicKey,
    pub name: String,
    /// Always `None`: keys are generated directly, not derived from a phrase.
    pub mnemonic: Option<String>,
    pub replaced: bool,
}

/// Command-line settings that take precedence over `config.json`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub rpc_url: Option<String>,
    pub executor: Option<ExecutorMode>,
}

/// The local stores, all rooted at the same [`FuegoPaths`].
pub struct Core {
    pub paths: FuegoPaths,
    pub secrets: WalletSecretStore,
    pub metadata: WalletMetadataStore,
    pub config: ConfigStore,
    pub contacts: ContactStore,
    pub overrides: Overrides,
}

impl Core {
    pub fn new(paths: FuegoPaths, overrides: Overrides) -> Self {
        Core {
            secrets: WalletSecretStore::new(&paths),
            metadata: WalletMetadataStore::new(&paths),
            config: ConfigStore::new(&paths),
            contacts: ContactStore::new(&paths),
            paths,
            overrides,
        }
    }

    /// Generates a keypair and writes secret, metadata and config defaults in
    /// that order. If any step fails every file is put back the way it was.
    pub fn create_wallet(&self, name: Option<&str>, force: bool) -> WalletResult<CreatedWallet> {
        let replaced = self.secrets.exists();
        if replaced && !force {
            debug!("Wallet already exists at {:?}; not overwriting", self.secrets.path());
            return Err(WalletError::already_exists(format!(
                "Wallet already exists at {}. Use --force to overwrite.",
                self.secrets.path().display()
            )));
        }

        let snapshots = [
            self.secrets.snapshot()?,
            self.metadata.snapshot()?,
            FileSnapshot::capture(self.config.path())?,
        ];

        let keypair = Keypair::generate();
        let metadata = WalletMetadata {
            public_key: keypair.public_key(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(DEFAULT_WALLET_NAME)
                .to_string(),
            created_at: Utc::now(),
            version: WALLET_SCHEMA_VERSION.to_string(),
        };

        if let Err(e) = self.write_new_wallet(&keypair, &metadata) {
            info!("Wallet creation failed, rolling back: {}", e);
            for snapshot in snapshots.iter().rev() {
                if let Err(restore_err) = snapshot.restore() {
                    error!("Rollback step failed: {}", restore_err);
                }
            }
            return Err(e);
        }

        info!("Created wallet '{}' ({})", metadata.name, metadata.public_key);
        Ok(CreatedWallet {
            public_key: metadata.public_key,
            name: metadata.name,
            mnemonic: None,
            replaced,
        })
    }

    fn write_new_wallet(&self, keypair: &Keypair, metadata: &WalletMetadata) -> WalletResult<()> {
        self.secrets.save(keypair)?;
        self.metadata.save(metadata)?;
        let network = self.config.network()?;
        self.config.apply_defaults(&[
            (KEY_NETWORK, network.as_str()),
            (KEY_RPC_URL, network.default_rpc_url()),
        ])?;
        Ok(())
    }

    pub fn load_metadata(&self) -> WalletResult<WalletMetadata> {
        self.metadata.require()
    }

    pub fn load_keypair(&self) -> WalletResult<Keypair> {
        self.secrets.load()
    }

    /// Loads both halves of the wallet and checks that the recorded public
    /// key is the one derived from the secret.
    pub fn verify_wallet(&self) -> WalletResult<WalletMetadata> {
        let metadata = self.load_metadata()?;
        let derived = self.load_keypair()?.public_key();
        if derived != metadata.public_key {
            return Err(WalletError::validation(format!(
                "Wallet metadata lists {} but the secret key belongs to {}",
                metadata.public_key, derived
            )));
        }
        debug!("Wallet {} verified", derived);
        Ok(metadata)
    }

    /// A literal address is used as-is; anything else is looked up in the
    /// address book.
    pub fn resolve_recipient(&self, recipient: &str) -> WalletResult<String> {
        if is_valid_address(recipient) {
            return Ok(recipient.to_string());
        }
        match self.contacts.lookup(recipient)? {
            Some(address) => {
                debug!("Resolved contact '{}' to {}", recipient, address);
                Ok(address)
            }
            None => Err(WalletError::not_found(format!(
                "\"{}\" is not a valid address or a saved contact.",
                recipient
            ))),
        }
    }

    /// `--rpc-url`/`FUEGO_RPC_URL`, then `rpcUrl`, then the network default.
    pub fn rpc_url(&self) -> WalletResult<String> {
        match &self.overrides.rpc_url {
            Some(url) => Ok(url.clone()),
            None => self.config.rpc_url(),
        }
    }

    pub fn executor_mode(&self) -> WalletResult<ExecutorMode> {
        if let Some(mode) = self.overrides.executor {
            return Ok(mode);
        }
        match self.config.get_string(KEY_EXECUTOR)? {
            Some(mode) => mode.parse(),
            None => Ok(ExecutorMode::default()),
        }
    }

    pub fn executor(&self) -> WalletResult<Executor> {
        let mode = self.executor_mode()?;
        let network = self.config.network()?;
        debug!("Using {} executor on {}", mode, network);
        Ok(match mode {
            ExecutorMode::Rpc => {
                let url = self.rpc_url()?;
                validate_rpc_url(&url)?;
                Executor::Rpc(RpcExecutor::new(url))
            }
            ExecutorMode::Server => {
                let url = self
                    .config
                    .get_string(KEY_SERVER_URL)?
                    .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
                Executor::Server(ServerExecutor::new(url, network))
            }
            ExecutorMode::Script => {
                let scripts = self.require_install_path()?.join(SCRIPTS_DIR_NAME);
                Executor::Script(ScriptExecutor::new(self.script_runtime()?, scripts, network))
            }
        })
    }

    pub fn script_runtime(&self) -> WalletResult<String> {
        Ok(self
            .config
            .get_string(KEY_SCRIPT_RUNTIME)?
            .unwrap_or_else(|| DEFAULT_SCRIPT_RUNTIME.to_string()))
    }

    /// Path of a script shipped in the installed project, which must exist.
    pub fn script_path(&self, relative: &[&str]) -> WalletResult<PathBuf> {
        let path = relative
            .iter()
            .fold(self.require_install_path()?.join(SCRIPTS_DIR_NAME), |p, part| p.join(part));
        if !path.is_file() {
            return Err(WalletError::not_found(format!(
                "Script not found at {}. Run \"fuego update\" to refresh the Fuego project.",
                path.display()
            )));
        }
        Ok(path)
    }

    /// The recorded install path, then the agent workspace, then `./fuego`.
    /// Only directories that exist are returned.
    pub fn find_install_path(&self) -> WalletResult<Option<PathBuf>> {
        let recorded = self
            .config
            .tool_version(TOOL_PROJECT)?
            .and_then(|v| v.install_path);
        let candidates = recorded
            .into_iter()
            .chain([self.paths.default_install_dir(), self.paths.local_install_dir()]);
        for candidate in candidates {
            if candidate.is_dir() {
                return Ok(Some(candidate));
            }
            debug!("No Fuego project at {:?}", candidate);
        }
        Ok(None)
    }

    pub fn require_install_path(&self) -> WalletResult<PathBuf> {
        self.find_install_path()?.ok_or_else(|| {
            WalletError::not_found("Fuego project not found. Run \"fuego install\" first.")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const ALICE: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

    fn core(dir: &TempDir) -> Core {
        let home = dir.path().join("home");
        let work = dir.path().join("work");
        fs::create_dir_all(&home).unwrap();
        fs::create_dir_all(&work).unwrap();
        Core::new(
            FuegoPaths::new(home.join(".fuego"), home, work),
            Overrides::default(),
        )
    }

    fn corrupt(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{ not json").unwrap();
    }

    #[test]
    fn test_create_writes_secret_metadata_and_defaults() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);

        let created = core.create_wallet(Some("agent"), false).unwrap();
        assert_eq!(created.mnemonic, None);
        assert!(!created.replaced);

        let metadata = core.verify_wallet().unwrap();
        assert_eq!(metadata.public_key, created.public_key);
        assert_eq!(metadata.name, "agent");
        assert_eq!(metadata.version, WALLET_SCHEMA_VERSION);
        assert_eq!(
            core.config.get_string(KEY_NETWORK).unwrap().as_deref(),
            Some("mainnet")
        );
        assert_eq!(
            core.config.get_string(KEY_RPC_URL).unwrap().as_deref(),
            Some("https://api.mainnet-beta.solana.com")
        );
    }

    #[test]
    fn test_create_uses_default_name() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        let created = core.create_wallet(None, false).unwrap();
        assert_eq!(created.name, DEFAULT_WALLET_NAME);
    }

    #[test]
    fn test_create_keeps_existing_config_values() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.config.set(KEY_NETWORK, "devnet").unwrap();
        core.config.set("custom", "kept").unwrap();

        core.create_wallet(None, false).unwrap();

        assert_eq!(
            core.config.get_string(KEY_RPC_URL).unwrap().as_deref(),
            Some("https://api.devnet.solana.com")
        );
        assert_eq!(
            core.config.get_string("custom").unwrap().as_deref(),
            Some("kept")
        );
    }

    #[test]
    fn test_create_without_force_leaves_secret_untouched() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.create_wallet(None, false).unwrap();
        let before = fs::read(core.secrets.path()).unwrap();

        let result = core.create_wallet(Some("again"), false);
        assert!(matches!(result, Err(WalletError::AlreadyExists(_))));
        assert_eq!(fs::read(core.secrets.path()).unwrap(), before);
    }

    #[test]
    fn test_existing_wallet_error_carries_the_whole_report() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.create_wallet(None, false).unwrap();

        let message = core.create_wallet(None, false).unwrap_err().to_string();
        assert!(message.starts_with("Wallet already exists at "));
        assert!(message.contains(&core.secrets.path().display().to_string()));
        assert!(message.ends_with("Use --force to overwrite."));
    }

    #[test]
    fn test_create_with_force_replaces_wallet() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        let first = core.create_wallet(None, false).unwrap();
        let second = core.create_wallet(None, true).unwrap();

        assert!(second.replaced);
        assert_ne!(first.public_key, second.public_key);
        assert_eq!(core.verify_wallet().unwrap().public_key, second.public_key);
    }

    #[test]
    fn test_failed_create_removes_partial_files() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        corrupt(core.config.path());
        let config_before = fs::read(core.config.path()).unwrap();

        let result = core.create_wallet(None, false);
        assert!(matches!(result, Err(WalletError::Json { .. })));
        assert!(!core.secrets.path().exists());
        assert!(!core.metadata.path().exists());
        assert_eq!(fs::read(core.config.path()).unwrap(), config_before);
    }

    #[test]
    fn test_failed_forced_create_restores_previous_wallet() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        let original = core.create_wallet(None, false).unwrap();
        let secret_before = fs::read(core.secrets.path()).unwrap();
        let metadata_before = fs::read(core.metadata.path()).unwrap();
        corrupt(core.config.path());

        assert!(core.create_wallet(None, true).is_err());
        assert_eq!(fs::read(core.secrets.path()).unwrap(), secret_before);
        assert_eq!(fs::read(core.metadata.path()).unwrap(), metadata_before);
        assert_eq!(core.load_keypair().unwrap().public_key(), original.public_key);
    }

    #[test]
    fn test_verify_detects_mismatched_metadata() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.create_wallet(None, false).unwrap();
        let mut metadata = core.load_metadata().unwrap();
        metadata.public_key = Keypair::generate().public_key();
        core.metadata.save(&metadata).unwrap();

        assert!(matches!(core.verify_wallet(), Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_resolve_recipient_prefers_literal_address() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        let other = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
        core.contacts.add(ALICE, other, None).unwrap();

        assert_eq!(core.resolve_recipient(ALICE).unwrap(), ALICE);
    }

    #[test]
    fn test_resolve_recipient_by_contact_name() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.contacts.add("alice", ALICE, None).unwrap();

        assert_eq!(core.resolve_recipient("alice").unwrap(), ALICE);
        assert!(matches!(
            core.resolve_recipient("nobody"),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_rpc_url_override_wins() {
        let dir = TempDir::new().unwrap();
        let mut core = core(&dir);
        core.config.set(KEY_RPC_URL, "https://configured.example").unwrap();
        assert_eq!(core.rpc_url().unwrap(), "https://configured.example");

        core.overrides.rpc_url = Some("https://flag.example".to_string());
        assert_eq!(core.rpc_url().unwrap(), "https://flag.example");
    }

    #[test]
    fn test_executor_selection() {
        let dir = TempDir::new().unwrap();
        let mut core = core(&dir);
        assert!(matches!(core.executor().unwrap(), Executor::Server(_)));

        core.config.set(KEY_EXECUTOR, "rpc").unwrap();
        assert!(matches!(core.executor().unwrap(), Executor::Rpc(_)));

        core.config.set(KEY_EXECUTOR, "script").unwrap();
        assert!(matches!(core.executor(), Err(WalletError::NotFound(_))));

        core.overrides.executor = Some(ExecutorMode::Server);
        assert!(matches!(core.executor().unwrap(), Executor::Server(_)));
    }

    #[test]
    fn test_rpc_executor_rejects_invalid_url() {
        let dir = TempDir::new().unwrap();
        let mut core = core(&dir);
        core.overrides.executor = Some(ExecutorMode::Rpc);
        core.overrides.rpc_url = Some("not a url".to_string());
        assert!(matches!(core.executor(), Err(WalletError::Validation(_))));
    }

    #[test]
    fn test_find_install_path_order() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        assert_eq!(core.find_install_path().unwrap(), None);

        let local = core.paths.local_install_dir();
        fs::create_dir_all(&local).unwrap();
        assert_eq!(core.find_install_path().unwrap(), Some(local.clone()));

        let workspace = core.paths.default_install_dir();
        fs::create_dir_all(&workspace).unwrap();
        assert_eq!(core.find_install_path().unwrap(), Some(workspace));

        let recorded = dir.path().join("custom-fuego");
        fs::create_dir_all(&recorded).unwrap();
        core.config
            .set_tool_version(TOOL_PROJECT, "abc1234", Some(recorded.clone()))
            .unwrap();
        assert_eq!(core.find_install_path().unwrap(), Some(recorded));
    }

    #[test]
    fn test_script_path_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        let scripts = core.paths.local_install_dir().join(SCRIPTS_DIR_NAME).join("jupiter");
        fs::create_dir_all(&scripts).unwrap();

        assert!(matches!(
            core.script_path(&["jupiter", "jupiter_price.mjs"]),
            Err(WalletError::NotFound(_))
        ));
        fs::write(scripts.join("jupiter_price.mjs"), "").unwrap();
        assert_eq!(
            core.script_path(&["jupiter", "jupiter_price.mjs"]).unwrap(),
            scripts.join("jupiter_price.mjs")
        );
        assert_eq!(core.script_runtime().unwrap(), DEFAULT_SCRIPT_RUNTIME);
    }

    #[test]
    fn test_recorded_install_path_is_skipped_when_missing() {
        let dir = TempDir::new().unwrap();
        let core = core(&dir);
        core.config
            .set_tool_version(TOOL_PROJECT, "abc1234", Some(dir.path().join("gone")))
            .unwrap();
        assert_eq!(core.find_install_path().unwrap(), None);
        assert!(matches!(
            core.require_install_path(),
            Err(WalletError::NotFound(_))
        ));
    }
}
