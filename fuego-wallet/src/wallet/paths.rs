// fuego-wallet/src/wallet/paths.rs
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::wallet::constants::*;

/// Every location the CLI reads or writes, resolved once in `main` and
/// handed to each store.
#[derive(Debug, Clone)]
pub struct FuegoPaths {
    data_dir: PathBuf,
    home_dir: PathBuf,
    work_dir: PathBuf,
}

impl FuegoPaths {
    pub fn new(data_dir: PathBuf, home_dir: PathBuf, work_dir: PathBuf) -> Self {
        FuegoPaths {
            data_dir,
            home_dir,
            work_dir,
        }
    }

    /// Resolves paths from the process environment. `data_dir` overrides the
    /// default `~/.fuego`.
    pub fn from_env(data_dir: Option<PathBuf>) -> Result<Self> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        let work_dir =
            std::env::current_dir().context("Could not determine the working directory")?;
        let data_dir = data_dir.unwrap_or_else(|| home_dir.join(DATA_DIR_NAME));
        Ok(Self::new(data_dir, home_dir, work_dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn secret_file(&self) -> PathBuf {
        self.data_dir.join(SECRET_FILE_NAME)
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.data_dir.join(METADATA_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    pub fn address_book_file(&self) -> PathBuf {
        self.data_dir
            .join(CONTACTS_DIR_NAME)
            .join(ADDRESS_BOOK_FILE_NAME)
    }

    /// Where `install` clones the project when no path is given.
    pub fn default_install_dir(&self) -> PathBuf {
        AGENT_WORKSPACE_INSTALL_DIR
            .iter()
            .fold(self.home_dir.clone(), |path, part| path.join(part))
    }

    pub fn local_install_dir(&self) -> PathBuf {
        self.work_dir.join(LOCAL_INSTALL_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_files_live_under_data_dir() {
        let paths = FuegoPaths::new(
            PathBuf::from("/data/.fuego"),
            PathBuf::from("/home/agent"),
            PathBuf::from("/work"),
        );
        assert_eq!(paths.secret_file(), PathBuf::from("/data/.fuego/wallet.json"));
        assert_eq!(
            paths.metadata_file(),
            PathBuf::from("/data/.fuego/wallet-config.json")
        );
        assert_eq!(paths.config_file(), PathBuf::from("/data/.fuego/config.json"));
        assert_eq!(
            paths.address_book_file(),
            PathBuf::from("/data/.fuego/contacts/address-book.json")
        );
    }

    #[test]
    fn test_install_dirs() {
        let paths = FuegoPaths::new(
            PathBuf::from("/data/.fuego"),
            PathBuf::from("/home/agent"),
            PathBuf::from("/work"),
        );
        assert_eq!(
            paths.default_install_dir(),
            PathBuf::from("/home/agent/.openclaw/workspace/fuego")
        );
        assert_eq!(paths.local_install_dir(), PathBuf::from("/work/fuego"));
    }
}
