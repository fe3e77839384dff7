// fuego-wallet/src/wallet/contacts.rs
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fuego_core::address::validate_address;
use fuego_core::utils::{read_json_or_default, write_json};
use fuego_core::{WalletError, WalletResult};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::wallet::paths::FuegoPaths;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContactEntry {
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Contacts keyed by name, in the order they were added.
pub type AddressBook = IndexMap<String, ContactEntry>;

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    /// Nothing was written; this is what `--yes` would remove.
    Preview(ContactEntry),
    Removed(ContactEntry),
}

pub struct ContactStore {
    path: PathBuf,
}

impl ContactStore {
    pub fn new(paths: &FuegoPaths) -> Self {
        ContactStore {
            path: paths.address_book_file(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> WalletResult<AddressBook> {
        read_json_or_default(&self.path)
    }

    fn save(&self, book: &AddressBook) -> WalletResult<()> {
        write_json(&self.path, book)
    }

    /// Adds a contact. An existing name is never overwritten.
    pub fn add(
        &self,
        name: &str,
        address: &str,
        label: Option<&str>,
    ) -> WalletResult<ContactEntry> {
        if name.trim().is_empty() {
            return Err(WalletError::validation("Contact name must not be empty"));
        }
        validate_address(address)?;

        let mut book = self.load()?;
        if book.contains_key(name) {
            debug!("Refusing to overwrite existing contact '{}'", name);
            return Err(WalletError::already_exists(format!(
                "Contact \"{}\" already exists. Use a different name or remove the existing contact first.",
                name
            )));
        }

        let entry = ContactEntry {
            address: address.to_string(),
            label: label.map(str::to_string).filter(|l| !l.is_empty()),
            added_at: Utc::now(),
        };
        book.insert(name.to_string(), entry.clone());
        self.save(&book)?;
        info!("Added contact '{}' to {:?}", name, self.path);
        Ok(entry)
    }

    pub fn list(&self) -> WalletResult<AddressBook> {
        self.load()
    }

    pub fn show(&self, name: &str) -> WalletResult<ContactEntry> {
        self.load()?
            .shift_remove(name)
            .ok_or_else(|| contact_not_found(name))
    }

    /// Looks up a contact's address without treating absence as an error.
    pub fn lookup(&self, name: &str) -> WalletResult<Option<String>> {
        Ok(self.load()?.shift_remove(name).map(|entry| entry.address))
    }

    /// Removes `name` when `confirm` is set; otherwise only reports what
    /// would be removed.
    pub fn remove(&self, name: &str, confirm: bool) -> WalletResult<RemoveOutcome> {
        let mut book = self.load()?;
        if !confirm {
            let entry = book.get(name).cloned().ok_or_else(|| contact_not_found(name))?;
            return Ok(RemoveOutcome::Preview(entry));
        }

        let entry = book
            .shift_remove(name)
            .ok_or_else(|| contact_not_found(name))?;
        self.save(&book)?;
        info!("Removed contact '{}' from {:?}", name, self.path);
        Ok(RemoveOutcome::Removed(entry))
    }
}

fn contact_not_found(name: &str) -> WalletError {
    WalletError::not_found(format!("Contact \"{}\" not found.", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const ALICE: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
    const BOB: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const CAROL: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

    fn store(dir: &TempDir) -> ContactStore {
        ContactStore::new(&FuegoPaths::new(
            dir.path().join(".fuego"),
            dir.path().to_path_buf(),
            dir.path().to_path_buf(),
        ))
    }

    #[test]
    fn test_add_then_show() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("alice", ALICE, Some("market maker")).unwrap();

        let entry = contacts.show("alice").unwrap();
        assert_eq!(entry.address, ALICE);
        assert_eq!(entry.label.as_deref(), Some("market maker"));
    }

    #[test]
    fn test_add_duplicate_leaves_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("alice", ALICE, None).unwrap();
        let before = fs::read(contacts.path()).unwrap();

        let result = contacts.add("alice", BOB, Some("other"));
        assert!(matches!(result, Err(WalletError::AlreadyExists(_))));
        assert_eq!(fs::read(contacts.path()).unwrap(), before);
    }

    #[test]
    fn test_duplicate_contact_error_carries_the_whole_report() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("alice", ALICE, None).unwrap();

        let message = contacts.add("alice", BOB, None).unwrap_err().to_string();
        assert!(message.contains("\"alice\" already exists"));
        assert!(message.contains("remove the existing contact first"));
    }

    #[test]
    fn test_add_rejects_invalid_address_without_writing() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        let result = contacts.add("mallory", "0OIl-not-base58", None);
        assert!(matches!(result, Err(WalletError::Validation(_))));
        assert!(!contacts.path().exists());
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("zed", CAROL, None).unwrap();
        contacts.add("alice", ALICE, None).unwrap();
        contacts.add("mike", BOB, None).unwrap();

        let names: Vec<String> = contacts.list().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["zed", "alice", "mike"]);
    }

    #[test]
    fn test_show_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        assert!(matches!(contacts.show("ghost"), Err(WalletError::NotFound(_))));
    }

    #[test]
    fn test_remove_without_confirmation_is_a_preview() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("alice", ALICE, None).unwrap();
        let before = fs::read(contacts.path()).unwrap();

        let outcome = contacts.remove("alice", false).unwrap();
        assert!(matches!(outcome, RemoveOutcome::Preview(ref e) if e.address == ALICE));
        assert_eq!(fs::read(contacts.path()).unwrap(), before);
    }

    #[test]
    fn test_remove_confirmed_removes_exactly_one() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        contacts.add("alice", ALICE, None).unwrap();
        contacts.add("bob", BOB, Some("payroll")).unwrap();
        contacts.add("carol", CAROL, None).unwrap();

        let outcome = contacts.remove("bob", true).unwrap();
        assert!(matches!(outcome, RemoveOutcome::Removed(ref e) if e.address == BOB));

        let book = contacts.list().unwrap();
        let names: Vec<&str> = book.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["alice", "carol"]);
        assert_eq!(book["alice"].address, ALICE);
        assert_eq!(book["carol"].address, CAROL);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        assert!(matches!(
            contacts.remove("ghost", true),
            Err(WalletError::NotFound(_))
        ));
        assert!(matches!(
            contacts.remove("ghost", false),
            Err(WalletError::NotFound(_))
        ));
    }

    #[test]
    fn test_reads_entries_written_without_label() {
        let dir = TempDir::new().unwrap();
        let contacts = store(&dir);
        fs::create_dir_all(contacts.path().parent().unwrap()).unwrap();
        fs::write(
            contacts.path(),
            format!(
                r#"{{ "treasury": {{ "address": "{}", "addedAt": "2025-01-31T12:00:00.000Z" }} }}"#,
                ALICE
            ),
        )
        .unwrap();

        let entry = contacts.show("treasury").unwrap();
        assert_eq!(entry.address, ALICE);
        assert_eq!(entry.label, None);
    }
}
