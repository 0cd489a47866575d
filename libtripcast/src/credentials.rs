//! In-memory credential store
//!
//! Holds the API secrets for the social platform, the text-generation
//! service, and the image-search service. Values are populated from the
//! environment at startup and can be overwritten individually at runtime
//! through the `/api_keys` endpoint.
//!
//! The store is the only shared mutable state in the system. Reads and
//! writes go through an `RwLock` so a credential update is observed by
//! every outbound call issued after it. Values are wrapped in
//! [`SecretString`] so they are zeroed on drop and never appear in Debug
//! output or logs.
//!
//! Nothing here ever touches the process environment after startup and
//! nothing is persisted to disk.

use std::collections::HashMap;
use std::sync::RwLock;

use secrecy::SecretString;
use tracing::debug;

/// Recognized credential names.
///
/// `set` accepts only these; unrecognized names are silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKey {
    /// Social platform application key
    ApiKey,
    /// Social platform application secret
    ApiSecret,
    /// Social platform access token
    AccessToken,
    /// Social platform access secret
    AccessSecret,
    /// Text-generation service key
    TextGenKey,
    /// Image-search service key
    ImageSearchKey,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 6] = [
        CredentialKey::ApiKey,
        CredentialKey::ApiSecret,
        CredentialKey::AccessToken,
        CredentialKey::AccessSecret,
        CredentialKey::TextGenKey,
        CredentialKey::ImageSearchKey,
    ];

    /// Wire name used in the `/api_keys` request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::ApiKey => "api_key",
            CredentialKey::ApiSecret => "api_secret",
            CredentialKey::AccessToken => "access_token",
            CredentialKey::AccessSecret => "access_secret",
            CredentialKey::TextGenKey => "textgen_key",
            CredentialKey::ImageSearchKey => "image_search_key",
        }
    }

    /// Environment variable read at startup.
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialKey::ApiKey => "TRIPCAST_API_KEY",
            CredentialKey::ApiSecret => "TRIPCAST_API_SECRET",
            CredentialKey::AccessToken => "TRIPCAST_ACCESS_TOKEN",
            CredentialKey::AccessSecret => "TRIPCAST_ACCESS_SECRET",
            CredentialKey::TextGenKey => "TRIPCAST_TEXTGEN_KEY",
            CredentialKey::ImageSearchKey => "TRIPCAST_IMAGE_SEARCH_KEY",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CredentialKey::ALL.iter().copied().find(|k| k.as_str() == name)
    }
}

/// Thread-safe in-memory secret store.
#[derive(Debug, Default)]
pub struct CredentialStore {
    secrets: RwLock<HashMap<CredentialKey, SecretString>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the store from `TRIPCAST_*` environment variables.
    ///
    /// Missing variables leave the corresponding credential unset; the
    /// component that needs it reports a structured error at call time.
    pub fn from_env() -> Self {
        let store = Self::new();
        for key in CredentialKey::ALL {
            if let Ok(value) = std::env::var(key.env_var()) {
                if !value.is_empty() {
                    store.set(key, value);
                }
            }
        }
        store
    }

    /// Get the current value of a credential, or `None` if unset.
    pub fn get(&self, key: CredentialKey) -> Option<SecretString> {
        self.secrets
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
            .cloned()
    }

    /// Overwrite a credential. Subsequent calls from other components
    /// observe the new value immediately.
    pub fn set(&self, key: CredentialKey, value: impl Into<String>) {
        let mut secrets = self
            .secrets
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        secrets.insert(key, SecretString::from(value.into()));
        debug!(credential = key.as_str(), "Credential updated");
    }

    /// Apply a name → value map, setting recognized names and silently
    /// ignoring the rest. Returns how many entries were applied.
    pub fn apply(&self, updates: &HashMap<String, String>) -> usize {
        let mut applied = 0;
        for (name, value) in updates {
            if let Some(key) = CredentialKey::from_name(name) {
                self.set(key, value.clone());
                applied += 1;
            } else {
                debug!(name = %name, "Ignoring unrecognized credential name");
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    #[test]
    fn test_set_then_get_round_trip_for_all_keys() {
        let store = CredentialStore::new();
        for key in CredentialKey::ALL {
            store.set(key, format!("secret-for-{}", key.as_str()));
        }
        for key in CredentialKey::ALL {
            let value = store.get(key).expect("credential should be set");
            assert_eq!(
                value.expose_secret(),
                format!("secret-for-{}", key.as_str())
            );
        }
    }

    #[test]
    fn test_get_unset_credential_is_none() {
        let store = CredentialStore::new();
        assert!(store.get(CredentialKey::AccessToken).is_none());
    }

    #[test]
    fn test_overwrite_is_observed() {
        let store = CredentialStore::new();
        store.set(CredentialKey::TextGenKey, "old");
        store.set(CredentialKey::TextGenKey, "new");
        assert_eq!(
            store.get(CredentialKey::TextGenKey).unwrap().expose_secret(),
            "new"
        );
    }

    #[test]
    fn test_apply_ignores_unrecognized_names() {
        let store = CredentialStore::new();
        let mut updates = HashMap::new();
        updates.insert("access_token".to_string(), "tok".to_string());
        updates.insert("not_a_credential".to_string(), "whatever".to_string());

        let applied = store.apply(&updates);

        assert_eq!(applied, 1);
        assert_eq!(
            store.get(CredentialKey::AccessToken).unwrap().expose_secret(),
            "tok"
        );
        assert!(CredentialKey::from_name("not_a_credential").is_none());
    }

    #[test]
    fn test_wire_names_round_trip() {
        for key in CredentialKey::ALL {
            assert_eq!(CredentialKey::from_name(key.as_str()), Some(key));
        }
    }

    #[test]
    fn test_debug_output_does_not_leak_secrets() {
        let store = CredentialStore::new();
        store.set(CredentialKey::ApiSecret, "hunter2");
        let debug = format!("{:?}", store);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_set_variables() {
        std::env::set_var("TRIPCAST_IMAGE_SEARCH_KEY", "img-key");
        std::env::remove_var("TRIPCAST_ACCESS_TOKEN");

        let store = CredentialStore::from_env();

        assert_eq!(
            store
                .get(CredentialKey::ImageSearchKey)
                .unwrap()
                .expose_secret(),
            "img-key"
        );
        assert!(store.get(CredentialKey::AccessToken).is_none());

        std::env::remove_var("TRIPCAST_IMAGE_SEARCH_KEY");
    }

    #[test]
    #[serial]
    fn test_from_env_skips_empty_variables() {
        std::env::set_var("TRIPCAST_API_KEY", "");
        let store = CredentialStore::from_env();
        assert!(store.get(CredentialKey::ApiKey).is_none());
        std::env::remove_var("TRIPCAST_API_KEY");
    }
}
