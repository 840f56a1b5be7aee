//! File-backed credential store
//!
//! The store file is a JSON document listing scopes (the root scope has
//! URI `""`) and the credentials saved in each. Every scope is served as
//! one issuer.

use jobtoken_core::ExecutionContext;
use jobtoken_crypto::{KeyError, KeyManager};
use jobtoken_oidc::{
    ConfigRequest, Credential, CredentialRecord, Issuer, IssuerFactory, IssuerResolver,
    OidcConfig, OidcError, StaticIssuer,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed credential store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Credential {id} in scope '{scope}': {source}")]
    Credential {
        scope: String,
        id: String,
        source: OidcError,
    },

    #[error("Scope '{0}' is listed more than once")]
    DuplicateScope(String),

    #[error("Credential {id} is listed more than once in scope '{scope}'")]
    DuplicateCredential { scope: String, id: String },

    #[error("Scope URI '{0}' must be empty or start with '/' and not end with '/'")]
    InvalidScope(String),

    #[error(transparent)]
    Key(#[from] KeyError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One scope and the credentials saved in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRecord {
    #[serde(default)]
    pub uri: String,

    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

/// On-disk layout of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default)]
    pub scopes: Vec<ScopeRecord>,
}

impl StoreFile {
    /// Read the store at `path`; a missing file is an empty store
    pub fn read(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No credential store yet; starting empty");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Replace the file at `path` with this store
    pub fn write(&self, path: &Path) -> Result<()> {
        let write_err = |source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let staging = path.with_extension("tmp");
        std::fs::write(&staging, json).map_err(write_err)?;
        std::fs::rename(&staging, path).map_err(write_err)
    }

    /// Save `record` in `scope`, replacing any credential with the same id
    pub fn save_credential(&mut self, scope: &str, record: CredentialRecord) {
        let position = self.scopes.iter().position(|s| s.uri == scope);
        let scope = match position {
            Some(i) => &mut self.scopes[i],
            None => {
                self.scopes.push(ScopeRecord {
                    uri: scope.to_string(),
                    credentials: Vec::new(),
                });
                let last = self.scopes.len() - 1;
                &mut self.scopes[last]
            }
        };
        match scope.credentials.iter_mut().find(|c| c.id == record.id) {
            Some(existing) => *existing = record,
            None => scope.credentials.push(record),
        }
    }
}

/// Issuer factory over the scopes of a store.
///
/// A job sees the issuer of its own scope and of every enclosing scope,
/// innermost first.
#[derive(Debug, Clone)]
pub struct ScopeIssuerFactory {
    scopes: Vec<Arc<dyn Issuer>>,
}

impl ScopeIssuerFactory {
    pub fn new(scopes: Vec<Arc<dyn Issuer>>) -> Self {
        Self { scopes }
    }

    fn find(&self, uri: &str) -> Option<Arc<dyn Issuer>> {
        self.scopes.iter().find(|s| s.uri() == uri).cloned()
    }
}

impl IssuerFactory for ScopeIssuerFactory {
    fn for_context(&self, context: &ExecutionContext) -> Vec<Arc<dyn Issuer>> {
        let mut visible: Vec<_> = self
            .scopes
            .iter()
            .filter(|s| encloses(s.uri(), &context.scope))
            .cloned()
            .collect();
        visible.sort_by_key(|s| std::cmp::Reverse(s.uri().len()));
        visible
    }

    fn for_config(&self, request: &ConfigRequest) -> Option<Arc<dyn Issuer>> {
        self.find(&request.scope)
    }

    fn for_uri(&self, uri: &str) -> Option<Arc<dyn Issuer>> {
        self.find(uri)
    }
}

fn encloses(outer: &str, inner: &str) -> bool {
    outer.is_empty()
        || inner == outer
        || inner
            .strip_prefix(outer)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn valid_scope(uri: &str) -> bool {
    uri.is_empty() || (uri.starts_with('/') && !uri.ends_with('/'))
}

/// Credentials restored from a store file
pub struct CredentialStore {
    root: Arc<dyn Issuer>,
    factory: Arc<ScopeIssuerFactory>,
}

impl CredentialStore {
    /// Load the store at `path`.
    ///
    /// Legacy key records are migrated and the file is rewritten in the
    /// current format so the migration happens once.
    pub fn open(path: &Path, config: &OidcConfig, keys: &KeyManager) -> Result<Self> {
        let mut file = StoreFile::read(path)?;
        let (store, migrated) = Self::restore(&mut file, config, keys)?;
        if migrated > 0 {
            file.write(path)?;
            tracing::info!(
                path = %path.display(),
                migrated,
                "Rewrote credential store after migrating legacy keys"
            );
        }
        Ok(store)
    }

    /// Restore every credential in `file`, replacing migrated records in
    /// place. Returns the store and the number of migrated records.
    pub fn restore(
        file: &mut StoreFile,
        config: &OidcConfig,
        keys: &KeyManager,
    ) -> Result<(Self, usize)> {
        let mut scopes: Vec<Arc<dyn Issuer>> = Vec::with_capacity(file.scopes.len() + 1);
        let mut migrated = 0;

        for scope in &mut file.scopes {
            if !valid_scope(&scope.uri) {
                return Err(StoreError::InvalidScope(scope.uri.clone()));
            }
            if scopes.iter().any(|s| s.uri() == scope.uri) {
                return Err(StoreError::DuplicateScope(scope.uri.clone()));
            }

            let mut credentials: Vec<Arc<Credential>> = Vec::with_capacity(scope.credentials.len());
            for record in &mut scope.credentials {
                if credentials.iter().any(|c| c.id() == record.id) {
                    return Err(StoreError::DuplicateCredential {
                        scope: scope.uri.clone(),
                        id: record.id.clone(),
                    });
                }
                let (credential, was_legacy) =
                    Credential::restore(record, keys).map_err(|source| StoreError::Credential {
                        scope: scope.uri.clone(),
                        id: record.id.clone(),
                        source,
                    })?;
                if was_legacy {
                    *record = credential.to_record();
                    migrated += 1;
                }
                credentials.push(Arc::new(credential));
            }

            tracing::debug!(scope = %scope.uri, credentials = credentials.len(), "Loaded scope");
            scopes.push(Arc::new(StaticIssuer::new(config, scope.uri.clone(), credentials)));
        }

        let root = match scopes.iter().find(|s| s.uri().is_empty()) {
            Some(root) => root.clone(),
            None => {
                let root: Arc<dyn Issuer> = Arc::new(StaticIssuer::new(config, "", Vec::new()));
                scopes.push(root.clone());
                root
            }
        };

        let store = Self {
            root,
            factory: Arc::new(ScopeIssuerFactory::new(scopes)),
        };
        Ok((store, migrated))
    }

    pub fn root(&self) -> Arc<dyn Issuer> {
        self.root.clone()
    }

    pub fn factory(&self) -> Arc<ScopeIssuerFactory> {
        self.factory.clone()
    }

    /// Resolver over this store's scopes
    pub fn resolver(&self) -> IssuerResolver {
        IssuerResolver::new(self.root(), vec![self.factory.clone()])
    }

    /// Credential `id` saved in `scope`
    pub fn credential(&self, scope: &str, id: &str) -> Option<Arc<Credential>> {
        self.factory
            .find(scope)?
            .credentials()
            .into_iter()
            .find(|c| c.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use jobtoken_core::KeyAlgorithm;
    use jobtoken_crypto::{MasterKeyCipher, SecretCipher, StoredKeyRecord};

    fn keys() -> (KeyManager, Arc<MasterKeyCipher>) {
        let cipher = Arc::new(MasterKeyCipher::new(&[9u8; 32]));
        (KeyManager::new(cipher.clone()), cipher)
    }

    fn config() -> OidcConfig {
        OidcConfig::new("https://ci.example.org")
    }

    fn record(id: &str, keys: &KeyManager) -> CredentialRecord {
        Credential::generate(id, KeyAlgorithm::Es256, keys)
            .unwrap()
            .to_record()
    }

    #[test]
    fn test_scope_visibility() {
        let (keys, _) = keys();
        let mut file = StoreFile::default();
        file.save_credential("", record("root-cred", &keys));
        file.save_credential("/job/team", record("team-cred", &keys));
        file.save_credential("/job/team/job/sub", record("sub-cred", &keys));
        file.save_credential("/job/teammate", record("other-cred", &keys));

        let (store, migrated) = CredentialStore::restore(&mut file, &config(), &keys).unwrap();
        assert_eq!(migrated, 0);

        let context = ExecutionContext::new("https://ci.example.org/job/team/job/sub/job/app/", 5)
            .in_scope("/job/team/job/sub");
        let uris: Vec<String> = store
            .factory()
            .for_context(&context)
            .iter()
            .map(|s| s.uri().to_string())
            .collect();
        assert_eq!(uris, vec!["/job/team/job/sub", "/job/team", ""]);

        let resolver = store.resolver();
        let team = store.credential("/job/team", "team-cred").unwrap();
        assert_eq!(
            resolver.for_credential(&team, Some(&context)).unwrap().url(),
            "https://ci.example.org/oidc/job/team"
        );
        let other = store.credential("/job/teammate", "other-cred").unwrap();
        assert!(resolver.for_credential(&other, Some(&context)).is_err());
    }

    #[test]
    fn test_root_scope_is_implicit() {
        let (keys, _) = keys();
        let mut file = StoreFile::default();
        let (store, _) = CredentialStore::restore(&mut file, &config(), &keys).unwrap();
        assert_eq!(store.root().url(), "https://ci.example.org/oidc");
        assert!(store.root().credentials().is_empty());
    }

    #[test]
    fn test_invalid_scopes_rejected() {
        let (keys, _) = keys();

        let mut file = StoreFile {
            scopes: vec![ScopeRecord::default(), ScopeRecord::default()],
        };
        assert!(matches!(
            CredentialStore::restore(&mut file, &config(), &keys),
            Err(StoreError::DuplicateScope(_))
        ));

        let mut file = StoreFile {
            scopes: vec![ScopeRecord {
                uri: "/job/team/".into(),
                credentials: vec![],
            }],
        };
        assert!(matches!(
            CredentialStore::restore(&mut file, &config(), &keys),
            Err(StoreError::InvalidScope(_))
        ));
    }

    #[test]
    fn test_duplicate_credential_ids_rejected() {
        let (keys, _) = keys();
        let mut file = StoreFile {
            scopes: vec![ScopeRecord {
                uri: "/job/team".into(),
                credentials: vec![record("c1", &keys), record("c2", &keys), record("c1", &keys)],
            }],
        };
        match CredentialStore::restore(&mut file, &config(), &keys) {
            Err(StoreError::DuplicateCredential { scope, id }) => {
                assert_eq!(scope, "/job/team");
                assert_eq!(id, "c1");
            }
            other => panic!("expected duplicate credential error, got {:?}", other.map(|_| ())),
        }

        // The same id in different scopes is fine
        let mut file = StoreFile::default();
        file.save_credential("", record("c1", &keys));
        file.save_credential("/job/team", record("c1", &keys));
        assert!(CredentialStore::restore(&mut file, &config(), &keys).is_ok());
    }

    #[test]
    fn test_save_credential_replaces_same_id() {
        let (keys, _) = keys();
        let mut file = StoreFile::default();
        file.save_credential("/job/team", record("c1", &keys));
        let mut replacement = record("c1", &keys);
        replacement.audience = Some("sts.example".into());
        file.save_credential("/job/team", replacement.clone());

        assert_eq!(file.scopes.len(), 1);
        assert_eq!(file.scopes[0].credentials, vec![replacement]);
    }

    #[test]
    fn test_legacy_records_migrated_and_persisted() {
        let (keys, cipher) = keys();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");

        let rsa = keys.generate(KeyAlgorithm::Rs256).unwrap();
        let private_b64 = STANDARD.encode(rsa.private_key_der().unwrap().as_slice());
        let legacy = serde_json::json!({
            "scopes": [{
                "uri": "",
                "credentials": [{
                    "id": "old",
                    "keys": { "privateKey": cipher.encrypt(&private_b64).unwrap() }
                }]
            }]
        });
        std::fs::write(&path, legacy.to_string()).unwrap();

        let store = CredentialStore::open(&path, &config(), &keys).unwrap();
        let old = store.credential("", "old").unwrap();
        assert_eq!(old.algorithm(), KeyAlgorithm::Rs256);

        let rewritten = StoreFile::read(&path).unwrap();
        let keys_record = &rewritten.scopes[0].credentials[0].keys;
        assert!(matches!(keys_record, StoredKeyRecord::Current(_)));

        // Second load finds nothing to migrate
        let (_, migrated) =
            CredentialStore::restore(&mut rewritten.clone(), &config(), &keys).unwrap();
        assert_eq!(migrated, 0);
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = StoreFile::read(&dir.path().join("absent.json")).unwrap();
        assert!(file.scopes.is_empty());
    }
}
