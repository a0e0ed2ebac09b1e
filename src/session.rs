use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::models::Provenance;

/// Who is signed in and where the last batch of data came from.
///
/// Passed into the resolver and handed back updated, rather than living in
/// shared state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub token: Option<String>,
    pub provenance: Option<Provenance>,
}

impl SessionContext {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.is_empty()),
            provenance: None,
        }
    }

    pub fn with_token(self, token: String) -> Self {
        Self {
            token: Some(token),
            ..self
        }
    }

    pub fn with_provenance(self, provenance: Provenance) -> Self {
        Self {
            provenance: Some(provenance),
            ..self
        }
    }

    pub fn is_using_demo_data(&self) -> bool {
        self.provenance.is_some_and(|provenance| provenance.is_demo())
    }

    pub fn logout(self) -> Self {
        Self::default()
    }
}

/// Bearer token kept in a plain file between invocations.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let token = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read token from {}", self.path.display()))?;
        let token = token.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    pub fn save(&self, token: &str) -> anyhow::Result<()> {
        std::fs::write(&self.path, token)
            .with_context(|| format!("failed to write token to {}", self.path.display()))
    }

    /// Writes the session's token, or removes the file when it has none.
    pub fn persist(&self, session: &SessionContext) -> anyhow::Result<()> {
        match session.token.as_deref() {
            Some(token) => self.save(token),
            None => self.clear(),
        }
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn token_round_trips_through_file() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));

        assert_eq!(store.load().unwrap(), None);
        store.save("abc.def").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc.def"));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        store.clear().unwrap();
    }

    #[test]
    fn blank_file_means_no_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();

        assert_eq!(TokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn demo_flag_follows_provenance_until_logout() {
        let session = SessionContext::new(Some("tok".to_string()));
        assert!(!session.is_using_demo_data());

        let session = session.with_provenance(Provenance::DemoError);
        assert!(session.is_using_demo_data());

        let session = session.with_provenance(Provenance::Live);
        assert!(!session.is_using_demo_data());

        let session = session.with_provenance(Provenance::DemoFallback).logout();
        assert!(!session.is_using_demo_data());
        assert!(session.token.is_none());
    }

    #[test]
    fn empty_token_counts_as_signed_out() {
        assert!(SessionContext::new(Some(String::new())).token.is_none());
    }

    #[test]
    fn persisting_a_logged_out_session_removes_the_token() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));

        let session = SessionContext::default().with_token("abc".to_string());
        store.persist(&session).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc"));

        let session = SessionContext::new(store.load().unwrap()).logout();
        store.persist(&session).unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path().exists());
    }
}
