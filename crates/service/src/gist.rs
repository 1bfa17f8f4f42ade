use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use tracing::debug;

use crate::errors::StoreError;

/// Raw access to the single gist file used as the datastore.
///
/// `fetch` returns the file's content as a string, `Ok(None)` when the gist
/// or the file does not exist (an empty store, not an error). `replace`
/// overwrites the whole file content.
#[async_trait]
pub trait GistStore: Send + Sync {
    async fn fetch(&self) -> Result<Option<String>, StoreError>;
    async fn replace(&self, content: String) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: GistStore + ?Sized> GistStore for std::sync::Arc<S> {
    async fn fetch(&self) -> Result<Option<String>, StoreError> {
        (**self).fetch().await
    }
    async fn replace(&self, content: String) -> Result<(), StoreError> {
        (**self).replace(content).await
    }
}

/// Gist store over the GitHub API: GET the document, PATCH a replacement
/// for the named file's content.
pub struct HttpGistStore {
    client: reqwest::Client,
    api_url: String,
    token: String,
    filename: String,
}

impl HttpGistStore {
    pub fn new(api_base: &str, gist_id: &str, token: &str, filename: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: format!("{}/gists/{}", api_base.trim_end_matches('/'), gist_id),
            token: token.to_string(),
            filename: filename.to_string(),
        }
    }
}

#[async_trait]
impl GistStore for HttpGistStore {
    async fn fetch(&self) -> Result<Option<String>, StoreError> {
        let res = self
            .client
            .get(&self.api_url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        // A 404 means the gist does not exist yet; treat as an empty store.
        if res.status() == StatusCode::NOT_FOUND {
            debug!(url = %self.api_url, "gist not found, treating as empty store");
            return Ok(None);
        }
        let res = res
            .error_for_status()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let doc: serde_json::Value = res
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        let content = doc
            .get("files")
            .and_then(|files| files.get(&self.filename))
            .and_then(|file| file.get("content"))
            .and_then(|content| content.as_str());
        Ok(content.map(str::to_string))
    }

    async fn replace(&self, content: String) -> Result<(), StoreError> {
        let body = serde_json::json!({
            "files": { &self.filename: { "content": content } }
        });
        self.client
            .patch(&self.api_url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(())
    }
}

/// In-memory gist store for tests and doc examples.
pub mod mock {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryGistStore {
        content: Mutex<Option<String>>,
        unreachable: AtomicBool,
    }

    impl MemoryGistStore {
        pub fn with_content(content: &str) -> Self {
            Self {
                content: Mutex::new(Some(content.to_string())),
                unreachable: AtomicBool::new(false),
            }
        }

        /// Make every call fail with a transport error, as if the remote
        /// store were unreachable.
        pub fn set_unreachable(&self, unreachable: bool) {
            self.unreachable.store(unreachable, Ordering::SeqCst);
        }

        pub fn content(&self) -> Option<String> {
            self.content.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GistStore for MemoryGistStore {
        async fn fetch(&self) -> Result<Option<String>, StoreError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(StoreError::Transport("store unreachable".into()));
            }
            Ok(self.content.lock().unwrap().clone())
        }

        async fn replace(&self, content: String) -> Result<(), StoreError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(StoreError::Transport("store unreachable".into()));
            }
            *self.content.lock().unwrap() = Some(content);
            Ok(())
        }
    }
}
