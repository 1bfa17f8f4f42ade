use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, instrument};

use models::{Post, PostDraft, PostPatch};

use crate::errors::StoreError;
use crate::gist::GistStore;

/// The whole datastore: post id mapped to post object. serde_json is built
/// with `preserve_order`, so iteration follows the JSON object's insertion
/// order.
pub type Blob = serde_json::Map<String, serde_json::Value>;

/// Post CRUD backed by some store. Absence is a value (`None`/`false`),
/// never an error; `StoreError` covers transport and decoding only.
#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Post>, StoreError>;
    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError>;
    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError>;
    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, StoreError>;
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// Blog repository over a gist file holding one JSON object.
///
/// Every operation fetches the whole blob; writes overwrite the whole file
/// content. Mutations are serialized behind an async mutex so concurrent
/// requests of this process cannot assign duplicate ids or lose each
/// other's writes. Writers in other processes can still race on the gist;
/// the Gist API has no compare-and-swap, and the service assumes a single
/// administrator.
pub struct GistBlogRepository<S: GistStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: GistStore> GistBlogRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store, write_lock: Mutex::new(()) }
    }

    async fn fetch_blob(&self) -> Result<Blob, StoreError> {
        match self.store.fetch().await? {
            None => Ok(Blob::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| StoreError::Decode(e.to_string())),
        }
    }

    async fn write_blob(&self, blob: &Blob) -> Result<(), StoreError> {
        let content =
            serde_json::to_string_pretty(blob).map_err(|e| StoreError::Decode(e.to_string()))?;
        self.store.replace(content).await
    }
}

fn decode_post(value: &serde_json::Value) -> Result<Post, StoreError> {
    serde_json::from_value(value.clone()).map_err(|e| StoreError::Decode(e.to_string()))
}

fn encode_post(post: &Post) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(post).map_err(|e| StoreError::Decode(e.to_string()))
}

fn next_id(blob: &Blob) -> String {
    let max = blob
        .keys()
        .filter_map(|k| k.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

#[async_trait]
impl<S: GistStore> BlogRepository for GistBlogRepository<S> {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let blob = self.fetch_blob().await?;
        blob.values().map(decode_post).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let blob = self.fetch_blob().await?;
        blob.get(id).map(decode_post).transpose()
    }

    #[instrument(skip(self, draft))]
    async fn create(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut blob = self.fetch_blob().await?;
        let post = Post::from_draft(next_id(&blob), draft, Utc::now());
        blob.insert(post.id.clone(), encode_post(&post)?);
        self.write_blob(&blob).await?;
        info!(id = %post.id, "created blog post");
        Ok(post)
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: PostPatch) -> Result<Option<Post>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut blob = self.fetch_blob().await?;
        let Some(value) = blob.get(id) else {
            return Ok(None);
        };
        let mut post = decode_post(value)?;
        patch.apply_to(&mut post);
        post.date = Utc::now();
        blob.insert(id.to_string(), encode_post(&post)?);
        self.write_blob(&blob).await?;
        info!(id = %post.id, "updated blog post");
        Ok(Some(post))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut blob = self.fetch_blob().await?;
        if blob.remove(id).is_none() {
            return Ok(false);
        }
        self.write_blob(&blob).await?;
        info!(id = %id, "deleted blog post");
        Ok(true)
    }
}
