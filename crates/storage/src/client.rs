//! Firebase Storage REST client.

use crate::config::{Credentials, StorageConfig};
use crate::store::ObjectStore;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uploader_core::naming::remote_name_for;
use uploader_core::StorageError;
use url::Url;

/// One page of an object listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPage {
    #[serde(default)]
    pub items: Vec<ObjectItem>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObjectItem {
    pub name: String,
}

/// Firebase Storage bucket accessed over the v0 REST API.
#[derive(Clone)]
pub struct FirebaseStore {
    http: Client,
    base: Url,
    bucket: String,
    access_token: Option<String>,
    content_type: String,
}

impl FirebaseStore {
    /// Creates a client for the bucket named in `credentials`.
    pub fn new(config: &StorageConfig, credentials: Credentials) -> Result<Self, StorageError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            StorageError::unavailable(format!("invalid base url '{}': {}", config.base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(StorageError::unavailable(format!(
                "invalid base url '{}'",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| StorageError::unavailable(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            http,
            base,
            bucket: credentials.storage_bucket,
            access_token: credentials.access_token,
            content_type: config.content_type.clone(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `{base}/v0/b/{bucket}/o`
    pub(crate) fn objects_url(&self) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v0", "b", self.bucket.as_str(), "o"]);
        }
        url
    }

    /// `{base}/v0/b/{bucket}/o/{name}` with `name` encoded as one segment.
    pub(crate) fn object_url(&self, name: &str) -> Url {
        let mut url = self.objects_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(name);
        }
        url
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Fetches one page of the object listing.
    pub(crate) async fn list_page(
        &self,
        page_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<ListPage, StorageError> {
        let mut url = self.objects_url();
        {
            let mut query = url.query_pairs_mut();
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
            if let Some(max) = max_results {
                query.append_pair("maxResults", &max.to_string());
            }
        }

        let response = self
            .authorize(self.http.get(url))
            .send()
            .await
            .map_err(request_error)?;
        let response = check_status(response).await?;

        response
            .json::<ListPage>()
            .await
            .map_err(|e| StorageError::transient(format!("invalid listing response: {}", e)))
    }
}

#[async_trait]
impl ObjectStore for FirebaseStore {
    async fn put(&self, local_path: &Path) -> Result<String, StorageError> {
        let name = remote_name_for(local_path).ok_or_else(|| {
            StorageError::local_file(format!("no file name in {}", local_path.display()))
        })?;

        let file = tokio::fs::File::open(local_path).await.map_err(|e| {
            StorageError::local_file(format!("cannot open {}: {}", local_path.display(), e))
        })?;
        let size = file
            .metadata()
            .await
            .map_err(|e| {
                StorageError::local_file(format!("cannot stat {}: {}", local_path.display(), e))
            })?
            .len();
        let body = Body::wrap_stream(ReaderStream::new(file));

        let mut url = self.objects_url();
        url.query_pairs_mut().append_pair("name", &name);

        let response = self
            .authorize(self.http.post(url))
            .header(CONTENT_TYPE, self.content_type.as_str())
            .header(CONTENT_LENGTH, size)
            .body(body)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;

        debug!(bucket = %self.bucket, name = %name, bytes = size, "Uploaded object");
        Ok(name)
    }

    async fn delete(&self, remote_name: &str) -> Result<(), StorageError> {
        let response = self
            .authorize(self.http.delete(self.object_url(remote_name)))
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;

        debug!(bucket = %self.bucket, name = %remote_name, "Deleted object");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(page_token.as_deref(), None).await?;
            names.extend(page.items.into_iter().map(|item| item.name));

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(names)
    }
}

/// Failures before a response arrived: connect errors, timeouts, resets.
fn request_error(e: reqwest::Error) -> StorageError {
    if e.is_builder() {
        StorageError::permanent(format!("invalid request: {}", e))
    } else {
        StorageError::transient(format!("request failed: {}", e))
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, &body))
}

/// Maps an unsuccessful HTTP status onto an error class.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> StorageError {
    let message = if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        format!("HTTP {}: {}", status, body.trim())
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StorageError::unavailable(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            StorageError::transient(message)
        }
        s if s.is_server_error() => StorageError::transient(message),
        _ => StorageError::permanent(message),
    }
}
