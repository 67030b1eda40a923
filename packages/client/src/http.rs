//! Authenticated REST plumbing shared by all platform calls.

use crate::error::{PlatformError, PlatformResult};
use fieldline_types::Bytes;
use fieldline_types::json::json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Project-scoped, bearer-authenticated HTTP client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api_root: String,
    token: String,
}

/// Standard `{"items": [...]}` request envelope.
#[derive(Debug, Serialize)]
pub(crate) struct Items<'a, T> {
    pub items: &'a [T],
}

#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, api_root: String, token: String) -> Self {
        Self {
            http,
            api_root,
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_root, path)
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> PlatformResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let response = Self::check_status(path, response).await?;
        response
            .json()
            .await
            .map_err(|e| PlatformError::Decode(format!("{}: {}", path, e)))
    }

    /// POST a JSON body, discarding the response payload.
    pub async fn post_unit<B>(&self, path: &str, body: &B) -> PlatformResult<()>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        Self::check_status(path, response).await?;
        Ok(())
    }

    /// Retrieve a single resource by external id, tolerating misses.
    pub async fn retrieve_one<R>(&self, path: &str, external_id: &str) -> PlatformResult<Option<R>>
    where
        R: DeserializeOwned,
    {
        let body = json!({
            "items": [{ "externalId": external_id }],
            "ignoreUnknownIds": true,
        });

        let mut listing: ItemsResponse<R> = self.post(path, &body).await?;
        if listing.items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(listing.items.swap_remove(0)))
        }
    }

    /// PUT raw bytes to a pre-signed upload URL. The URL carries its
    /// own authorization, so no bearer header is attached.
    pub async fn put_bytes(&self, url: &str, mime_type: &str, content: Bytes) -> PlatformResult<()> {
        let response = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(content)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Content upload failed");
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    async fn check_status(
        path: &str,
        response: reqwest::Response,
    ) -> PlatformResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, path = %path, "Platform returned error");
        Err(PlatformError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
