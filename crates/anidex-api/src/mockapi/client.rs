use std::time::Duration;

use reqwest::{Client, StatusCode};
use url::Url;

use anidex_core::models::{AnimePatch, AnimeRecord, NewAnime};

use super::types::{decode_record, decode_records};
use crate::error::CatalogError;
use crate::traits::CatalogService;

/// Collection endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://6873fc28c75558e27355d307.mockapi.io/Anime";

/// Client for a mockapi.io style REST collection.
///
/// `GET base`, `GET base/{id}`, `POST base`, `PUT base/{id}` and
/// `DELETE base/{id}`, all with JSON bodies.
pub struct MockApiClient {
    base_url: Url,
    http: Client,
}

impl MockApiClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client; `None` leaves timeouts to the transport.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, CatalogError> {
        let base_url =
            Url::parse(base_url).map_err(|e| CatalogError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            http: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base/{id}`, with `id` encoded as one path segment.
    fn item_url(&self, id: &str) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "catalog API error");
            Err(CatalogError::Fetch {
                status,
                message: body,
            })
        }
    }

    /// Like `check_response`, but a 404 becomes `NotFound(id)`.
    async fn check_item_response(
        resp: reqwest::Response,
        id: &str,
    ) -> Result<reqwest::Response, CatalogError> {
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(id, "anime not found");
            return Err(CatalogError::NotFound(id.to_string()));
        }
        Self::check_response(resp).await
    }
}

impl CatalogService for MockApiClient {
    type Error = CatalogError;

    async fn list_all(&self) -> Result<Vec<AnimeRecord>, CatalogError> {
        tracing::debug!(url = %self.base_url, "listing anime");
        let resp = self.http.get(self.base_url.clone()).send().await?;

        let resp = Self::check_response(resp).await?;
        let body = resp.text().await?;
        decode_records(&body)
    }

    async fn get_by_id(&self, id: &str) -> Result<AnimeRecord, CatalogError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "fetching anime");
        let resp = self.http.get(url).send().await?;

        let resp = Self::check_item_response(resp, id).await?;
        let body = resp.text().await?;
        decode_record(&body)
    }

    async fn create(&self, anime: &NewAnime) -> Result<AnimeRecord, CatalogError> {
        tracing::debug!(title = %anime.title, "creating anime");
        let resp = self
            .http
            .post(self.base_url.clone())
            .json(anime)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let body = resp.text().await?;
        decode_record(&body)
    }

    async fn update(&self, id: &str, patch: &AnimePatch) -> Result<AnimeRecord, CatalogError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "updating anime");
        let resp = self.http.put(url).json(patch).send().await?;

        let resp = Self::check_item_response(resp, id).await?;
        let body = resp.text().await?;
        decode_record(&body)
    }

    async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        let url = self.item_url(id)?;
        tracing::debug!(%url, "deleting anime");
        let resp = self.http.delete(url).send().await?;

        Self::check_response(resp).await?;
        Ok(())
    }
}
