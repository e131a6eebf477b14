use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::models::{Field, NewPost, PostRecord};
use crate::query::Query;

/// The remote posts service.
#[async_trait]
pub trait PostsApi: Send + Sync {
    /// Full suggestion list for one filter field.
    async fn candidates(&self, field: Field) -> Result<Vec<String>>;

    async fn list_posts(&self, query: &Query) -> Result<Vec<PostRecord>>;

    async fn create_post(&self, post: &NewPost, token: &str) -> Result<PostRecord>;
}

#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} request failed with status {}: {}", what, status, error_text));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl PostsApi for HttpApi {
    async fn candidates(&self, field: Field) -> Result<Vec<String>> {
        let path = format!("/{}", field.plural());
        tracing::debug!(%field, url = %self.url(&path), "fetching suggestions");

        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", field.plural()))?;

        Self::read_json(response, field.plural()).await
    }

    async fn list_posts(&self, query: &Query) -> Result<Vec<PostRecord>> {
        tracing::debug!(operation = query.operation(), url = %self.url(query.endpoint()), "listing posts");

        let response = self
            .client
            .post(self.url(query.endpoint()))
            .json(&query.body())
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", query.operation()))?;

        Self::read_json(response, query.operation()).await
    }

    async fn create_post(&self, post: &NewPost, token: &str) -> Result<PostRecord> {
        let response = self
            .client
            .post(self.url("/posts"))
            .bearer_auth(token)
            .json(post)
            .send()
            .await
            .context("Failed to send create post request")?;

        Self::read_json(response, "create post").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let api = HttpApi::new("http://localhost:5000/");
        assert_eq!(api.url("/companies"), "http://localhost:5000/companies");

        let api = HttpApi::new("https://posts.example.com/api");
        assert_eq!(api.url("/posts/all"), "https://posts.example.com/api/posts/all");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_an_error() {
        // Nothing listens on the discard port locally.
        let api = HttpApi::new("http://127.0.0.1:9");
        let err = api.candidates(Field::Company).await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch companies"));
    }
}
