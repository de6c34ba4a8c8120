//! S3 blob store

use crate::blob::{validate_key, BlobStore};
use crate::errors::{backend_status, network_error, not_found, Result};
use crate::s3::list::{parse_list_response, ListBucketResult};
use crate::s3::sigv4::{canonical_query, sha256_hex, sign, uri_encode, SigningRequest};
use async_trait::async_trait;
use chrono::Utc;
use kubevc_core::errors::{ExError, ExErrorKind};
use kubevc_core_types::Sensitive;
use reqwest::{Client, Method, StatusCode, Url};
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for one bucket
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: Sensitive<String>,
    /// S3-compatible endpoint (e.g. MinIO); switches to path-style addressing
    pub endpoint: Option<String>,
    /// Base for public locators; defaults to the bucket's virtual-hosted URL
    pub public_base_url: Option<String>,
}

/// Blob store backed by an S3 bucket
pub struct S3BlobStore {
    config: S3Config,
    client: Client,
    base: Url,
    host: String,
    path_style: bool,
}

impl S3BlobStore {
    pub fn new(config: S3Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| network_error("s3_client", &config.bucket, e))?;
        Self::with_client(config, client)
    }

    pub fn with_client(config: S3Config, client: Client) -> Result<Self> {
        let (raw_base, path_style) = match config.endpoint.as_deref() {
            Some(endpoint) if !endpoint.trim().is_empty() => {
                (endpoint.trim_end_matches('/').to_string(), true)
            }
            _ => (
                format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region),
                false,
            ),
        };
        let base = Url::parse(&raw_base).map_err(|e| {
            ExError::new(ExErrorKind::InvalidConfiguration)
                .with_op("s3_client")
                .with_entity_id(raw_base.clone())
                .with_message(e.to_string())
        })?;
        let host = match (base.host_str(), base.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(ExError::new(ExErrorKind::InvalidConfiguration)
                    .with_op("s3_client")
                    .with_entity_id(raw_base)
                    .with_message("endpoint has no host"))
            }
        };
        Ok(Self {
            config,
            client,
            base,
            host,
            path_style,
        })
    }

    /// Encoded request path for a key (or the bucket root when `key` is empty)
    fn canonical_uri(&self, key: &str) -> String {
        let encoded = uri_encode(key, false);
        if self.path_style {
            format!("/{}/{}", uri_encode(&self.config.bucket, true), encoded)
        } else {
            format!("/{}", encoded)
        }
    }

    fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    async fn send(
        &self,
        method: Method,
        key: &str,
        query: &[(String, String)],
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<reqwest::Response> {
        let op = format!("s3_{}", method.as_str().to_ascii_lowercase());
        let canonical_uri = self.canonical_uri(key);
        let payload_sha256 = sha256_hex(&body);
        let signed = sign(
            &self.config.access_key_id,
            self.config.secret_access_key.expose(),
            &self.config.region,
            &SigningRequest {
                method: method.as_str(),
                host: &self.host,
                canonical_uri: &canonical_uri,
                query,
                payload_sha256: &payload_sha256,
                at: Utc::now(),
            },
        )?;

        let query_string = canonical_query(query);
        let url = if query_string.is_empty() {
            format!("{}{}", self.origin(), canonical_uri)
        } else {
            format!("{}{}?{}", self.origin(), canonical_uri, query_string)
        };

        let mut request = self
            .client
            .request(method, url)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.content_sha256)
            .header(reqwest::header::AUTHORIZATION, signed.authorization);
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        request.send().await.map_err(|e| network_error(&op, key, e))
    }

    async fn list_page(
        &self,
        prefix: &str,
        delimiter: Option<&str>,
        continuation: Option<&str>,
    ) -> Result<ListBucketResult> {
        let mut query = vec![
            ("list-type".to_string(), "2".to_string()),
            ("prefix".to_string(), prefix.to_string()),
        ];
        if let Some(delimiter) = delimiter {
            query.push(("delimiter".to_string(), delimiter.to_string()));
        }
        if let Some(token) = continuation {
            query.push(("continuation-token".to_string(), token.to_string()));
        }

        let response = self.send(Method::GET, "", &query, Vec::new(), None).await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| network_error("s3_list", prefix, e))?;
        if !status.is_success() {
            return Err(backend_status("s3_list", prefix, status, &text));
        }
        parse_list_response(&text).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("s3_list")
                .with_entity_id(prefix)
                .with_message(e.to_string())
        })
    }

    async fn list_all(&self, prefix: &str, delimiter: Option<&str>) -> Result<Vec<ListBucketResult>> {
        let mut pages = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page = self
                .list_page(prefix, delimiter, continuation.as_deref())
                .await?;
            let next = match (page.is_truncated, page.next_continuation_token.clone()) {
                (true, Some(token)) => Some(token),
                _ => None,
            };
            pages.push(page);
            match next {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        Ok(pages)
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn backend(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        validate_key(key)?;
        let response = self
            .send(Method::PUT, key, &[], bytes, Some(content_type))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(backend_status("s3_put", key, status, &text));
        }
        tracing::debug!(key, bucket = %self.config.bucket, "s3 object written");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        validate_key(key)?;
        let response = self.send(Method::GET, key, &[], Vec::new(), None).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found("s3_get", key));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(backend_status("s3_get", key, status, &text));
        }
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| network_error("s3_get", key, e))
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pages = self.list_all(prefix, None).await?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.contents.into_iter().map(|c| c.key))
            .collect())
    }

    async fn list_common_prefixes(&self, prefix: &str) -> Result<Vec<String>> {
        let pages = self.list_all(prefix, Some("/")).await?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.common_prefixes.into_iter())
            .filter_map(|p| {
                p.prefix
                    .strip_prefix(prefix)
                    .map(|rest| rest.trim_end_matches('/').to_string())
            })
            .filter(|segment| !segment.is_empty())
            .collect())
    }

    fn public_url(&self, key: &str) -> String {
        let encoded = uri_encode(key, false);
        match self.config.public_base_url.as_deref() {
            Some(base) if !base.trim().is_empty() => {
                format!("{}/{}", base.trim_end_matches('/'), encoded)
            }
            _ => format!("{}{}", self.origin(), self.canonical_uri(key)),
        }
    }
}
