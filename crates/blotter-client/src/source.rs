//! Collection sources.
//!
//! A [`RecordSource`] produces the full contents of one entity collection.
//! [`HttpSource`] is the production implementation backed by the REST API;
//! [`EnrichedEvidenceSource`] layers criminal-name resolution on top of two
//! HTTP sources.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use blotter_core::defaults::HEALTH_TIMEOUT_SECS;
use blotter_core::models::resolve_criminal_names;
use blotter_core::{Criminal, EntityKind, Error, Evidence, Record, Result};

use crate::config::ClientConfig;

/// Something that can fetch an entire entity collection.
#[async_trait]
pub trait RecordSource<R: Record>: Send + Sync {
    /// Fetch every record of the collection, in server order.
    async fn fetch_all(&self) -> Result<Vec<R>>;

    /// Short human-readable description for logs.
    fn describe(&self) -> String {
        R::KIND.noun().to_string()
    }
}

/// Collection body: a bare array or a paginated envelope.
#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionBody<R> {
    List(Vec<R>),
    Page { results: Vec<R> },
}

impl<R> CollectionBody<R> {
    fn into_records(self) -> Vec<R> {
        match self {
            CollectionBody::List(records) => records,
            CollectionBody::Page { results } => results,
        }
    }
}

/// Shared HTTP client for the REST backend.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient {
    /// Build a client from validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Config(format!("Invalid auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET one collection endpoint and decode it.
    #[instrument(
        skip(self),
        fields(
            subsystem = "client",
            component = "http_source",
            op = "fetch_all",
            collection = %R::KIND,
            request_id = %Uuid::now_v7(),
        )
    )]
    pub async fn fetch_collection<R>(&self) -> Result<Vec<R>>
    where
        R: Record + DeserializeOwned,
    {
        let start = Instant::now();
        let url = self.config.collection_url(R::KIND);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(http_status = status.as_u16(), "Collection fetch rejected");
            return Err(Error::Http {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;
        let body: CollectionBody<R> = serde_json::from_slice(&bytes)?;
        let records = body.into_records();

        debug!(
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Fetched collection"
        );
        Ok(records)
    }

    /// Whether the backend answers on the criminals endpoint.
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.config.collection_url(EntityKind::Criminal))
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Backend health check passed");
                    Ok(true)
                } else {
                    warn!("Backend health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Backend health check error: {}", e);
                Ok(false)
            }
        }
    }
}

/// HTTP source for one entity collection.
pub struct HttpSource<R> {
    client: HttpClient,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpSource<R> {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R> RecordSource<R> for HttpSource<R>
where
    R: Record + DeserializeOwned,
{
    async fn fetch_all(&self) -> Result<Vec<R>> {
        self.client.fetch_collection::<R>().await
    }

    fn describe(&self) -> String {
        self.client.config().collection_url(R::KIND)
    }
}

/// Evidence source that fills in `criminal_name` from the criminals
/// collection.
///
/// Criminals are fetched first; if that fails the evidence still loads and
/// every name resolves to the unknown-criminal placeholder.
pub struct EnrichedEvidenceSource {
    criminals: Arc<dyn RecordSource<Criminal>>,
    evidence: Arc<dyn RecordSource<Evidence>>,
}

impl EnrichedEvidenceSource {
    pub fn new(
        criminals: Arc<dyn RecordSource<Criminal>>,
        evidence: Arc<dyn RecordSource<Evidence>>,
    ) -> Self {
        Self {
            criminals,
            evidence,
        }
    }

    /// Both collections from the same HTTP client.
    pub fn from_client(client: HttpClient) -> Self {
        Self::new(
            Arc::new(HttpSource::<Criminal>::new(client.clone())),
            Arc::new(HttpSource::<Evidence>::new(client)),
        )
    }
}

#[async_trait]
impl RecordSource<Evidence> for EnrichedEvidenceSource {
    async fn fetch_all(&self) -> Result<Vec<Evidence>> {
        let criminals = match self.criminals.fetch_all().await {
            Ok(criminals) => criminals,
            Err(e) => {
                warn!(
                    subsystem = "client",
                    component = "evidence_source",
                    error = %e,
                    "Criminal lookup unavailable, names will be unresolved"
                );
                Vec::new()
            }
        };
        let evidence = self.evidence.fetch_all().await?;
        Ok(resolve_criminal_names(evidence, &criminals))
    }

    fn describe(&self) -> String {
        format!("{} (with criminal names)", self.evidence.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blotter_core::Case;

    #[test]
    fn test_collection_body_accepts_list_and_page() {
        let list: CollectionBody<Case> = serde_json::from_str(r#"[{"id": "1"}]"#).unwrap();
        assert_eq!(list.into_records().len(), 1);

        let page: CollectionBody<Case> =
            serde_json::from_str(r#"{"count": 2, "results": [{"id": "1"}, {"id": 2}]}"#).unwrap();
        let records = page.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, "2");
    }

    #[test]
    fn test_collection_body_rejects_object_without_results() {
        let body = serde_json::from_str::<CollectionBody<Case>>(r#"{"detail": "nope"}"#);
        assert!(body.is_err());
    }

    #[test]
    fn test_http_client_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("localhost:8000");
        assert!(matches!(HttpClient::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_http_source_describes_endpoint() {
        let client = HttpClient::new(ClientConfig::default()).unwrap();
        let source = HttpSource::<Case>::new(client);
        assert_eq!(source.describe(), "http://localhost:8000/api/crimes/");
    }
}
