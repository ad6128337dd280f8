//! HubSpot CRM API client
//!
//! Executes sync jobs as REST calls against `api.hubapi.com` and feeds the
//! shared rate-limit tracker from every response, whether the call succeeded
//! or not. Also provides the read paths (search, batch read, owners) used by
//! the aggregation handlers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use opsdeck_core::RateLimitTracker;
use opsdeck_domain::constants::{
    BATCH_READ_LIMIT, HUBSPOT_BASE_URL, OWNER_CACHE_TTL_SECS, RATE_LIMIT_DEFAULT_WINDOW_MS,
    RATE_LIMIT_INITIAL_REMAINING, RATE_LIMIT_INTERVAL_HEADER, RATE_LIMIT_REMAINING_HEADER,
};
use opsdeck_domain::{ObjectType, SyncJob, SyncOperation};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::http::HttpClient;
use crate::hubspot::errors::HubSpotError;
use crate::hubspot::properties;

/// Configuration for the HubSpot client
#[derive(Debug, Clone)]
pub struct HubSpotClientConfig {
    /// API base URL; override for tests
    pub base_url: String,
    /// Private-app access token
    pub api_token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl HubSpotClientConfig {
    /// Production defaults with the given token
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: HUBSPOT_BASE_URL.to_string(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Search request body for `/crm/v3/objects/{resource}/search`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<Value>,
    pub sorts: Vec<Value>,
    pub properties: Vec<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl SearchRequest {
    /// Default search over an object type: canonical property list, newest
    /// modifications first, provider-maximum page size
    pub fn for_type(object_type: ObjectType) -> Self {
        Self {
            filter_groups: Vec::new(),
            sorts: vec![json!({ "propertyName": "lastmodifieddate", "direction": "DESCENDING" })],
            properties: properties::default_properties(object_type)
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            limit: 100,
            after: None,
        }
    }
}

/// One page of search results
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub results: Vec<Value>,
    pub next_cursor: Option<String>,
    pub total: Option<u64>,
}

type OwnerMap = Arc<HashMap<String, String>>;

/// HubSpot API client
pub struct HubSpotClient {
    http: HttpClient,
    config: HubSpotClientConfig,
    rate: Arc<Mutex<RateLimitTracker>>,
    owner_cache: Cache<String, OwnerMap>,
}

impl HubSpotClient {
    /// Create a new client with its own rate tracker
    pub fn new(config: HubSpotClientConfig) -> Result<Self, HubSpotError> {
        Self::with_rate_tracker(config, Arc::new(Mutex::new(RateLimitTracker::new())))
    }

    /// Create a new client sharing a rate tracker with the queue manager
    pub fn with_rate_tracker(
        config: HubSpotClientConfig,
        rate: Arc<Mutex<RateLimitTracker>>,
    ) -> Result<Self, HubSpotError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HubSpotError::Config(format!("failed to build HttpClient: {e}")))?;

        let owner_cache = Cache::builder()
            .time_to_live(Duration::from_secs(OWNER_CACHE_TTL_SECS))
            .max_capacity(1)
            .build();

        Ok(Self { http, config, rate, owner_cache })
    }

    /// Shared rate-limit tracker handle
    pub fn rate_tracker(&self) -> Arc<Mutex<RateLimitTracker>> {
        Arc::clone(&self.rate)
    }

    /// Execute one sync job as one REST call
    ///
    /// Returns the parsed JSON body on success. On a non-success status the
    /// body is parsed as JSON (falling back to the status text) and raised
    /// with the status code embedded in the message.
    #[instrument(skip(self, job), fields(job_id = %job.job_id, operation = %job.operation))]
    pub async fn execute(&self, job: &SyncJob) -> Result<Value, HubSpotError> {
        let url = self.endpoint(job)?;
        let method = request_method(job.operation);

        debug!(%url, attempt = job.attempt, "executing sync job");

        let mut builder = self.authorized(self.http.request(method, &url));
        if job.operation.has_body() {
            builder = builder.json(&job_body(job));
        }

        let response = self.send(builder).await?;
        let status = response.status();

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unknown error").to_string();
            let text = response.text().await.unwrap_or_default();
            let mut payload: Value =
                serde_json::from_str(&text).unwrap_or_else(|_| json!({ "message": reason }));
            if let Some(map) = payload.as_object_mut() {
                map.insert("status".to_string(), json!(status.as_u16()));
            }
            return Err(HubSpotError::Api { status: status.as_u16(), message: payload.to_string() });
        }

        // DELETE returns 204 with an empty body
        if job.operation == SyncOperation::Delete {
            return Ok(Value::Null);
        }

        response.json().await.map_err(|e| HubSpotError::Body(e.to_string()))
    }

    /// Search an object type with filters and cursor paging
    #[instrument(skip(self, request), fields(object_type = %object_type))]
    pub async fn search(
        &self,
        object_type: ObjectType,
        request: &SearchRequest,
    ) -> Result<SearchPage, HubSpotError> {
        let url = format!(
            "{}/crm/v3/objects/{}/search",
            self.config.base_url,
            object_type.resource_path()
        );

        let builder = self.authorized(self.http.request(Method::POST, &url)).json(request);
        let response = self.send(builder).await?;
        let body = self.success_body(response).await?;

        Ok(SearchPage {
            results: body["results"].as_array().cloned().unwrap_or_default(),
            next_cursor: body["paging"]["next"]["after"].as_str().map(String::from),
            total: body["total"].as_u64(),
        })
    }

    /// Batch-read objects by id; ids beyond the provider limit are dropped
    #[instrument(skip(self, ids), fields(object_type = %object_type, count = ids.len()))]
    pub async fn batch_read(
        &self,
        object_type: ObjectType,
        ids: &[String],
        extra_properties: Option<&[String]>,
    ) -> Result<Vec<Value>, HubSpotError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/crm/v3/objects/{}/batch/read",
            self.config.base_url,
            object_type.resource_path()
        );

        let props: Vec<String> = match extra_properties {
            Some(list) => list.to_vec(),
            None => properties::default_properties(object_type)
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        };
        let inputs: Vec<Value> =
            ids.iter().take(BATCH_READ_LIMIT).map(|id| json!({ "id": id })).collect();

        let builder = self
            .authorized(self.http.request(Method::POST, &url))
            .json(&json!({ "properties": props, "inputs": inputs }));

        let response = self.send(builder).await?;
        let body = self.success_body(response).await?;

        Ok(body["results"].as_array().cloned().unwrap_or_default())
    }

    /// Fetch owner id → full name, cached for an hour
    ///
    /// A fetch failure yields an empty map with a warning rather than an
    /// error; failed lookups are not cached.
    #[instrument(skip(self))]
    pub async fn fetch_owners(&self) -> HashMap<String, String> {
        let result = self
            .owner_cache
            .try_get_with("owners".to_string(), async { self.fetch_owner_map().await })
            .await;

        match result {
            Ok(owners) => owners.as_ref().clone(),
            Err(err) => {
                warn!(error = %err, "failed to fetch owners, using empty map");
                HashMap::new()
            }
        }
    }

    async fn fetch_owner_map(&self) -> Result<OwnerMap, HubSpotError> {
        let url = format!("{}/crm/v3/owners", self.config.base_url);
        let builder = self.authorized(self.http.request(Method::GET, &url));

        let response = self.send(builder).await?;
        let body = self.success_body(response).await?;

        let owners: HashMap<String, String> = body["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .filter_map(|o| {
                        let id = o["id"].as_str()?;
                        let first = o["firstName"].as_str().unwrap_or_default();
                        let last = o["lastName"].as_str().unwrap_or_default();
                        Some((id.to_string(), format!("{first} {last}").trim().to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        debug!(count = owners.len(), "cached HubSpot owners");
        Ok(Arc::new(owners))
    }

    /// Endpoint for a job: resource path plus operation-specific suffix
    fn endpoint(&self, job: &SyncJob) -> Result<String, HubSpotError> {
        let base =
            format!("{}/crm/v3/objects/{}", self.config.base_url, job.object_type().resource_path());

        match job.operation {
            SyncOperation::Batch => {
                Ok(format!("{base}/batch/{}", job.batch_action.path_segment()))
            }
            SyncOperation::Search => Ok(format!("{base}/search")),
            SyncOperation::Update | SyncOperation::Delete => match &job.object_id {
                Some(id) => Ok(format!("{base}/{id}")),
                None => Err(HubSpotError::Config(format!(
                    "{} job is missing its target object id",
                    job.operation
                ))),
            },
            SyncOperation::Create | SyncOperation::Fetch => Ok(base),
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .header("Content-Type", "application/json")
    }

    /// Send a request and unconditionally refresh the rate tracker
    async fn send(&self, builder: RequestBuilder) -> Result<Response, HubSpotError> {
        let response = self.http.send(builder).await?;
        self.observe_rate_headers(response.headers());
        Ok(response)
    }

    async fn success_body(&self, response: Response) -> Result<Value, HubSpotError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(HubSpotError::Api { status: status.as_u16(), message: text });
        }
        response.json().await.map_err(|e| HubSpotError::Body(e.to_string()))
    }

    /// Missing or unparsable headers default to a generous remaining count so
    /// the queue is never falsely throttled.
    fn observe_rate_headers(&self, headers: &HeaderMap) {
        let remaining = header_u64(headers, RATE_LIMIT_REMAINING_HEADER)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(RATE_LIMIT_INITIAL_REMAINING);
        let window_ms = header_u64(headers, RATE_LIMIT_INTERVAL_HEADER)
            .unwrap_or(RATE_LIMIT_DEFAULT_WINDOW_MS);

        self.rate.lock().record_response(remaining, window_ms);
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

fn request_method(operation: SyncOperation) -> Method {
    match operation {
        SyncOperation::Create | SyncOperation::Search | SyncOperation::Batch => Method::POST,
        SyncOperation::Update => Method::PATCH,
        SyncOperation::Delete => Method::DELETE,
        SyncOperation::Fetch => Method::GET,
    }
}

/// Request body for a job: single record for create/update, `inputs` for
/// batch, default search request for search.
fn job_body(job: &SyncJob) -> Value {
    let records = job.payload.records_json();
    match job.operation {
        SyncOperation::Batch => {
            let inputs: Vec<Value> =
                records.into_iter().map(|r| json!({ "properties": r })).collect();
            json!({ "inputs": inputs })
        }
        SyncOperation::Search => serde_json::to_value(SearchRequest::for_type(job.object_type()))
            .unwrap_or_else(|_| json!({})),
        _ => {
            let properties = records.into_iter().next().unwrap_or_else(|| json!({}));
            json!({ "properties": properties })
        }
    }
}
