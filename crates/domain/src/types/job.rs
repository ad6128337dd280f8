//! Sync job types
//!
//! A [`SyncJob`] is one unit of outbound CRM work: one operation against one
//! HubSpot object. Payloads are a tagged union keyed by object type so that a
//! malformed payload is rejected at compile time rather than by a 4xx from the
//! provider.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outbound CRM operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
    Fetch,
    Search,
    Batch,
}

impl SyncOperation {
    /// HTTP method used for this operation
    pub fn http_method(self) -> &'static str {
        match self {
            Self::Create | Self::Search | Self::Batch => "POST",
            Self::Update => "PATCH",
            Self::Delete => "DELETE",
            Self::Fetch => "GET",
        }
    }

    /// Whether the request carries a JSON body
    pub fn has_body(self) -> bool {
        !matches!(self, Self::Fetch | Self::Delete)
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Fetch => "fetch",
            Self::Search => "search",
            Self::Batch => "batch",
        };
        write!(f, "{s}")
    }
}

/// Sub-resource for batch endpoints (`/batch/{action}`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    #[default]
    Create,
    Update,
    Archive,
    Read,
}

impl BatchAction {
    /// URL path segment for this action
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Archive => "archive",
            Self::Read => "read",
        }
    }
}

/// CRM object kind, determines the REST resource path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    Contact,
    Deal,
    Company,
    Engagement,
}

impl ObjectType {
    /// Plural resource segment under `/crm/v3/objects/`
    pub fn resource_path(self) -> &'static str {
        match self {
            Self::Contact => "contacts",
            Self::Deal => "deals",
            Self::Company => "companies",
            Self::Engagement => "engagements",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Contact => "contact",
            Self::Deal => "deal",
            Self::Company => "company",
            Self::Engagement => "engagement",
        };
        write!(f, "{s}")
    }
}

/// Well-known contact properties plus a custom-property escape hatch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifecyclestage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubspot_owner_id: Option<String>,
    /// Long tail of account-specific custom properties
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

/// Well-known deal properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DealProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealstage: Option<String>,
    /// HubSpot represents amounts as strings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closedate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubspot_owner_id: Option<String>,
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

/// Well-known company properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

/// Call/engagement properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngagementProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_call_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_call_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_call_duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_call_direction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hs_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hubspot_owner_id: Option<String>,
    #[serde(flatten)]
    pub custom: BTreeMap<String, String>,
}

/// Typed request payload, keyed by the CRM object it targets
///
/// Single-object operations (create/update) use the first record; batch
/// operations serialize every record as one `inputs` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "object_type", content = "records", rename_all = "snake_case")]
pub enum JobPayload {
    Contact(Vec<ContactProperties>),
    Deal(Vec<DealProperties>),
    Company(Vec<CompanyProperties>),
    Engagement(Vec<EngagementProperties>),
}

impl JobPayload {
    /// Payload wrapping a single contact record
    pub fn contact(properties: ContactProperties) -> Self {
        Self::Contact(vec![properties])
    }

    /// Payload wrapping a single deal record
    pub fn deal(properties: DealProperties) -> Self {
        Self::Deal(vec![properties])
    }

    /// Payload wrapping a single company record
    pub fn company(properties: CompanyProperties) -> Self {
        Self::Company(vec![properties])
    }

    /// Payload wrapping a single engagement record
    pub fn engagement(properties: EngagementProperties) -> Self {
        Self::Engagement(vec![properties])
    }

    /// The CRM object type this payload targets
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Contact(_) => ObjectType::Contact,
            Self::Deal(_) => ObjectType::Deal,
            Self::Company(_) => ObjectType::Company,
            Self::Engagement(_) => ObjectType::Engagement,
        }
    }

    /// Number of records in the payload
    pub fn record_count(&self) -> usize {
        match self {
            Self::Contact(records) => records.len(),
            Self::Deal(records) => records.len(),
            Self::Company(records) => records.len(),
            Self::Engagement(records) => records.len(),
        }
    }

    /// Serialize every record to a JSON property map
    ///
    /// Records that fail to serialize degrade to an empty object; property
    /// structs are plain string maps so this does not happen in practice.
    pub fn records_json(&self) -> Vec<serde_json::Value> {
        fn to_values<T: Serialize>(records: &[T]) -> Vec<serde_json::Value> {
            records
                .iter()
                .map(|r| {
                    serde_json::to_value(r)
                        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::default()))
                })
                .collect()
        }

        match self {
            Self::Contact(records) => to_values(records),
            Self::Deal(records) => to_values(records),
            Self::Company(records) => to_values(records),
            Self::Engagement(records) => to_values(records),
        }
    }
}

/// One unit of outbound sync work
///
/// Jobs are owned exclusively by the queue once enqueued and are never
/// mutated in place; a retry is a clone with `attempt` incremented. The
/// `job_id` is assigned at enqueue time and preserved across retries so a
/// failure row stays traceable to its original job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncJob {
    pub job_id: Uuid,
    pub operation: SyncOperation,
    pub payload: JobPayload,
    /// REST target id, required for update/delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub batch_action: BatchAction,
    /// Retry counter; 0 on first attempt
    #[serde(default)]
    pub attempt: u32,
}

impl SyncJob {
    /// Build a fresh job with a new id and a zeroed attempt counter
    pub fn new(operation: SyncOperation, payload: JobPayload) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            operation,
            payload,
            object_id: None,
            batch_action: BatchAction::default(),
            attempt: 0,
        }
    }

    /// Set the REST target id (update/delete)
    #[must_use]
    pub fn with_object_id(mut self, id: impl Into<String>) -> Self {
        self.object_id = Some(id.into());
        self
    }

    /// Set the batch sub-action
    #[must_use]
    pub fn with_batch_action(mut self, action: BatchAction) -> Self {
        self.batch_action = action;
        self
    }

    /// Clone for the next attempt, keeping the original job id
    #[must_use]
    pub fn next_attempt(&self) -> Self {
        let mut job = self.clone();
        job.attempt += 1;
        job
    }

    /// The CRM object type this job targets
    pub fn object_type(&self) -> ObjectType {
        self.payload.object_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_method_mapping() {
        assert_eq!(SyncOperation::Create.http_method(), "POST");
        assert_eq!(SyncOperation::Update.http_method(), "PATCH");
        assert_eq!(SyncOperation::Delete.http_method(), "DELETE");
        assert_eq!(SyncOperation::Fetch.http_method(), "GET");
        assert_eq!(SyncOperation::Search.http_method(), "POST");
        assert_eq!(SyncOperation::Batch.http_method(), "POST");
    }

    #[test]
    fn fetch_and_delete_have_no_body() {
        assert!(!SyncOperation::Fetch.has_body());
        assert!(!SyncOperation::Delete.has_body());
        assert!(SyncOperation::Create.has_body());
        assert!(SyncOperation::Update.has_body());
    }

    #[test]
    fn next_attempt_preserves_job_id() {
        let job = SyncJob::new(SyncOperation::Create, JobPayload::contact(ContactProperties::default()));
        let retry = job.next_attempt();

        assert_eq!(retry.job_id, job.job_id);
        assert_eq!(retry.attempt, 1);
        assert_eq!(job.attempt, 0);
    }

    #[test]
    fn payload_serializes_with_object_type_tag() {
        let payload = JobPayload::deal(DealProperties {
            dealname: Some("Spring package".to_string()),
            ..DealProperties::default()
        });

        let value = serde_json::to_value(&payload).expect("payload serializes");
        assert_eq!(value["object_type"], "deal");
        assert_eq!(value["records"][0]["dealname"], "Spring package");
    }

    #[test]
    fn properties_skip_absent_fields() {
        let props = ContactProperties {
            email: Some("lead@example.com".to_string()),
            ..ContactProperties::default()
        };

        let value = serde_json::to_value(&props).expect("properties serialize");
        let map = value.as_object().expect("object");
        assert_eq!(map.len(), 1);
        assert_eq!(map["email"], "lead@example.com");
    }

    #[test]
    fn custom_properties_flatten_into_record() {
        let mut props = ContactProperties::default();
        props.custom.insert("assigned_coach".to_string(), "coach-7".to_string());

        let value = serde_json::to_value(&props).expect("properties serialize");
        assert_eq!(value["assigned_coach"], "coach-7");
    }
}
