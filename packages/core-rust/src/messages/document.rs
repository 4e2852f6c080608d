//! Single-document and batched document payloads: index, update, delete,
//! get, multi-get and bulk.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionRequest;
use crate::validation::{require, ValidationError};

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Whether an index request may overwrite an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpType {
    /// Create or replace.
    #[default]
    Index,
    /// Fail if a document with the same id already exists.
    Create,
}

/// Index (create or replace) a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub index: String,
    /// Document id. `None` lets the handler generate one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub source: Value,
    #[serde(default)]
    pub op_type: OpType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<String>,
    /// Make the change visible to search before responding.
    #[serde(default)]
    pub refresh: bool,
    /// Expected current version for optimistic concurrency control.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl IndexRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, source: Value) -> Self {
        Self {
            index: index.into(),
            id: None,
            source,
            op_type: OpType::Index,
            routing: None,
            refresh: false,
            version: None,
            timeout_ms: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_op_type(mut self, op_type: OpType) -> Self {
        self.op_type = op_type;
        self
    }
}

impl ActionRequest for IndexRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        if self.source.is_null() {
            errors.add("source is missing");
        }
        if self.version == Some(0) {
            errors.add("version must be positive when set");
        }
        if self.op_type == OpType::Create && self.version.is_some() {
            errors.add("create operations do not support explicit versions");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResponse {
    pub index: String,
    pub id: String,
    pub version: u64,
    /// `false` when an existing document was replaced.
    pub created: bool,
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// Partially update a document through a script or a partial document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub index: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub doc: Option<Value>,
    /// Document to insert when none exists yet.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub upsert: Option<Value>,
    #[serde(default)]
    pub retry_on_conflict: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl UpdateRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            script: None,
            doc: None,
            upsert: None,
            retry_on_conflict: 0,
            timeout_ms: None,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: Value) -> Self {
        self.doc = Some(doc);
        self
    }

    #[must_use]
    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }
}

impl ActionRequest for UpdateRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        require(&mut errors, "id", &self.id);
        if self.script.is_none() && self.doc.is_none() {
            errors.add("script or doc is missing");
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub index: String,
    pub id: String,
    pub version: u64,
    /// `true` when the upsert document was inserted.
    pub created: bool,
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub index: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl DeleteRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            routing: None,
            version: None,
            timeout_ms: None,
        }
    }
}

impl ActionRequest for DeleteRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        require(&mut errors, "id", &self.id);
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub index: String,
    pub id: String,
    pub version: u64,
    /// `false` when there was nothing to delete.
    pub found: bool,
}

// ---------------------------------------------------------------------------
// Get / multi-get
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRequest {
    pub index: String,
    pub id: String,
    /// Restrict the returned source to these fields. Empty means all.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub routing: Option<String>,
    /// Read the latest version even if not yet refreshed.
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

fn default_realtime() -> bool {
    true
}

impl GetRequest {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            fields: Vec::new(),
            routing: None,
            realtime: true,
        }
    }
}

impl ActionRequest for GetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        require(&mut errors, "index", &self.index);
        require(&mut errors, "id", &self.id);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResponse {
    pub index: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub version: Option<u64>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGetItem {
    pub index: String,
    pub id: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl MultiGetItem {
    #[must_use]
    pub fn new(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGetRequest {
    pub items: Vec<MultiGetItem>,
    #[serde(default = "default_realtime")]
    pub realtime: bool,
}

impl MultiGetRequest {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            realtime: true,
        }
    }

    #[must_use]
    pub fn add(mut self, index: impl Into<String>, id: impl Into<String>) -> Self {
        self.items.push(MultiGetItem::new(index, id));
        self
    }
}

impl ActionRequest for MultiGetRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.items.is_empty() {
            errors.add("no documents to get");
        }
        for (position, item) in self.items.iter().enumerate() {
            let mut item_errors = ValidationError::new();
            require(&mut item_errors, "index", &item.index);
            require(&mut item_errors, "id", &item.id);
            errors.extend_prefixed(&format!("item {position}: "), item_errors);
        }
        errors.into_result()
    }
}

/// One slot of a multi-get response, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum MultiGetItemResponse {
    Found(GetResponse),
    Failed {
        index: String,
        id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiGetResponse {
    pub items: Vec<MultiGetItemResponse>,
}

// ---------------------------------------------------------------------------
// Bulk
// ---------------------------------------------------------------------------

/// One operation inside a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "op")]
pub enum BulkItem {
    Index(IndexRequest),
    Update(UpdateRequest),
    Delete(DeleteRequest),
}

impl BulkItem {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            BulkItem::Index(request) => request.validate(),
            BulkItem::Update(request) => request.validate(),
            BulkItem::Delete(request) => request.validate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkRequest {
    pub items: Vec<BulkItem>,
    #[serde(default)]
    pub refresh: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timeout_ms: Option<u64>,
}

impl BulkRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add(mut self, item: BulkItem) -> Self {
        self.items.push(item);
        self
    }
}

impl ActionRequest for BulkRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.items.is_empty() {
            errors.add("no requests added");
        }
        for (position, item) in self.items.iter().enumerate() {
            if let Err(item_errors) = item.validate() {
                errors.extend_prefixed(&format!("item {position}: "), item_errors);
            }
        }
        errors.into_result()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Outcome of one bulk item, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResponse {
    pub index: String,
    pub id: String,
    pub version: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResponse {
    pub items: Vec<BulkItemResponse>,
    pub took_ms: u64,
}

impl BulkResponse {
    /// `true` if any item failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.items.iter().any(|item| item.failure.is_some())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn index_requires_index_and_source() {
        let err = IndexRequest::new("", Value::Null).validate().unwrap_err();
        assert_eq!(err.errors(), ["index is missing", "source is missing"]);
    }

    #[test]
    fn create_rejects_explicit_version() {
        let mut request = IndexRequest::new("users", json!({"name": "a"}))
            .with_op_type(OpType::Create);
        request.version = Some(3);
        let err = request.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            ["create operations do not support explicit versions"]
        );
    }

    #[test]
    fn update_requires_script_or_doc() {
        let err = UpdateRequest::new("users", "1").validate().unwrap_err();
        assert_eq!(err.errors(), ["script or doc is missing"]);

        assert!(UpdateRequest::new("users", "1")
            .with_doc(json!({"age": 3}))
            .validate()
            .is_ok());
    }

    #[test]
    fn multi_get_reports_each_bad_item() {
        let request = MultiGetRequest::new().add("users", "1").add("", "2").add("users", "");
        let err = request.validate().unwrap_err();
        assert_eq!(
            err.errors(),
            ["item 1: index is missing", "item 2: id is missing"]
        );
    }

    #[test]
    fn empty_bulk_is_invalid() {
        let err = BulkRequest::new().validate().unwrap_err();
        assert_eq!(err.errors(), ["no requests added"]);
    }

    #[test]
    fn bulk_prefixes_item_errors() {
        let request = BulkRequest::new()
            .add(BulkItem::Delete(DeleteRequest::new("users", "1")))
            .add(BulkItem::Update(UpdateRequest::new("users", "2")));
        let err = request.validate().unwrap_err();
        assert_eq!(err.errors(), ["item 1: script or doc is missing"]);
    }

    #[test]
    fn bulk_response_detects_failures() {
        let mut response = BulkResponse::default();
        response.items.push(BulkItemResponse {
            index: "users".to_string(),
            id: "1".to_string(),
            version: 1,
            failure: None,
        });
        assert!(!response.has_failures());
        response.items[0].failure = Some("version conflict".to_string());
        assert!(response.has_failures());
    }

    #[test]
    fn index_request_timeout_is_millis() {
        let mut request = IndexRequest::new("users", json!({}));
        assert_eq!(request.timeout(), None);
        request.timeout_ms = Some(250);
        assert_eq!(request.timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn bulk_item_serializes_with_op_tag() {
        let item = BulkItem::Delete(DeleteRequest::new("users", "1"));
        let encoded = serde_json::to_value(&item).unwrap();
        assert_eq!(encoded["op"], "delete");
        assert_eq!(encoded["index"], "users");
    }

    proptest! {
        #[test]
        fn get_with_non_blank_keys_validates(
            index in "[a-z][a-z0-9_]{0,15}",
            id in "[A-Za-z0-9]{1,20}",
        ) {
            prop_assert!(GetRequest::new(index, id).validate().is_ok());
        }

        #[test]
        fn delete_with_blank_id_fails(index in "[a-z]{1,10}", blanks in " {0,4}") {
            let err = DeleteRequest::new(index, blanks).validate().unwrap_err();
            prop_assert_eq!(err.errors(), ["id is missing"]);
        }
    }
}
