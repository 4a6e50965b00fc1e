//! HTTP backend for a search cluster speaking the index/_search dialect.

use log::{debug, info, warn};
use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::backend::{DatasetRef, Page, StoreBackend};
use crate::document::Document;
use crate::errors::StoreError;
use crate::query::Query;
use crate::schema::SchemaProperties;

/// How long the server keeps a scroll context alive between pages.
const SCROLL_KEEPALIVE: &str = "1m";

/// Result cap applied when a caller asks for an unbounded search.
const UNBOUNDED_SIZE: usize = 10_000;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Self {
        HttpBackend {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn search_url(&self, dataset: &DatasetRef) -> String {
        match &dataset.doc_type {
            Some(doc_type) => format!("{}/{}/{}/_search", self.base_url, dataset.index, doc_type),
            None => format!("{}/{}/_search", self.base_url, dataset.index),
        }
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<Value, StoreError> {
        debug!("POST {url}");
        let response = self.client.post(url).json(body).send()?;
        Self::into_json(response)
    }

    fn into_json(response: reqwest::blocking::Response) -> Result<Value, StoreError> {
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(response.json()?)
    }

    fn parse_hits(body: &Value) -> Result<Vec<Document>, StoreError> {
        let hits = body["hits"]["hits"]
            .as_array()
            .ok_or_else(|| StoreError::MalformedResponse("no hits array in response".to_string()))?;

        let mut docs = Vec::with_capacity(hits.len());
        for hit in hits {
            let id = hit["_id"].as_str().ok_or_else(|| {
                StoreError::MalformedResponse("hit without an _id".to_string())
            })?;
            let source = hit.get("_source").cloned().unwrap_or(Value::Null);
            docs.push(Document::new(id, source));
        }
        Ok(docs)
    }
}

impl StoreBackend for HttpBackend {
    fn search(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        size: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let mut body = query.to_body();
        body["size"] = json!(if size == 0 { UNBOUNDED_SIZE } else { size });
        let response = self.post_json(&self.search_url(dataset), &body)?;
        let docs = Self::parse_hits(&response)?;
        if size == 0 && docs.len() >= UNBOUNDED_SIZE {
            warn!(
                "unbounded search on {dataset} hit the {UNBOUNDED_SIZE}-hit cap; results may be truncated"
            );
        }
        Ok(docs)
    }

    fn scroll(
        &self,
        dataset: &DatasetRef,
        query: &Query,
        page_size: usize,
        token: Option<&str>,
    ) -> Result<Page, StoreError> {
        let response = match token {
            None => {
                let mut body = query.to_body();
                body["size"] = json!(page_size);
                let url = format!("{}?scroll={}", self.search_url(dataset), SCROLL_KEEPALIVE);
                self.post_json(&url, &body)?
            }
            Some(token) => {
                let url = format!("{}/_search/scroll", self.base_url);
                let body = json!({ "scroll": SCROLL_KEEPALIVE, "scroll_id": token });
                self.post_json(&url, &body)?
            }
        };

        let docs = Self::parse_hits(&response)?;
        let token = response["_scroll_id"].as_str().map(str::to_string);
        Ok(Page { docs, token })
    }

    fn ensure_schema(
        &self,
        destination: &DatasetRef,
        rule: &str,
        schema: &SchemaProperties,
    ) -> Result<(), StoreError> {
        info!("ensuring schema for {destination}/{rule}");
        let url = format!("{}/{}/_mapping/{}", self.base_url, destination.index, rule);
        let response = self.client.put(&url).json(&schema.to_mapping()).send()?;
        Self::into_json(response)?;
        Ok(())
    }

    fn bulk_write(
        &self,
        destination: &DatasetRef,
        rule: &str,
        body: &str,
        docs: usize,
    ) -> Result<(), StoreError> {
        debug!("bulk writing {docs} docs to {destination}/{rule}");
        let url = format!("{}/_bulk", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-ndjson")
            .body(body.to_string())
            .send()?;
        let parsed = Self::into_json(response)?;
        if parsed["errors"].as_bool().unwrap_or(false) {
            return Err(StoreError::MalformedResponse(format!(
                "bulk write to {destination}/{rule} reported item errors"
            )));
        }
        Ok(())
    }
}
