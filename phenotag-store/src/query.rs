//! The three request shapes the engine issues: match-all with projection,
//! identifier lookup, and interval overlap (flat or nested), plus a small
//! boolean filter form. [`Query::to_body`] renders the JSON search body
//! for HTTP backends; the in-memory backend interprets the enum directly.

use serde_json::{Value, json};

/// One boolean filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Term { field: String, value: String },
    RangeLt { field: String, value: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Every record, optionally projected to `sources`.
    MatchAll { sources: Vec<String> },

    /// Term lookup by one or more identifiers.
    Ids { ids: Vec<String>, sources: Vec<String> },

    /// Match-all filtered by a conjunction of clauses.
    Filtered { must: Vec<Clause>, sources: Vec<String> },

    /// Flat inclusive range overlap: `seqid_field == seqid` and
    /// `start_field <= end` and `end_field >= start`.
    RangeOverlap {
        seqid: String,
        start: u32,
        end: u32,
        seqid_field: String,
        start_field: String,
        end_field: String,
        sources: Vec<String>,
    },

    /// Overlap against an interval stored in a nested sub-record at
    /// `path` (build/seqid/start/end), expressed as the three-case union;
    /// optionally restricted by a disease term on the parent document.
    NestedOverlap {
        path: String,
        build: String,
        seqid: String,
        start: u32,
        end: u32,
        disease: Option<String>,
        sources: Vec<String>,
    },
}

impl Query {
    pub fn match_all() -> Self {
        Query::MatchAll { sources: vec![] }
    }

    pub fn sources(&self) -> &[String] {
        match self {
            Query::MatchAll { sources }
            | Query::Ids { sources, .. }
            | Query::Filtered { sources, .. }
            | Query::RangeOverlap { sources, .. }
            | Query::NestedOverlap { sources, .. } => sources,
        }
    }

    /// Render the JSON search body for this query.
    pub fn to_body(&self) -> Value {
        let mut body = json!({ "query": self.query_value() });
        let sources = self.sources();
        if !sources.is_empty() {
            body["_source"] = json!(sources);
        }
        body
    }

    fn query_value(&self) -> Value {
        match self {
            Query::MatchAll { .. } => json!({ "match_all": {} }),

            Query::Ids { ids, .. } => json!({ "ids": { "values": ids } }),

            Query::Filtered { must, .. } => {
                let clauses: Vec<Value> = must.iter().map(Self::clause_value).collect();
                json!({ "bool": { "must": clauses } })
            }

            Query::RangeOverlap {
                seqid,
                start,
                end,
                seqid_field,
                start_field,
                end_field,
                ..
            } => json!({
                "bool": {
                    "must": [
                        { "term": { (seqid_field.as_str()): seqid } },
                        { "range": { (start_field.as_str()): { "lte": end } } },
                        { "range": { (end_field.as_str()): { "gte": start } } }
                    ]
                }
            }),

            Query::NestedOverlap {
                path,
                build,
                seqid,
                start,
                end,
                disease,
                ..
            } => {
                let start_field = format!("{path}.start");
                let end_field = format!("{path}.end");
                // union of the three overlap cases, inclusive boundaries
                let overlap_cases = json!([
                    { "range": { (start_field.as_str()): { "gte": start, "lte": end } } },
                    { "range": { (end_field.as_str()): { "gte": start, "lte": end } } },
                    { "bool": { "must": [
                        { "range": { (start_field.as_str()): { "lte": start } } },
                        { "range": { (end_field.as_str()): { "gte": end } } }
                    ] } }
                ]);
                let nested = json!({
                    "nested": {
                        "path": path,
                        "query": {
                            "bool": {
                                "must": [
                                    { "term": { (format!("{path}.build")): build } },
                                    { "term": { (format!("{path}.seqid")): seqid } }
                                ],
                                "filter": {
                                    "bool": { "should": overlap_cases, "minimum_should_match": 1 }
                                }
                            }
                        }
                    }
                });
                match disease {
                    Some(code) => json!({
                        "bool": {
                            "must": [
                                { "term": { "disease": code.to_lowercase() } },
                                nested
                            ]
                        }
                    }),
                    None => nested,
                }
            }
        }
    }

    fn clause_value(clause: &Clause) -> Value {
        match clause {
            Clause::Term { field, value } => json!({ "term": { (field.as_str()): value } }),
            Clause::RangeLt { field, value } => json!({ "range": { (field.as_str()): { "lt": value } } }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_match_all_with_projection() {
        let query = Query::MatchAll {
            sources: vec!["genes".to_string(), "diseases".to_string()],
        };
        let body = query.to_body();
        assert_eq!(body["query"], json!({ "match_all": {} }));
        assert_eq!(body["_source"], json!(["genes", "diseases"]));

        let bare = Query::match_all().to_body();
        assert_eq!(bare.get("_source"), None);
    }

    #[test]
    fn test_range_overlap_is_inclusive() {
        let query = Query::RangeOverlap {
            seqid: "6".to_string(),
            start: 25_000_000,
            end: 35_000_000,
            seqid_field: "chromosome".to_string(),
            start_field: "start".to_string(),
            end_field: "stop".to_string(),
            sources: vec![],
        };
        let body = query.to_body().to_string();
        assert!(body.contains("range"));
        assert!(body.contains("\"lte\":35000000"));
        assert!(body.contains("\"gte\":25000000"));
    }

    #[test]
    fn test_nested_overlap_shapes() {
        let query = Query::NestedOverlap {
            path: "build_info".to_string(),
            build: "38".to_string(),
            seqid: "1".to_string(),
            start: 206767602,
            end: 206772494,
            disease: None,
            sources: vec![],
        };
        let body = query.to_body();
        assert_eq!(body["query"]["nested"]["path"], json!("build_info"));
        let filter = &body["query"]["nested"]["query"]["bool"]["filter"]["bool"];
        assert_eq!(filter["should"].as_array().unwrap().len(), 3);

        let filtered = Query::NestedOverlap {
            path: "build_info".to_string(),
            build: "38".to_string(),
            seqid: "1".to_string(),
            start: 1,
            end: 2,
            disease: Some("T1D".to_string()),
            sources: vec![],
        };
        let body = filtered.to_body();
        assert_eq!(body["query"]["bool"]["must"][0]["term"]["disease"], json!("t1d"));
    }

    #[test]
    fn test_filtered_clauses() {
        let query = Query::Filtered {
            must: vec![
                Clause::RangeLt { field: "tier".to_string(), value: 3 },
                Clause::Term { field: "marker".to_string(), value: "rs2269368".to_string() },
            ],
            sources: vec!["disease".to_string()],
        };
        let body = query.to_body();
        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);
        assert_eq!(must[0]["range"]["tier"]["lt"], json!(3));
        assert_eq!(must[1]["term"]["marker"], json!("rs2269368"));
    }
}
