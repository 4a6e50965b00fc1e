use serde_json::{Map, Value, json};

use phenotag_core::DiseaseRegistry;

///
/// The destination schema for one (destination, rule) pair.
///
/// Carries `score`, `disease_tags` and `qid` plus one sub-structure per
/// enabled disease code holding repeated evidence entries, and the rule's
/// human-readable description as metadata.
///
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperties {
    properties: Map<String, Value>,
    description: String,
}

impl SchemaProperties {
    pub fn for_criteria(diseases: &DiseaseRegistry, description: &str) -> Self {
        let mut properties = Map::new();
        properties.insert("score".to_string(), json!({ "type": "integer" }));
        properties.insert("disease_tags".to_string(), json!({ "type": "keyword" }));
        properties.insert("qid".to_string(), json!({ "type": "keyword" }));

        let evidence_props = json!({
            "properties": {
                "fid": { "type": "keyword" },
                "fname": { "type": "keyword" },
                "fnotes": {
                    "properties": {
                        "linkid": { "type": "keyword" },
                        "linkname": { "type": "keyword" },
                        "linkdata": { "type": "keyword" },
                        "linkvalue": { "type": "keyword" }
                    }
                }
            }
        });
        for disease in diseases.all() {
            properties.insert(disease.to_string(), evidence_props.clone());
        }

        SchemaProperties {
            properties,
            description: description.to_string(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn property_keys(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// The full mapping body for the store.
    pub fn to_mapping(&self) -> Value {
        json!({
            "_meta": { "description": self.description },
            "properties": self.properties
        })
    }
}
