use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Core types for the family tree LCA resolver

/// One entry of a `getAncestors` response: a person and their two parent ids.
///
/// `id` and `name` both identify the same person upstream. The graph is keyed
/// by `name`; parent references arrive as ids and are resolved per list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorRecord {
    #[serde(rename = "Id", deserialize_with = "deserialize_required_id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Father", default, deserialize_with = "deserialize_parent_id")]
    pub father: Option<String>,
    #[serde(rename = "Mother", default, deserialize_with = "deserialize_parent_id")]
    pub mother: Option<String>,
}

impl AncestorRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            father: None,
            mother: None,
        }
    }

    pub fn with_father(mut self, father_id: impl Into<String>) -> Self {
        self.father = Some(father_id.into());
        self
    }

    pub fn with_mother(mut self, mother_id: impl Into<String>) -> Self {
        self.mother = Some(mother_id.into());
        self
    }

    /// Father then mother, skipping unknown parents
    pub fn parent_ids(&self) -> impl Iterator<Item = &str> {
        self.father.iter().chain(self.mother.iter()).map(String::as_str)
    }
}

/// Envelope returned by the `getAncestors` action, one per requested key
#[derive(Debug, Clone, Deserialize)]
pub struct AncestorsResponse {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub ancestors: Option<Vec<AncestorRecord>>,
}

/// Ancestor lists for the two queried individuals, as handed over by a fetch
/// collaborator. A `None` list means the fetch failed.
#[derive(Debug, Clone)]
pub struct AncestorLists {
    pub first: String,
    pub second: String,
    pub first_records: Option<Vec<AncestorRecord>>,
    pub second_records: Option<Vec<AncestorRecord>>,
}

/// Winning candidate of the LCA selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcaMatch {
    pub ancestor: String,
    pub depth: usize,
    pub candidates: usize,
}

/// Result of one resolved query, consumed by the report and render collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LcaOutcome {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub first: String,
    pub second: String,
    pub first_root: Option<String>,
    pub second_root: Option<String>,
    pub lca: Option<LcaMatch>,
    pub generations_first: Option<usize>,
    pub generations_second: Option<usize>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl LcaOutcome {
    pub fn ancestor(&self) -> Option<&str> {
        self.lca.as_ref().map(|m| m.ancestor.as_str())
    }
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            let id = n.to_string();
            (id != "0").then_some(id)
        }
        Value::String(s) => {
            let s = s.trim().to_string();
            (!s.is_empty() && s != "0").then_some(s)
        }
        _ => None,
    }
}

fn deserialize_parent_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(id_from_value(value))
}

fn deserialize_required_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("record id must be a non-zero number or string"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_wikitree_json() {
        let json = r#"{"Id": 32, "Name": "Windsor-1", "Father": 56, "Mother": 0, "IsLiving": 0}"#;
        let record: AncestorRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, "32");
        assert_eq!(record.name, "Windsor-1");
        assert_eq!(record.father.as_deref(), Some("56"));
        assert_eq!(record.mother, None);
    }

    #[test]
    fn test_missing_parent_fields_are_absent() {
        let json = r#"{"Id": "7", "Name": "Doe-7"}"#;
        let record: AncestorRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.father, None);
        assert_eq!(record.mother, None);
        assert_eq!(record.parent_ids().count(), 0);
    }

    #[test]
    fn test_null_and_empty_parents() {
        let json = r#"{"Id": 9, "Name": "Doe-9", "Father": null, "Mother": ""}"#;
        let record: AncestorRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.father, None);
        assert_eq!(record.mother, None);
    }

    #[test]
    fn test_zero_id_is_rejected() {
        let json = r#"{"Id": 0, "Name": "Doe-0"}"#;
        assert!(serde_json::from_str::<AncestorRecord>(json).is_err());
    }

    #[test]
    fn test_response_envelope() {
        let json = r#"[{"user_name": "Doe-1", "status": 0, "ancestors": [
            {"Id": 1, "Name": "Doe-1", "Father": 2, "Mother": 3},
            {"Id": 2, "Name": "Doe-2"}
        ]}]"#;
        let response: Vec<AncestorsResponse> = serde_json::from_str(json).unwrap();

        let ancestors = response[0].ancestors.as_ref().unwrap();
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[0].parent_ids().collect::<Vec<_>>(), vec!["2", "3"]);
    }
}
