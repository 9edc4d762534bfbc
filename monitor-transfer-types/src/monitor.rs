//! Monitor summaries and details.

use serde::{Deserialize, Serialize};

use crate::N_A;

/// The user who created a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub login: Option<String>,
}

/// One row of a monitor search result.
///
/// Every field is optional on the wire; [`MonitorSummary::id_or_na`] and
/// friends give the inventory representation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub created_by: Option<Owner>,
}

impl MonitorSummary {
    /// Create a summary with all three fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            created_by: Some(Owner {
                login: Some(login.into()),
            }),
        }
    }

    pub fn id_or_na(&self) -> &str {
        self.id.as_deref().unwrap_or(N_A)
    }

    pub fn name_or_na(&self) -> &str {
        self.name.as_deref().unwrap_or(N_A)
    }

    /// Login of the creator, or the placeholder when unknown.
    pub fn owner_or_na(&self) -> &str {
        self.created_by
            .as_ref()
            .and_then(|owner| owner.login.as_deref())
            .unwrap_or(N_A)
    }
}

/// Full definition of a monitor as returned by the rules endpoint.
///
/// Opaque to the pipeline: it is only ever forwarded to the
/// convert-to-code endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonitorDetail(pub serde_json::Value);

impl MonitorDetail {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Body of the PATCH call that sets tags on a monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagPatch {
    pub tag_ids: Vec<String>,
}

impl TagPatch {
    pub fn single(tag_id: impl Into<String>) -> Self {
        Self {
            tag_ids: vec![tag_id.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_deserializes_platform_row() {
        let row: MonitorSummary = serde_json::from_str(
            r#"{"id": "m1", "name": "Freshness", "createdBy": {"login": "ada"}, "criticality": 2}"#,
        )
        .unwrap();

        assert_eq!(row, MonitorSummary::new("m1", "Freshness", "ada"));
    }

    #[test]
    fn test_summary_missing_fields_render_placeholder() {
        let row: MonitorSummary = serde_json::from_str(r#"{"createdBy": {}}"#).unwrap();

        assert_eq!(row.id_or_na(), "N/A");
        assert_eq!(row.name_or_na(), "N/A");
        assert_eq!(row.owner_or_na(), "N/A");
    }

    #[test]
    fn test_tag_patch_wire_format() {
        let body = serde_json::to_value(TagPatch::single("t-1")).unwrap();
        assert_eq!(body, serde_json::json!({ "tagIds": ["t-1"] }));
    }

    #[test]
    fn test_detail_is_transparent() {
        let raw = serde_json::json!({ "id": "m1", "ruleType": "FRESHNESS" });
        let detail: MonitorDetail = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&detail).unwrap(), raw);
        assert_eq!(detail.into_inner(), raw);
    }
}
