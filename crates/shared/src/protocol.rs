use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{CategoryKey, GalleryItem, ItemId},
    error::ProtocolError,
};

pub fn count_route() -> &'static str {
    "count"
}

/// Item lists are served from the service root, filtered by `?type=`.
pub fn items_route() -> &'static str {
    ""
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemsQuery {
    #[serde(rename = "type")]
    pub category: CategoryKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtRecord {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "imgUrl", default)]
    pub img_url: String,
    #[serde(default)]
    pub title: String,
}

impl TryFrom<ArtRecord> for GalleryItem {
    type Error = ProtocolError;

    fn try_from(record: ArtRecord) -> Result<Self, Self::Error> {
        if record.id.trim().is_empty() {
            return Err(ProtocolError::MissingField { field: "_id" });
        }
        if record.img_url.trim().is_empty() {
            return Err(ProtocolError::MissingField { field: "imgUrl" });
        }
        Ok(GalleryItem {
            id: ItemId(record.id),
            image_url: record.img_url,
            title: record.title,
        })
    }
}

/// Converts a category response into items, keeping server order and
/// rejecting lists whose ids are not unique.
pub fn items_from_records(records: Vec<ArtRecord>) -> Result<Vec<GalleryItem>, ProtocolError> {
    let mut seen = HashSet::with_capacity(records.len());
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let item = GalleryItem::try_from(record)?;
        if !seen.insert(item.id.clone()) {
            return Err(ProtocolError::DuplicateId { id: item.id.0 });
        }
        items.push(item);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_service_record_field_names() {
        let raw = r#"[
            {"_id": "a1", "imgUrl": "http://img/a1.png", "title": "Dawn", "__v": 0},
            {"_id": "a2", "imgUrl": "http://img/a2.png"}
        ]"#;
        let records: Vec<ArtRecord> = serde_json::from_str(raw).expect("decode");
        let items = items_from_records(records).expect("items");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, ItemId::from("a1"));
        assert_eq!(items[0].image_url, "http://img/a1.png");
        assert_eq!(items[0].title, "Dawn");
        assert_eq!(items[1].title, "");
    }

    #[test]
    fn rejects_record_without_image_url() {
        let records = vec![ArtRecord {
            id: "a1".into(),
            img_url: " ".into(),
            title: "Dawn".into(),
        }];
        let err = items_from_records(records).expect_err("should fail");
        assert_eq!(err, ProtocolError::MissingField { field: "imgUrl" });
    }

    #[test]
    fn rejects_duplicate_ids_within_a_list() {
        let record = ArtRecord {
            id: "same".into(),
            img_url: "http://img/x.png".into(),
            title: String::new(),
        };
        let err = items_from_records(vec![record.clone(), record]).expect_err("should fail");
        assert!(matches!(err, ProtocolError::DuplicateId { id } if id == "same"));
    }

    #[test]
    fn items_query_uses_type_parameter_name() {
        let query = ItemsQuery {
            category: CategoryKey::from("wonderSelf"),
        };
        let json = serde_json::to_value(&query).expect("encode");
        assert_eq!(json, serde_json::json!({ "type": "wonderSelf" }));
    }
}
