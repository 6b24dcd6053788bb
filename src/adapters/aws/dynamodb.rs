use crate::domain::video::VideoRecord;
use crate::ports::catalog::VideoCatalog;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

type Item = HashMap<String, AttributeValue>;

/// DynamoCatalog implements VideoCatalog for a DynamoDB table keyed by `id`.
#[derive(Clone)]
pub struct DynamoCatalog {
    client: Client,
    table_name: String,
}

impl DynamoCatalog {
    pub fn new(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }
}

fn string_attr<'a>(item: &'a Item, name: &str) -> Result<&'a str, Box<dyn Error + Send + Sync>> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| format!("catalog item missing string attribute `{}`", name).into())
}

fn optional_attr(item: &Item, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn time_attr(item: &Item, name: &str) -> Result<DateTime<Utc>, Box<dyn Error + Send + Sync>> {
    Ok(DateTime::parse_from_rfc3339(string_attr(item, name)?)?.with_timezone(&Utc))
}

pub(crate) fn record_from_item(item: &Item) -> Result<VideoRecord, Box<dyn Error + Send + Sync>> {
    Ok(VideoRecord {
        id: Uuid::parse_str(string_attr(item, "id")?)?,
        created_at: time_attr(item, "created_at")?,
        updated_at: time_attr(item, "updated_at")?,
        thumbnail_url: optional_attr(item, "thumbnail_url"),
        video_url: optional_attr(item, "video_url"),
        title: optional_attr(item, "title").unwrap_or_default(),
        description: optional_attr(item, "description").unwrap_or_default(),
        user_id: Uuid::parse_str(string_attr(item, "user_id")?)?,
    })
}

/// `SET` expression for the URL fields that are present, plus `updated_at`.
pub(crate) fn url_update(video: &VideoRecord, now: DateTime<Utc>) -> (String, Item) {
    let mut sets = vec!["updated_at = :updated_at".to_string()];
    let mut values = Item::new();
    values.insert(
        ":updated_at".to_string(),
        AttributeValue::S(now.to_rfc3339()),
    );

    for (field, value) in [
        ("thumbnail_url", &video.thumbnail_url),
        ("video_url", &video.video_url),
    ] {
        if let Some(url) = value {
            sets.push(format!("{field} = :{field}"));
            values.insert(format!(":{field}"), AttributeValue::S(url.clone()));
        }
    }

    (format!("SET {}", sets.join(", ")), values)
}

#[async_trait]
impl VideoCatalog for DynamoCatalog {
    async fn get_video(
        &self,
        video_id: Uuid,
    ) -> Result<Option<VideoRecord>, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(video_id.to_string()))
            .send()
            .await?;

        match resp.item {
            Some(item) => Ok(Some(record_from_item(&item)?)),
            None => Ok(None),
        }
    }

    async fn update_video(&self, video: &VideoRecord) -> Result<(), Box<dyn Error + Send + Sync>> {
        let (expression, values) = url_update(video, Utc::now());

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(video.id.to_string()))
            .update_expression(expression)
            .set_expression_attribute_values(Some(values))
            .condition_expression("attribute_exists(id)")
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(pairs: &[(&str, &str)]) -> Item {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), AttributeValue::S(v.to_string())))
            .collect()
    }

    #[test]
    fn test_record_from_item() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let (id_s, owner_s) = (id.to_string(), owner.to_string());
        let item = item(&[
            ("id", id_s.as_str()),
            ("user_id", owner_s.as_str()),
            ("title", "Boots"),
            ("created_at", "2024-05-01T10:00:00Z"),
            ("updated_at", "2024-05-01T10:00:00+00:00"),
            ("video_url", "https://cdn.example/landscape/a.mp4"),
        ]);

        let record = record_from_item(&item).unwrap();
        assert_eq!(record.id, id);
        assert_eq!(record.user_id, owner);
        assert_eq!(record.title, "Boots");
        assert_eq!(record.description, "");
        assert_eq!(record.thumbnail_url, None);
        assert_eq!(
            record.video_url.as_deref(),
            Some("https://cdn.example/landscape/a.mp4")
        );
    }

    #[test]
    fn test_record_from_item_missing_owner() {
        let id_s = Uuid::new_v4().to_string();
        let item = item(&[
            ("id", id_s.as_str()),
            ("created_at", "2024-05-01T10:00:00Z"),
            ("updated_at", "2024-05-01T10:00:00Z"),
        ]);
        assert!(record_from_item(&item).is_err());
    }

    #[test]
    fn test_url_update_sets_present_fields_only() {
        let now = Utc::now();
        let video = VideoRecord {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            thumbnail_url: None,
            video_url: Some("https://b.s3.us-east-1.amazonaws.com/portrait/x.mp4".to_string()),
            title: String::new(),
            description: String::new(),
            user_id: Uuid::new_v4(),
        };

        let (expression, values) = url_update(&video, now);
        assert_eq!(
            expression,
            "SET updated_at = :updated_at, video_url = :video_url"
        );
        assert_eq!(values.len(), 2);
        assert!(!values.contains_key(":thumbnail_url"));
    }
}
