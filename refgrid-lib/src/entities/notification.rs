//! Notifications table.

use chrono::SecondsFormat;
use chrono::Utc;
use serde_json::json;

use super::probe;
use super::probe_truthy;
use crate::model::ColumnDescriptor;
use crate::model::Endpoints;
use crate::model::Entity;
use crate::model::Row;
use crate::model::TableId;
use crate::model::Value;

/// System notification records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Notifications;

impl Entity for Notifications {
    const TABLE: TableId = TableId::Notifications;
    const TITLE: &'static str = "Notifications";
    const ID_FIELD: &'static str = "id";

    fn endpoints() -> Endpoints {
        Endpoints::new("notification/all", "notification/add", "notification")
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::new("id", "ID", 80),
            ColumnDescriptor::new("Title", "Title", 200),
            ColumnDescriptor::new("Message", "Message", 300),
            ColumnDescriptor::new("RecipientId", "Recipient ID", 120),
            ColumnDescriptor::new("IsRead", "Read Status", 120),
            ColumnDescriptor::new("createdAt", "Created At", 180),
        ]
    }

    fn format(raw: &serde_json::Value) -> Row {
        let text = |candidates: &[&str]| {
            probe_truthy(raw, candidates)
                .map(Value::from_json)
                .unwrap_or_else(Value::na)
        };

        Row::new()
            .set("id", probe(raw, &["id", "ID"]).map(Value::from_json).unwrap_or_default())
            .set("Title", text(&["Title", "title"]))
            .set("Message", text(&["Message", "message"]))
            .set(
                "RecipientId",
                probe_truthy(raw, &["RecipientId", "recipientId"])
                    .map(Value::from_json)
                    .unwrap_or_default(),
            )
            .set(
                "IsRead",
                probe_truthy(raw, &["IsRead", "isRead"])
                    .map(Value::from_json)
                    .unwrap_or(Value::Bool(false)),
            )
            .set(
                "createdAt",
                probe_truthy(raw, &["createdAt", "CreatedAt"])
                    .map(Value::from_json)
                    .unwrap_or_else(|| {
                        Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
                    }),
            )
    }

    fn sample_records() -> Vec<serde_json::Value> {
        vec![
            json!({
                "id": 1,
                "Title": "System Maintenance",
                "Message": "The system will be under maintenance from 2:00 AM to 4:00 AM",
                "RecipientId": null,
                "IsRead": false,
                "createdAt": "2024-01-15T10:30:00Z"
            }),
            json!({
                "id": 2,
                "Title": "New Drug Added",
                "Message": "A new drug has been added to the database: Aspirin 100mg",
                "RecipientId": 1,
                "IsRead": true,
                "createdAt": "2024-01-14T15:45:00Z"
            }),
            json!({
                "id": 3,
                "Title": "Hospital Registration",
                "Message": "New hospital registered: City Medical Center",
                "RecipientId": null,
                "IsRead": false,
                "createdAt": "2024-01-13T09:20:00Z"
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_defaults() {
        let row = Notifications::format(&json!({"id": 5, "Title": "", "RecipientId": 0}));

        assert_eq!(row.id_key("id"), "5");
        assert_eq!(row.get("Title"), Some(&Value::na()));
        assert_eq!(row.get("Message"), Some(&Value::na()));
        assert_eq!(row.get("RecipientId"), Some(&Value::Null));
        assert_eq!(row.get("IsRead"), Some(&Value::Bool(false)));
        assert!(chrono::DateTime::parse_from_rfc3339(&row.get_display("createdAt")).is_ok());
    }

    #[test]
    fn test_format_sample() {
        let row = Notifications::format(&Notifications::sample_records()[1]);

        assert_eq!(row.get_display("Title"), "New Drug Added");
        assert_eq!(row.get("RecipientId"), Some(&Value::Int(1)));
        assert_eq!(row.get("IsRead"), Some(&Value::Bool(true)));
        assert_eq!(row.get_display("createdAt"), "2024-01-14T15:45:00Z");
    }
}
