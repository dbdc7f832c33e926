//! Hospitals table.

use serde_json::json;

use super::probe;
use super::probe_or_na;
use crate::model::ColumnDescriptor;
use crate::model::Endpoints;
use crate::model::Entity;
use crate::model::Row;
use crate::model::TableId;
use crate::model::Value;

/// Hospital reference records.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hospitals;

/// (accessor, title, width, candidate source keys)
const FIELDS: &[(&str, &str, u32, &[&str])] = &[
    ("name", "Hospital Name", 200, &["hospitalName", "name"]),
    ("type", "Type", 120, &["categoryType", "type"]),
    ("sector", "Sector", 100, &[]),
    ("region", "Region", 120, &["region"]),
    ("municipality", "Municipality", 120, &["municipality"]),
    ("town", "Town", 120, &["town"]),
    ("phone", "Phone Number", 140, &["phoneNumber", "phone"]),
    ("cellular", "Cellular", 120, &["cellular"]),
    ("whatsapp", "WhatsApp", 120, &["whatsapp"]),
    ("email", "Email", 180, &["email"]),
    ("website", "Website", 180, &["website"]),
    ("contactPerson", "Contact Person", 150, &["contactPerson"]),
    ("contactNumber", "Contact Number", 140, &["contactNumber"]),
    ("contactEmail", "Contact Email", 180, &["contactEmail"]),
];

fn sector(raw: &serde_json::Value) -> Value {
    match probe(raw, &["isPrivate"]) {
        Some(serde_json::Value::Bool(true)) => Value::from("Private"),
        Some(serde_json::Value::Bool(false)) => Value::from("Public"),
        _ => probe_or_na(raw, &["sector"]),
    }
}

impl Entity for Hospitals {
    const TABLE: TableId = TableId::Hospitals;
    const TITLE: &'static str = "Hospitals";
    const ID_FIELD: &'static str = "id";

    fn endpoints() -> Endpoints {
        Endpoints::uniform("hospitals")
    }

    fn columns() -> Vec<ColumnDescriptor> {
        let mut columns = vec![ColumnDescriptor::new("id", "ID", 80)];
        columns.extend(
            FIELDS
                .iter()
                .map(|(accessor, title, width, _)| ColumnDescriptor::new(*accessor, *title, *width)),
        );
        columns
    }

    fn format(raw: &serde_json::Value) -> Row {
        let mut row = Row::new().set(
            "id",
            probe(raw, &["ID", "id"]).map(Value::from_json).unwrap_or_default(),
        );
        for (accessor, _, _, candidates) in FIELDS {
            let value = if *accessor == "sector" {
                sector(raw)
            } else {
                probe_or_na(raw, candidates)
            };
            row.insert(*accessor, value);
        }
        row
    }

    fn sample_records() -> Vec<serde_json::Value> {
        vec![
            json!({
                "id": 1,
                "name": "American University of Beirut Medical Center",
                "address": "Hamra, Beirut, Lebanon",
                "phone": "+961-1-350000",
                "email": "info@aubmc.org.lb",
                "type": "University Hospital",
                "capacity": 420,
                "established": "1902"
            }),
            json!({
                "id": 2,
                "name": "Hotel Dieu de France Hospital",
                "address": "Achrafieh, Beirut, Lebanon",
                "phone": "+961-1-615300",
                "email": "info@hdf.usj.edu.lb",
                "type": "General Hospital",
                "capacity": 350,
                "established": "1923"
            }),
            json!({
                "id": 3,
                "name": "Clemenceau Medical Center",
                "address": "Clemenceau, Beirut, Lebanon",
                "phone": "+961-1-372888",
                "email": "info@cmc.com.lb",
                "type": "Private Hospital",
                "capacity": 200,
                "established": "2001"
            }),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_backend_shape() {
        let raw = json!({
            "ID": 17,
            "hospitalName": "Rafik Hariri University Hospital",
            "categoryType": "Public Hospital",
            "isPrivate": false,
            "phoneNumber": "+961-1-830000",
            "region": null
        });

        let row = Hospitals::format(&raw);
        assert_eq!(row.get("id"), Some(&Value::Int(17)));
        assert_eq!(row.get_display("name"), "Rafik Hariri University Hospital");
        assert_eq!(row.get_display("type"), "Public Hospital");
        assert_eq!(row.get_display("sector"), "Public");
        assert_eq!(row.get_display("phone"), "+961-1-830000");
        assert_eq!(row.get("region"), Some(&Value::na()));
    }

    #[test]
    fn test_format_fallback_shape() {
        let raw = &Hospitals::sample_records()[0];

        let row = Hospitals::format(raw);
        assert_eq!(row.id_key("id"), "1");
        assert_eq!(row.get_display("name"), "American University of Beirut Medical Center");
        assert_eq!(row.get_display("phone"), "+961-1-350000");
        assert_eq!(row.get("sector"), Some(&Value::na()));
    }

    #[test]
    fn test_format_is_total() {
        let row = Hospitals::format(&json!("not an object"));
        assert_eq!(row.get("id"), Some(&Value::Null));
        assert_eq!(row.len(), Hospitals::columns().len());
        assert!(Hospitals::columns()
            .iter()
            .all(|c| row.contains(&c.accessor)));
    }
}
