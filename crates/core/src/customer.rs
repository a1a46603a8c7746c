use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MetadataError;

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// The person an outbound call is placed to, read from room metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerInfo {
    pub phone_number: String,
    pub customer_name: String,
    pub amount_owed: f64,
    pub payment_due_date: NaiveDate,
}

impl CustomerInfo {
    /// Parses `phoneNumber`, `customerName`, `amountOwed` and `paymentDueDate`.
    /// Absent or empty metadata yields the defaults; `today` is the default due date.
    pub fn from_metadata(
        metadata: Option<&str>,
        today: NaiveDate,
    ) -> Result<Self, MetadataError> {
        let fields = match metadata.map(str::trim) {
            None | Some("") => Map::new(),
            Some(raw) => serde_json::from_str::<Map<String, Value>>(raw)?,
        };

        let text = |key: &str, default: &str| match fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => default.to_string(),
            Some(other) => other.to_string(),
        };

        let amount_owed = match fields.get("amountOwed") {
            None | Some(Value::Null) => 0.0,
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| MetadataError::InvalidAmount(n.to_string()))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| MetadataError::InvalidAmount(s.clone()))?,
            Some(other) => return Err(MetadataError::InvalidAmount(other.to_string())),
        };

        let payment_due_date = match fields.get("paymentDueDate") {
            None | Some(Value::Null) => today,
            Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), DUE_DATE_FORMAT)
                .map_err(|_| MetadataError::InvalidDueDate(s.clone()))?,
            Some(other) => return Err(MetadataError::InvalidDueDate(other.to_string())),
        };

        Ok(Self {
            phone_number: text("phoneNumber", "Unknown"),
            customer_name: text("customerName", "Customer"),
            amount_owed,
            payment_due_date,
        })
    }

    /// Calendar days from `today` to the due date; negative once overdue.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.payment_due_date - today).num_days()
    }

    pub fn due_date_string(&self) -> String {
        self.payment_due_date.format(DUE_DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DUE_DATE_FORMAT).unwrap()
    }

    #[test]
    fn parses_full_metadata() {
        let metadata = r#"{
            "phoneNumber": "+15550100",
            "customerName": "Ana Ruiz",
            "amountOwed": "812.50",
            "paymentDueDate": "2026-11-01",
            "callType": "outbound_collection"
        }"#;
        let info = CustomerInfo::from_metadata(Some(metadata), day("2026-10-18")).unwrap();
        assert_eq!(info.phone_number, "+15550100");
        assert_eq!(info.customer_name, "Ana Ruiz");
        assert_eq!(info.amount_owed, 812.5);
        assert_eq!(info.due_date_string(), "2026-11-01");
        assert_eq!(info.days_until_due(day("2026-10-18")), 14);
    }

    #[test]
    fn defaults_when_metadata_is_missing() {
        let today = day("2026-10-18");
        for metadata in [None, Some(""), Some("{}")] {
            let info = CustomerInfo::from_metadata(metadata, today).unwrap();
            assert_eq!(info.phone_number, "Unknown");
            assert_eq!(info.customer_name, "Customer");
            assert_eq!(info.amount_owed, 0.0);
            assert_eq!(info.payment_due_date, today);
            assert_eq!(info.days_until_due(today), 0);
        }
    }

    #[test]
    fn numeric_amount_and_past_due_date() {
        let metadata = r#"{"amountOwed": 1200, "paymentDueDate": "2026-10-10"}"#;
        let info = CustomerInfo::from_metadata(Some(metadata), day("2026-10-18")).unwrap();
        assert_eq!(info.amount_owed, 1200.0);
        assert_eq!(info.days_until_due(day("2026-10-18")), -8);
    }

    #[test]
    fn bad_amount_is_an_error() {
        let err = CustomerInfo::from_metadata(Some(r#"{"amountOwed":"lots"}"#), day("2026-10-18"))
            .unwrap_err();
        assert!(matches!(err, MetadataError::InvalidAmount(_)));
    }

    #[test]
    fn bad_due_date_is_an_error() {
        let metadata = r#"{"paymentDueDate":"11/01/2026"}"#;
        let err = CustomerInfo::from_metadata(Some(metadata), day("2026-10-18")).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidDueDate(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = CustomerInfo::from_metadata(Some("{not json"), day("2026-10-18")).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidJson(_)));
    }
}
