//! HTTP Request/Response Types
//!
//! Wire shapes are camelCase. Required request fields are `Option` so a
//! missing field answers 400 with the field name instead of a serde message.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use walkin_core::application::{BarberProfile, CompletionSummary};
use walkin_core::domain::{
    normalize_services, split_service_list, Barber, HistoryRecord, QueueEntry, RatingRecord,
    Shop,
};

/// Unwrap a required field, treating blank strings as missing
pub fn required(value: Option<String>, field: &str) -> ApiResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::missing(field)),
    }
}

/// `services` may arrive as one string or as a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServicesInput {
    One(String),
    Many(Vec<String>),
}

impl ServicesInput {
    /// A single string is kept whole as a one-element list
    pub fn into_list(self) -> Vec<String> {
        match self {
            ServicesInput::One(s) => normalize_services([s]),
            ServicesInput::Many(items) => normalize_services(items),
        }
    }

    /// A single string is split on commas
    pub fn into_split_list(self) -> Vec<String> {
        match self {
            ServicesInput::One(s) => split_service_list(&s),
            ServicesInput::Many(items) => normalize_services(items),
        }
    }
}

// ---- queries ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopQuery {
    pub shop_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveQuery {
    pub shop_id: Option<String>,
    pub uid: Option<String>,
}

// ---- queue ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueueBody {
    pub shop_id: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "uid")]
    pub customer_ref: Option<String>,
    pub services: Option<ServicesInput>,
    pub code: Option<String>,
    #[serde(default)]
    pub total_cost: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDownBody {
    pub shop_id: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicesBody {
    pub shop_id: Option<String>,
    #[serde(alias = "uid")]
    pub customer_ref: Option<String>,
    pub services: Option<Vec<String>>,
    pub total_cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryDto {
    pub id: String,
    pub customer_ref: Option<String>,
    pub name: String,
    pub position: i64,
    pub code: Option<String>,
    pub services: Vec<String>,
    pub total_cost: f64,
    pub created_at: i64,
}

impl From<QueueEntry> for QueueEntryDto {
    fn from(entry: QueueEntry) -> Self {
        Self {
            id: entry.id,
            customer_ref: entry.customer_ref,
            name: entry.name,
            position: entry.position,
            code: entry.code,
            services: entry.services,
            total_cost: entry.total_cost,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueListResponse {
    pub queue_length: usize,
    pub data: Vec<QueueEntryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServicesResponse {
    pub message: String,
    pub updated_entry: QueueEntryDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub message: String,
    pub removed: Option<QueueEntryDto>,
}

// ---- completion ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddHistoryBody {
    pub shop_id: Option<String>,
    #[serde(alias = "uid")]
    pub customer_ref: Option<String>,
    pub barber_id: Option<String>,
    pub service: Option<ServicesInput>,
    pub cost: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecordDto {
    pub services: Vec<String>,
    pub cost: f64,
    pub served_at: i64,
}

impl From<HistoryRecord> for HistoryRecordDto {
    fn from(record: HistoryRecord) -> Self {
        Self {
            services: record.services,
            cost: record.cost,
            served_at: record.served_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub ok: bool,
    pub message: String,
    pub record: HistoryRecordDto,
    pub removed_entry: Option<QueueEntryDto>,
    pub customer_updated: bool,
}

impl From<CompletionSummary> for CompletionResponse {
    fn from(summary: CompletionSummary) -> Self {
        Self {
            ok: true,
            message: "Service recorded".to_string(),
            record: summary.record.into(),
            removed_entry: summary.removed_entry.map(Into::into),
            customer_updated: summary.customer_updated,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBody {
    pub shop_id: Option<String>,
    #[serde(alias = "uid")]
    pub customer_ref: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateResponse {
    pub message: String,
    pub barber_id: String,
    pub average_rating: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPendingBody {
    #[serde(alias = "uid")]
    pub customer_ref: Option<String>,
}

// ---- views ----

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberDto {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub customers_served: i64,
    pub rating_count: i64,
    pub average_rating: Option<f64>,
}

impl From<Barber> for BarberDto {
    fn from(barber: Barber) -> Self {
        Self {
            average_rating: barber.average_rating(),
            id: barber.id,
            shop_id: barber.shop_id,
            name: barber.name,
            customers_served: barber.customers_served,
            rating_count: barber.rating_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingDto {
    pub rating: i64,
    pub rated_at: i64,
}

impl From<RatingRecord> for RatingDto {
    fn from(record: RatingRecord) -> Self {
        Self {
            rating: record.rating,
            rated_at: record.rated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarberProfileResponse {
    pub barber: BarberDto,
    pub history: Vec<HistoryRecordDto>,
    pub ratings: Vec<RatingDto>,
}

impl From<BarberProfile> for BarberProfileResponse {
    fn from(profile: BarberProfile) -> Self {
        Self {
            barber: profile.barber.into(),
            history: profile.history.into_iter().map(Into::into).collect(),
            ratings: profile.ratings.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub count: usize,
    pub data: Vec<HistoryRecordDto>,
}

impl From<Vec<HistoryRecord>> for HistoryResponse {
    fn from(records: Vec<HistoryRecord>) -> Self {
        Self {
            count: records.len(),
            data: records.into_iter().map(Into::into).collect(),
        }
    }
}

// ---- provisioning ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShopBody {
    pub name: Option<String>,
    pub trial_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBarberBody {
    pub shop_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCustomerBody {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopDto {
    pub id: String,
    pub name: String,
    pub trial_status: String,
    pub trial_ends_at: Option<i64>,
    pub version: i64,
}

impl From<Shop> for ShopDto {
    fn from(shop: Shop) -> Self {
        Self {
            id: shop.id,
            name: shop.name,
            trial_status: shop.trial_status.to_string(),
            trial_ends_at: shop.trial_ends_at,
            version: shop.version,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub has_pending_rating: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_input_accepts_string_or_list() {
        let one: ServicesInput = serde_json::from_str(r#"" Haircut, Shave ""#).unwrap();
        assert_eq!(one.into_list(), vec!["Haircut, Shave".to_string()]);

        let one: ServicesInput = serde_json::from_str(r#""Haircut, Shave""#).unwrap();
        assert_eq!(
            one.into_split_list(),
            vec!["Haircut".to_string(), "Shave".to_string()]
        );

        let many: ServicesInput = serde_json::from_str(r#"["Fade", " "]"#).unwrap();
        assert_eq!(many.into_list(), vec!["Fade".to_string()]);
    }

    #[test]
    fn test_join_body_accepts_uid_alias() {
        let body: JoinQueueBody =
            serde_json::from_str(r#"{"shopId":"s1","name":"Ann","uid":"cust-1"}"#).unwrap();
        assert_eq!(body.customer_ref.as_deref(), Some("cust-1"));
        assert_eq!(body.total_cost, 0.0);
        assert!(body.services.is_none());
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(required(Some("  ".into()), "shopId").is_err());
        assert!(required(None, "shopId").is_err());
        assert_eq!(required(Some("s1".into()), "shopId").unwrap(), "s1");
    }

    #[test]
    fn test_entry_dto_is_camel_case() {
        let dto = QueueEntryDto {
            id: "e1".into(),
            customer_ref: None,
            name: "Ann".into(),
            position: 1,
            code: Some("A7".into()),
            services: vec![],
            total_cost: 12.5,
            created_at: 1_000,
        };
        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(json["totalCost"], 12.5);
        assert_eq!(json["createdAt"], 1_000);
        assert!(json["customerRef"].is_null());
    }
}
