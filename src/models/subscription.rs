//! Subscription data models and API request/response types.
//!
//! This module defines:
//! - `Subscription`: database entity for one row of the `subscription` table
//! - `NewSubscription`: validated input for create and update
//! - `SubscriptionParams`: filters and pagination for list and cost queries
//! - Request bodies with their validation, and the `{res: "ok", ...}` envelopes

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::AppError;

/// Name of the table holding subscriptions.
pub const SUBSCRIPTION_TABLE: &str = "subscription";

/// Page used when the path omits it or carries an invalid value.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the path omits it or carries an invalid value.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// A subscription record from the database.
///
/// # Dates
///
/// `start_date` and `end_date` have month granularity. They are stored as the
/// first day of the month and rendered as `MM-YYYY` in JSON, the same format
/// accepted on input.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
pub struct Subscription {
    /// Server-generated identifier
    pub id: Uuid,

    pub service_name: String,

    /// Monthly price in whole currency units
    pub price: i64,

    /// Owning user; not checked against any user registry
    pub user_id: Uuid,

    #[serde(serialize_with = "serialize_month_year")]
    pub start_date: NaiveDate,

    #[serde(
        serialize_with = "serialize_optional_month_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    pub fn from_new(id: Uuid, new: NewSubscription) -> Self {
        Self {
            id,
            service_name: new.service_name,
            price: new.price,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
        }
    }
}

/// Validated subscription fields, without an identifier.
///
/// Used for both create and full-replace update; a `None` end date on update
/// clears any stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Filters and pagination shared by the list and cost queries.
///
/// Every field is optional; a zero `page` or `limit` disables pagination.
/// The list query only looks at `user_id`, `page` and `limit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionParams {
    pub page: u32,
    pub limit: u32,
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    /// Lower bound: `start_date >= this`
    pub start_date: Option<NaiveDate>,
    /// Upper bound: `end_date <= this`
    pub end_date: Option<NaiveDate>,
}

impl SubscriptionParams {
    /// List parameters for one user's subscriptions.
    pub fn for_user(user_id: Uuid, pagination: Pagination) -> Self {
        Self {
            page: pagination.page,
            limit: pagination.limit,
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// `LIMIT`, if pagination is active.
    pub fn limit(&self) -> Option<i64> {
        (self.limit > 0).then_some(i64::from(self.limit))
    }

    /// `OFFSET = (page - 1) * limit`, only when both are positive.
    pub fn offset(&self) -> Option<i64> {
        (self.page > 0 && self.limit > 0)
            .then(|| i64::from(self.page - 1) * i64::from(self.limit))
    }
}

/// Page number and size taken from the listing path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Parse path segments leniently.
    ///
    /// Missing, non-numeric or out-of-range values (page < 1, limit outside
    /// 1..=100) fall back to the defaults instead of failing the request.
    pub fn from_path(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);

        let limit = limit
            .and_then(|l| l.parse::<u32>().ok())
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .unwrap_or(DEFAULT_LIMIT);

        Self { page, limit }
    }
}

/// Parse a `MM-YYYY` value into the first day of that month.
///
/// The month must be exactly two digits and the year exactly four.
pub fn parse_month_year(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::validation(format!("invalid {field} format, expected MM-YYYY"));

    let (month, year) = value.split_once('-').ok_or_else(invalid)?;
    if month.len() != 2
        || year.len() != 4
        || !month.bytes().all(|b| b.is_ascii_digit())
        || !year.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Render a date as `MM-YYYY`.
pub fn format_month_year(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}

fn serialize_month_year<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_month_year(*date))
}

fn serialize_optional_month_year<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serialize_month_year(date, serializer),
        None => serializer.serialize_none(),
    }
}

/// Treat an empty string the same as an absent value.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Reject an end date that precedes the start date. Equal months are allowed.
fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(AppError::validation(
            "end_date must not be before start_date",
        )),
        _ => Ok(()),
    }
}

/// Request body for creating or replacing a subscription.
///
/// # JSON Example
///
/// ```json
/// {
///   "service_name": "Yandex Plus",
///   "price": 400,
///   "user_id": "60601fee-2bf1-4721-ae6f-7636e79a0cba",
///   "start_date": "07-2025",
///   "end_date": "12-2025"
/// }
/// ```
///
/// Missing fields deserialize to empty values so that validation can name
/// the offending field instead of failing the whole body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: Uuid,
    pub start_date: String,
    pub end_date: Option<String>,
}

impl SubscriptionRequest {
    /// Check required fields, parse dates and check their order.
    pub fn validate(self) -> Result<NewSubscription, AppError> {
        if self.service_name.trim().is_empty() {
            return Err(AppError::validation("service_name is required"));
        }
        if self.price <= 0 {
            return Err(AppError::validation("price must be positive"));
        }
        if self.user_id.is_nil() {
            return Err(AppError::validation("user_id is required"));
        }
        if self.start_date.is_empty() {
            return Err(AppError::validation("start_date is required"));
        }

        let start_date = parse_month_year("start_date", &self.start_date)?;
        let end_date = non_empty(self.end_date)
            .map(|end| parse_month_year("end_date", &end))
            .transpose()?;
        check_date_order(Some(start_date), end_date)?;

        Ok(NewSubscription {
            service_name: self.service_name,
            price: self.price,
            user_id: self.user_id,
            start_date,
            end_date,
        })
    }
}

/// Request body for the cost query. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CostRequest {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CostRequest {
    /// Parse dates and build the cost filter.
    pub fn into_params(self) -> Result<SubscriptionParams, AppError> {
        let start_date = non_empty(self.start_date)
            .map(|start| parse_month_year("start_date", &start))
            .transpose()?;
        let end_date = non_empty(self.end_date)
            .map(|end| parse_month_year("end_date", &end))
            .transpose()?;
        check_date_order(start_date, end_date)?;

        Ok(SubscriptionParams {
            user_id: self.user_id.filter(|id| !id.is_nil()),
            service_name: non_empty(self.service_name),
            start_date,
            end_date,
            ..SubscriptionParams::default()
        })
    }
}

const OK: &str = "ok";

/// `{"res": "ok"}`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub res: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { res: OK }
    }
}

/// `{"res": "ok", "uuid": "<id>"}`
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub res: &'static str,
    pub uuid: Uuid,
}

impl CreatedResponse {
    pub fn new(uuid: Uuid) -> Self {
        Self { res: OK, uuid }
    }
}

/// `{"res": "ok", "subscriptions": [...]}`
#[derive(Debug, Serialize)]
pub struct SubscriptionsResponse {
    pub res: &'static str,
    pub subscriptions: Vec<Subscription>,
}

impl SubscriptionsResponse {
    pub fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            res: OK,
            subscriptions,
        }
    }
}

/// `{"res": "ok", "cost": 600}`
#[derive(Debug, Serialize)]
pub struct CostResponse {
    pub res: &'static str,
    pub cost: i64,
}

impl CostResponse {
    pub fn new(cost: i64) -> Self {
        Self { res: OK, cost }
    }
}
