//! Advanced award search.

use crate::client::UsaSpendingClient;
use crate::error::{ClientError, ClientResult};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

/// Columns requested from `spending_by_award`.
pub const AWARD_FIELDS: &[&str] = &[
    "Award ID",
    "Recipient Name",
    "Award Amount",
    "Total Outlays",
    "Description",
    "Contract Award Type",
    "def_codes",
    "COVID-19 Obligations",
    "COVID-19 Outlays",
    "Infrastructure Obligations",
    "Infrastructure Outlays",
    "Awarding Agency",
    "Awarding Sub Agency",
    "Start Date",
    "End Date",
    "recipient_id",
    "prime_award_recipient_id",
];

/// Contract award types: BPA call, purchase order, delivery order, definitive contract.
pub const CONTRACT_AWARD_TYPES: &[&str] = &["A", "B", "C", "D"];

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Search API for keyword and filter queries.
pub struct SearchApi<'a> {
    client: &'a UsaSpendingClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a UsaSpendingClient) -> Self {
        Self { client }
    }

    /// Run one page of an award search. `page_metadata` in the upstream body
    /// tells the caller whether another page exists.
    pub async fn spending_by_award(&self, request: &SpendingByAwardRequest) -> ClientResult<Value> {
        self.client
            .http
            .post(&["api", "v2", "search", "spending_by_award"], request)
            .await
    }
}

/// Inclusive date range in upstream `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TimePeriod {
    /// Federal fiscal year `year`: October 1 of the prior year through September 30.
    pub fn fiscal_year(year: i32) -> ClientResult<Self> {
        let start_date = year
            .checked_sub(1)
            .and_then(|prior| NaiveDate::from_ymd_opt(prior, 10, 1));
        let end_date = NaiveDate::from_ymd_opt(year, 9, 30);

        match (start_date, end_date) {
            (Some(start_date), Some(end_date)) => Ok(Self {
                start_date,
                end_date,
            }),
            _ => Err(ClientError::Config(format!(
                "Fiscal year out of range: {year}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AwardSearchFilters {
    pub keywords: Vec<String>,
    pub time_period: Vec<TimePeriod>,
    pub award_type_codes: Vec<String>,
}

/// Body of `POST /api/v2/search/spending_by_award/`.
#[derive(Debug, Clone, Serialize)]
pub struct SpendingByAwardRequest {
    pub filters: AwardSearchFilters,
    pub fields: Vec<String>,
    pub page: u32,
    pub limit: u32,
    pub sort: String,
    pub order: String,
    pub subawards: bool,
}

impl SpendingByAwardRequest {
    /// Contract awards matching any of `keywords` in `fiscal_year`, largest first.
    pub fn keywords(keywords: Vec<String>, fiscal_year: i32) -> ClientResult<Self> {
        if keywords.is_empty() {
            return Err(ClientError::Config(
                "At least one keyword is required".to_string(),
            ));
        }

        Ok(Self {
            filters: AwardSearchFilters {
                keywords,
                time_period: vec![TimePeriod::fiscal_year(fiscal_year)?],
                award_type_codes: CONTRACT_AWARD_TYPES.iter().map(|c| c.to_string()).collect(),
            },
            fields: AWARD_FIELDS.iter().map(|f| f.to_string()).collect(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort: "Award Amount".to_string(),
            order: "desc".to_string(),
            subawards: false,
        })
    }

    /// Select the 1-based result page.
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size, clamped to what upstream accepts.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_SIZE);
        self
    }
}
