//! Award endpoints: the spending explorer and award detail.

use crate::client::UsaSpendingClient;
use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Awards API for spending and award records.
pub struct AwardsApi<'a> {
    client: &'a UsaSpendingClient,
}

impl<'a> AwardsApi<'a> {
    pub(crate) fn new(client: &'a UsaSpendingClient) -> Self {
        Self { client }
    }

    /// Query the spending explorer. The upstream body is returned untouched.
    pub async fn spending(&self, request: &SpendingRequest) -> ClientResult<Value> {
        self.client
            .http
            .post(&["api", "v2", "spending"], request)
            .await
    }

    /// Get a single award by its generated unique award id.
    pub async fn get(&self, award_id: &str) -> ClientResult<Value> {
        let award_id = award_id.trim();
        // Dot segments would be collapsed out of the path and hit another route
        if award_id.is_empty() || award_id == "." || award_id == ".." {
            return Err(ClientError::Config(format!(
                "Invalid award id: {award_id:?}"
            )));
        }

        self.client
            .http
            .get(&["api", "v2", "awards", award_id])
            .await
    }
}

/// Agency reference accepted by the spending explorer: the numeric agency id
/// from the agency listing, or a toptier code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgencyId {
    Numeric(i64),
    Code(String),
}

impl fmt::Display for AgencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// Body of `POST /api/v2/spending/`.
#[derive(Debug, Clone, Serialize)]
pub struct SpendingRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub filters: SpendingFilters,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendingFilters {
    pub fy: String,
    pub period: String,
    pub agency: AgencyId,
}

impl SpendingRequest {
    /// Awards made by `agency` over the whole of `fiscal_year` (through period 12).
    pub fn awards_for_agency(agency: AgencyId, fiscal_year: i32) -> Self {
        Self {
            kind: "award".to_string(),
            filters: SpendingFilters {
                fy: fiscal_year.to_string(),
                period: "12".to_string(),
                agency,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> UsaSpendingClient {
        UsaSpendingClient::builder()
            .base_url(server.uri())
            .build()
            .unwrap()
    }

    #[test]
    fn test_spending_request_shape() {
        let request = SpendingRequest::awards_for_agency(AgencyId::Numeric(126), 2023);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "type": "award",
                "filters": {"fy": "2023", "period": "12", "agency": 126}
            })
        );
    }

    #[test]
    fn test_agency_id_untagged() {
        let numeric: AgencyId = serde_json::from_value(serde_json::json!(42)).unwrap();
        let code: AgencyId = serde_json::from_value(serde_json::json!("097")).unwrap();

        assert_eq!(numeric, AgencyId::Numeric(42));
        assert_eq!(code, AgencyId::Code("097".to_string()));
        assert_eq!(code.to_string(), "097");
    }

    #[tokio::test]
    async fn test_spending_passthrough() {
        let server = MockServer::start().await;
        let upstream = serde_json::json!({
            "total": 1234.5,
            "end_date": "2023-09-30",
            "results": [{"id": "CONT_AWD_1", "type": "award", "name": "Acme", "amount": 1234.5}]
        });

        Mock::given(method("POST"))
            .and(path("/api/v2/spending/"))
            .and(body_json(serde_json::json!({
                "type": "award",
                "filters": {"fy": "2023", "period": "12", "agency": 126}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let request = SpendingRequest::awards_for_agency(AgencyId::Numeric(126), 2023);
        let body = client_for(&server)
            .await
            .awards()
            .spending(&request)
            .await
            .unwrap();

        assert_eq!(body, upstream);
    }

    #[tokio::test]
    async fn test_get_award_by_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/awards/CONT_AWD_N0001917C0001_9700_-NONE-_-NONE-/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": 1, "category": "contract"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let award = client_for(&server)
            .await
            .awards()
            .get("CONT_AWD_N0001917C0001_9700_-NONE-_-NONE-")
            .await
            .unwrap();

        assert_eq!(award["category"], "contract");
    }

    #[tokio::test]
    async fn test_get_award_rejects_dot_segments() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.awards().get("..").await,
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            client.awards().get("  ").await,
            Err(ClientError::Config(_))
        ));
    }
}
