//! Agency reference endpoints.

use crate::client::UsaSpendingClient;
use crate::error::ClientResult;
use serde::{Deserialize, Serialize};

/// Agencies API for reference data about federal agencies.
pub struct AgenciesApi<'a> {
    client: &'a UsaSpendingClient,
}

impl<'a> AgenciesApi<'a> {
    pub(crate) fn new(client: &'a UsaSpendingClient) -> Self {
        Self { client }
    }

    /// List top-tier agencies, projected to their identifying fields.
    pub async fn toptier(&self) -> ClientResult<Vec<Agency>> {
        let response: ToptierAgenciesResponse = self
            .client
            .http
            .get(&["api", "v2", "references", "toptier_agencies"])
            .await?;
        Ok(response.into_agencies())
    }
}

/// A top-tier agency. `id` is the value the spending endpoints accept as
/// their `agency` filter.
///
/// Every field is optional: upstream occasionally publishes rows with a null
/// name or id, and one such row must not sink the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agency {
    #[serde(default, alias = "agency_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, alias = "agency_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toptier_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ToptierAgenciesResponse {
    Paged { results: Vec<Agency> },
    Bare(Vec<Agency>),
}

impl ToptierAgenciesResponse {
    fn into_agencies(self) -> Vec<Agency> {
        match self {
            Self::Paged { results } => results,
            Self::Bare(agencies) => agencies,
        }
    }
}
