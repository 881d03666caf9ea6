// Agency reference tools

use crate::result::{FailureKind, ToolFailure};
use crate::tools::{ToolDescriptor, ToolKind, ValidatedArguments};
use serde_json::Value;
use tracing::debug;
use usaspending_client::UsaSpendingClient;

pub fn get_agencies_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        kind: ToolKind::GetAgencies,
        description: "Get US federal agencies with their ids and codes from usaspending.gov. \
            Call this first: the agency id it returns is the agency_id expected by \
            GetSpendingAwardsByAgencyId.",
        params: Vec::new(),
    }
}

/// Top-tier agencies reduced to id, name, toptier code and abbreviation.
pub async fn get_agencies(
    client: &UsaSpendingClient,
    _args: ValidatedArguments,
) -> Result<Value, ToolFailure> {
    let agencies = client.agencies().toptier().await?;
    debug!(count = agencies.len(), "Fetched agencies");

    serde_json::to_value(agencies)
        .map_err(|e| ToolFailure::new(FailureKind::UpstreamUnavailable, e.to_string()))
}
