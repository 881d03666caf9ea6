// Award tools: spending by agency and award detail

use crate::result::ToolFailure;
use crate::tools::{ParamSpec, ParamType, ToolDescriptor, ToolKind, ValidatedArguments};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use usaspending_client::{AgencyId, SpendingRequest, UsaSpendingClient};

pub fn spending_by_agency_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        kind: ToolKind::GetSpendingAwardsByAgencyId,
        description: "Get government spending awards from usaspending.gov for a fiscal year \
            for a given agency id. Use this when you have an agency id (from GetAgencies) \
            and want the awards it made in a given year.",
        params: vec![
            ParamSpec::required(
                "agency_id",
                ParamType::Identifier,
                "Agency id as returned by GetAgencies",
            ),
            ParamSpec::required(
                "fiscal_year",
                ParamType::FiscalYear,
                "Federal fiscal year, e.g. 2023 (Oct 2022 - Sep 2023)",
            ),
        ],
    }
}

pub fn award_info_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        kind: ToolKind::GetAwardInfoByAwardId,
        description: "Get award details for a given award id from usaspending.gov. \
            Only use this with generated unique award ids, such as those returned by \
            GetSpendingAwardsByAgencyId.",
        params: vec![ParamSpec::required(
            "award_id",
            ParamType::NonEmptyString,
            "The generated unique award id",
        )],
    }
}

#[derive(Debug, Deserialize)]
struct SpendingByAgencyArgs {
    agency_id: AgencyId,
    fiscal_year: i32,
}

#[derive(Debug, Deserialize)]
struct AwardInfoArgs {
    award_id: String,
}

pub async fn spending_by_agency(
    client: &UsaSpendingClient,
    args: ValidatedArguments,
) -> Result<Value, ToolFailure> {
    let args: SpendingByAgencyArgs = args.into_typed()?;
    debug!(agency = %args.agency_id, fiscal_year = args.fiscal_year, "Fetching agency awards");

    let request = SpendingRequest::awards_for_agency(args.agency_id, args.fiscal_year);
    Ok(client.awards().spending(&request).await?)
}

pub async fn award_info(
    client: &UsaSpendingClient,
    args: ValidatedArguments,
) -> Result<Value, ToolFailure> {
    let args: AwardInfoArgs = args.into_typed()?;
    debug!(award_id = %args.award_id, "Fetching award detail");

    Ok(client.awards().get(&args.award_id).await?)
}
