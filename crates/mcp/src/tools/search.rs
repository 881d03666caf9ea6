// Keyword award search

use crate::result::ToolFailure;
use crate::tools::{ParamSpec, ParamType, ToolDescriptor, ToolKind, ValidatedArguments};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use usaspending_client::api::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use usaspending_client::{SpendingByAwardRequest, UsaSpendingClient};

pub fn search_by_keywords_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        kind: ToolKind::SearchByKeywords,
        description: "Broad keyword search of contract awards on usaspending.gov within a \
            fiscal year. Results are ordered by award amount, largest first. \
            page_metadata.hasNext in the response tells whether another page exists.",
        params: vec![
            ParamSpec::required(
                "keywords",
                ParamType::KeywordList,
                "Keywords to search for; an award matching any of them is returned",
            ),
            ParamSpec::required(
                "fiscal_year",
                ParamType::FiscalYear,
                "Federal fiscal year to search, e.g. 2023",
            ),
            ParamSpec::optional(
                "page",
                ParamType::Integer {
                    min: 1,
                    max: i64::from(u32::MAX),
                },
                json!(1),
                "1-based result page",
            ),
            ParamSpec::optional(
                "limit",
                ParamType::Integer {
                    min: 1,
                    max: i64::from(MAX_PAGE_SIZE),
                },
                json!(DEFAULT_PAGE_SIZE),
                "Results per page",
            ),
        ],
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    keywords: Vec<String>,
    fiscal_year: i32,
    page: u32,
    limit: u32,
}

pub async fn search_by_keywords(
    client: &UsaSpendingClient,
    args: ValidatedArguments,
) -> Result<Value, ToolFailure> {
    let args: SearchArgs = args.into_typed()?;
    debug!(
        keywords = ?args.keywords,
        fiscal_year = args.fiscal_year,
        page = args.page,
        "Searching awards"
    );

    let request = SpendingByAwardRequest::keywords(args.keywords, args.fiscal_year)?
        .page(args.page)
        .limit(args.limit);
    Ok(client.search().spending_by_award(&request).await?)
}
