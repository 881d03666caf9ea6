// Request dispatcher: lookup, validation, one upstream call, normalization

use crate::result::{ToolFailure, ToolResult};
use crate::tools::{
    agencies, awards, search, validate, ToolArguments, ToolKind, ToolRegistry, ValidatedArguments,
};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use usaspending_client::UsaSpendingClient;

/// Turns `(tool name, arguments)` into a [`ToolResult`].
///
/// The only component that talks to USAspending. Holds no per-call state;
/// concurrent invocations share nothing but the read-only registry and the
/// client's connection pool.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    client: UsaSpendingClient,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, client: UsaSpendingClient) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke a tool to completion.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult {
        self.invoke_with_cancel(name, arguments, &CancellationToken::new())
            .await
    }

    /// Invoke a tool, abandoning the upstream call if `cancel` fires first.
    pub async fn invoke_with_cancel(
        &self,
        name: &str,
        arguments: Value,
        cancel: &CancellationToken,
    ) -> ToolResult {
        let Some(descriptor) = self.registry.lookup(name) else {
            warn!(tool = %name, "Unknown tool requested");
            return ToolResult::Failure(ToolFailure::unknown_tool(name));
        };

        let args = match ToolArguments::from_value(arguments)
            .and_then(|args| validate(descriptor, &args))
        {
            Ok(args) => args,
            Err(e) => {
                debug!(tool = %name, error = %e, "Rejected arguments");
                return ToolResult::Failure(e.into());
            }
        };

        if cancel.is_cancelled() {
            return ToolResult::Failure(ToolFailure::cancelled());
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(tool = %name, "Invocation cancelled");
                Err(ToolFailure::cancelled())
            }
            result = self.call(descriptor.kind, args) => result,
        };

        if let Err(failure) = &result {
            if failure.kind.is_transient() {
                warn!(tool = %name, error = %failure, "Upstream unavailable");
            }
        }
        result.into()
    }

    async fn call(&self, kind: ToolKind, args: ValidatedArguments) -> Result<Value, ToolFailure> {
        match kind {
            ToolKind::GetAgencies => agencies::get_agencies(&self.client, args).await,
            ToolKind::GetSpendingAwardsByAgencyId => {
                awards::spending_by_agency(&self.client, args).await
            }
            ToolKind::GetAwardInfoByAwardId => awards::award_info(&self.client, args).await,
            ToolKind::SearchByKeywords => search::search_by_keywords(&self.client, args).await,
        }
    }
}
