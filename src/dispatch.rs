//! Tool dispatch as a tower service
//!
//! [`ToolRouter`] resolves a [`ToolInvocation`] to the agent's tool by name,
//! decodes the argument string and invokes it. Every failure on this path is
//! contained: the router never errors, it answers with a
//! [`ToolCallResult`] whose payload is `{"error": "<message>"}`.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::join_all;
use serde_json::{Map, Value};
use tower::{Service, ServiceExt};
use tracing::{debug, warn};

use crate::config::ArgumentPolicy;
use crate::error::ArgumentValidationError;
use crate::items::{ToolCallRequest, ToolCallResult};
use crate::schema::json_type_name;
use crate::tool::{Tool, ToolArguments};

/// One function call to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub call_id: String,
    pub name: String,
    /// Raw JSON text as sent by the model
    pub arguments: String,
}

impl ToolInvocation {
    /// `None` for requests without a function payload.
    pub fn from_request(request: &ToolCallRequest) -> Option<Self> {
        request.function.as_ref().map(|function| Self {
            call_id: request.id.clone(),
            name: function.name.clone(),
            arguments: function.arguments.clone(),
        })
    }
}

/// Routes invocations to tools by name.
#[derive(Debug, Clone)]
pub struct ToolRouter {
    tools: Arc<HashMap<String, Arc<dyn Tool>>>,
    policy: ArgumentPolicy,
}

impl ToolRouter {
    pub fn new(tools: HashMap<String, Arc<dyn Tool>>, policy: ArgumentPolicy) -> Self {
        Self {
            tools: Arc::new(tools),
            policy,
        }
    }

    pub fn policy(&self) -> ArgumentPolicy {
        self.policy
    }

    async fn invoke(&self, inv: ToolInvocation) -> ToolCallResult {
        let Some(tool) = self.tools.get(&inv.name).cloned() else {
            warn!(tool = %inv.name, call_id = %inv.call_id, "model requested unknown tool");
            let message = format!("Unknown tool: {}", inv.name);
            return ToolCallResult::error(inv.call_id, inv.name, message);
        };

        let arguments = match self.decode(tool.as_ref(), &inv.arguments) {
            Ok(arguments) => arguments,
            Err(err) => {
                warn!(
                    tool = %inv.name,
                    call_id = %inv.call_id,
                    error = %err,
                    "rejected tool arguments"
                );
                let message = format!("invalid arguments for tool '{}': {}", inv.name, err);
                return ToolCallResult::error(inv.call_id, inv.name, message);
            }
        };

        debug!(tool = %inv.name, call_id = %inv.call_id, "invoking tool");
        match tool.call(ToolArguments::new(arguments)).await {
            Ok(output) => ToolCallResult::success(inv.call_id, inv.name, output),
            Err(err) => {
                warn!(tool = %inv.name, call_id = %inv.call_id, error = %err, "tool failed");
                ToolCallResult::error(inv.call_id, inv.name, err.to_string())
            }
        }
    }

    fn decode(
        &self,
        tool: &dyn Tool,
        raw: &str,
    ) -> Result<Map<String, Value>, ArgumentValidationError> {
        // An empty payload means "no arguments"
        let raw = if raw.trim().is_empty() { "{}" } else { raw };

        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(err) => match self.policy {
                ArgumentPolicy::Strict => {
                    return Err(ArgumentValidationError::Malformed(err.to_string()))
                }
                ArgumentPolicy::Lenient => {
                    debug!(
                        tool = tool.name(),
                        error = %err,
                        "malformed arguments, using an empty object"
                    );
                    Value::Object(Map::new())
                }
            },
        };

        let arguments = match value {
            Value::Object(map) => map,
            other => {
                return Err(ArgumentValidationError::NotAnObject {
                    found: json_type_name(&other),
                })
            }
        };

        if self.policy == ArgumentPolicy::Strict {
            if let Some(spec) = tool.spec() {
                spec.parameters.validate(&arguments)?;
            }
        }
        Ok(arguments)
    }
}

impl Service<ToolInvocation> for ToolRouter {
    type Response = ToolCallResult;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: ToolInvocation) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { Ok(router.invoke(req).await) })
    }
}

/// Execute every function call of one response.
///
/// Results come back in request order whether or not the calls run
/// concurrently. Requests without a function payload are skipped.
pub async fn dispatch_all(
    router: &ToolRouter,
    requests: &[ToolCallRequest],
    parallel: bool,
) -> Vec<ToolCallResult> {
    let invocations: Vec<ToolInvocation> = requests
        .iter()
        .filter_map(|request| {
            let inv = ToolInvocation::from_request(request);
            if inv.is_none() {
                debug!(call_id = %request.id, "skipping tool call without function payload");
            }
            inv
        })
        .collect();

    let results = if parallel && invocations.len() > 1 {
        // join_all keeps input order
        let futures = invocations
            .into_iter()
            .map(|inv| router.clone().oneshot(inv));
        join_all(futures).await
    } else {
        let mut results = Vec::with_capacity(invocations.len());
        for inv in invocations {
            results.push(router.clone().oneshot(inv).await);
        }
        results
    };

    results
        .into_iter()
        .map(|result| match result {
            Ok(result) => result,
            Err(never) => match never {},
        })
        .collect()
}
