//! Resolves operation names against the registry and wraps handler output.

use std::time::Instant;

use serde_json::Value as J;
use tracing::{Instrument, Span};

use crate::core::error::DispatchError;
use crate::core::operation::{OperationKind, OperationRequest};
use crate::core::registry::{OperationMeta, Registry};

/// Uniform envelope for a successful dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub operation: &'static str,
    pub kind: OperationKind,
    pub body: J,
}

#[derive(Clone)]
pub struct Dispatcher {
    registry: Registry,
    span: Span,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        let span = tracing::info_span!("dispatcher", operations = registry.len());
        Self { registry, span }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn list(&self, kind: OperationKind) -> Vec<OperationMeta> {
        self.registry.list(kind)
    }

    pub async fn dispatch(&self, name: &str, args: &J) -> Result<Response, DispatchError> {
        self.dispatch_inner(None, name, args).await
    }

    /// Like [`Dispatcher::dispatch`], but a name registered under another kind
    /// counts as unknown.
    pub async fn dispatch_kind(
        &self,
        kind: OperationKind,
        name: &str,
        args: &J,
    ) -> Result<Response, DispatchError> {
        self.dispatch_inner(Some(kind), name, args).await
    }

    async fn dispatch_inner(
        &self,
        kind: Option<OperationKind>,
        name: &str,
        args: &J,
    ) -> Result<Response, DispatchError> {
        let span = tracing::debug_span!(parent: &self.span, "dispatch", operation = %name);
        async move {
            let Some(op) = self
                .registry
                .get(name)
                .filter(|op| kind.map_or(true, |k| op.kind() == k))
            else {
                tracing::warn!(operation = %name, "operation not found");
                metrics::counter!("jetson_dispatch_total", "outcome" => "not_found").increment(1);
                return Err(DispatchError::OperationNotFound(name.to_owned()));
            };

            let start = Instant::now();
            let req = OperationRequest {
                arguments: args,
                registry: &self.registry,
            };
            let res = op.call(req).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match res {
                Ok(body) => {
                    tracing::debug!(elapsed_ms, "operation completed");
                    metrics::counter!(
                        "jetson_dispatch_total",
                        "operation" => op.name(),
                        "outcome" => "ok"
                    )
                    .increment(1);
                    Ok(Response {
                        operation: op.name(),
                        kind: op.kind(),
                        body,
                    })
                }
                Err(e) => {
                    tracing::warn!(elapsed_ms, error = %e, "operation returned error");
                    metrics::counter!(
                        "jetson_dispatch_total",
                        "operation" => op.name(),
                        "outcome" => "error"
                    )
                    .increment(1);
                    Err(DispatchError::Handler(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}
