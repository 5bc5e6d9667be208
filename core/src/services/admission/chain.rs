use std::sync::Arc;

use crate::errors::DomainResult;
use crate::services::rate_limit::RateLimiter;
use crate::services::token::TokenService;

use super::context::RequestContext;
use super::gates::{AdmissionGate, HeaderGate, ThrottleGate, TokenGate};

/// Runs gates in registration order and stops at the first rejection
#[derive(Clone)]
pub struct AdmissionChain {
    gates: Vec<Arc<dyn AdmissionGate>>,
}

impl AdmissionChain {
    pub fn new(gates: Vec<Arc<dyn AdmissionGate>>) -> Self {
        Self { gates }
    }

    /// Headers, then token, then throttle
    pub fn standard(
        tokens: Arc<TokenService>,
        limiter: Arc<RateLimiter>,
        access_cookie: impl Into<String>,
    ) -> Self {
        Self::new(vec![
            Arc::new(HeaderGate),
            Arc::new(TokenGate::new(tokens, access_cookie)),
            Arc::new(ThrottleGate::new(limiter)),
        ])
    }

    pub fn gate_names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    pub async fn run(&self, mut ctx: RequestContext) -> DomainResult<RequestContext> {
        for gate in &self.gates {
            ctx = match gate.admit(ctx).await {
                Ok(ctx) => ctx,
                Err(e) => {
                    tracing::debug!(gate = gate.name(), error = %e, "Request rejected");
                    return Err(e);
                }
            };
        }
        Ok(ctx)
    }
}
