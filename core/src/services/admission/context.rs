//! Per-route policy and the request context threaded through the gates

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::token::Identity;
use crate::domain::value_objects::HeaderParam;
use crate::services::header::ExtractedHeader;
use crate::services::rate_limit::RateLimitDecision;

/// Admission requirements declared for a route
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    /// Groups routes that share a throttle quota
    pub route_class: String,
    /// Public routes skip token authentication
    pub public: bool,
    /// Checked in order; the first failing rule rejects
    pub header_rules: Vec<HeaderParam>,
}

impl RoutePolicy {
    pub fn authenticated(route_class: impl Into<String>) -> Self {
        Self {
            route_class: route_class.into(),
            public: false,
            header_rules: Vec::new(),
        }
    }

    pub fn public(route_class: impl Into<String>) -> Self {
        Self {
            public: true,
            ..Self::authenticated(route_class)
        }
    }

    pub fn require_header(mut self, param: impl Into<HeaderParam>) -> Self {
        self.header_rules.push(param.into());
        self
    }
}

/// Everything the gates need to know about one request, plus what they learned
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client_address: String,
    pub policy: Arc<RoutePolicy>,
    pub headers: HashMap<String, Vec<String>>,
    pub cookies: HashMap<String, String>,
    /// Set by the token gate
    pub identity: Option<Identity>,
    /// Set by the header gate
    pub extracted_headers: Vec<ExtractedHeader>,
    /// Set by the throttle gate
    pub rate_limit: Option<RateLimitDecision>,
}

impl RequestContext {
    pub fn new(client_address: impl Into<String>, policy: Arc<RoutePolicy>) -> Self {
        Self {
            client_address: client_address.into(),
            policy,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            identity: None,
            extracted_headers: Vec::new(),
            rate_limit: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Authenticated requests are throttled per user, anonymous ones per client address
    pub fn throttle_key(&self) -> String {
        match &self.identity {
            Some(identity) => format!("user:{}:{}", identity.subject, self.policy.route_class),
            None => format!("ip:{}:{}", self.client_address, self.policy.route_class),
        }
    }
}
