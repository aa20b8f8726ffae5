//! HTTP endpoint reachability check

use http::StatusCode;
use tracing::{debug, info};

use crate::check::{Check, CheckResult};
use crate::error::Result;

/// GETs a URL and reports healthy iff the response status is 200.
///
/// A non-200 status is an unhealthy result; a transport failure (connection
/// refused, DNS, TLS) propagates as an error and is isolated by the
/// executor. Timeouts, proxies and the like are configured on the client.
pub struct HttpCheck {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpCheck {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait::async_trait]
impl Check for HttpCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<CheckResult> {
        info!("Execute check '{}'", self.name);

        let response = self.client.get(&self.url).send().await?;
        debug!(
            "Check '{}' got status {} from {}",
            self.name,
            response.status(),
            self.url
        );

        if response.status() == StatusCode::OK {
            Ok(CheckResult::healthy())
        } else {
            Ok(CheckResult::unhealthy(format!(
                "HTTP status code {} for check {}",
                response.status().as_u16(),
                self.name
            )))
        }
    }
}
