use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use url::Url;

use crate::auth::Token;
use crate::query::Request;
use crate::{Result, API_URL, CLIENT_PLATFORM};

/// Delivers a GraphQL operation and returns the raw response envelope.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<Value>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    token: Token,
}

impl HttpTransport {
    pub fn new(token: Token) -> Result<Self> {
        Self::with_base(&API_URL, token)
    }

    pub fn with_base(base: &Url, token: Token) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: base.join("graphql")?,
            token,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(operation = request.operation_name))]
    async fn execute(&self, request: &Request) -> Result<Value> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, self.token.header_value())
            .header("Client-Platform", CLIENT_PLATFORM)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}
