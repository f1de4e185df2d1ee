use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use unic_langid::LanguageIdentifier;

use crate::storefront::errors::StorefrontError;

pub(crate) const HEADER_ACCESS_TOKEN: &str = "X-Shopify-Storefront-Access-Token";

/// A named GraphQL document sent to the Storefront API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub document: &'static str,
}

pub const POLICY_CONTENT_QUERY: Operation = Operation {
    name: "Policy",
    document: include_str!("../queries/policy_content.graphql"),
};

pub const POLICIES_QUERY: Operation = Operation {
    name: "Policies",
    document: include_str!("../queries/policies.graphql"),
};

/// The `@inContext` variables shared by every query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl From<&LanguageIdentifier> for InContext {
    fn from(value: &LanguageIdentifier) -> Self {
        let language = Some(value.language)
            .filter(|language| !language.is_empty())
            .map(|language| language.as_str().to_uppercase());
        let country = value.region.map(|region| region.as_str().to_uppercase());
        Self { language, country }
    }
}

#[async_trait]
pub trait StorefrontQuery: Send + Sync {
    /// Runs `operation` and returns the response's `data` object.
    async fn query(&self, operation: &Operation, variables: Value) -> Result<Value, StorefrontError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequest<'a> {
    query: &'a str,
    operation_name: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,

    #[serde(default)]
    errors: Vec<GraphQLError>,
}

pub struct StorefrontClient {
    http_client: reqwest::Client,
    endpoint: String,
    access_token: Option<String>,
}

impl StorefrontClient {
    pub fn new(
        http_client: &reqwest::Client,
        store_domain: &str,
        api_version: &str,
        access_token: Option<String>,
    ) -> Self {
        Self {
            http_client: http_client.clone(),
            endpoint: endpoint(store_domain, api_version),
            access_token,
        }
    }
}

pub(crate) fn endpoint(store_domain: &str, api_version: &str) -> String {
    let store_domain = store_domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}/api/{}/graphql.json", store_domain, api_version)
}

#[async_trait]
impl StorefrontQuery for StorefrontClient {
    async fn query(&self, operation: &Operation, variables: Value) -> Result<Value, StorefrontError> {
        let mut request = self.http_client.post(&self.endpoint).json(&GraphQLRequest {
            query: operation.document,
            operation_name: operation.name,
            variables,
        });
        if let Some(access_token) = &self.access_token {
            request = request.header(HEADER_ACCESS_TOKEN, access_token);
        }

        let response = request
            .send()
            .await
            .map_err(StorefrontError::RequestFailed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorefrontError::UnexpectedStatus(status.as_u16()));
        }

        let response: GraphQLResponse = response
            .json()
            .await
            .map_err(StorefrontError::RequestFailed)?;

        into_data(operation, response)
    }
}

fn into_data(operation: &Operation, response: GraphQLResponse) -> Result<Value, StorefrontError> {
    if !response.errors.is_empty() {
        let messages = response
            .errors
            .into_iter()
            .map(|err| err.message)
            .collect::<Vec<String>>();
        tracing::warn!(operation = operation.name, ?messages, "storefront query returned errors");
        return Err(StorefrontError::QueryFailed(messages.join("; ")));
    }

    response.data.ok_or(StorefrontError::MissingData())
}

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum StorefrontError {
        #[error("error-storefront-request-failed Storefront request failed: {0}")]
        RequestFailed(reqwest::Error),

        #[error("error-storefront-unexpected-status Storefront responded with status {0}")]
        UnexpectedStatus(u16),

        #[error("error-storefront-query-failed Storefront query failed: {0}")]
        QueryFailed(String),

        #[error("error-storefront-missing-data Storefront response had no data")]
        MissingData(),

        #[error("error-storefront-encode-variables Query variables could not be encoded: {0}")]
        EncodeVariables(serde_json::Error),

        #[error("error-storefront-decode-data Storefront data could not be decoded: {0}")]
        DecodeData(serde_json::Error),
    }
}
