use serde::{Deserialize, Serialize};

use crate::storefront::{
    errors::StorefrontError, InContext, StorefrontQuery, POLICIES_QUERY, POLICY_CONTENT_QUERY,
};

/// The shop policies exposed by the Storefront API, in schema declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Privacy,
    Shipping,
    TermsOfService,
    Refund,
    Subscription,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Privacy,
        PolicyKind::Shipping,
        PolicyKind::TermsOfService,
        PolicyKind::Refund,
        PolicyKind::Subscription,
    ];

    pub fn field_name(&self) -> &'static str {
        match self {
            PolicyKind::Privacy => "privacyPolicy",
            PolicyKind::Shipping => "shippingPolicy",
            PolicyKind::TermsOfService => "termsOfService",
            PolicyKind::Refund => "refundPolicy",
            PolicyKind::Subscription => "subscriptionPolicy",
        }
    }

    pub fn from_field_name(field_name: &str) -> Option<Self> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.field_name() == field_name)
    }

    /// Subscription policies cannot be selected individually; the single
    /// policy query never requests them.
    pub fn is_selectable(&self) -> bool {
        !matches!(self, PolicyKind::Subscription)
    }
}

/// Turns a kebab-case policy handle into the camelCase field name used by
/// the `Shop` object, e.g. `terms-of-service` into `termsOfService`.
pub fn normalize_handle(handle: &str) -> String {
    let mut normalized = String::with_capacity(handle.len());
    let mut chars = handle.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '-' {
            if let Some(next) = chars.next_if(char::is_ascii_lowercase) {
                normalized.push(next.to_ascii_uppercase());
                continue;
            }
        }
        normalized.push(c);
    }

    normalized
}

/// The `@include` variables of the single policy query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionFlags {
    pub privacy_policy: bool,
    pub shipping_policy: bool,
    pub terms_of_service: bool,
    pub refund_policy: bool,
}

impl SelectionFlags {
    /// Selects the policy whose field name matches, leaving everything else
    /// unselected. Unknown names select nothing.
    pub fn for_field_name(field_name: &str) -> Self {
        let mut flags = SelectionFlags::default();
        match PolicyKind::from_field_name(field_name) {
            Some(PolicyKind::Privacy) => flags.privacy_policy = true,
            Some(PolicyKind::Shipping) => flags.shipping_policy = true,
            Some(PolicyKind::TermsOfService) => flags.terms_of_service = true,
            Some(PolicyKind::Refund) => flags.refund_policy = true,
            Some(PolicyKind::Subscription) | None => {}
        }
        flags
    }

    pub fn selected(&self) -> usize {
        [
            self.privacy_policy,
            self.shipping_policy,
            self.terms_of_service,
            self.refund_policy,
        ]
        .into_iter()
        .filter(|flag| *flag)
        .count()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Policy {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
    #[serde(default)]
    pub privacy_policy: Option<Policy>,
    #[serde(default)]
    pub shipping_policy: Option<Policy>,
    #[serde(default)]
    pub terms_of_service: Option<Policy>,
    #[serde(default)]
    pub refund_policy: Option<Policy>,
    #[serde(default)]
    pub subscription_policy: Option<Policy>,
}

impl Shop {
    pub fn get(&self, kind: PolicyKind) -> Option<&Policy> {
        match kind {
            PolicyKind::Privacy => self.privacy_policy.as_ref(),
            PolicyKind::Shipping => self.shipping_policy.as_ref(),
            PolicyKind::TermsOfService => self.terms_of_service.as_ref(),
            PolicyKind::Refund => self.refund_policy.as_ref(),
            PolicyKind::Subscription => self.subscription_policy.as_ref(),
        }
    }

    pub fn take(&mut self, kind: PolicyKind) -> Option<Policy> {
        match kind {
            PolicyKind::Privacy => self.privacy_policy.take(),
            PolicyKind::Shipping => self.shipping_policy.take(),
            PolicyKind::TermsOfService => self.terms_of_service.take(),
            PolicyKind::Refund => self.refund_policy.take(),
            PolicyKind::Subscription => self.subscription_policy.take(),
        }
    }

    /// Present policies in declaration order.
    pub fn into_policies(mut self) -> Vec<Policy> {
        PolicyKind::ALL
            .into_iter()
            .filter_map(|kind| self.take(kind))
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShopData {
    #[serde(default)]
    pub(crate) shop: Option<Shop>,
}

#[derive(Serialize)]
struct PolicyContentVariables<'a> {
    #[serde(flatten)]
    flags: SelectionFlags,
    #[serde(flatten)]
    in_context: &'a InContext,
}

pub mod errors {
    use thiserror::Error;

    use crate::storefront::errors::StorefrontError;

    #[derive(Debug, Error)]
    pub enum PolicyError {
        #[error("error-policy-missing-handle No handle was passed in")]
        MissingHandle(),

        #[error("error-policy-not-found Could not find the policy")]
        NotFound(String),

        #[error("error-policy-none-found No policies found")]
        NoPolicies(),

        #[error(transparent)]
        Storefront(#[from] StorefrontError),
    }

    impl PolicyError {
        pub fn is_not_found(&self) -> bool {
            !matches!(self, PolicyError::Storefront(_))
        }
    }
}

use errors::PolicyError;

/// Fetches the single policy addressed by `handle`.
pub async fn load_policy(
    storefront: &dyn StorefrontQuery,
    in_context: &InContext,
    handle: Option<&str>,
) -> Result<Policy, PolicyError> {
    let handle = handle
        .filter(|handle| !handle.is_empty())
        .ok_or(PolicyError::MissingHandle())?;

    let field_name = normalize_handle(handle);
    let flags = SelectionFlags::for_field_name(&field_name);

    tracing::debug!(handle, field_name = %field_name, selected = flags.selected(), "loading policy");

    let variables = serde_json::to_value(PolicyContentVariables { flags, in_context })
        .map_err(StorefrontError::EncodeVariables)?;

    let data = storefront.query(&POLICY_CONTENT_QUERY, variables).await?;
    let data: ShopData = serde_json::from_value(data).map_err(StorefrontError::DecodeData)?;

    let mut shop = data.shop.unwrap_or_default();

    PolicyKind::from_field_name(&field_name)
        .and_then(|kind| shop.take(kind))
        .ok_or(PolicyError::NotFound(field_name))
}

/// Fetches every policy the shop has published.
pub async fn load_policies(
    storefront: &dyn StorefrontQuery,
    in_context: &InContext,
) -> Result<Vec<Policy>, PolicyError> {
    let variables = serde_json::to_value(in_context).map_err(StorefrontError::EncodeVariables)?;

    let data = storefront.query(&POLICIES_QUERY, variables).await?;
    let data: ShopData = serde_json::from_value(data).map_err(StorefrontError::DecodeData)?;

    let policies = data.shop.unwrap_or_default().into_policies();
    if policies.is_empty() {
        return Err(PolicyError::NoPolicies());
    }

    tracing::debug!(count = policies.len(), "loaded policies");

    Ok(policies)
}
