use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::ACCEPT_LANGUAGE, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use storefront_policies::{
    http::{
        context::{I18nContext, WebContext},
        server::build_router,
        templates::build_engine,
    },
    i18n::{reload::populate_locale, Locales},
    seo::Seo,
    storefront::{errors::StorefrontError, Operation, StorefrontQuery},
};
use tower::ServiceExt;
use unic_langid::LanguageIdentifier;

/// Answers queries from a fixed `shop` object, honoring the `@include`
/// variables of the single policy query.
struct CannedStorefront {
    shop: Value,
    fail: bool,
    requests: Mutex<Vec<(String, Value)>>,
}

impl CannedStorefront {
    fn new(shop: Value) -> Arc<Self> {
        Arc::new(Self {
            shop,
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            shop: Value::Null,
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl StorefrontQuery for CannedStorefront {
    async fn query(&self, operation: &Operation, variables: Value) -> Result<Value, StorefrontError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((operation.name.to_string(), variables.clone()));

        if self.fail {
            return Err(StorefrontError::QueryFailed(
                "Field 'bogus' doesn't exist on type 'Shop'".to_string(),
            ));
        }

        let Some(shop) = self.shop.as_object() else {
            return Ok(json!({ "shop": self.shop }));
        };

        if operation.name != "Policy" {
            return Ok(json!({ "shop": shop }));
        }

        let selected = shop
            .iter()
            .filter(|(field, _)| variables[field.as_str()].as_bool() == Some(true))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect::<Map<String, Value>>();

        Ok(json!({ "shop": selected }))
    }
}

fn app(storefront: Arc<CannedStorefront>) -> Router {
    let supported_languages: Vec<LanguageIdentifier> = vec![
        "en-us".parse().expect("valid language"),
        "fr-ca".parse().expect("valid language"),
    ];
    let mut locales = Locales::new(supported_languages.clone());
    populate_locale(&supported_languages, &mut locales).expect("locales load");

    let web_context = WebContext::new(
        "shop.example.com",
        build_engine(),
        storefront,
        Seo::site("Hydrogen", "Hydrogen demo store"),
        I18nContext::new(supported_languages, locales),
    );

    build_router(web_context).expect("router builds")
}

async fn get(app: Router, uri: &str, language: Option<&str>) -> (StatusCode, String) {
    let mut request = Request::get(uri);
    if let Some(language) = language {
        request = request.header(ACCEPT_LANGUAGE, language);
    }

    let response = app
        .oneshot(request.body(Body::empty()).expect("failed to build request"))
        .await
        .expect("request failed");

    let status = response.status();
    let body_bytes = response
        .into_body()
        .collect()
        .await
        .expect("body bytes")
        .to_bytes();

    (
        status,
        String::from_utf8(body_bytes.to_vec()).expect("utf-8 body"),
    )
}

/// minijinja's HTML escaping also encodes `/`.
fn escaped(value: &str) -> String {
    value.replace('/', "&#x2f;")
}

fn policy(id: &str, title: &str, handle: &str, body: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "handle": handle,
        "body": body,
        "url": format!("https://example.myshopify.com/policies/{}", handle),
    })
}

fn all_policies() -> Value {
    json!({
        "privacyPolicy": policy("1", "Privacy Policy", "privacy-policy", "<p>Privacy</p>"),
        "shippingPolicy": null,
        "termsOfService": policy("3", "Terms & Conditions", "terms-of-service", "<p>Terms</p>"),
        "refundPolicy": policy(
            "4",
            "Refund Policy",
            "refund-policy",
            "<p>We accept <strong>returns</strong> within 30 days.</p>"
        ),
        "subscriptionPolicy": policy("5", "Subscription Policy", "subscription-policy", ""),
    })
}

#[tokio::test]
async fn homepage_links_to_featured_product() {
    let (status, body) = get(app(CannedStorefront::new(Value::Null)), "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&format!(
        r#"href="{}""#,
        escaped("/products/high-top-sneakers?Size=6")
    )));
    assert!(body.contains(">Sneakers</a>"));
    assert!(body.contains("<title>Index</title>"));
}

#[tokio::test]
async fn policy_renders_title_and_raw_body() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/refund-policy", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Refund Policy</h1>"));
    assert!(body.contains("<p>We accept <strong>returns</strong> within 30 days.</p>"));
    assert!(body.contains(&format!(
        r#"<link rel="canonical" href="{}">"#,
        escaped("https://shop.example.com/policies/refund-policy")
    )));
    assert!(body.contains("We accept returns within 30 days."));

    let requests = storefront.requests();
    assert_eq!(requests.len(), 1);
    let (operation, variables) = &requests[0];
    assert_eq!(operation, "Policy");
    assert_eq!(
        variables,
        &json!({
            "privacyPolicy": false,
            "shippingPolicy": false,
            "termsOfService": false,
            "refundPolicy": true,
            "language": "EN",
            "country": "US",
        })
    );
}

#[tokio::test]
async fn policy_title_is_escaped() {
    let (status, body) = get(
        app(CannedStorefront::new(all_policies())),
        "/policies/terms-of-service",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Terms &amp; Conditions</h1>"));
}

#[tokio::test]
async fn unknown_policy_is_not_found() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/not-a-real-policy", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find the policy"));

    let requests = storefront.requests();
    assert_eq!(requests.len(), 1);
    for flag in ["privacyPolicy", "shippingPolicy", "termsOfService", "refundPolicy"] {
        assert_eq!(requests[0].1[flag], json!(false), "{}", flag);
    }
}

#[tokio::test]
async fn subscription_policy_is_not_selectable() {
    let (status, body) = get(
        app(CannedStorefront::new(all_policies())),
        "/policies/subscription-policy",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find the policy"));
}

#[tokio::test]
async fn null_policy_is_not_found() {
    let (status, _) = get(
        app(CannedStorefront::new(all_policies())),
        "/policies/shipping-policy",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_handle_is_not_found() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No handle was passed in"));
    assert!(storefront.requests().is_empty());
}

#[tokio::test]
async fn padded_handle_is_not_found() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/%20refund-policy", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find the policy"));

    let requests = storefront.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].1["refundPolicy"], json!(false));
}

#[tokio::test]
async fn blank_handle_queries_upstream() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/%20", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find the policy"));
    assert!(!body.contains("No handle was passed in"));
    assert_eq!(storefront.requests().len(), 1);
}

#[tokio::test]
async fn unreadable_handle_is_not_found() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies/%FF", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Could not find the policy"));
    assert!(!body.contains("No handle was passed in"));
    assert!(storefront.requests().is_empty());
}

#[tokio::test]
async fn policy_description_decodes_entities() {
    let shop = json!({
        "privacyPolicy": policy(
            "1",
            "Privacy Policy",
            "privacy-policy",
            "<p>We don&rsquo;t sell data &amp; never will.</p>"
        ),
    });
    let (status, body) = get(app(CannedStorefront::new(shop)), "/policies/privacy-policy", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("We don\u{2019}t sell data &amp; never will."));
    assert!(!body.contains("&amp;amp;"));
}

#[tokio::test]
async fn not_found_message_is_localized() {
    let (status, body) = get(
        app(CannedStorefront::new(all_policies())),
        "/policies/not-a-real-policy",
        Some("fr-CA,en-US;q=0.5"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Impossible de trouver la politique"));
}

#[tokio::test]
async fn policies_list_in_declaration_order() {
    let storefront = CannedStorefront::new(all_policies());
    let (status, body) = get(app(storefront.clone()), "/policies", None).await;

    assert_eq!(status, StatusCode::OK);

    let positions = [
        "/policies/privacy-policy",
        "/policies/terms-of-service",
        "/policies/refund-policy",
        "/policies/subscription-policy",
    ]
    .iter()
    .map(|href| body.find(&format!(r#"href="{}""#, href)).expect("policy link"))
    .collect::<Vec<usize>>();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    assert!(!body.contains("/policies/shipping-policy"));
    assert!(body.contains("BreadcrumbList"));

    let requests = storefront.requests();
    assert_eq!(requests[0].0, "Policies");
    assert_eq!(requests[0].1, json!({"language": "EN", "country": "US"}));
}

#[tokio::test]
async fn empty_policies_are_not_found() {
    let shop = json!({
        "privacyPolicy": null,
        "shippingPolicy": null,
        "termsOfService": null,
        "refundPolicy": null,
        "subscriptionPolicy": null,
    });
    let (status, body) = get(app(CannedStorefront::new(shop)), "/policies", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("No policies found"));

    let (status, _) = get(app(CannedStorefront::new(Value::Null)), "/policies", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upstream_errors_are_internal() {
    let (status, _) = get(app(CannedStorefront::failing()), "/policies", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = get(
        app(CannedStorefront::failing()),
        "/policies/refund-policy",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
