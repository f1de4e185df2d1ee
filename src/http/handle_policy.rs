use anyhow::Result;
use axum::{
    extract::{rejection::PathRejection, OriginalUri, Path, State},
    http::Uri,
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use minijinja::context as template_context;
use unic_langid::LanguageIdentifier;

use crate::{
    errors::WebError,
    http::{
        context::WebContext,
        middleware_i18n::Language,
        page::{not_found, path_and_query},
    },
    policy::{errors::PolicyError, load_policy},
    seo::Seo,
    storefront::InContext,
};

pub async fn handle_policy(
    State(web_context): State<WebContext>,
    Language(language): Language,
    OriginalUri(uri): OriginalUri,
    handle: Result<Path<String>, PathRejection>,
) -> Result<Response, WebError> {
    let handle = match handle {
        Ok(Path(handle)) => handle,
        Err(rejection) => {
            // A handle was sent but cannot be read, e.g. invalid UTF-8.
            tracing::debug!(error = %rejection.body_text(), "unreadable policy handle");
            let err = PolicyError::NotFound(uri.path().to_string());
            return Ok(not_found(&web_context, &language, &err));
        }
    };

    render_policy(&web_context, &language, &uri, Some(&handle)).await
}

/// `/policies/` with nothing after the slash.
pub async fn handle_policy_without_handle(
    State(web_context): State<WebContext>,
    Language(language): Language,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    render_policy(&web_context, &language, &uri, None).await
}

async fn render_policy(
    web_context: &WebContext,
    language: &LanguageIdentifier,
    uri: &Uri,
    handle: Option<&str>,
) -> Result<Response, WebError> {
    let in_context = InContext::from(language);

    let policy = match load_policy(web_context.storefront.as_ref(), &in_context, handle).await {
        Ok(policy) => policy,
        Err(err) if err.is_not_found() => return Ok(not_found(web_context, language, &err)),
        Err(err) => return Err(err.into()),
    };

    let url = web_context.request_url(path_and_query(uri));
    let seo = web_context
        .site_seo
        .clone()
        .merge(Seo::policy(&policy, &url));

    let default_context = template_context! {
        language => language.to_string(),
        canonical_url => url,
        seo => seo.tags(),
        policy => policy,
    };

    Ok(RenderHtml(
        "policy.en-us.html",
        web_context.engine.clone(),
        default_context,
    )
    .into_response())
}
