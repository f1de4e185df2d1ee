use anyhow::Result;
use axum::{
    extract::{OriginalUri, State},
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use minijinja::context as template_context;

use crate::{
    errors::WebError,
    http::{
        context::WebContext,
        middleware_i18n::Language,
        page::{not_found, path_and_query},
    },
    policy::load_policies,
    seo::Seo,
    storefront::InContext,
};

pub async fn handle_policies(
    State(web_context): State<WebContext>,
    Language(language): Language,
    OriginalUri(uri): OriginalUri,
) -> Result<Response, WebError> {
    let in_context = InContext::from(&language);

    let policies = match load_policies(web_context.storefront.as_ref(), &in_context).await {
        Ok(policies) => policies,
        Err(err) if err.is_not_found() => return Ok(not_found(&web_context, &language, &err)),
        Err(err) => return Err(err.into()),
    };

    let url = web_context.request_url(path_and_query(&uri));
    let seo = web_context
        .site_seo
        .clone()
        .merge(Seo::policies(&policies, &url));

    let default_context = template_context! {
        language => language.to_string(),
        canonical_url => url,
        seo => seo.tags(),
        policies => policies,
    };

    Ok(RenderHtml(
        "policies.en-us.html",
        web_context.engine.clone(),
        default_context,
    )
    .into_response())
}
