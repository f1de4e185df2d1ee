use anyhow::Result;
use axum::{
    extract::{OriginalUri, State},
    response::IntoResponse,
};
use axum_template::RenderHtml;
use minijinja::context as template_context;

use crate::{
    errors::WebError,
    http::{context::WebContext, middleware_i18n::Language, page::path_and_query},
    seo::Seo,
};

pub(crate) const FEATURED_PRODUCT_PATH: &str = "/products/high-top-sneakers?Size=6";

pub async fn handle_index(
    State(web_context): State<WebContext>,
    Language(language): Language,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse, WebError> {
    let url = web_context.request_url(path_and_query(&uri));
    let seo = web_context.site_seo.clone().merge(Seo::homepage(&url));

    let default_context = template_context! {
        language => language.to_string(),
        canonical_url => url,
        seo => seo.tags(),
        featured_product_path => FEATURED_PRODUCT_PATH,
    };

    Ok(RenderHtml(
        "index.en-us.html",
        web_context.engine.clone(),
        default_context,
    )
    .into_response())
}
