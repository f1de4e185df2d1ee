use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_template::RenderHtml;
use minijinja::context as template_context;
use unic_langid::LanguageIdentifier;

use crate::{errors::expand_error, http::context::WebContext, policy::errors::PolicyError};

pub(crate) fn path_and_query(uri: &Uri) -> &str {
    uri.path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or("/")
}

/// Renders the not-found page with the localized message of `err`.
pub(crate) fn not_found(
    web_context: &WebContext,
    language: &LanguageIdentifier,
    err: &PolicyError,
) -> Response {
    tracing::debug!(error = ?err, "not found");

    let (key, message) = expand_error(err.to_string());
    let message = web_context
        .i18n_context
        .locales
        .format_error(language, &key, &message);

    let default_context = template_context! {
        language => language.to_string(),
        seo => web_context.site_seo.tags(),
        message => message,
    };

    (
        StatusCode::NOT_FOUND,
        RenderHtml(
            "not_found.en-us.html",
            web_context.engine.clone(),
            default_context,
        ),
    )
        .into_response()
}
