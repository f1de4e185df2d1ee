use axum::extract::FromRef;
use axum_template::engine::Engine;
use std::{ops::Deref, sync::Arc};
use unic_langid::LanguageIdentifier;

use crate::{i18n::Locales, seo::Seo, storefront::StorefrontQuery};

#[cfg(feature = "reload")]
use minijinja_autoreload::AutoReloader;

#[cfg(feature = "reload")]
pub type AppEngine = Engine<AutoReloader>;

#[cfg(feature = "embed")]
use minijinja::Environment;

#[cfg(feature = "embed")]
pub type AppEngine = Engine<Environment<'static>>;

pub struct I18nContext {
    pub(crate) supported_languages: Vec<LanguageIdentifier>,
    pub(crate) locales: Locales,
}

pub struct InnerWebContext {
    pub(crate) external_base: String,
    pub(crate) engine: AppEngine,
    pub(crate) storefront: Arc<dyn StorefrontQuery>,
    pub(crate) site_seo: Seo,
    pub(crate) i18n_context: I18nContext,
}

#[derive(Clone, FromRef)]
pub struct WebContext(pub(crate) Arc<InnerWebContext>);

impl Deref for WebContext {
    type Target = InnerWebContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl WebContext {
    pub fn new(
        external_base: &str,
        engine: AppEngine,
        storefront: Arc<dyn StorefrontQuery>,
        site_seo: Seo,
        i18n_context: I18nContext,
    ) -> Self {
        Self(Arc::new(InnerWebContext {
            external_base: external_base.to_string(),
            engine,
            storefront,
            site_seo,
            i18n_context,
        }))
    }

    /// The absolute URL of a request, as seen by visitors.
    pub(crate) fn request_url(&self, path_and_query: &str) -> String {
        format!("https://{}{}", self.external_base, path_and_query)
    }
}

impl I18nContext {
    pub fn new(supported_languages: Vec<LanguageIdentifier>, locales: Locales) -> Self {
        Self {
            supported_languages,
            locales,
        }
    }
}
