use anyhow::Result;
use errors::I18nError;
use fluent::FluentResource;
use fluent_bundle::bundle::FluentBundle;
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

pub type Bundle = FluentBundle<FluentResource, intl_memoizer::concurrent::IntlLangMemoizer>;

pub(crate) const LOCALE_FILES: [&str; 1] = ["errors"];

pub struct Locales(pub(crate) HashMap<LanguageIdentifier, Bundle>);

impl Locales {
    pub fn new(locales: Vec<LanguageIdentifier>) -> Self {
        let mut store = HashMap::new();
        for locale in &locales {
            let mut bundle: Bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
            bundle.set_use_isolating(false);
            store.insert(locale.clone(), bundle);
        }
        Self(store)
    }

    pub fn add_bundle(
        &mut self,
        locale: LanguageIdentifier,
        content: String,
    ) -> Result<(), I18nError> {
        let bundle = self
            .0
            .get_mut(&locale)
            .ok_or(I18nError::InvalidLanguage())?;

        let resource = FluentResource::try_new(content)
            .map_err(|(_, errors)| I18nError::LanguageResourceFailed(errors))?;

        bundle
            .add_resource(resource)
            .map_err(I18nError::BundleLoadFailed)?;

        Ok(())
    }

    /// Looks up the localized text for an error key, returning `fallback`
    /// when the locale or message is unknown.
    pub(crate) fn format_error(
        &self,
        locale: &LanguageIdentifier,
        key: &str,
        fallback: &str,
    ) -> String {
        let Some(bundle) = self.0.get(locale) else {
            return fallback.to_string();
        };

        let Some(pattern) = bundle.get_message(key).and_then(|message| message.value()) else {
            return fallback.to_string();
        };

        let mut errors = Vec::new();
        let formatted = bundle.format_pattern(pattern, None, &mut errors);
        if !errors.is_empty() {
            tracing::warn!(key, ?errors, "unable to format localized message");
        }

        formatted.to_string()
    }
}

#[cfg(feature = "embed")]
pub mod embed {
    use super::*;

    use errors::I18nError;
    use rust_embed::Embed;

    #[derive(Embed)]
    #[folder = "i18n/"]
    struct I18nAssets;

    pub fn populate_locale(
        supported_locales: &Vec<LanguageIdentifier>,
        locales: &mut Locales,
    ) -> Result<(), I18nError> {
        for locale in supported_locales {
            for file in LOCALE_FILES {
                let source_file = format!("{}/{}.ftl", locale.to_string().to_lowercase(), file);
                let i18n_asset = I18nAssets::get(&source_file)
                    .ok_or_else(|| I18nError::LocaleFileMissing(source_file.clone()))?;
                let content = std::str::from_utf8(i18n_asset.data.as_ref())
                    .map_err(|_| I18nError::LocaleFileInvalid(source_file.clone()))?;
                locales.add_bundle(locale.clone(), content.to_string())?;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "reload")]
pub mod reload {
    use errors::I18nError;

    use super::*;

    use std::path::PathBuf;

    pub fn populate_locale(
        supported_locales: &Vec<LanguageIdentifier>,
        locales: &mut Locales,
    ) -> Result<(), I18nError> {
        for locale in supported_locales {
            let locale_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("i18n")
                .join(locale.to_string().to_lowercase());
            for file in LOCALE_FILES {
                let source_file = locale_dir.join(format!("{}.ftl", file));
                tracing::info!("Loading locale file: {:?}", source_file);
                let content = std::fs::read_to_string(&source_file).map_err(|_| {
                    I18nError::LocaleFileMissing(source_file.display().to_string())
                })?;
                locales.add_bundle(locale.clone(), content)?;
            }
        }
        Ok(())
    }
}

pub mod errors {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum I18nError {
        #[error("error-i18n-invalid-language Invalid language")]
        InvalidLanguage(),

        #[error("error-i18n-resource-failed Language resource failed")]
        LanguageResourceFailed(Vec<fluent_syntax::parser::ParserError>),

        #[error("error-i18n-bundle-load Bundle load failed")]
        BundleLoadFailed(Vec<fluent::FluentError>),

        #[error("error-i18n-locale-file-missing Locale file not found: {0}")]
        LocaleFileMissing(String),

        #[error("error-i18n-locale-file-invalid Locale file is not valid UTF-8: {0}")]
        LocaleFileInvalid(String),
    }
}
