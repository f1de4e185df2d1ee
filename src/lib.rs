pub mod config;
pub(crate) mod errors;
pub mod http;
pub mod i18n;
pub mod policy;
pub mod seo;
pub mod storefront;
