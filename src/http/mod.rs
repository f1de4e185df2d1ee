pub mod context;
pub mod handle_index;
pub mod handle_policies;
pub mod handle_policy;
pub mod middleware_i18n;
pub(crate) mod page;
pub mod server;
pub mod templates;
