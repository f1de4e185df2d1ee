use axum_template::engine::Engine;

use crate::http::context::AppEngine;

#[cfg(feature = "reload")]
pub fn build_engine() -> AppEngine {
    use minijinja::{path_loader, Environment};
    use minijinja_autoreload::AutoReloader;
    use std::path::PathBuf;

    let template_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");

    Engine::new(AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_loader(path_loader(&template_path));
        notifier.set_fast_reload(true);
        notifier.watch_path(&template_path, true);
        Ok(env)
    }))
}

#[cfg(feature = "embed")]
pub fn build_engine() -> AppEngine {
    use minijinja::Environment;

    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    minijinja_embed::load_templates!(&mut env);
    Engine::new(env)
}
