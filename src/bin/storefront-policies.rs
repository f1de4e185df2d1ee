use anyhow::Result;
use std::{env, sync::Arc};
use storefront_policies::{
    config::Config,
    http::{
        context::{I18nContext, WebContext},
        server::build_router,
        templates::build_engine,
    },
    i18n::Locales,
    seo::Seo,
    storefront::StorefrontClient,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[cfg(feature = "embed")]
use storefront_policies::i18n::embed::populate_locale;

#[cfg(feature = "reload")]
use storefront_policies::i18n::reload::populate_locale;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "storefront_policies=info,tower_http=info".into()
        }))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = storefront_policies::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{}", version);
            std::process::exit(0);
        }
    });

    let config = Config::new()?;

    let http_client = reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(*config.http_client_timeout.as_ref())
        .build()?;

    let storefront = StorefrontClient::new(
        &http_client,
        &config.storefront.store_domain,
        &config.storefront.api_version,
        config.storefront.access_token.clone(),
    );

    let supported_languages = config.supported_languages.as_ref().clone();
    let mut locales = Locales::new(supported_languages.clone());
    populate_locale(&supported_languages, &mut locales)?;

    let web_context = WebContext::new(
        &config.external_base,
        build_engine(),
        Arc::new(storefront),
        Seo::site(&config.store_name, &config.store_description),
        I18nContext::new(supported_languages, locales),
    );

    let app = build_router(web_context)?;

    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!(error = ?err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut terminate) => {
                    terminate.recv().await;
                }
                Err(err) => {
                    tracing::error!(error = ?err, "failed to install signal handler");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    {
        let inner_config = config.clone();
        let http_port = *inner_config.http_port.as_ref();
        let inner_token = token.clone();
        tracker.spawn(async move {
            let bind_address = format!("0.0.0.0:{}", http_port);
            tracing::info!(version = %inner_config.version, %bind_address, "starting http server");

            let listener = match TcpListener::bind(&bind_address).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!(error = ?err, "unable to bind http listener");
                    inner_token.cancel();
                    return;
                }
            };

            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        () = shutdown_token.cancelled() => { }
                    }
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!(error = ?err, "axum task failed");
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
