//! HTTP server facade for Bookshelf with Axum, error handling, and OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{http::StatusCode, routing::get, Router};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Bind the configured address and serve until `shutdown` resolves
pub async fn start_server<F>(
    registry: &ModuleRegistry,
    settings: &Settings,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    tracing::info!("starting HTTP server on {}", addr);

    let app = build_router(registry, settings);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to address {addr}"))?;

    tracing::info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server drained");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    let probes = registry.clone();
    let mut router_builder =
        RouterBuilder::new().route("/healthz", get(move || health_check(probes.clone())));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes());
    }

    tracing::info!(
        dir = %settings.uploads.dir.display(),
        prefix = %settings.uploads.url_prefix,
        "serving uploaded files"
    );

    router_builder
        .with_static_dir(&settings.uploads.url_prefix, &settings.uploads.dir)
        .with_openapi(registry)
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .build()
}

/// `ok`, or 503 listing each module whose probe failed
async fn health_check(registry: ModuleRegistry) -> (StatusCode, String) {
    let failing = registry.check_health().await;
    if failing.is_empty() {
        return (StatusCode::OK, "ok".to_string());
    }

    let report: Vec<String> = failing
        .into_iter()
        .map(|(module, error)| format!("{module}: {error}"))
        .collect();
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("unhealthy\n{}", report.join("\n")),
    )
}
