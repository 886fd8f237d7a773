use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Handed to every lifecycle hook that needs configuration
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A self-contained slice of the application: its routes, API docs and
/// lifecycle hooks. Hooks default to no-ops.
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name; doubles as the URL segment the routes are nested under
    fn name(&self) -> &'static str;

    /// Prepare resources (directories, connections). Runs for every module
    /// before any module is started.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to `/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to `/{name}` and any `components.schemas`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Readiness probe behind `/healthz`
    async fn health(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
