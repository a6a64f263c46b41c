use std::net::SocketAddr;
use std::path::Path;

use tracing::info;

use heatgrid_core::HeatgridConfig;
use heatgrid_dashboard::{DashboardState, dashboard_router};

use super::build_pipeline;

pub async fn serve(config: &HeatgridConfig, fixture: Option<&Path>, port: u16) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config, fixture)?;
    let state = DashboardState::new(pipeline, config);
    state.render.check().map_err(anyhow::Error::msg)?;
    let router = dashboard_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "dashboard starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
