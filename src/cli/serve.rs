//! Serve command

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::cli::AppContext;
use crate::error::Result;
use crate::server::{self, AppState};

pub async fn run(ctx: &AppContext, bind: Option<&str>) -> Result<()> {
    let addr = bind.unwrap_or(&ctx.config.bind);
    let listener = TcpListener::bind(addr).await?;

    let state = AppState {
        site: Arc::new(ctx.site()),
        refreshers: Arc::new(ctx.refreshers()?),
    };
    server::serve(listener, state).await
}
