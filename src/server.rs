//! Serves a rendered page over HTTP.
//!
//! Every path answers with the same page.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use tokio::net::TcpListener;

use crate::error::Result;

/// Router answering every request with `page`.
pub fn router(page: String) -> Router {
    let page = Arc::new(page);
    Router::new().fallback(move || {
        let page = Arc::clone(&page);
        async move { Html(page.as_str().to_owned()) }
    })
}

/// Serve `page` on localhost until the process exits.
pub async fn serve(page: String, port: u16) -> Result<()> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await?;
    serve_listener(listener, page).await
}

/// Serve `page` on an already bound listener.
pub async fn serve_listener(listener: TcpListener, page: String) -> Result<()> {
    log::info!("Serving new-work page on http://{}", listener.local_addr()?);
    axum::serve(listener, router(page)).await?;
    Ok(())
}
