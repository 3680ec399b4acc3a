use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let logger = sharedlog_observability::init("sharedlog-api")?;

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    let app = sharedlog_api::app::build_app(logger);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
