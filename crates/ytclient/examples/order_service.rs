//! An order service and its client in one process, end to end over TCP.
//!
//! Run with `RUST_LOG=debug` to watch the invocation path at work:
//!
//! ```sh
//! RUST_LOG=debug cargo run --example order_service
//! ```

use std::sync::Arc;

use ytclient::Cluster;
use ytclient::Endpoint;
use ytclient::FaultPolicy;
use ytclient::Proxy;
use ytclient::RandomBalancer;
use ytclient::Server;
use ytclient::ServiceRegistry;
use ytclient::StaticRegistry;
use ytclient::TcpConnector;
use ytproto::Format;
use ytproto::Value;

const FORMAT: Format = Format::Compact;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let services = Arc::new(ServiceRegistry::new());
    services.register("OrderService", "placeOrder", |args| match args {
        [Value::Str(sku), Value::I32(quantity)] if *quantity > 0 => {
            tracing::info!(%sku, quantity, "order accepted");
            Ok(Value::Bool(true))
        }
        _ => Err(anyhow::anyhow!("order must be (sku, positive quantity)")),
    });

    let server = Server::bind("127.0.0.1:0", FORMAT, services).await?;
    tracing::info!(addr = %server.local_addr(), "order service listening");

    let registry = StaticRegistry::new();
    registry.register(
        "OrderService",
        vec![Endpoint::new("127.0.0.1", server.local_addr().port())],
    );

    let cluster = Arc::new(Cluster::new(
        FaultPolicy::FailOver,
        Arc::new(RandomBalancer),
        Arc::new(TcpConnector::new(FORMAT)),
    ));
    let proxy = Proxy::new("OrderService", &registry, cluster);

    let result = proxy
        .invoke(
            "placeOrder",
            &["string", "i32"],
            vec![Value::Str("A1".into()), Value::I32(3)],
        )
        .await?;
    tracing::info!(?result, "placeOrder returned");

    match proxy
        .invoke(
            "placeOrder",
            &["string", "i32"],
            vec![Value::Str("A1".into()), Value::I32(0)],
        )
        .await
    {
        Ok(value) => tracing::warn!(?value, "zero-quantity order unexpectedly accepted"),
        Err(e) => tracing::info!(error = %e, "zero-quantity order rejected remotely"),
    }

    Ok(())
}
