use vhostd::config::Config;
use vhostd::server::Listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level()?)
        .init();

    let mut listener = Listener::new(&cfg);
    if let Err(e) = listener.bind(&cfg.server.listen_addr).await {
        tracing::error!(error = %e, "Server not started");
        return Err(e.into());
    }

    tokio::select! {
        res = listener.run() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
