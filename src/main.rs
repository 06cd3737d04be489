use learnify_backend::{config, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;
    logging::init(&config)?;
    config.print_summary();

    if let Err(e) = server::run(config).await {
        tracing::error!("Fatal startup error: {e:#}");
        return Err(e);
    }

    Ok(())
}
