use email_collector::{config::AppConfig, telemetry, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        telemetry::init_production_tracing(&config.log_config.level)
    }
    #[cfg(debug_assertions)]
    {
        telemetry::init_dbg_tracing(&config.log_config.level);
    }

    let app = App::build_from_config(&config).await?;
    email_collector::serve(app).await?;

    Ok(())
}
