use lifegrid::{LifeApp, LifeConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("lifegrid=info,wgpu_core=warn,wgpu_hal=warn"),
    )
    .init();

    let config = LifeConfig::from_env()?;
    log::info!(
        "Starting with a {}x{} grid, rate exponent {}",
        config.grid_width,
        config.grid_height,
        config.rate_exponent
    );

    LifeApp::new(config)?.run()?;
    Ok(())
}
