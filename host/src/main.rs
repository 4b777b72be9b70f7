use anyhow::Result;
use tracing::{info, warn};

mod config;
mod window;

use config::DemoConfig;
use window::DemoWindow;

fn main() -> Result<()> {
    let config = DemoConfig::from_args(std::env::args().skip(1))?;
    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .init();

    info!("Start main function.");
    for arg in &config.ignored_args {
        warn!("ignoring unknown argument {:?}", arg);
    }
    info!(
        "{}x{} vsync={} show_fps={}",
        config.width, config.height, config.vsync, config.show_fps
    );

    DemoWindow::new(config).run()?;

    info!("Exit main function.");
    Ok(())
}
