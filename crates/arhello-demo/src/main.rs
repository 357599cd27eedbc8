use anyhow::Result;
use arhello_engine::PipelineConfig;
use arhello_engine::device::GpuInit;
use arhello_engine::logging::{LoggingConfig, init_logging};
use arhello_engine::session::SimulatedSession;
use arhello_engine::window::{Runtime, RuntimeConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = PipelineConfig::default();
    let session = SimulatedSession::new(config.camera_image_size);
    log::info!(
        "starting with a simulated session, camera image {}x{}",
        config.camera_image_size.0,
        config.camera_image_size.1
    );

    Runtime::run(
        RuntimeConfig {
            title: "arhello".into(),
            ..Default::default()
        },
        GpuInit::default(),
        config,
        session,
    )
}
