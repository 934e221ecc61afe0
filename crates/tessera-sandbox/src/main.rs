use anyhow::Result;
use winit::dpi::LogicalSize;

use tessera_engine::core::{App, AppControl, FrameCtx};
use tessera_engine::device::GpuInit;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::render::CubeFieldRenderer;
use tessera_engine::scene::SceneConfig;
use tessera_engine::window::{Runtime, RuntimeConfig};

/// Set to any value to present without vsync.
const NO_VSYNC_ENV: &str = "TESSERA_NO_VSYNC";

/// Cube field demo. The renderer is built lazily on the first frame, once
/// the surface format is known.
struct SandboxApp {
    config: SceneConfig,
    renderer: Option<CubeFieldRenderer>,
}

impl SandboxApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            renderer: None,
        }
    }
}

impl App for SandboxApp {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.renderer.is_none() {
            match CubeFieldRenderer::new(&ctx.render_ctx(), self.config.clone()) {
                Ok(r) => self.renderer = Some(r),
                Err(e) => {
                    ctx.runtime.fail(e.context("failed to create cube field renderer"));
                    return AppControl::Exit;
                }
            }
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Exit;
        };

        let ticket = renderer.prepare(&ctx.render_ctx());
        let renderer = &*renderer;
        ctx.render(|_, target| renderer.encode(target, ticket))
    }

    fn on_exit(&mut self) {
        // Drains in-flight frames while the device is still alive.
        self.renderer = None;
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut gpu_init = GpuInit::default();
    if std::env::var_os(NO_VSYNC_ENV).is_some() {
        gpu_init.present_mode = wgpu::PresentMode::AutoNoVsync;
    }

    let runtime = RuntimeConfig {
        title: "Compute to Render".to_string(),
        initial_size: LogicalSize::new(1024.0, 1024.0),
        resizable: false,
        ..RuntimeConfig::default()
    };
    log::info!(
        "starting \"{}\" ({:?} present mode)",
        runtime.title,
        gpu_init.present_mode
    );

    Runtime::run(runtime, gpu_init, SandboxApp::new(SceneConfig::default()))
}
