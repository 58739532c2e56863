use std::rc::Rc;

use crate::domain::{
    benchmark::{Benchmark, BenchmarkGroup, ExecutionMode, Screenshot, ScreenshotProvider},
    errors::{BenchError, BenchResult},
    graphics::GraphicsContext,
    logging::{LogComponent, get_logger},
};

/// Captures scene screenshots from the backend matching the execution mode.
pub struct ScreenshotService {
    native: Option<Rc<dyn ScreenshotProvider>>,
    wasm: Option<Rc<dyn ScreenshotProvider>>,
    graphics: GraphicsContext,
}

impl ScreenshotService {
    pub fn new(graphics: GraphicsContext) -> Self {
        Self { native: None, wasm: None, graphics }
    }

    pub fn with_native(mut self, provider: Rc<dyn ScreenshotProvider>) -> Self {
        self.native = Some(provider);
        self
    }

    pub fn with_wasm(mut self, provider: Rc<dyn ScreenshotProvider>) -> Self {
        self.wasm = Some(provider);
        self
    }

    pub fn supports(&self, benchmark: &Benchmark) -> bool {
        benchmark.group() == BenchmarkGroup::Scene && (self.native.is_some() || self.wasm.is_some())
    }

    pub async fn capture(
        &self,
        mode: ExecutionMode,
        benchmark: &Benchmark,
    ) -> BenchResult<Screenshot> {
        if benchmark.group() != BenchmarkGroup::Scene {
            let message = format!("{} has no scene to capture", benchmark.id);
            return Err(BenchError::BackendUnavailable(message));
        }

        let screenshot = match (mode, &self.native, &self.wasm) {
            (ExecutionMode::Native, Some(native), _) => {
                native.capture(&benchmark.name, &benchmark.category).await?
            }
            (_, _, Some(wasm)) => {
                let _lease = self.graphics.try_acquire()?;
                wasm.capture(&benchmark.name, &benchmark.category).await?
            }
            _ => {
                return Err(BenchError::BackendUnavailable(format!(
                    "no renderer available for {} in {mode} mode",
                    benchmark.category
                )));
            }
        };

        if !screenshot.is_well_formed() {
            return Err(BenchError::Host(format!(
                "screenshot of {} is {}x{} but carries {} bytes",
                benchmark.id,
                screenshot.width,
                screenshot.height,
                screenshot.rgba.len()
            )));
        }

        get_logger().info(
            LogComponent::Application("Screenshot"),
            &format!("Captured {} ({}x{})", benchmark.id, screenshot.width, screenshot.height),
        );
        Ok(screenshot)
    }
}
