use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::domain::{
    benchmark::{
        Benchmark, BenchmarkExecutor, BenchmarkId, BenchmarkResult, BlockingBenchModule,
        ExecutorKind, TimingConfig,
    },
    errors::{BenchError, BenchResult},
    graphics::GraphicsContext,
};

/// Runs graphics-context benchmarks by calling the module directly. The call
/// blocks the thread for the whole measurement and holds the graphics lease
/// while it does.
pub struct MainThreadExecutor {
    module: Rc<dyn BlockingBenchModule>,
    graphics: GraphicsContext,
}

impl MainThreadExecutor {
    pub fn new(module: Rc<dyn BlockingBenchModule>, graphics: GraphicsContext) -> Self {
        Self { module, graphics }
    }

    fn run_now(&self, id: &BenchmarkId, timing: &TimingConfig) -> BenchResult<BenchmarkResult> {
        if !self.module.is_ready() {
            return Err(BenchError::unavailable("main-thread module is not initialised"));
        }
        let _lease = self
            .graphics
            .try_acquire()
            .map_err(|e| BenchError::run_failed(id.value(), e.to_string()))?;
        match self.module.run_blocking(id, timing) {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Err(BenchError::run_failed(id.value(), "unknown benchmark")),
            Err(err @ BenchError::RunFailed { .. }) => Err(err),
            Err(err) => Err(BenchError::run_failed(id.value(), err.to_string())),
        }
    }
}

impl BenchmarkExecutor for MainThreadExecutor {
    fn kind(&self) -> ExecutorKind {
        ExecutorKind::MainThread
    }

    fn is_ready(&self) -> bool {
        self.module.is_ready()
    }

    /// Only a subset of ids runs here; the worker lists the catalog.
    fn list_benchmarks(&self) -> LocalBoxFuture<'_, BenchResult<Vec<Benchmark>>> {
        Box::pin(async {
            Err(BenchError::unavailable("the main-thread executor cannot list benchmarks"))
        })
    }

    fn run<'a>(
        &'a self,
        id: &'a BenchmarkId,
        timing: &'a TimingConfig,
    ) -> LocalBoxFuture<'a, BenchResult<BenchmarkResult>> {
        Box::pin(async move { self.run_now(id, timing) })
    }
}

#[cfg(target_arch = "wasm32")]
mod js_module {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use futures::future::LocalBoxFuture;
    use js_sys::{Function, Reflect, Uint8ClampedArray};
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

    use crate::domain::{
        benchmark::{
            BenchmarkId, BenchmarkResult, BlockingBenchModule, Screenshot, ScreenshotProvider,
            SimdLevelInfo, TimingConfig,
        },
        errors::{BenchError, BenchResult},
        logging::{LogComponent, get_logger},
    };

    fn js_error(value: &JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{value:?}"))
    }

    fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue) -> BenchResult<T> {
        let text = js_sys::JSON::stringify(value)
            .map_err(|e| BenchError::Serialization(js_error(&e)))?
            .as_string()
            .unwrap_or_default();
        Ok(serde_json::from_str(&text)?)
    }

    fn document() -> BenchResult<Document> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| BenchError::unavailable("no document"))
    }

    fn create_canvas(document: &Document) -> BenchResult<HtmlCanvasElement> {
        document
            .create_element("canvas")
            .map_err(|e| BenchError::Host(js_error(&e)))?
            .dyn_into()
            .map_err(|_| BenchError::Host("canvas element has the wrong type".to_string()))
    }

    /// The computation module the page exposes on `window[global]`
    pub struct JsBenchModule {
        module: JsValue,
        canvas: RefCell<Option<HtmlCanvasElement>>,
        hybrid_ready: Cell<bool>,
    }

    impl JsBenchModule {
        pub fn attach(global: &str) -> BenchResult<Rc<Self>> {
            let window = web_sys::window().ok_or_else(|| BenchError::unavailable("no window"))?;
            let module = Reflect::get(&window, &global.into())
                .map_err(|e| BenchError::unavailable(js_error(&e)))?;
            if module.is_undefined() || module.is_null() {
                return Err(BenchError::unavailable(format!("window.{global} is not defined")));
            }
            Ok(Rc::new(Self { module, canvas: RefCell::new(None), hybrid_ready: Cell::new(false) }))
        }

        fn call(&self, name: &str, args: &[JsValue]) -> BenchResult<JsValue> {
            let function: Function = Reflect::get(&self.module, &name.into())
                .map_err(|e| BenchError::unavailable(js_error(&e)))?
                .dyn_into()
                .map_err(|_| BenchError::unavailable(format!("module has no function {name}")))?;
            let args: js_sys::Array = args.iter().collect();
            function
                .apply(&self.module, &args)
                .map_err(|e| BenchError::Host(format!("{name}: {}", js_error(&e))))
        }

        /// Creates the hidden canvas the hybrid renderer draws into.
        pub fn init_hybrid(&self) -> BenchResult<()> {
            let document = document()?;
            let canvas =
                create_canvas(&document).map_err(|e| BenchError::unavailable(e.to_string()))?;
            canvas.set_width(1);
            canvas.set_height(1);
            let _ = canvas.set_attribute("style", "display: none");
            if let Some(body) = document.body() {
                let _ = body.append_child(&canvas);
            }

            let ok = self.call("init_hybrid", &[canvas.clone().into()])?.as_bool().unwrap_or(false);
            if !ok {
                return Err(BenchError::unavailable("init_hybrid refused the canvas"));
            }
            *self.canvas.borrow_mut() = Some(canvas);
            self.hybrid_ready.set(true);
            get_logger().info(
                LogComponent::Infrastructure("MainThread"),
                "Hybrid renderer initialised",
            );
            Ok(())
        }

        fn read_canvas(&self) -> BenchResult<Screenshot> {
            let canvas = self
                .canvas
                .borrow()
                .clone()
                .ok_or_else(|| BenchError::unavailable("hybrid canvas missing"))?;
            let (width, height) = (canvas.width(), canvas.height());

            let scratch = create_canvas(&document()?)?;
            scratch.set_width(width);
            scratch.set_height(height);
            let context: CanvasRenderingContext2d = scratch
                .get_context("2d")
                .map_err(|e| BenchError::Host(js_error(&e)))?
                .ok_or_else(|| BenchError::Host("2d context unavailable".to_string()))?
                .dyn_into()
                .map_err(|_| BenchError::Host("2d context has the wrong type".to_string()))?;
            context
                .draw_image_with_html_canvas_element(&canvas, 0.0, 0.0)
                .map_err(|e| BenchError::Host(js_error(&e)))?;
            let image = context
                .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
                .map_err(|e| BenchError::Host(js_error(&e)))?;
            Ok(Screenshot { width, height, rgba: image.data().0 })
        }

        fn read_pixels(value: &JsValue) -> BenchResult<Screenshot> {
            if value.is_null() || value.is_undefined() {
                return Err(BenchError::unavailable("scene not found"));
            }
            let field = |name: &str| {
                Reflect::get(value, &name.into()).map_err(|e| BenchError::Host(js_error(&e)))
            };
            let width = field("width")?.as_f64().unwrap_or_default() as u32;
            let height = field("height")?.as_f64().unwrap_or_default() as u32;
            let rgba = Uint8ClampedArray::from(field("data")?).to_vec();
            Ok(Screenshot { width, height, rgba })
        }

        fn cpu_screenshot(&self, function: &str, scene_name: &str) -> BenchResult<Screenshot> {
            Self::read_pixels(&self.call(function, &[scene_name.into()])?)
        }

        fn hybrid_screenshot(&self, category: &str, scene_name: &str) -> BenchResult<Screenshot> {
            if !self.is_ready() {
                return Err(BenchError::unavailable("hybrid renderer not initialised"));
            }
            let render = match category {
                "vello_hybrid" => "render_vello_hybrid_once",
                _ => "render_hybrid_once",
            };
            if !self.call(render, &[scene_name.into()])?.as_bool().unwrap_or(false) {
                return Err(BenchError::unavailable(format!("{render} failed for {scene_name}")));
            }
            self.read_canvas()
        }
    }

    impl BlockingBenchModule for JsBenchModule {
        fn is_ready(&self) -> bool {
            self.hybrid_ready.get()
        }

        fn run_blocking(
            &self,
            id: &BenchmarkId,
            timing: &TimingConfig,
        ) -> BenchResult<Option<BenchmarkResult>> {
            let function = if id.value().starts_with("vello_hybrid/") {
                "run_vello_hybrid_benchmark"
            } else {
                "run_hybrid_benchmark"
            };
            let args = [id.value().into(), timing.warmup.into(), timing.iterations.into()];
            let value = self.call(function, &args)?;
            if value.is_null() || value.is_undefined() {
                return Ok(None);
            }
            from_js(&value).map(Some)
        }

        fn simd_levels(&self) -> BenchResult<Vec<SimdLevelInfo>> {
            from_js::<Vec<SimdLevelInfo>>(&self.call("get_simd_levels", &[])?)
        }
    }

    impl ScreenshotProvider for JsBenchModule {
        fn capture<'a>(
            &'a self,
            scene_name: &'a str,
            category: &'a str,
        ) -> LocalBoxFuture<'a, BenchResult<Screenshot>> {
            Box::pin(async move {
                match category {
                    "scene_cpu" => self.cpu_screenshot("screenshot_cpu", scene_name),
                    "vello_cpu" => self.cpu_screenshot("screenshot_vello_cpu", scene_name),
                    "scene_hybrid" | "vello_hybrid" => self.hybrid_screenshot(category, scene_name),
                    other => {
                        Err(BenchError::unavailable(format!("no screenshot renderer for {other}")))
                    }
                }
            })
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use js_module::JsBenchModule;
