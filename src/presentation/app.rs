use std::rc::Rc;
use std::str::FromStr;

use leptos::*;
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{
    Blob, BlobPropertyBag, CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement,
    ImageData, Url,
};

use crate::application::{
    baselines::{BaselineSlot, BaselineSource},
    dashboard::{CatalogState, DashboardController},
};
use crate::domain::{
    benchmark::{BenchmarkGroup, BenchmarkId, ExecutionMode, Screenshot},
    errors::BenchError,
    export::{ExportDocument, file_stamp},
    logging::{LogComponent, get_logger},
    reference::ReferenceName,
};
use crate::infrastructure::services::iso_now;
use crate::presentation::view_model::{self, RowView};

const STYLE: &str = r#"
.bench-dashboard {
  font-family: -apple-system, BlinkMacSystemFont, sans-serif;
  padding: 16px;
  color: #e6e6e6;
  background: #1b1f27;
  min-height: 100vh;
}
.bench-dashboard h1 { margin: 0 0 4px 0; font-size: 20px; }
.bench-dashboard section {
  margin: 12px 0;
  padding: 12px;
  background: #232834;
  border-radius: 8px;
}
.bench-dashboard table { width: 100%; border-collapse: collapse; font-size: 13px; }
.bench-dashboard th, .bench-dashboard td {
  padding: 4px 8px;
  text-align: left;
  border-bottom: 1px solid #313848;
}
.bench-dashboard button { margin-right: 6px; }
.notice { background: #5a1f24; padding: 8px 12px; border-radius: 6px; }
.status-queued { color: #a0a0a0; }
.status-warming-up, .status-measuring { color: #f0c060; }
.status-done { color: #72c685; }
.faster { color: #72c685; }
.slower { color: #e06c75; }
.similar { color: #a0a0a0; }
.screenshot-dialog {
  position: fixed;
  inset: 40px;
  background: #11141a;
  border: 1px solid #444;
  border-radius: 8px;
  padding: 12px;
  overflow: auto;
}
.screenshot-dialog canvas { max-width: 100%; image-rendering: pixelated; }
"#;

#[derive(Clone)]
enum ScreenshotState {
    Loading(BenchmarkId),
    Ready(BenchmarkId, Rc<Screenshot>),
    Failed(BenchmarkId, String),
}

/// Handles shared by every component. `revision` is bumped whenever the
/// controller's state changes; views re-read the controller when it does.
#[derive(Clone)]
struct DashboardContext {
    controller: Rc<DashboardController>,
    revision: RwSignal<u64>,
    notice: RwSignal<Option<String>>,
    screenshot: RwSignal<Option<ScreenshotState>>,
}

impl DashboardContext {
    fn new(controller: Rc<DashboardController>) -> Self {
        let revision = create_rw_signal(0u64);
        controller.subscribe(move |_event| revision.update(|r| *r += 1));
        Self {
            controller,
            revision,
            notice: create_rw_signal(None),
            screenshot: create_rw_signal(None),
        }
    }

    fn touch(&self) {
        self.revision.update(|r| *r += 1);
    }

    fn report(&self, err: BenchError) {
        get_logger().warn(LogComponent::Presentation("App"), &err.to_string());
        self.notice.set(Some(err.to_string()));
    }
}

#[component]
pub fn App(controller: Rc<DashboardController>) -> impl IntoView {
    let ctx = DashboardContext::new(controller);
    view! {
        <div class="bench-dashboard">
            <style>{STYLE}</style>
            <Header ctx=ctx.clone() />
            <NoticeBanner ctx=ctx.clone() />
            <Toolbar ctx=ctx.clone() />
            <ReferencePanel ctx=ctx.clone() />
            <BenchmarkTable ctx=ctx.clone() group=BenchmarkGroup::Micro />
            <BenchmarkTable ctx=ctx.clone() group=BenchmarkGroup::Scene />
            <ScreenshotDialog ctx=ctx />
        </div>
    }
}

#[component]
fn Header(ctx: DashboardContext) -> impl IntoView {
    let status = move || {
        ctx.revision.get();
        let mode = ctx.controller.mode();
        match ctx.controller.catalog_state() {
            CatalogState::Loading => format!("{mode}: loading benchmarks..."),
            CatalogState::Ready(catalog) => format!("{mode}: {} benchmarks", catalog.len()),
            CatalogState::Failed(reason) => format!("{mode}: benchmarks unavailable ({reason})"),
        }
    };

    view! {
        <header>
            <h1>"Benchmark dashboard"</h1>
            <div>{status}</div>
        </header>
    }
}

#[component]
fn NoticeBanner(ctx: DashboardContext) -> impl IntoView {
    let notice = ctx.notice;
    view! {
        <Show when=move || notice.with(Option::is_some)>
            <div class="notice">
                {move || notice.get().unwrap_or_default()}
                <button on:click=move |_| notice.set(None)>"Dismiss"</button>
            </div>
        </Show>
    }
}

#[component]
fn Toolbar(ctx: DashboardContext) -> impl IntoView {
    let timing = ctx.controller.timing();
    let warmup = create_rw_signal(timing.warmup.to_string());
    let iterations = create_rw_signal(timing.iterations.to_string());

    let apply_timing = {
        let ctx = ctx.clone();
        move || {
            let timing = ctx
                .controller
                .set_timing_input(&warmup.get_untracked(), &iterations.get_untracked());
            warmup.set(timing.warmup.to_string());
            iterations.set(timing.iterations.to_string());
        }
    };

    let modes = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            let current = ctx.controller.mode();
            ctx.controller
                .available_modes()
                .into_iter()
                .map(|mode| {
                    view! {
                        <option value={mode.to_string()} selected={mode == current}>
                            {mode.to_string()}
                        </option>
                    }
                })
                .collect_view()
        }
    };

    let on_mode = {
        let ctx = ctx.clone();
        move |ev: web_sys::Event| {
            let Ok(mode) = ExecutionMode::from_str(&event_target_value(&ev)) else {
                return;
            };
            let ctx = ctx.clone();
            spawn_local(async move {
                match ctx.controller.switch_mode(mode).await {
                    Ok(false) if ctx.controller.mode() != mode => {
                        let message = "Cannot switch backend while benchmarks run".to_string();
                        ctx.notice.set(Some(message));
                    }
                    Ok(_) => {}
                    Err(err) => ctx.report(err),
                }
                ctx.touch();
            });
        }
    };

    let simd_levels = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            let selected = ctx.controller.selected_simd_level();
            ctx.controller
                .simd_levels()
                .into_iter()
                .map(|level| {
                    let is_selected = selected.as_deref() == Some(level.id.as_str());
                    view! { <option value={level.id} selected={is_selected}>{level.name}</option> }
                })
                .collect_view()
        }
    };

    let on_simd = {
        let ctx = ctx.clone();
        move |ev: web_sys::Event| {
            let level = event_target_value(&ev);
            ctx.controller.set_simd_level((!level.is_empty()).then_some(level));
        }
    };

    let run_all = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            spawn_local(async move {
                ctx.controller.run_all().await;
                ctx.touch();
            });
        }
    };

    let abort = {
        let ctx = ctx.clone();
        move |_| {
            ctx.controller.abort();
            ctx.touch();
        }
    };

    let export = {
        let ctx = ctx.clone();
        move |_| match ctx.controller.export_results(&file_stamp(&iso_now())) {
            Ok(document) => {
                if let Err(err) = download(&document) {
                    ctx.report(BenchError::Host(format!("{err:?}")));
                }
            }
            Err(err) => ctx.report(err),
        }
    };

    let can_run = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            ctx.controller.can_run()
        }
    };
    let is_running = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            ctx.controller.run_state().is_running()
        }
    };
    let apply_warmup = apply_timing.clone();

    view! {
        <section class="toolbar">
            <label>"Backend " <select on:change=on_mode>{modes}</select></label>
            <label>" SIMD " <select on:change=on_simd>{simd_levels}</select></label>
            <label>" Warm-up "
                <input type="number" min="0" prop:value=move || warmup.get()
                    on:input=move |ev| warmup.set(event_target_value(&ev))
                    on:change=move |_| apply_warmup() />
            </label>
            <label>" Iterations "
                <input type="number" min="1" prop:value=move || iterations.get()
                    on:input=move |ev| iterations.set(event_target_value(&ev))
                    on:change=move |_| apply_timing() />
            </label>
            <button on:click=run_all disabled=move || !can_run()>"Run all"</button>
            <button on:click=abort disabled=move || !is_running()>"Abort"</button>
            <button on:click=export>"Export results"</button>
        </section>
    }
}

fn source_key(source: &BaselineSource) -> String {
    match source {
        BaselineSource::None => "none".to_string(),
        BaselineSource::Current => "current".to_string(),
        BaselineSource::Reference(name) => format!("ref:{name}"),
    }
}

fn parse_source_key(key: &str) -> Option<BaselineSource> {
    match key {
        "none" => Some(BaselineSource::None),
        "current" => Some(BaselineSource::Current),
        other => other
            .strip_prefix("ref:")
            .and_then(|name| ReferenceName::sanitize(name).ok())
            .map(BaselineSource::Reference),
    }
}

#[component]
fn BaselineSelector(ctx: DashboardContext, slot: BaselineSlot) -> impl IntoView {
    let options = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            let selected = source_key(ctx.controller.selection().get(slot));
            let mut keys = vec![
                ("none".to_string(), "none".to_string()),
                ("current".to_string(), "current results".to_string()),
            ];
            keys.extend(
                ctx.controller
                    .reference_index()
                    .iter()
                    .map(|entry| {
                        (format!("ref:{}", entry.name), view_model::reference_label(entry))
                    }),
            );
            keys.into_iter()
                .map(|(key, label)| {
                    let is_selected = key == selected;
                    view! { <option value={key} selected={is_selected}>{label}</option> }
                })
                .collect_view()
        }
    };

    let on_change = move |ev: web_sys::Event| {
        let Some(source) = parse_source_key(&event_target_value(&ev)) else {
            return;
        };
        let ctx = ctx.clone();
        spawn_local(async move {
            if let Err(err) = ctx.controller.select_baseline(slot, source).await {
                ctx.report(err);
            }
            ctx.touch();
        });
    };

    view! {
        <label>{format!(" {slot} ")}<select on:change=on_change>{options}</select></label>
    }
}

#[component]
fn ReferencePanel(ctx: DashboardContext) -> impl IntoView {
    let name = create_rw_signal(String::new());

    let save = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            let raw = name.get_untracked();
            spawn_local(async move {
                match ctx.controller.save_reference(&raw).await {
                    Ok(_) => name.set(String::new()),
                    Err(err) => ctx.report(err),
                }
                ctx.touch();
            });
        }
    };

    let entries = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            ctx.controller
                .reference_index()
                .into_iter()
                .map(|entry| {
                    let ctx = ctx.clone();
                    let label = view_model::reference_label(&entry);
                    let delete = move |_| {
                        let ctx = ctx.clone();
                        let name = entry.name.clone();
                        spawn_local(async move {
                            if let Err(err) = ctx.controller.delete_reference(name.value()).await {
                                ctx.report(err);
                            }
                            ctx.touch();
                        });
                    };
                    view! { <li>{label} " " <button on:click=delete>"Delete"</button></li> }
                })
                .collect_view()
        }
    };

    view! {
        <section class="references">
            <div>
                <input type="text" placeholder="reference name" prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev)) />
                <button on:click=save>"Save current as reference"</button>
            </div>
            <ul>{entries}</ul>
            <div>
                <BaselineSelector ctx=ctx.clone() slot=BaselineSlot::Base />
                <BaselineSelector ctx=ctx slot=BaselineSlot::Compare />
            </div>
        </section>
    }
}

#[component]
fn BenchmarkTable(ctx: DashboardContext, group: BenchmarkGroup) -> impl IntoView {
    let rows = {
        let ctx = ctx.clone();
        move || -> Vec<RowView> {
            ctx.revision.get();
            let state = ctx.controller.run_state();
            let results = ctx.controller.results();
            ctx.controller
                .comparison_rows()
                .iter()
                .filter(|row| BenchmarkGroup::classify(&row.category) == group)
                .map(|row| view_model::project_row(row, &state, &results))
                .collect()
        }
    };

    let categories = {
        let ctx = ctx.clone();
        move || {
            ctx.revision.get();
            let Some(catalog) = ctx.controller.catalog() else {
                return Vec::new();
            };
            catalog.categories(group).into_iter().map(str::to_string).collect::<Vec<_>>()
        }
    };

    let run_group = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            spawn_local(async move {
                ctx.controller.run_group(group).await;
                ctx.touch();
            });
        }
    };

    let category_buttons = {
        let ctx = ctx.clone();
        move || {
            categories()
                .into_iter()
                .map(|category| {
                    let ctx = ctx.clone();
                    let label = format!("Run {category}");
                    let run = move |_| {
                        let ctx = ctx.clone();
                        let category = category.clone();
                        spawn_local(async move {
                            ctx.controller.run_category(&category).await;
                            ctx.touch();
                        });
                    };
                    view! { <button on:click=run>{label}</button> }
                })
                .collect_view()
        }
    };

    let body = {
        let ctx = ctx.clone();
        move || {
            rows()
                .into_iter()
                .map(|row| {
                    let run = {
                        let ctx = ctx.clone();
                        let id = row.id.clone();
                        move |_| {
                            let ctx = ctx.clone();
                            let id = id.clone();
                            spawn_local(async move {
                                ctx.controller.run_ids(vec![id]).await;
                                ctx.touch();
                            });
                        }
                    };
                    let screenshot = ctx.controller.can_capture(&row.id).then(|| {
                        let ctx = ctx.clone();
                        let id = row.id.clone();
                        let capture = move |_| request_screenshot(ctx.clone(), id.clone());
                        view! { <button on:click=capture>"Screenshot"</button> }
                    });
                    let status_class = format!("status-{}", row.status.as_ref().replace(' ', "-"));
                    view! {
                        <tr>
                            <td>{row.name}</td>
                            <td>{row.category}</td>
                            <td class={status_class}>{row.status.to_string()}</td>
                            <td>{row.base}</td>
                            <td>{row.compare}</td>
                            <td class={row.change_class}>{row.change}</td>
                            <td>{row.speedup}</td>
                            <td>
                                <button on:click=run disabled={!ctx.controller.can_run()}>
                                    "Run"
                                </button>
                                {screenshot}
                            </td>
                        </tr>
                    }
                })
                .collect_view()
        }
    };

    let title = match group {
        BenchmarkGroup::Micro => "Micro benchmarks",
        BenchmarkGroup::Scene => "Scene benchmarks",
    };
    let can_run = move || {
        ctx.revision.get();
        ctx.controller.can_run()
    };

    view! {
        <section class="benchmarks">
            <h2>{title}</h2>
            <div>
                <button on:click=run_group disabled=move || !can_run()>
                    {format!("Run all {group}")}
                </button>
                {category_buttons}
            </div>
            <table>
                <thead>
                    <tr>
                        <th>"Benchmark"</th><th>"Category"</th><th>"Status"</th><th>"Base"</th>
                        <th>"Compare"</th><th>"Change"</th><th>"Speedup"</th><th></th>
                    </tr>
                </thead>
                <tbody>{body}</tbody>
            </table>
        </section>
    }
}

fn request_screenshot(ctx: DashboardContext, id: BenchmarkId) {
    ctx.screenshot.set(Some(ScreenshotState::Loading(id.clone())));
    spawn_local(async move {
        let state = match ctx.controller.capture_screenshot(&id).await {
            Ok(shot) => ScreenshotState::Ready(id, Rc::new(shot)),
            Err(err) => ScreenshotState::Failed(id, err.to_string()),
        };
        ctx.screenshot.set(Some(state));
    });
}

#[component]
fn ScreenshotDialog(ctx: DashboardContext) -> impl IntoView {
    let screenshot = ctx.screenshot;
    let canvas_ref = create_node_ref::<html::Canvas>();

    create_effect(move |_| {
        let Some(ScreenshotState::Ready(_, shot)) = screenshot.get() else {
            return;
        };
        if let Some(canvas) = canvas_ref.get() {
            if let Err(err) = paint(&canvas, &shot) {
                let message = format!("Paint failed: {err:?}");
                get_logger().error(LogComponent::Presentation("Screenshot"), &message);
            }
        }
    });

    let title = move || match screenshot.get() {
        Some(ScreenshotState::Loading(id)) => format!("Rendering {id}..."),
        Some(ScreenshotState::Ready(id, shot)) => format!("{id} ({}x{})", shot.width, shot.height),
        Some(ScreenshotState::Failed(id, _)) => id.to_string(),
        None => String::new(),
    };
    let error = move || match screenshot.get() {
        Some(ScreenshotState::Failed(_, reason)) => Some(view! { <p class="notice">{reason}</p> }),
        _ => None,
    };

    view! {
        <Show when=move || screenshot.with(Option::is_some)>
            <div class="screenshot-dialog">
                <div>
                    <strong>{title}</strong>
                    " "
                    <button on:click=move |_| screenshot.set(None)>"Close"</button>
                </div>
                {error}
                <canvas node_ref=canvas_ref />
            </div>
        </Show>
    }
}

fn paint(canvas: &HtmlCanvasElement, shot: &Screenshot) -> Result<(), JsValue> {
    canvas.set_width(shot.width);
    canvas.set_height(shot.height);
    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .unchecked_into();
    let pixels = Clamped(shot.rgba.as_slice());
    let image = ImageData::new_with_u8_clamped_array_and_sh(pixels, shot.width, shot.height)?;
    context.put_image_data(&image, 0.0, 0.0)
}

fn download(document: &ExportDocument) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(&document.contents));
    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = gloo::utils::document().create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(&document.file_name);
    anchor.click();
    Url::revoke_object_url(&url)
}
