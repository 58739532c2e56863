pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(target_arch = "wasm32")]
mod entry {
    use leptos::*;
    use wasm_bindgen::prelude::*;

    use crate::config::{DashboardConfig, config, init_config};
    use crate::domain::logging::{LogComponent, get_logger, init_logger, init_time_provider};
    use crate::infrastructure::services::{BrowserTimeProvider, ConsoleLogger};
    use crate::presentation::{app::App, bootstrap};

    /// Installs logging and configuration, wires the backends and mounts the
    /// dashboard.
    #[wasm_bindgen(start)]
    pub fn initialize() {
        console_error_panic_hook::set_once();

        init_config(DashboardConfig::from_window());
        init_time_provider(Box::new(BrowserTimeProvider::new()));
        init_logger(Box::new(ConsoleLogger::new(config().log_level())));

        get_logger().info(
            LogComponent::Presentation("Initialize"),
            &format!("Starting benchmark dashboard (worker {})", config().worker_script_url),
        );

        wasm_bindgen_futures::spawn_local(async {
            let controller = bootstrap::build_controller(config()).await;
            mount_to_body(move || view! { <App controller=controller.clone() /> });
        });
    }
}
