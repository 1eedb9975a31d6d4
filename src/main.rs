#[cfg(not(target_arch = "wasm32"))]
mod terminal;

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use pitchcraft::core::config::Config;
    use pitchcraft::core::io::{NativeStorage, Storage};
    use pitchcraft::core::state::PersistentState;
    use pitchcraft::services::client::HttpPitchClient;
    use pitchcraft::services::controller::GenerationController;
    use pitchcraft::services::renderer::PitchRenderer;
    use std::sync::Arc;

    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            eprintln!("Please fix or remove 'config.yml' to use the defaults.");
            return Err(e);
        }
    };

    let storage: Arc<dyn Storage> = Arc::new(NativeStorage::new(&config.data_folder));
    let client = HttpPitchClient::new(&config.server)?;
    log::info!("Using backend {}", client.endpoint());

    let controller = GenerationController::new(
        Box::new(client),
        PersistentState::new(storage),
        PitchRenderer::from_config(&config.render),
    );

    let view = terminal::TerminalView::new(config.form.initial_form());
    controller.startup(&view).await;

    terminal::run(&controller, &view, &config.form).await
}

// The browser build is driven from `lib.rs`.
#[cfg(target_arch = "wasm32")]
fn main() {}
