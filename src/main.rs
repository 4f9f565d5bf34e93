mod app;
mod assemble;
mod buffers;
mod catalog;
mod event;
mod problems;
mod project;
mod sandbox;
mod share;
mod theme;

use app::PlaygroundApp;
use eframe::egui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // `tinkerpad <token>` or `tinkerpad <link-with-?code=>` opens a shared
    // project straight into the editor
    let initial_token = std::env::args().nth(1);

    let app = PlaygroundApp::new(initial_token);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([1024.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tinkerpad",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
