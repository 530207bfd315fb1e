use clap::Parser;
use eframe::egui;

use microalign::app::MicroAlignApp;
use microalign::{cli, logger};

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ------------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        let args = cli::CliArgs::parse();
        std::process::exit(cli::run(args));
    }

    // -- GUI mode -----------------------------------------------------------

    // Initialize session log (overwrites previous session log)
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_title("MicroAlign"),
        ..Default::default()
    };

    eframe::run_native(
        "MicroAlign",
        options,
        Box::new(|cc| Box::new(MicroAlignApp::new(cc))),
    )
}
