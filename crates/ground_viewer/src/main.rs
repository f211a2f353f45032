//! # Ground Viewer
//!
//! Visualizador de solo da telemetria de metano: abre a porta do rádio,
//! espelha cada amostra recebida em CSV local e plota um strip chart ao
//! vivo com janela rolante.
//!
//! ## Uso
//! ```bash
//! ground_viewer            # porta default (COM7)
//! ground_viewer /dev/ttyS0 # porta como 1º argumento posicional
//! ```
//!
//! ## Atalhos
//! - `Q` / `Esc`: Sair

mod dashboard;
mod ingest;
mod window;

use dashboard::GroundDashboard;
use ingest::Ingestor;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use telemetry_core::config::AppConfig;
use telemetry_core::csvlog::CsvLog;
use tracing::{error, info, warn};
use window::DisplayWindow;

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config (defaults → TOML → ambiente → argumento posicional) ──
    let config_path = AppConfig::default_path();
    let mut config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }

    config.apply_env();
    for e in config.validate() {
        warn!("Config: {e}");
    }

    if let Some(port_arg) = std::env::args().nth(1) {
        config.ground.serial_port = port_arg;
    }
    let ground = config.ground.clone();

    // ── Porta serial do rádio de solo (falha aqui é fatal) ──
    let port = match serialport::new(&ground.serial_port, ground.baud)
        .timeout(Duration::from_secs(1))
        .open()
    {
        Ok(port) => port,
        Err(e) => {
            error!(
                "Não foi possível abrir a porta serial {}: {e}",
                ground.serial_port
            );
            std::process::exit(1);
        }
    };

    // Sonda a porta recém-aberta; um handle que nem responde a isso não vai
    // drenar nada depois
    if let Err(e) = port.bytes_to_read() {
        error!(
            "Porta serial {} não está utilizável após abrir: {e}",
            ground.serial_port
        );
        std::process::exit(1);
    }
    info!(
        "Porta serial {} aberta a {} baud",
        ground.serial_port, ground.baud
    );

    // ── CSV espelho (cabeçalho só em arquivo novo) ──
    let mirror = match CsvLog::open(Path::new(&ground.mirror_csv)) {
        Ok(log) => log,
        Err(e) => {
            error!("Não foi possível abrir o espelho {}: {e}", ground.mirror_csv);
            std::process::exit(1);
        }
    };

    let ingestor = Ingestor::new(
        config.range(),
        mirror,
        DisplayWindow::new(ground.window_secs),
    );

    // ── Ctrl-C → flag consultado pelo tick de render ──
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::SeqCst);
        })
        .expect("Falha ao instalar handler de Ctrl-C");
    }

    // ── Janela eframe ──
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("Live Methane")
            .with_inner_size([900.0, 450.0])
            .with_min_inner_size([640.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ground Viewer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(GroundDashboard::new(
                cc,
                port,
                ground.serial_port.clone(),
                ingestor,
                shutdown,
            )))
        }),
    )
}
