//! # Air TX
//!
//! Transmissor de telemetria de metano do lado aéreo (Raspberry Pi 5 +
//! RFD900ux). A cada período amostra o sensor, grava no CSV local
//! autoritativo e transmite `timestamp_s,methane_value` pela UART do rádio.
//!
//! ## Uso
//! ```bash
//! air_tx                            # defaults (/dev/serial0, 57600, 0.5s)
//! AIRSERIALPORT=/dev/ttyUSB0 air_tx # overrides pelas variáveis históricas
//! ```

mod sampler;
mod sensor;

use crossbeam_channel::bounded;
use sampler::Sampler;
use sensor::SimulatedMethane;
use std::path::Path;
use std::time::Duration;
use telemetry_core::config::AppConfig;
use telemetry_core::csvlog::CsvLog;
use tracing::{error, info, warn};

fn main() {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config (defaults → TOML → ambiente) ──
    let config_path = AppConfig::default_path();
    let mut config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    config.apply_env();
    for e in config.validate() {
        warn!("Config: {e}");
    }

    let air = config.air.clone();

    // ── Porta serial do rádio (falha aqui é fatal) ──
    let link = match serialport::new(&air.serial_port, air.baud)
        .timeout(Duration::from_secs(1))
        .open()
    {
        Ok(port) => port,
        Err(e) => {
            error!("Não foi possível abrir a porta serial {}: {e}", air.serial_port);
            std::process::exit(1);
        }
    };
    info!("Porta serial {} aberta a {} baud", air.serial_port, air.baud);

    // ── Log CSV local (cabeçalho só em arquivo novo) ──
    let log = match CsvLog::open(Path::new(&air.log_csv)) {
        Ok(log) => log,
        Err(e) => {
            error!("Não foi possível abrir o log {}: {e}", air.log_csv);
            std::process::exit(1);
        }
    };

    // ── Ctrl-C → canal de shutdown ──
    let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.try_send(());
    })
    .expect("Falha ao instalar handler de Ctrl-C");

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   ⚡ AIR TX – METANO (Rust)");
    println!("══════════════════════════════════════════════");
    println!("  Porta:    {} @ {} baud", air.serial_port, air.baud);
    println!("  Log CSV:  {}", air.log_csv);
    println!("  Período:  {:.1}s", air.period_secs);
    println!("  Faixa:    [{}, {}]", config.range.min, config.range.max);
    println!("══════════════════════════════════════════════");
    println!();

    // ── Loop principal ──
    let mut sampler = Sampler::new(
        SimulatedMethane,
        log,
        link,
        config.range(),
        Duration::from_secs_f64(air.period_secs),
    );

    match sampler.run(&shutdown_rx) {
        Ok(()) => info!("Shutdown limpo; log e porta liberados"),
        Err(e) => {
            error!("Falha fatal ao gravar o log local: {e}");
            std::process::exit(1);
        }
    }
}
