//! Fonte de leituras de metano.
//!
//! O loop de amostragem só conhece o trait [`MethaneSensor`]; a aquisição
//! real (I2C/ADC no Pi) entra por aqui quando o hardware estiver integrado.

use std::time::{SystemTime, UNIX_EPOCH};
use telemetry_core::types::unix_time_s;

/// Falha de leitura do sensor. Absorvida por tick: nunca derruba o loop.
#[derive(Debug, thiserror::Error)]
#[error("falha na leitura do sensor: {0}")]
pub struct SensorError(pub String);

/// Uma fonte síncrona de valores de metano.
pub trait MethaneSensor {
    fn read(&mut self) -> Result<f64, SensorError>;
}

/// Placeholder até a integração do sensor físico: senoide lenta em torno
/// de 2.0 com um pequeno jitter, o suficiente para exercitar o pipeline.
pub struct SimulatedMethane;

impl MethaneSensor for SimulatedMethane {
    fn read(&mut self) -> Result<f64, SensorError> {
        let t = unix_time_s();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_nanos();
        let jitter = (nanos % 1_000) as f64 / 1_000.0 * 0.1 - 0.05;
        Ok(2.0 + 0.35 * (t / 8.0).sin() + jitter)
    }
}
