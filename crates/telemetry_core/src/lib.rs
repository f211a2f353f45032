//! # Telemetry Core
//!
//! Crate compartilhada entre o transmissor aéreo (`air_tx`) e o visualizador
//! de solo (`ground_viewer`): tipo de amostra, protocolo de linha do rádio,
//! política de faixa válida, configuração e sink de log CSV durável.
//!
//! ## Módulos
//! - [`types`] – Amostra de metano com timestamp
//! - [`protocol`] – Encode/decode do registro textual `ts,valor`
//! - [`range`] – Faixa válida (inclusiva) aplicada nas duas pontas
//! - [`config`] – Configuração em camadas (defaults → TOML → ambiente)
//! - [`csvlog`] – Log CSV append-only com flush por registro

pub mod config;
pub mod csvlog;
pub mod protocol;
pub mod range;
pub mod types;

// Re-exports convenientes
pub use config::AppConfig;
pub use protocol::{DecodeError, decode_record, encode_record};
pub use range::ValueRange;
pub use types::Sample;
