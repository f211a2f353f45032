//! Configuração unificada das duas pontas do link.
//!
//! Camadas, da mais fraca para a mais forte:
//! 1. defaults embutidos;
//! 2. `config.toml` opcional ao lado do executável;
//! 3. variáveis de ambiente com os nomes históricos do sistema
//!    (`AIRSERIALPORT`, `GROUNDBAUD`, `METHANEVAL_MIN`, …).
//!
//! O resultado é um struct construído uma única vez no startup e passado
//! por referência aos loops – nenhum estado global mutável em runtime.

use crate::range::ValueRange;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuração do transmissor aéreo (Pi + rádio).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AirConfig {
    /// Porta serial do rádio (UART do Pi)
    pub serial_port: String,
    /// Baud rate do link
    pub baud: u32,
    /// Caminho do CSV local autoritativo
    pub log_csv: String,
    /// Período de amostragem em segundos
    pub period_secs: f64,
}

impl Default for AirConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/serial0".into(),
            baud: 57_600,
            log_csv: "methane_log.csv".into(),
            period_secs: 0.5,
        }
    }
}

/// Configuração do visualizador de solo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    /// Porta serial do rádio de solo (sobrescrita pelo 1º argumento de linha
    /// de comando, quando presente)
    pub serial_port: String,
    /// Baud rate do link
    pub baud: u32,
    /// Caminho do CSV espelho
    pub mirror_csv: String,
    /// Janela do strip chart em segundos
    pub window_secs: f64,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            serial_port: "COM7".into(),
            baud: 57_600,
            mirror_csv: "ground_methane_log.csv".into(),
            window_secs: 300.0,
        }
    }
}

/// Faixa válida de metano, compartilhada pelas duas pontas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10_000.0,
        }
    }
}

/// Configuração raiz (unifica air e ground).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub air: AirConfig,
    pub ground: GroundConfig,
    pub range: RangeConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML (parcial permitido).
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Aplica as variáveis de ambiente históricas por cima da configuração.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Versão testável de [`apply_env`](Self::apply_env): o lookup é injetado.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get("AIRSERIALPORT") {
            self.air.serial_port = v;
        }
        override_parsed(&mut self.air.baud, "AIRBAUD", &get);
        if let Some(v) = get("AIRLOGCSV") {
            self.air.log_csv = v;
        }
        override_parsed(&mut self.air.period_secs, "AIRPERIODS", &get);

        override_parsed(&mut self.ground.baud, "GROUNDBAUD", &get);
        if let Some(v) = get("GROUNDMIRROR") {
            self.ground.mirror_csv = v;
        }
        override_parsed(&mut self.ground.window_secs, "GROUNDWINDOWS", &get);

        override_parsed(&mut self.range.min, "METHANEVAL_MIN", &get);
        override_parsed(&mut self.range.max, "METHANEVAL_MAX", &get);
    }

    /// Política de faixa derivada da configuração.
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.range.min, self.range.max)
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.air.baud == 0 {
            errors.push("Baud do air_tx não pode ser 0".into());
        }
        if self.ground.baud == 0 {
            errors.push("Baud do ground_viewer não pode ser 0".into());
        }
        if self.air.period_secs < 0.05 || self.air.period_secs > 60.0 {
            errors.push(format!(
                "Período de amostragem inválido: {} (0.05–60.0)",
                self.air.period_secs
            ));
        }
        if self.ground.window_secs <= 0.0 {
            errors.push(format!(
                "Janela do strip chart inválida: {}",
                self.ground.window_secs
            ));
        }
        if self.range.min > self.range.max {
            errors.push(format!(
                "Faixa de metano invertida: min {} > max {}",
                self.range.min, self.range.max
            ));
        }

        errors
    }
}

/// Sobrescreve `target` com a variável `name`, se presente e parseável.
fn override_parsed<T: std::str::FromStr>(
    target: &mut T,
    name: &str,
    get: &impl Fn(&str) -> Option<String>,
) {
    if let Some(raw) = get(name) {
        match raw.trim().parse() {
            Ok(v) => *target = v,
            Err(_) => warn!("Valor inválido em {name}: {raw:?} (mantendo o atual)"),
        }
    }
}
