//! Política de faixa válida para leituras de metano.
//!
//! Aplicada de forma idêntica nas duas pontas: o transmissor descarta a
//! leitura antes de logar/transmitir, o receptor descarta antes de espelhar
//! e exibir. Limites inclusivos, ambos vindos da configuração.

/// Faixa válida `[min, max]` (inclusiva).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Predicado puro: `min <= value <= max`.
    ///
    /// NaN nunca passa, já que falha ambas as comparações.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10_000.0,
        }
    }
}
