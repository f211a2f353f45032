//! Tipo de amostra compartilhado entre as duas pontas do link.

use std::time::{SystemTime, UNIX_EPOCH};

/// Uma leitura de metano com o timestamp atribuído pelo produtor.
///
/// Imutável depois de criada; atravessa o link apenas na forma serializada
/// (ver [`crate::protocol`]), nunca por referência.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Segundos desde a época Unix (relógio de parede do produtor)
    pub timestamp_s: f64,
    /// Valor de metano (unidades do sensor)
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp_s: f64, value: f64) -> Self {
        Self { timestamp_s, value }
    }
}

/// Segundos desde a época Unix, com fração.
pub fn unix_time_s() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_time_is_monotonic_enough() {
        let a = unix_time_s();
        let b = unix_time_s();
        assert!(b >= a);
        // Qualquer data plausível pós-2020
        assert!(a > 1_577_836_800.0);
    }
}
