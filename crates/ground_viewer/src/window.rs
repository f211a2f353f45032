//! Janela de exibição do strip chart.
//!
//! Sequência ordenada por tempo de pares `(tempo_relativo_s, valor)`,
//! limitada de duas formas: um span rolante em segundos (soft) e um teto de
//! itens (hard), para que chegadas em rajada não cresçam sem limite antes do
//! trim temporal alcançar.

use std::collections::VecDeque;

/// Teto de itens da janela, independente do span configurado.
pub const MAX_POINTS: usize = 20_000;

/// Margem à direita do eixo x, em segundos.
pub const X_MARGIN_SECS: f64 = 2.0;

/// Pad mínimo do eixo y, para não colapsar quando todos os valores
/// visíveis são iguais.
pub const Y_PAD_EPSILON: f64 = 1e-6;

/// Limites dos eixos do strip chart, derivados da sequência visível.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

pub struct DisplayWindow {
    data: VecDeque<(f64, f64)>,
    /// Timestamp da primeira amostra aceita na sessão; zera a cada sessão
    /// do viewer, nunca é persistido.
    t0: Option<f64>,
    window_secs: f64,
    max_points: usize,
}

impl DisplayWindow {
    pub fn new(window_secs: f64) -> Self {
        Self::with_max_points(window_secs, MAX_POINTS)
    }

    pub fn with_max_points(window_secs: f64, max_points: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(max_points.min(4_096)),
            t0: None,
            window_secs,
            max_points,
        }
    }

    /// Aceita uma amostra já validada; a primeira da sessão define `t0`.
    pub fn push(&mut self, timestamp_s: f64, value: f64) {
        let t0 = *self.t0.get_or_insert(timestamp_s);
        if self.data.len() >= self.max_points {
            self.data.pop_front();
        }
        self.data.push_back((timestamp_s - t0, value));
    }

    /// Remove do início enquanto o span entre a amostra mais nova e a mais
    /// velha exceder a janela configurada.
    pub fn trim(&mut self) {
        let Some(&(newest, _)) = self.data.back() else {
            return;
        };
        while let Some(&(oldest, _)) = self.data.front() {
            if newest - oldest > self.window_secs {
                self.data.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Tempo relativo da amostra mais recente.
    pub fn newest_rel(&self) -> Option<f64> {
        self.data.back().map(|&(t, _)| t)
    }

    /// Menor e maior valor visível (para os limites do eixo y).
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().map(|&(_, v)| v);
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    /// Pontos `[x, y]` na ordem de chegada, prontos para o plot.
    pub fn points(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.data.iter().map(|&(t, v)| [t, v])
    }

    /// Limites dos eixos para o render; `None` com a janela vazia (idle).
    ///
    /// x: `[max(0, newest − window_secs), newest + margem]`;
    /// y: `[min − pad, max + pad]` com `pad = max(ε, 0.1·(max−min))`.
    pub fn chart_bounds(&self) -> Option<ChartBounds> {
        let newest = self.newest_rel()?;
        let (y_min, y_max) = self.value_bounds()?;
        let pad = ((y_max - y_min) * 0.1).max(Y_PAD_EPSILON);

        Some(ChartBounds {
            x_min: (newest - self.window_secs).max(0.0),
            x_max: newest + X_MARGIN_SECS,
            y_min: y_min - pad,
            y_max: y_max + pad,
        })
    }
}
