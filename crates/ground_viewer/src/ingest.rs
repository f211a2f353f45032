//! Ingestão do downlink serial.
//!
//! A cada tick de render o dashboard drena os bytes já disponíveis na porta
//! – nunca bloqueia esperando mais – e transforma cada linha completa em
//! zero ou uma amostra validada: split em dois campos, parse numérico,
//! política de faixa. Toda rejeição é um drop silencioso que não afeta as
//! linhas seguintes nem os ticks futuros; uma linha parcial fica no buffer
//! até o resto chegar.

use serialport::SerialPort;
use std::io::{Read, Write};
use telemetry_core::csvlog::CsvLog;
use telemetry_core::{DecodeError, ValueRange, decode_record};
use tracing::{debug, warn};

use crate::window::DisplayWindow;

/// Classificação de uma linha recebida (exposta para os testes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Validada: entrou na janela e no CSV espelho
    Accepted,
    /// Aridade errada ou linha vazia
    Malformed,
    /// Campo não-numérico
    BadNumber,
    /// Fora da faixa configurada
    OutOfRange,
}

/// Ingestor: remonta linhas, classifica e alimenta janela + espelho.
pub struct Ingestor<M: Write> {
    range: ValueRange,
    mirror: CsvLog<M>,
    window: DisplayWindow,
    /// Resto de linha ainda sem `\n`
    partial: String,
}

impl<M: Write> Ingestor<M> {
    pub fn new(range: ValueRange, mirror: CsvLog<M>, window: DisplayWindow) -> Self {
        Self {
            range,
            mirror,
            window,
            partial: String::new(),
        }
    }

    pub fn window(&self) -> &DisplayWindow {
        &self.window
    }

    /// Drena tudo que está disponível agora na porta; ao final, apara a
    /// janela. Erros de leitura encerram a drenagem deste tick (warn), o
    /// próximo tick tenta de novo.
    pub fn drain_port(&mut self, port: &mut dyn SerialPort) {
        let mut buf = [0u8; 512];
        loop {
            match port.bytes_to_read() {
                Ok(0) => break,
                Ok(_) => match port.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => self.feed(&buf[..n]),
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => break,
                    Err(e) => {
                        warn!("Erro de leitura serial (link pode estar interrompido): {e}");
                        break;
                    }
                },
                Err(e) => {
                    warn!("Erro ao consultar a porta serial: {e}");
                    break;
                }
            }
        }
        self.window.trim();
    }

    /// Acumula bytes crus e processa cada linha completa que se formar.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(bytes));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            self.ingest_line(&line);
        }
    }

    /// Classifica uma linha completa e, se aceita, atualiza janela e espelho.
    pub fn ingest_line(&mut self, raw: &str) -> LineOutcome {
        let sample = match decode_record(raw) {
            Ok(s) => s,
            Err(DecodeError::MalformedSyntax(_)) => return LineOutcome::Malformed,
            Err(DecodeError::NumericParse(_)) => return LineOutcome::BadNumber,
        };

        if !self.range.contains(sample.value) {
            debug!("Valor de metano fora da faixa esperada: {}", sample.value);
            return LineOutcome::OutOfRange;
        }

        self.window.push(sample.timestamp_s, sample.value);
        if let Err(e) = self.mirror.append(&sample) {
            warn!("Falha ao gravar no CSV espelho: {e}");
        }
        LineOutcome::Accepted
    }

    #[cfg(test)]
    fn mirror_ref(&self) -> &M {
        self.mirror.get_ref()
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
