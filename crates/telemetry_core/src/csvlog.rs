//! Sink de log CSV durável (append-only).
//!
//! É o registro autoritativo do sistema: cada amostra é gravada e *flushed*
//! antes de qualquer tentativa de transmissão, para sobreviver a uma queda
//! no meio do stream. O cabeçalho é escrito uma única vez, apenas quando o
//! arquivo é criado – reabrir um log existente continua de onde parou.
//!
//! Genérico sobre `io::Write` para que os testes usem buffers em memória.

use crate::protocol;
use crate::types::Sample;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Cabeçalho de uma linha, gravado só em arquivo novo.
pub const CSV_HEADER: &str = "timestamp_s,methane_value";

/// Log CSV com flush por registro.
pub struct CsvLog<W: Write> {
    out: W,
}

impl<W: Write> CsvLog<W> {
    /// Embrulha um writer; grava o cabeçalho se `write_header`.
    pub fn new(mut out: W, write_header: bool) -> io::Result<Self> {
        if write_header {
            writeln!(out, "{CSV_HEADER}")?;
            out.flush()?;
        }
        Ok(Self { out })
    }

    /// Anexa uma amostra e força o flush imediatamente.
    ///
    /// Mesmos dígitos do registro de wire (ver [`protocol::csv_row`]).
    pub fn append(&mut self, sample: &Sample) -> io::Result<()> {
        writeln!(self.out, "{}", protocol::csv_row(sample))?;
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl CsvLog<File> {
    /// Abre (ou cria) o log em `path`, em modo append.
    pub fn open(path: &Path) -> io::Result<Self> {
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::new(file, is_new)
    }
}
