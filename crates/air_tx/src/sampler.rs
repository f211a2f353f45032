//! Loop de amostragem do lado aéreo.
//!
//! Máquina de estados INIT → SAMPLING → SHUTDOWN com três disciplinas:
//! - cadência *agendada*: o próximo disparo avança exatamente um período por
//!   iteração, então uma iteração lenta não acumula drift além de um período;
//! - ordem dos sinks: o CSV local é gravado (e flushed) estritamente antes de
//!   qualquer tentativa de transmissão – o log é o registro autoritativo,
//!   o link é só advisory;
//! - isolamento de falhas: sensor ou link falhando custa no máximo o tick
//!   corrente; só uma falha de escrita no log local é fatal.

use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use telemetry_core::csvlog::CsvLog;
use telemetry_core::types::unix_time_s;
use telemetry_core::{Sample, ValueRange, encode_record};
use tracing::{debug, warn};

use crate::sensor::MethaneSensor;

/// O que aconteceu em um tick (exposto para contadores e testes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Logado e transmitido
    Sent,
    /// Logado, mas o link de rádio recusou a escrita
    LoggedOnly,
    /// Sensor falhou; nenhum sink tocado
    SensorFailed,
    /// Valor fora da faixa; nenhum sink tocado
    OutOfRange,
}

/// Agenda de disparos de cadência fixa.
///
/// `next()` devolve deadlines `start + k*period`, independentes de quanto
/// cada iteração demorou (não é sleep-depois-do-trabalho).
pub struct Cadence {
    next_fire: Instant,
    period: Duration,
}

impl Cadence {
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            next_fire: start,
            period,
        }
    }

    /// Deadline do próximo disparo.
    pub fn next(&mut self) -> Instant {
        self.next_fire += self.period;
        self.next_fire
    }
}

/// Loop de amostragem: sensor → validação → CSV local → rádio.
pub struct Sampler<S, L, T>
where
    S: MethaneSensor,
    L: Write,
    T: Write,
{
    sensor: S,
    log: CsvLog<L>,
    link: T,
    range: ValueRange,
    period: Duration,
}

impl<S, L, T> Sampler<S, L, T>
where
    S: MethaneSensor,
    L: Write,
    T: Write,
{
    pub fn new(sensor: S, log: CsvLog<L>, link: T, range: ValueRange, period: Duration) -> Self {
        Self {
            sensor,
            log,
            link,
            range,
            period,
        }
    }

    /// Executa um tick com o timestamp `ts`.
    ///
    /// Só propaga erro quando o log local falha; todo o resto é absorvido.
    pub fn tick(&mut self, ts: f64) -> io::Result<TickOutcome> {
        let value = match self.sensor.read() {
            Ok(v) => v,
            Err(e) => {
                warn!("Leitura do sensor falhou, pulando iteração: {e}");
                return Ok(TickOutcome::SensorFailed);
            }
        };

        if !self.range.contains(value) {
            debug!("Valor de metano fora da faixa esperada: {value}");
            return Ok(TickOutcome::OutOfRange);
        }

        let sample = Sample::new(ts, value);

        // 1) Log local autoritativo (flush imediato; falha aqui é fatal)
        self.log.append(&sample)?;

        // 2) Stream ao vivo pelo link de telemetria (best-effort)
        let frame = encode_record(&sample);
        match self
            .link
            .write_all(frame.as_bytes())
            .and_then(|()| self.link.flush())
        {
            Ok(()) => Ok(TickOutcome::Sent),
            Err(e) => {
                warn!("Escrita serial falhou (link de rádio pode estar fora): {e}");
                Ok(TickOutcome::LoggedOnly)
            }
        }
    }

    /// Roda até receber shutdown pelo canal (ou o canal fechar).
    ///
    /// O sleep de cadência é o próprio `recv_deadline`: um Ctrl-C no meio do
    /// sleep acorda na hora, sem esperar o resto do período; um tick que
    /// estourou o período dorme zero.
    pub fn run(&mut self, shutdown: &Receiver<()>) -> io::Result<()> {
        let mut cadence = Cadence::starting_at(Instant::now(), self.period);
        loop {
            self.tick(unix_time_s())?;

            match shutdown.recv_deadline(cadence.next()) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return Ok(()),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    #[cfg(test)]
    fn into_parts(self) -> (CsvLog<L>, T) {
        (self.log, self.link)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::SensorError;

    /// Sensor de teste que devolve uma sequência pré-programada.
    struct ScriptedSensor {
        readings: Vec<Result<f64, SensorError>>,
    }

    impl ScriptedSensor {
        fn new(readings: Vec<Result<f64, SensorError>>) -> Self {
            let mut readings = readings;
            readings.reverse();
            Self { readings }
        }
    }

    impl MethaneSensor for ScriptedSensor {
        fn read(&mut self) -> Result<f64, SensorError> {
            self.readings
                .pop()
                .unwrap_or_else(|| Err(SensorError("sequência esgotada".into())))
        }
    }

    /// Link que recusa toda escrita (rádio fora do ar).
    struct DeadLink;

    impl Write for DeadLink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"))
        }
    }

    fn sampler_with(
        readings: Vec<Result<f64, SensorError>>,
    ) -> Sampler<ScriptedSensor, Vec<u8>, Vec<u8>> {
        Sampler::new(
            ScriptedSensor::new(readings),
            CsvLog::new(Vec::new(), true).unwrap(),
            Vec::new(),
            ValueRange::new(0.0, 10_000.0),
            Duration::from_millis(500),
        )
    }

    #[test]
    fn cadence_is_drift_free() {
        let start = Instant::now();
        let period = Duration::from_millis(500);
        let mut cadence = Cadence::starting_at(start, period);
        for k in 1..=1_000u32 {
            assert_eq!(cadence.next(), start + period * k);
        }
    }

    #[test]
    fn valid_sample_reaches_both_sinks() {
        let mut sampler = sampler_with(vec![Ok(2.0)]);
        assert_eq!(sampler.tick(0.0).unwrap(), TickOutcome::Sent);

        let (log, link) = sampler.into_parts();
        assert_eq!(
            String::from_utf8(log.get_ref().clone()).unwrap(),
            "timestamp_s,methane_value\n0.000,2.000000\n"
        );
        assert_eq!(String::from_utf8(link).unwrap(), "0.000,2.000000\n");
    }

    #[test]
    fn log_precedes_transmit_even_when_link_is_down() {
        let mut sampler = Sampler::new(
            ScriptedSensor::new(vec![Ok(2.0)]),
            CsvLog::new(Vec::new(), true).unwrap(),
            DeadLink,
            ValueRange::default(),
            Duration::from_millis(500),
        );

        // O link morto não derruba o tick e o registro durável permanece
        assert_eq!(sampler.tick(0.0).unwrap(), TickOutcome::LoggedOnly);
        let (log, _) = sampler.into_parts();
        assert!(
            String::from_utf8(log.get_ref().clone())
                .unwrap()
                .contains("0.000,2.000000")
        );
    }

    #[test]
    fn sensor_failure_is_isolated_to_its_tick() {
        let mut sampler = sampler_with(vec![Err(SensorError("i2c timeout".into())), Ok(3.0)]);

        assert_eq!(sampler.tick(0.0).unwrap(), TickOutcome::SensorFailed);
        // O tick seguinte roda normalmente
        assert_eq!(sampler.tick(0.5).unwrap(), TickOutcome::Sent);

        let (log, _) = sampler.into_parts();
        assert_eq!(
            String::from_utf8(log.get_ref().clone()).unwrap(),
            "timestamp_s,methane_value\n0.500,3.000000\n"
        );
    }

    #[test]
    fn range_bounds_are_inclusive_at_the_sampler() {
        let mut sampler = sampler_with(vec![Ok(0.0), Ok(10_000.0), Ok(-0.001), Ok(10_000.001)]);

        assert_eq!(sampler.tick(0.0).unwrap(), TickOutcome::Sent);
        assert_eq!(sampler.tick(0.5).unwrap(), TickOutcome::Sent);
        assert_eq!(sampler.tick(1.0).unwrap(), TickOutcome::OutOfRange);
        assert_eq!(sampler.tick(1.5).unwrap(), TickOutcome::OutOfRange);

        let (log, link) = sampler.into_parts();
        let text = String::from_utf8(log.get_ref().clone()).unwrap();
        assert_eq!(text.lines().count(), 3); // cabeçalho + 2 amostras aceitas
        assert_eq!(String::from_utf8(link).unwrap().lines().count(), 2);
    }

    #[test]
    fn scenario_one_valid_one_out_of_range_one_sensor_failure() {
        let mut sampler = sampler_with(vec![
            Ok(2.0),
            Ok(-5.0),
            Err(SensorError("leitura perdida".into())),
        ]);

        assert_eq!(sampler.tick(0.0).unwrap(), TickOutcome::Sent);
        assert_eq!(sampler.tick(0.5).unwrap(), TickOutcome::OutOfRange);
        assert_eq!(sampler.tick(1.0).unwrap(), TickOutcome::SensorFailed);

        let (log, _) = sampler.into_parts();
        assert_eq!(
            String::from_utf8(log.get_ref().clone()).unwrap(),
            "timestamp_s,methane_value\n0.000,2.000000\n"
        );
    }

    #[test]
    fn log_write_failure_is_fatal() {
        struct Deadlog;
        impl Write for Deadlog {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disco cheio"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        // O cabeçalho já falha na construção
        assert!(CsvLog::new(Deadlog, true).is_err());

        // E uma falha de append propaga pelo tick
        let mut sampler = Sampler::new(
            ScriptedSensor::new(vec![Ok(2.0)]),
            CsvLog::new(Deadlog, false).unwrap(),
            Vec::new(),
            ValueRange::default(),
            Duration::from_millis(500),
        );
        assert!(sampler.tick(0.0).is_err());
    }

    #[test]
    fn run_stops_on_shutdown_signal() {
        let (tx, rx) = crossbeam_channel::bounded::<()>(1);
        tx.send(()).unwrap();

        let mut sampler = sampler_with(vec![Ok(2.0)]);
        // Primeiro tick roda, o sinal pendente interrompe antes do segundo
        sampler.run(&rx).unwrap();

        let (log, _) = sampler_into_line_count(sampler);
        assert_eq!(log, 2); // cabeçalho + 1 amostra
    }

    fn sampler_into_line_count(
        sampler: Sampler<ScriptedSensor, Vec<u8>, Vec<u8>>,
    ) -> (usize, usize) {
        let (log, link) = sampler.into_parts();
        (
            String::from_utf8(log.get_ref().clone())
                .unwrap()
                .lines()
                .count(),
            String::from_utf8(link).unwrap().lines().count(),
        )
    }
}
