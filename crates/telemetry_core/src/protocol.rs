//! Protocolo de linha do link de rádio.
//!
//! O RFD900ux é tratado como um cano de bytes transparente; cada amostra
//! vira uma linha de texto:
//!
//! ```text
//! <timestamp_s com 3 decimais>,<valor com 6 decimais>\n
//! ```
//!
//! A precisão fixa serve só para as duas pontas concordarem sobre a largura
//! esperada dos campos – o parser não assume largura fixa, apenas o split
//! em dois campos separados por vírgula. Não há framing nem checksum: uma
//! linha parcial corrompida é simplesmente descartada pelo receptor.

use crate::types::Sample;

/// Separador de campos do registro.
pub const FIELD_SEPARATOR: char = ',';

/// Erros de decodificação de uma linha recebida.
///
/// Variantes separadas para que o chamador (e os testes) possam distinguir
/// sintaxe quebrada de campo não-numérico sem inspecionar texto de log.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("linha malformada: {0} campos (esperado 2)")]
    MalformedSyntax(usize),

    #[error("campo `{0}` não é numérico")]
    NumericParse(&'static str),
}

/// Linha CSV de uma amostra, sem o terminador (`ts,valor`).
///
/// Compartilhada entre o registro de wire e as linhas do log durável, para
/// que arquivo local e stream carreguem exatamente os mesmos dígitos.
pub fn csv_row(sample: &Sample) -> String {
    format!("{:.3}{FIELD_SEPARATOR}{:.6}", sample.timestamp_s, sample.value)
}

/// Codifica uma [`Sample`] para transmissão pelo link.
pub fn encode_record(sample: &Sample) -> String {
    let mut line = csv_row(sample);
    line.push('\n');
    line
}

/// Decodifica uma linha recebida em [`Sample`].
///
/// Função pura: quem decide logar/contar as rejeições é o chamador.
pub fn decode_record(line: &str) -> Result<Sample, DecodeError> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != 2 {
        return Err(DecodeError::MalformedSyntax(fields.len()));
    }

    let timestamp_s: f64 = fields[0]
        .trim()
        .parse()
        .map_err(|_| DecodeError::NumericParse("timestamp_s"))?;
    let value: f64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| DecodeError::NumericParse("value"))?;

    Ok(Sample::new(timestamp_s, value))
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uses_fixed_precision() {
        let s = Sample::new(1_700_000_000.123_456, 2.345_678);
        assert_eq!(encode_record(&s), "1700000000.123,2.345678\n");
    }

    #[test]
    fn roundtrip_is_lossy_to_declared_precision() {
        // 3 decimais no tempo, 6 no valor: o timestamp perde os dígitos extras.
        let original = Sample::new(1_700_000_000.123_456, 2.345_678);
        let decoded = decode_record(&encode_record(&original)).unwrap();
        assert_eq!(decoded, Sample::new(1_700_000_000.123, 2.345_678));
        assert_ne!(decoded.timestamp_s, original.timestamp_s);
    }

    #[test]
    fn decodes_without_fixed_width() {
        // O parser não exige a largura de campo da codificação
        let decoded = decode_record("12.5,3").unwrap();
        assert_eq!(decoded, Sample::new(12.5, 3.0));
    }

    #[test]
    fn rejects_wrong_arity() {
        assert_eq!(decode_record("1.0"), Err(DecodeError::MalformedSyntax(1)));
        assert_eq!(
            decode_record("1.0,2.0,3.0"),
            Err(DecodeError::MalformedSyntax(3))
        );
    }

    #[test]
    fn rejects_empty_line() {
        assert_eq!(decode_record(""), Err(DecodeError::MalformedSyntax(1)));
        assert_eq!(decode_record("   "), Err(DecodeError::MalformedSyntax(1)));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert_eq!(
            decode_record("abc,2.0"),
            Err(DecodeError::NumericParse("timestamp_s"))
        );
        assert_eq!(
            decode_record("1.0,xyz"),
            Err(DecodeError::NumericParse("value"))
        );
    }

    #[test]
    fn tolerates_crlf_and_whitespace() {
        let decoded = decode_record("1700000000.123,2.345678\r\n").unwrap();
        assert_eq!(decoded, Sample::new(1_700_000_000.123, 2.345_678));
    }

    #[test]
    fn negative_values_survive() {
        // Valores negativos são sintaticamente válidos; quem os descarta
        // é a política de faixa, não o codec.
        let decoded = decode_record("10.000,-5.000000").unwrap();
        assert_eq!(decoded.value, -5.0);
    }
}
