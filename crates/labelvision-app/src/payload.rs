// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request payload helpers shared by the print and vision endpoints.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use labelvision_core::LabelVisionError;

/// Standard alphabet; padding optional, as browsers' `btoa` output is often
/// re-chunked or trimmed by clients.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64 field, tolerating a `data:<mime>;base64,` prefix and
/// embedded whitespace.
pub fn decode_base64(field: &str, encoded: &str) -> Result<Vec<u8>, LabelVisionError> {
    let body = strip_data_url(encoded.trim());
    let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    match LENIENT.decode(compact.as_bytes()) {
        Ok(bytes) if !bytes.is_empty() => Ok(bytes),
        _ => Err(LabelVisionError::InvalidRequest(format!(
            "Invalid Base64 encoding for {field}"
        ))),
    }
}

fn strip_data_url(s: &str) -> &str {
    match s.strip_prefix("data:").and_then(|r| r.split_once(";base64,")) {
        Some((_, rest)) => rest,
        None => s,
    }
}

/// `Some(s)` only for a string with non-whitespace content.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// 400 naming the absent required fields.
pub fn missing_fields(names: &[&str]) -> LabelVisionError {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{n}'")).collect();
    LabelVisionError::InvalidRequest(format!(
        "Missing required field(s): {}",
        quoted.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_and_prefixed_input() {
        assert_eq!(decode_base64("pdfData", "JVBERi0xLjQ=").expect("plain"), b"%PDF-1.4");
        assert_eq!(
            decode_base64("pdfData", "data:application/pdf;base64,JVBERi0xLjQ=").expect("data url"),
            b"%PDF-1.4"
        );
    }

    #[test]
    fn tolerates_whitespace_and_missing_padding() {
        assert_eq!(decode_base64("pdfData", "JVBE\nRi0x\r\nLjQ").expect("lenient"), b"%PDF-1.4");
    }

    #[test]
    fn invalid_input_names_the_field() {
        for bad in ["***not base64***", "JVBERi0xLjQ=!", "", "data:application/pdf;base64,"] {
            let err = decode_base64("pdfData", bad).unwrap_err();
            assert_eq!(err.to_string(), "Invalid Base64 encoding for pdfData", "{bad:?}");
        }
    }

    #[test]
    fn missing_fields_are_quoted_in_order() {
        assert_eq!(
            missing_fields(&["pdfData"]).to_string(),
            "Missing required field(s): 'pdfData'"
        );
        assert_eq!(
            missing_fields(&["pdfData", "printerName"]).to_string(),
            "Missing required field(s): 'pdfData', 'printerName'"
        );
    }

    #[test]
    fn blank_strings_are_absent() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some("P".into())), Some("P".into()));
    }
}
