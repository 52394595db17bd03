use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeFailure {
    Unreadable,
    NoFormat,
    Generic,
}

impl DecodeFailure {
    pub fn message(self) -> &'static str {
        match self {
            DecodeFailure::Unreadable | DecodeFailure::NoFormat => {
                "QR code not readable. Please try again."
            }
            DecodeFailure::Generic => "QR scan error. Please try again.",
        }
    }
}

/// Sorts a scanner error callback payload into a user-facing category.
/// Empty payloads (`null`, `""`, `false`, `0`) are not failures.
pub fn classify_decode_error(payload: &Value) -> Option<DecodeFailure> {
    match payload {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        Value::String(text) if text.contains("NotFoundException") => Some(DecodeFailure::Unreadable),
        Value::String(text) if text.contains("No MultiFormat Readers") => {
            Some(DecodeFailure::NoFormat)
        }
        _ => Some(DecodeFailure::Generic),
    }
}

/// Drops repeats of the last decoded text; scanners fire once per frame.
#[derive(Debug, Default)]
pub struct ScanFilter {
    last: Option<String>,
}

impl ScanFilter {
    pub fn admit(&mut self, text: &str) -> bool {
        if text.is_empty() || self.last.as_deref() == Some(text) {
            return false;
        }
        self.last = Some(text.to_string());
        true
    }

    pub fn forget(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_decoder_messages() {
        assert_eq!(
            classify_decode_error(&json!("NotFoundException: no code in frame")),
            Some(DecodeFailure::Unreadable)
        );
        assert_eq!(
            classify_decode_error(&json!("No MultiFormat Readers were able to detect the code.")),
            Some(DecodeFailure::NoFormat)
        );
        assert_eq!(
            classify_decode_error(&json!("camera busy")),
            Some(DecodeFailure::Generic)
        );
    }

    #[test]
    fn tolerates_non_string_payloads() {
        assert_eq!(
            classify_decode_error(&json!({ "name": "NotAllowedError" })),
            Some(DecodeFailure::Generic)
        );
        assert_eq!(classify_decode_error(&json!(42)), Some(DecodeFailure::Generic));
        assert_eq!(classify_decode_error(&json!(true)), Some(DecodeFailure::Generic));
        assert_eq!(classify_decode_error(&json!(null)), None);
        assert_eq!(classify_decode_error(&json!("")), None);
        assert_eq!(classify_decode_error(&json!(0)), None);
    }

    #[test]
    fn unreadable_and_no_format_share_a_message() {
        assert_eq!(DecodeFailure::Unreadable.message(), DecodeFailure::NoFormat.message());
        assert_ne!(DecodeFailure::Unreadable.message(), DecodeFailure::Generic.message());
    }

    #[test]
    fn filter_suppresses_consecutive_repeats() {
        let mut filter = ScanFilter::default();
        assert!(filter.admit("42"));
        assert!(!filter.admit("42"));
        assert!(filter.admit("43"));
        assert!(filter.admit("42"));
        filter.forget();
        assert!(filter.admit("42"));
        assert!(!filter.admit(""));
    }
}
