use reqwest::Url;

/// Pulls a student identifier out of scanned or typed text.
///
/// URLs carrying an `id` query parameter win; otherwise only an all-digit
/// string is accepted as-is. Anything else yields `None`.
pub fn extract_student_id(text: &str) -> Option<String> {
    if let Ok(url) = Url::parse(text) {
        let id = url
            .query_pairs()
            .find(|(key, _)| key == "id")
            .map(|(_, value)| value.into_owned());
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            return Some(id);
        }
    }

    if is_all_digits(text) {
        return Some(text.to_string());
    }

    None
}

fn is_all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_id_parameter() {
        assert_eq!(extract_student_id("https://x.test/?id=42").as_deref(), Some("42"));
        assert_eq!(
            extract_student_id("https://school.test/students/view?tab=info&id=A%2017").as_deref(),
            Some("A 17")
        );
    }

    #[test]
    fn first_id_parameter_wins() {
        assert_eq!(extract_student_id("https://x.test/?id=5&id=9").as_deref(), Some("5"));
    }

    #[test]
    fn digits_are_returned_unchanged() {
        assert_eq!(extract_student_id("007").as_deref(), Some("007"));
        assert_eq!(extract_student_id("42").as_deref(), Some("42"));
    }

    #[test]
    fn anything_else_is_absent() {
        assert_eq!(extract_student_id("abc"), None);
        assert_eq!(extract_student_id(""), None);
        assert_eq!(extract_student_id("12a"), None);
        assert_eq!(extract_student_id(" 12"), None);
        assert_eq!(extract_student_id("https://x.test/?user=42"), None);
        assert_eq!(extract_student_id("https://x.test/?id="), None);
    }
}
