//! Normalization of raw field values.
//!
//! `None` is the absent marker: blank input and input that normalizes to an
//! empty string both come back as `None`.

/// Trims surrounding whitespace.
///
/// ```
/// use ecom_transform::normalize_text;
///
/// assert_eq!(normalize_text(Some("  Pune ")), Some("Pune".to_string()));
/// assert_eq!(normalize_text(Some("   ")), None);
/// assert_eq!(normalize_text(None), None);
/// ```
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercases and trims an email address.
pub fn normalize_email(value: Option<&str>) -> Option<String> {
    normalize_text(value).map(|email| email.to_lowercase())
}

/// Keeps only the ASCII digits of a phone number.
///
/// ```
/// use ecom_transform::normalize_phone;
///
/// assert_eq!(normalize_phone(Some("+1 (555) 010-9999 x12")), Some("1555010999912".to_string()));
/// assert_eq!(normalize_phone(Some("n/a")), None);
/// ```
pub fn normalize_phone(value: Option<&str>) -> Option<String> {
    let digits: String = value?.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Capitalizes the first letter of every alphabetic run and lowercases the rest.
///
/// A run restarts after any non-alphabetic character, so `o'neil-smith`
/// becomes `O'Neil-Smith`.
pub fn title_case(value: Option<&str>) -> Option<String> {
    let text = normalize_text(value)?;
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_lowercased_and_trimmed() {
        assert_eq!(
            normalize_email(Some("  Jane.Doe@Example.COM ")),
            Some("jane.doe@example.com".to_string())
        );
        assert_eq!(normalize_email(Some("")), None);
        assert_eq!(normalize_email(None), None);
    }

    #[test]
    fn title_case_words() {
        assert_eq!(title_case(Some("new YORK")), Some("New York".to_string()));
        assert_eq!(
            title_case(Some("o'neil-smith")),
            Some("O'Neil-Smith".to_string())
        );
        assert_eq!(title_case(Some("  ")), None);
        assert_eq!(title_case(None), None);
    }

    #[test]
    fn phone_without_digits_is_absent() {
        assert_eq!(normalize_phone(Some("---")), None);
        assert_eq!(normalize_phone(None), None);
    }
}
