//! Philippine numbering plan handling. Recipients type numbers in local
//! habit (`0917...`), gateways want E.164 (`+63917...`).

/// Normalize a typed phone number to `+63` international format: strip
/// everything that is not a digit, convert a leading local `0` to the
/// country code, and prefix the country code when it is absent.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let formatted = if let Some(rest) = digits.strip_prefix('0') {
        format!("63{rest}")
    } else if digits.starts_with("63") {
        digits
    } else {
        format!("63{digits}")
    };

    format!("+{formatted}")
}

/// A number is deliverable when its normalized form is a PH mobile
/// number: `639` followed by exactly nine digits.
pub fn validate_phone_number(phone: &str) -> bool {
    let formatted = format_phone_number(phone);
    let digits = &formatted[1..];

    digits.len() == 12 && digits.starts_with("639") && digits.chars().all(|c| c.is_ascii_digit())
}
