/// Normalizes a free-form phone number into the storefront's dialable format.
///
/// This is the only phone formatting routine in the codebase: every outbound
/// phone field and every phone equality comparison must go through it,
/// otherwise the same buyer can end up with duplicate customer records.
pub fn format_phone_for_storefront(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Already carries the country prefix, just missing the plus.
    if digits.starts_with("91") && digits.len() == 12 {
        return format!("+{}", digits);
    }

    // Bare 10-digit number, assume Indian.
    if digits.len() == 10 {
        return format!("+91{}", digits);
    }

    if phone.starts_with('+') {
        return phone.to_string();
    }

    // No rule applies, pass the input through unchanged.
    phone.to_string()
}
