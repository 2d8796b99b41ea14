//! Amount coercion and currency formatting for advisor-entered figures.
//!
//! Every monetary field is stored exactly as typed. Arithmetic and display go
//! through [`amount`], which treats anything that is not a non-negative integer
//! as zero.

/// Coerces a stored field into a whole amount. Empty, non-numeric, negative
/// and fractional input all yield `0`.
pub fn amount(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}

/// True when the field holds any non-blank text.
pub fn is_filled(raw: &str) -> bool {
    !raw.trim().is_empty()
}

/// True when the field is filled and coerces to a non-zero amount.
pub fn is_positive_amount(raw: &str) -> bool {
    is_filled(raw) && amount(raw) > 0
}

/// Formats an amount as `$ 1.250.000`; zero renders as `$ 0`.
pub fn format_currency(value: u64) -> String {
    format!("$ {}", group_thousands(value))
}

/// Formats a stored field through [`amount`] coercion.
pub fn format_field(raw: &str) -> String {
    format_currency(amount(raw))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
