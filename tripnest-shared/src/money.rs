//! Currency arithmetic helpers. Amounts are plain `f64` dollars rounded to
//! cents at every boundary where a value is shown or stored.

/// Sales tax applied at checkout and in hotel availability quotes.
pub const TAX_RATE: f64 = 0.15;

/// Round to two decimal places.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// `amount * rate`, rounded to cents.
pub fn percentage_of(amount: f64, rate: f64) -> f64 {
    round_cents(amount * rate)
}
