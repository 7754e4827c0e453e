use rand::Rng;

/// Generate a 6-digit one-time password.
pub fn generate() -> String {
    let value: u32 = rand::rng().random_range(0..1_000_000);
    format!("{value:06}")
}
