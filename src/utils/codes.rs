//! Human-readable identifiers for physical items.

use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Attempts made to find an unused code before giving up
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// `<PREFIX>-<unix millis>-<5 base36 chars>`, e.g. `BOOK-1718900000000-x3k9q`.
pub fn generate_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..5)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!(
        "{}-{}-{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}
