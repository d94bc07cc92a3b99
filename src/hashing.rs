/*!
 * Content fingerprints.
 *
 * Fingerprints are 128-bit MD5 digests rendered as 32 lowercase hex
 * characters. They sign translation requests and identify content.
 */

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of the random suffix mixed into fingerprints of absent content
const RANDOM_SUFFIX_LEN: usize = 20;

/// Fingerprint `text`, or produce a random fingerprint when there is none.
///
/// The `None` branch hashes the current timestamp plus a random string and is
/// not reproducible.
pub fn fingerprint(text: Option<&str>) -> String {
    match text {
        Some(text) => fingerprint_text(text),
        None => random_fingerprint(),
    }
}

/// Deterministic fingerprint of the UTF-8 bytes of `text`
pub fn fingerprint_text(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

/// Fingerprint of the current time and a fresh random string
pub fn random_fingerprint() -> String {
    let now = chrono::Utc::now();
    let seconds = now.timestamp_micros() as f64 / 1_000_000.0;

    let mut context = md5::Context::new();
    context.consume(seconds.to_string().as_bytes());
    context.consume(random_string(RANDOM_SUFFIX_LEN).as_bytes());
    format!("{:x}", context.compute())
}

/// Random string of `len` ASCII letters and digits
pub fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
