/// Percentage of `expected` that `have` reproduces:
/// `100 * (1 - levenshtein(have, expected) / len(expected))`, counted in chars.
///
/// The value drops below zero when `have` is much longer than `expected`.
pub fn similarity(have: &str, expected: &str) -> f64 {
    let len = expected.chars().count();
    if len == 0 {
        return if have.is_empty() { 100.0 } else { 0.0 };
    }
    let distance = strsim::levenshtein(have, expected);
    100.0 - (distance as f64 / len as f64) * 100.0
}
