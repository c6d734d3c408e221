pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

/// Splits `xs` into consecutive slices of at most `n` items. `n` is clamped to
/// at least 1, so the result is never empty unless `xs` is.
pub fn chunks<T>(xs: &[T], n: usize) -> Vec<&[T]> {
    xs.chunks(n.max(1)).collect()
}
