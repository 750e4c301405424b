/// Returns the number of padding bytes that must be added to `n` to make it
/// a multiple of `alignment`.
///
/// A back-to-front builder uses this with `n` being the number of bytes already
/// written from the end of the buffer plus the bytes about to be written.
///
/// # Examples
///
/// ```
/// use vtab_bytes::align::padding_for;
///
/// assert_eq!(padding_for(0, 4), 0);
/// assert_eq!(padding_for(1, 4), 3);
/// assert_eq!(padding_for(6, 4), 2);
/// assert_eq!(padding_for(13, 8), 3);
/// ```
#[inline]
pub fn padding_for(n: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    n.wrapping_neg() & (alignment - 1)
}
