//! Fixed-width hex decoding shared by the identifier types.

use crate::ParseIdError;

/// Decode `N` bytes from hex, ignoring an optional `0x` prefix.
///
/// Upper- and lower-case digits decode to the same bytes.
pub(crate) fn decode_fixed<const N: usize>(
    kind: &'static str,
    input: &str,
) -> Result<[u8; N], ParseIdError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    if digits.len() != N * 2 {
        return Err(ParseIdError::Length {
            kind,
            expected: N * 2,
            actual: digits.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| ParseIdError::NotHex {
        kind,
        value: input.to_string(),
    })?;
    Ok(out)
}
