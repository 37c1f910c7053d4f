use crate::types::CodeError;

/// Lenient Base32 decode for human-transcribed shared secrets.
///
/// Input is uppercased and every character outside the RFC 4648 alphabet
/// `A-Z2-7` is discarded, not rejected: `=` padding, spaces and dashes all
/// fall away. The surviving characters are read as a 5-bit-per-character
/// bitstream, MSB first, and one byte is emitted per complete run of 8 bits.
/// A trailing group of fewer than 8 bits is dropped.
///
/// Decoding that yields zero usable bytes is an `InvalidSecretFormat` error
/// rather than an empty key, so a typo'd secret can never silently produce
/// a code derived from no key material.
pub fn decode(secret: &str) -> Result<Vec<u8>, CodeError> {
    let mut acc: u32 = 0;
    let mut bits: u32 = 0;
    let mut out: Vec<u8> = Vec::with_capacity(secret.len() * 5 / 8);

    for c in secret.chars() {
        let c = c.to_ascii_uppercase();
        let index = match c {
            'A'..='Z' => c as u32 - 'A' as u32,
            '2'..='7' => c as u32 - '2' as u32 + 26,
            _ => continue,
        };

        acc = (acc << 5) | index;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            // keep only the unconsumed low bits
            acc &= (1 << bits) - 1;
        }
    }

    if out.is_empty() {
        return Err(CodeError::InvalidSecretFormat);
    }
    Ok(out)
}
