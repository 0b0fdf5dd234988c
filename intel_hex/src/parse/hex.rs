use std::fmt;

const DIGITS_PER_BYTE: usize = 2;

pub fn hex_string_to_bytes(hex_string: &[u8]) -> Result<Vec<u8>> {
    assert!(
        hex_string.len() % DIGITS_PER_BYTE == 0,
        "hex string must consist of pairs of hex digits"
    );
    hex_string
        .chunks_exact(DIGITS_PER_BYTE)
        .map(|hex_digit_pair| {
            let high_nibble = decode_hex_digit(hex_digit_pair[0])?;
            let low_nibble = decode_hex_digit(hex_digit_pair[1])?;
            Ok(high_nibble << 4 | low_nibble)
        })
        .collect()
}

fn decode_hex_digit(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(10 + (digit - b'a')),
        b'A'..=b'F' => Ok(10 + (digit - b'A')),
        d => Err(InvalidHexDigit(d)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidHexDigit(pub u8);

impl fmt::Display for InvalidHexDigit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii_graphic() {
            write!(f, "invalid hex digit '{}'", self.0 as char)
        } else {
            write!(f, "invalid hex digit {:#04x}", self.0)
        }
    }
}

impl std::error::Error for InvalidHexDigit {}

type Result<T> = std::result::Result<T, InvalidHexDigit>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex_digits() {
        let digits = b"0123456789abcdef";
        for (value, &digit) in digits.iter().enumerate() {
            assert_eq!(decode_hex_digit(digit), Ok(value as u8));
        }
        assert_eq!(decode_hex_digit(b'A'), Ok(10));
        assert_eq!(decode_hex_digit(b'B'), Ok(11));
        assert_eq!(decode_hex_digit(b'C'), Ok(12));
        assert_eq!(decode_hex_digit(b'D'), Ok(13));
        assert_eq!(decode_hex_digit(b'E'), Ok(14));
        assert_eq!(decode_hex_digit(b'F'), Ok(15));
    }

    #[test]
    fn fails_to_decode_invalid_hex_digit() {
        assert_eq!(decode_hex_digit(b'g'), Err(InvalidHexDigit(b'g')));
        assert_eq!(decode_hex_digit(b' '), Err(InvalidHexDigit(b' ')));
    }

    #[test]
    fn decodes_hex_string() {
        let input = b"0123456789abcdefABCDEF";
        assert_eq!(
            hex_string_to_bytes(input),
            Ok(vec![0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xab, 0xcd, 0xef])
        );
    }

    #[test]
    fn decodes_empty_hex_string() {
        assert_eq!(hex_string_to_bytes(b""), Ok(vec![]));
    }

    #[test]
    fn reports_first_invalid_digit() {
        assert_eq!(hex_string_to_bytes(b"0AZZ"), Err(InvalidHexDigit(b'Z')));
    }

    #[test]
    fn displays_non_printable_digit_as_hex() {
        assert_eq!(InvalidHexDigit(b'Z').to_string(), "invalid hex digit 'Z'");
        assert_eq!(InvalidHexDigit(0xc3).to_string(), "invalid hex digit 0xc3");
    }
}
