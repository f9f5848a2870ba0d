//! Neighborhood keys: digit strings and their base-k integer codes.

use rca_core::{digit_char, parse_digit, AutomatonParams, Cell, Error, Result};

/// Read a neighborhood left to right as a base-k number.
///
/// Returns `None` when a digit lies outside the alphabet, so an out-of-range
/// cell can never alias a valid key.
pub fn encode(digits: &[Cell], states: u32) -> Option<usize> {
    let base = states as usize;
    digits.iter().try_fold(0usize, |acc, &d| {
        if (d as u32) < states {
            acc.checked_mul(base)?.checked_add(d as usize)
        } else {
            None
        }
    })
}

/// Digits of `code`, zero-padded to the neighborhood width.
pub fn decode(code: usize, params: AutomatonParams) -> Vec<Cell> {
    let base = params.states as usize;
    let mut digits = vec![0; params.window()];
    let mut rest = code;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % base) as Cell;
        rest /= base;
    }
    digits
}

/// Render a neighborhood as its digit string, e.g. `[0, 1, 1]` -> `"011"`.
pub fn key_string(digits: &[Cell]) -> String {
    digits.iter().map(|&d| digit_char(d)).collect()
}

/// Parse a digit-string key into its code, checking width and alphabet.
pub fn parse_key(key: &str, params: AutomatonParams) -> Result<usize> {
    let digits = key
        .chars()
        .map(|c| parse_digit(c, params.states))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            Error::InvalidParameter(format!(
                "key {:?} contains a digit outside a {}-state alphabet",
                key, params.states
            ))
        })?;

    if digits.len() != params.window() {
        return Err(Error::InvalidParameter(format!(
            "key {:?} has {} digits, expected {}",
            key,
            digits.len(),
            params.window()
        )));
    }

    encode(&digits, params.states)
        .ok_or_else(|| Error::InvalidParameter(format!("key {:?} is out of range", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_binary() {
        assert_eq!(encode(&[0, 0, 0], 2), Some(0));
        assert_eq!(encode(&[1, 1, 0], 2), Some(6));
        assert_eq!(encode(&[1, 1, 1], 2), Some(7));
    }

    #[test]
    fn test_encode_rejects_out_of_alphabet() {
        assert_eq!(encode(&[0, 2, 0], 2), None);
        assert_eq!(encode(&[0, 2, 0], 3), Some(6));
    }

    #[test]
    fn test_decode_pads_with_zeros() {
        let params = AutomatonParams::new(3, 1);
        assert_eq!(decode(0, params), vec![0, 0, 0]);
        assert_eq!(decode(5, params), vec![0, 1, 2]);
        assert_eq!(decode(26, params), vec![2, 2, 2]);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let params = AutomatonParams::new(4, 2);
        let len = params.table_len().unwrap();
        for code in [0, 1, 17, 255, len - 1] {
            assert_eq!(encode(&decode(code, params), 4), Some(code));
        }
    }

    #[test]
    fn test_parse_key() {
        let params = AutomatonParams::new(2, 1);
        assert_eq!(parse_key("101", params).unwrap(), 5);
        assert!(parse_key("10", params).is_err());
        assert!(parse_key("1010", params).is_err());
        assert!(parse_key("120", params).is_err());

        let params = AutomatonParams::new(12, 1);
        assert_eq!(parse_key("00b", params).unwrap(), 11);
        assert_eq!(key_string(&[0, 0, 11]), "00b");
    }
}
