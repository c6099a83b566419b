//! Reshaping of decoded integer payloads
//!
//! Values that do not fit the target width are rejected instead of truncated so
//! that upstream format drift surfaces as an error.

use crate::{protocol::HexType, Error, Result};

/// First `count` bits of `bytes`, most-significant bit of each byte first
pub fn extract_bits(bytes: &[u8], count: usize) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .take(count)
        .collect()
}

/// Narrow each value to 8 bits
pub fn narrow_u8(values: &[u128]) -> Result<Vec<u8>> {
    values
        .iter()
        .map(|&v| {
            u8::try_from(v).map_err(|_| Error::Decode(format!("value {} does not fit in uint8", v)))
        })
        .collect()
}

/// Narrow each value to 16 bits
pub fn narrow_u16(values: &[u128]) -> Result<Vec<u16>> {
    values
        .iter()
        .map(|&v| {
            u16::try_from(v)
                .map_err(|_| Error::Decode(format!("value {} does not fit in uint16", v)))
        })
        .collect()
}

/// Format values as zero-padded lowercase hex blocks
///
/// Width is `2 * block_size` digits for `hex8` and 4 digits for `hex16`.
pub fn format_hex(values: &[u128], hex_type: HexType, block_size: usize) -> Result<Vec<String>> {
    check_block_size(block_size)?;
    let width = hex_type.digits(block_size);

    values
        .iter()
        .map(|&v| {
            let block = format!("{:0width$x}", v, width = width);
            if block.len() > width {
                return Err(Error::Decode(format!(
                    "value {} does not fit in {} hex digits",
                    v, width
                )));
            }
            Ok(block)
        })
        .collect()
}

/// Reject block sizes outside `[1, 10]`
pub fn check_block_size(block_size: usize) -> Result<()> {
    if !(crate::MIN_HEX_BLOCK_SIZE..=crate::MAX_HEX_BLOCK_SIZE).contains(&block_size) {
        return Err(Error::InvalidBlockSize(block_size));
    }
    Ok(())
}

/// Big-endian concatenation of up to eight bytes
pub fn bytes_to_u64(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_bits() {
        assert_eq!(extract_bits(&[255], 8), vec![1; 8]);
        assert_eq!(extract_bits(&[0], 8), vec![0; 8]);
        assert_eq!(extract_bits(&[0b1010_0000], 3), vec![1, 0, 1]);
        assert_eq!(
            extract_bits(&[0x80, 0x01], 16),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_extract_bits_truncates_last_byte() {
        assert_eq!(extract_bits(&[0xff, 0x80], 9), vec![1, 1, 1, 1, 1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(narrow_u8(&[0, 123, 255]).unwrap(), vec![0, 123, 255]);
        assert!(narrow_u8(&[256]).unwrap_err().is_decode());

        assert_eq!(narrow_u16(&[1, 65535]).unwrap(), vec![1, 65535]);
        assert!(narrow_u16(&[65536]).unwrap_err().is_decode());
    }

    #[test]
    fn test_format_hex16() {
        assert_eq!(
            format_hex(&[32767, 65535], HexType::Hex16, 4).unwrap(),
            vec!["7fff", "ffff"]
        );
        assert_eq!(format_hex(&[10], HexType::Hex16, 1).unwrap(), vec!["000a"]);
    }

    #[test]
    fn test_format_hex8_width() {
        assert_eq!(format_hex(&[0xab], HexType::Hex8, 1).unwrap(), vec!["ab"]);
        assert_eq!(
            format_hex(&[0xab], HexType::Hex8, 4).unwrap(),
            vec!["000000ab"]
        );
        assert!(format_hex(&[0x1ff], HexType::Hex8, 1).unwrap_err().is_decode());
    }

    #[test]
    fn test_format_hex8_beyond_64_bits() {
        // 10-byte and 9-byte blocks
        assert_eq!(
            format_hex(&[0x0102_0304_0506_0708_090a], HexType::Hex8, 10).unwrap(),
            vec!["0102030405060708090a"]
        );
        assert_eq!(
            format_hex(&[(1u128 << 70) | 0xabc], HexType::Hex8, 9).unwrap(),
            vec!["400000000000000abc"]
        );
        assert_eq!(
            format_hex(&[(1u128 << 80) - 1], HexType::Hex8, 10).unwrap(),
            vec!["ffffffffffffffffffff"]
        );
        assert!(format_hex(&[1u128 << 72], HexType::Hex8, 9)
            .unwrap_err()
            .is_decode());
    }

    #[test]
    fn test_block_size_bounds() {
        assert!(matches!(
            format_hex(&[1], HexType::Hex8, 0),
            Err(Error::InvalidBlockSize(0))
        ));
        assert!(matches!(
            format_hex(&[1], HexType::Hex8, 11),
            Err(Error::InvalidBlockSize(11))
        ));
        assert!(check_block_size(10).is_ok());
    }

    #[test]
    fn test_bytes_to_u64() {
        assert_eq!(bytes_to_u64(&[]), 0);
        assert_eq!(bytes_to_u64(&[0x12, 0x34]), 0x1234);
        assert_eq!(bytes_to_u64(&[0xff; 8]), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_bits_match_msb_first(bytes in prop::collection::vec(any::<u8>(), 1..64), cut in 0usize..8) {
            let count = bytes.len() * 8 - cut;
            let bits = extract_bits(&bytes, count);

            prop_assert_eq!(bits.len(), count);
            for (i, bit) in bits.iter().enumerate() {
                let expected = (bytes[i / 8] >> (7 - i % 8)) & 1;
                prop_assert_eq!(*bit, expected);
            }
        }
    }
}
