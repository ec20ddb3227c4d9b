use crate::pin::PinValue;

/// Pack little-endian bits (index 0 = least significant) into an integer.
pub fn list_to_int(bits: &[bool]) -> u32 {
    bits.iter()
        .enumerate()
        .filter(|(_, bit)| **bit)
        .fold(0, |value, (i, _)| value | (1 << i))
}

/// Unpack the low `width` bits of `value`, least significant first.
pub fn int_to_list(value: u32, width: usize) -> Vec<bool> {
    (0..width).map(|i| value & (1 << i) != 0).collect()
}

/// Like [`list_to_int`], but `None` if any line is floating.
pub fn levels_to_int(levels: &[PinValue]) -> Option<u32> {
    let bits: Option<Vec<bool>> = levels.iter().map(PinValue::to_bool).collect();
    bits.map(|bits| list_to_int(&bits))
}

pub fn int_to_levels(value: u32, width: usize) -> Vec<PinValue> {
    int_to_list(value, width)
        .into_iter()
        .map(PinValue::from_bool)
        .collect()
}

/// Render levels most significant first, `x` for floating lines.
pub fn bit_string(levels: &[PinValue]) -> String {
    levels.iter().rev().map(PinValue::to_char).collect()
}

/// Two's-complement byte for a value in `-128..=255`.
pub fn to_unsigned(signed: i16) -> u8 {
    (signed as i32).rem_euclid(256) as u8
}

pub fn to_signed(unsigned: u8) -> i8 {
    unsigned as i8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_packing() {
        assert_eq!(list_to_int(&[true, false, true]), 5);
        assert_eq!(int_to_list(6, 4), vec![false, true, true, false]);
        assert_eq!(list_to_int(&int_to_list(0xA5, 8)), 0xA5);
    }

    #[test]
    fn test_floating_levels_have_no_value() {
        let levels = [PinValue::High, PinValue::HighZ, PinValue::Low];
        assert_eq!(levels_to_int(&levels), None);
        assert_eq!(levels_to_int(&int_to_levels(9, 4)), Some(9));
    }

    #[test]
    fn test_bit_string_msb_first() {
        let levels = [PinValue::High, PinValue::Low, PinValue::HighZ];
        assert_eq!(bit_string(&levels), "x01");
    }

    #[test]
    fn test_twos_complement() {
        assert_eq!(to_unsigned(-1), 255);
        assert_eq!(to_unsigned(-255), 1);
        assert_eq!(to_unsigned(3), 3);
        assert_eq!(to_signed(255), -1);
    }
}
