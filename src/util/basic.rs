pub const HE_POLY_MOD_DEGREE_MAX: usize = 32768;
pub const HE_POLY_MOD_DEGREE_MIN: usize = 2;

pub const HE_COEFF_MOD_COUNT_MAX: usize = 64;
pub const HE_COEFF_MOD_COUNT_MIN: usize = 1;

pub const HE_MOD_BIT_COUNT_MAX: usize = 61;

pub const HE_USER_MOD_BIT_COUNT_MAX: usize = 60;
pub const HE_USER_MOD_BIT_COUNT_MIN: usize = 2;

pub const HE_CIPHERTEXT_SIZE_MAX: usize = 3;
pub const HE_CIPHERTEXT_SIZE_MIN: usize = 2;

pub const HE_PRNG_SEED_BYTES: usize = 64;

/// Moduli whose product stays below this many bits can be CRT-composed into a `u128`.
pub const HE_COMPOSE_BIT_COUNT_MAX: usize = 125;

#[inline]
pub fn get_significant_bit_count(value: u64) -> usize {
    if value == 0 {0}
    else {64 - value.leading_zeros() as usize}
}

#[inline]
pub fn get_power_of_two(value: u64) -> isize {
    if value == 0 || (value & (value - 1)) != 0 {-1}
    else {63 - value.leading_zeros() as isize}
}

#[inline]
pub fn reverse_bits_u64(operand: u64, bit_count: usize) -> u64 {
    if bit_count == 0 {
        0
    } else {
        operand.reverse_bits() >> (64 - bit_count)
    }
}

#[inline]
pub fn reverse_bits_usize(operand: usize, bit_count: usize) -> usize {
    reverse_bits_u64(operand as u64, bit_count) as usize
}

pub fn are_close_f64(value1: f64, value2: f64) -> bool {
    let scale_factor = value1.abs().max(value2.abs()).max(1.0);
    (value1 - value2).abs() < f64::EPSILON * scale_factor * 8.0
}
