use crate::util;
use crate::modulus::Modulus;

/// Witnesses that make Miller-Rabin deterministic over the whole u64 range.
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

pub fn gcd(x: u64, y: u64) -> u64 {
    if x < y {
        gcd(y, x)
    } else if y == 0 {
        x
    } else {
        gcd(y, x % y)
    }
}

/** Extended GCD:
Returns (gcd, x, y) where gcd is the greatest common divisor of a and b.
The numbers x, y are such that gcd = ax + by.
*/
pub fn xgcd(mut x: u64, mut y: u64) -> (u64, i128, i128) {
    let (mut prev_a, mut a) = (1i128, 0i128);
    let (mut prev_b, mut b) = (0i128, 1i128);
    while y != 0 {
        let q = (x / y) as i128;
        let r = x % y;
        x = y;
        y = r;
        (prev_a, a) = (a, prev_a - q * a);
        (prev_b, b) = (b, prev_b - q * b);
    }
    (x, prev_a, prev_b)
}

pub fn try_invert_u64_mod_u64(value: u64, modulus: u64) -> Option<u64> {
    if value == 0 || modulus < 2 {return None;}
    let (cd, a, _) = xgcd(value % modulus, modulus);
    if cd != 1 {
        None
    } else {
        Some(a.rem_euclid(modulus as i128) as u64)
    }
}

pub fn is_prime(modulus: &Modulus) -> bool {
    let value = modulus.value();
    if value < 2 {return false;}
    for &p in MILLER_RABIN_BASES.iter() {
        if value == p {return true;}
        if value % p == 0 {return false;}
    }
    // Find r and odd d that satisfy value = 2^r * d + 1.
    let mut d = value - 1;
    let mut r = 0;
    while (d & 1) == 0 {d >>= 1; r += 1;}
    'witness: for &a in MILLER_RABIN_BASES.iter() {
        let mut x = util::exponentiate_u64_mod(a, d, modulus);
        if x == 1 || x == value - 1 {continue;}
        for _ in 1..r {
            x = util::multiply_u64_mod(x, x, modulus);
            if x == value - 1 {continue 'witness;}
        }
        return false;
    }
    true
}

/// Returns `count` primes congruent to 1 modulo `factor`, in decreasing order,
/// all with exactly `bit_size` significant bits.
pub fn get_primes(factor: u64, bit_size: usize, mut count: usize) -> Option<Vec<Modulus>> {
    let mut destination = vec![];
    // Start with (2^bit_size - 1) / factor * factor + 1
    let mut value = ((1u64 << bit_size) - 1) / factor * factor + 1;
    let lower_bound = 1u64 << (bit_size - 1);
    while count > 0 && value > lower_bound {
        let new_mod = Modulus::new(value);
        if new_mod.is_prime() {
            destination.push(new_mod);
            count -= 1;
        }
        value -= factor;
    }
    if count > 0 {None} else {Some(destination)}
}

pub fn is_primitive_root(root: u64, degree: u64, modulus: &Modulus) -> bool {
    // For degree a power of two it suffices to check root^(degree/2) == -1.
    root != 0 && util::exponentiate_u64_mod(root, degree >> 1, modulus) == modulus.value() - 1
}

pub fn try_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    let size_entire_group = modulus.value() - 1;
    if degree == 0 || size_entire_group % degree != 0 {
        return None;
    }
    let size_quotient_group = size_entire_group / degree;
    (2..modulus.value())
        .take(1 << 16)
        .map(|candidate| util::exponentiate_u64_mod(candidate, size_quotient_group, modulus))
        .find(|&root| is_primitive_root(root, degree, modulus))
}

/// The smallest primitive `degree`-th root of unity, so that tables are reproducible.
pub fn try_minimal_primitive_root(degree: u64, modulus: &Modulus) -> Option<u64> {
    let root = try_primitive_root(degree, modulus)?;
    let generator_sq = util::multiply_u64_mod(root, root, modulus);
    let mut current_generator = root;
    let mut minimal = root;
    for _ in 0..((degree + 1) / 2) {
        minimal = minimal.min(current_generator);
        current_generator = util::multiply_u64_mod(current_generator, generator_sq, modulus);
    }
    Some(minimal)
}
