use std::cmp::Ordering;
use std::collections::HashMap;

use crate::{
    util,
    ContextError,
    Result,
    SecurityLevel,
};

/// Represent an integer modulus of up to 61 bits.
///
/// The primes of the coefficient modulus chain are represented by
/// instances of Modulus. Reduction goes through native `u128` arithmetic.
#[derive(Debug, Eq, Clone, Copy, Default)]
pub struct Modulus {
    value: u64,
    bit_count: usize,
    is_prime: bool,
}

impl Ord for Modulus {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl PartialOrd for Modulus {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Modulus {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Modulus {

    /// Create a new Modulus instance with the given value.
    /// Panics if the value is 1 or wider than 61 bits; see [Modulus::try_new].
    pub fn new(value: u64) -> Self {
        match Self::try_new(value) {
            Ok(modulus) => modulus,
            Err(_) => panic!("[Invalid argument] Value can be at most 61-bit and cannot be 1."),
        }
    }

    /// Create a new Modulus, rejecting values that cannot serve as a modulus.
    pub fn try_new(value: u64) -> Result<Self> {
        if value == 0 {
            return Ok(Self::default());
        }
        if (value >> util::HE_MOD_BIT_COUNT_MAX != 0) || (value == 1) {
            return Err(ContextError::InvalidParameters(format!("{} is not a valid modulus", value)));
        }
        let mut ret = Modulus {
            value,
            bit_count: util::get_significant_bit_count(value),
            is_prime: false,
        };
        ret.is_prime = util::is_prime(&ret);
        Ok(ret)
    }

    /// Reduce a [u64] modulo this modulus.
    #[inline]
    pub fn reduce(&self, value: u64) -> u64 {
        value % self.value
    }

    /// Reduce a [u128] modulo this modulus.
    #[inline]
    pub fn reduce_u128(&self, value: u128) -> u64 {
        (value % self.value as u128) as u64
    }

    /// The [u64] value.
    pub fn value(&self) -> u64 {self.value}
    /// Is the value a prime number?
    pub fn is_prime(&self) -> bool {self.is_prime}
    /// Is the value zero?
    pub fn is_zero(&self) -> bool {self.value == 0}
    /// How many bits are there in the modulus?
    pub fn bit_count(&self) -> usize {self.bit_count}

}

impl std::fmt::Display for Modulus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Modulus ({})", self.value)
    }
}

/// Static methods for creating a coefficient modulus chain.
///
/// Security guarantees are lost if the output is used with a mismatching
/// poly_modulus_degree.
pub struct CoeffModulus;

impl CoeffModulus {

    /// Returns the largest bit-length of the product of the primes in the
    /// coefficient modulus that guarantees a given security level for a given
    /// poly_modulus_degree, according to the HomomorphicEncryption.org standard.
    /// Zero means the degree is not covered by the standard.
    pub fn max_bit_count(poly_modulus_degree: usize, sec_level: SecurityLevel) -> usize {
        match sec_level {
            SecurityLevel::None => usize::MAX,
            SecurityLevel::Tc128 => util::he_standard_params::he_standard_params_128_tc(poly_modulus_degree),
            SecurityLevel::Tc192 => util::he_standard_params::he_standard_params_192_tc(poly_modulus_degree),
            SecurityLevel::Tc256 => util::he_standard_params::he_standard_params_256_tc(poly_modulus_degree),
        }
    }

    /// Returns a coefficient modulus suitable for the given poly_modulus_degree:
    /// distinct primes with the bit-lengths in `bit_sizes` (at most 60 bits),
    /// each congruent to 1 modulo 2*poly_modulus_degree.
    pub fn create(poly_modulus_degree: usize, bit_sizes: &[usize]) -> Result<Vec<Modulus>> {
        if !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&poly_modulus_degree) ||
            util::get_power_of_two(poly_modulus_degree as u64) < 0
        {
            return Err(ContextError::InvalidParameters(
                format!("poly modulus degree {} is not a supported power of two", poly_modulus_degree)));
        }
        if !(util::HE_COEFF_MOD_COUNT_MIN..=util::HE_COEFF_MOD_COUNT_MAX).contains(&bit_sizes.len()) {
            return Err(ContextError::InvalidParameters(
                format!("coeff modulus chain of {} primes is not supported", bit_sizes.len())));
        }
        if let Some(size) = bit_sizes.iter()
            .find(|size| !(util::HE_USER_MOD_BIT_COUNT_MIN..=util::HE_USER_MOD_BIT_COUNT_MAX).contains(size))
        {
            return Err(ContextError::InvalidParameters(format!("prime bit size {} is out of range", size)));
        }
        let mut count_table: HashMap<usize, usize> = HashMap::new();
        for size in bit_sizes {
            *count_table.entry(*size).or_insert(0) += 1;
        }
        let factor = 2 * poly_modulus_degree as u64;
        let mut prime_table = HashMap::new();
        for (size, count) in count_table {
            let primes = util::get_primes(factor, size, count).ok_or_else(|| ContextError::InvalidParameters(
                format!("not enough {}-bit primes for degree {}", size, poly_modulus_degree)))?;
            prime_table.insert(size, primes);
        }
        let mut result = Vec::with_capacity(bit_sizes.len());
        for size in bit_sizes {
            // Each table holds exactly as many primes as its size occurs.
            if let Some(prime) = prime_table.get_mut(size).and_then(|r| r.pop()) {
                result.push(prime);
            }
        }
        Ok(result)
    }

}
