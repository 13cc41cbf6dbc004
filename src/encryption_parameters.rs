use crate::{
    util,
    CoeffModulus,
    ContextError,
    Modulus,
    Result,
};

/// Selects how fresh ciphertexts are produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
pub enum EncryptionType {
    /// Encryption needs the secret key; no public key is ever derived.
    Symmetric,
    /// A public key is derived so that anyone holding it can encrypt.
    #[default]
    Asymmetric,
}

impl From<EncryptionType> for u8 {
    fn from(val: EncryptionType) -> Self {
        match val {
            EncryptionType::Symmetric => 0,
            EncryptionType::Asymmetric => 1,
        }
    }
}

impl TryFrom<u8> for EncryptionType {
    type Error = ContextError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(EncryptionType::Symmetric),
            1 => Ok(EncryptionType::Asymmetric),
            _ => Err(ContextError::Serialization(format!("invalid encryption type {}", value))),
        }
    }
}

/// A unique identifier for a set (level) of encryption parameters.
pub type ParmsID = crate::util::hash::HashBlock;

/// The default zero ParmsID.
pub const PARMS_ID_ZERO: ParmsID = crate::util::hash::HASH_ZERO_BLOCK;

/// Represents a standard security level according to the HomomorphicEncryption.org
/// security standard.
///
/// Normal users should not have to specify the security level explicitly anywhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    /// No security guaranteed.
    None,
    /// 128-bit classical security.
    #[default]
    Tc128,
    /// 192-bit classical security.
    Tc192,
    /// 256-bit classical security.
    Tc256,
}

impl From<SecurityLevel> for u8 {
    fn from(val: SecurityLevel) -> Self {
        match val {
            SecurityLevel::None => 0,
            SecurityLevel::Tc128 => 1,
            SecurityLevel::Tc192 => 2,
            SecurityLevel::Tc256 => 3,
        }
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = ContextError;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SecurityLevel::None),
            1 => Ok(SecurityLevel::Tc128),
            2 => Ok(SecurityLevel::Tc192),
            3 => Ok(SecurityLevel::Tc256),
            _ => Err(ContextError::Serialization(format!("invalid security level {}", value))),
        }
    }
}

/// The immutable scheme configuration bound to an encryption context.
///
/// It holds the [EncryptionType], the polynomial modulus degree N and the
/// coefficient modulus chain q_0, ..., q_k. The last prime of the chain is
/// reserved for key switching and never carries data.
///
/// ```rust
/// # use heathcliff_context::*;
/// let poly_modulus_degree = 8192;
/// let parms = ContextParameters::new(EncryptionType::Asymmetric)
///     .set_poly_modulus_degree(poly_modulus_degree)
///     .set_coeff_modulus(&CoeffModulus::create(poly_modulus_degree, &[60, 40, 40, 60]).unwrap());
/// assert!(parms.validate().is_ok());
/// ```
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ContextParameters {
    encryption_type: EncryptionType,
    poly_modulus_degree: usize,
    coeff_modulus: Vec<Modulus>,
    security_level: SecurityLevel,
    parms_id: ParmsID,
}

impl ContextParameters {

    /// Creates an empty set of parameters for the given encryption type.
    pub fn new(encryption_type: EncryptionType) -> Self {
        let mut ret = ContextParameters {
            encryption_type,
            ..Default::default()
        };
        ret.compute_parms_id();
        ret
    }

    /// Builds and validates parameters from a degree, a chain of prime bit sizes and an encryption type.
    pub fn generate(poly_modulus_degree: usize, coeff_modulus_bits: &[usize], encryption_type: EncryptionType) -> Result<Self> {
        let coeff_modulus = CoeffModulus::create(poly_modulus_degree, coeff_modulus_bits)?;
        let parms = ContextParameters::new(encryption_type)
            .set_poly_modulus_degree(poly_modulus_degree)
            .set_coeff_modulus(&coeff_modulus);
        parms.validate()?;
        Ok(parms)
    }

    /// Symmetric or asymmetric encryption.
    pub fn encryption_type(&self) -> EncryptionType {self.encryption_type}

    /// Polynomial modulus degree N. The scheme operates
    /// on the polynomial ring Z_q\[X\]/(X^N + 1).
    pub fn poly_modulus_degree(&self) -> usize {self.poly_modulus_degree}

    /// Coefficient moduli chain, defining the coefficient modulus q = q_0 * q_1 * ... * q_k.
    pub fn coeff_modulus(&self) -> &[Modulus] {&self.coeff_modulus}

    /// The security level the chain is checked against.
    pub fn security_level(&self) -> SecurityLevel {self.security_level}

    /// Fingerprint of the full parameter set.
    pub fn parms_id(&self) -> &ParmsID {&self.parms_id}

    /// See [ContextParameters] for an example.
    pub fn set_poly_modulus_degree(mut self, poly_modulus_degree: usize) -> Self {
        self.poly_modulus_degree = poly_modulus_degree;
        self.compute_parms_id();
        self
    }

    /// See [ContextParameters] for an example.
    pub fn set_coeff_modulus(mut self, coeff_modulus: &[Modulus]) -> Self {
        self.coeff_modulus = coeff_modulus.to_vec();
        self.compute_parms_id();
        self
    }

    /// Defaults to [SecurityLevel::Tc128].
    pub fn set_security_level(mut self, security_level: SecurityLevel) -> Self {
        self.security_level = security_level;
        self.compute_parms_id();
        self
    }

    /// Total bit count of the whole chain, special prime included.
    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.coeff_modulus.iter().map(|m| m.bit_count()).sum()
    }

    /// Check that the parameters describe a usable, NTT-friendly leveled scheme.
    pub fn validate(&self) -> Result<()> {
        let degree = self.poly_modulus_degree;
        if !(util::HE_POLY_MOD_DEGREE_MIN..=util::HE_POLY_MOD_DEGREE_MAX).contains(&degree)
            || util::get_power_of_two(degree as u64) < 0
        {
            return Err(ContextError::InvalidParameters(
                format!("poly modulus degree {} is not a supported power of two", degree)));
        }
        if self.coeff_modulus.len() < 2 || self.coeff_modulus.len() > util::HE_COEFF_MOD_COUNT_MAX {
            return Err(ContextError::InvalidParameters(
                "coeff modulus needs at least one data prime and one special prime".to_string()));
        }
        for (i, modulus) in self.coeff_modulus.iter().enumerate() {
            if modulus.bit_count() > util::HE_USER_MOD_BIT_COUNT_MAX
                || modulus.bit_count() < util::HE_USER_MOD_BIT_COUNT_MIN
            {
                return Err(ContextError::InvalidParameters(format!("{} has an unsupported bit count", modulus)));
            }
            if !modulus.is_prime() || modulus.value() % (2 * degree as u64) != 1 {
                return Err(ContextError::InvalidParameters(
                    format!("{} is not a prime congruent to 1 mod {}", modulus, 2 * degree)));
            }
            if self.coeff_modulus[..i].contains(modulus) {
                return Err(ContextError::InvalidParameters(format!("{} appears twice in the chain", modulus)));
            }
        }
        let max_bit_count = CoeffModulus::max_bit_count(degree, self.security_level);
        if self.total_coeff_modulus_bit_count() > max_bit_count {
            return Err(ContextError::InvalidParameters(format!(
                "coeff modulus of {} bits is insecure for degree {} at {:?}",
                self.total_coeff_modulus_bit_count(), degree, self.security_level)));
        }
        Ok(())
    }

    fn compute_parms_id(&mut self) {
        self.parms_id = compute_parms_id(self.encryption_type, self.security_level, self.poly_modulus_degree, &self.coeff_modulus);
    }

}

/// Shorthand for [ContextParameters::generate].
pub fn generate_parameters(poly_modulus_degree: usize, coeff_modulus_bits: &[usize], encryption_type: EncryptionType) -> Result<ContextParameters> {
    ContextParameters::generate(poly_modulus_degree, coeff_modulus_bits, encryption_type)
}

/// Hash of the encryption type, security level, degree and moduli that identifies one level of a chain.
pub(crate) fn compute_parms_id(encryption_type: EncryptionType, security_level: SecurityLevel, poly_modulus_degree: usize, coeff_modulus: &[Modulus]) -> ParmsID {
    let mut param_data = Vec::with_capacity(3 + coeff_modulus.len());
    param_data.push(u8::from(encryption_type) as u64);
    param_data.push(u8::from(security_level) as u64);
    param_data.push(poly_modulus_degree as u64);
    param_data.extend(coeff_modulus.iter().map(|x| x.value()));
    util::hash::hash(&param_data)
}
