use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    encryption_parameters::compute_parms_id,
    util::{self, BlakeRNG, BlakeRNGFactory, GaloisTool, NTTTables},
    ContextError,
    ContextParameters,
    Modulus,
    ParmsID,
    Result,
};

/**
Pre-computation data for one level of the modulus switching chain.

A level is a prefix q_0, ..., q_{m-1} of the coefficient modulus chain.
*/
pub struct ContextData {
    parms_id: ParmsID,
    chain_index: usize,
    coeff_modulus: Vec<Modulus>,
    small_ntt_tables: Vec<NTTTables>,
    total_coeff_modulus_bit_count: usize,
}

impl ContextData {

    /// Returns the [ParmsID] of this level.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// The primes active at this level.
    pub fn coeff_modulus(&self) -> &[Modulus] {
        &self.coeff_modulus
    }

    /// Number of primes active at this level.
    pub fn coeff_modulus_size(&self) -> usize {
        self.coeff_modulus.len()
    }

    /// NTT tables of the coeffcient moduli.
    pub fn small_ntt_tables(&self) -> &[NTTTables] {
        &self.small_ntt_tables
    }

    /// Sum of the bit counts of the active primes.
    pub fn total_coeff_modulus_bit_count(&self) -> usize {
        self.total_coeff_modulus_bit_count
    }

    /// The chain index of this level. The last level has index 0.
    pub fn chain_index(&self) -> usize {
        self.chain_index
    }

}

/// Validated parameters together with the chain of [ContextData] derived from them.
///
/// The first element of the chain is the key level, which carries every prime
/// including the special one; it is only used by keys. The data levels
/// follow, each dropping the last prime of the previous one, down to a single
/// prime. Ciphertexts and plaintexts always live on a data level.
///
/// A [HeContext] is immutable once built and is shared through an [Arc].
pub struct HeContext {
    parameters: ContextParameters,
    levels: Vec<ContextData>,
    galois_tool: GaloisTool,
    random_generator_factory: BlakeRNGFactory,
}

impl HeContext {

    /// Validate the parameters and build the modulus switching chain.
    pub fn new(parameters: &ContextParameters) -> Result<Arc<Self>> {
        parameters.validate()?;
        let degree = parameters.poly_modulus_degree();
        let coeff_count_power = util::get_power_of_two(degree as u64) as usize;
        let coeff_modulus = parameters.coeff_modulus();
        let ntt_tables = NTTTables::create_ntt_tables(coeff_count_power, coeff_modulus)
            .map_err(ContextError::InvalidParameters)?;

        let levels = (1..=coeff_modulus.len()).rev().map(|count| {
            let moduli = &coeff_modulus[..count];
            ContextData {
                parms_id: compute_parms_id(parameters.encryption_type(), parameters.security_level(), degree, moduli),
                chain_index: count - 1,
                coeff_modulus: moduli.to_vec(),
                small_ntt_tables: ntt_tables[..count].to_vec(),
                total_coeff_modulus_bit_count: moduli.iter().map(|m| m.bit_count()).sum(),
            }
        }).collect::<Vec<_>>();

        debug!(
            poly_modulus_degree = degree,
            levels = levels.len(),
            total_bits = parameters.total_coeff_modulus_bit_count(),
            "built modulus switching chain"
        );

        Ok(Arc::new(HeContext {
            parameters: parameters.clone(),
            levels,
            galois_tool: GaloisTool::new(coeff_count_power),
            random_generator_factory: BlakeRNGFactory::new(),
        }))
    }

    /// The parameters this chain was built from.
    pub fn parameters(&self) -> &ContextParameters {
        &self.parameters
    }

    /// Polynomial modulus degree N.
    pub fn poly_modulus_degree(&self) -> usize {
        self.parameters.poly_modulus_degree()
    }

    /// Get the [ContextData] of the specified [ParmsID].
    pub fn get_context_data(&self, parms_id: &ParmsID) -> Option<&ContextData> {
        self.levels.iter().find(|level| level.parms_id() == parms_id)
    }

    /// Get the level directly below the specified one.
    pub fn next_context_data(&self, parms_id: &ParmsID) -> Option<&ContextData> {
        let position = self.levels.iter().position(|level| level.parms_id() == parms_id)?;
        self.levels.get(position + 1)
    }

    /// Get the [ContextData] of the key level.
    pub fn key_context_data(&self) -> &ContextData {
        &self.levels[0]
    }

    /// Get the [ContextData] of the first ciphertext level.
    pub fn first_context_data(&self) -> &ContextData {
        &self.levels[1]
    }

    /// Get the [ContextData] of the last ciphertext level.
    pub fn last_context_data(&self) -> &ContextData {
        &self.levels[self.levels.len() - 1]
    }

    /// Get the [ParmsID] of the key level.
    pub fn key_parms_id(&self) -> &ParmsID {
        self.key_context_data().parms_id()
    }

    /// Get the [ParmsID] of the first ciphertext level.
    pub fn first_parms_id(&self) -> &ParmsID {
        self.first_context_data().parms_id()
    }

    /// Get the [ParmsID] of the last ciphertext level.
    pub fn last_parms_id(&self) -> &ParmsID {
        self.last_context_data().parms_id()
    }

    /// Is `parms_id` one of the data levels?
    pub fn is_data_level(&self, parms_id: &ParmsID) -> bool {
        self.levels[1..].iter().any(|level| level.parms_id() == parms_id)
    }

    pub(crate) fn galois_tool(&self) -> &GaloisTool {
        &self.galois_tool
    }

    pub(crate) fn create_random_generator(&self) -> BlakeRNG {
        self.random_generator_factory.get_rng()
    }

}

impl fmt::Debug for HeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeContext")
            .field("parameters", &self.parameters)
            .field("levels", &self.levels.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CoeffModulus, EncryptionType, SecurityLevel};

    #[test]
    fn test_chain() {
        let parms = ContextParameters::new(EncryptionType::Asymmetric)
            .set_poly_modulus_degree(64)
            .set_coeff_modulus(&CoeffModulus::create(64, &[30, 20, 20, 30]).unwrap())
            .set_security_level(SecurityLevel::None);
        let context = HeContext::new(&parms).unwrap();

        assert_eq!(context.key_parms_id(), parms.parms_id());
        assert_eq!(context.key_context_data().coeff_modulus_size(), 4);
        assert_eq!(context.key_context_data().chain_index(), 3);
        assert_eq!(context.first_context_data().coeff_modulus_size(), 3);
        assert_eq!(context.last_context_data().coeff_modulus_size(), 1);
        assert_eq!(context.last_context_data().chain_index(), 0);
        assert_eq!(context.first_context_data().total_coeff_modulus_bit_count(), 70);

        let second = context.next_context_data(context.first_parms_id()).unwrap();
        assert_eq!(second.coeff_modulus(), &parms.coeff_modulus()[..2]);
        assert!(context.next_context_data(context.last_parms_id()).is_none());
        assert!(context.is_data_level(context.first_parms_id()));
        assert!(!context.is_data_level(context.key_parms_id()));
        assert!(context.get_context_data(&crate::PARMS_ID_ZERO).is_none());
    }

    #[test]
    fn test_debug() {
        let parms = ContextParameters::new(EncryptionType::Asymmetric)
            .set_poly_modulus_degree(64)
            .set_coeff_modulus(&CoeffModulus::create(64, &[30, 20, 30]).unwrap())
            .set_security_level(SecurityLevel::None);
        let context = HeContext::new(&parms).unwrap();
        let printed = format!("{:?}", context);
        assert!(printed.starts_with("HeContext"));
        assert!(printed.contains("levels: 3"));
        assert!(printed.ends_with(".. }"));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let parms = ContextParameters::new(EncryptionType::Symmetric)
            .set_poly_modulus_degree(64)
            .set_coeff_modulus(&CoeffModulus::create(64, &[30]).unwrap())
            .set_security_level(SecurityLevel::None);
        assert!(matches!(HeContext::new(&parms), Err(ContextError::InvalidParameters(_))));
    }
}
