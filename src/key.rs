use std::{ops::Index, sync::Arc};

use tracing::debug;

use crate::{
    context::HeContext,
    polymod,
    util::{self, rlwe::{self, sample::ErrorDistribution}},
    Ciphertext,
    ContextError,
    ParmsID,
    Plaintext,
    Result,
};


/// Struct to store a secret key.
///
/// Internally and mathematically the secret key is a [Plaintext] object: a
/// ternary polynomial in NTT form with respect to every prime of the key level.
///
/// - See [KeyGenerator] for the class that generates the secret key.
/// - See [PublicKey] for the class that stores the public key.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SecretKey {
    sk: Plaintext
}

impl SecretKey {

    /// The [ParmsID] of the secret key.
    pub fn parms_id(&self) -> &ParmsID {
        self.sk.parms_id()
    }

    /// The inner [Plaintext] object.
    pub fn as_plaintext(&self) -> &Plaintext {
        &self.sk
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[u64] {
        self.sk.data()
    }

}

/// Struct to store a public key.
///
/// Internally and mathematically the public key is a size-2 [Ciphertext]
/// encrypting zero at the key level.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PublicKey {
    pk: Ciphertext
}

impl PublicKey {

    /// The [ParmsID] of the public key.
    pub fn parms_id(&self) -> &ParmsID {
        self.pk.parms_id()
    }

    /// The inner [Ciphertext] object.
    pub fn as_ciphertext(&self) -> &Ciphertext {
        &self.pk
    }

}

impl From<Ciphertext> for PublicKey {
    fn from(pk: Ciphertext) -> Self {
        Self {pk}
    }
}

/// Struct to store keyswitching keys.
///
/// A keyswitching key contains a sequence (vector) of keys. In [RelinKeys],
/// each key is an encryption of a power of the secret key. In [GaloisKeys],
/// each key corresponds to one Galois automorphism of the secret key.
/// Each key is itself one [PublicKey] per data prime of the first level.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(clippy::len_without_is_empty)]
pub struct KSwitchKeys {
    parms_id: ParmsID,
    keys: Vec<Vec<PublicKey>>
}

impl KSwitchKeys {

    /// The [ParmsID] of the keyswitching keys.
    pub fn parms_id(&self) -> &ParmsID {&self.parms_id}

    /// The inner public-key data in the keyswitching keys.
    pub fn data(&self) -> &[Vec<PublicKey>] {&self.keys}

    /// The number of non-empty keys in the keyswitching keys.
    pub fn len(&self) -> usize {
        self.keys.iter().filter(|key| !key.is_empty()).count()
    }

}

impl Index<usize> for KSwitchKeys {
    type Output = Vec<PublicKey>;
    fn index(&self, index: usize) -> &Self::Output {
        &self.keys[index]
    }
}

/// Struct to store relinearization keys.
///
/// Multiplying two size-2 ciphertexts gives a size-3 ciphertext.
/// Relinearization brings it back to size 2 using an encryption of s^2.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RelinKeys {
    keys: KSwitchKeys
}

impl RelinKeys {

    /// Get the inner keyswitching key index corresponding to the given power.
    pub fn get_index(key_power: usize) -> usize {
        key_power.saturating_sub(2)
    }

    /// Does the relinearization key have a key for the given power?
    pub fn has_key(&self, key_power: usize) -> bool {
        let index = Self::get_index(key_power);
        key_power >= 2 && index < self.keys.data().len() && !self.keys[index].is_empty()
    }

    /// Get the key for the given power.
    pub fn key(&self, key_power: usize) -> &Vec<PublicKey> {
        &self.keys[Self::get_index(key_power)]
    }

    /// The [ParmsID] of the relinearization keys.
    pub fn parms_id(&self) -> &ParmsID {
        self.keys.parms_id()
    }

    /// As a reference to the inner keyswitching keys.
    pub fn as_kswitch_keys(&self) -> &KSwitchKeys {
        &self.keys
    }

}

/// Struct to store Galois keys.
///
/// # Slot Rotations
/// A CKKS ciphertext encrypts an N/2-dimensional vector of complex numbers.
/// Galois keys enable cyclic rotations of that vector as well as complex
/// conjugation. One key is stored per Galois element, at index (elt - 1) / 2.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GaloisKeys {
    keys: KSwitchKeys
}

impl GaloisKeys {

    /// Get the inner keyswitching key index corresponding to the given Galois element.
    pub fn get_index(galois_elt: usize) -> usize {
        util::GaloisTool::get_index_from_elt(galois_elt)
    }

    /// Is there a key for the given Galois element?
    pub fn has_key(&self, galois_elt: usize) -> bool {
        let index = Self::get_index(galois_elt);
        galois_elt & 1 == 1 && index < self.keys.data().len() && !self.keys[index].is_empty()
    }

    /// Get the key for the given Galois element.
    pub fn key(&self, galois_elt: usize) -> &Vec<PublicKey> {
        &self.keys[Self::get_index(galois_elt)]
    }

    /// Galois elements with a key, in increasing order.
    pub fn galois_elts(&self) -> Vec<usize> {
        self.keys.data().iter().enumerate()
            .filter(|(_, key)| !key.is_empty())
            .map(|(index, _)| 2 * index + 1)
            .collect()
    }

    /// The [ParmsID] of the Galois keys.
    pub fn parms_id(&self) -> &ParmsID {
        self.keys.parms_id()
    }

    /// As a reference to the inner keyswitching keys.
    pub fn as_kswitch_keys(&self) -> &KSwitchKeys {
        &self.keys
    }

}

/// Provides key generation utilities.
///
/// Owns a secret key and derives public, relinearization and Galois keys from it.
/// Constructing a KeyGenerator requires only a [HeContext].
pub struct KeyGenerator {
    context: Arc<HeContext>,
    secret_key: SecretKey,
}

impl KeyGenerator {

    /// Create a new KeyGenerator with a freshly sampled secret key.
    pub fn new(context: Arc<HeContext>) -> Self {
        let context_data = context.key_context_data();
        let coeff_count = context.poly_modulus_degree();
        let mut sk = Plaintext::zeros(context_data, coeff_count, 1.0);
        let mut rng = context.create_random_generator();
        rlwe::sample::ternary(&mut rng, context_data.coeff_modulus(), coeff_count, sk.data_mut());
        polymod::ntt_p(sk.data_mut(), coeff_count, context_data.small_ntt_tables());
        Self {context, secret_key: SecretKey {sk}}
    }

    /// Create a new KeyGenerator with a given secret key.
    pub fn from_sk(context: Arc<HeContext>, secret_key: SecretKey) -> Self {
        Self {context, secret_key}
    }

    /// The [HeContext] used by the KeyGenerator.
    pub fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    /// Obtain a reference to the secret key.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    /// Generates a new [PublicKey] corresponding to the secret key.
    pub fn create_public_key(&self) -> PublicKey {
        let mut public_key = Ciphertext::new();
        rlwe::encrypt_zero::symmetric_with_error(
            &self.secret_key, &self.context, self.context.key_context_data(),
            ErrorDistribution::ClippedNormal, &mut public_key);
        debug!("generated public key");
        PublicKey::from(public_key)
    }

    /// One encryption of `new_key * P` per data prime, P being the special prime.
    fn generate_one_kswitch_key(&self, new_key: &[u64]) -> Vec<PublicKey> {
        let key_context_data = self.context.key_context_data();
        let coeff_count = self.context.poly_modulus_degree();
        let key_modulus = key_context_data.coeff_modulus();
        let special_prime = key_modulus[key_modulus.len() - 1].value();
        let decomp_mod_count = self.context.first_context_data().coeff_modulus_size();

        (0..decomp_mod_count).map(|i| {
            let mut key = Ciphertext::new();
            rlwe::encrypt_zero::symmetric_with_error(
                &self.secret_key, &self.context, key_context_data,
                ErrorDistribution::ClippedNormal, &mut key);
            let modulus = &key_modulus[i];
            let factor = modulus.reduce(special_prime);
            let component = &mut key.poly_mut(0)[i * coeff_count..(i + 1) * coeff_count];
            component.iter_mut().zip(new_key[i * coeff_count..(i + 1) * coeff_count].iter())
                .for_each(|(c, k)| *c = util::multiply_add_u64_mod(*k, factor, *c, modulus));
            PublicKey::from(key)
        }).collect()
    }

    /// Creates a [RelinKeys] object that can be used to relinearize ciphertexts.
    pub fn create_relin_keys(&self) -> RelinKeys {
        let context_data = self.context.key_context_data();
        let coeff_count = self.context.poly_modulus_degree();
        let secret = self.secret_key.data();
        let mut secret_square = vec![0; secret.len()];
        polymod::dyadic_product_p(secret, secret, coeff_count, context_data.coeff_modulus(), &mut secret_square);

        let keys = KSwitchKeys {
            parms_id: *context_data.parms_id(),
            keys: vec![self.generate_one_kswitch_key(&secret_square)],
        };
        debug!("generated relinearization keys");
        RelinKeys {keys}
    }

    fn generate_galois_keys(&self, galois_elts: &[usize]) -> GaloisKeys {
        let context_data = self.context.key_context_data();
        let galois_tool = self.context.galois_tool();

        let mut keys = vec![vec![]; self.context.poly_modulus_degree()];
        for &galois_elt in galois_elts {
            let index = GaloisKeys::get_index(galois_elt);
            if !keys[index].is_empty() {
                continue;
            }
            let mut rotated_secret_key = vec![0; self.secret_key.data().len()];
            galois_tool.apply_ntt_p(self.secret_key.data(), galois_elt, &mut rotated_secret_key);
            keys[index] = self.generate_one_kswitch_key(&rotated_secret_key);
        }

        let keys = KSwitchKeys {parms_id: *context_data.parms_id(), keys};
        debug!(count = keys.len(), "generated Galois keys");
        GaloisKeys {keys}
    }

    /// Creates a [GaloisKeys] object that can be used to apply Galois automorphisms to ciphertexts,
    /// using the specified Galois elements.
    pub fn create_galois_keys_from_elts(&self, galois_elts: &[usize]) -> Result<GaloisKeys> {
        if let Some(elt) = galois_elts.iter().find(|&&elt| !self.context.galois_tool().is_valid_elt(elt)) {
            return Err(ContextError::InvalidParameters(format!("invalid Galois element {}", elt)));
        }
        Ok(self.generate_galois_keys(galois_elts))
    }

    /// Creates a [GaloisKeys] object that can be used to apply Galois automorphisms to ciphertexts,
    /// using the specified rotation steps.
    pub fn create_galois_keys_from_steps(&self, steps: &[isize]) -> Result<GaloisKeys> {
        let galois_tool = self.context.galois_tool();
        let elts = steps.iter().map(|&step| {
            galois_tool.get_elt_from_step(step)
                .ok_or_else(|| ContextError::InvalidParameters(format!("rotation step {} out of range", step)))
        }).collect::<Result<Vec<_>>>()?;
        Ok(self.generate_galois_keys(&elts))
    }

    /// Creates a [GaloisKeys] object that can be used to apply Galois automorphisms to ciphertexts,
    /// using steps of ±2^i and conjugation.
    pub fn create_galois_keys(&self) -> GaloisKeys {
        self.generate_galois_keys(&self.context.galois_tool().get_elts_all())
    }

}
