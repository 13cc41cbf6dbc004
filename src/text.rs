use crate::{ParmsID, PARMS_ID_ZERO, context::ContextData, util};

/// An encoded CKKS message: one polynomial in NTT form with respect to every
/// prime of the level named by its [ParmsID].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Plaintext {
    poly_modulus_degree: usize,
    coeff_modulus_size: usize,
    data: Vec<u64>,
    parms_id: ParmsID,
    scale: f64,
}

impl Default for Plaintext {
    fn default() -> Self {
        Plaintext { poly_modulus_degree: 0, coeff_modulus_size: 0, data: vec![], parms_id: PARMS_ID_ZERO, scale: 1.0 }
    }
}

impl Plaintext {

    /// Creates an empty plaintext.
    pub fn new() -> Self {
        Plaintext::default()
    }

    /// Zero-filled plaintext at the given level.
    pub(crate) fn zeros(context_data: &ContextData, poly_modulus_degree: usize, scale: f64) -> Self {
        let coeff_modulus_size = context_data.coeff_modulus_size();
        Plaintext {
            poly_modulus_degree,
            coeff_modulus_size,
            data: vec![0; poly_modulus_degree * coeff_modulus_size],
            parms_id: *context_data.parms_id(),
            scale,
        }
    }

    /// The [ParmsID] of the plaintext.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// The scale of the plaintext.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of primes the plaintext is reduced by.
    pub fn coeff_modulus_size(&self) -> usize {
        self.coeff_modulus_size
    }

    /// The degree of the polynomial modulus.
    pub fn poly_modulus_degree(&self) -> usize {
        self.poly_modulus_degree
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    /// Returns a mutable reference to the underlying data.
    pub fn data_mut(&mut self) -> &mut [u64] {
        &mut self.data
    }

    /// Return a mutable reference to RNS component at the specified index.
    pub fn component_mut(&mut self, index: usize) -> &mut [u64] {
        let start = index * self.poly_modulus_degree;
        &mut self.data[start..start + self.poly_modulus_degree]
    }

    /// Drop trailing primes so that the plaintext lives on `context_data`.
    pub(crate) fn truncate_to(&mut self, context_data: &ContextData) {
        self.coeff_modulus_size = context_data.coeff_modulus_size();
        self.data.truncate(self.poly_modulus_degree * self.coeff_modulus_size);
        self.parms_id = *context_data.parms_id();
    }

}


/// A CKKS ciphertext: two or more polynomials in NTT form with respect to
/// the primes of its level.
///
/// If the size of the ciphertext is T, the degree is N and the level
/// has K primes, the backing array holds exactly N*K*T words.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    size: usize,
    coeff_modulus_size: usize,
    poly_modulus_degree: usize,
    data: Vec<u64>,
    parms_id: ParmsID,
    scale: f64,
}

impl Default for Ciphertext {
    fn default() -> Self {
        Ciphertext {
            size: 0,
            coeff_modulus_size: 0,
            poly_modulus_degree: 0,
            data: vec![],
            parms_id: PARMS_ID_ZERO,
            scale: 1.0,
        }
    }
}

impl Ciphertext {

    /// Creates an empty ciphertext.
    pub fn new() -> Self {Self::default()}

    /// The [ParmsID] of the ciphertext.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// The scale of the ciphertext.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the scale of the ciphertext.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// The number of coeff modulus in the polynomials.
    pub fn coeff_modulus_size(&self) -> usize {
        self.coeff_modulus_size
    }

    /// The number of polynomials in the ciphertext,
    /// not the total count of coefficients in the polynomials.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The degree of the polynomial modulus.
    pub fn poly_modulus_degree(&self) -> usize {
        self.poly_modulus_degree
    }

    /// Returns a reference to the underlying data.
    pub fn data(&self) -> &[u64] {
        &self.data
    }

    /// Resize to `size` polynomials at the level of `context_data`, zeroing new words.
    pub(crate) fn resize(&mut self, context_data: &ContextData, poly_modulus_degree: usize, size: usize) {
        debug_assert!((util::HE_CIPHERTEXT_SIZE_MIN..=util::HE_CIPHERTEXT_SIZE_MAX).contains(&size));
        self.coeff_modulus_size = context_data.coeff_modulus_size();
        self.poly_modulus_degree = poly_modulus_degree;
        self.parms_id = *context_data.parms_id();
        self.size = size;
        self.data.resize(size * poly_modulus_degree * self.coeff_modulus_size, 0);
    }

    /// Keep only the first `size` polynomials.
    pub(crate) fn truncate_size(&mut self, size: usize) {
        self.size = size;
        self.data.truncate(size * self.poly_modulus_degree * self.coeff_modulus_size);
    }

    /// Replace every polynomial with its first `context_data.coeff_modulus_size()` components.
    pub(crate) fn truncate_to(&mut self, context_data: &ContextData) {
        let old_d = self.poly_modulus_degree * self.coeff_modulus_size;
        let new_d = self.poly_modulus_degree * context_data.coeff_modulus_size();
        for i in 1..self.size {
            self.data.copy_within(i * old_d..i * old_d + new_d, i * new_d);
        }
        self.data.truncate(self.size * new_d);
        self.coeff_modulus_size = context_data.coeff_modulus_size();
        self.parms_id = *context_data.parms_id();
    }

    /// Returns a reference to the polynomial at the given index.
    pub fn poly(&self, id: usize) -> &[u64] {
        let d = self.poly_modulus_degree * self.coeff_modulus_size;
        &self.data[id * d..(id + 1) * d]
    }

    /// Returns a mutable reference to the polynomial at the given index.
    pub fn poly_mut(&mut self, id: usize) -> &mut [u64] {
        let d = self.poly_modulus_degree * self.coeff_modulus_size;
        &mut self.data[id * d..(id + 1) * d]
    }

    /// Mutable access to polynomial `id` alongside shared access to all the others.
    pub(crate) fn split_poly_mut(&mut self, id: usize) -> (&mut [u64], &[u64], &[u64]) {
        let d = self.poly_modulus_degree * self.coeff_modulus_size;
        let (before, rest) = self.data.split_at_mut(id * d);
        let (target, after) = rest.split_at_mut(d);
        (target, before, after)
    }

    /// Returns a reference to the component of the polynomial at the given index.
    pub fn poly_component(&self, poly_id: usize, component_id: usize) -> &[u64] {
        let offset = self.poly_modulus_degree * (poly_id * self.coeff_modulus_size + component_id);
        &self.data[offset .. offset + self.poly_modulus_degree]
    }

    /// Is the ciphertext zero?
    /// Transparent ciphertexts could leak information about the secret key.
    pub fn is_transparent(&self) -> bool {
        if self.data.is_empty() || self.size < util::HE_CIPHERTEXT_SIZE_MIN {
            true
        } else {
            self.polys_from(1).iter().all(|&x| x == 0)
        }
    }

    fn polys_from(&self, id: usize) -> &[u64] {
        let d = self.poly_modulus_degree * self.coeff_modulus_size;
        &self.data[id * d..]
    }

}
