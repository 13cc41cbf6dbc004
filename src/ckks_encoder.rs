use std::sync::Arc;

use num_complex::Complex;

use crate::{
    util::{self, dwthandler::{Arithmetic, DWTHandler}, GALOIS_GENERATOR},
    context::ContextData,
    ContextError,
    HeContext,
    ParmsID,
    Plaintext,
    Result,
    polymod,
};

#[derive(Clone, Copy, Default)]
struct ComplexArith {}
type FFTHandler = DWTHandler<ComplexArith>;

impl Arithmetic for ComplexArith {
    type Value = Complex<f64>;
    type Root = Complex<f64>;
    type Scalar = f64;

    #[inline]
    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        a + b
    }

    #[inline]
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value {
        a - b
    }

    #[inline]
    fn mul_root(&self, a: &Self::Value, r: &Self::Root) -> Self::Value {
        a * r
    }

    #[inline]
    fn mul_scalar(&self, a: &Self::Value, s: &Self::Scalar) -> Self::Value {
        a * s
    }
}

/// The m-th roots of unity, of which only the first eighth is stored.
struct ComplexRoots {
    roots: Vec<Complex<f64>>,
    degree_of_roots: usize,
}

#[inline]
fn mirror(a: Complex<f64>) -> Complex<f64> {
    Complex::new(a.im, a.re)
}

impl ComplexRoots {

    fn new(degree_of_roots: usize) -> Self {
        let roots = (0..=degree_of_roots / 8).map(|i| {
            Complex::from_polar(1.0, 2.0 * std::f64::consts::PI * (i as f64) / (degree_of_roots as f64))
        }).collect();
        Self {roots, degree_of_roots}
    }

    fn get_root(&self, mut index: usize) -> Complex<f64> {
        let m = self.degree_of_roots;
        index &= m - 1;
        if index <= m / 8 {
            self.roots[index]
        } else if index <= m / 4 {
            mirror(self.roots[m / 4 - index])
        } else if index < m / 2 {
            -self.get_root(m / 2 - index).conj()
        } else if index <= 3 * m / 4 {
            -self.get_root(index - m / 2)
        } else {
            self.get_root(m - index).conj()
        }
    }

}

/// Encodes real vectors into CKKS plaintexts and back.
///
/// If the polynomial modulus degree is N, the encoder maps vectors of up to
/// N/2 values through an approximation of the canonical embedding of
/// Z\[X\]/(X^N+1) into C^(N/2). Slot `i` corresponds to the primitive root
/// 3^i of the Galois group, so the automorphism X -> X^3 rotates the
/// slots by one position.
pub struct CKKSEncoder {
    context: Arc<HeContext>,
    slots: usize,
    root_powers: Vec<Complex<f64>>,
    inv_root_powers: Vec<Complex<f64>>,
    matrix_reps_index_map: Vec<usize>,
    fft_handler: FFTHandler,
}

impl CKKSEncoder {

    /// Creates a CKKSEncoder initialized with the specified [HeContext].
    pub fn new(context: Arc<HeContext>) -> Self {
        let coeff_count = context.poly_modulus_degree();
        let slots = coeff_count / 2;
        let logn = util::get_power_of_two(coeff_count as u64) as usize;
        let m = coeff_count * 2;

        let mut matrix_reps_index_map = vec![0; coeff_count];
        let mut pos = 1;
        for i in 0..slots {
            let index1 = (pos - 1) >> 1;
            let index2 = (m - pos - 1) >> 1;
            matrix_reps_index_map[i] = util::reverse_bits_usize(index1, logn);
            matrix_reps_index_map[i | slots] = util::reverse_bits_usize(index2, logn);
            pos = (pos * GALOIS_GENERATOR) & (m - 1);
        }

        let mut root_powers = vec![Complex::default(); coeff_count];
        let mut inv_root_powers = vec![Complex::default(); coeff_count];
        if m >= 8 {
            let complex_roots = ComplexRoots::new(m);
            for i in 1..coeff_count {
                root_powers[i] = complex_roots.get_root(util::reverse_bits_usize(i, logn));
                inv_root_powers[i] = complex_roots.get_root(util::reverse_bits_usize(i - 1, logn) + 1).conj();
            }
        } else if m == 4 {
            root_powers[1] = Complex::new(0.0, 1.0);
            inv_root_powers[1] = Complex::new(0.0, -1.0);
        }

        Self {
            context,
            slots,
            root_powers,
            inv_root_powers,
            matrix_reps_index_map,
            fft_handler: FFTHandler::new(&ComplexArith::default()),
        }
    }

    /// Return the number of slots that are available for batching.
    pub fn slot_count(&self) -> usize {
        self.slots
    }

    fn data_level(&self, parms_id: Option<ParmsID>) -> Result<&ContextData> {
        let parms_id = parms_id.unwrap_or(*self.context.first_parms_id());
        if !self.context.is_data_level(&parms_id) {
            return Err(ContextError::InvalidParameters("parms_id does not name a data level".to_string()));
        }
        self.context.get_context_data(&parms_id)
            .ok_or_else(|| ContextError::InvalidParameters("parms_id does not name a data level".to_string()))
    }

    /// Encodes complex values into a plaintext at the given level (the first data level by default).
    pub fn encode_c64_array(&self, values: &[Complex<f64>], parms_id: Option<ParmsID>, scale: f64) -> Result<Plaintext> {
        let context_data = self.data_level(parms_id)?;
        if values.len() > self.slots {
            return Err(ContextError::InvalidParameters(
                format!("cannot encode {} values into {} slots", values.len(), self.slots)));
        }
        let total_bits = context_data.total_coeff_modulus_bit_count();
        if !scale.is_finite() || scale <= 0.0 || scale.log2() + 1.0 >= total_bits as f64 {
            return Err(ContextError::InvalidParameters(format!("scale {} out of bounds", scale)));
        }

        if values.iter().any(|x| !x.re.is_finite() || !x.im.is_finite()) {
            return Err(ContextError::InvalidParameters("values are not finite".to_string()));
        }

        let coeff_modulus = context_data.coeff_modulus();
        let n = self.slots * 2;

        let mut conj_values = vec![Complex::default(); n];
        for (i, value) in values.iter().enumerate() {
            conj_values[self.matrix_reps_index_map[i]] = *value;
            conj_values[self.matrix_reps_index_map[i + self.slots]] = value.conj();
        }

        let fix = scale / (n as f64);
        self.fft_handler.transform_from_rev(&mut conj_values,
            util::get_power_of_two(n as u64) as usize, &self.inv_root_powers, Some(&fix));

        let max_coeff = conj_values.iter()
            .map(|x| x.re.abs())
            .fold(0.0, f64::max);
        // One extra bit for the sign.
        let max_coeff_bit_count = max_coeff.max(1.0).log2().ceil() as usize;
        if max_coeff_bit_count >= total_bits {
            return Err(ContextError::InvalidParameters("values are too large to encode".to_string()));
        }

        let mut destination = Plaintext::zeros(context_data, n, scale);
        if max_coeff_bit_count < 64 {
            for (i, value) in conj_values.iter().enumerate() {
                let coeffd = value.re.round();
                let coeffu = coeffd.abs() as u64;
                for (j, modulus) in coeff_modulus.iter().enumerate() {
                    let reduced = modulus.reduce(coeffu);
                    destination.data_mut()[i + j * n] =
                        if coeffd < 0.0 {util::negate_u64_mod(reduced, modulus)} else {reduced};
                }
            }
        } else if max_coeff_bit_count < 127 {
            for (i, value) in conj_values.iter().enumerate() {
                let coeffd = value.re.round();
                let coeffu = coeffd.abs() as u128;
                for (j, modulus) in coeff_modulus.iter().enumerate() {
                    let reduced = modulus.reduce_u128(coeffu);
                    destination.data_mut()[i + j * n] =
                        if coeffd < 0.0 {util::negate_u64_mod(reduced, modulus)} else {reduced};
                }
            }
        } else {
            return Err(ContextError::InvalidParameters("values are too large to encode".to_string()));
        }

        polymod::ntt_p(destination.data_mut(), n, context_data.small_ntt_tables());
        Ok(destination)
    }

    /// Encodes real values into a plaintext at the given level (the first data level by default).
    pub fn encode_f64(&self, values: &[f64], parms_id: Option<ParmsID>, scale: f64) -> Result<Plaintext> {
        let values = values.iter().map(|&x| Complex::new(x, 0.0)).collect::<Vec<_>>();
        self.encode_c64_array(&values, parms_id, scale)
    }

    /// Decodes a plaintext into all of its complex slots.
    pub fn decode(&self, plain: &Plaintext) -> Result<Vec<Complex<f64>>> {
        let context_data = self.data_level(Some(*plain.parms_id()))?;
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = self.slots * 2;
        let logn = util::get_power_of_two(coeff_count as u64) as usize;
        if plain.data().len() != coeff_count * coeff_modulus.len() {
            return Err(ContextError::InvalidParameters("plaintext does not match its level".to_string()));
        }
        if !plain.scale().is_finite() || plain.scale() <= 0.0 || plain.scale().log2() >= context_data.total_coeff_modulus_bit_count() as f64 {
            return Err(ContextError::InvalidParameters(format!("plaintext scale {} is invalid", plain.scale())));
        }

        let mut plain_copy = plain.data().to_vec();
        polymod::intt_p(&mut plain_copy, coeff_count, context_data.small_ntt_tables());

        // Coefficients are small relative to the level modulus, so a prefix of
        // the primes is enough to recover them exactly.
        let prefix = util::composable_prefix_len(coeff_modulus);
        let moduli = &coeff_modulus[..prefix];
        let decryption_modulus = moduli.iter().fold(1u128, |acc, m| acc * m.value() as u128);
        let upper_half_threshold = (decryption_modulus + 1) >> 1;
        let inv_scale = 1.0 / plain.scale();

        let mut residues = vec![0; prefix];
        let mut res = (0..coeff_count).map(|i| {
            residues.iter_mut().enumerate().for_each(|(j, r)| *r = plain_copy[i + j * coeff_count]);
            let value = util::compose_u128(&residues, moduli);
            let signed = if value >= upper_half_threshold {
                -((decryption_modulus - value) as f64)
            } else {
                value as f64
            };
            Complex::new(signed * inv_scale, 0.0)
        }).collect::<Vec<_>>();

        self.fft_handler.transform_to_rev(&mut res, logn, &self.root_powers, None);
        Ok((0..self.slots).map(|i| res[self.matrix_reps_index_map[i]]).collect())
    }

    /// Decodes a plaintext into the real parts of all of its slots.
    pub fn decode_f64(&self, plain: &Plaintext) -> Result<Vec<f64>> {
        Ok(self.decode(plain)?.into_iter().map(|x| x.re).collect())
    }

}
