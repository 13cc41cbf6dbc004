use std::{iter, sync::Arc};

use itertools::izip;

use crate::{
    context::ContextData,
    polymod,
    util::{self, NTTTables},
    Ciphertext,
    ContextError,
    GaloisKeys,
    HeContext,
    Modulus,
    ParmsID,
    Plaintext,
    PublicKey,
    RelinKeys,
    Result,
    ValCheck,
};

fn evaluation_error(message: &str) -> ContextError {
    ContextError::Evaluation(message.to_string())
}

/// Provides operations on [Ciphertext] objects.
///
/// Arithmetic passes through the encryption layer to the encoded vectors,
/// acting slot-wise. Every ciphertext is kept in NTT form.
///
/// ## Arithmetic Operations
/// Addition, subtraction and negation keep the size of a ciphertext.
/// Multiplying two ciphertexts of size 2 gives a ciphertext of size 3, whose
/// scale is the product of the input scales. Relinearization brings it back
/// to size 2 and requires [RelinKeys].
///
/// ## Levels and scales
/// Binary operations require both operands at the same level. Additions also
/// require equal scales. [Evaluator::rescale_to_next] divides by the last prime
/// of the level, dropping it and dividing the scale accordingly, while
/// [Evaluator::mod_switch_to_next] drops the prime without touching the scale.
///
/// ## Rotations
/// [Evaluator::rotate_vector_inplace] cyclically rotates the slots and
/// [Evaluator::complex_conjugate_inplace] conjugates them. Both require
/// [GaloisKeys] holding the matching Galois element.
pub struct Evaluator {
    context: Arc<HeContext>,
}

impl Evaluator {

    /// Create an evaluator with the specified [HeContext].
    pub fn new(context: Arc<HeContext>) -> Self {
        Self {context}
    }

    /// Returns a reference to the [HeContext] used by the evaluator.
    pub fn context(&self) -> &Arc<HeContext> {
        &self.context
    }

    fn check_ciphertext(&self, ciphertext: &Ciphertext) -> Result<()> {
        if !ciphertext.is_valid_for(&self.context) {
            return Err(evaluation_error("ciphertext is not valid for the context"));
        }
        Ok(())
    }

    fn check_plaintext(&self, plaintext: &Plaintext) -> Result<()> {
        if !plaintext.is_valid_for(&self.context) {
            return Err(evaluation_error("plaintext is not valid for the context"));
        }
        Ok(())
    }

    fn context_data(&self, parms_id: &ParmsID) -> Result<&ContextData> {
        self.context.get_context_data(parms_id)
            .ok_or_else(|| evaluation_error("parameters are not part of the context"))
    }

    fn match_parms_id(parms_id1: &ParmsID, parms_id2: &ParmsID) -> Result<()> {
        if parms_id1 != parms_id2 {
            return Err(evaluation_error("operands are at different levels"));
        }
        Ok(())
    }

    fn match_scale(scale1: f64, scale2: f64) -> Result<()> {
        if !util::are_close_f64(scale1, scale2) {
            return Err(evaluation_error("operands have different scales"));
        }
        Ok(())
    }

    fn is_scale_within_bounds(scale: f64, context_data: &ContextData) -> bool {
        scale > 0.0 && (scale.log2() as usize) < context_data.total_coeff_modulus_bit_count()
    }

    /// Negates a ciphertext.
    pub fn negate_inplace(&self, encrypted: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        let context_data = self.context_data(encrypted.parms_id())?;
        let coeff_count = self.context.poly_modulus_degree();
        for i in 0..encrypted.size() {
            polymod::negate_inplace_p(encrypted.poly_mut(i), coeff_count, context_data.coeff_modulus());
        }
        Ok(())
    }

    /// See [Evaluator::negate_inplace].
    pub fn negate_new(&self, encrypted: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.negate_inplace(&mut destination)?;
        Ok(destination)
    }

    fn add_sub_inplace(&self, encrypted1: &mut Ciphertext, encrypted2: &Ciphertext, subtract: bool) -> Result<()> {
        self.check_ciphertext(encrypted1)?;
        self.check_ciphertext(encrypted2)?;
        Self::match_parms_id(encrypted1.parms_id(), encrypted2.parms_id())?;
        Self::match_scale(encrypted1.scale(), encrypted2.scale())?;
        let context_data = self.context_data(encrypted1.parms_id())?;
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = self.context.poly_modulus_degree();
        let size1 = encrypted1.size();
        let size2 = encrypted2.size();
        if size2 > size1 {
            encrypted1.resize(context_data, coeff_count, size2);
        }
        for i in 0..size2 {
            if subtract {
                polymod::sub_inplace_p(encrypted1.poly_mut(i), encrypted2.poly(i), coeff_count, coeff_modulus);
            } else {
                polymod::add_inplace_p(encrypted1.poly_mut(i), encrypted2.poly(i), coeff_count, coeff_modulus);
            }
        }
        Ok(())
    }

    /// Adds two ciphertexts at the same level and scale.
    pub fn add_inplace(&self, encrypted1: &mut Ciphertext, encrypted2: &Ciphertext) -> Result<()> {
        self.add_sub_inplace(encrypted1, encrypted2, false)
    }

    /// See [Evaluator::add_inplace].
    pub fn add_new(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted1.clone();
        self.add_inplace(&mut destination, encrypted2)?;
        Ok(destination)
    }

    /// Subtracts `encrypted2` from `encrypted1`.
    pub fn sub_inplace(&self, encrypted1: &mut Ciphertext, encrypted2: &Ciphertext) -> Result<()> {
        self.add_sub_inplace(encrypted1, encrypted2, true)
    }

    /// See [Evaluator::sub_inplace].
    pub fn sub_new(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted1.clone();
        self.sub_inplace(&mut destination, encrypted2)?;
        Ok(destination)
    }

    /// Adds a plaintext at the same level and scale.
    pub fn add_plain_inplace(&self, encrypted: &mut Ciphertext, plain: &Plaintext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        self.check_plaintext(plain)?;
        Self::match_parms_id(encrypted.parms_id(), plain.parms_id())?;
        Self::match_scale(encrypted.scale(), plain.scale())?;
        let context_data = self.context_data(encrypted.parms_id())?;
        polymod::add_inplace_p(encrypted.poly_mut(0), plain.data(),
            self.context.poly_modulus_degree(), context_data.coeff_modulus());
        Ok(())
    }

    /// See [Evaluator::add_plain_inplace].
    pub fn add_plain_new(&self, encrypted: &Ciphertext, plain: &Plaintext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.add_plain_inplace(&mut destination, plain)?;
        Ok(destination)
    }

    /// Multiplies two ciphertexts of size 2, giving a ciphertext of size 3.
    /// The scale of the result is the product of the scales.
    pub fn multiply_inplace(&self, encrypted1: &mut Ciphertext, encrypted2: &Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted1)?;
        self.check_ciphertext(encrypted2)?;
        Self::match_parms_id(encrypted1.parms_id(), encrypted2.parms_id())?;
        if encrypted1.size() != 2 || encrypted2.size() != 2 {
            return Err(evaluation_error("ciphertexts must be relinearized before multiplication"));
        }
        let context_data = self.context_data(encrypted1.parms_id())?;
        let scale = encrypted1.scale() * encrypted2.scale();
        if !Self::is_scale_within_bounds(scale, context_data) {
            return Err(evaluation_error("scale out of bounds"));
        }
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = self.context.poly_modulus_degree();
        let d = coeff_count * coeff_modulus.len();

        // (a0, a1) * (b0, b1) = (a0 b0, a0 b1 + a1 b0, a1 b1)
        let mut cross = vec![0; d];
        polymod::dyadic_product_p(encrypted1.poly(0), encrypted2.poly(1), coeff_count, coeff_modulus, &mut cross);
        polymod::dyadic_product_accumulate_p(encrypted1.poly(1), encrypted2.poly(0), coeff_count, coeff_modulus, &mut cross);
        encrypted1.resize(context_data, coeff_count, 3);
        {
            let (c2, before, _) = encrypted1.split_poly_mut(2);
            polymod::dyadic_product_p(&before[d..], encrypted2.poly(1), coeff_count, coeff_modulus, c2);
        }
        polymod::dyadic_product_inplace_p(encrypted1.poly_mut(0), encrypted2.poly(0), coeff_count, coeff_modulus);
        encrypted1.poly_mut(1).copy_from_slice(&cross);
        encrypted1.set_scale(scale);
        Ok(())
    }

    /// See [Evaluator::multiply_inplace].
    pub fn multiply_new(&self, encrypted1: &Ciphertext, encrypted2: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted1.clone();
        self.multiply_inplace(&mut destination, encrypted2)?;
        Ok(destination)
    }

    /// Squares a ciphertext of size 2.
    pub fn square_inplace(&self, encrypted: &mut Ciphertext) -> Result<()> {
        let cloned = encrypted.clone();
        self.multiply_inplace(encrypted, &cloned)
    }

    /// See [Evaluator::square_inplace].
    pub fn square_new(&self, encrypted: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.square_inplace(&mut destination)?;
        Ok(destination)
    }

    /// Multiplies a ciphertext by a plaintext at the same level.
    /// The scale of the result is the product of the scales.
    pub fn multiply_plain_inplace(&self, encrypted: &mut Ciphertext, plain: &Plaintext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        self.check_plaintext(plain)?;
        Self::match_parms_id(encrypted.parms_id(), plain.parms_id())?;
        let context_data = self.context_data(encrypted.parms_id())?;
        let scale = encrypted.scale() * plain.scale();
        if !Self::is_scale_within_bounds(scale, context_data) {
            return Err(evaluation_error("scale out of bounds"));
        }
        let coeff_count = self.context.poly_modulus_degree();
        for i in 0..encrypted.size() {
            polymod::dyadic_product_inplace_p(encrypted.poly_mut(i), plain.data(), coeff_count, context_data.coeff_modulus());
        }
        encrypted.set_scale(scale);
        Ok(())
    }

    /// See [Evaluator::multiply_plain_inplace].
    pub fn multiply_plain_new(&self, encrypted: &Ciphertext, plain: &Plaintext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.multiply_plain_inplace(&mut destination, plain)?;
        Ok(destination)
    }

    /// Hybrid key switching with the special prime P.
    ///
    /// `target` is an NTT-form polynomial at the level of `encrypted`, decrypting
    /// under the key that `key_vector` encrypts. The switched pair is added to
    /// the first two polynomials of `encrypted`.
    fn switch_key_inplace(&self, encrypted: &mut Ciphertext, target: &[u64], key_vector: &[PublicKey]) -> Result<()> {
        let context_data = self.context_data(encrypted.parms_id())?;
        let key_context_data = self.context.key_context_data();
        let coeff_count = self.context.poly_modulus_degree();
        let decomp_modulus = context_data.coeff_modulus();
        let decomp_modulus_size = decomp_modulus.len();
        let key_modulus = key_context_data.coeff_modulus();
        let key_ntt_tables = key_context_data.small_ntt_tables();
        if key_vector.len() < decomp_modulus_size {
            return Err(evaluation_error("key switching key has too few components"));
        }

        // Extended base: the primes of the level followed by the special prime.
        let ext_indices: Vec<usize> = (0..decomp_modulus_size)
            .chain(iter::once(key_modulus.len() - 1))
            .collect();
        let ext_modulus: Vec<Modulus> = ext_indices.iter().map(|&i| key_modulus[i]).collect();
        let ext_ntt_tables: Vec<&NTTTables> = ext_indices.iter().map(|&i| &key_ntt_tables[i]).collect();

        let mut target_coeff = target.to_vec();
        polymod::intt_p(&mut target_coeff, coeff_count, context_data.small_ntt_tables());

        let mut accumulated = vec![vec![0; ext_indices.len() * coeff_count]; 2];
        let mut temp = vec![0; coeff_count];
        for (j, key) in key_vector.iter().take(decomp_modulus_size).enumerate() {
            let key = key.as_ciphertext();
            let source_ntt = &target[j * coeff_count..(j + 1) * coeff_count];
            let source = &target_coeff[j * coeff_count..(j + 1) * coeff_count];
            for (e, (&key_index, modulus, table)) in izip!(&ext_indices, &ext_modulus, &ext_ntt_tables).enumerate() {
                if key_index == j {
                    temp.copy_from_slice(source_ntt);
                } else {
                    temp.iter_mut().zip(source).for_each(|(t, &x)| *t = modulus.reduce(x));
                    table.ntt_negacyclic(&mut temp);
                }
                for (poly_id, acc) in accumulated.iter_mut().enumerate() {
                    let acc_component = &mut acc[e * coeff_count..(e + 1) * coeff_count];
                    let key_component = key.poly_component(poly_id, key_index);
                    for (a, &k, &t) in izip!(acc_component, key_component, &temp) {
                        *a = util::multiply_add_u64_mod(t, k, *a, modulus);
                    }
                }
            }
        }

        for (poly_id, mut acc) in accumulated.into_iter().enumerate() {
            util::divide_and_round_q_last_ntt_inplace(&mut acc, coeff_count, &ext_modulus, &ext_ntt_tables);
            polymod::add_inplace_p(encrypted.poly_mut(poly_id), &acc[..decomp_modulus_size * coeff_count],
                coeff_count, decomp_modulus);
        }
        Ok(())
    }

    /// Relinearizes a ciphertext of size 3 back to size 2.
    pub fn relinearize_inplace(&self, encrypted: &mut Ciphertext, relin_keys: &RelinKeys) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        if relin_keys.parms_id() != self.context.key_parms_id() || !relin_keys.has_key(2) {
            return Err(evaluation_error("relinearization keys are not valid for the context"));
        }
        if encrypted.size() == 2 {
            return Ok(());
        }
        let target = encrypted.poly(2).to_vec();
        encrypted.truncate_size(2);
        self.switch_key_inplace(encrypted, &target, relin_keys.key(2))
    }

    /// See [Evaluator::relinearize_inplace].
    pub fn relinearize_new(&self, encrypted: &Ciphertext, relin_keys: &RelinKeys) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.relinearize_inplace(&mut destination, relin_keys)?;
        Ok(destination)
    }

    /// Divides the ciphertext by the last prime of its level, moving it to the next level
    /// and dividing its scale by that prime.
    pub fn rescale_to_next_inplace(&self, encrypted: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        let context_data = self.context_data(encrypted.parms_id())?;
        let next_context_data = self.context.next_context_data(encrypted.parms_id())
            .ok_or_else(|| evaluation_error("end of modulus switching chain reached"))?;
        let coeff_modulus = context_data.coeff_modulus();
        let ntt_tables: Vec<&NTTTables> = context_data.small_ntt_tables().iter().collect();
        let coeff_count = self.context.poly_modulus_degree();
        for i in 0..encrypted.size() {
            util::divide_and_round_q_last_ntt_inplace(encrypted.poly_mut(i), coeff_count, coeff_modulus, &ntt_tables);
        }
        let q_last = coeff_modulus[coeff_modulus.len() - 1].value() as f64;
        encrypted.truncate_to(next_context_data);
        encrypted.set_scale(encrypted.scale() / q_last);
        Ok(())
    }

    /// See [Evaluator::rescale_to_next_inplace].
    pub fn rescale_to_next_new(&self, encrypted: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.rescale_to_next_inplace(&mut destination)?;
        Ok(destination)
    }

    /// Drops the last prime of the level without changing the scale.
    pub fn mod_switch_to_next_inplace(&self, encrypted: &mut Ciphertext) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        let next_context_data = self.context.next_context_data(encrypted.parms_id())
            .ok_or_else(|| evaluation_error("end of modulus switching chain reached"))?;
        encrypted.truncate_to(next_context_data);
        Ok(())
    }

    /// See [Evaluator::mod_switch_to_next_inplace].
    pub fn mod_switch_to_next_new(&self, encrypted: &Ciphertext) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.mod_switch_to_next_inplace(&mut destination)?;
        Ok(destination)
    }

    fn lower_level(&self, current: &ParmsID, parms_id: &ParmsID) -> Result<&ContextData> {
        let current = self.context_data(current)?;
        let target = self.context_data(parms_id)?;
        if !self.context.is_data_level(parms_id) {
            return Err(evaluation_error("target is not a data level"));
        }
        if target.chain_index() > current.chain_index() {
            return Err(evaluation_error("cannot switch to a higher level"));
        }
        Ok(target)
    }

    /// Drops primes until the ciphertext is at the level of `parms_id`.
    pub fn mod_switch_to_inplace(&self, encrypted: &mut Ciphertext, parms_id: &ParmsID) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        let target = self.lower_level(encrypted.parms_id(), parms_id)?;
        encrypted.truncate_to(target);
        Ok(())
    }

    /// See [Evaluator::mod_switch_to_inplace].
    pub fn mod_switch_to_new(&self, encrypted: &Ciphertext, parms_id: &ParmsID) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.mod_switch_to_inplace(&mut destination, parms_id)?;
        Ok(destination)
    }

    /// Drops primes until the plaintext is at the level of `parms_id`.
    pub fn mod_switch_plain_to_inplace(&self, plain: &mut Plaintext, parms_id: &ParmsID) -> Result<()> {
        self.check_plaintext(plain)?;
        let target = self.lower_level(plain.parms_id(), parms_id)?;
        plain.truncate_to(target);
        Ok(())
    }

    /// See [Evaluator::mod_switch_plain_to_inplace].
    pub fn mod_switch_plain_to_new(&self, plain: &Plaintext, parms_id: &ParmsID) -> Result<Plaintext> {
        let mut destination = plain.clone();
        self.mod_switch_plain_to_inplace(&mut destination, parms_id)?;
        Ok(destination)
    }

    fn apply_galois_inplace(&self, encrypted: &mut Ciphertext, galois_elt: usize, galois_keys: &GaloisKeys) -> Result<()> {
        self.check_ciphertext(encrypted)?;
        if galois_keys.parms_id() != self.context.key_parms_id() {
            return Err(evaluation_error("Galois keys are not valid for the context"));
        }
        if !galois_keys.has_key(galois_elt) {
            return Err(ContextError::Evaluation(format!("Galois key for element {} not present", galois_elt)));
        }
        if encrypted.size() != 2 {
            return Err(evaluation_error("ciphertext must be relinearized before rotation"));
        }
        let galois_tool = self.context.galois_tool();
        let source = encrypted.clone();
        galois_tool.apply_ntt_p(source.poly(0), galois_elt, encrypted.poly_mut(0));
        let mut target = vec![0; source.poly(1).len()];
        galois_tool.apply_ntt_p(source.poly(1), galois_elt, &mut target);
        encrypted.poly_mut(1).fill(0);
        self.switch_key_inplace(encrypted, &target, galois_keys.key(galois_elt))
    }

    /// Rotates the slots cyclically by `steps`; positive steps rotate left.
    pub fn rotate_vector_inplace(&self, encrypted: &mut Ciphertext, steps: isize, galois_keys: &GaloisKeys) -> Result<()> {
        if steps == 0 {
            return Ok(());
        }
        let galois_elt = self.context.galois_tool().get_elt_from_step(steps)
            .ok_or_else(|| ContextError::Evaluation(format!("rotation step {} out of range", steps)))?;
        self.apply_galois_inplace(encrypted, galois_elt, galois_keys)
    }

    /// See [Evaluator::rotate_vector_inplace].
    pub fn rotate_vector_new(&self, encrypted: &Ciphertext, steps: isize, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.rotate_vector_inplace(&mut destination, steps, galois_keys)?;
        Ok(destination)
    }

    /// Conjugates every slot.
    pub fn complex_conjugate_inplace(&self, encrypted: &mut Ciphertext, galois_keys: &GaloisKeys) -> Result<()> {
        let galois_elt = self.context.galois_tool().get_elt_from_step(0)
            .ok_or_else(|| evaluation_error("conjugation is not available"))?;
        self.apply_galois_inplace(encrypted, galois_elt, galois_keys)
    }

    /// See [Evaluator::complex_conjugate_inplace].
    pub fn complex_conjugate_new(&self, encrypted: &Ciphertext, galois_keys: &GaloisKeys) -> Result<Ciphertext> {
        let mut destination = encrypted.clone();
        self.complex_conjugate_inplace(&mut destination, galois_keys)?;
        Ok(destination)
    }

}
