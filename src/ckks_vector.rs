//! Encrypted real vectors bound to an [EncryptionContext].

use tracing::debug;

use crate::{
    CKKSEncoder,
    Ciphertext,
    ContextError,
    EncryptionContext,
    Evaluator,
    Plaintext,
    Result,
};

/// A vector of up to `slot_count` reals, encrypted as a single ciphertext.
///
/// Operations follow the automatic policy of the context they were created
/// with: `auto_relin` relinearizes after a ciphertext product, `auto_rescale`
/// rescales after any product and restores the global scale, and
/// `auto_mod_switch` brings operands at different levels to the lower one.
/// Every operation returns a new vector and leaves its operands untouched.
#[derive(Clone, Debug)]
pub struct CKKSVector<'a> {
    context: &'a EncryptionContext,
    ciphertext: Ciphertext,
    size: usize,
}

impl<'a> CKKSVector<'a> {

    /// Encode `values` at the global scale and encrypt them, with the public key in
    /// asymmetric mode or the secret key in symmetric mode.
    pub fn new(context: &'a EncryptionContext, values: &[f64]) -> Result<Self> {
        let scale = context.global_scale()?;
        if values.len() > context.slot_count() {
            return Err(ContextError::InvalidParameters(format!(
                "{} values exceed the {} available slots", values.len(), context.slot_count())));
        }
        let encoder = CKKSEncoder::new(context.he_context().clone());
        let plain = encoder.encode_f64(values, None, scale)?;
        let ciphertext = context.encryptor()?.encrypt(&plain)?;
        Ok(Self {context, ciphertext, size: values.len()})
    }

    /// The context the vector is bound to.
    pub fn context(&self) -> &'a EncryptionContext {
        self.context
    }

    /// Number of meaningful slots.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn scale(&self) -> f64 {
        self.ciphertext.scale()
    }

    /// Index of the current level in the modulus chain; 0 is the last level.
    pub fn level(&self) -> usize {
        self.context.he_context()
            .get_context_data(self.ciphertext.parms_id())
            .map_or(0, |context_data| context_data.chain_index())
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    /// Decrypt with the secret key of the bound context.
    pub fn decrypt(&self) -> Result<Vec<f64>> {
        self.decrypt_with(self.context)
    }

    /// Decrypt with the secret key of another context over the same parameters.
    pub fn decrypt_with(&self, context: &EncryptionContext) -> Result<Vec<f64>> {
        self.check_parameters(context)?;
        let plain = context.decryptor()?.decrypt(&self.ciphertext)?;
        let mut values = CKKSEncoder::new(context.he_context().clone()).decode_f64(&plain)?;
        values.truncate(self.size);
        Ok(values)
    }

    fn check_parameters(&self, context: &EncryptionContext) -> Result<()> {
        if context.parms_id() != self.context.parms_id() {
            return Err(ContextError::InvalidParameters("vector belongs to other parameters".to_string()));
        }
        Ok(())
    }

    fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.context.he_context().clone())
    }

    fn with_ciphertext(&self, ciphertext: Ciphertext, size: usize) -> Self {
        Self {context: self.context, ciphertext, size}
    }

    /// Operands as ciphertexts at a common level.
    fn aligned(&self, other: &Self) -> Result<(Ciphertext, Ciphertext)> {
        self.check_parameters(other.context)?;
        if self.size != other.size {
            return Err(ContextError::Evaluation(format!(
                "vector sizes differ: {} and {}", self.size, other.size)));
        }
        let mut left = self.ciphertext.clone();
        let mut right = other.ciphertext.clone();
        let (left_level, right_level) = (self.level(), other.level());
        if left_level != right_level {
            if !self.context.auto_mod_switch() {
                return Err(ContextError::Evaluation(
                    "operands are at different levels and auto_mod_switch is off".to_string()));
            }
            let evaluator = self.evaluator();
            if left_level > right_level {
                evaluator.mod_switch_to_inplace(&mut left, right.parms_id())?;
            } else {
                evaluator.mod_switch_to_inplace(&mut right, left.parms_id())?;
            }
            debug!(from = left_level.max(right_level), to = left_level.min(right_level), "aligned levels");
        }
        Ok((left, right))
    }

    /// Rescale after a product when `auto_rescale` is on, restoring the global scale.
    fn maintain_scale(&self, ciphertext: &mut Ciphertext) -> Result<()> {
        if self.context.auto_rescale() {
            self.evaluator().rescale_to_next_inplace(ciphertext)?;
            ciphertext.set_scale(self.context.global_scale()?);
        }
        Ok(())
    }

    /// Plain values spread over the vector: one value is broadcast, otherwise
    /// the length must match. Unused slots stay zero.
    fn encode_plain(&self, values: &[f64], scale: f64) -> Result<Plaintext> {
        let values = match values.len() {
            1 => vec![values[0]; self.size],
            n if n == self.size => values.to_vec(),
            n => return Err(ContextError::Evaluation(format!(
                "plain operand of size {} does not fit a vector of size {}", n, self.size))),
        };
        let encoder = CKKSEncoder::new(self.context.he_context().clone());
        encoder.encode_f64(&values, Some(*self.ciphertext.parms_id()), scale)
    }

    pub fn negate(&self) -> Result<Self> {
        let ciphertext = self.evaluator().negate_new(&self.ciphertext)?;
        Ok(self.with_ciphertext(ciphertext, self.size))
    }

    pub fn add(&self, other: &Self) -> Result<Self> {
        let (mut left, right) = self.aligned(other)?;
        self.evaluator().add_inplace(&mut left, &right)?;
        Ok(self.with_ciphertext(left, self.size))
    }

    pub fn sub(&self, other: &Self) -> Result<Self> {
        let (mut left, right) = self.aligned(other)?;
        self.evaluator().sub_inplace(&mut left, &right)?;
        Ok(self.with_ciphertext(left, self.size))
    }

    /// Slot-wise product.
    pub fn mul(&self, other: &Self) -> Result<Self> {
        let (mut left, right) = self.aligned(other)?;
        let evaluator = self.evaluator();
        evaluator.multiply_inplace(&mut left, &right)?;
        if self.context.auto_relin() {
            evaluator.relinearize_inplace(&mut left, self.context.relin_keys()?)?;
        }
        self.maintain_scale(&mut left)?;
        Ok(self.with_ciphertext(left, self.size))
    }

    /// Sum of all slots, in a vector of size 1. Needs Galois keys.
    pub fn sum(&self) -> Result<Self> {
        let galois_keys = self.context.galois_keys()?;
        let evaluator = self.evaluator();
        let mut result = self.ciphertext.clone();
        let mut steps = 1;
        while steps < self.size {
            let rotated = evaluator.rotate_vector_new(&result, steps as isize, galois_keys)?;
            evaluator.add_inplace(&mut result, &rotated)?;
            steps <<= 1;
        }
        Ok(self.with_ciphertext(result, 1))
    }

    /// Inner product, in a vector of size 1.
    pub fn dot(&self, other: &Self) -> Result<Self> {
        self.mul(other)?.sum()
    }

    pub fn add_plain(&self, values: &[f64]) -> Result<Self> {
        let plain = self.encode_plain(values, self.ciphertext.scale())?;
        let ciphertext = self.evaluator().add_plain_new(&self.ciphertext, &plain)?;
        Ok(self.with_ciphertext(ciphertext, self.size))
    }

    pub fn mul_plain(&self, values: &[f64]) -> Result<Self> {
        let plain = self.encode_plain(values, self.context.global_scale()?)?;
        let mut ciphertext = self.evaluator().multiply_plain_new(&self.ciphertext, &plain)?;
        self.maintain_scale(&mut ciphertext)?;
        Ok(self.with_ciphertext(ciphertext, self.size))
    }

    pub fn dot_plain(&self, values: &[f64]) -> Result<Self> {
        self.mul_plain(values)?.sum()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        encryption_context::tests::{ctx, ENCRYPTION_TYPES, DUPLICATES},
        generate_parameters,
        EncryptionType,
        KeyKind,
    };

    fn assert_close(actual: &[f64], expected: &[f64], precision: f64) {
        assert_eq!(actual.len(), expected.len());
        for (x, y) in actual.iter().zip(expected) {
            assert!((x - y).abs() < precision, "{:?} vs {:?}", actual, expected);
        }
    }

    fn ready(encryption_type: EncryptionType) -> EncryptionContext {
        let mut context = ctx(encryption_type);
        context.set_global_scale(2.0_f64.powi(40));
        context.generate_relin_keys().unwrap();
        context.generate_galois_keys().unwrap();
        context
    }

    #[test]
    fn test_sanity_keys_regeneration() {
        let pairs: [(&[f64], &[f64]); 10] = [
            (&[0.0], &[0.0]),
            (&[1.0], &[0.0]),
            (&[-1.0], &[0.0]),
            (&[-1.0], &[-1.0]),
            (&[1.0], &[1.0]),
            (&[-1.0], &[1.0]),
            (&[-1.0, -2.0], &[-73.0, -10.0]),
            (&[1.0, 2.0], &[-73.0, -10.0]),
            (&[1.0, 2.0, 3.0, 4.0], &[4.0, 3.0, 2.0, 1.0]),
            (&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]),
        ];
        for encryption_type in ENCRYPTION_TYPES {
            let original = ready(encryption_type);
            for duplicate in DUPLICATES {
                let context = duplicate(&original);
                assert!(context.relin_keys().is_ok());
                assert!(context.galois_keys().is_ok());
                for (vec1, vec2) in pairs {
                    let first = CKKSVector::new(&context, vec1).unwrap();
                    let second = CKKSVector::new(&context, vec2).unwrap();
                    let result = first.dot(&second).unwrap();
                    let expected: f64 = vec1.iter().zip(vec2).map(|(a, b)| a * b).sum();
                    assert_close(&result.decrypt().unwrap(), &[expected], 1.0);
                    assert_close(&first.decrypt().unwrap(), vec1, 1.0);
                    assert_close(&second.decrypt().unwrap(), vec2, 1.0);
                }
            }
        }
    }

    #[test]
    fn test_arithmetic() {
        let context = ready(EncryptionType::Asymmetric);
        let a = CKKSVector::new(&context, &[1.0, 2.0, 3.0]).unwrap();
        let b = CKKSVector::new(&context, &[0.5, -1.0, 4.0]).unwrap();
        assert_eq!(a.size(), 3);
        assert_eq!(a.scale(), 2.0_f64.powi(40));

        assert_close(&a.add(&b).unwrap().decrypt().unwrap(), &[1.5, 1.0, 7.0], 1e-3);
        assert_close(&a.sub(&b).unwrap().decrypt().unwrap(), &[0.5, 3.0, -1.0], 1e-3);
        assert_close(&a.negate().unwrap().decrypt().unwrap(), &[-1.0, -2.0, -3.0], 1e-3);

        let product = a.mul(&b).unwrap();
        assert_eq!(product.level() + 1, a.level());
        assert_eq!(product.scale(), 2.0_f64.powi(40));
        assert_close(&product.decrypt().unwrap(), &[0.5, -2.0, 12.0], 1e-3);
        assert_close(&a.sum().unwrap().decrypt().unwrap(), &[6.0], 1e-3);

        assert_close(&a.add_plain(&[1.0]).unwrap().decrypt().unwrap(), &[2.0, 3.0, 4.0], 1e-3);
        assert_close(&a.mul_plain(&[2.0, 0.5, -1.0]).unwrap().decrypt().unwrap(), &[2.0, 1.0, -3.0], 1e-3);
        assert_close(&a.dot_plain(&[1.0, 1.0, 1.0]).unwrap().decrypt().unwrap(), &[6.0], 1e-3);
        assert!(a.mul_plain(&[1.0, 2.0]).is_err());

        // Mixed levels are aligned automatically.
        let lower = a.mul_plain(&[1.0]).unwrap();
        assert_close(&lower.add(&b).unwrap().decrypt().unwrap(), &[1.5, 1.0, 7.0], 1e-3);
        assert_close(&lower.mul(&b).unwrap().decrypt().unwrap(), &[0.5, -2.0, 12.0], 1e-3);

        let short = CKKSVector::new(&context, &[1.0]).unwrap();
        assert!(matches!(a.add(&short), Err(ContextError::Evaluation(_))));
    }

    #[test]
    fn test_policy_flags() {
        let mut context = ready(EncryptionType::Symmetric);
        context.set_auto_mod_switch(false);
        context.set_auto_rescale(false);
        let a = CKKSVector::new(&context, &[1.0, 2.0]).unwrap();
        let b = CKKSVector::new(&context, &[3.0, 4.0]).unwrap();
        let product = a.mul(&b).unwrap();
        assert_eq!(product.level(), a.level());
        assert_eq!(product.scale(), 2.0_f64.powi(80));
        assert_close(&product.decrypt().unwrap(), &[3.0, 8.0], 1e-3);
        // Scales differ without rescaling.
        assert!(product.add(&a).is_err());

        let mut context = ready(EncryptionType::Symmetric);
        context.set_auto_mod_switch(false);
        let a = CKKSVector::new(&context, &[1.0, 2.0]).unwrap();
        let lower = a.mul_plain(&[1.0]).unwrap();
        assert!(matches!(lower.add(&a), Err(ContextError::Evaluation(_))));

        let mut context = ready(EncryptionType::Symmetric);
        context.set_auto_relin(false);
        let a = CKKSVector::new(&context, &[1.0, 2.0]).unwrap();
        let product = a.mul(&a).unwrap();
        assert_eq!(product.ciphertext().size(), 3);
        assert_close(&product.decrypt().unwrap(), &[1.0, 4.0], 1e-3);
        // Rotations need a relinearized ciphertext.
        assert!(product.sum().is_err());
    }

    #[test]
    fn test_missing_material() {
        let mut context = ctx(EncryptionType::Asymmetric);
        assert!(matches!(CKKSVector::new(&context, &[1.0]), Err(ContextError::InvalidState(_))));
        context.set_global_scale(0.0);
        assert!(matches!(CKKSVector::new(&context, &[1.0]), Err(ContextError::InvalidParameters(_))));
        context.set_global_scale(2.0_f64.powi(40));
        let too_many = vec![1.0; context.slot_count() + 1];
        assert!(CKKSVector::new(&context, &too_many).is_err());

        let a = CKKSVector::new(&context, &[1.0, 2.0]).unwrap();
        assert!(matches!(a.sum(), Err(ContextError::NotFound(KeyKind::Galois))));

        let mut public = context.copy();
        public.make_context_public(false, false).unwrap();
        let b = CKKSVector::new(&public, &[3.0, 4.0]).unwrap();
        assert!(matches!(b.decrypt(), Err(ContextError::NotFound(KeyKind::Secret))));
        assert_close(&b.decrypt_with(&context).unwrap(), &[3.0, 4.0], 1e-3);

        let mut symmetric = ctx(EncryptionType::Symmetric);
        symmetric.set_global_scale(2.0_f64.powi(40));
        symmetric.make_context_public(false, false).unwrap();
        assert!(matches!(CKKSVector::new(&symmetric, &[1.0]), Err(ContextError::NotFound(KeyKind::Secret))));
    }

    #[test]
    fn test_end_to_end_dot_product() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        for encryption_type in ENCRYPTION_TYPES {
            let parameters = generate_parameters(8192, &[60, 40, 40, 60], encryption_type).unwrap();
            let mut context = EncryptionContext::create(parameters).unwrap();
            context.set_global_scale(2.0_f64.powi(40));
            context.generate_relin_keys().unwrap();
            context.generate_galois_keys().unwrap();

            let v1 = [1.0, 2.0, 3.0, 4.0];
            let v2 = [4.0, 3.0, 2.0, 1.0];
            let first = CKKSVector::new(&context, &v1).unwrap();
            let second = CKKSVector::new(&context, &v2).unwrap();
            let result = first.dot(&second).unwrap();
            assert_close(&result.decrypt().unwrap(), &[20.0], 1.0);
            assert_close(&first.decrypt().unwrap(), &v1, 1.0);
            assert_close(&second.decrypt().unwrap(), &v2, 1.0);
        }
    }
}
