use std::sync::Arc;

use crate::{
    context::ContextData,
    polymod,
    util::rlwe,
    Ciphertext,
    ContextError,
    HeContext,
    KeyKind,
    Plaintext,
    PublicKey,
    Result,
    SecretKey,
    ValCheck,
};

fn plaintext_level<'c>(context: &'c HeContext, plain: &Plaintext) -> Result<&'c ContextData> {
    if !plain.is_valid_for(context) {
        return Err(ContextError::InvalidParameters("plaintext is not valid for the context".to_string()));
    }
    context.get_context_data(plain.parms_id())
        .ok_or_else(|| ContextError::InvalidParameters("plaintext is not valid for the context".to_string()))
}

/// Encrypts [Plaintext] objects into [Ciphertext] objects.
///
/// If an Encryptor is given a public key, it encrypts asymmetrically.
/// Otherwise, if it is given a secret key, it encrypts symmetrically.
/// Ciphertexts are produced at the level of the plaintext, in NTT form.
///
/// ```rust
/// # use heathcliff_context::*;
/// let parms = ContextParameters::generate(4096, &[40, 20, 40], EncryptionType::Asymmetric).unwrap();
/// let context = HeContext::new(&parms).unwrap();
/// let keygen = KeyGenerator::new(context.clone());
/// let public_key = keygen.create_public_key();
/// let encryptor = Encryptor::new(context.clone()).set_public_key(&public_key);
/// ```
pub struct Encryptor<'a> {
    context: Arc<HeContext>,
    public_key: Option<&'a PublicKey>,
    secret_key: Option<&'a SecretKey>,
}

impl<'a> Encryptor<'a> {

    /// Creates a new Encryptor without any key attached.
    pub fn new(context: Arc<HeContext>) -> Self {
        Self {context, public_key: None, secret_key: None}
    }

    /// Attach a public key, enabling asymmetric encryption.
    pub fn set_public_key(mut self, public_key: &'a PublicKey) -> Self {
        self.public_key = Some(public_key);
        self
    }

    /// Attach a secret key, enabling symmetric encryption.
    pub fn set_secret_key(mut self, secret_key: &'a SecretKey) -> Self {
        self.secret_key = Some(secret_key);
        self
    }

    /// Encrypt with the public key when one is attached, else with the secret key.
    pub fn encrypt(&self, plain: &Plaintext) -> Result<Ciphertext> {
        let context_data = plaintext_level(&self.context, plain)?;
        let mut destination = Ciphertext::new();
        match (self.public_key, self.secret_key) {
            (Some(public_key), _) => {
                if !public_key.is_valid_for(&self.context) {
                    return Err(ContextError::InvalidParameters("public key is not valid for the context".to_string()));
                }
                rlwe::encrypt_zero::asymmetric(public_key, &self.context, context_data, &mut destination);
            }
            (None, Some(secret_key)) => {
                if !secret_key.is_valid_for(&self.context) {
                    return Err(ContextError::InvalidParameters("secret key is not valid for the context".to_string()));
                }
                rlwe::encrypt_zero::symmetric(secret_key, &self.context, context_data, &mut destination);
            }
            (None, None) => return Err(ContextError::NotFound(KeyKind::Public)),
        }
        polymod::add_inplace_p(destination.poly_mut(0), plain.data(),
            self.context.poly_modulus_degree(), context_data.coeff_modulus());
        destination.set_scale(plain.scale());
        Ok(destination)
    }

}

/// Decrypts [Ciphertext] objects into [Plaintext] objects.
///
/// Ciphertexts of size 3 (not yet relinearized) are supported.
pub struct Decryptor<'a> {
    context: Arc<HeContext>,
    secret_key: &'a SecretKey,
}

impl<'a> Decryptor<'a> {

    /// Creates a Decryptor for the given secret key.
    pub fn new(context: Arc<HeContext>, secret_key: &'a SecretKey) -> Self {
        Self {context, secret_key}
    }

    /// Computes c0 + c1 * s (+ c2 * s^2) at the level of the ciphertext.
    pub fn decrypt(&self, encrypted: &Ciphertext) -> Result<Plaintext> {
        if !encrypted.is_valid_for(&self.context) {
            return Err(ContextError::InvalidParameters("ciphertext is not valid for the context".to_string()));
        }
        if !self.secret_key.is_valid_for(&self.context) {
            return Err(ContextError::InvalidParameters("secret key is not valid for the context".to_string()));
        }
        let context_data = self.context.get_context_data(encrypted.parms_id())
            .ok_or_else(|| ContextError::InvalidParameters("ciphertext is not valid for the context".to_string()))?;
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = self.context.poly_modulus_degree();
        let poly_len = coeff_count * coeff_modulus.len();
        let secret = &self.secret_key.data()[..poly_len];

        let mut destination = Plaintext::zeros(context_data, coeff_count, encrypted.scale());
        destination.data_mut().copy_from_slice(encrypted.poly(0));

        let mut secret_power = secret.to_vec();
        for i in 1..encrypted.size() {
            if i > 1 {
                polymod::dyadic_product_inplace_p(&mut secret_power, secret, coeff_count, coeff_modulus);
            }
            polymod::dyadic_product_accumulate_p(encrypted.poly(i), &secret_power, coeff_count, coeff_modulus, destination.data_mut());
        }
        Ok(destination)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{key::tests::small_context, CKKSEncoder, KeyGenerator};

    fn assert_close(a: &[f64], b: &[f64], tolerance: f64) {
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < tolerance, "{} vs {}", x, y);
        }
    }

    #[test]
    fn test_encrypt_decrypt() {
        let context = small_context();
        let keygen = KeyGenerator::new(context.clone());
        let public_key = keygen.create_public_key();
        let encoder = CKKSEncoder::new(context.clone());
        let decryptor = Decryptor::new(context.clone(), keygen.secret_key());
        let values = [1.0, -2.5, 3.25, 0.0, 7.0];
        let plain = encoder.encode_f64(&values, None, 2.0_f64.powi(25)).unwrap();

        let asymmetric = Encryptor::new(context.clone()).set_public_key(&public_key);
        let symmetric = Encryptor::new(context.clone()).set_secret_key(keygen.secret_key());
        for encryptor in [asymmetric, symmetric] {
            let encrypted = encryptor.encrypt(&plain).unwrap();
            assert_eq!(encrypted.size(), 2);
            assert_eq!(encrypted.parms_id(), context.first_parms_id());
            assert_eq!(encrypted.scale(), plain.scale());
            assert!(!encrypted.is_transparent());
            let decrypted = decryptor.decrypt(&encrypted).unwrap();
            assert_close(&encoder.decode_f64(&decrypted).unwrap(), &values, 1e-2);
        }
    }

    #[test]
    fn test_missing_key() {
        let context = small_context();
        let encoder = CKKSEncoder::new(context.clone());
        let plain = encoder.encode_f64(&[1.0], None, 2.0_f64.powi(25)).unwrap();
        let encryptor = Encryptor::new(context);
        assert!(matches!(encryptor.encrypt(&plain), Err(ContextError::NotFound(KeyKind::Public))));
    }

    #[test]
    fn test_wrong_context() {
        let context = small_context();
        let other = small_context();
        let keygen = KeyGenerator::new(context.clone());
        let encoder = CKKSEncoder::new(other.clone());
        let plain = encoder.encode_f64(&[1.0], None, 2.0_f64.powi(25)).unwrap();
        // Same parameters give the same parms_id, so the plaintext is accepted.
        let encryptor = Encryptor::new(context.clone()).set_secret_key(keygen.secret_key());
        assert!(encryptor.encrypt(&plain).is_ok());

        let mut broken = plain.clone();
        broken.data_mut()[0] = u64::MAX;
        assert!(encryptor.encrypt(&broken).is_err());
    }
}
