//! The encryption context: scheme parameters plus the key material that
//! decides which operations are legal.
//!
//! A context starts out private, holding a secret key. The only state
//! transition is [EncryptionContext::make_context_public], which discards the
//! secret key for good. Duplicates made with [Clone], [EncryptionContext::copy]
//! or a serialization round trip never share key slots with their source.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    ContextError,
    ContextParameters,
    Decryptor,
    EncryptionType,
    Encryptor,
    GaloisKeys,
    HeContext,
    KeyGenerator,
    KeyKind,
    ParmsID,
    PublicKey,
    RelinKeys,
    Result,
    SecretKey,
};

/// Whether a context can still decrypt and derive key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// A secret key is held.
    Private,
    /// The secret key has been discarded, or was never loaded.
    Public,
}

/// The scale used to encode fresh vectors. Reading it before assignment is an error.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GlobalScale {
    /// No value assigned yet.
    #[default]
    Unset,
    /// The assigned value, stored as given.
    Value(f64),
}

/// Options for [EncryptionContext::create_with].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateOptions {
    /// Generate relinearization keys at creation. Defaults to true.
    pub generate_relin_keys: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {generate_relin_keys: true}
    }
}

/// The four independent key slots of a context.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct KeyMaterial {
    pub(crate) secret_key: Option<SecretKey>,
    pub(crate) public_key: Option<PublicKey>,
    pub(crate) relin_keys: Option<RelinKeys>,
    pub(crate) galois_keys: Option<GaloisKeys>,
}

/// Scheme parameters, key material, the global scale and the automatic
/// maintenance policy of an encrypted computation.
///
/// ```rust
/// # use heathcliff_context::*;
/// let parms = generate_parameters(4096, &[40, 20, 40], EncryptionType::Asymmetric).unwrap();
/// let mut context = EncryptionContext::create(parms).unwrap();
/// assert!(context.is_private());
/// assert!(context.has_relin_keys());
///
/// let public = {
///     let mut public = context.copy();
///     public.make_context_public(false, false).unwrap();
///     public
/// };
/// assert!(public.is_public());
/// assert!(context.is_private());
/// assert!(public.secret_key().is_err());
///
/// assert!(context.global_scale().is_err());
/// context.set_global_scale(2.0_f64.powi(20));
/// assert_eq!(context.global_scale().unwrap(), 2.0_f64.powi(20));
/// ```
#[derive(Clone, Debug)]
pub struct EncryptionContext {
    he_context: Arc<HeContext>,
    pub(crate) keys: KeyMaterial,
    state: ContextState,
    global_scale: GlobalScale,
    auto_relin: bool,
    auto_rescale: bool,
    auto_mod_switch: bool,
}

impl EncryptionContext {

    /// Builds a private context with default [CreateOptions].
    ///
    /// The secret key is always sampled. In asymmetric mode a public key is
    /// derived as well, and relinearization keys are generated.
    pub fn create(parameters: ContextParameters) -> Result<Self> {
        Self::create_with(parameters, CreateOptions::default())
    }

    /// Builds a private context, see [EncryptionContext::create].
    pub fn create_with(parameters: ContextParameters, options: CreateOptions) -> Result<Self> {
        let he_context = HeContext::new(&parameters)?;
        let keygen = KeyGenerator::new(he_context.clone());
        let public_key = match parameters.encryption_type() {
            EncryptionType::Asymmetric => Some(keygen.create_public_key()),
            EncryptionType::Symmetric => None,
        };
        let relin_keys = options.generate_relin_keys.then(|| keygen.create_relin_keys());
        let keys = KeyMaterial {
            secret_key: Some(keygen.secret_key().clone()),
            public_key,
            relin_keys,
            galois_keys: None,
        };
        info!(
            poly_modulus_degree = parameters.poly_modulus_degree(),
            coeff_modulus_count = parameters.coeff_modulus().len(),
            encryption_type = ?parameters.encryption_type(),
            "created encryption context"
        );
        Ok(Self::from_parts(he_context, keys))
    }

    /// Assemble a context around already validated parts.
    /// The privacy state follows from the presence of the secret key.
    pub(crate) fn from_parts(he_context: Arc<HeContext>, keys: KeyMaterial) -> Self {
        let state = if keys.secret_key.is_some() {ContextState::Private} else {ContextState::Public};
        Self {
            he_context,
            keys,
            state,
            global_scale: GlobalScale::Unset,
            auto_relin: true,
            auto_rescale: true,
            auto_mod_switch: true,
        }
    }

    /// An independent duplicate of this context. Same as [Clone::clone].
    pub fn copy(&self) -> Self {
        self.clone()
    }

    fn key_generator(&self) -> Result<KeyGenerator> {
        match &self.keys.secret_key {
            Some(secret_key) => Ok(KeyGenerator::from_sk(self.he_context.clone(), secret_key.clone())),
            None => Err(ContextError::Permission("no secret key")),
        }
    }

    /// Generate relinearization keys, replacing any existing ones.
    pub fn generate_relin_keys(&mut self) -> Result<()> {
        let relin_keys = self.key_generator()?.create_relin_keys();
        self.keys.relin_keys = Some(relin_keys);
        Ok(())
    }

    /// Generate Galois keys for every power-of-two rotation and for conjugation,
    /// replacing any existing ones.
    pub fn generate_galois_keys(&mut self) -> Result<()> {
        let galois_keys = self.key_generator()?.create_galois_keys();
        self.keys.galois_keys = Some(galois_keys);
        Ok(())
    }

    /// Generate Galois keys for the given rotation steps only, replacing any existing ones.
    pub fn generate_galois_keys_from_steps(&mut self, steps: &[isize]) -> Result<()> {
        let galois_keys = self.key_generator()?.create_galois_keys_from_steps(steps)?;
        self.keys.galois_keys = Some(galois_keys);
        Ok(())
    }

    /// Discard the secret key, after generating the requested key types that are
    /// still missing.
    ///
    /// A requested key type that is already present is left as is. On a public
    /// context this only fails if a missing key type is requested. In asymmetric
    /// mode a missing public key is derived before the secret key goes away.
    pub fn make_context_public(&mut self, generate_galois_keys: bool, generate_relin_keys: bool) -> Result<()> {
        let needs_galois = generate_galois_keys && self.keys.galois_keys.is_none();
        let needs_relin = generate_relin_keys && self.keys.relin_keys.is_none();
        let needs_public = self.encryption_type() == EncryptionType::Asymmetric
            && self.keys.public_key.is_none()
            && self.state == ContextState::Private;

        if needs_galois || needs_relin || needs_public {
            let keygen = self.key_generator()?;
            let galois_keys = needs_galois.then(|| keygen.create_galois_keys());
            let relin_keys = needs_relin.then(|| keygen.create_relin_keys());
            let public_key = needs_public.then(|| keygen.create_public_key());
            if galois_keys.is_some() {self.keys.galois_keys = galois_keys;}
            if relin_keys.is_some() {self.keys.relin_keys = relin_keys;}
            if public_key.is_some() {self.keys.public_key = public_key;}
        }

        if self.state == ContextState::Private {
            self.keys.secret_key = None;
            self.state = ContextState::Public;
            info!(
                has_public_key = self.has_public_key(),
                has_relin_keys = self.has_relin_keys(),
                has_galois_keys = self.has_galois_keys(),
                "context made public"
            );
        } else {
            debug!("context already public");
        }
        Ok(())
    }

    /// The privacy state of the context.
    pub fn state(&self) -> ContextState {
        debug_assert_eq!(self.state == ContextState::Private, self.keys.secret_key.is_some());
        self.state
    }

    /// Does the context hold a secret key?
    pub fn is_private(&self) -> bool {
        self.state() == ContextState::Private
    }

    /// Has the secret key been discarded?
    pub fn is_public(&self) -> bool {
        self.state() == ContextState::Public
    }

    pub fn has_secret_key(&self) -> bool {
        self.keys.secret_key.is_some()
    }

    pub fn has_public_key(&self) -> bool {
        self.keys.public_key.is_some()
    }

    pub fn has_relin_keys(&self) -> bool {
        self.keys.relin_keys.is_some()
    }

    pub fn has_galois_keys(&self) -> bool {
        self.keys.galois_keys.is_some()
    }

    /// The secret key, or [ContextError::NotFound] if the context is public.
    pub fn secret_key(&self) -> Result<&SecretKey> {
        self.keys.secret_key.as_ref().ok_or(ContextError::NotFound(KeyKind::Secret))
    }

    /// The public key, or [ContextError::NotFound] if it is absent.
    pub fn public_key(&self) -> Result<&PublicKey> {
        self.keys.public_key.as_ref().ok_or(ContextError::NotFound(KeyKind::Public))
    }

    /// The relinearization keys, or [ContextError::NotFound] if they are absent.
    pub fn relin_keys(&self) -> Result<&RelinKeys> {
        self.keys.relin_keys.as_ref().ok_or(ContextError::NotFound(KeyKind::Relin))
    }

    /// The Galois keys, or [ContextError::NotFound] if they are absent.
    pub fn galois_keys(&self) -> Result<&GaloisKeys> {
        self.keys.galois_keys.as_ref().ok_or(ContextError::NotFound(KeyKind::Galois))
    }

    /// The global scale, or [ContextError::InvalidState] if it was never assigned.
    pub fn global_scale(&self) -> Result<f64> {
        match self.global_scale {
            GlobalScale::Value(scale) => Ok(scale),
            GlobalScale::Unset => Err(ContextError::InvalidState("global scale is not set")),
        }
    }

    /// Assign the global scale. Any value is stored; encoding checks it later.
    pub fn set_global_scale(&mut self, scale: f64) {
        self.global_scale = GlobalScale::Value(scale);
    }

    pub(crate) fn global_scale_raw(&self) -> GlobalScale {
        self.global_scale
    }

    pub(crate) fn set_global_scale_raw(&mut self, global_scale: GlobalScale) {
        self.global_scale = global_scale;
    }

    pub fn auto_relin(&self) -> bool {
        self.auto_relin
    }

    pub fn set_auto_relin(&mut self, value: bool) {
        self.auto_relin = value;
    }

    pub fn auto_rescale(&self) -> bool {
        self.auto_rescale
    }

    pub fn set_auto_rescale(&mut self, value: bool) {
        self.auto_rescale = value;
    }

    pub fn auto_mod_switch(&self) -> bool {
        self.auto_mod_switch
    }

    pub fn set_auto_mod_switch(&mut self, value: bool) {
        self.auto_mod_switch = value;
    }

    /// The scheme parameters bound at creation.
    pub fn parameters(&self) -> &ContextParameters {
        self.he_context.parameters()
    }

    pub fn encryption_type(&self) -> EncryptionType {
        self.parameters().encryption_type()
    }

    pub fn poly_modulus_degree(&self) -> usize {
        self.parameters().poly_modulus_degree()
    }

    /// Number of real values a single ciphertext holds.
    pub fn slot_count(&self) -> usize {
        self.poly_modulus_degree() / 2
    }

    /// Fingerprint of the parameters.
    pub fn parms_id(&self) -> &ParmsID {
        self.parameters().parms_id()
    }

    /// The precomputed engine context shared by this context and its duplicates.
    pub fn he_context(&self) -> &Arc<HeContext> {
        &self.he_context
    }

    /// An encryptor for the encryption type: the public key in asymmetric mode,
    /// the secret key in symmetric mode.
    pub fn encryptor(&self) -> Result<Encryptor<'_>> {
        let encryptor = Encryptor::new(self.he_context.clone());
        match self.encryption_type() {
            EncryptionType::Asymmetric => Ok(encryptor.set_public_key(self.public_key()?)),
            EncryptionType::Symmetric => Ok(encryptor.set_secret_key(self.secret_key()?)),
        }
    }

    /// A decryptor, available on private contexts only.
    pub fn decryptor(&self) -> Result<Decryptor<'_>> {
        Ok(Decryptor::new(self.he_context.clone(), self.secret_key()?))
    }

}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{CoeffModulus, SecurityLevel, SerializeOptions};

    pub(crate) fn parameters(encryption_type: EncryptionType) -> ContextParameters {
        ContextParameters::new(encryption_type)
            .set_poly_modulus_degree(2048)
            .set_coeff_modulus(&CoeffModulus::create(2048, &[60, 40, 40, 60]).unwrap())
            .set_security_level(SecurityLevel::None)
    }

    pub(crate) fn ctx(encryption_type: EncryptionType) -> EncryptionContext {
        EncryptionContext::create(parameters(encryption_type)).unwrap()
    }

    pub(crate) const ENCRYPTION_TYPES: [EncryptionType; 2] = [EncryptionType::Asymmetric, EncryptionType::Symmetric];

    fn clone(context: &EncryptionContext) -> EncryptionContext {
        context.clone()
    }

    fn copy(context: &EncryptionContext) -> EncryptionContext {
        context.copy()
    }

    fn boxed(context: &EncryptionContext) -> EncryptionContext {
        let boxed = Box::new(context.clone());
        *Clone::clone(&boxed)
    }

    fn recreate(context: &EncryptionContext) -> EncryptionContext {
        let options = SerializeOptions {save_secret_key: true, ..Default::default()};
        EncryptionContext::deserialize(&context.serialize(options).unwrap()).unwrap()
    }

    pub(crate) type Duplicate = fn(&EncryptionContext) -> EncryptionContext;
    pub(crate) const DUPLICATES: [Duplicate; 4] = [clone, copy, boxed, recreate];

    #[test]
    fn test_create() {
        let context = ctx(EncryptionType::Asymmetric);
        assert_eq!(context.state(), ContextState::Private);
        assert!(context.has_secret_key());
        assert!(context.has_public_key());
        assert!(context.has_relin_keys());
        assert!(!context.has_galois_keys());
        assert_eq!(context.slot_count(), 1024);
        assert_eq!(context.parms_id(), context.he_context().key_parms_id());
        let printed = format!("{:?}", context);
        assert!(printed.starts_with("EncryptionContext"));
        assert!(printed.contains("HeContext"));

        let context = ctx(EncryptionType::Symmetric);
        assert!(context.has_secret_key());
        assert!(!context.has_public_key());
        assert!(matches!(context.public_key(), Err(ContextError::NotFound(KeyKind::Public))));

        let options = CreateOptions {generate_relin_keys: false};
        let context = EncryptionContext::create_with(parameters(EncryptionType::Asymmetric), options).unwrap();
        assert!(!context.has_relin_keys());
        assert!(matches!(context.relin_keys(), Err(ContextError::NotFound(KeyKind::Relin))));

        let bad = ContextParameters::new(EncryptionType::Asymmetric).set_poly_modulus_degree(1000);
        assert!(matches!(EncryptionContext::create(bad), Err(ContextError::InvalidParameters(_))));
    }

    #[test]
    fn test_privacy_invariant() {
        for encryption_type in ENCRYPTION_TYPES {
            let mut context = ctx(encryption_type);
            assert!(context.is_private() != context.is_public());
            context.make_context_public(false, false).unwrap();
            assert!(context.is_private() != context.is_public());
            assert!(context.is_public());
            assert!(!context.has_secret_key());
            assert!(matches!(context.secret_key(), Err(ContextError::NotFound(KeyKind::Secret))));
            assert!(context.decryptor().is_err());

            // Public is terminal.
            context.make_context_public(false, false).unwrap();
            assert!(matches!(context.generate_relin_keys(), Err(ContextError::Permission(_))));
            assert!(context.is_public());
        }
    }

    #[test]
    fn test_make_public_keeps_public_key() {
        let mut context = ctx(EncryptionType::Asymmetric);
        let public_key = context.public_key().unwrap().clone();
        context.make_context_public(false, false).unwrap();
        assert_eq!(context.public_key().unwrap(), &public_key);
        assert!(context.has_relin_keys());
        assert!(!context.has_galois_keys());
        assert!(context.encryptor().is_ok());
    }

    #[test]
    fn test_make_public_generates_requested_keys() {
        let mut context = ctx(EncryptionType::Asymmetric);
        let relin_keys = context.relin_keys().unwrap().clone();
        context.make_context_public(true, true).unwrap();
        assert!(context.has_galois_keys());
        // Already present, so not regenerated.
        assert_eq!(context.relin_keys().unwrap(), &relin_keys);

        // A public context cannot satisfy a request for a missing key type...
        let mut context = EncryptionContext::create_with(
            parameters(EncryptionType::Asymmetric), CreateOptions {generate_relin_keys: false}).unwrap();
        context.make_context_public(false, false).unwrap();
        assert!(matches!(context.make_context_public(false, true), Err(ContextError::Permission(_))));
        assert!(!context.has_relin_keys());
        // ...but a request for a present key type is a no-op.
        let mut context = ctx(EncryptionType::Asymmetric);
        context.make_context_public(false, false).unwrap();
        assert!(context.make_context_public(false, true).is_ok());
    }

    #[test]
    fn test_key_generation_gating() {
        for encryption_type in ENCRYPTION_TYPES {
            let mut context = ctx(encryption_type);
            context.generate_galois_keys_from_steps(&[1, -1]).unwrap();
            assert!(context.galois_keys().unwrap().has_key(3));
            context.make_context_public(false, false).unwrap();
            let galois_keys = context.galois_keys().unwrap().clone();
            let relin_keys = context.relin_keys().unwrap().clone();

            assert!(matches!(context.generate_galois_keys(), Err(ContextError::Permission(_))));
            assert!(matches!(context.generate_relin_keys(), Err(ContextError::Permission(_))));
            assert!(matches!(context.generate_galois_keys_from_steps(&[2]), Err(ContextError::Permission(_))));
            // Failed generation leaves the slots untouched.
            assert_eq!(context.galois_keys().unwrap(), &galois_keys);
            assert_eq!(context.relin_keys().unwrap(), &relin_keys);
        }
    }

    #[test]
    fn test_regeneration_replaces_keys() {
        let mut context = ctx(EncryptionType::Symmetric);
        let relin_keys = context.relin_keys().unwrap().clone();
        context.generate_relin_keys().unwrap();
        assert_ne!(context.relin_keys().unwrap(), &relin_keys);
        assert!(context.generate_galois_keys_from_steps(&[1 << 20]).is_err());
        assert!(!context.has_galois_keys());
    }

    #[test]
    fn test_context_recreation() {
        for duplicate in DUPLICATES {
            for encryption_type in ENCRYPTION_TYPES {
                let original = ctx(encryption_type);
                let context = duplicate(&original);
                assert!(context.is_private());
                assert_eq!(context.parameters(), original.parameters());
                assert_eq!(context.secret_key().unwrap(), original.secret_key().unwrap());
                if encryption_type != EncryptionType::Asymmetric {
                    continue;
                }
                assert!(context.public_key().is_ok());

                let mut original = ctx(encryption_type);
                original.make_context_public(false, false).unwrap();
                assert!(duplicate(&original).is_public());

                let original = ctx(encryption_type);
                let mut context = duplicate(&original);
                context.make_context_public(false, false).unwrap();
                assert!(original.is_private());
                assert!(original.secret_key().is_ok());
            }
        }
    }

    #[test]
    fn test_generate_galois_keys_independence() {
        for duplicate in DUPLICATES {
            for encryption_type in ENCRYPTION_TYPES {
                let mut original = ctx(encryption_type);
                original.generate_galois_keys().unwrap();
                assert!(duplicate(&original).galois_keys().is_ok());

                if encryption_type == EncryptionType::Asymmetric {
                    let mut original = ctx(encryption_type);
                    original.make_context_public(true, false).unwrap();
                    assert!(duplicate(&original).galois_keys().is_ok());
                }

                let original = ctx(encryption_type);
                let mut context = duplicate(&original);
                context.generate_galois_keys().unwrap();
                assert!(matches!(original.galois_keys(), Err(ContextError::NotFound(KeyKind::Galois))));
            }
        }
    }

    #[test]
    fn test_generate_relin_keys_survive_duplication() {
        for duplicate in DUPLICATES {
            let original = ctx(EncryptionType::Asymmetric);
            assert!(duplicate(&original).relin_keys().is_ok());
            for generate_relin_keys in [false, true] {
                let mut original = ctx(EncryptionType::Asymmetric);
                original.make_context_public(false, generate_relin_keys).unwrap();
                let context = duplicate(&original);
                assert!(context.relin_keys().is_ok());
                assert!(context.is_public());
            }
        }
    }

    #[test]
    fn test_make_public_on_duplicate() {
        for duplicate in DUPLICATES {
            let mut original = ctx(EncryptionType::Asymmetric);
            original.make_context_public(true, true).unwrap();
            let context = duplicate(&original);
            assert!(context.relin_keys().is_ok());
            assert!(context.galois_keys().is_ok());

            let original = ctx(EncryptionType::Asymmetric);
            let mut context = duplicate(&original);
            context.make_context_public(true, true).unwrap();
            assert!(original.galois_keys().is_err());
            assert!(original.is_private());
        }
    }

    #[test]
    fn test_global_scale() {
        for duplicate in DUPLICATES {
            for encryption_type in ENCRYPTION_TYPES {
                for scale in [0.0, 1.0, 2.0, 2.0_f64.powi(40)] {
                    let mut original = ctx(encryption_type);
                    let context = duplicate(&original);
                    assert!(matches!(context.global_scale(), Err(ContextError::InvalidState(_))));

                    original.set_global_scale(scale);
                    let mut context = duplicate(&original);
                    assert_eq!(context.global_scale().unwrap(), scale);

                    context.set_global_scale(scale + 1.0);
                    assert_eq!(original.global_scale().unwrap(), scale);
                }
            }
        }
    }

    #[test]
    fn test_auto_flags() {
        type Getter = fn(&EncryptionContext) -> bool;
        type Setter = fn(&mut EncryptionContext, bool);
        let flags: [(Getter, Setter); 3] = [
            (EncryptionContext::auto_relin, EncryptionContext::set_auto_relin),
            (EncryptionContext::auto_rescale, EncryptionContext::set_auto_rescale),
            (EncryptionContext::auto_mod_switch, EncryptionContext::set_auto_mod_switch),
        ];
        let read = |context: &EncryptionContext| flags.map(|(get, _)| get(context));

        for duplicate in DUPLICATES {
            for encryption_type in ENCRYPTION_TYPES {
                let mut original = ctx(encryption_type);
                assert_eq!(read(&duplicate(&original)), [true; 3]);

                for (i, (_, set)) in flags.iter().enumerate() {
                    set(&mut original, false);
                    let mut context = duplicate(&original);
                    let mut expected = [true; 3];
                    expected[i] = false;
                    assert_eq!(read(&context), expected);

                    // Mutating the duplicate never reaches the original.
                    set(&mut context, true);
                    assert_eq!(read(&original), expected);

                    set(&mut original, true);
                    assert_eq!(read(&duplicate(&original)), [true; 3]);
                }
            }
        }
    }
}
