//! Encryption contexts for the CKKS homomorphic encryption scheme.
//!
//! An [EncryptionContext] bundles the encryption parameters with the key
//! material that goes with them: secret key, public key, relinearization keys
//! and Galois keys. It tracks whether it is private (holds the secret key) or
//! public, carries a global scale and the automatic relinearize / rescale /
//! modulus switching policy, and serializes to a self-describing byte stream
//! with per-key selection.
//!
//! [CKKSVector] is an encrypted vector of reals bound to a context, used for
//! encrypted arithmetic such as dot products.
//!
//! ```rust
//! use heathcliff_context::*;
//!
//! let parameters = generate_parameters(8192, &[60, 40, 40, 60], EncryptionType::Asymmetric).unwrap();
//! let mut context = EncryptionContext::create(parameters).unwrap();
//! context.set_global_scale(2.0_f64.powi(40));
//! context.generate_galois_keys().unwrap();
//!
//! let first = CKKSVector::new(&context, &[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let second = CKKSVector::new(&context, &[4.0, 3.0, 2.0, 1.0]).unwrap();
//! let result = first.dot(&second).unwrap().decrypt().unwrap();
//! assert!((result[0] - 20.0).abs() < 1.0);
//!
//! let mut public = context.copy();
//! public.make_context_public(false, false).unwrap();
//! let bytes = public.serialize(SerializeOptions::default()).unwrap();
//! let restored = EncryptionContext::deserialize(&bytes).unwrap();
//! assert!(restored.is_public());
//! ```

pub mod util;
mod error;
mod modulus;
mod encryption_parameters;
mod context;
mod text;
mod key;
mod ckks_encoder;
mod encryptor;
mod evaluator;
mod valcheck;
mod encryption_context;
mod serialize;
mod ckks_vector;

pub(crate) use util::polysmallmod as polymod;

pub use error::{ContextError, KeyKind, Result};
pub use modulus::{Modulus, CoeffModulus};
pub use encryption_parameters::{
    ContextParameters,
    EncryptionType,
    SecurityLevel,
    ParmsID,
    PARMS_ID_ZERO,
    generate_parameters,
};
pub use context::{HeContext, ContextData};
pub use text::{Plaintext, Ciphertext};
pub use key::{SecretKey, PublicKey, KSwitchKeys, RelinKeys, GaloisKeys, KeyGenerator};
pub use ckks_encoder::CKKSEncoder;
pub use encryptor::{Encryptor, Decryptor};
pub use evaluator::Evaluator;
pub use valcheck::ValCheck;
pub use encryption_context::{EncryptionContext, ContextState, GlobalScale, CreateOptions};
pub use serialize::{Serializable, SerializeOptions};
pub use ckks_vector::CKKSVector;
