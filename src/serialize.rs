//! Byte encoding of an [EncryptionContext].
//!
//! The envelope is framed by hand with the stream-based [Serializable] trait.
//! Key material goes through bincode, one length-prefixed block per key slot.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::{
    encryption_context::{GlobalScale, KeyMaterial},
    ContextError,
    ContextParameters,
    EncryptionContext,
    EncryptionType,
    GaloisKeys,
    HeContext,
    KeyKind,
    Modulus,
    ParmsID,
    PublicKey,
    RelinKeys,
    Result,
    SecretKey,
    SecurityLevel,
    ValCheck,
};

const MAGIC: &[u8; 4] = b"HCTX";
const VERSION: u8 = 1;

/// Provide serialization and deserialization methods for
/// objects that need no context information.
pub trait Serializable {
    /// Serialize the object into a stream.
    fn serialize<T: Write>(&self, stream: &mut T) -> Result<usize>;
    /// Deserialize the object from a stream.
    fn deserialize<T: Read>(stream: &mut T) -> Result<Self> where Self: Sized;
    /// Get the size (bytes) of the object if serialized.
    fn serialized_size(&self) -> usize;
}

impl Serializable for u64 {
    fn serialize<T: Write>(&self, stream: &mut T) -> Result<usize> {
        stream.write_all(&self.to_le_bytes())?;
        Ok(self.serialized_size())
    }
    fn deserialize<T: Read>(stream: &mut T) -> Result<Self> {
        let mut buf = [0u8; 8];
        stream.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>()
    }
}

impl Serializable for u8 {
    #[inline]
    fn serialize<T: Write>(&self, stream: &mut T) -> Result<usize> {
        stream.write_all(&[*self])?;
        Ok(1)
    }
    #[inline]
    fn deserialize<T: Read>(stream: &mut T) -> Result<Self> {
        let mut buf = [0u8; 1];
        stream.read_exact(&mut buf)?;
        Ok(buf[0])
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u8>()
    }
}

impl Serializable for bool {
    fn serialize<T: Write>(&self, stream: &mut T) -> Result<usize> {
        u8::from(*self).serialize(stream)
    }
    fn deserialize<T: Read>(stream: &mut T) -> Result<Self> {
        match u8::deserialize(stream)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ContextError::Serialization(format!("invalid boolean {}", other))),
        }
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u8>()
    }
}

impl Serializable for f64 {
    fn serialize<T: Write>(&self, stream: &mut T) -> Result<usize> {
        self.to_bits().serialize(stream)
    }
    fn deserialize<T: Read>(stream: &mut T) -> Result<Self> {
        Ok(f64::from_bits(u64::deserialize(stream)?))
    }
    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>()
    }
}

impl Serializable for Modulus {

    fn serialize<T: Write> (&self, stream: &mut T) -> Result<usize> {
        self.value().serialize(stream)
    }

    fn deserialize<T: Read> (stream: &mut T) -> Result<Modulus> {
        let value = u64::deserialize(stream)?;
        Modulus::try_new(value).map_err(|err| ContextError::Serialization(err.to_string()))
    }

    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>()
    }

}

impl<I: Serializable> Serializable for Vec<I> {

    fn serialize<T: Write> (&self, stream: &mut T) -> Result<usize> {
        let mut bytes_written = (self.len() as u64).serialize(stream)?;
        for item in self {
            bytes_written += item.serialize(stream)?;
        }
        Ok(bytes_written)
    }

    fn deserialize<T: Read> (stream: &mut T) -> Result<Vec<I>> {
        let len = u64::deserialize(stream)?;
        // Items are at least one byte each; the capacity hint must not trust the stream.
        let mut ret = Vec::with_capacity(len.min(64) as usize);
        for _ in 0..len {
            ret.push(I::deserialize(stream)?);
        }
        Ok(ret)
    }

    fn serialized_size(&self) -> usize {
        std::mem::size_of::<u64>() + self.iter().map(|item| item.serialized_size()).sum::<usize>()
    }

}

impl Serializable for ParmsID {

    fn serialize<T: Write> (&self, stream: &mut T) -> Result<usize> {
        let mut bytes_written = 0;
        for word in self {
            bytes_written += word.serialize(stream)?;
        }
        Ok(bytes_written)
    }

    fn deserialize<T: Read> (stream: &mut T) -> Result<ParmsID> {
        let mut data = [0u64; 4];
        for word in &mut data {
            *word = u64::deserialize(stream)?;
        }
        Ok(data)
    }

    fn serialized_size(&self) -> usize {
        std::mem::size_of::<ParmsID>()
    }

}

impl Serializable for ContextParameters {

    fn serialize<T: Write> (&self, stream: &mut T) -> Result<usize> {
        let mut bytes_written = 0;
        bytes_written += u8::from(self.encryption_type()).serialize(stream)?;
        bytes_written += (self.poly_modulus_degree() as u64).serialize(stream)?;
        bytes_written += u8::from(self.security_level()).serialize(stream)?;
        bytes_written += self.coeff_modulus().to_vec().serialize(stream)?;
        bytes_written += self.parms_id().serialize(stream)?;
        Ok(bytes_written)
    }

    /// Fails unless the stored fingerprint matches the decoded parameters.
    fn deserialize<T: Read> (stream: &mut T) -> Result<ContextParameters> {
        let encryption_type = EncryptionType::try_from(u8::deserialize(stream)?)?;
        let poly_modulus_degree = usize::try_from(u64::deserialize(stream)?)
            .map_err(|_| ContextError::Serialization("polynomial degree out of range".to_string()))?;
        let security_level = SecurityLevel::try_from(u8::deserialize(stream)?)?;
        let coeff_modulus = Vec::<Modulus>::deserialize(stream)?;
        let parms_id = ParmsID::deserialize(stream)?;
        let parameters = ContextParameters::new(encryption_type)
            .set_poly_modulus_degree(poly_modulus_degree)
            .set_coeff_modulus(&coeff_modulus)
            .set_security_level(security_level);
        if parameters.parms_id() != &parms_id {
            return Err(ContextError::Serialization("parameters do not match their fingerprint".to_string()));
        }
        Ok(parameters)
    }

    fn serialized_size(&self) -> usize {
        2 * std::mem::size_of::<u8>()
            + std::mem::size_of::<u64>()
            + self.coeff_modulus().to_vec().serialized_size()
            + self.parms_id().serialized_size()
    }

}

impl Serializable for GlobalScale {

    fn serialize<T: Write> (&self, stream: &mut T) -> Result<usize> {
        match self {
            GlobalScale::Unset => 0u8.serialize(stream),
            GlobalScale::Value(scale) => Ok(1u8.serialize(stream)? + scale.serialize(stream)?),
        }
    }

    fn deserialize<T: Read> (stream: &mut T) -> Result<GlobalScale> {
        match u8::deserialize(stream)? {
            0 => Ok(GlobalScale::Unset),
            1 => Ok(GlobalScale::Value(f64::deserialize(stream)?)),
            tag => Err(ContextError::Serialization(format!("invalid scale tag {}", tag))),
        }
    }

    fn serialized_size(&self) -> usize {
        match self {
            GlobalScale::Unset => 1,
            GlobalScale::Value(_) => 1 + std::mem::size_of::<u64>(),
        }
    }

}

/// A key slot: absent, or present as one length-prefixed bincode payload.
fn serialize_key_block<K: serde::Serialize, T: Write>(key: Option<&K>, stream: &mut T) -> Result<usize> {
    match key {
        None => 0u8.serialize(stream),
        Some(key) => {
            let payload = bincode::serialize(key)?;
            let mut bytes_written = 1u8.serialize(stream)?;
            bytes_written += (payload.len() as u64).serialize(stream)?;
            stream.write_all(&payload)?;
            Ok(bytes_written + payload.len())
        }
    }
}

fn deserialize_key_block<K: DeserializeOwned, T: Read>(stream: &mut T) -> Result<Option<K>> {
    match u8::deserialize(stream)? {
        0 => Ok(None),
        1 => {
            let len = u64::deserialize(stream)?;
            let mut payload = Vec::new();
            (&mut *stream).take(len).read_to_end(&mut payload)?;
            if payload.len() as u64 != len {
                return Err(ContextError::Serialization("truncated key block".to_string()));
            }
            Ok(Some(bincode::deserialize(&payload)?))
        }
        tag => Err(ContextError::Serialization(format!("invalid key block tag {}", tag))),
    }
}

fn check_key<K: ValCheck>(key: Option<K>, context: &HeContext, kind: KeyKind) -> Result<Option<K>> {
    match key {
        Some(key) if !key.is_valid_for(context) =>
            Err(ContextError::Serialization(format!("{} not valid for the parameters", kind))),
        key => Ok(key),
    }
}

/// Selects which key slots [EncryptionContext::serialize] writes.
///
/// Parameters, the global scale and the automatic flags are always written.
/// A requested slot that is empty in the source is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    pub save_public_key: bool,
    pub save_secret_key: bool,
    pub save_galois_keys: bool,
    pub save_relin_keys: bool,
}

impl Default for SerializeOptions {
    /// Everything except the secret key.
    fn default() -> Self {
        Self {
            save_public_key: true,
            save_secret_key: false,
            save_galois_keys: true,
            save_relin_keys: true,
        }
    }
}

impl SerializeOptions {
    /// Save every key slot, the secret key included.
    pub fn all() -> Self {
        Self {save_secret_key: true, ..Self::default()}
    }
}

impl EncryptionContext {

    fn selected<'a, K>(&self, slot: Option<&'a K>, requested: bool, kind: KeyKind) -> Option<&'a K> {
        if !requested {
            return None;
        }
        if slot.is_none() {
            if kind == KeyKind::Public && self.encryption_type() == EncryptionType::Symmetric {
                debug!("symmetric context has no public key to save");
            } else {
                warn!(key = %kind, "requested key is not present and will not be saved");
            }
        }
        slot
    }

    /// Write the context into a stream, with the key slots selected by `options`.
    pub fn serialize_to<T: Write>(&self, options: SerializeOptions, stream: &mut T) -> Result<usize> {
        let mut bytes_written = 0;
        stream.write_all(MAGIC)?;
        bytes_written += MAGIC.len();
        bytes_written += VERSION.serialize(stream)?;
        bytes_written += self.parameters().serialize(stream)?;
        bytes_written += self.global_scale_raw().serialize(stream)?;
        bytes_written += self.auto_relin().serialize(stream)?;
        bytes_written += self.auto_rescale().serialize(stream)?;
        bytes_written += self.auto_mod_switch().serialize(stream)?;

        let keys = &self.keys;
        bytes_written += serialize_key_block(
            self.selected(keys.secret_key.as_ref(), options.save_secret_key, KeyKind::Secret), stream)?;
        bytes_written += serialize_key_block(
            self.selected(keys.public_key.as_ref(), options.save_public_key, KeyKind::Public), stream)?;
        bytes_written += serialize_key_block(
            self.selected(keys.relin_keys.as_ref(), options.save_relin_keys, KeyKind::Relin), stream)?;
        bytes_written += serialize_key_block(
            self.selected(keys.galois_keys.as_ref(), options.save_galois_keys, KeyKind::Galois), stream)?;
        Ok(bytes_written)
    }

    /// Encode the context, with the key slots selected by `options`.
    pub fn serialize(&self, options: SerializeOptions) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.serialize_to(options, &mut bytes)?;
        info!(bytes = bytes.len(), ?options, "serialized context");
        Ok(bytes)
    }

    /// Read a context from a stream.
    ///
    /// The result is private exactly when the stream carries a secret key.
    pub fn deserialize_from<T: Read>(stream: &mut T) -> Result<Self> {
        let mut magic = [0u8; 4];
        stream.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ContextError::Serialization("not an encryption context".to_string()));
        }
        let version = u8::deserialize(stream)?;
        if version != VERSION {
            return Err(ContextError::Serialization(format!("unsupported version {}", version)));
        }
        let parameters = ContextParameters::deserialize(stream)?;
        let global_scale = GlobalScale::deserialize(stream)?;
        let auto_relin = bool::deserialize(stream)?;
        let auto_rescale = bool::deserialize(stream)?;
        let auto_mod_switch = bool::deserialize(stream)?;

        let he_context = HeContext::new(&parameters)
            .map_err(|err| ContextError::Serialization(err.to_string()))?;
        let secret_key = deserialize_key_block::<SecretKey, _>(stream)?;
        let public_key = deserialize_key_block::<PublicKey, _>(stream)?;
        let relin_keys = deserialize_key_block::<RelinKeys, _>(stream)?;
        let galois_keys = deserialize_key_block::<GaloisKeys, _>(stream)?;
        let keys = KeyMaterial {
            secret_key: check_key(secret_key, &he_context, KeyKind::Secret)?,
            public_key: check_key(public_key, &he_context, KeyKind::Public)?,
            relin_keys: check_key(relin_keys, &he_context, KeyKind::Relin)?,
            galois_keys: check_key(galois_keys, &he_context, KeyKind::Galois)?,
        };

        let mut context = EncryptionContext::from_parts(he_context, keys);
        context.set_global_scale_raw(global_scale);
        context.set_auto_relin(auto_relin);
        context.set_auto_rescale(auto_rescale);
        context.set_auto_mod_switch(auto_mod_switch);
        Ok(context)
    }

    /// Decode a context produced by [EncryptionContext::serialize].
    /// Trailing bytes are rejected.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut stream = bytes;
        let context = Self::deserialize_from(&mut stream)?;
        if !stream.is_empty() {
            return Err(ContextError::Serialization(format!("{} trailing bytes", stream.len())));
        }
        info!(
            bytes = bytes.len(),
            private = context.is_private(),
            has_public_key = context.has_public_key(),
            has_relin_keys = context.has_relin_keys(),
            has_galois_keys = context.has_galois_keys(),
            "deserialized context"
        );
        Ok(context)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption_context::tests::{ctx, parameters, ENCRYPTION_TYPES};

    fn full_context(encryption_type: EncryptionType) -> EncryptionContext {
        let mut context = ctx(encryption_type);
        context.generate_galois_keys_from_steps(&[1, 2]).unwrap();
        context
    }

    fn has_all(context: &EncryptionContext) -> [bool; 4] {
        [context.has_public_key(), context.has_secret_key(), context.has_galois_keys(), context.has_relin_keys()]
    }

    #[test]
    fn test_primitives() -> Result<()> {
        let modulus = Modulus::new(123456789);
        let mut stream = Vec::new();
        let bytes_len = modulus.serialize(&mut stream)?;
        assert_eq!(bytes_len, modulus.serialized_size());
        assert_eq!(stream.len(), modulus.serialized_size());
        let mut stream = stream.as_slice();
        assert_eq!(modulus, Modulus::deserialize(&mut stream)?);

        for scale in [GlobalScale::Unset, GlobalScale::Value(0.0), GlobalScale::Value(2.0_f64.powi(40))] {
            let mut stream = Vec::new();
            assert_eq!(scale.serialize(&mut stream)?, scale.serialized_size());
            assert_eq!(GlobalScale::deserialize(&mut stream.as_slice())?, scale);
        }

        assert!(bool::deserialize(&mut [2u8].as_slice()).is_err());
        assert!(u64::deserialize(&mut [0u8; 3].as_slice()).is_err());
        Ok(())
    }

    #[test]
    fn test_parameters() {
        let parms = parameters(EncryptionType::Symmetric);
        let mut stream = Vec::new();
        let bytes_len = parms.serialize(&mut stream).unwrap();
        assert_eq!(bytes_len, parms.serialized_size());
        assert_eq!(stream.len(), parms.serialized_size());
        let recovered = ContextParameters::deserialize(&mut stream.as_slice()).unwrap();
        assert_eq!(parms, recovered);

        // Flip a bit of the last prime: the fingerprint no longer matches.
        let last_prime = stream.len() - parms.parms_id().serialized_size() - 8;
        stream[last_prime] ^= 2;
        assert!(ContextParameters::deserialize(&mut stream.as_slice()).is_err());
        stream[last_prime] ^= 2;

        // The security level is part of the fingerprint too.
        let security_level = 1 + 8;
        assert_eq!(stream[security_level], u8::from(SecurityLevel::None));
        stream[security_level] = u8::from(SecurityLevel::Tc128);
        assert!(matches!(ContextParameters::deserialize(&mut stream.as_slice()), Err(ContextError::Serialization(_))));
    }

    #[derive(serde::Serialize)]
    struct ForgedPlaintext {
        poly_modulus_degree: usize,
        coeff_modulus_size: usize,
        data: Vec<u64>,
        parms_id: ParmsID,
        scale: f64,
    }

    #[derive(serde::Serialize)]
    struct ForgedCiphertext {
        size: usize,
        coeff_modulus_size: usize,
        poly_modulus_degree: usize,
        data: Vec<u64>,
        parms_id: ParmsID,
        scale: f64,
    }

    /// The envelope of `context` without keys, with `secret` and `public` as the first two key blocks.
    fn with_forged_blocks(context: &EncryptionContext, secret: Option<&ForgedPlaintext>, public: Option<&ForgedCiphertext>) -> Vec<u8> {
        let none = SerializeOptions {save_public_key: false, save_secret_key: false, save_galois_keys: false, save_relin_keys: false};
        let bytes = context.serialize(none).unwrap();
        assert_eq!(&bytes[bytes.len() - 4..], &[0, 0, 0, 0]);
        let mut forged = bytes[..bytes.len() - 4].to_vec();
        serialize_key_block(secret, &mut forged).unwrap();
        serialize_key_block(public, &mut forged).unwrap();
        forged.extend_from_slice(&[0, 0]);
        forged
    }

    #[test]
    fn test_oversized_key_metadata_rejected() {
        let source = ctx(EncryptionType::Asymmetric);
        let parms_id = *source.parms_id();

        let public = ForgedCiphertext {
            size: 2, coeff_modulus_size: usize::MAX / 2, poly_modulus_degree: 2048,
            data: vec![], parms_id, scale: 1.0,
        };
        let forged = with_forged_blocks(&source, None, Some(&public));
        assert!(matches!(EncryptionContext::deserialize(&forged), Err(ContextError::Serialization(_))));

        let secret = ForgedPlaintext {
            poly_modulus_degree: usize::MAX, coeff_modulus_size: 4,
            data: vec![], parms_id, scale: 1.0,
        };
        let forged = with_forged_blocks(&source, Some(&secret), None);
        assert!(matches!(EncryptionContext::deserialize(&forged), Err(ContextError::Serialization(_))));

        // A well-formed block spliced the same way is accepted.
        let secret_key = source.secret_key().unwrap();
        let mut expected = with_forged_blocks(&source, None, None);
        let absent = expected.len() - 4;
        expected.truncate(absent);
        serialize_key_block(Some(secret_key), &mut expected).unwrap();
        expected.extend_from_slice(&[0, 0, 0]);
        let restored = EncryptionContext::deserialize(&expected).unwrap();
        assert_eq!(restored.secret_key().unwrap(), secret_key);
        assert!(restored.is_private());
    }

    #[test]
    fn test_selective_round_trip() {
        for encryption_type in ENCRYPTION_TYPES {
            let asymmetric = encryption_type == EncryptionType::Asymmetric;
            let source = full_context(encryption_type);
            assert_eq!(has_all(&source), [asymmetric, true, true, true]);

            for mask in 0..16u8 {
                let options = SerializeOptions {
                    save_public_key: mask & 1 != 0,
                    save_secret_key: mask & 2 != 0,
                    save_galois_keys: mask & 4 != 0,
                    save_relin_keys: mask & 8 != 0,
                };
                let bytes = source.serialize(options).unwrap();
                let context = EncryptionContext::deserialize(&bytes).unwrap();
                assert_eq!(context.has_public_key(), options.save_public_key && source.has_public_key());
                assert_eq!(context.has_secret_key(), options.save_secret_key);
                assert_eq!(context.has_galois_keys(), options.save_galois_keys);
                assert_eq!(context.has_relin_keys(), options.save_relin_keys);
                assert_eq!(context.is_private(), options.save_secret_key);
                assert_eq!(context.parameters(), source.parameters());
                if options.save_galois_keys {
                    assert_eq!(context.galois_keys().unwrap(), source.galois_keys().unwrap());
                } else {
                    assert!(matches!(context.galois_keys(), Err(ContextError::NotFound(KeyKind::Galois))));
                }
            }
        }
    }

    #[test]
    fn test_drop_one_key() {
        let source = full_context(EncryptionType::Asymmetric);
        let cases = [
            (SerializeOptions {save_relin_keys: false, ..SerializeOptions::all()}, [true, true, true, false]),
            (SerializeOptions {save_galois_keys: false, ..SerializeOptions::all()}, [true, true, false, true]),
            (SerializeOptions {save_secret_key: false, ..SerializeOptions::all()}, [true, false, true, true]),
            (SerializeOptions {save_public_key: false, ..SerializeOptions::all()}, [false, true, true, true]),
        ];
        for (options, expected) in cases {
            let context = EncryptionContext::deserialize(&source.serialize(options).unwrap()).unwrap();
            assert_eq!(has_all(&context), expected);
        }
    }

    #[test]
    fn test_scale_and_flags_always_carried() {
        let mut source = ctx(EncryptionType::Symmetric);
        source.set_global_scale(2.0_f64.powi(40));
        source.set_auto_rescale(false);
        let options = SerializeOptions {
            save_public_key: false, save_secret_key: false, save_galois_keys: false, save_relin_keys: false,
        };
        let context = EncryptionContext::deserialize(&source.serialize(options).unwrap()).unwrap();
        assert_eq!(context.global_scale().unwrap(), 2.0_f64.powi(40));
        assert!(context.auto_relin());
        assert!(!context.auto_rescale());
        assert!(context.auto_mod_switch());
        assert!(context.is_public());
        assert_eq!(has_all(&context), [false; 4]);

        let source = ctx(EncryptionType::Symmetric);
        let context = EncryptionContext::deserialize(&source.serialize(options).unwrap()).unwrap();
        assert!(context.global_scale().is_err());
    }

    #[test]
    fn test_malformed_input() {
        let source = ctx(EncryptionType::Asymmetric);
        let bytes = source.serialize(SerializeOptions::default()).unwrap();
        let size = source.serialize_to(SerializeOptions::default(), &mut std::io::sink()).unwrap();
        assert_eq!(size, bytes.len());

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(matches!(EncryptionContext::deserialize(&trailing), Err(ContextError::Serialization(_))));
        assert!(matches!(EncryptionContext::deserialize(&bytes[..bytes.len() - 1]), Err(ContextError::Serialization(_))));

        let mut bad_magic = bytes.clone();
        bad_magic[0] = b'X';
        assert!(EncryptionContext::deserialize(&bad_magic).is_err());
        let mut bad_version = bytes.clone();
        bad_version[4] = 2;
        assert!(EncryptionContext::deserialize(&bad_version).is_err());
        assert!(EncryptionContext::deserialize(&[]).is_err());
    }

    #[test]
    fn test_keys_from_other_parameters_rejected() {
        let source = ctx(EncryptionType::Asymmetric);
        let other = EncryptionContext::create(
            parameters(EncryptionType::Asymmetric).set_poly_modulus_degree(1024)
                .set_coeff_modulus(&crate::CoeffModulus::create(1024, &[50, 40, 50]).unwrap())
        ).unwrap();

        // Splice the other context's key blocks behind this context's header.
        let options = SerializeOptions::all();
        let header_len = MAGIC.len() + 1 + source.parameters().serialized_size()
            + GlobalScale::Unset.serialized_size() + 3;
        let other_header_len = MAGIC.len() + 1 + other.parameters().serialized_size()
            + GlobalScale::Unset.serialized_size() + 3;
        let mut spliced = source.serialize(options).unwrap()[..header_len].to_vec();
        spliced.extend_from_slice(&other.serialize(options).unwrap()[other_header_len..]);
        assert!(matches!(EncryptionContext::deserialize(&spliced), Err(ContextError::Serialization(_))));
    }
}
