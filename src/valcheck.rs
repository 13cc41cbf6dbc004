
use crate::{
    Plaintext, Ciphertext, SecretKey, PublicKey, RelinKeys, GaloisKeys, KSwitchKeys,
    HeContext, util, Modulus,
};

fn components_reduced(data: &[u64], poly_modulus_degree: usize, coeff_modulus: &[Modulus]) -> bool {
    data.chunks(poly_modulus_degree * coeff_modulus.len())
        .all(|poly| util::polysmallmod::is_reduced_p(poly, poly_modulus_degree, coeff_modulus))
}

/// Provide methods for checking the validity of HE objects against a context.
pub trait ValCheck {
    /// Check whether the metadata is valid.
    /// Keys live on the key level; everything else must sit on a data level.
    fn is_metadata_valid_for(&self, context: &HeContext) -> bool;
    /// Check whether the buffer size matches the metadata.
    fn is_buffer_valid(&self) -> bool;
    /// Check whether every coefficient is reduced by its prime.
    fn is_data_valid_for(&self, context: &HeContext) -> bool;
    /// Check whether the object is valid.
    /// Shortcut for [ValCheck::is_data_valid_for] plus [ValCheck::is_buffer_valid].
    fn is_valid_for(&self, context: &HeContext) -> bool {
        self.is_buffer_valid() && self.is_data_valid_for(context)
    }
}

impl ValCheck for Plaintext {

    fn is_buffer_valid(&self) -> bool {
        self.coeff_modulus_size().checked_mul(self.poly_modulus_degree()) == Some(self.data().len())
    }

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        match context.get_context_data(self.parms_id()) {
            Some(context_data) => context.is_data_level(self.parms_id())
                && self.coeff_modulus_size() == context_data.coeff_modulus_size()
                && self.poly_modulus_degree() == context.poly_modulus_degree(),
            None => false,
        }
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        if !self.is_metadata_valid_for(context) {return false;}
        match context.get_context_data(self.parms_id()) {
            Some(context_data) => util::polysmallmod::is_reduced_p(
                self.data(), self.poly_modulus_degree(), context_data.coeff_modulus()),
            None => false,
        }
    }

}

fn ciphertext_metadata_valid(cipher: &Ciphertext, context: &HeContext, key_level: bool) -> bool {
    let level_ok = if key_level {
        cipher.parms_id() == context.key_parms_id()
    } else {
        context.is_data_level(cipher.parms_id())
    };
    let context_data = match context.get_context_data(cipher.parms_id()) {
        Some(context_data) => context_data,
        None => return false,
    };
    level_ok
        && cipher.coeff_modulus_size() == context_data.coeff_modulus_size()
        && cipher.poly_modulus_degree() == context.poly_modulus_degree()
        && (util::HE_CIPHERTEXT_SIZE_MIN..=util::HE_CIPHERTEXT_SIZE_MAX).contains(&cipher.size())
        && cipher.scale().is_finite()
        && cipher.scale() > 0.0
}

fn ciphertext_data_valid(cipher: &Ciphertext, context: &HeContext) -> bool {
    match context.get_context_data(cipher.parms_id()) {
        Some(context_data) => components_reduced(cipher.data(), cipher.poly_modulus_degree(), context_data.coeff_modulus()),
        None => false,
    }
}

impl ValCheck for Ciphertext {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        ciphertext_metadata_valid(self, context, false)
    }

    fn is_buffer_valid(&self) -> bool {
        self.coeff_modulus_size().checked_mul(self.size())
            .and_then(|count| count.checked_mul(self.poly_modulus_degree()))
            == Some(self.data().len())
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context) && ciphertext_data_valid(self, context)
    }

}

impl ValCheck for SecretKey {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        let plain = self.as_plaintext();
        self.parms_id() == context.key_parms_id()
            && plain.coeff_modulus_size() == context.key_context_data().coeff_modulus_size()
            && plain.poly_modulus_degree() == context.poly_modulus_degree()
    }

    fn is_buffer_valid(&self) -> bool {
        self.as_plaintext().is_buffer_valid()
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context)
            && util::polysmallmod::is_reduced_p(self.data(), context.poly_modulus_degree(),
                context.key_context_data().coeff_modulus())
    }

}

impl ValCheck for PublicKey {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        ciphertext_metadata_valid(self.as_ciphertext(), context, true)
            && self.as_ciphertext().size() == util::HE_CIPHERTEXT_SIZE_MIN
    }

    fn is_buffer_valid(&self) -> bool {
        self.as_ciphertext().is_buffer_valid()
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context) && ciphertext_data_valid(self.as_ciphertext(), context)
    }

}

impl ValCheck for KSwitchKeys {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        let decomp_mod_count = context.first_context_data().coeff_modulus_size();
        self.parms_id() == context.key_parms_id()
            && self.data().iter().all(|keys| {
                (keys.is_empty() || keys.len() == decomp_mod_count)
                    && keys.iter().all(|key| key.is_metadata_valid_for(context))
            })
    }

    fn is_buffer_valid(&self) -> bool {
        self.data().iter().all(|keys| keys.iter().all(|key| key.is_buffer_valid()))
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context)
            && self.data().iter().all(|keys| keys.iter().all(|key| key.is_data_valid_for(context)))
    }

}

impl ValCheck for RelinKeys {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        self.has_key(2) && self.as_kswitch_keys().is_metadata_valid_for(context)
    }

    fn is_buffer_valid(&self) -> bool {
        self.as_kswitch_keys().is_buffer_valid()
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context) && self.as_kswitch_keys().is_data_valid_for(context)
    }

}

impl ValCheck for GaloisKeys {

    fn is_metadata_valid_for(&self, context: &HeContext) -> bool {
        self.as_kswitch_keys().data().len() <= context.poly_modulus_degree()
            && self.as_kswitch_keys().is_metadata_valid_for(context)
    }

    fn is_buffer_valid(&self) -> bool {
        self.as_kswitch_keys().is_buffer_valid()
    }

    fn is_data_valid_for(&self, context: &HeContext) -> bool {
        self.is_metadata_valid_for(context) && self.as_kswitch_keys().is_data_valid_for(context)
    }

}
