pub mod sample {
    use rand::{Rng, distributions::Uniform, prelude::Distribution};
    use crate::{util::he_standard_params, Modulus};

    pub const NOISE_STANDARD_DEVIATION: f64 = he_standard_params::HE_STANDARD_PARAMS_ERROR_STD_DEV;
    pub const NOISE_DISTRIBUTION_WITH_MULTIPLIER: f64 = 6.0;
    pub const NOISE_MAX_DEVIATION: f64 = NOISE_STANDARD_DEVIATION * NOISE_DISTRIBUTION_WITH_MULTIPLIER;

    /// Rounded Gaussian rejected outside `max_deviation` of the mean.
    #[derive(Clone, Copy)]
    pub struct ClippedNormal {
        normal: rand_distr::Normal<f64>,
        max_deviation: f64,
    }

    impl Distribution<f64> for ClippedNormal {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
            let mean = self.normal.mean();
            loop {
                let sample = self.normal.sample(rng);
                if (sample - mean).abs() <= self.max_deviation {
                    break sample;
                }
            }
        }
    }

    impl ClippedNormal {
        pub fn new(mean: f64, standard_deviation: f64, max_deviation: f64) -> Option<Self> {
            if max_deviation.is_nan() || max_deviation <= 0.0 || !standard_deviation.is_finite() || standard_deviation < 0.0 {
                return None;
            }
            Some(Self {
                normal: rand_distr::Normal::new(mean, standard_deviation).ok()?,
                max_deviation,
            })
        }
    }

    fn write_signed(sampled: i64, coeff_modulus: &[Modulus], degree: usize, index: usize, destination: &mut [u64]) {
        for (j, modulus) in coeff_modulus.iter().enumerate() {
            destination[index + j * degree] = if sampled >= 0 {
                sampled as u64
            } else {
                modulus.value() - sampled.unsigned_abs()
            };
        }
    }

    /// Coefficients uniform in {-1, 0, 1}, written consistently in every component.
    pub fn ternary<T: Rng>(rng: &mut T, coeff_modulus: &[Modulus], degree: usize, destination: &mut [u64]) {
        let distribution = Uniform::new_inclusive(-1i64, 1);
        for i in 0..degree {
            write_signed(rng.sample(distribution), coeff_modulus, degree, i, destination);
        }
    }

    /// Rounded clipped Gaussian with the standard error deviation.
    pub fn normal<T: Rng>(rng: &mut T, coeff_modulus: &[Modulus], degree: usize, destination: &mut [u64]) {
        let distribution = match ClippedNormal::new(0.0, NOISE_STANDARD_DEVIATION, NOISE_MAX_DEVIATION) {
            Some(d) => d,
            None => {
                destination.iter_mut().for_each(|x| *x = 0);
                return;
            }
        };
        for i in 0..degree {
            let sampled = rng.sample(distribution).round() as i64;
            write_signed(sampled, coeff_modulus, degree, i, destination);
        }
    }

    /// Centered binomial with 21 coin pairs, matching standard deviation 3.2.
    pub fn centered_binomial<T: Rng>(rng: &mut T, coeff_modulus: &[Modulus], degree: usize, destination: &mut [u64]) {
        let cbd = |rng: &mut T| {
            let mut x = [0u8; 6];
            rng.fill_bytes(&mut x);
            x[2] &= 0x1f; x[5] &= 0x1f;
            x[..3].iter().map(|b| b.count_ones() as i64).sum::<i64>()
                - x[3..].iter().map(|b| b.count_ones() as i64).sum::<i64>()
        };
        for i in 0..degree {
            write_signed(cbd(rng), coeff_modulus, degree, i, destination);
        }
    }

    /// Error distributions available to encryption routines.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum ErrorDistribution {
        CenteredBinomial,
        ClippedNormal,
    }

    pub fn error<T: Rng>(rng: &mut T, distribution: ErrorDistribution, coeff_modulus: &[Modulus], degree: usize, destination: &mut [u64]) {
        match distribution {
            ErrorDistribution::CenteredBinomial => centered_binomial(rng, coeff_modulus, degree, destination),
            ErrorDistribution::ClippedNormal => normal(rng, coeff_modulus, degree, destination),
        }
    }

    /// Independent uniform residues in every component.
    pub fn uniform<T: Rng>(rng: &mut T, coeff_modulus: &[Modulus], degree: usize, destination: &mut [u64]) {
        for (component, modulus) in destination.chunks_mut(degree).zip(coeff_modulus.iter()) {
            let distribution = Uniform::new(0, modulus.value());
            component.iter_mut().for_each(|x| *x = rng.sample(distribution));
        }
    }

}

pub mod encrypt_zero {

    use crate::{
        context::{ContextData, HeContext},
        polymod,
        Ciphertext,
        PublicKey,
        SecretKey,
    };
    use super::sample::{self, ErrorDistribution};

    /// (c0, c1) = (-(c1 * s) + e, c1) with c1 uniform, in NTT form at the level of `context_data`.
    pub fn symmetric(secret_key: &SecretKey, context: &HeContext, context_data: &ContextData, destination: &mut Ciphertext) {
        symmetric_with_error(secret_key, context, context_data, ErrorDistribution::CenteredBinomial, destination)
    }

    pub fn symmetric_with_error(
        secret_key: &SecretKey, context: &HeContext, context_data: &ContextData,
        error: ErrorDistribution, destination: &mut Ciphertext
    ) {
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = context.poly_modulus_degree();
        let ntt_tables = context_data.small_ntt_tables();
        let poly_len = coeff_count * coeff_modulus.len();
        let secret = &secret_key.data()[..poly_len];

        destination.resize(context_data, coeff_count, 2);
        destination.set_scale(1.0);

        let mut prng = context.create_random_generator();
        sample::uniform(&mut prng, coeff_modulus, coeff_count, destination.poly_mut(1));

        let mut noise = vec![0; poly_len];
        sample::error(&mut prng, error, coeff_modulus, coeff_count, &mut noise);
        polymod::ntt_p(&mut noise, coeff_count, ntt_tables);

        let (c0, _, c1) = destination.split_poly_mut(0);
        polymod::dyadic_product_p(secret, c1, coeff_count, coeff_modulus, c0);
        polymod::add_inplace_p(c0, &noise, coeff_count, coeff_modulus);
        polymod::negate_inplace_p(c0, coeff_count, coeff_modulus);
    }

    /// c_j = pk_j * u + e_j with u ternary, in NTT form at the level of `context_data`.
    pub fn asymmetric(public_key: &PublicKey, context: &HeContext, context_data: &ContextData, destination: &mut Ciphertext) {
        let coeff_modulus = context_data.coeff_modulus();
        let coeff_count = context.poly_modulus_degree();
        let ntt_tables = context_data.small_ntt_tables();
        let poly_len = coeff_count * coeff_modulus.len();
        let public_key = public_key.as_ciphertext();
        let encrypted_size = public_key.size();

        destination.resize(context_data, coeff_count, encrypted_size);
        destination.set_scale(1.0);

        let mut prng = context.create_random_generator();
        let mut u = vec![0; poly_len];
        sample::ternary(&mut prng, coeff_modulus, coeff_count, &mut u);
        polymod::ntt_p(&mut u, coeff_count, ntt_tables);

        let mut noise = vec![0; poly_len];
        for j in 0..encrypted_size {
            let key_poly = &public_key.poly(j)[..poly_len];
            polymod::dyadic_product_p(&u, key_poly, coeff_count, coeff_modulus, destination.poly_mut(j));
            sample::centered_binomial(&mut prng, coeff_modulus, coeff_count, &mut noise);
            polymod::ntt_p(&mut noise, coeff_count, ntt_tables);
            polymod::add_inplace_p(destination.poly_mut(j), &noise, coeff_count, coeff_modulus);
        }
    }

}
