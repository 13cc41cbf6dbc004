use super::dwthandler::{Arithmetic, DWTHandler};
use crate::{util, Modulus};

#[derive(Clone, Copy, Default)]
struct ModArith {
    modulus: Modulus,
}
type NTTHandler = DWTHandler<ModArith>;

impl Arithmetic for ModArith {
    type Value = u64;
    type Root = u64;
    type Scalar = u64;

    #[inline]
    fn add(&self, a: &u64, b: &u64) -> u64 {
        util::add_u64_mod(*a, *b, &self.modulus)
    }

    #[inline]
    fn sub(&self, a: &u64, b: &u64) -> u64 {
        util::sub_u64_mod(*a, *b, &self.modulus)
    }

    #[inline]
    fn mul_root(&self, a: &u64, r: &u64) -> u64 {
        util::multiply_u64_mod(*a, *r, &self.modulus)
    }

    #[inline]
    fn mul_scalar(&self, a: &u64, s: &u64) -> u64 {
        util::multiply_u64_mod(*a, *s, &self.modulus)
    }
}

/// Precomputed root powers for the negacyclic NTT modulo one prime.
#[derive(Clone)]
pub struct NTTTables {
    root: u64,
    coeff_count_power: usize,
    coeff_count: usize,
    modulus: Modulus,
    inv_degree_modulo: u64,
    root_powers: Vec<u64>,
    inv_root_powers: Vec<u64>,
    ntt_handler: NTTHandler,
}

impl NTTTables {

    pub fn new(coeff_count_power: usize, modulus: &Modulus) -> Result<Self, String> {
        let coeff_count = 1usize << coeff_count_power;
        let modulus = *modulus;
        let root = util::try_minimal_primitive_root(2 * coeff_count as u64, &modulus)
            .ok_or_else(|| format!("[Invalid argument] {} has no primitive {}-th root.", modulus, 2 * coeff_count))?;
        let inv_root = util::try_invert_u64_mod(root, &modulus)
            .ok_or_else(|| "[Invalid argument] Invalid modulus, unable to invert.".to_string())?;

        // Populate tables with powers of root in specific orders.
        let mut root_powers = vec![0; coeff_count];
        root_powers[0] = 1;
        let mut power = root;
        for i in 1..coeff_count {
            root_powers[util::reverse_bits_usize(i, coeff_count_power)] = power;
            power = util::multiply_u64_mod(power, root, &modulus);
        }

        let mut inv_root_powers = vec![0; coeff_count];
        inv_root_powers[0] = 1;
        let mut power = inv_root;
        for i in 1..coeff_count {
            inv_root_powers[util::reverse_bits_usize(i - 1, coeff_count_power) + 1] = power;
            power = util::multiply_u64_mod(power, inv_root, &modulus);
        }

        let inv_degree_modulo = util::try_invert_u64_mod(coeff_count as u64, &modulus)
            .ok_or_else(|| "[Invalid argument] Invalid modulus, unable to invert degree.".to_string())?;

        Ok(NTTTables {
            root,
            coeff_count_power,
            coeff_count,
            modulus,
            inv_degree_modulo,
            root_powers,
            inv_root_powers,
            ntt_handler: NTTHandler::new(&ModArith { modulus }),
        })
    }

    pub fn root(&self) -> u64 {self.root}
    pub fn modulus(&self) -> &Modulus {&self.modulus}
    pub fn coeff_count_power(&self) -> usize {self.coeff_count_power}
    pub fn coeff_count(&self) -> usize {self.coeff_count}

    pub fn create_ntt_tables(coeff_count_power: usize, moduli: &[Modulus]) -> Result<Vec<NTTTables>, String> {
        if moduli.is_empty() {
            return Err("[Invalid argument] Moduli is empty.".to_string());
        }
        moduli.iter().map(|x| Self::new(coeff_count_power, x)).collect()
    }

    pub fn ntt_negacyclic(&self, operand: &mut [u64]) {
        self.ntt_handler.transform_to_rev(operand, self.coeff_count_power, &self.root_powers, None);
    }

    pub fn inverse_ntt_negacyclic(&self, operand: &mut [u64]) {
        self.ntt_handler.transform_from_rev(operand, self.coeff_count_power, &self.inv_root_powers,
            Some(&self.inv_degree_modulo));
    }

}

#[cfg(test)]
mod tests {
    use crate::CoeffModulus;

    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_ntt_basics() {
        let modulus = Modulus::new(0xffffffffffc0001);
        let tables = NTTTables::new(1, &modulus).unwrap();
        assert_eq!(tables.coeff_count(), 2);
        assert_eq!(tables.root(), 288794978602139552);

        let mut poly = vec![0, 0];
        tables.ntt_negacyclic(&mut poly);
        assert_eq!(poly, vec![0, 0]);

        let mut poly = vec![1, 0];
        tables.ntt_negacyclic(&mut poly);
        assert_eq!(poly, vec![1, 1]);

        let mut poly = vec![1, 1];
        tables.ntt_negacyclic(&mut poly);
        assert_eq!(poly, vec![288794978602139553, 864126526004445282]);

        assert!(NTTTables::new(1, &Modulus::new(7)).is_err());
    }

    #[test]
    fn test_inverse_ntt() {
        let coeff_count_power = 6;
        let moduli = CoeffModulus::create(1 << coeff_count_power, &[60, 40, 30]).unwrap();
        let tables = NTTTables::create_ntt_tables(coeff_count_power, &moduli).unwrap();
        let mut rng = rand_chacha::ChaCha20Rng::seed_from_u64(7);
        for table in tables.iter() {
            let q = table.modulus().value();
            let original: Vec<u64> = (0..64).map(|_| rng.gen_range(0..q)).collect();
            let mut poly = original.clone();
            table.ntt_negacyclic(&mut poly);
            assert_ne!(poly, original);
            table.inverse_ntt_negacyclic(&mut poly);
            assert_eq!(poly, original);
        }
    }

    #[test]
    fn test_negacyclic_product() {
        // (1 + x) * x^(n-1) = x^(n-1) - 1 in Z_q[x]/(x^n + 1)
        let n = 16;
        let moduli = CoeffModulus::create(n, &[30]).unwrap();
        let table = NTTTables::new(4, &moduli[0]).unwrap();
        let q = moduli[0].value();
        let mut a = vec![0; n]; a[0] = 1; a[1] = 1;
        let mut b = vec![0; n]; b[n - 1] = 1;
        table.ntt_negacyclic(&mut a);
        table.ntt_negacyclic(&mut b);
        let mut c: Vec<u64> = a.iter().zip(b.iter())
            .map(|(x, y)| util::multiply_u64_mod(*x, *y, &moduli[0])).collect();
        table.inverse_ntt_negacyclic(&mut c);
        let mut expected = vec![0; n];
        expected[0] = q - 1;
        expected[n - 1] = 1;
        assert_eq!(c, expected);
    }
}
