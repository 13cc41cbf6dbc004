use crate::{util, Modulus, util::NTTTables};

/// Divide an NTT-form RNS polynomial by its last prime, rounding to nearest.
///
/// `input` holds `moduli.len()` components. On return the first
/// `moduli.len() - 1` components hold round(input / q_last); the last one is
/// left as scratch and should be dropped by the caller.
pub fn divide_and_round_q_last_ntt_inplace(input: &mut [u64], degree: usize, moduli: &[Modulus], ntt_tables: &[&NTTTables]) {
    let base_size = moduli.len();
    assert!(base_size >= 2, "[Logic error] Cannot divide a single-prime polynomial.");
    let (head, last) = input[..base_size * degree].split_at_mut((base_size - 1) * degree);
    let last_modulus = &moduli[base_size - 1];

    // Add (q_last - 1) / 2 to change from flooring to rounding.
    ntt_tables[base_size - 1].inverse_ntt_negacyclic(last);
    let half = last_modulus.value() >> 1;
    last.iter_mut().for_each(|x| *x = util::add_u64_mod(*x, half, last_modulus));

    let mut temp = vec![0; degree];
    for ((component, modulus), table) in head.chunks_mut(degree).zip(moduli.iter()).zip(ntt_tables.iter().copied()) {
        let half_mod = modulus.reduce(half);
        temp.iter_mut().zip(last.iter())
            .for_each(|(t, x)| *t = util::sub_u64_mod(modulus.reduce(*x), half_mod, modulus));
        table.ntt_negacyclic(&mut temp);
        let inv_q_last = match util::try_invert_u64_mod(last_modulus.value(), modulus) {
            Some(x) => x,
            None => panic!("[Logic error] Primes in the chain are not coprime."),
        };
        component.iter_mut().zip(temp.iter()).for_each(|(c, t)| {
            *c = util::multiply_u64_mod(util::sub_u64_mod(*c, *t, modulus), inv_q_last, modulus);
        });
    }
}

/// Garner's CRT reconstruction of one coefficient into `[0, prod(moduli))`.
/// The product of `moduli` must fit below 2^125.
pub fn compose_u128(residues: &[u64], moduli: &[Modulus]) -> u128 {
    let mut value = residues[0] as u128;
    let mut product = moduli[0].value() as u128;
    for (residue, modulus) in residues.iter().zip(moduli.iter()).skip(1) {
        let value_mod = modulus.reduce_u128(value);
        let product_mod = modulus.reduce_u128(product);
        let inv = match util::try_invert_u64_mod(product_mod, modulus) {
            Some(x) => x,
            None => panic!("[Logic error] Primes in the chain are not coprime."),
        };
        let t = util::multiply_u64_mod(util::sub_u64_mod(*residue, value_mod, modulus), inv, modulus);
        value += t as u128 * product;
        product *= modulus.value() as u128;
    }
    value
}

/// Number of leading primes whose product stays CRT-composable into a `u128`.
pub fn composable_prefix_len(moduli: &[Modulus]) -> usize {
    let mut bits = 0;
    let mut count = 0;
    for modulus in moduli {
        bits += modulus.bit_count();
        if bits > util::HE_COMPOSE_BIT_COUNT_MAX {break;}
        count += 1;
    }
    count.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoeffModulus;

    #[test]
    fn test_compose() {
        let moduli = [Modulus::new(7), Modulus::new(11), Modulus::new(13)];
        for x in [0u128, 1, 76, 500, 1000] {
            let residues: Vec<u64> = moduli.iter().map(|m| (x % m.value() as u128) as u64).collect();
            assert_eq!(compose_u128(&residues, &moduli), x);
        }
        let moduli = CoeffModulus::create(1024, &[60, 60]).unwrap();
        let x: u128 = (1u128 << 115) + 12345;
        let residues: Vec<u64> = moduli.iter().map(|m| m.reduce_u128(x)).collect();
        assert_eq!(compose_u128(&residues, &moduli), x);
    }

    #[test]
    fn test_composable_prefix() {
        let moduli = CoeffModulus::create(1024, &[60, 40, 40, 60]).unwrap();
        assert_eq!(composable_prefix_len(&moduli), 2);
        let moduli = CoeffModulus::create(1024, &[30, 30, 30, 30]).unwrap();
        assert_eq!(composable_prefix_len(&moduli), 4);
    }

    #[test]
    fn test_divide_and_round_q_last() {
        let degree = 4;
        let moduli = CoeffModulus::create(degree, &[30, 20]).unwrap();
        let tables = NTTTables::create_ntt_tables(2, &moduli).unwrap();
        let q_last = moduli[1].value();
        // Coefficients 3*q_last + 1, 5*q_last - 1, 7*q_last + q_last/2 + 1 and q_last - 2
        // round to 3, 5, 8 and 1.
        let values: [u128; 4] = [
            3 * q_last as u128 + 1,
            5 * q_last as u128 - 1,
            7 * q_last as u128 + (q_last / 2) as u128 + 1,
            q_last as u128 - 2,
        ];
        let mut poly: Vec<u64> = moduli.iter()
            .flat_map(|m| values.iter().map(move |v| m.reduce_u128(*v)))
            .collect();
        crate::polymod::ntt_p(&mut poly, degree, &tables);
        let table_refs: Vec<&NTTTables> = tables.iter().collect();
        divide_and_round_q_last_ntt_inplace(&mut poly, degree, &moduli, &table_refs);
        poly.truncate(degree);
        tables[0].inverse_ntt_negacyclic(&mut poly);
        assert_eq!(poly, vec![3, 5, 8, 1]);
    }
}
