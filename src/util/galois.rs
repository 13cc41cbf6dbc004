use crate::util;

pub(crate) const GALOIS_GENERATOR: usize = 3;

/// Galois automorphisms X -> X^elt of Z\[X\]/(X^N + 1), acting on NTT-form components.
#[derive(Clone, Debug)]
pub struct GaloisTool {
    coeff_count_power: usize,
    coeff_count: usize,
}

impl GaloisTool {

    pub fn new(coeff_count_power: usize) -> Self {
        GaloisTool {
            coeff_count_power,
            coeff_count: 1 << coeff_count_power,
        }
    }

    /// Maps NTT slot `i` of the result to the slot of the operand it is read from.
    pub fn generate_table_ntt(&self, galois_elt: usize) -> Vec<usize> {
        let coeff_count = self.coeff_count;
        let mask = (coeff_count - 1) as u64;
        (coeff_count..(coeff_count << 1)).map(|i| {
            let reversed = util::reverse_bits_u64(i as u64, self.coeff_count_power + 1);
            let index_raw = ((galois_elt as u64 * reversed) >> 1) & mask;
            util::reverse_bits_u64(index_raw, self.coeff_count_power) as usize
        }).collect()
    }

    /**
    Compute the Galois element corresponding to a given rotation step.
    Positive steps rotate left, negative steps rotate right, zero conjugates.
    */
    pub fn get_elt_from_step(&self, step: isize) -> Option<usize> {
        let n = self.coeff_count;
        let m = n * 2;
        if step == 0 {
            return Some(m - 1);
        }
        let pos_step = step.unsigned_abs();
        if pos_step >= (n >> 1) {
            return None;
        }
        let step = if step < 0 {(n >> 1) - pos_step} else {pos_step};
        let mut galois_elt = 1;
        for _ in 0..step {
            galois_elt = (galois_elt * GALOIS_GENERATOR) & (m - 1);
        }
        Some(galois_elt)
    }

    /**
    Compute the Galois elements needed for every power-of-two rotation in
    both directions plus conjugation.
    */
    pub fn get_elts_all(&self) -> Vec<usize> {
        let m = self.coeff_count << 1;
        let mut galois_elts = vec![m - 1];
        if self.coeff_count_power < 2 {
            return galois_elts;
        }
        let mut pos_power = GALOIS_GENERATOR;
        let mut neg_power = util::try_invert_u64_mod_u64(GALOIS_GENERATOR as u64, m as u64)
            .map(|x| x as usize)
            .unwrap_or(1);
        for _ in 0..self.coeff_count_power - 1 {
            galois_elts.push(pos_power);
            pos_power = (pos_power * pos_power) & (m - 1);
            galois_elts.push(neg_power);
            neg_power = (neg_power * neg_power) & (m - 1);
        }
        galois_elts
    }

    /**
    Compute the index in the range of 0 to (coeff_count - 1) of a given Galois element.
    */
    pub fn get_index_from_elt(galois_elt: usize) -> usize {
        (galois_elt - 1) >> 1
    }

    pub fn is_valid_elt(&self, galois_elt: usize) -> bool {
        galois_elt & 1 == 1 && galois_elt < (self.coeff_count << 1)
    }

    /// Apply the automorphism to every NTT-form component of a polynomial.
    pub fn apply_ntt_p(&self, poly: &[u64], galois_elt: usize, result: &mut [u64]) {
        let table = self.generate_table_ntt(galois_elt);
        for (src, dst) in poly.chunks(self.coeff_count).zip(result.chunks_mut(self.coeff_count)) {
            dst.iter_mut().zip(table.iter()).for_each(|(r, &t)| *r = src[t]);
        }
    }

}
