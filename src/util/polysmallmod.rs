//! Coefficient-wise arithmetic on RNS polynomials.
//!
//! A `_p` function works on one polynomial laid out as `moduli.len()`
//! consecutive components of `degree` coefficients each; component `j`
//! is reduced modulo `moduli[j]`.

use crate::{util, Modulus, util::NTTTables};

#[inline]
fn components<'a>(poly: &'a [u64], degree: usize, moduli: &'a [Modulus]) -> impl Iterator<Item = (&'a [u64], &'a Modulus)> {
    poly.chunks(degree).zip(moduli.iter())
}

#[inline]
fn components_mut<'a>(poly: &'a mut [u64], degree: usize, moduli: &'a [Modulus]) -> impl Iterator<Item = (&'a mut [u64], &'a Modulus)> {
    poly.chunks_mut(degree).zip(moduli.iter())
}

pub fn negate_inplace_p(poly: &mut [u64], degree: usize, moduli: &[Modulus]) {
    for (component, modulus) in components_mut(poly, degree, moduli) {
        component.iter_mut().for_each(|x| *x = util::negate_u64_mod(*x, modulus));
    }
}

pub fn add_inplace_p(poly1: &mut [u64], poly2: &[u64], degree: usize, moduli: &[Modulus]) {
    for ((c1, modulus), c2) in components_mut(poly1, degree, moduli).zip(poly2.chunks(degree)) {
        c1.iter_mut().zip(c2.iter()).for_each(|(x, y)| *x = util::add_u64_mod(*x, *y, modulus));
    }
}

pub fn sub_inplace_p(poly1: &mut [u64], poly2: &[u64], degree: usize, moduli: &[Modulus]) {
    for ((c1, modulus), c2) in components_mut(poly1, degree, moduli).zip(poly2.chunks(degree)) {
        c1.iter_mut().zip(c2.iter()).for_each(|(x, y)| *x = util::sub_u64_mod(*x, *y, modulus));
    }
}

pub fn dyadic_product_p(poly1: &[u64], poly2: &[u64], degree: usize, moduli: &[Modulus], result: &mut [u64]) {
    for (((r, modulus), c1), c2) in components_mut(result, degree, moduli).zip(poly1.chunks(degree)).zip(poly2.chunks(degree)) {
        r.iter_mut().zip(c1.iter().zip(c2.iter()))
            .for_each(|(r, (x, y))| *r = util::multiply_u64_mod(*x, *y, modulus));
    }
}

pub fn dyadic_product_inplace_p(poly1: &mut [u64], poly2: &[u64], degree: usize, moduli: &[Modulus]) {
    for ((c1, modulus), c2) in components_mut(poly1, degree, moduli).zip(poly2.chunks(degree)) {
        c1.iter_mut().zip(c2.iter()).for_each(|(x, y)| *x = util::multiply_u64_mod(*x, *y, modulus));
    }
}

/// `poly1 += poly2 * poly3`, coefficient-wise.
pub fn dyadic_product_accumulate_p(poly2: &[u64], poly3: &[u64], degree: usize, moduli: &[Modulus], poly1: &mut [u64]) {
    for (((acc, modulus), c2), c3) in components_mut(poly1, degree, moduli).zip(poly2.chunks(degree)).zip(poly3.chunks(degree)) {
        acc.iter_mut().zip(c2.iter().zip(c3.iter()))
            .for_each(|(acc, (x, y))| *acc = util::multiply_add_u64_mod(*x, *y, *acc, modulus));
    }
}

pub fn ntt_p(poly: &mut [u64], degree: usize, tables: &[NTTTables]) {
    poly.chunks_mut(degree).zip(tables.iter()).for_each(|(component, table)| table.ntt_negacyclic(component));
}

pub fn intt_p(poly: &mut [u64], degree: usize, tables: &[NTTTables]) {
    poly.chunks_mut(degree).zip(tables.iter()).for_each(|(component, table)| table.inverse_ntt_negacyclic(component));
}

/// True when every component is fully reduced by its modulus.
pub fn is_reduced_p(poly: &[u64], degree: usize, moduli: &[Modulus]) -> bool {
    poly.len() == degree * moduli.len()
        && components(poly, degree, moduli).all(|(component, modulus)| component.iter().all(|x| *x < modulus.value()))
}
