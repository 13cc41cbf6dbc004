/**
Arithmetic of the number structure that specializes a [DWTHandler].
*/
pub trait Arithmetic: Clone {

    type Value;
    type Root;
    type Scalar;

    fn add(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul_root(&self, a: &Self::Value, r: &Self::Root) -> Self::Value;
    fn mul_scalar(&self, a: &Self::Value, s: &Self::Scalar) -> Self::Value;

}

/**
Fast discrete weighted transform (DWT) and its inverse, generic over the arithmetic.

Specialized with modular arithmetic it is the negacyclic NTT used for polynomial
multiplication; specialized with complex arithmetic it is the FFT behind the CKKS
canonical embedding. The forward transform consumes powers of a primitive 2n-th
root in bit-reversed order and produces output in bit-reversed order
(Cooley-Tukey butterflies). The inverse consumes bit-reversed input with the
inverse root powers stored so that the i-th slot holds the
(reverse_bits(i - 1) + 1)-th power (Gentleman-Sande butterflies), and folds the
final scaling into one pass.
*/
#[derive(Clone)]
pub struct DWTHandler<A: Arithmetic> {
    arithmetic: A
}

impl<A: Arithmetic> DWTHandler<A> {

    pub fn new(arithmetic: &A) -> Self {
        Self {arithmetic: arithmetic.clone()}
    }

    pub fn transform_to_rev(
        &self,
        values: &mut [A::Value],
        log_n: usize,
        roots: &[A::Root],
        scalar: Option<&A::Scalar>
    ) {
        let n = 1 << log_n;
        for layer in 0..log_n {
            let m = 1 << layer;
            let gap = n >> (1 + layer);
            for (block, r) in values.chunks_mut(gap << 1).zip(roots[m..2 * m].iter()) {
                let (left, right) = block.split_at_mut(gap);
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    let v = self.arithmetic.mul_root(y, r);
                    let u = self.arithmetic.add(x, &v);
                    *y = self.arithmetic.sub(x, &v);
                    *x = u;
                }
            }
        }
        if let Some(scalar) = scalar {
            for value in values.iter_mut() {
                *value = self.arithmetic.mul_scalar(value, scalar);
            }
        }
    }

    pub fn transform_from_rev(
        &self,
        values: &mut [A::Value],
        log_n: usize,
        roots: &[A::Root],
        scalar: Option<&A::Scalar>
    ) {
        let n = 1 << log_n;
        for layer in 0..log_n {
            let gap = 1 << layer;
            let m = n >> (1 + layer);
            for (block, r) in values.chunks_mut(gap << 1).zip(roots[n - 2 * m + 1..n - m + 1].iter()) {
                let (left, right) = block.split_at_mut(gap);
                for (x, y) in left.iter_mut().zip(right.iter_mut()) {
                    let u = self.arithmetic.add(x, y);
                    let v = self.arithmetic.sub(x, y);
                    *x = u;
                    *y = self.arithmetic.mul_root(&v, r);
                }
            }
        }
        if let Some(scalar) = scalar {
            for value in values.iter_mut() {
                *value = self.arithmetic.mul_scalar(value, scalar);
            }
        }
    }

}
