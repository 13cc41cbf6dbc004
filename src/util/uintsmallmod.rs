use crate::modulus::Modulus;

/** `operand` must be at most modulus */
#[inline]
pub fn negate_u64_mod(operand: u64, modulus: &Modulus) -> u64 {
    if operand == 0 {0} else {modulus.value() - operand}
}

/** Both operands must be less than modulus. */
#[inline]
pub fn add_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    let sum = operand1 + operand2;
    if sum >= modulus.value() {sum - modulus.value()} else {sum}
}

/** Both operands must be less than modulus. */
#[inline]
pub fn sub_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    if operand1 >= operand2 {operand1 - operand2}
    else {operand1 + (modulus.value() - operand2)}
}

#[inline]
pub fn multiply_u64_mod(operand1: u64, operand2: u64, modulus: &Modulus) -> u64 {
    modulus.reduce_u128(operand1 as u128 * operand2 as u128)
}

#[inline]
pub fn multiply_add_u64_mod(operand1: u64, operand2: u64, operand3: u64, modulus: &Modulus) -> u64 {
    modulus.reduce_u128(operand1 as u128 * operand2 as u128 + operand3 as u128)
}

pub fn exponentiate_u64_mod(operand: u64, mut exponent: u64, modulus: &Modulus) -> u64 {
    if exponent == 0 {return 1 % modulus.value();}
    if exponent == 1 {return modulus.reduce(operand);}
    let mut power = modulus.reduce(operand);
    let mut product = 1 % modulus.value();
    while exponent > 0 {
        if (exponent & 1) > 0 {
            product = multiply_u64_mod(power, product, modulus);
        }
        exponent >>= 1;
        if exponent > 0 {
            power = multiply_u64_mod(power, power, modulus);
        }
    }
    product
}

pub fn try_invert_u64_mod(operand: u64, modulus: &Modulus) -> Option<u64> {
    super::try_invert_u64_mod_u64(operand, modulus.value())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_mod_arith() {
        let modulus = Modulus::new(17);
        assert_eq!(negate_u64_mod(0, &modulus), 0);
        assert_eq!(negate_u64_mod(3, &modulus), 14);
        assert_eq!(add_u64_mod(10, 9, &modulus), 2);
        assert_eq!(sub_u64_mod(3, 5, &modulus), 15);
        assert_eq!(multiply_u64_mod(16, 16, &modulus), 1);
        assert_eq!(multiply_add_u64_mod(4, 5, 3, &modulus), 6);
        assert_eq!(exponentiate_u64_mod(3, 16, &modulus), 1);
        assert_eq!(exponentiate_u64_mod(3, 8, &modulus), 16);
        assert_eq!(try_invert_u64_mod(3, &modulus), Some(6));
        assert_eq!(try_invert_u64_mod(0, &modulus), None);
    }

    #[test]
    fn test_large_mod_arith() {
        let modulus = Modulus::new(0x0fffffffffc0001);
        let a = modulus.value() - 1;
        assert_eq!(multiply_u64_mod(a, a, &modulus), 1);
        assert_eq!(add_u64_mod(a, a, &modulus), a - 1);
    }
}
