//! Combinatorial Helper Module
//!
//! Exact binomial coefficients, configuration counts for CAS/GAS/RAS spaces and
//! helpers for occupation bit-strings written with the symbols '0' and '1'.

use crate::error::{AddressingError, Result};

/// Symbol of an occupied spin-orbital
pub const OCCUPIED: u8 = b'1';

/// Symbol of an empty spin-orbital
pub const EMPTY: u8 = b'0';

/// Exact binomial coefficient C(n, k)
///
/// # Returns
/// * `Some(0)` when `k > n`
/// * `None` when the result does not fit in `u64`
///
/// # Examples
/// ```text
/// binomial(4, 2)  => Some(6)
/// binomial(2, 3)  => Some(0)
/// binomial(0, 0)  => Some(1)
/// ```
pub fn binomial(n: usize, k: usize) -> Option<u64> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc * (n - i) is divisible by (i + 1) at every step
        acc = acc.checked_mul((n - i) as u128)? / (i as u128 + 1);
    }
    u64::try_from(acc).ok()
}

/// Binomial coefficient that reports overflow as an [`AddressingError`]
pub fn checked_binomial(n: usize, k: usize) -> Result<u64> {
    binomial(n, k).ok_or(AddressingError::Overflow { n, k })
}

/// Binomial coefficient with a signed lower index; negative `k` counts zero arrangements
fn signed_binomial(n: usize, k: i64) -> Result<u64> {
    if k < 0 {
        return Ok(0);
    }
    checked_binomial(n, k as usize)
}

fn checked_mul(a: u64, b: u64, n: usize, k: usize) -> Result<u64> {
    a.checked_mul(b).ok_or(AddressingError::Overflow { n, k })
}

/// Number of determinants of `ne` electrons in `no` spin-orbitals
pub fn count_ghf_cas(no: usize, ne: usize) -> Result<u64> {
    checked_binomial(no, ne)
}

/// Number of determinants of `ne` electrons in `no` spatial orbitals with equal
/// alpha and beta electron counts
pub fn count_rhf_cas(no: usize, ne: usize) -> Result<u64> {
    let per_spin = checked_binomial(no, ne / 2)?;
    checked_mul(per_spin, per_spin, no, ne / 2)
}

/// Size of one GAS category: the product of C(nos[i], nes[i]) over all spaces
///
/// # Examples
/// ```text
/// count_ghf_gas_category(&[2, 2, 2], &[1, 1, 1]) => Ok(8)
/// count_ghf_gas_category(&[2, 2], &[3, 0])       => Ok(0)
/// ```
pub fn count_ghf_gas_category(nos: &[usize], nes: &[usize]) -> Result<u64> {
    if nos.len() != nes.len() {
        return Err(AddressingError::LengthMismatch {
            expected: nos.len(),
            actual: nes.len(),
        });
    }
    nos.iter().zip(nes).try_fold(1u64, |acc, (&n, &k)| {
        let c = checked_binomial(n, k)?;
        checked_mul(acc, c, n, k)
    })
}

/// Size of the RAS category with `ih` holes and `ie` particles, given the electron
/// count `ne` of one spin (or of the whole generalized string)
fn ras_category_count(nos: [usize; 3], ne: usize, ih: usize, ie: usize) -> Result<u64> {
    let in_ras1 = nos[0] as i64 - ih as i64;
    let in_ras2 = ne as i64 - nos[0] as i64 + ih as i64 - ie as i64;
    let mut acc = signed_binomial(nos[0], in_ras1)?;
    acc = checked_mul(acc, signed_binomial(nos[1], in_ras2)?, nos[1], in_ras2.max(0) as usize)?;
    checked_mul(acc, checked_binomial(nos[2], ie)?, nos[2], ie)
}

/// Total number of generalized determinants in a RAS space
///
/// # Arguments
/// * `mh` - Maximum number of holes in RAS1
/// * `me` - Maximum number of particles in RAS3
/// * `nos` - Orbital counts of RAS1, RAS2, RAS3
/// * `ne` - Number of electrons
pub fn count_ghf_ras(mh: usize, me: usize, nos: [usize; 3], ne: usize) -> Result<u64> {
    let mut total = 0u64;
    for ih in 0..=mh {
        for ie in 0..=me {
            total = total
                .checked_add(ras_category_count(nos, ne, ih, ie)?)
                .ok_or(AddressingError::Overflow { n: ne, k: ih })?;
        }
    }
    Ok(total)
}

/// Total number of spin-separated determinants in a RAS space
///
/// Hole and particle limits apply to the alpha and beta strings together.
pub fn count_rhf_ras(
    mh: usize,
    me: usize,
    nos: [usize; 3],
    ne_a: usize,
    ne_b: usize,
) -> Result<u64> {
    let mut total = 0u64;
    for ih_a in 0..=mh {
        for ie_a in 0..=me {
            let alpha = ras_category_count(nos, ne_a, ih_a, ie_a)?;
            if alpha == 0 {
                continue;
            }
            for ih_b in 0..=(mh - ih_a) {
                for ie_b in 0..=(me - ie_a) {
                    let beta = ras_category_count(nos, ne_b, ih_b, ie_b)?;
                    let pair = checked_mul(alpha, beta, ne_a, ne_b)?;
                    total = total
                        .checked_add(pair)
                        .ok_or(AddressingError::Overflow { n: ne_a, k: ne_b })?;
                }
            }
        }
    }
    Ok(total)
}

/// Check that `config` has `expected_len` symbols, all of them '0' or '1'
pub fn validate_occupation(config: &str, expected_len: usize) -> Result<()> {
    if let Some((position, symbol)) = config
        .chars()
        .enumerate()
        .find(|&(_, c)| c != '0' && c != '1')
    {
        return Err(AddressingError::InvalidSymbol { symbol, position });
    }
    if config.len() != expected_len {
        return Err(AddressingError::LengthMismatch {
            expected: expected_len,
            actual: config.len(),
        });
    }
    Ok(())
}

/// Number of occupied orbitals in a validated occupation string
pub fn count_occupied(config: &str) -> usize {
    config.bytes().filter(|&b| b == OCCUPIED).count()
}

/// Swap particles and holes
///
/// # Examples
/// ```text
/// complement("1100") => "0011"
/// ```
pub fn complement(config: &str) -> String {
    config
        .bytes()
        .map(|b| if b == OCCUPIED { EMPTY as char } else { OCCUPIED as char })
        .collect()
}

/// Uniform string of `len` copies of `symbol`
pub fn uniform(symbol: u8, len: usize) -> String {
    std::iter::repeat(symbol as char).take(len).collect()
}
