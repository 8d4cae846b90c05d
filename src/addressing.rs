//! Graph Addressing Module
//!
//! Vertex-weight addressing of occupation strings inside a single complete
//! (CAS-like) space. For `ne` electrons in `no` orbitals the address array `Z`
//! is an `ne x no` table such that the 1-based address of a string is
//! `1 + sum Z[k-1][io]` over its occupied positions `io`, `k` being the number
//! of electrons up to and including `io`. Strings are ordered reverse
//! lexicographically: "1100" is 1 and "0011" is C(4, 2).

use ndarray::{Array2, ArrayView2};

use crate::combinatorics::{checked_binomial, count_occupied, validate_occupation, EMPTY, OCCUPIED};
use crate::error::{AddressingError, Result};

/// Address array `Z(ne, no)` for one complete subspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressArray {
    z: Array2<u64>,
    n_strings: u64,
}

/// Inverse-search array `Zd(ne, no)` derived from an [`AddressArray`]
///
/// The last row equals the last row of `Z`; every earlier row is `Z`'s row plus the
/// following `Zd` row shifted left by one position (cyclically).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InverseArray {
    zd: Array2<u64>,
}

impl AddressArray {
    /// Build the address array for `n_elec` electrons in `n_orb` orbitals
    ///
    /// # Returns
    /// * `Ok(None)` - `n_elec == 0`; the space holds one string whose address is always 1
    /// * `Ok(Some(z))` - the address array
    /// * `Err` - `n_elec > n_orb` or the space is too large to count in `u64`
    pub fn build(n_elec: usize, n_orb: usize) -> Result<Option<Self>> {
        if n_elec > n_orb {
            return Err(AddressingError::InvalidParameters(format!(
                "cannot place {} electrons in {} orbitals",
                n_elec, n_orb
            )));
        }
        if n_elec == 0 {
            return Ok(None);
        }
        let n_strings = checked_binomial(n_orb, n_elec)?;

        let (ne, no) = (n_elec, n_orb);
        let mut z = Array2::<u64>::zeros((ne, no));
        for k in 1..ne {
            for l in k..=(no - ne + k) {
                let mut weight = 0u64;
                for m in (no - l + 1)..=(no - k) {
                    weight += checked_binomial(m - 1, ne - k)?;
                }
                z[(k - 1, l - 1)] = weight;
            }
        }
        for l in ne..=no {
            z[(ne - 1, l - 1)] = (l - ne) as u64;
        }

        Ok(Some(Self { z, n_strings }))
    }

    pub fn n_elec(&self) -> usize {
        self.z.nrows()
    }

    pub fn n_orb(&self) -> usize {
        self.z.ncols()
    }

    /// Number of strings encoded by this array, C(no, ne)
    pub fn n_strings(&self) -> u64 {
        self.n_strings
    }

    pub fn weights(&self) -> ArrayView2<'_, u64> {
        self.z.view()
    }

    /// 1-based address of `config` inside this subspace
    ///
    /// # Errors
    /// Symbols other than '0'/'1', wrong length or wrong number of electrons.
    pub fn address(&self, config: &str) -> Result<u64> {
        validate_occupation(config, self.n_orb())?;
        let n_occ = count_occupied(config);
        if n_occ != self.n_elec() {
            return Err(AddressingError::ElectronCountMismatch {
                expected: self.n_elec(),
                actual: n_occ,
            });
        }

        let mut addr = 1u64;
        let mut ie = 0usize;
        for (io, b) in config.bytes().enumerate() {
            if b == OCCUPIED {
                ie += 1;
                addr += self.z[(ie - 1, io)];
            }
        }
        Ok(addr)
    }

    /// Derive the inverse-search array used by [`AddressArray::de_address`]
    pub fn inverse(&self) -> InverseArray {
        if self.n_elec() == 1 {
            return InverseArray { zd: self.z.clone() };
        }

        let (ne, no) = self.z.dim();
        let mut zd = Array2::<u64>::zeros((ne, no));
        zd.row_mut(ne - 1).assign(&self.z.row(ne - 1));
        for k in (0..ne - 1).rev() {
            for j in 0..no {
                zd[(k, j)] = zd[(k + 1, (j + 1) % no)] + self.z[(k, j)];
            }
        }
        InverseArray { zd }
    }

    /// Reconstruct the string with 1-based address `addr`
    ///
    /// `inverse` may carry a prebuilt [`InverseArray`]; otherwise one is derived on the fly.
    ///
    /// Electron levels are resolved in increasing order. For each level the
    /// orbital window is scanned from high to low and the first position whose
    /// `Zd` weight does not exceed the remaining address is occupied. The upper
    /// end of the window moves up by one and the lower end moves to the chosen
    /// position after every level.
    pub fn de_address(&self, addr: u64, inverse: Option<&InverseArray>) -> Result<String> {
        if addr == 0 || addr > self.n_strings {
            return Err(AddressingError::AddressOutOfRange {
                address: addr,
                max: self.n_strings,
            });
        }

        let derived;
        let zd = match inverse {
            Some(inv) => {
                if inv.zd.dim() != self.z.dim() {
                    return Err(AddressingError::InvalidParameters(format!(
                        "inverse array shape {:?} does not match address array shape {:?}",
                        inv.zd.dim(),
                        self.z.dim()
                    )));
                }
                &inv.zd
            }
            None => {
                derived = self.inverse();
                &derived.zd
            }
        };

        let (ne, no) = self.z.dim();
        let mut config = vec![EMPTY; no];
        let mut remaining = addr - 1;
        // window is (lower, upper], lower == None meaning below position 0
        let mut upper = no - ne;
        let mut lower: Option<usize> = None;

        for ie in 0..ne {
            let start = lower.map_or(0, |l| l + 1);
            let chosen = (start..=upper).rev().find(|&io| remaining >= zd[(ie, io)]);
            match chosen {
                Some(io) => {
                    config[io] = OCCUPIED;
                    remaining -= self.z[(ie, io)];
                    upper += 1;
                    lower = Some(io);
                }
                None => {
                    return Err(AddressingError::Internal(format!(
                        "no orbital found for electron {} of address {}",
                        ie + 1,
                        addr
                    )));
                }
            }
        }

        if remaining != 0 {
            return Err(AddressingError::Internal(format!(
                "address {} left residue {} after de-addressing",
                addr, remaining
            )));
        }

        String::from_utf8(config).map_err(|e| AddressingError::Internal(e.to_string()))
    }
}

impl InverseArray {
    pub fn weights(&self) -> ArrayView2<'_, u64> {
        self.zd.view()
    }
}
