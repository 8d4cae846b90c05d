//! RAS Category Engine
//!
//! Maps generalized (spin-orbital) occupation strings of a RAS space to sequential
//! addresses and back. The orbital set is split into RAS1, RAS2 and RAS3; every
//! configuration belongs to the category `(ih, ie)` given by its number of holes in
//! RAS1 and particles in RAS3. Categories are laid out one after another (`ie` outer,
//! `ih` inner) and inside a category the three subspace addresses are combined as
//! mixed-radix digits, RAS1 lowest.
//!
//! RAS1 is addressed through its holes: the complement of the RAS1 sub-string is
//! addressed and that address is mirrored (`C(n1, ih) - a + 1`) before being combined.

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::addressing::{AddressArray, InverseArray};
use crate::combinatorics::{
    checked_binomial, complement, count_occupied, uniform, validate_occupation, EMPTY, OCCUPIED,
};
use crate::error::{AddressingError, RasSubspace, Result};
use crate::gas::GasCategories;

/// The six integers defining a RAS determinant space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasParams {
    pub n_orb: usize,
    pub n_elec: usize,
    /// Maximum number of holes in RAS1
    pub max_hole: usize,
    pub n_ras1: usize,
    /// Maximum number of particles in RAS3
    pub max_elec: usize,
    pub n_ras3: usize,
}

impl RasParams {
    /// Complete active space: every orbital in RAS2
    pub fn cas(n_orb: usize, n_elec: usize) -> Self {
        Self {
            n_orb,
            n_elec,
            max_hole: 0,
            n_ras1: 0,
            max_elec: 0,
            n_ras3: 0,
        }
    }

    fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(AddressingError::InvalidParameters(msg));
        if self.max_elec > self.n_elec {
            return fail(format!(
                "max particles in RAS3 ({}) exceeds electron count ({})",
                self.max_elec, self.n_elec
            ));
        }
        if self.max_hole > self.n_ras1 {
            return fail(format!(
                "max holes in RAS1 ({}) exceeds RAS1 size ({})",
                self.max_hole, self.n_ras1
            ));
        }
        if self.max_elec > self.n_ras3 {
            return fail(format!(
                "max particles in RAS3 ({}) exceeds RAS3 size ({})",
                self.max_elec, self.n_ras3
            ));
        }
        if self.n_ras1 > self.n_elec {
            return fail(format!(
                "RAS1 size ({}) exceeds electron count ({})",
                self.n_ras1, self.n_elec
            ));
        }
        if self.n_ras1 + self.n_ras3 > self.n_orb {
            return fail(format!(
                "RAS1 + RAS3 sizes ({} + {}) exceed orbital count ({})",
                self.n_ras1, self.n_ras3, self.n_orb
            ));
        }
        if self.n_elec > self.n_orb {
            return fail(format!(
                "electron count ({}) exceeds orbital count ({})",
                self.n_elec, self.n_orb
            ));
        }
        Ok(())
    }
}

/// One `(holes, particles)` block of the configuration space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// `holes + (max_hole + 1) * particles`
    pub index: usize,
    /// Holes in RAS1
    pub holes: usize,
    /// Particles in RAS3
    pub particles: usize,
    /// Electrons left for RAS2, `None` when outside `[0, n2]`
    pub ras2_electrons: Option<usize>,
    /// Number of arrangements in RAS1, RAS2, RAS3
    pub multiplicities: [u64; 3],
    /// Mixed-radix weights `[1, m1, m1 * m2]`
    pub weights: [u64; 3],
    pub size: u64,
    /// Number of configurations in all preceding categories; `None` for empty categories
    pub offset: Option<u64>,
}

impl Category {
    pub fn is_valid(&self) -> bool {
        self.offset.is_some()
    }

    /// Electrons in RAS1, RAS2, RAS3
    pub fn occupations(&self, n_ras1: usize) -> Option<[usize; 3]> {
        let ras2 = self.ras2_electrons?;
        Some([n_ras1.checked_sub(self.holes)?, ras2, self.particles])
    }
}

#[derive(Debug, Clone)]
struct SubspaceArrays {
    z: AddressArray,
    zd: InverseArray,
}

/// Addressing engine for a generalized RAS determinant space
///
/// All tables are built by the constructor; addressing and de-addressing take `&self`
/// and never mutate, so one engine can serve many threads.
#[derive(Debug, Clone)]
pub struct RasAddrEngine {
    params: RasParams,
    /// RAS1, RAS2, RAS3 sizes
    noras: [usize; 3],
    /// Address arrays keyed by (electrons, orbitals)
    arrays: HashMap<(usize, usize), SubspaceArrays>,
    categories: Vec<Category>,
    /// Indices of valid categories, ascending by offset
    valid: Vec<usize>,
    n_configs: u64,
}

impl RasAddrEngine {
    /// Build a generalized engine
    pub fn new(params: RasParams) -> Result<Self> {
        Self::with_generalized(params, true)
    }

    /// Build an engine; `generalized == false` (spin-separated strings) is rejected
    pub fn with_generalized(params: RasParams, generalized: bool) -> Result<Self> {
        params.validate()?;
        if !generalized {
            return Err(AddressingError::NotImplemented(
                "restricted (spin-separated) RAS addressing",
            ));
        }

        let noras = [
            params.n_ras1,
            params.n_orb - params.n_ras1 - params.n_ras3,
            params.n_ras3,
        ];

        let mut engine = Self {
            params,
            noras,
            arrays: HashMap::new(),
            categories: Vec::new(),
            valid: Vec::new(),
            n_configs: 0,
        };
        engine.init_categories()?;
        engine.init_address_arrays()?;

        info!(
            n_orb = params.n_orb,
            n_elec = params.n_elec,
            ras = ?noras,
            max_hole = params.max_hole,
            max_elec = params.max_elec,
            n_categories = engine.valid.len(),
            n_configs = engine.n_configs,
            "RAS addressing engine ready"
        );
        Ok(engine)
    }

    /// Address arrays for the occupations the valid categories put in each subspace.
    /// Empty and full subspaces never consult an array and are skipped.
    fn init_address_arrays(&mut self) -> Result<()> {
        let needed: Vec<[usize; 3]> = self
            .valid_categories()
            .filter_map(|c| Some([c.holes, c.ras2_electrons?, c.particles]))
            .collect();

        for occ in needed {
            for (x, &ne) in occ.iter().enumerate() {
                let n = self.noras[x];
                if ne == 0 || ne == n || self.arrays.contains_key(&(ne, n)) {
                    continue;
                }
                if let Some(z) = AddressArray::build(ne, n)? {
                    debug!(
                        n_elec = ne,
                        n_orb = n,
                        n_strings = z.n_strings(),
                        "built address array"
                    );
                    let zd = z.inverse();
                    self.arrays.insert((ne, n), SubspaceArrays { z, zd });
                }
            }
        }
        Ok(())
    }

    fn init_categories(&mut self) -> Result<()> {
        let [n1, n2, n3] = self.noras;
        let n_cat = (self.params.max_hole + 1) * (self.params.max_elec + 1);
        self.categories = Vec::with_capacity(n_cat);

        for ie in 0..=self.params.max_elec {
            for ih in 0..=self.params.max_hole {
                let index = ih + (self.params.max_hole + 1) * ie;
                let ras2 = self.params.n_elec as i64 - n1 as i64 + ih as i64 - ie as i64;
                let ras2_electrons = if ras2 >= 0 && ras2 as usize <= n2 {
                    Some(ras2 as usize)
                } else {
                    None
                };

                let mut category = Category {
                    index,
                    holes: ih,
                    particles: ie,
                    ras2_electrons,
                    multiplicities: [0; 3],
                    weights: [0; 3],
                    size: 0,
                    offset: None,
                };

                // every subspace must hold its share, not only RAS2
                if let (Some(ne2), true, true) = (ras2_electrons, ih <= n1, ie <= n3) {
                    let m = [
                        checked_binomial(n1, ih)?,
                        checked_binomial(n2, ne2)?,
                        checked_binomial(n3, ie)?,
                    ];
                    let w2 = m[0]
                        .checked_mul(m[1])
                        .ok_or(AddressingError::Overflow { n: n2, k: ne2 })?;
                    let size = w2
                        .checked_mul(m[2])
                        .ok_or(AddressingError::Overflow { n: n3, k: ie })?;
                    category.multiplicities = m;
                    category.weights = [1, m[0], w2];
                    category.size = size;
                }

                if category.size != 0 {
                    category.offset = Some(self.n_configs);
                    self.n_configs = self
                        .n_configs
                        .checked_add(category.size)
                        .ok_or(AddressingError::Overflow {
                            n: self.params.n_orb,
                            k: self.params.n_elec,
                        })?;
                    self.valid.push(index);
                }
                self.categories.push(category);
            }
        }
        Ok(())
    }

    pub fn params(&self) -> &RasParams {
        &self.params
    }

    /// Sizes of RAS1, RAS2, RAS3
    pub fn subspace_sizes(&self) -> [usize; 3] {
        self.noras
    }

    /// Total number of configurations
    pub fn n_configs(&self) -> u64 {
        self.n_configs
    }

    /// Full category table, valid and empty, in enumeration order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn valid_categories(&self) -> impl Iterator<Item = &Category> + '_ {
        self.valid.iter().map(move |&i| &self.categories[i])
    }

    /// Address array for `n_elec` electrons in `n_orb` orbitals, if the engine built one
    pub fn address_array(&self, n_elec: usize, n_orb: usize) -> Option<&AddressArray> {
        self.arrays.get(&(n_elec, n_orb)).map(|a| &a.z)
    }

    fn split<'a>(&self, config: &'a str) -> [&'a str; 3] {
        let [n1, n2, _] = self.noras;
        [&config[..n1], &config[n1..n1 + n2], &config[n1 + n2..]]
    }

    fn arrays_for(&self, occ: usize, n: usize) -> Result<&SubspaceArrays> {
        self.arrays.get(&(occ, n)).ok_or_else(|| {
            AddressingError::Internal(format!(
                "no address array for {} electrons in {} orbitals",
                occ, n
            ))
        })
    }

    /// Subspace address; empty and full subspaces hold a single arrangement
    fn subspace_address(&self, x: usize, occ: usize, sub: &str) -> Result<u64> {
        let n = self.noras[x];
        if occ == 0 || occ == n {
            return Ok(1);
        }
        self.arrays_for(occ, n)?.z.address(sub)
    }

    fn subspace_string(&self, x: usize, occ: usize, addr: u64) -> Result<String> {
        let n = self.noras[x];
        if occ == 0 {
            return Ok(uniform(EMPTY, n));
        }
        if occ == n {
            return Ok(uniform(OCCUPIED, n));
        }
        let arrays = self.arrays_for(occ, n)?;
        arrays.z.de_address(addr, Some(&arrays.zd))
    }

    /// Address of an occupation string of length `n_orb` with `n_elec` ones
    ///
    /// # Errors
    /// Malformed strings, and strings with more RAS1 holes or RAS3 particles than allowed.
    pub fn addressing(&self, config: &str) -> Result<u64> {
        validate_occupation(config, self.params.n_orb)?;
        let n_occ = count_occupied(config);
        if n_occ != self.params.n_elec {
            return Err(AddressingError::ElectronCountMismatch {
                expected: self.params.n_elec,
                actual: n_occ,
            });
        }

        let [ras1, ras2, ras3] = self.split(config);
        let ras1_holes = complement(ras1);
        let subs = [ras1_holes.as_str(), ras2, ras3];
        let occ = [count_occupied(subs[0]), count_occupied(subs[1]), count_occupied(subs[2])];

        if occ[0] > self.params.max_hole {
            return Err(AddressingError::OccupationLimit {
                subspace: RasSubspace::Ras1,
                count: occ[0],
                limit: self.params.max_hole,
            });
        }
        if occ[2] > self.params.max_elec {
            return Err(AddressingError::OccupationLimit {
                subspace: RasSubspace::Ras3,
                count: occ[2],
                limit: self.params.max_elec,
            });
        }

        let index = occ[0] + (self.params.max_hole + 1) * occ[2];
        let category = &self.categories[index];
        let offset = category.offset.ok_or(AddressingError::InvalidCategory { index })?;

        let mut addr = [0u64; 3];
        for x in 0..3 {
            addr[x] = self.subspace_address(x, occ[x], subs[x])?;
        }
        // mirror the hole address of RAS1
        addr[0] = category.multiplicities[0] - addr[0] + 1;

        let intra: u64 = addr
            .iter()
            .zip(category.weights.iter())
            .map(|(&a, &w)| (a - 1) * w)
            .sum();
        Ok(1 + offset + intra)
    }

    /// Locate the valid category containing `address`
    fn find_category(&self, address: u64) -> Result<&Category> {
        let pos = self
            .valid
            .partition_point(|&i| self.categories[i].offset.map_or(false, |off| off < address));
        if pos == 0 {
            return Err(AddressingError::Internal(format!(
                "address {} precedes the first category",
                address
            )));
        }
        let category = &self.categories[self.valid[pos - 1]];
        if !category.is_valid() {
            return Err(AddressingError::InvalidCategory { index: category.index });
        }
        Ok(category)
    }

    /// RAS1, RAS2 and RAS3 sub-strings of the configuration with address `address`
    pub fn de_addressing(&self, address: u64) -> Result<[String; 3]> {
        if address == 0 || address > self.n_configs {
            return Err(AddressingError::AddressOutOfRange {
                address,
                max: self.n_configs,
            });
        }

        let category = self.find_category(address)?;
        let invalid = AddressingError::InvalidCategory {
            index: category.index,
        };
        let offset = category.offset.ok_or_else(|| invalid.clone())?;
        let ras2 = category.ras2_electrons.ok_or(invalid)?;
        let occ = [category.holes, ras2, category.particles];

        let mut remaining = address - offset - 1;
        let mut addr = [0u64; 3];
        for x in (0..3).rev() {
            let w = category.weights[x];
            addr[x] = remaining / w + 1;
            remaining -= (addr[x] - 1) * w;
        }
        addr[0] = category.multiplicities[0] - addr[0] + 1;

        let holes = self.subspace_string(0, occ[0], addr[0])?;
        Ok([
            complement(&holes),
            self.subspace_string(1, occ[1], addr[1])?,
            self.subspace_string(2, occ[2], addr[2])?,
        ])
    }

    /// Full-length occupation string of the configuration with address `address`
    pub fn de_addressing_joined(&self, address: u64) -> Result<String> {
        Ok(self.de_addressing(address)?.concat())
    }

    /// Addresses of many configurations, in input order
    pub fn addressing_batch<S: AsRef<str> + Sync>(&self, configs: &[S]) -> Result<Vec<u64>> {
        configs.par_iter().map(|c| self.addressing(c.as_ref())).collect()
    }

    /// Joined configurations of many addresses, in input order
    pub fn de_addressing_batch(&self, addresses: &[u64]) -> Result<Vec<String>> {
        addresses
            .par_iter()
            .map(|&a| self.de_addressing_joined(a))
            .collect()
    }

    /// Valid categories as GAS occupation vectors over (RAS1, RAS2, RAS3)
    pub fn gas_categories(&self) -> Result<GasCategories> {
        let occupations: Vec<Vec<usize>> = self
            .valid_categories()
            .filter_map(|c| c.occupations(self.noras[0]).map(|o| o.to_vec()))
            .collect();
        GasCategories::from_occupations(self.noras.to_vec(), occupations, Some(self.params.n_elec))
    }
}
