//! GAS category bookkeeping
//!
//! Counting-only view of a generalized active space: an explicit list of categories,
//! each an occupation vector over the spaces, with its size, its start pointer in the
//! concatenated configuration list and the single-excitation connectivity between
//! categories.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::warn;

use crate::combinatorics::count_ghf_gas_category;
use crate::error::{AddressingError, Result};

/// Single-excitation connectivity between categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcitationGraph {
    /// Spaces with at least one electron, per category (the diagonal entries)
    occupied: Vec<Vec<usize>>,
    /// `links[i][j] = (from, to)`: moving one electron from space `from` to space `to`
    /// turns category `i` into category `j`
    links: Vec<BTreeMap<usize, (usize, usize)>>,
}

impl ExcitationGraph {
    fn build(occupations: &[Vec<usize>]) -> Self {
        let n = occupations.len();
        let occupied = occupations
            .iter()
            .map(|occ| (0..occ.len()).filter(|&x| occ[x] != 0).collect())
            .collect();

        let mut links = vec![BTreeMap::new(); n];
        for i in 0..n {
            for j in (i + 1)..n {
                let diff: Vec<i64> = occupations[i]
                    .iter()
                    .zip(&occupations[j])
                    .map(|(&a, &b)| b as i64 - a as i64)
                    .collect();
                if diff.iter().map(|d| d.abs()).sum::<i64>() != 2 {
                    continue;
                }
                let gain = diff.iter().position(|&d| d == 1);
                let lose = diff.iter().position(|&d| d == -1);
                if let (Some(gain), Some(lose)) = (gain, lose) {
                    links[i].insert(j, (lose, gain));
                    links[j].insert(i, (gain, lose));
                }
            }
        }
        Self { occupied, links }
    }

    pub fn occupied_spaces(&self, category: usize) -> &[usize] {
        &self.occupied[category]
    }

    /// `(from, to)` spaces of the single excitation taking `i` to `j`
    pub fn excitation(&self, i: usize, j: usize) -> Option<(usize, usize)> {
        self.links.get(i)?.get(&j).copied()
    }

    pub fn neighbors(&self, category: usize) -> impl Iterator<Item = usize> + '_ {
        self.links[category].keys().copied()
    }
}

/// Explicit category list of a GAS space
#[derive(Debug, Clone)]
pub struct GasCategories {
    orbitals: Vec<usize>,
    n_elec: usize,
    occupations: Vec<Vec<usize>>,
    sizes: Vec<u64>,
    starts: Vec<u64>,
    n_configs: u64,
    graph: ExcitationGraph,
}

impl GasCategories {
    /// Build the category table
    ///
    /// # Arguments
    /// * `orbitals` - Number of orbitals in each space
    /// * `occupations` - Electrons in each space, one vector per category
    /// * `n_elec` - Total electron count; taken from the first category when `None`
    ///
    /// Duplicate categories are skipped with a warning. A category placing more
    /// electrons in any space than it has orbitals is rejected.
    pub fn from_occupations(
        orbitals: Vec<usize>,
        occupations: Vec<Vec<usize>>,
        n_elec: Option<usize>,
    ) -> Result<Self> {
        if orbitals.is_empty() {
            return Err(AddressingError::InvalidParameters("no orbital spaces given".to_string()));
        }
        let n_elec = match n_elec {
            Some(n) => n,
            None => occupations.first().map(|occ| occ.iter().sum()).ok_or_else(|| {
                AddressingError::InvalidParameters("no categories given".to_string())
            })?,
        };
        let n_orb: usize = orbitals.iter().sum();
        if n_orb < n_elec {
            return Err(AddressingError::InvalidParameters(format!(
                "{} electrons do not fit in {} orbitals",
                n_elec, n_orb
            )));
        }

        let mut seen = BTreeSet::new();
        let mut kept = Vec::with_capacity(occupations.len());
        for (i, occ) in occupations.into_iter().enumerate() {
            if occ.len() != orbitals.len() {
                return Err(AddressingError::LengthMismatch {
                    expected: orbitals.len(),
                    actual: occ.len(),
                });
            }
            let total: usize = occ.iter().sum();
            if total != n_elec {
                return Err(AddressingError::ElectronCountMismatch {
                    expected: n_elec,
                    actual: total,
                });
            }
            if let Some(x) = (0..occ.len()).find(|&x| occ[x] > orbitals[x]) {
                return Err(AddressingError::InvalidParameters(format!(
                    "category {} puts {} electrons in space {} of {} orbitals",
                    i, occ[x], x, orbitals[x]
                )));
            }
            if !seen.insert(occ.clone()) {
                warn!(category = i, occupation = ?occ, "skipping redundant category");
                continue;
            }
            kept.push(occ);
        }

        let mut sizes = Vec::with_capacity(kept.len());
        let mut starts = Vec::with_capacity(kept.len());
        let mut n_configs = 0u64;
        for occ in &kept {
            let size = count_ghf_gas_category(&orbitals, occ)?;
            starts.push(n_configs);
            sizes.push(size);
            n_configs = n_configs
                .checked_add(size)
                .ok_or(AddressingError::Overflow { n: n_orb, k: n_elec })?;
        }

        let graph = ExcitationGraph::build(&kept);
        Ok(Self {
            orbitals,
            n_elec,
            occupations: kept,
            sizes,
            starts,
            n_configs,
            graph,
        })
    }

    pub fn orbitals(&self) -> &[usize] {
        &self.orbitals
    }

    pub fn n_elec(&self) -> usize {
        self.n_elec
    }

    pub fn n_spaces(&self) -> usize {
        self.orbitals.len()
    }

    pub fn n_categories(&self) -> usize {
        self.occupations.len()
    }

    pub fn n_configs(&self) -> u64 {
        self.n_configs
    }

    pub fn occupations(&self) -> &[Vec<usize>] {
        &self.occupations
    }

    pub fn sizes(&self) -> &[u64] {
        &self.sizes
    }

    /// 0-based position of each category's first configuration
    pub fn starts(&self) -> &[u64] {
        &self.starts
    }

    pub fn graph(&self) -> &ExcitationGraph {
        &self.graph
    }

    /// Categories grouped by excitation distance from category 0
    ///
    /// Level 0 is the reference, level 1 its single-excitation neighbors and so on.
    /// Categories unreachable from the reference are not listed.
    pub fn excitation_levels(&self) -> Vec<Vec<usize>> {
        let n = self.n_categories();
        if n == 0 {
            return Vec::new();
        }
        let mut level_of = vec![None; n];
        level_of[0] = Some(0usize);
        let mut queue = VecDeque::from([0usize]);
        while let Some(i) = queue.pop_front() {
            let next = level_of[i].map_or(0, |l| l + 1);
            for j in self.graph.neighbors(i) {
                if level_of[j].is_none() {
                    level_of[j] = Some(next);
                    queue.push_back(j);
                }
            }
        }

        let depth = level_of.iter().flatten().max().map_or(0, |&d| d + 1);
        let mut levels = vec![Vec::new(); depth];
        for (i, level) in level_of.iter().enumerate() {
            if let Some(l) = level {
                levels[*l].push(i);
            }
        }
        levels
    }
}
