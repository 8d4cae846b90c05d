//! TOML configuration
//!
//! Engine parameters and report options as they appear in a configuration file:
//!
//! ```text
//! generalized = true
//!
//! [cas]
//! n_elec = 3
//! n_orb = 6
//!
//! [ras]
//! max_hole = 1
//! n_ras1 = 2
//! max_elec = 1
//! n_ras3 = 2
//! ```
//!
//! A missing `[ras]` table means a plain CAS (everything in RAS2).

use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AddressingError, Error};
use crate::ras::{RasAddrEngine, RasParams};

/// Active-space size
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasSpec {
    pub n_elec: usize,
    pub n_orb: usize,
}

/// RAS restrictions; all zero is an unrestricted CAS
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RasSpec {
    pub max_hole: usize,
    pub n_ras1: usize,
    pub max_elec: usize,
    pub n_ras3: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    #[serde(default = "default_generalized")]
    pub generalized: bool,
    pub cas: CasSpec,
    #[serde(default)]
    pub ras: RasSpec,
}

fn default_generalized() -> bool {
    true
}

/// Read a TOML file, normalizing line endings
fn read_toml(path: &Path) -> Result<String, Error> {
    let content = read_to_string(path)?;
    Ok(content.replace("\r\n", "\n"))
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_toml_str(&read_toml(path)?)
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn params(&self) -> RasParams {
        RasParams {
            n_orb: self.cas.n_orb,
            n_elec: self.cas.n_elec,
            max_hole: self.ras.max_hole,
            n_ras1: self.ras.n_ras1,
            max_elec: self.ras.max_elec,
            n_ras3: self.ras.n_ras3,
        }
    }

    pub fn build_engine(&self) -> Result<RasAddrEngine, AddressingError> {
        RasAddrEngine::with_generalized(self.params(), self.generalized)
    }
}

impl From<RasParams> for EngineConfig {
    fn from(p: RasParams) -> Self {
        Self {
            generalized: true,
            cas: CasSpec {
                n_elec: p.n_elec,
                n_orb: p.n_orb,
            },
            ras: RasSpec {
                max_hole: p.max_hole,
                n_ras1: p.n_ras1,
                max_elec: p.max_elec,
                n_ras3: p.n_ras3,
            },
        }
    }
}

/// Named set of orbitals whose electrons are counted together in reports
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrbitalGroup {
    pub name: String,
    /// 1-based orbital indices
    pub orbitals: Vec<usize>,
}

impl OrbitalGroup {
    /// Electrons of `config` sitting in this group's orbitals; indices past the end count as empty
    pub fn count_electrons(&self, config: &str) -> usize {
        let bytes = config.as_bytes();
        self.orbitals
            .iter()
            .filter(|&&i| i >= 1 && bytes.get(i - 1) == Some(&crate::combinatorics::OCCUPIED))
            .count()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum |C|^2 of a listed coefficient
    pub threshold: f64,
    /// Coefficients read per state
    pub max_coeffs: usize,
    pub groups: Vec<OrbitalGroup>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            max_coeffs: 50,
            groups: Vec::new(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_toml_str(&read_toml(path)?)
    }
}
