//! Configuration-interaction string addressing
//!
//! Maps occupation bit-strings of restricted active spaces to dense 1-based
//! addresses and back, with counting helpers for CAS/RAS/GAS spaces and a reader
//! for RASCI output logs.

pub mod addressing;
pub mod combinatorics;
pub mod config;
pub mod error;
pub mod gas;
pub mod log_reader;
pub mod ras;
pub mod report;

#[cfg(feature = "python")]
mod python_bindings;

pub use addressing::{AddressArray, InverseArray};
pub use config::{EngineConfig, OrbitalGroup, ReportConfig};
pub use error::{AddressingError, Error, RasSubspace};
pub use gas::{ExcitationGraph, GasCategories};
pub use log_reader::{CoefficientKey, RasciStates, StateRecord};
pub use ras::{Category, RasAddrEngine, RasParams};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn _rucie(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    python_bindings::register_addressing_module(m)?;
    Ok(())
}
