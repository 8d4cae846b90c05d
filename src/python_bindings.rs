//! Python bindings for the addressing engine, counting helpers and log report

use std::path::Path;

use pyo3::exceptions::{PyIOError, PyNotImplementedError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use pyo3::IntoPyObjectExt;

use crate::combinatorics;
use crate::config::OrbitalGroup;
use crate::error::{AddressingError, Error};
use crate::log_reader::RasciStates;
use crate::ras::{RasAddrEngine, RasParams};

fn addressing_err(e: AddressingError) -> PyErr {
    match e {
        AddressingError::NotImplemented(_) => PyNotImplementedError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

fn crate_err(e: Error) -> PyErr {
    match e {
        Error::Addressing(inner) => addressing_err(inner),
        Error::Io(_) => PyIOError::new_err(e.to_string()),
        _ => PyValueError::new_err(e.to_string()),
    }
}

/// RAS configuration addressing engine
///
/// Args:
/// - norb: Number of active spin-orbitals
/// - nelec: Number of active electrons
/// - mxhole: Maximum holes in RAS1
/// - noras1: Number of RAS1 orbitals
/// - mxelec: Maximum particles in RAS3
/// - noras3: Number of RAS3 orbitals
/// - ghf: Generalized (spin-orbital) strings; `False` raises NotImplementedError
#[pyclass(name = "RASAddrEngine")]
pub struct PyRasAddrEngine {
    engine: RasAddrEngine,
}

#[pymethods]
impl PyRasAddrEngine {
    #[new]
    #[pyo3(signature = (norb, nelec, mxhole=0, noras1=0, mxelec=0, noras3=0, ghf=true))]
    fn new(
        py: Python,
        norb: usize,
        nelec: usize,
        mxhole: usize,
        noras1: usize,
        mxelec: usize,
        noras3: usize,
        ghf: bool,
    ) -> PyResult<Self> {
        let params = RasParams {
            n_orb: norb,
            n_elec: nelec,
            max_hole: mxhole,
            n_ras1: noras1,
            max_elec: mxelec,
            n_ras3: noras3,
        };
        let engine = py
            .detach(|| RasAddrEngine::with_generalized(params, ghf))
            .map_err(addressing_err)?;
        Ok(Self { engine })
    }

    /// Total number of configurations
    #[getter]
    fn n_configs(&self) -> u64 {
        self.engine.n_configs()
    }

    /// Sizes of RAS1, RAS2 and RAS3
    #[getter]
    fn noras(&self) -> (usize, usize, usize) {
        let [n1, n2, n3] = self.engine.subspace_sizes();
        (n1, n2, n3)
    }

    /// 1-based address of an occupation string such as "110100"
    fn addressing(&self, config: &str) -> PyResult<u64> {
        self.engine.addressing(config).map_err(addressing_err)
    }

    /// Configuration with the given address
    ///
    /// Returns the full string when `join_ras` is true, otherwise a list of the
    /// RAS1, RAS2 and RAS3 sub-strings.
    #[pyo3(signature = (addr, join_ras=false))]
    fn de_addressing(&self, py: Python, addr: u64, join_ras: bool) -> PyResult<Py<PyAny>> {
        let parts = self.engine.de_addressing(addr).map_err(addressing_err)?;
        if join_ras {
            parts.concat().into_py_any(py)
        } else {
            parts.to_vec().into_py_any(py)
        }
    }

    /// Addresses of many strings, computed in parallel without the GIL
    fn addressing_batch(&self, py: Python, configs: Vec<String>) -> PyResult<Vec<u64>> {
        let engine = &self.engine;
        py.detach(|| engine.addressing_batch(&configs))
            .map_err(addressing_err)
    }

    /// Joined configurations of many addresses, computed in parallel without the GIL
    fn de_addressing_batch(&self, py: Python, addresses: Vec<u64>) -> PyResult<Vec<String>> {
        let engine = &self.engine;
        py.detach(|| engine.de_addressing_batch(&addresses))
            .map_err(addressing_err)
    }

    /// Category table as a list of dictionaries; empty categories carry `offset = None`
    fn categories(&self, py: Python) -> PyResult<Vec<Py<PyAny>>> {
        self.engine
            .categories()
            .iter()
            .map(|c| -> PyResult<Py<PyAny>> {
                let dict = PyDict::new(py);
                dict.set_item("index", c.index)?;
                dict.set_item("holes", c.holes)?;
                dict.set_item("particles", c.particles)?;
                dict.set_item("ras2_electrons", c.ras2_electrons)?;
                dict.set_item("weights", c.weights.to_vec())?;
                dict.set_item("size", c.size)?;
                dict.set_item("offset", c.offset)?;
                Ok(dict.into())
            })
            .collect()
    }

    /// Categories grouped by single-excitation distance from the first one
    fn excitation_levels(&self) -> PyResult<Vec<Vec<usize>>> {
        let gas = self.engine.gas_categories().map_err(addressing_err)?;
        Ok(gas.excitation_levels())
    }

    fn __repr__(&self) -> String {
        let p = self.engine.params();
        format!(
            "RASAddrEngine(norb={}, nelec={}, mxhole={}, noras1={}, mxelec={}, noras3={}, \
             n_configs={})",
            p.n_orb,
            p.n_elec,
            p.max_hole,
            p.n_ras1,
            p.max_elec,
            p.n_ras3,
            self.engine.n_configs()
        )
    }
}

#[pyfunction]
fn count_ghf_cas(no: usize, ne: usize) -> PyResult<u64> {
    combinatorics::count_ghf_cas(no, ne).map_err(addressing_err)
}

#[pyfunction]
fn count_rhf_cas(no: usize, ne: usize) -> PyResult<u64> {
    combinatorics::count_rhf_cas(no, ne).map_err(addressing_err)
}

#[pyfunction]
fn count_ghf_gas_category(nos: Vec<usize>, nes: Vec<usize>) -> PyResult<u64> {
    combinatorics::count_ghf_gas_category(&nos, &nes).map_err(addressing_err)
}

#[pyfunction]
fn count_ghf_ras(mh: usize, me: usize, nos: [usize; 3], ne: usize) -> PyResult<u64> {
    combinatorics::count_ghf_ras(mh, me, nos, ne).map_err(addressing_err)
}

#[pyfunction]
fn count_rhf_ras(mh: usize, me: usize, nos: [usize; 3], ne_a: usize, ne_b: usize) -> PyResult<u64> {
    combinatorics::count_rhf_ras(mh, me, nos, ne_a, ne_b).map_err(addressing_err)
}

/// Leading-determinant report of a RASCI log
///
/// Args:
/// - path: Path to the RASCI output log
/// - threshold: Minimum |C|^2 of a listed coefficient (default: 0.1)
/// - max_coeffs: Coefficients read per state (default: 50)
/// - groups: Optional list of (name, 1-based orbital indices) pairs; when given,
///   per-group electron counts replace the occupation string
///
/// Returns:
/// The report text
#[pyfunction]
#[pyo3(signature = (path, threshold=0.1, max_coeffs=50, groups=None))]
fn state_config_report(
    py: Python,
    path: String,
    threshold: f64,
    max_coeffs: usize,
    groups: Option<Vec<(String, Vec<usize>)>>,
) -> PyResult<String> {
    let groups: Vec<OrbitalGroup> = groups
        .unwrap_or_default()
        .into_iter()
        .map(|(name, orbitals)| OrbitalGroup { name, orbitals })
        .collect();
    py.detach(|| {
        let states = RasciStates::from_path(Path::new(&path), max_coeffs)?;
        states.state_config_report(threshold, &groups)
    })
    .map_err(crate_err)
}

/// Register the Python module functions and classes
pub fn register_addressing_module(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyRasAddrEngine>()?;
    module.add_function(wrap_pyfunction!(count_ghf_cas, module)?)?;
    module.add_function(wrap_pyfunction!(count_rhf_cas, module)?)?;
    module.add_function(wrap_pyfunction!(count_ghf_gas_category, module)?)?;
    module.add_function(wrap_pyfunction!(count_ghf_ras, module)?)?;
    module.add_function(wrap_pyfunction!(count_rhf_ras, module)?)?;
    module.add_function(wrap_pyfunction!(state_config_report, module)?)?;
    Ok(())
}
