//! RASCI Log Reader
//!
//! Pulls the active-space specification, state energies and leading CI coefficients
//! out of a RASCI output log. The relevant lines look like
//!
//! ```text
//!  CAS(3,6)
//!  RAS(1,2,1,2)
//!  State:   1   Energy:   -1.2345678901D+02
//!  (     1, 0.95123, 0.00000) (     9,-0.20011, 0.01000)
//!  (*****, 0.01000, 0.00000)
//! ```
//!
//! Coefficient groups are `(address, re[, im])`; an address printed as asterisks did
//! not fit the field and is kept as an unassignable coefficient.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use num_complex::Complex64;
use tracing::{debug, warn};

use crate::error::Error;

const RAS_PREFIX: &str = " RAS(";
const CAS_PREFIX: &str = " CAS(";
const STATE_PREFIX: &str = " State:";

/// Key of a CI coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoefficientKey {
    /// 1-based configuration address
    Address(u64),
    /// Address lost to field overflow; numbered in order of appearance over the file
    Unassignable(usize),
}

/// One CI root
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub energy: f64,
    /// Coefficients in the order they were printed
    pub coefficients: Vec<(CoefficientKey, Complex64)>,
}

impl StateRecord {
    fn new(energy: f64) -> Self {
        Self {
            energy,
            coefficients: Vec::new(),
        }
    }

    fn insert(&mut self, key: CoefficientKey, value: Complex64) {
        match self.coefficients.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.coefficients.push((key, value)),
        }
    }
}

/// States read from a RASCI log
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RasciStates {
    /// `[n_elec, n_orb]`
    pub cas_spec: Option<[usize; 2]>,
    /// `[max_hole, n_ras1, max_elec, n_ras3]`
    pub ras_spec: Option<[usize; 4]>,
    pub states: Vec<StateRecord>,
}

/// Split on parentheses, commas and whitespace, dropping empty pieces
fn tokenize(line: &str) -> Vec<&str> {
    line.split(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Parse a float written with a Fortran `D` exponent or a bare `1.0-05` style exponent
fn parse_fortran_float(token: &str) -> Option<f64> {
    let normalized = token.replace(|c: char| c == 'D' || c == 'd', "E");
    if let Ok(v) = normalized.parse::<f64>() {
        return Some(v);
    }
    // mantissa and exponent glued by the sign: "1.5-05"
    let split = normalized
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-' || c == '+')
        .map(|(i, _)| i)?;
    let (mantissa, exponent) = normalized.split_at(split);
    format!("{}E{}", mantissa, exponent).parse().ok()
}

fn is_address_token(token: &str) -> bool {
    token.starts_with('*') || token.parse::<u64>().is_ok()
}

fn parse_spec<const N: usize>(line: &str, line_num: usize) -> Result<[usize; N], Error> {
    let values = tokenize(line)
        .into_iter()
        .skip(1)
        .map(|t| t.parse::<usize>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::LogFormat {
            line: line_num,
            message: format!("bad integer in space specification: {}", e),
        })?;
    <[usize; N]>::try_from(values).map_err(|v| Error::LogFormat {
        line: line_num,
        message: format!("expected {} integers, found {}", N, v.len()),
    })
}

/// Coefficient block of the state being read
struct OpenBlock {
    state: StateRecord,
    recorded: usize,
    complex: Option<bool>,
}

impl RasciStates {
    /// Read states from a log file, keeping at most `max_coeffs` coefficients per state
    pub fn from_path(path: &Path, max_coeffs: usize) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), max_coeffs)
    }

    /// Read states from any line source
    ///
    /// A coefficient block starts after a `State:` line and ends at an empty line, at
    /// the next `State:` line, or once `max_coeffs` coefficients were recorded.
    pub fn from_reader<R: BufRead>(reader: R, max_coeffs: usize) -> Result<Self, Error> {
        let mut result = RasciStates::default();
        let mut block: Option<OpenBlock> = None;
        let mut n_unassignable = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;

            if line.starts_with(RAS_PREFIX) {
                result.ras_spec = Some(parse_spec::<4>(&line, line_num)?);
            } else if line.starts_with(CAS_PREFIX) {
                result.cas_spec = Some(parse_spec::<2>(&line, line_num)?);
            } else if line.starts_with(STATE_PREFIX) {
                if let Some(open) = block.take() {
                    result.states.push(open.state);
                }
                let energy = line
                    .split_whitespace()
                    .last()
                    .and_then(parse_fortran_float)
                    .ok_or_else(|| Error::LogFormat {
                        line: line_num,
                        message: "state line without an energy".to_string(),
                    })?;
                block = Some(OpenBlock {
                    state: StateRecord::new(energy),
                    recorded: 0,
                    complex: None,
                });
                if max_coeffs == 0 {
                    if let Some(open) = block.take() {
                        result.states.push(open.state);
                    }
                }
            } else if let Some(open) = block.as_mut() {
                let tokens = tokenize(&line);
                if tokens.is_empty() {
                    if let Some(open) = block.take() {
                        result.states.push(open.state);
                    }
                    continue;
                }

                let complex = *open.complex.get_or_insert_with(|| {
                    if tokens.len() >= 4 {
                        is_address_token(tokens[3])
                    } else {
                        tokens.len() == 3
                    }
                });
                let stride = if complex { 3 } else { 2 };
                let n_record = (tokens.len() / stride).min(max_coeffs - open.recorded);

                for group in tokens.chunks_exact(stride).take(n_record) {
                    let key = if group[0].starts_with('*') {
                        let key = CoefficientKey::Unassignable(n_unassignable);
                        warn!(
                            line_num,
                            index = n_unassignable,
                            "coefficient address did not fit its field"
                        );
                        n_unassignable += 1;
                        key
                    } else {
                        let addr = group[0].parse::<u64>().map_err(|e| Error::LogFormat {
                            line: line_num,
                            message: format!("bad address {:?}: {}", group[0], e),
                        })?;
                        CoefficientKey::Address(addr)
                    };
                    let number = |t: &str| {
                        parse_fortran_float(t).ok_or_else(|| Error::LogFormat {
                            line: line_num,
                            message: format!("bad coefficient {:?}", t),
                        })
                    };
                    let re = number(group[1])?;
                    let im = if complex { number(group[2])? } else { 0.0 };
                    open.state.insert(key, Complex64::new(re, im));
                }
                open.recorded += n_record;

                if open.recorded >= max_coeffs {
                    if let Some(open) = block.take() {
                        result.states.push(open.state);
                    }
                }
            }
        }

        if let Some(open) = block.take() {
            result.states.push(open.state);
        }
        debug!(
            n_states = result.states.len(),
            n_unassignable,
            "read RASCI states"
        );
        Ok(result)
    }

    pub fn energies(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.energy).collect()
    }
}
