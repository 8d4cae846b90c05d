//! Configuration report for RASCI states
//!
//! Lists, per state, the coefficients with `|C|^2` above a threshold together with
//! the occupation string their address decodes to.

use crate::config::OrbitalGroup;
use crate::error::Error;
use crate::log_reader::{CoefficientKey, RasciStates};
use crate::ras::{RasAddrEngine, RasParams};

impl RasciStates {
    /// Engine parameters described by the log header; no RAS line means a plain CAS
    pub fn engine_params(&self) -> Result<RasParams, Error> {
        let [n_elec, n_orb] = self.cas_spec.ok_or(Error::MissingSpec("CAS"))?;
        let [max_hole, n_ras1, max_elec, n_ras3] = self.ras_spec.unwrap_or([0; 4]);
        Ok(RasParams {
            n_orb,
            n_elec,
            max_hole,
            n_ras1,
            max_elec,
            n_ras3,
        })
    }

    /// Render the leading-determinant report
    ///
    /// # Arguments
    /// * `threshold` - Minimum `|C|^2` of a listed coefficient
    /// * `groups` - When non-empty, print per-group electron counts instead of the
    ///   full occupation string
    ///
    /// # Examples
    /// ```text
    /// State 1, Energy:      -105.0000000000
    ///   |       1>:  0.95000+ 0.00000i; |C|^2: 9.02500E-1; 111000
    /// ```
    pub fn state_config_report(
        &self,
        threshold: f64,
        groups: &[OrbitalGroup],
    ) -> Result<String, Error> {
        let params = self.engine_params()?;
        let engine = RasAddrEngine::new(params)?;

        let mut lines = vec![
            format!(
                "N_TOTAL_ACTIVE_ORBITALS = {}, N_TOTAL_ACTIVE_ELECTRON = {}",
                params.n_orb, params.n_elec
            ),
            format!(
                "N_MAX_HOLE = {}, N_RAS1 = {}, N_MAX_ELECTRON = {}, N_RAS3 = {}",
                params.max_hole, params.n_ras1, params.max_elec, params.n_ras3
            ),
            " ".to_string(),
            format!(
                "Analyzing leading determinants with squared coefficient \
                 absolute value larger than {:.6}",
                threshold
            ),
            " ".to_string(),
        ];

        for (i, state) in self.states.iter().enumerate() {
            lines.push(format!("State {}, Energy: {:20.10}", i + 1, state.energy));
            for (key, coeff) in &state.coefficients {
                let norm_sq = coeff.norm_sqr();
                if norm_sq < threshold {
                    continue;
                }
                match key {
                    CoefficientKey::Address(addr) => {
                        let config = engine.de_addressing_joined(*addr)?;
                        let shown = if groups.is_empty() {
                            config
                        } else {
                            groups
                                .iter()
                                .map(|g| format!(" {}{:2}", g.name, g.count_electrons(&config)))
                                .collect()
                        };
                        lines.push(format!(
                            "  |{:8}>: {:8.5}+{:8.5}i; |C|^2: {:.5E}; {}",
                            addr, coeff.re, coeff.im, norm_sq, shown
                        ));
                    }
                    CoefficientKey::Unassignable(n) => {
                        lines.push(format!(
                            "  |{:>8}>: {:8.5}+{:8.5}i; |C|^2: {:.5E}",
                            format!("*{}", n),
                            coeff.re,
                            coeff.im,
                            norm_sq
                        ));
                    }
                }
            }
        }

        let mut out = String::new();
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    use crate::error::AddressingError;
    use crate::log_reader::StateRecord;

    fn sample() -> RasciStates {
        RasciStates {
            cas_spec: Some([3, 6]),
            ras_spec: Some([1, 2, 1, 2]),
            states: vec![StateRecord {
                energy: -105.0,
                coefficients: vec![
                    (CoefficientKey::Address(1), Complex64::new(0.95, 0.0)),
                    (CoefficientKey::Address(9), Complex64::new(-0.2, 0.0)),
                    (CoefficientKey::Unassignable(0), Complex64::new(0.0, 0.5)),
                    (CoefficientKey::Address(2), Complex64::new(0.01, 0.0)),
                ],
            }],
        }
    }

    #[test]
    fn test_report_decodes_leading_configurations() {
        let report = sample().state_config_report(0.01, &[]).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "N_TOTAL_ACTIVE_ORBITALS = 6, N_TOTAL_ACTIVE_ELECTRON = 3");
        assert_eq!(lines[1], "N_MAX_HOLE = 1, N_RAS1 = 2, N_MAX_ELECTRON = 1, N_RAS3 = 2");
        assert!(lines[5].starts_with("State 1, Energy:"));
        assert!(lines[6].starts_with("  |       1>:"));
        assert!(lines[6].ends_with("; 111000"));
        assert!(lines[7].ends_with("; 100110"));
        assert!(lines[8].starts_with("  |      *0>:"));
        // |0.01|^2 is below the threshold
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_report_with_orbital_groups() {
        let groups = vec![
            OrbitalGroup {
                name: "core".to_string(),
                orbitals: vec![1, 2],
            },
            OrbitalGroup {
                name: "virt".to_string(),
                orbitals: vec![5, 6],
            },
        ];
        let report = sample().state_config_report(0.5, &groups).unwrap();
        let line = report.lines().find(|l| l.starts_with("  |       1>")).unwrap();
        assert!(line.ends_with(";  core 2 virt 0"));
        assert_eq!(report.lines().filter(|l| l.starts_with("  |")).count(), 1);
    }

    #[test]
    fn test_missing_ras_line_means_cas() {
        let mut states = sample();
        states.cas_spec = Some([2, 4]);
        states.ras_spec = None;
        states.states[0].coefficients.truncate(1);
        assert_eq!(states.engine_params().unwrap(), RasParams::cas(4, 2));
        let report = states.state_config_report(0.1, &[]).unwrap();
        assert!(report.contains("N_MAX_HOLE = 0, N_RAS1 = 0, N_MAX_ELECTRON = 0, N_RAS3 = 0"));
        assert!(report.contains("; 1100"));
    }

    #[test]
    fn test_missing_cas_line_is_an_error() {
        let mut states = sample();
        states.cas_spec = None;
        assert!(matches!(
            states.state_config_report(0.1, &[]),
            Err(Error::MissingSpec("CAS"))
        ));
    }

    #[test]
    fn test_address_beyond_space_is_an_error() {
        let mut states = sample();
        states.states[0].coefficients =
            vec![(CoefficientKey::Address(15), Complex64::new(1.0, 0.0))];
        assert!(matches!(
            states.state_config_report(0.1, &[]),
            Err(Error::Addressing(AddressingError::AddressOutOfRange { address: 15, max: 14 }))
        ));
    }
}
