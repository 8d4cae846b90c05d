use std::fs;
use std::path::PathBuf;

use num_complex::Complex64;

use rucie::{CoefficientKey, Error, OrbitalGroup, RasciStates, ReportConfig};

const LOG: &str = "\
 RASCI calculation
 CAS(3,6)
 RAS(1,2,1,2)

 State:   1   Energy:   -1.0512345678D+02
 (     1, 0.94000, 0.00000) (     9,-0.25000, 0.05000) (    14, 0.00100, 0.00000)
 (*****, 0.30000, 0.00000)

 State:   2   Energy:   -1.0498765432D+02
 (     4, 0.80000, 0.10000) (    13, 0.50000, 0.00000)

 Normal termination
";

fn write_log(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("rucie_{}_{}.log", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_read_log_file() {
    let path = write_log("read", LOG);
    let states = RasciStates::from_path(&path, 50).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(states.cas_spec, Some([3, 6]));
    assert_eq!(states.ras_spec, Some([1, 2, 1, 2]));
    assert_eq!(states.states.len(), 2);
    assert!((states.states[0].energy + 105.12345678).abs() < 1e-9);

    let first = &states.states[0].coefficients;
    assert_eq!(first.len(), 4);
    assert_eq!(first[1], (CoefficientKey::Address(9), Complex64::new(-0.25, 0.05)));
    assert_eq!(first[3].0, CoefficientKey::Unassignable(0));
    assert_eq!(states.states[1].coefficients.len(), 2);
}

#[test]
fn test_report_from_log_file() {
    let path = write_log("report", LOG);
    let states = RasciStates::from_path(&path, 50).unwrap();
    fs::remove_file(&path).unwrap();

    let report = states.state_config_report(0.05, &[]).unwrap();
    let listed: Vec<&str> = report.lines().filter(|l| l.starts_with("  |")).collect();
    // state 1: addresses 1, 9 and the unassignable one; state 2: addresses 4 and 13
    assert_eq!(listed.len(), 5);
    assert!(listed[0].ends_with("; 111000"));
    assert!(listed[1].ends_with("; 100110"));
    assert!(listed[2].contains("*0"));
    assert!(listed[3].ends_with("; 011100"));
    assert!(listed[4].ends_with("; 100101"));
    assert!(report.contains("State 2, Energy:"));
}

#[test]
fn test_report_with_groups_from_toml() {
    let cfg = ReportConfig::from_toml_str(
        r#"
        threshold = 0.5
        [[groups]]
        name = "ras1"
        orbitals = [1, 2]
        [[groups]]
        name = "ras3"
        orbitals = [5, 6]
        "#,
    )
    .unwrap();
    let states = RasciStates::from_reader(LOG.as_bytes(), cfg.max_coeffs).unwrap();
    let report = states.state_config_report(cfg.threshold, &cfg.groups).unwrap();
    let listed: Vec<&str> = report.lines().filter(|l| l.starts_with("  |")).collect();
    assert_eq!(listed.len(), 2);
    assert!(listed[0].ends_with(" ras1 2 ras3 0"));
    assert!(listed[1].ends_with(" ras1 1 ras3 0"));
}

#[test]
fn test_log_without_cas_line() {
    let states = RasciStates::from_reader(" State: 1 -1.0\n (1, 1.0)\n".as_bytes(), 50).unwrap();
    let groups: Vec<OrbitalGroup> = Vec::new();
    assert!(matches!(
        states.state_config_report(0.1, &groups),
        Err(Error::MissingSpec(_))
    ));
}

#[test]
fn test_missing_log_file() {
    let path = std::env::temp_dir().join("rucie_no_such_file.log");
    assert!(matches!(RasciStates::from_path(&path, 50), Err(Error::Io(_))));
}
