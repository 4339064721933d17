//! Python bindings exposing the era-keyed JEC configuration parser to framework configuration
//! scripts.
use jec::prelude::*;
use pyo3::{exceptions::PyValueError, prelude::*, types::PyDict, Bound};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn block_to_dict<'py>(py: Python<'py>, block: &EraBlock) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("L1FastJet", block.l1_fast_jet())?;
    dict.set_item("L2Relative", block.l2_relative())?;
    dict.set_item("L3Absolute", block.l3_absolute())?;
    dict.set_item("L2L3Residual", block.residual_map())?;
    dict.set_item("Unc", block.unc())?;
    for (key, value) in block.extra() {
        dict.set_item(key, value)?;
    }
    Ok(dict)
}

/// Accept `2024F` or `Run2024F` and return `Run2024F`.
#[pyfunction]
#[pyo3(name = "normalize_era_key")]
fn py_normalize_era_key(raw: &str) -> String {
    normalize_era_key(raw)
}

/// Pull `Run20XX[A-I]` from input file names; returns `''` if not found.
#[pyfunction]
#[pyo3(name = "infer_era_from_filenames")]
fn py_infer_era_from_filenames(file_names: Vec<String>) -> String {
    infer_era_from_paths(&file_names)
}

/// Parse a residual list into `min:max:file` strings ready for a `vstring`.
#[pyfunction]
#[pyo3(name = "parse_residual_list")]
fn py_parse_residual_list(s: &str) -> PyResult<Vec<String>> {
    let entries = parse_residual_list(s).map_err(value_error)?;
    Ok(entries.iter().map(ToString::to_string).collect())
}

/// Parse a configuration file into `{era: {key: value}}`; a missing file gives `{}`.
#[pyfunction]
#[pyo3(name = "load_jec_config_text")]
fn py_load_jec_config_text<'py>(py: Python<'py>, path: &str) -> PyResult<Bound<'py, PyDict>> {
    let db = ConfigDatabase::load(path).map_err(value_error)?;
    let out = PyDict::new(py);
    for (era, block) in db.iter() {
        out.set_item(era, block_to_dict(py, block)?)?;
    }
    Ok(out)
}

/// Resolve the block for `era_hint` in the configuration file at `path`.
#[pyfunction]
#[pyo3(name = "get_era_block")]
fn py_get_era_block<'py>(py: Python<'py>, path: &str, era_hint: &str) -> PyResult<Bound<'py, PyDict>> {
    let db = ConfigDatabase::load(path).map_err(value_error)?;
    block_to_dict(py, &db.get_era_block(era_hint))
}

/// Select the residual file for `run` from `min:max:file` strings; `None` if no range matches.
#[pyfunction]
#[pyo3(name = "pick_residual_for_run")]
fn py_pick_residual_for_run(entries: Vec<String>, run: RunNumber) -> PyResult<Option<String>> {
    let entries = entries
        .iter()
        .map(|e| e.parse::<ResidualRange>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(value_error)?;
    Ok(pick_residual_for_run(&entries, run).map(|e| e.path.clone()))
}

/// Select the jet veto map for `run`; `None` if no entry applies.
#[pyfunction]
#[pyo3(name = "pick_veto_map_for_run")]
fn py_pick_veto_map_for_run(entries: Vec<String>, run: RunNumber) -> Option<String> {
    pick_veto_map_for_run(&entries, run)
}

#[pymodule]
/// Python module initializer for scouting_jec bindings.
pub fn scouting_jec(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_normalize_era_key, m)?)?;
    m.add_function(wrap_pyfunction!(py_infer_era_from_filenames, m)?)?;
    m.add_function(wrap_pyfunction!(py_parse_residual_list, m)?)?;
    m.add_function(wrap_pyfunction!(py_load_jec_config_text, m)?)?;
    m.add_function(wrap_pyfunction!(py_get_era_block, m)?)?;
    m.add_function(wrap_pyfunction!(py_pick_residual_for_run, m)?)?;
    m.add_function(wrap_pyfunction!(py_pick_veto_map_for_run, m)?)?;
    Ok(())
}
