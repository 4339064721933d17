//! Builds the jet energy correction parameter set handed to the scouting ntuplizer.
//!
//! Two era-keyed configuration files are read, one for data and one for simulation, and the
//! block for the selected era is turned into the flat lists of files the analyzer expects.

use std::fmt::Display;

use itertools::Itertools;
use scouting_jec::{
    block::{L1_FAST_JET, L2L3_RESIDUAL, L2_RELATIVE, L3_ABSOLUTE},
    prelude::*,
};
use serde::Serialize;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub mod cli;

/// Default jet correction payload label.
pub const DEFAULT_PAYLOAD: &str = "AK4PFHLT";

/// Default correction levels, applied in this order.
pub const DEFAULT_LEVELS: [&str; 4] = [L1_FAST_JET, L2_RELATIVE, L3_ABSOLUTE, L2L3_RESIDUAL];

/// Errors raised while assembling correction parameters.
#[derive(Error, Debug)]
pub enum CfgError {
    /// Reading or parsing a correction configuration file failed.
    #[error("{0}")]
    JecError(#[from] JecError),
    /// Writing JSON output failed.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
    /// Writing to the output stream failed.
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    /// No era was given and none could be inferred from the input files.
    #[error("no era given and none could be inferred from {0} input file(s)")]
    NoEra(usize),
}

/// Where correction parameters come from at run time.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, EnumString, StrumDisplay, EnumIter, Serialize,
)]
#[strum(ascii_case_insensitive)]
pub enum JecMode {
    /// Payloads from the conditions database (global tag).
    #[strum(serialize = "es")]
    #[serde(rename = "es")]
    Es,
    /// Local text files listed in the configuration file.
    #[default]
    #[strum(serialize = "txt")]
    #[serde(rename = "txt")]
    Txt,
    /// No corrections applied.
    #[strum(serialize = "none")]
    #[serde(rename = "none")]
    Disabled,
}

/// Settings for one configuration build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Era hint such as `2024C`; empty means "infer from the input files".
    pub era: String,
    /// Correction source.
    pub jec_mode: JecMode,
    /// Whether the analyzer flags jets inside veto map regions.
    pub apply_jet_veto_map: bool,
    /// In `es` mode, load the uncertainty from the text file when the global tag lacks it.
    pub unc_fallback_to_txt: bool,
    /// In `es` mode, load the residual from the run map when the global tag lacks it.
    pub residual_fallback_to_txt: bool,
    /// Jet correction payload label.
    pub payload: String,
    /// Correction levels in application order.
    pub levels: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            era: String::new(),
            jec_mode: JecMode::default(),
            apply_jet_veto_map: true,
            unc_fallback_to_txt: true,
            residual_fallback_to_txt: true,
            payload: DEFAULT_PAYLOAD.to_string(),
            levels: DEFAULT_LEVELS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl BuildConfig {
    /// Set the era hint.
    pub fn with_era(mut self, era: &str) -> Self {
        self.era = era.to_string();
        self
    }
    /// Set the correction source.
    pub fn with_mode(mut self, mode: JecMode) -> Self {
        self.jec_mode = mode;
        self
    }
    /// Enable or disable jet veto maps.
    pub fn with_jet_veto_map(mut self, apply: bool) -> Self {
        self.apply_jet_veto_map = apply;
        self
    }
    /// Enable or disable the text-file fallbacks used in `es` mode.
    pub fn with_txt_fallbacks(mut self, unc: bool, residual: bool) -> Self {
        self.unc_fallback_to_txt = unc;
        self.residual_fallback_to_txt = residual;
        self
    }

    /// The configured era, or the one inferred from `inputs` when none is configured.
    pub fn resolve_era<I, S>(&self, inputs: I) -> EraKey
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.era.trim().is_empty() {
            let inferred = infer_era_from_paths(inputs);
            tracing::debug!("inferred era \"{inferred}\" from input files");
            EraKey::new(&inferred)
        } else {
            EraKey::new(&self.era)
        }
    }
}

/// Flattened correction inputs for data and simulation, named as the analyzer expects them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JecParameters {
    /// Era the blocks were taken from.
    pub era: String,
    /// Whether corrections are applied at all.
    #[serde(rename = "applyJEC")]
    pub apply_jec: bool,
    /// Uncertainty text-file fallback in `es` mode.
    pub jec_unc_fallback_to_txt: bool,
    /// Residual text-file fallback in `es` mode.
    pub jec_residual_fallback_to_txt: bool,
    /// Correction source.
    pub jec_mode: JecMode,
    /// Jet correction payload label.
    pub jec_payload: String,
    /// Correction levels in application order.
    pub jec_levels: Vec<String>,
    /// Whether jet veto maps are applied.
    pub apply_jet_veto_map: bool,
    /// Base correction files for data.
    pub jec_txt_files_data: Vec<String>,
    /// Residual run map for data.
    pub jec_residual_map_data: Vec<ResidualRange>,
    /// Uncertainty file for data.
    pub jec_unc_txt_file_data: String,
    /// Veto map entries for data.
    pub jet_veto_map_files_data: Vec<String>,
    /// Base correction files for simulation.
    #[serde(rename = "jecTxtFilesMC")]
    pub jec_txt_files_mc: Vec<String>,
    /// Residual run map for simulation; carried along but never applied.
    #[serde(rename = "jecResidualMapMC")]
    pub jec_residual_map_mc: Vec<ResidualRange>,
    /// Uncertainty file for simulation.
    #[serde(rename = "jecUncTxtFileMC")]
    pub jec_unc_txt_file_mc: String,
    /// Veto map entries for simulation.
    #[serde(rename = "jetVetoMapFilesMC")]
    pub jet_veto_map_files_mc: Vec<String>,
}

impl JecParameters {
    /// Look up `era` in both databases and flatten the two blocks.
    ///
    /// Missing eras produce empty lists, with a warning.
    pub fn assemble(
        config: &BuildConfig,
        era: &EraKey,
        data: &ConfigDatabase,
        mc: &ConfigDatabase,
    ) -> Self {
        let data_block = lookup(data, era, "data");
        let mc_block = lookup(mc, era, "MC");
        Self {
            era: era.to_string(),
            apply_jec: config.jec_mode != JecMode::Disabled,
            jec_unc_fallback_to_txt: config.unc_fallback_to_txt,
            jec_residual_fallback_to_txt: config.residual_fallback_to_txt,
            jec_mode: config.jec_mode,
            jec_payload: config.payload.clone(),
            jec_levels: config.levels.clone(),
            apply_jet_veto_map: config.apply_jet_veto_map,
            jec_txt_files_data: data_block.base_txt_files(),
            jec_residual_map_data: data_block.l2l3_residual().to_vec(),
            jec_unc_txt_file_data: data_block.unc().to_string(),
            jet_veto_map_files_data: data_block.jet_veto_map_files(),
            jec_txt_files_mc: mc_block.base_txt_files(),
            jec_residual_map_mc: mc_block.l2l3_residual().to_vec(),
            jec_unc_txt_file_mc: mc_block.unc().to_string(),
            jet_veto_map_files_mc: mc_block.jet_veto_map_files(),
        }
    }

    /// Pick the inputs for one sample kind. Residual corrections only apply to data.
    pub fn select(&self, is_data: bool) -> JecInputs {
        let (txt_files, residual_map, uncertainty, veto_map_files) = if is_data {
            (
                &self.jec_txt_files_data,
                self.jec_residual_map_data.clone(),
                &self.jec_unc_txt_file_data,
                &self.jet_veto_map_files_data,
            )
        } else {
            (
                &self.jec_txt_files_mc,
                Vec::new(),
                &self.jec_unc_txt_file_mc,
                &self.jet_veto_map_files_mc,
            )
        };
        JecInputs {
            is_data,
            mode: self.jec_mode,
            payload: self.jec_payload.clone(),
            levels: self.jec_levels.clone(),
            txt_files: txt_files.clone(),
            residual_by_run: !residual_map.is_empty(),
            residual_map,
            uncertainty: uncertainty.clone(),
            apply_jet_veto_map: self.apply_jet_veto_map,
            veto_map_files: veto_map_files.clone(),
        }
    }
}

fn lookup(db: &ConfigDatabase, era: &EraKey, kind: &str) -> EraBlock {
    let block = db.get_era_block(era.as_str());
    if block.is_empty() {
        tracing::warn!(
            "no {kind} JEC block for era \"{era}\" in {}",
            if db.source().is_empty() { "(unnamed)" } else { db.source() }
        );
    }
    block
}

/// Correction inputs for either data or simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JecInputs {
    /// Whether these are the data inputs.
    pub is_data: bool,
    /// Correction source.
    pub mode: JecMode,
    /// Jet correction payload label.
    pub payload: String,
    /// Correction levels in application order.
    pub levels: Vec<String>,
    /// Base correction files.
    pub txt_files: Vec<String>,
    /// Whether a residual file is chosen per run.
    pub residual_by_run: bool,
    /// Residual run map; always empty for simulation.
    pub residual_map: Vec<ResidualRange>,
    /// Uncertainty file, possibly empty.
    pub uncertainty: String,
    /// Whether jet veto maps are applied.
    pub apply_jet_veto_map: bool,
    /// Veto map entries.
    pub veto_map_files: Vec<String>,
}

impl JecInputs {
    /// Inputs taken straight from one era block.
    pub fn from_block(config: &BuildConfig, block: &EraBlock, is_data: bool) -> Self {
        let residual_map = if is_data {
            block.l2l3_residual().to_vec()
        } else {
            Vec::new()
        };
        Self {
            is_data,
            mode: config.jec_mode,
            payload: config.payload.clone(),
            levels: config.levels.clone(),
            txt_files: block.base_txt_files(),
            residual_by_run: !residual_map.is_empty(),
            residual_map,
            uncertainty: block.unc().to_string(),
            apply_jet_veto_map: config.apply_jet_veto_map,
            veto_map_files: block.jet_veto_map_files(),
        }
    }

    /// Files the analyzer would load when processing `run`.
    pub fn resolve_for_run(&self, run: RunNumber) -> ResolvedJec {
        if self.mode == JecMode::Disabled {
            return ResolvedJec {
                run,
                ..Default::default()
            };
        }
        let residual = if self.residual_by_run {
            pick_residual_for_run(&self.residual_map, run).map(|r| r.path.clone())
        } else {
            None
        };
        if self.residual_by_run && residual.is_none() {
            tracing::warn!("run {run} is outside every residual range");
        }
        let veto_map = if self.apply_jet_veto_map {
            pick_veto_map_for_run(&self.veto_map_files, run)
        } else {
            None
        };
        ResolvedJec {
            run,
            txt_files: self.txt_files.clone(),
            residual,
            uncertainty: Some(self.uncertainty.clone()).filter(|u| !u.is_empty()),
            veto_map,
        }
    }
}

fn pick_by_hint<'a>(files: &'a [String], hint: &str) -> &'a str {
    files
        .iter()
        .find(|f| f.contains(hint))
        .map_or("(none)", String::as_str)
}

fn or_none(s: &str) -> &str {
    if s.is_empty() {
        "(none)"
    } else {
        s
    }
}

impl Display for JecInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let levels = if self.levels.is_empty() {
            "(none)".to_string()
        } else {
            self.levels.iter().join(", ")
        };
        let residual = if self.residual_map.is_empty() {
            "(none)".to_string()
        } else {
            format!("{} run range(s)", self.residual_map.len())
        };
        let veto = if self.veto_map_files.is_empty() {
            "(none)".to_string()
        } else {
            self.veto_map_files.iter().join(", ")
        };
        let kind = if self.is_data { "data" } else { "MC" };
        let mode = self.mode.to_string().to_uppercase();
        writeln!(f, "{mode} JEC configuration ({kind})")?;
        writeln!(f, "  Payload    : {}", self.payload)?;
        writeln!(f, "  Levels     : {levels}")?;
        writeln!(f, "  Files:")?;
        for hint in [L1_FAST_JET, L2_RELATIVE, L3_ABSOLUTE] {
            writeln!(f, "    - {hint:<12}: {}", pick_by_hint(&self.txt_files, hint))?;
        }
        writeln!(f, "    - {L2L3_RESIDUAL:<12}: {residual}")?;
        writeln!(f, "  Uncertainty: {}", or_none(&self.uncertainty))?;
        write!(f, "  Veto maps  : {veto}")
    }
}

/// Correction files applicable to a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedJec {
    /// The run the files were resolved for.
    pub run: RunNumber,
    /// Base correction files.
    pub txt_files: Vec<String>,
    /// Residual file covering the run, if any.
    pub residual: Option<String>,
    /// Uncertainty file, if configured.
    pub uncertainty: Option<String>,
    /// Veto map covering the run, if any.
    pub veto_map: Option<String>,
}

impl ResolvedJec {
    /// Full correction chain: base files followed by the residual, if any.
    pub fn correction_files(&self) -> Vec<&str> {
        self.txt_files
            .iter()
            .map(String::as_str)
            .chain(self.residual.as_deref())
            .collect()
    }
}
