//! Per-era correction record.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::residual::ResidualRange;

/// Key of the base L1 (pileup offset) correction file.
pub const L1_FAST_JET: &str = "L1FastJet";
/// Key of the relative (eta-dependent) correction file.
pub const L2_RELATIVE: &str = "L2Relative";
/// Key of the absolute (pt-dependent) correction file.
pub const L3_ABSOLUTE: &str = "L3Absolute";
/// Key of the run-range keyed residual list.
pub const L2L3_RESIDUAL: &str = "L2L3Residual";
/// Key of the uncertainty file.
pub const UNCERTAINTY: &str = "Unc";
/// Key of the optional jet veto map file(s).
pub const JET_VETO_MAP: &str = "JetVetoMap";

/// Correction inputs configured for one era.
///
/// Every block carries all known fields, empty when the section did not set them. Keys the
/// parser does not know about are kept verbatim in [`EraBlock::extra`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EraBlock {
    #[serde(rename = "L1FastJet")]
    pub(crate) l1_fast_jet: String,
    #[serde(rename = "L2Relative")]
    pub(crate) l2_relative: String,
    #[serde(rename = "L3Absolute")]
    pub(crate) l3_absolute: String,
    #[serde(rename = "L2L3Residual")]
    pub(crate) l2l3_residual: Vec<ResidualRange>,
    #[serde(rename = "Unc")]
    pub(crate) unc: String,
    #[serde(flatten)]
    pub(crate) extra: BTreeMap<String, String>,
}

impl EraBlock {
    /// L1FastJet file, possibly empty.
    pub fn l1_fast_jet(&self) -> &str {
        &self.l1_fast_jet
    }
    /// L2Relative file, possibly empty.
    pub fn l2_relative(&self) -> &str {
        &self.l2_relative
    }
    /// L3Absolute file, possibly empty.
    pub fn l3_absolute(&self) -> &str {
        &self.l3_absolute
    }
    /// Residual entries in file order.
    pub fn l2l3_residual(&self) -> &[ResidualRange] {
        &self.l2l3_residual
    }
    /// Uncertainty file, possibly empty.
    pub fn unc(&self) -> &str {
        &self.unc
    }
    /// Keys outside the fixed schema, as written.
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Look up any scalar field by its configuration key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            L1_FAST_JET => Some(&self.l1_fast_jet),
            L2_RELATIVE => Some(&self.l2_relative),
            L3_ABSOLUTE => Some(&self.l3_absolute),
            UNCERTAINTY => Some(&self.unc),
            _ => self.extra.get(key).map(String::as_str),
        }
    }

    /// Assign a scalar field by its configuration key. Unknown keys go to [`EraBlock::extra`].
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            L1_FAST_JET => self.l1_fast_jet = value,
            L2_RELATIVE => self.l2_relative = value,
            L3_ABSOLUTE => self.l3_absolute = value,
            UNCERTAINTY => self.unc = value,
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }

    /// Replace the residual list.
    pub fn set_l2l3_residual(&mut self, entries: Vec<ResidualRange>) {
        self.l2l3_residual = entries;
    }

    /// Non-empty base correction files in L1, L2, L3 order.
    pub fn base_txt_files(&self) -> Vec<String> {
        [&self.l1_fast_jet, &self.l2_relative, &self.l3_absolute]
            .into_iter()
            .filter(|p| !p.is_empty())
            .cloned()
            .collect()
    }

    /// Residual entries rendered as `min:max:path` strings.
    pub fn residual_map(&self) -> Vec<String> {
        self.l2l3_residual.iter().map(ToString::to_string).collect()
    }

    /// Jet veto map entries from the `JetVetoMap` key.
    ///
    /// A bracketed comma list yields each non-empty item; any other value is one entry, commas
    /// included.
    pub fn jet_veto_map_files(&self) -> Vec<String> {
        let Some(raw) = self.extra.get(JET_VETO_MAP) else {
            return Vec::new();
        };
        let raw = raw.trim();
        match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None if raw.is_empty() => Vec::new(),
            None => vec![raw.to_string()],
        }
    }

    /// True when no field at all was set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
