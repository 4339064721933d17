//! Loading of era-keyed correction configuration files.
//!
//! The format is free-form text split into sections by header comments:
//!
//! ```text
//! #---- Year: 2024F:
//! L1FastJet: /path/L1FastJet.txt
//! L2L3Residual: [ -1:382298:/path/a.txt,
//!                 382298:-1:/path/b.txt ]
//! Unc: /path/Uncertainty.txt
//! ```

use std::{collections::BTreeMap, fs, path::Path};

use lazy_static::lazy_static;
use regex::Regex;
use scouting_core::eras::normalize_era_key;
use serde::Serialize;

use crate::{
    block::{EraBlock, L2L3_RESIDUAL},
    residual::{parse_residual_list, ResidualRange},
    JecError, JecResult,
};

lazy_static! {
    static ref SECTION_HEADER: Regex =
        Regex::new(r"^#-+\s*(?:Year|year|era)\s*:\s*([A-Za-z0-9_]+)\s*:?\s*$")
            .expect("static section header pattern");
}

/// Where the line-oriented parser currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseState {
    /// No section header seen yet; everything is commentary.
    Preamble,
    /// Inside the named section, reading `key: value` lines.
    InSection(String),
    /// Accumulating a residual list that spans several lines.
    InResidualList { era: String, fragments: Vec<String> },
}

/// All era blocks read from one configuration file.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConfigDatabase {
    blocks: BTreeMap<String, EraBlock>,
    #[serde(skip)]
    source: String,
}

impl ConfigDatabase {
    /// Parse the file at `path`. A path that is not an existing file yields an empty database.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or contains a malformed residual entry.
    pub fn load(path: impl AsRef<Path>) -> JecResult<Self> {
        let path = path.as_ref();
        let source = path.display().to_string();
        if !path.is_file() {
            tracing::debug!("no correction config at {source}, nothing configured");
            return Ok(Self {
                source,
                ..Default::default()
            });
        }
        let text = fs::read_to_string(path).map_err(|err| JecError::Io {
            path: source.clone(),
            source: err,
        })?;
        Self::parse_str(&text, &source)
    }

    /// Parse configuration text. `source` labels the text in error messages.
    ///
    /// # Errors
    ///
    /// Fails on the first residual entry that is not `min:max:path`.
    pub fn parse_str(text: &str, source: &str) -> JecResult<Self> {
        let mut db = Self {
            blocks: BTreeMap::new(),
            source: source.to_string(),
        };
        let mut state = ParseState::Preamble;
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            state = db.step(state, line)?;
        }
        if let ParseState::InResidualList { era, fragments } = state {
            tracing::warn!(
                "{source}: unterminated {L2L3_RESIDUAL} list in section {era} ignored: {}",
                fragments.join(" ")
            );
        }
        tracing::debug!("{source}: loaded {} era block(s)", db.blocks.len());
        Ok(db)
    }

    fn step(&mut self, state: ParseState, line: &str) -> JecResult<ParseState> {
        if let Some(caps) = SECTION_HEADER.captures(line) {
            if let ParseState::InResidualList { era, .. } = &state {
                tracing::warn!(
                    "{}: {L2L3_RESIDUAL} list in section {era} abandoned by a new section header",
                    self.source
                );
            }
            let era = normalize_era_key(&caps[1]);
            if self.blocks.insert(era.clone(), EraBlock::default()).is_some() {
                tracing::warn!("{}: section {era} redefined, earlier entries dropped", self.source);
            }
            return Ok(ParseState::InSection(era));
        }
        let era = match state {
            ParseState::Preamble => return Ok(ParseState::Preamble),
            ParseState::InSection(era) => era,
            ParseState::InResidualList { era, mut fragments } => {
                if let Some(rest) = line.strip_prefix("L2L3Residual:") {
                    return self.open_residual(era, rest);
                }
                fragments.push(line.to_string());
                if !line.contains(']') {
                    return Ok(ParseState::InResidualList { era, fragments });
                }
                let entries = self.parse_residuals(&era, &fragments.join(" "))?;
                self.block_mut(&era).set_l2l3_residual(entries);
                return Ok(ParseState::InSection(era));
            }
        };
        if let Some(rest) = line.strip_prefix("L2L3Residual:") {
            return self.open_residual(era, rest);
        }
        match line.split_once(':') {
            Some((key, value)) => {
                let value = value.trim().trim_end_matches(',').trim();
                self.block_mut(&era).set(key.trim(), value);
            }
            None => tracing::trace!("{}: ignoring line in section {era}: {line}", self.source),
        }
        Ok(ParseState::InSection(era))
    }

    fn open_residual(&mut self, era: String, rest: &str) -> JecResult<ParseState> {
        let rest = rest.trim();
        if rest.contains('[') && rest.contains(']') {
            let entries = self.parse_residuals(&era, rest)?;
            self.block_mut(&era).set_l2l3_residual(entries);
            return Ok(ParseState::InSection(era));
        }
        Ok(ParseState::InResidualList {
            era,
            fragments: vec![rest.to_string()],
        })
    }

    fn parse_residuals(&self, era: &str, list: &str) -> JecResult<Vec<ResidualRange>> {
        parse_residual_list(list).map_err(|err| JecError::MalformedResidual {
            source_name: self.source.clone(),
            era: era.to_string(),
            item: err.item,
        })
    }

    fn block_mut(&mut self, era: &str) -> &mut EraBlock {
        self.blocks.entry(era.to_string()).or_default()
    }

    /// Resolve the block for `era_hint` (`2024G` or `Run2024G`).
    ///
    /// Returns an empty block when the hint is empty or the era is not configured.
    pub fn get_era_block(&self, era_hint: &str) -> EraBlock {
        let key = normalize_era_key(era_hint);
        if key.is_empty() {
            return EraBlock::default();
        }
        match self.blocks.get(&key) {
            Some(block) => block.clone(),
            None => {
                tracing::debug!("{}: no block for era {key}", self.source);
                EraBlock::default()
            }
        }
    }

    /// Borrow the block stored under `era_hint`, if any.
    pub fn get(&self, era_hint: &str) -> Option<&EraBlock> {
        self.blocks.get(&normalize_era_key(era_hint))
    }

    /// Configured era keys in sorted order.
    pub fn eras(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// Iterate over `(era, block)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EraBlock)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of configured eras.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no era is configured.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Label of the parsed source, usually the file path.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Consume the database, returning the underlying map.
    pub fn into_blocks(self) -> BTreeMap<String, EraBlock> {
        self.blocks
    }
}
