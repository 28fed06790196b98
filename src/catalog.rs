//! Supported drug catalog and the user's drug selection.

use std::fmt;
use std::str::FromStr;

use crate::error::PharmaGuardError;

/// A drug the analysis service can assess, paired with its pharmacogene.
///
/// The catalog is fixed; variant order here is the display and wire order
/// everywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drug {
    Codeine,
    Warfarin,
    Clopidogrel,
    Simvastatin,
    Azathioprine,
    Fluorouracil,
}

impl Drug {
    pub const ALL: [Drug; 6] = [
        Drug::Codeine,
        Drug::Warfarin,
        Drug::Clopidogrel,
        Drug::Simvastatin,
        Drug::Azathioprine,
        Drug::Fluorouracil,
    ];

    /// Wire code, as the analysis service expects it in the `drugs` form field.
    pub fn code(self) -> &'static str {
        match self {
            Drug::Codeine => "CODEINE",
            Drug::Warfarin => "WARFARIN",
            Drug::Clopidogrel => "CLOPIDOGREL",
            Drug::Simvastatin => "SIMVASTATIN",
            Drug::Azathioprine => "AZATHIOPRINE",
            Drug::Fluorouracil => "FLUOROURACIL",
        }
    }

    /// Primary gene associated with the drug, display only.
    pub fn gene(self) -> &'static str {
        match self {
            Drug::Codeine => "CYP2D6",
            Drug::Warfarin => "CYP2C9",
            Drug::Clopidogrel => "CYP2C19",
            Drug::Simvastatin => "SLCO1B1",
            Drug::Azathioprine => "TPMT",
            Drug::Fluorouracil => "DPYD",
        }
    }

    fn index(self) -> usize {
        Drug::ALL
            .iter()
            .position(|d| *d == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Drug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Drug {
    type Err = PharmaGuardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Drug::ALL
            .into_iter()
            .find(|d| d.code() == normalized)
            .ok_or_else(|| {
                PharmaGuardError::InvalidArgument(format!(
                    "Unsupported drug: {value}. Supported: {}",
                    Drug::ALL.map(Drug::code).join(", ")
                ))
            })
    }
}

/// Which catalog drugs are selected for analysis.
///
/// Membership is a fixed-size mask over [`Drug::ALL`], so duplicates are
/// impossible and iteration always follows catalog order no matter the order
/// drugs were toggled in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrugSelection {
    selected: [bool; Drug::ALL.len()],
}

impl DrugSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full catalog selected.
    pub fn all() -> Self {
        Self {
            selected: [true; Drug::ALL.len()],
        }
    }

    /// Adds the drug if absent, removes it if present.
    pub fn toggle(&mut self, drug: Drug) {
        self.selected[drug.index()] = !self.selected[drug.index()];
    }

    pub fn select_all(&mut self) {
        self.selected = [true; Drug::ALL.len()];
    }

    pub fn clear(&mut self) {
        self.selected = [false; Drug::ALL.len()];
    }

    pub fn contains(&self, drug: Drug) -> bool {
        self.selected[drug.index()]
    }

    /// Submission gate: an empty selection blocks both analysis modes.
    pub fn is_empty(&self) -> bool {
        !self.selected.iter().any(|s| *s)
    }

    pub fn len(&self) -> usize {
        self.selected.iter().filter(|s| **s).count()
    }

    /// Selected drugs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Drug> + '_ {
        Drug::ALL.into_iter().filter(|d| self.contains(*d))
    }

    /// Comma-joined wire codes in catalog order, for the `drugs` form field.
    pub fn codes_joined(&self) -> String {
        self.iter()
            .map(Drug::code)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parses a comma-separated drug list from the CLI into a selection.
    pub fn parse_list(list: &str) -> Result<Self, PharmaGuardError> {
        let mut selection = Self::new();
        for raw in list.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let drug = raw.parse::<Drug>()?;
            if !selection.contains(drug) {
                selection.toggle(drug);
            }
        }
        Ok(selection)
    }
}
