//! Emission scenarios served by the NEX-GDDP-CMIP6 archive.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named future-emissions trajectory, or the single observed-forcings
/// baseline run.
///
/// The scenario name doubles as a path segment in the remote archive layout,
/// the local download tree and the output tree, so the spelling here matches
/// the archive exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Observed-forcings baseline (1950-2014).
    Historical,
    /// SSP1-2.6, the low-emissions pathway.
    Ssp126,
    /// SSP2-4.5.
    Ssp245,
    /// SSP3-7.0.
    Ssp370,
    /// SSP5-8.5, the high-emissions pathway.
    Ssp585,
}

impl Scenario {
    /// Every scenario the archive serves, baseline first.
    pub const ALL: [Scenario; 5] = [
        Scenario::Historical,
        Scenario::Ssp126,
        Scenario::Ssp245,
        Scenario::Ssp370,
        Scenario::Ssp585,
    ];

    pub(crate) fn path_segment(&self) -> &'static str {
        match self {
            Scenario::Historical => "historical",
            Scenario::Ssp126 => "ssp126",
            Scenario::Ssp245 => "ssp245",
            Scenario::Ssp370 => "ssp370",
            Scenario::Ssp585 => "ssp585",
        }
    }

    pub fn is_historical(&self) -> bool {
        matches!(self, Scenario::Historical)
    }
}

/// Formats a `Scenario` as its archive path segment.
///
/// # Examples
///
/// ```
/// use nexswat::Scenario;
///
/// assert_eq!(format!("{}", Scenario::Historical), "historical");
/// assert_eq!(Scenario::Ssp370.to_string(), "ssp370");
/// ```
impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_names_match_archive_spelling() {
        let json = serde_json::to_string(&Scenario::ALL.to_vec()).unwrap();
        assert_eq!(
            json,
            r#"["historical","ssp126","ssp245","ssp370","ssp585"]"#
        );
        let back: Vec<Scenario> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Scenario::ALL.to_vec());
    }

    #[test]
    fn only_the_baseline_is_historical() {
        assert!(Scenario::Historical.is_historical());
        for ssp in &Scenario::ALL[1..] {
            assert!(!ssp.is_historical());
        }
    }
}
