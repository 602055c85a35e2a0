//! The unit of download work and the version-fallback resolver.

use std::fmt;

use crate::bounds::RegionBounds;
use crate::config::DatasetConfig;
use crate::types::{Scenario, Variable};

/// One logical remote file: a (scenario, variable, year) triple.
///
/// The triple is the task's identity; which dataset version actually gets
/// fetched is decided at run time by walking [`FetchSpec::candidates`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchSpec {
    pub scenario: Scenario,
    pub variable: Variable,
    pub year: i32,
}

impl FetchSpec {
    pub fn new(scenario: Scenario, variable: Variable, year: i32) -> Self {
        FetchSpec {
            scenario,
            variable,
            year,
        }
    }

    /// Remote filename for one version suffix.
    fn filename(&self, dataset: &DatasetConfig, suffix: &str) -> String {
        format!(
            "{}_day_{}_{}_{}_gn_{}{}.nc",
            self.variable.name(),
            dataset.model,
            self.scenario,
            dataset.variant,
            self.year,
            suffix
        )
    }

    /// Ordered candidate identifiers for this spec, newest version first.
    ///
    /// The configured suffix list is oldest-first; fetching prefers the
    /// newest revision and falls back linearly however many suffixes are
    /// configured. Each candidate carries the subset URL and the filename
    /// the download is stored under.
    pub fn candidates(
        &self,
        dataset: &DatasetConfig,
        bounds: &RegionBounds,
    ) -> Vec<FetchCandidate> {
        dataset
            .version_suffixes
            .iter()
            .rev()
            .map(|suffix| {
                let filename = self.filename(dataset, suffix);
                let url = format!(
                    "{base}/{dataset}/{model}/{scenario}/{variant}/{var}/{filename}\
                     ?var={var}&north={north}&west={west}&east={east}&south={south}\
                     &horizStride=1&time_start={year}-01-01T12:00:00Z\
                     &time_end={year}-12-31T12:00:00Z&&&accept=netcdf3&addLatLon=true",
                    base = dataset.base_url,
                    dataset = dataset.dataset,
                    model = dataset.model,
                    scenario = self.scenario,
                    variant = dataset.variant,
                    var = self.variable.name(),
                    filename = filename,
                    north = bounds.north,
                    west = bounds.west,
                    east = bounds.east,
                    south = bounds.south,
                    year = self.year,
                );
                FetchCandidate {
                    version: suffix.clone(),
                    filename,
                    url,
                }
            })
            .collect()
    }
}

impl fmt::Display for FetchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.scenario, self.variable, self.year)
    }
}

/// One concrete remote identifier to try: a version suffix plus the URL and
/// target filename derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCandidate {
    /// Version suffix of this candidate; empty for the unversioned release.
    pub version: String,
    pub filename: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bounds() -> RegionBounds {
        RegionBounds {
            west: -3.25,
            south: 4.75,
            east: 1.25,
            north: 11.5,
        }
    }

    #[test]
    fn candidates_walk_versions_newest_first() {
        let dataset = DatasetConfig::default();
        let spec = FetchSpec::new(Scenario::Ssp126, Variable::Tas, 2040);
        let candidates = spec.candidates(&dataset, &test_bounds());

        let versions: Vec<&str> = candidates.iter().map(|c| c.version.as_str()).collect();
        assert_eq!(versions, vec!["_v1.2", "_v1.1", ""]);
    }

    #[test]
    fn shorter_suffix_lists_still_fall_back_linearly() {
        let mut dataset = DatasetConfig::default();
        dataset.version_suffixes = vec!["".to_string(), "_v1.1".to_string()];
        let spec = FetchSpec::new(Scenario::Historical, Variable::Pr, 1999);
        let versions: Vec<String> = spec
            .candidates(&dataset, &test_bounds())
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["_v1.1".to_string(), "".to_string()]);

        dataset.version_suffixes = vec!["".to_string()];
        let versions: Vec<String> = spec
            .candidates(&dataset, &test_bounds())
            .into_iter()
            .map(|c| c.version)
            .collect();
        assert_eq!(versions, vec!["".to_string()]);
    }

    #[test]
    fn filenames_follow_the_archive_convention() {
        let dataset = DatasetConfig::default();
        let spec = FetchSpec::new(Scenario::Ssp585, Variable::SfcWind, 2100);
        let candidates = spec.candidates(&dataset, &test_bounds());

        assert_eq!(
            candidates[0].filename,
            "sfcWind_day_ACCESS-CM2_ssp585_r1i1p1f1_gn_2100_v1.2.nc"
        );
        assert_eq!(
            candidates[2].filename,
            "sfcWind_day_ACCESS-CM2_ssp585_r1i1p1f1_gn_2100.nc"
        );
    }

    #[test]
    fn urls_carry_the_region_subset_and_year_window() {
        let dataset = DatasetConfig::default();
        let spec = FetchSpec::new(Scenario::Historical, Variable::Tasmin, 1950);
        let url = &spec.candidates(&dataset, &test_bounds())[0].url;

        assert!(url.starts_with(
            "https://ds.nccs.nasa.gov/thredds/ncss/grid/AMES/NEX/GDDP-CMIP6/ACCESS-CM2/historical/r1i1p1f1/tasmin/"
        ));
        assert!(url.contains("north=11.5"));
        assert!(url.contains("west=-3.25"));
        assert!(url.contains("east=1.25"));
        assert!(url.contains("south=4.75"));
        assert!(url.contains("time_start=1950-01-01T12:00:00Z"));
        assert!(url.contains("time_end=1950-12-31T12:00:00Z"));
        assert!(url.contains("accept=netcdf3"));
    }
}
