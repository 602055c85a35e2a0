use std::collections::BTreeMap;

use chrono::NaiveDate;
use ndarray::{Array2, Axis};

use crate::convert::error::ConvertError;
use crate::grid::GridFrame;
use crate::types::{same_grid, GridLocation, Scenario, Variable};

/// One variable's merged, unit-converted daily series, continuous from its
/// first to its last day of data. Days with no sample are NaN and become the
/// sentinel on output.
#[derive(Debug, Clone)]
pub struct ClimateSeries {
    pub dates: Vec<NaiveDate>,
    pub locations: Vec<GridLocation>,
    /// Converted samples in `[day][location]` order, rounded to three
    /// decimals after conversion.
    pub values: Array2<f64>,
}

/// Merges a variable's historical and projected frames into one continuous
/// series on the real calendar.
///
/// Every calendar day between the earliest and latest sample is present in
/// the result. Days neither frame covers are logged once and filled with NaN.
/// A day covered by both frames means the download phase mixed file versions,
/// which is a hard error rather than a silent preference.
pub fn reconcile(
    historical: &GridFrame,
    projected: &GridFrame,
    scenario: Scenario,
    variable: Variable,
) -> Result<ClimateSeries, ConvertError> {
    if !same_grid(&historical.locations, &projected.locations) {
        return Err(ConvertError::ScenarioAxisMismatch { scenario, variable });
    }
    let columns = historical.locations.len();

    let mut by_date: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for (frame_index, frame) in [historical, projected].into_iter().enumerate() {
        for (row, &date) in frame.dates.iter().enumerate() {
            if by_date.insert(date, (frame_index, row)).is_some() {
                return Err(ConvertError::DuplicateDate {
                    scenario,
                    variable,
                    date,
                });
            }
        }
    }

    let (Some(&first), Some(&last)) = (by_date.keys().next(), by_date.keys().next_back()) else {
        return Ok(ClimateSeries {
            dates: Vec::new(),
            locations: historical.locations.clone(),
            values: Array2::zeros((0, columns)),
        });
    };

    let mut dates = Vec::new();
    let mut flat: Vec<f64> = Vec::with_capacity(by_date.len() * columns);
    let mut gap_count = 0usize;
    let mut day = first;
    loop {
        dates.push(day);
        match by_date.get(&day) {
            Some(&(frame_index, row)) => {
                let frame = if frame_index == 0 { historical } else { projected };
                flat.extend(
                    frame
                        .values
                        .index_axis(Axis(0), row)
                        .iter()
                        .map(|&value| round3(variable.convert(value))),
                );
            }
            None => {
                log::warn!("No {variable} data for {day} under {scenario}, writing sentinel");
                gap_count += 1;
                flat.extend(std::iter::repeat(f64::NAN).take(columns));
            }
        }
        if day == last {
            break;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if gap_count > 0 {
        log::info!("Filled {gap_count} missing days for {scenario}/{variable}");
    }

    // Each day pushed exactly one row, so the shape always matches.
    debug_assert_eq!(flat.len(), dates.len() * columns);
    let values = Array2::from_shape_vec((dates.len(), columns), flat)
        .unwrap_or_else(|_| Array2::zeros((0, columns)));
    Ok(ClimateSeries {
        dates,
        locations: historical.locations.clone(),
        values,
    })
}

/// Rounds to three decimals. Applied after unit conversion so the rounding
/// error does not get scaled.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn locations() -> Vec<GridLocation> {
        vec![
            GridLocation::from_archive(5.0, 0.25),
            GridLocation::from_archive(5.0, 0.5),
        ]
    }

    fn frame(dates: Vec<NaiveDate>, fill: f64) -> GridFrame {
        let rows = dates.len();
        GridFrame {
            dates,
            locations: locations(),
            values: Array2::from_elem((rows, 2), fill),
        }
    }

    #[test]
    fn merges_frames_and_fills_calendar_gaps() {
        let historical = frame(vec![date(2014, 12, 30), date(2014, 12, 31)], 280.0);
        // 2015-01-01 is missing from the projected frame.
        let projected = frame(vec![date(2015, 1, 2)], 281.0);

        let series =
            reconcile(&historical, &projected, Scenario::Ssp245, Variable::Tas).unwrap();
        assert_eq!(
            series.dates,
            vec![
                date(2014, 12, 30),
                date(2014, 12, 31),
                date(2015, 1, 1),
                date(2015, 1, 2),
            ]
        );
        assert_eq!(series.values[[0, 0]], 6.85);
        assert_eq!(series.values[[1, 1]], 6.85);
        assert!(series.values[[2, 0]].is_nan());
        assert!(series.values[[2, 1]].is_nan());
        assert_eq!(series.values[[3, 0]], 7.85);
    }

    #[test]
    fn a_day_in_both_frames_is_an_error() {
        let historical = frame(vec![date(2014, 12, 31), date(2015, 1, 1)], 280.0);
        let projected = frame(vec![date(2015, 1, 1)], 281.0);

        let result = reconcile(&historical, &projected, Scenario::Ssp126, Variable::Tas);
        assert!(matches!(
            result,
            Err(ConvertError::DuplicateDate {
                scenario: Scenario::Ssp126,
                variable: Variable::Tas,
                ..
            })
        ));
    }

    #[test]
    fn converts_units_before_rounding() {
        let historical = frame(vec![date(2014, 12, 31)], 0.0000011574);
        let projected = frame(vec![date(2015, 1, 1)], 0.0000011574);

        let series = reconcile(&historical, &projected, Scenario::Ssp585, Variable::Pr).unwrap();
        // 0.0000011574 kg m-2 s-1 is 0.09999936 mm/day, which must round to
        // 0.1 rather than being rounded to zero while still a rate.
        assert_eq!(series.values[[0, 0]], 0.1);
        assert_eq!(series.values[[1, 0]], 0.1);
    }

    #[test]
    fn kelvin_zero_celsius_is_exact() {
        let historical = frame(vec![date(2014, 12, 31)], 273.15);
        let projected = frame(vec![date(2015, 1, 1)], 273.15);

        let series = reconcile(&historical, &projected, Scenario::Ssp126, Variable::Tas).unwrap();
        assert_eq!(series.values[[0, 0]], 0.0);
    }

    #[test]
    fn mismatched_axes_are_rejected() {
        let historical = frame(vec![date(2014, 12, 31)], 280.0);
        let mut projected = frame(vec![date(2015, 1, 1)], 280.0);
        projected.locations[1] = GridLocation::from_archive(5.0, 0.75);

        let result = reconcile(&historical, &projected, Scenario::Ssp126, Variable::Tas);
        assert!(matches!(
            result,
            Err(ConvertError::ScenarioAxisMismatch { .. })
        ));
    }

    #[test]
    fn masked_samples_survive_as_nan_without_a_gap() {
        let mut historical = frame(vec![date(2014, 12, 31)], 280.0);
        historical.values[[0, 1]] = f64::NAN;
        let projected = frame(vec![date(2015, 1, 1)], 280.0);

        let series = reconcile(&historical, &projected, Scenario::Ssp126, Variable::Tas).unwrap();
        assert_eq!(series.values[[0, 0]], 6.85);
        assert!(series.values[[0, 1]].is_nan());
        assert_eq!(series.dates.len(), 2);
    }
}
