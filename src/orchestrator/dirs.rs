//! Run stamps and the per-run output/data directories.
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Timelike};

use crate::{
    market::MarketDefinition,
    orchestrator::errors::{RunError, RunResult},
};

/// Leap year against which month-day pairs are checked, so `0229` is valid.
const CALENDAR_YEAR: i32 = 2024;

/// Minute-resolution `MMDD-HHMM` stamp that names a run's directories and
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStamp {
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
}

impl RunStamp {
    pub fn now() -> Self {
        let t = Local::now();
        Self { month: t.month(), day: t.day(), hour: t.hour(), minute: t.minute() }
    }

    /// Stamp for the given wall-clock fields.
    ///
    /// # Errors
    /// [`RunError::Config`] if the fields do not name a real calendar day and
    /// time of day.
    pub fn new(month: u32, day: u32, hour: u32, minute: u32) -> RunResult<Self> {
        let date = NaiveDate::from_ymd_opt(CALENDAR_YEAR, month, day);
        let time = NaiveTime::from_hms_opt(hour, minute, 0);
        if date.is_none() || time.is_none() {
            return Err(RunError::Config {
                message: format!(
                    "invalid run stamp {month:02}{day:02}-{hour:02}{minute:02}, expected MMDD-HHMM"
                ),
            });
        }
        Ok(Self { month, day, hour, minute })
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}-{:02}{:02}", self.month, self.day, self.hour, self.minute)
    }
}

impl FromStr for RunStamp {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad =
            || RunError::Config { message: format!("invalid run stamp '{s}', expected MMDD-HHMM") };
        let (date, time) = s.split_once('-').ok_or_else(bad)?;
        let digits = s.chars().all(|c| c.is_ascii_digit() || c == '-');
        if date.len() != 4 || time.len() != 4 || !digits {
            return Err(bad());
        }
        let field = |part: &str| part.parse::<u32>().map_err(|_| bad());
        Self::new(field(&date[..2])?, field(&date[2..])?, field(&time[..2])?, field(&time[2..])?)
    }
}

/// Directories created for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirs {
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,
}

/// Create `comparison_outputs_{definition}_{stamp}` under `output_root` and
/// `comparison_data_{definition}_{stamp}` under `data_root`.
///
/// Both leaves are checked before either is created, so a clash leaves the
/// filesystem untouched. Roots are created if missing.
///
/// # Errors
/// - [`RunError::DirectoryExists`] if either leaf already exists.
/// - [`RunError::Io`] if a directory cannot be created.
pub fn create_run_dirs(
    output_root: &Path, data_root: &Path, definition: MarketDefinition, stamp: RunStamp,
) -> RunResult<RunDirs> {
    let output_dir = output_root.join(format!("comparison_outputs_{definition}_{stamp}"));
    let data_dir = data_root.join(format!("comparison_data_{definition}_{stamp}"));

    for dir in [&output_dir, &data_dir] {
        if dir.exists() {
            return Err(RunError::DirectoryExists { path: dir.clone() });
        }
    }
    for (root, leaf) in [(output_root, &output_dir), (data_root, &data_dir)] {
        std::fs::create_dir_all(root).map_err(|e| io_error(root, e))?;
        std::fs::create_dir(leaf).map_err(|e| io_error(leaf, e))?;
    }
    Ok(RunDirs { output_dir, data_dir })
}

fn io_error(path: &Path, err: std::io::Error) -> RunError {
    if err.kind() == std::io::ErrorKind::AlreadyExists {
        RunError::DirectoryExists { path: path.to_path_buf() }
    } else {
        RunError::Io { path: path.to_path_buf(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_round_trips_through_text() {
        let stamp: RunStamp = "0307-0905".parse().expect("valid stamp");
        assert_eq!(stamp, RunStamp::new(3, 7, 9, 5).expect("valid"));
        assert_eq!(stamp.to_string(), "0307-0905");
    }

    #[test]
    fn stamp_accepts_leap_day() {
        assert_eq!("0229-2359".parse::<RunStamp>().map(|s| s.to_string()), Ok("0229-2359".into()));
    }

    #[test]
    fn stamp_rejects_out_of_range_fields() {
        for bad in [
            "1307-0905", "0300-0905", "0307-2405", "0307-0960", "030-70905", "0307_0905",
            "+307-0905", "0231-1200", "0431-0000",
        ] {
            assert!(bad.parse::<RunStamp>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    // Purpose
    // -------
    // Directories follow the naming pattern and are created under missing
    // roots.
    //
    // Given
    // -----
    // - Empty temp dir; nested roots that do not exist yet.
    //
    // Expect
    // ------
    // - Both leaves exist with the definition and stamp in their names.
    fn creates_named_directories_under_missing_roots() {
        // Arrange
        let tmp = tempfile::tempdir().expect("tempdir");
        let out_root = tmp.path().join("outputs");
        let data_root = tmp.path().join("nested").join("data");
        let stamp = RunStamp::new(1, 2, 3, 4).expect("valid");

        // Act
        let dirs = create_run_dirs(&out_root, &data_root, MarketDefinition::CountyModelYear, stamp)
            .expect("fresh directories");

        // Assert
        assert_eq!(
            dirs.output_dir,
            out_root.join("comparison_outputs_county_model_year_0102-0304")
        );
        assert_eq!(dirs.data_dir, data_root.join("comparison_data_county_model_year_0102-0304"));
        assert!(dirs.output_dir.is_dir());
        assert!(dirs.data_dir.is_dir());
    }

    #[test]
    // Purpose
    // -------
    // An existing data directory is fatal and nothing else is created.
    //
    // Given
    // -----
    // - The data leaf for the stamp already exists; the output leaf does not.
    //
    // Expect
    // ------
    // - DirectoryExists naming the data leaf; the output leaf still absent.
    fn existing_directory_is_fatal_and_leaves_no_trace() {
        // Arrange
        let tmp = tempfile::tempdir().expect("tempdir");
        let stamp = RunStamp::new(12, 31, 23, 59).expect("valid");
        let clash = tmp.path().join("data").join("comparison_data_model_year_1231-2359");
        std::fs::create_dir_all(&clash).expect("pre-create");

        // Act
        let err = create_run_dirs(
            &tmp.path().join("out"),
            &tmp.path().join("data"),
            MarketDefinition::ModelYear,
            stamp,
        )
        .expect_err("clash");

        // Assert
        assert_eq!(err, RunError::DirectoryExists { path: clash });
        assert!(!tmp.path().join("out").join("comparison_outputs_model_year_1231-2359").exists());
    }
}
