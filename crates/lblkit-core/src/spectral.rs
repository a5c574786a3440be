//! Validated wavelength ranges and their wavenumber rendering.
//!
//! Consumers specify wavelengths in nanometres while the native line-file
//! tooling thinks in wavenumbers (cm^-1). Converting via `1e7 / nm` flips
//! the bounds: the ending wavelength fixes the lower wavenumber and the
//! starting wavelength fixes the upper one.

use serde::Serialize;
use thiserror::Error;

/// Default starting wavelength in nanometres.
pub const DEFAULT_WAVE_START_NM: f64 = 300.0;

/// Default ending wavelength in nanometres.
pub const DEFAULT_WAVE_END_NM: f64 = 5000.0;

/// Width of one wavenumber field in the LNFL control file.
pub const FIELD_WIDTH: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("wavelength bounds must be positive, got {start} .. {end} nm")]
    NonPositive { start: f64, end: f64 },
    #[error("wavelength start must lie below end, got {start} .. {end} nm")]
    Inverted { start: f64, end: f64 },
    #[error("{start} .. {end} nm maps to a wavenumber too wide for the control-file field")]
    FieldOverflow { start: f64, end: f64 },
}

/// A validated wavelength window in nanometres, start strictly below end.
/// Both wavenumber bounds are guaranteed to fit a [`FIELD_WIDTH`] field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpectralRange {
    start_nm: f64,
    end_nm: f64,
}

impl Default for SpectralRange {
    fn default() -> Self {
        SpectralRange {
            start_nm: DEFAULT_WAVE_START_NM,
            end_nm: DEFAULT_WAVE_END_NM,
        }
    }
}

impl SpectralRange {
    pub fn new(start_nm: f64, end_nm: f64) -> Result<Self, RangeError> {
        if !start_nm.is_finite() || !end_nm.is_finite() || start_nm <= 0.0 || end_nm <= 0.0 {
            return Err(RangeError::NonPositive {
                start: start_nm,
                end: end_nm,
            });
        }
        if start_nm >= end_nm {
            return Err(RangeError::Inverted {
                start: start_nm,
                end: end_nm,
            });
        }
        let range = SpectralRange { start_nm, end_nm };
        // The lower wavenumber is the smaller of the two, so only the upper
        // field can outgrow its fixed width.
        if field(range.wavenumber_upper()).len() > FIELD_WIDTH {
            return Err(RangeError::FieldOverflow {
                start: start_nm,
                end: end_nm,
            });
        }
        Ok(range)
    }

    pub fn start_nm(&self) -> f64 {
        self.start_nm
    }

    pub fn end_nm(&self) -> f64 {
        self.end_nm
    }

    /// Lower wavenumber bound in cm^-1, set by the *ending* wavelength.
    pub fn wavenumber_lower(&self) -> f64 {
        1e7 / self.end_nm
    }

    /// Upper wavenumber bound in cm^-1, set by the *starting* wavelength.
    pub fn wavenumber_upper(&self) -> f64 {
        1e7 / self.start_nm
    }

    /// Both wavenumber bounds as `(lower, upper)`.
    pub fn wavenumber_bounds(&self) -> (f64, f64) {
        (self.wavenumber_lower(), self.wavenumber_upper())
    }

    /// The two bounds as adjacent control-file fields, each printed with
    /// three decimals and right-justified to [`FIELD_WIDTH`] characters.
    pub fn bounds_record(&self) -> String {
        format!(
            "{}{}",
            field(self.wavenumber_lower()),
            field(self.wavenumber_upper())
        )
    }
}

fn field(wavenumber: f64) -> String {
    format!("{:>width$.3}", wavenumber, width = FIELD_WIDTH)
}
