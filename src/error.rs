use thiserror::Error;

/// Most elements a grid may repeat along one axis, or per writing line.
pub const MAX_REPETITIONS: usize = 10_000;

/// Errors raised while configuring or rendering a grid page.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// An option value cannot produce well-formed geometry.
    #[error("invalid configuration: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    /// The consumer-supplied target for the rendered page does not exist.
    #[error("render target unavailable: {0}")]
    TargetUnavailable(String),
}

impl GridError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, GridError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(GridError::invalid(field, format!("must be a finite number, got {value}")))
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64, GridError> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(GridError::invalid(field, format!("must be greater than 0, got {value}")))
    }
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, GridError> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(GridError::invalid(field, format!("must not be negative, got {value}")))
    }
}

/// Whole, non-negative option values such as counts.
pub(crate) fn ensure_count(field: &'static str, value: f64) -> Result<u32, GridError> {
    ensure_non_negative(field, value)?;
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(GridError::invalid(field, format!("must be a whole number, got {value}")));
    }
    Ok(value as u32)
}

/// Rejects a `step` that would repeat more than [`MAX_REPETITIONS`] times
/// across `length`.
pub(crate) fn ensure_repetitions(field: &'static str, length: f64, step: f64) -> Result<(), GridError> {
    let count = (length / step).ceil();
    if count > MAX_REPETITIONS as f64 {
        return Err(GridError::invalid(
            field,
            format!("would repeat {count} times, more than the {MAX_REPETITIONS} allowed"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan_and_negative_values() {
        assert!(ensure_finite("cellSize", f64::NAN).is_err());
        assert!(ensure_positive("cellSize", 0.0).is_err());
        assert!(ensure_non_negative("documentMarginTop", -1.0).is_err());
        assert_eq!(ensure_positive("cellSize", 5.0), Ok(5.0));
    }

    #[test]
    fn counts_must_be_whole() {
        assert_eq!(ensure_count("slantLinesPerLine", 10.0), Ok(10));
        assert!(ensure_count("slantLinesPerLine", 2.5).is_err());
        assert!(ensure_count("slantLinesPerLine", -1.0).is_err());
    }

    #[test]
    fn repetition_cap() {
        assert!(ensure_repetitions("cellSize", 200.0, 0.5).is_ok());
        assert!(ensure_repetitions("cellSize", 10_000.0, 1.0).is_ok());
        assert!(ensure_repetitions("cellSize", 10_001.0, 1.0).is_err());
        assert!(ensure_repetitions("cellSize", 200.0, 1e-12).is_err());
    }

    #[test]
    fn message_names_the_field() {
        let err = GridError::invalid("slantAngle", "must be below 90 degrees");
        assert_eq!(
            err.to_string(),
            "invalid configuration: `slantAngle` must be below 90 degrees"
        );
    }
}
