/// Rounds coordinates to a fixed number of decimal places for compact output.
///
/// Trailing zeros (and a dangling decimal point) are dropped, so `12.50`
/// renders as `12.5` and `3.00` as `3`. Output always uses `.` as decimal
/// separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateFormatter {
    decimals: usize,
}

pub const DEFAULT_DECIMALS: usize = 2;

impl CoordinateFormatter {
    pub fn new(decimals: usize) -> Self {
        Self { decimals }
    }

    pub fn format(&self, value: f64) -> String {
        let fixed = format!("{:.*}", self.decimals, value);
        let trimmed = if fixed.contains('.') {
            fixed.trim_end_matches('0').trim_end_matches('.')
        } else {
            fixed.as_str()
        };
        // "-0.001" rounds to "-0"
        if trimmed == "-0" {
            "0".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl Default for CoordinateFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS)
    }
}
