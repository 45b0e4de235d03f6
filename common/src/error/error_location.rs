use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location as PanicLocation;

/// Source position attached to every error variant in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl ErrorLocation {
    pub const fn from(location: &'static PanicLocation<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }

    /// Location of the caller, propagated through `#[track_caller]` constructors.
    #[track_caller]
    pub fn caller() -> Self {
        Self::from(PanicLocation::caller())
    }
}

impl Display for ErrorLocation {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "[{}:{}:{}]", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorLocation;

    #[track_caller]
    fn capture() -> ErrorLocation {
        ErrorLocation::caller()
    }

    #[test]
    fn given_track_caller_chain_when_captured_then_points_at_call_site() {
        let expected_line = line!() + 1;
        let location = capture();

        assert_eq!(location.line, expected_line);
        assert!(location.file.ends_with("error_location.rs"));
    }

    #[test]
    fn given_location_when_displayed_then_uses_bracketed_triplet() {
        let location = ErrorLocation {
            file: "src/lib.rs",
            line: 12,
            column: 5,
        };

        assert_eq!(location.to_string(), "[src/lib.rs:12:5]");
    }
}
