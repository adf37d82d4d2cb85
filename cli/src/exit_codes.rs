//! # Exit Codes
//!
//! Standard exit codes for the exportready CLI.
//!
//! These codes follow common Unix conventions and provide meaningful
//! feedback to scripts and CI/CD pipelines.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error (unspecified)
pub const EXIT_ERROR: i32 = 1;

/// Configuration error (missing API key, invalid config file)
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Invalid input (empty product name, unknown destination, bad corpus file)
pub const EXIT_INVALID_INPUT: i32 = 3;

/// Network error (backend unreachable, store unreachable, timeout)
pub const EXIT_NETWORK_ERROR: i32 = 4;

/// Report was generated but one or more pipeline stages degraded
///
/// The report is still printed in full; this code lets scripts detect
/// reduced-confidence output.
pub const EXIT_DEGRADED: i32 = 5;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_CONFIG_ERROR,
            EXIT_INVALID_INPUT,
            EXIT_NETWORK_ERROR,
            EXIT_DEGRADED,
        ];

        // Check all codes are unique
        for (i, &code1) in codes.iter().enumerate() {
            for (j, &code2) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(code1, code2, "Exit codes {} and {} are not unique", i, j);
                }
            }
        }
    }

    #[test]
    fn test_success_is_zero() {
        assert_eq!(EXIT_SUCCESS, 0);
    }

    #[test]
    fn test_error_codes_are_positive() {
        assert!(EXIT_ERROR > 0);
        assert!(EXIT_CONFIG_ERROR > 0);
        assert!(EXIT_INVALID_INPUT > 0);
        assert!(EXIT_NETWORK_ERROR > 0);
        assert!(EXIT_DEGRADED > 0);
    }
}
