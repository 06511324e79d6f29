//! Simulation-specific error types.
//!
//! Errors in this crate are configuration-constraint violations only: a bad
//! radius on particle creation, a degenerate time step, or an invalid config
//! file.  Degenerate geometry (coincident disk centres) is resolved locally and
//! never surfaces here.
//!
//! ## Usage
//!
//! ```rust
//! use disksim::error::{SimError, SimResult};
//!
//! fn check_radius(radius: f32) -> SimResult<()> {
//!     if radius <= 0.0 {
//!         return Err(SimError::InvalidParameter {
//!             name: "radius",
//!             value: radius,
//!             reason: "must be > 0",
//!         });
//!     }
//!     Ok(())
//! }
//! # assert!(check_radius(-1.0).is_err());
//! ```

use std::fmt;

/// Top-level error enum for the disk simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// A caller-supplied scalar violated its constraint.
    /// The operation is rejected and no state is changed.
    InvalidParameter {
        /// Name of the parameter (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the constraint.
        reason: &'static str,
    },

    /// A [`crate::config::SimConfig`] field failed validation.
    InvalidConfig {
        /// Config key that failed.
        field: &'static str,
        /// Human-readable description of the constraint.
        reason: String,
    },

    /// A config file exists but could not be read.
    ConfigRead {
        /// Path of the file.
        path: String,
        /// I/O error message.
        message: String,
    },

    /// A config file could not be parsed as TOML.
    ConfigParse {
        /// Path (or label) of the source that failed.
        path: String,
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidParameter {
                name,
                value,
                reason,
            } => write!(f, "invalid parameter '{}' = {}: {}", name, value, reason),
            SimError::InvalidConfig { field, reason } => {
                write!(f, "invalid config field '{}': {}", field, reason)
            }
            SimError::ConfigRead { path, message } => {
                write!(f, "failed to read config '{}': {}", path, message)
            }
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse config '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is finite and strictly positive.
pub fn ensure_positive(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite and > 0",
        })
    }
}

/// Returns an error unless `value` is finite.
pub fn ensure_finite(name: &'static str, value: f32) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidParameter {
            name,
            value,
            reason: "must be finite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_message_names_the_parameter() {
        let err = SimError::InvalidParameter {
            name: "radius",
            value: -2.0,
            reason: "must be finite and > 0",
        };
        let msg = err.to_string();
        assert!(msg.contains("radius"));
        assert!(msg.contains("-2"));
    }

    #[test]
    fn ensure_positive_rejects_zero_nan_and_infinity() {
        assert!(ensure_positive("dt", 0.0).is_err());
        assert!(ensure_positive("dt", -0.5).is_err());
        assert!(ensure_positive("dt", f32::NAN).is_err());
        assert!(ensure_positive("dt", f32::INFINITY).is_err());
        assert!(ensure_positive("dt", 1.0 / 60.0).is_ok());
    }

    #[test]
    fn ensure_finite_accepts_negative_values() {
        assert!(ensure_finite("vx", -200.0).is_ok());
        assert!(ensure_finite("vx", f32::NEG_INFINITY).is_err());
    }
}
