use crate::base::{Hypothesis, StiffnessRequest};
use crate::native::{CallOutcome, StatusClass};
use crate::StrError;
use std::fmt;

/// Defines the classified failures of a call to the integration driver
///
/// The state of the material point is never modified when a failure is returned.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrationFailure {
    /// Only a fraction of the time increment could be integrated
    SubStepRequested { ndt: f64 },

    /// An argument is out of its physical bounds (or out of its normal bounds under a strict policy)
    BoundsViolation { bounds_status: i32, message: String },

    /// The behaviour raised an exception (or panicked)
    NativeException { message: String },

    /// A C library function failed (errno value as observed during the call)
    CLibraryError { errno: i32, message: String },

    /// The result contains NaN or infinite values
    InvalidNumericResult { message: String },

    /// The number of components does not match the hypothesis
    ArgumentCountMismatch { message: String },

    /// The parameters of the behaviour could not be initialised
    ParametersInitialisation { message: String },

    /// The status code is not known
    UnknownStatus { status: i32, message: String },

    /// The generic plane stress algorithm did not converge
    PlaneStressNotConverged { iterations: usize },

    /// The behaviour (or its host family) does not support the hypothesis
    UnsupportedHypothesis(Hypothesis),

    /// The behaviour cannot compute the requested stiffness operator
    UnsupportedStiffnessRequest(StiffnessRequest),

    /// The inputs of the driver are inconsistent
    InvalidConfiguration(StrError),
}

impl IntegrationFailure {
    /// Classifies the outcome of a call
    ///
    /// Returns None if the result can be used (possibly with a bounds warning)
    /// and covers the full time increment.
    pub fn from_outcome(outcome: &CallOutcome) -> Option<Self> {
        let message = outcome.message.clone();
        match outcome.class() {
            StatusClass::Success | StatusClass::UsableWithCaution => {
                if outcome.ndt.is_nan() {
                    Some(IntegrationFailure::InvalidNumericResult {
                        message: "the estimated time step fraction is not a number".to_string(),
                    })
                } else if outcome.ndt < 1.0 {
                    Some(IntegrationFailure::SubStepRequested {
                        ndt: f64::max(outcome.ndt, 0.0),
                    })
                } else {
                    None
                }
            }
            StatusClass::BoundsFatal => Some(IntegrationFailure::BoundsViolation {
                bounds_status: outcome.bounds_status,
                message,
            }),
            StatusClass::NativeException => Some(IntegrationFailure::NativeException { message }),
            StatusClass::CLibraryError => Some(IntegrationFailure::CLibraryError {
                errno: outcome.c_error_number,
                message,
            }),
            StatusClass::InvalidNumericResult => Some(IntegrationFailure::InvalidNumericResult { message }),
            StatusClass::ArgumentCountMismatch => Some(IntegrationFailure::ArgumentCountMismatch { message }),
            StatusClass::ParametersInitialisation => Some(IntegrationFailure::ParametersInitialisation { message }),
            StatusClass::Unknown => Some(IntegrationFailure::UnknownStatus {
                status: outcome.status,
                message,
            }),
        }
    }

    /// Indicates that the caller may retry with a smaller time increment
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IntegrationFailure::SubStepRequested { .. }
                | IntegrationFailure::BoundsViolation { .. }
                | IntegrationFailure::PlaneStressNotConverged { .. }
        )
    }

    /// Indicates an error in the setup that no retry can fix
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            IntegrationFailure::ArgumentCountMismatch { .. }
                | IntegrationFailure::ParametersInitialisation { .. }
                | IntegrationFailure::UnsupportedHypothesis(..)
                | IntegrationFailure::UnsupportedStiffnessRequest(..)
                | IntegrationFailure::InvalidConfiguration(..)
        )
    }

    /// Returns the fraction of the time increment that could be integrated (sub-step requests only)
    pub fn achievable_fraction(&self) -> Option<f64> {
        match self {
            IntegrationFailure::SubStepRequested { ndt } => Some(*ndt),
            _ => None,
        }
    }
}

impl fmt::Display for IntegrationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationFailure::SubStepRequested { ndt } => {
                write!(f, "sub-step requested (achievable fraction = {})", ndt)
            }
            IntegrationFailure::BoundsViolation { bounds_status, message } => {
                write!(f, "bounds violation (argument {}): {}", bounds_status.abs(), message)
            }
            IntegrationFailure::NativeException { message } => write!(f, "native exception: {}", message),
            IntegrationFailure::CLibraryError { errno, message } => {
                write!(f, "C library error (errno = {}): {}", errno, message)
            }
            IntegrationFailure::InvalidNumericResult { message } => write!(f, "invalid numeric result: {}", message),
            IntegrationFailure::ArgumentCountMismatch { message } => write!(f, "argument count mismatch: {}", message),
            IntegrationFailure::ParametersInitialisation { message } => {
                write!(f, "parameters initialisation failed: {}", message)
            }
            IntegrationFailure::UnknownStatus { status, message } => {
                write!(f, "unknown status {}: {}", status, message)
            }
            IntegrationFailure::PlaneStressNotConverged { iterations } => {
                write!(f, "the generic plane stress algorithm did not converge after {} iterations", iterations)
            }
            IntegrationFailure::UnsupportedHypothesis(h) => write!(f, "unsupported modelling hypothesis: {}", h),
            IntegrationFailure::UnsupportedStiffnessRequest(r) => {
                write!(f, "unsupported stiffness request: {:?}", r)
            }
            IntegrationFailure::InvalidConfiguration(message) => write!(f, "invalid configuration: {}", message),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::IntegrationFailure;
    use crate::base::{Hypothesis, StiffnessRequest};
    use crate::native::CallOutcome;

    #[test]
    fn from_outcome_works() {
        assert_eq!(IntegrationFailure::from_outcome(&CallOutcome::success(1.0)), None);
        assert_eq!(IntegrationFailure::from_outcome(&CallOutcome::success(f64::MAX)), None);
        assert_eq!(
            IntegrationFailure::from_outcome(&CallOutcome::bounds(3, "warning", 1.0)),
            None
        );
        assert_eq!(
            IntegrationFailure::from_outcome(&CallOutcome::success(0.3)),
            Some(IntegrationFailure::SubStepRequested { ndt: 0.3 })
        );
        assert_eq!(
            IntegrationFailure::from_outcome(&CallOutcome::bounds(-2, "PoissonRatio", 0.0)),
            Some(IntegrationFailure::BoundsViolation {
                bounds_status: -2,
                message: "PoissonRatio".to_string()
            })
        );
        let mut outcome = CallOutcome::failure(-3, "pow");
        outcome.c_error_number = 34;
        assert_eq!(
            IntegrationFailure::from_outcome(&outcome),
            Some(IntegrationFailure::CLibraryError {
                errno: 34,
                message: "pow".to_string()
            })
        );
        assert_eq!(
            IntegrationFailure::from_outcome(&CallOutcome::failure(-9, "?")),
            Some(IntegrationFailure::UnknownStatus {
                status: -9,
                message: "?".to_string()
            })
        );
        let failure = IntegrationFailure::from_outcome(&CallOutcome::success(f64::NAN)).unwrap();
        assert!(matches!(failure, IntegrationFailure::InvalidNumericResult { .. }));
        let failure = IntegrationFailure::from_outcome(&CallOutcome::failure(-6, "A")).unwrap();
        assert_eq!(
            failure,
            IntegrationFailure::ParametersInitialisation { message: "A".to_string() }
        );
    }

    #[test]
    fn classification_works() {
        let sub = IntegrationFailure::SubStepRequested { ndt: 0.5 };
        assert!(sub.is_retryable());
        assert!(!sub.is_configuration_error());
        assert_eq!(sub.achievable_fraction(), Some(0.5));
        let bounds = IntegrationFailure::BoundsViolation {
            bounds_status: -1,
            message: String::new(),
        };
        assert!(bounds.is_retryable());
        assert_eq!(bounds.achievable_fraction(), None);
        let exception = IntegrationFailure::NativeException {
            message: String::new(),
        };
        assert!(!exception.is_retryable());
        assert!(!exception.is_configuration_error());
        let hyp = IntegrationFailure::UnsupportedHypothesis(Hypothesis::PlaneStress);
        assert!(hyp.is_configuration_error());
        assert!(!hyp.is_retryable());
        let count = IntegrationFailure::ArgumentCountMismatch {
            message: String::new(),
        };
        assert!(count.is_configuration_error());
    }

    #[test]
    fn display_works() {
        assert_eq!(
            format!("{}", IntegrationFailure::SubStepRequested { ndt: 0.25 }),
            "sub-step requested (achievable fraction = 0.25)"
        );
        assert_eq!(
            format!(
                "{}",
                IntegrationFailure::BoundsViolation {
                    bounds_status: -2,
                    message: "PoissonRatio is out of its bounds".to_string()
                }
            ),
            "bounds violation (argument 2): PoissonRatio is out of its bounds"
        );
        assert_eq!(
            format!("{}", IntegrationFailure::UnsupportedHypothesis(Hypothesis::PlaneStress)),
            "unsupported modelling hypothesis: PlaneStress"
        );
        assert_eq!(
            format!("{}", IntegrationFailure::UnsupportedStiffnessRequest(StiffnessRequest::Secant)),
            "unsupported stiffness request: Secant"
        );
        assert_eq!(
            format!("{}", IntegrationFailure::InvalidConfiguration("dt must be ≥ 0.0")),
            "invalid configuration: dt must be ≥ 0.0"
        );
    }
}
