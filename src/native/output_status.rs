use crate::base::STATUS_MESSAGE_CAPACITY;
use std::ffi::{c_char, c_int};
use std::fmt;

/// The call succeeded
pub const STATUS_SUCCESS: c_int = 0;

/// Some arguments are out of their normal bounds but a result was produced
pub const STATUS_BOUNDS_WARNING: c_int = 1;

/// Some arguments are out of their physical bounds (or out of their normal bounds under a strict policy)
pub const STATUS_BOUNDS_FATAL: c_int = -1;

/// The native code raised an exception (or a panic was caught)
pub const STATUS_NATIVE_EXCEPTION: c_int = -2;

/// A C library function set errno
pub const STATUS_C_LIBRARY_ERROR: c_int = -3;

/// The result is not a finite number
pub const STATUS_INVALID_RESULT: c_int = -4;

/// The number of arguments does not match the hypothesis
pub const STATUS_ARGUMENT_COUNT: c_int = -5;

/// The parameters of the behaviour could not be initialised
pub const STATUS_PARAMETERS_INITIALISATION: c_int = -6;

/// Converts a NUL-terminated (or full) character buffer into a string
pub(crate) fn buffer_to_string(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer.iter().take_while(|&&c| c != 0).map(|&c| c as u8).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Holds the status record filled by a native entry point
///
/// The layout is shared with native code.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OutputStatus {
    /// Status code (see the `STATUS_*` constants)
    pub status: c_int,

    /// errno value captured during the call
    pub c_error_number: c_int,

    /// Index (1-based) of the out-of-bounds argument; positive for warnings and negative for errors
    pub bounds_status: c_int,

    /// NUL-terminated message
    pub msg: [c_char; STATUS_MESSAGE_CAPACITY],
}

/// Defines the classes of status returned by a low-level call
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusClass {
    Success,
    UsableWithCaution,
    BoundsFatal,
    NativeException,
    CLibraryError,
    InvalidNumericResult,
    ArgumentCountMismatch,
    ParametersInitialisation,
    Unknown,
}

impl StatusClass {
    /// Classifies a status code
    pub fn from_code(status: c_int) -> Self {
        match status {
            STATUS_SUCCESS => StatusClass::Success,
            STATUS_BOUNDS_WARNING => StatusClass::UsableWithCaution,
            STATUS_BOUNDS_FATAL => StatusClass::BoundsFatal,
            STATUS_NATIVE_EXCEPTION => StatusClass::NativeException,
            STATUS_C_LIBRARY_ERROR => StatusClass::CLibraryError,
            STATUS_INVALID_RESULT => StatusClass::InvalidNumericResult,
            STATUS_ARGUMENT_COUNT => StatusClass::ArgumentCountMismatch,
            STATUS_PARAMETERS_INITIALISATION => StatusClass::ParametersInitialisation,
            _ => StatusClass::Unknown,
        }
    }

    /// Indicates that the result can be used
    pub fn is_usable(&self) -> bool {
        matches!(self, StatusClass::Success | StatusClass::UsableWithCaution)
    }
}

impl OutputStatus {
    /// Allocates a new instance with a success status and an empty message
    pub fn new() -> Self {
        OutputStatus {
            status: STATUS_SUCCESS,
            c_error_number: 0,
            bounds_status: 0,
            msg: [0; STATUS_MESSAGE_CAPACITY],
        }
    }

    /// Resets the record to a success status and an empty message
    pub fn reset(&mut self) {
        self.status = STATUS_SUCCESS;
        self.c_error_number = 0;
        self.bounds_status = 0;
        self.msg.fill(0);
    }

    /// Sets the status code and the message
    ///
    /// The message is truncated to fit the buffer (including the NUL terminator).
    pub fn set(&mut self, status: c_int, message: &str) {
        self.status = status;
        self.set_message(message);
    }

    /// Sets the message (truncated to fit the buffer)
    pub fn set_message(&mut self, message: &str) {
        self.msg.fill(0);
        let bytes = message.as_bytes();
        let n = usize::min(bytes.len(), STATUS_MESSAGE_CAPACITY - 1);
        for i in 0..n {
            self.msg[i] = bytes[i] as c_char;
        }
    }

    /// Returns the message (up to the first NUL character)
    pub fn message(&self) -> String {
        buffer_to_string(&self.msg)
    }

    /// Returns the class of the status code
    pub fn class(&self) -> StatusClass {
        StatusClass::from_code(self.status)
    }
}

impl Default for OutputStatus {
    fn default() -> Self {
        OutputStatus::new()
    }
}

impl fmt::Debug for OutputStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStatus")
            .field("status", &self.status)
            .field("c_error_number", &self.c_error_number)
            .field("bounds_status", &self.bounds_status)
            .field("msg", &self.message())
            .finish()
    }
}

/// Holds the outcome of a single low-level call
#[derive(Clone, Debug, PartialEq)]
pub struct CallOutcome {
    /// Status code (see the `STATUS_*` constants)
    pub status: i32,

    /// Index of the out-of-bounds argument (see [OutputStatus::bounds_status])
    pub bounds_status: i32,

    /// errno value captured during the call
    pub c_error_number: i32,

    /// Error message
    pub message: String,

    /// Fraction of the time increment that could be integrated (≥ 1 means the full increment)
    pub ndt: f64,
}

impl CallOutcome {
    /// Returns a successful outcome
    pub fn success(ndt: f64) -> Self {
        CallOutcome {
            status: STATUS_SUCCESS,
            bounds_status: 0,
            c_error_number: 0,
            message: String::new(),
            ndt,
        }
    }

    /// Returns a failed outcome with a given status and message
    pub fn failure(status: i32, message: &str) -> Self {
        CallOutcome {
            status,
            bounds_status: 0,
            c_error_number: 0,
            message: message.to_string(),
            ndt: 0.0,
        }
    }

    /// Returns a bounds-related outcome
    ///
    /// A positive `bounds_status` produces a warning and a negative one a failure.
    pub fn bounds(bounds_status: i32, message: &str, ndt: f64) -> Self {
        let status = if bounds_status > 0 {
            STATUS_BOUNDS_WARNING
        } else {
            STATUS_BOUNDS_FATAL
        };
        CallOutcome {
            status,
            bounds_status,
            c_error_number: 0,
            message: message.to_string(),
            ndt,
        }
    }

    /// Builds the outcome from a status record and the achievable fraction of the time increment
    pub fn from_status(status: &OutputStatus, ndt: f64) -> Self {
        CallOutcome {
            status: status.status,
            bounds_status: status.bounds_status,
            c_error_number: status.c_error_number,
            message: status.message(),
            ndt,
        }
    }

    /// Returns the class of the status code
    pub fn class(&self) -> StatusClass {
        StatusClass::from_code(self.status)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{buffer_to_string, CallOutcome, OutputStatus, StatusClass};
    use crate::base::STATUS_MESSAGE_CAPACITY;
    use std::ffi::c_char;

    #[test]
    fn buffer_to_string_works() {
        let buffer: [c_char; 4] = [b'a' as c_char, b'b' as c_char, 0, b'c' as c_char];
        assert_eq!(buffer_to_string(&buffer), "ab");
        let full: [c_char; 2] = [b'x' as c_char, b'y' as c_char];
        assert_eq!(buffer_to_string(&full), "xy");
    }

    #[test]
    fn layout_is_correct() {
        assert_eq!(std::mem::size_of::<OutputStatus>(), 3 * 4 + STATUS_MESSAGE_CAPACITY);
    }

    #[test]
    fn classification_works() {
        assert_eq!(StatusClass::from_code(0), StatusClass::Success);
        assert_eq!(StatusClass::from_code(1), StatusClass::UsableWithCaution);
        assert_eq!(StatusClass::from_code(-1), StatusClass::BoundsFatal);
        assert_eq!(StatusClass::from_code(-2), StatusClass::NativeException);
        assert_eq!(StatusClass::from_code(-3), StatusClass::CLibraryError);
        assert_eq!(StatusClass::from_code(-4), StatusClass::InvalidNumericResult);
        assert_eq!(StatusClass::from_code(-5), StatusClass::ArgumentCountMismatch);
        assert_eq!(StatusClass::from_code(-6), StatusClass::ParametersInitialisation);
        assert_eq!(StatusClass::from_code(-7), StatusClass::Unknown);
        assert_eq!(StatusClass::from_code(2), StatusClass::Unknown);
        assert!(StatusClass::Success.is_usable());
        assert!(StatusClass::UsableWithCaution.is_usable());
        assert!(!StatusClass::BoundsFatal.is_usable());
    }

    #[test]
    fn message_works() {
        let mut status = OutputStatus::new();
        assert_eq!(status.message(), "");
        status.set(-2, "integration failed");
        assert_eq!(status.class(), StatusClass::NativeException);
        assert_eq!(status.message(), "integration failed");
        let long = "x".repeat(600);
        status.set_message(&long);
        assert_eq!(status.message().len(), STATUS_MESSAGE_CAPACITY - 1);
        status.reset();
        assert_eq!(status.status, 0);
        assert_eq!(status.message(), "");
        assert_eq!(
            format!("{:?}", status),
            "OutputStatus { status: 0, c_error_number: 0, bounds_status: 0, msg: \"\" }"
        );
    }

    #[test]
    fn call_outcome_works() {
        let outcome = CallOutcome::success(1.0);
        assert_eq!(outcome.class(), StatusClass::Success);
        let outcome = CallOutcome::bounds(2, "PoissonRatio is out of bounds", 1.0);
        assert_eq!(outcome.class(), StatusClass::UsableWithCaution);
        let outcome = CallOutcome::bounds(-2, "PoissonRatio is out of bounds", 0.0);
        assert_eq!(outcome.class(), StatusClass::BoundsFatal);
        assert_eq!(outcome.bounds_status, -2);
        let mut status = OutputStatus::new();
        status.set(-3, "ERANGE");
        status.c_error_number = 34;
        let outcome = CallOutcome::from_status(&status, 1.0);
        assert_eq!(outcome.class(), StatusClass::CLibraryError);
        assert_eq!(outcome.c_error_number, 34);
        assert_eq!(outcome.message, "ERANGE");
        let outcome = CallOutcome::failure(-5, "wrong number of arguments");
        assert_eq!(outcome.class(), StatusClass::ArgumentCountMismatch);
    }
}
