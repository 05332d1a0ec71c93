use super::{get_errno, CallOutcome, ErrnoGuard, STATUS_C_LIBRARY_ERROR, STATUS_NATIVE_EXCEPTION};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::debug;

/// Converts the payload of a caught panic into a message
pub fn panic_payload_to_string(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a behaviour call behind the error boundary
///
/// 1. errno is saved and cleared before the call
/// 2. a panic raised by the call becomes a native-exception outcome
/// 3. the errno value observed after the call is recorded in a C-library-error outcome
/// 4. the saved errno is restored if `restore_errno` is true
pub fn guarded_call<F>(restore_errno: bool, call: F) -> CallOutcome
where
    F: FnOnce() -> CallOutcome,
{
    let guard = ErrnoGuard::new(restore_errno);
    let result = catch_unwind(AssertUnwindSafe(call));
    let errno = get_errno();
    let mut outcome = match result {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_payload_to_string(payload);
            CallOutcome::failure(STATUS_NATIVE_EXCEPTION, &message)
        }
    };
    if errno != 0 {
        if outcome.status == STATUS_C_LIBRARY_ERROR && outcome.c_error_number == 0 {
            outcome.c_error_number = errno;
        } else {
            debug!(errno, status = outcome.status, "errno set during a behaviour call");
        }
    }
    drop(guard);
    outcome
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
