use std::ffi::c_int;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "emscripten"))]
unsafe fn errno_location() -> *mut c_int {
    libc::__errno_location()
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
unsafe fn errno_location() -> *mut c_int {
    libc::__error()
}

#[cfg(any(target_os = "openbsd", target_os = "netbsd"))]
unsafe fn errno_location() -> *mut c_int {
    libc::__errno()
}

/// Returns the value of errno for the current thread
pub fn get_errno() -> c_int {
    unsafe { *errno_location() }
}

/// Sets the value of errno for the current thread
pub fn set_errno(value: c_int) {
    unsafe {
        *errno_location() = value;
    }
}

/// Saves errno on creation and restores it when dropped
///
/// The ambient value is cleared while the guard is alive so that errors
/// raised inside a native call can be detected.
pub struct ErrnoGuard {
    saved: c_int,
    restore: bool,
}

impl ErrnoGuard {
    /// Saves the current errno and sets it to zero
    pub fn new(restore: bool) -> Self {
        let saved = get_errno();
        set_errno(0);
        ErrnoGuard { saved, restore }
    }

    /// Returns the errno value saved on creation
    pub fn saved(&self) -> c_int {
        self.saved
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        if self.restore {
            set_errno(self.saved);
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
