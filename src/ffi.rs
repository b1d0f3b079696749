use crate::error::Error;
use crate::Client::Emitter;
use std::ffi::{c_char, c_int, CStr};
use std::ptr;

// Error codes
pub const MYSYSLOG_ERROR_NULL_POINTER: c_int = -1;
pub const MYSYSLOG_ERROR_NOT_CONNECTED: c_int = -2;
pub const MYSYSLOG_ERROR_CHANNEL_FULL: c_int = -3;
pub const MYSYSLOG_ERROR_INTERNAL: c_int = -4;

/// Handle to an emitter instance (opaque pointer)
pub struct EmitterHandle {
    inner: Emitter,
}

/// Create a new emitter on the well-known channel.
///
/// # Arguments
/// * `process_name` - NUL-terminated name used as the identity prefix.
///
/// # Returns
/// * Pointer to `EmitterHandle`, or NULL if the name is NULL.
///   A missing channel still yields a handle; sends on it fail.
#[no_mangle]
pub extern "C" fn mysyslog_open(process_name: *const c_char) -> *mut EmitterHandle {
    if process_name.is_null() {
        return ptr::null_mut();
    }

    // Any byte string is a usable name; invalid UTF-8 is replaced
    let name = unsafe { CStr::from_ptr(process_name) }.to_string_lossy();

    Box::into_raw(Box::new(EmitterHandle {
        inner: Emitter::open(&name),
    }))
}

/// Write a log message.
///
/// # Arguments
/// * `handle` - Pointer to `EmitterHandle`.
/// * `message` - NUL-terminated message text.
///
/// # Returns
/// * Number of bytes written on success, negative error code otherwise.
#[no_mangle]
pub extern "C" fn mysyslog_putlog(handle: *mut EmitterHandle, message: *const c_char) -> c_int {
    if handle.is_null() || message.is_null() {
        return MYSYSLOG_ERROR_NULL_POINTER;
    }

    let emitter = unsafe { &(*handle).inner };
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();

    match emitter.send(&text) {
        Ok(n) => n as c_int,
        Err(Error::NotConnected) => MYSYSLOG_ERROR_NOT_CONNECTED,
        Err(Error::ChannelFull) => MYSYSLOG_ERROR_CHANNEL_FULL,
        Err(_) => MYSYSLOG_ERROR_INTERNAL,
    }
}

/// Close the channel and free the handle.
#[no_mangle]
pub extern "C" fn mysyslog_close(handle: *mut EmitterHandle) {
    if !handle.is_null() {
        unsafe {
            let _ = Box::from_raw(handle); // Dropped automatically
        }
    }
}
