use mysyslog::ffi::{
    mysyslog_close, mysyslog_open, mysyslog_putlog, MYSYSLOG_ERROR_NOT_CONNECTED,
    MYSYSLOG_ERROR_NULL_POINTER,
};
use serial_test::serial;
use std::ffi::CString;
use std::ptr;

#[test]
fn null_arguments_are_rejected() {
    assert!(mysyslog_open(ptr::null()).is_null());
    let msg = CString::new("hello").unwrap();
    assert_eq!(mysyslog_putlog(ptr::null_mut(), msg.as_ptr()), MYSYSLOG_ERROR_NULL_POINTER);
    mysyslog_close(ptr::null_mut());
}

#[test]
#[serial]
fn putlog_without_daemon_fails_without_crashing() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    // The C API always uses the well-known pipe name in the working directory
    std::env::set_current_dir(dir.path()).unwrap();

    let name = CString::new("capp").unwrap();
    let handle = mysyslog_open(name.as_ptr());
    std::env::set_current_dir(previous).unwrap();
    assert!(!handle.is_null());

    let msg = CString::new("hello from C").unwrap();
    assert_eq!(mysyslog_putlog(handle, msg.as_ptr()), MYSYSLOG_ERROR_NOT_CONNECTED);
    assert_eq!(mysyslog_putlog(handle, ptr::null()), MYSYSLOG_ERROR_NULL_POINTER);
    mysyslog_close(handle);
}

#[test]
#[serial]
fn non_utf8_process_name_still_opens() {
    let dir = tempfile::tempdir().unwrap();
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();

    let name = CString::new(b"caf\xff".to_vec()).unwrap();
    let handle = mysyslog_open(name.as_ptr());
    std::env::set_current_dir(previous).unwrap();
    assert!(!handle.is_null());

    let msg = CString::new("still here").unwrap();
    assert_eq!(mysyslog_putlog(handle, msg.as_ptr()), MYSYSLOG_ERROR_NOT_CONNECTED);
    mysyslog_close(handle);
}
