// Sleep/wake on the slot pool's in-flight counter.
// Workers wake the waiters when the counter drops to zero; the daemon parks on it
// while draining at shutdown.

use std::sync::atomic::AtomicU32;
use std::time::Duration;

/// Park the calling thread while `counter` still holds `observed`, for at most `timeout`.
///
/// Spurious returns are allowed; callers re-check the counter in a loop.
#[cfg(target_os = "linux")]
pub fn wait_on_count(counter: &AtomicU32, observed: u32, timeout: Duration) {
    use std::sync::atomic::Ordering;

    // Skip the syscall when the count already moved
    if counter.load(Ordering::Acquire) != observed {
        return;
    }

    let ts = libc::timespec {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_nsec: timeout.subsec_nanos() as libc::c_long,
    };

    unsafe {
        libc::syscall(
            libc::SYS_futex,
            counter as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            observed,
            &ts as *const libc::timespec,
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

/// Wake every thread parked on `counter`.
#[cfg(target_os = "linux")]
pub fn wake_all(counter: &AtomicU32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            counter as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            i32::MAX,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub fn wait_on_count(_counter: &AtomicU32, _observed: u32, timeout: Duration) {
    // No futex: nap briefly and let the caller re-check
    std::thread::sleep(timeout.min(Duration::from_millis(1)));
}

#[cfg(not(target_os = "linux"))]
pub fn wake_all(_counter: &AtomicU32) {
    // Waiters poll on non-Linux targets
}
