//! Liveness probing for processes the launcher did not spawn.

/// Returns true while a process with `pid` exists.
///
/// Permission errors still mean the process exists. Non-positive ids would
/// address process groups, so they are never considered alive.
#[cfg(unix)]
pub fn is_process_running(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    let result = unsafe { libc::kill(pid, 0) };
    result == 0 || std::io::Error::last_os_error().kind() == std::io::ErrorKind::PermissionDenied
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: i32) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;

    use super::*;

    #[test]
    fn current_process_is_running() {
        assert!(is_process_running(std::process::id() as i32));
    }

    #[test]
    fn non_positive_pids_are_never_running() {
        assert!(!is_process_running(0));
        assert!(!is_process_running(-1));
    }

    #[test]
    fn reaped_child_is_not_running() {
        let mut child = Command::new("true").spawn().expect("can spawn `true`");
        let pid = child.id() as i32;
        child.wait().expect("child exits");
        assert!(!is_process_running(pid));
    }
}
