//! Protection of the inherited-stdio protocol stream.

use std::fs::File;
use std::io;
use std::os::fd::{FromRawFd, OwnedFd};

use crate::connection::Connection;

/// Claims the process's stdin/stdout for the protocol stream, then points
/// fd 1 at stderr so incidental output from hook-like collaborators lands
/// on stderr instead of corrupting the protocol bytes.
///
/// The redirect stays in effect for the remainder of the process; the
/// process exits after its single inherited session, so there is no
/// teardown.
pub struct StdioGuard {
    input: OwnedFd,
    output: OwnedFd,
}

impl StdioGuard {
    pub fn activate() -> io::Result<Self> {
        // Private duplicates of the inherited streams become the protocol
        // transport; they survive the fd 1 redirect below.
        let input = dup_fd(libc::STDIN_FILENO)?;
        let output = dup_fd(libc::STDOUT_FILENO)?;

        // From here on, anything written to "stdout" goes to stderr.
        if unsafe { libc::dup2(libc::STDERR_FILENO, libc::STDOUT_FILENO) } < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Self { input, output })
    }

    /// The protocol stream carried by the claimed descriptors.
    pub fn into_connection(self) -> Connection {
        let input = tokio::fs::File::from_std(File::from(self.input));
        let output = tokio::fs::File::from_std(File::from(self.output));
        Connection::from_streams(input, output)
    }
}

fn dup_fd(fd: libc::c_int) -> io::Result<OwnedFd> {
    let duped = unsafe { libc::dup(fd) };
    if duped < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: dup returned a freshly allocated descriptor we own.
    Ok(unsafe { OwnedFd::from_raw_fd(duped) })
}
