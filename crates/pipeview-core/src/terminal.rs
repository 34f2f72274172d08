//! Terminal queries for the status line (size and foreground check).
//!
//! Both look at stderr, since that is where the status line is drawn.

/// Columns and rows of the terminal on stderr, or `default` when stderr is
/// not a terminal or the size cannot be read.
pub fn screen_size(default: (usize, usize)) -> (usize, usize) {
    #[cfg(unix)]
    {
        if unsafe { libc::isatty(libc::STDERR_FILENO) } == 1 {
            let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
            let r = unsafe { libc::ioctl(libc::STDERR_FILENO, libc::TIOCGWINSZ, &mut ws) };
            if r == 0 && ws.ws_col > 0 {
                let rows = if ws.ws_row > 0 {
                    usize::from(ws.ws_row)
                } else {
                    default.1
                };
                return (usize::from(ws.ws_col), rows);
            }
            tracing::debug!(r, "TIOCGWINSZ failed, using default terminal size");
        }
    }
    default
}

/// True unless we are a background job on the terminal stderr points at.
///
/// Drawing from the background would interleave with whatever the
/// foreground job prints, so callers skip rendering unless forced.
pub fn in_foreground() -> bool {
    #[cfg(unix)]
    {
        if unsafe { libc::isatty(libc::STDERR_FILENO) } != 1 {
            return true;
        }
        let owner = unsafe { libc::tcgetpgrp(libc::STDERR_FILENO) };
        if owner == -1 {
            let err = std::io::Error::last_os_error();
            return err.raw_os_error() == Some(libc::ENOTTY);
        }
        owner == unsafe { libc::getpgrp() }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
