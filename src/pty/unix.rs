//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.

use std::ffi::{CString, OsStr, OsString};
use std::os::fd::BorrowedFd;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, c_char, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{chdir, close, dup2, fork, read, setsid, write, ForkResult, Pid};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{ExitStatus, PtyError, PtyResult, WindowSize};
use crate::config::ShellConfig;

/// How long a hung-up child gets to exit before it is killed
const HANGUP_GRACE: Duration = Duration::from_millis(500);
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Search path used when the environment has no `PATH`
const DEFAULT_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Everything the forked child needs, prepared before `fork`
///
/// Only async-signal-safe calls may run between `fork` and `exec`, so the
/// child must not allocate: the argument and environment arrays, and every
/// path the program may live at, are built here in the parent.
struct ChildSetup {
    slave_name: CString,
    /// Candidate paths for the program, tried in order
    candidates: Vec<CString>,
    working_dir: Option<CString>,
    /// Own the strings behind the pointer arrays
    _argv: Vec<CString>,
    _envp: Vec<CString>,
    /// NULL-terminated pointers into the argument and environment strings
    argv_ptrs: Vec<*const c_char>,
    envp_ptrs: Vec<*const c_char>,
}

impl ChildSetup {
    fn new(
        slave_name: CString,
        program: &str,
        argv: Vec<CString>,
        extra_env: &[(String, String)],
        working_dir: Option<CString>,
    ) -> PtyResult<Self> {
        let vars = child_environment(extra_env);
        let path = vars
            .iter()
            .find(|(key, _)| key.as_os_str() == OsStr::new("PATH"))
            .map(|(_, value)| value.clone())
            .unwrap_or_else(|| OsString::from(DEFAULT_PATH));
        let candidates = program_candidates(program, &path)?;

        let mut envp = Vec::with_capacity(vars.len());
        for (key, value) in vars {
            let mut entry = key.into_vec();
            entry.push(b'=');
            entry.extend_from_slice(value.as_bytes());
            let entry = CString::new(entry).map_err(|e| {
                PtyError::InvalidArgument(String::from_utf8_lossy(&e.into_vec()).into_owned())
            })?;
            envp.push(entry);
        }

        let argv_ptrs = null_terminated(&argv);
        let envp_ptrs = null_terminated(&envp);
        Ok(Self {
            slave_name,
            candidates,
            working_dir,
            _argv: argv,
            _envp: envp,
            argv_ptrs,
            envp_ptrs,
        })
    }
}

/// The parent's environment with the terminal variables and the configured
/// extras applied on top
fn child_environment(extra: &[(String, String)]) -> Vec<(OsString, OsString)> {
    let mut vars: Vec<(OsString, OsString)> = std::env::vars_os().collect();
    let overrides = [("TERM", "xterm-256color"), ("COLORTERM", "truecolor")]
        .into_iter()
        .chain(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    for (key, value) in overrides {
        vars.retain(|(k, _)| k.as_os_str() != OsStr::new(key));
        vars.push((OsString::from(key), OsString::from(value)));
    }
    vars
}

/// Paths to try for `program`, the way `execvp` searches `PATH`
fn program_candidates(program: &str, path: &OsStr) -> PtyResult<Vec<CString>> {
    if program.contains('/') {
        return Ok(vec![c_string(program)?]);
    }
    std::env::split_paths(path)
        .map(|dir| {
            let dir = if dir.as_os_str().is_empty() {
                Path::new(".").to_path_buf()
            } else {
                dir
            };
            c_string(&dir.join(program).to_string_lossy())
        })
        .collect()
}

fn null_terminated(strings: &[CString]) -> Vec<*const c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// A pseudoterminal with a spawned child process
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The child process ID
    child_pid: Pid,
    /// Whether the child is still running
    child_alive: AtomicBool,
    exit_status: Mutex<Option<ExitStatus>>,
}

impl Pty {
    /// Spawn `program` with `args` on a new PTY of the given size
    pub fn spawn(program: &str, args: &[&str], size: WindowSize) -> PtyResult<Self> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        Self::spawn_with(program, &args, &[], None, size)
    }

    /// Spawn the configured shell: its program, else `$SHELL`, else `/bin/sh`
    pub fn spawn_shell(shell: &ShellConfig, size: WindowSize) -> PtyResult<Self> {
        let program = shell.resolve_program();
        Self::spawn_with(
            &program,
            &shell.args,
            &shell.env,
            shell.working_dir.as_deref(),
            size,
        )
    }

    fn spawn_with(
        program: &str,
        args: &[String],
        env: &[(String, String)],
        working_dir: Option<&Path>,
        size: WindowSize,
    ) -> PtyResult<Self> {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push(c_string(program)?);
        for arg in args {
            argv.push(c_string(arg)?);
        }
        let working_dir = match working_dir {
            Some(dir) => Some(c_string(&dir.to_string_lossy())?),
            None => None,
        };

        // Open PTY master
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // SAFETY: ptsname is not thread-safe, but we're calling it immediately
        // after unlockpt and before any other thread could interfere
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;
        let slave_name = c_string(&slave_name)?;

        set_window_size(master.as_raw_fd(), size)?;

        let setup = ChildSetup::new(slave_name, program, argv, env, working_dir)?;

        // SAFETY: the child only calls exec_child, which never returns
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                exec_child(&setup)
            }
            ForkResult::Parent { child } => {
                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)
                    .map_err(PtyError::SetNonBlocking)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::SetNonBlocking)?;

                info!(pid = child.as_raw(), program, "spawned child on pty");
                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: AtomicBool::new(true),
                    exit_status: Mutex::new(None),
                })
            }
        }
    }

    /// Get the raw file descriptor of the PTY master
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check if the child process is still running
    pub fn is_alive(&self) -> bool {
        matches!(self.try_wait(), Ok(None))
    }

    /// Reap the child if it has exited, without blocking
    pub fn try_wait(&self) -> PtyResult<Option<ExitStatus>> {
        if !self.child_alive.load(Ordering::Acquire) {
            return Ok(*self.exit_status.lock());
        }
        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => Ok(None),
            Ok(status) => Ok(self.record_exit(status)),
            // Already reaped elsewhere
            Err(Errno::ECHILD) => {
                self.child_alive.store(false, Ordering::Release);
                Ok(*self.exit_status.lock())
            }
            Err(e) => Err(PtyError::Wait(e)),
        }
    }

    /// Wait for the child process to exit
    pub fn wait(&self) -> PtyResult<ExitStatus> {
        loop {
            if !self.child_alive.load(Ordering::Acquire) {
                return Ok(self.exit_status.lock().unwrap_or(ExitStatus::Exited(0)));
            }
            match waitpid(self.child_pid, None) {
                Ok(status) => {
                    if let Some(exit) = self.record_exit(status) {
                        return Ok(exit);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::ECHILD) => {
                    self.child_alive.store(false, Ordering::Release);
                }
                Err(e) => return Err(PtyError::Wait(e)),
            }
        }
    }

    fn record_exit(&self, status: WaitStatus) -> Option<ExitStatus> {
        let exit = match status {
            WaitStatus::Exited(_, code) => ExitStatus::Exited(code),
            WaitStatus::Signaled(_, signal, _) => ExitStatus::Signaled(signal as i32),
            _ => return None,
        };
        debug!(pid = self.child_pid.as_raw(), ?exit, "child exited");
        *self.exit_status.lock() = Some(exit);
        self.child_alive.store(false, Ordering::Release);
        Some(exit)
    }

    /// Read from the PTY master (non-blocking)
    ///
    /// `Ok(0)` means the stream has ended: EOF, or `EIO` once the slave side
    /// is gone. `WouldBlock` means nothing is available yet.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(n),
            Err(Errno::EIO) => Ok(0),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Err(PtyError::WouldBlock),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write to the PTY master
    ///
    /// Returns the number of bytes written.
    pub fn write(&self, data: &[u8]) -> PtyResult<usize> {
        match write(self.master.as_raw_fd(), data) {
            Ok(n) => Ok(n),
            Err(Errno::EAGAIN) | Err(Errno::EINTR) => Err(PtyError::WouldBlock),
            Err(e) => Err(PtyError::Write(e)),
        }
    }

    /// Write all data to the PTY master, waiting out a full kernel buffer
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            match self.write(data) {
                Ok(0) => return Err(PtyError::Write(Errno::EIO)),
                Ok(n) => data = &data[n..],
                Err(PtyError::WouldBlock) => {
                    self.poll(PollFlags::POLLOUT, 100)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Poll for data available to read
    ///
    /// Returns true if data is available (or the stream has hung up),
    /// false if the timeout expired.
    pub fn poll_read(&self, timeout_ms: i32) -> PtyResult<bool> {
        self.poll(PollFlags::POLLIN, timeout_ms)
    }

    fn poll(&self, events: PollFlags, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: The master fd is valid for the lifetime of this Pty
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, events)];
        match poll(&mut fds, timeout_ms) {
            Ok(0) | Err(Errno::EINTR) => Ok(false),
            Ok(_) => Ok(fds[0]
                .revents()
                .is_some_and(|r| r.intersects(events | PollFlags::POLLHUP | PollFlags::POLLERR))),
            Err(e) => Err(PtyError::Poll(e)),
        }
    }

    /// Resize the PTY; the kernel delivers SIGWINCH to the child
    pub fn resize(&self, size: WindowSize) -> PtyResult<()> {
        set_window_size(self.master.as_raw_fd(), size)
    }

    /// Current kernel window size of the PTY
    pub fn window_size(&self) -> PtyResult<WindowSize> {
        get_window_size(self.master.as_raw_fd())
    }

    /// Send a signal to the child process
    pub fn signal(&self, signal: Signal) -> PtyResult<()> {
        if !self.child_alive.load(Ordering::Acquire) {
            return Ok(());
        }
        match kill(self.child_pid, signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(PtyError::Signal(e)),
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        if !self.is_alive() {
            // The master fd closes when `self.master` drops
            return;
        }
        if let Err(e) = self.signal(Signal::SIGHUP) {
            warn!("failed to hang up child: {}", e);
        }

        let deadline = Instant::now() + HANGUP_GRACE;
        while Instant::now() < deadline {
            match self.try_wait() {
                Ok(None) => thread::sleep(REAP_POLL_INTERVAL),
                Ok(Some(_)) => return,
                Err(e) => {
                    warn!("failed to reap child: {}", e);
                    return;
                }
            }
        }

        warn!(pid = self.child_pid.as_raw(), "child ignored SIGHUP, killing it");
        if let Err(e) = self.signal(Signal::SIGKILL) {
            warn!("failed to kill child: {}", e);
        }
        if let Err(e) = self.wait() {
            warn!("failed to reap child: {}", e);
        }
    }
}

fn c_string(s: &str) -> PtyResult<CString> {
    CString::new(s).map_err(|_| PtyError::InvalidArgument(s.to_string()))
}

/// Runs in the forked child: become session leader on the slave and exec
///
/// Any failure exits with status 127; nothing here may return into the
/// parent's code.
fn exec_child(setup: &ChildSetup) -> ! {
    if setsid().is_err() {
        child_exit();
    }

    let Ok(slave_fd) = open(setup.slave_name.as_c_str(), OFlag::O_RDWR, Mode::empty()) else {
        child_exit();
    };

    // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal
    unsafe {
        libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0);
    }

    for fd in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
        if dup2(slave_fd, fd).is_err() {
            child_exit();
        }
    }
    if slave_fd > STDERR_FILENO {
        let _ = close(slave_fd);
    }

    if let Some(dir) = &setup.working_dir {
        if chdir(dir.as_c_str()).is_err() {
            child_exit();
        }
    }

    for candidate in &setup.candidates {
        // SAFETY: every pointer refers to a CString owned by `setup`, and
        // both arrays are NULL-terminated. execve only returns on failure.
        unsafe {
            libc::execve(
                candidate.as_ptr(),
                setup.argv_ptrs.as_ptr(),
                setup.envp_ptrs.as_ptr(),
            );
        }
    }
    child_exit()
}

fn child_exit() -> ! {
    // SAFETY: _exit skips destructors and atexit handlers of the parent's
    // state, which is what a failed child must do
    unsafe { libc::_exit(127) }
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(Errno::last()))
    } else {
        Ok(())
    }
}

/// Get the window size from a PTY file descriptor
fn get_window_size(fd: RawFd) -> PtyResult<WindowSize> {
    let mut winsize = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };

    // SAFETY: TIOCGWINSZ is a valid ioctl for getting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut winsize) };

    if result < 0 {
        Err(PtyError::GetWinsize(Errno::last()))
    } else {
        Ok(WindowSize {
            rows: winsize.ws_row,
            cols: winsize.ws_col,
            pixel_width: winsize.ws_xpixel,
            pixel_height: winsize.ws_ypixel,
        })
    }
}
