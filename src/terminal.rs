//! Terminal façade
//!
//! Owns the child session and the thread that reads its output. The host
//! talks to a [`Terminal`] from its own thread: input events go to the
//! child, paint queries read the emulator under the same lock the reader
//! thread takes while it processes output.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::core::{Cursor, Glyph, Rgb, SelectionKind, SelectionSnap, Snapshot, TermMode};
use crate::emulator::Emulator;
use crate::error::{Error, Result};
use crate::input::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use crate::pty::{ExitStatus, Pty, PtyError, WindowSize};

/// Bytes read from the PTY per iteration
const READ_BUFFER_SIZE: usize = 8192;
/// How long the reader waits for output before checking for shutdown
const POLL_TIMEOUT_MS: i32 = 100;
/// History rows scrolled per wheel notch
const WHEEL_LINES: usize = 3;

/// Callback run on the reader thread after output was processed
pub type Wakeup = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Stopped,
    Running,
}

/// An embedded terminal: emulator, child process and reader thread
pub struct Terminal {
    config: Config,
    state: TerminalState,
    emulator: Arc<Mutex<Emulator>>,
    pty: Option<Arc<Pty>>,
    reader: Option<JoinHandle<()>>,
    should_terminate: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    wakeup: Arc<Mutex<Option<Wakeup>>>,
}

impl Terminal {
    pub fn new(config: Config) -> Self {
        let emulator = Emulator::from_config(&config);
        Self {
            config,
            state: TerminalState::Stopped,
            emulator: Arc::new(Mutex::new(emulator)),
            pty: None,
            reader: None,
            should_terminate: Arc::new(AtomicBool::new(false)),
            closed: Arc::new(AtomicBool::new(false)),
            wakeup: Arc::new(Mutex::new(None)),
        }
    }

    /// Lifecycle state; stays `Running` after the child closes the
    /// channel, until `terminate` joins the reader
    pub fn state(&self) -> TerminalState {
        self.state
    }

    /// The reader is active and the channel is still open
    pub fn is_running(&self) -> bool {
        self.state == TerminalState::Running && !self.is_closed()
    }

    /// Process id of the current child, if one was spawned
    pub fn child_pid(&self) -> Option<Pid> {
        self.pty.as_ref().map(|pty| pty.child_pid())
    }

    /// The child closed its side of the terminal
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Register the callback run whenever new output has been processed
    /// and when the session closes
    pub fn set_wakeup(&self, wakeup: Wakeup) {
        *self.wakeup.lock() = Some(wakeup);
    }

    /// Spawn the shell and start reading its output
    pub fn start(&mut self) -> Result<()> {
        if self.state == TerminalState::Running {
            return Err(Error::AlreadyRunning);
        }

        let (cols, rows) = {
            let emulator = self.emulator.lock();
            (emulator.screen().cols(), emulator.screen().rows())
        };
        let pty = Pty::spawn_shell(&self.config.shell, WindowSize::from_grid(cols, rows))
            .map_err(Error::Spawn)?;
        let pty = Arc::new(pty);

        self.should_terminate.store(false, Ordering::Release);
        self.closed.store(false, Ordering::Release);

        let reader = ReaderLoop {
            pty: Arc::clone(&pty),
            emulator: Arc::clone(&self.emulator),
            should_terminate: Arc::clone(&self.should_terminate),
            closed: Arc::clone(&self.closed),
            wakeup: Arc::clone(&self.wakeup),
        };
        let handle = thread::Builder::new()
            .name("vtpane-reader".to_string())
            .spawn(move || reader.run())
            .map_err(Error::ThreadSpawn)?;

        info!(pid = %pty.child_pid(), cols, rows, "terminal started");
        self.pty = Some(pty);
        self.reader = Some(handle);
        self.state = TerminalState::Running;
        Ok(())
    }

    /// Stop the session: hang up the child, join the reader, close the PTY
    ///
    /// Safe to call more than once.
    pub fn terminate(&mut self) {
        if self.state == TerminalState::Stopped && self.reader.is_none() {
            return;
        }
        self.should_terminate.store(true, Ordering::Release);

        if let Some(pty) = &self.pty {
            if let Err(err) = pty.signal(Signal::SIGHUP) {
                warn!(error = %err, "failed to hang up child");
            }
        }
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                error!("reader thread panicked");
            }
        }
        // Last reference; dropping it reaps the child and closes the master
        self.pty = None;
        self.state = TerminalState::Stopped;
        info!("terminal stopped");
    }

    /// Exit status of the child once it has been reaped
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.pty.as_ref()?.try_wait().ok().flatten()
    }

    /// Resize the grid and tell the child
    pub fn resize(&self, cols: usize, rows: usize) -> Result<()> {
        let pty = self.running_pty()?;
        if cols == 0 || rows == 0 {
            return Err(Error::InvalidSize { cols, rows });
        }
        let mut emulator = self.emulator.lock();
        pty.resize(WindowSize::from_grid(cols, rows))?;
        emulator.resize(cols, rows);
        debug!(cols, rows, "terminal resized");
        Ok(())
    }

    // ---- input ----

    /// Send a key press to the child
    ///
    /// Returns `Ok(false)` when the key produces no bytes.
    pub fn feed_keyboard_input(&self, event: &KeyEvent) -> Result<bool> {
        let pty = self.running_pty()?;
        let bytes = {
            let mut emulator = self.emulator.lock();
            let bytes = emulator.encode_key(event);
            if !bytes.is_empty() {
                emulator.screen_mut().reset_view();
            }
            bytes
        };
        if bytes.is_empty() {
            return Ok(false);
        }
        pty.write_all(&bytes)?;
        Ok(true)
    }

    /// Handle a mouse event in painted cell coordinates
    ///
    /// With mouse reporting on, the event goes to the child unless Shift is
    /// held. Otherwise the left button drives the local selection (Alt for
    /// a rectangular one) and the wheel scrolls the history view.
    pub fn feed_mouse_input(&self, event: &MouseEvent) -> Result<()> {
        let mut emulator = self.emulator.lock();

        if emulator.mouse_reporting() && !event.modifiers.shift {
            let report = emulator.encode_mouse(event);
            drop(emulator);
            if let Some(bytes) = report {
                self.running_pty()?.write_all(&bytes)?;
            }
            return Ok(());
        }

        if event.button.is_wheel() {
            if event.kind != MouseEventKind::Press {
                return Ok(());
            }
            if let Some(bytes) = emulator.encode_alternate_scroll(event.button, WHEEL_LINES) {
                drop(emulator);
                self.running_pty()?.write_all(&bytes)?;
                return Ok(());
            }
            match event.button {
                MouseButton::WheelUp => emulator.screen_mut().scroll_view_up(WHEEL_LINES),
                MouseButton::WheelDown => emulator.screen_mut().scroll_view_down(WHEEL_LINES),
                _ => {}
            }
            return Ok(());
        }

        if event.button != MouseButton::Left {
            return Ok(());
        }
        let kind = if event.modifiers.alt {
            SelectionKind::Rectangular
        } else {
            SelectionKind::Regular
        };
        match event.kind {
            MouseEventKind::Press => {
                let snap = SelectionSnap::from_click_count(event.click_count);
                emulator.start_selection(event.col, event.row, snap);
            }
            MouseEventKind::Move => emulator.extend_selection(event.col, event.row, kind, false),
            MouseEventKind::Release => emulator.extend_selection(event.col, event.row, kind, true),
        }
        Ok(())
    }

    /// Send text as typed or inserted by the host, bracketed when the
    /// application enabled bracketed paste
    pub fn paste_text(&self, text: &str) -> Result<()> {
        let pty = self.running_pty()?;
        let bytes = {
            let mut emulator = self.emulator.lock();
            emulator.screen_mut().reset_view();
            emulator.encode_paste(text)
        };
        pty.write_all(&bytes)?;
        Ok(())
    }

    /// Paste clipboard contents; line breaks are sent as carriage returns
    pub fn paste_from_clipboard(&self, text: &str) -> Result<()> {
        let text = text.replace("\r\n", "\r").replace('\n', "\r");
        self.paste_text(&text)
    }

    /// Report a focus change when the application asked for it
    pub fn focus_changed(&self, focused: bool) -> Result<()> {
        let report = self.emulator.lock().encode_focus(focused);
        if let Some(bytes) = report {
            self.running_pty()?.write_all(&bytes)?;
        }
        Ok(())
    }

    // ---- selection and view ----

    pub fn copy_selection(&self) -> Option<String> {
        self.emulator.lock().selection_text()
    }

    pub fn clear_selection(&self) {
        self.emulator.lock().clear_selection();
    }

    /// Scroll the history view; positive values look further back
    pub fn scroll_view(&self, delta: isize) {
        let mut emulator = self.emulator.lock();
        let screen = emulator.screen_mut();
        if delta > 0 {
            screen.scroll_view_up(delta.unsigned_abs());
        } else {
            screen.scroll_view_down(delta.unsigned_abs());
        }
    }

    /// Run `f` with a consistent view of the screen for painting
    pub fn with_view<R>(&self, f: impl FnOnce(&TerminalView<'_>) -> R) -> R {
        let emulator = self.emulator.lock();
        f(&TerminalView {
            emulator: &emulator,
        })
    }

    /// Rows changed since the last call; they are marked clean
    pub fn take_dirty_rows(&self) -> Vec<usize> {
        let mut emulator = self.emulator.lock();
        let rows = emulator.screen().dirty_rows();
        emulator.screen_mut().mark_clean();
        rows
    }

    pub fn snapshot(&self) -> Snapshot {
        self.emulator.lock().snapshot()
    }

    pub fn title(&self) -> String {
        self.emulator.lock().title().to_string()
    }

    /// Whether the child rang the bell since the last call
    pub fn take_bell(&self) -> bool {
        self.emulator.lock().take_bell()
    }

    fn running_pty(&self) -> Result<&Arc<Pty>> {
        match &self.pty {
            Some(pty) if self.is_running() => Ok(pty),
            _ => Err(Error::NotRunning),
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// Read access to the emulator while the paint lock is held
pub struct TerminalView<'a> {
    emulator: &'a Emulator,
}

impl TerminalView<'_> {
    pub fn cols(&self) -> usize {
        self.emulator.screen().cols()
    }

    pub fn rows(&self) -> usize {
        self.emulator.screen().rows()
    }

    /// Glyph to paint at a cell, accounting for the history view
    pub fn glyph(&self, col: usize, row: usize) -> Option<&Glyph> {
        self.emulator.screen().view_glyph(col, row)
    }

    /// Foreground and background RGB to paint a cell with
    pub fn resolved_colors(&self, col: usize, row: usize) -> Option<(Rgb, Rgb)> {
        self.emulator.resolved_colors(col, row)
    }

    pub fn cursor(&self) -> &Cursor {
        self.emulator.screen().cursor()
    }

    /// The cursor is shown and the view is on the live screen
    pub fn cursor_visible(&self) -> bool {
        let screen = self.emulator.screen();
        screen.mode().contains(TermMode::SHOW_CURSOR) && screen.view_offset() == 0
    }

    pub fn cursor_color(&self) -> Rgb {
        self.emulator.palette().cursor()
    }

    pub fn is_row_dirty(&self, row: usize) -> bool {
        self.emulator.screen().is_row_dirty(row)
    }

    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        self.emulator.is_selected(col, row)
    }

    pub fn view_offset(&self) -> usize {
        self.emulator.screen().view_offset()
    }

    pub fn title(&self) -> &str {
        self.emulator.title()
    }
}

/// State moved onto the reader thread
struct ReaderLoop {
    pty: Arc<Pty>,
    emulator: Arc<Mutex<Emulator>>,
    should_terminate: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
    wakeup: Arc<Mutex<Option<Wakeup>>>,
}

impl ReaderLoop {
    fn run(self) {
        debug!("reader thread started");
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        while !self.should_terminate.load(Ordering::Acquire) {
            match self.pty.poll_read(POLL_TIMEOUT_MS) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    error!(error = %err, "poll failed");
                    break;
                }
            }

            let n = match self.pty.read(&mut buf) {
                Ok(0) => {
                    info!("child closed the terminal");
                    break;
                }
                Ok(n) => n,
                Err(PtyError::WouldBlock) => continue,
                Err(err) => {
                    warn!(error = %err, "read failed");
                    break;
                }
            };

            let responses = {
                let mut emulator = self.emulator.lock();
                emulator.process(&buf[..n]);
                emulator.take_responses()
            };
            if !responses.is_empty() {
                if let Err(err) = self.pty.write_all(&responses) {
                    warn!(error = %err, "failed to send reply");
                }
            }
            self.notify();
        }

        self.closed.store(true, Ordering::Release);
        self.notify();
        debug!("reader thread exiting");
    }

    fn notify(&self) {
        let wakeup = self.wakeup.lock().clone();
        if let Some(wakeup) = wakeup {
            wakeup();
        }
    }
}
