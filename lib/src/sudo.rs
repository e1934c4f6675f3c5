use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::SweepError;

/// How long macOS keeps sudo credentials cached by default.
const AUTH_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Interval between background credential refreshes.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(2 * 60);
/// Sleep slice inside the keep-alive loop so teardown stays responsive.
const KEEP_ALIVE_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Default)]
struct AuthState {
    authenticated: bool,
    last_auth: Option<Instant>,
}

/// A time-boxed grant of elevated execution rights.
///
/// The session is owned by the caller and passed by reference into any
/// operation that needs elevation. On the first successful interactive
/// authentication a keep-alive thread starts refreshing the credentials
/// every two minutes; the thread is stopped when the session is dropped
/// or when a refresh fails.
pub struct SudoSession {
    state: Arc<Mutex<AuthState>>,
    stop: Arc<AtomicBool>,
    keep_alive: Mutex<Option<JoinHandle<()>>>,
}

impl SudoSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AuthState::default())),
            stop: Arc::new(AtomicBool::new(false)),
            keep_alive: Mutex::new(None),
        }
    }

    /// Whether the session currently holds valid credentials.
    pub fn authenticated(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.authenticated
            && state
                .last_auth
                .is_some_and(|at| at.elapsed() < AUTH_TIMEOUT)
    }

    /// Ensures the session holds valid elevated credentials.
    ///
    /// Refreshes non-interactively when the previous grant is still
    /// inside the timeout, otherwise validates via `sudo -v`, which may
    /// block on the user's password prompt.
    pub fn ensure_access(&self) -> Result<(), SweepError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let inside_timeout = state.authenticated
                && state
                    .last_auth
                    .is_some_and(|at| at.elapsed() < AUTH_TIMEOUT);

            if inside_timeout && refresh_credentials() {
                state.last_auth = Some(Instant::now());
                return Ok(());
            }
        }

        log::debug!("Requesting interactive sudo authentication");
        let status = Command::new("sudo").arg("-v").status();
        let ok = status.map_or(false, |status| status.success());

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !ok {
            state.authenticated = false;
            return Err(SweepError::SudoDenied);
        }

        state.authenticated = true;
        state.last_auth = Some(Instant::now());
        drop(state);

        self.spawn_keep_alive();
        Ok(())
    }

    /// Runs `sudo <args...>`, authenticating first if necessary.
    pub fn run(&self, args: &[&str]) -> Result<(), SweepError> {
        self.ensure_access()?;
        let status = Command::new("sudo").args(args).status()?;
        if !status.success() {
            return Err(SweepError::CommandFailed(format!(
                "sudo {} exited with {status}",
                args.join(" ")
            )));
        }
        Ok(())
    }

    /// Runs `sudo <args...>` and captures stdout.
    pub fn run_with_output(&self, args: &[&str]) -> Result<Vec<u8>, SweepError> {
        self.ensure_access()?;
        let output = Command::new("sudo").args(args).output()?;
        if !output.status.success() {
            return Err(SweepError::CommandFailed(format!(
                "sudo {} exited with {}",
                args.join(" "),
                output.status
            )));
        }
        Ok(output.stdout)
    }

    /// Non-interactive variant for best-effort probes: never prompts,
    /// returns `None` when credentials are missing or the command fails.
    pub fn try_run_with_output(&self, args: &[&str]) -> Option<Vec<u8>> {
        let output = Command::new("sudo").arg("-n").args(args).output().ok()?;
        output.status.success().then_some(output.stdout)
    }

    fn spawn_keep_alive(&self) {
        let mut slot = self
            .keep_alive
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // A thread that exited on a failed refresh must not block the
        // respawn after a later successful re-authentication.
        reap_finished(&mut slot);
        if slot.is_some() {
            return;
        }

        let state = Arc::clone(&self.state);
        let stop = Arc::clone(&self.stop);
        *slot = Some(thread::spawn(move || {
            let mut last_refresh = Instant::now();
            loop {
                thread::sleep(KEEP_ALIVE_TICK);
                if stop.load(Ordering::Relaxed) {
                    return;
                }
                if last_refresh.elapsed() < KEEP_ALIVE_INTERVAL {
                    continue;
                }
                last_refresh = Instant::now();

                let ok = refresh_credentials();
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if ok {
                    state.last_auth = Some(Instant::now());
                } else {
                    log::warn!("Sudo credentials expired, stopping keep-alive");
                    state.authenticated = false;
                    return;
                }
            }
        }));
    }
}

impl Default for SudoSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SudoSession {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        let handle = self
            .keep_alive
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

fn reap_finished(slot: &mut Option<JoinHandle<()>>) {
    if slot.as_ref().is_some_and(JoinHandle::is_finished) {
        if let Some(handle) = slot.take() {
            let _ = handle.join();
        }
    }
}

/// `sudo -n true` succeeds only while cached credentials are valid.
fn refresh_credentials() -> bool {
    Command::new("sudo")
        .args(["-n", "true"])
        .status()
        .map_or(false, |status| status.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_is_unauthenticated() {
        let session = SudoSession::new();
        assert!(!session.authenticated());
    }

    #[test]
    fn dropping_without_auth_does_not_block() {
        let session = SudoSession::new();
        drop(session);
    }

    #[test]
    fn finished_keep_alive_slots_are_reaped() {
        let mut slot = Some(thread::spawn(|| {}));
        while !slot.as_ref().is_some_and(JoinHandle::is_finished) {
            thread::sleep(Duration::from_millis(1));
        }
        reap_finished(&mut slot);
        assert!(slot.is_none());
    }

    #[test]
    fn live_keep_alive_slots_are_kept() {
        let (tx, rx) = std::sync::mpsc::channel::<()>();
        let mut slot = Some(thread::spawn(move || {
            let _ = rx.recv();
        }));

        reap_finished(&mut slot);
        let handle = slot.take().expect("running thread must stay in the slot");

        drop(tx);
        handle.join().unwrap();
    }
}
