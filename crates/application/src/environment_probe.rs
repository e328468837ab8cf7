//! Runtime environment detection.
//!
//! Answers "is this process hosted by the desktop shell, and what does
//! the shell report about itself?". The synchronous answer is memoized:
//! the shell cannot appear or disappear while the process runs, so the
//! globals are read once and the result is reused.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use relaydesk_domain::{
    EnvironmentInfo, PLATFORM_SERVER, PLATFORM_SHELL, PLATFORM_UNKNOWN, ShellGlobals,
};
use tracing::{debug, warn};

use crate::ports::ShellDetector;

const UNKNOWN: u8 = 0;
const NOT_SHELL: u8 = 1;
const SHELL: u8 = 2;

static GLOBAL: OnceLock<Arc<EnvironmentProbe>> = OnceLock::new();

/// Memoizing environment probe over a [`ShellDetector`].
pub struct EnvironmentProbe {
    detector: Arc<dyn ShellDetector>,
    cached: AtomicU8,
}

impl EnvironmentProbe {
    /// Creates a probe with an empty cache.
    #[must_use]
    pub fn new(detector: Arc<dyn ShellDetector>) -> Self {
        Self {
            detector,
            cached: AtomicU8::new(UNKNOWN),
        }
    }

    /// Installs the process-wide probe. The first installation wins and
    /// later calls return the probe that is already installed.
    pub fn install_global(detector: Arc<dyn ShellDetector>) -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new(detector))))
    }

    /// Returns the process-wide probe, if one was installed.
    #[must_use]
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    /// Returns whether the process runs inside the desktop shell.
    ///
    /// Synchronous and safe to call before any async setup. The first
    /// evaluation is cached; the globals are never read again until
    /// [`reset`](Self::reset). Two racing first calls both evaluate and
    /// store the same value.
    #[must_use]
    pub fn quick_check(&self) -> bool {
        match self.cached.load(Ordering::Acquire) {
            SHELL => true,
            NOT_SHELL => false,
            _ => {
                let is_shell = self.evaluate();
                self.remember(is_shell);
                debug!(is_shell, "shell detection evaluated");
                is_shell
            }
        }
    }

    /// Clears the memoized answer so the next check reads the globals again.
    pub fn reset(&self) {
        self.cached.store(UNKNOWN, Ordering::Release);
    }

    /// Probes the environment fully, including the shell's version and
    /// platform label.
    ///
    /// Never fails: shell API errors fall back to placeholder values, and
    /// a failure to read the globals yields [`EnvironmentInfo::unknown`].
    pub async fn full_info(&self) -> EnvironmentInfo {
        let globals = match self.detector.globals() {
            Ok(globals) => globals,
            Err(error) => {
                warn!(%error, "environment probe failed");
                return EnvironmentInfo::unknown();
            }
        };

        if !self.quick_check() {
            return EnvironmentInfo::browser();
        }

        let shell_version = match self.detector.app_version().await {
            Ok(version) => Some(version),
            Err(error) => {
                debug!(%error, "shell version unavailable");
                None
            }
        };

        let mut platform = match self.detector.platform().await {
            Ok(platform) => platform,
            Err(error) => {
                debug!(%error, "shell platform unavailable");
                PLATFORM_SHELL.to_string()
            }
        };
        if let Some(label) = globals.as_ref().and_then(ShellGlobals::window_label) {
            platform = format!("{platform} (window: {label})");
        }

        EnvironmentInfo {
            is_shell: true,
            platform,
            shell_version,
        }
    }

    /// Returns the platform label, or `"server"` when there is no
    /// execution context to probe. The memoized flag is overwritten with
    /// the result of the full probe.
    pub async fn detect_platform(&self) -> String {
        match self.detector.globals() {
            Ok(None) => PLATFORM_SERVER.to_string(),
            Ok(Some(_)) => {
                let info = self.full_info().await;
                self.remember(info.is_shell);
                info.platform
            }
            Err(error) => {
                warn!(%error, "platform detection failed");
                PLATFORM_UNKNOWN.to_string()
            }
        }
    }

    fn remember(&self, is_shell: bool) {
        self.cached
            .store(if is_shell { SHELL } else { NOT_SHELL }, Ordering::Release);
    }

    fn evaluate(&self) -> bool {
        match self.detector.globals() {
            Ok(Some(globals)) => globals.indicates_shell(),
            Ok(None) => false,
            Err(error) => {
                warn!(%error, "could not read shell globals, assuming browser");
                false
            }
        }
    }
}
