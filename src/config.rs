/*!
 * Safe-Syscall Configuration
 *
 * Strategy selection and the host signal set handled by the interception layer.
 */

use crate::core::{Result, SafeSyscallError};
use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const STRATEGY_ENV: &str = "SAFE_SYSCALL_STRATEGY";
pub const SIGNALS_ENV: &str = "SAFE_SYSCALL_SIGNALS";
pub const VERIFY_WINDOWS_ENV: &str = "SAFE_SYSCALL_VERIFY_WINDOWS";

/// How the check-then-call sequence is made atomic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Window trampoline when the host has one, otherwise mask
    #[default]
    Auto,
    /// Instruction window plus program-counter rewind
    Window,
    /// Block intercepted signals around the check and the call
    Mask,
}

impl FromStr for Strategy {
    type Err = SafeSyscallError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Strategy::Auto),
            "window" => Ok(Strategy::Window),
            "mask" => Ok(Strategy::Mask),
            other => Err(SafeSyscallError::config(format!("unknown strategy `{}`", other))),
        }
    }
}

/// Configuration for the safe-syscall core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeSyscallConfig {
    pub strategy: Strategy,

    /// Host signals routed through the rewind filter and the interceptor
    #[serde(with = "signal_names")]
    pub signals: Vec<Signal>,

    /// Run the handler on the thread's alternate signal stack when one is set
    pub alternate_stack: bool,

    /// Check every registered safe window at install time
    pub verify_windows: bool,
}

impl SafeSyscallConfig {
    pub fn new() -> Self {
        Self {
            strategy: Strategy::Auto,
            signals: default_signals(),
            alternate_stack: true,
            verify_windows: true,
        }
    }

    /// Configuration intercepting only the given signals
    pub fn with_signals(signals: impl IntoIterator<Item = Signal>) -> Self {
        Self {
            signals: signals.into_iter().collect(),
            ..Self::new()
        }
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Defaults overridden by environment variables
    ///
    /// Environment variables:
    /// - SAFE_SYSCALL_STRATEGY: auto | window | mask
    /// - SAFE_SYSCALL_SIGNALS: comma-separated signal names (e.g. SIGUSR1,SIGALRM)
    /// - SAFE_SYSCALL_VERIFY_WINDOWS: 0/false disables window verification
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(strategy) = lookup(STRATEGY_ENV) {
            config.strategy = strategy.parse()?;
        }
        if let Some(signals) = lookup(SIGNALS_ENV) {
            config.signals = parse_signal_list(&signals)?;
        }
        if let Some(verify) = lookup(VERIFY_WINDOWS_ENV) {
            config.verify_windows = !matches!(verify.trim(), "0" | "false" | "no");
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SafeSyscallError::config(format!("malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SafeSyscallError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Reject signals the handler must never own
    pub fn validate(&self) -> Result<()> {
        for signal in &self.signals {
            if matches!(signal, Signal::SIGKILL | Signal::SIGSTOP) {
                return Err(SafeSyscallError::config(format!("{} cannot be caught", signal)));
            }
            if is_synchronous(*signal) {
                return Err(SafeSyscallError::config(format!(
                    "{} is a synchronous fault and is not intercepted here",
                    signal
                )));
            }
        }
        Ok(())
    }
}

impl Default for SafeSyscallConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Asynchronous, catchable host signals
pub fn default_signals() -> Vec<Signal> {
    vec![
        Signal::SIGHUP,
        Signal::SIGINT,
        Signal::SIGQUIT,
        Signal::SIGUSR1,
        Signal::SIGUSR2,
        Signal::SIGPIPE,
        Signal::SIGALRM,
        Signal::SIGTERM,
        Signal::SIGCHLD,
        Signal::SIGCONT,
        Signal::SIGTSTP,
        Signal::SIGTTIN,
        Signal::SIGTTOU,
        Signal::SIGURG,
        Signal::SIGXCPU,
        Signal::SIGXFSZ,
        Signal::SIGVTALRM,
        Signal::SIGPROF,
        Signal::SIGWINCH,
        Signal::SIGIO,
    ]
}

fn is_synchronous(signal: Signal) -> bool {
    matches!(
        signal,
        Signal::SIGSEGV | Signal::SIGBUS | Signal::SIGILL | Signal::SIGFPE | Signal::SIGTRAP | Signal::SIGSYS
    )
}

fn parse_signal(name: &str) -> Result<Signal> {
    let name = name.trim().to_ascii_uppercase();
    let full = if name.starts_with("SIG") {
        name
    } else {
        format!("SIG{}", name)
    };
    Signal::from_str(&full).map_err(|_| SafeSyscallError::config(format!("unknown signal `{}`", full)))
}

fn parse_signal_list(list: &str) -> Result<Vec<Signal>> {
    list.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_signal)
        .collect()
}

mod signal_names {
    use nix::sys::signal::Signal;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(signals: &[Signal], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(signals.iter().map(|s| s.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Signal>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .iter()
            .map(|name| super::parse_signal(name).map_err(D::Error::custom))
            .collect()
    }
}
