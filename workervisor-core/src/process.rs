use serde::{Deserialize, Serialize};
use std::fmt;

/// Process states as reported by supervisord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Backoff,
    Stopping,
    Exited,
    Fatal,
    Unknown,
}

impl ProcessState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Stopped,
            10 => Self::Starting,
            20 => Self::Running,
            30 => Self::Backoff,
            40 => Self::Stopping,
            100 => Self::Exited,
            200 => Self::Fatal,
            _ => Self::Unknown,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::Stopped => 0,
            Self::Starting => 10,
            Self::Running => 20,
            Self::Backoff => 30,
            Self::Stopping => 40,
            Self::Exited => 100,
            Self::Fatal => 200,
            Self::Unknown => 1000,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Backoff => "BACKOFF",
            Self::Stopping => "STOPPING",
            Self::Exited => "EXITED",
            Self::Fatal => "FATAL",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Snapshot of one supervised process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub group: String,
    pub name: String,
    pub state: ProcessState,
    pub state_name: String,
    pub pid: u32,
}

impl ProcessInfo {
    pub fn new(group: impl Into<String>, name: impl Into<String>, state: ProcessState) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            state,
            state_name: state.to_string(),
            pid: 0,
        }
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}

/// Per-process result of a group start or stop call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupActionResult {
    pub name: String,
    pub group: String,
    pub status: i64,
    pub description: String,
}

/// Processes found for one requested program. Empty when Supervisor does not know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramStatus {
    pub program: String,
    pub processes: Vec<ProcessInfo>,
}

impl ProgramStatus {
    pub fn is_found(&self) -> bool {
        !self.processes.is_empty()
    }

    pub fn running(&self) -> usize {
        self.processes.iter().filter(|p| p.is_running()).count()
    }

    /// Not-running processes; a program unknown to Supervisor counts as one.
    pub fn stopped(&self) -> usize {
        if self.processes.is_empty() {
            1
        } else {
            self.processes.len() - self.running()
        }
    }
}
