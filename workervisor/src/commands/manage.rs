use std::io::Write;
use std::process::ExitCode;
use std::str::FromStr;
use workervisor_core::Supervisor;

pub const ALL_PROGRAMS: &str = "all";

/// Outcome of one invocation, mapped onto the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
    /// Nagios CRITICAL.
    Critical,
}

impl CommandStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Critical => 2,
        }
    }
}

impl From<CommandStatus> for ExitCode {
    fn from(status: CommandStatus) -> Self {
        ExitCode::from(status.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManageAction {
    Start,
    Stop,
    Status,
}

impl ManageAction {
    pub const ALL: [ManageAction; 3] = [Self::Start, Self::Stop, Self::Status];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Status => "status",
        }
    }
}

impl FromStr for ManageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| {
                let available: Vec<&str> = Self::ALL.iter().map(|a| a.as_str()).collect();
                format!("Bad action \"{}\" (Available: {})", s, available.join(", "))
            })
    }
}

/// Checks every requested name against the registry and expands `all`.
pub fn resolve_programs(
    supervisor: &Supervisor,
    requested: &[String],
) -> Result<Vec<String>, String> {
    let mut available = supervisor.get_programs();
    available.sort_unstable();

    if let Some(bad) = requested
        .iter()
        .find(|p| *p != ALL_PROGRAMS && !available.contains(&p.as_str()))
    {
        return Err(format!(
            "Bad program \"{}\" (Available: {}, {})",
            bad,
            available.join(", "),
            ALL_PROGRAMS
        ));
    }

    if requested.iter().any(|p| p == ALL_PROGRAMS) {
        return Ok(available.into_iter().map(str::to_string).collect());
    }
    Ok(requested.to_vec())
}

pub fn execute(
    supervisor: &Supervisor,
    action: &str,
    programs: &[String],
    nagios: bool,
    out: &mut impl Write,
) -> anyhow::Result<CommandStatus> {
    let action = match action.parse::<ManageAction>() {
        Ok(action) => action,
        Err(message) => {
            writeln!(out, "{}", message)?;
            return Ok(CommandStatus::Failure);
        }
    };

    if nagios && action != ManageAction::Status {
        writeln!(
            out,
            "Nagios option can only be used with the \"status\" action"
        )?;
        return Ok(CommandStatus::Failure);
    }

    let programs = match resolve_programs(supervisor, programs) {
        Ok(programs) => programs,
        Err(message) => {
            writeln!(out, "{}", message)?;
            return Ok(CommandStatus::Failure);
        }
    };

    match action {
        ManageAction::Start => super::start::execute(supervisor, &programs, out),
        ManageAction::Stop => super::stop::execute(supervisor, &programs, out),
        ManageAction::Status if nagios => super::status::execute_nagios(supervisor, &programs, out),
        ManageAction::Status => super::status::execute(supervisor, &programs, out),
    }
}
