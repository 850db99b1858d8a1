use super::CommandStatus;
use colored::Colorize;
use std::io::Write;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use workervisor_core::{ProgramStatus, Supervisor};

pub const NOT_FOUND: &str = "Not found in Supervisor";

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Transport(s)")]
    transports: String,
    #[tabled(rename = "Process")]
    process: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "PID")]
    pid: String,
}

fn rows(supervisor: &Supervisor, status: &ProgramStatus) -> Vec<ProcessRow> {
    let transports = supervisor
        .get_transports_names_by_program(&status.program)
        .join(", ");

    if !status.is_found() {
        return vec![ProcessRow {
            program: status.program.clone(),
            transports,
            process: NOT_FOUND.red().to_string(),
            state: String::new(),
            pid: String::new(),
        }];
    }

    status
        .processes
        .iter()
        .map(|process| ProcessRow {
            program: status.program.clone(),
            transports: transports.clone(),
            process: process.name.clone(),
            state: if process.is_running() {
                process.state_name.green().to_string()
            } else {
                process.state_name.red().to_string()
            },
            pid: process.pid.to_string(),
        })
        .collect()
}

pub fn execute(
    supervisor: &Supervisor,
    programs: &[String],
    out: &mut impl Write,
) -> anyhow::Result<CommandStatus> {
    let statuses = supervisor.get_programs_status(programs)?;

    let healthy = statuses
        .iter()
        .all(|s| s.is_found() && s.processes.iter().all(|p| p.is_running()));
    let rows: Vec<ProcessRow> = statuses.iter().flat_map(|s| rows(supervisor, s)).collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    writeln!(out, "{}", table)?;

    Ok(if healthy {
        CommandStatus::Success
    } else {
        CommandStatus::Failure
    })
}

pub fn execute_nagios(
    supervisor: &Supervisor,
    programs: &[String],
    out: &mut impl Write,
) -> anyhow::Result<CommandStatus> {
    let statuses = supervisor.get_programs_status(programs)?;
    let running: usize = statuses.iter().map(ProgramStatus::running).sum();
    let stopped: usize = statuses.iter().map(ProgramStatus::stopped).sum();

    let (label, status) = if stopped > 0 {
        ("CRITICAL", CommandStatus::Critical)
    } else {
        ("OK", CommandStatus::Success)
    };
    writeln!(
        out,
        "{} - Running processes: {} Stopped processes: {}",
        label, running, stopped
    )?;
    Ok(status)
}
