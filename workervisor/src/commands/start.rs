use super::CommandStatus;
use std::io::Write;
use workervisor_core::Supervisor;

pub fn execute(
    supervisor: &Supervisor,
    programs: &[String],
    out: &mut impl Write,
) -> anyhow::Result<CommandStatus> {
    for program in programs {
        writeln!(out, "Starting {} program", program)?;
        supervisor.start_program(program, true)?;
        writeln!(out, "{} program is started", program)?;
    }
    Ok(CommandStatus::Success)
}
