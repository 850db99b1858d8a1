use super::CommandStatus;
use std::io::Write;
use workervisor_core::Supervisor;

pub fn execute(
    supervisor: &Supervisor,
    programs: &[String],
    out: &mut impl Write,
) -> anyhow::Result<CommandStatus> {
    for program in programs {
        writeln!(out, "Stopping {} program", program)?;
        supervisor.stop_program(program, true)?;
        writeln!(out, "{} program is stopped", program)?;
    }
    Ok(CommandStatus::Success)
}
