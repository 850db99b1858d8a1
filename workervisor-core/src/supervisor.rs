use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::RpcError;
use crate::process::{GroupActionResult, ProcessInfo, ProgramStatus};
use crate::transport::{Transport, TransportRegistry};

/// The three remote operations this crate needs from the supervision daemon.
pub trait SupervisorApi: Send + Sync {
    fn get_all_processes(&self) -> Result<Vec<ProcessInfo>, RpcError>;

    fn start_process_group(
        &self,
        name: &str,
        wait: bool,
    ) -> Result<Vec<GroupActionResult>, RpcError>;

    fn stop_process_group(&self, name: &str, wait: bool)
    -> Result<Vec<GroupActionResult>, RpcError>;
}

/// Resolves transports to Supervisor programs and drives them through the API.
pub struct Supervisor {
    api: Box<dyn SupervisorApi>,
    transports: Arc<TransportRegistry>,
}

impl Supervisor {
    pub fn new(api: impl SupervisorApi + 'static, transports: Arc<TransportRegistry>) -> Self {
        Self {
            api: Box::new(api),
            transports,
        }
    }

    pub fn api(&self) -> &dyn SupervisorApi {
        self.api.as_ref()
    }

    pub fn transports(&self) -> &TransportRegistry {
        &self.transports
    }

    pub fn get_transport(&self, name: &str) -> crate::Result<&Transport> {
        self.transports
            .get(name)
            .ok_or_else(|| crate::Error::TransportNotFound(name.to_string()))
    }

    pub fn get_programs(&self) -> Vec<&str> {
        self.transports.programs()
    }

    pub fn get_transports_names_by_program(&self, program: &str) -> Vec<&str> {
        self.transports.transports_for_program(program)
    }

    pub fn start_program(
        &self,
        program: &str,
        wait: bool,
    ) -> Result<Vec<GroupActionResult>, RpcError> {
        debug!("Starting process group {} (wait: {})", program, wait);
        self.api.start_process_group(program, wait)
    }

    pub fn stop_program(
        &self,
        program: &str,
        wait: bool,
    ) -> Result<Vec<GroupActionResult>, RpcError> {
        debug!("Stopping process group {} (wait: {})", program, wait);
        self.api.stop_process_group(program, wait)
    }

    /// Status of each requested program, in request order, from a single
    /// process listing.
    pub fn get_programs_status<S: AsRef<str>>(
        &self,
        programs: &[S],
    ) -> Result<Vec<ProgramStatus>, RpcError> {
        let mut by_group: HashMap<String, Vec<ProcessInfo>> = HashMap::new();
        for process in self.api.get_all_processes()? {
            if programs.iter().any(|p| p.as_ref() == process.group) {
                by_group
                    .entry(process.group.clone())
                    .or_default()
                    .push(process);
            }
        }

        let mut result: Vec<ProgramStatus> = Vec::with_capacity(programs.len());
        for program in programs {
            let program = program.as_ref();
            if result.iter().any(|s| s.program == program) {
                continue;
            }
            result.push(ProgramStatus {
                program: program.to_string(),
                processes: by_group.remove(program).unwrap_or_default(),
            });
        }

        Ok(result)
    }
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("transports", &self.transports)
            .finish_non_exhaustive()
    }
}
