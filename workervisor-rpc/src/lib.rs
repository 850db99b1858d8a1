//! XML-RPC client for the supervisord control interface.

mod http;

pub use http::{HttpError, HttpTransport, basic_auth};

use tracing::debug;
use workervisor_core::{
    GroupActionResult, ProcessInfo, ProcessState, RpcError, SupervisorApi, SupervisorConfig,
};
use xmlrpc::{Request, Value};

pub struct XmlRpcSupervisorApi {
    agent: ureq::Agent,
    url: String,
    authorization: Option<String>,
}

impl XmlRpcSupervisorApi {
    pub fn from_config(config: &SupervisorConfig) -> workervisor_core::Result<Self> {
        let authorization = config
            .credentials()?
            .map(|(username, password)| basic_auth(username, password));

        Ok(Self {
            agent: ureq::AgentBuilder::new().timeout(config.timeout()).build(),
            url: config.url(),
            authorization,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn call(&self, request: Request<'_>) -> Result<Value, RpcError> {
        let transport = HttpTransport::new(&self.agent, &self.url, self.authorization.as_deref());
        request.call(transport).map_err(map_error)
    }
}

impl SupervisorApi for XmlRpcSupervisorApi {
    fn get_all_processes(&self) -> Result<Vec<ProcessInfo>, RpcError> {
        debug!("supervisor.getAllProcessInfo");
        let value = self.call(Request::new("supervisor.getAllProcessInfo"))?;
        as_array(&value)?.iter().map(process_info).collect()
    }

    fn start_process_group(
        &self,
        name: &str,
        wait: bool,
    ) -> Result<Vec<GroupActionResult>, RpcError> {
        debug!("supervisor.startProcessGroup({}, {})", name, wait);
        let value = self.call(
            Request::new("supervisor.startProcessGroup")
                .arg(name)
                .arg(wait),
        )?;
        as_array(&value)?.iter().map(group_action_result).collect()
    }

    fn stop_process_group(
        &self,
        name: &str,
        wait: bool,
    ) -> Result<Vec<GroupActionResult>, RpcError> {
        debug!("supervisor.stopProcessGroup({}, {})", name, wait);
        let value = self.call(
            Request::new("supervisor.stopProcessGroup")
                .arg(name)
                .arg(wait),
        )?;
        as_array(&value)?.iter().map(group_action_result).collect()
    }
}

fn map_error(err: xmlrpc::Error) -> RpcError {
    match err.fault() {
        Some(fault) => RpcError::Fault {
            code: fault.fault_code,
            message: fault.fault_string.clone(),
        },
        None => RpcError::Transport(err.to_string()),
    }
}

fn as_array(value: &Value) -> Result<&[Value], RpcError> {
    value
        .as_array()
        .ok_or_else(|| RpcError::InvalidResponse(format!("expected an array, got {:?}", value)))
}

fn member<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    value.as_struct().and_then(|members| members.get(key))
}

fn string_member<'v>(value: &'v Value, key: &str) -> Result<&'v str, RpcError> {
    member(value, key)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::InvalidResponse(format!("missing string member `{}`", key)))
}

fn int_member(value: &Value, key: &str) -> Result<i64, RpcError> {
    match member(value, key) {
        Some(Value::Int(v)) => Ok(i64::from(*v)),
        Some(Value::Int64(v)) => Ok(*v),
        _ => Err(RpcError::InvalidResponse(format!(
            "missing integer member `{}`",
            key
        ))),
    }
}

fn process_info(value: &Value) -> Result<ProcessInfo, RpcError> {
    let state = ProcessState::from_code(int_member(value, "state")?);
    let pid = int_member(value, "pid")?;

    let mut info = ProcessInfo::new(
        string_member(value, "group")?,
        string_member(value, "name")?,
        state,
    )
    .with_pid(u32::try_from(pid).unwrap_or_default());
    if let Some(state_name) = member(value, "statename").and_then(Value::as_str) {
        info.state_name = state_name.to_string();
    }
    Ok(info)
}

fn group_action_result(value: &Value) -> Result<GroupActionResult, RpcError> {
    Ok(GroupActionResult {
        name: string_member(value, "name")?.to_string(),
        group: string_member(value, "group")?.to_string(),
        status: int_member(value, "status")?,
        description: string_member(value, "description")?.to_string(),
    })
}
