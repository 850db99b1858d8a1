use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use workervisor_core::{ProcessState, RpcError, SupervisorApi, SupervisorConfig};
use workervisor_rpc::XmlRpcSupervisorApi;

struct Captured {
    request_line: String,
    headers: Vec<String>,
    body: String,
}

/// Serves exactly one HTTP exchange with the given status and body.
fn serve_once(status: &'static str, response_body: &'static str) -> (u16, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_string();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':')
                && name.eq_ignore_ascii_case("content-length")
            {
                content_length = value.trim().parse().unwrap();
            }
            headers.push(line);
        }

        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            response_body.len(),
            response_body
        )
        .unwrap();
        stream.flush().unwrap();

        Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        }
    });

    (port, handle)
}

fn api(port: u16, credentials: Option<(&str, &str)>) -> XmlRpcSupervisorApi {
    let mut config = SupervisorConfig::new("127.0.0.1");
    config.port = port;
    config.timeout = 5;
    if let Some((username, password)) = credentials {
        config.username = Some(username.to_string());
        config.password = Some(password.to_string());
    }
    XmlRpcSupervisorApi::from_config(&config).unwrap()
}

const ALL_PROCESS_INFO: &str = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
<value><struct>
<member><name>name</name><value><string>program1_00</string></value></member>
<member><name>group</name><value><string>program1</string></value></member>
<member><name>state</name><value><int>20</int></value></member>
<member><name>statename</name><value><string>RUNNING</string></value></member>
<member><name>pid</name><value><int>4242</int></value></member>
</struct></value>
<value><struct>
<member><name>name</name><value><string>program2_00</string></value></member>
<member><name>group</name><value><string>program2</string></value></member>
<member><name>state</name><value><int>0</int></value></member>
<member><name>statename</name><value><string>STOPPED</string></value></member>
<member><name>pid</name><value><int>0</int></value></member>
</struct></value>
</data></array></value></param></params></methodResponse>"#;

const GROUP_RESULT: &str = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
<value><struct>
<member><name>name</name><value><string>program1_00</string></value></member>
<member><name>group</name><value><string>program1</string></value></member>
<member><name>status</name><value><int>80</int></value></member>
<member><name>description</name><value><string>OK</string></value></member>
</struct></value>
</data></array></value></param></params></methodResponse>"#;

const FAULT: &str = r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>10</int></value></member>
<member><name>faultString</name><value><string>BAD_NAME: program9</string></value></member>
</struct></value></fault></methodResponse>"#;

#[test]
fn test_get_all_processes() {
    let (port, server) = serve_once("200 OK", ALL_PROCESS_INFO);

    let processes = api(port, None).get_all_processes().unwrap();
    let captured = server.join().unwrap();

    assert_eq!(captured.request_line, "POST /RPC2 HTTP/1.1");
    assert!(captured.body.contains("<methodName>supervisor.getAllProcessInfo</methodName>"));
    assert!(
        !captured
            .headers
            .iter()
            .any(|h| h.to_ascii_lowercase().starts_with("authorization"))
    );

    assert_eq!(processes.len(), 2);
    assert_eq!(processes[0].group, "program1");
    assert_eq!(processes[0].state, ProcessState::Running);
    assert_eq!(processes[0].pid, 4242);
    assert_eq!(processes[1].state, ProcessState::Stopped);
    assert_eq!(processes[1].state_name, "STOPPED");
}

#[test]
fn test_start_process_group_with_basic_auth() {
    let (port, server) = serve_once("200 OK", GROUP_RESULT);

    let results = api(port, Some(("user", "123")))
        .start_process_group("program1", true)
        .unwrap();
    let captured = server.join().unwrap();

    assert!(captured.body.contains("supervisor.startProcessGroup"));
    assert!(captured.body.contains("program1"));
    assert!(captured.body.contains("<boolean>1</boolean>"));
    assert!(
        captured
            .headers
            .iter()
            .any(|h| h == "Authorization: Basic dXNlcjoxMjM=")
    );

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, 80);
}

#[test]
fn test_stop_process_group_fault() {
    let (port, server) = serve_once("200 OK", FAULT);

    let err = api(port, None)
        .stop_process_group("program9", false)
        .unwrap_err();
    let captured = server.join().unwrap();

    assert!(captured.body.contains("supervisor.stopProcessGroup"));
    assert!(captured.body.contains("<boolean>0</boolean>"));
    match err {
        RpcError::Fault { code, message } => {
            assert_eq!(code, 10);
            assert_eq!(message, "BAD_NAME: program9");
        }
        other => panic!("Expected fault, got {:?}", other),
    }
}

#[test]
fn test_http_error_status() {
    let (port, server) = serve_once("401 Unauthorized", "");

    let err = api(port, None).get_all_processes().unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, RpcError::Transport(ref message) if message.contains("401")));
}

#[test]
fn test_connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = api(port, None).get_all_processes().unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)));
}
