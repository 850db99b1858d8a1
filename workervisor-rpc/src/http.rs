use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Read;
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("failed to encode request: {0}")]
    Encode(#[from] std::io::Error),

    #[error("HTTP status {code} from {url}")]
    Status { code: u16, url: String },

    #[error("{0}")]
    Transport(String),
}

/// `Authorization` header value for HTTP basic auth.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", username, password))
    )
}

/// Carries a single XML-RPC request over HTTP POST.
pub struct HttpTransport<'a> {
    agent: &'a ureq::Agent,
    url: &'a str,
    authorization: Option<&'a str>,
}

impl<'a> HttpTransport<'a> {
    pub fn new(agent: &'a ureq::Agent, url: &'a str, authorization: Option<&'a str>) -> Self {
        Self {
            agent,
            url,
            authorization,
        }
    }
}

impl xmlrpc::Transport for HttpTransport<'_> {
    type Stream = Box<dyn Read + Send + Sync + 'static>;

    fn transmit(
        self,
        request: &xmlrpc::Request<'_>,
    ) -> Result<Self::Stream, Box<dyn std::error::Error + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body).map_err(HttpError::Encode)?;
        trace!("POST {} ({} bytes)", self.url, body.len());

        let mut http_request = self
            .agent
            .post(self.url)
            .set("Content-Type", "text/xml; charset=utf-8");
        if let Some(authorization) = self.authorization {
            http_request = http_request.set("Authorization", authorization);
        }

        match http_request.send_bytes(&body) {
            Ok(response) => Ok(response.into_reader()),
            Err(ureq::Error::Status(code, _)) => Err(Box::new(HttpError::Status {
                code,
                url: self.url.to_string(),
            })),
            Err(ureq::Error::Transport(e)) => Err(Box::new(HttpError::Transport(e.to_string()))),
        }
    }
}
