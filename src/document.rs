//! Serializable shape of a Rollbar item, as posted to the API.

use crate::event::Level;
use serde::Serialize;
use std::collections::BTreeMap;

pub const LANGUAGE: &str = "java";
pub const NOTIFIER_NAME: &str = "rollbar-java";
pub const NOTIFIER_VERSION: &str = "0.1.3";

#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub access_token: String,
    pub data: Data,
}

#[derive(Debug, Clone, Serialize)]
pub struct Data {
    pub environment: String,
    pub level: Level,
    pub platform: String,
    pub framework: String,
    pub language: &'static str,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub body: Body,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<Person>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Client>,
    pub server: Server,
    pub notifier: Notifier,
}

/// Either a trace chain, a plain message, or nothing at all (`{}`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Body {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_chain: Option<Vec<Trace>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageBody {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub frames: Vec<TraceFrame>,
    pub raw: String,
    pub exception: Exception,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceFrame {
    pub class_name: String,
    pub filename: Option<String>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineno: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Exception {
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Request {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub params: Option<Params>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Request {
    pub fn is_empty(&self) -> bool {
        self.url.is_none()
            && self.method.is_none()
            && self.headers.is_none()
            && self.params.is_none()
            && self.query_string.is_none()
            && self.user_ip.is_none()
            && self.session.is_none()
            && self.protocol.is_none()
            && self.id.is_none()
    }
}

/// Request parameters, keyed by how the request carried them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Params {
    #[serde(rename = "POST")]
    Post(BTreeMap<String, String>),
    #[serde(rename = "GET")]
    Get(BTreeMap<String, String>),
    #[serde(rename = "parameters")]
    Unspecified(BTreeMap<String, String>),
}

impl Params {
    /// `POST` when the method is "post" in any case, `GET` for any other
    /// method, `parameters` when there is no method.
    pub fn for_method(method: Option<&str>, params: BTreeMap<String, String>) -> Self {
        match method {
            Some(m) if m.eq_ignore_ascii_case("post") => Params::Post(params),
            Some(_) => Params::Get(params),
            None => Params::Unspecified(params),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub javascript: JavascriptClient,
}

#[derive(Debug, Clone, Serialize)]
pub struct JavascriptClient {
    pub browser: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Server {
    pub host: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notifier {
    pub name: &'static str,
    pub version: &'static str,
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier {
            name: NOTIFIER_NAME,
            version: NOTIFIER_VERSION,
        }
    }
}
