use crate::attributes::{AttributeProvider, DefaultAttributes, DEFAULT_PLATFORM};
use crate::document::{
    Body, Client, Data, Document, Exception, JavascriptClient, MessageBody, Notifier, Params,
    Person, Request, Server, Trace, TraceFrame, LANGUAGE,
};
use crate::event::{Level, ReportedError};
use crate::host::HostInfo;
use chrono::Utc;

/// Turns a level, message, error chain and attributes into a [`Document`].
///
/// Holds only what is fixed for the lifetime of a notifier (token,
/// environment, server identity), so one builder can serve concurrent
/// callers.
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    access_token: String,
    environment: String,
    server: Server,
    notifier: Notifier,
}

impl NotificationBuilder {
    /// `code_root` is the root package reported as `server.root` (used for
    /// source control integration); empty strings are ignored.
    pub fn new(
        access_token: impl Into<String>,
        environment: impl Into<String>,
        code_root: Option<&str>,
        host: HostInfo,
    ) -> Self {
        let server = Server {
            host: host.host,
            ip: host.ip,
            root: code_root.filter(|root| !root.is_empty()).map(str::to_string),
        };

        NotificationBuilder {
            access_token: access_token.into(),
            environment: environment.into(),
            server,
            notifier: Notifier::default(),
        }
    }

    pub fn build(
        &self,
        level: Level,
        message: Option<&str>,
        error: Option<&ReportedError>,
        attributes: Option<&dyn AttributeProvider>,
    ) -> Document {
        let attributes = attributes.unwrap_or(&DefaultAttributes);

        let data = Data {
            environment: self.environment.clone(),
            level,
            platform: attributes
                .platform()
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            framework: attributes
                .framework()
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            language: LANGUAGE,
            timestamp: Utc::now().timestamp(),
            body: body(message, error),
            request: request(attributes),
            custom: custom(message, attributes),
            person: person(attributes),
            client: client(attributes),
            server: self.server.clone(),
            notifier: self.notifier.clone(),
        };

        Document {
            access_token: self.access_token.clone(),
            data,
        }
    }
}

fn body(message: Option<&str>, error: Option<&ReportedError>) -> Body {
    match (error, message) {
        (Some(error), _) => Body {
            // outermost error first, root cause last
            trace_chain: Some(error.chain().map(trace).collect()),
            message: None,
        },
        (None, Some(message)) => Body {
            trace_chain: None,
            message: Some(MessageBody {
                body: message.to_string(),
            }),
        },
        (None, None) => Body::default(),
    }
}

fn trace(error: &ReportedError) -> Trace {
    let frames = error
        .frames
        .iter()
        .rev()
        .map(|frame| TraceFrame {
            class_name: frame.class_name.clone(),
            filename: frame.filename.clone(),
            method: frame.method.clone(),
            lineno: frame.reported_line(),
        })
        .collect();

    Trace {
        frames,
        raw: error.render_trace(),
        exception: Exception {
            class: error.class.clone(),
            message: error.message.clone(),
        },
    }
}

fn request(attributes: &dyn AttributeProvider) -> Option<Request> {
    let method = attributes.http_method();
    let params = attributes
        .params()
        .filter(|params| !params.is_empty())
        .map(|params| Params::for_method(method.as_deref(), params));

    let request = Request {
        url: attributes.url(),
        headers: attributes.headers().filter(|headers| !headers.is_empty()),
        params,
        method,
        query_string: attributes.query(),
        user_ip: attributes.user_ip(),
        session: attributes.session_id(),
        protocol: attributes.protocol(),
        id: attributes.request_id(),
    };

    if request.is_empty() {
        None
    } else {
        Some(request)
    }
}

fn custom(
    message: Option<&str>,
    attributes: &dyn AttributeProvider,
) -> Option<std::collections::BTreeMap<String, String>> {
    let mut custom = attributes.custom_fields().unwrap_or_default();
    if let Some(message) = message {
        custom.insert("message".to_string(), message.to_string());
    }

    if custom.is_empty() {
        None
    } else {
        Some(custom)
    }
}

fn person(attributes: &dyn AttributeProvider) -> Option<Person> {
    let person = Person {
        id: attributes.user_id(),
        username: attributes.username(),
        email: attributes.user_email(),
    };

    if person.id.is_none() && person.username.is_none() && person.email.is_none() {
        None
    } else {
        Some(person)
    }
}

fn client(attributes: &dyn AttributeProvider) -> Option<Client> {
    attributes.user_agent().map(|browser| Client {
        javascript: JavascriptClient { browser },
    })
}
