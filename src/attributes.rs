use std::collections::BTreeMap;

/// Platform and framework reported when a provider does not override them.
pub const DEFAULT_PLATFORM: &str = "java";

/// Supplies the contextual fields of one reported item.
///
/// Every method has a default, so implementors only override the fields
/// they know about. `None` means "not reported": the corresponding key is
/// left out of the payload.
pub trait AttributeProvider: Send + Sync {
    fn platform(&self) -> Option<String> {
        Some(DEFAULT_PLATFORM.to_string())
    }

    fn framework(&self) -> Option<String> {
        Some(DEFAULT_PLATFORM.to_string())
    }

    /// Full URL of the request that produced the item (`request.url`).
    fn url(&self) -> Option<String> {
        None
    }

    /// Request method such as `GET` or `POST` (`request.method`).
    fn http_method(&self) -> Option<String> {
        None
    }

    fn headers(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    /// Request parameters; reported under `POST`, `GET` or `parameters`
    /// depending on [`http_method`](Self::http_method).
    fn params(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    /// Raw query string (`request.query_string`).
    fn query(&self) -> Option<String> {
        None
    }

    fn user_ip(&self) -> Option<String> {
        None
    }

    /// Session identifier (`request.session`).
    fn session_id(&self) -> Option<String> {
        None
    }

    fn protocol(&self) -> Option<String> {
        None
    }

    /// Request identifier (`request.id`).
    fn request_id(&self) -> Option<String> {
        None
    }

    /// Extra key/value pairs reported as `custom.KEY = VALUE`.
    fn custom_fields(&self) -> Option<BTreeMap<String, String>> {
        None
    }

    /// User agent of the remote client (`client.javascript.browser`).
    fn user_agent(&self) -> Option<String> {
        None
    }

    fn user_id(&self) -> Option<String> {
        None
    }

    fn username(&self) -> Option<String> {
        None
    }

    fn user_email(&self) -> Option<String> {
        None
    }
}

/// Provider used when the caller passes none: reports nothing beyond the
/// default platform and framework.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAttributes;

impl AttributeProvider for DefaultAttributes {}

/// Plain-data provider for callers that would rather fill in a struct than
/// implement [`AttributeProvider`].
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub platform: Option<String>,
    pub framework: Option<String>,
    pub url: Option<String>,
    pub http_method: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub query: Option<String>,
    pub user_ip: Option<String>,
    pub session_id: Option<String>,
    pub protocol: Option<String>,
    pub request_id: Option<String>,
    pub custom: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub user_email: Option<String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn custom(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }
}

fn non_empty(map: &BTreeMap<String, String>) -> Option<BTreeMap<String, String>> {
    if map.is_empty() {
        None
    } else {
        Some(map.clone())
    }
}

impl AttributeProvider for Attributes {
    fn platform(&self) -> Option<String> {
        self.platform.clone().or_else(|| DefaultAttributes.platform())
    }

    fn framework(&self) -> Option<String> {
        self.framework.clone().or_else(|| DefaultAttributes.framework())
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    fn http_method(&self) -> Option<String> {
        self.http_method.clone()
    }

    fn headers(&self) -> Option<BTreeMap<String, String>> {
        non_empty(&self.headers)
    }

    fn params(&self) -> Option<BTreeMap<String, String>> {
        non_empty(&self.params)
    }

    fn query(&self) -> Option<String> {
        self.query.clone()
    }

    fn user_ip(&self) -> Option<String> {
        self.user_ip.clone()
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.clone()
    }

    fn protocol(&self) -> Option<String> {
        self.protocol.clone()
    }

    fn request_id(&self) -> Option<String> {
        self.request_id.clone()
    }

    fn custom_fields(&self) -> Option<BTreeMap<String, String>> {
        non_empty(&self.custom)
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn username(&self) -> Option<String> {
        self.username.clone()
    }

    fn user_email(&self) -> Option<String> {
        self.user_email.clone()
    }
}
