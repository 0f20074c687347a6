use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::iter;

/// Class reported for causes reached through [`Error::source`], whose
/// concrete type is erased.
pub const DYN_ERROR_CLASS: &str = "dyn std::error::Error";

/// Line number reported by runtimes for frames executing native code.
pub const NATIVE_METHOD_LINE: i32 = -2;

/// Severity of a reported item. Serialized as the upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stack frame of a [`ReportedError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Declaring type (or module path) of the executing function.
    pub class_name: String,
    pub filename: Option<String>,
    pub method: String,
    /// Source line; values `<= 0` mean unknown or native.
    pub lineno: Option<i32>,
}

impl Frame {
    pub fn new(class_name: impl Into<String>, method: impl Into<String>) -> Self {
        Frame {
            class_name: class_name.into(),
            filename: None,
            method: method.into(),
            lineno: None,
        }
    }

    pub fn file(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn line(mut self, lineno: i32) -> Self {
        self.lineno = Some(lineno);
        self
    }

    /// Line number to report, if it is a real (positive) one.
    pub fn reported_line(&self) -> Option<i32> {
        self.lineno.filter(|line| *line > 0)
    }

    fn location(&self) -> String {
        if self.lineno == Some(NATIVE_METHOD_LINE) {
            return "Native Method".to_string();
        }
        match (&self.filename, self.reported_line()) {
            (Some(file), Some(line)) => format!("{}:{}", file, line),
            (Some(file), None) => file.clone(),
            (None, _) => "Unknown Source".to_string(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.class_name, self.method, self.location())
    }
}

/// An error and its chain of causes, as reported in an item's `trace_chain`.
///
/// Frames are stored in capture order: innermost (most recent) call first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub class: String,
    pub message: Option<String>,
    pub frames: Vec<Frame>,
    pub cause: Option<Box<ReportedError>>,
}

impl ReportedError {
    pub fn new(class: impl Into<String>) -> Self {
        ReportedError {
            class: class.into(),
            message: None,
            frames: Vec::new(),
            cause: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frames.push(frame);
        self
    }

    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Frame>) -> Self {
        self.frames.extend(frames);
        self
    }

    pub fn caused_by(mut self, cause: ReportedError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Build a chain from a Rust error by walking [`Error::source`].
    ///
    /// The outermost link is named after `E`; causes carry
    /// [`DYN_ERROR_CLASS`]. No frames are captured.
    pub fn from_error<E: Error + 'static>(err: &E) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(inner) = source {
            causes.push(ReportedError::new(DYN_ERROR_CLASS).with_message(inner.to_string()));
            source = inner.source();
        }

        let cause = causes.into_iter().rev().fold(None, |deeper, mut link| {
            link.cause = deeper.map(Box::new);
            Some(link)
        });

        ReportedError {
            class: std::any::type_name::<E>().to_string(),
            message: Some(err.to_string()),
            frames: Vec::new(),
            cause: cause.map(Box::new),
        }
    }

    /// Iterate the chain from this error down to its root cause.
    pub fn chain(&self) -> impl Iterator<Item = &ReportedError> {
        iter::successors(Some(self), |link| link.cause.as_deref())
    }

    /// Conventional stack-trace text for this error, including a
    /// `Caused by:` section per cause.
    pub fn render_trace(&self) -> String {
        let mut out = String::new();
        for (depth, link) in self.chain().enumerate() {
            if depth > 0 {
                out.push_str("Caused by: ");
            }
            out.push_str(&link.to_string());
            out.push('\n');
            for frame in &link.frames {
                out.push_str("\tat ");
                out.push_str(&frame.to_string());
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for ReportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class, message),
            None => f.write_str(&self.class),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("config load failed")]
    struct LoadError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn level_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&Level::Warning).unwrap(), "\"WARNING\"");
        assert_eq!(Level::Debug.to_string(), "DEBUG");
    }

    #[test]
    fn frame_location_variants() {
        let full = Frame::new("com.acme.Worker", "run").file("Worker.java").line(42);
        assert_eq!(full.to_string(), "com.acme.Worker.run(Worker.java:42)");

        let no_line = Frame::new("com.acme.Worker", "run").file("Worker.java").line(0);
        assert_eq!(no_line.to_string(), "com.acme.Worker.run(Worker.java)");
        assert_eq!(no_line.reported_line(), None);

        let native = Frame::new("java.lang.Thread", "sleep").line(NATIVE_METHOD_LINE);
        assert_eq!(native.to_string(), "java.lang.Thread.sleep(Native Method)");

        let unknown = Frame::new("com.acme.Gen", "call");
        assert_eq!(unknown.to_string(), "com.acme.Gen.call(Unknown Source)");
    }

    #[test]
    fn render_trace_includes_caused_by_sections() {
        let err = ReportedError::new("java.lang.IllegalStateException")
            .with_message("outer")
            .with_frame(Frame::new("a.B", "c").file("B.java").line(3))
            .caused_by(ReportedError::new("java.io.IOException").with_frame(
                Frame::new("d.E", "f").file("E.java").line(9),
            ));

        assert_eq!(
            err.render_trace(),
            "java.lang.IllegalStateException: outer\n\
             \tat a.B.c(B.java:3)\n\
             Caused by: java.io.IOException\n\
             \tat d.E.f(E.java:9)\n"
        );
    }

    #[test]
    fn from_error_walks_sources() {
        let err = LoadError {
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing file"),
        };
        let reported = ReportedError::from_error(&err);

        let chain: Vec<_> = reported.chain().collect();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].class.ends_with("LoadError"));
        assert_eq!(chain[0].message.as_deref(), Some("config load failed"));
        assert_eq!(chain[1].class, DYN_ERROR_CLASS);
        assert_eq!(chain[1].message.as_deref(), Some("missing file"));
    }
}
