use bytes::Bytes;

/// Format of the `Date` header: weekday, day, month, year and local time
/// without a zone suffix (e.g. `Mon, 01 Jan 2024 12:00:00`).
pub const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// HTTP status codes the file server produces.
///
/// - `Ok` (200): File served
/// - `BadRequest` (400): Unparseable header block or unusable host
/// - `Forbidden` (403): Target escapes the virtual host directory
/// - `NotFound` (404): No such file
/// - `InternalServerError` (500): I/O failure other than not-found
/// - `NotImplemented` (501): Method other than GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use vhostd::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// Code and reason as they appear after the version on the status
    /// line, e.g. `"404 Not Found"`.
    pub fn return_code(&self) -> String {
        format!("{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Value of the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub mime: String,
    pub charset: Option<String>,
}

impl ContentType {
    pub fn html() -> Self {
        Self {
            mime: "text/html".to_string(),
            charset: Some("utf-8".to_string()),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={}", self.mime, charset),
            None => f.write_str(&self.mime),
        }
    }
}

/// A response ready to be serialized.
///
/// The body is written straight after the header block; the connection is
/// closed afterwards, which is the only framing the client gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Preformatted `Date` header value
    pub date: Option<String>,
    /// Set only for HTML resources
    pub content_type: Option<ContentType>,
    /// Raw body bytes
    pub body: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use vhostd::http::response::{ContentType, ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type(ContentType::html())
///     .body(b"<html></html>".to_vec())
///     .build();
/// assert!(response.date.is_some());
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    date: Option<String>,
    content_type: Option<ContentType>,
    body: Bytes,
}

impl ResponseBuilder {
    /// Creates a builder stamped with the current date.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            date: Some(http_date()),
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// Replaces the `Date` value, or removes it with `None`.
    pub fn date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            date: self.date,
            content_type: self.content_type,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a 200 OK response with the given body.
    pub fn ok(body: impl Into<Bytes>, content_type: Option<ContentType>) -> Self {
        let builder = ResponseBuilder::new(StatusCode::Ok).body(body);
        match content_type {
            Some(content_type) => builder.content_type(content_type).build(),
            None => builder.build(),
        }
    }

    /// Creates an empty-bodied response for an error status.
    pub fn error(status: StatusCode) -> Self {
        ResponseBuilder::new(status).build()
    }

    pub fn bad_request() -> Self {
        Self::error(StatusCode::BadRequest)
    }

    pub fn not_implemented() -> Self {
        Self::error(StatusCode::NotImplemented)
    }
}

/// Current local time in [`DATE_FORMAT`].
pub fn http_date() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}
