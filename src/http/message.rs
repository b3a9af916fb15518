//! The HTTP message abstraction shared by both directions of traffic.

use bytes::{BufMut, Bytes, BytesMut};

use crate::http::request::Request;
use crate::http::response::Response;

/// Protocol token written at the start of every status line.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Either side of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Request(Request),
    Response(Response),
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Message::Response(response)
    }
}

impl Message {
    /// Serializes the header block, terminated by the blank line.
    ///
    /// Response form:
    ///
    /// ```text
    /// HTTP/1.1 <code> <reason>\r\n
    /// [Date: <date>\r\n]
    /// [Content-Type: <type>[; charset=<charset>]\r\n]
    /// \r\n
    /// ```
    ///
    /// Request form, accepted back by the parser:
    ///
    /// ```text
    /// <method> <file_path> <version>\r\n
    /// Host: <host>\r\n
    /// [Connection: keep-alive\r\n]
    /// \r\n
    /// ```
    pub fn head_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(128);

        match self {
            Message::Response(resp) => {
                put_line(&mut buf, &format!("{} {}", HTTP_VERSION, resp.status.return_code()));
                if let Some(date) = &resp.date {
                    put_header(&mut buf, "Date", date);
                }
                if let Some(content_type) = &resp.content_type {
                    put_header(&mut buf, "Content-Type", &content_type.to_string());
                }
            }
            Message::Request(req) => {
                put_line(&mut buf, &format!("{} {} {}", req.method, req.file_path, req.version));
                put_header(&mut buf, "Host", &req.host);
                if req.keep_alive {
                    put_header(&mut buf, "Connection", "keep-alive");
                }
            }
        }

        buf.put_slice(b"\r\n");
        buf
    }

    /// Full wire form: the header block followed directly by the body.
    /// Requests never carry one.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = self.head_bytes();
        if let Message::Response(resp) = self {
            buf.put_slice(&resp.body);
        }
        buf.freeze()
    }
}

fn put_line(buf: &mut BytesMut, line: &str) {
    buf.put_slice(line.as_bytes());
    buf.put_slice(b"\r\n");
}

fn put_header(buf: &mut BytesMut, name: &str, value: &str) {
    buf.put_slice(name.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(b"\r\n");
}
