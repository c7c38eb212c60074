//! Responses understood by the Icecast authentication callback.

use bytes::{BufMut, BytesMut};

const AUTH_USER_HEADER: &str = "icecast-auth-user";
const AUTH_MESSAGE_HEADER: &str = "icecast-auth-message";
const LOCATION_HEADER: &str = "Location";
const MOUNTPOINT_HEADER: &str = "Mountpoint";

const DEFAULT_DECLINE_MESSAGE: &str = "Forbidden";

/// A response to an authentication request.
///
/// Values are written verbatim. Embedded line breaks are not escaped, so
/// callers must not pass untrusted text here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Let the client in, optionally moving it to another mount.
    Accept { mount: Option<String> },
    /// Ask the client to authenticate with HTTP basic auth.
    RequireCredentials,
    /// Send the client elsewhere.
    Redirect { url: String },
    /// Refuse with a 403 and an optional message (`Forbidden` by default).
    Decline { message: Option<String> },
}

impl Response {
    /// Write the wire form of the response into `dst`.
    pub fn encode(&self, dst: &mut BytesMut) {
        match self {
            Response::Accept { mount } => {
                if let Some(mount) = mount {
                    put_header(dst, MOUNTPOINT_HEADER, mount);
                }
                put_header(dst, AUTH_USER_HEADER, "1");
            }
            Response::RequireCredentials => {
                put_header(dst, AUTH_MESSAGE_HEADER, "401 Unauthorized");
            }
            Response::Redirect { url } => {
                put_header(dst, LOCATION_HEADER, url);
            }
            Response::Decline { message } => {
                let message = message.as_deref().unwrap_or(DEFAULT_DECLINE_MESSAGE);
                dst.reserve(AUTH_MESSAGE_HEADER.len() + message.len() + 7);
                dst.put_slice(AUTH_MESSAGE_HEADER.as_bytes());
                dst.put_slice(b": 403 ");
                dst.put_slice(message.as_bytes());
                dst.put_u8(b'\n');
            }
        }
        // blank line ends the response
        dst.put_u8(b'\n');
    }

    /// The wire form as a byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.to_vec()
    }
}

fn put_header(dst: &mut BytesMut, name: &str, value: &str) {
    dst.reserve(name.len() + value.len() + 3);
    dst.put_slice(name.as_bytes());
    dst.put_slice(b": ");
    dst.put_slice(value.as_bytes());
    dst.put_u8(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(response: Response) -> String {
        String::from_utf8(response.to_bytes()).unwrap()
    }

    #[test]
    fn accept() {
        assert_eq!(wire(Response::Accept { mount: None }), "icecast-auth-user: 1\n\n");
        assert_eq!(
            wire(Response::Accept {
                mount: Some("/other".to_string())
            }),
            "Mountpoint: /other\nicecast-auth-user: 1\n\n"
        );
    }

    #[test]
    fn require_credentials() {
        assert_eq!(
            wire(Response::RequireCredentials),
            "icecast-auth-message: 401 Unauthorized\n\n"
        );
    }

    #[test]
    fn redirect() {
        assert_eq!(
            wire(Response::Redirect {
                url: "http://e.com".to_string()
            }),
            "Location: http://e.com\n\n"
        );
    }

    #[test]
    fn decline() {
        assert_eq!(
            wire(Response::Decline { message: None }),
            "icecast-auth-message: 403 Forbidden\n\n"
        );
        assert_eq!(
            wire(Response::Decline {
                message: Some("You shall not pass".to_string())
            }),
            "icecast-auth-message: 403 You shall not pass\n\n"
        );
    }

    #[test]
    fn values_are_not_escaped() {
        assert_eq!(
            wire(Response::Redirect {
                url: "a\nb: c".to_string()
            }),
            "Location: a\nb: c\n\n"
        );
    }
}
