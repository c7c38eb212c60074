//! Policy file handling and the authentication decision.

use std::collections::HashMap;
use std::path::Path;

use eyre::WrapErr;
use icecast_auth::{AuthRequest, Response};
use serde::Deserialize;

/// Who may connect, and where they end up.
///
/// ```toml
/// login_url = "https://radio.example/login"
/// decline_message = "Unknown source"
///
/// [users]
/// alice = "secret"
///
/// [mounts]
/// "/live" = "/live-hq.mp3"
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Known users and their passwords.
    #[serde(default)]
    pub users: HashMap<String, String>,
    /// Requested mountpoint to the mount the client is moved to.
    #[serde(default)]
    pub mounts: HashMap<String, String>,
    /// Where to send clients that did not give a user name. Without it they
    /// are asked for credentials.
    pub login_url: Option<String>,
    /// Message sent with a 403.
    pub decline_message: Option<String>,
}

impl Policy {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading policy file {}", path.display()))?;
        let policy = Self::from_toml(&contents)
            .wrap_err_with(|| format!("parsing policy file {}", path.display()))?;
        tracing::debug!(users = policy.users.len(), mounts = policy.mounts.len(), "loaded policy");
        Ok(policy)
    }

    pub fn from_toml(contents: &str) -> eyre::Result<Self> {
        toml::from_str(contents).wrap_err("deserializing policy")
    }

    /// Pick the response for `request`.
    pub fn decide(&self, request: &AuthRequest) -> Response {
        let user = request.user().unwrap_or_default();
        if user.is_empty() {
            return match &self.login_url {
                Some(url) => Response::Redirect { url: url.clone() },
                None => Response::RequireCredentials,
            };
        }

        match self.users.get(user) {
            Some(password) if request.pass() == Some(password.as_str()) => {
                let mount = request
                    .mountpoint()
                    .and_then(|requested| self.mounts.get(requested))
                    .cloned();
                Response::Accept { mount }
            }
            _ => {
                tracing::info!(%user, "rejecting unknown user or wrong password");
                Response::Decline {
                    message: self.decline_message.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icecast_auth::{RequestAccumulator, parse_line};
    use rstest::rstest;

    fn request(lines: &[&str]) -> AuthRequest {
        let mut accumulator = RequestAccumulator::new(Default::default());
        lines
            .iter()
            .chain(std::iter::once(&""))
            .find_map(|line| accumulator.feed(parse_line(line).unwrap()))
            .unwrap()
    }

    fn policy() -> Policy {
        Policy::from_toml(
            r#"
            [users]
            alice = "secret"

            [mounts]
            "/live" = "/live-hq.mp3"
            "#,
        )
        .unwrap()
    }

    #[rstest]
    #[case::no_user(&[], Response::RequireCredentials)]
    #[case::empty_user(&["user:", "pass:"], Response::RequireCredentials)]
    #[case::good(&["user: alice", "pass: secret"], Response::Accept { mount: None })]
    #[case::wrong_pass(&["user: alice", "pass: nope"], Response::Decline { message: None })]
    #[case::missing_pass(&["user: alice"], Response::Decline { message: None })]
    #[case::unknown(&["user: mallory", "pass: secret"], Response::Decline { message: None })]
    #[case::remapped(
        &["mountpoint: /live", "user: alice", "pass: secret"],
        Response::Accept { mount: Some("/live-hq.mp3".to_string()) },
    )]
    #[case::not_remapped(
        &["mountpoint: /other", "user: alice", "pass: secret"],
        Response::Accept { mount: None },
    )]
    fn decisions(#[case] lines: &[&str], #[case] expected: Response) {
        assert_eq!(policy().decide(&request(lines)), expected);
    }

    #[test]
    fn login_url_and_message() {
        let policy = Policy::from_toml(
            r#"
            login_url = "https://radio.example/login"
            decline_message = "Unknown source"
            "#,
        )
        .unwrap();

        assert_eq!(
            policy.decide(&request(&[])),
            Response::Redirect {
                url: "https://radio.example/login".to_string()
            }
        );
        assert_eq!(
            policy.decide(&request(&["user: bob", "pass: x"])),
            Response::Decline {
                message: Some("Unknown source".to_string())
            }
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Policy::from_toml("userz = 1").is_err());
    }
}
