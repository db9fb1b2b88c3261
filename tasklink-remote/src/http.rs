//! Shared request plumbing for both clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use tasklink_core::RemoteRequestError;

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response body kept in an error message.
const MAX_ERROR_BODY: usize = 2048;

pub(crate) fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("tasklink/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send `request` (with an optional JSON body) and decode the JSON response.
pub(crate) fn send<T, B>(
    operation: &str,
    request: ureq::Request,
    body: Option<&B>,
) -> Result<T, RemoteRequestError>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let result = match body {
        Some(body) => request
            .set("Content-Type", "application/json")
            .send_json(body),
        None => request.call(),
    };

    let response = match result {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            let body = response
                .into_string()
                .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
            tracing::debug!(operation, status, "remote request rejected");
            return Err(RemoteRequestError::status(
                operation,
                status,
                truncate(body, MAX_ERROR_BODY),
            ));
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(RemoteRequestError::transport(
                operation,
                transport.to_string(),
            ));
        }
    };

    response
        .into_json::<T>()
        .map_err(|err| RemoteRequestError::transport(operation, format!("invalid JSON response: {err}")))
}

pub(crate) fn truncate(mut body: String, max: usize) -> String {
    if body.len() > max {
        let mut cut = max;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://api.clickup.com/api/v2/", "/list/1/task"),
            "https://api.clickup.com/api/v2/list/1/task"
        );
        assert_eq!(join_url("http://x", "tasks"), "http://x/tasks");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(10);
        let cut = truncate(body, 5);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.trim_end_matches("...").chars().count(), 2);
        assert_eq!(truncate("short".to_string(), 10), "short");
    }
}
