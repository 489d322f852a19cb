use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

pub(crate) const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Transport-level failure, before it is mapped to a crate error kind by the
/// calling client.
#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Transport(String),
}

/// POST a JSON body and return the response text, retrying server errors and
/// transport failures with exponential backoff. Client errors (4xx) are
/// never retried.
pub(crate) fn post_json_with_retry(
    agent: &ureq::Agent,
    url: &Url,
    headers: &[(&str, &str)],
    body: &str,
    retry_attempts: u32,
) -> Result<String, HttpError> {
    let mut last_error = HttpError::Transport("request failed after retries".to_string());

    for attempt in 1..=retry_attempts {
        debug!("POST {} attempt {}/{}", url, attempt, retry_attempts);

        let mut request = agent.post(url.as_str()).header("Content-Type", "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        match request
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
        {
            Ok(response_text) => {
                debug!("Request to {} succeeded on attempt {}", url, attempt);
                return Ok(response_text);
            }
            Err(error) => {
                last_error = match &error {
                    ureq::Error::StatusCode(status) => {
                        if *status >= 500 {
                            warn!(
                                "Server error (status {}), attempt {}/{}",
                                status, attempt, retry_attempts
                            );
                            HttpError::Status(*status)
                        } else {
                            warn!("Client error (status {}), not retrying", status);
                            return Err(HttpError::Status(*status));
                        }
                    }
                    ureq::Error::Timeout(_) => {
                        warn!(
                            "Request timed out, attempt {}/{}",
                            attempt, retry_attempts
                        );
                        HttpError::Timeout
                    }
                    ureq::Error::ConnectionFailed
                    | ureq::Error::HostNotFound
                    | ureq::Error::Io(_) => {
                        warn!(
                            "Transport error: {}, attempt {}/{}",
                            error, attempt, retry_attempts
                        );
                        HttpError::Transport(error.to_string())
                    }
                    _ => {
                        warn!("Non-retryable error: {}", error);
                        return Err(HttpError::Transport(error.to_string()));
                    }
                };

                if attempt < retry_attempts {
                    let delay = Duration::from_millis(
                        EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000,
                    );
                    debug!("Waiting {:?} before retry", delay);
                    std::thread::sleep(delay);
                }
            }
        }
    }

    Err(last_error)
}

/// Build a ureq agent with a global request timeout.
pub(crate) fn agent_with_timeout(timeout_secs: u64) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .build()
        .into()
}
