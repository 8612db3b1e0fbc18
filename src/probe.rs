use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_PORTS: [u16; 4] = [5001, 50011, 5002, 5003];
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("could not build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("no server answered on {host} ports {ports:?}")]
    NotFound { host: String, ports: Vec<u16> },
}

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProbeError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Returns the base URL (`http://host:port`) of the first port whose health endpoint answers 2xx.
pub async fn discover(host: &str, ports: &[u16], timeout: Duration) -> Result<String, ProbeError> {
    let client = http_client(timeout)?;

    for port in ports {
        let base = format!("http://{host}:{port}");
        match client.get(format!("{base}/api/health")).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(%base, "server found");
                return Ok(base);
            }
            Ok(response) => {
                tracing::debug!(port, status = %response.status(), "health endpoint answered with an error");
            }
            Err(e) => {
                tracing::debug!(port, error = %e, "no server on port");
            }
        }
    }

    Err(ProbeError::NotFound {
        host: host.to_string(),
        ports: ports.to_vec(),
    })
}

/// Best-effort checks against a discovered server. Failures are reported, never raised.
pub async fn run_checks(base: &str) -> Result<Vec<CheckOutcome>, ProbeError> {
    let client = http_client(PROBE_TIMEOUT)?;
    let mut outcomes = Vec::with_capacity(3);

    outcomes.push(match client.get(format!("{base}/api/health")).send().await {
        Ok(response) => {
            let body = response.json::<Value>().await.unwrap_or(Value::Null);
            let message = body["message"].as_str().unwrap_or_default().to_string();
            let database = body["database"].as_str().unwrap_or("unknown");
            CheckOutcome::new(
                "health",
                message == "Server is running!",
                format!("message={message:?} database={database}"),
            )
        }
        Err(e) => CheckOutcome::new("health", false, e.to_string()),
    });

    outcomes.push(match client.get(format!("{base}/")).send().await {
        Ok(response) => {
            let status = response.status();
            CheckOutcome::new("frontend", status.is_success(), format!("status={status}"))
        }
        Err(e) => CheckOutcome::new("frontend", false, e.to_string()),
    });

    outcomes.push(match client.get(format!("{base}/api/admin/signup")).send().await {
        Ok(response) => {
            let status = response.status();
            CheckOutcome::new(
                "admin signup rejects GET",
                matches!(status, StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED),
                format!("status={status}"),
            )
        }
        Err(e) => CheckOutcome::new("admin signup rejects GET", false, e.to_string()),
    });

    for outcome in &outcomes {
        if outcome.passed {
            tracing::info!(check = outcome.name, detail = %outcome.detail, "check passed");
        } else {
            tracing::warn!(check = outcome.name, detail = %outcome.detail, "check failed");
        }
    }

    Ok(outcomes)
}

/// Parses a comma-separated port list, skipping anything that is not a port number.
pub fn parse_ports(raw: &str) -> Vec<u16> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
