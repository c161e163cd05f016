//! Reachability check with failover.
//!
//! Requests the active endpoint's root. On failure the failover policy
//! decides whether another endpoint should be tried; each endpoint is
//! requested at most once, including when the active endpoint resolves
//! back to one that already failed.

use std::time::{Duration, Instant};

use serde::Serialize;
use tabled::Tabled;

use homelink_core::{Endpoint, FailureKind, RetryDecision, SharedConnection};

use crate::cli::{GlobalOpts, PingArgs};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Attempt {
    endpoint: Endpoint,
    url: String,
    status: Option<u16>,
    error: Option<String>,
    elapsed_ms: u128,
}

#[derive(Tabled)]
struct AttemptRow {
    #[tabled(rename = "Endpoint")]
    endpoint: &'static str,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Time")]
    elapsed: String,
}

impl From<&Attempt> for AttemptRow {
    fn from(a: &Attempt) -> Self {
        Self {
            endpoint: a.endpoint.label(),
            url: a.url.clone(),
            result: match (a.status, &a.error) {
                (Some(status), _) => format!("HTTP {status}"),
                (None, Some(error)) => error.clone(),
                (None, None) => String::new(),
            },
            elapsed: format!("{} ms", a.elapsed_ms),
        }
    }
}

pub async fn handle(
    conn: &SharedConnection,
    args: &PingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let mut attempts: Vec<Attempt> = Vec::new();
    let mut last_error: Option<reqwest::Error> = None;
    let failure = loop {
        let (endpoint, url) = conn.with(|info| {
            info.active_url()
                .map(|url| (info.active_endpoint(), url.into_url()))
        })?;

        // Lazy correction can hand back an endpoint that already failed.
        if attempts.iter().any(|a| a.endpoint == endpoint) {
            tracing::debug!(%endpoint, "resolved an endpoint that was already tried");
            break last_error;
        }

        let started = Instant::now();
        let result = client.get(url.clone()).send().await;
        let elapsed_ms = started.elapsed().as_millis();

        let err = match result {
            Ok(resp) => {
                attempts.push(Attempt {
                    endpoint,
                    url: url.to_string(),
                    status: Some(resp.status().as_u16()),
                    error: None,
                    elapsed_ms,
                });
                break None;
            }
            Err(err) => err,
        };

        tracing::debug!(%endpoint, kind = %FailureKind::from_reqwest(&err), "ping failed");
        attempts.push(Attempt {
            endpoint,
            url: url.to_string(),
            status: None,
            error: Some(FailureKind::from_reqwest(&err).to_string()),
            elapsed_ms,
        });

        match conn.should_retry_reqwest(&err) {
            RetryDecision::Retry { to, .. } if attempts.iter().all(|a| a.endpoint != to) => {
                output::print_notice(
                    &format!("{} failed, trying {}", endpoint.label(), to.label()),
                    global.quiet,
                );
                last_error = Some(err);
            }
            _ => break Some(err),
        }
    };

    let out = output::render_list(
        &global.output,
        &attempts,
        |a| AttemptRow::from(a),
        |a| match a.status {
            Some(status) => format!("{} {status}", a.url),
            None => format!("{} failed", a.url),
        },
    );
    output::print_output(&out, global.quiet);

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
