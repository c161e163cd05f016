// ── Request URL adaptation ──
//
// Requests are built against whatever endpoint was active at the time.
// Before they go out, their URL is moved onto the endpoint that is active
// now. API requests keep their path below `/api`; webhook requests always
// target the webhook URL.

use tracing::debug;
use url::{Position, Url};

use crate::connection::ConnectionInfo;
use crate::endpoint::{Endpoint, same_origin};
use crate::error::CoreError;

/// Which backend surface a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// The generic REST API under `/api`.
    Api,
    /// The per-device webhook.
    Webhook,
}

impl ConnectionInfo {
    /// `<active>/api`.
    pub fn active_api_url(&mut self) -> Result<Url, CoreError> {
        Ok(self.active_url()?.join("api")?)
    }

    /// `api/webhook/<webhook_id>`, relative to an endpoint base.
    pub fn webhook_path(&self) -> String {
        format!("api/webhook/{}", self.record.webhook_id)
    }

    /// Where webhook calls go.
    ///
    /// The cloudhook URL when the cloud relay is preferred and one is
    /// configured, regardless of the active endpoint; otherwise the webhook
    /// path on the active endpoint.
    pub fn webhook_url(&mut self) -> Result<Url, CoreError> {
        if self.record.use_cloud_relay {
            if let Some(cloudhook) = &self.record.cloudhook_url {
                return Ok(cloudhook.clone());
            }
        }
        let path = self.webhook_path();
        Ok(self.active_url()?.join(&path)?)
    }

    /// Swap the origin of `existing` for the active endpoint's origin,
    /// keeping path, query, and fragment.
    pub fn adapt_url(&mut self, existing: &Url) -> Result<Url, CoreError> {
        let active = self.active_url()?;
        let adapted = format!("{}{}", active.origin(), &existing[Position::BeforePath..]);
        Ok(Url::parse(&adapted)?)
    }

    /// The URL a request to `surface` should be sent to, given its current URL.
    pub fn target_url(&mut self, current: &Url, surface: Surface) -> Result<Url, CoreError> {
        match surface {
            Surface::Api => self.api_target(current),
            Surface::Webhook => self.webhook_url(),
        }
    }

    /// Point `request` at the active endpoint.
    ///
    /// Returns `Ok(false)` without touching the request when its URL
    /// already equals the target.
    pub fn adapt_request(
        &mut self,
        request: &mut reqwest::Request,
        surface: Surface,
    ) -> Result<bool, CoreError> {
        let expected = self.target_url(request.url(), surface)?;
        if *request.url() == expected {
            return Ok(false);
        }

        debug!(from = %request.url(), to = %expected, "changing request URL");
        *request.url_mut() = expected;
        Ok(true)
    }

    /// Which configured endpoint `url` belongs to, by origin.
    ///
    /// Checked in the order internal, external, remote relay.
    pub fn endpoint_for(&self, url: &Url) -> Option<Endpoint> {
        [Endpoint::Internal, Endpoint::External, Endpoint::RemoteRelay]
            .into_iter()
            .find(|endpoint| {
                self.record
                    .address(*endpoint)
                    .is_some_and(|address| same_origin(address, url))
            })
    }

    /// Whether `url` points at any configured endpoint.
    pub fn matches_known_endpoint(&self, url: &Url) -> bool {
        self.endpoint_for(url).is_some()
    }

    fn api_target(&mut self, current: &Url) -> Result<Url, CoreError> {
        let mut target = self.active_api_url()?;
        let path = format!("{}{}", target.path(), api_suffix(current.path()));
        target.set_path(&path);
        target.set_query(current.query());
        target.set_fragment(current.fragment());
        Ok(target)
    }
}

/// The part of `path` below its first `/api` segment.
///
/// A path without an `/api` segment is taken whole.
fn api_suffix(path: &str) -> &str {
    let found = path.match_indices("/api").find_map(|(idx, _)| {
        let rest = &path[idx + "/api".len()..];
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    });

    match found {
        Some(rest) => rest,
        None if path == "/" => "",
        None => path,
    }
}
