/// Lifecycle wiring: which events trigger the scaffold download.
use std::path::Path;

use sm_scaffold_downloader::Transport;
use sm_scaffold_shared::errors::FetchFailure;
use sm_scaffold_shared::events::ScriptEvent;
use sm_scaffold_shared::host_config::{EnvOverrides, HostConfig};
use sm_scaffold_shared::models::FetchReport;
use tracing::debug;

use crate::handler::Handler;

/// Events this plugin reacts to.
pub const SUBSCRIBED_EVENTS: &[ScriptEvent] = &[ScriptEvent::PostUpdateCmd];

pub fn is_subscribed(event: ScriptEvent) -> bool {
    SUBSCRIBED_EVENTS.contains(&event)
}

pub struct Plugin<T> {
    handler: Handler<T>,
}

impl<T: Transport> Plugin<T> {
    pub fn activate(host: HostConfig, transport: T) -> Self {
        Self {
            handler: Handler::new(host, transport),
        }
    }

    /// Deliver `event`. Returns `None` for events the plugin does not handle.
    pub async fn dispatch(&self, event: ScriptEvent) -> Result<Option<FetchReport>, FetchFailure> {
        if !is_subscribed(event) {
            debug!("Ignoring {} (not subscribed)", event);
            return Ok(None);
        }
        self.handler.on_post_cmd_event(event).await.map(Some)
    }
}

/// Deliver `event` for the project in `working_dir`. The host configuration
/// is only read once the event is known to be subscribed.
pub async fn on_event<T: Transport>(
    event: ScriptEvent,
    working_dir: &Path,
    overrides: &EnvOverrides,
    transport: T,
) -> Result<Option<FetchReport>, FetchFailure> {
    if !is_subscribed(event) {
        debug!("Ignoring {} (not subscribed)", event);
        return Ok(None);
    }
    let host = HostConfig::load_with(working_dir, overrides)
        .map_err(|e| FetchFailure::new(e.into(), FetchReport::begin()))?;
    Plugin::activate(host, transport).dispatch(event).await
}

/// Script entry point: download the scaffold regardless of event.
pub async fn scaffold<T: Transport>(host: HostConfig, transport: T) -> Result<FetchReport, FetchFailure> {
    Handler::new(host, transport).download_scaffold().await
}
