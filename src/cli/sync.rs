use crate::core::PreferencesStore;
use crate::core::settings::{RemoteSettings, SyncOutcome, sync_settings};
use anyhow::Result;

pub async fn run(
    local: &dyn PreferencesStore,
    remote: &dyn RemoteSettings,
    identity: &str,
) -> Result<SyncOutcome> {
    let outcome = sync_settings(local, remote, identity).await?;
    let message = match outcome {
        SyncOutcome::PushedLocal => "Pushed local settings to the shared copy.",
        SyncOutcome::PulledRemote => "Pulled newer settings from the shared copy.",
        SyncOutcome::Unchanged => "Settings already in sync.",
    };
    println!("{message}");
    Ok(outcome)
}
