// ── Windows adapter ──
//
// Everything goes through `netsh wlan`, whose labels follow the display
// language; the shared `LocalizationMap` translates them.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::WifiPlatform;
use crate::config::SurveySettings;
use crate::error::CoreError;
use crate::localization::LocalizationMap;
use crate::model::WifiRecord;
use crate::parse::windows::{
    find_profile_from_ssid, parse_interfaces, parse_networks, parse_profiles,
};
use crate::poll::poll_until;
use crate::runner::CommandRunner;

#[derive(Debug)]
pub struct WindowsWifi<R> {
    runner: R,
    localization: Arc<LocalizationMap>,
}

impl<R: CommandRunner> WindowsWifi<R> {
    pub fn new(runner: R, localization: Arc<LocalizationMap>) -> Self {
        Self {
            runner,
            localization,
        }
    }

    /// Names of the saved Wi-Fi profiles.
    pub async fn profiles(&self) -> Result<Vec<String>, CoreError> {
        let out = self.runner.run("netsh wlan show profiles").await?;
        Ok(parse_profiles(&self.localization, &out.stdout))
    }

    async fn current(&self) -> Result<WifiRecord, CoreError> {
        let out = self.runner.run("netsh wlan show interfaces").await?;
        parse_interfaces(&self.localization, &out.stdout)
    }

    /// Wait until `show interfaces` parses (`connected`) or stops parsing.
    async fn wait_for_link(&self, connected: bool, settings: &SurveySettings) {
        let timings = settings.timings;
        let (what, timeout) = if connected {
            ("Wi-Fi reconnect", timings.radio_on_timeout)
        } else {
            ("Wi-Fi disconnect", timings.radio_off_timeout)
        };
        let waited = poll_until(what, timings.interval, timeout, move || async move {
            Ok((self.current().await.is_ok() == connected).then_some(()))
        })
        .await;
        if let Err(e) = waited {
            warn!(error = %e, "continuing without confirmed link state");
        }
    }
}

impl<R: CommandRunner> WifiPlatform for WindowsWifi<R> {
    async fn preflight(&self, _settings: &SurveySettings) -> Result<(), CoreError> {
        Ok(())
    }

    async fn restart_radio(&self, settings: &SurveySettings) -> Result<(), CoreError> {
        let ssid = self.current().await?.ssid;
        let out = self.runner.run("netsh wlan show profiles name=*").await?;
        let Some(profile) = find_profile_from_ssid(&self.localization, &out.stdout, &ssid)? else {
            warn!(%ssid, "no saved profile for current SSID; skipping radio restart");
            return Ok(());
        };
        debug!(%ssid, %profile, "matched saved profile");

        info!(%profile, "disconnecting");
        self.runner.run("netsh wlan disconnect").await?;
        self.wait_for_link(false, settings).await;

        info!(%profile, "reconnecting");
        self.runner
            .run(&format!("netsh wlan connect name=\"{profile}\""))
            .await?;
        self.wait_for_link(true, settings).await;
        Ok(())
    }

    async fn scan(&self, _settings: &SurveySettings) -> Result<WifiRecord, CoreError> {
        self.current().await
    }

    async fn candidates(&self, _settings: &SurveySettings) -> Result<Vec<WifiRecord>, CoreError> {
        let out = self.runner.run("netsh wlan show networks mode=bssid").await?;
        let mut networks = parse_networks(&self.localization, &out.stdout);
        networks.retain(|r| !r.bssid.is_empty());
        Ok(networks)
    }
}
