// ── macOS adapter ──
//
// wdutil and the radio toggle need root; the sudo password is fed through
// stdin to `sudo -S`. system_profiler, ioreg, networksetup and ipconfig do
// not.

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::WifiPlatform;
use crate::config::SurveySettings;
use crate::error::CoreError;
use crate::model::{WifiRecord, is_valid_mac};
use crate::parse::macos::{
    candidate_networks, parse_hardware_ports, parse_ioreg_bssid, parse_system_profiler,
    parse_wdutil,
};
use crate::poll::{ProbeTarget, poll_command, poll_until};
use crate::runner::CommandRunner;

#[derive(Debug)]
pub struct MacosWifi<R> {
    runner: R,
    interface: OnceCell<String>,
}

impl<R: CommandRunner> MacosWifi<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            interface: OnceCell::new(),
        }
    }

    /// The Wi-Fi interface: the settings override, else the first Wi-Fi
    /// hardware port (looked up once).
    pub async fn interface(&self, settings: &SurveySettings) -> Result<String, CoreError> {
        if let Some(name) = &settings.interface {
            return Ok(name.clone());
        }
        self.interface
            .get_or_try_init(|| async {
                let out = self.runner.run("networksetup -listallhardwareports").await?;
                let name = parse_hardware_ports(&out.stdout).ok_or_else(|| {
                    CoreError::parse("networksetup output", "no Wi-Fi hardware port")
                })?;
                debug!(interface = %name, "found Wi-Fi interface");
                Ok::<_, CoreError>(name)
            })
            .await
            .cloned()
    }

    /// One `wdutil info` reading, BSSID patched from `ioreg` when redacted.
    async fn snapshot(&self, settings: &SurveySettings) -> Result<WifiRecord, CoreError> {
        let out = self
            .runner
            .run_with_input("sudo -S wdutil info", settings.sudo_password())
            .await?;
        let mut record = parse_wdutil(&out.stdout)?;

        if !is_valid_mac(&record.bssid) {
            debug!(bssid = %record.bssid, "invalid BSSID from wdutil, trying ioreg");
            let ioreg = self.runner.run("ioreg -l").await?;
            if let Some(bssid) = parse_ioreg_bssid(&ioreg.stdout) {
                record.bssid = bssid;
            }
        }
        Ok(record)
    }
}

impl<R: CommandRunner> WifiPlatform for MacosWifi<R> {
    async fn preflight(&self, settings: &SurveySettings) -> Result<(), CoreError> {
        let Some(password) = settings.sudo_password() else {
            return Err(CoreError::configuration(
                "Please set sudo password. It is required on macOS.",
            ));
        };
        self.runner
            .run_with_input("sudo -S ls", Some(password))
            .await
            .map_err(|_| CoreError::configuration("Please enter a valid sudo password."))?;
        Ok(())
    }

    async fn restart_radio(&self, settings: &SurveySettings) -> Result<(), CoreError> {
        let iface = self.interface(settings).await?;
        let timings = settings.timings;
        let probe = format!("ipconfig getifaddr {iface}");

        info!(interface = %iface, "turning Wi-Fi off");
        self.runner
            .run(&format!("networksetup -setairportpower {iface} off"))
            .await?;
        if let Err(e) = poll_command(
            &self.runner,
            &probe,
            ProbeTarget::Fails,
            timings.interval,
            timings.radio_off_timeout,
        )
        .await
        {
            warn!(error = %e, "interface kept its address; continuing");
        }

        info!(interface = %iface, "turning Wi-Fi on");
        self.runner
            .run(&format!("networksetup -setairportpower {iface} on"))
            .await?;
        if let Err(e) = poll_command(
            &self.runner,
            &probe,
            ProbeTarget::Succeeds,
            timings.interval,
            timings.radio_on_timeout,
        )
        .await
        {
            warn!(error = %e, "interface did not get an address; continuing");
        }
        Ok(())
    }

    /// Polls until the Tx rate is populated; it lags behind the address.
    async fn scan(&self, settings: &SurveySettings) -> Result<WifiRecord, CoreError> {
        let timings = settings.timings;
        let ready = poll_until(
            "non-zero Tx rate",
            timings.interval,
            timings.tx_rate_timeout,
            move || async move {
                let record = self.snapshot(settings).await?;
                Ok((record.tx_rate > 0.0).then_some(record))
            },
        )
        .await;

        match ready {
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "Tx rate still zero; using last reading");
                self.snapshot(settings).await
            }
            other => other,
        }
    }

    async fn candidates(&self, settings: &SurveySettings) -> Result<Vec<WifiRecord>, CoreError> {
        let iface = self.interface(settings).await?;
        let out = self
            .runner
            .run("system_profiler -json SPAirPortDataType")
            .await?;
        let report = parse_system_profiler(&out.stdout)?;
        Ok(candidate_networks(&report, &iface))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::testing::{Reply, ScriptedRunner};

    const PORTS: &str = "Hardware Port: Wi-Fi\nDevice: en0\nEthernet Address: a0:b1:c2:d3:e4:f5";

    fn wdutil(bssid: &str, tx_rate: &str) -> String {
        format!(
            "WIFI\n    SSID : Home\n    BSSID : {bssid}\n    RSSI : -60 dBm\n    \
             Tx Rate : {tx_rate}\n    Channel : 2g6/20\nBLUETOOTH\n"
        )
    }

    fn settings() -> SurveySettings {
        SurveySettings {
            server: "10.0.0.2".into(),
            sudo_password: Some(SecretString::from("pw".to_owned())),
            ..SurveySettings::default()
        }
    }

    #[tokio::test]
    async fn preflight_requires_password() {
        let wifi = MacosWifi::new(ScriptedRunner::new());
        let mut s = settings();
        s.sudo_password = None;
        let err = wifi.preflight(&s).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please set sudo password. It is required on macOS."
        );
    }

    #[tokio::test]
    async fn preflight_verifies_password_via_stdin() {
        let runner = ScriptedRunner::new().on("sudo -S ls", [Reply::Fail]);
        let wifi = MacosWifi::new(runner);
        let err = wifi.preflight(&settings()).await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid sudo password.");

        let calls = wifi.runner.calls();
        assert_eq!(calls[0], ("sudo -S ls".to_owned(), Some("pw".to_owned())));
    }

    #[tokio::test]
    async fn interface_is_discovered_once() {
        let wifi = MacosWifi::new(ScriptedRunner::new().ok("networksetup -listall", PORTS));
        assert_eq!(wifi.interface(&settings()).await.unwrap(), "en0");
        assert_eq!(wifi.interface(&settings()).await.unwrap(), "en0");
        assert_eq!(wifi.runner.commands().len(), 1);

        let mut s = settings();
        s.interface = Some("en7".into());
        assert_eq!(wifi.interface(&s).await.unwrap(), "en7");
    }

    #[tokio::test(start_paused = true)]
    async fn scan_waits_for_tx_rate_and_patches_bssid() {
        let runner = ScriptedRunner::new()
            .on(
                "sudo -S wdutil",
                [
                    Reply::Ok(wdutil("<redacted>", "0")),
                    Reply::Ok(wdutil("<redacted>", "0")),
                    Reply::Ok(wdutil("<redacted>", "144.0 Mbps")),
                ],
            )
            .ok("ioreg -l", "  \"IO80211BSSID\" = <a0b1c2d3e4f5>");
        let wifi = MacosWifi::new(runner);

        let record = wifi.scan(&settings()).await.unwrap();
        assert!((record.tx_rate - 144.0).abs() < f64::EPSILON);
        assert_eq!(record.bssid, "a0:b1:c2:d3:e4:f5");
        assert_eq!(record.channel, 6);
        let wdutil_calls = wifi
            .runner
            .commands()
            .iter()
            .filter(|c| c.starts_with("sudo -S wdutil"))
            .count();
        assert_eq!(wdutil_calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn scan_returns_last_reading_when_tx_rate_never_appears() {
        let runner = ScriptedRunner::new().ok("sudo -S wdutil", &wdutil("1a:2b:3c:4d:5e:6f", "0"));
        let wifi = MacosWifi::new(runner);
        let record = wifi.scan(&settings()).await.unwrap();
        assert!(record.tx_rate.abs() < f64::EPSILON);
        assert_eq!(record.ssid, "Home");
    }

    #[tokio::test(start_paused = true)]
    async fn restart_radio_is_best_effort() {
        // ipconfig always succeeds, so the "off" wait times out.
        let runner = ScriptedRunner::new()
            .ok("networksetup -listall", PORTS)
            .ok("networksetup -setairportpower", "")
            .ok("ipconfig getifaddr", "192.168.1.20");
        let wifi = MacosWifi::new(runner);

        let mut s = settings();
        s.timings.radio_off_timeout = Duration::from_secs(1);
        wifi.restart_radio(&s).await.unwrap();

        let commands = wifi.runner.commands();
        assert!(commands.contains(&"networksetup -setairportpower en0 off".to_owned()));
        assert_eq!(
            commands.last().map(String::as_str),
            Some("ipconfig getifaddr en0")
        );
        let on = commands
            .iter()
            .position(|c| c == "networksetup -setairportpower en0 on")
            .unwrap();
        let off = commands
            .iter()
            .position(|c| c == "networksetup -setairportpower en0 off")
            .unwrap();
        assert!(off < on);
    }

    #[tokio::test]
    async fn candidates_come_from_system_profiler() {
        let json = r#"{"SPAirPortDataType":[{"spairport_airport_interfaces":[{"_name":"en0",
            "spairport_airport_other_local_wireless_networks":[
              {"_name":"B","spairport_signal_noise":"-70 dBm / -90 dBm"},
              {"_name":"A","spairport_signal_noise":"-50 dBm / -90 dBm"}]}]}]}"#;
        let runner = ScriptedRunner::new()
            .ok("networksetup -listall", PORTS)
            .ok("system_profiler", json);
        let wifi = MacosWifi::new(runner);
        let names: Vec<String> = wifi
            .candidates(&settings())
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.ssid)
            .collect();
        assert_eq!(names, ["A", "B"]);
    }
}
