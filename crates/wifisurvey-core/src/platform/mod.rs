//! Platform adapters: drive the OS Wi-Fi tools through a [`CommandRunner`]
//! and hand their output to the parsers.
//!
//! The platform is chosen once per process from the compile target
//! ([`PlatformKind::detect`]); [`SystemWifi`] dispatches to it.

mod macos;
mod windows;

use std::future::Future;
use std::sync::Arc;

use strum::Display;

pub use macos::MacosWifi;
pub use windows::WindowsWifi;

use crate::config::SurveySettings;
use crate::error::CoreError;
use crate::localization::LocalizationMap;
use crate::model::WifiRecord;
use crate::runner::CommandRunner;

/// Operations the orchestrator needs from the OS.
pub trait WifiPlatform: Send + Sync {
    /// Platform-specific settings checks (e.g. verifying the sudo password).
    fn preflight(
        &self,
        settings: &SurveySettings,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Drop and re-establish the association so the OS picks the best AP.
    /// Best-effort: waits that time out are logged, not raised.
    fn restart_radio(
        &self,
        settings: &SurveySettings,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// The current association.
    fn scan(
        &self,
        settings: &SurveySettings,
    ) -> impl Future<Output = Result<WifiRecord, CoreError>> + Send;

    /// Other visible networks, strongest first where the OS reports signal.
    fn candidates(
        &self,
        settings: &SurveySettings,
    ) -> impl Future<Output = Result<Vec<WifiRecord>, CoreError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PlatformKind {
    #[strum(serialize = "macOS")]
    Macos,
    #[strum(serialize = "Windows")]
    Windows,
}

impl PlatformKind {
    /// The platform this binary was built for.
    pub fn detect() -> Result<Self, CoreError> {
        Self::from_os(std::env::consts::OS)
    }

    pub fn from_os(os: &str) -> Result<Self, CoreError> {
        match os {
            "macos" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            other => Err(CoreError::UnsupportedPlatform {
                os: other.to_owned(),
            }),
        }
    }
}

/// The adapter for the running OS.
#[derive(Debug)]
pub enum SystemWifi<R> {
    Macos(MacosWifi<R>),
    Windows(WindowsWifi<R>),
}

impl<R: CommandRunner> SystemWifi<R> {
    pub fn new(kind: PlatformKind, runner: R, localization: Arc<LocalizationMap>) -> Self {
        match kind {
            PlatformKind::Macos => Self::Macos(MacosWifi::new(runner)),
            PlatformKind::Windows => Self::Windows(WindowsWifi::new(runner, localization)),
        }
    }

    pub fn detect(runner: R, localization: Arc<LocalizationMap>) -> Result<Self, CoreError> {
        Ok(Self::new(PlatformKind::detect()?, runner, localization))
    }

    pub fn kind(&self) -> PlatformKind {
        match self {
            Self::Macos(_) => PlatformKind::Macos,
            Self::Windows(_) => PlatformKind::Windows,
        }
    }
}

impl<R: CommandRunner> WifiPlatform for SystemWifi<R> {
    async fn preflight(&self, settings: &SurveySettings) -> Result<(), CoreError> {
        match self {
            Self::Macos(p) => p.preflight(settings).await,
            Self::Windows(p) => p.preflight(settings).await,
        }
    }

    async fn restart_radio(&self, settings: &SurveySettings) -> Result<(), CoreError> {
        match self {
            Self::Macos(p) => p.restart_radio(settings).await,
            Self::Windows(p) => p.restart_radio(settings).await,
        }
    }

    async fn scan(&self, settings: &SurveySettings) -> Result<WifiRecord, CoreError> {
        match self {
            Self::Macos(p) => p.scan(settings).await,
            Self::Windows(p) => p.scan(settings).await,
        }
    }

    async fn candidates(&self, settings: &SurveySettings) -> Result<Vec<WifiRecord>, CoreError> {
        match self {
            Self::Macos(p) => p.candidates(settings).await,
            Self::Windows(p) => p.candidates(settings).await,
        }
    }
}
