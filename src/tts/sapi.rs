//! Windows SAPI backend
//!
//! Reaches `System.Speech` through PowerShell, which also works from WSL.
//! Each utterance is one PowerShell process reading the markup from stdin
//! and handing it to `SpeakSsml`; the process exits once speech is done.

use super::{ChildUtterance, Finished, SpeakMode, TtsEngine, Utterance};
use crate::error::{ChatterError, ChatterResult};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

// Redirected stdin is decoded with the OEM code page unless told otherwise.
const SPEAK_SCRIPT: &str = "[Console]::InputEncoding = [System.Text.Encoding]::UTF8; \
     Add-Type -AssemblyName System.Speech; \
     $s = New-Object System.Speech.Synthesis.SpeechSynthesizer; \
     $s.SpeakSsml([Console]::In.ReadToEnd())";

const POWERSHELL_PATHS: &[&str] = &[
    "powershell.exe",
    "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe",
];

#[derive(Debug)]
pub struct SapiEngine {
    powershell_path: String,
}

impl SapiEngine {
    /// Locate PowerShell and verify `System.Speech` loads
    pub async fn connect() -> ChatterResult<Self> {
        Self::connect_with(POWERSHELL_PATHS).await
    }

    /// Like [`SapiEngine::connect`], trying `candidates` in order
    pub async fn connect_with(candidates: &[&str]) -> ChatterResult<Self> {
        debug!("Creating Windows SAPI backend");
        let powershell_path = Self::find_powershell(candidates).await?;
        debug!("Found PowerShell at: {}", powershell_path);
        Self::test_sapi(&powershell_path).await?;
        Ok(Self { powershell_path })
    }

    async fn find_powershell(candidates: &[&str]) -> ChatterResult<String> {
        for path in candidates {
            if let Ok(status) = Command::new(path)
                .arg("-Command")
                .arg("$PSVersionTable.PSVersion")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
            {
                if status.success() {
                    return Ok(path.to_string());
                }
            }
        }

        Err(ChatterError::EngineUnavailable(
            "PowerShell not found. WSL interop may not be enabled.".to_string(),
        ))
    }

    async fn test_sapi(powershell_path: &str) -> ChatterResult<()> {
        let output = Command::new(powershell_path)
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg("Add-Type -AssemblyName System.Speech")
            .output()
            .await
            .map_err(|e| ChatterError::EngineUnavailable(format!("Failed to test SAPI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChatterError::EngineUnavailable(format!(
                "Windows SAPI not available: {}",
                stderr
            )));
        }

        debug!("Windows SAPI test successful");
        Ok(())
    }
}

#[async_trait]
impl TtsEngine for SapiEngine {
    async fn speak(&self, markup: &str, mode: SpeakMode) -> ChatterResult<Box<dyn Utterance>> {
        debug!("SAPI speaking: {}", markup);

        let mut child = Command::new(&self.powershell_path)
            .arg("-NoProfile")
            .arg("-NonInteractive")
            .arg("-Command")
            .arg(SPEAK_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChatterError::EngineUnavailable(format!("Failed to spawn PowerShell: {}", e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(markup.as_bytes())
                .await
                .map_err(|e| ChatterError::EngineUnavailable(format!("SAPI pipe closed: {}", e)))?;
            stdin.shutdown().await?;
        }

        match mode {
            SpeakMode::Synchronous => {
                let status = child.wait().await?;
                if !status.success() {
                    return Err(ChatterError::EngineUnavailable(format!(
                        "SAPI failed with status {}",
                        status
                    )));
                }
                Ok(Box::new(Finished))
            }
            SpeakMode::Asynchronous => Ok(Box::new(ChildUtterance::new(child, "powershell"))),
        }
    }

    fn name(&self) -> &str {
        "sapi"
    }
}
