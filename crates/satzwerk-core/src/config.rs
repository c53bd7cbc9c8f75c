// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration: settings plus the page-setup options a caller resolves
// before starting a pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SatzwerkError};
use crate::settings::ExportSettings;

/// Font requested for the text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSelection {
    pub family: String,
    pub bold: bool,
    pub italic: bool,
    /// Document font size in points, used when detected sizes are off.
    pub size_pt: f64,
}

impl Default for FontSelection {
    fn default() -> Self {
        Self {
            family: "Helvetica".into(),
            bold: false,
            italic: false,
            size_pt: 12.0,
        }
    }
}

/// Output resolution and font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Resolution of embedded rasters.
    pub output_dpi: u32,
    pub font: FontSelection,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dpi: 300,
            font: FontSelection::default(),
        }
    }
}

/// Everything a pass needs besides the document and the backends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub settings: ExportSettings,
    pub options: ExportOptions,
}

impl ExportConfig {
    /// Parse a JSON configuration document and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        if self.options.output_dpi == 0 {
            return Err(SatzwerkError::InvalidSettings(
                "output resolution must be positive".into(),
            ));
        }
        let size = self.options.font.size_pt;
        if size.is_nan() || size <= 0.0 {
            return Err(SatzwerkError::InvalidSettings(format!(
                "font size {} must be positive",
                self.options.font.size_pt
            )));
        }
        Ok(())
    }
}
