//! User-facing configuration.
//!
//! [`Configuration::default`] carries the documented defaults. A JSON
//! configuration document may overlay the `general` and `display` sections
//! before the context is shared with detectors; afterwards it is read-only.

use crate::error::{Result, SysfetchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::IsTerminal;

/// Unit prefix family used when printing sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryPrefixType {
    #[default]
    Iec,
    Si,
    Jedec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
    Kelvin,
}

/// Library path overrides for optional native backends. Empty means "search
/// the default locations".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryPaths {
    pub pci: String,
    pub vulkan: String,
    pub wayland: String,
    pub xcb_randr: String,
    pub xcb: String,
    pub xrandr: String,
    pub x11: String,
    pub gio: String,
    pub dconf: String,
    pub dbus: String,
    pub xfconf: String,
    pub sqlite3: String,
    pub rpm: String,
    pub imagemagick: String,
    pub z: String,
    pub chafa: String,
    pub egl: String,
    pub glx: String,
    pub osmesa: String,
    pub opencl: String,
    pub freetype: String,
    pub pulse: String,
    pub nm: String,
    pub ddcutil: String,
}

/// Settings that change how detection runs rather than how it is printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneralOptions {
    /// Launch the background probes
    pub multithreading: bool,
    /// Report the Bedrock Linux host instead of the current stratum
    pub escape_bedrock: bool,
    /// How long a reader waits for a background probe before giving up
    pub processing_timeout_ms: u64,
}

impl Default for GeneralOptions {
    fn default() -> Self {
        GeneralOptions {
            multithreading: true,
            escape_bedrock: true,
            processing_timeout_ms: 1000,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneralOverlay {
    multithreading: Option<bool>,
    escape_bedrock: Option<bool>,
    processing_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DisplayOverlay {
    key_value_separator: Option<String>,
    color_keys: Option<String>,
    color_title: Option<String>,
    bright_color: Option<bool>,
    show_errors: Option<bool>,
    pipe: Option<bool>,
    disable_linewrap: Option<bool>,
    hide_cursor: Option<bool>,
    binary_prefix: Option<BinaryPrefixType>,
    temperature_unit: Option<TemperatureUnit>,
    key_width: Option<u32>,
}

/// Process-wide configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub general: GeneralOptions,

    pub color_keys: String,
    pub color_title: String,
    pub bright_color: bool,
    pub key_value_separator: String,

    pub show_errors: bool,
    pub pipe: bool,
    pub disable_linewrap: bool,
    pub hide_cursor: bool,

    pub binary_prefix: BinaryPrefixType,
    pub size_ndigits: u8,
    pub size_max_prefix: u8,
    pub temperature_unit: TemperatureUnit,
    pub stat: bool,
    pub no_buffer: bool,
    pub key_width: u32,

    pub bar_char_elapsed: String,
    pub bar_char_total: String,
    pub bar_width: u8,
    pub bar_border: bool,
    pub percent_type: u8,
    pub percent_ndigits: u8,

    pub libraries: LibraryPaths,
}

impl Default for Configuration {
    fn default() -> Self {
        let pipe = !std::io::stdout().is_terminal();
        // Leave the terminal alone in debug builds so panics stay readable
        let terminal_tweaks = !cfg!(debug_assertions) && !pipe;

        Configuration {
            general: GeneralOptions::default(),
            color_keys: String::new(),
            color_title: String::new(),
            bright_color: true,
            key_value_separator: ": ".to_string(),
            show_errors: false,
            pipe,
            disable_linewrap: terminal_tweaks,
            hide_cursor: terminal_tweaks,
            binary_prefix: BinaryPrefixType::Iec,
            size_ndigits: 2,
            size_max_prefix: u8::MAX,
            temperature_unit: TemperatureUnit::Celsius,
            stat: false,
            no_buffer: false,
            key_width: 0,
            bar_char_elapsed: "■".to_string(),
            bar_char_total: "-".to_string(),
            bar_width: 10,
            bar_border: true,
            percent_type: 1,
            percent_ndigits: 0,
            libraries: LibraryPaths::default(),
        }
    }
}

impl Configuration {
    /// Overlay the `general`, `display` and `libraries` sections of a
    /// configuration document. Unknown sections are ignored.
    pub fn apply_document(&mut self, doc: &Value) -> Result<()> {
        if !doc.is_object() {
            return Err(SysfetchError::InvalidConfig(
                "top level must be an object".to_string(),
            ));
        }

        if let Some(general) = section(doc, "general")? {
            let overlay: GeneralOverlay = serde_json::from_value(general.clone())?;
            if let Some(v) = overlay.multithreading {
                self.general.multithreading = v;
            }
            if let Some(v) = overlay.escape_bedrock {
                self.general.escape_bedrock = v;
            }
            if let Some(v) = overlay.processing_timeout_ms {
                self.general.processing_timeout_ms = v;
            }
        }

        if let Some(display) = section(doc, "display")? {
            let overlay: DisplayOverlay = serde_json::from_value(display.clone())?;
            self.apply_display(overlay);
        }

        if let Some(libraries) = section(doc, "libraries")? {
            self.libraries = serde_json::from_value(libraries.clone())?;
        }

        Ok(())
    }

    fn apply_display(&mut self, overlay: DisplayOverlay) {
        if let Some(v) = overlay.key_value_separator {
            self.key_value_separator = v;
        }
        if let Some(v) = overlay.color_keys {
            self.color_keys = v;
        }
        if let Some(v) = overlay.color_title {
            self.color_title = v;
        }
        if let Some(v) = overlay.bright_color {
            self.bright_color = v;
        }
        if let Some(v) = overlay.show_errors {
            self.show_errors = v;
        }
        if let Some(v) = overlay.pipe {
            self.pipe = v;
        }
        if let Some(v) = overlay.disable_linewrap {
            self.disable_linewrap = v;
        }
        if let Some(v) = overlay.hide_cursor {
            self.hide_cursor = v;
        }
        if let Some(v) = overlay.binary_prefix {
            self.binary_prefix = v;
        }
        if let Some(v) = overlay.temperature_unit {
            self.temperature_unit = v;
        }
        if let Some(v) = overlay.key_width {
            self.key_width = v;
        }
    }
}

fn section<'a>(doc: &'a Value, name: &str) -> Result<Option<&'a Value>> {
    match doc.get(name) {
        None => Ok(None),
        Some(v) if v.is_object() => Ok(Some(v)),
        Some(_) => Err(SysfetchError::InvalidConfig(format!(
            "`{name}` must be an object"
        ))),
    }
}
