use std::fmt;
use std::fs;
use std::ops::{BitOr, BitOrAssign};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Input event classes the runtime forwards to the application.
///
/// Stored as a raw bit set so it can be written as a plain integer in
/// settings files (`event_mask = 15`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(transparent)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: Self = Self(0x00);
    pub const MOUSE_BUTTON: Self = Self(0x01);
    pub const MOUSE_MOTION: Self = Self(0x02);
    pub const SCROLL: Self = Self(0x04);
    pub const KEY: Self = Self(0x08);
    pub const ALL: Self = Self(0x0F);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when every class in `other` is enabled.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for EventMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EventMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::MOUSE_BUTTON, "MOUSE_BUTTON"),
            (Self::MOUSE_MOTION, "MOUSE_MOTION"),
            (Self::SCROLL, "SCROLL"),
            (Self::KEY, "KEY"),
        ];

        if self.is_empty() {
            return write!(f, "EventMask(NONE)");
        }

        let mut first = true;
        write!(f, "EventMask(")?;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    write!(f, " | ")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        write!(f, ")")
    }
}

/// Application settings.
///
/// Filled with defaults, optionally overridden from a TOML file, then handed to
/// `App::on_create` for a last mutation. The runtime captures the value after
/// that call and never changes it again.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application name, also used as the window title.
    pub name: String,
    pub fullscreen: bool,
    /// Window width in physical pixels; ignored in fullscreen.
    pub width: u32,
    /// Window height in physical pixels; ignored in fullscreen.
    pub height: u32,
    /// Target rate of the logic loop, in ticks per second.
    pub tick_rate: u32,
    /// Target rate of the presentation loop, in frames per second.
    pub frame_rate: u32,
    pub event_mask: EventMask,
    /// Minimum pointer displacement (pixels) before a motion event is delivered.
    pub motion_threshold: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "Cadence Application".to_string(),
            fullscreen: false,
            width: 640,
            height: 480,
            tick_rate: 100,
            frame_rate: 60,
            event_mask: EventMask::ALL,
            motion_threshold: 1,
        }
    }
}

/// Failure to read or parse a settings file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl Settings {
    /// Parses settings from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Loads settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the invariants the scheduler relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_rate == 0 {
            return Err("tick_rate must be a positive number of ticks per second".into());
        }
        if self.frame_rate == 0 {
            return Err("frame_rate must be a positive number of frames per second".into());
        }
        if !self.fullscreen && (self.width == 0 || self.height == 0) {
            return Err(format!(
                "windowed mode needs a non-zero size, got {}x{}",
                self.width, self.height
            ));
        }
        Ok(())
    }
}
