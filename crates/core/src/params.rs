//! Enumerated generation parameters: clip duration, aspect ratio,
//! resolution tier and speed tier.
//!
//! Each enum follows the same shape: `as_str` / `from_str` for the wire
//! spelling, an `ALL` list for error messages, and a `Display` impl.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Clip duration
// ---------------------------------------------------------------------------

/// Length of a freshly generated clip, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ClipDuration {
    Four,
    Six,
    Eight,
}

impl ClipDuration {
    /// The longest duration; the only one that permits the elevated resolution.
    pub const MAX: ClipDuration = ClipDuration::Eight;

    /// All valid duration values in seconds.
    pub const ALL: &'static [u32] = &[4, 6, 8];

    pub fn seconds(self) -> u32 {
        match self {
            Self::Four => 4,
            Self::Six => 6,
            Self::Eight => 8,
        }
    }

    /// Parse a duration in seconds. Returns `None` for unsupported values.
    pub fn from_seconds(secs: u32) -> Option<Self> {
        match secs {
            4 => Some(Self::Four),
            6 => Some(Self::Six),
            8 => Some(Self::Eight),
            _ => None,
        }
    }
}

impl From<ClipDuration> for u32 {
    fn from(d: ClipDuration) -> u32 {
        d.seconds()
    }
}

impl TryFrom<u32> for ClipDuration {
    type Error = String;

    fn try_from(secs: u32) -> Result<Self, Self::Error> {
        Self::from_seconds(secs).ok_or_else(|| format!("unsupported duration: {secs}"))
    }
}

impl std::fmt::Display for ClipDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}

// ---------------------------------------------------------------------------
// Aspect ratio
// ---------------------------------------------------------------------------

/// Frame aspect ratio of the generated clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "1:1")]
    Square,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
            Self::Square => "1:1",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "16:9" => Some(Self::Landscape),
            "9:16" => Some(Self::Portrait),
            "1:1" => Some(Self::Square),
            _ => None,
        }
    }

    /// All valid aspect ratio values.
    pub const ALL: &'static [&'static str] = &["16:9", "9:16", "1:1"];
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Output resolution tier.
///
/// `P1080` is the elevated tier and is only legal at [`ClipDuration::MAX`].
/// Extensions always render at `P720`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "720p" => Some(Self::P720),
            "1080p" => Some(Self::P1080),
            _ => None,
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::P1080)
    }

    /// All valid resolution values.
    pub const ALL: &'static [&'static str] = &["720p", "1080p"];
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Speed tier
// ---------------------------------------------------------------------------

/// Speed tier of the generation model. Determines both the model
/// identifier and the per-second price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    #[default]
    Fast,
    Standard,
}

/// Model used for the fast tier.
pub const MODEL_FAST: &str = "veo-3.1-fast-generate-preview";
/// Model used for the standard tier.
pub const MODEL_STANDARD: &str = "veo-3.1-generate-preview";

impl Speed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Standard => "standard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "fast" => Some(Self::Fast),
            "standard" => Some(Self::Standard),
            _ => None,
        }
    }

    /// Price per generated second, in US cents.
    pub fn cents_per_second(&self) -> u64 {
        match self {
            Self::Fast => 15,
            Self::Standard => 40,
        }
    }

    /// Provider model identifier for this tier.
    pub fn model(&self) -> &'static str {
        match self {
            Self::Fast => MODEL_FAST,
            Self::Standard => MODEL_STANDARD,
        }
    }

    /// Whether using this tier needs explicit spend confirmation.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, Self::Standard)
    }

    /// All valid speed values.
    pub const ALL: &'static [&'static str] = &["fast", "standard"];
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
