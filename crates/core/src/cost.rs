//! Cost quoting and the pre-submission cost gate.
//!
//! The gate is a fixed sequence of independent checks, each returning a
//! [`GateViolation`] on failure. They are composed with `?`, so the first
//! failing check wins and nothing after it runs. The gate itself is pure:
//! a failure never has side effects.

use serde::Serialize;

use crate::error::CoreError;
use crate::params::{ClipDuration, Resolution, Speed};
use crate::preset::ResolvedConfiguration;
use crate::request::MAX_REFERENCE_IMAGES;

// ---------------------------------------------------------------------------
// Extension policy
// ---------------------------------------------------------------------------

/// Seconds appended by every extension.
pub const EXTENSION_SECS: u32 = 7;

/// Cumulative duration at or beyond which an artifact is reported as no
/// longer extendable.
pub const EXTENDABLE_CEILING_SECS: u32 = 148;

/// Whether an artifact of `total_secs` may be extended again.
pub fn is_extendable(total_secs: u32) -> bool {
    total_secs < EXTENDABLE_CEILING_SECS
}

// ---------------------------------------------------------------------------
// Cost quote
// ---------------------------------------------------------------------------

/// Price of generating `seconds` of video at a given speed tier.
///
/// Held in whole cents so that the rendered amount is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostQuote {
    pub seconds: u32,
    pub speed: Speed,
    pub cents: u64,
}

impl CostQuote {
    pub fn new(seconds: u32, speed: Speed) -> Self {
        Self {
            seconds,
            speed,
            cents: u64::from(seconds) * speed.cents_per_second(),
        }
    }

    /// Quote for one fixed-length extension.
    pub fn for_extension(speed: Speed) -> Self {
        Self::new(EXTENSION_SECS, speed)
    }

    pub fn model(&self) -> &'static str {
        self.speed.model()
    }

    /// Dollar amount rendered as `$D.CC`.
    pub fn amount(&self) -> String {
        format!("${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl std::fmt::Display for CostQuote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.amount())
    }
}

impl Serialize for CostQuote {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.amount())
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

/// A failed cost or safety policy check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateViolation {
    #[error(
        "1080p resolution only available for {max}-second videos. Use --resolution 720p for {duration}s duration."
    )]
    InvalidResolution { duration: u32, max: u32 },

    #[error("Too many reference images: {count}. Maximum is {max}.")]
    TooManyReferenceImages { count: usize, max: usize },

    #[error("{tier} mode costs {quote} for {subject}. Re-run with --confirm-cost to proceed.")]
    CostConfirmationRequired {
        tier: &'static str,
        quote: CostQuote,
        subject: String,
    },
}

impl GateViolation {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidResolution { .. } => "INVALID_RESOLUTION",
            Self::TooManyReferenceImages { .. } => "TOO_MANY_REFERENCE_IMAGES",
            Self::CostConfirmationRequired { .. } => "COST_CONFIRMATION_REQUIRED",
        }
    }
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// The elevated resolution is legal only at the maximum duration.
pub fn check_resolution(
    resolution: Resolution,
    duration: ClipDuration,
) -> Result<(), GateViolation> {
    if resolution.is_elevated() && duration != ClipDuration::MAX {
        return Err(GateViolation::InvalidResolution {
            duration: duration.seconds(),
            max: ClipDuration::MAX.seconds(),
        });
    }
    Ok(())
}

pub fn check_reference_images(count: usize) -> Result<(), GateViolation> {
    if count > MAX_REFERENCE_IMAGES {
        return Err(GateViolation::TooManyReferenceImages {
            count,
            max: MAX_REFERENCE_IMAGES,
        });
    }
    Ok(())
}

/// Spend on a tier that requires confirmation must be explicitly confirmed.
pub fn check_confirmation(
    quote: &CostQuote,
    confirmed: bool,
    subject: impl FnOnce() -> String,
) -> Result<(), GateViolation> {
    if quote.speed.requires_confirmation() && !confirmed {
        return Err(GateViolation::CostConfirmationRequired {
            tier: tier_label(quote.speed),
            quote: *quote,
            subject: subject(),
        });
    }
    Ok(())
}

fn tier_label(speed: Speed) -> &'static str {
    match speed {
        Speed::Fast => "Fast",
        Speed::Standard => "Standard",
    }
}

// ---------------------------------------------------------------------------
// Composed gates
// ---------------------------------------------------------------------------

/// Gate a first-time generation. Returns the quote for the clip on success.
///
/// Checks run in order: resolution/duration, reference image count,
/// spend confirmation.
pub fn check_generation(
    config: &ResolvedConfiguration,
    confirmed: bool,
) -> Result<CostQuote, CoreError> {
    let duration = config.require_duration()?;
    check_resolution(config.resolution, duration)?;
    check_reference_images(config.reference_images.len())?;
    let quote = CostQuote::new(duration.seconds(), config.speed);
    check_confirmation(&quote, confirmed, || format!("{}s", duration.seconds()))?;
    Ok(quote)
}

/// Gate an extension, which is always [`EXTENSION_SECS`] at the lower tier.
pub fn check_extension(speed: Speed, confirmed: bool) -> Result<CostQuote, CoreError> {
    let quote = CostQuote::for_extension(speed);
    check_confirmation(&quote, confirmed, || format!("{EXTENSION_SECS}s extension"))?;
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AspectRatio;
    use crate::preset::{resolve, PresetCatalog};
    use crate::request::GenerationRequest;
    use assert_matches::assert_matches;

    fn config(duration: ClipDuration, speed: Speed, resolution: Resolution) -> ResolvedConfiguration {
        let req = GenerationRequest::new("A cat on a beach")
            .with_duration(duration)
            .with_aspect_ratio(AspectRatio::Landscape)
            .with_speed(speed)
            .with_resolution(resolution);
        resolve(&req, &PresetCatalog::default()).unwrap()
    }

    #[test]
    fn quote_amounts_are_exact() {
        assert_eq!(CostQuote::new(8, Speed::Fast).amount(), "$1.20");
        assert_eq!(CostQuote::new(8, Speed::Standard).amount(), "$3.20");
        assert_eq!(CostQuote::for_extension(Speed::Fast).amount(), "$1.05");
        assert_eq!(CostQuote::for_extension(Speed::Standard).amount(), "$2.80");
        assert_eq!(CostQuote::new(4, Speed::Fast).amount(), "$0.60");
    }

    #[test]
    fn quote_serializes_as_amount() {
        let v = serde_json::to_value(CostQuote::new(6, Speed::Fast)).unwrap();
        assert_eq!(v, "$0.90");
    }

    #[test]
    fn elevated_resolution_only_at_max_duration() {
        for &secs in ClipDuration::ALL {
            let duration = ClipDuration::from_seconds(secs).unwrap();
            let result = check_resolution(Resolution::P1080, duration);
            assert_eq!(result.is_ok(), duration == ClipDuration::MAX, "duration {secs}");
            assert!(check_resolution(Resolution::P720, duration).is_ok());
        }
    }

    #[test]
    fn reference_image_limit() {
        assert!(check_reference_images(0).is_ok());
        assert!(check_reference_images(3).is_ok());
        assert_matches!(
            check_reference_images(4),
            Err(GateViolation::TooManyReferenceImages { count: 4, max: 3 })
        );
    }

    #[test]
    fn standard_without_confirmation_fails_with_amount() {
        let cfg = config(ClipDuration::Eight, Speed::Standard, Resolution::P720);
        let err = check_generation(&cfg, false).unwrap_err();
        assert_eq!(err.code(), "COST_CONFIRMATION_REQUIRED");
        assert!(err.to_string().contains("$3.20"), "{err}");
    }

    #[test]
    fn standard_with_confirmation_passes() {
        let cfg = config(ClipDuration::Eight, Speed::Standard, Resolution::P1080);
        let quote = check_generation(&cfg, true).unwrap();
        assert_eq!(quote.amount(), "$3.20");
    }

    #[test]
    fn fast_needs_no_confirmation() {
        let cfg = config(ClipDuration::Eight, Speed::Fast, Resolution::P720);
        let quote = check_generation(&cfg, false).unwrap();
        assert_eq!(quote.amount(), "$1.20");
        assert_eq!(quote.model(), "veo-3.1-fast-generate-preview");
    }

    #[test]
    fn resolution_check_runs_before_confirmation() {
        let cfg = config(ClipDuration::Four, Speed::Standard, Resolution::P1080);
        let err = check_generation(&cfg, false).unwrap_err();
        assert_eq!(err.code(), "INVALID_RESOLUTION");
    }

    #[test]
    fn image_check_runs_before_confirmation() {
        let mut cfg = config(ClipDuration::Eight, Speed::Standard, Resolution::P720);
        cfg.reference_images = vec!["a.png".into(); 4];
        let err = check_generation(&cfg, false).unwrap_err();
        assert_eq!(err.code(), "TOO_MANY_REFERENCE_IMAGES");
    }

    #[test]
    fn missing_duration_is_input_error() {
        let mut cfg = config(ClipDuration::Eight, Speed::Fast, Resolution::P720);
        cfg.duration = None;
        assert_eq!(check_generation(&cfg, false).unwrap_err().code(), "MISSING_DURATION");
    }

    #[test]
    fn extension_uses_fixed_duration() {
        let err = check_extension(Speed::Standard, false).unwrap_err();
        assert_eq!(err.code(), "COST_CONFIRMATION_REQUIRED");
        assert!(err.to_string().contains("$2.80 for 7s extension"), "{err}");
        assert_eq!(check_extension(Speed::Fast, false).unwrap().seconds, EXTENSION_SECS);
    }

    #[test]
    fn extendable_ceiling() {
        assert!(is_extendable(141));
        assert!(is_extendable(147));
        assert!(!is_extendable(148));
        assert!(!is_extendable(155));
    }
}
