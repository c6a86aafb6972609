use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::foundation::core::ZoneId;
use crate::foundation::error::{BannerError, BannerResult};

/// Longest message lifetime accepted from the message store.
pub const MAX_MESSAGE_DURATION_MS: u64 = 300_000;

/// How an overlay message enters and leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnimationProfile {
    /// Opacity ramp over a scrim.
    #[default]
    Fade,
    /// Enters from the right, leaves to the left.
    Slide,
    /// Scrolls continuously at the zone's speed, without a scrim.
    Scroll,
}

impl AnimationProfile {
    /// `none` and unrecognized values animate as [`AnimationProfile::Fade`].
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "slide" => Self::Slide,
            "scroll" => Self::Scroll,
            _ => Self::Fade,
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Slide => "slide",
            Self::Scroll => "scroll",
        }
    }
}

impl Serialize for AnimationProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnimationProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse_lossy(&s))
    }
}

/// Short-lived announcement drawn over the normal content of its zones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MessageRecord")]
pub struct OverlayMessage {
    /// Store id.
    pub id: String,
    /// Displayed text.
    pub text: String,
    /// Zones the message is drawn in.
    pub zones: Vec<ZoneId>,
    /// Entry and exit animation.
    pub animation: AnimationProfile,
    /// Display time, transitions excluded.
    pub duration_ms: u64,
    /// Creation time in the store; stamped on arrival when missing.
    pub created_at: Option<DateTime<Utc>>,
    /// Explicit end time; overrides `created_at + duration`.
    pub expires_at: Option<DateTime<Utc>>,
    /// Inactive records are dropped on arrival.
    pub active: bool,
}

impl OverlayMessage {
    /// Active message created now-ish, with no explicit expiry.
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        zones: Vec<ZoneId>,
        animation: AnimationProfile,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            zones,
            animation,
            duration_ms,
            created_at: None,
            expires_at: None,
            active: true,
        }
    }

    /// Reject records with no id, no zone or an out-of-range duration.
    pub fn validate(&self) -> BannerResult<()> {
        if self.id.is_empty() {
            return Err(BannerError::validation("message id must not be empty"));
        }
        if self.zones.is_empty() {
            return Err(BannerError::validation(format!(
                "message '{}' targets no zone",
                self.id
            )));
        }
        if self.duration_ms == 0 || self.duration_ms > MAX_MESSAGE_DURATION_MS {
            return Err(BannerError::validation(format!(
                "message '{}' duration must be in 1..={MAX_MESSAGE_DURATION_MS} ms, got {}",
                self.id, self.duration_ms
            )));
        }
        Ok(())
    }

    /// Whether `zone` is in the target set.
    pub fn targets(&self, zone: ZoneId) -> bool {
        self.zones.contains(&zone)
    }

    /// Wall-clock end of the message, when the store provided enough timestamps.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.expires_at.or_else(|| {
            let created = self.created_at?;
            let ms = i64::try_from(self.duration_ms).ok()?;
            created.checked_add_signed(chrono::Duration::milliseconds(ms))
        })
    }

    /// Whether the record is still worth showing at `now`; `grace_ms` covers the exit window.
    pub fn is_live_at(&self, now: DateTime<Utc>, grace_ms: u64) -> bool {
        if !self.active {
            return false;
        }
        let Some(deadline) = self.deadline() else {
            return true;
        };
        let grace = chrono::Duration::milliseconds(i64::try_from(grace_ms).unwrap_or(i64::MAX));
        match deadline.checked_add_signed(grace) {
            Some(end) => now < end,
            None => true,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Str(String),
    Num(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZonesRepr {
    One(u8),
    Many(Vec<u8>),
}

/// Message store row. Accepts both the store's column names and the engine's own.
#[derive(Deserialize)]
struct MessageRecord {
    id: IdRepr,
    #[serde(alias = "message")]
    text: String,
    #[serde(alias = "zone")]
    zones: ZonesRepr,
    #[serde(default, alias = "animation_type")]
    animation: Option<AnimationProfile>,
    #[serde(default)]
    duration_ms: Option<u64>,
    /// Seconds, as stored by the message endpoint.
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_active", alias = "is_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<MessageRecord> for OverlayMessage {
    type Error = BannerError;

    fn try_from(r: MessageRecord) -> Result<Self, Self::Error> {
        let id = match r.id {
            IdRepr::Str(s) => s,
            IdRepr::Num(n) => n.to_string(),
        };
        let zones = match r.zones {
            ZonesRepr::One(z) => vec![ZoneId::new(z)?],
            ZonesRepr::Many(v) => v
                .into_iter()
                .map(ZoneId::new)
                .collect::<BannerResult<Vec<_>>>()?,
        };
        let duration_ms = match (r.duration_ms, r.duration) {
            (Some(ms), _) => ms,
            (None, Some(secs)) if secs.is_finite() && secs > 0.0 => (secs * 1000.0).round() as u64,
            (None, Some(secs)) => {
                return Err(BannerError::validation(format!(
                    "message '{id}' has invalid duration {secs}"
                )));
            }
            (None, None) => {
                return Err(BannerError::validation(format!(
                    "message '{id}' has no duration"
                )));
            }
        };

        let msg = Self {
            id,
            text: r.text,
            zones,
            animation: r.animation.unwrap_or_default(),
            duration_ms,
            created_at: r.created_at,
            expires_at: r.expires_at,
            active: r.active,
        };
        msg.validate()?;
        Ok(msg)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/message.rs"]
mod tests;
