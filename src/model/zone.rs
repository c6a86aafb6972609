use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::{ZONE_COUNT, ZoneId};
use crate::foundation::error::{BannerError, BannerResult};
use crate::foundation::math::Fnv1a64;

/// How a background image or video is mapped onto its zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitMode {
    /// Scale to fit inside, keeping the ratio; centered.
    #[default]
    Contain,
    /// Scale to cover, keeping the ratio; centered and cropped.
    Cover,
    /// Stretch to the zone rectangle.
    Fill,
    /// Alias of [`FitMode::Fill`].
    Stretch,
    /// Intrinsic size at the top-left corner.
    NoResizing,
}

impl FitMode {
    /// Unknown or empty values fall back to [`FitMode::Contain`].
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "cover" => Self::Cover,
            "fill" => Self::Fill,
            "stretch" => Self::Stretch,
            "no-resizing" | "none" => Self::NoResizing,
            _ => Self::Contain,
        }
    }

    /// Persisted name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contain => "contain",
            Self::Cover => "cover",
            Self::Fill => "fill",
            Self::Stretch => "stretch",
            Self::NoResizing => "no-resizing",
        }
    }
}

/// Media type of a zone background.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BackgroundKind {
    /// Solid black.
    #[default]
    None,
    /// Still image or SVG.
    Image,
    /// Muted looping video.
    Video,
}

impl BackgroundKind {
    fn parse_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Self::Image,
            "video" => Self::Video,
            _ => Self::None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

/// Zone background.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackgroundSpec {
    /// Media type.
    pub kind: BackgroundKind,
    /// Media URL; ignored for [`BackgroundKind::None`].
    pub url: Option<String>,
    /// How the media maps onto the zone.
    pub mode: FitMode,
}

impl BackgroundSpec {
    /// The media URL to load, if this background needs one.
    pub fn media_url(&self) -> Option<&str> {
        match self.kind {
            BackgroundKind::None => None,
            BackgroundKind::Image | BackgroundKind::Video => {
                self.url.as_deref().filter(|u| !u.trim().is_empty())
            }
        }
    }
}

/// Content source of a carousel zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CarouselFeed {
    /// Weather, matches, birthdays and reminders.
    #[serde(alias = "carousel-informational", alias = "infographics")]
    Informational,
    /// Player stats of the first game.
    #[serde(rename = "stat-game-A", alias = "carousel-stat-game-A", alias = "cs2-data")]
    StatGameA,
    /// Player stats of the second game.
    #[serde(rename = "stat-game-B", alias = "carousel-stat-game-B")]
    StatGameB,
}

impl CarouselFeed {
    /// Every feed.
    pub const ALL: [CarouselFeed; 3] = [Self::Informational, Self::StatGameA, Self::StatGameB];

    fn display_mode(self) -> &'static str {
        match self {
            Self::Informational => "carousel-informational",
            Self::StatGameA => "carousel-stat-game-A",
            Self::StatGameB => "carousel-stat-game-B",
        }
    }
}

/// One scrolling line of text with its own style and speed.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    /// Text; may be empty.
    pub text: String,
    /// Text color.
    pub color: Color,
    /// Speed multiplier of this line.
    pub speed: f64,
    /// Font identifier; the default font when unset or missing.
    pub font: Option<String>,
}

/// Line arrangement of a text zone.
#[derive(Clone, Debug, PartialEq)]
pub enum TextLayout {
    /// One line filling the zone.
    Single(TextLine),
    /// Two independent half-height lines split by a divider.
    Double {
        /// Upper half.
        top: TextLine,
        /// Lower half.
        bottom: TextLine,
    },
}

/// What a zone scrolls.
#[derive(Clone, Debug, PartialEq)]
pub enum ZoneContent {
    /// A text marquee.
    Text(TextLayout),
    /// A carousel strip fed by one feed.
    Carousel(CarouselFeed),
}

/// One horizontal strip of the banner, as an immutable snapshot.
///
/// Serialized in the persisted profile shape (camelCase keys, flat fields).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ZoneRecord", into = "ZoneRecord")]
pub struct Zone {
    /// Zone id; fixes the rectangle.
    pub id: ZoneId,
    /// Scroll speed multiplier for the primary line and for carousels.
    pub speed: f64,
    /// Text or carousel.
    pub content: ZoneContent,
    /// Media behind the content.
    pub background: BackgroundSpec,
    /// Applied at draw time only; stored text keeps its case.
    pub force_uppercase: bool,
}

impl Zone {
    /// A black zone showing a single empty line.
    pub fn blank(id: ZoneId) -> Self {
        Self {
            id,
            speed: 1.0,
            content: ZoneContent::Text(TextLayout::Single(TextLine {
                text: String::new(),
                color: Color::WHITE,
                speed: 1.0,
                font: None,
            })),
            background: BackgroundSpec::default(),
            force_uppercase: false,
        }
    }

    /// Single-line text zone.
    pub fn text(id: ZoneId, text: impl Into<String>, color: Color, speed: f64) -> Self {
        Self {
            id,
            speed,
            content: ZoneContent::Text(TextLayout::Single(TextLine {
                text: text.into(),
                color,
                speed,
                font: None,
            })),
            background: BackgroundSpec::default(),
            force_uppercase: false,
        }
    }

    /// Carousel zone showing `feed`.
    pub fn carousel(id: ZoneId, feed: CarouselFeed, speed: f64) -> Self {
        Self {
            id,
            speed,
            content: ZoneContent::Carousel(feed),
            background: BackgroundSpec::default(),
            force_uppercase: false,
        }
    }

    /// Set the background media.
    pub fn with_background(mut self, kind: BackgroundKind, url: &str, mode: FitMode) -> Self {
        self.background = BackgroundSpec {
            kind,
            url: Some(url.to_owned()),
            mode,
        };
        self
    }

    /// Hash of everything that invalidates scroll offsets and measured widths.
    pub fn content_signature(&self) -> u64 {
        fn write_str(h: &mut Fnv1a64, s: &str) {
            h.write_u64(s.len() as u64);
            h.write_bytes(s.as_bytes());
        }
        fn write_line(h: &mut Fnv1a64, line: &TextLine) {
            write_str(h, &line.text);
            write_str(h, line.font.as_deref().unwrap_or(""));
        }

        let mut h = Fnv1a64::new_default();
        h.write_u8(u8::from(self.force_uppercase));
        match &self.content {
            ZoneContent::Text(TextLayout::Single(line)) => {
                h.write_u8(0);
                write_line(&mut h, line);
            }
            ZoneContent::Text(TextLayout::Double { top, bottom }) => {
                h.write_u8(1);
                write_line(&mut h, top);
                write_line(&mut h, bottom);
            }
            ZoneContent::Carousel(feed) => {
                h.write_u8(2);
                write_str(&mut h, feed.display_mode());
            }
        }
        h.finish()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubZoneRecord {
    #[serde(default)]
    text: String,
    #[serde(default = "white")]
    color: Color,
    #[serde(default = "unit_speed")]
    speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font: Option<String>,
}

/// Persisted zone shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneRecord {
    id: u8,
    #[serde(default)]
    text: String,
    #[serde(default = "white")]
    color: Color,
    #[serde(default = "unit_speed")]
    speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_zone: Option<SubZoneRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    background_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_mode: Option<String>,
    #[serde(default)]
    force_uppercase: bool,
}

fn white() -> Color {
    Color::WHITE
}

fn unit_speed() -> f64 {
    1.0
}

fn check_speed(what: &str, speed: f64) -> BannerResult<f64> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(BannerError::validation(format!(
            "{what} speed must be finite and >= 0, got {speed}"
        )))
    }
}

fn parse_display_mode(raw: Option<&str>) -> BannerResult<Option<CarouselFeed>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if raw == "text" {
        return Ok(None);
    }
    serde_json::from_value(serde_json::Value::String(raw.to_owned()))
        .map(Some)
        .map_err(|_| BannerError::validation(format!("unknown displayMode '{raw}'")))
}

impl TryFrom<ZoneRecord> for Zone {
    type Error = BannerError;

    fn try_from(r: ZoneRecord) -> Result<Self, Self::Error> {
        let id = ZoneId::new(r.id)?;
        let speed = check_speed(&id.to_string(), r.speed)?;

        let content = match parse_display_mode(r.display_mode.as_deref())? {
            Some(feed) => ZoneContent::Carousel(feed),
            None => {
                let top = TextLine {
                    text: r.text,
                    color: r.color,
                    speed,
                    font: r.font.filter(|f| !f.trim().is_empty()),
                };
                let double = r.line_mode.as_deref().map(str::trim) == Some("double");
                match (double, r.sub_zone) {
                    (true, Some(sub)) => ZoneContent::Text(TextLayout::Double {
                        top,
                        bottom: TextLine {
                            text: sub.text,
                            color: sub.color,
                            speed: check_speed(&format!("{id} sub-zone"), sub.speed)?,
                            font: sub.font.filter(|f| !f.trim().is_empty()),
                        },
                    }),
                    (true, None) => {
                        tracing::warn!(%id, "double line mode without a sub-zone, showing a single line");
                        ZoneContent::Text(TextLayout::Single(top))
                    }
                    (false, _) => ZoneContent::Text(TextLayout::Single(top)),
                }
            }
        };

        Ok(Self {
            id,
            speed,
            content,
            background: BackgroundSpec {
                kind: r
                    .background_type
                    .as_deref()
                    .map(BackgroundKind::parse_lossy)
                    .unwrap_or_default(),
                url: r.background_url,
                mode: r
                    .background_mode
                    .as_deref()
                    .map(FitMode::parse_lossy)
                    .unwrap_or_default(),
            },
            force_uppercase: r.force_uppercase,
        })
    }
}

impl From<Zone> for ZoneRecord {
    fn from(z: Zone) -> Self {
        let mut rec = ZoneRecord {
            id: z.id.get(),
            text: String::new(),
            color: Color::WHITE,
            speed: z.speed,
            line_mode: None,
            sub_zone: None,
            background_type: Some(z.background.kind.as_str().to_owned()),
            background_url: z.background.url,
            background_mode: Some(z.background.mode.as_str().to_owned()),
            font: None,
            display_mode: Some("text".to_owned()),
            force_uppercase: z.force_uppercase,
        };
        match z.content {
            ZoneContent::Text(TextLayout::Single(line)) => {
                rec.text = line.text;
                rec.color = line.color;
                rec.font = line.font;
                rec.line_mode = Some("single".to_owned());
            }
            ZoneContent::Text(TextLayout::Double { top, bottom }) => {
                rec.text = top.text;
                rec.color = top.color;
                rec.font = top.font;
                rec.line_mode = Some("double".to_owned());
                rec.sub_zone = Some(SubZoneRecord {
                    text: bottom.text,
                    color: bottom.color,
                    speed: bottom.speed,
                    font: bottom.font,
                });
            }
            ZoneContent::Carousel(feed) => {
                rec.display_mode = Some(feed.display_mode().to_owned());
            }
        }
        rec
    }
}

/// Exactly four zones, ordered by id.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    /// Validate and order a list of zones. Each id `1..=4` must appear exactly once.
    pub fn new(mut zones: Vec<Zone>) -> BannerResult<Self> {
        if zones.len() != ZONE_COUNT {
            return Err(BannerError::validation(format!(
                "a profile needs exactly {ZONE_COUNT} zones, got {}",
                zones.len()
            )));
        }
        zones.sort_by_key(|z| z.id);
        for (zone, expected) in zones.iter().zip(ZoneId::ALL) {
            if zone.id != expected {
                return Err(BannerError::validation(format!(
                    "zone ids must be 1..={ZONE_COUNT} without duplicates, missing {expected}"
                )));
            }
        }
        let set = Self { zones };
        set.validate()?;
        Ok(set)
    }

    /// Four blank zones.
    pub fn blank() -> Self {
        Self {
            zones: ZoneId::ALL.into_iter().map(Zone::blank).collect(),
        }
    }

    /// Parse either a bare array of zones or a persisted profile `{ "zones_data": [...] }`.
    pub fn from_json_str(s: &str) -> BannerResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Check speeds of every zone and sub-line.
    pub fn validate(&self) -> BannerResult<()> {
        for z in &self.zones {
            check_speed(&z.id.to_string(), z.speed)?;
            if let ZoneContent::Text(TextLayout::Double { bottom, .. }) = &z.content {
                check_speed(&format!("{} sub-zone", z.id), bottom.speed)?;
            }
        }
        Ok(())
    }

    /// Zone with `id`.
    pub fn get(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    /// Zones in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Replace one zone, keeping the others.
    pub fn with_zone(mut self, zone: Zone) -> Self {
        let i = zone.id.index();
        self.zones[i] = zone;
        self
    }
}

impl<'de> Deserialize<'de> for ZoneSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;
        use serde_json::Value;

        // Dispatch on the outer shape first so zone errors reach the caller intact.
        let zones = match Value::deserialize(deserializer)? {
            bare @ Value::Array(_) => bare,
            Value::Object(mut profile) => profile
                .remove("zones_data")
                .ok_or_else(|| D::Error::custom("zone profile has no `zones_data` field"))?,
            other => {
                return Err(D::Error::custom(format!(
                    "expected an array of zones or a zone profile, got {other}"
                )));
            }
        };
        let zones = Vec::<Zone>::deserialize(zones).map_err(D::Error::custom)?;
        Self::new(zones).map_err(D::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/zone.rs"]
mod tests;
