use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::BannerError;

/// Stacked two-line text of an element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoLine {
    /// Upper line.
    pub top: String,
    /// Lower line.
    pub bottom: String,
}

/// Visual placed before an element's text. An element has at most one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Leading {
    /// Image scaled to the leading height.
    Image {
        /// Image URL or path.
        url: String,
    },
    /// Emoji or symbol drawn as text.
    Glyph(String),
}

/// One item of a carousel strip, as produced by the content adapters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ElementRecord", into = "ElementRecord")]
pub struct CarouselElement {
    /// Producer id, unique within a feed.
    pub id: String,
    /// Single-line text. Mirrors the top line for two-line elements.
    pub text: String,
    /// Two-line text, drawn instead of `text` when set.
    pub two_line: Option<TwoLine>,
    /// Text color; the carousel default when unset.
    pub color: Option<Color>,
    /// Image or glyph before the text.
    pub leading: Option<Leading>,
    /// Display time suggested by the producer. Scrolling ignores it.
    pub duration_ms: Option<u64>,
}

impl CarouselElement {
    /// Plain text element.
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            two_line: None,
            color: None,
            leading: None,
            duration_ms: None,
        }
    }

    /// Two-line element.
    pub fn two_line(id: impl Into<String>, top: impl Into<String>, bottom: impl Into<String>) -> Self {
        let top = top.into();
        Self {
            id: id.into(),
            text: top.clone(),
            two_line: Some(TwoLine {
                top,
                bottom: bottom.into(),
            }),
            color: None,
            leading: None,
            duration_ms: None,
        }
    }

    /// Set the text color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Lead with the image at `url`, replacing any glyph.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.leading = Some(Leading::Image { url: url.into() });
        self
    }

    /// Lead with `glyph`, replacing any image.
    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.leading = Some(Leading::Glyph(glyph.into()));
        self
    }

    /// Set the suggested display time.
    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    /// URL of the leading image, if any.
    pub fn image_url(&self) -> Option<&str> {
        match &self.leading {
            Some(Leading::Image { url }) => Some(url),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    #[serde(default)]
    id: String,
    #[serde(default, alias = "content")]
    text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    two_line: Option<TwoLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "icon")]
    glyph: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "duration")]
    duration_ms: Option<u64>,
}

impl TryFrom<ElementRecord> for CarouselElement {
    type Error = BannerError;

    fn try_from(r: ElementRecord) -> Result<Self, Self::Error> {
        let image = r.image_url.filter(|u| !u.trim().is_empty());
        let glyph = r.glyph.filter(|g| !g.is_empty());
        let leading = match (image, glyph) {
            (Some(_), Some(_)) => {
                return Err(BannerError::validation(format!(
                    "carousel element '{}' has both a leading image and a glyph",
                    r.id
                )));
            }
            (Some(url), None) => Some(Leading::Image { url }),
            (None, Some(g)) => Some(Leading::Glyph(g)),
            (None, None) => None,
        };
        let text = if r.text.is_empty() {
            r.two_line.as_ref().map(|t| t.top.clone()).unwrap_or_default()
        } else {
            r.text
        };
        Ok(Self {
            id: r.id,
            text,
            two_line: r.two_line,
            color: r.color,
            leading,
            duration_ms: r.duration_ms,
        })
    }
}

impl From<CarouselElement> for ElementRecord {
    fn from(e: CarouselElement) -> Self {
        let (image_url, glyph) = match e.leading {
            Some(Leading::Image { url }) => (Some(url), None),
            Some(Leading::Glyph(g)) => (None, Some(g)),
            None => (None, None),
        };
        Self {
            id: e.id,
            text: e.text,
            two_line: e.two_line,
            color: e.color,
            image_url,
            glyph,
            duration_ms: e.duration_ms,
        }
    }
}
