use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::fonts::FontLibrary;
use crate::placement::BoundingBox;

mod codes;
mod marks;
mod repeat;
mod text;

pub use text::with_count as text_with_count;

/// The closed set of watermark styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkKind {
    Text,
    Diagonal,
    Corner,
    Logo,
    Grid,
    Stamp,
    Circular,
    Wave,
    Mosaic,
    Radial,
    Barcode,
    Qr,
    Fingerprint,
}

impl WatermarkKind {
    pub const ALL: [WatermarkKind; 13] = [
        WatermarkKind::Text,
        WatermarkKind::Diagonal,
        WatermarkKind::Corner,
        WatermarkKind::Logo,
        WatermarkKind::Grid,
        WatermarkKind::Stamp,
        WatermarkKind::Circular,
        WatermarkKind::Wave,
        WatermarkKind::Mosaic,
        WatermarkKind::Radial,
        WatermarkKind::Barcode,
        WatermarkKind::Qr,
        WatermarkKind::Fingerprint,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WatermarkKind::Text => "text",
            WatermarkKind::Diagonal => "diagonal",
            WatermarkKind::Corner => "corner",
            WatermarkKind::Logo => "logo",
            WatermarkKind::Grid => "grid",
            WatermarkKind::Stamp => "stamp",
            WatermarkKind::Circular => "circular",
            WatermarkKind::Wave => "wave",
            WatermarkKind::Mosaic => "mosaic",
            WatermarkKind::Radial => "radial",
            WatermarkKind::Barcode => "barcode",
            WatermarkKind::Qr => "qr",
            WatermarkKind::Fingerprint => "fingerprint",
        }
    }
}

impl fmt::Display for WatermarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatermarkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WatermarkKind::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown watermark style '{s}'"))
    }
}

/// A caller's style request: one named style, or a fresh draw per image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleChoice {
    Random,
    Fixed(WatermarkKind),
}

impl FromStr for StyleChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("random") {
            Ok(StyleChoice::Random)
        } else {
            s.parse().map(StyleChoice::Fixed)
        }
    }
}

impl fmt::Display for StyleChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleChoice::Random => f.write_str("random"),
            StyleChoice::Fixed(kind) => kind.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerPos {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CornerPos {
    pub const ALL: [CornerPos; 4] = [
        CornerPos::TopLeft,
        CornerPos::TopRight,
        CornerPos::BottomLeft,
        CornerPos::BottomRight,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerChoice {
    Random,
    At(CornerPos),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeShape {
    Rectangle,
    Ellipse,
    RoundedRectangle,
}

/// Ground truth for one placed text instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub base_text: String,
    pub number: u32,
    pub final_text: String,
    pub color: [u8; 3],
    pub opacity: u8,
    pub rotation: i32,
    pub coordinates: (u32, u32),
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
}

/// Style-specific parameters, self-describing enough to regenerate a
/// visually similar watermark. Serialized into the metadata sidecar under a
/// `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatermarkParams {
    Text {
        count: usize,
        watermarks: Vec<PlacementRecord>,
    },
    DiagonalPattern {
        text: String,
        repeat_count: u32,
        final_text: String,
        opacity: u8,
        angle: f32,
    },
    Corner {
        text: String,
        corner: CornerPos,
        opacity: u8,
    },
    LogoStyle {
        text: String,
        shape: BadgeShape,
        opacity: u8,
    },
    CircularText {
        text: String,
        repeat_count: u32,
        final_text: String,
        radius: u32,
        opacity: u8,
    },
    WavePattern {
        text: String,
        repeat_count: u32,
        final_text: String,
        amplitude: u32,
        opacity: u8,
    },
    Barcode {
        text: String,
        opacity: u8,
    },
    QrStyle {
        size: u32,
        opacity: u8,
    },
    Mosaic {
        text: String,
        tile_size: u32,
    },
    Fingerprint {
        size: u32,
        opacity: u8,
    },
    Radial {
        text: String,
        repeat_count: u32,
        final_text: String,
        num_rays: u32,
        opacity: u8,
    },
    Grid {
        symbol: String,
        grid_size: u32,
        opacity: u8,
    },
    Stamp {
        text: String,
        date: String,
        angle: i32,
        opacity: u8,
        position: (u32, u32),
    },
}

impl WatermarkParams {
    pub fn kind(&self) -> WatermarkKind {
        match self {
            WatermarkParams::Text { .. } => WatermarkKind::Text,
            WatermarkParams::DiagonalPattern { .. } => WatermarkKind::Diagonal,
            WatermarkParams::Corner { .. } => WatermarkKind::Corner,
            WatermarkParams::LogoStyle { .. } => WatermarkKind::Logo,
            WatermarkParams::CircularText { .. } => WatermarkKind::Circular,
            WatermarkParams::WavePattern { .. } => WatermarkKind::Wave,
            WatermarkParams::Barcode { .. } => WatermarkKind::Barcode,
            WatermarkParams::QrStyle { .. } => WatermarkKind::Qr,
            WatermarkParams::Mosaic { .. } => WatermarkKind::Mosaic,
            WatermarkParams::Fingerprint { .. } => WatermarkKind::Fingerprint,
            WatermarkParams::Radial { .. } => WatermarkKind::Radial,
            WatermarkParams::Grid { .. } => WatermarkKind::Grid,
            WatermarkParams::Stamp { .. } => WatermarkKind::Stamp,
        }
    }
}

/// What a generator needs to know about the target image.
#[derive(Debug, Clone, Copy)]
pub struct GenRequest<'a> {
    pub width: u32,
    pub height: u32,
    pub seed_text: Option<&'a str>,
    pub corner: CornerChoice,
}

impl GenRequest<'_> {
    pub(crate) fn min_side(&self) -> u32 {
        self.width.min(self.height)
    }

    pub(crate) fn pick_text(&self, rng: &mut StdRng) -> String {
        match self.seed_text {
            Some(t) => t.to_owned(),
            None => crate::vocab::watermark_text(rng).to_owned(),
        }
    }
}

/// Dispatch a style tag to its generation routine. Every returned overlay
/// matches the requested image dimensions exactly.
pub fn generate(
    kind: WatermarkKind,
    req: &GenRequest<'_>,
    fonts: &FontLibrary,
    rng: &mut StdRng,
) -> (RgbaImage, WatermarkParams) {
    match kind {
        WatermarkKind::Text => text::generate(req, fonts, rng),
        WatermarkKind::Diagonal => repeat::diagonal(req, fonts, rng),
        WatermarkKind::Corner => marks::corner(req, fonts, rng),
        WatermarkKind::Logo => marks::logo(req, fonts, rng),
        WatermarkKind::Grid => repeat::grid(req, fonts, rng),
        WatermarkKind::Stamp => marks::stamp(req, fonts, rng),
        WatermarkKind::Circular => repeat::circular(req, fonts, rng),
        WatermarkKind::Wave => repeat::wave(req, fonts, rng),
        WatermarkKind::Mosaic => repeat::mosaic(req, fonts, rng),
        WatermarkKind::Radial => repeat::radial(req, fonts, rng),
        WatermarkKind::Barcode => codes::barcode(req, fonts, rng),
        WatermarkKind::Qr => codes::qr(req, fonts, rng),
        WatermarkKind::Fingerprint => marks::fingerprint(req, fonts, rng),
    }
}
