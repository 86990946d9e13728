//! User closed-caption preferences
//!
//! Mirrors the choices an OS caption settings page offers. Every setting
//! has a `Default` value meaning "leave the caption's own styling alone".

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionColor {
    #[default]
    Default,
    White,
    Black,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl ClosedCaptionColor {
    /// The concrete color, `None` for `Default`
    pub fn rgb(self) -> Option<Rgb> {
        let rgb = match self {
            ClosedCaptionColor::Default => return None,
            ClosedCaptionColor::White => Rgb::WHITE,
            ClosedCaptionColor::Black => Rgb::BLACK,
            ClosedCaptionColor::Red => Rgb::new(255, 0, 0),
            ClosedCaptionColor::Green => Rgb::new(0, 255, 0),
            ClosedCaptionColor::Blue => Rgb::new(0, 0, 255),
            ClosedCaptionColor::Yellow => Rgb::new(255, 255, 0),
            ClosedCaptionColor::Magenta => Rgb::new(255, 0, 255),
            ClosedCaptionColor::Cyan => Rgb::new(0, 255, 255),
        };
        Some(rgb)
    }

    pub fn is_default(self) -> bool {
        self == ClosedCaptionColor::Default
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionOpacity {
    #[default]
    Default,
    OneHundredPercent,
    SeventyFivePercent,
    TwentyFivePercent,
    ZeroPercent,
}

impl ClosedCaptionOpacity {
    /// Opacity as a 0..=1 factor; `Default` is fully opaque
    pub fn factor(self) -> f64 {
        match self {
            ClosedCaptionOpacity::Default | ClosedCaptionOpacity::OneHundredPercent => 1.0,
            ClosedCaptionOpacity::SeventyFivePercent => 0.75,
            ClosedCaptionOpacity::TwentyFivePercent => 0.25,
            ClosedCaptionOpacity::ZeroPercent => 0.0,
        }
    }

    /// Opacity as an 8-bit alpha channel
    pub fn alpha(self) -> u8 {
        match self {
            ClosedCaptionOpacity::Default | ClosedCaptionOpacity::OneHundredPercent => 255,
            ClosedCaptionOpacity::SeventyFivePercent => 192,
            ClosedCaptionOpacity::TwentyFivePercent => 64,
            ClosedCaptionOpacity::ZeroPercent => 0,
        }
    }

    pub fn is_default(self) -> bool {
        self == ClosedCaptionOpacity::Default
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionSize {
    #[default]
    Default,
    FiftyPercent,
    OneHundredPercent,
    OneHundredFiftyPercent,
    TwoHundredPercent,
}

impl ClosedCaptionSize {
    /// Scale factor applied to the caption font size
    pub fn factor(self) -> f64 {
        match self {
            ClosedCaptionSize::Default | ClosedCaptionSize::OneHundredPercent => 1.0,
            ClosedCaptionSize::FiftyPercent => 0.5,
            ClosedCaptionSize::OneHundredFiftyPercent => 1.5,
            ClosedCaptionSize::TwoHundredPercent => 2.0,
        }
    }

    pub fn is_default(self) -> bool {
        self == ClosedCaptionSize::Default
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionStyle {
    #[default]
    Default,
    MonospacedWithSerifs,
    ProportionalWithSerifs,
    MonospacedWithoutSerifs,
    ProportionalWithoutSerifs,
    Casual,
    Cursive,
    SmallCapitals,
}

impl ClosedCaptionStyle {
    pub fn is_default(self) -> bool {
        self == ClosedCaptionStyle::Default
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosedCaptionEdgeEffect {
    #[default]
    Default,
    None,
    Raised,
    Depressed,
    Uniform,
    DropShadow,
}

impl ClosedCaptionEdgeEffect {
    pub fn is_default(self) -> bool {
        self == ClosedCaptionEdgeEffect::Default
    }
}

/// The full set of caption appearance preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionPreferences {
    pub font_color: ClosedCaptionColor,
    pub font_opacity: ClosedCaptionOpacity,
    pub font_size: ClosedCaptionSize,
    pub font_style: ClosedCaptionStyle,
    pub font_effect: ClosedCaptionEdgeEffect,
    pub background_color: ClosedCaptionColor,
    pub background_opacity: ClosedCaptionOpacity,
    pub region_color: ClosedCaptionColor,
    pub region_opacity: ClosedCaptionOpacity,
}

impl CaptionPreferences {
    /// Font color with the platform default (white) filled in
    pub fn computed_font_color(&self) -> Rgb {
        self.font_color.rgb().unwrap_or(Rgb::WHITE)
    }

    /// Background color with the platform default (black) filled in
    pub fn computed_background_color(&self) -> Rgb {
        self.background_color.rgb().unwrap_or(Rgb::BLACK)
    }

    /// Region color with the platform default (black) filled in
    pub fn computed_region_color(&self) -> Rgb {
        self.region_color.rgb().unwrap_or(Rgb::BLACK)
    }
}
