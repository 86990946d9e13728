//! Caption options for the native (XAML) 608 caption renderer

use serde::{Deserialize, Serialize};

use super::preferences::{CaptionPreferences, ClosedCaptionSize, ClosedCaptionStyle, Rgb};

/// A color with alpha channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    pub fn from_rgb(rgb: Rgb, a: u8) -> Self {
        Self {
            a,
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
        }
    }

    /// `#AARRGGBB`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// Appearance of rendered 608 captions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionOptions {
    pub font_family: String,
    pub font_color: Argb,
    pub background_color: Argb,
    /// Caption window color; `None` leaves the window transparent
    pub window_color: Option<Argb>,
    /// Caption width in pixels
    pub caption_width: f64,
    /// Video width in pixels
    pub video_width: f64,
    /// Font size in percent (50, 100, 150, 200)
    pub font_size: u32,
    pub is_small_caps: bool,
}

impl Default for CaptionOptions {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_color: Argb::from_rgb(Rgb::WHITE, 255),
            background_color: Argb::from_rgb(Rgb::BLACK, 255),
            window_color: None,
            caption_width: 0.0,
            video_width: 0.0,
            font_size: 100,
            is_small_caps: false,
        }
    }
}

impl CaptionOptions {
    pub fn from_preferences(prefs: &CaptionPreferences) -> Self {
        let mut options = Self::default();
        options.apply_preferences(prefs);
        options
    }

    /// Overlay user preferences; `Default` settings keep the current values
    pub fn apply_preferences(&mut self, prefs: &CaptionPreferences) {
        let font_rgb = prefs.font_color.rgb().unwrap_or(Rgb::new(
            self.font_color.r,
            self.font_color.g,
            self.font_color.b,
        ));
        self.font_color = Argb::from_rgb(font_rgb, prefs.font_opacity.alpha());

        let background_rgb = prefs.background_color.rgb().unwrap_or(Rgb::new(
            self.background_color.r,
            self.background_color.g,
            self.background_color.b,
        ));
        self.background_color = Argb::from_rgb(background_rgb, prefs.background_opacity.alpha());

        if let Some(family) = xaml_font_family(prefs.font_style) {
            self.font_family = family.to_string();
        }
        if prefs.font_style == ClosedCaptionStyle::SmallCapitals {
            self.is_small_caps = true;
        }

        match prefs.font_size {
            ClosedCaptionSize::FiftyPercent => self.font_size = 50,
            ClosedCaptionSize::OneHundredFiftyPercent => self.font_size = 150,
            ClosedCaptionSize::TwoHundredPercent => self.font_size = 200,
            ClosedCaptionSize::Default | ClosedCaptionSize::OneHundredPercent => {}
        }
    }
}

fn xaml_font_family(style: ClosedCaptionStyle) -> Option<&'static str> {
    match style {
        ClosedCaptionStyle::Default => None,
        ClosedCaptionStyle::Casual => Some("Segoe Print"),
        ClosedCaptionStyle::Cursive => Some("Segoe Script"),
        ClosedCaptionStyle::MonospacedWithoutSerifs => Some("Lucida Sans Unicode"),
        ClosedCaptionStyle::MonospacedWithSerifs => Some("Courier New"),
        ClosedCaptionStyle::ProportionalWithoutSerifs => Some("Arial"),
        ClosedCaptionStyle::ProportionalWithSerifs => Some("Times New Roman"),
        ClosedCaptionStyle::SmallCapitals => Some("Arial"),
    }
}
