//! Caption appearance
//!
//! Maps user caption preferences onto the two renderers the player uses:
//! CSS overrides for HTML captions and `CaptionOptions` for the native 608
//! renderer.

pub mod css;
pub mod options;
pub mod preferences;

pub use css::{ComputedStyle, CueStyle, Rgba};
pub use options::{Argb, CaptionOptions};
pub use preferences::CaptionPreferences;
