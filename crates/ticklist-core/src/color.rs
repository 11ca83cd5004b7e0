//! Tag color rules.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::defaults::TAG_PALETTE;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex color pattern is valid")
});

/// Whether `color` is a strict `#RRGGBB` hex color (either case).
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Deterministic palette color for a tag name.
///
/// The first eight bytes of the SHA-256 digest pick the palette slot, so the
/// same name maps to the same color across processes and releases.
pub fn fallback_color(name: &str) -> &'static str {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let index = (u64::from_be_bytes(prefix) % TAG_PALETTE.len() as u64) as usize;
    TAG_PALETTE[index]
}

/// Pick the color for a new tag: the explicit one when given, else the fallback.
pub fn color_for(name: &str, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .unwrap_or_else(|| fallback_color(name).to_string())
}
