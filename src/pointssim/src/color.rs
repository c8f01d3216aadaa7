//! RGB to luminance conversion.
//!
//! Color similarity is computed on the luma channel only. Weights follow
//! ITU-R BT.709 for 8-bit channels.

const KR: f64 = 0.2126;
const KG: f64 = 0.7152;
const KB: f64 = 0.0722;

/// Convert an 8-bit RGB triple to its BT.709 luminance.
///
/// The result is rounded to the nearest integer and saturated to [0, 255].
pub fn rgb_to_luminance(rgb: [u8; 3]) -> u8 {
    let y = KR * rgb[0] as f64 + KG * rgb[1] as f64 + KB * rgb[2] as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Luminance of every color in a cloud, as reals for feature extraction.
pub fn luminance_channel(colors: &[[u8; 3]]) -> Vec<f64> {
    colors.iter().map(|&c| rgb_to_luminance(c) as f64).collect()
}
