//! Named colors and the per-polygon working color state.
//!
//! A [`ColorEntry`] carries three copies of its color: the original from the mesh,
//! `rgba` after texturing and `rgba_shaded` after lighting. The working copies are
//! reset from the original at the start of each frame.

/// Red, green, blue, alpha in `0..=255`.
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];

/// The default color table, in index order.
pub const DEFAULT_COLORS: [(&str, Rgba); 11] = [
    ("red", [255, 0, 0, 255]),
    ("green", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("black", BLACK),
    ("grey", [128, 128, 128, 255]),
    ("gold", [83, 75, 44, 255]),
    ("bluegrey", [64, 64, 128, 255]),
    ("white", WHITE),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ColorEntry {
    pub name: String,
    pub rgba_original: Rgba,
    /// Working color after texturing.
    pub rgba: Rgba,
    /// Working color after lighting; this is what reaches the framebuffer.
    pub rgba_shaded: Rgba,
}

impl ColorEntry {
    pub fn new(name: impl Into<String>, rgba: Rgba) -> Self {
        Self {
            name: name.into(),
            rgba_original: rgba,
            rgba,
            rgba_shaded: rgba,
        }
    }

    /// Restore both working colors from the original.
    pub fn reset(&mut self) {
        self.rgba = self.rgba_original;
        self.rgba_shaded = self.rgba_original;
    }
}

/// Build a fresh copy of the default color table.
pub fn default_color_table() -> Vec<ColorEntry> {
    DEFAULT_COLORS
        .iter()
        .map(|(name, rgba)| ColorEntry::new(*name, *rgba))
        .collect()
}

/// Look up a color index by name, logging when the name is unknown.
pub fn find_color_index(table: &[ColorEntry], name: &str) -> Option<usize> {
    let index = table.iter().position(|entry| entry.name == name);
    if index.is_none() {
        log::warn!("color '{name}' not found in color table");
    }
    index
}

/// Scale the RGB channels of `rgba` by `factor` and add `offset`, clamping to the
/// channel range. Alpha is kept.
#[inline]
pub fn scale_and_offset(rgba: Rgba, factor: f32, offset: f32) -> Rgba {
    let channel = |c: u8| (c as f32 * factor + offset).clamp(0.0, 255.0) as u8;
    [channel(rgba[0]), channel(rgba[1]), channel(rgba[2]), rgba[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_order() {
        let table = default_color_table();
        assert_eq!(table.len(), 11);
        assert_eq!(table[0].name, "red");
        assert_eq!(table[7].rgba_original, [128, 128, 128, 255]);
        assert_eq!(table[10].name, "white");
    }

    #[test]
    fn reset_restores_working_colors() {
        let mut entry = ColorEntry::new("gold", [83, 75, 44, 255]);
        entry.rgba = [1, 2, 3, 4];
        entry.rgba_shaded = [5, 6, 7, 8];
        entry.reset();
        assert_eq!(entry.rgba, entry.rgba_original);
        assert_eq!(entry.rgba_shaded, entry.rgba_original);
    }

    #[test]
    fn find_color_by_name() {
        let table = default_color_table();
        assert_eq!(find_color_index(&table, "bluegrey"), Some(9));
        assert_eq!(find_color_index(&table, "mauve"), None);
    }

    #[test]
    fn scale_and_offset_clamps() {
        assert_eq!(
            scale_and_offset([200, 100, 0, 255], 1.5, 10.0),
            [255, 160, 10, 255]
        );
        assert_eq!(scale_and_offset([200, 100, 0, 255], 0.0, 0.0), [0, 0, 0, 255]);
    }
}
