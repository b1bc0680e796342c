use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Average advance of a glyph-less character, as a fraction of the font size.
const FALLBACK_ADVANCE: f32 = 0.56;

static MEASURER: Lazy<Mutex<FontMeasurer>> = Lazy::new(|| Mutex::new(FontMeasurer::new()));

/// Width of `text` in the first available face of `font_family` (a CSS-style
/// family list). Returns `None` when no face can be loaded.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family)
}

pub fn fallback_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * FALLBACK_ADVANCE
}

struct FontMeasurer {
    db: Database,
    system_fonts_loaded: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    advances: HashMap<char, Option<u16>>,
}

impl FontMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_fonts_loaded: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let loaded = self.load(font_family);
            if loaded.is_none() {
                tracing::debug!(font_family, "no font face found, using fallback metrics");
            }
            self.faces.insert(key.clone(), loaded);
        }
        let face = self.faces.get_mut(&key)?.as_mut()?;
        face.width(text, font_size)
    }

    fn load(&mut self, font_family: &str) -> Option<LoadedFace> {
        if !self.system_fonts_loaded {
            self.db.load_system_fonts();
            self.system_fonts_loaded = true;
        }
        let id = query_family_list(&self.db, font_family)?;
        let mut loaded = None;
        self.db.with_face_data(id, |data, index| {
            if Face::parse(data, index).is_ok() {
                loaded = Some(LoadedFace {
                    data: data.to_vec(),
                    index,
                    advances: HashMap::new(),
                });
            }
        });
        loaded
    }
}

fn query_family_list(db: &Database, font_family: &str) -> Option<ID> {
    let names: Vec<&str> = font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .filter(|part| !part.is_empty())
        .collect();
    let mut families: Vec<Family<'_>> = names
        .iter()
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => Family::Serif,
            "sans-serif" | "system-ui" => Family::SansSerif,
            "monospace" => Family::Monospace,
            "cursive" => Family::Cursive,
            "fantasy" => Family::Fantasy,
            _ => Family::Name(name),
        })
        .collect();
    if families.is_empty() {
        families.push(Family::Serif);
    }
    db.query(&Query {
        families: &families,
        weight: Weight::NORMAL,
        stretch: Stretch::Normal,
        style: Style::Normal,
    })
}

impl LoadedFace {
    fn width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let face = Face::parse(&self.data, self.index).ok()?;
        let scale = font_size / face.units_per_em().max(1) as f32;
        let mut width = 0.0f32;
        for ch in text.chars().filter(|ch| *ch != '\n') {
            let advance = *self.advances.entry(ch).or_insert_with(|| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
            });
            width += match advance {
                Some(units) if units > 0 => units as f32 * scale,
                _ => font_size * FALLBACK_ADVANCE,
            };
        }
        Some(width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_width() {
        assert_eq!(measure_text_width("", 12.0, "serif"), Some(0.0));
        assert_eq!(measure_text_width("abc", 0.0, "serif"), Some(0.0));
    }

    #[test]
    fn fallback_scales_with_length() {
        assert_eq!(fallback_width("", 10.0), 0.0);
        let one = fallback_width("a", 10.0);
        assert!((fallback_width("abcd", 10.0) - 4.0 * one).abs() < 1e-4);
    }
}
