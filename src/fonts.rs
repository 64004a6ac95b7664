use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::debug;

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Upper bound on discovered faces; keeps the scan cheap on font-heavy hosts.
pub const MAX_FACES: usize = 20;

const MAX_SCAN_DEPTH: usize = 4;

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
    }
    dirs
}

struct Face {
    bold: bool,
    font: Arc<FontVec>,
}

/// A typeface usable for drawing: a parsed system font, or the built-in
/// block font that is always available.
pub enum FaceHandle<'a> {
    Vector(&'a FontVec),
    Builtin,
}

/// Read-only cache of usable typefaces, built once at startup.
pub struct FontLibrary {
    faces: Vec<Face>,
}

impl FontLibrary {
    /// Scan the conventional font directories and cache every face that
    /// parses. Paths are sorted so face selection is a pure function of the
    /// caller's RNG.
    pub fn discover() -> Self {
        Self::from_dirs(&font_dirs())
    }

    pub fn from_dirs(dirs: &[PathBuf]) -> Self {
        let mut paths = Vec::new();
        for dir in dirs {
            scan(dir, 0, &mut paths);
            if paths.len() >= MAX_FACES {
                break;
            }
        }
        paths.sort();
        paths.truncate(MAX_FACES);

        let faces: Vec<Face> = paths
            .into_iter()
            .filter_map(|path| {
                let bytes = std::fs::read(&path).ok()?;
                let font = FontVec::try_from_vec(bytes).ok()?;
                let bold = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.to_ascii_lowercase().contains("bold"));
                Some(Face { bold, font: Arc::new(font) })
            })
            .collect();
        debug!(faces = faces.len(), "font scan complete");
        Self { faces }
    }

    /// A library with no discovered faces; every `get` yields the built-in
    /// font. Used by tests and as the degenerate case on bare hosts.
    pub fn empty() -> Self {
        Self { faces: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Pick a face at random, preferring bold variants when asked. Never
    /// fails: a library without usable faces hands out the built-in font.
    pub fn get(&self, rng: &mut StdRng, bold: bool) -> FaceHandle<'_> {
        if bold {
            let bold_faces: Vec<&Face> = self.faces.iter().filter(|f| f.bold).collect();
            if let Some(face) = bold_faces.choose(rng) {
                return FaceHandle::Vector(&face.font);
            }
        }
        match self.faces.choose(rng) {
            Some(face) => FaceHandle::Vector(&face.font),
            None => FaceHandle::Builtin,
        }
    }
}

fn scan(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_SCAN_DEPTH || out.len() >= MAX_FACES {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        if out.len() >= MAX_FACES {
            return;
        }
        let path = entry.path();
        if path.is_dir() {
            scan(&path, depth + 1, out);
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| FONT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        {
            out.push(path);
        }
    }
}

/// Rendered dimensions of `text` at `px`, for either face flavor.
pub fn measure(face: &FaceHandle<'_>, px: f32, text: &str) -> (u32, u32) {
    match face {
        FaceHandle::Vector(font) => text_size(PxScale::from(px), *font, text),
        FaceHandle::Builtin => builtin_measure(px, text),
    }
}

/// Draw `text` at `(x, y)` in the given color. The color's alpha channel is
/// carried into the canvas, which is what overlay layers rely on.
pub fn draw(
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    x: i32,
    y: i32,
    px: f32,
    face: &FaceHandle<'_>,
    text: &str,
) {
    match face {
        FaceHandle::Vector(font) => draw_text_mut(canvas, color, x, y, PxScale::from(px), *font, text),
        FaceHandle::Builtin => builtin_draw(canvas, color, x, y, px, text),
    }
}

// The built-in face is a 5x7 block font covering the vocabulary's character
// set, so generation still works on hosts with no readable system fonts.

const GLYPH_COLS: u32 = 5;
const CELL_COLS: u32 = 6; // one column of tracking
const CELL_ROWS: u32 = 8; // one row of descent

fn builtin_unit(px: f32) -> f32 {
    (px / CELL_ROWS as f32).max(1.0)
}

fn builtin_measure(px: f32, text: &str) -> (u32, u32) {
    let unit = builtin_unit(px);
    let chars = text.chars().count() as f32;
    (
        (chars * CELL_COLS as f32 * unit).ceil() as u32,
        (CELL_ROWS as f32 * unit).ceil() as u32,
    )
}

fn builtin_draw(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, px: f32, text: &str) {
    let unit = builtin_unit(px);
    let dot = unit.ceil() as u32;
    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        let rows = builtin_glyph(ch);
        let cell_x = x as f32 + i as f32 * CELL_COLS as f32 * unit;
        for (r, bits) in rows.iter().enumerate() {
            for c in 0..GLYPH_COLS {
                if bits & (1u8 << (GLYPH_COLS - 1 - c)) == 0 {
                    continue;
                }
                let px0 = (cell_x + c as f32 * unit).round() as i32;
                let py0 = (y as f32 + r as f32 * unit).round() as i32;
                draw_filled_rect_mut(canvas, Rect::at(px0, py0).of_size(dot, dot), color);
            }
        }
    }
}

fn builtin_glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0E],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x01, 0x01, 0x01, 0x01, 0x11, 0x11, 0x0E],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1B, 0x11],
        'X' => [0x11, 0x0A, 0x04, 0x04, 0x04, 0x0A, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x06, 0x08, 0x10, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        '\u{00a9}' => [0x0E, 0x11, 0x17, 0x19, 0x17, 0x11, 0x0E],
        '\u{2022}' => [0x00, 0x00, 0x0E, 0x0E, 0x0E, 0x00, 0x00],
        '\u{00d7}' => [0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x00],
        '+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        '\u{25ca}' => [0x04, 0x0A, 0x11, 0x11, 0x11, 0x0A, 0x04],
        '\u{25cb}' => [0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E, 0x00],
        // tofu for anything outside the vocabulary
        _ => [0x1F, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1F],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn empty_library_falls_back_to_builtin() {
        let lib = FontLibrary::empty();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(lib.get(&mut rng, false), FaceHandle::Builtin));
        assert!(matches!(lib.get(&mut rng, true), FaceHandle::Builtin));
    }

    #[test]
    fn builtin_measure_scales_with_size() {
        let (w1, h1) = builtin_measure(16.0, "DRAFT");
        let (w2, h2) = builtin_measure(32.0, "DRAFT");
        assert!(w2 > w1);
        assert!(h2 > h1);
    }

    #[test]
    fn builtin_measure_scales_with_length() {
        let (w1, _) = builtin_measure(16.0, "COPY");
        let (w2, _) = builtin_measure(16.0, "COPY COPY");
        assert!(w2 > w1);
    }

    #[test]
    fn builtin_draw_writes_opaque_pixels() {
        let mut canvas = RgbaImage::from_pixel(200, 40, Rgba([0, 0, 0, 0]));
        builtin_draw(&mut canvas, Rgba([255, 255, 255, 200]), 4, 4, 24.0, "VOID");
        let lit = canvas.pixels().filter(|p| p[3] > 0).count();
        assert!(lit > 0, "glyph blocks should land on the canvas");
        assert!(canvas.pixels().all(|p| p[3] == 0 || p[3] == 200));
    }

    #[test]
    fn scan_respects_face_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..(MAX_FACES + 10) {
            std::fs::write(dir.path().join(format!("font{i:02}.ttf")), b"not a font").unwrap();
        }
        let mut paths = Vec::new();
        scan(dir.path(), 0, &mut paths);
        assert_eq!(paths.len(), MAX_FACES);
        // none of these parse, so the library ends up empty but usable
        let lib = FontLibrary::from_dirs(&[dir.path().to_path_buf()]);
        assert!(lib.is_empty());
    }
}
