//! Signature capture surfaces and their PNG data-URI export.

use std::io::Cursor;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use shared::domain::SignatureRole;
use thiserror::Error;

pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";
pub const DEFAULT_CANVAS_WIDTH: u32 = 300;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 100;
pub const DEFAULT_PEN_WIDTH: f32 = 2.0;
const BLACK_INK: [u8; 4] = [0, 0, 0, 255];
const STAMP_SPACING: f32 = 0.5;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to encode signature image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("signature surface has strokes but no visible ink")]
    NoVisibleInk,
}

/// Capability a signature widget has to provide to the submission flow.
pub trait SignaturePad: Send + Sync {
    fn is_blank(&self) -> bool;

    fn clear(&mut self);

    /// `Ok("")` for a blank surface, otherwise a `data:image/png;base64,` URI
    /// of the ink trimmed to its bounding box.
    fn export_png(&self) -> Result<String, SignatureError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// In-memory raster signature surface. Strokes are kept as point lists and
/// only rendered on export.
#[derive(Debug, Clone)]
pub struct StrokeCanvas {
    width: u32,
    height: u32,
    pen_width: f32,
    pen_color: Rgba<u8>,
    strokes: Vec<Vec<Point>>,
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl StrokeCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            pen_width: DEFAULT_PEN_WIDTH,
            pen_color: Rgba(BLACK_INK),
            strokes: Vec::new(),
        }
    }

    /// Sets the pen. A fully transparent color is raised to the lowest
    /// visible alpha so drawn strokes always leave ink.
    pub fn with_pen(mut self, width: f32, color: [u8; 4]) -> Self {
        let [r, g, b, a] = color;
        self.pen_width = width.max(1.0);
        self.pen_color = Rgba([r, g, b, a.max(1)]);
        self
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    pub fn begin_stroke(&mut self, at: Point) {
        let at = self.clamp(at);
        self.strokes.push(vec![at]);
    }

    /// Extends the current stroke, starting one if none is open.
    pub fn line_to(&mut self, to: Point) {
        let to = self.clamp(to);
        match self.strokes.last_mut() {
            Some(stroke) => stroke.push(to),
            None => self.strokes.push(vec![to]),
        }
    }

    pub fn draw_stroke(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_stroke(*first);
        for point in rest {
            self.line_to(*point);
        }
    }

    fn clamp(&self, point: Point) -> Point {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        Point {
            x: if point.x.is_finite() { point.x.clamp(0.0, max_x) } else { 0.0 },
            y: if point.y.is_finite() { point.y.clamp(0.0, max_y) } else { 0.0 },
        }
    }

    fn rasterize(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width, self.height);
        let radius = self.pen_width / 2.0;
        for stroke in &self.strokes {
            match stroke.as_slice() {
                [] => {}
                [dot] => stamp(&mut image, *dot, radius, self.pen_color),
                points => {
                    for pair in points.windows(2) {
                        draw_segment(&mut image, pair[0], pair[1], radius, self.pen_color);
                    }
                }
            }
        }
        image
    }
}

impl SignaturePad for StrokeCanvas {
    fn is_blank(&self) -> bool {
        self.strokes.iter().all(Vec::is_empty)
    }

    fn clear(&mut self) {
        self.strokes.clear();
    }

    fn export_png(&self) -> Result<String, SignatureError> {
        if self.is_blank() {
            return Ok(String::new());
        }
        let trimmed = trim_to_ink(&self.rasterize()).ok_or(SignatureError::NoVisibleInk)?;
        encode_png_data_uri(trimmed)
    }
}

fn draw_segment(image: &mut RgbaImage, from: Point, to: Point, radius: f32, color: Rgba<u8>) {
    let length = (to.x - from.x).hypot(to.y - from.y);
    let steps = ((length / STAMP_SPACING).ceil() as u32).max(1);
    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let at = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        stamp(image, at, radius, color);
    }
}

fn stamp(image: &mut RgbaImage, center: Point, radius: f32, color: Rgba<u8>) {
    let (width, height) = image.dimensions();
    let min_x = (center.x - radius).floor().max(0.0) as u32;
    let min_y = (center.y - radius).floor().max(0.0) as u32;
    let max_x = ((center.x + radius).ceil() as u32).min(width - 1);
    let max_y = ((center.y + radius).ceil() as u32).min(height - 1);

    // The pixel under the pen always gets ink, even for hairline pens.
    image.put_pixel(
        (center.x as u32).min(width - 1),
        (center.y as u32).min(height - 1),
        color,
    );

    let radius_sq = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= radius_sq {
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// Crops `image` to the bounding box of its non-transparent pixels.
pub fn trim_to_ink(image: &RgbaImage) -> Option<RgbaImage> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        if pixel.0[3] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((min_x, min_y, max_x, max_y)) => {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            }
        });
    }
    let (min_x, min_y, max_x, max_y) = bounds?;
    Some(
        imageops::crop_imm(image, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
            .to_image(),
    )
}

pub fn encode_png_data_uri(image: RgbaImage) -> Result<String, SignatureError> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image).write_to(&mut out, ImageFormat::Png)?;
    Ok(format!(
        "{PNG_DATA_URI_PREFIX}{}",
        STANDARD.encode(out.into_inner())
    ))
}

/// Encoded signatures for one submission, indexed by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSignatures([String; 3]);

impl EncodedSignatures {
    pub fn get(&self, role: SignatureRole) -> &str {
        &self.0[role.index()]
    }

    pub fn into_parts(self) -> [String; 3] {
        self.0
    }
}

/// One pad per signer role.
#[derive(Debug, Clone)]
pub struct SignatureBoard<P = StrokeCanvas> {
    pads: [P; 3],
}

impl SignatureBoard<StrokeCanvas> {
    /// Three empty pads of the default size.
    pub fn blank() -> Self {
        Self::new(
            StrokeCanvas::default(),
            StrokeCanvas::default(),
            StrokeCanvas::default(),
        )
    }
}

impl Default for SignatureBoard<StrokeCanvas> {
    fn default() -> Self {
        Self::blank()
    }
}

impl<P: SignaturePad> SignatureBoard<P> {
    pub fn new(worker: P, client: P, supervisor: P) -> Self {
        Self {
            pads: [worker, client, supervisor],
        }
    }

    pub fn pad(&self, role: SignatureRole) -> &P {
        &self.pads[role.index()]
    }

    pub fn pad_mut(&mut self, role: SignatureRole) -> &mut P {
        &mut self.pads[role.index()]
    }

    pub fn clear(&mut self, role: SignatureRole) {
        self.pad_mut(role).clear();
    }

    pub fn export_all(&self) -> Result<EncodedSignatures> {
        let mut encoded: [String; 3] = Default::default();
        for role in SignatureRole::ALL {
            encoded[role.index()] = self
                .pad(role)
                .export_png()
                .with_context(|| format!("failed to export {role} signature"))?;
        }
        Ok(EncodedSignatures(encoded))
    }
}

#[cfg(test)]
#[path = "tests/signature_tests.rs"]
mod tests;
