//! Turning a history into text and images.

use rca_core::{digit_char, Cell, Error, RenderConfig, Result};
use serde::{Deserialize, Serialize};

/// Largest image side, in pixels, the renderer will produce
pub const MAX_IMAGE_SIDE: u64 = 16_384;

/// Rectangular grid of cells: one row per time step, one column per cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raster {
    width: usize,
    rows: Vec<Vec<Cell>>,
}

impl Raster {
    /// Every row must already have `width` cells.
    pub(crate) fn new(width: usize, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == width));
        Self { width, rows }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.width == 0
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Grey level for a cell: 0 is white and `states - 1` black, unless inverted.
pub fn intensity(value: Cell, states: u32, invert: bool) -> u8 {
    let top = states.saturating_sub(1).max(1);
    let level = (value as u32).min(top) * 255 / top;
    let level = level as u8;
    if invert {
        level
    } else {
        255 - level
    }
}

/// Encode the raster as an 8-bit grayscale PNG, each cell a square block of pixels.
pub fn render_png(raster: &Raster, states: u32, config: &RenderConfig) -> Result<Vec<u8>> {
    if raster.is_empty() {
        return Err(Error::InvalidState("nothing to render: history is empty".to_string()));
    }
    if config.cell_pixels == 0 {
        return Err(Error::InvalidParameter("cell_pixels must be positive".to_string()));
    }

    let scale = config.cell_pixels as u64;
    let width = raster.width() as u64 * scale;
    let height = raster.height() as u64 * scale;
    if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        return Err(Error::InvalidParameter(format!(
            "image of {}x{} pixels exceeds the {} pixel limit",
            width, height, MAX_IMAGE_SIDE
        )));
    }

    let scale = config.cell_pixels as usize;
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for row in raster.rows() {
        let line: Vec<u8> = row
            .iter()
            .flat_map(|&cell| std::iter::repeat(intensity(cell, states, config.invert)).take(scale))
            .collect();
        for _ in 0..scale {
            pixels.extend_from_slice(&line);
        }
    }

    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, width as u32, height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder
        .write_header()
        .map_err(|e| Error::Render(format!("Failed to write PNG header: {}", e)))?;
    writer
        .write_image_data(&pixels)
        .map_err(|e| Error::Render(format!("Failed to write PNG data: {}", e)))?;
    writer
        .finish()
        .map_err(|e| Error::Render(format!("Failed to finish PNG: {}", e)))?;

    Ok(bytes)
}

/// One line per time step, each cell as its base-36 digit.
pub fn render_ascii(raster: &Raster, config: &RenderConfig) -> String {
    let mut out = String::with_capacity(raster.height() * (raster.width() + 1));
    for row in raster.rows() {
        for &cell in row {
            out.push(if cell == 0 && config.dot_for_zero { '.' } else { digit_char(cell) });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Raster {
        Raster::new(3, vec![vec![0, 1, 0], vec![1, 0, 1]])
    }

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn test_intensity() {
        assert_eq!(intensity(0, 2, false), 255);
        assert_eq!(intensity(1, 2, false), 0);
        assert_eq!(intensity(0, 2, true), 0);
        assert_eq!(intensity(1, 3, false), 128);
        assert_eq!(intensity(2, 3, false), 0);
        // Out-of-alphabet values clamp to black.
        assert_eq!(intensity(9, 3, false), 0);
    }

    #[test]
    fn test_render_png_dimensions_and_pixels() {
        let config = RenderConfig {
            cell_pixels: 2,
            ..Default::default()
        };
        let bytes = render_png(&sample(), 2, &config).unwrap();
        let (info, pixels) = decode(&bytes);

        assert_eq!(info.width, 6);
        assert_eq!(info.height, 4);
        assert_eq!(info.color_type, png::ColorType::Grayscale);
        // Top-left cell is 0 (white), second cell is 1 (black).
        assert_eq!(&pixels[0..4], &[255, 255, 0, 0]);
        // Third pixel row belongs to the second time step.
        assert_eq!(&pixels[12..18], &[0, 0, 255, 255, 0, 0]);
    }

    #[test]
    fn test_render_png_rejects_empty_and_zero_scale() {
        let config = RenderConfig::default();
        assert!(matches!(
            render_png(&Raster::default(), 2, &config),
            Err(Error::InvalidState(_))
        ));

        let config = RenderConfig {
            cell_pixels: 0,
            ..Default::default()
        };
        assert!(matches!(
            render_png(&sample(), 2, &config),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_render_png_size_limit() {
        let raster = Raster::new(5000, vec![vec![0; 5000]]);
        let config = RenderConfig {
            cell_pixels: 4,
            ..Default::default()
        };
        assert!(render_png(&raster, 2, &config).is_err());
    }

    #[test]
    fn test_render_ascii() {
        let raster = Raster::new(3, vec![vec![0, 1, 0], vec![2, 0, 11]]);
        assert_eq!(render_ascii(&raster, &RenderConfig::default()), ".1.\n2.b\n");

        let config = RenderConfig {
            dot_for_zero: false,
            ..Default::default()
        };
        assert_eq!(render_ascii(&raster, &config), "010\n20b\n");
    }
}
