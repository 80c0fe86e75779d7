//! OCR recognizer collaborator. Crops the selected boxes out of the
//! original frame and recognizes text in each, built on `chrome_lens_ocr`.

use std::io::Cursor;

use chrome_lens_ocr::LensClient;
use image::{ImageFormat, RgbImage, imageops::FilterType};

const MIN_CROP_HEIGHT: u32 = 45;
const HEIGHT_PAD_RATIO: f32 = 0.30;
const ROW_OVERLAP_RATIO: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct RecognizedLine {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub height: f64,
}

impl RecognizedLine {
    /// Shifts `x`/`y` into the coordinate space of a containing box, so
    /// lines recognized from separate crops can be assembled together.
    pub fn offset(mut self, dx: f64, dy: f64) -> Self {
        self.x += dx;
        self.y += dy;
        self
    }
}

#[async_trait::async_trait]
pub trait OcrRecognizer: Send + Sync {
    async fn recognize(&self, crop: &RgbImage) -> anyhow::Result<Vec<RecognizedLine>>;
}

pub struct LensRecognizer {
    client: LensClient,
}

impl LensRecognizer {
    pub fn new() -> Self {
        Self {
            client: LensClient::new(None),
        }
    }
}

impl Default for LensRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pads the crop 30% of its height and upscales it 2x when shorter than
/// `MIN_CROP_HEIGHT`, improving recognition accuracy on small dialogue
/// crops.
fn prepare_crop(crop: &RgbImage) -> RgbImage {
    let (w, h) = (crop.width(), crop.height());
    let pad = ((h as f32) * HEIGHT_PAD_RATIO) as u32;
    let padded_h = h + pad * 2;

    let mut padded = RgbImage::new(w, padded_h);
    image::imageops::overlay(&mut padded, crop, 0, pad as i64);

    if padded_h < MIN_CROP_HEIGHT {
        image::imageops::resize(&padded, w * 2, padded_h * 2, FilterType::CatmullRom)
    } else {
        padded
    }
}

#[async_trait::async_trait]
impl OcrRecognizer for LensRecognizer {
    async fn recognize(&self, crop: &RgbImage) -> anyhow::Result<Vec<RecognizedLine>> {
        let prepared = prepare_crop(crop);
        let (w, h) = (prepared.width() as f64, prepared.height() as f64);

        let mut buf = Cursor::new(Vec::new());
        prepared.write_to(&mut buf, ImageFormat::Png)?;
        let bytes = buf.into_inner();

        let lens_res = self
            .client
            .process_image_bytes(&bytes, Some("jp"))
            .await
            .map_err(|e| anyhow::anyhow!("lens recognition failed: {e:?}"))?;

        let mut lines = Vec::new();
        for para in lens_res.paragraphs {
            for line in para.lines {
                let Some(geom) = line.geometry else {
                    continue;
                };
                let norm_x = (geom.center_x - geom.width / 2.0) as f64;
                let norm_y = (geom.center_y - geom.height / 2.0) as f64;
                lines.push(RecognizedLine {
                    text: line.text,
                    x: norm_x * w,
                    y: norm_y * h,
                    height: geom.height as f64 * h,
                });
            }
        }
        Ok(lines)
    }
}

/// Groups recognized lines into rows by vertical overlap over 50% of the
/// shorter box's height, sorts each row left to right, and joins rows with
/// spaces within a row and newlines between rows.
pub fn assemble_rows(mut lines: Vec<RecognizedLine>) -> String {
    lines.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal));

    let mut rows: Vec<Vec<RecognizedLine>> = Vec::new();
    for line in lines {
        let joined = rows.iter_mut().find(|row| {
            row.iter().any(|other| {
                let top = line.y.max(other.y);
                let bottom = (line.y + line.height).min(other.y + other.height);
                let overlap = (bottom - top).max(0.0);
                let shorter = line.height.min(other.height).max(1.0);
                overlap / shorter > ROW_OVERLAP_RATIO
            })
        });
        match joined {
            Some(row) => row.push(line),
            None => rows.push(vec![line]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
            row.into_iter().map(|l| l.text).collect::<Vec<_>>().join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x: f64, y: f64, height: f64) -> RecognizedLine {
        RecognizedLine {
            text: text.to_string(),
            x,
            y,
            height,
        }
    }

    #[test]
    fn same_row_lines_are_joined_with_spaces() {
        let lines = vec![line("hello", 0.0, 10.0, 20.0), line("world", 100.0, 12.0, 20.0)];
        assert_eq!(assemble_rows(lines), "hello world");
    }

    #[test]
    fn same_row_lines_are_ordered_left_to_right() {
        let lines = vec![line("world", 100.0, 12.0, 20.0), line("hello", 0.0, 10.0, 20.0)];
        assert_eq!(assemble_rows(lines), "hello world");
    }

    #[test]
    fn distinct_rows_are_newline_separated() {
        let lines = vec![line("first", 0.0, 0.0, 20.0), line("second", 0.0, 400.0, 20.0)];
        assert_eq!(assemble_rows(lines), "first\nsecond");
    }

    #[test]
    fn offset_shifts_into_containing_box_coordinates() {
        let shifted = line("hello", 10.0, 20.0, 5.0).offset(100.0, 200.0);
        assert_eq!(shifted.x, 110.0);
        assert_eq!(shifted.y, 220.0);
    }
}
