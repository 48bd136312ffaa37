use std::sync::Arc;

use xxhash_rust::xxh3::Xxh3;

use crate::foundation::core::{Canvas, FrameIndex, Rgb8};
use crate::foundation::error::{ExplainerError, ExplainerResult};

/// One immutable raster frame: packed `rgb24`, row-major, tightly packed.
///
/// Pixel storage is shared (`Arc`) so a static segment can hand out the same card every frame
/// without copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    index: FrameIndex,
    canvas: Canvas,
    data: Arc<Vec<u8>>,
}

impl Frame {
    /// Wrap packed `rgb24` bytes. Fails when `data.len() != width * height * 3`.
    pub fn from_rgb(index: FrameIndex, canvas: Canvas, data: Vec<u8>) -> ExplainerResult<Self> {
        Self::from_shared(index, canvas, Arc::new(data))
    }

    /// Like [`Frame::from_rgb`] but reuses an existing shared buffer.
    pub fn from_shared(
        index: FrameIndex,
        canvas: Canvas,
        data: Arc<Vec<u8>>,
    ) -> ExplainerResult<Self> {
        if data.len() != canvas.rgb_len() {
            return Err(ExplainerError::validation(format!(
                "frame data is {} bytes, expected {} for {canvas} rgb24",
                data.len(),
                canvas.rgb_len()
            )));
        }
        Ok(Self {
            index,
            canvas,
            data,
        })
    }

    /// Solid-color frame.
    pub fn solid(index: FrameIndex, canvas: Canvas, color: Rgb8) -> Self {
        let mut data = Vec::with_capacity(canvas.rgb_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self {
            index,
            canvas,
            data: Arc::new(data),
        }
    }

    /// Position within the producing segment.
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Packed `rgb24` bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb8> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let off = (y as usize * self.canvas.width as usize + x as usize) * 3;
        Some(Rgb8::new(
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
        ))
    }

    /// Content fingerprint over size and pixels. The index is not part of the hash, so the
    /// same picture at different positions fingerprints equal.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Xxh3::new();
        h.update(&self.canvas.width.to_le_bytes());
        h.update(&self.canvas.height.to_le_bytes());
        h.update(&self.data);
        h.digest()
    }

    /// Return this frame scaled to `target` (bilinear). A same-size request is a cheap clone.
    pub fn rescaled(&self, target: Canvas) -> ExplainerResult<Frame> {
        if target == self.canvas {
            return Ok(self.clone());
        }
        if target.width == 0 || target.height == 0 {
            return Err(ExplainerError::validation(
                "cannot rescale a frame to a zero-sized canvas",
            ));
        }
        let src: image::ImageBuffer<image::Rgb<u8>, &[u8]> =
            image::ImageBuffer::from_raw(self.canvas.width, self.canvas.height, self.data())
                .ok_or_else(|| ExplainerError::validation("frame buffer too small for its size"))?;
        let out = image::imageops::resize(
            &src,
            target.width,
            target.height,
            image::imageops::FilterType::Triangle,
        );
        Frame::from_rgb(self.index, target, out.into_raw())
    }

    /// Same pixels, new position.
    pub fn with_index(&self, index: FrameIndex) -> Frame {
        Frame {
            index,
            canvas: self.canvas,
            data: Arc::clone(&self.data),
        }
    }
}

/// Flatten premultiplied RGBA8 over an opaque background into packed `rgb24`.
pub fn rgb_from_premul_rgba(src_premul: &[u8], bg: Rgb8) -> ExplainerResult<Vec<u8>> {
    if !src_premul.len().is_multiple_of(4) {
        return Err(ExplainerError::validation(
            "rgb_from_premul_rgba expects a whole number of rgba8 pixels",
        ));
    }

    let bg_r = u16::from(bg.r);
    let bg_g = u16::from(bg.g);
    let bg_b = u16::from(bg.b);

    let mut out = Vec::with_capacity(src_premul.len() / 4 * 3);
    for s in src_premul.chunks_exact(4) {
        let a = u16::from(s[3]);
        if a == 255 {
            out.extend_from_slice(&s[..3]);
            continue;
        }

        let inv = 255u16 - a;
        let r = u16::from(s[0]) + mul_div255(bg_r, inv);
        let g = u16::from(s[1]) + mul_div255(bg_g, inv);
        let b = u16::from(s[2]) + mul_div255(bg_b, inv);
        out.extend_from_slice(&[r.min(255) as u8, g.min(255) as u8, b.min(255) as u8]);
    }

    Ok(out)
}

fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
