use crate::error::{AssetError, AssetErrorExt};
use crate::ports::ImageTransform;
use image::ImageFormat;
use std::io::Cursor;

/// Horizontal mirror re-encoded as RGBA PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorPng;

impl ImageTransform for MirrorPng {
    fn mirror(&self, image: &[u8]) -> Result<Vec<u8>, AssetError> {
        let decoded = image::load_from_memory(image).context("Unsupported or corrupt image")?;
        let flipped = decoded.fliph().into_rgba8();

        let mut out = Cursor::new(Vec::with_capacity(image.len()));
        flipped.write_to(&mut out, ImageFormat::Png).context("PNG encoding failed")?;
        Ok(out.into_inner())
    }
}
