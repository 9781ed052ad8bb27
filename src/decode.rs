use crate::error::{FabricError, Result};
use image::RgbImage;
use kornia_image::{Image, ImageSize, allocator::CpuAllocator};

/// Decodes an uploaded file into an RGB image.
///
/// Any format the `image` crate recognizes is accepted. Grayscale sources are
/// expanded to three identical channels and alpha is dropped.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| FabricError::ImageDecode(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(FabricError::ImageDecode("image has no pixels".to_string()));
    }

    Ok(rgb)
}

/// Copies an RGB image into the layout the label model consumes.
pub fn to_kornia_rgb(image: &RgbImage) -> Result<Image<u8, 3, CpuAllocator>> {
    kornia_rgb(
        image.width() as usize,
        image.height() as usize,
        image.as_raw().clone(),
    )
}

fn kornia_rgb(width: usize, height: usize, data: Vec<u8>) -> Result<Image<u8, 3, CpuAllocator>> {
    Image::new(ImageSize { width, height }, data, CpuAllocator).map_err(|e| {
        FabricError::InferenceFailure(format!("failed to prepare image for the label model: {e}"))
    })
}
