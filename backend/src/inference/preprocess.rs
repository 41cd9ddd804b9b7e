use image::imageops::FilterType;
use ndarray::Array4;

pub const IMAGE_SIZE: u32 = 28;
pub const CHANNELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Empty image content")]
    Empty,
    #[error("Unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),
}

/// `(1, 28, 28, 3)` NHWC tensor with intensities in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ImageTensor(Array4<f32>);

impl ImageTensor {
    #[cfg(test)]
    pub(crate) fn from_array(array: Array4<f32>) -> Self {
        Self(array)
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }
}

/// Decodes any supported raster format and squashes it to the model's input
/// grid. Aspect ratio is not preserved.
pub fn preprocess(image: &[u8], filter: FilterType) -> Result<ImageTensor, DecodeError> {
    if image.is_empty() {
        return Err(DecodeError::Empty);
    }
    let decoded = image::load_from_memory(image)?;
    let rgb = decoded
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, filter)
        .to_rgb8();

    let side = IMAGE_SIZE as usize;
    let tensor = Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| {
        rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0
    });
    Ok(ImageTensor(tensor))
}
