//! Candle-based image vectorizer.
//!
//! Runs the full pretrained ResNet-50 and uses its 1000-dimensional output
//! as the image vector. Preprocessing matches the torchvision recipe the
//! weights were trained with: short side to 256, center crop to 224, then
//! per-channel ImageNet normalization.

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::{Func, VarBuilder};
use candle_transformers::models::resnet;
use image::{imageops::FilterType, DynamicImage};
use tracing::{debug, info};

use crate::error::VectorizeError;
use crate::hub::{fetch_model_files, ModelSource};
use crate::model::{Embedding, ImageVectorizer, ModelInfo};

/// Dimension of the ResNet-50 output vector.
pub const IMAGE_EMBEDDING_DIM: usize = 1000;

/// Input edge length after cropping.
const CROP_SIZE: u32 = 224;

/// Short-side length before cropping.
const RESIZE_SHORT: u32 = 256;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// ResNet-50 image embedder.
pub struct ResnetImageVectorizer {
    model: Func<'static>,
    device: Device,
    info: ModelInfo,
}

impl ResnetImageVectorizer {
    /// Load the model from a source, downloading weights if needed.
    pub fn load(source: &ModelSource) -> Result<Self, VectorizeError> {
        fetch_model_files(source)?;
        Self::load_from_path(&source.file_path("resnet50.safetensors"))
    }

    /// Load from an explicit safetensors file.
    pub fn load_from_path(weights_path: &std::path::Path) -> Result<Self, VectorizeError> {
        info!("Loading image embedding model...");

        let device = Device::Cpu;
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.to_path_buf()], DType::F32, &device)?
        };
        let model = resnet::resnet50(IMAGE_EMBEDDING_DIM, vb)?;

        info!(dim = IMAGE_EMBEDDING_DIM, "Image model loaded");

        Ok(Self {
            model,
            device,
            info: ModelInfo {
                name: "resnet50".to_string(),
                dimension: IMAGE_EMBEDDING_DIM,
            },
        })
    }
}

impl ImageVectorizer for ResnetImageVectorizer {
    fn info(&self) -> &ModelInfo {
        &self.info
    }

    fn vectorize(&self, image: &DynamicImage) -> Result<Embedding, VectorizeError> {
        debug!(
            width = image.width(),
            height = image.height(),
            "Vectorizing image"
        );

        let input = preprocess_image(image, &self.device)?.unsqueeze(0)?;
        let output = self.model.forward(&input)?;
        let values: Vec<f32> = output.squeeze(0)?.to_vec1()?;

        debug!(dim = values.len(), "Image vectorized");
        Ok(Embedding::from_raw(values))
    }
}

/// Convert a decoded image into a normalized CHW tensor.
///
/// Rejects zero-sized images; everything else is scaled so its short side
/// is 256 pixels, center-cropped to 224x224, and normalized with the
/// ImageNet channel statistics.
pub fn preprocess_image(image: &DynamicImage, device: &Device) -> Result<Tensor, VectorizeError> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(VectorizeError::Image("zero-sized image".to_string()));
    }

    // Scale the short side to RESIZE_SHORT, keeping aspect ratio
    let (new_w, new_h) = if width < height {
        (
            RESIZE_SHORT,
            ((height as u64 * RESIZE_SHORT as u64) / width as u64).max(RESIZE_SHORT as u64) as u32,
        )
    } else {
        (
            ((width as u64 * RESIZE_SHORT as u64) / height as u64).max(RESIZE_SHORT as u64) as u32,
            RESIZE_SHORT,
        )
    };
    let resized = image.resize_exact(new_w, new_h, FilterType::Triangle);

    // Center crop
    let left = (new_w - CROP_SIZE) / 2;
    let top = (new_h - CROP_SIZE) / 2;
    let cropped = resized.crop_imm(left, top, CROP_SIZE, CROP_SIZE).to_rgb8();

    let data = cropped.into_raw();
    let tensor = Tensor::from_vec(
        data,
        (CROP_SIZE as usize, CROP_SIZE as usize, 3),
        device,
    )?
    .permute((2, 0, 1))?
    .to_dtype(DType::F32)?
    .affine(1.0 / 255.0, 0.0)?;

    let mean = Tensor::new(&IMAGENET_MEAN, device)?.reshape((3, 1, 1))?;
    let std = Tensor::new(&IMAGENET_STD, device)?.reshape((3, 1, 1))?;

    Ok(tensor.broadcast_sub(&mean)?.broadcast_div(&std)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn solid_image(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
    }

    #[test]
    fn test_preprocess_shape() {
        let img = solid_image(300, 400, [128, 64, 32]);
        let tensor = preprocess_image(&img, &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[3, 224, 224]);
    }

    #[test]
    fn test_preprocess_landscape_and_small_inputs() {
        let landscape = solid_image(640, 260, [0, 0, 0]);
        let tensor = preprocess_image(&landscape, &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[3, 224, 224]);

        // Smaller than the crop on both sides still upscales to fit
        let tiny = solid_image(32, 48, [255, 255, 255]);
        let tensor = preprocess_image(&tiny, &Device::Cpu).unwrap();
        assert_eq!(tensor.dims(), &[3, 224, 224]);
    }

    #[test]
    fn test_preprocess_normalization_range() {
        // A mid-gray image lands near zero after ImageNet normalization
        let img = solid_image(256, 256, [124, 116, 104]);
        let tensor = preprocess_image(&img, &Device::Cpu).unwrap();
        let flat: Vec<f32> = tensor.flatten_all().unwrap().to_vec1().unwrap();
        assert!(flat.iter().all(|v| v.abs() < 0.2));
    }

    // Integration tests require model download, run with:
    // cargo test -p embed-models -- --ignored

    #[test]
    #[ignore = "requires model download"]
    fn test_load_and_vectorize() {
        let source = ModelSource::new(
            ModelSource::default_cache_dir(),
            "lmz/candle-resnet",
            crate::hub::IMAGE_MODEL_FILES,
        );
        let vectorizer = ResnetImageVectorizer::load(&source).unwrap();
        let emb = vectorizer.vectorize(&solid_image(320, 240, [10, 200, 90])).unwrap();
        assert_eq!(emb.dimension(), IMAGE_EMBEDDING_DIM);
    }
}
