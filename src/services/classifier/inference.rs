use crate::error::{AppError, Result};
use crate::models::classify_types::Prediction;
use image::DynamicImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::Value;

const CROP_PCT: f32 = 0.875;

// ImageNet normalization constants
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| AppError::InvalidImage(format!("Failed to decode image: {}", e)))
}

/// Centered square, resized to ceil(crop_size / crop_pct), center crop, normalize, NCHW.
///
/// Squaring first keeps the resize at `resize_size²` pixels for any aspect ratio.
pub fn preprocess_image(img: &DynamicImage, crop_size: u32) -> Result<Array4<f32>> {
    let resize_size = (crop_size as f32 / CROP_PCT).ceil() as u32;
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(AppError::InvalidImage("image has no pixels".into()));
    }

    let side = w.min(h);
    let square = img.crop_imm((w - side) / 2, (h - side) / 2, side, side);
    let resized = square.resize_exact(
        resize_size,
        resize_size,
        image::imageops::FilterType::Triangle,
    );

    let offset = resize_size.saturating_sub(crop_size) / 2;
    let rgb = resized.crop_imm(offset, offset, crop_size, crop_size).to_rgb8();
    if rgb.dimensions() != (crop_size, crop_size) {
        return Err(AppError::Model(format!(
            "Crop produced {}x{}, expected {}x{}",
            rgb.width(),
            rgb.height(),
            crop_size,
            crop_size
        )));
    }

    // Planar layout: all R, then all G, then all B.
    let hw = (crop_size * crop_size) as usize;
    let mut data = vec![0f32; 3 * hw];
    for (i, pixel) in rgb.as_raw().chunks_exact(3).enumerate() {
        for c in 0..3 {
            data[c * hw + i] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    Array4::from_shape_vec((1, 3, crop_size as usize, crop_size as usize), data)
        .map_err(|e| AppError::Model(format!("Failed to create tensor: {}", e)))
}

/// Softmax over `logits`, best `top_k` first.
pub fn top_predictions(logits: &[f32], labels: &[String], top_k: usize) -> Vec<Prediction> {
    if logits.is_empty() {
        return Vec::new();
    }

    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();

    let mut indexed: Vec<(usize, f32)> = logits
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .enumerate()
        .collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(top_k);

    indexed
        .into_iter()
        .map(|(idx, probability)| {
            let class_name = labels
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", idx));
            Prediction {
                class_name,
                probability,
            }
        })
        .collect()
}

pub fn run_inference(
    session: &mut Session,
    input: Array4<f32>,
    labels: &[String],
    top_k: usize,
) -> Result<Vec<Prediction>> {
    let input_name = session
        .inputs()
        .first()
        .map(|i| i.name().to_string())
        .ok_or_else(|| AppError::Model("Model declares no inputs".into()))?;

    let input_tensor = Value::from_array(input)
        .map_err(|e| AppError::Model(format!("Failed to create tensor value: {}", e)))?;

    let outputs = session
        .run(ort::inputs![input_name.as_str() => input_tensor])
        .map_err(|e| AppError::Model(format!("Inference failed: {}", e)))?;

    let output_value = outputs
        .values()
        .next()
        .ok_or_else(|| AppError::Model("Model produced no outputs".into()))?;

    let (_, logits) = output_value
        .try_extract_tensor::<f32>()
        .map_err(|e| AppError::Model(format!("Failed to extract output tensor: {}", e)))?;

    Ok(top_predictions(logits, labels, top_k))
}
