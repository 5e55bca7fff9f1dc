//! Image preprocessing for FaceNet: cropping, resizing and prewhitening.

use crate::domain::model::{FaceBox, FaceTensor};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Per-image standardization. The standard deviation is floored at
/// `1/sqrt(size)` so flat images map to zeros instead of dividing by zero.
pub fn normalize_image(tensor: &FaceTensor) -> FaceTensor {
    let size = tensor.iter().map(|row| row.len() * 3).sum::<usize>();
    if size == 0 {
        return tensor.clone();
    }

    let values = || tensor.iter().flatten().flat_map(|px| px.iter().map(|&v| v as f64));
    let mean = values().sum::<f64>() / size as f64;
    let variance = values().map(|v| (v - mean).powi(2)).sum::<f64>() / size as f64;
    let std_adj = variance.sqrt().max(1.0 / (size as f64).sqrt());

    tensor
        .iter()
        .map(|row| {
            row.iter()
                .map(|px| px.map(|v| ((v as f64 - mean) / std_adj) as f32))
                .collect()
        })
        .collect()
}

/// Resizes keeping the aspect ratio. When both are given, `width` wins;
/// when neither is given the image is returned as is.
pub fn resize_image(image: &RgbImage, width: Option<u32>, height: Option<u32>) -> RgbImage {
    let (w, h) = image.dimensions();

    let (new_w, new_h) = match (width, height) {
        (None, None) => return image.clone(),
        (None, Some(height)) => {
            let r = height as f64 / h as f64;
            ((w as f64 * r) as u32, height)
        }
        (Some(width), _) => {
            let r = width as f64 / w as f64;
            (width, (h as f64 * r) as u32)
        }
    };

    imageops::resize(image, new_w.max(1), new_h.max(1), FilterType::Triangle)
}

/// Crops the box grown by `margin / 2` on each side, clamped to the image.
/// Returns `None` when the box does not overlap the image.
pub fn crop_face(image: &RgbImage, face: &FaceBox, margin: u32) -> Option<RgbImage> {
    let (w, h) = image.dimensions();
    let half = (margin / 2) as i64;

    let x0 = face.x.saturating_sub(half).max(0);
    let y0 = face.y.saturating_sub(half).max(0);
    let x1 = face.x.saturating_add(face.width).saturating_add(half).min(w as i64);
    let y1 = face.y.saturating_add(face.height).saturating_add(half).min(h as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(
        imageops::crop_imm(
            image,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image(),
    )
}

pub fn to_tensor(image: &RgbImage) -> FaceTensor {
    image
        .rows()
        .map(|row| {
            row.map(|px| [px[0] as f32, px[1] as f32, px[2] as f32])
                .collect()
        })
        .collect()
}

/// Crop, resize to `size`×`size` and prewhiten a single face.
pub fn face_tensor(image: &RgbImage, face: &FaceBox, margin: u32, size: u32) -> Option<FaceTensor> {
    let cropped = crop_face(image, face, margin)?;
    let resized = imageops::resize(&cropped, size, size, FilterType::Triangle);
    Some(normalize_image(&to_tensor(&resized)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_normalize_constant_image_is_zero() {
        let tensor = vec![vec![[42.0f32; 3]; 4]; 4];
        let normalized = normalize_image(&tensor);

        assert!(normalized.iter().flatten().flatten().all(|v| *v == 0.0));
    }

    #[test]
    fn test_normalize_has_zero_mean_unit_std() {
        let tensor = to_tensor(&gradient(32, 24));
        let normalized = normalize_image(&tensor);

        let values: Vec<f64> = normalized.iter().flatten().flatten().map(|v| *v as f64).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < 1e-4, "mean was {}", mean);
        assert!((std - 1.0).abs() < 1e-3, "std was {}", std);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let image = gradient(400, 200);

        let by_width = resize_image(&image, Some(100), None);
        assert_eq!(by_width.dimensions(), (100, 50));

        let by_height = resize_image(&image, None, Some(50));
        assert_eq!(by_height.dimensions(), (100, 50));

        let width_wins = resize_image(&image, Some(200), Some(10));
        assert_eq!(width_wins.dimensions(), (200, 100));

        let untouched = resize_image(&image, None, None);
        assert_eq!(untouched.dimensions(), (400, 200));
    }

    #[test]
    fn test_crop_face_clamps_to_image() {
        let image = gradient(100, 80);

        let crop = crop_face(&image, &FaceBox::new(-10, -5, 40, 30), 0).unwrap();
        assert_eq!(crop.dimensions(), (30, 25));

        let crop = crop_face(&image, &FaceBox::new(10, 10, 20, 20), 10).unwrap();
        assert_eq!(crop.dimensions(), (30, 30));
        assert_eq!(crop.get_pixel(0, 0), image.get_pixel(5, 5));

        let crop = crop_face(&image, &FaceBox::new(90, 70, 50, 50), 0).unwrap();
        assert_eq!(crop.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_face_outside_image() {
        let image = gradient(100, 80);
        assert!(crop_face(&image, &FaceBox::new(150, 10, 20, 20), 0).is_none());
        assert!(crop_face(&image, &FaceBox::new(10, 10, 0, 20), 0).is_none());
    }

    #[test]
    fn test_crop_face_huge_box_is_clamped() {
        let image = gradient(100, 80);

        let crop = crop_face(&image, &FaceBox::new(10, 10, i64::MAX, i64::MAX), 10).unwrap();
        assert_eq!(crop.dimensions(), (95, 75));

        let crop = crop_face(&image, &FaceBox::new(i64::MIN, i64::MIN, 5, 5), 4);
        assert!(crop.is_none());
    }

    #[test]
    fn test_face_tensor_shape() {
        let image = gradient(300, 200);
        let tensor = face_tensor(&image, &FaceBox::new(50, 40, 90, 110), 8, 160).unwrap();

        assert_eq!(tensor.len(), 160);
        assert!(tensor.iter().all(|row| row.len() == 160));
    }
}
