//! Image similarity scoring.
//!
//! The duplicate filter scores adjacent frames through the
//! [`SimilarityScorer`] trait. [`StructuralSimilarity`] is the default: the
//! mean structural similarity index (MSSIM) computed by `image-compare`,
//! where 1.0 means identical.

use image::DynamicImage;
use image_compare::Algorithm;

use crate::error::SlidegrabError;

/// Scores how alike two images of the same shape are.
///
/// Higher means more similar. Callers guarantee both images share
/// dimensions and colour layout.
pub trait SimilarityScorer {
    /// Similarity of `second` to `first`.
    fn score(&self, first: &DynamicImage, second: &DynamicImage) -> Result<f64, SlidegrabError>;
}

/// Mean structural similarity (MSSIM).
///
/// Grayscale pairs are compared on their single channel; everything else is
/// compared as RGB.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralSimilarity;

impl SimilarityScorer for StructuralSimilarity {
    fn score(&self, first: &DynamicImage, second: &DynamicImage) -> Result<f64, SlidegrabError> {
        let algorithm = Algorithm::MSSIMSimple;
        let similarity = match (first, second) {
            (DynamicImage::ImageLuma8(a), DynamicImage::ImageLuma8(b)) => {
                image_compare::gray_similarity_structure(&algorithm, a, b)
            }
            (DynamicImage::ImageRgb8(a), DynamicImage::ImageRgb8(b)) => {
                image_compare::rgb_similarity_structure(&algorithm, a, b)
            }
            _ => image_compare::rgb_similarity_structure(
                &algorithm,
                &first.to_rgb8(),
                &second.to_rgb8(),
            ),
        }
        .map_err(|error| SlidegrabError::SimilarityError(error.to_string()))?;

        Ok(similarity.score)
    }
}

/// `(width, height, colour type)` rendered for error messages and compared
/// before scoring.
pub(crate) fn describe_shape(image: &DynamicImage) -> String {
    format!("{}x{} {:?}", image.width(), image.height(), image.color())
}

pub(crate) fn same_shape(first: &DynamicImage, second: &DynamicImage) -> bool {
    first.width() == second.width()
        && first.height() == second.height()
        && first.color() == second.color()
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use rand::{Rng, SeedableRng, rngs::SmallRng};

    use super::*;

    fn noise(seed: u64) -> DynamicImage {
        let mut rng = SmallRng::seed_from_u64(seed);
        DynamicImage::ImageRgb8(RgbImage::from_fn(64, 48, |_, _| {
            Rgb([rng.r#gen(), rng.r#gen(), rng.r#gen()])
        }))
    }

    #[test]
    fn identical_images_score_one() {
        let image = noise(1);
        let score = StructuralSimilarity.score(&image, &image.clone()).unwrap();
        assert!((score - 1.0).abs() < 1e-6, "score was {score}");
    }

    #[test]
    fn unrelated_noise_scores_low() {
        let score = StructuralSimilarity.score(&noise(1), &noise(2)).unwrap();
        assert!(score < 0.5, "score was {score}");
    }

    #[test]
    fn grayscale_pairs_are_scored_directly() {
        let gradient = GrayImage::from_fn(32, 32, |x, y| Luma([(x * 8 + y) as u8]));
        let image = DynamicImage::ImageLuma8(gradient);
        let score = StructuralSimilarity.score(&image, &image).unwrap();
        assert!((score - 1.0).abs() < 1e-6, "score was {score}");
    }

    #[test]
    fn shapes_compare_size_and_layout() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(8, 8));
        let gray = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        let wider = DynamicImage::ImageRgb8(RgbImage::new(9, 8));
        assert!(same_shape(&rgb, &rgb.clone()));
        assert!(!same_shape(&rgb, &gray));
        assert!(!same_shape(&rgb, &wider));
        assert_eq!(describe_shape(&wider), "9x8 Rgb8");
    }
}
