use crate::error::{FabricError, Result};
use crate::kmeans::{KMeansRuns, cluster_sizes};
use image::{RgbImage, imageops};
use palette::Srgb;
use serde::{Serialize, Serializer};
use std::fmt;

/// A pixel color, RGB channels on the 0.0..=1.0 scale.
pub type ColorSample = Srgb;

/// Largest cluster count the clustering can label (indices are `u8`).
pub const MAX_COLORS: usize = 256;

/// Settings for dominant color extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorConfig {
    /// Number of dominant colors to return.
    pub n_colors: usize,
    /// Width the image is resampled to before clustering.
    pub sample_width: u32,
    /// Height the image is resampled to before clustering.
    pub sample_height: u32,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    pub converge: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            n_colors: 3,
            sample_width: 150,
            sample_height: 150,
            seed: 42,
            n_init: 10,
            max_iter: 300,
            converge: 0.0025,
        }
    }
}

impl ColorConfig {
    fn kmeans(&self) -> KMeansRuns {
        KMeansRuns {
            n_clusters: self.n_colors,
            n_init: self.n_init,
            max_iter: self.max_iter,
            converge: self.converge,
            seed: self.seed,
        }
    }

    fn validate(&self, samples: usize) -> Result<()> {
        if self.n_colors == 0 {
            return Err(FabricError::InvalidClusteringRequest(
                "number of colors must be at least 1".to_string(),
            ));
        }
        if self.n_colors > MAX_COLORS {
            return Err(FabricError::InvalidClusteringRequest(format!(
                "at most {MAX_COLORS} colors can be extracted, {} requested",
                self.n_colors
            )));
        }
        if self.n_colors > samples {
            return Err(FabricError::InvalidClusteringRequest(format!(
                "{} colors requested but only {samples} samples available",
                self.n_colors
            )));
        }
        if self.n_init == 0 {
            return Err(FabricError::InvalidClusteringRequest(
                "number of initializations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// An 8-bit RGB color, rendered as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    /// Scales each channel to `0..=255`, rounds to the nearest integer and clamps.
    pub fn from_centroid(centroid: &ColorSample) -> Self {
        let channel = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;
        HexColor([
            channel(centroid.red),
            channel(centroid.green),
            channel(centroid.blue),
        ])
    }

    pub fn channels(&self) -> [u8; 3] {
        self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl Serialize for HexColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A group of color samples: its mean color and how many samples it holds.
#[derive(Clone, Debug, PartialEq)]
pub struct Cluster {
    pub centroid: ColorSample,
    pub size: usize,
}

impl Cluster {
    pub fn hex(&self) -> HexColor {
        HexColor::from_centroid(&self.centroid)
    }
}

/// Resamples the image to the configured clustering resolution.
///
/// Shrinking uses area averaging; if either source dimension is smaller than the
/// target, bilinear resampling is used instead.
pub fn downsample(image: &RgbImage, config: &ColorConfig) -> Result<RgbImage> {
    let (width, height) = (config.sample_width, config.sample_height);
    if width == 0 || height == 0 {
        return Err(FabricError::InvalidClusteringRequest(format!(
            "sample size must be non-zero, got {width}x{height}"
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(FabricError::InvalidClusteringRequest(
            "image has no pixels".to_string(),
        ));
    }

    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    if image.width() >= width && image.height() >= height {
        Ok(imageops::thumbnail(image, width, height))
    } else {
        Ok(imageops::resize(
            image,
            width,
            height,
            imageops::FilterType::Triangle,
        ))
    }
}

/// Flattens an image into color samples, discarding pixel positions.
pub fn color_samples(image: &RgbImage) -> Vec<ColorSample> {
    image
        .pixels()
        .map(|p| {
            Srgb::new(
                p[0] as f32 / 255.0,
                p[1] as f32 / 255.0,
                p[2] as f32 / 255.0,
            )
        })
        .collect()
}

/// Clusters the image's colors and returns the clusters, largest first.
///
/// Clusters with equal sizes keep the order the clustering produced them in.
pub fn dominant_clusters(image: &RgbImage, config: &ColorConfig) -> Result<Vec<Cluster>> {
    let resized = downsample(image, config)?;
    let samples = color_samples(&resized);
    config.validate(samples.len())?;

    let result = config.kmeans().fit(&samples).ok_or_else(|| {
        FabricError::InvalidClusteringRequest("no clustering run completed".to_string())
    })?;
    log::debug!(
        "Clustered {} samples into {} colors (score {:.4})",
        samples.len(),
        result.centroids.len(),
        result.score
    );

    let mut clusters: Vec<Cluster> = result
        .centroids
        .iter()
        .zip(cluster_sizes(&result))
        .map(|(centroid, size)| Cluster {
            centroid: *centroid,
            size,
        })
        .collect();
    clusters.sort_by(|a, b| b.size.cmp(&a.size));

    Ok(clusters)
}

/// Returns `config.n_colors` dominant colors of the image, most prevalent first.
pub fn extract_dominant_colors(image: &RgbImage, config: &ColorConfig) -> Result<Vec<HexColor>> {
    Ok(dominant_clusters(image, config)?
        .iter()
        .map(Cluster::hex)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn is_hex_color(s: &str) -> bool {
        s.len() == 7
            && s.starts_with('#')
            && s[1..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }

    fn close_to(color: HexColor, expected: [u8; 3], tolerance: i16) -> bool {
        color
            .channels()
            .iter()
            .zip(expected)
            .all(|(&a, b)| (a as i16 - b as i16).abs() <= tolerance)
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        })
    }

    #[test]
    fn test_hex_formatting() {
        assert_eq!(HexColor([255, 0, 16]).to_string(), "#ff0010");
        assert_eq!(HexColor([0, 0, 0]).to_string(), "#000000");
        assert_eq!(
            serde_json::to_string(&HexColor([171, 205, 239])).unwrap(),
            "\"#abcdef\""
        );
    }

    #[test]
    fn test_centroid_rounding_and_clamping() {
        let near = Srgb::new(12.6 / 255.0, 12.4 / 255.0, 0.7 / 255.0);
        assert_eq!(HexColor::from_centroid(&near).0, [13, 12, 1]);
        let outside = Srgb::new(-0.01, 255.7 / 255.0, 1.2);
        assert_eq!(HexColor::from_centroid(&outside).0, [0, 255, 255]);
    }

    #[test]
    fn test_returns_requested_count() {
        let image = gradient(64, 48);
        for n_colors in 1..=5 {
            let config = ColorConfig {
                n_colors,
                ..Default::default()
            };
            let colors = extract_dominant_colors(&image, &config).unwrap();
            assert_eq!(colors.len(), n_colors);
            assert!(colors.iter().all(|c| is_hex_color(&c.to_string())));
        }
    }

    #[test]
    fn test_clusters_sorted_by_size() {
        let image = gradient(320, 200);
        let config = ColorConfig {
            n_colors: 4,
            ..Default::default()
        };
        let clusters = dominant_clusters(&image, &config).unwrap();

        assert_eq!(clusters.len(), 4);
        assert!(clusters.windows(2).all(|w| w[0].size >= w[1].size));
        let total: usize = clusters.iter().map(|c| c.size).sum();
        assert_eq!(total, 150 * 150);
    }

    #[test]
    fn test_solid_color() {
        let image = RgbImage::from_pixel(400, 300, Rgb([200, 30, 90]));
        let config = ColorConfig {
            n_colors: 1,
            ..Default::default()
        };
        let colors = extract_dominant_colors(&image, &config).unwrap();

        assert_eq!(colors.len(), 1);
        assert!(close_to(colors[0], [200, 30, 90], 1));
    }

    #[test]
    fn test_two_equal_regions() {
        let red = [220u8, 20, 20];
        let blue = [20u8, 40, 210];
        let image = RgbImage::from_fn(300, 300, |x, _| if x < 150 { Rgb(red) } else { Rgb(blue) });
        let config = ColorConfig {
            n_colors: 2,
            ..Default::default()
        };
        let colors = extract_dominant_colors(&image, &config).unwrap();

        assert_eq!(colors.len(), 2);
        let in_order = close_to(colors[0], red, 2) && close_to(colors[1], blue, 2);
        let swapped = close_to(colors[0], blue, 2) && close_to(colors[1], red, 2);
        assert!(in_order || swapped, "unexpected colors {colors:?}");
    }

    #[test]
    fn test_majority_color_first() {
        let image = RgbImage::from_fn(300, 300, |x, _| {
            if x < 200 {
                Rgb([10, 200, 10])
            } else {
                Rgb([250, 250, 250])
            }
        });
        let config = ColorConfig {
            n_colors: 2,
            ..Default::default()
        };
        let colors = extract_dominant_colors(&image, &config).unwrap();

        assert!(close_to(colors[0], [10, 200, 10], 2));
        assert!(close_to(colors[1], [250, 250, 250], 2));
    }

    #[test]
    fn test_more_colors_than_distinct() {
        let image = RgbImage::from_pixel(50, 50, Rgb([40, 40, 40]));
        let config = ColorConfig {
            n_colors: 3,
            ..Default::default()
        };
        let colors = extract_dominant_colors(&image, &config).unwrap();

        // extra clusters may be degenerate; the dominant one is the solid color
        assert_eq!(colors.len(), 3);
        assert!(close_to(colors[0], [40, 40, 40], 1));
        assert!(colors.iter().all(|c| is_hex_color(&c.to_string())));
    }

    #[test]
    fn test_small_image_is_upsampled() {
        let image = RgbImage::from_pixel(10, 7, Rgb([1, 2, 3]));
        let resized = downsample(&image, &ColorConfig::default()).unwrap();
        assert_eq!(resized.dimensions(), (150, 150));
        let center = HexColor(resized.get_pixel(75, 75).0);
        assert!(close_to(center, [1, 2, 3], 1));
    }

    #[test]
    fn test_invalid_requests() {
        let image = gradient(32, 32);

        let zero = ColorConfig {
            n_colors: 0,
            ..Default::default()
        };
        assert!(matches!(
            extract_dominant_colors(&image, &zero),
            Err(FabricError::InvalidClusteringRequest(_))
        ));

        let too_many = ColorConfig {
            n_colors: 5,
            sample_width: 2,
            sample_height: 2,
            ..Default::default()
        };
        assert!(matches!(
            extract_dominant_colors(&image, &too_many),
            Err(FabricError::InvalidClusteringRequest(_))
        ));

        let no_samples = ColorConfig {
            sample_width: 0,
            ..Default::default()
        };
        assert!(matches!(
            extract_dominant_colors(&image, &no_samples),
            Err(FabricError::InvalidClusteringRequest(_))
        ));

        let beyond_index_range = ColorConfig {
            n_colors: MAX_COLORS + 1,
            ..Default::default()
        };
        assert!(matches!(
            extract_dominant_colors(&image, &beyond_index_range),
            Err(FabricError::InvalidClusteringRequest(_))
        ));

        let no_runs = ColorConfig {
            n_init: 0,
            ..Default::default()
        };
        assert!(matches!(
            extract_dominant_colors(&image, &no_runs),
            Err(FabricError::InvalidClusteringRequest(_))
        ));
    }
}
