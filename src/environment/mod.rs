//! Image-based environment
//!
//! An [`EnvironmentMap`] is a decoded equirectangular HDR image together with a
//! box-filtered mip chain. Rougher surfaces sample blurrier levels.

pub mod loader;

pub use loader::{AssetLoader, EnvironmentSource, HttpSource, PendingLoad};

use crate::error::LoadError;

/// How the image is projected onto directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// Latitude/longitude image sampled by reflected view direction
    EquirectangularReflection,
}

/// One level of the mip chain, linear RGBA
#[derive(Debug, Clone)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[f32; 4]>,
}

impl MipLevel {
    fn texel(&self, x: u32, y: u32) -> [f32; 4] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// 2x2 box filter down to half size (odd edges clamp)
    fn downsample(&self) -> MipLevel {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut pixels = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            for x in 0..width {
                let mut sum = [0.0f32; 4];
                for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                    let t = self.texel(x * 2 + dx, y * 2 + dy);
                    for c in 0..4 {
                        sum[c] += t[c];
                    }
                }
                pixels.push(sum.map(|v| v * 0.25));
            }
        }

        MipLevel { width, height, pixels }
    }
}

/// Decoded environment image, ready for upload
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    pub mapping: Mapping,
    levels: Vec<MipLevel>,
}

impl EnvironmentMap {
    /// Builds the map from tightly packed RGBA32F pixels
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<f32>) -> Result<Self, LoadError> {
        if width == 0 || height == 0 || rgba.len() < (width * height * 4) as usize {
            return Err(LoadError::EmptyImage { width, height });
        }

        let pixels = rgba
            .chunks_exact(4)
            .take((width * height) as usize)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();

        Ok(Self::with_mips(MipLevel { width, height, pixels }))
    }

    /// Uniformly colored map
    pub fn solid(width: u32, height: u32, rgb: [f32; 3]) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let pixels = vec![[rgb[0], rgb[1], rgb[2], 1.0]; (width * height) as usize];
        Self::with_mips(MipLevel { width, height, pixels })
    }

    fn with_mips(base: MipLevel) -> Self {
        let mut levels = vec![base];
        while let Some(last) = levels.last() {
            if last.width == 1 && last.height == 1 {
                break;
            }
            let next = last.downsample();
            levels.push(next);
        }

        Self {
            mapping: Mapping::EquirectangularReflection,
            levels,
        }
    }

    pub fn width(&self) -> u32 {
        self.levels[0].width
    }

    pub fn height(&self) -> u32 {
        self.levels[0].height
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Level `index` as half floats, the GPU upload format
    pub fn level_as_f16(&self, index: usize) -> Vec<half::f16> {
        self.levels[index]
            .pixels
            .iter()
            .flat_map(|p| p.iter().map(|&c| half::f16::from_f32(c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mip_chain_halves_to_one() {
        let map = EnvironmentMap::solid(16, 8, [0.5, 0.5, 0.5]);
        let sizes: Vec<(u32, u32)> = map.levels().iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(sizes, vec![(16, 8), (8, 4), (4, 2), (2, 1), (1, 1)]);
        assert_eq!(map.mip_level_count(), 5);
    }

    #[test]
    fn test_downsample_averages() {
        let rgba = vec![
            0.0, 0.0, 0.0, 1.0, //
            4.0, 0.0, 0.0, 1.0, //
            0.0, 8.0, 0.0, 1.0, //
            0.0, 0.0, 12.0, 1.0,
        ];
        let map = EnvironmentMap::from_rgba(2, 2, rgba).unwrap();
        let top = &map.levels()[1];
        assert_eq!((top.width, top.height), (1, 1));
        assert_eq!(top.pixels[0], [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        assert!(matches!(
            EnvironmentMap::from_rgba(0, 4, Vec::new()),
            Err(LoadError::EmptyImage { width: 0, height: 4 })
        ));
        assert!(EnvironmentMap::from_rgba(2, 2, vec![1.0; 4]).is_err());
    }

    #[test]
    fn test_f16_level_length() {
        let map = EnvironmentMap::solid(4, 2, [1.0, 2.0, 3.0]);
        let level = map.level_as_f16(0);
        assert_eq!(level.len(), 4 * 2 * 4);
        assert_eq!(level[1].to_f32(), 2.0);
    }
}
