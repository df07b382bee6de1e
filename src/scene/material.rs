//! Metal/rough material

/// Surface parameters edited from the parameter panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// 0 = dielectric, 1 = metal
    pub metalness: f32,
    /// 0 = mirror, 1 = fully diffuse
    pub roughness: f32,
    /// Base color, linear RGB
    pub color: [f32; 3],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metalness: 1.0,
            roughness: 0.5,
            color: [1.0, 1.0, 1.0],
        }
    }
}

impl Material {
    /// Polished white metal
    pub fn chrome() -> Self {
        Self {
            metalness: 1.0,
            roughness: 0.05,
            color: [1.0, 1.0, 1.0],
        }
    }

    /// Brushed gold
    pub fn gold() -> Self {
        Self {
            metalness: 1.0,
            roughness: 0.35,
            color: [1.0, 0.766, 0.336],
        }
    }
}
