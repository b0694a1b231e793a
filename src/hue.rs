use image::Rgba;

/// Rotates colors around the gray diagonal of the RGB cube.
///
/// The rotation operator is derived once from the angle (Rodrigues' formula
/// about the unit axis `(1,1,1)/√3`), so rotating a pixel is a 3x3 multiply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueRotator {
    angle: f32,
    matrix: [[f32; 3]; 3],
}

impl HueRotator {
    pub fn new(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        let k = 1.0 / 3f32.sqrt();
        let t = 1.0 - cos;

        // With a unit axis whose components are all equal, k·kᵀ is 1/3 everywhere.
        let diag = cos + t / 3.0;
        let plus = t / 3.0 + sin * k;
        let minus = t / 3.0 - sin * k;

        Self {
            angle,
            matrix: [
                [diag, minus, plus],
                [plus, diag, minus],
                [minus, plus, diag],
            ],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.angle == 0.0
    }

    /// Rotate an RGB triple. Each channel is clamped to `[0, 255]` before truncation.
    pub fn rotate(&self, rgb: [u8; 3]) -> [u8; 3] {
        if self.is_identity() {
            return rgb;
        }

        let v = rgb.map(f32::from);
        let m = &self.matrix;
        let channel = |row: &[f32; 3]| -> u8 {
            let c = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
            // NaN (from a non-finite angle) also lands on 0 here
            c.clamp(0.0, 255.0) as u8
        };

        [channel(&m[0]), channel(&m[1]), channel(&m[2])]
    }

    /// Rotate a pixel, passing alpha through unchanged
    pub fn rotate_rgba(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        let [r, g, b] = self.rotate([r, g, b]);
        Rgba([r, g, b, a])
    }
}

impl Default for HueRotator {
    fn default() -> Self {
        Self::new(0.0)
    }
}
