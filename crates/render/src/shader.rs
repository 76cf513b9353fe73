use glam::Vec2;
use serde::{Deserialize, Serialize};
use softraster_common::{NodeId, grayscale, lerp_argb};
use softraster_raster::Fragment;

const PALETTE: [u32; 6] = [
    0xFFE0_6C4C,
    0xFF4C_A0E0,
    0xFF6C_C86C,
    0xFFE0_C04C,
    0xFFB0_6CE0,
    0xFF4C_D0C8,
];

// Corner colors of the UV ramp, indexed by (u, v).
const UV_00: u32 = 0xFF20_2080;
const UV_10: u32 = 0xFFF0_4040;
const UV_01: u32 = 0xFF40_F040;
const UV_11: u32 = 0xFFF0_F040;

/// Built-in per-pixel color functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shader {
    /// One solid color per node, cycling through a fixed palette.
    #[default]
    Flat,
    /// Depth-buffer value as gray, nearer is brighter.
    Depth,
    /// Bilinear color ramp over the interpolated texture coordinates.
    UvGradient,
}

impl Shader {
    pub fn shade(self, node: NodeId, fragment: &Fragment<'_, Vec2>) -> u32 {
        match self {
            Shader::Flat => PALETTE[node.index() % PALETTE.len()],
            Shader::Depth => grayscale(1.0 - fragment.depth()),
            Shader::UvGradient => {
                let uv = fragment.interpolate(|uv: &Vec2| *uv);
                let top = lerp_argb(UV_00, UV_10, uv.x);
                let bottom = lerp_argb(UV_01, UV_11, uv.x);
                lerp_argb(top, bottom, uv.y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use softraster_common::argb;

    use super::*;

    fn fragment<'a>(uvs: [&'a Vec2; 3], weights: Vec3, depth: f32) -> Fragment<'a, Vec2> {
        Fragment {
            x: 0,
            y: 0,
            weights,
            depths: [depth; 4],
            attributes: uvs,
        }
    }

    #[test]
    fn flat_cycles_palette_per_node() {
        let uv = Vec2::ZERO;
        let f = fragment([&uv; 3], Vec3::X, 0.5);
        assert_eq!(Shader::Flat.shade(NodeId(0), &f), PALETTE[0]);
        assert_eq!(Shader::Flat.shade(NodeId(7), &f), PALETTE[1]);
    }

    #[test]
    fn depth_is_brighter_when_nearer() {
        let uv = Vec2::ZERO;
        let near = Shader::Depth.shade(NodeId(0), &fragment([&uv; 3], Vec3::X, 0.1));
        let far = Shader::Depth.shade(NodeId(0), &fragment([&uv; 3], Vec3::X, 0.9));
        assert!((near & 0xFF) > (far & 0xFF));
    }

    #[test]
    fn uv_gradient_hits_corner_colors() {
        let (a, b, c) = (Vec2::ZERO, Vec2::X, Vec2::ONE);
        let at = |w: Vec3| Shader::UvGradient.shade(NodeId(0), &fragment([&a, &b, &c], w, 0.5));
        assert_eq!(at(Vec3::X), argb(0xFF, 0x20, 0x20, 0x80));
        assert_eq!(at(Vec3::Y), argb(0xFF, 0xF0, 0x40, 0x40));
        assert_eq!(at(Vec3::Z), argb(0xFF, 0xF0, 0xF0, 0x40));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&Shader::UvGradient).unwrap();
        assert_eq!(json, "\"uv_gradient\"");
    }
}
