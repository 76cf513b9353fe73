//! Packed `0xAARRGGBB` pixel helpers.

use glam::Vec4;

/// Pack four 8-bit channels into `0xAARRGGBB`.
#[inline]
pub fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split `0xAARRGGBB` into `[a, r, g, b]`.
#[inline]
pub fn unpack_argb(pixel: u32) -> [u8; 4] {
    [
        (pixel >> 24) as u8,
        (pixel >> 16) as u8,
        (pixel >> 8) as u8,
        pixel as u8,
    ]
}

/// Reorder `0xAARRGGBB` into the `[r, g, b, a]` byte order image encoders expect.
#[inline]
pub fn argb_to_rgba(pixel: u32) -> [u8; 4] {
    let [a, r, g, b] = unpack_argb(pixel);
    [r, g, b, a]
}

/// Opaque gray for an intensity in `[0, 1]` (clamped).
pub fn grayscale(intensity: f32) -> u32 {
    let v = (intensity.clamp(0.0, 1.0) * 255.0).round() as u8;
    argb(0xFF, v, v, v)
}

/// Per-channel linear blend between two packed colors.
pub fn lerp_argb(from: u32, to: u32, t: f32) -> u32 {
    let to_vec = |p: u32| {
        let [a, r, g, b] = unpack_argb(p);
        Vec4::new(a as f32, r as f32, g as f32, b as f32)
    };
    let mixed = to_vec(from).lerp(to_vec(to), t.clamp(0.0, 1.0)).round();
    argb(mixed.x as u8, mixed.y as u8, mixed.z as u8, mixed.w as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack() {
        let p = argb(0xFF, 0x12, 0x34, 0x56);
        assert_eq!(p, 0xFF12_3456);
        assert_eq!(unpack_argb(p), [0xFF, 0x12, 0x34, 0x56]);
        assert_eq!(argb_to_rgba(p), [0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn grayscale_clamps() {
        assert_eq!(grayscale(2.0), 0xFFFF_FFFF);
        assert_eq!(grayscale(-1.0), 0xFF00_0000);
    }

    #[test]
    fn lerp_endpoints() {
        let a = argb(0xFF, 0, 0, 0);
        let b = argb(0xFF, 200, 100, 50);
        assert_eq!(lerp_argb(a, b, 0.0), a);
        assert_eq!(lerp_argb(a, b, 1.0), b);
        assert_eq!(lerp_argb(a, b, 0.5), argb(0xFF, 100, 50, 25));
    }
}
