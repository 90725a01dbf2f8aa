// Projection matrices in a backend's native clip space
//
// Matrices are column-major: `m[c][r]` is column `c`, row `r`, as in `Mat4::to_cols_array_2d`.

use glam::Mat4;

/// Where normalized device coordinates put their origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipOrigin {
    UpperLeft,
    LowerLeft,
}

/// Depth range of normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthRange {
    ZeroToOne,
    NegativeOneToOne,
}

/// The clip-space convention of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipDirection {
    pub origin: ClipOrigin,
    pub depth: DepthRange,
}

impl ClipDirection {
    /// Explicit APIs, and GL with clip control.
    pub const TOP_DOWN: Self = Self {
        origin: ClipOrigin::UpperLeft,
        depth: DepthRange::ZeroToOne,
    };

    /// Legacy GL convention.
    pub const BOTTOM_UP: Self = Self {
        origin: ClipOrigin::LowerLeft,
        depth: DepthRange::NegativeOneToOne,
    };
}

pub fn frustum(
    clip: ClipDirection,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    z_near: f32,
    z_far: f32,
) -> Mat4 {
    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = (2.0 * z_near) / (right - left);
    m[1][1] = (2.0 * z_near) / (top - bottom);
    m[2][0] = (right + left) / (right - left);
    m[2][1] = (top + bottom) / (top - bottom);
    m[2][3] = -1.0;

    match clip.depth {
        DepthRange::ZeroToOne => {
            m[2][2] = z_far / (z_near - z_far);
            m[3][2] = -(z_far * z_near) / (z_far - z_near);
        }
        DepthRange::NegativeOneToOne => {
            m[2][2] = -(z_far + z_near) / (z_far - z_near);
            m[3][2] = -(2.0 * z_far * z_near) / (z_far - z_near);
        }
    }

    Mat4::from_cols_array_2d(&m)
}

/// `fovy` is the vertical aperture in radians.
pub fn perspective(clip: ClipDirection, fovy: f32, aspect: f32, z_near: f32, z_far: f32) -> Mat4 {
    let tan_half_fovy = (fovy / 2.0).tan();

    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = 1.0 / (aspect * tan_half_fovy);
    m[1][1] = 1.0 / tan_half_fovy;
    m[2][3] = -1.0;

    match clip.depth {
        DepthRange::ZeroToOne => {
            m[2][2] = z_far / (z_near - z_far);
            m[3][2] = -(z_far * z_near) / (z_far - z_near);
        }
        DepthRange::NegativeOneToOne => {
            m[2][2] = -(z_far + z_near) / (z_far - z_near);
            m[3][2] = -(2.0 * z_far * z_near) / (z_far - z_near);
        }
    }

    Mat4::from_cols_array_2d(&m)
}

pub fn ortho(
    clip: ClipDirection,
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    z_near: f32,
    z_far: f32,
) -> Mat4 {
    let mut m = Mat4::IDENTITY.to_cols_array_2d();
    m[0][0] = 2.0 / (right - left);
    m[1][1] = 2.0 / (top - bottom);
    m[3][0] = -(right + left) / (right - left);
    m[3][1] = -(top + bottom) / (top - bottom);

    match clip.depth {
        DepthRange::ZeroToOne => {
            m[2][2] = -1.0 / (z_far - z_near);
            m[3][2] = -z_near / (z_far - z_near);
        }
        DepthRange::NegativeOneToOne => {
            m[2][2] = -2.0 / (z_far - z_near);
            m[3][2] = -(z_far + z_near) / (z_far - z_near);
        }
    }

    Mat4::from_cols_array_2d(&m)
}

/// Perspective projection without far plane clipping.
///
/// This is the `z_far -> inf` limit of the negative-one-to-one perspective, whatever the clip
/// direction: `m[2][2] = -1`, `m[2][3] = -1`, `m[3][2] = -2 * z_near`.
pub fn infinite_perspective(fovy: f32, aspect: f32, z_near: f32) -> Mat4 {
    let range = (fovy / 2.0).tan() * z_near;
    let left = -range * aspect;
    let right = range * aspect;
    let bottom = -range;
    let top = range;

    let mut m = [[0.0f32; 4]; 4];
    m[0][0] = (2.0 * z_near) / (right - left);
    m[1][1] = (2.0 * z_near) / (top - bottom);
    m[2][2] = -1.0;
    m[2][3] = -1.0;
    m[3][2] = -2.0 * z_near;
    Mat4::from_cols_array_2d(&m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_3;

    #[test]
    fn infinite_perspective_is_the_far_plane_limit() {
        let (fovy, aspect, z_near) = (FRAC_PI_3, 16.0 / 9.0, 0.1);
        let infinite = infinite_perspective(fovy, aspect, z_near).to_cols_array_2d();
        let finite = perspective(ClipDirection::BOTTOM_UP, fovy, aspect, z_near, 1.0e7)
            .to_cols_array_2d();

        assert_eq!(infinite[2][2], -1.0);
        assert_eq!(infinite[2][3], -1.0);
        assert_relative_eq!(infinite[3][2], -2.0 * z_near);
        assert_relative_eq!(infinite[0][0], finite[0][0], max_relative = 1.0e-5);
        assert_relative_eq!(infinite[1][1], finite[1][1], max_relative = 1.0e-5);
        assert_relative_eq!(infinite[2][2], finite[2][2], max_relative = 1.0e-5);
        assert_relative_eq!(infinite[3][2], finite[3][2], max_relative = 1.0e-4);
    }

    #[test]
    fn zero_to_one_perspective_maps_near_and_far() {
        let m = perspective(ClipDirection::TOP_DOWN, FRAC_PI_3, 1.0, 1.0, 100.0);
        let near = m * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = m * glam::Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1.0e-6);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn negative_one_to_one_ortho_maps_near_and_far() {
        let m = ortho(ClipDirection::BOTTOM_UP, -1.0, 1.0, -1.0, 1.0, 1.0, 10.0);
        let near = m * glam::Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = m * glam::Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert_relative_eq!(near.z, -1.0, epsilon = 1.0e-6);
        assert_relative_eq!(far.z, 1.0, epsilon = 1.0e-6);
    }

    #[test]
    fn symmetric_frustum_matches_perspective() {
        let (fovy, aspect, z_near, z_far) = (FRAC_PI_3, 2.0, 0.5, 50.0);
        let top = (fovy / 2.0).tan() * z_near;
        let right = top * aspect;
        let f = frustum(ClipDirection::TOP_DOWN, -right, right, -top, top, z_near, z_far);
        let p = perspective(ClipDirection::TOP_DOWN, fovy, aspect, z_near, z_far);
        for (a, b) in f.to_cols_array().iter().zip(p.to_cols_array().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1.0e-5);
        }
    }
}
