use glam::{IVec2, Mat4, Vec3};

/// 2D vector used by the collision kernel and the 2D views of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Drops the z component of a 3D vector.
    pub fn from_xy(v: Vec3) -> Self {
        Self { x: v.x, y: v.y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction, or `ZERO` for a zero-length vector.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y
    }

    pub fn distance(self, rhs: Self) -> f32 {
        (self - rhs).length()
    }

    /// Swaps the components. Used to derive a tangent from an axis-aligned normal.
    pub fn swapped(self) -> Self {
        Self::new(self.y, self.x)
    }

    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    pub fn min(self, rhs: Self) -> Self {
        Self::new(self.x.min(rhs.x), self.y.min(rhs.y))
    }

    pub fn max(self, rhs: Self) -> Self {
        Self::new(self.x.max(rhs.x), self.y.max(rhs.y))
    }

    /// Largest of the two components.
    pub fn max_element(self) -> f32 {
        self.x.max(self.y)
    }

    /// Lifts the vector back into 3D with the given z.
    pub fn extend(self, z: f32) -> Vec3 {
        Vec3::new(self.x, self.y, z)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Mul<Vec2> for f32 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2::new(self * rhs.x, self * rhs.y)
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Experimental 3D placement of an actor. Only the rendering capability reads it;
/// the 2D simulation never consults it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    /// Takes the actor from local space to world space.
    pub transform: Mat4,
    /// Extra local-space transform applied before `transform`.
    pub local: Mat4,
    /// Local-space bounding box, not rotated.
    pub bbox_min: Vec3,
    pub bbox_max: Vec3,
}

impl Transform3D {
    pub fn world_matrix(&self) -> Mat4 {
        self.transform * self.local
    }

    /// Local origin expressed in world space (translation column of the world matrix).
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix().w_axis.truncate()
    }

    pub fn world_bbox_min(&self) -> Vec3 {
        self.world_position() + self.bbox_min
    }

    pub fn world_bbox_max(&self) -> Vec3 {
        self.world_position() + self.bbox_max
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            local: Mat4::IDENTITY,
            bbox_min: Vec3::ZERO,
            bbox_max: Vec3::ZERO,
        }
    }
}

/// World units to pixel coordinates: scale by the tile size, then shift by the camera offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelTransform {
    pub tile_size: IVec2,
    pub offset: IVec2,
}

impl PixelTransform {
    pub fn new(tile_w: i32, tile_h: i32) -> Self {
        Self {
            tile_size: IVec2::new(tile_w, tile_h),
            offset: IVec2::ZERO,
        }
    }

    #[must_use]
    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset = offset;
        self
    }

    /// Pixel size of a world-space extent, without the camera offset.
    pub fn scale(&self, v: Vec2) -> IVec2 {
        IVec2::new(
            (v.x * self.tile_size.x as f32) as i32,
            (v.y * self.tile_size.y as f32) as i32,
        )
    }

    pub fn world_to_pixel(&self, p: Vec2) -> IVec2 {
        self.scale(p) + self.offset
    }

    pub fn pixel_to_world(&self, p: IVec2) -> Vec2 {
        let local = p - self.offset;
        Vec2::new(
            local.x as f32 / self.tile_size.x.max(1) as f32,
            local.y as f32 / self.tile_size.y.max(1) as f32,
        )
    }
}

impl Default for PixelTransform {
    fn default() -> Self {
        Self::new(32, 32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_zero_vector_stays_zero() {
        let n = Vec2::ZERO.normalized();
        assert_eq!(n, Vec2::ZERO);
        assert!(!n.x.is_nan() && !n.y.is_nan());
    }

    #[test]
    fn test_normalized_has_unit_length() {
        let n = Vec2::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_world_position_reads_translation() {
        let t = Transform3D {
            transform: Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            local: Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0)),
            bbox_min: Vec3::splat(-1.0),
            bbox_max: Vec3::splat(1.0),
        };
        assert_eq!(t.world_position(), Vec3::new(1.5, 2.0, 3.0));
        assert_eq!(t.world_bbox_min(), Vec3::new(0.5, 1.0, 2.0));
        assert_eq!(t.world_bbox_max(), Vec3::new(2.5, 3.0, 4.0));
    }

    #[test]
    fn test_pixel_transform_round_trip_on_tile_corners() {
        let t = PixelTransform::new(32, 16).with_offset(IVec2::new(-10, 5));
        let px = t.world_to_pixel(Vec2::new(2.0, 3.0));
        assert_eq!(px, IVec2::new(54, 53));
        assert_eq!(t.pixel_to_world(px), Vec2::new(2.0, 3.0));
    }
}
