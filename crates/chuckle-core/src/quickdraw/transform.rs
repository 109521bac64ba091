use glam::{Affine2, Mat4, Vec4};

/// Model transform + projection with save/restore stacks.
///
/// The combined `projection * transform` matrix is computed on demand and
/// cached until either input changes.
#[derive(Debug, Clone)]
pub struct TransformState {
    transform: Mat4,
    projection: Mat4,
    transform_projection: Option<Mat4>,

    transform_stack: Vec<Mat4>,
    projection_stack: Vec<Mat4>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            transform_projection: None,
            transform_stack: Vec::new(),
            projection_stack: Vec::new(),
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    #[inline]
    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.transform_projection = None;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.transform_projection = None;
    }

    /// Right-multiplies the current transform: `transform = transform * m`.
    pub fn apply_transform(&mut self, m: Mat4) {
        self.transform *= m;
        self.transform_projection = None;
    }

    pub fn push_transform(&mut self) {
        self.transform_stack.push(self.transform);
    }

    /// Restores the transform saved by the matching [`push_transform`](Self::push_transform).
    ///
    /// # Panics
    /// Panics (debug only) if the stack is empty.
    pub fn pop_transform(&mut self) {
        debug_assert!(
            !self.transform_stack.is_empty(),
            "pop_transform called without matching push_transform"
        );
        match self.transform_stack.pop() {
            Some(m) => self.set_transform(m),
            None => log::warn!("pop_transform on empty stack ignored"),
        }
    }

    pub fn push_projection(&mut self) {
        self.projection_stack.push(self.projection);
    }

    /// Restores the projection saved by the matching [`push_projection`](Self::push_projection).
    ///
    /// # Panics
    /// Panics (debug only) if the stack is empty.
    pub fn pop_projection(&mut self) {
        debug_assert!(
            !self.projection_stack.is_empty(),
            "pop_projection called without matching push_projection"
        );
        match self.projection_stack.pop() {
            Some(m) => self.set_projection(m),
            None => log::warn!("pop_projection on empty stack ignored"),
        }
    }

    #[inline]
    pub fn transform_depth(&self) -> usize {
        self.transform_stack.len()
    }

    #[inline]
    pub fn projection_depth(&self) -> usize {
        self.projection_stack.len()
    }

    /// Returns `projection * transform`, recomputing only after a mutation.
    pub fn transform_projection(&mut self) -> Mat4 {
        *self
            .transform_projection
            .get_or_insert_with(|| self.projection * self.transform)
    }

    #[cfg(test)]
    pub(crate) fn is_cached(&self) -> bool {
        self.transform_projection.is_some()
    }
}

/// Embeds a 2D affine transform into a 4x4 matrix (z passes through).
pub fn affine2_to_mat4(a: Affine2) -> Mat4 {
    Mat4::from_cols(
        a.matrix2.x_axis.extend(0.0).extend(0.0),
        a.matrix2.y_axis.extend(0.0).extend(0.0),
        Vec4::Z,
        a.translation.extend(0.0).extend(1.0),
    )
}

/// Pixel-space orthographic projection: origin top-left, +Y down, depth in `[0, 1]`.
pub fn ortho_projection(width: f32, height: f32) -> Mat4 {
    Mat4::orthographic_rh(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0)
}
