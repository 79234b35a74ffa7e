/// Projected shadow descriptor, enums and configuration.
///
/// A descriptor is the full CPU-side parameter set of one caster. The
/// processor clamps every value on the way in, so a stored descriptor is
/// always usable for view and filter derivation.

use glam::Mat4;

/// Smallest vertical field of view accepted (radians)
pub const MINIMUM_FIELD_OF_VIEW: f32 = 0.001;
/// Smallest near plane distance accepted
pub const MINIMUM_NEAR_PLANE: f32 = 0.001;
/// Upper bound on prediction samples per pixel
pub const MAX_PREDICTION_SAMPLE_COUNT: u16 = 16;
/// Upper bound on filtering samples per pixel
pub const MAX_FILTERING_SAMPLE_COUNT: u16 = 64;

// ===== SHADOWMAP SIZE =====

/// Resolution tier of a caster's shadow map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShadowmapSize {
    /// Caster renders no shadow map
    None,
    Size256,
    Size512,
    Size1024,
    Size2048,
}

impl ShadowmapSize {
    /// Width (= height) in texels, 0 for `None`
    pub fn texels(&self) -> u32 {
        match self {
            ShadowmapSize::None     => 0,
            ShadowmapSize::Size256  => 256,
            ShadowmapSize::Size512  => 512,
            ShadowmapSize::Size1024 => 1024,
            ShadowmapSize::Size2048 => 2048,
        }
    }
}

// ===== FILTER METHODS =====

/// How a caster's shadow map is filtered when sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ShadowFilterMethod {
    None = 0,
    Pcf = 1,
    Esm = 2,
    EsmPcf = 3,
}

impl ShadowFilterMethod {
    /// Whether the method needs the ESM convolution kernel
    pub fn uses_esm(&self) -> bool {
        matches!(self, ShadowFilterMethod::Esm | ShadowFilterMethod::EsmPcf)
    }
}

/// Percentage-closer filtering variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum PcfMethod {
    BoundarySearch = 0,
    Bicubic = 1,
}

// ===== DESCRIPTOR =====

/// Every tunable property of a projected shadow caster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedShadowDescriptor {
    /// Light-to-world transform; the light looks down its local -Z
    pub transform: Mat4,
    pub near_plane: f32,
    pub far_plane: f32,
    pub aspect_ratio: f32,
    /// Vertical field of view in radians
    pub field_of_view_y: f32,
    pub shadowmap_max_resolution: ShadowmapSize,
    pub filter_method: ShadowFilterMethod,
    pub pcf_method: PcfMethod,
    /// Width of the softened boundary, as an angle in radians
    pub softening_boundary_width: f32,
    pub prediction_sample_count: u16,
    pub filtering_sample_count: u16,
    /// Depth bias applied when comparing against the shadow map
    pub bias: f32,
}

impl Default for ProjectedShadowDescriptor {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            near_plane: 0.01,
            far_plane: 10000.0,
            aspect_ratio: 1.0,
            field_of_view_y: std::f32::consts::FRAC_PI_2,
            shadowmap_max_resolution: ShadowmapSize::Size1024,
            filter_method: ShadowFilterMethod::None,
            pcf_method: PcfMethod::BoundarySearch,
            softening_boundary_width: 0.0,
            prediction_sample_count: 4,
            filtering_sample_count: 16,
            bias: 0.1,
        }
    }
}

impl ProjectedShadowDescriptor {
    /// Copy of `self` with every field brought into its valid range
    pub fn clamped(mut self) -> Self {
        self.field_of_view_y = clamp_field_of_view(self.field_of_view_y);
        let (near, far) = clamp_near_far(self.near_plane, self.far_plane);
        self.near_plane = near;
        self.far_plane = far;
        self.aspect_ratio = clamp_aspect_ratio(self.aspect_ratio);
        self.softening_boundary_width = self.softening_boundary_width.max(0.0);
        self.prediction_sample_count = self.prediction_sample_count.min(MAX_PREDICTION_SAMPLE_COUNT);
        self.filtering_sample_count = self.filtering_sample_count.min(MAX_FILTERING_SAMPLE_COUNT);
        self
    }
}

pub(crate) fn clamp_field_of_view(fov: f32) -> f32 {
    if fov.is_nan() { MINIMUM_FIELD_OF_VIEW } else { fov.max(MINIMUM_FIELD_OF_VIEW) }
}

/// Near is pushed off zero, far is kept strictly beyond near
pub(crate) fn clamp_near_far(near: f32, far: f32) -> (f32, f32) {
    let near = if near.is_nan() { MINIMUM_NEAR_PLANE } else { near.max(MINIMUM_NEAR_PLANE) };
    let far = if far.is_nan() || far <= near { near * 2.0 } else { far };
    (near, far)
}

pub(crate) fn clamp_aspect_ratio(aspect: f32) -> f32 {
    if aspect.is_nan() || aspect <= 0.0 { 1.0 } else { aspect }
}

// ===== CONFIG =====

/// Processor-wide configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowConfig {
    /// Handle ceiling; GPU-side caster indices are 16-bit
    pub max_shadows: usize,
    /// Feed ESM filter passes when the pipelines carry them
    pub esm_enabled: bool,
    /// Initial GPU buffer capacity in elements
    pub initial_capacity: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            max_shadows: u16::MAX as usize,
            esm_enabled: true,
            initial_capacity: 16,
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
