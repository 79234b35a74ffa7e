/// ESM filter kernel derivation.
///
/// Pure functions of a caster's filtering settings: identical inputs give
/// bit-identical kernels, and nothing is cached between calls.

use std::f64::consts::PI;
use super::descriptor::ProjectedShadowDescriptor;

/// Portion of the Gaussian (in standard deviations) kept on each side
pub const RELIABLE_SECTION_FACTOR: f32 = 2.5;
/// Longest half-kernel emitted, in texels
pub const MAX_KERNEL_HALF_WIDTH: usize = 64;

/// Settings the kernel depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterInputs {
    pub field_of_view_y: f32,
    pub softening_boundary_width: f32,
    /// Shadow map width in texels
    pub shadowmap_size: u32,
    pub prediction_sample_count: u16,
    pub filtering_sample_count: u16,
}

impl FilterInputs {
    pub fn from_descriptor(desc: &ProjectedShadowDescriptor) -> Self {
        Self {
            field_of_view_y: desc.field_of_view_y,
            softening_boundary_width: desc.softening_boundary_width,
            shadowmap_size: desc.shadowmap_max_resolution.texels(),
            prediction_sample_count: desc.prediction_sample_count,
            filtering_sample_count: desc.filtering_sample_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    /// Gaussian standard deviation in texels
    pub standard_deviation: f32,
    /// Half-kernel weights, center first; `w[0] + 2 * sum(w[1..]) == 1`
    pub weights: Vec<f32>,
    /// Unit-disk offsets used by the blocker prediction step
    pub prediction_offsets: Vec<[f32; 2]>,
    /// Unit-disk offsets used by the filtering step
    pub filtering_offsets: Vec<[f32; 2]>,
}

pub fn derive_filter_kernel(inputs: &FilterInputs) -> FilterKernel {
    let standard_deviation = standard_deviation(inputs);
    FilterKernel {
        standard_deviation,
        weights: gaussian_half_kernel(standard_deviation),
        prediction_offsets: vogel_disk(inputs.prediction_sample_count as usize),
        filtering_offsets: vogel_disk(inputs.filtering_sample_count as usize),
    }
}

/// Softened boundary width converted to texels, over both reliable sides
fn standard_deviation(inputs: &FilterInputs) -> f32 {
    let width_in_texels = inputs.softening_boundary_width / inputs.field_of_view_y
        * inputs.shadowmap_size as f32;
    let sigma = width_in_texels / (2.0 * RELIABLE_SECTION_FACTOR);
    if sigma.is_finite() && sigma > 0.0 { sigma } else { 0.0 }
}

fn gaussian_half_kernel(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let half_width = ((sigma * RELIABLE_SECTION_FACTOR).ceil() as usize).clamp(1, MAX_KERNEL_HALF_WIDTH);

    let sigma = sigma as f64;
    let raw: Vec<f64> = (0..=half_width)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total = raw[0] + 2.0 * raw[1..].iter().sum::<f64>();

    raw.iter().map(|w| (w / total) as f32).collect()
}

/// Golden-angle spiral, evenly covering the unit disk
fn vogel_disk(count: usize) -> Vec<[f32; 2]> {
    let golden_angle = PI * (3.0 - 5f64.sqrt());
    (0..count)
        .map(|i| {
            let radius = ((i as f64 + 0.5) / count as f64).sqrt();
            let theta = i as f64 * golden_angle;
            [(radius * theta.cos()) as f32, (radius * theta.sin()) as f32]
        })
        .collect()
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
