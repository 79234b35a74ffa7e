/// Shadowmap atlas placement.
///
/// Every caster with a shadow map gets a square region in a texture
/// array. Each slice is as large as the biggest request. Regions are
/// power-of-two squares packed largest first along a Morton (Z-order)
/// curve, which tiles a slice without gaps.

/// Region of the atlas owned by one caster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtlasSlot {
    pub array_slice: u32,
    /// Top-left texel inside the slice
    pub origin: [u32; 2],
    /// Width = height in texels
    pub size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowmapAtlas {
    slice_size: u32,
    slice_count: u32,
    /// Indexed by dense caster index
    slots: Vec<Option<AtlasSlot>>,
}

impl ShadowmapAtlas {
    /// Place shadow maps of the given sizes (dense order, 0 = no shadow map)
    ///
    /// Sizes must be powers of two.
    pub fn pack(sizes: &[u32]) -> Self {
        let slice_size = sizes.iter().copied().max().unwrap_or(0);
        let mut slots = vec![None; sizes.len()];
        if slice_size == 0 {
            return Self { slice_size: 0, slice_count: 0, slots };
        }

        // Largest first; ties keep dense order
        let mut order: Vec<usize> = (0..sizes.len()).filter(|&i| sizes[i] > 0).collect();
        order.sort_by(|&a, &b| sizes[b].cmp(&sizes[a]));

        let slice_area = slice_size as u64 * slice_size as u64;
        let mut array_slice = 0u32;
        let mut used_area = 0u64;

        for index in order {
            let size = sizes[index];
            let area = size as u64 * size as u64;
            if used_area + area > slice_area {
                array_slice += 1;
                used_area = 0;
            }
            // Earlier squares are at least as large, so used_area is a multiple of area
            let (x, y) = morton_decode(used_area / area);
            slots[index] = Some(AtlasSlot {
                array_slice,
                origin: [x * size, y * size],
                size,
            });
            used_area += area;
        }

        Self { slice_size, slice_count: array_slice + 1, slots }
    }

    /// Width = height of every slice
    pub fn slice_size(&self) -> u32 {
        self.slice_size
    }

    pub fn slice_count(&self) -> u32 {
        self.slice_count
    }

    /// Region of the caster at dense `index`, if it has a shadow map
    pub fn slot(&self, index: u32) -> Option<&AtlasSlot> {
        self.slots.get(index as usize).and_then(|slot| slot.as_ref())
    }
}

fn morton_decode(code: u64) -> (u32, u32) {
    (compact_bits(code), compact_bits(code >> 1))
}

/// Keep the even bits of `value`, packed together
fn compact_bits(value: u64) -> u32 {
    let mut x = value & 0x5555_5555_5555_5555;
    x = (x | (x >> 1)) & 0x3333_3333_3333_3333;
    x = (x | (x >> 2)) & 0x0f0f_0f0f_0f0f_0f0f;
    x = (x | (x >> 4)) & 0x00ff_00ff_00ff_00ff;
    x = (x | (x >> 8)) & 0x0000_ffff_0000_ffff;
    x = (x | (x >> 16)) & 0x0000_0000_ffff_ffff;
    x as u32
}

#[cfg(test)]
#[path = "atlas_tests.rs"]
mod tests;
