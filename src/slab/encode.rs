//! Slab voxel serialization: body ids as little-endian `u64`s in the tile's
//! local (z, y, x) order.

use crate::layer::Layer;

use super::SlabBounds;

/// Bytes per serialized body id.
pub const BYTES_PER_VOXEL: usize = 8;

/// Serialize the voxels of `bounds` from `layer` (slot 0 = `bounds.oz`).
pub fn encode_slab(layer: &Layer, bounds: &SlabBounds) -> Vec<u8> {
    let mut out = Vec::with_capacity(bounds.voxel_count() * BYTES_PER_VOXEL);
    let (x0, x1) = (bounds.ox as usize, (bounds.ox + bounds.nx) as usize);
    for slot in 0..bounds.nz {
        for y in bounds.oy..bounds.oy + bounds.ny {
            for body in &layer.row(y, slot)[x0..x1] {
                out.extend_from_slice(&body.to_le_bytes());
            }
        }
    }
    out
}

/// Inverse of [`encode_slab`]. Returns `None` if the length is not a whole
/// number of body ids.
pub fn decode_bodies(bytes: &[u8]) -> Option<Vec<u64>> {
    if bytes.len() % BYTES_PER_VOXEL != 0 {
        return None;
    }
    Some(
        bytes
            .chunks_exact(BYTES_PER_VOXEL)
            .map(|chunk| {
                let mut word = [0u8; BYTES_PER_VOXEL];
                word.copy_from_slice(chunk);
                u64::from_le_bytes(word)
            })
            .collect(),
    )
}
