/// Nominal slab size in voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabShape {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl SlabShape {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// One tile of a layer: minimum corner in absolute voxel coordinates plus
/// its (possibly clipped) size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlabBounds {
    pub ox: u32,
    pub oy: u32,
    pub oz: u32,
    pub nx: u32,
    pub ny: u32,
    pub nz: u32,
}

impl SlabBounds {
    pub fn voxel_count(&self) -> usize {
        self.nx as usize * self.ny as usize * self.nz as usize
    }
}

/// Partition an `nx × ny` layer starting at slice `z_start` into
/// non-overlapping slabs of at most `shape.x × shape.y` in-plane and the
/// full `depth`, in row-major tile order. Edge tiles are clipped.
pub fn tile_layer(
    nx: u32,
    ny: u32,
    depth: u32,
    z_start: u32,
    shape: SlabShape,
) -> impl Iterator<Item = SlabBounds> {
    let (step_x, step_y) = (shape.x.max(1), shape.y.max(1));
    (0..ny).step_by(step_y as usize).flat_map(move |oy| {
        (0..nx).step_by(step_x as usize).map(move |ox| SlabBounds {
            ox,
            oy,
            oz: z_start,
            nx: step_x.min(nx - ox),
            ny: step_y.min(ny - oy),
            nz: depth,
        })
    })
}
