/// First Z of the window of `depth` slices containing `z`.
#[inline]
pub const fn window_start(z: u32, depth: u32) -> u32 {
    (z / depth) * depth
}

/// Dense `nx × ny × depth` buffer of body ids, stored z-major then y then x.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    nx: u32,
    ny: u32,
    depth: u32,
    bodies: Vec<u64>,
}

impl Layer {
    /// Allocate a zeroed layer.
    pub fn new(nx: u32, ny: u32, depth: u32) -> Self {
        let len = nx as usize * ny as usize * depth as usize;
        Self {
            nx,
            ny,
            depth,
            bodies: vec![0; len],
        }
    }

    pub fn nx(&self) -> u32 {
        self.nx
    }

    pub fn ny(&self) -> u32 {
        self.ny
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    fn index(&self, x: u32, y: u32, slot: u32) -> usize {
        (slot as usize * self.ny as usize + y as usize) * self.nx as usize + x as usize
    }

    /// Body at `(x, y)` of depth slot `slot`.
    #[inline]
    pub fn get(&self, x: u32, y: u32, slot: u32) -> u64 {
        self.bodies[self.index(x, y, slot)]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, slot: u32, body: u64) {
        let index = self.index(x, y, slot);
        self.bodies[index] = body;
    }

    /// One `nx` run of bodies at row `y` of slot `slot`.
    #[inline]
    pub fn row(&self, y: u32, slot: u32) -> &[u64] {
        let start = self.index(0, y, slot);
        &self.bodies[start..start + self.nx as usize]
    }

    /// The `nx × ny` plane of slot `slot`, row-major.
    pub fn plane_mut(&mut self, slot: u32) -> &mut [u64] {
        let plane = self.nx as usize * self.ny as usize;
        let start = slot as usize * plane;
        &mut self.bodies[start..start + plane]
    }

    /// All bodies in (z, y, x) order.
    pub fn bodies(&self) -> &[u64] {
        &self.bodies
    }

    /// Zero the buffer in place, keeping its allocation.
    pub fn clear(&mut self) {
        self.bodies.fill(0);
    }
}
