use std::ops::{Index, IndexMut};

use log::debug;

use crate::particle::Particle;

/// Number of records added to the free list whenever the pool runs dry.
pub const GROWTH_BATCH: usize = 16;

/// Handle to a particle record owned by a [`ParticlePool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub usize);

/// Arena of reusable particle records with a free list of slot indices.
///
/// Acquisition never fails: an empty free list grows by [`GROWTH_BATCH`] records before a fresh
/// one is handed out. Recycled handles must not be used again until reacquired.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    records: Vec<Particle>,
    free: Vec<usize>,
}

impl ParticlePool {
    /// Creates a pool with `capacity` free records. A capacity of `0` gives an empty pool that
    /// grows on first use.
    pub fn new(capacity: usize) -> Self {
        let mut pool = Self {
            records: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
        };
        pool.reserve_free(capacity);
        pool
    }

    fn reserve_free(&mut self, count: usize) {
        let start = self.records.len();
        self.records.resize(start + count, Particle::default());
        // Reversed so that `pop` hands out low slots first.
        self.free.extend((start..start + count).rev());
    }

    fn push_fresh(&mut self) -> ParticleId {
        let id = ParticleId(self.records.len());
        self.records.push(Particle::default());
        id
    }

    pub fn acquire(&mut self) -> ParticleId {
        if let Some(slot) = self.free.pop() {
            return ParticleId(slot);
        }

        self.reserve_free(GROWTH_BATCH);
        debug!("particle pool exhausted, grew to {} records", self.records.len() + 1);

        self.push_fresh()
    }

    pub fn recycle(&mut self, id: ParticleId) {
        self.free.push(id.0);
    }

    /// Number of records available without growing.
    #[inline(always)]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Total number of records, free or in use.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Index<ParticleId> for ParticlePool {
    type Output = Particle;

    #[inline(always)]
    fn index(&self, id: ParticleId) -> &Particle {
        &self.records[id.0]
    }
}

impl IndexMut<ParticleId> for ParticlePool {
    #[inline(always)]
    fn index_mut(&mut self, id: ParticleId) -> &mut Particle {
        &mut self.records[id.0]
    }
}
