//! Fixed-capacity ring buffer backing the bounded display traces.

/// Circular buffer of `N` slots; pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct RingBuffer<T, const N: usize> {
    slots: Box<[T; N]>,
    head: usize,
    len: usize,
}

impl<T: Default + Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Default + Copy, const N: usize> RingBuffer<T, N> {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Box::new([T::default(); N]),
            head: 0,
            len: 0,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Appends `item`, returning the evicted entry when the buffer was full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = (self.len == N).then(|| self.slots[self.head]);
        self.slots[self.head] = item;
        self.head = (self.head + 1) % N;
        self.len = (self.len + 1).min(N);
        evicted
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Index 0 is the oldest entry.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let oldest = (self.head + N - self.len) % N;
        Some(&self.slots[(oldest + index) % N])
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Copies the contents out, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
