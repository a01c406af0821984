use std::fmt;

/// Address of one engine timer. Ids are handed out once per process run and
/// never recycled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u32);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open block of timer ids `[start, start + count)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TimerRange {
    start: TimerId,
    count: u32,
}

impl TimerRange {
    pub const fn new(start: TimerId, count: u32) -> Self {
        assert!(
            start.0.checked_add(count).is_some(),
            "timer range overflows the timer id space"
        );
        Self { start, count }
    }

    pub const fn start(&self) -> TimerId {
        self.start
    }

    pub const fn count(&self) -> u32 {
        self.count
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// One past the last id of the range.
    pub const fn end(&self) -> u32 {
        self.start.0 + self.count
    }

    pub const fn contains(&self, id: TimerId) -> bool {
        id.0 >= self.start.0 && id.0 < self.end()
    }

    /// Id of the `index`-th instance owning this range.
    pub const fn id_at(&self, index: u32) -> Option<TimerId> {
        if index < self.count {
            Some(TimerId(self.start.0 + index))
        } else {
            None
        }
    }

    pub const fn overlaps(&self, other: &TimerRange) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.start.0 < other.end() && other.start.0 < self.end()
    }

    pub fn iter(&self) -> impl Iterator<Item = TimerId> {
        (self.start.0..self.end()).map(TimerId)
    }
}

/// Carves consecutive ranges out of a flat timer id space.
///
/// Each allocation starts where the previous one ended, so the ranges of one
/// allocator never overlap and the whole layout is a pure function of the
/// requested counts. The methods are `const` so a game can evaluate its
/// complete layout at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerIdAllocator {
    next: u32,
}

impl TimerIdAllocator {
    pub const fn new(base: TimerId) -> Self {
        Self { next: base.0 }
    }

    pub const fn allocate(&mut self, count: u32) -> TimerRange {
        let range = TimerRange::new(TimerId(self.next), count);
        self.next = range.end();
        range
    }

    pub const fn allocate_one(&mut self) -> TimerId {
        self.allocate(1).start()
    }

    pub const fn next_free(&self) -> TimerId {
        TimerId(self.next)
    }
}

impl Default for TimerIdAllocator {
    fn default() -> Self {
        Self::new(TimerId(0))
    }
}

/// Allocates one range per `(kind, count)` request, in request order.
pub fn allocate_ranges<K: Copy>(base: TimerId, requests: &[(K, u32)]) -> Vec<(K, TimerRange)> {
    let mut allocator = TimerIdAllocator::new(base);
    requests
        .iter()
        .map(|&(kind, count)| (kind, allocator.allocate(count)))
        .collect()
}

pub const fn ranges_are_disjoint(ranges: &[TimerRange]) -> bool {
    let mut i = 0;
    while i < ranges.len() {
        let mut j = i + 1;
        while j < ranges.len() {
            if ranges[i].overlaps(&ranges[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}
