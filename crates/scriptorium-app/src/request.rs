// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// Token identifying one issued fetch. Controllers accept a result only when
/// its token matches the one they are waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic source of [`RequestId`]s, shared by every controller on a screen
/// stack so ids never repeat across mounts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestCounter {
    last: u64,
}

impl RequestCounter {
    pub fn issue(&mut self) -> RequestId {
        self.last = self.last.saturating_add(1);
        RequestId(self.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    Stale,
}

#[cfg(test)]
mod tests {
    use super::RequestCounter;

    #[test]
    fn issued_ids_are_strictly_increasing() {
        let mut counter = RequestCounter::default();
        let first = counter.issue();
        let second = counter.issue();
        assert!(second > first);
        assert_eq!(first.get(), 1);
    }
}
