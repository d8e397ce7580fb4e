/// A half-open range of addresses, `[base, base + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AddressRange {
    pub base: u64,
    pub size: u64,
}

impl AddressRange {
    pub fn new(base: u64, size: u64) -> Self {
        Self { base, size }
    }

    /// One past the last address, saturating at the top of the address space.
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Works for ranges that end right at the top of the address space,
    /// where `end()` can't be represented.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr - self.base < self.size
    }
}
