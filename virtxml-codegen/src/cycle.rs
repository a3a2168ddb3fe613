//! Recursion tracking for the type-graph walk.

/// Separator between type names in a rendered cycle trace.
pub const TRACE_SEPARATOR: &str = " → ";

/// Stack of type names currently under analysis.
#[derive(Debug, Clone, Default)]
pub struct CycleGuard {
    stack: Vec<String>,
}

impl CycleGuard {
    /// Creates an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a type name on entry to its analysis.
    pub fn push(&mut self, name: impl Into<String>) {
        self.stack.push(name.into());
    }

    /// Pops the innermost type name on exit from its analysis.
    pub fn pop(&mut self) -> Option<String> {
        self.stack.pop()
    }

    /// Returns true if the type is currently under analysis.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.stack.iter().any(|n| n == name)
    }

    /// Renders the path from the first occurrence of `target` to the top of
    /// the stack, closed by `target` again.
    ///
    /// Returns `target` alone when it is not on the stack.
    #[must_use]
    pub fn trace(&self, target: &str) -> String {
        let start = self
            .stack
            .iter()
            .position(|n| n == target)
            .unwrap_or(self.stack.len());

        self.stack[start..]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target))
            .collect::<Vec<_>>()
            .join(TRACE_SEPARATOR)
    }

    /// Returns the current depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if nothing is under analysis.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_contains() {
        let mut guard = CycleGuard::new();
        guard.push("Domain");
        guard.push("DomainDisk");

        assert!(guard.contains("Domain"));
        assert!(!guard.contains("Network"));
        assert_eq!(guard.depth(), 2);

        assert_eq!(guard.pop().as_deref(), Some("DomainDisk"));
        assert!(!guard.contains("DomainDisk"));
        assert_eq!(guard.pop().as_deref(), Some("Domain"));
        assert!(guard.is_empty());
        assert!(guard.pop().is_none());
    }

    #[test]
    fn test_trace_from_first_occurrence() {
        let mut guard = CycleGuard::new();
        guard.push("Domain");
        guard.push("DomainDisk");
        guard.push("DomainDiskSource");
        guard.push("DomainDiskDataStore");

        assert_eq!(
            guard.trace("DomainDiskSource"),
            "DomainDiskSource → DomainDiskDataStore → DomainDiskSource"
        );
        assert_eq!(
            guard.trace("Domain"),
            "Domain → DomainDisk → DomainDiskSource → DomainDiskDataStore → Domain"
        );
    }

    #[test]
    fn test_trace_self_reference() {
        let mut guard = CycleGuard::new();
        guard.push("StorageVolumeBackingStore");

        assert_eq!(
            guard.trace("StorageVolumeBackingStore"),
            "StorageVolumeBackingStore → StorageVolumeBackingStore"
        );
    }

    #[test]
    fn test_trace_absent_target() {
        let mut guard = CycleGuard::new();
        guard.push("A");
        assert_eq!(guard.trace("B"), "B");
    }
}
