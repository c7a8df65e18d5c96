use uuid::Uuid;

/// Produces identifiers for new snippets and groups
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `prefix-1`, `prefix-2`, ... for reproducible runs
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    counter: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("{}-{}", self.prefix, self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generators_do_not_repeat() {
        let mut uuids = UuidGenerator;
        let seen: HashSet<_> = (0..100).map(|_| uuids.next_id()).collect();
        assert_eq!(seen.len(), 100);

        let mut seq = SequentialIds::new("s");
        assert_eq!(seq.next_id(), "s-1");
        assert_eq!(seq.next_id(), "s-2");
    }
}
