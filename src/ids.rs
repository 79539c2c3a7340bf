use uuid::Uuid;

/// Produces the element ids used for the document root and the area mask.
pub trait IdGenerator {
    fn next_id(&mut self, base: &str) -> String;
}

/// `{base}-{n}` with a counter shared across bases. Gives byte-identical
/// output for identical configurations.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    counter: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, base: &str) -> String {
        self.counter += 1;
        format!("{base}-{}", self.counter)
    }
}

/// `{base}-{suffix}` with a short random suffix, so several pages can be
/// embedded in one HTML document without id clashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self, base: &str) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{base}-{}", &uuid[..5])
    }
}
