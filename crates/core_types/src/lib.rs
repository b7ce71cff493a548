pub type RequestId = u64;

/// Generation of the whole document. Bumped every time the document is replaced
/// wholesale, so that responses to requests issued against an older document can
/// be recognised and dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocGeneration(pub u64);

impl DocGeneration {
    pub const INITIAL: DocGeneration = DocGeneration(0);

    pub fn next(self) -> Self {
        DocGeneration(self.0.wrapping_add(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    /// Partial markup swapped into a content region.
    Fragment,
    /// A complete document that replaces the current one.
    Document,
}
