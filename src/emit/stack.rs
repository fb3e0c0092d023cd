/// Names of the blocks opened so far in one render pass, innermost last.
///
/// `echo_endblock` pops the innermost name so nested closes never repeat it.
/// Popping an empty stack yields an empty name instead of failing; an
/// unmatched close is a mistake in the calling template and surfaces when
/// the emitted output is rendered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockStack {
    names: Vec<String>,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>) {
        self.names.push(name.into());
    }

    pub fn pop(&mut self) -> String {
        self.names.pop().unwrap_or_default()
    }

    pub fn peek(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
