//! One [`PageParser`](crate::PageParser) per page kind.
//!
//! Each parser owns a chapter table (chapter -> handler, or ignored) and a
//! reducer placing fragments into its record.

mod constructor;
mod enums;
mod method;
mod object;
mod property;

pub use constructor::ConstructorParser;
pub use enums::{EnumParser, EnumValueParser};
pub use method::MethodParser;
pub use object::ObjectParser;
pub use property::PropertyParser;

/// Optional text from a markdown fragment; blank becomes `None`.
pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.trim().is_empty() { None } else { Some(text) }
}

#[cfg(test)]
pub(crate) mod test_util {
    use helpbook_shared::Result;

    use crate::engine::{BlockExtractor, PageParser};

    /// Extract an html fixture from the workspace `fixtures/html` directory.
    pub fn fixture<P: PageParser>(name: &str, parser: P) -> Result<P::Output> {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures/html")
            .join(name);
        let html = std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"));
        BlockExtractor::new().extract(&html, parser)
    }
}
