//! Parameter list chapters.
//!
//! Each parameter opens with a rubric paragraph naming it, followed by its
//! type line and description:
//!
//! ```text
//! NONE --rubric--> NAME --rubric closed--> TYPE --"."--> DESCRIPTION
//!                   ^                                        |
//!                   +------------------rubric----------------+
//! ```

use std::sync::LazyLock;

use regex::Regex;

use helpbook_markdown::HtmlEvent;
use helpbook_shared::{MethodParameterInfo, Result};

use super::collapse;
use super::typed::TypedText;
use crate::engine::{BlockHandler, Fragment};

/// Class of the paragraph naming one parameter.
pub const RUBRIC_CLASS: &str = "V8SH_rubric";

static PARAMETER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^<>]+)>\s*(?:\(([^()]*)\))?").expect("valid regex"));

const OPTIONAL_MARKERS: [&str; 2] = ["необязательный", "optional"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum State {
    #[default]
    None,
    /// Inside the rubric element, at the given nesting depth.
    Name(usize),
    Body,
}

#[derive(Debug, Default)]
pub struct ParametersHandler {
    state: State,
    rubric: String,
    current: Option<(String, bool)>,
    body: TypedText,
    parameters: Vec<MethodParameterInfo>,
}

/// Parse rubric text into a name and the optional flag.
fn parse_rubric(text: &str) -> (String, bool) {
    let text = collapse(text);
    match PARAMETER_NAME.captures(&text) {
        Some(caps) => {
            let optional = caps.get(2).is_some_and(|marker| {
                let marker = marker.as_str().to_lowercase();
                OPTIONAL_MARKERS.iter().any(|m| marker.contains(m))
            });
            (caps[1].trim().to_string(), optional)
        }
        None => (text.trim_matches(['<', '>']).to_string(), false),
    }
}

impl ParametersHandler {
    fn close_rubric(&mut self) {
        self.current = Some(parse_rubric(&self.rubric));
        self.rubric.clear();
        self.body.reset();
        self.state = State::Body;
    }

    fn flush(&mut self) {
        if matches!(self.state, State::Name(_)) {
            self.close_rubric();
        }
        if let Some((name, is_optional)) = self.current.take() {
            let value = self.body.finish();
            self.parameters.push(MethodParameterInfo {
                name,
                type_name: value.type_name,
                is_optional,
                description: value.description,
            });
        }
        self.body.reset();
    }
}

impl BlockHandler for ParametersHandler {
    fn process_event(&mut self, event: &HtmlEvent<'_>) -> Result<()> {
        if let HtmlEvent::Open(tag) = event {
            if tag.has_class(RUBRIC_CLASS) {
                self.flush();
                self.state = State::Name(0);
                return Ok(());
            }
        }

        match (self.state, event) {
            (State::None, _) => {}
            (State::Name(depth), HtmlEvent::Open(_)) => self.state = State::Name(depth + 1),
            (State::Name(0), HtmlEvent::Close(_)) => self.close_rubric(),
            (State::Name(depth), HtmlEvent::Close(_)) => self.state = State::Name(depth - 1),
            (State::Name(_), HtmlEvent::Text(text)) => self.rubric.push_str(text),
            (State::Body, event) => self.body.process(event),
        }
        Ok(())
    }

    fn result(&mut self) -> Result<Fragment> {
        self.flush();
        self.state = State::None;
        Ok(Fragment::Parameters(std::mem::take(&mut self.parameters)))
    }

    fn reset(&mut self) {
        self.state = State::None;
        self.rubric.clear();
        self.current = None;
        self.body.reset();
        self.parameters.clear();
    }
}
