//! Chapter titles recognised on help pages.

use std::fmt;

use helpbook_shared::{HelpBookError, Result};

/// Class of the paragraph that opens a chapter.
pub const CHAPTER_CLASS: &str = "V8SH_chapter";

const SYNTAX_VARIANT_PREFIXES: [&str; 2] = ["Вариант синтаксиса:", "Syntax variant:"];

/// A titled section of a help page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Chapter {
    Syntax,
    /// Starts a named method signature.
    SyntaxVariant(String),
    Parameters,
    ReturnValue,
    Description,
    MethodVariantDescription,
    Availability,
    Note,
    Example,
    SeeAlso,
    Usage,
    Type,
    UseInVersion,
}

impl Chapter {
    /// Recognise a chapter from its marker text, in either language.
    pub fn parse(title: &str) -> Result<Self> {
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

        for prefix in SYNTAX_VARIANT_PREFIXES {
            if let Some(name) = title.strip_prefix(prefix) {
                return Ok(Self::SyntaxVariant(name.trim().to_string()));
            }
        }

        let chapter = match title.trim_end_matches(':').trim_end() {
            "Синтаксис" | "Syntax" => Self::Syntax,
            "Параметры" | "Parameters" => Self::Parameters,
            "Возвращаемое значение" | "Returned value" => Self::ReturnValue,
            "Описание" | "Description" => Self::Description,
            "Описание варианта метода" | "Method variant description" => {
                Self::MethodVariantDescription
            }
            "Доступность" | "Availability" => Self::Availability,
            "Примечание" | "Note" => Self::Note,
            "Пример" | "Example" => Self::Example,
            "См. также" | "See also" => Self::SeeAlso,
            "Использование" | "Use" => Self::Usage,
            "Тип" | "Type" => Self::Type,
            "Использование в версии" | "Use in version" => Self::UseInVersion,
            _ => return Err(HelpBookError::UnknownPageBlock { title }),
        };
        Ok(chapter)
    }
}

impl fmt::Display for Chapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("Syntax"),
            Self::SyntaxVariant(name) => write!(f, "Syntax variant: {name}"),
            Self::Parameters => f.write_str("Parameters"),
            Self::ReturnValue => f.write_str("Returned value"),
            Self::Description => f.write_str("Description"),
            Self::MethodVariantDescription => f.write_str("Method variant description"),
            Self::Availability => f.write_str("Availability"),
            Self::Note => f.write_str("Note"),
            Self::Example => f.write_str("Example"),
            Self::SeeAlso => f.write_str("See also"),
            Self::Usage => f.write_str("Use"),
            Self::Type => f.write_str("Type"),
            Self::UseInVersion => f.write_str("Use in version"),
        }
    }
}
