//! Line-based syntax check for `.pix` model files
//!
//! A model is a sequence of elements, each an opening header, attribute
//! lines and a closing brace:
//!
//! ```text
//! sprite{
//!     width: 16
//!     "display name": Hero
//! }
//! ```
//!
//! Names and keys are identifiers (`[A-Za-z_][\w-]*`) or single/double
//! quoted strings. Blank lines are ignored everywhere. Elements do not nest.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)]
static ELEMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"([^"]+)"|'([^']+)'|([A-Za-z_][\w\-]*))\s*\{\s*$"#)
        .expect("element header pattern is valid")
});

#[allow(clippy::expect_used)]
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:"([^"]+)"|'([^']+)'|([A-Za-z_][\w\-]*))\s*:\s*(\S(?:.*\S)?)\s*$"#)
        .expect("attribute pattern is valid")
});

/// One syntax problem. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixSyntaxError {
    #[error("Line {line}: Expected element header like 'name{{' but got: {text:?}")]
    ExpectedHeader { line: usize, text: String },

    #[error("Line {line}: Attribute value must not contain '{{' or '}}': {text:?}")]
    BraceInValue { line: usize, text: String },

    #[error("Line {line}: Unexpected '{{' inside element {element:?}")]
    NestedElement { line: usize, element: String },

    #[error("Line {line}: Invalid attribute format, expected 'key: value', got: {text:?}")]
    InvalidAttribute { line: usize, text: String },

    #[error("Unexpected end of file: missing closing '}}' for element {element:?}")]
    UnclosedElement { element: String },
}

/// First non-empty capture among the quoted and bare name alternatives.
fn captured_name(caps: &regex::Captures<'_>) -> String {
    (1..=3)
        .find_map(|i| caps.get(i))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Check a whole file and collect every problem, in line order.
pub fn check_pix(content: &str) -> Vec<PixSyntaxError> {
    let mut errors = Vec::new();
    let mut current: Option<String> = None;

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }

        if current.is_none() {
            match ELEMENT_HEADER.captures(line) {
                Some(caps) => current = Some(captured_name(&caps)),
                None => errors.push(PixSyntaxError::ExpectedHeader {
                    line: line_no,
                    text: line.to_string(),
                }),
            }
            continue;
        }

        if stripped == "}" {
            current = None;
            continue;
        }

        match ATTRIBUTE.captures(line) {
            Some(caps) => {
                let value = caps.get(4).map_or("", |m| m.as_str());
                if value.contains(['{', '}']) {
                    errors.push(PixSyntaxError::BraceInValue {
                        line: line_no,
                        text: line.to_string(),
                    });
                }
            },
            None if line.contains('{') => errors.push(PixSyntaxError::NestedElement {
                line: line_no,
                element: current.clone().unwrap_or_default(),
            }),
            None => errors.push(PixSyntaxError::InvalidAttribute {
                line: line_no,
                text: line.to_string(),
            }),
        }
    }

    if let Some(element) = current {
        errors.push(PixSyntaxError::UnclosedElement { element });
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_model() {
        let content = "sprite{\n    width: 16\n    height: 16\n}\n\n\"big boss\" {\n  'hit points': 300\n}\n";
        assert!(check_pix(content).is_empty());
    }

    #[test]
    fn test_empty_file_is_valid() {
        assert!(check_pix("").is_empty());
        assert!(check_pix("\n  \n").is_empty());
    }

    #[test]
    fn test_text_outside_element() {
        let errors = check_pix("width: 16\n");
        assert_eq!(
            errors,
            vec![PixSyntaxError::ExpectedHeader {
                line: 1,
                text: "width: 16".to_string()
            }]
        );
    }

    #[test]
    fn test_brace_in_attribute_value() {
        let errors = check_pix("tile{\n  data: {1,2}\n}\n");
        assert_eq!(
            errors,
            vec![PixSyntaxError::BraceInValue {
                line: 2,
                text: "  data: {1,2}".to_string()
            }]
        );
    }

    #[test]
    fn test_nested_element() {
        let errors = check_pix("outer{\n  inner{\n}\n");
        assert_eq!(
            errors,
            vec![PixSyntaxError::NestedElement {
                line: 2,
                element: "outer".to_string()
            }]
        );
    }

    #[test]
    fn test_invalid_attribute_line() {
        let errors = check_pix("tile{\n  width = 16\n  : 3\n}\n");
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], PixSyntaxError::InvalidAttribute { line: 2, .. }));
        assert!(matches!(errors[1], PixSyntaxError::InvalidAttribute { line: 3, .. }));
    }

    #[test]
    fn test_unclosed_element_at_end_of_file() {
        let errors = check_pix("'my tile'{\n  width: 1\n");
        assert_eq!(
            errors,
            vec![PixSyntaxError::UnclosedElement {
                element: "my tile".to_string()
            }]
        );
    }

    #[test]
    fn test_errors_are_collected_in_line_order() {
        let errors = check_pix("junk\ntile{\n  bad\n");
        let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Line 1: Expected element header"));
        assert!(lines[1].starts_with("Line 3: Invalid attribute format"));
        assert!(lines[2].starts_with("Unexpected end of file"));
    }

    #[test]
    fn test_error_messages() {
        let err = PixSyntaxError::NestedElement {
            line: 4,
            element: "a".to_string(),
        };
        assert_eq!(err.to_string(), "Line 4: Unexpected '{' inside element \"a\"");
    }
}
