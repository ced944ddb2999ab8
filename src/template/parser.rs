//! Template compiler: source text → instruction tree.
//!
//! Parsing happens in three steps:
//!
//! 1. **Tokenize** with a single left-to-right scan. Every character of
//!    literal text becomes its own token so that whitespace on a line holding
//!    only non-output tags can be dropped ("standalone" lines).
//! 2. **Squash** adjacent text tokens into a single run.
//! 3. **Nest** tokens into [`Node`] trees using the stack of open sections.

use super::scanner::Scanner;
use super::{Node, Tags};
use crate::errors::TemplateError;

enum Token {
    Text { start: usize, end: usize },
    Variable { name: String, escaped: bool },
    Open {
        name: String,
        inverted: bool,
        end: usize,
        tags: Tags,
    },
    Close { start: usize },
    Partial {
        name: String,
        indentation: Option<String>,
    },
    /// Comments and delimiter changes: no output, but they still count as tags
    /// for standalone detection.
    Silent,
}

/// Per-line bookkeeping for standalone trimming.
#[derive(Default)]
struct LineState {
    /// Indices of whitespace text tokens on the current line.
    spaces: Vec<usize>,
    has_tag: bool,
    non_space: bool,
    line_has_non_space: bool,
    indentation: String,
    tag_index: usize,
}

impl LineState {
    fn strip_space(&mut self, tokens: &mut [Option<Token>]) {
        if self.has_tag && !self.non_space {
            for &i in &self.spaces {
                tokens[i] = None;
            }
        }
        self.spaces.clear();
        self.has_tag = false;
        self.non_space = false;
    }

    fn new_line(&mut self) {
        self.indentation.clear();
        self.tag_index = 0;
        self.line_has_non_space = false;
    }
}

/// Compiles `source` into an instruction tree using `tags` as the initial
/// delimiter pair.
pub(crate) fn parse(source: &str, tags: &Tags) -> Result<Vec<Node>, TemplateError> {
    let tokens = tokenize(source, tags.clone())?;
    Ok(nest(source, tokens))
}

fn tokenize(source: &str, mut tags: Tags) -> Result<Vec<Option<Token>>, TemplateError> {
    let mut scanner = Scanner::new(source);
    let mut tokens: Vec<Option<Token>> = Vec::new();
    let mut sections: Vec<(String, usize)> = Vec::new();
    let mut line = LineState::default();

    while !scanner.eos() {
        let start = scanner.pos();
        let text = scanner.scan_until(&tags.open);

        for (offset, ch) in text.char_indices() {
            let s = start + offset;
            if ch.is_whitespace() {
                line.spaces.push(tokens.len());
                line.indentation.push(ch);
            } else {
                line.non_space = true;
                line.line_has_non_space = true;
                line.indentation.push(' ');
            }

            tokens.push(Some(Token::Text {
                start: s,
                end: s + ch.len_utf8(),
            }));

            if ch == '\n' {
                line.strip_space(&mut tokens);
                line.new_line();
            }
        }

        let tag_start = scanner.pos();
        if !scanner.scan(&tags.open) {
            break;
        }
        scanner.skip_whitespace();
        line.has_tag = true;

        let sigil = scanner.scan_sigil();
        scanner.skip_whitespace();

        let value = match sigil {
            Some('=') => {
                let value = scanner.scan_until_padded("=");
                scanner.scan_padded("=");
                scanner.scan_until_padded(&tags.close);
                value
            }
            Some('{') => {
                let closing_curly = format!("}}{}", tags.close);
                let value = scanner.scan_until_padded(&closing_curly);
                scanner.scan_padded("}");
                scanner.scan_until_padded(&tags.close);
                value
            }
            _ => scanner.scan_until_padded(&tags.close),
        };

        if !scanner.scan_padded(&tags.close) {
            return Err(TemplateError::UnclosedTag {
                pos: scanner.pos(),
            });
        }

        let name = value.to_owned();
        let token = match sigil {
            Some(c @ ('#' | '^')) => {
                sections.push((name.clone(), tag_start));
                Token::Open {
                    name,
                    inverted: c == '^',
                    end: scanner.pos(),
                    tags: tags.clone(),
                }
            }
            Some('/') => {
                let Some((open, _)) = sections.pop() else {
                    return Err(TemplateError::UnopenedSection {
                        name,
                        pos: tag_start,
                    });
                };
                if open != name {
                    return Err(TemplateError::MismatchedSection {
                        expected: open,
                        found: name,
                        pos: tag_start,
                    });
                }
                Token::Close { start: tag_start }
            }
            Some('>') => {
                let standalone_indent = line.tag_index == 0
                    && !line.indentation.is_empty()
                    && !line.line_has_non_space;
                Token::Partial {
                    name,
                    indentation: standalone_indent.then(|| line.indentation.clone()),
                }
            }
            Some('=') => {
                tags = Tags::from_spec(value)?;
                Token::Silent
            }
            Some('!') => Token::Silent,
            Some('&' | '{') => {
                line.non_space = true;
                Token::Variable {
                    name,
                    escaped: false,
                }
            }
            _ => {
                line.non_space = true;
                Token::Variable {
                    name,
                    escaped: true,
                }
            }
        };

        line.tag_index += 1;
        tokens.push(Some(token));
    }

    line.strip_space(&mut tokens);

    if let Some((name, pos)) = sections.pop() {
        return Err(TemplateError::UnclosedSection { name, pos });
    }

    Ok(tokens)
}

struct OpenFrame {
    name: String,
    inverted: bool,
    inner_start: usize,
    tags: Tags,
    children: Vec<Node>,
}

fn flush_text(text: &mut String, children: &mut Vec<Node>) {
    if !text.is_empty() {
        children.push(Node::Text(std::mem::take(text)));
    }
}

fn nest(source: &str, tokens: Vec<Option<Token>>) -> Vec<Node> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenFrame> = Vec::new();
    let mut text = String::new();

    for token in tokens.into_iter().flatten() {
        let children = match stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut root,
        };

        match token {
            Token::Text { start, end } => text.push_str(&source[start..end]),
            Token::Silent => {}
            Token::Variable { name, escaped } => {
                flush_text(&mut text, children);
                children.push(Node::Variable { name, escaped });
            }
            Token::Partial { name, indentation } => {
                flush_text(&mut text, children);
                children.push(Node::Partial { name, indentation });
            }
            Token::Open {
                name,
                inverted,
                end,
                tags,
            } => {
                flush_text(&mut text, children);
                stack.push(OpenFrame {
                    name,
                    inverted,
                    inner_start: end,
                    tags,
                    children: Vec::new(),
                });
            }
            Token::Close { start } => {
                flush_text(&mut text, children);
                if let Some(frame) = stack.pop() {
                    let section = Node::Section {
                        name: frame.name,
                        inverted: frame.inverted,
                        children: frame.children,
                        inner: frame.inner_start..start,
                        tags: frame.tags,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(section),
                        None => root.push(section),
                    }
                }
            }
        }
    }

    flush_text(&mut text, &mut root);
    root
}
