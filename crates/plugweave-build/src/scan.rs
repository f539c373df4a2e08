//! Recursive-descent scanner for the two template directive shapes:
//!
//! ```text
//! @page "<route>"
//! @attribute [Name(Key = value, ...), Other]
//! ```
//!
//! Only directive lines are parsed; the surrounding markup is never
//! interpreted.

use thiserror::Error as ThisError;

///
/// ScanError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ScanError {
    #[error("expected {expected} on line {line}")]
    Expected { expected: &'static str, line: usize },

    #[error("unterminated string on line {line}")]
    UnterminatedString { line: usize },

    #[error("unbalanced brackets starting on line {line}")]
    Unbalanced { line: usize },
}

///
/// ArgValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Bool(bool),
    /// Anything else (constants, expressions), kept as written.
    Other(String),
}

///
/// AttributeArg
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeArg {
    pub name: Option<String>,
    pub value: ArgValue,
}

///
/// AttributeSpec
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeSpec {
    pub path: Vec<String>,
    pub args: Vec<AttributeArg>,
}

impl AttributeSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }
}

/// Blank out `@* ... *@` comments, keeping offsets and line breaks intact.
#[must_use]
pub fn mask_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("@*") {
        out.push_str(&rest[..start]);
        let body = &rest[start..];
        let end = body[2..].find("*@").map_or(body.len(), |i| i + 4);

        for c in body[..end].chars() {
            if c == '\n' {
                out.push('\n');
            } else {
                out.extend(std::iter::repeat_n(' ', c.len_utf8()));
            }
        }
        rest = &body[end..];
    }
    out.push_str(rest);

    out
}

/// Byte offsets just past every `@<keyword>` that starts a line.
#[must_use]
pub fn directive_offsets(text: &str, keyword: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut line_start = 0;

    for line in text.split_inclusive('\n') {
        let indent = line.len() - line.trim_start().len();
        let rest = &line[indent..];

        if let Some(after) = rest.strip_prefix('@').and_then(|r| r.strip_prefix(keyword)) {
            let boundary = after
                .chars()
                .next()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
            if boundary {
                offsets.push(line_start + indent + 1 + keyword.len());
            }
        }

        line_start += line.len();
    }

    offsets
}

/// Parse the quoted route following `@page`.
pub fn parse_route(text: &str, offset: usize) -> Result<String, ScanError> {
    let mut cur = Cursor::new(text, offset);
    cur.skip_inline_ws();

    if cur.peek() != Some('"') {
        return Err(cur.expected("a quoted route"));
    }
    let route = cur.string()?;
    if route.trim().is_empty() {
        return Err(cur.expected("a non-empty route"));
    }

    Ok(route)
}

/// Parse the bracketed attribute list following `@attribute`.
pub fn parse_attributes(text: &str, offset: usize) -> Result<Vec<AttributeSpec>, ScanError> {
    let mut cur = Cursor::new(text, offset);
    cur.skip_inline_ws();

    if !cur.eat('[') {
        return Err(cur.expected("'['"));
    }

    let mut attrs = Vec::new();
    loop {
        cur.skip_ws();
        let path = cur.qualified_name()?;
        cur.skip_ws();

        let args = if cur.eat('(') {
            cur.args()?
        } else {
            Vec::new()
        };
        attrs.push(AttributeSpec { path, args });

        cur.skip_ws();
        if cur.eat(',') {
            continue;
        }
        if cur.eat(']') {
            break;
        }
        return Err(cur.expected("',' or ']'"));
    }

    Ok(attrs)
}

///
/// Cursor
///

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    const fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();

        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn line(&self) -> usize {
        self.src[..self.pos].matches('\n').count() + 1
    }

    fn expected(&self, expected: &'static str) -> ScanError {
        ScanError::Expected {
            expected,
            line: self.line(),
        }
    }

    fn skip_inline_ws(&mut self) {
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.bump();
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        if !self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return None;
        }
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }

        Some(&self.src[start..self.pos])
    }

    fn qualified_name(&mut self) -> Result<Vec<String>, ScanError> {
        let mut path = Vec::new();
        loop {
            let Some(ident) = self.ident() else {
                return Err(self.expected("an attribute name"));
            };
            path.push(ident.to_string());

            if !self.eat('.') {
                return Ok(path);
            }
        }
    }

    // args
    // called after the opening '(' and consumes the closing ')'
    fn args(&mut self) -> Result<Vec<AttributeArg>, ScanError> {
        let mut args = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(')') {
                return Ok(args);
            }

            let save = self.pos;
            let name = self.ident().map(str::to_string);
            self.skip_ws();

            let named =
                name.is_some() && self.rest().starts_with('=') && !self.rest().starts_with("==");
            let name = if named {
                self.bump();
                name
            } else {
                self.pos = save;
                None
            };

            self.skip_ws();
            let value = self.value()?;
            args.push(AttributeArg { name, value });

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                return Ok(args);
            }
            return Err(self.expected("',' or ')'"));
        }
    }

    // value
    // a literal counts as a string only when the argument ends right after
    // it; `"A" + B` and the like are rescanned as raw text
    fn value(&mut self) -> Result<ArgValue, ScanError> {
        let start = self.pos;

        let literal = if self.peek() == Some('"') {
            Some(self.string()?)
        } else if self.rest().starts_with("@\"") {
            self.bump();
            Some(self.verbatim_string()?)
        } else {
            None
        };

        if let Some(literal) = literal {
            self.skip_ws();
            if matches!(self.peek(), Some(',' | ')')) {
                return Ok(ArgValue::Str(literal));
            }
            self.pos = start;
        }

        let raw = self.raw_value()?.trim();
        if raw.is_empty() {
            return Err(self.expected("a value"));
        }

        Ok(match raw {
            "true" => ArgValue::Bool(true),
            "false" => ArgValue::Bool(false),
            _ => raw
                .parse::<i64>()
                .map_or_else(|_| ArgValue::Other(raw.to_string()), ArgValue::Int),
        })
    }

    // raw_value
    // everything up to the next top-level ',' or ')', brackets balanced
    fn raw_value(&mut self) -> Result<&'a str, ScanError> {
        let start = self.pos;
        let line = self.line();
        let mut depth = 0usize;

        loop {
            match self.peek() {
                None => return Err(ScanError::Unbalanced { line }),
                Some('"') => {
                    self.string()?;
                    continue;
                }
                Some('(' | '[') => depth += 1,
                Some(')' | ']') if depth == 0 => break,
                Some(')' | ']') => depth -= 1,
                Some(',') if depth == 0 => break,
                Some(_) => {}
            }
            self.bump();
        }

        Ok(&self.src[start..self.pos])
    }

    // string
    // a regular "..." literal with backslash escapes; may not span lines
    fn string(&mut self) -> Result<String, ScanError> {
        let line = self.line();
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(ScanError::UnterminatedString { line }),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    None => return Err(ScanError::UnterminatedString { line }),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    // verbatim_string
    // @"..." where "" stands for one quote
    fn verbatim_string(&mut self) -> Result<String, ScanError> {
        let line = self.line();
        self.bump();

        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(ScanError::UnterminatedString { line }),
                Some('"') if self.eat('"') => out.push('"'),
                Some('"') => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(text: &str) -> Result<Vec<AttributeSpec>, ScanError> {
        let offset = directive_offsets(text, "attribute")[0];
        parse_attributes(text, offset)
    }

    #[test]
    fn finds_directives_only_at_line_start() {
        let text = "<p>@page \"/no\"</p>\n  @page \"/yes\"\n@pages \"/no\"\n@page\n";
        let offsets = directive_offsets(text, "page");

        assert_eq!(offsets.len(), 2);
        assert_eq!(parse_route(text, offsets[0]).as_deref(), Ok("/yes"));
        assert!(parse_route(text, offsets[1]).is_err());
    }

    #[test]
    fn route_accepts_escapes_and_parameters() {
        let text = "@page \"/items/{id:int}/\\\"q\\\"\"";
        let offset = directive_offsets(text, "page")[0];

        assert_eq!(
            parse_route(text, offset).as_deref(),
            Ok("/items/{id:int}/\"q\"")
        );
    }

    #[test]
    fn route_errors_name_the_line() {
        let text = "<h1/>\n@page \"/open";
        let offset = directive_offsets(text, "page")[0];

        assert_eq!(
            parse_route(text, offset),
            Err(ScanError::UnterminatedString { line: 2 })
        );
        assert!(matches!(
            parse_route("@page \"\"", 5),
            Err(ScanError::Expected {
                expected: "a non-empty route",
                ..
            })
        ));
    }

    #[test]
    fn parses_named_and_positional_arguments() {
        let parsed = attrs(
            "@attribute [Authorize, Acme.PluginComponent(\"x\", DisplayName = @\"Say \"\"Hi\"\"\", Order = -3, ShowInNavigation=false, Icon = Icons.Get(\"a,b\"))]",
        )
        .expect("attribute list should parse");

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name(), "Authorize");
        assert!(parsed[0].args.is_empty());

        let component = &parsed[1];
        assert_eq!(component.path, vec!["Acme", "PluginComponent"]);
        assert_eq!(
            component.args,
            vec![
                AttributeArg {
                    name: None,
                    value: ArgValue::Str("x".to_string())
                },
                AttributeArg {
                    name: Some("DisplayName".to_string()),
                    value: ArgValue::Str("Say \"Hi\"".to_string())
                },
                AttributeArg {
                    name: Some("Order".to_string()),
                    value: ArgValue::Int(-3)
                },
                AttributeArg {
                    name: Some("ShowInNavigation".to_string()),
                    value: ArgValue::Bool(false)
                },
                AttributeArg {
                    name: Some("Icon".to_string()),
                    value: ArgValue::Other("Icons.Get(\"a,b\")".to_string())
                },
            ]
        );
    }

    #[test]
    fn argument_lists_may_span_lines() {
        let text = "@attribute [PluginComponent(\n    Order = 2,\n    DisplayName = \"Two\"\n)]";
        let parsed = attrs(text).expect("multi-line list should parse");

        assert_eq!(parsed[0].args.len(), 2);
    }

    #[test]
    fn string_led_expressions_are_kept_as_written() {
        let parsed = attrs(
            "@attribute [PluginComponent(DisplayName = \"A\" + \"B\", Icon = @\"x\".Trim(), Order = 3)]",
        )
        .expect("expression arguments should parse");

        assert_eq!(
            parsed[0].args,
            vec![
                AttributeArg {
                    name: Some("DisplayName".to_string()),
                    value: ArgValue::Other("\"A\" + \"B\"".to_string())
                },
                AttributeArg {
                    name: Some("Icon".to_string()),
                    value: ArgValue::Other("@\"x\".Trim()".to_string())
                },
                AttributeArg {
                    name: Some("Order".to_string()),
                    value: ArgValue::Int(3)
                },
            ]
        );

        let text = "@attribute [PluginComponent(DisplayName = \"A\"  , Order = 1)]";
        let spaced = attrs(text).expect("trailing space after a literal is fine");
        assert_eq!(spaced[0].args[0].value, ArgValue::Str("A".to_string()));
    }

    #[test]
    fn malformed_lists_are_errors() {
        assert!(attrs("@attribute PluginComponent").is_err());
        assert!(attrs("@attribute [PluginComponent(Order = 1").is_err());
        let trailing = "@attribute [PluginComponent(Order = 1) junk]";
        assert!(attrs(trailing).is_err());
        assert!(attrs("@attribute [PluginComponent(Order = )]").is_err());
    }

    #[test]
    fn comments_are_masked_in_place() {
        let text = "@* @page \"/hidden\"\n *@\n@page \"/shown\"";
        let masked = mask_comments(text);

        assert_eq!(masked.len(), text.len());
        let offsets = directive_offsets(&masked, "page");
        assert_eq!(offsets.len(), 1);
        assert_eq!(parse_route(&masked, offsets[0]).as_deref(), Ok("/shown"));
    }
}
