//! Directive-block configuration format.
//!
//! An alternative to TOML for route-only configs:
//!
//! ```text
//! awslambda /api/ {
//!     aws_region         us-west-2
//!     qualifier          prod
//!     include            foo*  some-other
//!     exclude            *blah*
//!     strip_path_prefix  on
//!     header_upstream    X-Forwarded-Host {host}
//! }
//! awslambda /other/
//! ```
//!
//! # Design Decisions
//! - Tokenizing and parsing are separate passes; tokens keep their line
//! - A directive's arguments are the remaining tokens on its line
//! - `{` and `}` are only block delimiters as bare tokens, so placeholders
//!   such as `{host}` stay ordinary words

use thiserror::Error;

use crate::config::schema::RouteConfig;

const BLOCK_KEYWORD: &str = "awslambda";

/// A syntax or semantic error in a directive file.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct DirectiveError {
    pub line: usize,
    pub message: String,
}

impl DirectiveError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Word(String),
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    line: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, DirectiveError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    let mut line = 1;

    while let Some(&c) = chars.peek() {
        if c == '\n' {
            line += 1;
            chars.next();
            continue;
        }
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '#' {
            while let Some(&c) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
            }
            continue;
        }

        let start_line = line;
        let mut word = String::new();
        let mut quoted = false;

        if c == '"' {
            quoted = true;
            chars.next();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some('\\') => match chars.next() {
                        Some(escaped) => word.push(escaped),
                        None => break,
                    },
                    Some(ch) => {
                        if ch == '\n' {
                            line += 1;
                        }
                        word.push(ch);
                    }
                    None => {
                        return Err(DirectiveError::new(start_line, "unterminated quoted string"));
                    }
                }
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                word.push(ch);
                chars.next();
            }
        }

        let kind = match word.as_str() {
            "{" if !quoted => TokenKind::Open,
            "}" if !quoted => TokenKind::Close,
            _ => TokenKind::Word(word),
        };
        tokens.push(Token {
            kind,
            line: start_line,
        });
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the words remaining on `line`.
    fn line_args(&mut self, line: usize) -> Vec<String> {
        let mut args = Vec::new();
        while let Some(Token {
            kind: TokenKind::Word(word),
            line: l,
        }) = self.peek()
        {
            if *l != line {
                break;
            }
            args.push(word.clone());
            self.pos += 1;
        }
        args
    }

    fn parse_file(&mut self) -> Result<Vec<RouteConfig>, DirectiveError> {
        let mut routes = Vec::new();
        while let Some(token) = self.next() {
            match token.kind {
                TokenKind::Word(ref word) if word == BLOCK_KEYWORD => {
                    routes.push(self.parse_block(token.line)?);
                }
                TokenKind::Word(word) => {
                    return Err(DirectiveError::new(
                        token.line,
                        format!("expected `{}`, found `{}`", BLOCK_KEYWORD, word),
                    ));
                }
                TokenKind::Open | TokenKind::Close => {
                    return Err(DirectiveError::new(token.line, "unexpected brace"));
                }
            }
        }
        Ok(routes)
    }

    fn parse_block(&mut self, line: usize) -> Result<RouteConfig, DirectiveError> {
        let mut args = self.line_args(line);
        if args.len() != 1 {
            return Err(DirectiveError::new(
                line,
                format!("`{}` takes exactly one path", BLOCK_KEYWORD),
            ));
        }
        let mut route = RouteConfig::new(args.remove(0));

        let opens_block = matches!(
            self.peek(),
            Some(Token { kind: TokenKind::Open, line: l }) if *l == line
        );
        if !opens_block {
            return Ok(route);
        }
        self.pos += 1;

        loop {
            let Some(token) = self.next() else {
                return Err(DirectiveError::new(line, "unclosed block"));
            };
            match token.kind {
                TokenKind::Close => return Ok(route),
                TokenKind::Open => {
                    return Err(DirectiveError::new(token.line, "unexpected `{`"));
                }
                TokenKind::Word(key) => {
                    let args = self.line_args(token.line);
                    apply_directive(&mut route, &key, args, token.line)?;
                }
            }
        }
    }
}

fn single_arg(key: &str, mut args: Vec<String>, line: usize) -> Result<String, DirectiveError> {
    if args.len() != 1 {
        return Err(DirectiveError::new(
            line,
            format!("`{}` takes exactly one argument", key),
        ));
    }
    Ok(args.remove(0))
}

fn apply_directive(
    route: &mut RouteConfig,
    key: &str,
    args: Vec<String>,
    line: usize,
) -> Result<(), DirectiveError> {
    match key {
        "aws_access" => route.aws.access_key = Some(single_arg(key, args, line)?),
        "aws_secret" => route.aws.secret_key = Some(single_arg(key, args, line)?),
        "aws_region" => route.aws.region = Some(single_arg(key, args, line)?),
        "aws_endpoint" => route.aws.endpoint_url = Some(single_arg(key, args, line)?),
        "qualifier" => route.qualifier = Some(single_arg(key, args, line)?),
        "name_prepend" => route.name_prepend = single_arg(key, args, line)?,
        "name_append" => route.name_append = single_arg(key, args, line)?,
        "single" => route.single = Some(single_arg(key, args, line)?),
        "strip_path_prefix" => route.strip_path_prefix = to_bool(&single_arg(key, args, line)?),
        "endpoint" => route.endpoint = Some(single_arg(key, args, line)?),
        "include" | "exclude" => {
            if args.is_empty() {
                return Err(DirectiveError::new(
                    line,
                    format!("`{}` needs at least one rule", key),
                ));
            }
            let rules = if key == "include" {
                &mut route.include
            } else {
                &mut route.exclude
            };
            rules.extend(args);
        }
        "header_upstream" => {
            let mut args = args.into_iter();
            let (Some(name), Some(first)) = (args.next(), args.next()) else {
                return Err(DirectiveError::new(
                    line,
                    "`header_upstream` needs a header name and a value",
                ));
            };
            let value = std::iter::once(first).chain(args).collect::<Vec<_>>().join(" ");
            route.upstream_headers.insert(name, vec![value]);
        }
        other => {
            return Err(DirectiveError::new(
                line,
                format!("unknown directive `{}`", other),
            ));
        }
    }
    Ok(())
}

/// `1`, `y`, `yes`, `true` and `on` (any case) are true; everything else is false.
pub fn to_bool(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "y" | "yes" | "true" | "on"
    )
}

/// Parse a directive file into route configs, in file order.
pub fn parse_directives(input: &str) -> Result<Vec<RouteConfig>, DirectiveError> {
    let tokens = tokenize(input)?;
    Parser { tokens, pos: 0 }.parse_file()
}
