//! Parser for custom method declarations
//!
//! Directors may add declarations to a class interface as free text. The
//! accepted grammar is:
//!
//! ```text
//! decl    := visibility? ('virtual' | 'static')? type? '~'? name
//!            '(' params? ')' 'const'? 'override'? ('=' '0')? ';'?
//! params  := 'void' | param (',' param)*
//! param   := type name? ('[' ']')? ('=' default)?
//! type    := word+ with '*', '&' and '<...>' template arguments
//! ```
//!
//! A missing type is only valid for constructors (name equals the class).

use crate::diagnostics::{WeldError, WeldResult};
use crate::extractor::function::{MethodDef, ParamDef};
use crate::extractor::item::Protection;

/// Words that are part of a type, never a parameter name
const TYPE_WORDS: &[&str] = &[
    "void", "bool", "char", "short", "int", "long", "float", "double", "unsigned", "signed",
    "const", "volatile", "struct", "enum", "wchar_t", "size_t",
];

/// Words that only qualify a following type
const QUALIFIERS: &[&str] = &["const", "volatile", "unsigned", "signed", "struct", "enum"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Word(String),
    Sym(char),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Word(w) => format!("'{}'", w),
            Tok::Sym(c) => format!("'{}'", c),
        }
    }
}

/// Parsed custom declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDecl {
    /// Explicit visibility prefix
    pub protection: Option<Protection>,
    /// `virtual` prefix
    pub is_virtual: bool,
    /// `static` prefix
    pub is_static: bool,
    /// Return type; `None` for constructors and destructors
    pub return_type: Option<String>,
    /// Method name (without `~`)
    pub name: String,
    /// Destructor
    pub is_dtor: bool,
    /// Parameters
    pub params: Vec<ParamDef>,
    /// `const` suffix
    pub is_const: bool,
    /// `override` suffix
    pub is_override: bool,
    /// `= 0` suffix
    pub is_pure_virtual: bool,
}

impl CustomDecl {
    /// Build the method definition for a class
    pub fn into_method(self, class: &str) -> MethodDef {
        let mut method = if self.is_dtor {
            MethodDef::dtor(class)
        } else if self.return_type.is_none() {
            MethodDef::ctor(class)
        } else {
            MethodDef::new(self.name.clone()).in_class(class)
        };
        if let Some(ty) = self.return_type {
            method.return_type = Some(ty);
        }
        method.params = self.params;
        method.is_virtual = self.is_virtual || self.is_pure_virtual;
        method.is_pure_virtual = self.is_pure_virtual;
        method.is_static = self.is_static;
        method.is_const = self.is_const;
        method.is_override = self.is_override;
        if let Some(protection) = self.protection {
            method.info.protection = protection;
        }
        method
    }
}

/// Whether a custom declaration text declares a method
pub fn is_method_decl(decl: &str) -> bool {
    match (decl.find('('), decl.rfind(')')) {
        (Some(open), Some(close)) => open < close,
        _ => false,
    }
}

/// Parse a custom method declaration for `class`
pub fn parse_method_decl(class: &str, decl: &str) -> WeldResult<CustomDecl> {
    let text = decl.replace('\n', " ");
    DeclParser::new(class, &text, decl).parse()
}

/// Split `type name` text into the type and an optional name
pub fn split_type_and_name(text: &str) -> (String, Option<String>) {
    let mut parser = DeclParser::new("", text, text);
    let mut tokens = Vec::new();
    while let Ok(Some((_, tok))) = parser.next() {
        tokens.push(tok);
    }
    split_param_tokens(&tokens)
}

fn join_type(tokens: &[Tok]) -> String {
    let mut out = String::new();
    for tok in tokens {
        match tok {
            Tok::Word(w) => {
                if !out.is_empty() && !out.ends_with(['<', ':']) {
                    out.push(' ');
                }
                out.push_str(w);
            }
            Tok::Sym(c @ ('*' | '&')) => {
                if !out.is_empty() && !out.ends_with(['*', '&']) {
                    out.push(' ');
                }
                out.push(*c);
            }
            Tok::Sym(c) => out.push(*c),
        }
    }
    out
}

fn split_param_tokens(tokens: &[Tok]) -> (String, Option<String>) {
    if let Some((Tok::Word(last), head)) = tokens.split_last() {
        let head_is_type = head.iter().any(|t| match t {
            Tok::Word(w) => !QUALIFIERS.contains(&w.as_str()),
            Tok::Sym(c) => matches!(c, '*' | '&' | '>'),
        });
        if head_is_type && !TYPE_WORDS.contains(&last.as_str()) {
            return (join_type(head), Some(last.clone()));
        }
    }
    (join_type(tokens), None)
}

struct DeclParser<'a> {
    class: &'a str,
    src: &'a str,
    original: &'a str,
    pos: usize,
}

impl<'a> DeclParser<'a> {
    fn new(class: &'a str, src: &'a str, original: &'a str) -> Self {
        Self {
            class,
            src,
            original,
            pos: 0,
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> WeldError {
        WeldError::DeclParse {
            class: self.class.to_string(),
            decl: self.original.trim().to_string(),
            message: message.into(),
            offset,
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Lex the next token without consuming it
    fn peek(&mut self) -> WeldResult<Option<(usize, Tok)>> {
        let save = self.pos;
        let tok = self.next();
        self.pos = save;
        tok
    }

    fn next(&mut self) -> WeldResult<Option<(usize, Tok)>> {
        self.skip_ws();
        let start = self.pos;
        let rest = &self.src[start..];
        let Some(c) = rest.chars().next() else {
            return Ok(None);
        };
        if c.is_ascii_alphanumeric() || c == '_' {
            let mut end = 0;
            let bytes = rest.as_bytes();
            while end < bytes.len() {
                let b = bytes[end];
                if b.is_ascii_alphanumeric() || b == b'_' {
                    end += 1;
                } else if b == b':' && bytes.get(end + 1) == Some(&b':') {
                    end += 2;
                } else {
                    break;
                }
            }
            self.pos += end;
            return Ok(Some((start, Tok::Word(rest[..end].to_string()))));
        }
        match c {
            '*' | '&' | '(' | ')' | '<' | '>' | ',' | '[' | ']' | '=' | '~' | ';' | ':' => {
                self.pos += 1;
                Ok(Some((start, Tok::Sym(c))))
            }
            other => Err(self.error(start, format!("unexpected character '{}'", other))),
        }
    }

    fn eat_word(&mut self, word: &str) -> WeldResult<bool> {
        match self.peek()? {
            Some((_, Tok::Word(w))) if w == word => {
                self.next()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn eat_sym(&mut self, sym: char) -> WeldResult<bool> {
        match self.peek()? {
            Some((_, Tok::Sym(c))) if c == sym => {
                self.next()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn expect_sym(&mut self, sym: char) -> WeldResult<()> {
        match self.next()? {
            Some((_, Tok::Sym(c))) if c == sym => Ok(()),
            Some((at, tok)) => {
                Err(self.error(at, format!("expected '{}' but found {}", sym, tok.describe())))
            }
            None => Err(self.error(self.src.len(), format!("expected '{}' at end of input", sym))),
        }
    }

    fn parse(mut self) -> WeldResult<CustomDecl> {
        let protection = if self.eat_word("public")? {
            Some(Protection::Public)
        } else if self.eat_word("protected")? {
            Some(Protection::Protected)
        } else {
            None
        };
        if protection.is_some() {
            self.eat_sym(':')?;
        }
        let is_virtual = self.eat_word("virtual")?;
        let is_static = !is_virtual && self.eat_word("static")?;

        // everything up to the opening parenthesis is `type? '~'? name`
        let mut head: Vec<(usize, Tok)> = Vec::new();
        loop {
            match self.next()? {
                Some((_, Tok::Sym('('))) => break,
                Some((_, Tok::Sym('<'))) => {
                    head.push((self.pos - 1, Tok::Sym('<')));
                    self.template_args(&mut head)?;
                }
                Some(tok) => head.push(tok),
                None => return Err(self.error(self.src.len(), "missing '(' after method name")),
            }
        }

        let (name, type_tokens, is_dtor) = self.split_head(head)?;
        let params = self.params()?;
        let is_const = self.eat_word("const")?;
        let is_override = self.eat_word("override")?;
        let is_pure_virtual = if self.eat_sym('=')? {
            match self.next()? {
                Some((_, Tok::Word(w))) if w == "0" => true,
                Some((at, tok)) => {
                    return Err(self.error(at, format!("expected '0' but found {}", tok.describe())))
                }
                None => return Err(self.error(self.src.len(), "expected '0' at end of input")),
            }
        } else {
            false
        };
        self.eat_sym(';')?;
        if let Some((at, tok)) = self.next()? {
            return Err(self.error(at, format!("unexpected {} after declaration", tok.describe())));
        }

        let return_type = if type_tokens.is_empty() {
            if !is_dtor && name != self.class {
                return Err(self.error(0, format!("missing return type for '{}'", name)));
            }
            None
        } else {
            if is_dtor {
                return Err(self.error(0, "destructor cannot declare a return type"));
            }
            Some(join_type(&type_tokens))
        };

        Ok(CustomDecl {
            protection,
            is_virtual,
            is_static,
            return_type,
            name,
            is_dtor,
            params,
            is_const,
            is_override,
            is_pure_virtual,
        })
    }

    fn template_args(&mut self, into: &mut Vec<(usize, Tok)>) -> WeldResult<()> {
        let mut depth = 1;
        while depth > 0 {
            match self.next()? {
                Some((at, Tok::Sym('<'))) => {
                    depth += 1;
                    into.push((at, Tok::Sym('<')));
                }
                Some((at, Tok::Sym('>'))) => {
                    depth -= 1;
                    into.push((at, Tok::Sym('>')));
                }
                Some(tok) => into.push(tok),
                None => return Err(self.error(self.src.len(), "unterminated template argument list")),
            }
        }
        Ok(())
    }

    fn split_head(&self, mut head: Vec<(usize, Tok)>) -> WeldResult<(String, Vec<Tok>, bool)> {
        // operator names span several tokens
        if let Some(op) = head
            .iter()
            .position(|(_, t)| matches!(t, Tok::Word(w) if w == "operator"))
        {
            let name: String = head[op..]
                .iter()
                .map(|(_, t)| match t {
                    Tok::Word(w) => w.clone(),
                    Tok::Sym(c) => c.to_string(),
                })
                .collect();
            let ty = head.drain(..op).map(|(_, t)| t).collect();
            return Ok((name, ty, false));
        }

        let name = match head.pop() {
            Some((_, Tok::Word(w))) => w,
            Some((at, tok)) => {
                return Err(self.error(at, format!("expected method name but found {}", tok.describe())))
            }
            None => return Err(self.error(0, "missing method name")),
        };
        let is_dtor = matches!(head.last(), Some((_, Tok::Sym('~'))));
        if is_dtor {
            head.pop();
        }
        Ok((name, head.into_iter().map(|(_, t)| t).collect(), is_dtor))
    }

    fn params(&mut self) -> WeldResult<Vec<ParamDef>> {
        let mut params = Vec::new();
        if self.eat_sym(')')? {
            return Ok(params);
        }
        loop {
            let mut tokens = Vec::new();
            let mut array = false;
            let mut default = None;
            loop {
                match self.next()? {
                    Some((_, Tok::Sym(',' | ')'))) => {
                        self.pos -= 1;
                        break;
                    }
                    Some((at, Tok::Sym('<'))) => {
                        let mut inner = vec![(at, Tok::Sym('<'))];
                        self.template_args(&mut inner)?;
                        tokens.extend(inner.into_iter().map(|(_, t)| t));
                    }
                    Some((_, Tok::Sym('['))) => {
                        self.expect_sym(']')?;
                        array = true;
                    }
                    Some((_, Tok::Sym('='))) => {
                        default = Some(self.default_value()?);
                    }
                    Some((_, tok)) => tokens.push(tok),
                    None => return Err(self.error(self.src.len(), "unterminated parameter list")),
                }
            }
            let at = self.pos;
            if tokens.is_empty() {
                return Err(self.error(at, "empty parameter declaration"));
            }
            let lone_void = tokens == [Tok::Word("void".to_string())];
            if !(lone_void && params.is_empty()) {
                let (ty, name) = split_param_tokens(&tokens);
                params.push(ParamDef {
                    name: name.unwrap_or_default(),
                    ty,
                    default,
                    array,
                });
            }
            if self.eat_sym(')')? {
                return Ok(params);
            }
            self.expect_sym(',')?;
        }
    }

    /// Raw default value text up to the next top-level ',' or ')'
    fn default_value(&mut self) -> WeldResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        let mut in_str: Option<char> = None;
        for (i, c) in self.src[start..].char_indices() {
            match (in_str, c) {
                (Some(q), _) if c == q => in_str = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => in_str = Some(c),
                (None, '(' | '<') => depth += 1,
                (None, ')' | '>') if depth > 0 => depth -= 1,
                (None, ',' | ')') if depth == 0 => {
                    self.pos = start + i;
                    let value = self.src[start..self.pos].trim();
                    if value.is_empty() {
                        return Err(self.error(start, "missing default value"));
                    }
                    return Ok(value.to_string());
                }
                _ => {}
            }
        }
        Err(self.error(self.src.len(), "unterminated default value"))
    }
}
