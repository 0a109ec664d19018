use crate::token::{is_tag_char, RawAttribute, Span, Token, TokenKind};

/// Shorthand source scanner.
///
/// Tokenizes an abbreviation such as `ul>li.item$*3>a[href=#]{Link $}` into a
/// flat token stream. Scanning never fails: anything the grammar does not know
/// becomes [`TokenKind::Unknown`] and unterminated `[...]` / `{...}` blocks run
/// to the end of input.
///
/// - `Vec<char>` source for index-based navigation
/// - Position tracking on every token
/// - Escapes (`\X`) and `$` placeholders are passed through untouched
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens, terminated by `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens();
        scanner.tokens
    }

    fn scan_tokens(&mut self) {
        while !self.is_at_end() {
            self.scan_token();
        }
        self.emit(TokenKind::Eof, self.pos, self.line, self.column);
    }

    /// Scan the next token.
    fn scan_token(&mut self) {
        let start = self.pos;
        let line = self.line;
        let column = self.column;
        let ch = self.peek();

        match ch {
            ' ' | '\t' | '\r' | '\n' => self.advance(),

            '>' => self.single(TokenKind::Child),
            '+' => self.single(TokenKind::Sibling),
            '^' => self.single(TokenKind::ClimbUp),
            '(' => self.single(TokenKind::GroupOpen),
            ')' => self.single(TokenKind::GroupClose),

            '#' => {
                self.advance();
                let ident = self.scan_identifier();
                self.emit(TokenKind::Id(ident), start, line, column);
            }
            '.' => {
                self.advance();
                let ident = self.scan_identifier();
                self.emit(TokenKind::Class(ident), start, line, column);
            }
            '[' => {
                self.advance();
                let attrs = self.scan_attributes();
                self.emit(TokenKind::Attributes(attrs), start, line, column);
            }
            '{' => {
                self.advance();
                let text = self.scan_text();
                self.emit(TokenKind::Text(text), start, line, column);
            }
            '*' => {
                self.advance();
                let count = self.scan_number().filter(|n| *n > 0).unwrap_or(1);
                self.emit(TokenKind::Multiplier(count), start, line, column);
            }

            c if is_tag_char(c) => {
                let mut name = String::new();
                while !self.is_at_end() && is_tag_char(self.peek()) {
                    name.push(self.peek());
                    self.advance();
                }
                self.emit(TokenKind::Name(name), start, line, column);
            }

            c => {
                log::trace!(
                    target: "tagshift.lexer",
                    "unknown character {c:?} at line {line}, column {column}"
                );
                self.single(TokenKind::Unknown(c));
            }
        }
    }

    // --- Scanners ---

    /// Scan an id or class identifier. `$` placeholders and `\X` escapes are kept raw.
    fn scan_identifier(&mut self) -> String {
        let mut ident = String::new();

        while !self.is_at_end() {
            let c = self.peek();
            if c == '\\' && self.pos + 1 < self.chars.len() {
                ident.push(c);
                self.advance();
                ident.push(self.peek());
                self.advance();
            } else if c.is_alphanumeric() || matches!(c, '-' | '_' | '$') {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }

        ident
    }

    /// Scan `name`, `name=value`, `name="value"` entries up to the closing `]`.
    fn scan_attributes(&mut self) -> Vec<RawAttribute> {
        let mut attrs = Vec::new();

        loop {
            self.skip_whitespace();
            if self.is_at_end() || self.peek() == ']' {
                break;
            }

            let mut name = String::new();
            while !self.is_at_end() {
                let c = self.peek();
                if c.is_whitespace() || matches!(c, '=' | ']' | '"' | '\'') {
                    break;
                }
                name.push(c);
                self.advance();
            }

            if name.is_empty() {
                // Stray `=` or quote: drop it and keep going
                self.advance();
                continue;
            }

            let value = if self.peek() == '=' {
                self.advance(); // consume =
                Some(self.scan_attribute_value())
            } else {
                None
            };

            attrs.push(RawAttribute { name, value });
        }

        if !self.is_at_end() {
            self.advance(); // consume ]
        }

        attrs
    }

    fn scan_attribute_value(&mut self) -> String {
        let mut value = String::new();
        let quote = self.peek();

        if quote == '"' || quote == '\'' {
            self.advance(); // consume opening quote
            while !self.is_at_end() && self.peek() != quote {
                self.push_escaped_or_char(&mut value);
            }
            if !self.is_at_end() {
                self.advance(); // consume closing quote
            }
        } else {
            while !self.is_at_end() && !self.peek().is_whitespace() && self.peek() != ']' {
                self.push_escaped_or_char(&mut value);
            }
        }

        value
    }

    /// Scan `{text}` content. Tracks brace depth so `{a {b} c}` stays one token.
    fn scan_text(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 1;

        while !self.is_at_end() {
            match self.peek() {
                '{' => {
                    depth += 1;
                    text.push('{');
                    self.advance();
                }
                '}' => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                    text.push('}');
                }
                _ => self.push_escaped_or_char(&mut text),
            }
        }

        text
    }

    fn scan_number(&mut self) -> Option<usize> {
        let mut digits = String::new();
        while !self.is_at_end() && self.peek().is_ascii_digit() {
            digits.push(self.peek());
            self.advance();
        }
        // Too many digits for usize: saturate so the parser's node limit applies
        digits
            .parse()
            .ok()
            .or_else(|| (!digits.is_empty()).then_some(usize::MAX))
    }

    /// Push the current character; a backslash drags the following character along with it.
    fn push_escaped_or_char(&mut self, out: &mut String) {
        if self.peek() == '\\' && self.pos + 1 < self.chars.len() {
            out.push('\\');
            self.advance();
        }
        out.push(self.peek());
        self.advance();
    }

    // --- Helpers ---

    fn single(&mut self, kind: TokenKind) {
        let (start, line, column) = (self.pos, self.line, self.column);
        self.advance();
        self.emit(kind, start, line, column);
    }

    fn emit(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        let span = Span::new(start, self.pos, line, column);
        self.tokens.push(Token::new(kind, span));
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn advance(&mut self) {
        if self.is_at_end() {
            return;
        }
        if self.chars[self.pos] == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }
}
