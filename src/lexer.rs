use tracing::trace;

use crate::diag::DiagSink;
use crate::intern::{FilePool, Interner};
use crate::scope::{ClassifyIdent, IdentClass};
use crate::token::{SourceLoc, Token, TokenType};

/// Pull lexer over preprocessed HLSL source. Identifiers are classified
/// against the live scope stack as they are scanned, so the parser never
/// needs to backtrack between declarations and expressions. `#line`
/// directives update the location tracker and grow the file pool.
pub struct Lexer<'src> {
    src: &'src [u8],
    pos: usize,
    line: u32,
    col: u32,
    file: crate::intern::FileId,
}

fn keyword(text: &str) -> Option<TokenType> {
    let kind = match text {
        "extern" => TokenType::Extern,
        "static" => TokenType::Static,
        "uniform" => TokenType::Uniform,
        "volatile" => TokenType::Volatile,
        "const" => TokenType::Const,
        "precise" => TokenType::Precise,
        "shared" => TokenType::Shared,
        "groupshared" => TokenType::Groupshared,
        "nointerpolation" => TokenType::Nointerpolation,
        "row_major" => TokenType::RowMajor,
        "column_major" => TokenType::ColumnMajor,
        "in" => TokenType::In,
        "out" => TokenType::Out,
        "inout" => TokenType::Inout,
        "struct" => TokenType::Struct,
        "typedef" => TokenType::Typedef,
        "register" => TokenType::Register,
        "if" => TokenType::If,
        "else" => TokenType::Else,
        "while" => TokenType::While,
        "do" => TokenType::Do,
        "for" => TokenType::For,
        "return" => TokenType::Return,
        "break" => TokenType::Break,
        "continue" => TokenType::Continue,
        "technique" => TokenType::Technique,
        "pass" => TokenType::Pass,
        "sampler_state" => TokenType::SamplerState,
        "stateblock" => TokenType::StateBlock,
        "compile" => TokenType::Compile,
        "true" => TokenType::BoolConst(true),
        "false" => TokenType::BoolConst(false),
        _ => return None,
    };
    Some(kind)
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, pool: &FilePool) -> Self {
        Lexer {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            file: pool.main_file(),
        }
    }

    fn loc(&self) -> SourceLoc {
        SourceLoc::new(self.file, self.line, self.col)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        if c == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek() {
            if c == b'\n' {
                break;
            }
            self.bump();
        }
    }

    /// Consumes a `#line <num> ["file"]` directive, updating the tracker.
    /// The directive names the line that follows it.
    fn directive(&mut self, pool: &mut FilePool, diag: &mut DiagSink) {
        let loc = self.loc();
        self.bump(); // '#'
        let word_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let word = &self.src[word_start..self.pos];
        if word != b"line" {
            diag.error(
                pool,
                loc,
                format!(
                    "unexpected preprocessor directive '#{}'",
                    String::from_utf8_lossy(word)
                ),
            );
            self.skip_to_eol();
            return;
        }
        while self.peek() == Some(b' ') || self.peek() == Some(b'\t') {
            self.bump();
        }
        let mut line: u32 = 0;
        let mut saw_digit = false;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            saw_digit = true;
            line = line.saturating_mul(10).saturating_add((c - b'0') as u32);
            self.bump();
        }
        if !saw_digit {
            diag.error(pool, loc, "expected line number after '#line'".to_string());
            self.skip_to_eol();
            return;
        }
        while self.peek() == Some(b' ') || self.peek() == Some(b'\t') {
            self.bump();
        }
        if self.peek() == Some(b'"') {
            self.bump();
            let start = self.pos;
            while self.peek().is_some_and(|c| c != b'"' && c != b'\n') {
                self.bump();
            }
            let name = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
            if self.peek() == Some(b'"') {
                self.bump();
            }
            self.file = pool.intern(&name);
        }
        self.skip_to_eol();
        if self.peek() == Some(b'\n') {
            self.pos += 1;
        }
        self.line = line;
        self.col = 1;
        trace!(line, file = pool.resolve(self.file), "#line directive");
    }

    fn skip_trivia(&mut self, pool: &mut FilePool, diag: &mut DiagSink) {
        loop {
            match self.peek() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => {
                    self.bump();
                }
                Some(b'#') if self.col == 1 => {
                    self.directive(pool, diag);
                }
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    self.skip_to_eol();
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => break,
                            Some(b'*') if self.peek_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            _ => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn number(&mut self) -> TokenType {
        let start = self.pos;
        if self.peek() == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x') | Some(b'X'))
            && self.peek_at(2).is_some_and(|c| c.is_ascii_hexdigit())
        {
            self.bump();
            self.bump();
            let mut value: i64 = 0;
            while let Some(c) = self.peek() {
                let digit = match c {
                    b'0'..=b'9' => (c - b'0') as i64,
                    b'a'..=b'f' => (c - b'a') as i64 + 10,
                    b'A'..=b'F' => (c - b'A') as i64 + 10,
                    _ => break,
                };
                value = value.wrapping_mul(16).wrapping_add(digit);
                self.bump();
            }
            while matches!(self.peek(), Some(b'u') | Some(b'U') | Some(b'l') | Some(b'L')) {
                self.bump();
            }
            return TokenType::IntConst(value);
        }

        let mut is_float = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        } else if self.peek() == Some(b'.')
            && !self
                .peek_at(1)
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            // "1." with nothing swizzle-like after it
            is_float = true;
            self.bump();
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E'))
            && (self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
                || (matches!(self.peek_at(1), Some(b'+') | Some(b'-'))
                    && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())))
        {
            is_float = true;
            self.bump();
            if matches!(self.peek(), Some(b'+') | Some(b'-')) {
                self.bump();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = &self.src[start..self.pos];
        if matches!(self.peek(), Some(b'f') | Some(b'F') | Some(b'h') | Some(b'H')) {
            is_float = true;
            self.bump();
        } else if !is_float {
            while matches!(self.peek(), Some(b'u') | Some(b'U') | Some(b'l') | Some(b'L')) {
                self.bump();
            }
        }
        let text = std::str::from_utf8(text).unwrap_or("0");
        if is_float {
            TokenType::FloatConst(text.parse().unwrap_or(0.0))
        } else {
            TokenType::IntConst(text.parse().unwrap_or(0))
        }
    }

    fn ident(
        &mut self,
        interner: &mut Interner,
        scopes: &dyn ClassifyIdent,
    ) -> TokenType {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.bump();
        }
        let text = std::str::from_utf8(&self.src[start..self.pos]).unwrap_or("");
        if let Some(kind) = keyword(text) {
            return kind;
        }
        let sym = interner.intern(text);
        match scopes.classify(sym) {
            IdentClass::Var => TokenType::VarName(sym),
            IdentClass::Type => TokenType::TypeName(sym),
            IdentClass::New => TokenType::NewIdent(sym),
        }
    }

    fn operator(&mut self, pool: &FilePool, diag: &mut DiagSink) -> TokenType {
        let c = self.peek().expect("caller checked for EOF");
        let two = self.peek_at(1);
        let three = self.peek_at(2);
        macro_rules! tok {
            ($n:expr, $kind:expr) => {{
                for _ in 0..$n {
                    self.bump();
                }
                $kind
            }};
        }
        match (c, two, three) {
            (b'<', Some(b'<'), Some(b'=')) => tok!(3, TokenType::ShlAssign),
            (b'>', Some(b'>'), Some(b'=')) => tok!(3, TokenType::ShrAssign),
            (b'<', Some(b'<'), _) => tok!(2, TokenType::Shl),
            (b'>', Some(b'>'), _) => tok!(2, TokenType::Shr),
            (b'<', Some(b'='), _) => tok!(2, TokenType::Le),
            (b'>', Some(b'='), _) => tok!(2, TokenType::Ge),
            (b'=', Some(b'='), _) => tok!(2, TokenType::EqEq),
            (b'!', Some(b'='), _) => tok!(2, TokenType::Ne),
            (b'&', Some(b'&'), _) => tok!(2, TokenType::AndAnd),
            (b'|', Some(b'|'), _) => tok!(2, TokenType::OrOr),
            (b'+', Some(b'+'), _) => tok!(2, TokenType::Inc),
            (b'-', Some(b'-'), _) => tok!(2, TokenType::Dec),
            (b'+', Some(b'='), _) => tok!(2, TokenType::AddAssign),
            (b'-', Some(b'='), _) => tok!(2, TokenType::SubAssign),
            (b'*', Some(b'='), _) => tok!(2, TokenType::MulAssign),
            (b'/', Some(b'='), _) => tok!(2, TokenType::DivAssign),
            (b'%', Some(b'='), _) => tok!(2, TokenType::ModAssign),
            (b'&', Some(b'='), _) => tok!(2, TokenType::AndAssign),
            (b'|', Some(b'='), _) => tok!(2, TokenType::OrAssign),
            (b'^', Some(b'='), _) => tok!(2, TokenType::XorAssign),
            (b'(', _, _) => tok!(1, TokenType::LParen),
            (b')', _, _) => tok!(1, TokenType::RParen),
            (b'{', _, _) => tok!(1, TokenType::LBrace),
            (b'}', _, _) => tok!(1, TokenType::RBrace),
            (b'[', _, _) => tok!(1, TokenType::LBracket),
            (b']', _, _) => tok!(1, TokenType::RBracket),
            (b',', _, _) => tok!(1, TokenType::Comma),
            (b';', _, _) => tok!(1, TokenType::Semicolon),
            (b':', _, _) => tok!(1, TokenType::Colon),
            (b'.', _, _) => tok!(1, TokenType::Dot),
            (b'?', _, _) => tok!(1, TokenType::Question),
            (b'+', _, _) => tok!(1, TokenType::Plus),
            (b'-', _, _) => tok!(1, TokenType::Minus),
            (b'*', _, _) => tok!(1, TokenType::Star),
            (b'/', _, _) => tok!(1, TokenType::Slash),
            (b'%', _, _) => tok!(1, TokenType::Percent),
            (b'!', _, _) => tok!(1, TokenType::Not),
            (b'~', _, _) => tok!(1, TokenType::Tilde),
            (b'<', _, _) => tok!(1, TokenType::Lt),
            (b'>', _, _) => tok!(1, TokenType::Gt),
            (b'=', _, _) => tok!(1, TokenType::Assign),
            (b'&', _, _) => tok!(1, TokenType::Amp),
            (b'|', _, _) => tok!(1, TokenType::Pipe),
            (b'^', _, _) => tok!(1, TokenType::Caret),
            _ => {
                let loc = self.loc();
                diag.error(pool, loc, format!("unexpected character '{}'", c as char));
                self.bump();
                TokenType::Eof
            }
        }
    }

    /// Scans the next token. `scopes` supplies the live identifier
    /// classification; `pool` grows when a `#line` directive names a file
    /// not seen before.
    pub fn next_token(
        &mut self,
        interner: &mut Interner,
        pool: &mut FilePool,
        scopes: &dyn ClassifyIdent,
        diag: &mut DiagSink,
    ) -> Token {
        loop {
            self.skip_trivia(pool, diag);
            let loc = self.loc();
            let Some(c) = self.peek() else {
                return Token::new(TokenType::Eof, loc);
            };
            let kind = if c.is_ascii_digit()
                || (c == b'.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()))
            {
                self.number()
            } else if c.is_ascii_alphabetic() || c == b'_' {
                self.ident(interner, scopes)
            } else if c == b'"' {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|d| d != b'"' && d != b'\n') {
                    self.bump();
                }
                let text = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                if self.peek() == Some(b'"') {
                    self.bump();
                } else {
                    diag.error(pool, loc, "unterminated string constant".to_string());
                }
                TokenType::StringConst(interner.intern(&text))
            } else {
                self.operator(pool, diag)
            };
            if kind == TokenType::Eof && self.peek().is_some() {
                // Bad character was reported; keep scanning.
                continue;
            }
            return Token::new(kind, loc);
        }
    }
}
