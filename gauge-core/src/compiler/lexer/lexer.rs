//! 手写词法分析器
//!
//! 输出完整的 token 序列（以 `Eof` 结尾）。空白与注释被丢弃，
//! 但 token 会记录其前面是否出现过换行，语句分隔依赖这一信息。

use super::error::{LexerError, LexerErrorKind};
use super::token_kind::TokenKind;
use super::types::{Coordinate, Span};
use gauge_config::targets;
use tracing::trace;

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 原始文本；字符串字面量为转义后的内容
    pub text: String,
    pub span: Span,
    /// 该 token 与前一个 token 之间是否有换行
    pub newline_before: bool,
}

/// 对源码做词法分析
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let tokens = Lexer::new(source).run()?;
    trace!(target: targets::LEXER, count = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Evaluate a number token, including magnitude suffixes (`5k`, `2M`, ...).
pub fn number_value(text: &str) -> Option<f64> {
    let (digits, multiplier) = match text.chars().last() {
        Some('k') => (&text[..text.len() - 1], 1e3),
        Some('M') => (&text[..text.len() - 1], 1e6),
        Some('B') => (&text[..text.len() - 1], 1e9),
        Some('T') => (&text[..text.len() - 1], 1e12),
        _ => (text, 1.0),
    };
    digits.parse::<f64>().ok().map(|value| value * multiplier)
}

struct Lexer {
    chars: Vec<(usize, char)>,
    source_len: usize,
    index: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.char_indices().collect(),
            source_len: source.len(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).map(|(_, c)| *c)
    }

    fn coordinate(&self) -> Coordinate {
        Coordinate {
            line: self.line,
            column: self.column,
            offset: self
                .chars
                .get(self.index)
                .map(|(offset, _)| *offset)
                .unwrap_or(self.source_len),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, kind: LexerErrorKind) -> LexerError {
        LexerError::at(kind, self.coordinate())
    }

    fn run(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let newline_before = self.skip_trivia()?;
            let start = self.coordinate();
            let Some(c) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    span: Span::at(start),
                    newline_before,
                });
                return Ok(tokens);
            };

            let (kind, text) = if c.is_ascii_digit()
                || (c == '.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()))
            {
                (TokenKind::Number, self.lex_number()?)
            } else if c == '"' || c == '\'' {
                (TokenKind::String, self.lex_string(c)?)
            } else if is_identifier_start(c) {
                let text = self.lex_identifier();
                let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
                (kind, text)
            } else {
                self.lex_symbol(c)?
            };

            tokens.push(Token {
                kind,
                text,
                span: Span::new(start, self.coordinate()),
                newline_before,
            });
        }
    }

    /// 跳过空白与注释，返回途中是否遇到换行
    fn skip_trivia(&mut self) -> Result<bool, LexerError> {
        let mut newline = false;
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some('\n'), _) => {
                    newline = true;
                    self.bump();
                }
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.coordinate();
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some('*'), Some('/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(c), _) => {
                                newline |= c == '\n';
                                self.bump();
                            }
                            (None, _) => {
                                return Err(LexerError::at(
                                    LexerErrorKind::UnterminatedComment,
                                    start,
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(newline),
            }
        }
    }

    fn lex_number(&mut self) -> Result<String, LexerError> {
        let mut text = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
            text.push(c);
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                text.push(c);
                self.bump();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let signed = matches!(self.peek_at(1), Some('+') | Some('-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    if let Some(c) = self.bump() {
                        text.push(c);
                    }
                }
                while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                    text.push(c);
                    self.bump();
                }
            }
        }
        if let Some(suffix) = self.peek().filter(|c| matches!(*c, 'k' | 'M' | 'B' | 'T')) {
            if !self.peek_at(1).is_some_and(is_identifier_part) {
                text.push(suffix);
                self.bump();
            }
        }
        if self.peek().is_some_and(is_identifier_part) {
            return Err(self.error(LexerErrorKind::InvalidNumber(text)));
        }
        Ok(text)
    }

    fn lex_string(&mut self, quote: char) -> Result<String, LexerError> {
        let start = self.coordinate();
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(text),
                Some('\\') => {
                    let escaped = self
                        .bump()
                        .ok_or_else(|| LexerError::at(LexerErrorKind::UnterminatedString, start))?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '\\' => '\\',
                        '"' => '"',
                        '\'' => '\'',
                        other => return Err(self.error(LexerErrorKind::InvalidEscape(other))),
                    });
                }
                Some(c) => text.push(c),
                None => return Err(LexerError::at(LexerErrorKind::UnterminatedString, start)),
            }
        }
    }

    /// 标识符；大写开头的点分名（`List.map`）作为一个整体
    fn lex_identifier(&mut self) -> String {
        let mut text = String::new();
        let qualified = self.peek().is_some_and(|c| c.is_ascii_uppercase());
        loop {
            while let Some(c) = self.peek().filter(|c| is_identifier_part(*c)) {
                text.push(c);
                self.bump();
            }
            if qualified
                && self.peek() == Some('.')
                && self.peek_at(1).is_some_and(is_identifier_start)
            {
                text.push('.');
                self.bump();
                continue;
            }
            return text;
        }
    }

    fn lex_symbol(&mut self, first: char) -> Result<(TokenKind, String), LexerError> {
        let second = self.peek_at(1);

        let double = match (first, second) {
            ('=', Some('=')) => Some(TokenKind::DoubleEqual),
            ('!', Some('=')) => Some(TokenKind::ExclamationEqual),
            ('>', Some('=')) => Some(TokenKind::GreaterThanEqual),
            ('<', Some('=')) => Some(TokenKind::LessThanEqual),
            ('&', Some('&')) => Some(TokenKind::AndAnd),
            ('|', Some('|')) => Some(TokenKind::OrOr),
            ('-', Some('>')) => Some(TokenKind::Arrow),
            _ => None,
        };
        if let Some(kind) = double {
            let mut text = String::new();
            for _ in 0..2 {
                if let Some(c) = self.bump() {
                    text.push(c);
                }
            }
            return Ok((kind, text));
        }

        let kind = match first {
            '>' => TokenKind::GreaterThan,
            '<' => TokenKind::LessThan,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Asterisk,
            '/' => TokenKind::Slash,
            '^' => TokenKind::Caret,
            '!' => TokenKind::Exclamation,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '=' => TokenKind::Equal,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '|' => TokenKind::Pipe,
            '(' => TokenKind::LeftParenthesis,
            ')' => TokenKind::RightParenthesis,
            '{' => TokenKind::LeftCurlyBrace,
            '}' => TokenKind::RightCurlyBrace,
            '[' => TokenKind::LeftSquareBracket,
            ']' => TokenKind::RightSquareBracket,
            other => return Err(self.error(LexerErrorKind::UnexpectedChar(other))),
        };
        self.bump();
        Ok((kind, first.to_string()))
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenize_assignment() {
        assert_eq!(
            kinds("x = 1"),
            vec![
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_tokenize_double_char_symbols() {
        assert_eq!(
            kinds("a == b != c -> d && e || f <= g >= h"),
            vec![
                TokenKind::Identifier,
                TokenKind::DoubleEqual,
                TokenKind::Identifier,
                TokenKind::ExclamationEqual,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::AndAnd,
                TokenKind::Identifier,
                TokenKind::OrOr,
                TokenKind::Identifier,
                TokenKind::LessThanEqual,
                TokenKind::Identifier,
                TokenKind::GreaterThanEqual,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_qualified_identifier() {
        let tokens = tokenize("List.map(xs, f)").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[0].text, "List.map");
    }

    #[test]
    fn test_lowercase_dot_is_lookup() {
        let tokens = tokenize("a.b").unwrap();
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].kind, TokenKind::Dot);
        assert_eq!(tokens[2].text, "b");
    }

    #[test]
    fn test_number_suffix_and_exponent() {
        let tokens = tokenize("5k 2.5M 1e3 3.0e-2").unwrap();
        let values: Vec<f64> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Number)
            .map(|t| number_value(&t.text).unwrap())
            .collect();
        assert_eq!(values, vec![5000.0, 2_500_000.0, 1000.0, 0.03]);
    }

    #[test]
    fn test_number_followed_by_letters_is_error() {
        let err = tokenize("12abc").unwrap_err();
        assert!(matches!(err.kind, LexerErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokenize(r#""a\"b\n" 'c'"#).unwrap();
        assert_eq!(tokens[0].text, "a\"b\n");
        assert_eq!(tokens[1].text, "c");
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err.kind, LexerErrorKind::UnterminatedString);
        assert_eq!(err.column(), 1);
    }

    #[test]
    fn test_comments_and_newlines() {
        let tokens = tokenize("x = 1 // one\n/* block\n */ y").unwrap();
        let y = tokens.iter().find(|t| t.text == "y").unwrap();
        assert!(y.newline_before);
        assert!(!tokens[1].newline_before);
    }

    #[test]
    fn test_positions() {
        let tokens = tokenize("a\n  bb").unwrap();
        assert_eq!(tokens[1].span.start.line, 2);
        assert_eq!(tokens[1].span.start.column, 3);
        assert_eq!(tokens[1].span.start.offset, 4);
        assert_eq!(tokens[1].span.end.offset, 6);
    }

    #[test]
    fn test_unexpected_char() {
        let err = tokenize("x = @").unwrap_err();
        assert_eq!(err.kind, LexerErrorKind::UnexpectedChar('@'));
        assert_eq!(err.column(), 5);
    }
}
