use super::ast::{
    DictEntry, Expr, ExprKind, Import, LambdaExpr, Parameter, Program, Statement, UnaryOp,
};
use super::error::{unexpected_token, ErrorLocation, ParseResult, ParserError, ParserErrorKind};
use super::utils::{infix_operator, is_left_associative, UNARY_PRECEDENCE};
use crate::compiler::lexer::types::{Coordinate, Span};
use crate::compiler::lexer::{number_value, Token, TokenKind};
use gauge_config::targets;
use tracing::debug;

/// 表达式最大嵌套深度；超过时报语法错误而不是耗尽线程栈
pub const MAX_NESTING_DEPTH: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// 当前表达式嵌套深度
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or_default();
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                span: Span::at(end),
                newline_before: false,
            });
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// 解析整个源文件
    pub fn parse(&mut self) -> ParseResult<Program> {
        let program = self.parse_program()?;
        debug!(
            target: targets::PARSER,
            imports = program.imports.len(),
            statements = program.statements.len(),
            "parsed program"
        );
        Ok(program)
    }

    // ===== token 游标 =====

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    /// 消费当前token并返回它
    fn consume(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// 检查当前token是否为指定类型
    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// 匹配并消费指定类型的token
    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.consume();
            true
        } else {
            false
        }
    }

    /// 获取当前token的位置信息
    fn current_location(&self) -> ErrorLocation {
        let token = self.current();
        match token.kind {
            TokenKind::Eof => ErrorLocation::Eof,
            _ => ErrorLocation::At(token.span.start),
        }
    }

    /// 获取当前token的文本表示
    fn current_token_text(&self) -> String {
        let token = self.current();
        match token.kind {
            TokenKind::Identifier | TokenKind::Number => format!("'{}'", token.text),
            TokenKind::String => format!("\"{}\"", token.text),
            kind => kind.describe().to_string(),
        }
    }

    /// 创建带有当前位置的错误
    fn error_here(&self, kind: ParserErrorKind) -> ParserError {
        ParserError {
            kind,
            location: self.current_location(),
        }
    }

    /// 期望并消费指定类型的token，否则返回错误
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.consume())
        } else {
            Err(self.error_here(unexpected_token(
                self.current_token_text(),
                vec![kind.describe()],
            )))
        }
    }

    /// 期望闭合符号
    fn expect_closing(&mut self, kind: TokenKind, missing: ParserErrorKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.consume())
        } else {
            Err(ParserError::after(missing, self.previous_end()))
        }
    }

    /// 期望一个标识符
    fn expect_identifier(&mut self) -> ParseResult<Token> {
        match self.current().kind {
            TokenKind::Identifier => Ok(self.consume()),
            TokenKind::Eof => Err(ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput)),
            _ => Err(self.error_here(ParserErrorKind::ExpectedIdentifier {
                found: self.current_token_text(),
            })),
        }
    }

    fn previous_end(&self) -> Coordinate {
        match self.pos {
            0 => self.current().span.start,
            pos => self.tokens[pos - 1].span.end,
        }
    }

    fn span_from(&self, start: Coordinate) -> Span {
        Span::new(start, self.previous_end())
    }

    // ===== 程序与语句 =====

    fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.current().span.start;
        let mut imports = Vec::new();
        while self.match_token(TokenKind::Semicolon) {}
        while self.check(TokenKind::Import) {
            imports.push(self.parse_import()?);
            self.expect_separator(TokenKind::Eof)?;
            while self.match_token(TokenKind::Semicolon) {}
        }
        let (statements, result) = self.parse_body(TokenKind::Eof, true)?;
        let end = self.current().span.end;
        Ok(Program {
            imports,
            statements,
            result,
            span: Span::new(start, end),
        })
    }

    fn parse_import(&mut self) -> ParseResult<Import> {
        let start = self.current().span.start;
        self.expect(TokenKind::Import)?;
        let path = self.expect(TokenKind::String)?.text;
        self.expect(TokenKind::As)?;
        let variable = self.expect_identifier()?.text;
        Ok(Import {
            path,
            variable,
            span: self.span_from(start),
        })
    }

    /// 解析语句序列，直到遇到 `terminator`；返回语句与末尾表达式
    fn parse_body(
        &mut self,
        terminator: TokenKind,
        top_level: bool,
    ) -> ParseResult<(Vec<Statement>, Option<Expr>)> {
        let mut statements = Vec::new();
        loop {
            while self.match_token(TokenKind::Semicolon) {}
            if self.check(terminator) {
                return Ok((statements, None));
            }
            if self.check(TokenKind::Import) {
                return Err(self.error_here(ParserErrorKind::ImportAfterStatement));
            }
            if self.is_statement_start() {
                if !top_level && self.check(TokenKind::Export) {
                    return Err(self.error_here(ParserErrorKind::ExportInBlock));
                }
                statements.push(self.parse_statement()?);
                self.expect_separator(terminator)?;
                continue;
            }

            let result = self.parse_expr()?;
            while self.match_token(TokenKind::Semicolon) {}
            if !self.check(terminator) {
                return Err(self.error_here(unexpected_token(
                    self.current_token_text(),
                    vec![terminator.describe()],
                )));
            }
            return Ok((statements, Some(result)));
        }
    }

    fn expect_separator(&mut self, terminator: TokenKind) -> ParseResult<()> {
        if self.match_token(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(terminator) || self.current().newline_before {
            return Ok(());
        }
        Err(self.error_here(ParserErrorKind::MissingSeparator {
            found: self.current_token_text(),
        }))
    }

    /// `export ...`、`name = ...` 或 `name(...) = ...`
    fn is_statement_start(&self) -> bool {
        match self.current().kind {
            TokenKind::Export => true,
            TokenKind::Identifier => match self.peek_kind(1) {
                TokenKind::Equal => true,
                TokenKind::LeftParenthesis => {
                    let open = self.pos + 1;
                    if self.tokens[open].newline_before {
                        return false;
                    }
                    let mut depth = 0usize;
                    for (index, token) in self.tokens.iter().enumerate().skip(open) {
                        match token.kind {
                            TokenKind::LeftParenthesis => depth += 1,
                            TokenKind::RightParenthesis => {
                                depth -= 1;
                                if depth == 0 {
                                    return self
                                        .tokens
                                        .get(index + 1)
                                        .is_some_and(|t| t.kind == TokenKind::Equal);
                                }
                            }
                            TokenKind::Eof => return false,
                            _ => {}
                        }
                    }
                    false
                }
                _ => false,
            },
            _ => false,
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current().span.start;
        let exported = self.match_token(TokenKind::Export);
        let name_token = self.expect_identifier()?;
        let name = name_token.text.clone();

        let value = if self.match_token(TokenKind::LeftParenthesis) {
            let parameters = self.parse_parameters(TokenKind::RightParenthesis)?;
            self.expect_closing(TokenKind::RightParenthesis, ParserErrorKind::MissingRightParen)?;
            self.expect(TokenKind::Equal)?;
            let body = self.parse_expr()?;
            Expr::new(
                ExprKind::Lambda(LambdaExpr {
                    name: Some(name.clone()),
                    parameters,
                    body: Box::new(body),
                }),
                self.span_from(name_token.span.start),
            )
        } else {
            self.expect(TokenKind::Equal)?;
            let mut value = self.parse_expr()?;
            if let ExprKind::Lambda(lambda) = &mut value.kind {
                lambda.name.get_or_insert_with(|| name.clone());
            }
            value
        };

        Ok(Statement {
            name,
            name_span: name_token.span,
            value,
            exported,
            span: self.span_from(start),
        })
    }

    fn parse_parameters(&mut self, closing: TokenKind) -> ParseResult<Vec<Parameter>> {
        let mut parameters = Vec::new();
        if self.check(closing) {
            return Ok(parameters);
        }
        loop {
            let token = self.expect_identifier()?;
            let annotation = if self.match_token(TokenKind::Colon) {
                Some(self.parse_expression(0)?)
            } else {
                None
            };
            parameters.push(Parameter {
                name: token.text,
                span: token.span,
                annotation,
            });
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            if self.check(closing) {
                return Ok(parameters);
            }
            let kind = if closing == TokenKind::Pipe {
                ParserErrorKind::ExpectedCommaOrPipeInLambda
            } else {
                unexpected_token(self.current_token_text(), vec!["','", closing.describe()])
            };
            return Err(self.error_here(kind));
        }
    }

    // ===== 表达式 =====

    /// 完整表达式（含三元运算）
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let condition = self.parse_expression(0)?;
        if self.match_token(TokenKind::Question) {
            let if_true = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let if_false = self.parse_expr()?;
            let span = condition.span.merge(&if_false.span);
            return Ok(Expr::new(
                ExprKind::Ternary {
                    condition: Box::new(condition),
                    if_true: Box::new(if_true),
                    if_false: Box::new(if_false),
                },
                span,
            ));
        }
        Ok(condition)
    }

    /// 优先级爬升解析二元表达式
    fn parse_expression(&mut self, min_precedence: i32) -> ParseResult<Expr> {
        // 解析左操作数（一元表达式或基础表达式）
        let mut left = self.parse_unary()?;

        // 循环解析二元运算符和右操作数
        while let Some((op, precedence)) = infix_operator(self.current().kind) {
            // 优先级不足，停止解析
            if precedence <= min_precedence {
                break;
            }
            self.consume();

            // 解析右操作数（考虑结合性）
            let next_precedence = if is_left_associative(op) {
                precedence
            } else {
                precedence - 1
            };
            let right = self.parse_expression(next_precedence)?;

            let span = left.span.merge(&right.span);
            left = Expr::new(
                ExprKind::Infix {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }

        Ok(left)
    }

    /// 解析一元表达式；所有嵌套（括号、块、列表、右结合链）都经过这里
    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error_here(ParserErrorKind::NestingTooDeep(MAX_NESTING_DEPTH)));
        }
        self.depth += 1;
        let result = self.parse_prefix();
        self.depth -= 1;
        result
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let start = self.current().span.start;
        let op = match self.current().kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Exclamation => Some(UnaryOp::Not),
            _ => None,
        };
        let Some(op) = op else {
            let primary = self.parse_primary()?;
            return self.parse_postfix(primary);
        };
        self.consume();
        let operand = self.parse_expression(UNARY_PRECEDENCE)?;
        let span = Span::new(start, operand.span.end);
        if let (UnaryOp::Minus, ExprKind::Number(value)) = (op, &operand.kind) {
            return Ok(Expr::new(ExprKind::Number(-value), span));
        }
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// 后缀：调用、索引、成员访问与 `->` 管道
    fn parse_postfix(&mut self, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            let (kind, newline_before) = {
                let token = self.current();
                (token.kind, token.newline_before)
            };
            let start = expr.span.start;
            expr = match kind {
                TokenKind::LeftParenthesis if !newline_before => {
                    self.consume();
                    let args = self.parse_arguments()?;
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        self.span_from(start),
                    )
                }
                TokenKind::LeftSquareBracket if !newline_before => {
                    self.consume();
                    let index = self.parse_expr()?;
                    self.expect_closing(
                        TokenKind::RightSquareBracket,
                        ParserErrorKind::MissingRightBracket,
                    )?;
                    Expr::new(
                        ExprKind::Bracket {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.span_from(start),
                    )
                }
                TokenKind::Dot => {
                    self.consume();
                    let key = self.expect_key_after_dot()?;
                    Expr::new(
                        ExprKind::DotLookup {
                            target: Box::new(expr),
                            key,
                        },
                        self.span_from(start),
                    )
                }
                TokenKind::Arrow => {
                    self.consume();
                    let callee = self.parse_pipe_callee()?;
                    let args = if self.check(TokenKind::LeftParenthesis)
                        && !self.current().newline_before
                    {
                        self.consume();
                        self.parse_arguments()?
                    } else {
                        Vec::new()
                    };
                    Expr::new(
                        ExprKind::Pipe {
                            left: Box::new(expr),
                            callee: Box::new(callee),
                            args,
                        },
                        self.span_from(start),
                    )
                }
                _ => return Ok(expr),
            };
        }
    }

    fn expect_key_after_dot(&mut self) -> ParseResult<String> {
        if self.check(TokenKind::Identifier) {
            Ok(self.consume().text)
        } else {
            Err(self.error_here(ParserErrorKind::ExpectedIdentifierAfterDot))
        }
    }

    fn parse_pipe_callee(&mut self) -> ParseResult<Expr> {
        let token = self.expect_identifier()?;
        let start = token.span.start;
        let mut callee = Expr::new(ExprKind::Identifier(token.text), token.span);
        while self.match_token(TokenKind::Dot) {
            let key = self.expect_key_after_dot()?;
            callee = Expr::new(
                ExprKind::DotLookup {
                    target: Box::new(callee),
                    key,
                },
                self.span_from(start),
            );
        }
        Ok(callee)
    }

    /// 已消费 `(`，解析到 `)`
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.match_token(TokenKind::RightParenthesis) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.match_token(TokenKind::Comma) {
                if self.match_token(TokenKind::RightParenthesis) {
                    return Ok(args);
                }
                continue;
            }
            self.expect_closing(TokenKind::RightParenthesis, ParserErrorKind::MissingRightParen)?;
            return Ok(args);
        }
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Number => {
                self.consume();
                let value = number_value(&token.text).ok_or_else(|| {
                    ParserError::at(
                        ParserErrorKind::InvalidNumberFormat(token.text.clone()),
                        token.span.start,
                    )
                })?;
                ExprKind::Number(value)
            }
            TokenKind::String => {
                self.consume();
                ExprKind::String(token.text)
            }
            TokenKind::True | TokenKind::False => {
                self.consume();
                ExprKind::Boolean(token.kind == TokenKind::True)
            }
            TokenKind::Identifier => {
                self.consume();
                ExprKind::Identifier(token.text)
            }
            TokenKind::LeftParenthesis => {
                self.consume();
                let inner = self.parse_expr()?;
                self.expect_closing(TokenKind::RightParenthesis, ParserErrorKind::MissingRightParen)?;
                inner.kind
            }
            TokenKind::LeftSquareBracket => return self.parse_array(),
            TokenKind::LeftCurlyBrace => return self.parse_curly(),
            TokenKind::If => return self.parse_if(),
            TokenKind::Eof => {
                return Err(ParserError::at_eof(ParserErrorKind::UnexpectedEndOfInput))
            }
            _ => {
                return Err(self.error_here(unexpected_token(
                    self.current_token_text(),
                    vec!["expression"],
                )))
            }
        };
        Ok(Expr::new(kind, self.span_from(token.span.start)))
    }

    fn parse_array(&mut self) -> ParseResult<Expr> {
        let start = self.consume().span.start;
        let mut elements = Vec::new();
        loop {
            if self.match_token(TokenKind::RightSquareBracket) {
                break;
            }
            elements.push(self.parse_expr()?);
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            self.expect_closing(
                TokenKind::RightSquareBracket,
                ParserErrorKind::MissingRightBracket,
            )?;
            break;
        }
        Ok(Expr::new(ExprKind::Array(elements), self.span_from(start)))
    }

    /// `{` 开头：lambda、字典或块
    fn parse_curly(&mut self) -> ParseResult<Expr> {
        let start = self.consume().span.start;
        match self.current().kind {
            TokenKind::Pipe => {
                self.consume();
                let parameters = self.parse_parameters(TokenKind::Pipe)?;
                self.expect(TokenKind::Pipe)?;
                self.parse_lambda_body(start, parameters)
            }
            TokenKind::OrOr => {
                self.consume();
                self.parse_lambda_body(start, Vec::new())
            }
            TokenKind::RightCurlyBrace => {
                self.consume();
                Ok(Expr::new(ExprKind::Dict(Vec::new()), self.span_from(start)))
            }
            TokenKind::Identifier | TokenKind::String if self.peek_kind(1) == TokenKind::Colon => {
                self.parse_dict(start)
            }
            _ => {
                let body = self.parse_block_body(start)?;
                self.expect_closing(TokenKind::RightCurlyBrace, ParserErrorKind::MissingRightCurly)?;
                Ok(Expr::new(body.kind, self.span_from(start)))
            }
        }
    }

    fn parse_lambda_body(&mut self, start: Coordinate, parameters: Vec<Parameter>) -> ParseResult<Expr> {
        let body = self.parse_block_body(self.current().span.start)?;
        self.expect_closing(TokenKind::RightCurlyBrace, ParserErrorKind::MissingRightCurly)?;
        Ok(Expr::new(
            ExprKind::Lambda(LambdaExpr {
                name: None,
                parameters,
                body: Box::new(body),
            }),
            self.span_from(start),
        ))
    }

    /// 块体：若没有语句则直接返回末尾表达式
    fn parse_block_body(&mut self, start: Coordinate) -> ParseResult<Expr> {
        let (statements, result) = self.parse_body(TokenKind::RightCurlyBrace, false)?;
        let result = result.ok_or_else(|| self.error_here(ParserErrorKind::BlockWithoutResult))?;
        if statements.is_empty() {
            return Ok(result);
        }
        Ok(Expr::new(
            ExprKind::Block {
                statements,
                result: Box::new(result),
            },
            self.span_from(start),
        ))
    }

    fn parse_dict(&mut self, start: Coordinate) -> ParseResult<Expr> {
        let mut entries = Vec::new();
        loop {
            if self.match_token(TokenKind::RightCurlyBrace) {
                break;
            }
            let key_token = match self.current().kind {
                TokenKind::Identifier | TokenKind::String => self.consume(),
                _ => {
                    return Err(self.error_here(unexpected_token(
                        self.current_token_text(),
                        vec!["identifier", "string"],
                    )))
                }
            };
            let key = Expr::new(ExprKind::String(key_token.text), key_token.span);
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            entries.push(DictEntry { key, value });
            if self.match_token(TokenKind::Comma) {
                continue;
            }
            self.expect_closing(TokenKind::RightCurlyBrace, ParserErrorKind::MissingRightCurly)?;
            break;
        }
        Ok(Expr::new(ExprKind::Dict(entries), self.span_from(start)))
    }

    fn parse_if(&mut self) -> ParseResult<Expr> {
        let start = self.consume().span.start;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let if_true = self.parse_expr()?;
        self.expect(TokenKind::Else)?;
        let if_false = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            self.span_from(start),
        ))
    }
}

/// Convenience for callers holding a token list
pub fn parse_tokens(tokens: Vec<Token>) -> ParseResult<Program> {
    Parser::new(tokens).parse()
}
