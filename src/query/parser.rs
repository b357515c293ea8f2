//! Query Parser Module
//!
//! A Pratt parser over the lexer's token stream. Each token has a left
//! binding power; the parser loops `led` calls while the next token binds
//! tighter than the caller's context. Projections (`[*]`, `.*`, `[]`,
//! slices, and filters) swallow their right-hand side up to the first token
//! that binds below [`PROJECTION_STOP`], which is how a pipe terminates a
//! projection while a dot continues it.

use serde_json::Value;

use super::lexer::{self, SpannedToken, Token};
use super::QueryError;

// == AST ==
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Ast {
    /// `@`, or the implicit current node inside a projection
    Identity,
    /// Field access by unquoted or quoted name
    Field(String),
    /// `lhs.rhs`
    Subexpr(Box<Ast>, Box<Ast>),
    /// `lhs[i]`, negative indices counting from the end
    Index(Box<Ast>, i64),
    /// `lhs[start:stop:step]`; always appears under a [`Ast::Projection`]
    Slice {
        on: Box<Ast>,
        start: Option<i64>,
        stop: Option<i64>,
        step: i64,
    },
    /// Array projection: map `rhs` over the elements of `lhs`
    Projection(Box<Ast>, Box<Ast>),
    /// Object projection: map `rhs` over the values of `lhs`
    ValueProjection(Box<Ast>, Box<Ast>),
    /// `lhs[?condition].then`
    FilterProjection {
        on: Box<Ast>,
        then: Box<Ast>,
        condition: Box<Ast>,
    },
    /// `lhs[]`, merging one level of nesting
    Flatten(Box<Ast>),
    /// Backtick or raw-string literal
    Literal(Value),
    /// `[a, b]` multi-select list
    MultiList(Vec<Ast>),
    /// `{key: a, other: b}` multi-select hash
    MultiHash(Vec<(String, Ast)>),
    And(Box<Ast>, Box<Ast>),
    Or(Box<Ast>, Box<Ast>),
    Not(Box<Ast>),
    Compare(CmpOp, Box<Ast>, Box<Ast>),
    /// `lhs | rhs`: feed the full left result to the right side
    Pipe(Box<Ast>, Box<Ast>),
    Function(String, Vec<Ast>),
    /// `&expr`, only meaningful as a function argument
    ExpRef(Box<Ast>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

// == Binding Powers ==
const BP_PIPE: u8 = 1;
const BP_OR: u8 = 2;
const BP_AND: u8 = 3;
const BP_COMPARE: u8 = 5;
const BP_FLATTEN: u8 = 9;
/// Tokens binding below this value terminate a projection's right-hand side
const PROJECTION_STOP: u8 = 10;
const BP_STAR: u8 = 20;
const BP_FILTER: u8 = 21;
const BP_DOT: u8 = 40;
const BP_NOT: u8 = 45;
const BP_LBRACE: u8 = 50;
const BP_LBRACKET: u8 = 55;
const BP_LPAREN: u8 = 60;

fn lbp(token: &Token) -> u8 {
    match token {
        Token::Pipe => BP_PIPE,
        Token::Or => BP_OR,
        Token::And => BP_AND,
        Token::Eq | Token::Ne | Token::Lt | Token::Lte | Token::Gt | Token::Gte => BP_COMPARE,
        Token::Flatten => BP_FLATTEN,
        Token::Star => BP_STAR,
        Token::Filter => BP_FILTER,
        Token::Dot => BP_DOT,
        Token::Not => BP_NOT,
        Token::Lbrace => BP_LBRACE,
        Token::Lbracket => BP_LBRACKET,
        Token::Lparen => BP_LPAREN,
        _ => 0,
    }
}

/// Parses an expression into its AST.
pub(crate) fn parse(expression: &str) -> Result<Ast, QueryError> {
    let tokens = lexer::tokenize(expression)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ast = parser.expression(0)?;
    parser.expect_eof()?;
    Ok(ast)
}

// == Parser ==
struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl Parser {
    // The token stream always terminates with Eof, so clamping to the last
    // index keeps every lookahead in bounds.
    fn at(&self, index: usize) -> &SpannedToken {
        &self.tokens[index.min(self.tokens.len() - 1)]
    }

    fn current(&self) -> &SpannedToken {
        self.at(self.pos)
    }

    fn peek(&self, ahead: usize) -> &Token {
        &self.at(self.pos + ahead).token
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), QueryError> {
        let SpannedToken { token, offset } = self.current();
        if *token == expected {
            self.advance();
            Ok(())
        } else {
            Err(QueryError::syntax(
                *offset,
                format!("expected {}, found {}", describe(&expected), describe(token)),
            ))
        }
    }

    fn expect_eof(&self) -> Result<(), QueryError> {
        let SpannedToken { token, offset } = self.current();
        if *token == Token::Eof {
            Ok(())
        } else {
            Err(QueryError::syntax(
                *offset,
                format!("unexpected {}", describe(token)),
            ))
        }
    }

    fn expression(&mut self, rbp: u8) -> Result<Ast, QueryError> {
        let mut left = self.nud()?;
        while lbp(&self.current().token) > rbp {
            left = self.led(left)?;
        }
        Ok(left)
    }

    fn nud(&mut self) -> Result<Ast, QueryError> {
        let SpannedToken { token, offset } = self.current().clone();
        match token {
            Token::Identifier(name) => {
                self.advance();
                Ok(Ast::Field(name))
            }
            Token::QuotedIdentifier(name) => {
                self.advance();
                if matches!(self.current().token, Token::Lparen) {
                    return Err(QueryError::syntax(
                        offset,
                        "quoted identifiers cannot be used as function names",
                    ));
                }
                Ok(Ast::Field(name))
            }
            Token::RawString(text) => {
                self.advance();
                Ok(Ast::Literal(Value::String(text)))
            }
            Token::Literal(value) => {
                self.advance();
                Ok(Ast::Literal(value))
            }
            Token::At => {
                self.advance();
                Ok(Ast::Identity)
            }
            Token::Not => {
                self.advance();
                Ok(Ast::Not(Box::new(self.expression(BP_NOT)?)))
            }
            Token::Ampersand => {
                self.advance();
                Ok(Ast::ExpRef(Box::new(self.expression(0)?)))
            }
            Token::Lparen => {
                self.advance();
                let inner = self.expression(0)?;
                self.expect(Token::Rparen)?;
                Ok(inner)
            }
            Token::Star => {
                self.advance();
                let rhs = self.projection_rhs(BP_STAR)?;
                Ok(Ast::ValueProjection(Box::new(Ast::Identity), Box::new(rhs)))
            }
            Token::Flatten => {
                self.advance();
                let flattened = Ast::Flatten(Box::new(Ast::Identity));
                let rhs = self.projection_rhs(BP_FLATTEN)?;
                Ok(Ast::Projection(Box::new(flattened), Box::new(rhs)))
            }
            Token::Filter => self.filter(Ast::Identity),
            Token::Lbrace => self.multi_select_hash(),
            Token::Lbracket => {
                self.advance();
                self.bracket_nud()
            }
            other => Err(QueryError::syntax(
                offset,
                format!("unexpected {}", describe(&other)),
            )),
        }
    }

    fn led(&mut self, left: Ast) -> Result<Ast, QueryError> {
        let SpannedToken { token, offset } = self.current().clone();
        match token {
            Token::Dot => {
                self.advance();
                if matches!(self.current().token, Token::Star) {
                    self.advance();
                    let rhs = self.projection_rhs(BP_DOT)?;
                    Ok(Ast::ValueProjection(Box::new(left), Box::new(rhs)))
                } else {
                    let rhs = self.dot_rhs(BP_DOT)?;
                    Ok(Ast::Subexpr(Box::new(left), Box::new(rhs)))
                }
            }
            Token::Pipe => {
                self.advance();
                Ok(Ast::Pipe(Box::new(left), Box::new(self.expression(BP_PIPE)?)))
            }
            Token::Or => {
                self.advance();
                Ok(Ast::Or(Box::new(left), Box::new(self.expression(BP_OR)?)))
            }
            Token::And => {
                self.advance();
                Ok(Ast::And(Box::new(left), Box::new(self.expression(BP_AND)?)))
            }
            Token::Eq | Token::Ne | Token::Lt | Token::Lte | Token::Gt | Token::Gte => {
                self.advance();
                let op = match token {
                    Token::Eq => CmpOp::Eq,
                    Token::Ne => CmpOp::Ne,
                    Token::Lt => CmpOp::Lt,
                    Token::Lte => CmpOp::Lte,
                    Token::Gt => CmpOp::Gt,
                    _ => CmpOp::Gte,
                };
                let rhs = self.expression(BP_COMPARE)?;
                Ok(Ast::Compare(op, Box::new(left), Box::new(rhs)))
            }
            Token::Flatten => {
                self.advance();
                let flattened = Ast::Flatten(Box::new(left));
                let rhs = self.projection_rhs(BP_FLATTEN)?;
                Ok(Ast::Projection(Box::new(flattened), Box::new(rhs)))
            }
            Token::Lbracket => {
                self.advance();
                match self.current().token.clone() {
                    Token::Number(_) | Token::Colon => self.index_or_slice(left),
                    Token::Star => {
                        self.advance();
                        self.expect(Token::Rbracket)?;
                        let rhs = self.projection_rhs(BP_STAR)?;
                        Ok(Ast::Projection(Box::new(left), Box::new(rhs)))
                    }
                    other => Err(QueryError::syntax(
                        self.current().offset,
                        format!("expected index, slice, or '*', found {}", describe(&other)),
                    )),
                }
            }
            Token::Filter => self.filter(left),
            Token::Lparen => {
                let name = match left {
                    Ast::Field(name) => name,
                    _ => {
                        return Err(QueryError::syntax(offset, "invalid function name"));
                    }
                };
                self.advance();
                let args = self.call_args()?;
                Ok(Ast::Function(name, args))
            }
            other => Err(QueryError::syntax(
                offset,
                format!("unexpected {}", describe(&other)),
            )),
        }
    }

    /// After a `[` that is not a filter or flatten: an index, a slice, a
    /// `[*]` projection, or a multi-select list, all rooted at the current
    /// node.
    fn bracket_nud(&mut self) -> Result<Ast, QueryError> {
        match (self.current().token.clone(), self.peek(1).clone()) {
            (Token::Number(_), _) | (Token::Colon, _) => self.index_or_slice(Ast::Identity),
            (Token::Star, Token::Rbracket) => {
                self.advance();
                self.advance();
                let rhs = self.projection_rhs(BP_STAR)?;
                Ok(Ast::Projection(Box::new(Ast::Identity), Box::new(rhs)))
            }
            _ => self.multi_select_list(),
        }
    }

    /// Parses the bracket body after `[`: either `i]` or
    /// `start:stop:step]` with every part optional. A bare index stays an
    /// index node; any colon makes it a slice, which projects.
    fn index_or_slice(&mut self, on: Ast) -> Result<Ast, QueryError> {
        let offset = self.current().offset;
        let mut parts: [Option<i64>; 3] = [None, None, None];
        let mut slot = 0;
        let mut saw_colon = false;

        loop {
            let SpannedToken { token, offset: here } = self.current().clone();
            match token {
                Token::Number(n) if parts[slot].is_none() => {
                    parts[slot] = Some(n);
                    self.advance();
                }
                Token::Colon => {
                    saw_colon = true;
                    slot += 1;
                    if slot > 2 {
                        return Err(QueryError::syntax(here, "too many colons in slice"));
                    }
                    self.advance();
                }
                Token::Rbracket => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(QueryError::syntax(
                        here,
                        format!("unexpected {} in index expression", describe(&other)),
                    ));
                }
            }
        }

        if !saw_colon {
            let index = parts[0]
                .ok_or_else(|| QueryError::syntax(offset, "expected index"))?;
            return Ok(Ast::Index(Box::new(on), index));
        }

        let step = parts[2].unwrap_or(1);
        if step == 0 {
            return Err(QueryError::syntax(offset, "slice step cannot be zero"));
        }
        let slice = Ast::Slice {
            on: Box::new(on),
            start: parts[0],
            stop: parts[1],
            step,
        };
        let rhs = self.projection_rhs(BP_STAR)?;
        Ok(Ast::Projection(Box::new(slice), Box::new(rhs)))
    }

    /// Parses the remainder of a projection: identity if the next token
    /// binds too loosely, otherwise a bracket, filter, or dotted
    /// continuation.
    fn projection_rhs(&mut self, bp: u8) -> Result<Ast, QueryError> {
        let SpannedToken { token, offset } = self.current().clone();
        if lbp(&token) < PROJECTION_STOP {
            Ok(Ast::Identity)
        } else if matches!(token, Token::Lbracket | Token::Filter) {
            self.expression(bp)
        } else if matches!(token, Token::Dot) {
            self.advance();
            self.dot_rhs(bp)
        } else {
            Err(QueryError::syntax(
                offset,
                format!("unexpected {} after projection", describe(&token)),
            ))
        }
    }

    /// Parses what may legally follow a dot.
    fn dot_rhs(&mut self, bp: u8) -> Result<Ast, QueryError> {
        let SpannedToken { token, offset } = self.current().clone();
        match token {
            Token::Identifier(_) | Token::QuotedIdentifier(_) | Token::Star => self.expression(bp),
            Token::Lbracket => {
                self.advance();
                self.multi_select_list()
            }
            Token::Lbrace => self.multi_select_hash(),
            other => Err(QueryError::syntax(
                offset,
                format!(
                    "expected identifier, '*', '[', or '{{' after '.', found {}",
                    describe(&other)
                ),
            )),
        }
    }

    /// Parses `[?condition]` plus the projection that follows it. A flatten
    /// directly after the filter applies to the filtered array itself, so
    /// the projection body stays identity.
    fn filter(&mut self, left: Ast) -> Result<Ast, QueryError> {
        self.advance();
        let condition = self.expression(0)?;
        self.expect(Token::Rbracket)?;
        let then = if matches!(self.current().token, Token::Flatten) {
            Ast::Identity
        } else {
            self.projection_rhs(BP_FILTER)?
        };
        Ok(Ast::FilterProjection {
            on: Box::new(left),
            then: Box::new(then),
            condition: Box::new(condition),
        })
    }

    /// Parses a multi-select list after its `[` has been consumed.
    fn multi_select_list(&mut self) -> Result<Ast, QueryError> {
        let mut items = Vec::new();
        loop {
            items.push(self.expression(0)?);
            let SpannedToken { token, offset } = self.current().clone();
            match token {
                Token::Comma => {
                    self.advance();
                    if matches!(self.current().token, Token::Rbracket) {
                        return Err(QueryError::syntax(
                            self.current().offset,
                            "expected expression after ','",
                        ));
                    }
                }
                Token::Rbracket => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(QueryError::syntax(
                        offset,
                        format!("expected ',' or ']', found {}", describe(&other)),
                    ));
                }
            }
        }
        Ok(Ast::MultiList(items))
    }

    /// Parses a `{key: expr, ...}` multi-select hash, keys being plain or
    /// quoted identifiers.
    fn multi_select_hash(&mut self) -> Result<Ast, QueryError> {
        self.advance();
        let mut pairs = Vec::new();
        loop {
            let SpannedToken { token, offset } = self.current().clone();
            let key = match token {
                Token::Identifier(name) | Token::QuotedIdentifier(name) => name,
                other => {
                    return Err(QueryError::syntax(
                        offset,
                        format!("expected identifier key, found {}", describe(&other)),
                    ));
                }
            };
            self.advance();
            self.expect(Token::Colon)?;
            pairs.push((key, self.expression(0)?));

            let SpannedToken { token, offset } = self.current().clone();
            match token {
                Token::Comma => self.advance(),
                Token::Rbrace => {
                    self.advance();
                    break;
                }
                other => {
                    return Err(QueryError::syntax(
                        offset,
                        format!("expected ',' or '}}', found {}", describe(&other)),
                    ));
                }
            }
        }
        Ok(Ast::MultiHash(pairs))
    }

    /// Parses function-call arguments after the `(` has been reached.
    fn call_args(&mut self) -> Result<Vec<Ast>, QueryError> {
        let mut args = Vec::new();
        if !matches!(self.current().token, Token::Rparen) {
            loop {
                args.push(self.expression(0)?);
                let SpannedToken { token, offset } = self.current().clone();
                match token {
                    Token::Comma => self.advance(),
                    Token::Rparen => break,
                    other => {
                        return Err(QueryError::syntax(
                            offset,
                            format!("expected ',' or ')' in function call, found {}", describe(&other)),
                        ));
                    }
                }
            }
        }
        self.advance();
        Ok(args)
    }
}

// == Token Display ==
fn describe(token: &Token) -> String {
    match token {
        Token::Identifier(name) => format!("identifier '{}'", name),
        Token::QuotedIdentifier(name) => format!("quoted identifier \"{}\"", name),
        Token::RawString(_) => "string literal".to_string(),
        Token::Literal(_) => "literal".to_string(),
        Token::Number(n) => format!("number {}", n),
        Token::Eof => "end of expression".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::At => "'@'".to_string(),
        Token::Ampersand => "'&'".to_string(),
        Token::And => "'&&'".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::Or => "'||'".to_string(),
        Token::Not => "'!'".to_string(),
        Token::Eq => "'=='".to_string(),
        Token::Ne => "'!='".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Lte => "'<='".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Gte => "'>='".to_string(),
        Token::Lbracket => "'['".to_string(),
        Token::Rbracket => "']'".to_string(),
        Token::Lbrace => "'{'".to_string(),
        Token::Rbrace => "'}'".to_string(),
        Token::Lparen => "'('".to_string(),
        Token::Rparen => "')'".to_string(),
        Token::Filter => "'[?'".to_string(),
        Token::Flatten => "'[]'".to_string(),
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(name: &str) -> Box<Ast> {
        Box::new(Ast::Field(name.to_string()))
    }

    #[test]
    fn test_parse_field() {
        assert_eq!(parse("foo").unwrap(), Ast::Field("foo".to_string()));
        assert_eq!(
            parse(r#""part/name""#).unwrap(),
            Ast::Field("part/name".to_string())
        );
    }

    #[test]
    fn test_parse_dotted_path_nests_left() {
        assert_eq!(
            parse("a.b.c").unwrap(),
            Ast::Subexpr(
                Box::new(Ast::Subexpr(field("a"), field("b"))),
                field("c")
            )
        );
    }

    #[test]
    fn test_parse_index_and_slice() {
        assert_eq!(
            parse("a[0]").unwrap(),
            Ast::Index(field("a"), 0)
        );
        assert_eq!(parse("[-1]").unwrap(), Ast::Index(Box::new(Ast::Identity), -1));

        let Ast::Projection(on, rhs) = parse("a[1:3]").unwrap() else {
            panic!("slice must project");
        };
        assert_eq!(
            *on,
            Ast::Slice {
                on: field("a"),
                start: Some(1),
                stop: Some(3),
                step: 1,
            }
        );
        assert_eq!(*rhs, Ast::Identity);
    }

    #[test]
    fn test_parse_slice_step_zero_is_error() {
        assert!(parse("a[::0]").is_err());
    }

    #[test]
    fn test_parse_projection_stops_at_pipe() {
        let Ast::Pipe(left, right) = parse("[*].name | [0]").unwrap() else {
            panic!("expected pipe at the top");
        };
        assert_eq!(
            *left,
            Ast::Projection(Box::new(Ast::Identity), field("name"))
        );
        assert_eq!(*right, Ast::Index(Box::new(Ast::Identity), 0));
    }

    #[test]
    fn test_parse_filter_with_continuation() {
        let parsed = parse("[?active].name").unwrap();

        assert_eq!(
            parsed,
            Ast::FilterProjection {
                on: Box::new(Ast::Identity),
                then: field("name"),
                condition: field("active"),
            }
        );
    }

    #[test]
    fn test_parse_filter_comparison() {
        let parsed = parse("[?id >= `2`]").unwrap();

        assert_eq!(
            parsed,
            Ast::FilterProjection {
                on: Box::new(Ast::Identity),
                then: Box::new(Ast::Identity),
                condition: Box::new(Ast::Compare(
                    CmpOp::Gte,
                    field("id"),
                    Box::new(Ast::Literal(json!(2))),
                )),
            }
        );
    }

    #[test]
    fn test_parse_literal_forms() {
        // Backtick with invalid JSON body reads as a string literal
        assert_eq!(
            parse("`part/tags`").unwrap(),
            Ast::Literal(json!("part/tags"))
        );
        assert_eq!(parse("'raw'").unwrap(), Ast::Literal(json!("raw")));
        assert_eq!(parse("`[1, 2]`").unwrap(), Ast::Literal(json!([1, 2])));
    }

    #[test]
    fn test_parse_function_with_expref() {
        assert_eq!(
            parse("sort_by(@, &name)").unwrap(),
            Ast::Function(
                "sort_by".to_string(),
                vec![Ast::Identity, Ast::ExpRef(field("name"))],
            )
        );
    }

    #[test]
    fn test_parse_function_without_args() {
        assert_eq!(
            parse("foo()").unwrap(),
            Ast::Function("foo".to_string(), Vec::new())
        );
    }

    #[test]
    fn test_parse_quoted_function_name_is_error() {
        assert!(parse(r#""foo"(@)"#).is_err());
    }

    #[test]
    fn test_parse_multi_select_hash() {
        assert_eq!(
            parse(r#"{id: a, "b/c": d}"#).unwrap(),
            Ast::MultiHash(vec![
                ("id".to_string(), Ast::Field("a".to_string())),
                ("b/c".to_string(), Ast::Field("d".to_string())),
            ])
        );
    }

    #[test]
    fn test_parse_multi_select_list() {
        assert_eq!(
            parse("[a, b]").unwrap(),
            Ast::MultiList(vec![
                Ast::Field("a".to_string()),
                Ast::Field("b".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_logical_precedence() {
        // `||` binds tighter than `|`
        let Ast::Pipe(left, _) = parse("a || b | c").unwrap() else {
            panic!("expected pipe at the top");
        };
        assert!(matches!(*left, Ast::Or(_, _)));

        // `!` binds tighter than comparison
        let Ast::Compare(CmpOp::Eq, left, _) = parse("!a == b").unwrap() else {
            panic!("expected comparison at the top");
        };
        assert!(matches!(*left, Ast::Not(_)));
    }

    #[test]
    fn test_parse_flatten_positions() {
        assert_eq!(
            parse("[]").unwrap(),
            Ast::Projection(
                Box::new(Ast::Flatten(Box::new(Ast::Identity))),
                Box::new(Ast::Identity),
            )
        );
        assert_eq!(
            parse("a[].b").unwrap(),
            Ast::Projection(
                Box::new(Ast::Flatten(field("a"))),
                field("b"),
            )
        );
    }

    #[test]
    fn test_parse_wildcard_forms() {
        assert_eq!(
            parse("a.*").unwrap(),
            Ast::ValueProjection(field("a"), Box::new(Ast::Identity))
        );
        assert_eq!(
            parse("a[*]").unwrap(),
            Ast::Projection(field("a"), Box::new(Ast::Identity))
        );
    }

    #[test]
    fn test_parse_trailing_garbage_is_error() {
        assert!(parse("foo)").is_err());
        assert!(parse("a b").is_err());
    }

    #[test]
    fn test_parse_empty_expression_is_error() {
        let err = parse("").unwrap_err();

        assert!(err.to_string().contains("end of expression"));
    }

    #[test]
    fn test_parse_incomplete_filter_is_error() {
        assert!(parse("[?id ==").is_err());
        assert!(parse("[?id").is_err());
    }

    #[test]
    fn test_parse_pipe_into_function() {
        let parsed = parse("nvl(tags, `[]`) | join(',', @)").unwrap();

        let Ast::Pipe(left, right) = parsed else {
            panic!("expected pipe at the top");
        };
        assert!(matches!(*left, Ast::Function(ref name, _) if name == "nvl"));
        assert!(matches!(*right, Ast::Function(ref name, _) if name == "join"));
    }
}
