// This file is part of oxsh, a job-control-aware command interpreter.
// Copyright (C) 2026 The oxsh developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Recursive-descent parser over the token stream.
//!
//! The grammar, loosest binding first:
//!
//! ```text
//! program    := statements
//! statements := background (separator background)*    separator ∈ { ; & }
//! background := logical ('&')?
//! logical    := pipeline (('&&' | '||') pipeline)*    left-associative
//! pipeline   := redirection ('|' redirection)*
//! redirection:= factor (redir_op WORD)*
//! factor     := WORD+
//!             | '(' statements ')'
//! redir_op   := '<' | '>' | '>>'
//! ```
//!
//! A trailing `&` wraps the preceding item in [`Node::Background`]; a
//! trailing `;` merely ends it. An empty program is valid and parses to an
//! empty statement list, but an empty subshell `( )` is a syntax error
//! because `statements` requires at least one statement.
//!
//! Each parser function transfers its subtree to the caller on success; on
//! error, everything built so far is dropped on the way out.

use crate::syntax::{LogicalOp, Node, RedirEntry, RedirKind, Token};
use std::iter::Peekable;
use thiserror::Error;

/// Failure to parse a token sequence.
///
/// The offending token rides along for the diagnostic; the end of the
/// token stream is reported as `end of line`.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum SyntaxError {
    /// No grammar rule could begin or continue with this token.
    #[error("syntax error near {0}")]
    UnexpectedToken(Token),
    /// The token stream ended in the middle of a production.
    #[error("syntax error near end of line")]
    UnexpectedEnd,
}

/// Parses a whole program into its statement list.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Node>, SyntaxError> {
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
    };
    if parser.tokens.peek().is_none() {
        return Ok(Vec::new());
    }
    let statements = parser.statements()?;
    match parser.tokens.next() {
        None => Ok(statements),
        Some(token) => Err(SyntaxError::UnexpectedToken(token)),
    }
}

struct Parser {
    tokens: Peekable<std::vec::IntoIter<Token>>,
}

impl Parser {
    /// Consumes the next token and reports it as unexpected.
    fn unexpected<T>(&mut self) -> Result<T, SyntaxError> {
        match self.tokens.next() {
            Some(token) => Err(SyntaxError::UnexpectedToken(token)),
            None => Err(SyntaxError::UnexpectedEnd),
        }
    }

    /// `statements := background (separator background)*`
    ///
    /// At least one statement is required; the caller handles the
    /// empty-program case.
    fn statements(&mut self) -> Result<Vec<Node>, SyntaxError> {
        let mut list = Vec::new();
        loop {
            let mut node = self.logical()?;
            let mut separated = false;
            match self.tokens.peek() {
                Some(Token::Bg) => {
                    self.tokens.next();
                    node = Node::Background(Box::new(node));
                    separated = true;
                }
                Some(Token::Semicolon) => {
                    self.tokens.next();
                    separated = true;
                }
                _ => {}
            }
            list.push(node);
            if !separated {
                break;
            }
            // A separator only continues the list when another statement
            // actually begins.
            match self.tokens.peek() {
                Some(Token::Word(_)) | Some(Token::LParen) => {}
                _ => break,
            }
        }
        Ok(list)
    }

    /// `logical := pipeline (('&&' | '||') pipeline)*`, left-associative
    /// with equal precedence for both operators.
    fn logical(&mut self) -> Result<Node, SyntaxError> {
        let mut left = self.pipeline()?;
        loop {
            let op = match self.tokens.peek() {
                Some(Token::And) => LogicalOp::And,
                Some(Token::Or) => LogicalOp::Or,
                _ => break,
            };
            self.tokens.next();
            let right = self.pipeline()?;
            left = Node::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `pipeline := redirection ('|' redirection)*`
    fn pipeline(&mut self) -> Result<Node, SyntaxError> {
        let mut children = vec![self.redirection()?];
        while let Some(Token::Pipe) = self.tokens.peek() {
            self.tokens.next();
            children.push(self.redirection()?);
        }
        if children.len() == 1 {
            Ok(children.remove(0))
        } else {
            Ok(Node::Pipeline(children))
        }
    }

    /// `redirection := factor (redir_op WORD)*`
    ///
    /// Redirection operators greedily attach to the preceding factor;
    /// multiple clauses are kept in source order.
    fn redirection(&mut self) -> Result<Node, SyntaxError> {
        let node = self.factor()?;
        let mut entries = Vec::new();
        loop {
            let (kind, target_fd) = match self.tokens.peek() {
                Some(Token::RedirIn(fd)) => (RedirKind::In, *fd),
                Some(Token::RedirOut(fd)) => (RedirKind::Out, *fd),
                Some(Token::RedirAppend(fd)) => (RedirKind::Append, *fd),
                _ => break,
            };
            self.tokens.next();
            let filename = match self.tokens.next() {
                Some(Token::Word(filename)) => filename,
                Some(token) => return Err(SyntaxError::UnexpectedToken(token)),
                None => return Err(SyntaxError::UnexpectedEnd),
            };
            entries.push(RedirEntry {
                kind,
                filename,
                target_fd,
            });
        }
        if entries.is_empty() {
            Ok(node)
        } else {
            Ok(Node::Redirection {
                entries,
                child: Box::new(node),
            })
        }
    }

    /// `factor := WORD+ | '(' statements ')'`
    fn factor(&mut self) -> Result<Node, SyntaxError> {
        match self.tokens.peek() {
            Some(Token::Word(_)) => {
                let mut argv = Vec::new();
                while let Some(Token::Word(_)) = self.tokens.peek() {
                    match self.tokens.next() {
                        Some(Token::Word(word)) => argv.push(word),
                        _ => break,
                    }
                }
                Ok(Node::Command(argv))
            }
            Some(Token::LParen) => {
                self.tokens.next();
                let body = self.statements()?;
                match self.tokens.next() {
                    Some(Token::RParen) => Ok(Node::Subshell(body)),
                    Some(token) => Err(SyntaxError::UnexpectedToken(token)),
                    None => Err(SyntaxError::UnexpectedEnd),
                }
            }
            _ => self.unexpected(),
        }
    }
}
