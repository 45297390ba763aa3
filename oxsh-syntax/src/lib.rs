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

//! Command language syntax for the oxsh shell.
//!
//! This crate covers the front half of the interpreter's
//! read-tokenize-parse-execute loop:
//!
//! - The [`syntax`] module defines the data the other modules exchange:
//!   [tokens](syntax::Token) and the [abstract syntax tree](syntax::Node).
//! - The [`lexer`] module turns a stream of characters into tokens. The
//!   [`Lexer`](lexer::Lexer) is fed one character at a time so the caller
//!   (the prompt loop) stays in control of the input source.
//! - The [`parser`] module turns a token sequence into a syntax tree with a
//!   recursive-descent grammar.
//!
//! Execution of the resulting tree is the business of the `oxsh-semantics`
//! crate.

pub mod lexer;
pub mod parser;
pub mod syntax;
