///
///  Error types for the overlay readers
///
///  Copyright (C) 2025 Ralf Horstmann <ralf@ackstorm.de>
///
///  This program is free software; you can redistribute it and/or modify
///  it under the terms of the GNU General Public License as published by
///  the Free Software Foundation; either version 2 of the License, or
///  (at your option) any later version.
///
///  This program is distributed in the hope that it will be useful,
///  but WITHOUT ANY WARRANTY; without even the implied warranty of
///  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
///  GNU General Public License for more details.
///
///  You should have received a copy of the GNU General Public License
///  along with this program; if not, write to the Free Software
///  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301, USA.
///
use std::fmt;

use nom::error::ContextError;
use nom::error::ErrorKind;
use nom::error::ParseError;
use thiserror::Error;

/// Fatal errors of the binary overlay decoder. There is no recovery
/// path: the record layout is not self describing, so any of these
/// aborts the whole decode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BinError {
    #[error("truncated stream reading {descr} at 0x{offset:x} ({needed} bytes needed)")]
    TruncatedStream {
        descr: &'static str,
        offset: usize,
        needed: usize,
    },
    #[error("negative length {len} for {descr}")]
    NegativeLength { descr: &'static str, len: i64 },
    #[error("length {len} exceeds maximum for {descr}")]
    LengthOverflow { descr: &'static str, len: u32 },
    #[error("unknown record type 0x{record_type:x} at 0x{offset:x}")]
    UnknownRecordType { record_type: u16, offset: usize },
    #[error("unsupported record type 0x{entry_type:x} at 0x{offset:x}")]
    UnsupportedRecordType { entry_type: u16, offset: usize },
    #[error("unsupported file format")]
    UnsupportedFormat,
}

/// Error type for the nom based ini parser. Collects the context
/// labels of the failing parsers into one message.
#[derive(Debug, Default)]
pub struct OvlParseError {
    message: String,
}

impl OvlParseError {
    pub fn message(&self) -> &str {
        &self.message
    }
    fn push(&mut self, part: &str) {
        if !self.message.is_empty() {
            self.message.push_str(", ");
        }
        self.message.push_str(part);
    }
}

impl fmt::Display for OvlParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl<I> ParseError<I> for OvlParseError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        OvlParseError {
            message: format!("{:?}", kind),
        }
    }
    fn append(_input: I, kind: ErrorKind, mut other: Self) -> Self {
        other.push(&format!("{:?}", kind));
        other
    }
}

impl<I> ContextError<I> for OvlParseError {
    fn add_context(_input: I, ctx: &'static str, mut other: Self) -> Self {
        other.push(ctx);
        other
    }
}
