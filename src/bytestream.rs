///
///  Little-endian cursor over an in-memory overlay buffer
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
use nom::{
    Parser, bytes::complete::take, number::complete::le_f64, number::complete::le_u16,
    number::complete::le_u32,
};

use crate::error::BinError;

type NomError<'a> = nom::error::Error<&'a [u8]>;

/// Largest 32-bit length accepted as a byte count (INT32_MAX).
pub const MAX_LEN32: u32 = i32::MAX as u32;

/// Read cursor for the binary overlay format. All reads are little
/// endian, doubles are IEEE-754 double precision. A read never
/// advances past the end of the buffer; if not enough bytes are left
/// the read fails and the position stays where it was.
#[derive(Debug, Clone)]
pub struct ByteStream<'a> {
    buf: &'a [u8],
    pos: usize,
    debug: u8,
}

impl<'a> ByteStream<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            debug: 0,
        }
    }
    pub fn with_debug(mut self, debug: u8) -> Self {
        self.debug = debug;
        self
    }
    pub fn debug(&self) -> u8 {
        self.debug
    }
    pub fn position(&self) -> usize {
        self.pos
    }
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn parse<O, P>(&mut self, mut parser: P, needed: usize, descr: &'static str) -> Result<O, BinError>
    where
        P: Parser<&'a [u8], Output = O, Error = NomError<'a>>,
    {
        let buf = self.buf;
        match parser.parse(&buf[self.pos..]) {
            Ok((rest, val)) => {
                self.pos = buf.len() - rest.len();
                Ok(val)
            }
            Err(_) => Err(BinError::TruncatedStream {
                descr,
                offset: self.pos,
                needed,
            }),
        }
    }

    pub fn read_u16(&mut self, descr: &'static str) -> Result<u16, BinError> {
        let val = self.parse(le_u16::<&'a [u8], NomError<'a>>, 2, descr)?;
        if self.debug >= 2 {
            eprintln!("bin: {:<15} {:>5} (0x{:04x})", descr, val, val);
        }
        Ok(val)
    }

    pub fn read_u32(&mut self, descr: &'static str) -> Result<u32, BinError> {
        let val = self.parse(le_u32::<&'a [u8], NomError<'a>>, 4, descr)?;
        if self.debug >= 2 {
            if (val & 0xFFFF0000) == 0 {
                eprintln!("bin: {:<15} {:>5} (0x{:08x})", descr, val, val);
            } else {
                eprintln!("bin: {:<15}       (0x{:08x})", descr, val);
            }
        }
        Ok(val)
    }

    pub fn read_f64(&mut self, descr: &'static str) -> Result<f64, BinError> {
        let val = self.parse(le_f64::<&'a [u8], NomError<'a>>, 8, descr)?;
        if self.debug >= 3 {
            eprintln!("bin: {:<15} {}", descr, val);
        }
        Ok(val)
    }

    /// Reads `len` raw bytes. The length is signed because callers may
    /// derive it from an unvalidated 32-bit field.
    pub fn read_bytes(&mut self, len: i64, descr: &'static str) -> Result<&'a [u8], BinError> {
        let Ok(count) = usize::try_from(len) else {
            return Err(BinError::NegativeLength { descr, len });
        };
        self.parse(take::<usize, &'a [u8], NomError<'a>>(count), count, descr)
    }

    pub fn skip(&mut self, len: usize, descr: &'static str) -> Result<(), BinError> {
        self.parse(take::<usize, &'a [u8], NomError<'a>>(len), len, descr)?;
        Ok(())
    }

    /// Reads a 32-bit length field and rejects values above INT32_MAX.
    pub fn read_len32(&mut self, descr: &'static str) -> Result<u32, BinError> {
        let len = self.read_u32(descr)?;
        if len > MAX_LEN32 {
            return Err(BinError::LengthOverflow { descr, len });
        }
        Ok(len)
    }

    pub fn read_text16(&mut self, descr: &'static str) -> Result<&'a [u8], BinError> {
        let len = self.read_u16(descr)?;
        self.read_bytes(len.into(), descr)
    }

    pub fn read_text32(&mut self, descr: &'static str) -> Result<&'a [u8], BinError> {
        let len = self.read_len32(descr)?;
        self.read_bytes(len.into(), descr)
    }
}

#[cfg(test)]
#[path = "bytestream_tests.rs"]
mod tests;
