//! Response body compression.
//!
//! The envelope writer streams into a [`BodySink`] and never knows which
//! compression, if any, was negotiated. Gzip produces a full gzip member
//! (header + CRC32/size trailer); deflate is the zlib-wrapped stream, not a
//! raw deflate stream, since that is what client-side decompressors expect
//! for `Content-Encoding: deflate`.

use std::io;
use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Byte sink the envelope is written through before hitting the wire.
pub trait BodySink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flushes the compressor and returns the finished bytes. Consumes the
    /// sink since gzip/zlib trailers can only be written once.
    fn finish(self: Box<Self>) -> io::Result<Vec<u8>>;
}

/// Content encoding negotiated for one request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum Encoding {
    #[strum(serialize = "gzip")]
    Gzip,
    #[strum(serialize = "deflate")]
    Deflate,
    #[strum(serialize = "identity")]
    Identity,
}

impl Encoding {
    /// Picks the encoding for a request from its `Accept-Encoding` value.
    ///
    /// Tokens are comma-separated and compared case-insensitively after
    /// trimming. Preference is gzip over deflate regardless of the order the
    /// client listed them in; no header or no recognized token means
    /// identity.
    pub fn negotiate(accept_encoding: Option<&str>) -> Self {
        let Some(value) = accept_encoding else {
            return Encoding::Identity;
        };

        let accepted = |wanted: &'static str| {
            value
                .split(',')
                .any(|token| unicase::eq(token.trim(), wanted))
        };

        Encoding::iter()
            .find(|encoding| accepted(encoding.label()))
            .unwrap_or(Encoding::Identity)
    }

    fn label(self) -> &'static str {
        self.into()
    }

    /// Value for the `Content-Encoding` response header; identity reports
    /// nothing at all.
    pub fn header_value(self) -> Option<&'static str> {
        match self {
            Encoding::Identity => None,
            other => Some(other.label()),
        }
    }

    pub fn into_sink(self) -> Box<dyn BodySink + Send> {
        match self {
            Encoding::Gzip => Box::new(GzipSink(GzEncoder::new(Vec::new(), Compression::default()))),
            Encoding::Deflate => {
                Box::new(ZlibSink(ZlibEncoder::new(Vec::new(), Compression::default())))
            }
            Encoding::Identity => Box::new(IdentitySink(Vec::new())),
        }
    }
}

struct IdentitySink(Vec<u8>);

impl BodySink for IdentitySink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.extend_from_slice(buf);
        Ok(())
    }

    fn finish(self: Box<Self>) -> io::Result<Vec<u8>> {
        Ok(self.0)
    }
}

struct GzipSink(GzEncoder<Vec<u8>>);

impl BodySink for GzipSink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    fn finish(self: Box<Self>) -> io::Result<Vec<u8>> {
        self.0.finish()
    }
}

struct ZlibSink(ZlibEncoder<Vec<u8>>);

impl BodySink for ZlibSink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.write_all(buf)
    }

    fn finish(self: Box<Self>) -> io::Result<Vec<u8>> {
        self.0.finish()
    }
}
