//! Message bodies that can be inspected without being consumed.
//!
//! The formatter never takes ownership of a body. It asks the body, through
//! [`ReplayBody`], for its full contents from the start, and the body is
//! expected to be left positioned at its start afterwards so whoever reads
//! it next sees the same bytes. Bodies that cannot do that (one-shot
//! streams, `axum`'s streaming body) report [`BodyError::NotRewindable`]
//! and are logged as a marker instead of their contents.
//!
//! [`Body`] is a concrete body type covering the three cases: in-memory
//! bytes, a seekable reader, and a one-shot stream.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::sync::{Arc, Mutex, PoisonError};

use axum::body::HttpBody;
use bytes::Bytes;
use http_body_util::BodyExt;

use crate::error::BodyError;

/// A body that can be read from its start again.
pub trait ReplayBody {
    /// Read the whole body from its start and rewind it.
    fn replay(&self) -> Result<Bytes, BodyError>;

    /// A second handle onto the same contents, when the body supports one.
    ///
    /// The middleware keeps this handle while the original body travels
    /// down the chain, then formats from it once the call returns.
    fn share(&self) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }
}

impl ReplayBody for Bytes {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Ok(self.clone())
    }

    fn share(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ReplayBody for String {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }

    fn share(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ReplayBody for Vec<u8> {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Ok(Bytes::copy_from_slice(self))
    }

    fn share(&self) -> Option<Self> {
        Some(self.clone())
    }
}

impl ReplayBody for &'static str {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Ok(Bytes::from_static(self.as_bytes()))
    }

    fn share(&self) -> Option<Self> {
        Some(*self)
    }
}

impl ReplayBody for () {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Ok(Bytes::new())
    }

    fn share(&self) -> Option<Self> {
        Some(())
    }
}

impl<B: ReplayBody> ReplayBody for Option<B> {
    fn replay(&self) -> Result<Bytes, BodyError> {
        self.as_ref().map_or(Err(BodyError::NotRewindable), ReplayBody::replay)
    }

    fn share(&self) -> Option<Self> {
        self.as_ref().map(ReplayBody::share)
    }
}

/// `axum`'s body is a stream of frames; polling it consumes them.
impl ReplayBody for axum::body::Body {
    fn replay(&self) -> Result<Bytes, BodyError> {
        Err(BodyError::NotRewindable)
    }
}

trait SeekRead: Read + Seek + Send {}

impl<T: Read + Seek + Send> SeekRead for T {}

enum Inner {
    Buffered(Bytes),
    Seekable(Arc<Mutex<Box<dyn SeekRead>>>),
    Stream(Mutex<Box<dyn Read + Send>>),
}

pub struct Body {
    inner: Inner,
}

impl Body {
    #[must_use]
    pub fn empty() -> Self {
        Self::from(Bytes::new())
    }

    /// A body backed by a reader that can seek back to its start.
    ///
    /// Handles returned by [`ReplayBody::share`] read the same underlying
    /// reader.
    pub fn seekable<R>(reader: R) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self {
            inner: Inner::Seekable(Arc::new(Mutex::new(Box::new(reader)))),
        }
    }

    /// A body that can be read exactly once.
    pub fn stream<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            inner: Inner::Stream(Mutex::new(Box::new(reader))),
        }
    }

    /// Collect any `http_body::Body` into memory so it can be logged.
    pub async fn buffer<B>(body: B) -> Result<Self, B::Error>
    where
        B: HttpBody,
    {
        let collected = body.collect().await?;
        Ok(Self::from(collected.to_bytes()))
    }

    #[must_use]
    pub const fn is_rewindable(&self) -> bool {
        !matches!(self.inner, Inner::Stream(_))
    }

    /// Read from the current position to the end, as a consumer would.
    pub fn read_to_end(&self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        match &self.inner {
            Inner::Buffered(bytes) => return Ok(bytes.clone()),
            Inner::Seekable(reader) => {
                reader
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .read_to_end(&mut buf)?;
            }
            Inner::Stream(reader) => {
                reader
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .read_to_end(&mut buf)?;
            }
        }
        Ok(Bytes::from(buf))
    }
}

impl ReplayBody for Body {
    fn replay(&self) -> Result<Bytes, BodyError> {
        match &self.inner {
            Inner::Buffered(bytes) => Ok(bytes.clone()),
            Inner::Seekable(reader) => {
                let mut reader = reader.lock().unwrap_or_else(PoisonError::into_inner);
                let mut buf = Vec::new();
                reader.seek(SeekFrom::Start(0))?;
                reader.read_to_end(&mut buf)?;
                reader.seek(SeekFrom::Start(0))?;
                Ok(Bytes::from(buf))
            }
            Inner::Stream(_) => Err(BodyError::NotRewindable),
        }
    }

    fn share(&self) -> Option<Self> {
        let inner = match &self.inner {
            Inner::Buffered(bytes) => Inner::Buffered(bytes.clone()),
            Inner::Seekable(reader) => Inner::Seekable(Arc::clone(reader)),
            Inner::Stream(_) => return None,
        };
        Some(Self { inner })
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Inner::Buffered(bytes) => f.debug_tuple("Body::Buffered").field(&bytes.len()).finish(),
            Inner::Seekable(_) => f.write_str("Body::Seekable"),
            Inner::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self {
            inner: Inner::Buffered(bytes),
        }
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Self::from(Bytes::from(s))
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Self::from(Bytes::from_static(s.as_bytes()))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Self::from(Bytes::from(v))
    }
}
