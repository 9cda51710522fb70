//! NumPy `.npy` array codec
//!
//! Reads and writes the versioned `.npy` binary format on arbitrary byte
//! streams. A stream is the 6-byte magic `\x93NUMPY`, a major and minor
//! version byte, a little-endian header length (2 bytes for version 1.0,
//! 4 bytes otherwise), an ASCII dictionary header padded with spaces and a
//! newline to a 64-byte boundary, and finally the raw payload.
//!
//! The codec never transposes: payload bytes are written and returned in the
//! storage order the header declares.

pub mod element;
pub mod header;

pub use element::{
    load_into, load_into_reshaped, load_scalar, load_string, load_vec, save_scalar, save_slice,
    save_str, save_vec, Element, TEXT_DTYPE,
};
pub use header::{HeaderAlignment, Version};

use crate::error::FormatError;
use std::fmt;
use std::io::{self, Read, Write};

/// Magic bytes opening every `.npy` stream.
pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// `preamble + header` is padded to a multiple of this many bytes.
pub const HEADER_ALIGNMENT: usize = 64;

/// Version used for every write.
pub const WRITE_VERSION: Version = Version::V3_0;

/// Byte order of a dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    Little,
    Big,
    /// Single-byte types, written as `|`.
    NotApplicable,
}

impl ByteOrder {
    #[cfg(target_endian = "little")]
    pub const HOST: ByteOrder = ByteOrder::Little;
    #[cfg(target_endian = "big")]
    pub const HOST: ByteOrder = ByteOrder::Big;

    pub fn as_char(self) -> char {
        match self {
            ByteOrder::Little => '<',
            ByteOrder::Big => '>',
            ByteOrder::NotApplicable => '|',
        }
    }

    /// `=` denotes the writer's native order, which is taken to be the host's.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(ByteOrder::Little),
            '>' => Some(ByteOrder::Big),
            '|' => Some(ByteOrder::NotApplicable),
            '=' => Some(ByteOrder::HOST),
            _ => None,
        }
    }
}

/// Element type of an array.
///
/// `item_size` is the total number of bytes per element, already multiplied
/// by the per-kind multiplier (4 for the `U` kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dtype {
    pub byte_order: ByteOrder,
    pub kind: char,
    pub item_size: usize,
}

impl Dtype {
    pub const fn new(byte_order: ByteOrder, kind: char, item_size: usize) -> Self {
        Dtype {
            byte_order,
            kind,
            item_size,
        }
    }

    /// Bytes per unit of the size written in a descriptor.
    pub fn kind_size_multiplier(kind: char) -> usize {
        if kind == 'U' {
            4
        } else {
            1
        }
    }

    /// Descriptor string without quotes, e.g. `<f8`.
    pub fn descr(&self) -> String {
        format!(
            "{}{}{}",
            self.byte_order.as_char(),
            self.kind,
            self.item_size / Self::kind_size_multiplier(self.kind)
        )
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descr())
    }
}

/// Payload storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Row-major, last index fastest.
    #[default]
    C,
    /// Column-major, first index fastest.
    Fortran,
}

impl Order {
    pub fn from_fortran(fortran_order: bool) -> Self {
        if fortran_order {
            Order::Fortran
        } else {
            Order::C
        }
    }

    pub fn is_fortran(self) -> bool {
        self == Order::Fortran
    }
}

/// Decoded `.npy` header dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub dtype: Dtype,
    pub order: Order,
    pub shape: Vec<usize>,
}

impl Header {
    pub fn new(dtype: Dtype, order: Order, shape: Vec<usize>) -> Self {
        Header {
            dtype,
            order,
            shape,
        }
    }

    /// Header for elements of type `T`.
    pub fn for_element<T: Element>(order: Order, shape: Vec<usize>) -> Self {
        Header::new(T::DTYPE, order, shape)
    }

    /// Number of elements; a 0-dimensional array holds one.
    ///
    /// Fails when the shape's product does not fit in `usize`.
    pub fn element_count(&self) -> Result<usize, FormatError> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or_else(|| self.overflow())
    }

    /// Size of the payload in bytes.
    pub fn num_bytes(&self) -> Result<usize, FormatError> {
        self.element_count()?
            .checked_mul(self.dtype.item_size)
            .ok_or_else(|| self.overflow())
    }

    fn overflow(&self) -> FormatError {
        FormatError::InvalidHeader(format!("payload size of {} overflows", self))
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{descr: '{}', fortran_order: {}, shape: {:?}}}",
            self.dtype,
            self.order.is_fortran(),
            self.shape
        )
    }
}

/// A fully loaded array: header plus raw payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyArray {
    pub header: Header,
    pub data: Vec<u8>,
}

impl NpyArray {
    /// Reinterpret the payload as elements of type `T`.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>, FormatError> {
        if self.header.dtype != T::DTYPE {
            return Err(FormatError::HeaderMismatch {
                expected: T::DTYPE.descr(),
                found: self.header.dtype.descr(),
            });
        }
        let expected = self.header.num_bytes()?;
        if self.data.len() != expected {
            return Err(FormatError::BufferLength {
                expected,
                actual: self.data.len(),
            });
        }
        let mut values = vec![T::zeroed(); self.header.element_count()?];
        bytemuck::cast_slice_mut::<T, u8>(&mut values).copy_from_slice(&self.data);
        Ok(values)
    }

    /// The single element of a 0-dimensional array.
    pub fn into_scalar<T: Element>(self) -> Result<T, FormatError> {
        if !self.header.shape.is_empty() || self.header.dtype != T::DTYPE {
            return Err(self.mismatch(format!("0-dimensional '{}' array", T::DTYPE)));
        }
        let values = self.to_vec::<T>()?;
        Ok(values[0])
    }

    /// The elements of a 1-dimensional array.
    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, FormatError> {
        if self.header.shape.len() != 1 || self.header.dtype != T::DTYPE {
            return Err(self.mismatch(format!("1-dimensional '{}' array", T::DTYPE)));
        }
        self.to_vec()
    }

    /// Text stored as a 1-dimensional byte array.
    pub fn into_string(self) -> Result<String, FormatError> {
        if self.header.shape.len() != 1 || self.header.dtype != TEXT_DTYPE {
            return Err(self.mismatch(format!("1-dimensional '{}' text array", TEXT_DTYPE)));
        }
        String::from_utf8(self.data)
            .map_err(|e| FormatError::InvalidHeader(format!("text payload is not UTF-8: {}", e)))
    }

    fn mismatch(&self, expected: String) -> FormatError {
        FormatError::HeaderMismatch {
            expected,
            found: self.header.to_string(),
        }
    }
}

/// Write `header` followed by `data`, which must be exactly the payload size.
pub fn save<W: Write>(writer: &mut W, header: &Header, data: &[u8]) -> Result<(), FormatError> {
    save_versioned(writer, WRITE_VERSION, header, data)
}

pub(crate) fn save_versioned<W: Write>(
    writer: &mut W,
    version: Version,
    header: &Header,
    data: &[u8],
) -> Result<(), FormatError> {
    let expected = header.num_bytes()?;
    if data.len() != expected {
        return Err(FormatError::BufferLength {
            expected,
            actual: data.len(),
        });
    }
    let text = header::gen_header(version, header);
    header::write_preamble(writer, version, &text)?;
    writer.write_all(data)?;
    Ok(())
}

/// Read the preamble and header; the stream is left at the payload.
pub fn load_header<R: Read>(reader: &mut R) -> Result<Header, FormatError> {
    load_header_with(reader, HeaderAlignment::Advisory)
}

pub fn load_header_with<R: Read>(
    reader: &mut R,
    alignment: HeaderAlignment,
) -> Result<Header, FormatError> {
    let text = header::read_header_text(reader, alignment)?;
    let header = header::parse_header(&text)?;
    header.num_bytes()?;
    Ok(header)
}

/// Read exactly `data.len()` payload bytes.
pub fn load_data<R: Read>(reader: &mut R, data: &mut [u8]) -> Result<(), FormatError> {
    reader.read_exact(data)?;
    Ok(())
}

/// Read a whole array into a managed buffer.
pub fn load<R: Read>(reader: &mut R) -> Result<NpyArray, FormatError> {
    load_with(reader, HeaderAlignment::Advisory)
}

pub fn load_with<R: Read>(
    reader: &mut R,
    alignment: HeaderAlignment,
) -> Result<NpyArray, FormatError> {
    let header = load_header_with(reader, alignment)?;
    let data = read_exactly(reader, header.num_bytes()?)?;
    Ok(NpyArray { header, data })
}

/// Read `len` bytes without trusting `len` for the allocation up front.
pub(crate) fn read_exactly<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>, FormatError> {
    let mut buf = Vec::new();
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(FormatError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended after {} of {} bytes", buf.len(), len),
        )));
    }
    Ok(buf)
}

/// Read an array whose header must equal `expected` into `data`.
pub fn load_checked<R: Read>(
    reader: &mut R,
    expected: &Header,
    data: &mut [u8],
) -> Result<(), FormatError> {
    load_checked_with(reader, HeaderAlignment::Advisory, expected, data)
}

pub fn load_checked_with<R: Read>(
    reader: &mut R,
    alignment: HeaderAlignment,
    expected: &Header,
    data: &mut [u8],
) -> Result<(), FormatError> {
    let found = load_header_with(reader, alignment)?;
    if &found != expected {
        return Err(FormatError::HeaderMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    read_payload(reader, &found, data)
}

/// Like [`load_checked`] but only dtype and element count must agree.
///
/// Returns the header found in the stream.
pub fn load_reshaped<R: Read>(
    reader: &mut R,
    expected: &Header,
    data: &mut [u8],
) -> Result<Header, FormatError> {
    load_reshaped_with(reader, HeaderAlignment::Advisory, expected, data)
}

pub fn load_reshaped_with<R: Read>(
    reader: &mut R,
    alignment: HeaderAlignment,
    expected: &Header,
    data: &mut [u8],
) -> Result<Header, FormatError> {
    let found = load_header_with(reader, alignment)?;
    if found.dtype != expected.dtype || found.element_count()? != expected.element_count()? {
        return Err(FormatError::HeaderMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        });
    }
    read_payload(reader, &found, data)?;
    Ok(found)
}

fn read_payload<R: Read>(reader: &mut R, header: &Header, data: &mut [u8]) -> Result<(), FormatError> {
    let expected = header.num_bytes()?;
    if data.len() != expected {
        return Err(FormatError::BufferLength {
            expected,
            actual: data.len(),
        });
    }
    load_data(reader, data)
}
