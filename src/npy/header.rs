//! Preamble framing and header dictionary text.

use super::{ByteOrder, Dtype, Header, Order, HEADER_ALIGNMENT, MAGIC};
use crate::error::FormatError;
use std::io::{Read, Write};

/// `.npy` format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const V1_0: Version = Version { major: 1, minor: 0 };
    pub const V2_0: Version = Version { major: 2, minor: 0 };
    pub const V3_0: Version = Version { major: 3, minor: 0 };

    fn is_supported(self) -> bool {
        self == Self::V1_0 || self == Self::V2_0 || self == Self::V3_0
    }

    /// Bytes of the length field following the version bytes.
    fn length_field_size(self) -> usize {
        if self.major == 1 {
            2
        } else {
            4
        }
    }

    /// Magic, version and length field.
    pub fn preamble_len(self) -> usize {
        MAGIC.len() + 2 + self.length_field_size()
    }
}

/// How a header whose end is not 64-byte aligned is treated on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderAlignment {
    /// Log a warning and keep reading.
    #[default]
    Advisory,
    /// Fail with [`FormatError::MisalignedHeader`].
    Strict,
}

pub(crate) fn gen_shape(shape: &[usize]) -> String {
    match shape {
        [] => String::new(),
        [single] => format!("{},", single),
        dims => dims
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Header dictionary text including padding and trailing newline.
pub(crate) fn gen_header(version: Version, header: &Header) -> String {
    let mut text = format!(
        "{{'descr': '{}', 'fortran_order': {}, 'shape': ({}), }}",
        header.dtype.descr(),
        if header.order.is_fortran() { "True" } else { "False" },
        gen_shape(&header.shape)
    );

    let unpadded = version.preamble_len() + text.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    text.extend(std::iter::repeat(' ').take(padding));
    text.push('\n');
    text
}

pub(crate) fn write_preamble<W: Write>(
    writer: &mut W,
    version: Version,
    text: &str,
) -> Result<(), FormatError> {
    writer.write_all(MAGIC)?;
    writer.write_all(&[version.major, version.minor])?;
    if version.major == 1 {
        let len = u16::try_from(text.len()).map_err(|_| FormatError::HeaderTooLong(text.len()))?;
        writer.write_all(&len.to_le_bytes())?;
    } else {
        let len = u32::try_from(text.len()).map_err(|_| FormatError::HeaderTooLong(text.len()))?;
        writer.write_all(&len.to_le_bytes())?;
    }
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Verify magic and version, then return the raw header text.
pub(crate) fn read_header_text<R: Read>(
    reader: &mut R,
    alignment: HeaderAlignment,
) -> Result<String, FormatError> {
    let mut lead = [0u8; 8];
    reader.read_exact(&mut lead)?;

    let mut magic = [0u8; 6];
    magic.copy_from_slice(&lead[..6]);
    if &magic != MAGIC {
        return Err(FormatError::InvalidMagic(magic));
    }

    let version = Version {
        major: lead[6],
        minor: lead[7],
    };
    if !version.is_supported() {
        return Err(FormatError::UnsupportedVersion {
            major: version.major,
            minor: version.minor,
        });
    }

    let header_len = if version.length_field_size() == 2 {
        let mut buf = [0u8; 2];
        reader.read_exact(&mut buf)?;
        u16::from_le_bytes(buf) as usize
    } else {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        u32::from_le_bytes(buf) as usize
    };

    let total = version.preamble_len() + header_len;
    if total % HEADER_ALIGNMENT != 0 {
        match alignment {
            HeaderAlignment::Advisory => {
                tracing::warn!(total, "npy header does not end on a 64-byte boundary");
            }
            HeaderAlignment::Strict => return Err(FormatError::MisalignedHeader(total)),
        }
    }

    let raw = super::read_exactly(reader, header_len)?;
    String::from_utf8(raw).map_err(|_| FormatError::InvalidHeader("header is not ASCII text".to_string()))
}

fn invalid(message: impl Into<String>) -> FormatError {
    FormatError::InvalidHeader(message.into())
}

pub(crate) fn parse_descr(descr: &str) -> Result<Dtype, FormatError> {
    let mut chars = descr.chars();
    let (Some(order), Some(kind)) = (chars.next(), chars.next()) else {
        return Err(invalid(format!("descriptor {:?} is too short", descr)));
    };
    let byte_order = ByteOrder::from_char(order)
        .ok_or_else(|| invalid(format!("unknown byte order {:?} in {:?}", order, descr)))?;
    let units: usize = chars
        .as_str()
        .parse()
        .map_err(|_| invalid(format!("invalid item size in descriptor {:?}", descr)))?;
    Ok(Dtype::new(
        byte_order,
        kind,
        units * Dtype::kind_size_multiplier(kind),
    ))
}

pub(crate) fn parse_shape(text: &str) -> Result<Vec<usize>, FormatError> {
    text.split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.parse()
                .map_err(|_| invalid(format!("invalid dimension {:?} in shape", dim)))
        })
        .collect()
}

fn value_after<'a>(text: &'a str, key: &str) -> Result<&'a str, FormatError> {
    let start = text
        .find(key)
        .ok_or_else(|| invalid(format!("cannot find {} in header", key.trim_end())))?;
    Ok(&text[start + key.len()..])
}

/// Parse header text by locating the three keys; key order is irrelevant.
pub(crate) fn parse_header(text: &str) -> Result<Header, FormatError> {
    let body = text
        .strip_suffix('\n')
        .ok_or_else(|| invalid("header does not end with a newline"))?
        .trim_matches(|c| c == ' ' || c == '\t');

    let rest = value_after(body, "'descr': ")?;
    let open = rest
        .find('\'')
        .ok_or_else(|| invalid("cannot find descr value in header"))?;
    let close = rest[open + 1..]
        .find('\'')
        .ok_or_else(|| invalid("unterminated descr value in header"))?;
    let descr = &rest[open + 1..open + 1 + close];
    if descr.len() < 3 {
        return Err(invalid(format!("descriptor {:?} is too short", descr)));
    }
    let dtype = parse_descr(descr)?;

    let rest = value_after(body, "'fortran_order': ")?;
    let order = if rest.starts_with("True") {
        Order::Fortran
    } else if rest.starts_with("False") {
        Order::C
    } else {
        return Err(invalid("fortran_order is neither True nor False"));
    };

    let rest = value_after(body, "'shape': ")?;
    let (Some(open), Some(close)) = (rest.find('('), rest.find(')')) else {
        return Err(invalid("cannot find value for shape in header"));
    };
    if close < open {
        return Err(invalid("malformed shape tuple"));
    }
    let shape = parse_shape(&rest[open + 1..close])?;

    Ok(Header::new(dtype, order, shape))
}
