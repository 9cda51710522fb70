//! Native element types and their dtype descriptors.
//!
//! The table is closed: only the types implemented here can be stored, and
//! any other type fails to compile rather than at runtime.

use super::{ByteOrder, Dtype, Header, Order};
use crate::error::FormatError;
use num_complex::Complex;
use std::io::{Read, Write};
use std::mem::size_of;

mod sealed {
    pub trait Sealed {}
}

/// A scalar type with a fixed `.npy` descriptor.
pub trait Element: bytemuck::Pod + sealed::Sealed {
    const DTYPE: Dtype;
}

/// Descriptor used for text stored as a byte array.
pub const TEXT_DTYPE: Dtype = Dtype::new(ByteOrder::NotApplicable, 'i', 1);

const fn sized_order(size: usize) -> ByteOrder {
    if size == 1 {
        ByteOrder::NotApplicable
    } else {
        ByteOrder::HOST
    }
}

/// Integers are described by byte width and signedness alone, so
/// platform-width types land on one of the four fixed widths.
const fn integral(size: usize, signed: bool) -> Dtype {
    Dtype::new(sized_order(size), if signed { 'i' } else { 'u' }, size)
}

macro_rules! impl_element {
    ($($ty:ty => $dtype:expr),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl Element for $ty {
                const DTYPE: Dtype = $dtype;
            }
        )*
    };
}

impl_element! {
    i8 => integral(1, true),
    i16 => integral(2, true),
    i32 => integral(4, true),
    i64 => integral(8, true),
    isize => integral(size_of::<isize>(), true),
    u8 => integral(1, false),
    u16 => integral(2, false),
    u32 => integral(4, false),
    u64 => integral(8, false),
    usize => integral(size_of::<usize>(), false),
    f32 => Dtype::new(ByteOrder::HOST, 'f', 4),
    f64 => Dtype::new(ByteOrder::HOST, 'f', 8),
    Complex<f32> => Dtype::new(ByteOrder::HOST, 'c', 8),
    Complex<f64> => Dtype::new(ByteOrder::HOST, 'c', 16),
}

/// Write `data` with an explicit storage order and shape.
pub fn save_slice<T: Element, W: Write>(
    writer: &mut W,
    order: Order,
    shape: &[usize],
    data: &[T],
) -> Result<(), FormatError> {
    let header = Header::for_element::<T>(order, shape.to_vec());
    super::save(writer, &header, bytemuck::cast_slice(data))
}

/// Write a 0-dimensional array.
pub fn save_scalar<T: Element, W: Write>(writer: &mut W, value: T) -> Result<(), FormatError> {
    save_slice(writer, Order::C, &[], std::slice::from_ref(&value))
}

/// Write a 1-dimensional array.
pub fn save_vec<T: Element, W: Write>(writer: &mut W, data: &[T]) -> Result<(), FormatError> {
    save_slice(writer, Order::C, &[data.len()], data)
}

/// Write text as a 1-dimensional byte array of its UTF-8 encoding.
pub fn save_str<W: Write>(writer: &mut W, text: &str) -> Result<(), FormatError> {
    let header = Header::new(TEXT_DTYPE, Order::C, vec![text.len()]);
    super::save(writer, &header, text.as_bytes())
}

/// Read a 0-dimensional array of `T`.
pub fn load_scalar<T: Element, R: Read>(reader: &mut R) -> Result<T, FormatError> {
    super::load(reader)?.into_scalar()
}

/// Read a 1-dimensional array of `T`.
pub fn load_vec<T: Element, R: Read>(reader: &mut R) -> Result<Vec<T>, FormatError> {
    super::load(reader)?.into_vec()
}

/// Read text written by [`save_str`].
pub fn load_string<R: Read>(reader: &mut R) -> Result<String, FormatError> {
    super::load(reader)?.into_string()
}

/// Read into `out`; the stored header must match `T`, `order` and `shape` exactly.
pub fn load_into<T: Element, R: Read>(
    reader: &mut R,
    order: Order,
    shape: &[usize],
    out: &mut [T],
) -> Result<(), FormatError> {
    let expected = Header::for_element::<T>(order, shape.to_vec());
    super::load_checked(reader, &expected, bytemuck::cast_slice_mut(out))
}

/// Read into `out`, accepting any stored shape with the same element count.
pub fn load_into_reshaped<T: Element, R: Read>(
    reader: &mut R,
    out: &mut [T],
) -> Result<Header, FormatError> {
    let expected = Header::for_element::<T>(Order::C, vec![out.len()]);
    super::load_reshaped(reader, &expected, bytemuck::cast_slice_mut(out))
}
