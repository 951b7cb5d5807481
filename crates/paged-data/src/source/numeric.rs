/// A fixed-width value that serializes to big-endian bytes.
pub trait BigEndianValue: Copy + std::fmt::Debug {
    const WIDTH: usize;

    fn write_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_big_endian_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl BigEndianValue for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_big_endian_value!(i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl BigEndianValue for bool {
    const WIDTH: usize = 1;

    #[inline]
    fn write_be(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }
}

/// Pages over an array of numbers, each laid out big-endian in `T::WIDTH` bytes.
///
/// Elements are serialized per request; only the ones overlapping the
/// requested page are touched.
#[derive(Debug, Clone)]
pub struct NumericArraySource<T: BigEndianValue> {
    values: std::rc::Rc<[T]>,
    page_size: usize,
}

impl<T: BigEndianValue> NumericArraySource<T> {
    #[must_use]
    pub fn new(values: impl Into<std::rc::Rc<[T]>>) -> Self {
        Self {
            values: values.into(),
            page_size: crate::source::PAGE_SIZE,
        }
    }

    /// # Errors
    ///
    /// `PageError::InvalidPageSize` for zero.
    pub fn with_page_size(mut self, page_size: usize) -> crate::errors::PageResult<Self> {
        self.page_size = crate::source::validate_page_size(page_size)?;

        Ok(self)
    }

    #[inline]
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: BigEndianValue> crate::source::PageSource for NumericArraySource<T> {
    #[inline]
    fn page_size(&self) -> usize {
        self.page_size
    }

    #[inline]
    fn document_size(&self) -> u64 {
        (self.values.len() as u64).saturating_mul(T::WIDTH as u64)
    }

    fn get_page(&self, index: u64) -> crate::errors::PageResult<Vec<u8>> {
        let span = crate::source::page_span(index, self.document_size(), self.page_size)?;

        crate::source::collect_elements(span, T::WIDTH, |element, out| {
            let element = <u64 as TryInto<usize>>::try_into(element)?;
            let value = self
                .values
                .get(element)
                .ok_or(crate::errors::MathError::OutOfBounds(element as u64))?;

            value.write_be(out);

            Ok(())
        })
    }
}
