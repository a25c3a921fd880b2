// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Binds streams of arbitrary arrays to the [C Stream Interface](https://arrow.apache.org/docs/format/CStreamInterface.html).
//!
//! `arrow_array::ffi_stream` only exchanges `RecordBatch`es. Chunked arrays
//! are streams of arrays of any type, so this module provides:
//!
//! * [`ArrayReader`], the array counterpart of `RecordBatchReader`
//! * [`export_array_reader`], which exports an [`ArrayReader`] as an [`FFI_ArrowArrayStream`]
//! * [`ArrowArrayStreamArrayReader`], which imports an [`FFI_ArrowArrayStream`] as an [`ArrayReader`]
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::{ArrayRef, Int32Array};
//! # use arrow_schema::{DataType, Field};
//! # use arrow_exchange::stream::{export_array_reader, ArrayIterator, ArrayReader, ArrowArrayStreamArrayReader};
//! let field = Arc::new(Field::new("a", DataType::Int32, true));
//! let chunks: Vec<ArrayRef> = vec![
//!     Arc::new(Int32Array::from(vec![1, 2])),
//!     Arc::new(Int32Array::from(vec![3])),
//! ];
//! let reader = ArrayIterator::new(chunks.into_iter().map(Ok), field.clone());
//!
//! // export it
//! let stream = export_array_reader(Box::new(reader));
//!
//! // import it
//! let reader = ArrowArrayStreamArrayReader::try_new(stream).unwrap();
//! assert_eq!(reader.field(), field);
//! let lengths: Vec<_> = reader.map(|chunk| chunk.unwrap().len()).collect();
//! assert_eq!(lengths, vec![2, 1]);
//! ```

use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::sync::Arc;

use arrow_array::ffi::{from_ffi_and_data_type, FFI_ArrowArray};
use arrow_array::ffi_stream::FFI_ArrowArrayStream;
use arrow_array::{make_array, Array, ArrayRef};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{ArrowError, DataType, Field, FieldRef};
use tracing::{debug, warn};

use crate::error::{ExchangeError, Result};
use crate::producer::ExportableChunkedArray;

const ENOMEM: i32 = 12;
const EIO: i32 = 5;
const EINVAL: i32 = 22;
const ENOSYS: i32 = 78;

/// Trait for types that can read arrays sharing one [`Field`].
///
/// To create from an iterator, see [`ArrayIterator`].
pub trait ArrayReader: Iterator<Item = std::result::Result<ArrayRef, ArrowError>> {
    /// Returns the field of every array produced by this reader.
    ///
    /// Implementation of this trait should guarantee that all arrays returned
    /// by this reader have the data type of this field.
    fn field(&self) -> FieldRef;

    /// Returns the data type of the arrays produced by this reader
    fn data_type(&self) -> DataType {
        self.field().data_type().clone()
    }
}

impl<R: ArrayReader + ?Sized> ArrayReader for Box<R> {
    fn field(&self) -> FieldRef {
        self.as_ref().field()
    }
}

/// Generic implementation of [`ArrayReader`] that wraps an iterator.
pub struct ArrayIterator<I>
where
    I: IntoIterator<Item = std::result::Result<ArrayRef, ArrowError>>,
{
    inner: I::IntoIter,
    field: FieldRef,
}

impl<I> ArrayIterator<I>
where
    I: IntoIterator<Item = std::result::Result<ArrayRef, ArrowError>>,
{
    /// Create a new [`ArrayIterator`] producing arrays of `field`'s type
    pub fn new(iter: I, field: FieldRef) -> Self {
        Self {
            inner: iter.into_iter(),
            field,
        }
    }
}

impl<I> Iterator for ArrayIterator<I>
where
    I: IntoIterator<Item = std::result::Result<ArrayRef, ArrowError>>,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<I> ArrayReader for ArrayIterator<I>
where
    I: IntoIterator<Item = std::result::Result<ArrayRef, ArrowError>>,
{
    fn field(&self) -> FieldRef {
        self.field.clone()
    }
}

struct StreamPrivateData {
    reader: Box<dyn ArrayReader + Send>,
    field: FieldRef,
    last_error: Option<CString>,
}

impl StreamPrivateData {
    /// Records `err` as the last error and returns its error code
    fn set_error(&mut self, err: &ArrowError) -> c_int {
        // interior nul bytes cannot be represented in a C string
        let message = err.to_string().replace('\0', "");
        self.last_error = Some(CString::new(message).unwrap_or_default());
        get_error_code(err)
    }
}

// callback used to drop the private data of an exported stream
unsafe extern "C" fn release_stream(stream: *mut FFI_ArrowArrayStream) {
    if stream.is_null() {
        return;
    }
    let stream = unsafe { &mut *stream };

    stream.get_schema = None;
    stream.get_next = None;
    stream.get_last_error = None;

    if !stream.private_data.is_null() {
        let private_data = unsafe { Box::from_raw(stream.private_data as *mut StreamPrivateData) };
        drop(private_data);
        stream.private_data = std::ptr::null_mut();
    }

    stream.release = None;
}

unsafe extern "C" fn get_schema(
    stream: *mut FFI_ArrowArrayStream,
    schema: *mut FFI_ArrowSchema,
) -> c_int {
    ExportedArrayStream { stream }.get_schema(schema)
}

unsafe extern "C" fn get_next(
    stream: *mut FFI_ArrowArrayStream,
    array: *mut FFI_ArrowArray,
) -> c_int {
    ExportedArrayStream { stream }.get_next(array)
}

unsafe extern "C" fn get_last_error(stream: *mut FFI_ArrowArrayStream) -> *const c_char {
    let mut ffi_stream = ExportedArrayStream { stream };
    // The consumer does not own the returned string; it stays valid until the
    // next call on the stream or its release.
    match ffi_stream.get_last_error() {
        Some(err_string) => err_string.as_ptr(),
        None => std::ptr::null(),
    }
}

/// Exports an [`ArrayReader`] as an [`FFI_ArrowArrayStream`].
///
/// The stream owns `reader` and drops it when released. Every chunk the
/// reader yields is checked against the reader's field; a chunk of a different
/// type, or with nulls under a non-nullable field, is not exported and fails
/// the `get_next` call with `EINVAL`.
pub fn export_array_reader(reader: Box<dyn ArrayReader + Send>) -> FFI_ArrowArrayStream {
    let field = reader.field();
    debug!(data_type = %field.data_type(), "exporting array stream");

    let private_data = Box::new(StreamPrivateData {
        reader,
        field,
        last_error: None,
    });

    FFI_ArrowArrayStream {
        get_schema: Some(get_schema),
        get_next: Some(get_next),
        get_last_error: Some(get_last_error),
        release: Some(release_stream),
        private_data: Box::into_raw(private_data) as *mut c_void,
    }
}

struct ExportedArrayStream {
    stream: *mut FFI_ArrowArrayStream,
}

impl ExportedArrayStream {
    fn get_private_data(&mut self) -> &mut StreamPrivateData {
        unsafe { &mut *((*self.stream).private_data as *mut StreamPrivateData) }
    }

    fn get_schema(&mut self, out: *mut FFI_ArrowSchema) -> c_int {
        let private_data = self.get_private_data();

        match FFI_ArrowSchema::try_from(private_data.field.as_ref()) {
            Ok(schema) => {
                unsafe { std::ptr::write_unaligned(out, schema) };
                0
            }
            Err(ref err) => private_data.set_error(err),
        }
    }

    fn get_next(&mut self, out: *mut FFI_ArrowArray) -> c_int {
        let private_data = self.get_private_data();

        match private_data.reader.next() {
            None => {
                // A released array marks the end of the stream
                unsafe { std::ptr::write_unaligned(out, FFI_ArrowArray::empty()) };
                0
            }
            Some(Ok(array)) => {
                let expected = private_data.field.data_type();
                if !array.data_type().equals_datatype(expected) {
                    warn!(
                        chunk_type = %array.data_type(),
                        stream_type = %expected,
                        "rejecting stream chunk with mismatched type"
                    );
                    let err = ArrowError::SchemaError(format!(
                        "Stream chunk of type {} does not match stream type {}",
                        array.data_type(),
                        expected
                    ));
                    return private_data.set_error(&err);
                }
                if !private_data.field.is_nullable() && array.null_count() > 0 {
                    warn!(
                        null_count = array.null_count(),
                        "rejecting stream chunk with nulls in non-nullable field"
                    );
                    let err = ArrowError::InvalidArgumentError(format!(
                        "Stream chunk has {} nulls but field '{}' is not nullable",
                        array.null_count(),
                        private_data.field.name()
                    ));
                    return private_data.set_error(&err);
                }

                let array = FFI_ArrowArray::new(&array.to_data());
                unsafe { std::ptr::write_unaligned(out, array) };
                0
            }
            Some(Err(ref err)) => private_data.set_error(err),
        }
    }

    fn get_last_error(&mut self) -> Option<&CString> {
        self.get_private_data().last_error.as_ref()
    }
}

fn get_error_code(err: &ArrowError) -> c_int {
    match err {
        ArrowError::NotYetImplemented(_) => ENOSYS,
        ArrowError::MemoryError(_) => ENOMEM,
        ArrowError::IoError(_, _) => EIO,
        _ => EINVAL,
    }
}

/// An [`ArrayReader`] which imports arrays from an [`FFI_ArrowArrayStream`].
///
/// Unlike `arrow_array::ffi_stream::ArrowArrayStreamReader`, the stream may
/// carry any data type, not only structs.
#[derive(Debug)]
pub struct ArrowArrayStreamArrayReader {
    stream: FFI_ArrowArrayStream,
    field: FieldRef,
}

impl ArrowArrayStreamArrayReader {
    /// Creates a new [`ArrowArrayStreamArrayReader`] from a [`FFI_ArrowArrayStream`],
    /// reading the stream's schema eagerly.
    pub fn try_new(mut stream: FFI_ArrowArrayStream) -> std::result::Result<Self, ArrowError> {
        if stream.release.is_none() {
            return Err(ArrowError::CDataInterface(
                "input stream is already released".to_string(),
            ));
        }

        let field = get_stream_field(&mut stream)?;
        debug!(data_type = %field.data_type(), "importing array stream");

        Ok(Self { stream, field })
    }

    /// Creates a new [`ArrowArrayStreamArrayReader`] from a raw pointer of [`FFI_ArrowArrayStream`].
    ///
    /// The content is moved out of `raw_stream`, leaving a released stream
    /// behind. The caller remains responsible for the memory of the pointer
    /// itself.
    ///
    /// # Safety
    ///
    /// See [`FFI_ArrowArrayStream::from_raw`]
    pub unsafe fn from_raw(
        raw_stream: *mut FFI_ArrowArrayStream,
    ) -> std::result::Result<Self, ArrowError> {
        Self::try_new(unsafe { FFI_ArrowArrayStream::from_raw(raw_stream) })
    }

    /// Reads every remaining chunk into an [`ExportableChunkedArray`]
    pub fn into_chunked(self) -> Result<ExportableChunkedArray> {
        let field = self.field.clone();
        let chunks = self
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ExchangeError::import)?;
        ExportableChunkedArray::try_new(field, chunks)
    }

    fn get_stream_last_error(&mut self) -> Option<String> {
        stream_last_error(&mut self.stream)
    }
}

fn stream_last_error(stream: &mut FFI_ArrowArrayStream) -> Option<String> {
    let get_last_error = stream.get_last_error?;

    let error_str = unsafe { get_last_error(stream) };
    if error_str.is_null() {
        return None;
    }

    let error_str = unsafe { CStr::from_ptr(error_str) };
    Some(error_str.to_string_lossy().to_string())
}

/// Gets the field of an [`FFI_ArrowArrayStream`], cached by [`ArrowArrayStreamArrayReader`]
fn get_stream_field(stream: &mut FFI_ArrowArrayStream) -> std::result::Result<FieldRef, ArrowError> {
    let get_schema = stream.get_schema.ok_or_else(|| {
        ArrowError::CDataInterface("input stream does not provide get_schema".to_string())
    })?;

    let mut schema = FFI_ArrowSchema::empty();
    let ret_code = unsafe { get_schema(stream, &mut schema) };

    if ret_code == 0 {
        Ok(Arc::new(Field::try_from(&schema)?))
    } else {
        let message = stream_last_error(stream).unwrap_or_default();
        Err(ArrowError::CDataInterface(format!(
            "Cannot get schema from input stream. Error code: {ret_code}: {message}"
        )))
    }
}

impl Iterator for ArrowArrayStreamArrayReader {
    type Item = std::result::Result<ArrayRef, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(get_next) = self.stream.get_next else {
            return Some(Err(ArrowError::CDataInterface(
                "input stream does not provide get_next".to_string(),
            )));
        };

        let mut array = FFI_ArrowArray::empty();
        let ret_code = unsafe { get_next(&mut self.stream, &mut array) };

        if ret_code == 0 {
            // The end of stream has been reached
            if array.is_released() {
                return None;
            }

            let result = unsafe { from_ffi_and_data_type(array, self.field.data_type().clone()) };
            Some(result.map(make_array))
        } else {
            let message = self
                .get_stream_last_error()
                .unwrap_or_else(|| format!("stream failed with error code {ret_code}"));
            Some(Err(ArrowError::CDataInterface(message)))
        }
    }
}

impl ArrayReader for ArrowArrayStreamArrayReader {
    fn field(&self) -> FieldRef {
        self.field.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow_array::{Int32Array, StringArray};

    fn int_field() -> FieldRef {
        Arc::new(Field::new("a", DataType::Int32, true))
    }

    fn int_chunks() -> Vec<ArrayRef> {
        vec![
            Arc::new(Int32Array::from(vec![Some(2), None, Some(1)])),
            Arc::new(Int32Array::from(vec![Some(7)])),
        ]
    }

    #[test]
    fn test_stream_round_trip_export() {
        let chunks = int_chunks();
        let reader = ArrayIterator::new(chunks.clone().into_iter().map(Ok), int_field());
        let mut ffi_stream = export_array_reader(Box::new(reader));

        // Get schema from `FFI_ArrowArrayStream`
        let mut ffi_schema = FFI_ArrowSchema::empty();
        let ret_code = unsafe { get_schema(&mut ffi_stream, &mut ffi_schema) };
        assert_eq!(ret_code, 0);

        let exported_field = Field::try_from(&ffi_schema).unwrap();
        assert_eq!(&exported_field, int_field().as_ref());

        // Get arrays from `FFI_ArrowArrayStream`
        let mut produced = vec![];
        loop {
            let mut ffi_array = FFI_ArrowArray::empty();
            let ret_code = unsafe { get_next(&mut ffi_stream, &mut ffi_array) };
            assert_eq!(ret_code, 0);

            if ffi_array.is_released() {
                break;
            }

            let data = unsafe { arrow_array::ffi::from_ffi(ffi_array, &ffi_schema) }.unwrap();
            produced.push(make_array(data));
        }

        assert_eq!(produced, chunks);
    }

    #[test]
    fn test_stream_round_trip_import() {
        let chunks = int_chunks();
        let reader = ArrayIterator::new(chunks.clone().into_iter().map(Ok), int_field());
        let stream = export_array_reader(Box::new(reader));

        let reader = ArrowArrayStreamArrayReader::try_new(stream).unwrap();
        assert_eq!(reader.field(), int_field());
        assert_eq!(reader.data_type(), DataType::Int32);

        let produced = reader.collect::<std::result::Result<Vec<_>, _>>().unwrap();
        assert_eq!(produced, chunks);
    }

    #[test]
    fn test_error_import() {
        let iter = vec![Err(ArrowError::MemoryError("no more memory".to_string()))];
        let reader = ArrayIterator::new(iter, int_field());
        let stream = export_array_reader(Box::new(reader));

        let reader = ArrowArrayStreamArrayReader::try_new(stream).unwrap();
        let produced: Vec<_> = reader.collect();

        // The results should outlive the lifetime of the stream itself.
        assert_eq!(produced.len(), 1);
        let err = produced[0].as_ref().unwrap_err();
        assert!(err.to_string().contains("no more memory"), "{err}");
    }

    #[test]
    fn test_error_code() {
        let iter = vec![Err(ArrowError::MemoryError("oom".to_string()))];
        let reader = ArrayIterator::new(iter, int_field());
        let mut stream = export_array_reader(Box::new(reader));

        let mut ffi_array = FFI_ArrowArray::empty();
        let ret_code = unsafe { get_next(&mut stream, &mut ffi_array) };
        assert_eq!(ret_code, ENOMEM);
        assert_eq!(stream_last_error(&mut stream).unwrap(), "Memory error: oom");
    }

    #[test]
    fn test_no_last_error() {
        let reader = ArrayIterator::new(int_chunks().into_iter().map(Ok), int_field());
        let mut stream = export_array_reader(Box::new(reader));
        assert!(stream_last_error(&mut stream).is_none());
    }

    #[test]
    fn test_mismatched_chunk_rejected() {
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["x"])),
        ];
        let reader = ArrayIterator::new(chunks.into_iter().map(Ok), int_field());
        let stream = export_array_reader(Box::new(reader));

        let mut reader = ArrowArrayStreamArrayReader::try_new(stream).unwrap();
        assert_eq!(reader.next().unwrap().unwrap().len(), 2);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("does not match stream type"), "{err}");
    }

    #[test]
    fn test_nulls_in_non_nullable_chunk_rejected() {
        let field = Arc::new(Field::new("a", DataType::Int32, false));
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(Int32Array::from(vec![Some(3), None])),
        ];
        let reader = ArrayIterator::new(chunks.into_iter().map(Ok), field);
        let stream = export_array_reader(Box::new(reader));

        let mut reader = ArrowArrayStreamArrayReader::try_new(stream).unwrap();
        assert_eq!(reader.next().unwrap().unwrap().len(), 2);
        let err = reader.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("is not nullable"), "{err}");
    }

    #[test]
    fn test_released_stream() {
        let err = ArrowArrayStreamArrayReader::try_new(FFI_ArrowArrayStream::empty()).unwrap_err();
        assert!(err.to_string().contains("already released"), "{err}");
    }

    #[test]
    fn test_release() {
        let reader = ArrayIterator::new(int_chunks().into_iter().map(Ok), int_field());
        let mut stream = export_array_reader(Box::new(reader));

        let release = stream.release.unwrap();
        unsafe { release(&mut stream) };
        assert!(stream.release.is_none());
        assert!(stream.private_data.is_null());
        assert!(stream.get_next.is_none());
        // dropping a released stream is a no-op
        drop(stream);
    }

    #[test]
    fn test_into_chunked() {
        let reader = ArrayIterator::new(int_chunks().into_iter().map(Ok), int_field());
        let stream = export_array_reader(Box::new(reader));
        let chunked = ArrowArrayStreamArrayReader::try_new(stream)
            .unwrap()
            .into_chunked()
            .unwrap();
        assert_eq!(chunked.num_chunks(), 2);
        assert_eq!(chunked.len(), 4);
    }
}
