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

//! Owned handles over the structures of the C Data and C Stream Interfaces.
//!
//! Each handle owns its structures: dropping it invokes their `release`
//! callbacks. Moving the structures out with `into_raw` transfers that
//! responsibility to the receiver, who must eventually call `release` (or move
//! the structures back with `from_raw`).
//!
//! ```
//! # use std::sync::Arc;
//! # use arrow_array::{Array, Int32Array};
//! # use arrow_exchange::{ArrowArrayExportable, ExportableArray, ExportedArray};
//! let array = ExportableArray::from_array_ref(Arc::new(Int32Array::from(vec![1, 2, 3])));
//!
//! // hand the structures to a consumer across an FFI boundary
//! let (schema_ptr, array_ptr) = array.export_array(None).unwrap().into_raw();
//!
//! // ... which moves them back out and frees the allocations
//! let exported = unsafe { ExportedArray::from_raw(schema_ptr, array_ptr) };
//! unsafe {
//!     drop(Box::from_raw(schema_ptr));
//!     drop(Box::from_raw(array_ptr));
//! }
//!
//! let (_, imported) = exported.import().unwrap();
//! assert_eq!(imported.len(), 3);
//! ```

use std::sync::Arc;

use arrow_array::ffi::{from_ffi, FFI_ArrowArray};
use arrow_array::ffi_stream::{ArrowArrayStreamReader, FFI_ArrowArrayStream};
use arrow_array::{make_array, Array, ArrayRef};
use arrow_data::ArrayData;
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{ArrowError, Field, FieldRef};
use tracing::debug;

use crate::error::{ExchangeError, Result};
use crate::stream::ArrowArrayStreamArrayReader;

/// An exported array: a schema and the array data it describes
#[derive(Debug)]
pub struct ExportedArray {
    schema: FFI_ArrowSchema,
    array: FFI_ArrowArray,
}

impl ExportedArray {
    /// Exports `array` described by `field`, sharing its buffers
    pub fn try_new(field: &Field, array: &dyn Array) -> Result<Self> {
        if !array.data_type().equals_datatype(field.data_type()) {
            return Err(ExchangeError::export(ArrowError::SchemaError(format!(
                "Array of type {} cannot be exported as field of type {}",
                array.data_type(),
                field.data_type()
            ))));
        }
        if !field.is_nullable() && array.null_count() > 0 {
            return Err(ExchangeError::export(ArrowError::InvalidArgumentError(format!(
                "Array with {} nulls cannot be exported as non-nullable field '{}'",
                array.null_count(),
                field.name()
            ))));
        }

        let schema = FFI_ArrowSchema::try_from(field).map_err(ExchangeError::export)?;
        let array = FFI_ArrowArray::new(&array.to_data());
        Ok(Self { schema, array })
    }

    /// Wraps structures received from a producer
    ///
    /// # Safety
    ///
    /// `array` must be released or hold data laid out as described by `schema`,
    /// and `schema` must not be released.
    pub unsafe fn from_ffi(schema: FFI_ArrowSchema, array: FFI_ArrowArray) -> Self {
        Self { schema, array }
    }

    /// Moves the structures out of the pointed to locations, leaving released
    /// structures behind
    ///
    /// # Safety
    ///
    /// Both pointers must be valid for reads and writes, properly aligned and
    /// point to initialized structures satisfying [`Self::from_ffi`].
    pub unsafe fn from_raw(schema: *mut FFI_ArrowSchema, array: *mut FFI_ArrowArray) -> Self {
        unsafe {
            Self {
                schema: FFI_ArrowSchema::from_raw(schema),
                array: FFI_ArrowArray::from_raw(array),
            }
        }
    }

    /// Moves the structures to the heap and returns pointers to them.
    ///
    /// The receiver owns both structures and the heap allocations.
    pub fn into_raw(self) -> (*mut FFI_ArrowSchema, *mut FFI_ArrowArray) {
        (
            Box::into_raw(Box::new(self.schema)),
            Box::into_raw(Box::new(self.array)),
        )
    }

    pub fn schema(&self) -> &FFI_ArrowSchema {
        &self.schema
    }

    pub fn array(&self) -> &FFI_ArrowArray {
        &self.array
    }

    pub fn into_parts(self) -> (FFI_ArrowSchema, FFI_ArrowArray) {
        (self.schema, self.array)
    }

    /// Returns true if the array has been moved out or released
    pub fn is_released(&self) -> bool {
        self.array.is_released()
    }

    /// Decodes the schema of this array
    pub fn field(&self) -> Result<Field> {
        Field::try_from(&self.schema).map_err(ExchangeError::import)
    }

    /// Imports the array as [`ArrayData`] without copying its buffers
    pub fn import_data(self) -> Result<(FieldRef, ArrayData)> {
        if self.is_released() {
            return Err(ExchangeError::import(ArrowError::CDataInterface(
                "array is already released".to_string(),
            )));
        }

        let field = Arc::new(self.field()?);
        // the schema was validated by the exporter or by the caller of `from_ffi`
        let data = unsafe { from_ffi(self.array, &self.schema) }.map_err(ExchangeError::import)?;
        debug!(data_type = %field.data_type(), len = data.len(), "imported array");
        Ok((field, data))
    }

    /// Imports the array without copying its buffers
    pub fn import(self) -> Result<(FieldRef, ArrayRef)> {
        let (field, data) = self.import_data()?;
        Ok((field, make_array(data)))
    }
}

/// An exported stream of array chunks
#[derive(Debug)]
pub struct ExportedStream {
    stream: FFI_ArrowArrayStream,
}

impl ExportedStream {
    pub fn new(stream: FFI_ArrowArrayStream) -> Self {
        Self { stream }
    }

    /// Moves the stream out of the pointed to location, leaving a released
    /// stream behind
    ///
    /// # Safety
    ///
    /// See [`FFI_ArrowArrayStream::from_raw`]
    pub unsafe fn from_raw(stream: *mut FFI_ArrowArrayStream) -> Self {
        Self::new(unsafe { FFI_ArrowArrayStream::from_raw(stream) })
    }

    /// Moves the stream to the heap and returns a pointer to it.
    ///
    /// The receiver owns the stream and the heap allocation.
    pub fn into_raw(self) -> *mut FFI_ArrowArrayStream {
        Box::into_raw(Box::new(self.stream))
    }

    pub fn into_inner(self) -> FFI_ArrowArrayStream {
        self.stream
    }

    /// Returns true if the stream has been moved out or released
    pub fn is_released(&self) -> bool {
        self.stream.release.is_none()
    }

    /// Imports the stream as a reader of arrays of any type
    pub fn into_array_reader(self) -> Result<ArrowArrayStreamArrayReader> {
        ArrowArrayStreamArrayReader::try_new(self.stream).map_err(ExchangeError::import)
    }

    /// Imports the stream as a reader of record batches.
    ///
    /// Fails unless the stream's data type is a struct.
    pub fn into_record_batch_reader(self) -> Result<ArrowArrayStreamReader> {
        ArrowArrayStreamReader::try_new(self.stream).map_err(ExchangeError::import)
    }
}

impl From<FFI_ArrowArrayStream> for ExportedStream {
    fn from(stream: FFI_ArrowArrayStream) -> Self {
        Self::new(stream)
    }
}
