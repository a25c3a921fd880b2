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

use arrow_array::{new_empty_array, Array, ArrayRef};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{Field, FieldRef};
use arrow_select::concat::concat;
use tracing::debug;

use super::{check_array, export_chunks};
use crate::capability::{ArrowArrayExportable, ArrowSchemaExportable, ArrowStreamExportable};
use crate::error::{ExchangeError, Result};
use crate::handle::{ExportedArray, ExportedStream};
use crate::negotiate::negotiate;
use crate::options::ExportOptions;

/// A sequence of arrays sharing one field
///
/// Exported as a stream with one chunk per array, or as a single array by
/// concatenating the chunks.
#[derive(Debug, Clone)]
pub struct ExportableChunkedArray {
    field: FieldRef,
    chunks: Vec<ArrayRef>,
    options: ExportOptions,
}

impl ExportableChunkedArray {
    /// Create a new [`ExportableChunkedArray`], validating every chunk against `field`
    pub fn try_new(field: impl Into<FieldRef>, chunks: Vec<ArrayRef>) -> Result<Self> {
        let field = field.into();
        for chunk in &chunks {
            check_array(&field, chunk.as_ref())?;
        }
        Ok(Self {
            field,
            chunks,
            options: ExportOptions::default(),
        })
    }

    /// Create a new [`ExportableChunkedArray`] described by an unnamed,
    /// nullable field with the data type of the first chunk.
    ///
    /// Fails if `chunks` is empty or the chunks have different types.
    pub fn from_array_refs(chunks: Vec<ArrayRef>) -> Result<Self> {
        let data_type = chunks
            .first()
            .ok_or_else(|| {
                ExchangeError::invalid_data("cannot infer the type of a chunked array without chunks")
            })?
            .data_type()
            .clone();
        Self::try_new(Field::new("", data_type, true), chunks)
    }

    pub fn with_options(self, options: ExportOptions) -> Self {
        Self { options, ..self }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn chunks(&self) -> &[ArrayRef] {
        &self.chunks
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Total length of all chunks
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenates the chunks into one array, copying their values
    pub fn concatenated(&self) -> Result<ArrayRef> {
        match self.chunks.as_slice() {
            [] => Ok(new_empty_array(self.field.data_type())),
            [chunk] => Ok(chunk.clone()),
            chunks => {
                let chunks: Vec<&dyn Array> = chunks.iter().map(|c| c.as_ref()).collect();
                concat(&chunks).map_err(ExchangeError::export)
            }
        }
    }

    pub fn into_inner(self) -> (FieldRef, Vec<ArrayRef>) {
        (self.field, self.chunks)
    }
}

impl ArrowSchemaExportable for ExportableChunkedArray {
    fn export_schema(&self) -> Result<FFI_ArrowSchema> {
        FFI_ArrowSchema::try_from(self.field.as_ref()).map_err(ExchangeError::export)
    }
}

impl ArrowArrayExportable for ExportableChunkedArray {
    fn export_array(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedArray> {
        let negotiated = negotiate(&self.field, requested_schema, &self.options)?;
        let array = negotiated
            .apply(self.concatenated()?)
            .map_err(ExchangeError::export)?;
        debug!(
            data_type = %negotiated.field().data_type(),
            num_chunks = self.chunks.len(),
            len = array.len(),
            "exporting chunked array as a single array"
        );
        ExportedArray::try_new(negotiated.field(), array.as_ref())
    }
}

impl ArrowStreamExportable for ExportableChunkedArray {
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedStream> {
        let negotiated = negotiate(&self.field, requested_schema, &self.options)?;
        debug!(
            data_type = %negotiated.field().data_type(),
            num_chunks = self.chunks.len(),
            "exporting chunked array"
        );
        Ok(export_chunks(self.chunks.clone(), negotiated))
    }
}

impl TryFrom<Vec<ArrayRef>> for ExportableChunkedArray {
    type Error = ExchangeError;

    fn try_from(chunks: Vec<ArrayRef>) -> Result<Self> {
        Self::from_array_refs(chunks)
    }
}

impl From<super::ExportableArray> for ExportableChunkedArray {
    fn from(array: super::ExportableArray) -> Self {
        let options = array.options().clone();
        let (field, array) = array.into_inner();
        Self {
            field,
            chunks: vec![array],
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow_array::{Int32Array, Int64Array, StringArray};
    use arrow_schema::DataType;

    use crate::stream::ArrayReader;

    fn chunked() -> ExportableChunkedArray {
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1, 2])),
            Arc::new(Int32Array::from(vec![Some(3), None])),
            Arc::new(Int32Array::from(Vec::<i32>::new())),
        ];
        ExportableChunkedArray::try_new(Field::new("c", DataType::Int32, true), chunks).unwrap()
    }

    #[test]
    fn test_accessors() {
        let chunked = chunked();
        assert_eq!(chunked.num_chunks(), 3);
        assert_eq!(chunked.len(), 4);
        assert!(!chunked.is_empty());
    }

    #[test]
    fn test_export_stream() {
        let chunked = chunked();
        let reader = chunked.export_stream(None).unwrap().into_array_reader().unwrap();
        assert_eq!(reader.field().as_ref(), chunked.field().as_ref());

        let chunks = reader.collect::<std::result::Result<Vec<_>, _>>().unwrap();
        assert_eq!(chunks, chunked.chunks());
    }

    #[test]
    fn test_export_stream_requested() {
        let chunked = chunked();
        let requested = FFI_ArrowSchema::try_from(&Field::new("", DataType::Int64, true)).unwrap();

        let reader = chunked
            .export_stream(Some(&requested))
            .unwrap()
            .into_array_reader()
            .unwrap();
        assert_eq!(reader.field().data_type(), &DataType::Int64);
        for chunk in reader {
            assert_eq!(chunk.unwrap().data_type(), &DataType::Int64);
        }
    }

    #[test]
    fn test_export_array_concatenates() {
        let (field, array) = chunked().export_array(None).unwrap().import().unwrap();
        assert_eq!(field.name(), "c");
        assert_eq!(
            array.as_ref(),
            &Int32Array::from(vec![Some(1), Some(2), Some(3), None]) as &dyn Array
        );
    }

    #[test]
    fn test_concatenated_empty() {
        let field = Field::new("c", DataType::Int64, true);
        let chunked = ExportableChunkedArray::try_new(field, vec![]).unwrap();
        let array = chunked.concatenated().unwrap();
        assert_eq!(array.as_ref(), &Int64Array::from(Vec::<i64>::new()) as &dyn Array);
    }

    #[test]
    fn test_mixed_chunks() {
        let chunks: Vec<ArrayRef> = vec![
            Arc::new(Int32Array::from(vec![1])),
            Arc::new(StringArray::from(vec!["a"])),
        ];
        let err = ExportableChunkedArray::from_array_refs(chunks).unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidData { .. }), "{err}");

        let err = ExportableChunkedArray::from_array_refs(vec![]).unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidData { .. }), "{err}");
    }
}
