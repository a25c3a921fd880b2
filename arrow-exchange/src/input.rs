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

//! Input accepted by operations that take either an array or a chunked array

use arrow_array::ArrayRef;
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::FieldRef;
use tracing::debug;

use crate::capability::{ArrowArrayExportable, ArrowSchemaExportable, ArrowStreamExportable};
use crate::error::Result;
use crate::handle::{ExportedArray, ExportedStream};
use crate::producer::{ExportableArray, ExportableChunkedArray};

/// Arrow data imported from a producer, either whole or chunked
///
/// Operations receiving an [`AnyArrayInput`] return a result of the same
/// shape: an array for [`AnyArrayInput::Array`] and a chunked array for
/// [`AnyArrayInput::Chunked`].
#[derive(Debug, Clone)]
pub enum AnyArrayInput {
    Array(ExportableArray),
    Chunked(ExportableChunkedArray),
}

impl AnyArrayInput {
    /// Imports the native array of `exporter`
    pub fn from_array_exporter<E>(exporter: &E) -> Result<Self>
    where
        E: ArrowArrayExportable + ?Sized,
    {
        let (field, array) = exporter.export_array(None)?.import()?;
        debug!(data_type = %field.data_type(), "imported array input");
        Ok(Self::Array(ExportableArray::try_new(field, array)?))
    }

    /// Imports every chunk of the native stream of `exporter`
    pub fn from_stream_exporter<E>(exporter: &E) -> Result<Self>
    where
        E: ArrowStreamExportable + ?Sized,
    {
        let chunked = exporter.export_stream(None)?.into_array_reader()?.into_chunked()?;
        debug!(
            data_type = %chunked.field().data_type(),
            num_chunks = chunked.num_chunks(),
            "imported chunked input"
        );
        Ok(Self::Chunked(chunked))
    }

    pub fn field(&self) -> &FieldRef {
        match self {
            AnyArrayInput::Array(array) => array.field(),
            AnyArrayInput::Chunked(chunked) => chunked.field(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AnyArrayInput::Array(array) => array.len(),
            AnyArrayInput::Chunked(chunked) => chunked.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_chunks(&self) -> usize {
        match self {
            AnyArrayInput::Array(_) => 1,
            AnyArrayInput::Chunked(chunked) => chunked.num_chunks(),
        }
    }

    pub fn into_chunked(self) -> ExportableChunkedArray {
        match self {
            AnyArrayInput::Array(array) => array.into(),
            AnyArrayInput::Chunked(chunked) => chunked,
        }
    }

    /// Returns the input as one array, concatenating chunks if needed
    pub fn into_array(self) -> Result<ArrayRef> {
        match self {
            AnyArrayInput::Array(array) => Ok(array.into_inner().1),
            AnyArrayInput::Chunked(chunked) => chunked.concatenated(),
        }
    }
}

impl From<ExportableArray> for AnyArrayInput {
    fn from(array: ExportableArray) -> Self {
        Self::Array(array)
    }
}

impl From<ExportableChunkedArray> for AnyArrayInput {
    fn from(chunked: ExportableChunkedArray) -> Self {
        Self::Chunked(chunked)
    }
}

impl ArrowSchemaExportable for AnyArrayInput {
    fn export_schema(&self) -> Result<FFI_ArrowSchema> {
        match self {
            AnyArrayInput::Array(array) => array.export_schema(),
            AnyArrayInput::Chunked(chunked) => chunked.export_schema(),
        }
    }
}

impl ArrowArrayExportable for AnyArrayInput {
    fn export_array(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedArray> {
        match self {
            AnyArrayInput::Array(array) => array.export_array(requested_schema),
            AnyArrayInput::Chunked(chunked) => chunked.export_array(requested_schema),
        }
    }
}

impl ArrowStreamExportable for AnyArrayInput {
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedStream> {
        match self {
            AnyArrayInput::Array(array) => array.export_stream(requested_schema),
            AnyArrayInput::Chunked(chunked) => chunked.export_stream(requested_schema),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use arrow_array::{Array, Float64Array};
    use arrow_schema::{DataType, Field};

    fn chunks() -> Vec<ArrayRef> {
        vec![
            Arc::new(Float64Array::from(vec![1.0, 2.0])),
            Arc::new(Float64Array::from(vec![3.0])),
        ]
    }

    #[test]
    fn test_from_array_exporter() {
        let producer = ExportableChunkedArray::from_array_refs(chunks()).unwrap();
        let input = AnyArrayInput::from_array_exporter(&producer).unwrap();
        assert!(matches!(input, AnyArrayInput::Array(_)));
        assert_eq!(input.len(), 3);
        assert_eq!(input.num_chunks(), 1);
    }

    #[test]
    fn test_from_stream_exporter() {
        let field = Field::new("area", DataType::Float64, true);
        let producer = ExportableChunkedArray::try_new(field, chunks()).unwrap();
        let input = AnyArrayInput::from_stream_exporter(&producer).unwrap();
        assert!(matches!(input, AnyArrayInput::Chunked(_)));
        assert_eq!(input.field().name(), "area");
        assert_eq!(input.num_chunks(), 2);
        assert_eq!(input.len(), 3);
        assert!(!input.is_empty());

        let array = input.into_array().unwrap();
        assert_eq!(
            array.as_ref(),
            &Float64Array::from(vec![1.0, 2.0, 3.0]) as &dyn Array
        );
    }

    #[test]
    fn test_into_chunked() {
        let array = ExportableArray::from_array_ref(chunks().remove(0));
        let chunked = AnyArrayInput::from(array).into_chunked();
        assert_eq!(chunked.num_chunks(), 1);
        assert_eq!(chunked.len(), 2);
    }

    #[test]
    fn test_dyn_exporter() {
        let producer = ExportableArray::from_array_ref(chunks().remove(1));
        let exporter: &dyn ArrowStreamExportable = &producer;
        let input = AnyArrayInput::from_stream_exporter(exporter).unwrap();
        assert_eq!(input.len(), 1);
    }
}
