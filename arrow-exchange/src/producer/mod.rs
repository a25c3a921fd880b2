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

//! Producers exporting in-memory Arrow data.
//!
//! Every producer holds reference counted arrays and never mutates them, so
//! exports share buffers with the producer and a single producer may be
//! exported from several threads at once.

mod array;
mod chunked;
mod record_batch;
mod table;

pub use array::ExportableArray;
pub use chunked::ExportableChunkedArray;
pub use record_batch::ExportableRecordBatch;
pub use table::ExportableTable;

use std::sync::Arc;

use arrow_array::{Array, ArrayRef};
use arrow_schema::{DataType, Field, FieldRef, Schema};

use crate::error::{ExchangeError, Result};
use crate::handle::ExportedStream;
use crate::negotiate::Negotiated;
use crate::stream::{export_array_reader, ArrayIterator};

/// Exports `chunks` lazily: the negotiated cast of each chunk runs when the
/// consumer requests it
fn export_chunks<I>(chunks: I, negotiated: Negotiated) -> ExportedStream
where
    I: IntoIterator<Item = ArrayRef>,
    I::IntoIter: Send + 'static,
{
    let field = negotiated.field().clone();
    let iter = chunks.into_iter().map(move |chunk| negotiated.apply(chunk));
    let reader = ArrayIterator::new(iter, field);
    ExportedStream::new(export_array_reader(Box::new(reader)))
}

/// Checks that `array` may be described by `field`
fn check_array(field: &Field, array: &dyn Array) -> Result<()> {
    if !array.data_type().equals_datatype(field.data_type()) {
        return Err(ExchangeError::invalid_data(format!(
            "array of type {} does not match field '{}' of type {}",
            array.data_type(),
            field.name(),
            field.data_type()
        )));
    }
    if !field.is_nullable() && array.null_count() > 0 {
        return Err(ExchangeError::invalid_data(format!(
            "non-nullable field '{}' contains {} nulls",
            field.name(),
            array.null_count()
        )));
    }
    Ok(())
}

/// The field of the struct arrays a schema's record batches are exported as
fn schema_field(schema: &Schema) -> FieldRef {
    Arc::new(
        Field::new("", DataType::Struct(schema.fields().clone()), false)
            .with_metadata(schema.metadata().clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use arrow_array::Int32Array;

    #[test]
    fn test_check_array() {
        let array = Int32Array::from(vec![Some(1), None]);

        let field = Field::new("a", DataType::Int32, true);
        check_array(&field, &array).unwrap();

        let field = Field::new("a", DataType::Int64, true);
        let err = check_array(&field, &array).unwrap_err();
        assert!(err.to_string().contains("does not match field 'a'"), "{err}");

        let field = Field::new("a", DataType::Int32, false);
        let err = check_array(&field, &array).unwrap_err();
        assert!(err.to_string().contains("contains 1 nulls"), "{err}");
    }

    #[test]
    fn test_schema_field() {
        let schema = Schema::new_with_metadata(
            vec![Field::new("a", DataType::Int32, true)],
            HashMap::from([("origin".to_string(), "test".to_string())]),
        );
        let field = schema_field(&schema);
        assert_eq!(field.name(), "");
        assert!(!field.is_nullable());
        assert_eq!(field.metadata(), schema.metadata());
        assert_eq!(
            field.data_type(),
            &DataType::Struct(schema.fields().clone())
        );
    }
}
