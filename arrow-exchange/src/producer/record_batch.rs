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

use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::{Array, ArrayRef, RecordBatch, StructArray};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{DataType, Field, SchemaRef};
use tracing::debug;

use super::{export_chunks, schema_field};
use crate::capability::{ArrowArrayExportable, ArrowSchemaExportable, ArrowStreamExportable};
use crate::error::{ExchangeError, Result};
use crate::handle::{ExportedArray, ExportedStream};
use crate::negotiate::negotiate;
use crate::options::ExportOptions;

/// A [`RecordBatch`] exported as a struct array with one child per column
#[derive(Debug, Clone)]
pub struct ExportableRecordBatch {
    batch: RecordBatch,
    options: ExportOptions,
}

impl ExportableRecordBatch {
    pub fn new(batch: RecordBatch) -> Self {
        Self {
            batch,
            options: ExportOptions::default(),
        }
    }

    /// Create a new [`ExportableRecordBatch`] from an imported struct array
    pub fn try_from_struct_array(field: &Field, array: &dyn Array) -> Result<Self> {
        if !matches!(field.data_type(), DataType::Struct(_)) {
            return Err(ExchangeError::invalid_data(format!(
                "a record batch requires a struct array, got {}",
                field.data_type()
            )));
        }
        let array = array.as_struct_opt().ok_or_else(|| {
            ExchangeError::invalid_data(format!(
                "a record batch requires a struct array, got {}",
                array.data_type()
            ))
        })?;
        if array.null_count() > 0 {
            return Err(ExchangeError::invalid_data(
                "a record batch cannot be built from a struct array with top level nulls",
            ));
        }

        let batch = RecordBatch::from(array.clone());
        let schema = batch.schema().as_ref().clone().with_metadata(field.metadata().clone());
        let batch = batch.with_schema(Arc::new(schema)).map_err(ExchangeError::import)?;
        Ok(Self::new(batch))
    }

    pub fn with_options(self, options: ExportOptions) -> Self {
        Self { options, ..self }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn into_inner(self) -> RecordBatch {
        self.batch
    }

    fn struct_array(&self) -> ArrayRef {
        Arc::new(StructArray::from(self.batch.clone()))
    }
}

impl From<RecordBatch> for ExportableRecordBatch {
    fn from(batch: RecordBatch) -> Self {
        Self::new(batch)
    }
}

impl ArrowSchemaExportable for ExportableRecordBatch {
    fn export_schema(&self) -> Result<FFI_ArrowSchema> {
        FFI_ArrowSchema::try_from(self.batch.schema().as_ref()).map_err(ExchangeError::export)
    }
}

impl ArrowArrayExportable for ExportableRecordBatch {
    fn export_array(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedArray> {
        let field = schema_field(self.batch.schema().as_ref());
        let negotiated = negotiate(&field, requested_schema, &self.options)?;
        let array = negotiated
            .apply(self.struct_array())
            .map_err(ExchangeError::export)?;
        debug!(
            num_columns = self.batch.num_columns(),
            num_rows = self.batch.num_rows(),
            "exporting record batch"
        );
        ExportedArray::try_new(negotiated.field(), array.as_ref())
    }
}

impl ArrowStreamExportable for ExportableRecordBatch {
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedStream> {
        let field = schema_field(self.batch.schema().as_ref());
        let negotiated = negotiate(&field, requested_schema, &self.options)?;
        Ok(export_chunks([self.struct_array()], negotiated))
    }
}
