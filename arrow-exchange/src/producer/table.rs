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

use arrow_array::{ArrayRef, RecordBatch, RecordBatchReader, StructArray};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::SchemaRef;
use tracing::debug;

use super::{export_chunks, schema_field};
use crate::capability::{ArrowSchemaExportable, ArrowStreamExportable};
use crate::error::{ExchangeError, Result};
use crate::handle::ExportedStream;
use crate::negotiate::negotiate;
use crate::options::ExportOptions;

/// A schema and a sequence of record batches of that schema
///
/// Exported as a stream of struct arrays, one per batch, which any consumer
/// of record batch streams can read.
#[derive(Debug, Clone)]
pub struct ExportableTable {
    schema: SchemaRef,
    batches: Vec<RecordBatch>,
    options: ExportOptions,
}

impl ExportableTable {
    /// Create a new [`ExportableTable`], validating every batch against `schema`
    pub fn try_new(schema: SchemaRef, batches: Vec<RecordBatch>) -> Result<Self> {
        for (i, batch) in batches.iter().enumerate() {
            if batch.schema().fields() != schema.fields() {
                return Err(ExchangeError::invalid_data(format!(
                    "schema of batch {i} does not match table schema"
                )));
            }
        }
        Ok(Self {
            schema,
            batches,
            options: ExportOptions::default(),
        })
    }

    /// Reads every batch of `reader`
    pub fn from_record_batch_reader(reader: impl RecordBatchReader) -> Result<Self> {
        let schema = reader.schema();
        let batches = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(ExchangeError::import)?;
        Self::try_new(schema, batches)
    }

    pub fn with_options(self, options: ExportOptions) -> Self {
        Self { options, ..self }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_batches(&self) -> usize {
        self.batches.len()
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    pub fn into_inner(self) -> (SchemaRef, Vec<RecordBatch>) {
        (self.schema, self.batches)
    }
}

impl ArrowSchemaExportable for ExportableTable {
    fn export_schema(&self) -> Result<FFI_ArrowSchema> {
        FFI_ArrowSchema::try_from(self.schema.as_ref()).map_err(ExchangeError::export)
    }
}

impl ArrowStreamExportable for ExportableTable {
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedStream> {
        let field = schema_field(&self.schema);
        let negotiated = negotiate(&field, requested_schema, &self.options)?;
        debug!(
            num_batches = self.batches.len(),
            num_rows = self.num_rows(),
            "exporting table"
        );
        let chunks = self
            .batches
            .clone()
            .into_iter()
            .map(|batch| Arc::new(StructArray::from(batch)) as ArrayRef);
        Ok(export_chunks(chunks, negotiated))
    }
}
