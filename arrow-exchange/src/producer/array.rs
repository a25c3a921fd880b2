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

use arrow_array::{Array, ArrayRef};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{Field, FieldRef};
use tracing::debug;

use super::{check_array, export_chunks};
use crate::capability::{ArrowArrayExportable, ArrowSchemaExportable, ArrowStreamExportable};
use crate::error::{ExchangeError, Result};
use crate::handle::{ExportedArray, ExportedStream};
use crate::negotiate::negotiate;
use crate::options::ExportOptions;

/// A single array together with the field describing it
///
/// Exported as one array, or as a stream holding one chunk.
#[derive(Debug, Clone)]
pub struct ExportableArray {
    field: FieldRef,
    array: ArrayRef,
    options: ExportOptions,
}

impl ExportableArray {
    /// Create a new [`ExportableArray`], validating `array` against `field`
    pub fn try_new(field: impl Into<FieldRef>, array: ArrayRef) -> Result<Self> {
        let field = field.into();
        check_array(&field, array.as_ref())?;
        Ok(Self {
            field,
            array,
            options: ExportOptions::default(),
        })
    }

    /// Create a new [`ExportableArray`] described by an unnamed, nullable field
    pub fn from_array_ref(array: ArrayRef) -> Self {
        let field = Field::new("", array.data_type().clone(), true);
        Self {
            field: Arc::new(field),
            array,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(self, options: ExportOptions) -> Self {
        Self { options, ..self }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn array(&self) -> &ArrayRef {
        &self.array
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn into_inner(self) -> (FieldRef, ArrayRef) {
        (self.field, self.array)
    }
}

impl ArrowSchemaExportable for ExportableArray {
    fn export_schema(&self) -> Result<FFI_ArrowSchema> {
        FFI_ArrowSchema::try_from(self.field.as_ref()).map_err(ExchangeError::export)
    }
}

impl ArrowArrayExportable for ExportableArray {
    fn export_array(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedArray> {
        let negotiated = negotiate(&self.field, requested_schema, &self.options)?;
        let array = negotiated
            .apply(self.array.clone())
            .map_err(ExchangeError::export)?;
        debug!(
            data_type = %negotiated.field().data_type(),
            len = array.len(),
            "exporting array"
        );
        ExportedArray::try_new(negotiated.field(), array.as_ref())
    }
}

impl ArrowStreamExportable for ExportableArray {
    fn export_stream(&self, requested_schema: Option<&FFI_ArrowSchema>) -> Result<ExportedStream> {
        let negotiated = negotiate(&self.field, requested_schema, &self.options)?;
        Ok(export_chunks([self.array.clone()], negotiated))
    }
}

impl From<ArrayRef> for ExportableArray {
    fn from(array: ArrayRef) -> Self {
        Self::from_array_ref(array)
    }
}
