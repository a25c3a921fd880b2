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

use arrow_array::{ArrayRef, Float64Array, Int32Array};
use arrow_exchange::{
    ArrowArrayExportable, ArrowStreamExportable, ExportableArray, ExportableChunkedArray,
};
use arrow_schema::ffi::FFI_ArrowSchema;
use arrow_schema::{DataType, Field};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rng, Rng};
use std::hint::black_box;
use std::sync::Arc;

fn make_array(len: usize) -> ArrayRef {
    let mut rng = rng();
    Arc::new(Float64Array::from_iter((0..len).map(|_| {
        rng.random_bool(0.9).then(|| rng.random::<f64>())
    })))
}

fn make_chunks(num_chunks: usize, chunk_len: usize) -> ExportableChunkedArray {
    let chunks = (0..num_chunks).map(|_| make_array(chunk_len)).collect();
    ExportableChunkedArray::try_new(Field::new("value", DataType::Float64, true), chunks).unwrap()
}

fn export_array_benchmark(c: &mut Criterion) {
    for len in [1024, 65536] {
        let producer = ExportableArray::from_array_ref(make_array(len));
        c.bench_with_input(BenchmarkId::new("export_array", len), &producer, |b, p| {
            b.iter(|| black_box(p.export_array(None).unwrap().import().unwrap()))
        });
    }

    let array: ArrayRef = Arc::new(Int32Array::from_iter_values(0..65536));
    let producer = ExportableArray::from_array_ref(array);
    let requested = FFI_ArrowSchema::try_from(&DataType::Float64).unwrap();
    c.bench_function("export_array cast Int32 -> Float64", |b| {
        b.iter(|| black_box(producer.export_array(Some(&requested)).unwrap()))
    });
}

fn export_stream_benchmark(c: &mut Criterion) {
    for num_chunks in [1, 16, 256] {
        let producer = make_chunks(num_chunks, 65536 / num_chunks);
        c.bench_with_input(
            BenchmarkId::new("export_stream", num_chunks),
            &producer,
            |b, p| {
                b.iter(|| {
                    let reader = p.export_stream(None).unwrap().into_array_reader().unwrap();
                    for chunk in reader {
                        black_box(chunk.unwrap());
                    }
                })
            },
        );
    }
}

criterion_group!(benches, export_array_benchmark, export_stream_benchmark);
criterion_main!(benches);
