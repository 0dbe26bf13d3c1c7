//! Boundary polylines
//!
//! Boundary vertices live in one flat table of 0x10-byte records:
//!
//! ```text
//! 0x00  position    f32 x3
//! 0x0C  run_length  i16   +len on a run's first record, -len on its last
//! 0x0E  unknown     u16
//! ```
//!
//! A negative `run_length` closes the current run. Runs whose lengths do
//! not agree are kept as-is and reported.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Vertex;
use crate::io::OffsetReader;
use crate::warning::{Decoded, Warning, WarningSink};

pub const BOUNDARY_RECORD_SIZE: usize = 0x10;

/// One record of the boundary vertex table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryRecord {
    pub position: Vertex,
    pub run_length: i16,
    pub unknown: u16,
}

impl BoundaryRecord {
    pub(crate) fn read(reader: &mut OffsetReader<'_>) -> Result<Self> {
        Ok(Self {
            position: reader.read_vertex()?,
            run_length: reader.read_i16()?,
            unknown: reader.read_u16()?,
        })
    }
}

/// One closed polyline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundarySubmesh {
    pub vertices: Vec<Vertex>,
    pub unknowns: Vec<u16>,
}

impl BoundarySubmesh {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn push(&mut self, record: &BoundaryRecord) {
        self.vertices.push(record.position);
        self.unknowns.push(record.unknown);
    }
}

/// Split the flat record table into submeshes.
///
/// The length carried by a run's first record and the negated length on
/// its last record must both equal the number of records in the run. A
/// single-record run is its own opener and closer. A table that ends
/// inside a run yields that run as a final submesh with a warning.
pub fn split_runs(records: &[BoundaryRecord]) -> Decoded<Vec<BoundarySubmesh>> {
    let mut sink = WarningSink::new();
    let mut submeshes = Vec::new();
    let mut current = BoundarySubmesh::default();
    let mut initial: i16 = 0;

    for record in records {
        current.push(record);

        if record.run_length < 0 {
            if current.len() == 1 {
                initial = record.run_length.saturating_neg();
            }
            let expected = record.run_length.unsigned_abs() as usize;
            if current.len() != expected || i32::from(initial) != expected as i32 {
                sink.push(Warning::BoundaryRunMismatch {
                    submesh: submeshes.len(),
                    expected,
                    actual: current.len(),
                    initial,
                });
            }
            submeshes.push(std::mem::take(&mut current));
            initial = 0;
        } else if current.len() == 1 {
            initial = record.run_length;
        }
    }

    if !current.is_empty() {
        sink.push(Warning::UnterminatedBoundaryRun {
            submesh: submeshes.len(),
            actual: current.len(),
            initial,
        });
        submeshes.push(current);
    }

    sink.finish(submeshes)
}

/// Longest run whose length fits the signed 16-bit sentinel
pub const MAX_RUN_LEN: usize = i16::MAX as usize;

/// Sentinel values for a run of `len` records, as written back on patch.
/// `None` when `len` does not fit in a sentinel.
pub fn run_sentinels(len: usize) -> Option<impl Iterator<Item = i16>> {
    let len_i16 = i16::try_from(len).ok()?;
    Some((0..len).map(move |i| {
        if i + 1 == len {
            -len_i16
        } else if i == 0 {
            len_i16
        } else {
            0
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(runs: &[usize]) -> Vec<BoundaryRecord> {
        let mut records = Vec::new();
        for &len in runs {
            for sentinel in run_sentinels(len).unwrap() {
                let n = records.len() as f32;
                records.push(BoundaryRecord {
                    position: Vertex::new(n, 0.0, -n),
                    run_length: sentinel,
                    unknown: 0,
                });
            }
        }
        records
    }

    #[test]
    fn test_run_sentinels() {
        let sentinels = |len| run_sentinels(len).unwrap().collect::<Vec<_>>();
        assert_eq!(sentinels(1), vec![-1]);
        assert_eq!(sentinels(2), vec![2, -2]);
        assert_eq!(sentinels(4), vec![4, 0, 0, -4]);
        assert_eq!(sentinels(MAX_RUN_LEN).last(), Some(&-i16::MAX));
    }

    #[test]
    fn test_run_too_long_for_sentinel() {
        assert!(run_sentinels(MAX_RUN_LEN + 1).is_none());
        assert!(run_sentinels(40_000).is_none());
    }

    #[test]
    fn test_three_runs_no_warnings() {
        let decoded = split_runs(&encode(&[3, 1, 5]));
        assert!(decoded.is_clean(), "{:?}", decoded.warnings);
        let lens: Vec<_> = decoded.value.iter().map(BoundarySubmesh::len).collect();
        assert_eq!(lens, vec![3, 1, 5]);
        assert_eq!(decoded.value[1].vertices[0], Vertex::new(3.0, 0.0, -3.0));
    }

    #[test]
    fn test_corrupt_opener_one_warning() {
        let mut records = encode(&[3, 1, 5]);
        records[4].run_length = 4;
        let decoded = split_runs(&records);
        assert_eq!(decoded.value.len(), 3);
        assert_eq!(
            decoded.warnings,
            vec![Warning::BoundaryRunMismatch {
                submesh: 2,
                expected: 5,
                actual: 5,
                initial: 4,
            }]
        );
    }

    #[test]
    fn test_corrupt_closer_one_warning() {
        let mut records = encode(&[3, 1, 5]);
        records[2].run_length = -2;
        let decoded = split_runs(&records);
        assert_eq!(decoded.value.len(), 3);
        assert_eq!(decoded.warnings.len(), 1);
        assert!(matches!(
            decoded.warnings[0],
            Warning::BoundaryRunMismatch {
                submesh: 0,
                expected: 2,
                actual: 3,
                initial: 3
            }
        ));
    }

    #[test]
    fn test_unterminated_tail() {
        let mut records = encode(&[2]);
        records.push(BoundaryRecord {
            run_length: 3,
            ..BoundaryRecord::default()
        });
        records.push(BoundaryRecord::default());
        let decoded = split_runs(&records);
        assert_eq!(decoded.value.len(), 2);
        assert_eq!(decoded.value[1].len(), 2);
        assert_eq!(
            decoded.warnings,
            vec![Warning::UnterminatedBoundaryRun {
                submesh: 1,
                actual: 2,
                initial: 3
            }]
        );
    }

    #[test]
    fn test_empty_table() {
        let decoded = split_runs(&[]);
        assert!(decoded.value.is_empty());
        assert!(decoded.is_clean());
    }
}
