//! One-hot labels and evaluation-split containers.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("no label rows")]
    Empty,
    #[error("label row {row} has {got} entries, expected {expected}")]
    Ragged {
        row: usize,
        got: usize,
        expected: usize,
    },
    #[error("label row {row} is not one-hot ({nonzero} nonzero entries)")]
    NotOneHot { row: usize, nonzero: usize },
    #[error("class {class} out of range for {classes} classes")]
    ClassRange { class: usize, classes: usize },
    #[error("{rows} data rows but {labels} label rows")]
    RowMismatch { rows: usize, labels: usize },
}

/// Per-sample class assignment with exactly one unit entry per row.
///
/// Stored as class indices; the constructors validate the one-hot shape so
/// the accessors can stay infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotLabels {
    classes: usize,
    indices: Vec<usize>,
}

impl OneHotLabels {
    /// Builds from one-hot rows, one row per sample. The first row fixes the
    /// class count; every row must contain exactly one nonzero entry.
    pub fn from_one_hot(rows: &[Vec<u8>]) -> Result<Self, LabelError> {
        if rows.is_empty() {
            return Err(LabelError::Empty);
        }
        let classes = rows[0].len();
        let mut indices = Vec::with_capacity(rows.len());
        for (row, entries) in rows.iter().enumerate() {
            if entries.len() != classes {
                return Err(LabelError::Ragged {
                    row,
                    got: entries.len(),
                    expected: classes,
                });
            }
            let nonzero = entries.iter().filter(|&&v| v != 0).count();
            if nonzero != 1 {
                return Err(LabelError::NotOneHot { row, nonzero });
            }
            // position() is Some here, the row has exactly one nonzero entry
            let class = entries.iter().position(|&v| v != 0).unwrap_or(0);
            indices.push(class);
        }
        Ok(Self { classes, indices })
    }

    /// Builds from plain class indices.
    pub fn from_indices(indices: &[usize], classes: usize) -> Result<Self, LabelError> {
        if indices.is_empty() {
            return Err(LabelError::Empty);
        }
        for &class in indices {
            if class >= classes {
                return Err(LabelError::ClassRange { class, classes });
            }
        }
        Ok(Self {
            classes,
            indices: indices.to_vec(),
        })
    }

    pub fn n_samples(&self) -> usize {
        self.indices.len()
    }

    pub fn n_classes(&self) -> usize {
        self.classes
    }

    /// Class index of sample `row`. Panics if `row` is out of range.
    pub fn class_of(&self, row: usize) -> usize {
        self.indices[row]
    }

    /// Row indices of the samples belonging to `class`.
    pub fn indices_of_class(&self, class: usize) -> Vec<usize> {
        self.indices
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c == class)
            .map(|(i, _)| i)
            .collect()
    }

    /// Per-class row counts, length `n_classes`.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes];
        for &c in &self.indices {
            counts[c] += 1;
        }
        counts
    }
}

/// One-hot conditioning vector for `class`.
pub fn one_hot(class: usize, n_classes: usize) -> Vec<f32> {
    assert!(class < n_classes, "class out of range");
    let mut v = vec![0.0f32; n_classes];
    v[class] = 1.0;
    v
}

/// Evaluation split with `.data`/`.labels` accessors.
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub data: Vec<Vec<f32>>,
    pub labels: OneHotLabels,
}

impl DataSplit {
    pub fn new(data: Vec<Vec<f32>>, labels: OneHotLabels) -> Result<Self, LabelError> {
        if data.len() != labels.n_samples() {
            return Err(LabelError::RowMismatch {
                rows: data.len(),
                labels: labels.n_samples(),
            });
        }
        Ok(Self { data, labels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(class: usize, classes: usize) -> Vec<u8> {
        let mut v = vec![0u8; classes];
        v[class] = 1;
        v
    }

    #[test]
    fn one_hot_rows_round_trip() {
        let labels =
            OneHotLabels::from_one_hot(&[row(2, 4), row(0, 4), row(3, 4)]).unwrap();
        assert_eq!(labels.n_samples(), 3);
        assert_eq!(labels.n_classes(), 4);
        assert_eq!(labels.class_of(0), 2);
        assert_eq!(labels.class_of(2), 3);
    }

    #[test]
    fn rejects_rows_with_two_units() {
        let mut bad = row(1, 4);
        bad[3] = 1;
        let err = OneHotLabels::from_one_hot(&[bad]).unwrap_err();
        assert_eq!(err, LabelError::NotOneHot { row: 0, nonzero: 2 });
    }

    #[test]
    fn rejects_all_zero_rows() {
        let err = OneHotLabels::from_one_hot(&[vec![0, 0, 0]]).unwrap_err();
        assert_eq!(err, LabelError::NotOneHot { row: 0, nonzero: 0 });
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = OneHotLabels::from_one_hot(&[row(0, 4), row(1, 3)]).unwrap_err();
        assert_eq!(
            err,
            LabelError::Ragged {
                row: 1,
                got: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn single_sample_filters_to_its_class_only() {
        let labels = OneHotLabels::from_one_hot(&[row(3, 10)]).unwrap();
        assert_eq!(labels.indices_of_class(3), vec![0]);
        for class in (0..10).filter(|&c| c != 3) {
            assert!(labels.indices_of_class(class).is_empty());
        }
    }

    #[test]
    fn counts_cover_all_samples() {
        let labels = OneHotLabels::from_indices(&[1, 1, 0, 2, 1], 3).unwrap();
        assert_eq!(labels.counts(), vec![1, 3, 1]);
    }

    #[test]
    fn index_constructor_checks_range() {
        let err = OneHotLabels::from_indices(&[0, 5], 3).unwrap_err();
        assert_eq!(err, LabelError::ClassRange { class: 5, classes: 3 });
    }

    #[test]
    fn conditioning_vector_has_single_unit() {
        let v = one_hot(7, 10);
        assert_eq!(v.len(), 10);
        assert_eq!(v.iter().sum::<f32>(), 1.0);
        assert_eq!(v[7], 1.0);
    }

    #[test]
    #[should_panic(expected = "class out of range")]
    fn conditioning_vector_panics_out_of_range() {
        one_hot(10, 10);
    }

    #[test]
    fn split_checks_row_parity() {
        let labels = OneHotLabels::from_indices(&[0, 1], 2).unwrap();
        let err = DataSplit::new(vec![vec![0.0]], labels).unwrap_err();
        assert_eq!(err, LabelError::RowMismatch { rows: 1, labels: 2 });
    }
}
