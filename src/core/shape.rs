//! Operand shapes and their validation.

use super::error::ShapeError;

/// Shape of an operand pair, and therefore of the response it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Vector of `len` elements.
    Vector {
        /// Element count (`n` on the wire).
        len: u32,
    },
    /// Row-major matrix.
    Matrix {
        /// Row count.
        rows: u32,
        /// Column count.
        cols: u32,
    },
}

impl Shape {
    /// Number of payload elements in one operand of this shape.
    ///
    /// Saturates at `usize::MAX`; see [`checked_elements`](Self::checked_elements).
    pub fn elements(self) -> usize {
        self.checked_elements().unwrap_or(usize::MAX)
    }

    /// Element count, or `None` if it overflows `usize`.
    pub fn checked_elements(self) -> Option<usize> {
        match self {
            Shape::Vector { len } => usize::try_from(len).ok(),
            Shape::Matrix { rows, cols } => {
                usize::try_from(rows).ok()?.checked_mul(usize::try_from(cols).ok()?)
            }
        }
    }

    /// Row count; a vector is a single row.
    pub fn rows(self) -> u32 {
        match self {
            Shape::Vector { .. } => 1,
            Shape::Matrix { rows, .. } => rows,
        }
    }

    /// Column count; a vector's length.
    pub fn cols(self) -> u32 {
        match self {
            Shape::Vector { len } => len,
            Shape::Matrix { cols, .. } => cols,
        }
    }

    /// Check that two vectors can be sent together.
    pub fn of_vectors(v1: &[u32], v2: &[u32]) -> Result<Self, ShapeError> {
        if v1.len() != v2.len() {
            return Err(ShapeError::LengthMismatch {
                left: v1.len(),
                right: v2.len(),
            });
        }
        Ok(Shape::Vector {
            len: to_field(v1.len())?,
        })
    }

    /// Check that two matrices can be sent together.
    ///
    /// `rows` and `cols` come from `m1`; a matrix with no rows has zero
    /// columns. Every row of both operands must be `cols` long.
    pub fn of_matrices<R: AsRef<[u32]>>(m1: &[R], m2: &[R]) -> Result<Self, ShapeError> {
        let rows = m1.len();
        let cols = m1.first().map_or(0, |row| row.as_ref().len());

        if m2.len() != rows {
            return Err(ShapeError::RowMismatch {
                left: rows,
                right: m2.len(),
            });
        }
        if let Some(first) = m2.first() {
            let m2_cols = first.as_ref().len();
            if m2_cols != cols {
                return Err(ShapeError::ColumnMismatch {
                    left: cols,
                    right: m2_cols,
                });
            }
        }
        for matrix in [m1, m2] {
            for (row, values) in matrix.iter().enumerate() {
                let actual = values.as_ref().len();
                if actual != cols {
                    return Err(ShapeError::RaggedRow {
                        row,
                        expected: cols,
                        actual,
                    });
                }
            }
        }

        let rows = to_field(rows)?;
        let cols = to_field(cols)?;
        if u32::checked_mul(rows, cols).is_none() {
            return Err(ShapeError::TooLarge(
                (rows as usize).saturating_mul(cols as usize),
            ));
        }
        Ok(Shape::Matrix { rows, cols })
    }
}

fn to_field(dimension: usize) -> Result<u32, ShapeError> {
    u32::try_from(dimension).map_err(|_| ShapeError::TooLarge(dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_shape() {
        let shape = Shape::of_vectors(&[1, 2, 3], &[4, 5, 6]).unwrap();
        assert_eq!(shape, Shape::Vector { len: 3 });
        assert_eq!(shape.elements(), 3);
    }

    #[test]
    fn test_vector_length_mismatch() {
        assert_eq!(
            Shape::of_vectors(&[1, 2, 3], &[4, 5]),
            Err(ShapeError::LengthMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn test_empty_vectors() {
        assert_eq!(Shape::of_vectors(&[], &[]), Ok(Shape::Vector { len: 0 }));
    }

    #[test]
    fn test_matrix_shape() {
        let m1 = vec![vec![1, 2, 3], vec![4, 5, 6]];
        let m2 = vec![vec![0; 3], vec![0; 3]];
        let shape = Shape::of_matrices(&m1, &m2).unwrap();
        assert_eq!(shape, Shape::Matrix { rows: 2, cols: 3 });
        assert_eq!(shape.elements(), 6);
        assert_eq!((shape.rows(), shape.cols()), (2, 3));
    }

    #[test]
    fn test_matrix_row_mismatch() {
        let m1 = vec![vec![1, 2], vec![3, 4]];
        let m2 = vec![vec![1, 2]];
        assert_eq!(
            Shape::of_matrices(&m1, &m2),
            Err(ShapeError::RowMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn test_matrix_column_mismatch() {
        let m1 = vec![vec![1, 2], vec![3, 4]];
        let m2 = vec![vec![1, 2, 3], vec![4, 5, 6]];
        assert_eq!(
            Shape::of_matrices(&m1, &m2),
            Err(ShapeError::ColumnMismatch { left: 2, right: 3 })
        );
    }

    #[test]
    fn test_ragged_rows() {
        let m1 = vec![vec![1, 2], vec![3]];
        let m2 = vec![vec![1, 2], vec![3, 4]];
        assert_eq!(
            Shape::of_matrices(&m1, &m2),
            Err(ShapeError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            })
        );

        // Ragged second operand is caught too
        let m2 = vec![vec![1, 2], vec![3, 4, 5]];
        let m1 = vec![vec![1, 2], vec![3, 4]];
        assert!(matches!(
            Shape::of_matrices(&m1, &m2),
            Err(ShapeError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn test_checked_elements() {
        assert_eq!(Shape::Vector { len: 7 }.checked_elements(), Some(7));
        assert_eq!(Shape::Matrix { rows: 2, cols: 3 }.checked_elements(), Some(6));
        assert_eq!(Shape::Matrix { rows: u32::MAX, cols: 0 }.checked_elements(), Some(0));

        let huge = Shape::Matrix {
            rows: u32::MAX,
            cols: u32::MAX,
        };
        let product = u32::MAX as u64 * u32::MAX as u64;
        assert_eq!(
            huge.checked_elements(),
            usize::try_from(product).ok()
        );
        assert_eq!(huge.elements(), usize::try_from(product).unwrap_or(usize::MAX));
    }

    #[test]
    fn test_empty_matrix() {
        let empty: Vec<Vec<u32>> = Vec::new();
        assert_eq!(
            Shape::of_matrices(&empty, &empty),
            Ok(Shape::Matrix { rows: 0, cols: 0 })
        );
    }
}
