//! Block compressed sparse row storage.
//!
//! A [`BsrMatrix`] stores a sparse matrix as a CSR-like structure over *block* rows and
//! *block* columns, where every stored entry is a dense `M x N` block. The sparsity pattern is
//! fixed at construction: values can be modified, but no blocks can be inserted afterwards.
use itertools::Itertools;
use nalgebra::{ClosedAdd, ClosedMul, DMatrix, DVector, SMatrix, Scalar};
use nalgebra_sparse::pattern::{SparsityPattern, SparsityPatternFormatError};
use nalgebra_sparse::CsrMatrix;
use num::{One, Zero};
use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Errors produced by operations on a [`BsrMatrix`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BsrError {
    /// The offsets and column indices given at construction do not form a valid block pattern.
    InvalidPattern(SparsityPatternFormatError),
    /// The block at the given block coordinates is not part of the sparsity pattern.
    OutsidePattern { block_row: usize, block_col: usize },
}

impl Display for BsrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern(err) => write!(f, "Invalid block sparsity pattern: {err}"),
            Self::OutsidePattern { block_row, block_col } => write!(
                f,
                "Block ({block_row}, {block_col}) is outside the sparsity pattern"
            ),
        }
    }
}

impl Error for BsrError {}

/// A sparse matrix in block compressed row format with fixed `M x N` blocks.
///
/// Column indices are sorted in ascending order within each block row, which allows
/// lookups with a binary search.
#[derive(Debug, Clone, PartialEq)]
pub struct BsrMatrix<T, const M: usize, const N: usize> {
    nbcols: usize,
    row_offsets: Vec<usize>,
    col_indices: Vec<usize>,
    blocks: Vec<SMatrix<T, M, N>>,
}

impl<T, const M: usize, const N: usize> BsrMatrix<T, M, N>
where
    T: Scalar + Zero,
{
    /// Creates a zero-valued matrix from block row offsets and block column indices.
    ///
    /// Returns an error if the offsets are not a valid CSR offset array for `nbrows` rows, or
    /// if the column indices in a row are out of bounds, unsorted or duplicated.
    pub fn try_from_pattern(
        nbrows: usize,
        nbcols: usize,
        row_offsets: Vec<usize>,
        col_indices: Vec<usize>,
    ) -> Result<Self, BsrError> {
        let pattern = SparsityPattern::try_from_offsets_and_indices(nbrows, nbcols, row_offsets, col_indices)
            .map_err(BsrError::InvalidPattern)?;
        Ok(Self::from_sparsity_pattern(&pattern))
    }

    /// Creates a zero-valued matrix whose blocks are the entries of the given pattern.
    pub fn from_sparsity_pattern(pattern: &SparsityPattern) -> Self {
        Self {
            nbcols: pattern.minor_dim(),
            row_offsets: pattern.major_offsets().to_vec(),
            col_indices: pattern.minor_indices().to_vec(),
            blocks: vec![SMatrix::zeros(); pattern.nnz()],
        }
    }

    /// Materializes the matrix as a dense matrix.
    pub fn to_dense(&self) -> DMatrix<T> {
        let mut dense = DMatrix::zeros(self.nrows(), self.ncols());
        for block_row in 0..self.nbrows() {
            let range = self.row_offsets[block_row]..self.row_offsets[block_row + 1];
            for idx in range {
                let block_col = self.col_indices[idx];
                for i in 0..M {
                    for j in 0..N {
                        dense[(M * block_row + i, N * block_col + j)] = self.blocks[idx][(i, j)].clone();
                    }
                }
            }
        }
        dense
    }

    /// Converts the matrix into a scalar CSR matrix with the same (expanded) sparsity pattern.
    ///
    /// Every stored block contributes all of its `M x N` entries, including explicit zeros.
    pub fn to_csr(&self) -> CsrMatrix<T> {
        let mut offsets = Vec::with_capacity(self.nrows() + 1);
        let mut col_indices = Vec::with_capacity(M * N * self.nnz());
        let mut values = Vec::with_capacity(M * N * self.nnz());

        offsets.push(0);
        for (row_begin, row_end) in self.row_offsets.iter().copied().tuple_windows() {
            for i in 0..M {
                for idx in row_begin..row_end {
                    let block_col = self.col_indices[idx];
                    for j in 0..N {
                        col_indices.push(N * block_col + j);
                        values.push(self.blocks[idx][(i, j)].clone());
                    }
                }
                offsets.push(col_indices.len());
            }
        }

        CsrMatrix::try_from_csr_data(self.nrows(), self.ncols(), offsets, col_indices, values)
            .expect("Internal error: expanded block structure must always be valid CSR")
    }

    /// Sets all stored values to zero, retaining the sparsity pattern.
    pub fn zero(&mut self) {
        for block in &mut self.blocks {
            block.fill(T::zero());
        }
    }
}

impl<T, const M: usize, const N: usize> BsrMatrix<T, M, N> {
    /// Number of block rows.
    pub fn nbrows(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Number of block columns.
    pub fn nbcols(&self) -> usize {
        self.nbcols
    }

    /// Number of scalar rows, `M * nbrows`.
    pub fn nrows(&self) -> usize {
        M * self.nbrows()
    }

    /// Number of scalar columns, `N * nbcols`.
    pub fn ncols(&self) -> usize {
        N * self.nbcols
    }

    /// Number of stored blocks.
    pub fn nnz(&self) -> usize {
        self.blocks.len()
    }

    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    pub fn blocks(&self) -> &[SMatrix<T, M, N>] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [SMatrix<T, M, N>] {
        &mut self.blocks
    }

    /// The block column indices of the given block row.
    ///
    /// Panics if the row is out of bounds.
    pub fn row_col_indices(&self, block_row: usize) -> &[usize] {
        &self.col_indices[self.row_offsets[block_row]..self.row_offsets[block_row + 1]]
    }

    /// Returns the index into [`blocks`](Self::blocks) of the block at the given block coordinates.
    ///
    /// Returns `None` if the block is not part of the sparsity pattern, including when
    /// `block_row` is out of bounds.
    pub fn find_value_index(&self, block_row: usize, block_col: usize) -> Option<usize> {
        let begin = *self.row_offsets.get(block_row)?;
        let end = *self.row_offsets.get(block_row + 1)?;
        self.col_indices[begin..end]
            .binary_search(&block_col)
            .ok()
            .map(|local_index| begin + local_index)
    }

    /// The sparsity pattern of the blocks, with block rows as the major dimension.
    pub fn pattern(&self) -> SparsityPattern {
        SparsityPattern::try_from_offsets_and_indices(
            self.nbrows(),
            self.nbcols,
            self.row_offsets.clone(),
            self.col_indices.clone(),
        )
        .expect("Internal error: block structure must always be a valid pattern")
    }
}

impl<T, const M: usize, const N: usize> BsrMatrix<T, M, N>
where
    T: Scalar + Zero + ClosedAdd,
{
    /// Accumulates a dense matrix into the entries addressed by the global scalar indices
    /// `rows` and `cols`, i.e. `A[rows[a], cols[b]] += values[(a, b)]`.
    ///
    /// Returns an error if an addressed block is not in the sparsity pattern. Entries visited
    /// before the offending one have already been accumulated in that case.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions of `values` do not match the lengths of `rows` and `cols`.
    pub fn add_values(&mut self, rows: &[usize], cols: &[usize], values: &DMatrix<T>) -> Result<(), BsrError> {
        assert_eq!(values.nrows(), rows.len(), "Number of rows must match number of row indices.");
        assert_eq!(values.ncols(), cols.len(), "Number of columns must match number of column indices.");

        for (a, &row) in rows.iter().enumerate() {
            let (block_row, i) = (row / M, row % M);
            for (b, &col) in cols.iter().enumerate() {
                let (block_col, j) = (col / N, col % N);
                let idx = self
                    .find_value_index(block_row, block_col)
                    .ok_or(BsrError::OutsidePattern { block_row, block_col })?;
                self.blocks[idx][(i, j)] += values[(a, b)].clone();
            }
        }
        Ok(())
    }
}

impl<T, const M: usize, const N: usize> BsrMatrix<T, M, N>
where
    T: Scalar + Zero + One + ClosedAdd,
{
    /// Zeros the given global scalar rows and places a one on their diagonal entries.
    ///
    /// Returns an error if the block holding the diagonal entry of a row is not part of the
    /// sparsity pattern. Rows preceding the offending row have already been modified.
    pub fn zero_rows(&mut self, rows: &[usize]) -> Result<(), BsrError> {
        for &row in rows {
            let (block_row, i) = (row / M, row % M);
            let (diag_block_col, j) = (row / N, row % N);
            let diag_idx = self
                .find_value_index(block_row, diag_block_col)
                .ok_or(BsrError::OutsidePattern {
                    block_row,
                    block_col: diag_block_col,
                })?;

            for idx in self.row_offsets[block_row]..self.row_offsets[block_row + 1] {
                self.blocks[idx].row_mut(i).fill(T::zero());
            }
            self.blocks[diag_idx][(i, j)] = T::one();
        }
        Ok(())
    }
}

impl<T, const M: usize, const N: usize> BsrMatrix<T, M, N>
where
    T: Scalar + Zero + ClosedAdd + ClosedMul,
{
    /// Computes `y = A x`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions of `x` or `y` are incompatible with the matrix.
    pub fn spmv(&self, x: &DVector<T>, y: &mut DVector<T>) {
        assert_eq!(x.len(), self.ncols(), "x must have as many entries as the matrix has columns.");
        assert_eq!(y.len(), self.nrows(), "y must have as many entries as the matrix has rows.");

        y.fill(T::zero());
        for block_row in 0..self.nbrows() {
            for idx in self.row_offsets[block_row]..self.row_offsets[block_row + 1] {
                let block = &self.blocks[idx];
                let block_col = self.col_indices[idx];
                for i in 0..M {
                    let mut sum = T::zero();
                    for j in 0..N {
                        sum += block[(i, j)].clone() * x[N * block_col + j].clone();
                    }
                    y[M * block_row + i] += sum;
                }
            }
        }
    }
}
