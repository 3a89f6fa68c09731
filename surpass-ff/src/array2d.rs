/// A rectangular matrix stored row-wise in a flat vector.
#[derive(Clone, Debug)]
pub struct Array2D<T: Clone> {
    n_rows: usize,
    n_columns: usize,
    data: Vec<T>,
}

impl<T: Clone> Array2D<T> {
    /// Creates a matrix of a given size, filled with a value
    pub fn new(n_rows: usize, n_columns: usize, fill: T) -> Array2D<T> {
        Array2D { n_rows, n_columns, data: vec![fill; n_rows * n_columns] }
    }

    pub fn count_rows(&self) -> usize { self.n_rows }

    pub fn count_columns(&self) -> usize { self.n_columns }

    /// Returns the element stored in a given row and column
    pub fn get(&self, row: usize, column: usize) -> T { self.data[row * self.n_columns + column].clone() }

    /// Sets the element in a given row and column
    pub fn set(&mut self, row: usize, column: usize, value: T) {
        self.data[row * self.n_columns + column] = value;
    }

    /// Fills the whole matrix with a value
    pub fn clear(&mut self, value: T) {
        for e in self.data.iter_mut() { *e = value.clone(); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_clear() {
        let mut m: Array2D<i32> = Array2D::new(3, 4, 0);
        m.set(2, 3, 7);
        assert_eq!(m.get(2, 3), 7);
        assert_eq!(m.get(0, 0), 0);
        m.clear(1);
        assert_eq!(m.get(2, 3), 1);
    }
}
