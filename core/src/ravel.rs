#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
  pub outer: usize,
  pub inner: usize
}

impl Shape {
  pub fn len(&self) -> usize {
    self.outer * self.inner
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Row-major flatten of a rectangular nested sequence. The inner length is
/// taken from the first row; rectangularity is the caller's responsibility
/// and is only checked in debug builds.
pub fn ravel<T: Copy, R: AsRef<[T]>>(rows: &[R]) -> (Vec<T>, Shape) {
  if rows.is_empty() {
    return (Vec::new(), Shape { outer: 0, inner: 0 });
  }
  let inner = rows[0].as_ref().len();
  let mut data = Vec::with_capacity(rows.len() * inner);
  for row in rows {
    let row = row.as_ref();
    debug_assert_eq!(row.len(), inner, "ragged rows passed to ravel");
    data.extend_from_slice(row);
  }
  (data, Shape { outer: rows.len(), inner })
}

pub fn unravel<T: Copy>(data: &[T], shape: Shape) -> Vec<Vec<T>> {
  debug_assert_eq!(data.len(), shape.len());
  if shape.inner == 0 {
    return vec![Vec::new(); shape.outer];
  }
  data.chunks(shape.inner).map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ravel_round_trip() {
    let rows = [[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let (data, shape) = ravel(&rows);
    assert_eq!(data, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(shape, Shape { outer: 2, inner: 3 });
    assert_eq!(shape.len(), data.len());

    let back = unravel(&data, shape);
    assert_eq!(back, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
  }

  #[test]
  fn ravel_empty() {
    let rows: [[u32; 2]; 0] = [];
    let (data, shape) = ravel(&rows);
    assert!(data.is_empty());
    assert_eq!(shape, Shape { outer: 0, inner: 0 });
    assert!(shape.is_empty());
  }

  #[test]
  fn ravel_rows_of_empty() {
    let rows: [[u32; 0]; 2] = [[], []];
    let (data, shape) = ravel(&rows);
    assert!(data.is_empty());
    assert_eq!(shape, Shape { outer: 2, inner: 0 });
    assert_eq!(unravel(&data, shape), vec![Vec::<u32>::new(), Vec::new()]);
  }
}
