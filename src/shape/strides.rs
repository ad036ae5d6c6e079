//! C-order (row-major) stride computation and item counting.

/// Compute the row-major contiguous byte strides for `shape` given
/// `itemsize`.
///
/// `strides[i] = itemsize * product(shape[i+1..])`; the last axis has
/// stride `itemsize`.
pub fn calc_strides(shape: &[usize], itemsize: usize) -> Vec<isize>
{
    let mut strides = vec![0isize; shape.len()];
    let mut acc = itemsize as isize;
    for i in (0..shape.len()).rev() {
        strides[i] = acc;
        acc *= shape[i].max(1) as isize;
    }
    strides
}

/// Total element count of an array of this `shape`; the empty product
/// (0-D, scalar) is `1`.
pub fn nitems(shape: &[usize]) -> usize
{
    shape.iter().product()
}

/// Whether `strides` are exactly the contiguous row-major strides for
/// `shape` and `itemsize`.
pub fn is_c_contiguous(shape: &[usize], strides: &[isize], itemsize: usize) -> bool
{
    if shape.iter().any(|&d| d == 0) {
        // an empty array is trivially contiguous; there is nothing to
        // address so any strides are compatible.
        return true;
    }
    calc_strides(shape, itemsize) == strides
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn strides_row_major()
    {
        assert_eq!(calc_strides(&[2, 3, 4], 4), vec![48, 16, 4]);
        assert_eq!(calc_strides(&[5], 8), vec![8]);
        assert_eq!(calc_strides(&[], 4), Vec::<isize>::new());
    }

    #[test]
    fn nitems_empty_product_is_one()
    {
        assert_eq!(nitems(&[]), 1);
        assert_eq!(nitems(&[2, 3]), 6);
        assert_eq!(nitems(&[0, 3]), 0);
    }

    #[test]
    fn contiguity_check()
    {
        let shape = [2usize, 3];
        let strides = calc_strides(&shape, 4);
        assert!(is_c_contiguous(&shape, &strides, 4));
        let mut bad = strides.clone();
        bad[0] += 4;
        assert!(!is_c_contiguous(&shape, &bad, 4));
    }
}
