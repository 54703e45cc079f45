use crate::LumaMatrix;

const SOBEL_X: [[f32; 3]; 3] = [[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

/// Sobel gradient magnitude at `(cx, cy)`; pixels outside the matrix read as 0.
#[inline]
pub fn sobel_at(mat: &LumaMatrix, cx: usize, cy: usize) -> f32 {
    let mut sx = 0.0;
    let mut sy = 0.0;
    for dy in 0..3 {
        for dx in 0..3 {
            let x = cx as i64 + dx as i64 - 1;
            let y = cy as i64 + dy as i64 - 1;
            let c = mat.at_or_zero(x, y);
            sx += c * SOBEL_X[dy][dx];
            sy += c * SOBEL_Y[dy][dx];
        }
    }
    (sx * sx + sy * sy).sqrt()
}

/// Sobel gradient magnitude of a whole matrix, same dimensions as the input.
pub fn sobel_magnitude(mat: &LumaMatrix) -> LumaMatrix {
    let mut grad = LumaMatrix::zeros(mat.width, mat.height);
    for cy in 0..mat.height {
        for cx in 0..mat.width {
            *grad.at_mut(cy, cx) = sobel_at(mat, cx, cy);
        }
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn flat_interior_has_no_gradient() {
        let mat = LumaMatrix::filled(5, 5, 0.7);
        let grad = sobel_magnitude(&mat);
        assert_eq!((grad.width, grad.height), (5, 5));
        assert_relative_eq!(grad.at(2, 2), 0.0, epsilon = 1e-6);
        // zero padding makes the border light up
        assert!(grad.at(0, 0) > 0.0);
    }

    #[test]
    fn vertical_edge_responds_in_x() {
        let mut mat = LumaMatrix::zeros(6, 3);
        for y in 0..3 {
            for x in 3..6 {
                *mat.at_mut(y, x) = 1.0;
            }
        }
        // Column 2 sees [0, 0, 1] on each row of the kernel: |gx| = 4.
        assert_relative_eq!(sobel_at(&mat, 2, 1), 4.0, epsilon = 1e-6);
        assert_relative_eq!(sobel_at(&mat, 0, 1), 0.0, epsilon = 1e-6);
    }
}
