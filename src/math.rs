use ndarray::ArrayView1;

/// Returns `max(0, r)^2`, the squared hinge of an inequality residual.
pub fn squared_relu(r: f64) -> f64 {
    r.max(0.0).powi(2)
}

/// Derivative of [`squared_relu`] with respect to `r`.
pub fn squared_relu_grad(r: f64) -> f64 {
    if r > 0.0 {
        2.0 * r
    } else {
        0.0
    }
}

/// Returns the 2-norm (Euclidean) of `a`.
pub fn norm(a: ArrayView1<f64>) -> f64 {
    a.dot(&a).sqrt()
}

/// Computes the infinity norm: `max(abs(a))`, zero for an empty vector.
pub fn norm_inf(a: ArrayView1<f64>) -> f64 {
    a.iter().fold(0.0, |max, v| v.abs().max(max))
}

/// True when every element of `a` is neither NaN nor infinite.
pub fn all_finite(a: ArrayView1<f64>) -> bool {
    a.iter().all(|v| v.is_finite())
}
