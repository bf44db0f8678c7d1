/// The logistic activation used by every layer.
pub struct Sigmoid;

impl Sigmoid {
    /// `1 / (1 + e^-x)`, in (0, 1) for moderate finite `x`.
    ///
    /// In f64 the result saturates: it rounds to exactly `1.0` once `x`
    /// exceeds about 37, and underflows to `0.0` below about -745.
    pub fn function(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    /// `σ(x)(1 - σ(x))`, evaluated at the pre-activation `x`.
    pub fn derivative(x: f64) -> f64 {
        let fx = Sigmoid::function(x);
        fx * (1.0 - fx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_is_one_half_at_zero() {
        assert_eq!(Sigmoid::function(0.0), 0.5);
        assert_eq!(Sigmoid::derivative(0.0), 0.25);
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for &x in &[0.3, 1.0, 4.5, 12.0] {
            assert_relative_eq!(Sigmoid::function(-x), 1.0 - Sigmoid::function(x), epsilon = 1e-12);
        }
    }

    #[test]
    fn sigmoid_saturates_in_f64() {
        assert!(Sigmoid::function(30.0) < 1.0);
        assert_eq!(Sigmoid::function(40.0), 1.0);
        assert_eq!(Sigmoid::function(-800.0), 0.0);
        assert!(Sigmoid::function(-700.0) > 0.0);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let h = 1e-6;
        for &x in &[-3.0, -0.5, 0.0, 0.7, 2.0] {
            let numeric = (Sigmoid::function(x + h) - Sigmoid::function(x - h)) / (2.0 * h);
            assert_relative_eq!(Sigmoid::derivative(x), numeric, epsilon = 1e-8);
        }
    }
}
