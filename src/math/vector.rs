/// Index of the maximum element in a slice.
///
/// The first maximal index wins ties, and NaN entries never win. Returns
/// `None` for an empty slice.
pub fn argmax(v: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &x) in v.iter().enumerate() {
        let better = match best {
            None => !x.is_nan(),
            Some((_, b)) => x > b,
        };
        if better {
            best = Some((i, x));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_maximum() {
        assert_eq!(argmax(&[0.1, 0.9, 0.3]), Some(1));
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.7, 0.7]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5, 0.5, 0.5]), Some(0));
    }

    #[test]
    fn empty_slice_has_no_argmax() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn nan_is_skipped() {
        assert_eq!(argmax(&[f64::NAN, 0.2, 0.1]), Some(1));
    }
}
