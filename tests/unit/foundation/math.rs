use super::*;

#[test]
fn mul_div255_endpoints() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(0, 255), 0);
    assert_eq!(mul_div255_u8(255, 0), 0);
    assert_eq!(mul_div255_u8(128, 255), 128);
}

#[test]
fn premultiply_zero_alpha_clears_colour() {
    let mut px = vec![200, 100, 50, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0]);
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_half() {
    let mut px = vec![10, 20, 30, 255, 200, 100, 50, 128];
    let original = px.clone();
    premultiply_rgba8_in_place(&mut px);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &original[0..4]);
    for (a, b) in px[4..7].iter().zip(&original[4..7]) {
        assert!((i16::from(*a) - i16::from(*b)).abs() <= 1);
    }
    assert_eq!(px[7], 128);
}
