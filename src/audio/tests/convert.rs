use crate::audio::convert::*;

#[test]
fn test_full_scale() {
    assert_eq!(f32_to_i16(1.0), 32767);
    assert_eq!(f32_to_i16(-1.0), -32767);
    assert_eq!(f32_to_i16(0.0), 0);
}

#[test]
fn test_out_of_range_clamped() {
    assert_eq!(f32_to_i16(1.5), 32767);
    assert_eq!(f32_to_i16(-7.0), -32767);
}

#[test]
fn test_truncates_toward_zero() {
    // 0.5 * 32767 = 16383.5
    assert_eq!(f32_to_i16(0.5), 16383);
    assert_eq!(f32_to_i16(-0.5), -16383);
}

#[test]
fn test_decode_divides_by_full_scale() {
    assert!((i16_to_f32(32767) - 1.0).abs() < f32::EPSILON);
    assert!((i16_to_f32(-32767) + 1.0).abs() < f32::EPSILON);
    // i16::MIN decodes slightly below -1
    assert!(i16_to_f32(i16::MIN) < -1.0);
}

#[test]
fn test_big_endian_bytes() {
    let mut out = Vec::new();
    put_samples_be(&mut out, &[0x0102, -2]);

    assert_eq!(out, vec![0x01, 0x02, 0xFF, 0xFE]);
}

#[test]
fn test_from_be_bytes() {
    let samples = from_be_bytes(&[0x7F, 0xFF, 0x00, 0x00, 0x80, 0x01]);

    assert_eq!(samples, vec![1.0, 0.0, -1.0]);
}

#[test]
fn test_run_conversion() {
    assert_eq!(to_i16(&[0.0, 1.0, -1.0]), vec![0, 32767, -32767]);
}
