use crate::nn::DynamicShape;

#[test]
fn test_dynamic_shape_creation() {
    // 1. 固定形状
    let fixed = DynamicShape::fixed(&[32, 128]);
    assert_eq!(fixed.ndim(), 2);
    assert!(!fixed.has_dynamic_dims());
    assert_eq!(fixed.to_string(), "[32, 128]");

    // 2. 动态batch
    let dynamic = DynamicShape::with_dynamic_batch(&[28, 28]);
    assert_eq!(dynamic.ndim(), 3);
    assert!(dynamic.is_dynamic(0));
    assert!(!dynamic.is_dynamic(1));
    assert_eq!(dynamic.to_string(), "[?, 28, 28]");

    // 3. 完全自定义
    let custom = DynamicShape::new(&[None, Some(10), None]);
    assert_eq!(custom.dim(1), Some(10));
    assert_eq!(custom.dim(0), None);
    assert_eq!(custom.to_string(), "[?, 10, ?]");
}

#[test]
fn test_dynamic_shape_compatibility() {
    let declared = DynamicShape::with_dynamic_batch(&[784]);

    // 1. 动态维度匹配任何值
    assert!(declared.is_compatible_with(&DynamicShape::fixed(&[32, 784])));
    assert!(declared.is_compatible_with(&DynamicShape::new(&[None, Some(784)])));

    // 2. 固定维度必须相等
    assert!(!declared.is_compatible_with(&DynamicShape::fixed(&[32, 100])));

    // 3. 阶数必须一致
    assert!(!declared.is_compatible_with(&DynamicShape::fixed(&[784])));
}

#[test]
fn test_dynamic_shape_matches_tensor() {
    let declared = DynamicShape::with_dynamic_batch(&[28, 28]);

    assert!(declared.matches_tensor(&[1, 28, 28]));
    assert!(declared.matches_tensor(&[256, 28, 28]));
    assert!(!declared.matches_tensor(&[1, 28, 27]));
    assert!(!declared.matches_tensor(&[28, 28]));
}

#[test]
fn test_dynamic_shape_merge() {
    let a = DynamicShape::new(&[None, Some(16)]);
    let b = DynamicShape::new(&[Some(8), None]);

    // 1. 互补的动态维度被细化
    let merged = a.merge(&b).unwrap();
    assert_eq!(merged, DynamicShape::fixed(&[8, 16]));

    // 2. 冲突时合并失败
    let c = DynamicShape::new(&[Some(8), Some(32)]);
    assert!(a.merge(&c).is_none());
}
