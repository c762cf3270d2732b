use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_map() {
    let tensor = Tensor::new(&[-1.0, 0.0, 2.0], &[3]);
    let relu = tensor.map(|x| x.max(0.0));
    assert_eq!(relu, Tensor::new(&[0.0, 0.0, 2.0], &[3]));
}

#[test]
fn test_sum() {
    let tensor = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    assert_eq!(tensor.sum(), 10.0);
}

#[test]
fn test_softmax_last_axis() {
    let tensor = Tensor::new(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0], &[2, 3]);
    let result = tensor.softmax_last_axis();

    assert_eq!(result.shape(), &[2, 3]);
    let data = result.data_as_slice();
    // 每行归一化后之和应为1
    assert_abs_diff_eq!(data[0] + data[1] + data[2], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(data[3] + data[4] + data[5], 1.0, epsilon = 1e-6);
    // 两行输入一致，输出也应一致
    assert_abs_diff_eq!(data[0], data[3], epsilon = 1e-6);
    // 单调性：logit越大概率越大
    assert!(data[0] < data[1] && data[1] < data[2]);
}

#[test]
fn test_softmax_is_stable_for_large_logits() {
    // 大数值下不应出现NaN/inf
    let tensor = Tensor::new(&[1000.0, 1001.0], &[1, 2]);
    let result = tensor.softmax_last_axis();
    for &x in result.data_as_slice() {
        assert!(x.is_finite());
    }
}
