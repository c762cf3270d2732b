use crate::nn::{Container, DynamicShape, Graph, MaxPool2D, Padding};
use crate::tensor::Tensor;

#[test]
fn test_max_pool2d_shape_inference() {
    let graph = Graph::new();
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[28, 28, 32]), None)
        .unwrap();

    // 1. 典型的2x2池化减半
    let pool = MaxPool2D::new(&graph, (2, 2), (2, 2), Padding::Valid, None).unwrap();
    let y = pool.apply(&x).unwrap();
    assert_eq!(y.shape().to_string(), "[?, 14, 14, 32]");

    // 2. same填充向上取整
    let odd = graph
        .input(&DynamicShape::with_dynamic_batch(&[7, 7, 8]), None)
        .unwrap();
    let pool_same = MaxPool2D::new(&graph, (2, 2), (2, 2), Padding::Same, None).unwrap();
    let z = pool_same.apply(&odd).unwrap();
    assert_eq!(z.shape().to_string(), "[?, 4, 4, 8]");
}

#[test]
fn test_max_pool2d_forward() {
    let graph = Graph::new();
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[4, 4, 1]), None)
        .unwrap();
    let pool = MaxPool2D::new(&graph, (2, 2), (2, 2), Padding::Valid, None).unwrap();
    let y = pool.apply(&x).unwrap();
    let model = Container::from_io(&graph, &[x], &[y], None).unwrap();

    let data = (1..=16).map(|v| v as f32).collect::<Vec<_>>();
    let output = model
        .call(&[Tensor::new(&data, &[1, 4, 4, 1])])
        .unwrap()
        .remove(0);
    // 每个2x2窗口的最大值在右下角
    assert_eq!(output, Tensor::new(&[6.0, 8.0, 14.0, 16.0], &[1, 2, 2, 1]));
}

#[test]
fn test_max_pool2d_forward_with_negatives() {
    // 全负输入下也取最大值（而不是被0污染）
    let graph = Graph::new();
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[2, 2, 1]), None)
        .unwrap();
    let pool = MaxPool2D::new(&graph, (2, 2), (2, 2), Padding::Valid, None).unwrap();
    let y = pool.apply(&x).unwrap();
    let model = Container::from_io(&graph, &[x], &[y], None).unwrap();

    let output = model
        .call(&[Tensor::new(&[-4.0, -3.0, -2.0, -1.0], &[1, 2, 2, 1])])
        .unwrap()
        .remove(0);
    assert_eq!(output, Tensor::new(&[-1.0], &[1, 1, 1, 1]));
}
