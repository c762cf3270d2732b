use crate::assert_err;
use crate::nn::{ActivationFn, Container, Conv2D, DynamicShape, Graph, GraphError, Padding};
use crate::tensor::Tensor;

fn conv_graph(padding: Padding, strides: (usize, usize)) -> Container {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[3, 3, 1]), Some("x"))
        .unwrap();
    let conv = Conv2D::new(
        &graph,
        1,
        (2, 2),
        strides,
        padding,
        ActivationFn::Linear,
        true,
        Some("conv"),
    )
    .unwrap();
    let y = conv.apply(&x).unwrap();
    let model = Container::from_io(&graph, &[x], &[y], None).unwrap();

    // 全一卷积核 + 零偏置，输出即窗口内元素之和
    model
        .set_weight("conv", "kernel", &Tensor::ones(&[2, 2, 1, 1]))
        .unwrap();
    model
}

#[test]
fn test_conv2d_shape_inference() {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[28, 28, 1]), None)
        .unwrap();

    // 1. same填充保持空间尺寸
    let conv_same = Conv2D::new(
        &graph,
        32,
        (3, 3),
        (1, 1),
        Padding::Same,
        ActivationFn::Relu,
        true,
        None,
    )
    .unwrap();
    let y = conv_same.apply(&x).unwrap();
    assert_eq!(y.shape().to_string(), "[?, 28, 28, 32]");

    // 2. valid填充收缩空间尺寸
    let conv_valid = Conv2D::new(
        &graph,
        8,
        (5, 5),
        (2, 2),
        Padding::Valid,
        ActivationFn::Linear,
        false,
        None,
    )
    .unwrap();
    let z = conv_valid.apply(&x).unwrap();
    // (28 - 5) / 2 + 1 = 12
    assert_eq!(z.shape().to_string(), "[?, 12, 12, 8]");

    // 3. 空间维动态时输出也动态，通道维照常推断
    let dynamic = graph
        .input(&DynamicShape::new(&[None, None, None, Some(1)]), None)
        .unwrap();
    let w = conv_same.apply(&dynamic).unwrap();
    assert_eq!(w.shape().to_string(), "[?, ?, ?, 32]");
}

#[test]
fn test_conv2d_forward_valid() {
    let model = conv_graph(Padding::Valid, (1, 1));

    let input = Tensor::new(
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        &[1, 3, 3, 1],
    );
    let output = model.call(&[input]).unwrap().remove(0);
    // 2x2窗口求和
    assert_eq!(output, Tensor::new(&[12.0, 16.0, 24.0, 28.0], &[1, 2, 2, 1]));
}

#[test]
fn test_conv2d_forward_same_keeps_size() {
    let model = conv_graph(Padding::Same, (1, 1));

    let input = Tensor::new(
        &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        &[1, 3, 3, 1],
    );
    let output = model.call(&[input]).unwrap().remove(0);
    assert_eq!(output.shape(), &[1, 3, 3, 1]);
    // 右下角窗口越界部分按零填充，只剩元素9本身
    assert_eq!(output.data_as_slice()[8], 9.0);
    // 左上角窗口完整，和valid时一致
    assert_eq!(output.data_as_slice()[0], 12.0);
}

#[test]
fn test_conv2d_rejects_non_4d_input() {
    let graph = Graph::new();
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[9]), None)
        .unwrap();
    let conv = Conv2D::new(
        &graph,
        1,
        (2, 2),
        (1, 1),
        Padding::Valid,
        ActivationFn::Linear,
        true,
        None,
    )
    .unwrap();

    assert_err!(
        conv.apply(&x),
        GraphError::DimensionMismatch { expected, got, .. } if *expected == 4 && *got == 2
    );
}

#[test]
fn test_conv2d_rejects_window_larger_than_input() {
    let graph = Graph::new();
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[2, 2, 1]), None)
        .unwrap();
    let conv = Conv2D::new(
        &graph,
        1,
        (3, 3),
        (1, 1),
        Padding::Valid,
        ActivationFn::Linear,
        true,
        None,
    )
    .unwrap();

    assert_err!(
        conv.apply(&x),
        GraphError::InvalidOperation(msg) if msg.contains("窗口")
    );
}
