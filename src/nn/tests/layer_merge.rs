use crate::assert_err;
use crate::nn::{Add, Concatenate, Container, DynamicShape, Graph, GraphError};
use crate::tensor::Tensor;

#[test]
fn test_add_merges_compatible_shapes() {
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::new(&[None, Some(4)]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::new(&[Some(2), None]), Some("b"))
        .unwrap();
    let add = Add::new(&graph, None).unwrap();

    // 动态维度被另一方细化
    let y = add.apply(&[&a, &b]).unwrap();
    assert_eq!(y.shape().to_string(), "[2, 4]");
}

#[test]
fn test_add_forward() {
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("b"))
        .unwrap();
    let c = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("c"))
        .unwrap();
    let add = Add::new(&graph, None).unwrap();
    let y = add.apply(&[&a, &b, &c]).unwrap();
    let model = Container::from_io(&graph, &[a, b, c], &[y], None).unwrap();

    let output = model
        .call(&[
            Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]),
            Tensor::new(&[10.0, 20.0, 30.0], &[1, 3]),
            Tensor::new(&[100.0, 200.0, 300.0], &[1, 3]),
        ])
        .unwrap()
        .remove(0);
    assert_eq!(output, Tensor::new(&[111.0, 222.0, 333.0], &[1, 3]));
}

#[test]
fn test_add_rejects_bad_inputs() {
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::with_dynamic_batch(&[4]), Some("b"))
        .unwrap();
    let add = Add::new(&graph, None).unwrap();

    // 1. 少于2个输入
    assert_err!(
        add.apply(&[&a]),
        GraphError::InvalidOperation(msg) if msg.contains("至少需要2个输入")
    );

    // 2. 形状不一致
    assert_err!(
        add.apply(&[&a, &b]),
        GraphError::InvalidOperation(msg) if msg.contains("形状不一致")
    );
}

#[test]
fn test_concatenate_along_last_axis() {
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::with_dynamic_batch(&[5]), Some("b"))
        .unwrap();
    let concat = Concatenate::new(&graph, -1, None).unwrap();

    let y = concat.apply(&[&a, &b]).unwrap();
    assert_eq!(y.shape().to_string(), "[?, 8]");

    let model = Container::from_io(&graph, &[a, b], &[y], None).unwrap();
    let output = model
        .call(&[
            Tensor::new(&[1.0, 2.0, 3.0], &[1, 3]),
            Tensor::new(&[4.0, 5.0, 6.0, 7.0, 8.0], &[1, 5]),
        ])
        .unwrap()
        .remove(0);
    assert_eq!(
        output,
        Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[1, 8])
    );
}

#[test]
fn test_concatenate_with_dynamic_concat_dim() {
    // 拼接轴上有动态维度时，输出在该轴也是动态的
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::new(&[None, None]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::new(&[None, Some(5)]), Some("b"))
        .unwrap();
    let concat = Concatenate::new(&graph, 1, None).unwrap();

    let y = concat.apply(&[&a, &b]).unwrap();
    assert_eq!(y.shape().to_string(), "[?, ?]");
}

#[test]
fn test_concatenate_rejects_bad_axis_and_shapes() {
    let graph = Graph::new();
    let a = graph
        .input(&DynamicShape::with_dynamic_batch(&[3]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::with_dynamic_batch(&[3, 2]), Some("b"))
        .unwrap();

    // 1. 轴越界
    let concat_bad_axis = Concatenate::new(&graph, 5, None).unwrap();
    assert_err!(
        concat_bad_axis.apply(&[&a, &a.clone()]),
        GraphError::InvalidOperation(msg) if msg.contains("超出")
    );

    // 2. 阶数不一致
    let concat = Concatenate::new(&graph, -1, None).unwrap();
    assert_err!(
        concat.apply(&[&a, &b]),
        GraphError::DimensionMismatch { .. }
    );
}
