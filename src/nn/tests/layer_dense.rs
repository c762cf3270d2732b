use crate::assert_err;
use crate::nn::{ActivationFn, Container, Dense, DynamicShape, Graph, GraphError};
use crate::tensor::Tensor;

fn graph_with_input(features: usize) -> (Graph, crate::nn::SymbolicTensor) {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[features]), Some("x"))
        .unwrap();
    (graph, x)
}

#[test]
fn test_dense_symbolic_shape_inference() {
    let (graph, x) = graph_with_input(784);
    let dense = Dense::new(&graph, 128, ActivationFn::Relu, true, None).unwrap();

    let h = dense.apply(&x).unwrap();
    assert_eq!(h.shape().to_string(), "[?, 128]");
    assert_eq!(h.source_layer(), dense.id());
    assert_eq!(h.node_index(), 0);
    assert_eq!(h.tensor_index(), 0);
}

#[test]
fn test_dense_builds_weights_on_first_apply() {
    let (graph, x) = graph_with_input(6);
    let dense = Dense::new(&graph, 4, ActivationFn::Linear, true, Some("fc")).unwrap();

    // 应用前未构建，没有权重可读
    assert_err!(
        graph.inner().get_layer_weight("fc", "kernel"),
        GraphError::InvalidOperation { .. }
    );

    dense.apply(&x).unwrap();
    let kernel = graph.inner().get_layer_weight("fc", "kernel").unwrap();
    let bias = graph.inner().get_layer_weight("fc", "bias").unwrap();
    assert_eq!(kernel.shape(), &[6, 4]);
    assert_eq!(bias.shape(), &[4]);
}

#[test]
fn test_dense_without_bias_has_single_weight() {
    let (graph, x) = graph_with_input(6);
    let dense = Dense::new(&graph, 4, ActivationFn::Linear, false, Some("fc")).unwrap();
    dense.apply(&x).unwrap();

    assert!(graph.inner().get_layer_weight("fc", "kernel").is_ok());
    assert_err!(
        graph.inner().get_layer_weight("fc", "bias"),
        GraphError::InvalidOperation { .. }
    );
}

#[test]
fn test_dense_forward_with_known_weights() {
    let (graph, x) = graph_with_input(2);
    let dense = Dense::new(&graph, 2, ActivationFn::Linear, true, Some("fc")).unwrap();
    let y = dense.apply(&x).unwrap();
    let model = Container::from_io(&graph, &[x], &[y], None).unwrap();

    // y = x @ W + b
    model
        .set_weight("fc", "kernel", &Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]))
        .unwrap();
    model
        .set_weight("fc", "bias", &Tensor::new(&[0.5, -0.5], &[2]))
        .unwrap();

    let output = model
        .call(&[Tensor::new(&[1.0, 1.0], &[1, 2])])
        .unwrap()
        .remove(0);
    // [1, 1] @ [[1, 2], [3, 4]] = [4, 6]，加偏置后为 [4.5, 5.5]
    assert_eq!(output, Tensor::new(&[4.5, 5.5], &[1, 2]));
}

#[test]
fn test_dense_rejects_bad_inputs() {
    // 1. 阶数不足
    let graph = Graph::new();
    let scalar_like = graph
        .input(&DynamicShape::new(&[None]), Some("x1"))
        .unwrap();
    let dense = Dense::new(&graph, 4, ActivationFn::Linear, true, None).unwrap();
    assert_err!(
        dense.apply(&scalar_like),
        GraphError::DimensionMismatch { expected, got, .. } if *expected == 2 && *got == 1
    );

    // 2. 最后一维动态，无法确定权重形状
    let dynamic_features = graph
        .input(&DynamicShape::new(&[None, None]), Some("x2"))
        .unwrap();
    assert_err!(
        dense.apply(&dynamic_features),
        GraphError::InvalidOperation(msg) if msg.contains("最后一维")
    );
}

#[test]
fn test_shared_dense_locks_input_features() {
    // 共享层第二次应用时，输入最后一维必须与已构建的权重一致
    let graph = Graph::new_with_seed(0);
    let x6 = graph
        .input(&DynamicShape::with_dynamic_batch(&[6]), Some("x6"))
        .unwrap();
    let x8 = graph
        .input(&DynamicShape::with_dynamic_batch(&[8]), Some("x8"))
        .unwrap();
    let dense = Dense::new(&graph, 4, ActivationFn::Linear, true, None).unwrap();

    let h1 = dense.apply(&x6).unwrap();
    assert_eq!(h1.node_index(), 0);

    // 同特征数的再次应用可以
    let h2 = dense.apply(&x6).unwrap();
    assert_eq!(h2.node_index(), 1);

    // 不同特征数被InputSpec拦下
    assert_err!(
        dense.apply(&x8),
        GraphError::ShapeMismatch { expected, got, .. } if expected == "6" && got == "8"
    );
}
