use crate::assert_err;
use crate::nn::{
    ActivationFn, Add, Container, Dense, DynamicShape, Graph, GraphError,
};
use crate::tensor::Tensor;

/// 两层MLP，权重设为已知值：y = relu(x @ W1 + b1) @ W2
fn known_mlp() -> Container {
    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[2]), Some("x"))
        .unwrap();
    let fc1 = Dense::new(&graph, 2, ActivationFn::Relu, true, Some("fc1")).unwrap();
    let fc2 = Dense::new(&graph, 1, ActivationFn::Linear, false, Some("fc2")).unwrap();
    let y = fc2.apply(&fc1.apply(&x).unwrap()).unwrap();
    let model = Container::from_io(&graph, &[x], &[y], Some("mlp")).unwrap();

    model
        .set_weight("fc1", "kernel", &Tensor::new(&[1.0, -1.0, 1.0, -1.0], &[2, 2]))
        .unwrap();
    model
        .set_weight("fc1", "bias", &Tensor::new(&[0.0, 0.0], &[2]))
        .unwrap();
    model
        .set_weight("fc2", "kernel", &Tensor::new(&[1.0, 1.0], &[2, 1]))
        .unwrap();
    model
}

#[test]
fn test_mlp_forward() {
    let model = known_mlp();

    // x=[1,2]: x@W1 = [3, -3] → relu → [3, 0] → @W2 → [3]
    let output = model
        .call(&[Tensor::new(&[1.0, 2.0], &[1, 2])])
        .unwrap()
        .remove(0);
    assert_eq!(output, Tensor::new(&[3.0], &[1, 1]));

    // batch维自由变化
    let batch_out = model
        .call(&[Tensor::new(&[1.0, 2.0, -1.0, -2.0], &[2, 2])])
        .unwrap()
        .remove(0);
    assert_eq!(batch_out, Tensor::new(&[3.0, 3.0], &[2, 1]));
}

#[test]
fn test_call_validates_input_count_and_shape() {
    let model = known_mlp();

    // 1. 输入路数不对
    assert_err!(
        model.call(&[]),
        GraphError::InvalidOperation(msg) if msg.contains("期望1路输入")
    );

    // 2. 输入形状不满足声明
    assert_err!(
        model.call(&[Tensor::new(&[1.0, 2.0, 3.0], &[1, 3])]),
        GraphError::ShapeMismatch { expected, got, .. } if expected == "[?, 2]" && got == "[1, 3]"
    );
}

#[test]
fn test_multi_input_forward_order() {
    // 两路输入按声明顺序馈送
    let graph = Graph::new_with_seed(0);
    let a = graph
        .input(&DynamicShape::with_dynamic_batch(&[2]), Some("a"))
        .unwrap();
    let b = graph
        .input(&DynamicShape::with_dynamic_batch(&[2]), Some("b"))
        .unwrap();
    let add = Add::new(&graph, None).unwrap();
    let y = add.apply(&[&a, &b]).unwrap();
    let model = Container::from_io(&graph, &[a, b], &[y], None).unwrap();

    let output = model
        .call(&[
            Tensor::new(&[1.0, 2.0], &[1, 2]),
            Tensor::new(&[10.0, 20.0], &[1, 2]),
        ])
        .unwrap()
        .remove(0);
    assert_eq!(output, Tensor::new(&[11.0, 22.0], &[1, 2]));
}

#[test]
fn test_shared_layer_uses_same_weights_for_both_branches() {
    let graph = Graph::new_with_seed(0);
    let x1 = graph
        .input(&DynamicShape::with_dynamic_batch(&[2]), Some("x1"))
        .unwrap();
    let x2 = graph
        .input(&DynamicShape::with_dynamic_batch(&[2]), Some("x2"))
        .unwrap();
    let encoder = Dense::new(&graph, 2, ActivationFn::Linear, false, Some("enc")).unwrap();
    let h1 = encoder.apply(&x1).unwrap();
    let h2 = encoder.apply(&x2).unwrap();
    let model = Container::from_io(&graph, &[x1, x2], &[h1, h2], None).unwrap();

    // 两路输入相同时，共享权重下的两路输出必然一致
    let same = Tensor::new(&[0.3, -0.7], &[1, 2]);
    let outputs = model.call(&[same.clone(), same]).unwrap();
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_call_and_compute_output_shape_agree() {
    let model = known_mlp();

    let concrete = model
        .call(&[Tensor::new(&[1.0, 2.0], &[1, 2])])
        .unwrap()
        .remove(0);
    let inferred = model
        .compute_output_shape(&[DynamicShape::fixed(&[1, 2])])
        .unwrap()
        .remove(0);
    assert!(inferred.matches_tensor(concrete.shape()));
}
