use crate::assert_err;
use crate::nn::{
    ActivationFn, Concatenate, Container, Dense, DynamicShape, Graph, GraphDescriptor, GraphError,
    LayerDescriptor, LayerTypeDescriptor, TensorSlotDescriptor,
};
use crate::tensor::Tensor;

fn siamese_model() -> Container {
    let graph = Graph::new_with_seed(3);
    let x1 = graph
        .input(&DynamicShape::with_dynamic_batch(&[4]), Some("x1"))
        .unwrap();
    let x2 = graph
        .input(&DynamicShape::with_dynamic_batch(&[4]), Some("x2"))
        .unwrap();
    let encoder = Dense::new(&graph, 3, ActivationFn::Tanh, true, Some("encoder")).unwrap();
    let concat = Concatenate::new(&graph, -1, Some("concat")).unwrap();
    let head = Dense::new(&graph, 1, ActivationFn::Sigmoid, true, Some("head")).unwrap();

    let h1 = encoder.apply(&x1).unwrap();
    let h2 = encoder.apply(&x2).unwrap();
    let merged = concat.apply(&[&h1, &h2]).unwrap();
    let y = head.apply(&merged).unwrap();
    Container::from_io(&graph, &[x1, x2], &[y], Some("siamese")).unwrap()
}

#[test]
fn test_describe_roundtrip_is_fixed_point() {
    let model = siamese_model();
    let descriptor = model.describe().unwrap();

    // JSON往返
    let json = descriptor.to_json().unwrap();
    let parsed = GraphDescriptor::from_json(&json).unwrap();
    assert_eq!(parsed.name, "siamese");
    assert_eq!(parsed.layers.len(), descriptor.layers.len());

    // 重建后的描述符应与原描述符完全一致（拓扑不动点）
    let rebuilt = Container::from_descriptor(&descriptor).unwrap();
    let descriptor2 = rebuilt.describe().unwrap();
    assert_eq!(descriptor.to_json().unwrap(), descriptor2.to_json().unwrap());
}

#[test]
fn test_describe_records_shared_layer_applications() {
    let model = siamese_model();
    let descriptor = model.describe().unwrap();

    let encoder = descriptor
        .layers
        .iter()
        .find(|l| l.name == "encoder")
        .unwrap();
    // 共享层有两次应用
    assert_eq!(encoder.inbound_nodes.len(), 2);
    assert_eq!(
        encoder.inbound_nodes[0],
        vec![TensorSlotDescriptor {
            layer: "x1".to_string(),
            node_index: 0,
            tensor_index: 0,
        }]
    );
    // concat引用encoder的两次应用
    let concat = descriptor
        .layers
        .iter()
        .find(|l| l.name == "concat")
        .unwrap();
    assert_eq!(
        concat.inbound_nodes[0]
            .iter()
            .map(|s| (s.layer.as_str(), s.node_index))
            .collect::<Vec<_>>(),
        vec![("encoder", 0), ("encoder", 1)]
    );
}

#[test]
fn test_model_save_and_load_preserve_predictions() {
    let model = siamese_model();
    let input_1 = Tensor::new(&[0.1, -0.2, 0.3, -0.4], &[1, 4]);
    let input_2 = Tensor::new(&[0.5, 0.6, -0.7, 0.8], &[1, 4]);
    let before = model
        .call(&[input_1.clone(), input_2.clone()])
        .unwrap()
        .remove(0);

    let path = std::env::temp_dir().join(format!("only_keras_test_{}", std::process::id()));
    model.save_model(&path).unwrap();

    let reloaded = Container::load_model(&path).unwrap();
    let after = reloaded.call(&[input_1, input_2]).unwrap().remove(0);
    assert_eq!(before, after);

    let _ = std::fs::remove_file(path.with_extension("json"));
    let _ = std::fs::remove_file(path.with_extension("bin"));
}

#[test]
fn test_load_weights_rejects_shape_mismatch() {
    // 保存3单元encoder的权重，往4单元的同名层里加载
    let model = siamese_model();
    let path = std::env::temp_dir().join(format!(
        "only_keras_test_mismatch_{}",
        std::process::id()
    ));
    model.save_weights(&path).unwrap();

    let graph = Graph::new_with_seed(0);
    let x = graph
        .input(&DynamicShape::with_dynamic_batch(&[4]), Some("x"))
        .unwrap();
    let other = Dense::new(&graph, 4, ActivationFn::Linear, true, Some("encoder")).unwrap();
    let y = other.apply(&x).unwrap();
    let incompatible = Container::from_io(&graph, &[x], &[y], None).unwrap();

    assert_err!(
        incompatible.load_weights(&path),
        GraphError::ShapeMismatch { .. }
    );
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_from_descriptor_rejects_unresolvable_topology() {
    // 手工构造一个自引用（环）的描述符
    let mut descriptor = GraphDescriptor::new("broken");
    descriptor.add_layer(LayerDescriptor {
        name: "x".to_string(),
        layer_type: LayerTypeDescriptor::Input {
            shape: vec![None, Some(4)],
            dtype: crate::nn::DType::Float32,
        },
        inbound_nodes: vec![],
        param_count: None,
    });
    descriptor.add_layer(LayerDescriptor {
        name: "a".to_string(),
        layer_type: LayerTypeDescriptor::Activation {
            activation: ActivationFn::Relu,
        },
        // a的输入是它自己的输出
        inbound_nodes: vec![vec![TensorSlotDescriptor {
            layer: "a".to_string(),
            node_index: 0,
            tensor_index: 0,
        }]],
        param_count: None,
    });
    descriptor.input_layers = vec![TensorSlotDescriptor {
        layer: "x".to_string(),
        node_index: 0,
        tensor_index: 0,
    }];
    descriptor.output_layers = vec![TensorSlotDescriptor {
        layer: "a".to_string(),
        node_index: 0,
        tensor_index: 0,
    }];

    assert_err!(
        Container::from_descriptor(&descriptor),
        GraphError::InvalidOperation(msg) if msg.contains("无法解析")
    );
}

#[test]
fn test_from_descriptor_rejects_duplicate_layer_names() {
    let mut descriptor = GraphDescriptor::new("dup");
    for _ in 0..2 {
        descriptor.add_layer(LayerDescriptor {
            name: "x".to_string(),
            layer_type: LayerTypeDescriptor::Input {
                shape: vec![None, Some(4)],
                dtype: crate::nn::DType::Float32,
            },
            inbound_nodes: vec![],
            param_count: None,
        });
    }

    assert_err!(
        Container::from_descriptor(&descriptor),
        GraphError::DuplicateLayerName { .. }
    );
}
