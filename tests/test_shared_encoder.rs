/*
 * @Author       : 老董
 * @Date         : 2026-02-08
 * @Description  : 共享层（孪生网络）集成测试：
 *                 同一个encoder作用于两路输入，产生两个节点；
 *                 验证节点序号、权重共享、多输入执行与序列化重建。
 */

use only_keras::nn::{
    ActivationFn, Concatenate, Container, Dense, DynamicShape, Graph,
};
use only_keras::tensor::Tensor;

fn build_siamese(seed: u64) -> Container {
    let graph = Graph::new_with_seed(seed);
    let left = graph
        .input(&DynamicShape::with_dynamic_batch(&[32]), Some("left"))
        .unwrap();
    let right = graph
        .input(&DynamicShape::with_dynamic_batch(&[32]), Some("right"))
        .unwrap();

    let encoder = Dense::new(&graph, 16, ActivationFn::Tanh, true, Some("encoder")).unwrap();
    let embed_left = encoder.apply(&left).unwrap();
    let embed_right = encoder.apply(&right).unwrap();

    let merged = Concatenate::new(&graph, -1, Some("merge"))
        .unwrap()
        .apply(&[&embed_left, &embed_right])
        .unwrap();
    let score = Dense::new(&graph, 1, ActivationFn::Sigmoid, true, Some("score"))
        .unwrap()
        .apply(&merged)
        .unwrap();

    Container::from_io(&graph, &[left, right], &[score], Some("siamese")).unwrap()
}

#[test]
fn test_shared_encoder_topology() {
    let model = build_siamese(11);

    // 共享层只出现一次，容器共5层：两路输入 + encoder + merge + score
    let names = model.layer_names().unwrap();
    assert_eq!(names, vec!["left", "right", "encoder", "merge", "score"]);

    // 参数只有一份encoder
    let expected = (32 * 16 + 16) + (32 * 1 + 1);
    assert_eq!(model.param_count().unwrap(), expected);
}

#[test]
fn test_shared_encoder_embeds_identical_inputs_identically() {
    // 把两路embedding直接作为容器输出，检验权重确实只有一份
    let graph = Graph::new_with_seed(5);
    let left = graph
        .input(&DynamicShape::with_dynamic_batch(&[32]), Some("left"))
        .unwrap();
    let right = graph
        .input(&DynamicShape::with_dynamic_batch(&[32]), Some("right"))
        .unwrap();
    let encoder = Dense::new(&graph, 16, ActivationFn::Tanh, true, Some("encoder")).unwrap();
    let embed_left = encoder.apply(&left).unwrap();
    let embed_right = encoder.apply(&right).unwrap();
    let model = Container::from_io(&graph, &[left, right], &[embed_left, embed_right], None)
        .unwrap();

    let same = Tensor::new_random(-1.0, 1.0, &[4, 32]);
    let outputs = model.call(&[same.clone(), same]).unwrap();
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_shared_encoder_weight_update_affects_both_branches() {
    let model = build_siamese(11);
    let left = Tensor::new_random(-1.0, 1.0, &[1, 32]);
    let right = Tensor::new_random(-1.0, 1.0, &[1, 32]);

    let before = model
        .call(&[left.clone(), right.clone()])
        .unwrap()
        .remove(0);

    // 覆写共享encoder的权重后，两路分支都会变化
    model
        .set_weight("encoder", "kernel", &Tensor::zeros(&[32, 16]))
        .unwrap();
    let after = model.call(&[left, right]).unwrap().remove(0);
    assert_ne!(before, after);
}

#[test]
fn test_shared_encoder_descriptor_rebuild() {
    let model = build_siamese(11);
    let left = Tensor::new_random(-1.0, 1.0, &[2, 32]);
    let right = Tensor::new_random(-1.0, 1.0, &[2, 32]);
    let before = model
        .call(&[left.clone(), right.clone()])
        .unwrap()
        .remove(0);

    // 描述符重建保留共享结构（encoder两次应用），权重经由文件恢复
    let path = std::env::temp_dir().join(format!("only_keras_siamese_{}", std::process::id()));
    model.save_model(&path).unwrap();
    let reloaded = Container::load_model(&path).unwrap();

    assert_eq!(
        reloaded.layer_names().unwrap(),
        vec!["left", "right", "encoder", "merge", "score"]
    );
    let after = reloaded.call(&[left, right]).unwrap().remove(0);
    assert_eq!(before, after);

    let _ = std::fs::remove_file(path.with_extension("json"));
    let _ = std::fs::remove_file(path.with_extension("bin"));
}
