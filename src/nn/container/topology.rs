/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Container 的拓扑构建：从输出回溯、环检测、深度指派、
 *                 确定性排序与连通性校验。
 */

use super::Container;
use crate::nn::graph::{Graph, GraphError, GraphInner};
use crate::nn::layer::{LayerId, LayerKind};
use crate::nn::node::NodeId;
use crate::nn::symbolic::{SymbolicTensor, TensorId};
use std::collections::{BTreeMap, HashMap, HashSet};

pub(super) fn build(
    graph: &Graph,
    inputs: &[SymbolicTensor],
    outputs: &[SymbolicTensor],
    name: Option<&str>,
) -> Result<Container, GraphError> {
    if inputs.is_empty() {
        return Err(GraphError::InvalidOperation(
            "Container至少需要1路输入".to_string(),
        ));
    }
    if outputs.is_empty() {
        return Err(GraphError::InvalidOperation(
            "Container至少需要1路输出".to_string(),
        ));
    }
    check_no_duplicates(inputs, "输入")?;
    check_no_duplicates(outputs, "输出")?;

    let inner = graph.inner();

    // 输入必须来自Input层的源节点
    for tensor in inputs {
        let node_id = inner.validate_tensor_origin(tensor)?;
        let node = inner.get_node(node_id)?;
        let layer = inner.get_layer(tensor.source_layer())?;
        let is_input_layer = matches!(layer.kind(), LayerKind::Input(_));
        if !is_input_layer || !node.is_origin() {
            return Err(GraphError::InvalidOperation(format!(
                "Container的输入张量{}必须来自Input层",
                tensor.name()
            )));
        }
    }

    // 从每路输出回溯，收集节点（后序入列：深度大的在前），途中检测环
    let mut finished: Vec<NodeId> = Vec::new();
    let mut done: HashSet<NodeId> = HashSet::new();
    let mut in_progress: HashSet<NodeId> = HashSet::new();
    for tensor in outputs {
        build_map(&inner, tensor, &mut finished, &mut done, &mut in_progress)?;
    }

    // 深度指派：输出节点深度0；每个上游节点深度 = max(既有值, 下游深度+1)。
    // 沿finished逆序（即消费者在前）扫一遍即可收敛。
    let mut node_depths: HashMap<NodeId, usize> = HashMap::new();
    for &node_id in finished.iter().rev() {
        let depth = *node_depths.entry(node_id).or_insert(0);
        let node = inner.get_node(node_id)?;
        for inbound in node.inbound() {
            let prev_id = inner.node_of(inbound.layer, inbound.node_index)?.id();
            let prev_depth = node_depths.entry(prev_id).or_insert(0);
            *prev_depth = (*prev_depth).max(depth + 1);
        }
    }

    // 层深度 = 其（容器内）各节点深度的最大值
    let mut layer_depths: HashMap<LayerId, usize> = HashMap::new();
    for (&node_id, &depth) in &node_depths {
        let layer_id = inner.get_node(node_id)?.outbound_layer();
        let layer_depth = layer_depths.entry(layer_id).or_insert(depth);
        *layer_depth = (*layer_depth).max(depth);
    }

    // 按深度分组；深度降序，同深度按id升序，保证确定性
    let mut nodes_grouped: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    for (&node_id, &depth) in &node_depths {
        nodes_grouped.entry(depth).or_default().push(node_id);
    }
    let nodes_by_depth = nodes_grouped
        .into_iter()
        .rev()
        .map(|(depth, mut node_ids)| {
            node_ids.sort();
            (depth, node_ids)
        })
        .collect::<Vec<_>>();

    let mut layers_grouped: BTreeMap<usize, Vec<LayerId>> = BTreeMap::new();
    for (&layer_id, &depth) in &layer_depths {
        layers_grouped.entry(depth).or_default().push(layer_id);
    }
    let mut layers = Vec::new();
    for (_, mut layer_ids) in layers_grouped.into_iter().rev() {
        layer_ids.sort();
        layers.extend(layer_ids);
    }

    // 容器内层名必须唯一
    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for &layer_id in &layers {
        *name_counts
            .entry(inner.get_layer(layer_id)?.name())
            .or_insert(0) += 1;
    }
    for (layer_name, count) in name_counts {
        if count > 1 {
            return Err(GraphError::DuplicateLayerName(format!(
                "层名称{}在容器中出现了{}次，层名必须唯一",
                layer_name, count
            )));
        }
    }

    // 连通性校验：按执行顺序检查每个节点的输入是否都能获得
    let mut computable: HashSet<TensorId> = inputs.iter().map(|t| t.id()).collect();
    for (_, node_ids) in &nodes_by_depth {
        for &node_id in node_ids {
            let node = inner.get_node(node_id)?;
            let layer_name = inner.get_layer(node.outbound_layer())?.name().to_string();
            if node.is_origin() {
                // 未声明为容器输入的Input层：它的占位值无处可来
                let output = &node.output_tensors()[0];
                if !computable.contains(&output.id()) {
                    return Err(GraphError::GraphDisconnected {
                        tensor: output.name().to_string(),
                        layer: layer_name,
                    });
                }
            } else {
                for tensor in node.input_tensors() {
                    if !computable.contains(&tensor.id()) {
                        return Err(GraphError::GraphDisconnected {
                            tensor: tensor.name().to_string(),
                            layer: layer_name,
                        });
                    }
                }
                computable.extend(node.output_tensors().iter().map(|t| t.id()));
            }
        }
    }

    drop(inner);
    Ok(Container {
        graph: graph.clone(),
        name: name.unwrap_or("container").to_string(),
        inputs: inputs.to_vec(),
        outputs: outputs.to_vec(),
        layers,
        nodes_by_depth,
        container_nodes: done,
    })
}

/// 深度优先回溯。节点在其全部上游处理完后入列（后序），
/// 因此`finished`天然是“深度递减”的顺序；回溯中再次遇到
/// 仍在处理中的节点即说明图中有环。
fn build_map(
    inner: &GraphInner,
    tensor: &SymbolicTensor,
    finished: &mut Vec<NodeId>,
    done: &mut HashSet<NodeId>,
    in_progress: &mut HashSet<NodeId>,
) -> Result<(), GraphError> {
    let node_id = inner.validate_tensor_origin(tensor)?;
    if done.contains(&node_id) {
        return Ok(());
    }
    if in_progress.contains(&node_id) {
        let layer_name = inner.get_layer(tensor.source_layer())?.name().to_string();
        return Err(GraphError::CycleDetected {
            tensor: tensor.name().to_string(),
            layer: layer_name,
        });
    }

    in_progress.insert(node_id);
    let input_tensors = inner.get_node(node_id)?.input_tensors().to_vec();
    for input in &input_tensors {
        build_map(inner, input, finished, done, in_progress)?;
    }
    in_progress.remove(&node_id);
    done.insert(node_id);
    finished.push(node_id);
    Ok(())
}

fn check_no_duplicates(tensors: &[SymbolicTensor], role: &str) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for tensor in tensors {
        if !seen.insert(tensor.id()) {
            return Err(GraphError::InvalidOperation(format!(
                "Container的{}中张量{}出现了多次",
                role,
                tensor.name()
            )));
        }
    }
    Ok(())
}
