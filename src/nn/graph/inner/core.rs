/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : GraphInner 核心操作：创建、访问器、层注册与命名、层前向调用
 */

use super::{GraphInner, NEXT_LAYER_ID, NEXT_NODE_ID, NEXT_TENSOR_ID};
use crate::nn::graph::error::GraphError;
use crate::nn::layer::{CallContext, LayerHandle, LayerId, LayerKind, TraitLayer};
use crate::nn::node::{Node, NodeId};
use crate::nn::symbolic::TensorId;
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name("default_graph")
    }

    /// 创建一个带固定种子的符号图（确保权重初始化与dropout可重复）
    pub fn new_with_seed(seed: u64) -> Self {
        let mut graph = Self::with_name("default_graph");
        graph.rng = Some(StdRng::seed_from_u64(seed));
        graph
    }

    pub fn with_name(name: &str) -> Self {
        Self {
            name: name.to_string(),
            layers: HashMap::new(),
            nodes: HashMap::new(),
            type_name_counters: HashMap::new(),
            rng: None,
        }
    }

    /// 创建一个带名称和固定种子的符号图
    pub fn with_name_and_seed(name: &str, seed: u64) -> Self {
        let mut graph = Self::with_name(name);
        graph.rng = Some(StdRng::seed_from_u64(seed));
        graph
    }

    // ========== 基础访问器 ==========

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = Some(StdRng::seed_from_u64(seed));
    }

    /// 检查图是否有固定种子
    pub const fn has_seed(&self) -> bool {
        self.rng.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layers_count(&self) -> usize {
        self.layers.len()
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub(in crate::nn) fn get_layer(&self, id: LayerId) -> Result<&LayerHandle, GraphError> {
        self.layers.get(&id).ok_or(GraphError::LayerNotFound(id))
    }

    pub(in crate::nn) fn get_layer_mut(
        &mut self,
        id: LayerId,
    ) -> Result<&mut LayerHandle, GraphError> {
        self.layers
            .get_mut(&id)
            .ok_or(GraphError::LayerNotFound(id))
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&Node, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// 按名称查找层
    pub(in crate::nn) fn find_layer_by_name(&self, name: &str) -> Option<&LayerHandle> {
        self.layers.values().find(|layer| layer.name() == name)
    }

    /// 某层的第node_index次应用对应的节点
    pub(in crate::nn) fn node_of(
        &self,
        layer_id: LayerId,
        node_index: usize,
    ) -> Result<&Node, GraphError> {
        let layer = self.get_layer(layer_id)?;
        let node_id = layer
            .inbound_nodes()
            .get(node_index)
            .copied()
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "层{}只被应用了{}次，不存在第{}个节点",
                    layer.name(),
                    layer.inbound_nodes().len(),
                    node_index
                ))
            })?;
        self.get_node(node_id)
    }

    // ========== 层注册与命名 ==========

    /// 注册一个层。`name`为None时按类型自动命名（dense_1、dense_2……），
    /// 显式指定的名称在图内必须唯一。
    pub(in crate::nn) fn add_layer(
        &mut self,
        kind: LayerKind,
        name: Option<&str>,
    ) -> Result<LayerId, GraphError> {
        let layer_name = match name {
            Some(given) => {
                if given.is_empty() {
                    return Err(GraphError::InvalidOperation(
                        "层名称不能为空字符串".to_string(),
                    ));
                }
                if self.find_layer_by_name(given).is_some() {
                    return Err(GraphError::DuplicateLayerName(format!(
                        "层名称{}在图{}中重复",
                        given, self.name
                    )));
                }
                given.to_string()
            }
            None => self.generate_layer_name(kind.type_name()),
        };

        let id = LayerId(NEXT_LAYER_ID.fetch_add(1, Ordering::Relaxed));
        self.layers.insert(id, LayerHandle::new(id, &layer_name, kind));
        Ok(id)
    }

    fn generate_layer_name(&mut self, type_name: &'static str) -> String {
        loop {
            let counter = {
                let counter = self.type_name_counters.entry(type_name).or_insert(0);
                *counter += 1;
                *counter
            };
            let candidate = format!("{}_{}", type_name, counter);
            // 用户手动占用过的名字要跳过
            if self.find_layer_by_name(&candidate).is_none() {
                return candidate;
            }
        }
    }

    pub(in crate::nn) fn alloc_node_id(&mut self) -> NodeId {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(in crate::nn) fn alloc_tensor_id(&mut self) -> TensorId {
        TensorId(NEXT_TENSOR_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub(in crate::nn) fn insert_node(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    // ========== 层前向调用 ==========

    /// 在具体张量上调用某个（已构建的）层
    pub(in crate::nn) fn call_layer(
        &mut self,
        layer_id: LayerId,
        inputs: &[&Tensor],
        training: bool,
    ) -> Result<Vec<Tensor>, GraphError> {
        let Self { layers, rng, .. } = self;
        let layer = layers
            .get_mut(&layer_id)
            .ok_or(GraphError::LayerNotFound(layer_id))?;
        if !layer.is_built() {
            return Err(GraphError::InvalidOperation(format!(
                "层{}尚未构建，无法执行",
                layer.name()
            )));
        }
        let mut ctx = CallContext {
            training,
            rng: rng.as_mut(),
        };
        layer.kind_mut().call(inputs, &mut ctx)
    }

    // ========== 权重存取（按名） ==========

    /// 导出某层的全部权重：(权重名, 张量克隆)
    pub(in crate::nn) fn layer_weights(
        &self,
        layer_id: LayerId,
    ) -> Result<Vec<(String, Tensor)>, GraphError> {
        let layer = self.get_layer(layer_id)?;
        Ok(layer
            .kind()
            .weights()
            .into_iter()
            .map(|(name, tensor)| (name.to_string(), tensor.clone()))
            .collect())
    }

    /// 按层名+权重名覆写权重
    pub(in crate::nn) fn set_layer_weight(
        &mut self,
        layer_name: &str,
        weight_name: &str,
        value: &Tensor,
    ) -> Result<(), GraphError> {
        let layer_id = self
            .find_layer_by_name(layer_name)
            .map(|layer| layer.id())
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!("图中不存在名为{}的层", layer_name))
            })?;
        self.get_layer_mut(layer_id)?
            .kind_mut()
            .set_weight(weight_name, value)
    }

    /// 按层名+权重名读取权重
    pub(in crate::nn) fn get_layer_weight(
        &self,
        layer_name: &str,
        weight_name: &str,
    ) -> Result<Tensor, GraphError> {
        let layer = self.find_layer_by_name(layer_name).ok_or_else(|| {
            GraphError::InvalidOperation(format!("图中不存在名为{}的层", layer_name))
        })?;
        layer
            .kind()
            .weights()
            .into_iter()
            .find(|(name, _)| *name == weight_name)
            .map(|(_, tensor)| tensor.clone())
            .ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "层{}没有名为{}的权重",
                    layer_name, weight_name
                ))
            })
    }
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
