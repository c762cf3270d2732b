/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Container：把一组输入/输出符号张量圈定的子图固化成可执行的模型。
 *
 * 构建时（topology.rs）从输出回溯到输入，完成：
 * - 环检测与连通性校验
 * - 节点/层的深度指派与确定性排序
 * 之后便可对整图执行（execute.rs）、摘要与导出描述符（describe.rs）、
 * 以及权重与拓扑的存取（serialization.rs）。
 */

mod describe;
mod execute;
mod serialization;
mod topology;

use super::graph::{Graph, GraphError};
use super::layer::{LayerId, TraitLayer};
use super::node::NodeId;
use super::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use std::collections::HashSet;

pub struct Container {
    graph: Graph,
    name: String,
    inputs: Vec<SymbolicTensor>,
    outputs: Vec<SymbolicTensor>,
    /// 深度降序（输入层在前），同深度按层id升序
    layers: Vec<LayerId>,
    /// (深度, 该深度的节点id)，深度降序；同深度按节点id升序
    nodes_by_depth: Vec<(usize, Vec<NodeId>)>,
    /// 本容器圈定的节点（层可能在容器外还有别的应用）
    container_nodes: HashSet<NodeId>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.name)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl Container {
    /// 由输入/输出符号张量构建容器。
    /// 输入必须是Input层的输出；输出可以是图中任何已铸造的符号张量。
    pub fn from_io(
        graph: &Graph,
        inputs: &[SymbolicTensor],
        outputs: &[SymbolicTensor],
        name: Option<&str>,
    ) -> Result<Self, GraphError> {
        topology::build(graph, inputs, outputs, name)
    }

    // ========== 访问器 ==========

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn inputs(&self) -> &[SymbolicTensor] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[SymbolicTensor] {
        &self.outputs
    }

    /// 容器包含的层（确定性顺序：深度降序，同深度按创建先后）
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    /// 各层名称，顺序同`layers()`
    pub fn layer_names(&self) -> Result<Vec<String>, GraphError> {
        let inner = self.graph.inner();
        self.layers
            .iter()
            .map(|&id| inner.get_layer(id).map(|layer| layer.name().to_string()))
            .collect()
    }

    /// 容器的参数总量
    pub fn param_count(&self) -> Result<usize, GraphError> {
        let inner = self.graph.inner();
        let mut total = 0;
        for &id in &self.layers {
            total += inner.get_layer(id)?.kind().param_count();
        }
        Ok(total)
    }

    // ========== 权重存取（按名） ==========

    pub fn get_weight(&self, layer_name: &str, weight_name: &str) -> Result<Tensor, GraphError> {
        self.graph.inner().get_layer_weight(layer_name, weight_name)
    }

    pub fn set_weight(
        &self,
        layer_name: &str,
        weight_name: &str,
        value: &Tensor,
    ) -> Result<(), GraphError> {
        self.graph
            .inner_mut()
            .set_layer_weight(layer_name, weight_name, value)
    }
}
