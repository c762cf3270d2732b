/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : GraphInner 层应用：把层作用到符号张量上，铸造输出并记录节点。
 *                 这是符号图长出新边的唯一入口。
 */

use super::GraphInner;
use crate::nn::graph::error::GraphError;
use crate::nn::layer::{InputKind, LayerId, LayerKind, TraitLayer};
use crate::nn::node::{InboundRef, Node, NodeId};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::{DType, SymbolicTensor};

impl GraphInner {
    /// 创建一路输入：注册Input层并为其铸造源节点与占位张量
    pub(in crate::nn) fn new_input(
        &mut self,
        shape: &DynamicShape,
        dtype: DType,
        name: Option<&str>,
    ) -> Result<SymbolicTensor, GraphError> {
        let layer_id = self.add_layer(
            LayerKind::Input(InputKind::new(shape.clone(), dtype)),
            name,
        )?;
        let layer_name = self.get_layer(layer_id)?.name().to_string();

        let tensor_id = self.alloc_tensor_id();
        let node_id = self.alloc_node_id();
        let tensor = SymbolicTensor::new(
            tensor_id,
            &layer_name,
            dtype,
            shape.clone(),
            layer_id,
            0,
            0,
        );
        self.insert_node(Node::new(
            node_id,
            layer_id,
            0,
            Vec::new(),
            Vec::new(),
            vec![tensor.clone()],
        ));

        let layer = self.get_layer_mut(layer_id)?;
        layer.push_inbound_node(node_id);
        layer.set_built();
        Ok(tensor)
    }

    /// 把层作用到一组符号张量上：
    /// 1. 校验输入确实属于本图；
    /// 2. 按层的InputSpec校验输入形状；
    /// 3. 首次应用时构建权重；
    /// 4. 推断输出形状并铸造输出符号张量；
    /// 5. 记录节点并把它双向接进相关层。
    pub(in crate::nn) fn apply_layer(
        &mut self,
        layer_id: LayerId,
        inputs: &[SymbolicTensor],
    ) -> Result<Vec<SymbolicTensor>, GraphError> {
        if inputs.is_empty() {
            return Err(GraphError::InvalidOperation(
                "层的应用至少需要1个输入符号张量".to_string(),
            ));
        }
        for tensor in inputs {
            self.validate_tensor_origin(tensor)?;
        }
        let input_shapes = inputs
            .iter()
            .map(|t| t.shape().clone())
            .collect::<Vec<_>>();

        {
            let layer = self.get_layer(layer_id)?;
            layer.kind().input_spec().check(layer.name(), &input_shapes)?;
        }

        let (output_shapes, layer_name, node_index) = {
            let Self { layers, rng, .. } = self;
            let layer = layers
                .get_mut(&layer_id)
                .ok_or(GraphError::LayerNotFound(layer_id))?;
            if !layer.is_built() {
                layer.kind_mut().build(&input_shapes, rng.as_mut())?;
                layer.set_built();
            }
            let output_shapes = layer.kind().compute_output_shape(&input_shapes)?;
            (
                output_shapes,
                layer.name().to_string(),
                layer.inbound_nodes().len(),
            )
        };

        let dtype = inputs[0].dtype();
        let node_id = self.alloc_node_id();
        let output_tensors = output_shapes
            .iter()
            .enumerate()
            .map(|(tensor_index, shape)| {
                let tensor_id = self.alloc_tensor_id();
                SymbolicTensor::new(
                    tensor_id,
                    &format!("{}:{}:{}", layer_name, node_index, tensor_index),
                    dtype,
                    shape.clone(),
                    layer_id,
                    node_index,
                    tensor_index,
                )
            })
            .collect::<Vec<_>>();

        let inbound = inputs
            .iter()
            .map(|t| InboundRef {
                layer: t.source_layer(),
                node_index: t.node_index(),
                tensor_index: t.tensor_index(),
            })
            .collect::<Vec<_>>();
        self.insert_node(Node::new(
            node_id,
            layer_id,
            node_index,
            inbound,
            inputs.to_vec(),
            output_tensors.clone(),
        ));

        self.get_layer_mut(layer_id)?.push_inbound_node(node_id);
        self.wire_outbound(node_id, inputs)?;
        Ok(output_tensors)
    }

    /// 把新节点登记到各输入来源层的outbound列表（同一来源层只记一次）
    fn wire_outbound(
        &mut self,
        node_id: NodeId,
        inputs: &[SymbolicTensor],
    ) -> Result<(), GraphError> {
        let mut wired = Vec::new();
        for tensor in inputs {
            let source = tensor.source_layer();
            if !wired.contains(&source) {
                wired.push(source);
                self.get_layer_mut(source)?.push_outbound_node(node_id);
            }
        }
        Ok(())
    }

    /// 校验符号张量确实出自本图：其来源(层, 节点序号, 输出序号)必须指回它自己
    pub(in crate::nn) fn validate_tensor_origin(
        &self,
        tensor: &SymbolicTensor,
    ) -> Result<NodeId, GraphError> {
        let not_found = || GraphError::TensorNotFound(tensor.name().to_string());
        let layer = self
            .get_layer(tensor.source_layer())
            .map_err(|_| not_found())?;
        let node_id = layer
            .inbound_nodes()
            .get(tensor.node_index())
            .copied()
            .ok_or_else(not_found)?;
        let node = self.get_node(node_id).map_err(|_| not_found())?;
        match node.output_tensors().get(tensor.tensor_index()) {
            Some(recorded) if recorded.id() == tensor.id() => Ok(node_id),
            _ => Err(not_found()),
        }
    }
}
