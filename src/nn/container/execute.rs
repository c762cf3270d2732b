/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : Container 的整图执行与整图形状推断。
 *                 两者走同一条深度降序的节点序，只是流动的东西不同：
 *                 call流动具体张量，compute_output_shape流动DynamicShape。
 */

use super::Container;
use crate::nn::graph::GraphError;
use crate::nn::layer::TraitLayer;
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::TensorId;
use crate::tensor::Tensor;
use std::collections::HashMap;

impl Container {
    /// 推理模式下执行整图
    pub fn call(&self, inputs: &[Tensor]) -> Result<Vec<Tensor>, GraphError> {
        self.call_with_mode(inputs, false)
    }

    /// 以指定模式执行整图（training只影响Dropout这类训练期行为）
    pub fn call_with_mode(
        &self,
        inputs: &[Tensor],
        training: bool,
    ) -> Result<Vec<Tensor>, GraphError> {
        if inputs.len() != self.inputs.len() {
            return Err(GraphError::InvalidOperation(format!(
                "容器{}期望{}路输入，实际得到{}路",
                self.name,
                self.inputs.len(),
                inputs.len()
            )));
        }

        let mut values: HashMap<TensorId, Tensor> = HashMap::new();
        for (symbolic, tensor) in self.inputs.iter().zip(inputs) {
            if !symbolic.shape().matches_tensor(tensor.shape()) {
                return Err(GraphError::ShapeMismatch {
                    expected: symbolic.shape().to_string(),
                    got: format!("{:?}", tensor.shape()),
                    message: format!("输入张量{}不满足声明形状", symbolic.name()),
                });
            }
            values.insert(symbolic.id(), tensor.clone());
        }

        let mut inner = self.graph.inner_mut();
        for (_, node_ids) in &self.nodes_by_depth {
            for &node_id in node_ids {
                // 先拷出节点信息，再做（可变的）层调用
                let (layer_id, input_refs, output_ids) = {
                    let node = inner.get_node(node_id)?;
                    if node.is_origin() {
                        continue;
                    }
                    (
                        node.outbound_layer(),
                        node.input_tensors()
                            .iter()
                            .map(|t| (t.id(), t.name().to_string()))
                            .collect::<Vec<_>>(),
                        node.output_tensors()
                            .iter()
                            .map(|t| t.id())
                            .collect::<Vec<_>>(),
                    )
                };

                let input_tensors = input_refs
                    .iter()
                    .map(|(id, name)| {
                        values.get(id).cloned().ok_or_else(|| {
                            GraphError::ComputationError(format!("执行时缺少张量{}的值", name))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let input_views = input_tensors.iter().collect::<Vec<_>>();
                let outputs = inner.call_layer(layer_id, &input_views, training)?;

                if outputs.len() != output_ids.len() {
                    return Err(GraphError::ComputationError(format!(
                        "层输出个数与符号图不符：预期{}，实际{}",
                        output_ids.len(),
                        outputs.len()
                    )));
                }
                for (id, tensor) in output_ids.into_iter().zip(outputs) {
                    values.insert(id, tensor);
                }
            }
        }

        self.outputs
            .iter()
            .map(|t| {
                values.get(&t.id()).cloned().ok_or_else(|| {
                    GraphError::ComputationError(format!("执行结束后缺少输出张量{}的值", t.name()))
                })
            })
            .collect()
    }

    /// 给定各路输入形状，推断各路输出形状（不执行任何计算）
    pub fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        if input_shapes.len() != self.inputs.len() {
            return Err(GraphError::InvalidOperation(format!(
                "容器{}期望{}路输入，实际得到{}路",
                self.name,
                self.inputs.len(),
                input_shapes.len()
            )));
        }

        let mut shapes: HashMap<TensorId, DynamicShape> = HashMap::new();
        for (symbolic, shape) in self.inputs.iter().zip(input_shapes) {
            if !symbolic.shape().is_compatible_with(shape) {
                return Err(GraphError::ShapeMismatch {
                    expected: symbolic.shape().to_string(),
                    got: shape.to_string(),
                    message: format!("输入形状与{}的声明不兼容", symbolic.name()),
                });
            }
            shapes.insert(symbolic.id(), shape.clone());
        }

        let inner = self.graph.inner();
        for (_, node_ids) in &self.nodes_by_depth {
            for &node_id in node_ids {
                let node = inner.get_node(node_id)?;
                if node.is_origin() {
                    continue;
                }
                let input_shapes = node
                    .input_tensors()
                    .iter()
                    .map(|t| {
                        shapes.get(&t.id()).cloned().ok_or_else(|| {
                            GraphError::ComputationError(format!(
                                "形状推断时缺少张量{}的形状",
                                t.name()
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let layer = inner.get_layer(node.outbound_layer())?;
                let output_shapes = layer.kind().compute_output_shape(&input_shapes)?;
                for (tensor, shape) in node.output_tensors().iter().zip(output_shapes) {
                    shapes.insert(tensor.id(), shape);
                }
            }
        }

        self.outputs
            .iter()
            .map(|t| {
                shapes.get(&t.id()).cloned().ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "形状推断结束后缺少输出张量{}的形状",
                        t.name()
                    ))
                })
            })
            .collect()
    }
}
