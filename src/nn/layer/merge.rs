/*
 * @Author       : 老董
 * @Date         : 2026-02-07
 * @Description  : 多输入合并层：Add（逐元素相加）与 Concatenate（沿轴拼接）。
 *                 这两个层是图引擎里多输入节点的主要来源。
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;

// ==================== Add ====================

pub(in crate::nn) struct AddKind;

impl AddKind {
    pub fn new() -> Self {
        Self
    }
}

impl TraitLayer for AddKind {
    fn type_name(&self) -> &'static str {
        "add"
    }

    fn input_spec(&self) -> InputSpec {
        // 输入个数可变（≥2），由compute_output_shape校验
        InputSpec::default()
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        if input_shapes.len() < 2 {
            return Err(GraphError::InvalidOperation(format!(
                "Add层至少需要2个输入，实际得到{}个",
                input_shapes.len()
            )));
        }
        let mut merged = input_shapes[0].clone();
        for shape in &input_shapes[1..] {
            merged = merged.merge(shape).ok_or_else(|| {
                GraphError::InvalidOperation(format!(
                    "Add层的输入形状不一致：{}与{}",
                    input_shapes[0], shape
                ))
            })?;
        }
        Ok(vec![merged])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let mut acc = inputs[0].clone();
        for tensor in &inputs[1..] {
            acc = &acc + *tensor;
        }
        Ok(vec![acc])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Add
    }
}

/// Add 层（用户级句柄）：把多个同形状的符号张量逐元素相加
///
/// # 使用示例
/// ```ignore
/// let add = Add::new(&graph, None)?;
/// let y = add.apply(&[&branch_1, &branch_2])?;
/// ```
#[derive(Debug)]
pub struct Add {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Add {
    pub fn new(graph: &Graph, name: Option<&str>) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(LayerKind::Add(AddKind::new()), name)?;
        let name = inner.get_layer(id)?.name().to_string();
        drop(inner);
        Ok(Self {
            id,
            name,
            graph: graph.clone(),
        })
    }

    pub fn apply(&self, inputs: &[&SymbolicTensor]) -> Result<SymbolicTensor, GraphError> {
        let inputs = inputs.iter().map(|&t| t.clone()).collect::<Vec<_>>();
        let mut outputs = self.graph.inner_mut().apply_layer(self.id, &inputs)?;
        Ok(outputs.remove(0))
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

// ==================== Concatenate ====================

pub(in crate::nn) struct ConcatenateKind {
    /// 拼接轴，可为负（-1表示最后一维）
    axis: isize,
}

impl ConcatenateKind {
    pub fn new(axis: isize) -> Self {
        Self { axis }
    }

    fn normalize_axis(&self, ndim: usize) -> Result<usize, GraphError> {
        let ndim = ndim as isize;
        let axis = if self.axis < 0 {
            ndim + self.axis
        } else {
            self.axis
        };
        if !(0..ndim).contains(&axis) {
            return Err(GraphError::InvalidOperation(format!(
                "Concatenate层的轴{}超出了输入的阶数{}",
                self.axis, ndim
            )));
        }
        Ok(axis as usize)
    }
}

impl TraitLayer for ConcatenateKind {
    fn type_name(&self) -> &'static str {
        "concatenate"
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        if input_shapes.len() < 2 {
            return Err(GraphError::InvalidOperation(format!(
                "Concatenate层至少需要2个输入，实际得到{}个",
                input_shapes.len()
            )));
        }
        let first = &input_shapes[0];
        let axis = self.normalize_axis(first.ndim())?;

        let mut concat_dim = first.dim(axis);
        for shape in &input_shapes[1..] {
            if shape.ndim() != first.ndim() {
                return Err(GraphError::DimensionMismatch {
                    expected: first.ndim(),
                    got: shape.ndim(),
                    message: "Concatenate层的输入阶数必须一致".to_string(),
                });
            }
            let compatible = shape
                .dims()
                .iter()
                .zip(first.dims())
                .enumerate()
                .all(|(i, (d1, d2))| {
                    i == axis
                        || match (d1, d2) {
                            (Some(a), Some(b)) => a == b,
                            _ => true,
                        }
                });
            if !compatible {
                return Err(GraphError::InvalidOperation(format!(
                    "Concatenate层沿轴{}拼接时，其余维度必须一致：{}与{}",
                    self.axis, first, shape
                )));
            }
            concat_dim = match (concat_dim, shape.dim(axis)) {
                (Some(a), Some(b)) => Some(a + b),
                _ => None,
            };
        }

        let mut dims = first.dims().to_vec();
        dims[axis] = concat_dim;
        Ok(vec![DynamicShape::new(&dims)])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        let axis = self.normalize_axis(inputs[0].dimension())?;
        let output = Tensor::concat(inputs, axis)
            .map_err(|e| GraphError::ComputationError(format!("Concatenate层执行失败：{}", e)))?;
        Ok(vec![output])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Concatenate { axis: self.axis }
    }
}

/// Concatenate 层（用户级句柄）：把多个符号张量沿指定轴拼接
///
/// # 使用示例
/// ```ignore
/// let concat = Concatenate::new(&graph, -1, None)?;
/// let y = concat.apply(&[&left, &right])?;
/// ```
#[derive(Debug)]
pub struct Concatenate {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Concatenate {
    pub fn new(graph: &Graph, axis: isize, name: Option<&str>) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(LayerKind::Concatenate(ConcatenateKind::new(axis)), name)?;
        let name = inner.get_layer(id)?.name().to_string();
        drop(inner);
        Ok(Self {
            id,
            name,
            graph: graph.clone(),
        })
    }

    pub fn apply(&self, inputs: &[&SymbolicTensor]) -> Result<SymbolicTensor, GraphError> {
        let inputs = inputs.iter().map(|&t| t.clone()).collect::<Vec<_>>();
        let mut outputs = self.graph.inner_mut().apply_layer(self.id, &inputs)?;
        Ok(outputs.remove(0))
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
