/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Input（占位）层。不做任何计算，只声明一路输入的形状与数据类型，
 *                 并在图中占据一个没有输入的源节点。
 *                 用户通过 `Graph::input` 创建，不直接实例化本类型。
 */

use super::{CallContext, InputSpec, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::GraphError;
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::DType;
use crate::tensor::Tensor;

pub(in crate::nn) struct InputKind {
    shape: DynamicShape,
    dtype: DType,
}

impl InputKind {
    pub fn new(shape: DynamicShape, dtype: DType) -> Self {
        Self { shape, dtype }
    }

    pub fn shape(&self) -> &DynamicShape {
        &self.shape
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
}

impl TraitLayer for InputKind {
    fn type_name(&self) -> &'static str {
        "input"
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec {
            arity: Some(0),
            ..InputSpec::default()
        }
    }

    fn compute_output_shape(
        &self,
        _input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        Ok(vec![self.shape.clone()])
    }

    fn call(
        &mut self,
        _inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        Err(GraphError::InvalidOperation(
            "Input层不参与执行，其值由容器输入直接馈送".to_string(),
        ))
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Input {
            shape: self.shape.dims().to_vec(),
            dtype: self.dtype,
        }
    }
}
