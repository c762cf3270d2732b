/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 激活函数与 Activation 层。
 *                 激活函数本身是个纯枚举（可被 Dense/Conv2D 内联使用），
 *                 Activation 层则把它独立成图中的一层。
 */

use super::{CallContext, InputSpec, LayerId, LayerKind, TraitLayer};
use crate::nn::descriptor::LayerTypeDescriptor;
use crate::nn::graph::{Graph, GraphError};
use crate::nn::shape::DynamicShape;
use crate::nn::symbolic::SymbolicTensor;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 激活函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFn {
    /// 恒等（不做任何变换）
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
    /// 沿最后一个轴归一化
    Softmax,
}

impl ActivationFn {
    /// 对张量逐元素（softmax为逐末轴）应用激活
    pub fn apply(&self, tensor: &Tensor) -> Tensor {
        match self {
            Self::Linear => tensor.clone(),
            Self::Relu => tensor.map(|x| x.max(0.0)),
            Self::Sigmoid => tensor.map(|x| 1.0 / (1.0 + (-x).exp())),
            Self::Tanh => tensor.map(f32::tanh),
            Self::Softmax => tensor.softmax_last_axis(),
        }
    }
}

impl fmt::Display for ActivationFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::Relu => "relu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::Softmax => "softmax",
        };
        write!(f, "{}", name)
    }
}

pub(in crate::nn) struct ActivationKind {
    activation: ActivationFn,
}

impl ActivationKind {
    pub fn new(activation: ActivationFn) -> Self {
        Self { activation }
    }
}

impl TraitLayer for ActivationKind {
    fn type_name(&self) -> &'static str {
        "activation"
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec {
            arity: Some(1),
            ..InputSpec::default()
        }
    }

    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError> {
        Ok(vec![input_shapes[0].clone()])
    }

    fn call(
        &mut self,
        inputs: &[&Tensor],
        _ctx: &mut CallContext,
    ) -> Result<Vec<Tensor>, GraphError> {
        Ok(vec![self.activation.apply(inputs[0])])
    }

    fn to_descriptor(&self) -> LayerTypeDescriptor {
        LayerTypeDescriptor::Activation {
            activation: self.activation,
        }
    }
}

/// Activation 层（用户级句柄）
///
/// # 使用示例
/// ```ignore
/// let act = Activation::new(&graph, ActivationFn::Relu, None)?;
/// let y = act.apply(&x)?;
/// ```
#[derive(Debug)]
pub struct Activation {
    id: LayerId,
    name: String,
    graph: Graph,
}

impl Activation {
    pub fn new(
        graph: &Graph,
        activation: ActivationFn,
        name: Option<&str>,
    ) -> Result<Self, GraphError> {
        let mut inner = graph.inner_mut();
        let id = inner.add_layer(LayerKind::Activation(ActivationKind::new(activation)), name)?;
        let name = inner.get_layer(id)?.name().to_string();
        drop(inner);
        Ok(Self {
            id,
            name,
            graph: graph.clone(),
        })
    }

    pub fn apply(&self, input: &SymbolicTensor) -> Result<SymbolicTensor, GraphError> {
        let mut outputs = self
            .graph
            .inner_mut()
            .apply_layer(self.id, std::slice::from_ref(input))?;
        Ok(outputs.remove(0))
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
