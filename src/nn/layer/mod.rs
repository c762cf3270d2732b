/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : Layer 模块：层特性（trait）、枚举分派与层句柄。
 *
 * 层的职责：
 * - 持有自己的配置与权重（权重在首次应用时构建）
 * - 从输入形状推断输出形状（compute_output_shape）
 * - 在具体张量上执行前向计算（call）
 *
 * 层与图的关系：层实例由 GraphInner 统一持有（LayerHandle），
 * 对外暴露的各层结构体（Dense、Conv2D……）只是携带图引用的轻量句柄，
 * 这一点与底层/用户级 API 分离的设计一致。
 */

mod activation;
mod conv2d;
mod dense;
mod dropout;
mod flatten;
mod input;
mod max_pool2d;
mod merge;
mod reshape;

pub use activation::{Activation, ActivationFn};
pub use conv2d::{Conv2D, Padding};
pub use dense::Dense;
pub use dropout::Dropout;
pub use flatten::Flatten;
pub use max_pool2d::MaxPool2D;
pub use merge::{Add, Concatenate};
pub use reshape::Reshape;

pub(in crate::nn) use activation::ActivationKind;
pub(in crate::nn) use conv2d::Conv2DKind;
pub(in crate::nn) use dense::DenseKind;
pub(in crate::nn) use dropout::DropoutKind;
pub(in crate::nn) use flatten::FlattenKind;
pub(in crate::nn) use input::InputKind;
pub(in crate::nn) use max_pool2d::MaxPool2DKind;
pub(in crate::nn) use merge::{AddKind, ConcatenateKind};
pub(in crate::nn) use reshape::ReshapeKind;

use super::descriptor::LayerTypeDescriptor;
use super::graph::GraphError;
use super::node::NodeId;
use super::shape::DynamicShape;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;
use rand::rngs::StdRng;

/// 层在图内的唯一标识（也决定同深度层的确定性排序）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// 前向执行的上下文：训练/推理开关与（可选的）图级RNG
pub(in crate::nn) struct CallContext<'a> {
    pub training: bool,
    pub rng: Option<&'a mut StdRng>,
}

/// 层对输入的静态约束，应用层（apply）前校验
#[derive(Debug, Clone, Default)]
pub(in crate::nn) struct InputSpec {
    /// 精确的输入张量个数；None表示由层的compute_output_shape自行校验
    pub arity: Option<usize>,
    /// 每个输入的精确阶数
    pub ndim: Option<usize>,
    /// 每个输入的最小阶数
    pub min_ndim: Option<usize>,
    /// 指定轴的维度约束：(轴（可为负）, 期望值)
    pub axes: Vec<(isize, usize)>,
}

impl InputSpec {
    pub fn check(
        &self,
        layer_name: &str,
        input_shapes: &[DynamicShape],
    ) -> Result<(), GraphError> {
        if let Some(arity) = self.arity {
            if input_shapes.len() != arity {
                return Err(GraphError::InvalidOperation(format!(
                    "层{}期望{}个输入，实际得到{}个",
                    layer_name,
                    arity,
                    input_shapes.len()
                )));
            }
        }
        for shape in input_shapes {
            if let Some(ndim) = self.ndim {
                if shape.ndim() != ndim {
                    return Err(GraphError::DimensionMismatch {
                        expected: ndim,
                        got: shape.ndim(),
                        message: format!("层{}的输入形状为{}", layer_name, shape),
                    });
                }
            }
            if let Some(min_ndim) = self.min_ndim {
                if shape.ndim() < min_ndim {
                    return Err(GraphError::DimensionMismatch {
                        expected: min_ndim,
                        got: shape.ndim(),
                        message: format!("层{}的输入至少需要{}阶，形状为{}", layer_name, min_ndim, shape),
                    });
                }
            }
            for &(axis, expected) in &self.axes {
                let ndim = shape.ndim() as isize;
                let index = if axis < 0 { ndim + axis } else { axis };
                if !(0..ndim).contains(&index) {
                    continue;
                }
                // 动态维度（None）视为满足任何约束
                if let Some(actual) = shape.dim(index as usize) {
                    if actual != expected {
                        return Err(GraphError::ShapeMismatch {
                            expected: expected.to_string(),
                            got: actual.to_string(),
                            message: format!(
                                "层{}的输入在轴{}上的维度不符（输入形状{}）",
                                layer_name, axis, shape
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[enum_dispatch]
pub(in crate::nn) enum LayerKind {
    Input(InputKind),
    Dense(DenseKind),
    Activation(ActivationKind),
    Flatten(FlattenKind),
    Reshape(ReshapeKind),
    Dropout(DropoutKind),
    Conv2D(Conv2DKind),
    MaxPool2D(MaxPool2DKind),
    Add(AddKind),
    Concatenate(ConcatenateKind),
}

#[enum_dispatch(LayerKind)]
pub(in crate::nn) trait TraitLayer {
    /// 层类型名（小写），用于自动命名与描述符，如"dense"
    fn type_name(&self) -> &'static str;

    /// 输入约束。默认无约束。
    fn input_spec(&self) -> InputSpec {
        InputSpec::default()
    }

    /// 首次应用时构建权重。默认无权重，直接成功。
    fn build(
        &mut self,
        input_shapes: &[DynamicShape],
        rng: Option<&mut StdRng>,
    ) -> Result<(), GraphError> {
        let _ = (input_shapes, rng);
        Ok(())
    }

    /// 从输入形状推断输出形状（不触碰任何数据）
    fn compute_output_shape(
        &self,
        input_shapes: &[DynamicShape],
    ) -> Result<Vec<DynamicShape>, GraphError>;

    /// 在具体张量上执行前向计算。调用时层必然已构建。
    fn call(&mut self, inputs: &[&Tensor], ctx: &mut CallContext) -> Result<Vec<Tensor>, GraphError>;

    /// (权重名, 权重张量)列表，顺序稳定。默认无权重。
    fn weights(&self) -> Vec<(&'static str, &Tensor)> {
        Vec::new()
    }

    /// 按名覆写权重（形状必须与现有权重一致）。默认：无此权重。
    fn set_weight(&mut self, weight_name: &str, value: &Tensor) -> Result<(), GraphError> {
        let _ = value;
        Err(GraphError::InvalidOperation(format!(
            "该层没有名为{}的权重",
            weight_name
        )))
    }

    /// 参数总量
    fn param_count(&self) -> usize {
        self.weights().iter().map(|(_, t)| t.size()).sum()
    }

    /// 导出层配置（用于序列化）
    fn to_descriptor(&self) -> LayerTypeDescriptor;
}

impl LayerKind {
    /// 从描述符重建（未构建状态的）层
    pub(in crate::nn) fn from_descriptor(
        descriptor: &LayerTypeDescriptor,
    ) -> Result<Self, GraphError> {
        let kind = match descriptor {
            LayerTypeDescriptor::Input { shape, dtype } => {
                Self::Input(InputKind::new(DynamicShape::new(shape), *dtype))
            }
            LayerTypeDescriptor::Dense {
                units,
                activation,
                use_bias,
            } => Self::Dense(DenseKind::new(*units, *activation, *use_bias)),
            LayerTypeDescriptor::Activation { activation } => {
                Self::Activation(ActivationKind::new(*activation))
            }
            LayerTypeDescriptor::Flatten => Self::Flatten(FlattenKind::new()),
            LayerTypeDescriptor::Reshape { target_shape } => {
                Self::Reshape(ReshapeKind::new(target_shape.clone()))
            }
            LayerTypeDescriptor::Dropout { rate } => Self::Dropout(DropoutKind::new(*rate)?),
            LayerTypeDescriptor::Conv2D {
                filters,
                kernel_size,
                strides,
                padding,
                activation,
                use_bias,
            } => Self::Conv2D(Conv2DKind::new(
                *filters,
                *kernel_size,
                *strides,
                *padding,
                *activation,
                *use_bias,
            )),
            LayerTypeDescriptor::MaxPool2D {
                pool_size,
                strides,
                padding,
            } => Self::MaxPool2D(MaxPool2DKind::new(*pool_size, *strides, *padding)),
            LayerTypeDescriptor::Add => Self::Add(AddKind::new()),
            LayerTypeDescriptor::Concatenate { axis } => {
                Self::Concatenate(ConcatenateKind::new(*axis))
            }
        };
        Ok(kind)
    }
}

/// 图持有的层实例：层本体（kind）加上图层面的簿记
pub(in crate::nn) struct LayerHandle {
    id: LayerId,
    name: String,
    kind: LayerKind,
    built: bool,
    /// 层的每次应用产生的节点，按应用顺序
    inbound_nodes: Vec<NodeId>,
    /// 以本层输出为输入的节点
    outbound_nodes: Vec<NodeId>,
}

impl LayerHandle {
    pub fn new(id: LayerId, name: &str, kind: LayerKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            built: false,
            inbound_nodes: Vec::new(),
            outbound_nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut LayerKind {
        &mut self.kind
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn set_built(&mut self) {
        self.built = true;
    }

    pub fn inbound_nodes(&self) -> &[NodeId] {
        &self.inbound_nodes
    }

    pub fn outbound_nodes(&self) -> &[NodeId] {
        &self.outbound_nodes
    }

    pub fn push_inbound_node(&mut self, node_id: NodeId) {
        self.inbound_nodes.push(node_id);
    }

    pub fn push_outbound_node(&mut self, node_id: NodeId) {
        self.outbound_nodes.push(node_id);
    }
}
